pub mod attendance_repo;
pub use attendance_repo::AttendanceRepository;
pub mod schedule_repo;
pub use schedule_repo::ScheduleRepository;
pub mod salary_repo;
pub use salary_repo::SalaryRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
