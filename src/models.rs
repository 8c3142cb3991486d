pub mod attendance;
pub mod auth;
pub mod dashboard;
pub mod report;
pub mod salary;
pub mod schedule;
pub mod settings;
