// src/config.rs

use std::{env, time::Duration};

use chrono::FixedOffset;
use sqlx::{PgPool, postgres::PgPoolOptions};

use crate::{
    common::time::offset_from_hours,
    db::{
        AttendanceRepository, SalaryRepository, ScheduleRepository, SettingsRepository,
        UserRepository,
    },
    services::{
        attendance::AttendanceService, auth::AuthService, maintenance::MaintenanceService,
        personnel::PersonnelService, report::ReportService, schedule::ScheduleService,
    },
};

// O estado compartilhado, acessível em toda a aplicação.
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,

    pub auth_service: AuthService,
    pub attendance_service: AttendanceService,
    pub schedule_service: ScheduleService,
    pub report_service: ReportService,
    pub personnel_service: PersonnelService,
    pub maintenance_service: MaintenanceService,

    pub settings_repo: SettingsRepository,
    pub salary_repo: SalaryRepository,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let jwt_secret = env::var("JWT_SECRET").expect("JWT_SECRET deve ser definido");
        // Fuso local do centro (sem DST); todas as chaves de dia saem dele.
        let offset_hours = env::var("LOCAL_TZ_OFFSET_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(7);
        let local_offset: FixedOffset = offset_from_hours(offset_hours);

        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&database_url)
            .await?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        // --- Monta o gráfico de dependências ---
        let user_repo = UserRepository::new(db_pool.clone());
        let attendance_repo = AttendanceRepository::new(db_pool.clone());
        let schedule_repo = ScheduleRepository::new(db_pool.clone());
        let settings_repo = SettingsRepository::new(db_pool.clone());
        let salary_repo = SalaryRepository::new(db_pool.clone());

        let auth_service = AuthService::new(user_repo.clone(), jwt_secret);
        let attendance_service = AttendanceService::new(
            attendance_repo.clone(),
            user_repo.clone(),
            settings_repo.clone(),
            db_pool.clone(),
            local_offset,
        );
        let schedule_service =
            ScheduleService::new(schedule_repo.clone(), db_pool.clone(), local_offset);
        let report_service = ReportService::new(
            attendance_repo.clone(),
            schedule_repo,
            user_repo.clone(),
            salary_repo.clone(),
            local_offset,
        );
        let personnel_service = PersonnelService::new(user_repo, db_pool.clone());
        let maintenance_service =
            MaintenanceService::new(attendance_repo, db_pool.clone(), local_offset);

        Ok(Self {
            db_pool,
            auth_service,
            attendance_service,
            schedule_service,
            report_service,
            personnel_service,
            maintenance_service,
            settings_repo,
            salary_repo,
        })
    }
}
