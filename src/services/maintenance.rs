// src/services/maintenance.rs
//
// Retenção de dados: varredura e expurgo de registros de ponto antigos.
// O expurgo exige que o admin reapresente o corte e a contagem que viu na
// varredura; se o banco mudou no meio, a operação aborta.

use chrono::{DateTime, Duration, FixedOffset, Utc};
use sqlx::PgPool;

use crate::{
    common::{error::AppError, time::local_date},
    db::AttendanceRepository,
    models::attendance::AttendanceDoc,
};

pub struct ScanResult {
    pub cutoff: String,
    pub count: i64,
    pub docs: Vec<AttendanceDoc>,
}

#[derive(Clone)]
pub struct MaintenanceService {
    attendance_repo: AttendanceRepository,
    pool: PgPool,
    offset: FixedOffset,
}

impl MaintenanceService {
    pub fn new(attendance_repo: AttendanceRepository, pool: PgPool, offset: FixedOffset) -> Self {
        Self { attendance_repo, pool, offset }
    }

    // Tudo que for estritamente anterior a (hoje local − days).
    pub async fn scan(&self, days: i64, now: DateTime<Utc>) -> Result<ScanResult, AppError> {
        let cutoff = (local_date(now, self.offset) - Duration::days(days))
            .format("%Y-%m-%d")
            .to_string();

        let docs = self.attendance_repo.list_before(&cutoff).await?;
        Ok(ScanResult { count: docs.len() as i64, cutoff, docs })
    }

    pub async fn purge(&self, cutoff: &str, expected_count: i64) -> Result<u64, AppError> {
        crate::common::time::parse_date_key(cutoff)?;

        let mut tx = self.pool.begin().await?;

        let current = self.attendance_repo.count_before(&mut *tx, cutoff).await?;
        if current != expected_count {
            return Err(AppError::StaleScan);
        }

        let deleted = self.attendance_repo.delete_before(&mut *tx, cutoff).await?;
        tx.commit().await?;

        tracing::info!("Expurgo concluído: {deleted} registros anteriores a {cutoff}.");
        Ok(deleted)
    }
}
