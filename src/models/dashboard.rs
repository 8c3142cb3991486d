// src/models/dashboard.rs

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    pub user: String,
    pub time: DateTime<Utc>,
    // "Đang làm việc" | "Hoàn thành"
    pub status: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_users: i64,
    // Registros de ponto abertos hoje (dia local).
    pub checked_in_count: i64,
    // As cinco entradas mais recentes do dia, mais nova primeiro.
    pub recent_activity: Vec<ActivityEntry>,
}
