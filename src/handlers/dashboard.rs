// src/handlers/dashboard.rs

use axum::{Json, extract::State};
use chrono::Utc;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{RequireRole, SchedulerOnly},
    models::dashboard::DashboardStats,
};

#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses((status = 200, body = DashboardStats)),
    security(("api_jwt" = [])),
    tag = "Dashboard"
)]
pub async fn stats(
    State(app_state): State<AppState>,
    _guard: RequireRole<SchedulerOnly>,
) -> Result<Json<DashboardStats>, AppError> {
    Ok(Json(app_state.report_service.dashboard_stats(Utc::now()).await?))
}
