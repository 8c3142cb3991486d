// src/handlers/maintenance.rs
//
// Aba de manutenção do admin: varredura e expurgo de registros de ponto
// antigos. O fluxo é em dois passos — quem quer apagar precisa reapresentar
// exatamente o que a varredura mostrou.

use axum::{Json, extract::State};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{AdminOnly, RequireRole},
    models::attendance::AttendanceDoc,
};

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ScanPayload {
    // Tudo anterior a (hoje − days) entra na varredura.
    #[validate(range(min = 1, message = "Số ngày phải lớn hơn 0."))]
    pub days: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScanResponse {
    pub cutoff: String,
    pub count: i64,
    pub docs: Vec<AttendanceDoc>,
}

#[utoipa::path(
    post,
    path = "/api/maintenance/scan",
    request_body = ScanPayload,
    responses((status = 200, body = ScanResponse)),
    security(("api_jwt" = [])),
    tag = "Maintenance"
)]
pub async fn scan(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<ScanPayload>,
) -> Result<Json<ScanResponse>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let result = app_state
        .maintenance_service
        .scan(payload.days, Utc::now())
        .await?;

    Ok(Json(ScanResponse {
        cutoff: result.cutoff,
        count: result.count,
        docs: result.docs,
    }))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurgePayload {
    pub cutoff: String,
    // A contagem que o admin viu na varredura; divergência aborta.
    pub expected_count: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PurgeResponse {
    pub deleted: u64,
}

#[utoipa::path(
    post,
    path = "/api/maintenance/purge",
    request_body = PurgePayload,
    responses((status = 200, body = PurgeResponse), (status = 409, description = "Varredura desatualizada")),
    security(("api_jwt" = [])),
    tag = "Maintenance"
)]
pub async fn purge(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<PurgePayload>,
) -> Result<Json<PurgeResponse>, AppError> {
    let deleted = app_state
        .maintenance_service
        .purge(&payload.cutoff, payload.expected_count)
        .await?;

    Ok(Json(PurgeResponse { deleted }))
}
