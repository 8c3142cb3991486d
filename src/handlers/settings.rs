// src/handlers/settings.rs

use axum::{Json, extract::State};
use serde_json::Value;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{AdminOnly, RequireRole},
    models::settings::SystemSettings,
};

#[utoipa::path(
    get,
    path = "/api/settings/system",
    responses((status = 200, body = SystemSettings)),
    security(("api_jwt" = [])),
    tag = "Settings"
)]
pub async fn get_system_settings(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
) -> Result<Json<SystemSettings>, AppError> {
    Ok(Json(app_state.settings_repo.get_system().await?))
}

// Merge raso sobre o documento: chaves não enviadas ficam como estão.
#[utoipa::path(
    put,
    path = "/api/settings/system",
    request_body = SystemSettings,
    responses((status = 200, body = SystemSettings)),
    security(("api_jwt" = [])),
    tag = "Settings"
)]
pub async fn update_system_settings(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Json(patch): Json<Value>,
) -> Result<Json<SystemSettings>, AppError> {
    if !patch.is_object() {
        return Err(AppError::BadRequest("o corpo deve ser um objeto JSON".into()));
    }

    Ok(Json(app_state.settings_repo.merge_system(patch).await?))
}
