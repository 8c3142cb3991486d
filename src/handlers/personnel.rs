// src/handlers/personnel.rs

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{AdminOnly, RequireRole},
    models::{
        auth::{User, UserRole},
        salary::SalaryRole,
    },
};

#[utoipa::path(
    get,
    path = "/api/personnel",
    responses((status = 200, body = [User])),
    security(("api_jwt" = [])),
    tag = "Personnel"
)]
pub async fn list_staff(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(app_state.personnel_service.list().await?))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateStaffPayload {
    #[validate(length(min = 1, message = "Vui lòng nhập họ tên."))]
    pub name: String,
    #[validate(length(min = 1, message = "Vui lòng nhập tên đăng nhập."))]
    pub username: String,
    #[validate(length(min = 6, message = "Mật khẩu phải có ít nhất 6 ký tự."))]
    pub password: String,
    #[serde(default)]
    pub role: Option<UserRole>,
}

#[utoipa::path(
    post,
    path = "/api/personnel",
    request_body = CreateStaffPayload,
    responses((status = 200, body = User), (status = 409, description = "Username já em uso")),
    security(("api_jwt" = [])),
    tag = "Personnel"
)]
pub async fn create_staff(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Json(payload): Json<CreateStaffPayload>,
) -> Result<Json<User>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let user = app_state
        .personnel_service
        .create(&payload.name, &payload.username, &payload.password, payload.role)
        .await?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateStaffPayload {
    #[validate(length(min = 1, message = "Vui lòng nhập họ tên."))]
    pub name: String,
    #[validate(length(min = 1, message = "Vui lòng nhập tên đăng nhập."))]
    pub username: String,
    // Ausente ou vazio mantém a senha atual.
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<UserRole>,
}

#[utoipa::path(
    put,
    path = "/api/personnel/{id}",
    params(("id" = String, Path)),
    request_body = UpdateStaffPayload,
    responses((status = 200, body = User)),
    security(("api_jwt" = [])),
    tag = "Personnel"
)]
pub async fn update_staff(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateStaffPayload>,
) -> Result<Json<User>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let user = app_state
        .personnel_service
        .update(
            &id,
            &payload.name,
            &payload.username,
            payload.password.as_deref(),
            payload.role,
        )
        .await?;
    Ok(Json(user))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

// Exclusão de conta: operação destrutiva, exige a confirmação explícita.
// O histórico de ponto permanece; só a conta é desativada.
#[utoipa::path(
    delete,
    path = "/api/personnel/{id}",
    params(("id" = String, Path), DeleteQuery),
    responses((status = 204, description = "Conta removida")),
    security(("api_jwt" = [])),
    tag = "Personnel"
)]
pub async fn delete_staff(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<axum::http::StatusCode, AppError> {
    if !query.confirm {
        return Err(AppError::BadRequest(
            "cần xác nhận trước khi xóa nhân viên (confirm=true)".into(),
        ));
    }

    app_state.personnel_service.delete(&id).await?;
    Ok(axum::http::StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SalaryConfigPayload {
    pub roles: Vec<SalaryRole>,
}

// Papéis de pagamento (multi-role) do funcionário.
#[utoipa::path(
    put,
    path = "/api/personnel/{id}/salary-config",
    params(("id" = String, Path)),
    request_body = SalaryConfigPayload,
    responses((status = 200, body = User)),
    security(("api_jwt" = [])),
    tag = "Personnel"
)]
pub async fn set_salary_config(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(id): Path<String>,
    Json(payload): Json<SalaryConfigPayload>,
) -> Result<Json<User>, AppError> {
    let user = app_state
        .personnel_service
        .set_salary_roles(&id, payload.roles)
        .await?;
    Ok(Json(user))
}
