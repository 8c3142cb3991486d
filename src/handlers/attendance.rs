// src/handlers/attendance.rs
//
// Ponto pessoal (check-in/out do próprio funcionário) e as correções
// administrativas (lançamento manual, edição, exclusão, atribuição de
// papel de pagamento).

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    common::{error::AppError, time::parse_hhmm},
    config::AppState,
    middleware::{
        auth::{AdminOnly, AuthenticatedUser, RequireRole},
        net::ClientIp,
    },
    models::attendance::{AttendanceDoc, SessionId},
    services::attendance::SessionPatch,
};

// Distingue "campo ausente" (não mexer) de "campo null" (limpar o valor,
// reabrindo a sessão).
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

fn parse_session_id(raw: &str) -> Result<SessionId, AppError> {
    raw.parse().map_err(AppError::BadRequest)
}

#[utoipa::path(
    post,
    path = "/api/attendance/check-in",
    responses((status = 200, body = AttendanceDoc), (status = 422, description = "Sessão ainda aberta"), (status = 403, description = "IP fora da lista")),
    security(("api_jwt" = [])),
    tag = "Attendance"
)]
pub async fn check_in(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    ClientIp(client_ip): ClientIp,
) -> Result<Json<AttendanceDoc>, AppError> {
    let full_name = if user.name.is_empty() { &user.username } else { &user.name };
    let doc = app_state
        .attendance_service
        .check_in(&user.id, full_name, client_ip.as_deref(), Utc::now())
        .await?;
    Ok(Json(doc))
}

#[utoipa::path(
    post,
    path = "/api/attendance/check-out",
    responses((status = 200, body = AttendanceDoc), (status = 422, description = "Nenhuma sessão aberta")),
    security(("api_jwt" = [])),
    tag = "Attendance"
)]
pub async fn check_out(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<AttendanceDoc>, AppError> {
    let doc = app_state.attendance_service.check_out(&user.id, Utc::now()).await?;
    Ok(Json(doc))
}

// O dia corrente do próprio funcionário (pode ainda não existir).
#[utoipa::path(
    get,
    path = "/api/attendance/today",
    responses((status = 200, body = AttendanceDoc, description = "null quando ainda não há registro hoje")),
    security(("api_jwt" = [])),
    tag = "Attendance"
)]
pub async fn today(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<Json<Option<AttendanceDoc>>, AppError> {
    let doc = app_state.attendance_service.today(&user.id, Utc::now()).await?;
    Ok(Json(doc))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ManualSessionPayload {
    // HH:mm locais, combinados com a data do caminho.
    #[validate(length(min = 1, message = "Giờ vào không được để trống!"))]
    pub check_in: String,
    #[serde(default)]
    pub check_out: Option<String>,
}

// Chấm công bù (lançamento retroativo do admin).
#[utoipa::path(
    post,
    path = "/api/attendance/{user_id}/{date}/sessions",
    params(("user_id" = String, Path), ("date" = String, Path, description = "YYYY-MM-DD")),
    request_body = ManualSessionPayload,
    responses((status = 200, body = AttendanceDoc)),
    security(("api_jwt" = [])),
    tag = "Attendance"
)]
pub async fn add_manual_session(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path((user_id, date)): Path<(String, String)>,
    Json(payload): Json<ManualSessionPayload>,
) -> Result<Json<AttendanceDoc>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    let check_in = parse_hhmm(&payload.check_in)?;
    let check_out = payload.check_out.as_deref().map(parse_hhmm).transpose()?;

    let doc = app_state
        .attendance_service
        .add_manual_session(&user_id, &date, check_in, check_out, Utc::now())
        .await?;
    Ok(Json(doc))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditSessionPayload {
    #[serde(default)]
    pub check_in: Option<DateTime<Utc>>,

    // null explícito reabre a sessão; campo ausente mantém o que está.
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<String>)]
    pub check_out: Option<Option<DateTime<Utc>>>,
}

#[utoipa::path(
    patch,
    path = "/api/attendance/{user_id}/{date}/sessions/{session_id}",
    params(("user_id" = String, Path), ("date" = String, Path), ("session_id" = String, Path)),
    request_body = EditSessionPayload,
    responses((status = 200, body = AttendanceDoc), (status = 404, description = "Registro ou sessão inexistente")),
    security(("api_jwt" = [])),
    tag = "Attendance"
)]
pub async fn edit_session(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path((user_id, date, session_id)): Path<(String, String, String)>,
    Json(payload): Json<EditSessionPayload>,
) -> Result<Json<AttendanceDoc>, AppError> {
    let session_id = parse_session_id(&session_id)?;

    let patch = SessionPatch { check_in: payload.check_in, check_out: payload.check_out };
    let doc = app_state
        .attendance_service
        .edit_session(&user_id, &date, &session_id, patch)
        .await?;
    Ok(Json(doc))
}

#[utoipa::path(
    delete,
    path = "/api/attendance/{user_id}/{date}/sessions/{session_id}",
    params(("user_id" = String, Path), ("date" = String, Path), ("session_id" = String, Path)),
    responses((status = 200, body = AttendanceDoc)),
    security(("api_jwt" = [])),
    tag = "Attendance"
)]
pub async fn delete_session(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path((user_id, date, session_id)): Path<(String, String, String)>,
) -> Result<Json<AttendanceDoc>, AppError> {
    let session_id = parse_session_id(&session_id)?;

    let doc = app_state
        .attendance_service
        .delete_session(&user_id, &date, &session_id)
        .await?;
    Ok(Json(doc))
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignRolePayload {
    #[validate(length(min = 1, message = "Vui lòng chọn vai trò!"))]
    pub role_id: String,
}

// Escolha do papel de pagamento de uma sessão: o próprio dono do ponto ou
// o admin em nome dele.
#[utoipa::path(
    post,
    path = "/api/attendance/{user_id}/{date}/sessions/{session_id}/role",
    params(("user_id" = String, Path), ("date" = String, Path), ("session_id" = String, Path)),
    request_body = AssignRolePayload,
    responses((status = 200, body = AttendanceDoc), (status = 422, description = "Papel não configurado")),
    security(("api_jwt" = [])),
    tag = "Attendance"
)]
pub async fn assign_role(
    State(app_state): State<AppState>,
    AuthenticatedUser(current): AuthenticatedUser,
    Path((user_id, date, session_id)): Path<(String, String, String)>,
    Json(payload): Json<AssignRolePayload>,
) -> Result<Json<AttendanceDoc>, AppError> {
    payload.validate().map_err(AppError::ValidationError)?;

    if !current.role.is_admin() && current.id != user_id {
        return Err(AppError::Forbidden);
    }

    let session_id = parse_session_id(&session_id)?;
    let doc = app_state
        .attendance_service
        .assign_role(&user_id, &date, &session_id, &payload.role_id)
        .await?;
    Ok(Json(doc))
}
