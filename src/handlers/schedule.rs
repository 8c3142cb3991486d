// src/handlers/schedule.rs

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{AuthenticatedUser, RequireRole, SchedulerOnly},
    models::schedule::{ScheduleDay, Section},
};

#[derive(Debug, Serialize, ToSchema)]
pub struct ScheduleResponse {
    pub date: String,
    // true quando o dia não tem agenda própria e veio do modelo herdado do
    // mesmo dia da semana.
    pub inherited: bool,
    pub schedule: ScheduleDay,
}

#[utoipa::path(
    get,
    path = "/api/schedules/{date}",
    params(("date" = String, Path, description = "YYYY-MM-DD")),
    responses((status = 200, body = ScheduleResponse)),
    security(("api_jwt" = [])),
    tag = "Schedule"
)]
pub async fn get_schedule(
    State(app_state): State<AppState>,
    _user: AuthenticatedUser,
    Path(date): Path<String>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let (schedule, inherited) = app_state.schedule_service.get_schedule(&date).await?;
    Ok(Json(ScheduleResponse { date, inherited, schedule }))
}

// Grava o dia inteiro (as edições de linha do admin salvam o documento
// completo, como a tela faz desde sempre).
#[utoipa::path(
    put,
    path = "/api/schedules/{date}",
    params(("date" = String, Path, description = "YYYY-MM-DD")),
    request_body = ScheduleDay,
    responses((status = 200, body = ScheduleResponse)),
    security(("api_jwt" = [])),
    tag = "Schedule"
)]
pub async fn save_schedule(
    State(app_state): State<AppState>,
    _guard: RequireRole<SchedulerOnly>,
    Path(date): Path<String>,
    Json(schedule): Json<ScheduleDay>,
) -> Result<Json<ScheduleResponse>, AppError> {
    app_state.schedule_service.save_schedule(&date, &schedule).await?;
    Ok(Json(ScheduleResponse { date, inherited: false, schedule }))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterClassPayload {
    pub section: Section,
    pub row_index: usize,
    // Fim da aula como a tela mostrou (HH:mm); o registro fecha quando a
    // aula termina.
    #[serde(default)]
    pub end: Option<String>,
}

// Toggle de "nhận lớp": registra ou cancela o registro do professor na
// linha. Dia sem agenda própria é materializado do modelo na mesma
// transação.
#[utoipa::path(
    post,
    path = "/api/schedules/{date}/register",
    params(("date" = String, Path, description = "YYYY-MM-DD")),
    request_body = RegisterClassPayload,
    responses(
        (status = 200, body = ScheduleResponse),
        (status = 404, description = "Linha inexistente"),
        (status = 422, description = "Aula já encerrada"),
    ),
    security(("api_jwt" = [])),
    tag = "Schedule"
)]
pub async fn register_class(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(date): Path<String>,
    Json(payload): Json<RegisterClassPayload>,
) -> Result<Json<ScheduleResponse>, AppError> {
    let now = Utc::now();

    // Política de janela aplicada aqui, fora do gerente: a tela manda o
    // horário de fim que exibiu para o usuário.
    if let Some(end) = payload.end.as_deref().filter(|e| !e.is_empty()) {
        app_state.schedule_service.ensure_not_ended(&date, end, now)?;
    }

    let schedule = app_state
        .schedule_service
        .register_class(&date, payload.section, payload.row_index, &user, now)
        .await?;

    Ok(Json(ScheduleResponse { date, inherited: false, schedule }))
}
