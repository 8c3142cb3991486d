// src/handlers/report.rs
//
// Bảng công (quadro mensal de chips) e o fechamento de salário do admin.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::auth::{AdminOnly, AuthenticatedUser, RequireRole},
    models::{
        report::{MonthlyReport, RoleFilter, SalarySummary},
        salary::{CriterionInfo, EvaluationEntry, SalarySheet, criteria_info},
    },
};

// Os dez critérios fixos da folha de avaliação (rótulos e modelos de nota).
#[utoipa::path(
    get,
    path = "/api/reports/evaluation-criteria",
    responses((status = 200, body = [CriterionInfo])),
    security(("api_jwt" = [])),
    tag = "Reports"
)]
pub async fn evaluation_criteria() -> Json<Vec<CriterionInfo>> {
    Json(criteria_info())
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct StaffQuery {
    // Admin escolhe o funcionário; os demais só enxergam o próprio quadro.
    pub staff: Option<String>,
}

fn resolve_staff(
    current: &crate::models::auth::User,
    requested: Option<String>,
) -> Result<String, AppError> {
    match requested {
        Some(staff_id) if staff_id != current.id => {
            if current.role.is_admin() {
                Ok(staff_id)
            } else {
                Err(AppError::Forbidden)
            }
        }
        _ => Ok(current.id.clone()),
    }
}

#[utoipa::path(
    get,
    path = "/api/reports/{month}",
    params(("month" = String, Path, description = "YYYY-MM"), StaffQuery),
    responses((status = 200, body = MonthlyReport)),
    security(("api_jwt" = [])),
    tag = "Reports"
)]
pub async fn monthly_report(
    State(app_state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Path(month): Path<String>,
    Query(query): Query<StaffQuery>,
) -> Result<Json<MonthlyReport>, AppError> {
    let staff_id = resolve_staff(&user, query.staff)?;
    let report = app_state
        .report_service
        .monthly_report(&staff_id, &month, Utc::now())
        .await?;
    Ok(Json(report))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct SalaryQuery {
    pub staff: String,
    #[serde(default)]
    pub filter: Option<RoleFilter>,
}

#[utoipa::path(
    get,
    path = "/api/reports/{month}/salary",
    params(("month" = String, Path, description = "YYYY-MM"), SalaryQuery),
    responses((status = 200, body = SalarySummary)),
    security(("api_jwt" = [])),
    tag = "Reports"
)]
pub async fn salary_summary(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path(month): Path<String>,
    Query(query): Query<SalaryQuery>,
) -> Result<Json<SalarySummary>, AppError> {
    let summary = app_state
        .report_service
        .salary_summary(
            &query.staff,
            &month,
            query.filter.unwrap_or_default(),
            Utc::now(),
        )
        .await?;
    Ok(Json(summary))
}

#[utoipa::path(
    get,
    path = "/api/reports/{month}/{staff_id}/sheet",
    params(("month" = String, Path), ("staff_id" = String, Path)),
    responses((status = 200, body = SalarySheet)),
    security(("api_jwt" = [])),
    tag = "Reports"
)]
pub async fn get_salary_sheet(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path((month, staff_id)): Path<(String, String)>,
) -> Result<Json<SalarySheet>, AppError> {
    let sheet = app_state
        .salary_repo
        .get(&month, &staff_id)
        .await?
        .unwrap_or_else(|| SalarySheet::empty(&staff_id, &month));
    Ok(Json(sheet))
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaveSheetPayload {
    #[serde(default)]
    pub advance: f64,
    #[serde(default)]
    pub evaluation: Vec<EvaluationEntry>,
}

// Folha de avaliação do mês: dez critérios com valor assinado e nota.
#[utoipa::path(
    put,
    path = "/api/reports/{month}/{staff_id}/sheet",
    params(("month" = String, Path), ("staff_id" = String, Path)),
    request_body = SaveSheetPayload,
    responses((status = 200, body = SalarySheet)),
    security(("api_jwt" = [])),
    tag = "Reports"
)]
pub async fn save_salary_sheet(
    State(app_state): State<AppState>,
    _guard: RequireRole<AdminOnly>,
    Path((month, staff_id)): Path<(String, String)>,
    Json(payload): Json<SaveSheetPayload>,
) -> Result<Json<SalarySheet>, AppError> {
    crate::common::time::month_date_keys(&month)?;

    let sheet = SalarySheet {
        staff_id,
        month,
        advance: payload.advance,
        evaluation: payload.evaluation,
    };

    app_state.salary_repo.upsert(&sheet).await?;
    Ok(Json(sheet))
}
