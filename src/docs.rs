// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::login,
        handlers::auth::get_me,

        // --- Attendance ---
        handlers::attendance::check_in,
        handlers::attendance::check_out,
        handlers::attendance::today,
        handlers::attendance::add_manual_session,
        handlers::attendance::edit_session,
        handlers::attendance::delete_session,
        handlers::attendance::assign_role,

        // --- Schedule ---
        handlers::schedule::get_schedule,
        handlers::schedule::save_schedule,
        handlers::schedule::register_class,

        // --- Reports ---
        handlers::report::evaluation_criteria,
        handlers::report::monthly_report,
        handlers::report::salary_summary,
        handlers::report::get_salary_sheet,
        handlers::report::save_salary_sheet,

        // --- Personnel ---
        handlers::personnel::list_staff,
        handlers::personnel::create_staff,
        handlers::personnel::update_staff,
        handlers::personnel::delete_staff,
        handlers::personnel::set_salary_config,

        // --- Settings ---
        handlers::settings::get_system_settings,
        handlers::settings::update_system_settings,

        // --- Dashboard ---
        handlers::dashboard::stats,

        // --- Maintenance ---
        handlers::maintenance::scan,
        handlers::maintenance::purge,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::LoginPayload,
            models::auth::AuthResponse,

            // --- Attendance ---
            models::attendance::SessionKind,
            models::attendance::WorkSession,
            models::attendance::AttendanceDoc,
            handlers::attendance::ManualSessionPayload,
            handlers::attendance::EditSessionPayload,
            handlers::attendance::AssignRolePayload,

            // --- Schedule ---
            models::schedule::Section,
            models::schedule::TeacherRegistration,
            models::schedule::ClassRow,
            models::schedule::ScheduleDay,
            handlers::schedule::ScheduleResponse,
            handlers::schedule::RegisterClassPayload,

            // --- Salary / Reports ---
            models::salary::SalaryRole,
            models::salary::SalaryConfig,
            models::salary::CriterionInfo,
            models::salary::EvaluationEntry,
            models::salary::SalarySheet,
            models::report::ChipStyle,
            models::report::Chip,
            models::report::DayReport,
            models::report::MonthlyReport,
            models::report::RoleFilter,
            models::report::SalarySummary,
            handlers::report::SaveSheetPayload,

            // --- Personnel ---
            handlers::personnel::CreateStaffPayload,
            handlers::personnel::UpdateStaffPayload,
            handlers::personnel::SalaryConfigPayload,

            // --- Settings ---
            models::settings::SystemSettings,

            // --- Dashboard ---
            models::dashboard::ActivityEntry,
            models::dashboard::DashboardStats,

            // --- Maintenance ---
            handlers::maintenance::ScanPayload,
            handlers::maintenance::ScanResponse,
            handlers::maintenance::PurgePayload,
            handlers::maintenance::PurgeResponse,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e perfil"),
        (name = "Attendance", description = "Chấm công: check-in/out e correções"),
        (name = "Schedule", description = "Agenda do dia e registro de aulas"),
        (name = "Reports", description = "Bảng công e fechamento de salário"),
        (name = "Personnel", description = "Gestão de pessoal"),
        (name = "Settings", description = "Configurações globais"),
        (name = "Dashboard", description = "Indicadores do painel"),
        (name = "Maintenance", description = "Retenção de dados"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }
}
