//src/main.rs

use axum::{
    Router,
    middleware as axum_middleware,
    routing::{get, post},
};
use tokio::net::TcpListener;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::AppState;
use crate::middleware::auth::auth_guard;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é aceitável aqui: se a configuração falhar, a aplicação não
    // deve iniciar.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .expect("Falha ao rodar as migrações do banco de dados.");

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    // Rotas públicas de autenticação
    let auth_routes = Router::new().route("/login", post(handlers::auth::login));

    // Perfil do usuário autenticado
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Ponto pessoal + correções administrativas
    let attendance_routes = Router::new()
        .route("/check-in", post(handlers::attendance::check_in))
        .route("/check-out", post(handlers::attendance::check_out))
        .route("/today", get(handlers::attendance::today))
        .route(
            "/{user_id}/{date}/sessions",
            post(handlers::attendance::add_manual_session),
        )
        .route(
            "/{user_id}/{date}/sessions/{session_id}",
            axum::routing::patch(handlers::attendance::edit_session)
                .delete(handlers::attendance::delete_session),
        )
        .route(
            "/{user_id}/{date}/sessions/{session_id}/role",
            post(handlers::attendance::assign_role),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Agenda do dia + registro de aulas
    let schedule_routes = Router::new()
        .route(
            "/{date}",
            get(handlers::schedule::get_schedule).put(handlers::schedule::save_schedule),
        )
        .route("/{date}/register", post(handlers::schedule::register_class))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Bảng công + fechamento de salário
    let report_routes = Router::new()
        .route(
            "/evaluation-criteria",
            get(handlers::report::evaluation_criteria),
        )
        .route("/{month}", get(handlers::report::monthly_report))
        .route("/{month}/salary", get(handlers::report::salary_summary))
        .route(
            "/{month}/{staff_id}/sheet",
            get(handlers::report::get_salary_sheet).put(handlers::report::save_salary_sheet),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let personnel_routes = Router::new()
        .route(
            "/",
            get(handlers::personnel::list_staff).post(handlers::personnel::create_staff),
        )
        .route(
            "/{id}",
            axum::routing::put(handlers::personnel::update_staff)
                .delete(handlers::personnel::delete_staff),
        )
        .route(
            "/{id}/salary-config",
            axum::routing::put(handlers::personnel::set_salary_config),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let settings_routes = Router::new()
        .route(
            "/system",
            get(handlers::settings::get_system_settings)
                .put(handlers::settings::update_system_settings),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let dashboard_routes = Router::new()
        .route("/stats", get(handlers::dashboard::stats))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    let maintenance_routes = Router::new()
        .route("/scan", post(handlers::maintenance::scan))
        .route("/purge", post(handlers::maintenance::purge))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    let app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/attendance", attendance_routes)
        .nest("/api/schedules", schedule_routes)
        .nest("/api/reports", report_routes)
        .nest("/api/personnel", personnel_routes)
        .nest("/api/settings", settings_routes)
        .nest("/api/dashboard", dashboard_routes)
        .nest("/api/maintenance", maintenance_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()))
        .with_state(app_state);

    // Inicia o servidor
    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!(
        "🚀 Servidor escutando em {}",
        listener.local_addr().expect("listener sem endereço local")
    );
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
