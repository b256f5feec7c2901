pub mod error;
pub mod routes;
pub mod state;

use axum::routing::{delete, get, post, put};
use axum::Router;
use std::path::PathBuf;
use tower_http::cors::{Any, CorsLayer};

/// Build the axum Router with all API routes and middleware.
/// Used by `serve()` and available for integration testing.
pub fn build_router(root: PathBuf) -> Router {
    let app_state = state::AppState::new(root);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Workspace
        .route("/api/init", post(routes::init::init_workspace))
        .route("/api/config", get(routes::config::get_config))
        // Templates
        .route("/api/templates", get(routes::templates::list_templates))
        .route("/api/templates", post(routes::templates::create_template))
        .route("/api/templates/{id}", put(routes::templates::update_template))
        .route(
            "/api/templates/{id}",
            delete(routes::templates::delete_template),
        )
        .route(
            "/api/templates/{id}/migrate",
            post(routes::templates::migrate_template),
        )
        // Roster
        .route("/api/roster", get(routes::roster::get_roster))
        .route("/api/staff", post(routes::roster::add_staff))
        .route("/api/personas", post(routes::roster::add_persona))
        .route("/api/assignments", post(routes::roster::assign_persona))
        // Accounts & onboarding
        .route("/api/accounts", get(routes::accounts::list_accounts))
        .route("/api/accounts", post(routes::accounts::create_account))
        .route("/api/accounts/{id}/notify", post(routes::accounts::notify))
        .route(
            "/api/accounts/{id}/begin-binding",
            post(routes::accounts::begin_binding),
        )
        .route(
            "/api/accounts/{id}/confirm-binding",
            post(routes::accounts::confirm_binding),
        )
        .route(
            "/api/accounts/{id}/bind",
            post(routes::accounts::bind_persona),
        )
        // Runbook
        .route("/api/runbook/today", get(routes::runbook::today))
        .route("/api/runbook/matrix", get(routes::runbook::matrix))
        .route(
            "/api/runbook/generate-daily",
            post(routes::runbook::generate_daily),
        )
        // Work tasks
        .route("/api/work-tasks", post(routes::tasks::create_manual_task))
        .route("/api/work-tasks/{id}", put(routes::tasks::update_task))
        .layer(cors)
        .with_state(app_state)
}

/// Start the opsroom API server.
pub async fn serve(root: PathBuf, port: u16) -> anyhow::Result<()> {
    let app = build_router(root);

    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("opsroom API listening on http://localhost:{port}");

    axum::serve(listener, app).await?;
    Ok(())
}
