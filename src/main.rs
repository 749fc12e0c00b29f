//! Note pool backend
//!
//! Anonymous note sharing over SQLite: random visible notes, likes, reports
//! with automatic hiding, and a password-gated moderation panel.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod models;
mod moderation;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting note pool backend");
    tracing::info!("Public dir: {:?}", config.public_dir);
    tracing::info!("Bind address: {}", config.bind_addr);
    tracing::info!(
        tags = config.features.tags,
        report_reset = config.features.report_reset,
        require_title = config.features.require_title,
        "Features"
    );

    if config.admin_password.is_none() {
        tracing::warn!("No admin password configured (ADMIN_PASSWORD). Admin routes are locked!");
    }

    // Initialize database
    let pool = db::init_database(&config.database_url).await?;
    let repo = Arc::new(Repository::new(pool));

    let state = AppState {
        repo,
        config: Arc::new(config.clone()),
    };

    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let features = state.config.features.clone();
    let admin_password = state.config.admin_password.clone();
    let public_dir = state.config.public_dir.clone();

    // Admin routes
    let mut admin_routes = Router::new()
        .route("/admin/data", get(api::admin_data))
        .route("/admin/toggleHidden", post(api::toggle_hidden))
        .route("/admin/delete", post(api::delete_note));
    if features.tags {
        admin_routes = admin_routes.route("/admin/updateTags", post(api::update_tags));
    }
    if features.report_reset {
        admin_routes = admin_routes.route("/admin/resetReports", post(api::reset_reports));
    }
    let admin_routes = admin_routes.layer(middleware::from_fn(move |req, next| {
        auth::admin_auth_layer(admin_password.clone(), req, next)
    }));

    // Public routes
    let public_routes = Router::new()
        .route("/health", get(health_check))
        .route("/submit", post(api::submit_note))
        .route("/random", get(api::random_note))
        .route("/count", get(api::count_notes))
        .route("/like", post(api::like_note))
        .route("/report", post(api::report_note))
        .route("/feedback", post(api::submit_feedback));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .route_service("/admin", ServeFile::new(public_dir.join("admin.html")))
        .fallback_service(ServeDir::new(public_dir))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.repo.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "ok": true }))),
        Err(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "ok": false })),
        ),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                tracing::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

#[cfg(test)]
mod tests;
