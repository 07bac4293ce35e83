//! FBA Profit API Server
//!
//! Profitability calculator for Amazon FBA sellers with per-user saved
//! scenarios and free-tier usage quotas, behind passwordless sign-in.
//! Uses hexagonal (ports & adapters) architecture for clean separation of concerns.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use sea_orm::{Database, DatabaseConnection};
use serde::Serialize;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::PeerIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod adapters;
mod app;
mod auth;
mod config;
mod domain;
mod entity;
mod error;
mod handlers;

#[cfg(test)]
mod test_utils;


use adapters::{
    PostgresProfileRepository, PostgresScenarioRepository, PostgresUsageRepository,
    SupabaseAuthClient,
};
use app::{AuthService, CalculatorService, ScenarioService, UsageService};
use config::Config;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService<SupabaseAuthClient>>,
    pub usage_service: Arc<UsageService<PostgresProfileRepository, PostgresUsageRepository>>,
    pub calculator_service:
        Arc<CalculatorService<PostgresProfileRepository, PostgresUsageRepository>>,
    pub scenario_service:
        Arc<ScenarioService<PostgresProfileRepository, PostgresScenarioRepository>>,
}

impl AppState {
    /// Wire adapters and services. The identity client is only created when
    /// the identity service is configured.
    pub fn new(db: DatabaseConnection, config: &Config) -> Self {
        let profile_repo = Arc::new(PostgresProfileRepository::new(db.clone()));
        let usage_repo = Arc::new(PostgresUsageRepository::new(db.clone()));
        let scenario_repo = Arc::new(PostgresScenarioRepository::new(db));

        let identity = match (&config.supabase_url, &config.supabase_anon_key) {
            (Some(url), Some(key)) => Some(Arc::new(SupabaseAuthClient::new(
                url.clone(),
                key.clone(),
            ))),
            _ => None,
        };

        let usage_service = Arc::new(UsageService::new(profile_repo.clone(), usage_repo));

        Self {
            auth_service: Arc::new(AuthService::new(identity, config.auth_redirect_url())),
            calculator_service: Arc::new(CalculatorService::new(usage_service.clone())),
            usage_service,
            scenario_service: Arc::new(ScenarioService::new(profile_repo, scenario_repo)),
        }
    }
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Build the HTTP router
pub fn build_router(state: AppState) -> anyhow::Result<Router> {
    // Rate limiting config: 2 req/sec sustained, burst of 5
    // Uses PeerIpKeyExtractor to get client IP from socket connection
    let governor_config = Arc::new(
        GovernorConfigBuilder::default()
            .key_extractor(PeerIpKeyExtractor)
            .per_second(2)
            .burst_size(5)
            .finish()
            .context("Failed to build governor config")?,
    );

    // Rate-limited routes (sign-in link emails)
    let rate_limited_routes = Router::new()
        .route("/auth/request-link", post(handlers::request_link))
        .layer(GovernorLayer {
            config: governor_config,
        });

    let protected_routes = Router::new()
        .route("/me", get(handlers::me))
        .route("/auth/signout", post(handlers::sign_out))
        .route("/calculate", post(handlers::calculate))
        .route("/usage", get(handlers::usage))
        .route(
            "/scenarios",
            get(handlers::list_scenarios).post(handlers::save_scenario),
        )
        .route(
            "/scenarios/:id",
            get(handlers::get_scenario)
                .patch(handlers::rename_scenario)
                .delete(handlers::delete_scenario),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::session_middleware,
        ));

    Ok(Router::new()
        // Public
        .route("/health", get(health))
        .route("/plans", get(handlers::list_plans))
        .route("/auth/callback", get(handlers::callback))
        .merge(rate_limited_routes)
        .merge(protected_routes)
        // Middleware
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,fba_profit_api=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting FBA Profit API...");

    let config = Config::from_env()?;

    if !config.identity_enabled() {
        tracing::warn!(
            "SUPABASE_URL/SUPABASE_ANON_KEY not set; authenticated routes will return 503"
        );
    }

    // Connect to PostgreSQL
    tracing::info!("Connecting to database...");
    let db = Database::connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    let state = AppState::new(db, &config);
    let app = build_router(state)?;

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .context("Server error")?;

    Ok(())
}
