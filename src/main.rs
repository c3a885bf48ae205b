mod capture_handler;
mod capture_models;
mod config;
mod db;
mod db_storage;
mod errors;
mod handlers;
mod models;
mod scoring;
mod services;
mod webhook_handler;
mod webhook_models;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor, GovernorLayer,
};
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::Database;

/// Main entry point for the application.
///
/// Initializes logging, configuration and the database pool, then wires the
/// HTTP routes and middleware (CORS, rate limiting, body limits) and starts
/// the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ari_platform_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize database connection pool
    let db = Database::new(&config.database_url).await?;
    tracing::info!("Database connection pool established");

    // Build application state
    let app_state = Arc::new(handlers::AppState {
        db: db.pool.clone(),
        config: config.clone(),
    });

    // Configure rate limiter: 10 requests/second per IP, burst of 20
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .key_extractor(SmartIpKeyExtractor)
            .finish()
            .unwrap(),
    );

    // Build API routes with security layers
    let api_routes = Router::new()
        // Voice platform inbound webhook
        .route("/api/webhook", post(webhook_handler::voice_webhook))
        // Public lead capture + landing page data
        .route("/api/leads/capture", post(capture_handler::capture_lead))
        .route("/api/public/campaigns/:id", get(handlers::public_campaign))
        // Auth
        .route("/api/auth/admin/login", post(handlers::admin_login))
        .route("/api/auth/client/login", post(handlers::client_login))
        .route(
            "/api/auth/admin/generate-credentials",
            post(handlers::generate_credentials),
        )
        // Admin: clients
        .route(
            "/api/clients",
            get(handlers::list_clients).post(handlers::create_client),
        )
        .route(
            "/api/clients/:id",
            get(handlers::get_client)
                .put(handlers::update_client)
                .delete(handlers::delete_client),
        )
        .route(
            "/api/clients/:id/ai-receptionist",
            get(handlers::get_receptionist_config).put(handlers::put_receptionist_config),
        )
        .route(
            "/api/clients/:id/booking-accelerator",
            get(handlers::get_booking_config).put(handlers::put_booking_config),
        )
        // Admin: billing
        .route(
            "/api/admin/billing/:id",
            get(handlers::get_billing).post(handlers::upsert_billing),
        )
        // Client portal
        .route("/api/client/dashboard", get(handlers::client_dashboard))
        .route("/api/client/calls", get(handlers::client_calls))
        .route(
            "/api/client/leads",
            get(handlers::client_leads)
                .put(handlers::update_lead)
                .post(handlers::add_lead_note),
        )
        .route(
            "/api/client/lead-gen/campaigns",
            get(handlers::list_campaigns).post(handlers::create_campaign),
        )
        .route(
            "/api/client/lead-gen/campaigns/:id",
            get(handlers::get_campaign)
                .patch(handlers::patch_campaign)
                .delete(handlers::delete_campaign),
        )
        .route(
            "/api/client/lead-gen/campaigns/:id/publish",
            post(handlers::publish_campaign),
        )
        .route(
            "/api/client/lead-gen/campaigns/:id/pause",
            post(handlers::pause_campaign),
        )
        .route(
            "/api/client/knowledge-base",
            get(handlers::get_knowledge_base).post(handlers::put_knowledge_base),
        )
        .route(
            "/api/client/ai-receptionist/activate",
            post(handlers::activate_receptionist),
        )
        .route(
            "/api/client/phone-number",
            get(handlers::list_phone_numbers).post(handlers::purchase_phone_number),
        )
        .layer(
            ServiceBuilder::new()
                // Request size limit: 5MB max payload (prevents memory exhaustion)
                .layer(RequestBodyLimitLayer::new(5 * 1024 * 1024))
                // Rate limiting: 10 req/sec per IP, burst of 20
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    // Build final app with health check (bypasses rate limiting)
    let app = Router::new()
        .route("/health", get(handlers::health))
        .merge(api_routes)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
