//! HTTP server implementation

use std::sync::Arc;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing::warn;

use crate::api::auth::ApiKeyState;
use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::database::Database;
use crate::rag::RagService;
use crate::Result;

/// Build the full application: routes plus tracing, compression and optional CORS
pub fn build_app(state: AppState, auth: ApiKeyState, prefix: &str, enable_cors: bool) -> Router {
    let mut app = routes::api_routes(state, auth, prefix)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if enable_cors {
        info!("CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    app
}

/// Start the API server
pub async fn serve_api(
    config: &AppConfig,
    host: String,
    port: u16,
    enable_cors: bool,
) -> Result<()> {
    info!("Starting ragbot API server...");

    let rag = Arc::new(RagService::new(config)?);
    let database = if config.database_enabled() {
        let database = Database::from_config(config).await?;
        database.verify_schema_or_error().await?;
        Some(Arc::new(database))
    } else {
        warn!("No database configured; queries will not be recorded");
        None
    };

    let state = AppState::new(rag, database);
    let auth = ApiKeyState::new(config.auth.write_secret.clone());
    let prefix = config.server.route_prefix.as_str();
    let app = build_app(state, auth, prefix, enable_cors);

    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET  /healthcheck                  - Health check");
    info!("  POST {}/generate/query  - Answer a query (x-api-key)", prefix);
    if !prefix.starts_with("/api") {
        info!("  POST /api{}/generate/query", prefix);
    }
    info!(
        "Documents: {}, index: {}",
        config.rag.documents_dir.display(),
        config.rag.index_path.display()
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
