//! API server handler

use crate::api::serve_api;
use crate::AppConfig;
use crate::Result;

/// CLI flags override the `[server]` section
pub async fn handle_serve(
    config: &AppConfig,
    host: Option<String>,
    port: Option<u16>,
    cors: bool,
) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let cors = cors || config.server.enable_cors;

    println!("🚀 Starting ragbot API Server");
    println!("=============================\n");
    println!("📍 Host: {host}");
    println!("🔌 Port: {port}");
    println!("🌐 CORS: {}", if cors { "Enabled" } else { "Disabled" });
    println!("📂 Documents: {}", config.rag.documents_dir.display());
    println!();

    serve_api(config, host, port, cors).await
}
