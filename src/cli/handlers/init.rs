//! Database initialization handler

use crate::cli::output::print_info;
use crate::cli::output::print_success;
use crate::database::Database;
use crate::AppConfig;
use crate::RagbotError;
use crate::Result;

/// Create the `documents` and `queries` tables
pub async fn handle_init(config: &AppConfig) -> Result<()> {
    if !config.database_enabled() {
        return Err(RagbotError::Config(
            "database.url (or DATABASE_URL) must be set to initialize the schema".to_string(),
        ));
    }

    print_info("🗄️  Initializing ragbot database...");
    let database = Database::from_config(config).await?;

    if database.is_schema_initialized().await? {
        print_info("Schema already initialized");
        return Ok(());
    }

    database.init_schema().await?;
    print_success("Tables documents and queries created");
    Ok(())
}
