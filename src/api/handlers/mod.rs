/// API request handlers
use std::sync::Arc;
use std::time::Instant;

use crate::database::Database;
use crate::rag::RagService;

pub mod health;
pub mod query;

pub use health::healthcheck;
pub use query::generate_query;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub rag: Arc<RagService>,
    /// Audit store; requests are still served when it is absent
    pub database: Option<Arc<Database>>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(rag: Arc<RagService>, database: Option<Arc<Database>>) -> Self {
        Self {
            rag,
            database,
            started_at: Instant::now(),
        }
    }
}
