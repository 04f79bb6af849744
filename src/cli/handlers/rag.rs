//! Pipeline handlers: one-shot questions and index builds

use tracing::warn;

use crate::cli::output::print_info;
use crate::cli::output::print_sources;
use crate::cli::output::print_success;
use crate::cli::output::print_warning;
use crate::database::Database;
use crate::models::CreateDocumentRequest;
use crate::models::InsertOutcome;
use crate::rag::RagService;
use crate::AppConfig;
use crate::Result;

/// Answer a question once and print it
pub async fn handle_ask(config: &AppConfig, question: &str, show_sources: bool) -> Result<()> {
    let service = RagService::new(config)?;

    print_info(&format!("🤔 {question}"));
    let response = service.query(question).await?;

    println!("\n{}\n", response.answer);
    if show_sources {
        print_sources(&response.sources);
    }
    Ok(())
}

/// Build the index and record the loaded documents for audit
pub async fn handle_index(config: &AppConfig) -> Result<()> {
    let service = RagService::new(config)?;

    print_info(&format!(
        "📚 Indexing documents from {}",
        service.documents_dir().display()
    ));
    let report = service.build_index().await?;
    print_success(&format!(
        "Indexed {} documents into {} chunks (dimension {}) at {}",
        report.documents.len(),
        report.index.len(),
        report.index.dimension(),
        service.index_path().display()
    ));

    if !config.database_enabled() {
        print_warning("No database configured; documents were not recorded");
        return Ok(());
    }

    let database = Database::from_config(config).await?;
    database.verify_schema_or_error().await?;

    let mut created = 0usize;
    let mut failed = 0usize;
    for document in &report.documents {
        let request = CreateDocumentRequest {
            content: document.text.clone(),
        };
        match database.create_document(request).await {
            Ok(InsertOutcome::Created) => created += 1,
            Ok(InsertOutcome::AlreadyExists) => {}
            Err(e) => {
                warn!("Failed to record document {}: {}", document.source, e);
                failed += 1;
            }
        }
    }
    print_success(&format!(
        "Recorded {created} new documents ({} already known)",
        report.documents.len() - created - failed
    ));
    if failed > 0 {
        print_warning(&format!("{failed} documents could not be recorded, see the log"));
    }

    Ok(())
}
