use uuid::Uuid;

use super::sha256_hex;
use super::Database;
use crate::models::CreateDocumentRequest;
use crate::models::Document;
use crate::models::InsertOutcome;
use crate::Result;

impl Database {
    /// Record a document. Content is unique by hash, so re-recording is a no-op.
    pub async fn create_document(&self, request: CreateDocumentRequest) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r"
            INSERT INTO documents (id, content, content_hash, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            ON CONFLICT (content_hash) DO NOTHING
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&request.content)
        .bind(sha256_hex(&request.content))
        .execute(&self.pool)
        .await?;

        Ok(InsertOutcome::from_rows_affected(result.rows_affected()))
    }

    /// Get a document by its content
    pub async fn get_document_by_content(&self, content: &str) -> Result<Option<Document>> {
        let document = sqlx::query_as::<_, Document>(
            "SELECT id, content, created_at, updated_at FROM documents WHERE content_hash = $1",
        )
        .bind(sha256_hex(content))
        .fetch_optional(&self.pool)
        .await?;

        Ok(document)
    }

    /// Count recorded documents
    pub async fn count_documents(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
