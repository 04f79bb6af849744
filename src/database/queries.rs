use uuid::Uuid;

use super::sha256_hex;
use super::Database;
use crate::models::CreateQueryRequest;
use crate::models::InsertOutcome;
use crate::models::Query;
use crate::Result;

impl Database {
    /// Record a submitted question. Text is unique by hash, so repeats are a no-op.
    pub async fn create_query(&self, request: CreateQueryRequest) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r"
            INSERT INTO queries (id, text, text_hash, created_at, updated_at)
            VALUES ($1, $2, $3, NOW(), NOW())
            ON CONFLICT (text_hash) DO NOTHING
            ",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(&request.text)
        .bind(sha256_hex(&request.text))
        .execute(&self.pool)
        .await?;

        Ok(InsertOutcome::from_rows_affected(result.rows_affected()))
    }

    /// Get a recorded question by its text
    pub async fn get_query_by_text(&self, text: &str) -> Result<Option<Query>> {
        let query = sqlx::query_as::<_, Query>(
            "SELECT id, text, created_at, updated_at FROM queries WHERE text_hash = $1",
        )
        .bind(sha256_hex(text))
        .fetch_optional(&self.pool)
        .await?;

        Ok(query)
    }
}
