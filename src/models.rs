use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use sqlx::FromRow;

/// Source material recorded for audit
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub id: String,
    pub content: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A submitted question recorded for audit
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Query {
    pub id: String,
    pub text: String,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Create document request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDocumentRequest {
    pub content: String,
}

/// Create query request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateQueryRequest {
    pub text: String,
}

/// Outcome of an insert into a table with a unique text column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Created,
    AlreadyExists,
}

impl InsertOutcome {
    pub(crate) const fn from_rows_affected(rows: u64) -> Self {
        if rows == 0 {
            Self::AlreadyExists
        } else {
            Self::Created
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_outcome_from_rows() {
        assert_eq!(InsertOutcome::from_rows_affected(0), InsertOutcome::AlreadyExists);
        assert_eq!(InsertOutcome::from_rows_affected(1), InsertOutcome::Created);
    }

    #[test]
    fn test_document_serializes_with_timestamps() {
        let doc = Document {
            id: "doc-1".to_string(),
            content: "hello".to_string(),
            created_at: Some(Utc::now()),
            updated_at: None,
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["content"], "hello");
        assert!(json["updated_at"].is_null());
    }
}
