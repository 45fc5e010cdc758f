use crate::model::{generate_id, Id};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only record of a write operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: Id,
    pub action: String,
    pub subject: String,
    pub subject_id: Id,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    pub fn new(
        action: &str,
        subject: &str,
        subject_id: Id,
        detail: Option<serde_json::Value>,
    ) -> Self {
        Self {
            id: generate_id(),
            action: action.to_string(),
            subject: subject.to_string(),
            subject_id,
            detail,
            created_at: Utc::now(),
        }
    }
}
