use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::identity::UserId;
use crate::store::Collection;

/// Result of one cascade step
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub collection: &'static str,
    pub table: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-collection outcome of a cascade. Kept for logs, never sent to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct CascadeReport {
    pub user_id: UserId,
    pub started_at: DateTime<Utc>,
    pub steps: Vec<StepOutcome>,
}

impl CascadeReport {
    pub fn new(user_id: UserId) -> Self {
        Self {
            user_id,
            started_at: Utc::now(),
            steps: Vec::new(),
        }
    }

    pub fn record(&mut self, collection: &Collection, error: Option<String>) {
        self.steps.push(StepOutcome {
            collection: collection.label,
            table: collection.table,
            error,
        });
    }

    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps.iter().filter(|s| !s.succeeded())
    }

    pub fn failed_count(&self) -> usize {
        self.failures().count()
    }

    pub fn is_clean(&self) -> bool {
        self.failed_count() == 0
    }

    /// Comma-separated labels of failed collections, or "none"
    pub fn failed_labels(&self) -> String {
        let labels: Vec<_> = self.failures().map(|s| s.collection).collect();
        if labels.is_empty() {
            "none".to_string()
        } else {
            labels.join(",")
        }
    }

    /// Single-line JSON form for log fields
    pub fn to_log_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|e| format!("{{\"unserializable\":\"{}\"}}", e))
    }
}
