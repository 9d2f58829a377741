use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Per-capsule completion state. The document id is the composite
/// "{learner_id}:{capsule_id}" so each visit is an upsert on one row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LearnerProgress {
    #[serde(rename = "_id")]
    pub id: String,
    pub learner_id: String,
    pub capsule_id: String,
    pub completion_percentage: u32,
    /// Accumulated time in minutes.
    pub time_spent: u32,
    pub is_completed: bool,
    pub started_at: DateTime<Utc>,
    pub last_accessed: DateTime<Utc>,
}

impl LearnerProgress {
    pub fn document_id(learner_id: &str, capsule_id: &str) -> String {
        format!("{}:{}", learner_id, capsule_id)
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProgressRequest {
    #[validate(range(min = 0, max = 100))]
    pub completion_percentage: u32,
    /// Minutes spent since the last update.
    #[serde(default)]
    pub time_spent_delta: u32,
}
