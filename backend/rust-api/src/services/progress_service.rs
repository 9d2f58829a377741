use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Collection, Database};
use validator::Validate;

use crate::error::ApiError;
use crate::models::progress::{LearnerProgress, UpdateProgressRequest};
use crate::models::CurriculumCapsule;

/// Tracks per-capsule completion. One document per (learner, capsule) pair,
/// upserted on every update.
pub struct ProgressService {
    mongo: Database,
}

impl ProgressService {
    pub fn new(mongo: Database) -> Self {
        Self { mongo }
    }

    fn progress(&self) -> Collection<LearnerProgress> {
        self.mongo.collection("learning_progress")
    }

    pub async fn update(
        &self,
        learner_id: &str,
        capsule_id: &str,
        req: &UpdateProgressRequest,
    ) -> Result<LearnerProgress, ApiError> {
        req.validate()?;

        let capsules: Collection<CurriculumCapsule> = self.mongo.collection("capsules");
        capsules
            .find_one(doc! { "_id": capsule_id })
            .await?
            .ok_or_else(|| ApiError::not_found("capsule", capsule_id))?;

        let document_id = LearnerProgress::document_id(learner_id, capsule_id);
        let now = Utc::now();

        let existing = self.progress().find_one(doc! { "_id": &document_id }).await?;

        let record = if let Some(mut progress) = existing {
            // Completion never regresses; time only accumulates.
            progress.completion_percentage =
                progress.completion_percentage.max(req.completion_percentage);
            progress.time_spent += req.time_spent_delta;
            progress.is_completed = progress.completion_percentage >= 100;
            progress.last_accessed = now;
            progress
        } else {
            LearnerProgress {
                id: document_id.clone(),
                learner_id: learner_id.to_string(),
                capsule_id: capsule_id.to_string(),
                completion_percentage: req.completion_percentage,
                time_spent: req.time_spent_delta,
                is_completed: req.completion_percentage >= 100,
                started_at: now,
                last_accessed: now,
            }
        };

        self.progress()
            .replace_one(doc! { "_id": &document_id }, &record)
            .with_options(
                mongodb::options::ReplaceOptions::builder()
                    .upsert(true)
                    .build(),
            )
            .await?;

        tracing::debug!(
            "Progress updated for {}: {}% (completed={})",
            document_id,
            record.completion_percentage,
            record.is_completed
        );
        Ok(record)
    }

    pub async fn list_for_learner(
        &self,
        learner_id: &str,
    ) -> Result<Vec<LearnerProgress>, ApiError> {
        let cursor = self
            .progress()
            .find(doc! { "learner_id": learner_id })
            .sort(doc! { "last_accessed": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }
}
