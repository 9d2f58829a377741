use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationType {
    Revision,
    Practice,
    NextLesson,
    Mastery,
    Simplified,
}

/// Pathway suggestion persisted per instance. Dismissal marks the instance;
/// a fresh qualifying attempt may later create a new instance for the same
/// (learner, type, capsule) triple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    #[serde(rename = "_id")]
    pub id: String,
    pub learner_id: String,
    pub capsule_id: String,
    pub capsule_title: String,
    pub capsule_subject: String,
    pub recommendation_type: RecommendationType,
    pub reason: String,
    pub priority: i32,
    pub dismissed: bool,
    #[serde(default)]
    pub dismissed_at: Option<DateTime<Utc>>,
    /// Timestamp of the attempt that triggered this instance.
    pub source_attempt_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Recommendation {
    /// Idempotent: dismissing an already-dismissed recommendation is a no-op.
    pub fn dismiss(&mut self, now: DateTime<Utc>) {
        if !self.dismissed {
            self.dismissed = true;
            self.dismissed_at = Some(now);
        }
    }
}

/// Per-subject skill classification, monotonic in average score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyLevel {
    Beginner,
    Intermediate,
    Advanced,
    Mastery,
}

impl DifficultyLevel {
    /// One step down, used to avoid over-confident leveling from too few
    /// attempts.
    pub fn demoted(self) -> Self {
        match self {
            DifficultyLevel::Mastery => DifficultyLevel::Advanced,
            DifficultyLevel::Advanced => DifficultyLevel::Intermediate,
            DifficultyLevel::Intermediate | DifficultyLevel::Beginner => {
                DifficultyLevel::Beginner
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentPerformance {
    pub total_quizzes_taken: u64,
    pub quizzes_passed: u64,
    pub pass_rate: f64,
    pub average_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectScore {
    pub subject: String,
    pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct RecommendationView {
    pub id: String,
    pub recommendation_type: RecommendationType,
    pub capsule: String,
    pub capsule_title: String,
    pub capsule_subject: String,
    pub reason: String,
}

impl From<&Recommendation> for RecommendationView {
    fn from(rec: &Recommendation) -> Self {
        Self {
            id: rec.id.clone(),
            recommendation_type: rec.recommendation_type,
            capsule: rec.capsule_id.clone(),
            capsule_title: rec.capsule_title.clone(),
            capsule_subject: rec.capsule_subject.clone(),
            reason: rec.reason.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevisionItem {
    pub capsule: String,
    pub capsule_title: String,
}

#[derive(Debug, Serialize)]
pub struct NextLesson {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub grade: String,
}

#[derive(Debug, Serialize)]
pub struct SubjectLevel {
    pub subject_name: String,
    pub current_level: DifficultyLevel,
    pub average_score: f64,
    pub total_attempts: u32,
}

#[derive(Debug, Serialize)]
pub struct PathwaySnapshot {
    pub current_performance: CurrentPerformance,
    pub strengths: Vec<SubjectScore>,
    pub weaknesses: Vec<SubjectScore>,
    pub recommendations: Vec<RecommendationView>,
    pub revision_needed: Vec<RevisionItem>,
    pub next_lessons: Vec<NextLesson>,
    pub difficulty_levels: Vec<SubjectLevel>,
}

#[derive(Debug, Deserialize)]
pub struct PathwayQuery {
    pub subject: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DismissRecommendationRequest {
    pub recommendation_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeAttemptRequest {
    pub attempt_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dismiss_is_idempotent() {
        let mut rec = Recommendation {
            id: "r1".to_string(),
            learner_id: "l1".to_string(),
            capsule_id: "c1".to_string(),
            capsule_title: "Fractions".to_string(),
            capsule_subject: "Mathematics".to_string(),
            recommendation_type: RecommendationType::Revision,
            reason: "low score".to_string(),
            priority: 1,
            dismissed: false,
            dismissed_at: None,
            source_attempt_at: Utc::now(),
            created_at: Utc::now(),
        };

        rec.dismiss(Utc::now());
        let first_dismissed_at = rec.dismissed_at;
        assert!(rec.dismissed);

        rec.dismiss(Utc::now());
        assert!(rec.dismissed);
        assert_eq!(rec.dismissed_at, first_dismissed_at);
    }

    #[test]
    fn difficulty_levels_order_monotonically() {
        assert!(DifficultyLevel::Beginner < DifficultyLevel::Intermediate);
        assert!(DifficultyLevel::Intermediate < DifficultyLevel::Advanced);
        assert!(DifficultyLevel::Advanced < DifficultyLevel::Mastery);
    }

    #[test]
    fn demotion_bottoms_out_at_beginner() {
        assert_eq!(
            DifficultyLevel::Mastery.demoted(),
            DifficultyLevel::Advanced
        );
        assert_eq!(
            DifficultyLevel::Beginner.demoted(),
            DifficultyLevel::Beginner
        );
    }
}
