use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::quiz::QuestionType;

/// Review/publish states for a generated lesson.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonStatus {
    Draft,
    Approved,
    Rejected,
    Published,
}

impl LessonStatus {
    /// Publish is only reachable from `approved`.
    pub fn can_publish(&self) -> bool {
        matches!(self, LessonStatus::Approved)
    }

    /// Review decides on drafts; re-reviewing a settled lesson is a conflict.
    pub fn can_review(&self) -> bool {
        matches!(self, LessonStatus::Draft)
    }

    /// Rejected lessons may be regenerated back to draft; drafts may be
    /// regenerated in place.
    pub fn can_regenerate(&self) -> bool {
        matches!(self, LessonStatus::Draft | LessonStatus::Rejected)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LessonStatus::Draft => "draft",
            LessonStatus::Approved => "approved",
            LessonStatus::Rejected => "rejected",
            LessonStatus::Published => "published",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionType {
    Introduction,
    Explanation,
    Example,
    Practice,
    Summary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonSection {
    pub section_type: SectionType,
    pub title: String,
    pub content: String,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyConcept {
    pub term: String,
    pub definition: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionDifficulty {
    Easy,
    Medium,
    Hard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
    pub difficulty: QuestionDifficulty,
    pub order: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonDifficulty {
    Beginner,
    Intermediate,
    Advanced,
}

/// Strategy output: the structured lesson before persistence. Both the
/// rule-based extractor and the external-AI strategy produce this shape so
/// review/publish logic never cares which one ran.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonDraft {
    pub title: String,
    pub introduction: String,
    pub learning_objectives: Vec<String>,
    pub key_concepts: Vec<KeyConcept>,
    pub sections: Vec<LessonSection>,
    pub questions: Vec<GeneratedQuestion>,
    /// Minutes, clamped to 15..=60.
    pub estimated_duration: u32,
    pub difficulty_level: LessonDifficulty,
}

/// Pipeline output under review, mutated only by review/publish/regenerate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedLesson {
    #[serde(rename = "_id")]
    pub id: String,
    pub chapter_id: String,
    pub title: String,
    pub introduction: String,
    pub learning_objectives: Vec<String>,
    pub key_concepts: Vec<KeyConcept>,
    pub sections: Vec<LessonSection>,
    pub questions: Vec<GeneratedQuestion>,
    pub estimated_duration: u32,
    pub difficulty_level: LessonDifficulty,
    /// Heuristic completeness measure in [0, 1].
    pub quality_score: f64,
    pub ai_model_used: String,
    pub status: LessonStatus,
    #[serde(default)]
    pub review_notes: Option<String>,
    #[serde(default)]
    pub reviewed_by: Option<String>,
    #[serde(default)]
    pub reviewed_at: Option<DateTime<Utc>>,
    /// At most one capsule is ever created from a lesson.
    #[serde(default)]
    pub published_capsule_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

#[derive(Debug, Deserialize)]
pub struct ReviewLessonRequest {
    pub status: ReviewDecision,
    #[serde(default)]
    pub review_notes: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LessonQuery {
    pub status: Option<LessonStatus>,
    pub unpublished: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct LessonStatistics {
    pub total_lessons: u64,
    pub by_status: HashMap<String, u64>,
    pub published_count: u64,
    pub average_quality_score: f64,
    pub total_sections: u64,
    pub total_questions: u64,
}
