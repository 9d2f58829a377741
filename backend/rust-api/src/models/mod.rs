use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subject {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Grade {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub level: i32,
    #[serde(default)]
    pub description: String,
}

/// Self-contained lesson unit: content, objectives and any attached quizzes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurriculumCapsule {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub subject_id: String,
    pub grade_id: String,
    pub description: String,
    pub content: String,
    #[serde(default)]
    pub objectives: Vec<String>,
    /// Curriculum sequence within subject + grade.
    #[serde(default)]
    pub order: i32,
    /// Estimated time in minutes.
    pub estimated_duration: u32,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub featured: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSubjectRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateGradeRequest {
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    pub level: i32,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCapsuleRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub subject_id: String,
    pub grade_id: String,
    #[serde(default)]
    pub description: String,
    pub content: String,
    #[serde(default)]
    pub objectives: Vec<String>,
    #[serde(default)]
    pub order: i32,
    #[validate(range(min = 1, max = 600))]
    pub estimated_duration: u32,
    #[serde(default)]
    pub is_published: bool,
    #[serde(default)]
    pub featured: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct CapsuleQuery {
    pub subject: Option<String>,
    pub grade: Option<String>,
    pub featured: Option<bool>,
}

pub mod adaptive;
pub mod chapter;
pub mod lesson;
pub mod progress;
pub mod quiz;
