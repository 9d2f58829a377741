use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Chapter processing states. The status only advances
/// (uploaded -> processing -> generated -> published, or -> failed);
/// a failed chapter re-enters processing only via an explicit retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChapterStatus {
    Uploaded,
    Processing,
    Generated,
    Published,
    Failed,
}

impl ChapterStatus {
    /// Generation may start fresh or retry after a failure, never while a
    /// chapter is mid-pipeline or already has a lesson.
    pub fn can_generate(&self) -> bool {
        matches!(self, ChapterStatus::Uploaded | ChapterStatus::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ChapterStatus::Uploaded => "uploaded",
            ChapterStatus::Processing => "processing",
            ChapterStatus::Generated => "generated",
            ChapterStatus::Published => "published",
            ChapterStatus::Failed => "failed",
        }
    }
}

/// Uploaded source material awaiting transformation into a lesson.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextbookChapter {
    #[serde(rename = "_id")]
    pub id: String,
    pub title: String,
    pub subject_id: String,
    pub grade_id: String,
    #[serde(default)]
    pub source_book: Option<String>,
    pub raw_content: String,
    pub word_count: u32,
    pub status: ChapterStatus,
    /// Failure reason or extraction notes, shown to the uploader.
    #[serde(default)]
    pub processing_notes: Option<String>,
    #[serde(default)]
    pub uploaded_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateChapterRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub subject_id: String,
    pub grade_id: String,
    #[serde(default)]
    pub source_book: Option<String>,
    #[validate(length(min = 1))]
    pub raw_content: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChapterQuery {
    pub status: Option<ChapterStatus>,
    pub subject: Option<String>,
    pub grade: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateLessonRequest {
    #[serde(default)]
    pub use_external_ai: bool,
    #[serde(default)]
    pub validate_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct BatchGenerateRequest {
    pub chapter_ids: Vec<String>,
    #[serde(default)]
    pub use_external_ai: bool,
}

#[derive(Debug, Serialize)]
pub struct BatchItemSuccess {
    pub chapter_id: String,
    pub lesson_id: String,
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct BatchItemFailure {
    pub chapter_id: String,
    pub title: String,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct BatchItemSkipped {
    pub chapter_id: String,
    pub title: String,
    pub reason: String,
}

/// Whole-batch report: one entry per chapter, a failure never aborts the rest.
#[derive(Debug, Default, Serialize)]
pub struct BatchGenerationReport {
    pub success: Vec<BatchItemSuccess>,
    pub failed: Vec<BatchItemFailure>,
    pub skipped: Vec<BatchItemSkipped>,
}

#[derive(Debug, Serialize)]
pub struct ChapterValidation {
    pub is_valid: bool,
    pub word_count: u32,
    pub warnings: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ChapterStatistics {
    pub total_chapters: u64,
    pub by_status: HashMap<String, u64>,
    pub by_subject: HashMap<String, u64>,
    pub recent_uploads: Vec<ChapterSummary>,
}

#[derive(Debug, Serialize)]
pub struct ChapterSummary {
    pub id: String,
    pub title: String,
    pub status: ChapterStatus,
    pub word_count: u32,
    pub created_at: DateTime<Utc>,
}

impl From<&TextbookChapter> for ChapterSummary {
    fn from(chapter: &TextbookChapter) -> Self {
        Self {
            id: chapter.id.clone(),
            title: chapter.title.clone(),
            status: chapter.status,
            word_count: chapter.word_count,
            created_at: chapter.created_at,
        }
    }
}
