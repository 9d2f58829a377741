use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
}

/// One quiz question. Questions are embedded in their quiz document, so a
/// question belongs to exactly one quiz by construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(rename = "_id")]
    pub id: String,
    pub capsule_id: String,
    pub title: String,
    #[serde(default)]
    pub instructions: String,
    /// Percentage required to pass, 0..=100.
    pub passing_score: u32,
    pub questions: Vec<Question>,
    pub created_at: DateTime<Utc>,
}

/// Quiz as served to learners: correct answers and explanations stripped.
#[derive(Debug, Serialize)]
pub struct QuizView {
    pub id: String,
    pub capsule_id: String,
    pub title: String,
    pub instructions: String,
    pub passing_score: u32,
    pub questions: Vec<QuestionView>,
}

#[derive(Debug, Serialize)]
pub struct QuestionView {
    pub id: String,
    pub question_text: String,
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub order: i32,
}

impl From<Quiz> for QuizView {
    fn from(quiz: Quiz) -> Self {
        Self {
            id: quiz.id,
            capsule_id: quiz.capsule_id,
            title: quiz.title,
            instructions: quiz.instructions,
            passing_score: quiz.passing_score,
            questions: quiz
                .questions
                .into_iter()
                .map(|q| QuestionView {
                    id: q.id,
                    question_text: q.question_text,
                    question_type: q.question_type,
                    options: q.options,
                    order: q.order,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: String,
    pub question_text: String,
    pub user_answer: String,
    pub is_correct: bool,
    pub correct_answer: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// One learner submission, immutable once scored. Subject fields are
/// denormalized so the pathway engine can group by subject without joins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAttempt {
    #[serde(rename = "_id")]
    pub id: String,
    pub learner_id: String,
    pub quiz_id: String,
    pub capsule_id: String,
    pub capsule_title: String,
    pub subject_id: String,
    pub subject_name: String,
    pub score: u32,
    pub max_score: u32,
    pub percentage: f64,
    pub passed: bool,
    pub results: Vec<QuestionResult>,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitQuizRequest {
    /// question id -> submitted answer string
    pub answers: HashMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct QuizResultResponse {
    pub score: u32,
    pub max_score: u32,
    pub percentage: f64,
    pub passed: bool,
    pub passing_score: u32,
    pub results: Vec<QuestionResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt_id: Option<String>,
}

#[derive(Debug, Deserialize, validator::Validate)]
pub struct CreateQuizRequest {
    pub capsule_id: String,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub instructions: String,
    #[validate(range(min = 0, max = 100))]
    pub passing_score: u32,
    pub questions: Vec<CreateQuestionRequest>,
}

#[derive(Debug, Deserialize, validator::Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1))]
    pub question_text: String,
    pub question_type: QuestionType,
    #[serde(default)]
    pub options: Vec<String>,
    #[validate(length(min = 1, max = 200))]
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
}
