use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::middlewares::auth::JwtClaims;
use crate::models::quiz::{QuizResultResponse, QuizView, SubmitQuizRequest};
use crate::services::content_service::ContentService;
use crate::services::grading_service::GradingService;
use crate::services::AppState;

/// Learner view of a quiz: correct answers are never sent down.
pub async fn get_quiz(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<String>,
) -> Result<Json<QuizView>, ApiError> {
    let service = ContentService::new(state.mongo.clone());
    let quiz = service.get_quiz(&quiz_id).await?;
    Ok(Json(QuizView::from(quiz)))
}

pub async fn get_quiz_for_capsule(
    State(state): State<Arc<AppState>>,
    Path(capsule_id): Path<String>,
) -> Result<Json<QuizView>, ApiError> {
    let service = ContentService::new(state.mongo.clone());
    let quiz = service.get_quiz_for_capsule(&capsule_id).await?;
    Ok(Json(QuizView::from(quiz)))
}

/// Grades a submission. With a valid token the attempt is recorded;
/// anonymous submissions get a grade and nothing else.
pub async fn submit_quiz(
    State(state): State<Arc<AppState>>,
    Path(quiz_id): Path<String>,
    claims: Option<Extension<JwtClaims>>,
    Json(req): Json<SubmitQuizRequest>,
) -> Result<Json<QuizResultResponse>, ApiError> {
    let learner_id = claims.as_ref().map(|Extension(c)| c.sub.as_str());

    let service = GradingService::new(state.mongo.clone());
    let result = service.submit(&quiz_id, learner_id, &req.answers).await?;
    Ok(Json(result))
}

/// The caller's own attempt history, newest first.
pub async fn list_my_attempts(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let service = GradingService::new(state.mongo.clone());
    let attempts = service.attempts_for_learner(&claims.sub, None).await?;
    Ok(Json(serde_json::json!({ "attempts": attempts })))
}
