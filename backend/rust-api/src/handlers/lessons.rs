use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::middlewares::auth::JwtClaims;
use crate::models::chapter::GenerateLessonRequest;
use crate::models::lesson::{LessonQuery, LessonStatus, ReviewLessonRequest};
use crate::services::lesson_generator::LessonGeneratorService;
use crate::services::AppState;

fn generator(state: &AppState) -> LessonGeneratorService {
    LessonGeneratorService::new(state.mongo.clone(), state.redis.clone(), state.config.clone())
}

pub async fn list_lessons(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LessonQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let lessons = generator(&state).list_lessons(&query).await?;
    Ok(Json(serde_json::json!({ "lessons": lessons })))
}

pub async fn get_lesson(
    State(state): State<Arc<AppState>>,
    Path(lesson_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let lesson = generator(&state).get_lesson(&lesson_id).await?;
    Ok(Json(serde_json::json!(lesson)))
}

pub async fn review_lesson(
    State(state): State<Arc<AppState>>,
    Path(lesson_id): Path<String>,
    Extension(claims): Extension<JwtClaims>,
    Json(req): Json<ReviewLessonRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let lesson = generator(&state)
        .review(&lesson_id, &claims.sub, &req)
        .await?;
    Ok(Json(serde_json::json!(lesson)))
}

/// Turns an approved lesson into a published capsule with its quiz.
pub async fn publish_lesson(
    State(state): State<Arc<AppState>>,
    Path(lesson_id): Path<String>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let capsule = generator(&state).publish(&lesson_id).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!(capsule))))
}

/// Drafts awaiting a review decision.
pub async fn pending_review(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let query = LessonQuery {
        status: Some(LessonStatus::Draft),
        unpublished: None,
    };
    let lessons = generator(&state).list_lessons(&query).await?;
    Ok(Json(serde_json::json!({ "lessons": lessons })))
}

pub async fn regenerate_questions(
    State(state): State<Arc<AppState>>,
    Path(lesson_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let lesson = generator(&state).regenerate_questions(&lesson_id).await?;
    Ok(Json(serde_json::json!(lesson)))
}

pub async fn regenerate_lesson(
    State(state): State<Arc<AppState>>,
    Path(lesson_id): Path<String>,
    Json(req): Json<GenerateLessonRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let lesson = generator(&state)
        .regenerate(&lesson_id, req.use_external_ai)
        .await?;
    Ok(Json(serde_json::json!(lesson)))
}

pub async fn lesson_statistics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let stats = generator(&state).lesson_statistics().await?;
    Ok(Json(serde_json::json!(stats)))
}
