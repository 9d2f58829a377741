use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::middlewares::auth::JwtClaims;
use crate::models::chapter::{
    BatchGenerateRequest, ChapterQuery, CreateChapterRequest, GenerateLessonRequest,
};
use crate::services::lesson_generator::LessonGeneratorService;
use crate::services::AppState;

fn generator(state: &AppState) -> LessonGeneratorService {
    LessonGeneratorService::new(state.mongo.clone(), state.redis.clone(), state.config.clone())
}

pub async fn upload_chapter(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Json(req): Json<CreateChapterRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let chapter = generator(&state)
        .create_chapter(req, Some(claims.sub))
        .await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!(chapter))))
}

pub async fn list_chapters(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ChapterQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let chapters = generator(&state).list_chapters(&query).await?;
    Ok(Json(serde_json::json!({ "chapters": chapters })))
}

pub async fn get_chapter(
    State(state): State<Arc<AppState>>,
    Path(chapter_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let chapter = generator(&state).get_chapter(&chapter_id).await?;
    Ok(Json(serde_json::json!(chapter)))
}

pub async fn validate_chapter(
    State(state): State<Arc<AppState>>,
    Path(chapter_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let service = generator(&state);
    let chapter = service.get_chapter(&chapter_id).await?;
    let validation = service.validate_chapter(&chapter);
    Ok(Json(serde_json::json!(validation)))
}

/// Kick off generation for one chapter. `validate_only` reports without
/// running the pipeline.
pub async fn generate_lesson(
    State(state): State<Arc<AppState>>,
    Path(chapter_id): Path<String>,
    Json(req): Json<GenerateLessonRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let service = generator(&state);

    if req.validate_only {
        let chapter = service.get_chapter(&chapter_id).await?;
        let validation = service.validate_chapter(&chapter);
        return Ok((StatusCode::OK, Json(serde_json::json!(validation))));
    }

    let lesson = service
        .generate_for_chapter(&chapter_id, req.use_external_ai)
        .await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!(lesson))))
}

pub async fn batch_generate(
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchGenerateRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.chapter_ids.is_empty() {
        return Err(ApiError::Validation(
            "chapter_ids must not be empty".to_string(),
        ));
    }
    let report = generator(&state).batch_generate(&req).await?;
    Ok(Json(serde_json::json!(report)))
}

pub async fn chapter_statistics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let stats = generator(&state).chapter_statistics().await?;
    Ok(Json(serde_json::json!(stats)))
}
