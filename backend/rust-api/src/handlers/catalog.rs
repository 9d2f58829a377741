use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::quiz::CreateQuizRequest;
use crate::models::{
    CapsuleQuery, CreateCapsuleRequest, CreateGradeRequest, CreateSubjectRequest,
};
use crate::services::content_service::ContentService;
use crate::services::AppState;

pub async fn list_subjects(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let service = ContentService::new(state.mongo.clone());
    let subjects = service.list_subjects().await?;
    Ok(Json(serde_json::json!({ "subjects": subjects })))
}

pub async fn create_subject(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateSubjectRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let service = ContentService::new(state.mongo.clone());
    let subject = service.create_subject(req).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!(subject))))
}

pub async fn list_grades(
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let service = ContentService::new(state.mongo.clone());
    let grades = service.list_grades().await?;
    Ok(Json(serde_json::json!({ "grades": grades })))
}

pub async fn create_grade(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateGradeRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let service = ContentService::new(state.mongo.clone());
    let grade = service.create_grade(req).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!(grade))))
}

pub async fn list_capsules(
    State(state): State<Arc<AppState>>,
    Query(query): Query<CapsuleQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let service = ContentService::new(state.mongo.clone());
    let capsules = service.list_capsules(&query).await?;
    Ok(Json(serde_json::json!({ "capsules": capsules })))
}

pub async fn get_capsule(
    State(state): State<Arc<AppState>>,
    Path(capsule_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let service = ContentService::new(state.mongo.clone());
    let capsule = service.get_capsule(&capsule_id).await?;
    Ok(Json(serde_json::json!(capsule)))
}

pub async fn create_capsule(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateCapsuleRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let service = ContentService::new(state.mongo.clone());
    let capsule = service.create_capsule(req).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!(capsule))))
}

pub async fn create_quiz(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateQuizRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    let service = ContentService::new(state.mongo.clone());
    let quiz = service.create_quiz(req).await?;
    Ok((StatusCode::CREATED, Json(serde_json::json!(quiz))))
}
