use axum::{
    extract::{Path, State},
    Extension, Json,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::middlewares::auth::JwtClaims;
use crate::models::progress::UpdateProgressRequest;
use crate::services::progress_service::ProgressService;
use crate::services::AppState;

pub async fn update_progress(
    State(state): State<Arc<AppState>>,
    Path(capsule_id): Path<String>,
    Extension(claims): Extension<JwtClaims>,
    Json(req): Json<UpdateProgressRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let service = ProgressService::new(state.mongo.clone());
    let progress = service.update(&claims.sub, &capsule_id, &req).await?;
    Ok(Json(serde_json::json!(progress)))
}

pub async fn list_my_progress(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let service = ProgressService::new(state.mongo.clone());
    let progress = service.list_for_learner(&claims.sub).await?;
    Ok(Json(serde_json::json!({ "progress": progress })))
}
