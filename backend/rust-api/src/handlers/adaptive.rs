use axum::{
    extract::{Query, State},
    Extension, Json,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::middlewares::auth::JwtClaims;
use crate::models::adaptive::{
    AnalyzeAttemptRequest, DismissRecommendationRequest, PathwayQuery, PathwaySnapshot,
};
use crate::services::adaptive_service::AdaptiveService;
use crate::services::AppState;

/// The learner's full pathway: performance, strengths and weaknesses,
/// revision queue, next lessons and recommendations.
pub async fn get_pathway(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Query(query): Query<PathwayQuery>,
) -> Result<Json<PathwaySnapshot>, ApiError> {
    let service = AdaptiveService::new(state.mongo.clone(), state.config.adaptive.clone());
    let snapshot = service
        .pathway(&claims.sub, query.subject.as_deref())
        .await?;
    Ok(Json(snapshot))
}

/// Immediate recommendations for one finished attempt.
pub async fn analyze_attempt(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Json(req): Json<AnalyzeAttemptRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let service = AdaptiveService::new(state.mongo.clone(), state.config.adaptive.clone());
    let recommendations = service.analyze_attempt(&claims.sub, &req.attempt_id).await?;
    Ok(Json(
        serde_json::json!({ "recommendations": recommendations }),
    ))
}

/// Capsules flagged for revision with the attempt history behind each flag.
pub async fn revision_history(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let service = AdaptiveService::new(state.mongo.clone(), state.config.adaptive.clone());
    let revisions: Vec<serde_json::Value> = service
        .revision_history(&claims.sub)
        .await?
        .into_iter()
        .map(|(item, attempts)| {
            serde_json::json!({
                "capsule": item.capsule,
                "capsule_title": item.capsule_title,
                "attempts": attempts,
            })
        })
        .collect();
    Ok(Json(serde_json::json!({ "revisions": revisions })))
}

pub async fn dismiss_recommendation(
    State(state): State<Arc<AppState>>,
    Extension(claims): Extension<JwtClaims>,
    Json(req): Json<DismissRecommendationRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let service = AdaptiveService::new(state.mongo.clone(), state.config.adaptive.clone());
    service.dismiss(&claims.sub, &req.recommendation_id).await?;
    Ok(Json(serde_json::json!({ "dismissed": true })))
}
