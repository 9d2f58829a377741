#![allow(dead_code)]

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middlewares;
pub mod models;
pub mod services;
pub mod utils;

pub use config::Config;
pub use error::ApiError;
pub use services::AppState;

/// CSP middleware adds Content-Security-Policy header to all responses
async fn csp_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    response.headers_mut().insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(
            "default-src 'self'; \
             script-src 'self' 'unsafe-inline'; \
             style-src 'self' 'unsafe-inline'; \
             img-src 'self' data: https:; \
             connect-src 'self'",
        ),
    );
    response
}

pub fn create_router(app_state: std::sync::Arc<services::AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .allow_origin(tower_http::cors::Any); // TODO: restrict to specific origins in production

    Router::new()
        // Public endpoints (no auth required)
        .route("/health", get(handlers::health_check))
        // Metrics endpoint with Basic Auth protection
        .route(
            "/metrics",
            get(handlers::metrics_handler)
                .layer(middleware::from_fn(handlers::metrics_auth_middleware)),
        )
        // Public catalog; quiz submission accepts anonymous callers
        .nest("/api/v1", public_routes(app_state.clone()).layer(cors))
        // Learner endpoints (require JWT)
        .nest(
            "/api/v1/me",
            learner_routes().layer(middleware::from_fn_with_state(
                app_state.clone(),
                middlewares::auth::auth_middleware,
            )),
        )
        // Content management (require JWT + admin/teacher role)
        .nest(
            "/admin",
            admin_routes().layer(middleware::from_fn_with_state(
                app_state.clone(),
                middlewares::auth::auth_middleware,
            )),
        )
        .with_state(app_state)
        .layer(middleware::from_fn(csp_middleware)) // Apply CSP to all responses
        .layer(middleware::from_fn(
            middlewares::metrics::metrics_middleware,
        ))
        .layer(TraceLayer::new_for_http())
}

fn public_routes(
    app_state: std::sync::Arc<services::AppState>,
) -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        .route("/subjects", get(handlers::catalog::list_subjects))
        .route("/grades", get(handlers::catalog::list_grades))
        .route("/capsules", get(handlers::catalog::list_capsules))
        .route("/capsules/{id}", get(handlers::catalog::get_capsule))
        .route(
            "/capsules/{id}/quiz",
            get(handlers::quizzes::get_quiz_for_capsule),
        )
        .route("/quizzes/{id}", get(handlers::quizzes::get_quiz))
        .route(
            "/quizzes/{id}/submit",
            post(handlers::quizzes::submit_quiz).layer(middleware::from_fn_with_state(
                app_state,
                middlewares::auth::optional_auth_middleware,
            )),
        )
}

fn learner_routes() -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        .route("/attempts", get(handlers::quizzes::list_my_attempts))
        .route("/progress", get(handlers::progress::list_my_progress))
        .route(
            "/progress/{capsule_id}",
            post(handlers::progress::update_progress),
        )
        .route("/pathway", get(handlers::adaptive::get_pathway))
        .route("/pathway/analyze", post(handlers::adaptive::analyze_attempt))
        .route(
            "/pathway/dismiss",
            post(handlers::adaptive::dismiss_recommendation),
        )
        .route(
            "/pathway/revisions",
            get(handlers::adaptive::revision_history),
        )
}

fn admin_routes() -> Router<std::sync::Arc<services::AppState>> {
    Router::new()
        // Catalog management
        .route("/subjects", post(handlers::catalog::create_subject))
        .route("/grades", post(handlers::catalog::create_grade))
        .route("/capsules", post(handlers::catalog::create_capsule))
        .route("/quizzes", post(handlers::catalog::create_quiz))
        // Chapter intake and generation
        .route(
            "/chapters",
            get(handlers::chapters::list_chapters).post(handlers::chapters::upload_chapter),
        )
        .route("/chapters/stats", get(handlers::chapters::chapter_statistics))
        .route("/chapters/{id}", get(handlers::chapters::get_chapter))
        .route(
            "/chapters/{id}/validate",
            get(handlers::chapters::validate_chapter),
        )
        .route(
            "/chapters/{id}/generate",
            post(handlers::chapters::generate_lesson),
        )
        .route(
            "/chapters/batch-generate",
            post(handlers::chapters::batch_generate),
        )
        // Lesson review and publication
        .route("/lessons", get(handlers::lessons::list_lessons))
        .route(
            "/lessons/pending-review",
            get(handlers::lessons::pending_review),
        )
        .route("/lessons/stats", get(handlers::lessons::lesson_statistics))
        .route("/lessons/{id}", get(handlers::lessons::get_lesson))
        .route("/lessons/{id}/review", post(handlers::lessons::review_lesson))
        .route(
            "/lessons/{id}/publish",
            post(handlers::lessons::publish_lesson),
        )
        .route(
            "/lessons/{id}/regenerate",
            post(handlers::lessons::regenerate_lesson),
        )
        .route(
            "/lessons/{id}/regenerate-questions",
            post(handlers::lessons::regenerate_questions),
        )
        .route_layer(middleware::from_fn(
            middlewares::auth::admin_guard_middleware,
        ))
}
