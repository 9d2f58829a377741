use lazy_static::lazy_static;
use prometheus::{
    register_counter_vec, register_histogram_vec, register_int_counter,
    register_int_counter_vec, CounterVec, Encoder, HistogramVec, IntCounter, IntCounterVec,
    TextEncoder,
};

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Business Metrics
    pub static ref QUIZZES_GRADED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quizzes_graded_total",
        "Total number of quiz submissions graded",
        &["passed"]
    )
    .unwrap();

    pub static ref QUIZ_ATTEMPTS_SAVED_TOTAL: IntCounter = register_int_counter!(
        "quiz_attempts_saved_total",
        "Total number of quiz attempts persisted"
    )
    .unwrap();

    pub static ref LESSONS_GENERATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "lessons_generated_total",
        "Total number of lesson generation runs",
        &["strategy", "status"]
    )
    .unwrap();

    pub static ref LESSONS_PUBLISHED_TOTAL: IntCounter = register_int_counter!(
        "lessons_published_total",
        "Total number of generated lessons published as capsules"
    )
    .unwrap();

    pub static ref PATHWAY_SNAPSHOTS_TOTAL: IntCounter = register_int_counter!(
        "pathway_snapshots_total",
        "Total number of adaptive pathway computations"
    )
    .unwrap();

    pub static ref RECOMMENDATIONS_DISMISSED_TOTAL: IntCounter = register_int_counter!(
        "recommendations_dismissed_total",
        "Total number of recommendation dismissals"
    )
    .unwrap();

    // External AI response cache
    pub static ref AI_CACHE_RATIO: CounterVec = register_counter_vec!(
        "ai_cache_ratio",
        "AI generation cache hit/miss ratio",
        &["result"]
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

pub fn record_graded(passed: bool) {
    let label = if passed { "true" } else { "false" };
    QUIZZES_GRADED_TOTAL.with_label_values(&[label]).inc();
}

pub fn record_generation(strategy: &str, ok: bool) {
    let status = if ok { "success" } else { "failed" };
    LESSONS_GENERATED_TOTAL
        .with_label_values(&[strategy, status])
        .inc();
}

pub fn record_ai_cache_hit() {
    AI_CACHE_RATIO.with_label_values(&["hit"]).inc();
}

pub fn record_ai_cache_miss() {
    AI_CACHE_RATIO.with_label_values(&["miss"]).inc();
}
