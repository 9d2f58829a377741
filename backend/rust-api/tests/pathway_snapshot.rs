//! Adaptive pathway classification over the public engine functions.

use chrono::{Duration, Utc};
use uuid::Uuid;

use learnhub_api::config::AdaptiveConfig;
use learnhub_api::models::adaptive::DifficultyLevel;
use learnhub_api::models::quiz::QuizAttempt;
use learnhub_api::services::adaptive_service::{
    classify, level_for, revision_candidates, subject_breakdown, summarize,
};

fn attempt(capsule: &str, subject: &str, percentage: f64, minutes_ago: i64) -> QuizAttempt {
    QuizAttempt {
        id: Uuid::new_v4().to_string(),
        learner_id: "learner-1".to_string(),
        quiz_id: format!("quiz-{}", capsule),
        capsule_id: capsule.to_string(),
        capsule_title: format!("Capsule {}", capsule),
        subject_id: format!("subject-{}", subject),
        subject_name: subject.to_string(),
        score: (percentage / 10.0) as u32,
        max_score: 10,
        percentage,
        passed: percentage >= 60.0,
        results: vec![],
        completed_at: Utc::now() - Duration::minutes(minutes_ago),
    }
}

#[test]
fn brand_new_learner_gets_an_empty_but_valid_snapshot() {
    let performance = summarize(&[]);
    assert_eq!(performance.total_quizzes_taken, 0);
    assert_eq!(performance.quizzes_passed, 0);
    assert_eq!(performance.pass_rate, 0.0);
    assert_eq!(performance.average_score, 0.0);

    let stats = subject_breakdown(&[]);
    assert!(stats.is_empty());
    let (strengths, weaknesses) = classify(&stats, &AdaptiveConfig::default());
    assert!(strengths.is_empty());
    assert!(weaknesses.is_empty());
}

#[test]
fn consistent_high_scores_read_as_a_strength() {
    let attempts = vec![
        attempt("c1", "Mathematics", 90.0, 300),
        attempt("c2", "Mathematics", 85.0, 200),
        attempt("c3", "Mathematics", 88.0, 100),
        attempt("c4", "History", 45.0, 150),
        attempt("c5", "History", 40.0, 50),
    ];

    let stats = subject_breakdown(&attempts);
    let (strengths, weaknesses) = classify(&stats, &AdaptiveConfig::default());

    assert_eq!(strengths.len(), 1);
    assert_eq!(strengths[0].subject, "Mathematics");
    assert_eq!(weaknesses.len(), 1);
    assert_eq!(weaknesses[0].subject, "History");

    let performance = summarize(&attempts);
    assert_eq!(performance.total_quizzes_taken, 5);
    assert_eq!(performance.quizzes_passed, 3);
    assert_eq!(performance.pass_rate, 60.0);
}

#[test]
fn mastery_requires_enough_attempts() {
    let config = AdaptiveConfig::default();
    let high_but_thin = vec![
        attempt("c1", "Science", 95.0, 100),
        attempt("c2", "Science", 92.0, 50),
    ];
    let stats = subject_breakdown(&high_but_thin);
    assert_eq!(stats.len(), 1);
    let level = level_for(stats[0].average_score, stats[0].attempts, &config);
    assert_eq!(level, DifficultyLevel::Advanced);

    // A third attempt lifts the cap.
    let mut enough = high_but_thin;
    enough.push(attempt("c3", "Science", 94.0, 10));
    let stats = subject_breakdown(&enough);
    let level = level_for(stats[0].average_score, stats[0].attempts, &config);
    assert_eq!(level, DifficultyLevel::Mastery);
}

#[test]
fn repeated_failures_on_a_capsule_queue_it_for_revision() {
    let config = AdaptiveConfig::default();
    let attempts = vec![
        attempt("fractions", "Mathematics", 30.0, 200),
        attempt("fractions", "Mathematics", 45.0, 100),
        attempt("decimals", "Mathematics", 80.0, 50),
    ];

    let revision = revision_candidates(&attempts, &config);
    assert_eq!(revision.len(), 1);
    assert_eq!(revision[0].capsule, "fractions");
}

#[test]
fn recovering_with_a_pass_clears_the_revision_flag() {
    let config = AdaptiveConfig::default();
    let attempts = vec![
        attempt("fractions", "Mathematics", 30.0, 200),
        attempt("fractions", "Mathematics", 85.0, 100),
    ];
    assert!(revision_candidates(&attempts, &config).is_empty());
}

#[test]
fn subject_filter_is_a_pure_data_concern() {
    // Filtering attempts before analysis must behave like a smaller history.
    let attempts = vec![
        attempt("c1", "Mathematics", 90.0, 100),
        attempt("c2", "History", 30.0, 50),
    ];
    let maths_only: Vec<QuizAttempt> = attempts
        .iter()
        .filter(|a| a.subject_name == "Mathematics")
        .cloned()
        .collect();

    let stats = subject_breakdown(&maths_only);
    assert_eq!(stats.len(), 1);
    assert_eq!(stats[0].subject_name, "Mathematics");

    let performance = summarize(&maths_only);
    assert_eq!(performance.total_quizzes_taken, 1);
    assert_eq!(performance.average_score, 90.0);
}
