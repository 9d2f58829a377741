use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Collection, Database};
use uuid::Uuid;

use crate::config::AdaptiveConfig;
use crate::error::ApiError;
use crate::metrics::{PATHWAY_SNAPSHOTS_TOTAL, RECOMMENDATIONS_DISMISSED_TOTAL};
use crate::models::adaptive::{
    CurrentPerformance, DifficultyLevel, NextLesson, PathwaySnapshot, Recommendation,
    RecommendationType, RecommendationView, RevisionItem, SubjectLevel, SubjectScore,
};
use crate::models::progress::LearnerProgress;
use crate::models::quiz::QuizAttempt;
use crate::models::{CurriculumCapsule, Grade, Subject};

/// Per-subject rollup over a learner's attempt history.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectStats {
    pub subject_id: String,
    pub subject_name: String,
    pub attempts: u32,
    pub average_score: f64,
    pub last_attempt_at: DateTime<Utc>,
}

/// A suggestion the engine wants active, before reconciliation against the
/// persisted recommendation set.
#[derive(Debug, Clone)]
pub struct RecommendationCandidate {
    pub capsule_id: String,
    pub capsule_title: String,
    pub capsule_subject: String,
    pub recommendation_type: RecommendationType,
    pub reason: String,
    pub priority: i32,
    pub source_attempt_at: DateTime<Utc>,
}

/// Overall performance across all attempts. Empty history yields zeroes,
/// never an error.
pub fn summarize(attempts: &[QuizAttempt]) -> CurrentPerformance {
    let total = attempts.len() as u64;
    let passed = attempts.iter().filter(|a| a.passed).count() as u64;
    let average = if total > 0 {
        attempts.iter().map(|a| a.percentage).sum::<f64>() / total as f64
    } else {
        0.0
    };
    CurrentPerformance {
        total_quizzes_taken: total,
        quizzes_passed: passed,
        pass_rate: if total > 0 {
            (passed as f64 / total as f64) * 100.0
        } else {
            0.0
        },
        average_score: average,
    }
}

/// Groups attempts by subject. Attempts with a blank subject (anonymous
/// denormalization misses) are skipped. Output is sorted by subject name so
/// downstream lists are deterministic.
pub fn subject_breakdown(attempts: &[QuizAttempt]) -> Vec<SubjectStats> {
    let mut grouped: HashMap<&str, Vec<&QuizAttempt>> = HashMap::new();
    for attempt in attempts {
        if attempt.subject_id.is_empty() {
            continue;
        }
        grouped.entry(&attempt.subject_id).or_default().push(attempt);
    }

    let mut stats: Vec<SubjectStats> = grouped
        .into_values()
        .map(|group| {
            let average =
                group.iter().map(|a| a.percentage).sum::<f64>() / group.len() as f64;
            let last = group
                .iter()
                .map(|a| a.completed_at)
                .max()
                .unwrap_or_else(Utc::now);
            SubjectStats {
                subject_id: group[0].subject_id.clone(),
                subject_name: group[0].subject_name.clone(),
                attempts: group.len() as u32,
                average_score: average,
                last_attempt_at: last,
            }
        })
        .collect();
    stats.sort_by(|a, b| a.subject_name.cmp(&b.subject_name));
    stats
}

/// Maps an average score to a level. With fewer than
/// `min_attempts_for_level` attempts the result is demoted one step, so a
/// single lucky quiz never reads as mastery.
pub fn level_for(average: f64, attempts: u32, config: &AdaptiveConfig) -> DifficultyLevel {
    let level = if average < 50.0 {
        DifficultyLevel::Beginner
    } else if average < 70.0 {
        DifficultyLevel::Intermediate
    } else if average < 85.0 {
        DifficultyLevel::Advanced
    } else {
        DifficultyLevel::Mastery
    };

    if attempts < config.min_attempts_for_level {
        level.demoted()
    } else {
        level
    }
}

/// Splits subjects into strengths (average at or above the strong threshold)
/// and weaknesses (below the weak threshold). Subjects in between appear in
/// neither list.
pub fn classify(
    stats: &[SubjectStats],
    config: &AdaptiveConfig,
) -> (Vec<SubjectScore>, Vec<SubjectScore>) {
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    for s in stats {
        let entry = SubjectScore {
            subject: s.subject_name.clone(),
            score: s.average_score,
        };
        if s.average_score >= config.strong_threshold {
            strengths.push(entry);
        } else if s.average_score < config.weak_threshold {
            weaknesses.push(entry);
        }
    }
    strengths.sort_by(|a, b| b.score.total_cmp(&a.score));
    weaknesses.sort_by(|a, b| a.score.total_cmp(&b.score));
    (strengths, weaknesses)
}

/// Capsules the learner should revisit. A capsule qualifies when its latest
/// attempt failed, or the rolling average of its most recent attempts sits
/// below the weak threshold, and no pass has happened since the last failure.
pub fn revision_candidates(
    attempts: &[QuizAttempt],
    config: &AdaptiveConfig,
) -> Vec<RevisionItem> {
    let mut by_capsule: HashMap<&str, Vec<&QuizAttempt>> = HashMap::new();
    for attempt in attempts {
        by_capsule.entry(&attempt.capsule_id).or_default().push(attempt);
    }

    let mut items: Vec<(DateTime<Utc>, RevisionItem)> = Vec::new();
    for (_, mut history) in by_capsule {
        history.sort_by_key(|a| a.completed_at);

        let Some(last_failure_at) = history
            .iter()
            .rev()
            .find(|a| !a.passed)
            .map(|a| a.completed_at)
        else {
            continue;
        };
        // A pass after the last failure means the learner has recovered.
        if history
            .iter()
            .any(|a| a.passed && a.completed_at > last_failure_at)
        {
            continue;
        }

        let window_start = history.len().saturating_sub(config.revision_window);
        let recent = &history[window_start..];
        let window_average =
            recent.iter().map(|a| a.percentage).sum::<f64>() / recent.len() as f64;

        let last = history[history.len() - 1];
        if !last.passed || window_average < config.weak_threshold {
            items.push((
                last_failure_at,
                RevisionItem {
                    capsule: last.capsule_id.clone(),
                    capsule_title: last.capsule_title.clone(),
                },
            ));
        }
    }

    // Most recent trouble first.
    items.sort_by(|a, b| b.0.cmp(&a.0));
    items.into_iter().map(|(_, item)| item).collect()
}

/// Reconciles wanted candidates against the persisted set. Active instances
/// keep their identity across recomputations; a dismissed instance only
/// resurfaces when a qualifying attempt is newer than the dismissal. Active
/// instances the candidate pass does not re-propose (the practice/mastery
/// suggestions issued after an attempt analysis) stay in the output until
/// dismissed.
pub fn plan_recommendations(
    learner_id: &str,
    existing: &[Recommendation],
    candidates: Vec<RecommendationCandidate>,
    max_recommendations: usize,
    now: DateTime<Utc>,
) -> (Vec<Recommendation>, Vec<Recommendation>) {
    let mut to_insert = Vec::new();
    let mut active = Vec::new();

    for candidate in candidates {
        if active.len() + to_insert.len() >= max_recommendations {
            break;
        }
        let key = (candidate.recommendation_type, candidate.capsule_id.clone());

        if let Some(current) = existing.iter().find(|r| {
            !r.dismissed && (r.recommendation_type, r.capsule_id.clone()) == key
        }) {
            active.push(current.clone());
            continue;
        }

        let newest_dismissal = existing
            .iter()
            .filter(|r| r.dismissed && (r.recommendation_type, r.capsule_id.clone()) == key)
            .filter_map(|r| r.dismissed_at)
            .max();
        if let Some(dismissed_at) = newest_dismissal {
            if candidate.source_attempt_at <= dismissed_at {
                continue;
            }
        }

        to_insert.push(Recommendation {
            id: Uuid::new_v4().to_string(),
            learner_id: learner_id.to_string(),
            capsule_id: candidate.capsule_id,
            capsule_title: candidate.capsule_title,
            capsule_subject: candidate.capsule_subject,
            recommendation_type: candidate.recommendation_type,
            reason: candidate.reason,
            priority: candidate.priority,
            dismissed: false,
            dismissed_at: None,
            source_attempt_at: candidate.source_attempt_at,
            created_at: now,
        });
    }

    for current in existing {
        if active.len() + to_insert.len() >= max_recommendations {
            break;
        }
        if current.dismissed || active.iter().any(|r| r.id == current.id) {
            continue;
        }
        active.push(current.clone());
    }

    (to_insert, active)
}

pub struct AdaptiveService {
    mongo: Database,
    config: AdaptiveConfig,
}

impl AdaptiveService {
    pub fn new(mongo: Database, config: AdaptiveConfig) -> Self {
        Self { mongo, config }
    }

    fn recommendations(&self) -> Collection<Recommendation> {
        self.mongo.collection("recommendations")
    }

    fn attempts(&self) -> Collection<QuizAttempt> {
        self.mongo.collection("quiz_attempts")
    }

    fn capsules(&self) -> Collection<CurriculumCapsule> {
        self.mongo.collection("capsules")
    }

    /// Full pathway computation for a learner: performance summary,
    /// strengths/weaknesses, revision queue, next lessons and the
    /// reconciled recommendation list.
    pub async fn pathway(
        &self,
        learner_id: &str,
        subject_filter: Option<&str>,
    ) -> Result<PathwaySnapshot, ApiError> {
        let mut filter = doc! { "learner_id": learner_id };
        if let Some(subject) = subject_filter {
            filter.insert("subject_id", subject);
        }
        let attempts: Vec<QuizAttempt> = self
            .attempts()
            .find(filter)
            .sort(doc! { "completed_at": 1 })
            .await?
            .try_collect()
            .await?;

        let performance = summarize(&attempts);
        let stats = subject_breakdown(&attempts);
        let (strengths, weaknesses) = classify(&stats, &self.config);
        let revision_needed = revision_candidates(&attempts, &self.config);

        let difficulty_levels = stats
            .iter()
            .map(|s| SubjectLevel {
                subject_name: s.subject_name.clone(),
                current_level: level_for(s.average_score, s.attempts, &self.config),
                average_score: s.average_score,
                total_attempts: s.attempts,
            })
            .collect();

        let grades = self.grade_levels().await?;
        let subjects = self.subject_names().await?;
        let completed = self.completed_capsules(learner_id).await?;

        let next_lessons = self
            .next_lessons(learner_id, &attempts, &grades, &subjects, &completed)
            .await?;

        let candidates = self
            .build_candidates(&stats, &strengths, &weaknesses, &completed)
            .await?;

        let mut existing: Vec<Recommendation> = self
            .recommendations()
            .find(doc! { "learner_id": learner_id })
            .await?
            .try_collect()
            .await?;
        if let Some(subject) = subject_filter {
            if let Some(name) = subjects.get(subject) {
                existing.retain(|r| &r.capsule_subject == name);
            }
        }

        let (to_insert, mut active) = plan_recommendations(
            learner_id,
            &existing,
            candidates,
            self.config.max_recommendations,
            Utc::now(),
        );

        if !to_insert.is_empty() {
            self.recommendations().insert_many(&to_insert).await?;
            active.extend(to_insert);
        }
        active.sort_by_key(|r| r.priority);

        PATHWAY_SNAPSHOTS_TOTAL.inc();
        tracing::debug!(
            "Computed pathway for learner {}: {} attempts, {} recommendations",
            learner_id,
            attempts.len(),
            active.len()
        );

        Ok(PathwaySnapshot {
            current_performance: performance,
            strengths,
            weaknesses,
            recommendations: active.iter().map(RecommendationView::from).collect(),
            revision_needed,
            next_lessons,
            difficulty_levels,
        })
    }

    /// Reacts to a single finished attempt: retires the capsule's previous
    /// suggestions and issues fresh ones for the score band.
    pub async fn analyze_attempt(
        &self,
        learner_id: &str,
        attempt_id: &str,
    ) -> Result<Vec<RecommendationView>, ApiError> {
        let attempt = self
            .attempts()
            .find_one(doc! { "_id": attempt_id, "learner_id": learner_id })
            .await?
            .ok_or_else(|| ApiError::not_found("attempt", attempt_id))?;

        let now = Utc::now();
        // Older suggestions for this capsule are superseded by the new result.
        let stale: Vec<Recommendation> = self
            .recommendations()
            .find(doc! {
                "learner_id": learner_id,
                "capsule_id": &attempt.capsule_id,
                "dismissed": false,
            })
            .await?
            .try_collect()
            .await?;
        for mut rec in stale {
            rec.dismiss(now);
            self.recommendations()
                .replace_one(doc! { "_id": &rec.id }, &rec)
                .await?;
        }

        let mut candidates = Vec::new();
        let pct = attempt.percentage;
        if pct < 50.0 {
            candidates.push((
                RecommendationType::Revision,
                1,
                format!("Scored {:.0}% — revisit this material", pct),
            ));
        } else if pct < 70.0 {
            candidates.push((
                RecommendationType::Practice,
                3,
                format!("Scored {:.0}% — more practice will help", pct),
            ));
        } else if pct < 85.0 {
            candidates.push((
                RecommendationType::NextLesson,
                4,
                format!("Scored {:.0}% — ready to move on", pct),
            ));
        } else {
            candidates.push((
                RecommendationType::NextLesson,
                5,
                format!("Scored {:.0}% — strong result, keep going", pct),
            ));
            if pct >= 95.0 {
                candidates.push((
                    RecommendationType::Mastery,
                    10,
                    "Near-perfect score — try an advanced challenge".to_string(),
                ));
            }
        }

        let recs: Vec<Recommendation> = candidates
            .into_iter()
            .map(|(rec_type, priority, reason)| Recommendation {
                id: Uuid::new_v4().to_string(),
                learner_id: learner_id.to_string(),
                capsule_id: attempt.capsule_id.clone(),
                capsule_title: attempt.capsule_title.clone(),
                capsule_subject: attempt.subject_name.clone(),
                recommendation_type: rec_type,
                reason,
                priority,
                dismissed: false,
                dismissed_at: None,
                source_attempt_at: attempt.completed_at,
                created_at: now,
            })
            .collect();

        self.recommendations().insert_many(&recs).await?;
        tracing::info!(
            "Analyzed attempt {} for learner {}: {} recommendations issued",
            attempt_id,
            learner_id,
            recs.len()
        );
        Ok(recs.iter().map(RecommendationView::from).collect())
    }

    /// The capsules currently flagged for revision, with the attempts that
    /// put them there.
    pub async fn revision_history(
        &self,
        learner_id: &str,
    ) -> Result<Vec<(RevisionItem, Vec<QuizAttempt>)>, ApiError> {
        let attempts: Vec<QuizAttempt> = self
            .attempts()
            .find(doc! { "learner_id": learner_id })
            .sort(doc! { "completed_at": 1 })
            .await?
            .try_collect()
            .await?;

        let items = revision_candidates(&attempts, &self.config);
        Ok(items
            .into_iter()
            .map(|item| {
                let history = attempts
                    .iter()
                    .filter(|a| a.capsule_id == item.capsule)
                    .cloned()
                    .collect();
                (item, history)
            })
            .collect())
    }

    /// Marks one recommendation dismissed. Repeat dismissals are a no-op.
    pub async fn dismiss(
        &self,
        learner_id: &str,
        recommendation_id: &str,
    ) -> Result<(), ApiError> {
        let mut rec = self
            .recommendations()
            .find_one(doc! { "_id": recommendation_id, "learner_id": learner_id })
            .await?
            .ok_or_else(|| ApiError::not_found("recommendation", recommendation_id))?;

        if rec.dismissed {
            return Ok(());
        }
        rec.dismiss(Utc::now());
        self.recommendations()
            .replace_one(doc! { "_id": recommendation_id }, &rec)
            .await?;
        RECOMMENDATIONS_DISMISSED_TOTAL.inc();
        Ok(())
    }

    async fn grade_levels(&self) -> Result<HashMap<String, (i32, String)>, ApiError> {
        let grades: Collection<Grade> = self.mongo.collection("grades");
        let all: Vec<Grade> = grades.find(doc! {}).await?.try_collect().await?;
        Ok(all
            .into_iter()
            .map(|g| (g.id, (g.level, g.name)))
            .collect())
    }

    async fn subject_names(&self) -> Result<HashMap<String, String>, ApiError> {
        let subjects: Collection<Subject> = self.mongo.collection("subjects");
        let all: Vec<Subject> = subjects.find(doc! {}).await?.try_collect().await?;
        Ok(all.into_iter().map(|s| (s.id, s.name)).collect())
    }

    async fn completed_capsules(&self, learner_id: &str) -> Result<HashSet<String>, ApiError> {
        let progress: Collection<LearnerProgress> = self.mongo.collection("learning_progress");
        let done: Vec<LearnerProgress> = progress
            .find(doc! { "learner_id": learner_id, "is_completed": true })
            .await?
            .try_collect()
            .await?;
        Ok(done.into_iter().map(|p| p.capsule_id).collect())
    }

    /// Published capsules the learner has neither completed nor attempted,
    /// in curriculum order.
    async fn next_lessons(
        &self,
        _learner_id: &str,
        attempts: &[QuizAttempt],
        grades: &HashMap<String, (i32, String)>,
        subjects: &HashMap<String, String>,
        completed: &HashSet<String>,
    ) -> Result<Vec<NextLesson>, ApiError> {
        let attempted: HashSet<&str> = attempts.iter().map(|a| a.capsule_id.as_str()).collect();

        let mut capsules: Vec<CurriculumCapsule> = self
            .capsules()
            .find(doc! { "is_published": true })
            .await?
            .try_collect()
            .await?;
        capsules.sort_by_key(|c| {
            let level = grades.get(&c.grade_id).map(|(l, _)| *l).unwrap_or(i32::MAX);
            (level, c.order)
        });

        Ok(capsules
            .into_iter()
            .filter(|c| !completed.contains(&c.id) && !attempted.contains(c.id.as_str()))
            .take(self.config.next_lessons_limit as usize)
            .map(|c| NextLesson {
                grade: grades
                    .get(&c.grade_id)
                    .map(|(_, name)| name.clone())
                    .unwrap_or_default(),
                subject: subjects.get(&c.subject_id).cloned().unwrap_or_default(),
                id: c.id,
                title: c.title,
            })
            .collect())
    }

    /// Candidate suggestions derived from subject classification: revision
    /// for each weakness, a next step for each strength.
    async fn build_candidates(
        &self,
        stats: &[SubjectStats],
        strengths: &[SubjectScore],
        weaknesses: &[SubjectScore],
        completed: &HashSet<String>,
    ) -> Result<Vec<RecommendationCandidate>, ApiError> {
        let mut candidates = Vec::new();

        for weakness in weaknesses {
            let Some(stat) = stats.iter().find(|s| s.subject_name == weakness.subject) else {
                continue;
            };
            let mut subject_capsules: Vec<CurriculumCapsule> = self
                .capsules()
                .find(doc! { "subject_id": &stat.subject_id, "is_published": true })
                .await?
                .try_collect()
                .await?;
            subject_capsules.sort_by_key(|c| c.order);

            if let Some(capsule) = subject_capsules.first() {
                candidates.push(RecommendationCandidate {
                    capsule_id: capsule.id.clone(),
                    capsule_title: capsule.title.clone(),
                    capsule_subject: stat.subject_name.clone(),
                    recommendation_type: RecommendationType::Revision,
                    reason: format!(
                        "Average score {:.0}% in {} — revision recommended",
                        weakness.score, weakness.subject
                    ),
                    priority: 1,
                    source_attempt_at: stat.last_attempt_at,
                });
            }
        }

        for strength in strengths {
            let Some(stat) = stats.iter().find(|s| s.subject_name == strength.subject) else {
                continue;
            };
            let mut subject_capsules: Vec<CurriculumCapsule> = self
                .capsules()
                .find(doc! { "subject_id": &stat.subject_id, "is_published": true })
                .await?
                .try_collect()
                .await?;
            subject_capsules.sort_by_key(|c| c.order);

            if let Some(capsule) = subject_capsules
                .iter()
                .find(|c| !completed.contains(&c.id))
            {
                candidates.push(RecommendationCandidate {
                    capsule_id: capsule.id.clone(),
                    capsule_title: capsule.title.clone(),
                    capsule_subject: stat.subject_name.clone(),
                    recommendation_type: RecommendationType::NextLesson,
                    reason: format!(
                        "Strong in {} ({:.0}%) — ready for the next lesson",
                        strength.subject, strength.score
                    ),
                    priority: 4,
                    source_attempt_at: stat.last_attempt_at,
                });
            }
        }

        // Weaknesses first: revision outranks progression.
        candidates.sort_by_key(|c| c.priority);
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn attempt(
        capsule: &str,
        subject: &str,
        percentage: f64,
        passed: bool,
        minutes_ago: i64,
    ) -> QuizAttempt {
        QuizAttempt {
            id: Uuid::new_v4().to_string(),
            learner_id: "l1".to_string(),
            quiz_id: format!("quiz-{}", capsule),
            capsule_id: capsule.to_string(),
            capsule_title: format!("Capsule {}", capsule),
            subject_id: format!("id-{}", subject),
            subject_name: subject.to_string(),
            score: 0,
            max_score: 10,
            percentage,
            passed,
            results: vec![],
            completed_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    fn config() -> AdaptiveConfig {
        AdaptiveConfig::default()
    }

    #[test]
    fn empty_history_summarizes_to_zero() {
        let performance = summarize(&[]);
        assert_eq!(performance.total_quizzes_taken, 0);
        assert_eq!(performance.pass_rate, 0.0);
        assert_eq!(performance.average_score, 0.0);

        assert!(subject_breakdown(&[]).is_empty());
        assert!(revision_candidates(&[], &config()).is_empty());
    }

    #[test]
    fn strong_threshold_is_inclusive() {
        let attempts = vec![
            attempt("c1", "Maths", 85.0, true, 30),
            attempt("c2", "Maths", 75.0, true, 20),
            attempt("c3", "Maths", 80.0, true, 10),
        ];
        let stats = subject_breakdown(&attempts);
        let (strengths, weaknesses) = classify(&stats, &config());

        assert_eq!(strengths.len(), 1);
        assert_eq!(strengths[0].subject, "Maths");
        assert_eq!(strengths[0].score, 80.0);
        assert!(weaknesses.is_empty());
    }

    #[test]
    fn middling_subject_is_neither_strength_nor_weakness() {
        let attempts = vec![
            attempt("c1", "History", 60.0, true, 30),
            attempt("c2", "History", 65.0, true, 20),
        ];
        let stats = subject_breakdown(&attempts);
        let (strengths, weaknesses) = classify(&stats, &config());
        assert!(strengths.is_empty());
        assert!(weaknesses.is_empty());
    }

    #[test]
    fn few_attempts_demote_the_level() {
        let cfg = config();
        // 90% average but only 2 attempts: mastery demotes to advanced.
        assert_eq!(level_for(90.0, 2, &cfg), DifficultyLevel::Advanced);
        assert_eq!(level_for(90.0, 3, &cfg), DifficultyLevel::Mastery);
        assert_eq!(level_for(40.0, 1, &cfg), DifficultyLevel::Beginner);
        assert_eq!(level_for(60.0, 5, &cfg), DifficultyLevel::Intermediate);
        assert_eq!(level_for(75.0, 5, &cfg), DifficultyLevel::Advanced);
    }

    #[test]
    fn consecutive_failures_need_revision() {
        let attempts = vec![
            attempt("c1", "Maths", 40.0, false, 60),
            attempt("c1", "Maths", 35.0, false, 30),
        ];
        let items = revision_candidates(&attempts, &config());
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].capsule, "c1");
    }

    #[test]
    fn pass_after_failure_clears_revision() {
        let attempts = vec![
            attempt("c1", "Maths", 40.0, false, 60),
            attempt("c1", "Maths", 90.0, true, 30),
        ];
        assert!(revision_candidates(&attempts, &config()).is_empty());
    }

    #[test]
    fn all_passes_never_need_revision() {
        let attempts = vec![
            attempt("c1", "Maths", 70.0, true, 60),
            attempt("c1", "Maths", 75.0, true, 30),
        ];
        assert!(revision_candidates(&attempts, &config()).is_empty());
    }

    fn candidate(capsule: &str, rec_type: RecommendationType, at: DateTime<Utc>) -> RecommendationCandidate {
        RecommendationCandidate {
            capsule_id: capsule.to_string(),
            capsule_title: format!("Capsule {}", capsule),
            capsule_subject: "Maths".to_string(),
            recommendation_type: rec_type,
            reason: "test".to_string(),
            priority: 1,
            source_attempt_at: at,
        }
    }

    #[test]
    fn active_recommendation_keeps_identity() {
        let now = Utc::now();
        let existing = vec![Recommendation {
            id: "stable-id".to_string(),
            learner_id: "l1".to_string(),
            capsule_id: "c1".to_string(),
            capsule_title: "Capsule c1".to_string(),
            capsule_subject: "Maths".to_string(),
            recommendation_type: RecommendationType::Revision,
            reason: "old".to_string(),
            priority: 1,
            dismissed: false,
            dismissed_at: None,
            source_attempt_at: now - Duration::hours(1),
            created_at: now - Duration::hours(1),
        }];

        let (to_insert, active) = plan_recommendations(
            "l1",
            &existing,
            vec![candidate("c1", RecommendationType::Revision, now)],
            10,
            now,
        );
        assert!(to_insert.is_empty());
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "stable-id");
    }

    #[test]
    fn dismissed_stays_gone_without_newer_attempt() {
        let now = Utc::now();
        let existing = vec![Recommendation {
            id: "r1".to_string(),
            learner_id: "l1".to_string(),
            capsule_id: "c1".to_string(),
            capsule_title: "Capsule c1".to_string(),
            capsule_subject: "Maths".to_string(),
            recommendation_type: RecommendationType::Revision,
            reason: "old".to_string(),
            priority: 1,
            dismissed: true,
            dismissed_at: Some(now),
            source_attempt_at: now - Duration::hours(2),
            created_at: now - Duration::hours(2),
        }];

        // Candidate sourced from an attempt older than the dismissal.
        let (to_insert, active) = plan_recommendations(
            "l1",
            &existing,
            vec![candidate(
                "c1",
                RecommendationType::Revision,
                now - Duration::hours(1),
            )],
            10,
            now,
        );
        assert!(to_insert.is_empty());
        assert!(active.is_empty());
    }

    #[test]
    fn newer_attempt_resurfaces_dismissed_recommendation() {
        let now = Utc::now();
        let existing = vec![Recommendation {
            id: "r1".to_string(),
            learner_id: "l1".to_string(),
            capsule_id: "c1".to_string(),
            capsule_title: "Capsule c1".to_string(),
            capsule_subject: "Maths".to_string(),
            recommendation_type: RecommendationType::Revision,
            reason: "old".to_string(),
            priority: 1,
            dismissed: true,
            dismissed_at: Some(now - Duration::hours(1)),
            source_attempt_at: now - Duration::hours(2),
            created_at: now - Duration::hours(2),
        }];

        let (to_insert, _) = plan_recommendations(
            "l1",
            &existing,
            vec![candidate("c1", RecommendationType::Revision, now)],
            10,
            now,
        );
        assert_eq!(to_insert.len(), 1);
        assert_ne!(to_insert[0].id, "r1");
    }

    #[test]
    fn active_practice_recommendation_survives_replanning() {
        // Practice/mastery instances come from attempt analysis, never from
        // the subject classifier, so an empty candidate list must not drop
        // them from the snapshot.
        let now = Utc::now();
        let existing = vec![Recommendation {
            id: "r-practice".to_string(),
            learner_id: "l1".to_string(),
            capsule_id: "c1".to_string(),
            capsule_title: "Capsule c1".to_string(),
            capsule_subject: "Maths".to_string(),
            recommendation_type: RecommendationType::Practice,
            reason: "Scored 65% — more practice will help".to_string(),
            priority: 3,
            dismissed: false,
            dismissed_at: None,
            source_attempt_at: now - Duration::hours(1),
            created_at: now - Duration::hours(1),
        }];

        let (to_insert, active) = plan_recommendations("l1", &existing, vec![], 10, now);
        assert!(to_insert.is_empty());
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "r-practice");
        assert_eq!(
            active[0].recommendation_type,
            RecommendationType::Practice
        );
    }

    #[test]
    fn dismissed_instances_are_not_carried_over() {
        let now = Utc::now();
        let existing = vec![Recommendation {
            id: "r-gone".to_string(),
            learner_id: "l1".to_string(),
            capsule_id: "c1".to_string(),
            capsule_title: "Capsule c1".to_string(),
            capsule_subject: "Maths".to_string(),
            recommendation_type: RecommendationType::Mastery,
            reason: "old".to_string(),
            priority: 10,
            dismissed: true,
            dismissed_at: Some(now - Duration::hours(1)),
            source_attempt_at: now - Duration::hours(2),
            created_at: now - Duration::hours(2),
        }];

        let (to_insert, active) = plan_recommendations("l1", &existing, vec![], 10, now);
        assert!(to_insert.is_empty());
        assert!(active.is_empty());
    }

    #[test]
    fn recommendation_count_is_capped() {
        let now = Utc::now();
        let candidates: Vec<_> = (0..20)
            .map(|i| candidate(&format!("c{}", i), RecommendationType::Revision, now))
            .collect();
        let (to_insert, active) = plan_recommendations("l1", &[], candidates, 10, now);
        assert_eq!(to_insert.len() + active.len(), 10);
    }
}
