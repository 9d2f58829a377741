use std::collections::HashMap;

use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Collection, Database};
use uuid::Uuid;

use crate::error::ApiError;
use crate::metrics::{record_graded, QUIZ_ATTEMPTS_SAVED_TOTAL};
use crate::models::quiz::{
    Question, QuestionResult, Quiz, QuizAttempt, QuizResultResponse,
};
use crate::models::CurriculumCapsule;
use crate::models::Subject;
use crate::utils::text::normalize_answer;

/// Pure scoring result, independent of persistence.
#[derive(Debug, Clone, PartialEq)]
pub struct GradedSubmission {
    pub score: u32,
    pub max_score: u32,
    pub percentage: f64,
    pub passed: bool,
    pub results: Vec<QuestionResult>,
}

/// Scores a submission against a question set. Deterministic: same questions
/// and answers always produce the same grade.
///
/// Every question is worth one point. A missing answer is incorrect; answer
/// ids not present in the quiz are ignored. Comparison is on the normalized
/// form (trimmed, lowercased). The pass boundary is inclusive: percentage
/// equal to `passing_score` passes. An empty question set grades to
/// 0/0 = 0% and fails.
pub fn score_submission(
    questions: &[Question],
    answers: &HashMap<String, String>,
    passing_score: u32,
) -> GradedSubmission {
    let max_score = questions.len() as u32;
    let mut score = 0u32;
    let mut results = Vec::with_capacity(questions.len());

    let known_ids: std::collections::HashSet<&str> =
        questions.iter().map(|q| q.id.as_str()).collect();
    for submitted_id in answers.keys() {
        if !known_ids.contains(submitted_id.as_str()) {
            tracing::warn!("Ignoring answer for unknown question id {}", submitted_id);
        }
    }

    for question in questions {
        let user_answer = answers.get(&question.id).cloned().unwrap_or_default();
        let is_correct = !user_answer.is_empty()
            && normalize_answer(&user_answer) == normalize_answer(&question.correct_answer);
        if is_correct {
            score += 1;
        }

        results.push(QuestionResult {
            question_id: question.id.clone(),
            question_text: question.question_text.clone(),
            user_answer,
            is_correct,
            correct_answer: question.correct_answer.clone(),
            explanation: if question.explanation.is_empty() {
                None
            } else {
                Some(question.explanation.clone())
            },
        });
    }

    let percentage = if max_score > 0 {
        (score as f64 / max_score as f64) * 100.0
    } else {
        0.0
    };
    let passed = max_score > 0 && percentage >= passing_score as f64;

    GradedSubmission {
        score,
        max_score,
        percentage,
        passed,
        results,
    }
}

pub struct GradingService {
    mongo: Database,
}

impl GradingService {
    pub fn new(mongo: Database) -> Self {
        Self { mongo }
    }

    fn attempts(&self) -> Collection<QuizAttempt> {
        self.mongo.collection("quiz_attempts")
    }

    /// Grades a submission and, for an identified learner, records a new
    /// attempt. Earlier attempts are never overwritten. Anonymous
    /// submissions are graded but leave no trace.
    pub async fn submit(
        &self,
        quiz_id: &str,
        learner_id: Option<&str>,
        answers: &HashMap<String, String>,
    ) -> Result<QuizResultResponse, ApiError> {
        let quizzes: Collection<Quiz> = self.mongo.collection("quizzes");
        let quiz = quizzes
            .find_one(doc! { "_id": quiz_id })
            .await?
            .ok_or_else(|| ApiError::not_found("quiz", quiz_id))?;

        let graded = score_submission(&quiz.questions, answers, quiz.passing_score);
        record_graded(graded.passed);

        tracing::info!(
            "Graded quiz {}: {}/{} ({:.1}%), passed={}",
            quiz_id,
            graded.score,
            graded.max_score,
            graded.percentage,
            graded.passed
        );

        let attempt_id = if let Some(learner) = learner_id {
            Some(self.save_attempt(learner, &quiz, &graded).await?)
        } else {
            None
        };

        Ok(QuizResultResponse {
            score: graded.score,
            max_score: graded.max_score,
            percentage: graded.percentage,
            passed: graded.passed,
            passing_score: quiz.passing_score,
            results: graded.results,
            attempt_id,
        })
    }

    /// Attempt history for one learner, newest first.
    pub async fn attempts_for_learner(
        &self,
        learner_id: &str,
        subject_id: Option<&str>,
    ) -> Result<Vec<QuizAttempt>, ApiError> {
        let mut filter = doc! { "learner_id": learner_id };
        if let Some(subject) = subject_id {
            filter.insert("subject_id", subject);
        }
        let cursor = self
            .attempts()
            .find(filter)
            .sort(doc! { "completed_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn get_attempt(&self, attempt_id: &str) -> Result<QuizAttempt, ApiError> {
        self.attempts()
            .find_one(doc! { "_id": attempt_id })
            .await?
            .ok_or_else(|| ApiError::not_found("attempt", attempt_id))
    }

    async fn save_attempt(
        &self,
        learner_id: &str,
        quiz: &Quiz,
        graded: &GradedSubmission,
    ) -> Result<String, ApiError> {
        // Denormalize capsule/subject so pathway queries skip joins. If the
        // lookup fails the attempt is still recorded with blank labels.
        let capsules: Collection<CurriculumCapsule> = self.mongo.collection("capsules");
        let capsule = capsules.find_one(doc! { "_id": &quiz.capsule_id }).await?;

        let (capsule_title, subject_id) = capsule
            .map(|c| (c.title, c.subject_id))
            .unwrap_or_default();

        let subject_name = if subject_id.is_empty() {
            String::new()
        } else {
            let subjects: Collection<Subject> = self.mongo.collection("subjects");
            subjects
                .find_one(doc! { "_id": &subject_id })
                .await?
                .map(|s| s.name)
                .unwrap_or_default()
        };

        let attempt = QuizAttempt {
            id: Uuid::new_v4().to_string(),
            learner_id: learner_id.to_string(),
            quiz_id: quiz.id.clone(),
            capsule_id: quiz.capsule_id.clone(),
            capsule_title,
            subject_id,
            subject_name,
            score: graded.score,
            max_score: graded.max_score,
            percentage: graded.percentage,
            passed: graded.passed,
            results: graded.results.clone(),
            completed_at: Utc::now(),
        };

        self.attempts().insert_one(&attempt).await?;
        QUIZ_ATTEMPTS_SAVED_TOTAL.inc();
        tracing::info!(
            "Saved attempt {} for learner {} on quiz {}",
            attempt.id,
            learner_id,
            quiz.id
        );
        Ok(attempt.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::quiz::QuestionType;

    fn question(id: &str, correct: &str) -> Question {
        Question {
            id: id.to_string(),
            question_text: format!("Question {}", id),
            question_type: QuestionType::MultipleChoice,
            options: vec![],
            correct_answer: correct.to_string(),
            explanation: String::new(),
            order: 0,
        }
    }

    #[test]
    fn pass_boundary_is_inclusive() {
        let questions = vec![
            question("q1", "a"),
            question("q2", "b"),
            question("q3", "c"),
            question("q4", "d"),
        ];
        let answers: HashMap<String, String> = [
            ("q1".to_string(), "a".to_string()),
            ("q2".to_string(), "b".to_string()),
        ]
        .into();

        let graded = score_submission(&questions, &answers, 50);
        assert_eq!(graded.score, 2);
        assert_eq!(graded.max_score, 4);
        assert_eq!(graded.percentage, 50.0);
        assert!(graded.passed);
    }

    #[test]
    fn missing_answers_count_as_incorrect() {
        let questions = vec![question("q1", "a"), question("q2", "b")];
        let answers: HashMap<String, String> = [("q1".to_string(), "a".to_string())].into();

        let graded = score_submission(&questions, &answers, 80);
        assert_eq!(graded.score, 1);
        assert!(!graded.passed);
        assert_eq!(graded.results.len(), 2);
        assert!(!graded.results[1].is_correct);
        assert_eq!(graded.results[1].user_answer, "");
    }

    #[test]
    fn unknown_question_ids_are_ignored() {
        let questions = vec![question("q1", "a")];
        let answers: HashMap<String, String> = [
            ("q1".to_string(), "a".to_string()),
            ("ghost".to_string(), "x".to_string()),
        ]
        .into();

        let graded = score_submission(&questions, &answers, 100);
        assert_eq!(graded.score, 1);
        assert_eq!(graded.max_score, 1);
        assert!(graded.passed);
        assert_eq!(graded.results.len(), 1);
    }

    #[test]
    fn comparison_normalizes_case_and_whitespace() {
        let questions = vec![question("q1", "Paris")];
        let answers: HashMap<String, String> =
            [("q1".to_string(), "  pArIs  ".to_string())].into();

        let graded = score_submission(&questions, &answers, 100);
        assert!(graded.results[0].is_correct);
    }

    #[test]
    fn empty_quiz_grades_to_zero_and_fails() {
        let graded = score_submission(&[], &HashMap::new(), 0);
        assert_eq!(graded.score, 0);
        assert_eq!(graded.max_score, 0);
        assert_eq!(graded.percentage, 0.0);
        assert!(!graded.passed);
    }

    #[test]
    fn grading_is_deterministic() {
        let questions = vec![question("q1", "a"), question("q2", "b"), question("q3", "c")];
        let answers: HashMap<String, String> = [
            ("q1".to_string(), "a".to_string()),
            ("q2".to_string(), "wrong".to_string()),
            ("q3".to_string(), "c".to_string()),
        ]
        .into();

        let first = score_submission(&questions, &answers, 60);
        let second = score_submission(&questions, &answers, 60);
        assert_eq!(first, second);
        assert_eq!(first.score, 2);
        assert!(first.passed);
    }

    #[test]
    fn score_never_exceeds_max() {
        let questions = vec![question("q1", "a")];
        let answers: HashMap<String, String> = [
            ("q1".to_string(), "a".to_string()),
            ("q1-dup".to_string(), "a".to_string()),
        ]
        .into();

        let graded = score_submission(&questions, &answers, 100);
        assert!(graded.score <= graded.max_score);
        assert!(graded.percentage <= 100.0);
    }
}
