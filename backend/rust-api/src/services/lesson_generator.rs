use std::collections::HashMap;

use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Collection, Database};
use redis::aio::ConnectionManager;
use uuid::Uuid;
use validator::Validate;

use crate::config::Config;
use crate::error::ApiError;
use crate::metrics::{record_generation, LESSONS_PUBLISHED_TOTAL};
use crate::models::chapter::{
    BatchGenerateRequest, BatchGenerationReport, BatchItemFailure, BatchItemSkipped,
    BatchItemSuccess, ChapterQuery, ChapterStatistics, ChapterStatus, ChapterSummary,
    ChapterValidation, CreateChapterRequest, TextbookChapter,
};
use crate::models::lesson::{
    GeneratedLesson, LessonDraft, LessonQuery, LessonStatistics, LessonStatus, ReviewDecision,
    ReviewLessonRequest, SectionType,
};
use crate::models::quiz::{Question, Quiz};
use crate::models::{CurriculumCapsule, Grade, Subject};
use crate::utils::text::word_count;

use super::strategies::{
    ExternalAiGenerator, GenerationContext, LessonStrategy, RuleBasedGenerator,
};

/// Heuristic completeness measure for a draft, in [0, 1]. Not a pedagogy
/// judgment, only a structural one: does the draft have enough of each part.
pub fn quality_score(draft: &LessonDraft, min_sections: usize, min_questions: usize) -> f64 {
    let mut score = 0.0;

    if !draft.title.trim().is_empty() {
        score += 0.1;
    }
    score += (draft.learning_objectives.len().min(5) as f64 / 5.0) * 0.2;
    score += (draft.key_concepts.len().min(4) as f64 / 4.0) * 0.15;
    score += (draft.sections.len().min(min_sections) as f64 / min_sections as f64) * 0.2;
    if draft.sections.iter().any(|s| {
        matches!(s.section_type, SectionType::Example | SectionType::Practice)
    }) {
        score += 0.05;
    }
    score += (draft.questions.len().min(min_questions) as f64 / min_questions as f64) * 0.2;
    if draft.introduction.len() >= 100 {
        score += 0.1;
    }

    score.clamp(0.0, 1.0)
}

/// Orchestrates chapter intake, lesson generation, review and publication.
pub struct LessonGeneratorService {
    mongo: Database,
    redis: ConnectionManager,
    config: Config,
}

impl LessonGeneratorService {
    pub fn new(mongo: Database, redis: ConnectionManager, config: Config) -> Self {
        Self {
            mongo,
            redis,
            config,
        }
    }

    fn chapters(&self) -> Collection<TextbookChapter> {
        self.mongo.collection("chapters")
    }

    fn lessons(&self) -> Collection<GeneratedLesson> {
        self.mongo.collection("generated_lessons")
    }

    fn capsules(&self) -> Collection<CurriculumCapsule> {
        self.mongo.collection("capsules")
    }

    fn quizzes(&self) -> Collection<Quiz> {
        self.mongo.collection("quizzes")
    }

    pub async fn create_chapter(
        &self,
        req: CreateChapterRequest,
        uploaded_by: Option<String>,
    ) -> Result<TextbookChapter, ApiError> {
        req.validate()?;

        let subjects: Collection<Subject> = self.mongo.collection("subjects");
        subjects
            .find_one(doc! { "_id": &req.subject_id })
            .await?
            .ok_or_else(|| ApiError::not_found("subject", &req.subject_id))?;
        let grades: Collection<Grade> = self.mongo.collection("grades");
        grades
            .find_one(doc! { "_id": &req.grade_id })
            .await?
            .ok_or_else(|| ApiError::not_found("grade", &req.grade_id))?;

        let now = Utc::now();
        let chapter = TextbookChapter {
            id: Uuid::new_v4().to_string(),
            title: req.title,
            subject_id: req.subject_id,
            grade_id: req.grade_id,
            source_book: req.source_book,
            word_count: word_count(&req.raw_content),
            raw_content: req.raw_content,
            status: ChapterStatus::Uploaded,
            processing_notes: None,
            uploaded_by,
            created_at: now,
            updated_at: now,
        };
        self.chapters().insert_one(&chapter).await?;
        tracing::info!(
            "Chapter {} uploaded ({} words)",
            chapter.id,
            chapter.word_count
        );
        Ok(chapter)
    }

    pub async fn list_chapters(
        &self,
        query: &ChapterQuery,
    ) -> Result<Vec<TextbookChapter>, ApiError> {
        let mut filter = doc! {};
        if let Some(status) = query.status {
            filter.insert("status", status.as_str());
        }
        if let Some(subject) = &query.subject {
            filter.insert("subject_id", subject);
        }
        if let Some(grade) = &query.grade {
            filter.insert("grade_id", grade);
        }
        let cursor = self
            .chapters()
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn get_chapter(&self, chapter_id: &str) -> Result<TextbookChapter, ApiError> {
        self.chapters()
            .find_one(doc! { "_id": chapter_id })
            .await?
            .ok_or_else(|| ApiError::not_found("chapter", chapter_id))
    }

    /// Pre-flight check a chapter without touching its status.
    pub fn validate_chapter(&self, chapter: &TextbookChapter) -> ChapterValidation {
        let mut warnings = Vec::new();
        let min = self.config.generation.min_word_count as u32;
        if chapter.word_count < min {
            warnings.push(format!(
                "chapter has {} words, minimum is {}",
                chapter.word_count, min
            ));
        }
        if chapter.word_count > 50_000 {
            warnings.push("chapter is very long; consider splitting it".to_string());
        }
        if !chapter.status.can_generate() {
            warnings.push(format!(
                "chapter status is {}, generation not allowed",
                chapter.status.as_str()
            ));
        }
        ChapterValidation {
            is_valid: warnings.is_empty(),
            word_count: chapter.word_count,
            warnings,
        }
    }

    /// Runs the pipeline for one chapter: validate, mark processing, run the
    /// chosen strategy (external AI falls back to rule-based), score, store
    /// the draft. The chapter ends up `generated`, or `failed` only when no
    /// strategy produced a draft.
    pub async fn generate_for_chapter(
        &self,
        chapter_id: &str,
        use_external_ai: bool,
    ) -> Result<GeneratedLesson, ApiError> {
        let mut chapter = self.get_chapter(chapter_id).await?;

        if (chapter.word_count as usize) < self.config.generation.min_word_count {
            return Err(ApiError::Validation(format!(
                "chapter has {} words, minimum for generation is {}",
                chapter.word_count, self.config.generation.min_word_count
            )));
        }
        if !chapter.status.can_generate() {
            return Err(ApiError::Conflict(format!(
                "chapter is {} and cannot be generated",
                chapter.status.as_str()
            )));
        }

        self.set_chapter_status(&mut chapter, ChapterStatus::Processing, None)
            .await?;

        let ctx = self.context_for(&chapter).await?;
        let (draft, strategy_name) = match self.run_strategies(&ctx, use_external_ai).await {
            Ok(result) => result,
            Err(reason) => {
                self.set_chapter_status(&mut chapter, ChapterStatus::Failed, Some(reason.clone()))
                    .await?;
                record_generation("external_ai", false);
                return Err(ApiError::ExternalService(reason));
            }
        };

        let score = quality_score(
            &draft,
            self.config.generation.min_sections,
            self.config.generation.min_questions,
        );

        let lesson = GeneratedLesson {
            id: Uuid::new_v4().to_string(),
            chapter_id: chapter.id.clone(),
            title: draft.title,
            introduction: draft.introduction,
            learning_objectives: draft.learning_objectives,
            key_concepts: draft.key_concepts,
            sections: draft.sections,
            questions: draft.questions,
            estimated_duration: draft.estimated_duration,
            difficulty_level: draft.difficulty_level,
            quality_score: score,
            ai_model_used: strategy_name.to_string(),
            status: LessonStatus::Draft,
            review_notes: None,
            reviewed_by: None,
            reviewed_at: None,
            published_capsule_id: None,
            created_at: Utc::now(),
        };
        self.lessons().insert_one(&lesson).await?;
        self.set_chapter_status(&mut chapter, ChapterStatus::Generated, None)
            .await?;

        record_generation(strategy_name, true);
        tracing::info!(
            "Generated lesson {} from chapter {} via {} (quality {:.2})",
            lesson.id,
            chapter.id,
            strategy_name,
            score
        );
        Ok(lesson)
    }

    /// Sequential batch run. One chapter failing or being in the wrong state
    /// never aborts the rest; the report carries one entry per chapter.
    pub async fn batch_generate(
        &self,
        req: &BatchGenerateRequest,
    ) -> Result<BatchGenerationReport, ApiError> {
        let mut report = BatchGenerationReport::default();

        for chapter_id in &req.chapter_ids {
            let chapter = match self.get_chapter(chapter_id).await {
                Ok(chapter) => chapter,
                Err(_) => {
                    report.failed.push(BatchItemFailure {
                        chapter_id: chapter_id.clone(),
                        title: String::new(),
                        reason: "chapter not found".to_string(),
                    });
                    continue;
                }
            };

            if !chapter.status.can_generate() {
                report.skipped.push(BatchItemSkipped {
                    chapter_id: chapter.id.clone(),
                    title: chapter.title.clone(),
                    reason: format!("status is {}", chapter.status.as_str()),
                });
                continue;
            }

            match self
                .generate_for_chapter(chapter_id, req.use_external_ai)
                .await
            {
                Ok(lesson) => report.success.push(BatchItemSuccess {
                    chapter_id: chapter.id,
                    lesson_id: lesson.id,
                    title: lesson.title,
                }),
                Err(e) => report.failed.push(BatchItemFailure {
                    chapter_id: chapter.id,
                    title: chapter.title,
                    reason: e.to_string(),
                }),
            }
        }

        tracing::info!(
            "Batch generation: {} ok, {} failed, {} skipped",
            report.success.len(),
            report.failed.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    pub async fn list_lessons(&self, query: &LessonQuery) -> Result<Vec<GeneratedLesson>, ApiError> {
        let mut filter = doc! {};
        if let Some(status) = query.status {
            filter.insert("status", status.as_str());
        }
        if query.unpublished == Some(true) {
            filter.insert("published_capsule_id", mongodb::bson::Bson::Null);
        }
        let cursor = self
            .lessons()
            .find(filter)
            .sort(doc! { "created_at": -1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn get_lesson(&self, lesson_id: &str) -> Result<GeneratedLesson, ApiError> {
        self.lessons()
            .find_one(doc! { "_id": lesson_id })
            .await?
            .ok_or_else(|| ApiError::not_found("lesson", lesson_id))
    }

    /// Approve or reject a draft. Only drafts are reviewable; re-reviewing a
    /// settled lesson is a conflict.
    pub async fn review(
        &self,
        lesson_id: &str,
        reviewer: &str,
        req: &ReviewLessonRequest,
    ) -> Result<GeneratedLesson, ApiError> {
        let mut lesson = self.get_lesson(lesson_id).await?;
        if !lesson.status.can_review() {
            return Err(ApiError::Conflict(format!(
                "lesson is {} and cannot be reviewed",
                lesson.status.as_str()
            )));
        }

        lesson.status = match req.status {
            ReviewDecision::Approved => LessonStatus::Approved,
            ReviewDecision::Rejected => LessonStatus::Rejected,
        };
        lesson.review_notes = if req.review_notes.is_empty() {
            None
        } else {
            Some(req.review_notes.clone())
        };
        lesson.reviewed_by = Some(reviewer.to_string());
        lesson.reviewed_at = Some(Utc::now());

        self.lessons()
            .replace_one(doc! { "_id": lesson_id }, &lesson)
            .await?;
        tracing::info!(
            "Lesson {} reviewed by {}: {}",
            lesson_id,
            reviewer,
            lesson.status.as_str()
        );
        Ok(lesson)
    }

    /// Publishes an approved lesson: creates a capsule and its quiz, then
    /// marks the lesson published. If the quiz insert or lesson update fails,
    /// the already-inserted documents are deleted so no half-published
    /// capsule is ever visible.
    pub async fn publish(&self, lesson_id: &str) -> Result<CurriculumCapsule, ApiError> {
        let mut lesson = self.get_lesson(lesson_id).await?;
        if !lesson.status.can_publish() {
            return Err(ApiError::Conflict(format!(
                "lesson is {} and cannot be published; approval required",
                lesson.status.as_str()
            )));
        }
        let mut chapter = self.get_chapter(&lesson.chapter_id).await?;

        let now = Utc::now();
        let content = lesson
            .sections
            .iter()
            .map(|s| format!("## {}\n\n{}", s.title, s.content))
            .collect::<Vec<_>>()
            .join("\n\n");

        let capsule = CurriculumCapsule {
            id: Uuid::new_v4().to_string(),
            title: lesson.title.clone(),
            subject_id: chapter.subject_id.clone(),
            grade_id: chapter.grade_id.clone(),
            description: lesson.introduction.clone(),
            content,
            objectives: lesson.learning_objectives.clone(),
            order: 0,
            estimated_duration: lesson.estimated_duration,
            is_published: true,
            featured: false,
            created_at: now,
            updated_at: now,
        };
        self.capsules().insert_one(&capsule).await?;

        let quiz = Quiz {
            id: Uuid::new_v4().to_string(),
            capsule_id: capsule.id.clone(),
            title: format!("{} — Quiz", lesson.title),
            instructions: "Answer all questions to check your understanding.".to_string(),
            passing_score: self.config.generation.default_passing_score,
            questions: lesson
                .questions
                .iter()
                .map(|q| Question {
                    id: Uuid::new_v4().to_string(),
                    question_text: q.question_text.clone(),
                    question_type: q.question_type,
                    options: q.options.clone(),
                    correct_answer: q.correct_answer.clone(),
                    explanation: q.explanation.clone(),
                    order: q.order,
                })
                .collect(),
            created_at: now,
        };
        if let Err(e) = self.quizzes().insert_one(&quiz).await {
            self.capsules().delete_one(doc! { "_id": &capsule.id }).await?;
            return Err(e.into());
        }

        lesson.status = LessonStatus::Published;
        lesson.published_capsule_id = Some(capsule.id.clone());
        if let Err(e) = self
            .lessons()
            .replace_one(doc! { "_id": lesson_id }, &lesson)
            .await
        {
            self.quizzes().delete_one(doc! { "_id": &quiz.id }).await?;
            self.capsules().delete_one(doc! { "_id": &capsule.id }).await?;
            return Err(e.into());
        }

        self.set_chapter_status(&mut chapter, ChapterStatus::Published, None)
            .await?;

        LESSONS_PUBLISHED_TOTAL.inc();
        tracing::info!(
            "Published lesson {} as capsule {} with quiz {}",
            lesson_id,
            capsule.id,
            quiz.id
        );
        Ok(capsule)
    }

    /// Re-runs generation for a draft or rejected lesson, replacing its
    /// content in place and returning it to draft.
    pub async fn regenerate(
        &self,
        lesson_id: &str,
        use_external_ai: bool,
    ) -> Result<GeneratedLesson, ApiError> {
        let mut lesson = self.get_lesson(lesson_id).await?;
        if !lesson.status.can_regenerate() {
            return Err(ApiError::Conflict(format!(
                "lesson is {} and cannot be regenerated",
                lesson.status.as_str()
            )));
        }
        let chapter = self.get_chapter(&lesson.chapter_id).await?;
        let ctx = self.context_for(&chapter).await?;

        let (draft, strategy_name) = self
            .run_strategies(&ctx, use_external_ai)
            .await
            .map_err(ApiError::ExternalService)?;

        lesson.title = draft.title;
        lesson.introduction = draft.introduction;
        lesson.learning_objectives = draft.learning_objectives;
        lesson.key_concepts = draft.key_concepts;
        lesson.sections = draft.sections;
        lesson.questions = draft.questions;
        lesson.estimated_duration = draft.estimated_duration;
        lesson.difficulty_level = draft.difficulty_level;
        lesson.quality_score = quality_score(
            &lesson_draft_view(&lesson),
            self.config.generation.min_sections,
            self.config.generation.min_questions,
        );
        lesson.ai_model_used = strategy_name.to_string();
        lesson.status = LessonStatus::Draft;
        lesson.review_notes = None;
        lesson.reviewed_by = None;
        lesson.reviewed_at = None;

        self.lessons()
            .replace_one(doc! { "_id": lesson_id }, &lesson)
            .await?;
        record_generation(strategy_name, true);
        Ok(lesson)
    }

    /// Rebuilds only the question set of a draft or rejected lesson from its
    /// chapter, keeping the rest of the content.
    pub async fn regenerate_questions(
        &self,
        lesson_id: &str,
    ) -> Result<GeneratedLesson, ApiError> {
        let mut lesson = self.get_lesson(lesson_id).await?;
        if !lesson.status.can_regenerate() {
            return Err(ApiError::Conflict(format!(
                "lesson is {} and cannot be regenerated",
                lesson.status.as_str()
            )));
        }
        let chapter = self.get_chapter(&lesson.chapter_id).await?;

        let content = super::rule_based::preprocess(&chapter.raw_content);
        lesson.questions = super::rule_based::build_questions(
            &content,
            &lesson.title,
            &lesson.key_concepts,
            &lesson.learning_objectives,
            &self.config.generation,
        );
        lesson.quality_score = quality_score(
            &lesson_draft_view(&lesson),
            self.config.generation.min_sections,
            self.config.generation.min_questions,
        );

        self.lessons()
            .replace_one(doc! { "_id": lesson_id }, &lesson)
            .await?;
        tracing::info!(
            "Regenerated {} questions for lesson {}",
            lesson.questions.len(),
            lesson_id
        );
        Ok(lesson)
    }

    pub async fn chapter_statistics(&self) -> Result<ChapterStatistics, ApiError> {
        let all: Vec<TextbookChapter> =
            self.chapters().find(doc! {}).await?.try_collect().await?;

        let mut by_status: HashMap<String, u64> = HashMap::new();
        let mut by_subject: HashMap<String, u64> = HashMap::new();
        for chapter in &all {
            *by_status.entry(chapter.status.as_str().to_string()).or_insert(0) += 1;
            *by_subject.entry(chapter.subject_id.clone()).or_insert(0) += 1;
        }

        let mut recent: Vec<&TextbookChapter> = all.iter().collect();
        recent.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(ChapterStatistics {
            total_chapters: all.len() as u64,
            by_status,
            by_subject,
            recent_uploads: recent.into_iter().take(5).map(ChapterSummary::from).collect(),
        })
    }

    pub async fn lesson_statistics(&self) -> Result<LessonStatistics, ApiError> {
        let all: Vec<GeneratedLesson> =
            self.lessons().find(doc! {}).await?.try_collect().await?;

        let mut by_status: HashMap<String, u64> = HashMap::new();
        for lesson in &all {
            *by_status.entry(lesson.status.as_str().to_string()).or_insert(0) += 1;
        }
        let published = all
            .iter()
            .filter(|l| l.published_capsule_id.is_some())
            .count() as u64;
        let average_quality = if all.is_empty() {
            0.0
        } else {
            all.iter().map(|l| l.quality_score).sum::<f64>() / all.len() as f64
        };

        Ok(LessonStatistics {
            total_lessons: all.len() as u64,
            by_status,
            published_count: published,
            average_quality_score: average_quality,
            total_sections: all.iter().map(|l| l.sections.len() as u64).sum(),
            total_questions: all.iter().map(|l| l.questions.len() as u64).sum(),
        })
    }

    async fn context_for(&self, chapter: &TextbookChapter) -> Result<GenerationContext, ApiError> {
        let subjects: Collection<Subject> = self.mongo.collection("subjects");
        let subject = subjects
            .find_one(doc! { "_id": &chapter.subject_id })
            .await?
            .ok_or_else(|| ApiError::not_found("subject", &chapter.subject_id))?;
        let grades: Collection<Grade> = self.mongo.collection("grades");
        let grade = grades
            .find_one(doc! { "_id": &chapter.grade_id })
            .await?
            .ok_or_else(|| ApiError::not_found("grade", &chapter.grade_id))?;

        Ok(GenerationContext {
            chapter_title: chapter.title.clone(),
            subject_name: subject.name,
            grade_name: grade.name,
            grade_level: grade.level,
            content: chapter.raw_content.clone(),
        })
    }

    /// External AI first when requested, rule-based as fallback and default.
    async fn run_strategies(
        &self,
        ctx: &GenerationContext,
        use_external_ai: bool,
    ) -> Result<(LessonDraft, &'static str), String> {
        if use_external_ai {
            match ExternalAiGenerator::new(self.config.ai.clone(), self.redis.clone()) {
                Ok(external) => match external.generate(ctx).await {
                    Ok(draft) => return Ok((draft, external.name())),
                    Err(e) => {
                        tracing::warn!(
                            "External AI generation failed, falling back to rule-based: {}",
                            e
                        );
                        record_generation("external_ai", false);
                    }
                },
                Err(e) => {
                    tracing::warn!("External AI client unavailable: {}", e);
                    record_generation("external_ai", false);
                }
            }
        }

        let rule_based = RuleBasedGenerator::new(self.config.generation.clone());
        match rule_based.generate(ctx).await {
            Ok(draft) => Ok((draft, rule_based.name())),
            Err(e) => Err(format!("all generation strategies failed: {}", e)),
        }
    }

    async fn set_chapter_status(
        &self,
        chapter: &mut TextbookChapter,
        status: ChapterStatus,
        notes: Option<String>,
    ) -> Result<(), ApiError> {
        chapter.status = status;
        chapter.processing_notes = notes;
        chapter.updated_at = Utc::now();
        self.chapters()
            .replace_one(doc! { "_id": &chapter.id }, &*chapter)
            .await?;
        Ok(())
    }
}

fn lesson_draft_view(lesson: &GeneratedLesson) -> LessonDraft {
    LessonDraft {
        title: lesson.title.clone(),
        introduction: lesson.introduction.clone(),
        learning_objectives: lesson.learning_objectives.clone(),
        key_concepts: lesson.key_concepts.clone(),
        sections: lesson.sections.clone(),
        questions: lesson.questions.clone(),
        estimated_duration: lesson.estimated_duration,
        difficulty_level: lesson.difficulty_level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GenerationConfig;
    use crate::services::rule_based::build_draft;

    const RICH_CHAPTER: &str = "\
# The Water Cycle

Evaporation is the process by which liquid water becomes vapor and rises into the air.

Students will be able to explain how water moves between the ground, the air and the clouds.

Condensation is the change of water vapor into liquid droplets that form clouds. Precipitation is water falling from clouds as rain or snow.

For example, consider a puddle drying up on a warm day and the same water later returning as rain.

Water collects in rivers, lakes and oceans before the cycle begins again. The sun is the engine that drives the whole cycle. Exercise: try this yourself by leaving a glass of water on a windowsill.";

    #[test]
    fn quality_score_stays_in_unit_interval() {
        let cfg = GenerationConfig::default();
        let draft = build_draft("The Water Cycle", 4, RICH_CHAPTER, &cfg);
        let score = quality_score(&draft, cfg.min_sections, cfg.min_questions);
        assert!((0.0..=1.0).contains(&score));
        // A well-formed chapter should score reasonably high.
        assert!(score > 0.5);
    }

    #[test]
    fn empty_draft_scores_near_zero() {
        let draft = LessonDraft {
            title: String::new(),
            introduction: String::new(),
            learning_objectives: vec![],
            key_concepts: vec![],
            sections: vec![],
            questions: vec![],
            estimated_duration: 15,
            difficulty_level: crate::models::lesson::LessonDifficulty::Beginner,
        };
        let score = quality_score(&draft, 3, 5);
        assert_eq!(score, 0.0);
    }

    #[test]
    fn richer_drafts_score_higher() {
        let cfg = GenerationConfig::default();
        let rich = build_draft("The Water Cycle", 4, RICH_CHAPTER, &cfg);
        let thin = build_draft(
            "Stub",
            4,
            "A single short paragraph without any structure to speak of.",
            &cfg,
        );
        let rich_score = quality_score(&rich, cfg.min_sections, cfg.min_questions);
        let thin_score = quality_score(&thin, cfg.min_sections, cfg.min_questions);
        assert!(rich_score > thin_score);
    }

    #[test]
    fn publish_gate_requires_approval() {
        assert!(!LessonStatus::Draft.can_publish());
        assert!(!LessonStatus::Rejected.can_publish());
        assert!(!LessonStatus::Published.can_publish());
        assert!(LessonStatus::Approved.can_publish());
    }

    #[test]
    fn generation_gate_allows_retry_after_failure() {
        assert!(ChapterStatus::Uploaded.can_generate());
        assert!(ChapterStatus::Failed.can_generate());
        assert!(!ChapterStatus::Processing.can_generate());
        assert!(!ChapterStatus::Generated.can_generate());
        assert!(!ChapterStatus::Published.can_generate());
    }
}
