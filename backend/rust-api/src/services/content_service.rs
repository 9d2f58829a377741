use chrono::Utc;
use futures::TryStreamExt;
use mongodb::bson::doc;
use mongodb::{Collection, Database};
use uuid::Uuid;
use validator::Validate;

use crate::error::ApiError;
use crate::models::quiz::{CreateQuizRequest, Question, Quiz};
use crate::models::{
    CapsuleQuery, CreateCapsuleRequest, CreateGradeRequest, CreateSubjectRequest,
    CurriculumCapsule, Grade, Subject,
};

/// Catalog CRUD: subjects, grades, capsules and quiz definitions.
pub struct ContentService {
    mongo: Database,
}

impl ContentService {
    pub fn new(mongo: Database) -> Self {
        Self { mongo }
    }

    fn subjects(&self) -> Collection<Subject> {
        self.mongo.collection("subjects")
    }

    fn grades(&self) -> Collection<Grade> {
        self.mongo.collection("grades")
    }

    fn capsules(&self) -> Collection<CurriculumCapsule> {
        self.mongo.collection("capsules")
    }

    fn quizzes(&self) -> Collection<Quiz> {
        self.mongo.collection("quizzes")
    }

    pub async fn list_subjects(&self) -> Result<Vec<Subject>, ApiError> {
        let cursor = self.subjects().find(doc! {}).sort(doc! { "name": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn create_subject(&self, req: CreateSubjectRequest) -> Result<Subject, ApiError> {
        req.validate()?;
        let subject = Subject {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            description: req.description,
            icon: req.icon,
            created_at: Utc::now(),
        };
        self.subjects().insert_one(&subject).await?;
        tracing::info!("Created subject {} ({})", subject.name, subject.id);
        Ok(subject)
    }

    pub async fn list_grades(&self) -> Result<Vec<Grade>, ApiError> {
        let cursor = self.grades().find(doc! {}).sort(doc! { "level": 1 }).await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn create_grade(&self, req: CreateGradeRequest) -> Result<Grade, ApiError> {
        req.validate()?;
        let grade = Grade {
            id: Uuid::new_v4().to_string(),
            name: req.name,
            level: req.level,
            description: req.description,
        };
        self.grades().insert_one(&grade).await?;
        Ok(grade)
    }

    /// Public catalog listing: unpublished capsules are never returned here.
    pub async fn list_capsules(
        &self,
        query: &CapsuleQuery,
    ) -> Result<Vec<CurriculumCapsule>, ApiError> {
        let mut filter = doc! { "is_published": true };
        if let Some(subject) = &query.subject {
            filter.insert("subject_id", subject);
        }
        if let Some(grade) = &query.grade {
            filter.insert("grade_id", grade);
        }
        if let Some(featured) = query.featured {
            filter.insert("featured", featured);
        }

        let cursor = self
            .capsules()
            .find(filter)
            .sort(doc! { "order": 1, "title": 1 })
            .await?;
        Ok(cursor.try_collect().await?)
    }

    pub async fn get_capsule(&self, capsule_id: &str) -> Result<CurriculumCapsule, ApiError> {
        self.capsules()
            .find_one(doc! { "_id": capsule_id })
            .await?
            .ok_or_else(|| ApiError::not_found("capsule", capsule_id))
    }

    pub async fn create_capsule(
        &self,
        req: CreateCapsuleRequest,
    ) -> Result<CurriculumCapsule, ApiError> {
        req.validate()?;

        // Referential checks up front so a capsule never points at nothing.
        self.get_subject(&req.subject_id).await?;
        self.get_grade(&req.grade_id).await?;

        let now = Utc::now();
        let capsule = CurriculumCapsule {
            id: Uuid::new_v4().to_string(),
            title: req.title,
            subject_id: req.subject_id,
            grade_id: req.grade_id,
            description: req.description,
            content: req.content,
            objectives: req.objectives,
            order: req.order,
            estimated_duration: req.estimated_duration,
            is_published: req.is_published,
            featured: req.featured,
            created_at: now,
            updated_at: now,
        };
        self.capsules().insert_one(&capsule).await?;
        tracing::info!("Created capsule {} ({})", capsule.title, capsule.id);
        Ok(capsule)
    }

    pub async fn get_subject(&self, subject_id: &str) -> Result<Subject, ApiError> {
        self.subjects()
            .find_one(doc! { "_id": subject_id })
            .await?
            .ok_or_else(|| ApiError::not_found("subject", subject_id))
    }

    pub async fn get_grade(&self, grade_id: &str) -> Result<Grade, ApiError> {
        self.grades()
            .find_one(doc! { "_id": grade_id })
            .await?
            .ok_or_else(|| ApiError::not_found("grade", grade_id))
    }

    pub async fn get_quiz(&self, quiz_id: &str) -> Result<Quiz, ApiError> {
        self.quizzes()
            .find_one(doc! { "_id": quiz_id })
            .await?
            .ok_or_else(|| ApiError::not_found("quiz", quiz_id))
    }

    pub async fn get_quiz_for_capsule(&self, capsule_id: &str) -> Result<Quiz, ApiError> {
        self.quizzes()
            .find_one(doc! { "capsule_id": capsule_id })
            .await?
            .ok_or_else(|| ApiError::not_found("quiz for capsule", capsule_id))
    }

    pub async fn create_quiz(&self, req: CreateQuizRequest) -> Result<Quiz, ApiError> {
        req.validate()?;
        if req.questions.is_empty() {
            return Err(ApiError::Validation(
                "quiz must contain at least one question".to_string(),
            ));
        }

        // Quiz must hang off an existing capsule.
        self.get_capsule(&req.capsule_id).await?;

        let questions = req
            .questions
            .into_iter()
            .enumerate()
            .map(|(i, q)| Question {
                id: Uuid::new_v4().to_string(),
                question_text: q.question_text,
                question_type: q.question_type,
                options: q.options,
                correct_answer: q.correct_answer,
                explanation: q.explanation,
                order: i as i32,
            })
            .collect();

        let quiz = Quiz {
            id: Uuid::new_v4().to_string(),
            capsule_id: req.capsule_id,
            title: req.title,
            instructions: req.instructions,
            passing_score: req.passing_score,
            questions,
            created_at: Utc::now(),
        };
        self.quizzes().insert_one(&quiz).await?;
        tracing::info!(
            "Created quiz {} with {} questions",
            quiz.id,
            quiz.questions.len()
        );
        Ok(quiz)
    }
}
