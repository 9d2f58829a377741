use async_trait::async_trait;
use redis::aio::ConnectionManager;
use sha2::{Digest, Sha256};

use crate::config::AiConfig;
use crate::config::GenerationConfig;
use crate::metrics::{record_ai_cache_hit, record_ai_cache_miss};
use crate::models::lesson::LessonDraft;

use super::rule_based;

/// Everything a strategy needs to know about the chapter being transformed.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub chapter_title: String,
    pub subject_name: String,
    pub grade_name: String,
    pub grade_level: i32,
    pub content: String,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("provider request failed: {0}")]
    Provider(String),
    #[error("provider returned an unusable response: {0}")]
    InvalidResponse(String),
}

/// A way of turning chapter text into a lesson draft. The pipeline treats
/// strategies uniformly and falls back from one to another on failure.
#[async_trait]
pub trait LessonStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    async fn generate(&self, ctx: &GenerationContext) -> Result<LessonDraft, GenerationError>;
}

/// Offline extraction. Infallible by design: this is the floor the external
/// strategy falls back onto.
pub struct RuleBasedGenerator {
    config: GenerationConfig,
}

impl RuleBasedGenerator {
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl LessonStrategy for RuleBasedGenerator {
    fn name(&self) -> &'static str {
        "rule_based"
    }

    async fn generate(&self, ctx: &GenerationContext) -> Result<LessonDraft, GenerationError> {
        Ok(rule_based::build_draft(
            &ctx.chapter_title,
            ctx.grade_level,
            &ctx.content,
            &self.config,
        ))
    }
}

/// Calls an external text-generation API with a bounded timeout. Responses
/// are cached in Redis keyed by a content digest, so regenerating the same
/// chapter never pays for a second provider call.
pub struct ExternalAiGenerator {
    client: reqwest::Client,
    config: AiConfig,
    redis: ConnectionManager,
}

impl ExternalAiGenerator {
    pub fn new(config: AiConfig, redis: ConnectionManager) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GenerationError::Provider(e.to_string()))?;
        Ok(Self {
            client,
            config,
            redis,
        })
    }

    fn cache_key(&self, ctx: &GenerationContext) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.config.model.as_bytes());
        hasher.update(ctx.content.as_bytes());
        format!("ai:lesson:{}", hex::encode(hasher.finalize()))
    }

    async fn cached_draft(&self, key: &str) -> Option<LessonDraft> {
        let mut conn = self.redis.clone();
        let cached: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .ok()?;
        cached.and_then(|json| serde_json::from_str(&json).ok())
    }

    async fn cache_draft(&self, key: &str, draft: &LessonDraft) {
        let Ok(json) = serde_json::to_string(draft) else {
            return;
        };
        let mut conn = self.redis.clone();
        if let Err(e) = redis::cmd("SETEX")
            .arg(key)
            .arg(self.config.cache_ttl_secs)
            .arg(&json)
            .query_async::<()>(&mut conn)
            .await
        {
            tracing::warn!("Failed to cache AI lesson draft: {}", e);
        }
    }
}

#[async_trait]
impl LessonStrategy for ExternalAiGenerator {
    fn name(&self) -> &'static str {
        "external_ai"
    }

    async fn generate(&self, ctx: &GenerationContext) -> Result<LessonDraft, GenerationError> {
        let key = self.cache_key(ctx);
        if let Some(draft) = self.cached_draft(&key).await {
            record_ai_cache_hit();
            tracing::info!("AI draft cache hit for chapter '{}'", ctx.chapter_title);
            return Ok(draft);
        }
        record_ai_cache_miss();

        let prompt = format!(
            "Create a structured lesson for grade {} ({}) in {} from the following chapter titled \"{}\". \
             Respond with JSON containing title, introduction, learning_objectives, key_concepts, \
             sections, questions, estimated_duration and difficulty_level.\n\n{}",
            ctx.grade_level, ctx.grade_name, ctx.subject_name, ctx.chapter_title, ctx.content
        );

        let response = self
            .client
            .post(format!("{}/v1/generate", self.config.endpoint))
            .bearer_auth(&self.config.api_key)
            .json(&serde_json::json!({
                "model": self.config.model,
                "prompt": prompt,
            }))
            .send()
            .await
            .map_err(|e| GenerationError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            return Err(GenerationError::Provider(format!(
                "status {}",
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Provider(e.to_string()))?;

        let draft = parse_lesson_response(&body)?;
        self.cache_draft(&key, &draft).await;
        Ok(draft)
    }
}

/// Lenient parse of a provider response. Accepts the draft directly, wrapped
/// in a `lesson` field, or embedded as JSON inside a `text`/`content` string.
pub fn parse_lesson_response(body: &str) -> Result<LessonDraft, GenerationError> {
    if let Ok(draft) = serde_json::from_str::<LessonDraft>(body) {
        return Ok(draft);
    }

    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| GenerationError::InvalidResponse(format!("not JSON: {}", e)))?;

    if let Some(lesson) = value.get("lesson") {
        if let Ok(draft) = serde_json::from_value::<LessonDraft>(lesson.clone()) {
            return Ok(draft);
        }
    }

    for field in ["text", "content", "output"] {
        if let Some(text) = value.get(field).and_then(|v| v.as_str()) {
            if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
                if start < end {
                    if let Ok(draft) =
                        serde_json::from_str::<LessonDraft>(&text[start..=end])
                    {
                        return Ok(draft);
                    }
                }
            }
        }
    }

    Err(GenerationError::InvalidResponse(
        "no lesson draft found in response".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_json() -> String {
        serde_json::json!({
            "title": "Fractions",
            "introduction": "Intro text.",
            "learning_objectives": ["Understand fractions."],
            "key_concepts": [{"term": "Numerator", "definition": "The top part."}],
            "sections": [{
                "section_type": "introduction",
                "title": "Introduction",
                "content": "Intro text.",
                "order": 0
            }],
            "questions": [{
                "question_text": "Is a half a fraction?",
                "question_type": "true_false",
                "options": ["true", "false"],
                "correct_answer": "true",
                "explanation": "",
                "difficulty": "easy",
                "order": 0
            }],
            "estimated_duration": 20,
            "difficulty_level": "beginner"
        })
        .to_string()
    }

    #[test]
    fn parses_direct_draft() {
        let draft = parse_lesson_response(&draft_json()).unwrap();
        assert_eq!(draft.title, "Fractions");
        assert_eq!(draft.questions.len(), 1);
    }

    #[test]
    fn parses_wrapped_draft() {
        let wrapped = format!("{{\"lesson\": {}}}", draft_json());
        let draft = parse_lesson_response(&wrapped).unwrap();
        assert_eq!(draft.title, "Fractions");
    }

    #[test]
    fn parses_draft_embedded_in_text_field() {
        let embedded = serde_json::json!({
            "text": format!("Here is your lesson:\n{}\nEnjoy!", draft_json())
        })
        .to_string();
        let draft = parse_lesson_response(&embedded).unwrap();
        assert_eq!(draft.title, "Fractions");
    }

    #[test]
    fn rejects_garbage() {
        assert!(parse_lesson_response("not json at all").is_err());
        assert!(parse_lesson_response("{\"unrelated\": true}").is_err());
    }

    #[tokio::test]
    async fn rule_based_strategy_never_fails() {
        let strategy = RuleBasedGenerator::new(GenerationConfig::default());
        let ctx = GenerationContext {
            chapter_title: "Water Cycle".to_string(),
            subject_name: "Science".to_string(),
            grade_name: "Grade 4".to_string(),
            grade_level: 4,
            content: "Evaporation is the process of water turning into vapor. \
                      Clouds form when vapor condenses in the sky."
                .to_string(),
        };
        let draft = strategy.generate(&ctx).await.unwrap();
        assert!(!draft.questions.is_empty());
        assert_eq!(strategy.name(), "rule_based");
    }
}
