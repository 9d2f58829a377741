use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub mongo_uri: String,
    pub redis_uri: String,
    pub mongo_database: String,
    pub jwt_secret: String,
    pub ai: AiConfig,
    pub adaptive: AdaptiveConfig,
    pub generation: GenerationConfig,
}

/// External text-generation provider settings.
#[derive(Debug, Clone, Deserialize)]
pub struct AiConfig {
    pub endpoint: String,
    pub api_key: String,
    pub model: String,
    /// Hard bound on the provider call; on expiry the pipeline falls back
    /// to the rule-based strategy.
    pub timeout_secs: u64,
    pub cache_ttl_secs: u64,
}

/// Pathway tuning knobs. The cutoffs are a product choice, so they live in
/// configuration rather than in the engine.
#[derive(Debug, Clone, Deserialize)]
pub struct AdaptiveConfig {
    /// Subject average at or above this is a strength.
    pub strong_threshold: f64,
    /// Subject average below this is a weakness.
    pub weak_threshold: f64,
    /// Below this attempt count the level classification is demoted one step.
    pub min_attempts_for_level: u32,
    /// How many recent attempts the revision check looks at.
    pub revision_window: usize,
    pub next_lessons_limit: i64,
    pub max_recommendations: usize,
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            strong_threshold: 80.0,
            weak_threshold: 50.0,
            min_attempts_for_level: 3,
            revision_window: 5,
            next_lessons_limit: 5,
            max_recommendations: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// Chapters shorter than this are rejected before any processing.
    pub min_word_count: usize,
    pub min_sections: usize,
    pub max_sections: usize,
    pub min_questions: usize,
    pub max_questions: usize,
    /// Pass mark given to the quiz created when a lesson is published.
    pub default_passing_score: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            min_word_count: 100,
            min_sections: 3,
            max_sections: 6,
            min_questions: 5,
            max_questions: 8,
            default_passing_score: 60,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load environment variables from root .env file (two levels up)
        // Try root .env first, then fallback to local .env
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            dotenvy::dotenv().ok();
        }

        // Determine environment (defaults to dev)
        let env_name = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let settings = config::Config::builder()
            .add_source(
                config::File::with_name(&format!("config/{}", env_name)).required(false),
            )
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
            .unwrap_or_else(|_| "mongodb://localhost:27017/learnhub".to_string());

        let redis_uri = settings
            .get_string("redis.uri")
            .or_else(|_| env::var("REDIS_URI"))
            .unwrap_or_else(|_| "redis://127.0.0.1:6379/0".to_string());

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or_else(|_| "learnhub".to_string());

        let jwt_secret = settings
            .get_string("auth.jwt_secret")
            .or_else(|_| env::var("JWT_SECRET"))
            .unwrap_or_else(|_| {
                if env_name == "prod" {
                    panic!("FATAL: JWT_SECRET must be set in production!");
                }
                eprintln!("WARNING: Using default JWT_SECRET (dev mode only!)");
                "dev-secret-only-for-local-testing".to_string()
            });

        let ai = AiConfig {
            endpoint: settings
                .get_string("ai.endpoint")
                .or_else(|_| env::var("AI_ENDPOINT"))
                .unwrap_or_else(|_| "http://localhost:8000".to_string()),
            api_key: settings
                .get_string("ai.api_key")
                .or_else(|_| env::var("AI_API_KEY"))
                .unwrap_or_default(),
            model: settings
                .get_string("ai.model")
                .unwrap_or_else(|_| "lesson-gen-mini".to_string()),
            timeout_secs: settings.get_int("ai.timeout_secs").unwrap_or(30) as u64,
            cache_ttl_secs: settings.get_int("ai.cache_ttl_secs").unwrap_or(86400) as u64,
        };

        let defaults = AdaptiveConfig::default();
        let adaptive = AdaptiveConfig {
            strong_threshold: settings
                .get_float("adaptive.strong_threshold")
                .unwrap_or(defaults.strong_threshold),
            weak_threshold: settings
                .get_float("adaptive.weak_threshold")
                .unwrap_or(defaults.weak_threshold),
            min_attempts_for_level: settings
                .get_int("adaptive.min_attempts_for_level")
                .unwrap_or(defaults.min_attempts_for_level as i64)
                as u32,
            revision_window: settings
                .get_int("adaptive.revision_window")
                .unwrap_or(defaults.revision_window as i64) as usize,
            next_lessons_limit: settings
                .get_int("adaptive.next_lessons_limit")
                .unwrap_or(defaults.next_lessons_limit),
            max_recommendations: settings
                .get_int("adaptive.max_recommendations")
                .unwrap_or(defaults.max_recommendations as i64)
                as usize,
        };

        let gen_defaults = GenerationConfig::default();
        let generation = GenerationConfig {
            min_word_count: settings
                .get_int("generation.min_word_count")
                .unwrap_or(gen_defaults.min_word_count as i64) as usize,
            min_sections: settings
                .get_int("generation.min_sections")
                .unwrap_or(gen_defaults.min_sections as i64) as usize,
            max_sections: settings
                .get_int("generation.max_sections")
                .unwrap_or(gen_defaults.max_sections as i64) as usize,
            min_questions: settings
                .get_int("generation.min_questions")
                .unwrap_or(gen_defaults.min_questions as i64) as usize,
            max_questions: settings
                .get_int("generation.max_questions")
                .unwrap_or(gen_defaults.max_questions as i64) as usize,
            default_passing_score: settings
                .get_int("generation.default_passing_score")
                .unwrap_or(gen_defaults.default_passing_score as i64)
                as u32,
        };

        Ok(Config {
            mongo_uri,
            redis_uri,
            mongo_database,
            jwt_secret,
            ai,
            adaptive,
            generation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn load_uses_documented_defaults() {
        env::set_var("SKIP_ROOT_ENV", "1");
        env::remove_var("MONGO_URI");
        env::remove_var("REDIS_URI");
        env::remove_var("JWT_SECRET");

        let config = Config::load().expect("default config should load");
        assert_eq!(config.adaptive.strong_threshold, 80.0);
        assert_eq!(config.adaptive.weak_threshold, 50.0);
        assert_eq!(config.adaptive.min_attempts_for_level, 3);
        assert_eq!(config.generation.min_word_count, 100);
        assert_eq!(config.generation.default_passing_score, 60);

        env::remove_var("SKIP_ROOT_ENV");
    }

    #[test]
    #[serial]
    fn env_overrides_mongo_uri() {
        env::set_var("SKIP_ROOT_ENV", "1");
        env::set_var("MONGO_URI", "mongodb://example:27017/other");

        let config = Config::load().expect("config should load");
        assert_eq!(config.mongo_uri, "mongodb://example:27017/other");

        env::remove_var("MONGO_URI");
        env::remove_var("SKIP_ROOT_ENV");
    }
}
