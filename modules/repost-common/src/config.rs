use std::env;

/// Application configuration loaded from environment variables.
/// Every external collaborator is optional: a missing OpenAI key disables
/// AI generation, missing Upstash credentials disable caching and
/// analytics. Startup never fails on absent credentials.
#[derive(Debug, Clone)]
pub struct Config {
    // AI generation
    pub openai_api_key: Option<String>,
    pub openai_model: String,

    // Cache + analytics store
    pub upstash_url: Option<String>,
    pub upstash_token: Option<String>,

    // Web server
    pub web_host: String,
    pub web_port: u16,

    // Response cache
    pub cache_ttl_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_model: env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-3.5-turbo".to_string()),
            upstash_url: optional_env("UPSTASH_REDIS_REST_URL"),
            upstash_token: optional_env("UPSTASH_REDIS_REST_TOKEN"),
            web_host: env::var("WEB_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            web_port: env::var("WEB_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("WEB_PORT must be a number"),
            cache_ttl_secs: env::var("CACHE_TTL_SECS")
                .unwrap_or_else(|_| "86400".to_string())
                .parse()
                .expect("CACHE_TTL_SECS must be a number"),
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}
