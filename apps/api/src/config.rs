use anyhow::{Context, Result};

pub const DEFAULT_DEPLOYMENT: &str = "o4-mini";

/// Settings handed to the completion client at construction time.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub endpoint: String,
    pub api_version: String,
    pub deployment: String,
    /// Token budget for each completion call.
    pub max_tokens: u32,
    /// Total attempts per call; 1 means no retry.
    pub max_attempts: u32,
    pub timeout_secs: u64,
}

/// Application configuration loaded from environment variables once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm: LlmConfig,
    pub max_upload_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (the process environment in
    /// production, a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let optional = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        Ok(Config {
            llm: LlmConfig {
                api_key: require("AZURE_OPENAI_API_KEY")?,
                endpoint: require("AZURE_OPENAI_ENDPOINT")?,
                api_version: require("AZURE_OPENAI_VERSION")?,
                deployment: optional("AZURE_OPENAI_DEPLOYMENT_NAME", DEFAULT_DEPLOYMENT),
                max_tokens: optional("LLM_MAX_TOKENS", "2048")
                    .parse::<u32>()
                    .context("LLM_MAX_TOKENS must be a positive integer")?,
                max_attempts: optional("LLM_MAX_ATTEMPTS", "1")
                    .parse::<u32>()
                    .context("LLM_MAX_ATTEMPTS must be a positive integer")?
                    .max(1),
                timeout_secs: optional("LLM_TIMEOUT_SECS", "120")
                    .parse::<u64>()
                    .context("LLM_TIMEOUT_SECS must be a number of seconds")?,
            },
            max_upload_bytes: optional("MAX_UPLOAD_BYTES", "20971520")
                .parse::<usize>()
                .context("MAX_UPLOAD_BYTES must be a byte count")?,
            port: optional("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional("RUST_LOG", "info"),
        })
    }
}
