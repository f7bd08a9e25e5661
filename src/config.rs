use serde::Deserialize;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = ".pr-review-bot.toml";

const ENV_PREFIX: &str = "PR_REVIEW_BOT_";

pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";
pub const DEFAULT_LABEL: &str = "pr_review_bot";
pub const DEFAULT_OPENAI_KEY: &str = "no_key_needed";
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_PRICE_PER_TOKEN: f64 = 2.0e-7;
pub const DEFAULT_CURRENCY: &str = "USD";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to load .env file: {0}")]
    Dotenv(#[from] dotenvy::Error),

    #[error("Missing required setting `{0}` (set it in the config file or the environment)")]
    MissingField(&'static str),

    #[error("Invalid value for `{field}`: {value}")]
    InvalidValue { field: &'static str, value: String },
}

/// Raw contents of `.pr-review-bot.toml`. Every field is optional here;
/// required ones are enforced when resolving into [`Settings`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub github: GitHubSection,

    #[serde(default)]
    pub llm: LlmSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GitHubSection {
    /// GitHub API token. Overridden by PR_REVIEW_BOT_TOKEN, falls back to GITHUB_TOKEN.
    pub token: Option<String>,
    pub owner: Option<String>,
    pub repo: Option<String>,
    pub api_url: Option<String>,
    /// Label attached to every reviewed PR
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LlmSection {
    pub api_key: Option<String>,
    /// Base URL of an OpenAI-compatible API, without the `/chat/completions` suffix
    pub base_url: Option<String>,
    pub model: Option<String>,
    pub price_per_token: Option<f64>,
    pub currency: Option<String>,
}

impl FileConfig {
    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<FileConfig, ConfigError> {
        let contents = fs::read_to_string(path)?;
        let config = toml::from_str(&contents)?;
        Ok(config)
    }
}

/// Process-wide settings, resolved once at startup and passed by reference
/// into each component.
#[derive(Clone)]
pub struct Settings {
    pub github_token: String,
    pub owner: String,
    pub repo_name: String,
    pub github_api_url: String,
    pub label_name: String,
    pub openai_api_key: String,
    pub llm_base_url: String,
    pub model_name: String,
    pub price_per_token: f64,
    pub currency: String,
}

// Hand-written so tokens never end up in logs.
impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("owner", &self.owner)
            .field("repo_name", &self.repo_name)
            .field("github_api_url", &self.github_api_url)
            .field("label_name", &self.label_name)
            .field("llm_base_url", &self.llm_base_url)
            .field("model_name", &self.model_name)
            .field("price_per_token", &self.price_per_token)
            .field("currency", &self.currency)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// Load settings from (lowest to highest precedence) built-in defaults,
    /// the TOML config file, `.env` and the process environment.
    ///
    /// An explicit `path` must exist; the default `.pr-review-bot.toml` is
    /// optional.
    pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
        match dotenvy::dotenv() {
            Ok(env_path) => debug!(path = %env_path.display(), "loaded .env file"),
            Err(err) if err.not_found() => debug!("no .env file found"),
            Err(err) => return Err(err.into()),
        }

        let file = match path {
            Some(path) => FileConfig::load_from(path)?,
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    FileConfig::load_from(default_path)?
                } else {
                    FileConfig::default()
                }
            }
        };

        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge a parsed config file with environment lookups and validate.
    ///
    /// `env` is called with full variable names (e.g. `PR_REVIEW_BOT_OWNER`).
    pub fn resolve<F>(file: FileConfig, env: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| non_empty(env(&format!("{ENV_PREFIX}{name}")));

        let github_token = var("TOKEN")
            .or_else(|| non_empty(file.github.token))
            .or_else(|| non_empty(env("GITHUB_TOKEN")))
            .ok_or(ConfigError::MissingField("token"))?;
        let owner = var("OWNER")
            .or_else(|| non_empty(file.github.owner))
            .ok_or(ConfigError::MissingField("owner"))?;
        let repo_name = var("REPO_NAME")
            .or_else(|| non_empty(file.github.repo))
            .ok_or(ConfigError::MissingField("repo_name"))?;

        let price_per_token = match var("PRICE_PER_TOKEN") {
            Some(raw) => raw.trim().parse::<f64>().map_err(|_| ConfigError::InvalidValue {
                field: "price_per_token",
                value: raw.clone(),
            })?,
            None => file.llm.price_per_token.unwrap_or(DEFAULT_PRICE_PER_TOKEN),
        };
        if !price_per_token.is_finite() || price_per_token < 0.0 {
            return Err(ConfigError::InvalidValue {
                field: "price_per_token",
                value: price_per_token.to_string(),
            });
        }

        let model_name = var("MODEL_NAME")
            .or(file.llm.model)
            .unwrap_or_default();
        if model_name.is_empty() {
            warn!("no model name configured; completion requests will likely be rejected");
        }

        Ok(Settings {
            github_token,
            owner,
            repo_name,
            github_api_url: var("GITHUB_API_URL")
                .or_else(|| non_empty(file.github.api_url))
                .unwrap_or_else(|| DEFAULT_GITHUB_API_URL.to_string()),
            label_name: var("LABEL")
                .or_else(|| non_empty(file.github.label))
                .unwrap_or_else(|| DEFAULT_LABEL.to_string()),
            openai_api_key: var("OPEN_AI_KEY")
                .or_else(|| non_empty(file.llm.api_key))
                .unwrap_or_else(|| DEFAULT_OPENAI_KEY.to_string()),
            llm_base_url: var("LLM_BASE_URL")
                .or_else(|| non_empty(file.llm.base_url))
                .unwrap_or_else(|| DEFAULT_LLM_BASE_URL.to_string()),
            model_name,
            price_per_token,
            currency: var("CURRENCY")
                .or_else(|| non_empty(file.llm.currency))
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
        })
    }
}

#[cfg(test)]
impl Settings {
    /// Settings pointing both remote services at local mock servers.
    pub fn for_tests(github_api_url: &str, llm_base_url: &str) -> Settings {
        Settings {
            github_token: "ghp_test".to_string(),
            owner: "octocat".to_string(),
            repo_name: "hello-world".to_string(),
            github_api_url: github_api_url.to_string(),
            label_name: DEFAULT_LABEL.to_string(),
            openai_api_key: "sk-test".to_string(),
            llm_base_url: llm_base_url.to_string(),
            model_name: "gpt-4o-mini".to_string(),
            price_per_token: DEFAULT_PRICE_PER_TOKEN,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
