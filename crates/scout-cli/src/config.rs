use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub agent: AgentSettings,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,

    // Secret (from ENV only)
    #[serde(default)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gpt-oss:120b-cloud".to_string(),
            base_url: "http://localhost:11434".to_string(),
            temperature: 0.3,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    /// "expert", "beginner", or "general"; unknown values fall back to general
    pub user_level: String,
    pub reasoning_timeout_secs: u64,
    pub tool_timeout_secs: u64,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            user_level: "general".to_string(),
            reasoning_timeout_secs: 120,
            tool_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: "conversations".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. SCOUT_* environment variables, with `__` between section and key
    ///    (e.g. SCOUT_LLM__MODEL, SCOUT_AGENT__USER_LEVEL)
    pub fn load() -> Result<Self, ConfigError> {
        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());

        let builder = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(env_source());

        let mut cfg: Config = builder.build()?.try_deserialize()?;

        // Secret stays out of TOML
        cfg.api_key = std::env::var("OLLAMA_API_KEY").ok();

        Ok(cfg)
    }
}

/// SCOUT_* environment source. The section/key separator is `__` so
/// multi-word keys stay reachable (a single `_` would split SCOUT_LLM_BASE_URL
/// into `llm.base.url`).
fn env_source() -> Environment {
    Environment::default()
        .prefix("SCOUT")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}
