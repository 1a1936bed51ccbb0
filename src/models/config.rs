use anyhow::{Context, bail};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant called MiniVault, designed to give clear and concise answers.";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub backend: BackendConfig,
    pub interaction_log: InteractionLogConfig,
    pub validation: ValidationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub shutdown_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            shutdown_timeout_secs: 75,
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BackendConfig {
    pub base_url: String,                 // Ollama-compatible endpoint
    pub model: String,                    // e.g. phi3:mini
    pub system_prompt: Option<String>,    // None disables the system message
    pub request_timeout_secs: u64,
    pub log_prompt_preview_chars: usize,  // сколько символов промпта логировать
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            model: "phi3:mini".to_string(),
            system_prompt: Some(DEFAULT_SYSTEM_PROMPT.to_string()),
            request_timeout_secs: 60,
            log_prompt_preview_chars: 200,
        }
    }
}

impl BackendConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InteractionLogConfig {
    pub path: String,
}

impl Default for InteractionLogConfig {
    fn default() -> Self {
        Self { path: "logs/log.jsonl".to_string() }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct ValidationConfig {
    pub max_prompt_chars: Option<usize>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,                    // RUST_LOG имеет приоритет
    pub operator_log_dir: Option<String>, // warn/error events are duplicated here
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), operator_log_dir: None }
    }
}

impl AppConfig {
    /// Applies `MINIVAULT_*` overrides. `lookup` is usually `std::env::var(..).ok()`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("MINIVAULT_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("MINIVAULT_PORT") {
            self.server.port = v.parse().with_context(|| format!("MINIVAULT_PORT is not a port: {v}"))?;
        }
        if let Some(v) = lookup("MINIVAULT_BACKEND_URL") {
            self.backend.base_url = v;
        }
        if let Some(v) = lookup("MINIVAULT_BACKEND_MODEL") {
            self.backend.model = v;
        }
        if let Some(v) = lookup("MINIVAULT_BACKEND_TIMEOUT_SECS") {
            self.backend.request_timeout_secs = v
                .parse()
                .with_context(|| format!("MINIVAULT_BACKEND_TIMEOUT_SECS is not a number: {v}"))?;
        }
        if let Some(v) = lookup("MINIVAULT_LOG_PATH") {
            self.interaction_log.path = v;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let url = url::Url::parse(&self.backend.base_url)
            .with_context(|| format!("backend.base_url is not a valid URL: {}", self.backend.base_url))?;
        if !matches!(url.scheme(), "http" | "https") {
            bail!("backend.base_url must use http or https, got {}", url.scheme());
        }
        if self.backend.model.trim().is_empty() {
            bail!("backend.model must not be empty");
        }
        if self.backend.request_timeout_secs == 0 {
            bail!("backend.request_timeout_secs must be greater than zero");
        }
        if self.server.shutdown_timeout_secs == 0 {
            bail!("server.shutdown_timeout_secs must be greater than zero");
        }
        if self.interaction_log.path.trim().is_empty() {
            bail!("interaction_log.path must not be empty");
        }
        if self.validation.max_prompt_chars == Some(0) {
            bail!("validation.max_prompt_chars must be greater than zero when set");
        }
        Ok(())
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> anyhow::Result<AppConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let cfg: AppConfig =
        serde_yaml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))?;
    Ok(cfg)
}

/// Loads the YAML file (defaults when it does not exist), applies environment
/// overrides and validates the result.
pub fn load_effective_config<P: AsRef<Path>>(path: P) -> anyhow::Result<AppConfig> {
    let path = path.as_ref();
    let mut cfg = if path.exists() {
        load_config(path)?
    } else {
        AppConfig::default()
    };
    cfg.apply_overrides(|key| std::env::var(key).ok())?;
    cfg.validate()?;
    Ok(cfg)
}
