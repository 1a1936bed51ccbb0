use bon::bon;
use derive_more::{AsRef, Display};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString, IntoStaticStr};

/// Стратегия генерации ответа
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumString, IntoStaticStr, AsRefStr, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    /// Локальная детерминированная эвристика
    Stub,
    /// Внешний сервис инференса
    Backend,
}

impl GenerationMode {
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    pub fn all() -> Vec<GenerationMode> {
        vec![GenerationMode::Stub, GenerationMode::Backend]
    }
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A prompt that passed validation: trimmed and non-empty.
///
/// Only [`crate::services::validator::Validator`] constructs it.
#[derive(Debug, Clone, PartialEq, Eq, Display, AsRef)]
pub struct PromptRequest(String);

impl PromptRequest {
    pub(crate) fn from_trimmed(prompt: String) -> Self {
        Self(prompt)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Результат генерации
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub text: String,
    pub source: GenerationMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[bon]
impl GenerationResult {
    #[builder]
    pub fn new(#[builder(into)] text: String, source: GenerationMode, #[builder(into)] model: Option<String>) -> Self {
        Self { text, source, model }
    }
}

/// One line of the interaction log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    pub timestamp: String,
    pub prompt: String,
    pub response: String,
    pub source: GenerationMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

#[bon]
impl InteractionRecord {
    /// Builds a record stamped with the current UTC time.
    #[builder]
    pub fn new(
        #[builder(into)] prompt: String,
        #[builder(into)] response: String,
        source: GenerationMode,
        #[builder(into)] model: Option<String>,
    ) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            prompt,
            response,
            source,
            model,
        }
    }
}
