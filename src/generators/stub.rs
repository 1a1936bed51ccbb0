use async_trait::async_trait;
use std::hash::BuildHasher;
use strum::{AsRefStr, IntoStaticStr};
use tera::{Context, Tera};
use tracing::{debug, warn};

use crate::models::error::BackendError;
use crate::models::types::{GenerationMode, GenerationResult};
use crate::traits::generator::Generator;

// Fixed seeds keep template choice stable across runs.
const SEEDS: [u64; 4] = [
    0x6d69_6e69_7661_756c,
    0x7374_7562_5f67_656e,
    0x0123_4567_89ab_cdef,
    0xfedc_ba98_7654_3210,
];

const FOOTER: &str = "

This response demonstrates MiniVault API capabilities:
• Local prompt processing
• Contextual response generation
• Interaction logging to a JSON Lines file
• A small REST API built on axum

In production, this could be powered by:
• Ollama with Llama or Phi models
• Any locally hosted inference server
• Custom fine-tuned models

The system keeps working fully offline.";

/// Категория промпта для выбора шаблона
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum StubBucket {
    Code,
    Explain,
    HowTo,
    Default,
}

impl StubBucket {
    /// Keyword buckets in priority order; `Default` catches everything else.
    pub const ORDER: [StubBucket; 3] = [StubBucket::Code, StubBucket::Explain, StubBucket::HowTo];

    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            StubBucket::Code => &["code", "programming"],
            StubBucket::Explain => &["explain", "what is"],
            StubBucket::HowTo => &["help", "how to"],
            StubBucket::Default => &[],
        }
    }

    fn templates(&self) -> &'static [&'static str] {
        match self {
            StubBucket::Code => &[
                "Here's a code example for '{{ prompt }}':\n\n```python\nprint('Hello, World!')\n```\n\nIt shows the basic shape of a program.",
                "For coding questions like '{{ prompt }}', start from the fundamentals and add complexity step by step.",
            ],
            StubBucket::Explain => &[
                "Let me explain '{{ prompt }}' in simple terms:\n\nThe idea rests on a few key components working together.",
                "'{{ prompt }}' is easier to understand once it is broken down into smaller parts.",
            ],
            StubBucket::HowTo => &[
                "Happy to help with '{{ prompt }}'. Here are some steps you can follow:",
                "For '{{ prompt }}', a systematic approach works best.",
            ],
            StubBucket::Default => &[
                "Thank you for your prompt: '{{ prompt }}'. This is a simulated response from MiniVault API.",
                "Based on your input '{{ prompt }}', here's a response from the local stub model.",
                "Your prompt '{{ prompt }}' is interesting. Here are a few thoughts on the topic.",
                "Processing your request about '{{ prompt }}'. Here's what I can tell you...",
            ],
        }
    }

    fn template_name(&self, index: usize) -> String {
        format!("{}_{}", self.as_str(), index)
    }

    /// Picks the first bucket whose keywords occur in the prompt (case-insensitive).
    pub fn classify(prompt: &str) -> StubBucket {
        let lower = prompt.to_lowercase();
        Self::ORDER
            .into_iter()
            .find(|bucket| bucket.keywords().iter().any(|kw| lower.contains(kw)))
            .unwrap_or(StubBucket::Default)
    }
}

/// Deterministic offline generator: keyword bucket + hashed template choice.
pub struct StubGenerator {
    tera: Tera,
    hasher: ahash::RandomState,
}

impl StubGenerator {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        let buckets = StubBucket::ORDER.into_iter().chain(std::iter::once(StubBucket::Default));
        let mut templates: Vec<(String, &str)> = Vec::new();
        for bucket in buckets {
            for (i, tpl) in bucket.templates().iter().enumerate() {
                templates.push((bucket.template_name(i), *tpl));
            }
        }
        tera.add_raw_templates(templates)?;
        Ok(Self {
            tera,
            hasher: ahash::RandomState::with_seeds(SEEDS[0], SEEDS[1], SEEDS[2], SEEDS[3]),
        })
    }

    /// Renders the stub reply. Never fails.
    pub fn render(&self, prompt: &str) -> String {
        let bucket = StubBucket::classify(prompt);
        let count = bucket.templates().len();
        let index = (self.hasher.hash_one(prompt) % count as u64) as usize;
        let name = bucket.template_name(index);
        debug!(bucket = bucket.as_str(), template = %name, "stub: template selected");

        let mut ctx = Context::new();
        ctx.insert("prompt", prompt);
        let body = match self.tera.render(&name, &ctx) {
            Ok(s) => s,
            Err(e) => {
                warn!(template = %name, error = %e, "stub: template render failed, using plain reply");
                format!("Thank you for your prompt: '{prompt}'.")
            }
        };
        format!("{body}{FOOTER}")
    }
}

#[async_trait]
impl Generator for StubGenerator {
    fn mode(&self) -> GenerationMode {
        GenerationMode::Stub
    }

    async fn generate(&self, prompt: &str) -> Result<GenerationResult, BackendError> {
        Ok(GenerationResult::builder()
            .text(self.render(prompt))
            .source(GenerationMode::Stub)
            .build())
    }
}
