use std::sync::Arc;

use bon::Builder;
use tracing::{error, info, warn};

use crate::models::error::DispatchError;
use crate::models::types::{GenerationMode, GenerationResult, InteractionRecord};
use crate::services::validator::Validator;
use crate::traits::generator::Generator;
use crate::traits::interaction_log::InteractionLog;

/// Runs one exchange: validate, generate with the requested strategy, log.
#[derive(Builder)]
pub struct Dispatcher {
    #[builder(default)]
    validator: Validator,
    stub: Arc<dyn Generator>,
    backend: Arc<dyn Generator>,
    interaction_log: Arc<dyn InteractionLog>,
    #[builder(default = 200)]
    preview_chars: usize,
}

impl Dispatcher {
    fn strategy(&self, mode: GenerationMode) -> &dyn Generator {
        match mode {
            GenerationMode::Stub => self.stub.as_ref(),
            GenerationMode::Backend => self.backend.as_ref(),
        }
    }

    pub async fn handle(&self, mode: GenerationMode, raw_prompt: &str) -> Result<GenerationResult, DispatchError> {
        let request = self.validator.validate(raw_prompt).inspect_err(|e| {
            warn!(mode = %mode, error = %e, "dispatch: prompt rejected");
        })?;

        let preview: String = request.as_str().chars().take(self.preview_chars).collect();
        info!(mode = %mode, prompt_len = request.as_str().len(), prompt_preview = %preview, "dispatch: generating");

        let generator = self.strategy(mode);
        debug_assert_eq!(generator.mode(), mode);
        let outcome = generator.generate(request.as_str()).await;

        let record = match &outcome {
            Ok(result) => InteractionRecord::builder()
                .prompt(request.as_str())
                .response(result.text.as_str())
                .source(result.source)
                .maybe_model(result.model.clone())
                .build(),
            Err(e) => InteractionRecord::builder()
                .prompt(request.as_str())
                .response(e.to_string())
                .source(mode)
                .build(),
        };

        // Ошибка записи лога не должна ломать ответ клиенту
        if let Err(e) = self.interaction_log.append(&record).await {
            error!(mode = %mode, error = %e, "interaction log append failed");
        }

        match &outcome {
            Ok(result) => info!(mode = %mode, response_len = result.text.len(), "dispatch: done"),
            Err(e) => warn!(mode = %mode, error = %e, "dispatch: generation failed"),
        }
        outcome.map_err(DispatchError::from)
    }
}
