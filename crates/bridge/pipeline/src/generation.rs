//! Generation orchestrator: prompt → AI → validated code → generated contract.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, instrument};

use bridge_types::{Code, CodeParams, Contract};

use crate::capability::AiCapability;
use crate::error::{PipelineError, PipelineResult};
use crate::prompt::PromptBuilder;

/// Drives one AI call per request and binds the result to a new contract.
pub struct Generator {
    ai: Arc<dyn AiCapability>,
    timeout: Duration,
}

impl Generator {
    pub fn new(ai: Arc<dyn AiCapability>, timeout: Duration) -> Self {
        Self { ai, timeout }
    }

    /// Generate code for `params` and return a contract in `Generated` state.
    ///
    /// `custom_prompt` replaces the built-in template verbatim.
    #[instrument(skip(self, params, custom_prompt), fields(backend = %self.ai.name(), contract_name = %params.contract_name()))]
    pub async fn generate(
        &self,
        params: &CodeParams,
        custom_prompt: Option<&str>,
    ) -> PipelineResult<Contract> {
        let prompt = match custom_prompt {
            Some(prompt) => prompt.to_string(),
            None => PromptBuilder::build(params),
        };
        debug!(prompt_len = prompt.len(), custom = custom_prompt.is_some(), "Requesting completion");

        let raw = tokio::time::timeout(self.timeout, self.ai.generate(&prompt))
            .await
            .map_err(|_| PipelineError::GenerationTimedOut {
                after_secs: self.timeout.as_secs(),
            })?
            .map_err(PipelineError::GenerationFailed)?;

        let code = Code::from_ai_response(&raw)?;

        let mut contract = Contract::create_new(params.clone());
        contract.update_code(code)?;

        info!(contract_id = %contract.id(), "Contract generated");
        Ok(contract)
    }
}
