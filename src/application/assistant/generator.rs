use super::prompt::{
    explanation_messages, generation_messages, refinement_messages, render_generation_context,
};
use super::response::split_pattern_pair;
use super::types::{
    EXPLAIN_MAX_TOKENS, EXPLAIN_TEMPERATURE, EXPLANATION_PLACEHOLDER, GenerationOutcome,
    PATTERN_TEMPERATURE, RefineInput, RefinementOutcome,
};
use super::validation::{validate_refinement, validate_specification};
use crate::domain::{AssistError, PatternPair, PatternSpecification};
use crate::infra::completion::{CompletionError, CompletionProvider, CompletionRequest};
use log::{debug, warn};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const REFINED_CONTEXT: &str = "These patterns were just refined from user feedback.";

/// Drives the completion capability for generation, refinement, explanation and conversion.
#[derive(Clone)]
pub struct PatternAssistant {
    provider: Arc<dyn CompletionProvider>,
}

impl std::fmt::Debug for PatternAssistant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternAssistant")
            .field("provider", &self.provider.id())
            .finish()
    }
}

pub(super) fn completion_failure(purpose: &str, err: CompletionError) -> AssistError {
    warn!(target: "assistant", "{purpose} call failed: {err}");
    match err {
        CompletionError::Empty => AssistError::GenerationParse(err.to_string()),
        other => AssistError::capability(other.to_string()),
    }
}

impl PatternAssistant {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_id(&self) -> &str {
        self.provider.id()
    }

    pub(super) async fn complete(
        &self,
        request: CompletionRequest,
    ) -> Result<String, AssistError> {
        let purpose = request.purpose;
        let raw = self
            .provider
            .complete(request)
            .await
            .map_err(|err| completion_failure(purpose, err))?;
        debug!(target: "assistant", "{purpose} raw response: {raw}");
        Ok(raw)
    }

    /// First-time generation. The explanation is a second call whose failure
    /// degrades to a placeholder without touching the pair.
    pub async fn generate(
        &self,
        spec: &PatternSpecification,
        cancel: Option<CancellationToken>,
    ) -> Result<GenerationOutcome, AssistError> {
        validate_specification(spec)?;

        let generation_context = render_generation_context(spec);
        let request = CompletionRequest::new("generate", generation_messages(&generation_context)?)
            .temperature(PATTERN_TEMPERATURE)
            .cancel_token(cancel.clone());
        let pair = split_pattern_pair(&self.complete(request).await?)?;
        debug!(target: "assistant", "generated find={:?} replace={:?}", pair.find, pair.replace);

        let framing = format!("Description:\n{}", spec.description.trim());
        let (explanation, explanation_degraded) = self.explain(&framing, &pair, cancel).await;

        Ok(GenerationOutcome {
            pair,
            explanation,
            explanation_degraded,
            generation_context,
        })
    }

    /// Refine the current pair with feedback. The explanation covers only the new pair.
    pub async fn refine(
        &self,
        input: &RefineInput,
        cancel: Option<CancellationToken>,
    ) -> Result<RefinementOutcome, AssistError> {
        validate_refinement(input)?;

        let request = CompletionRequest::new("refine", refinement_messages(input)?)
            .temperature(PATTERN_TEMPERATURE)
            .cancel_token(cancel.clone());
        let pair = split_pattern_pair(&self.complete(request).await?)?;
        debug!(target: "assistant", "refined find={:?} replace={:?}", pair.find, pair.replace);

        let (explanation, explanation_degraded) =
            self.explain(REFINED_CONTEXT, &pair, cancel).await;

        Ok(RefinementOutcome {
            pair,
            explanation,
            explanation_degraded,
            feedback: input.feedback.trim().to_string(),
        })
    }

    async fn explain(
        &self,
        framing: &str,
        pair: &PatternPair,
        cancel: Option<CancellationToken>,
    ) -> (String, bool) {
        let messages = match explanation_messages(framing, pair) {
            Ok(messages) => messages,
            Err(err) => {
                warn!(target: "assistant", "explanation prompt failed: {err}");
                return (EXPLANATION_PLACEHOLDER.to_string(), true);
            }
        };
        let request = CompletionRequest::new("explain", messages)
            .temperature(EXPLAIN_TEMPERATURE)
            .max_tokens(EXPLAIN_MAX_TOKENS)
            .cancel_token(cancel);

        match self.complete(request).await {
            Ok(text) => (text, false),
            Err(err) => {
                warn!(target: "assistant", "explanation degraded to placeholder: {err}");
                (EXPLANATION_PLACEHOLDER.to_string(), true)
            }
        }
    }
}
