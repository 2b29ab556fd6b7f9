use super::generator::PatternAssistant;
use super::prompt::conversion_messages;
use super::response::split_pattern_pair;
use super::types::{CONVERT_TEMPERATURE, ConvertInput};
use super::validation::validate_conversion;
use crate::domain::{AssistError, ConvertedPattern};
use crate::infra::completion::CompletionRequest;
use tokio_util::sync::CancellationToken;

impl PatternAssistant {
    /// One-shot dialect conversion. Never touches a draft or its context.
    pub async fn convert(
        &self,
        input: &ConvertInput,
        cancel: Option<CancellationToken>,
    ) -> Result<ConvertedPattern, AssistError> {
        validate_conversion(input)?;

        let request = CompletionRequest::new("convert", conversion_messages(input)?)
            .temperature(CONVERT_TEMPERATURE)
            .cancel_token(cancel);
        let pair = split_pattern_pair(&self.complete(request).await?)?;

        Ok(ConvertedPattern {
            dialect: input.dialect,
            target_find: pair.find,
            target_replace: pair.replace,
        })
    }
}
