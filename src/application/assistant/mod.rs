//! Generation, refinement and conversion of find/replace pattern pairs.
//!
//! Talks to the completion capability only through
//! [`CompletionProvider`](crate::infra::completion::CompletionProvider), so every
//! parsing and fallback rule here runs the same against a scripted provider.

mod converter;
mod generator;
mod prompt;
mod response;
mod types;
mod validation;

pub use generator::PatternAssistant;
pub use prompt::render_generation_context;
pub use response::split_pattern_pair;
pub use types::{
    ConvertInput, DELIMITER, EXPLANATION_PLACEHOLDER, GenerationOutcome, REFINE_ACKNOWLEDGMENT,
    RefineInput, RefinementOutcome, refine_failure_message,
};
pub use validation::{validate_conversion, validate_refinement, validate_specification};
