//! Domain error types for regexcraft.
//!
//! Every core operation returns one of these instead of panicking. The boundary
//! layer turns them into an [`ErrorResponse`] envelope with a short category plus
//! a human-readable details string.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures surfaced by the pattern pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssistError {
    /// Missing or malformed input, caught before any external call.
    #[error("{0}")]
    Validation(String),

    /// The find pattern does not compile. Carries the engine diagnostic verbatim.
    #[error("Invalid regex pattern: {0}")]
    PatternSyntax(String),

    /// The completion capability returned empty or unusable content.
    #[error("Unusable completion response: {0}")]
    GenerationParse(String),

    /// Transport, timeout or otherwise unexpected failure of an external call.
    #[error("{0}")]
    Capability(String),

    /// Uploaded file type is not one we can extract text from.
    #[error("{0}")]
    UnsupportedInput(String),
}

impl AssistError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn capability(message: impl Into<String>) -> Self {
        Self::Capability(message.into())
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation(_) => ErrorCategory::Validation,
            Self::PatternSyntax(_) => ErrorCategory::PatternSyntax,
            Self::GenerationParse(_) => ErrorCategory::GenerationParse,
            Self::Capability(_) => ErrorCategory::Capability,
            Self::UnsupportedInput(_) => ErrorCategory::UnsupportedInput,
        }
    }

    /// The message without the category prefix.
    pub fn details(&self) -> &str {
        match self {
            Self::Validation(msg)
            | Self::PatternSyntax(msg)
            | Self::GenerationParse(msg)
            | Self::Capability(msg)
            | Self::UnsupportedInput(msg) => msg,
        }
    }
}

impl From<regex::Error> for AssistError {
    fn from(err: regex::Error) -> Self {
        Self::PatternSyntax(err.to_string())
    }
}

/// Machine-oriented error category carried by every boundary error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Validation,
    PatternSyntax,
    GenerationParse,
    Capability,
    UnsupportedInput,
}

impl ErrorCategory {
    /// HTTP-style status for shells that speak HTTP.
    pub fn status_code(self) -> u16 {
        match self {
            Self::Validation | Self::PatternSyntax | Self::UnsupportedInput => 400,
            Self::GenerationParse | Self::Capability => 500,
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Self::Validation => "validation",
            Self::PatternSyntax => "pattern_syntax",
            Self::GenerationParse => "generation_parse",
            Self::Capability => "capability",
            Self::UnsupportedInput => "unsupported_input",
        };
        write!(f, "{value}")
    }
}

/// Error envelope returned across the boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{error}: {details}")]
pub struct ErrorResponse {
    pub error: ErrorCategory,
    pub details: String,
}

impl ErrorResponse {
    pub fn status_code(&self) -> u16 {
        self.error.status_code()
    }
}

impl From<AssistError> for ErrorResponse {
    fn from(err: AssistError) -> Self {
        Self {
            error: err.category(),
            details: err.details().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_status_codes() {
        assert_eq!(ErrorCategory::Validation.status_code(), 400);
        assert_eq!(ErrorCategory::PatternSyntax.status_code(), 400);
        assert_eq!(ErrorCategory::UnsupportedInput.status_code(), 400);
        assert_eq!(ErrorCategory::GenerationParse.status_code(), 500);
        assert_eq!(ErrorCategory::Capability.status_code(), 500);
    }

    #[test]
    fn test_regex_error_keeps_engine_diagnostic() {
        let err: AssistError = regex::Regex::new("(").unwrap_err().into();
        assert_eq!(err.category(), ErrorCategory::PatternSyntax);
        assert!(err.details().contains("unclosed group"));
    }

    #[test]
    fn test_error_response_serializes_category_and_details() {
        let response = ErrorResponse::from(AssistError::validation("Description cannot be empty"));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["error"], "validation");
        assert_eq!(json["details"], "Description cannot be empty");
        assert_eq!(response.status_code(), 400);
    }
}
