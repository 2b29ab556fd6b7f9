//! Boundary operations exposed to a UI or CLI shell.
//!
//! Each operation takes a camelCase request, runs the core, and returns either a
//! response or an [`ErrorResponse`] envelope (`{"error": ..., "details": ...}`).

use crate::application::assistant::{ConvertInput, PatternAssistant, RefineInput};
use crate::application::files::{FileAction, FileJob, FileOutcome, process_file};
use crate::application::pattern::{
    DEFAULT_CONTEXT_RADIUS, DEFAULT_SIZE_LIMIT, MatchFlags, PatternMatcher, ReplaceMode,
};
use crate::domain::{
    ErrorResponse, ExamplePair, MatchResult, PatternOptions, PatternPair, PatternSpecification,
    TargetDialect,
};
use crate::infra::extract::UploadedFile;
use log::debug;
use serde::{Deserialize, Serialize};

/// An example row as sent by a client: `["text", "note"]`, `"text"`, or `{text, note}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExampleInput {
    Pair(String, String),
    Text(String),
    Row(ExamplePair),
}

impl From<ExampleInput> for ExamplePair {
    fn from(input: ExampleInput) -> Self {
        match input {
            ExampleInput::Pair(text, note) => ExamplePair::with_note(text, note),
            ExampleInput::Text(text) => ExamplePair::new(text),
            ExampleInput::Row(row) => row,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub description: String,
    #[serde(default)]
    pub examples: Vec<ExampleInput>,
    #[serde(default)]
    pub not_examples: Vec<ExampleInput>,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default = "default_true")]
    pub part_of_word: bool,
}

impl GenerateRequest {
    pub fn into_specification(self) -> PatternSpecification {
        PatternSpecification {
            description: self.description,
            examples: self.examples.into_iter().map(Into::into).collect(),
            not_examples: self.not_examples.into_iter().map(Into::into).collect(),
            options: PatternOptions {
                case_sensitive: self.case_sensitive,
                part_of_word: self.part_of_word,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateResponse {
    pub find_pattern: String,
    pub replace_pattern: String,
    pub explanation: String,
    pub generation_context: String,
}

pub async fn generate(
    assistant: &PatternAssistant,
    request: GenerateRequest,
) -> Result<GenerateResponse, ErrorResponse> {
    let spec = request.into_specification();
    let outcome = assistant.generate(&spec, None).await?;
    Ok(GenerateResponse {
        find_pattern: outcome.pair.find,
        replace_pattern: outcome.pair.replace,
        explanation: outcome.explanation,
        generation_context: outcome.generation_context,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineRequest {
    #[serde(alias = "basePrompt")]
    pub generation_context: String,
    #[serde(alias = "currentFindPattern")]
    pub current_find: String,
    #[serde(default, alias = "currentReplacePattern")]
    pub current_replace: String,
    #[serde(alias = "userMessage")]
    pub feedback: String,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default = "default_true")]
    pub part_of_word: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefineResponse {
    pub find_pattern: String,
    pub replace_pattern: String,
    pub explanation: String,
    pub feedback: String,
}

pub async fn refine(
    assistant: &PatternAssistant,
    request: RefineRequest,
) -> Result<RefineResponse, ErrorResponse> {
    let input = RefineInput {
        generation_context: request.generation_context,
        current: PatternPair::new(request.current_find, request.current_replace),
        feedback: request.feedback,
        options: PatternOptions {
            case_sensitive: request.case_sensitive,
            part_of_word: request.part_of_word,
        },
    };
    let outcome = assistant.refine(&input, None).await?;
    Ok(RefineResponse {
        find_pattern: outcome.pair.find,
        replace_pattern: outcome.pair.replace,
        explanation: outcome.explanation,
        feedback: outcome.feedback,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertSyntaxRequest {
    pub find_pattern: String,
    #[serde(default)]
    pub replace_pattern: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub dialect: TargetDialect,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertSyntaxResponse {
    pub dialect: TargetDialect,
    pub target_find: String,
    pub target_replace: String,
}

pub async fn convert_syntax(
    assistant: &PatternAssistant,
    request: ConvertSyntaxRequest,
) -> Result<ConvertSyntaxResponse, ErrorResponse> {
    let input = ConvertInput {
        pair: PatternPair::new(
            request.find_pattern,
            request.replace_pattern.unwrap_or_default(),
        ),
        description: request.description,
        dialect: request.dialect,
    };
    let converted = assistant.convert(&input, None).await?;
    Ok(ConvertSyntaxResponse {
        dialect: converted.dialect,
        target_find: converted.target_find,
        target_replace: converted.target_replace,
    })
}

fn flags(case_sensitive: bool) -> MatchFlags {
    MatchFlags {
        case_sensitive,
        size_limit: DEFAULT_SIZE_LIMIT,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestTextRequest {
    pub find_pattern: String,
    #[serde(alias = "testText", alias = "text")]
    pub subject: String,
    #[serde(default)]
    pub case_sensitive: bool,
    /// Attach context snippets of this radius.
    #[serde(default)]
    pub context_radius: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestTextResponse {
    pub matches: Vec<MatchResult>,
}

pub fn test_on_text(request: &TestTextRequest) -> Result<TestTextResponse, ErrorResponse> {
    let matcher = PatternMatcher::compile(&request.find_pattern, flags(request.case_sensitive))?;
    let matches = match request.context_radius {
        Some(radius) => matcher.find_all_with_context(&request.subject, radius),
        None => matcher.find_all(&request.subject),
    };
    debug!("test_on_text: {} matches", matches.len());
    Ok(TestTextResponse { matches })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubstituteTextRequest {
    pub find_pattern: String,
    #[serde(alias = "replaceTemplate")]
    pub replace_pattern: String,
    #[serde(alias = "text", alias = "testText")]
    pub subject: String,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub mode: ReplaceMode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubstituteTextResponse {
    pub result: String,
}

pub fn substitute_on_text(
    request: &SubstituteTextRequest,
) -> Result<SubstituteTextResponse, ErrorResponse> {
    let matcher = PatternMatcher::compile(&request.find_pattern, flags(request.case_sensitive))?;
    Ok(SubstituteTextResponse {
        result: matcher.substitute(&request.subject, &request.replace_pattern, request.mode),
    })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TestFileRequest {
    #[serde(default)]
    pub find_pattern: Option<String>,
    #[serde(default)]
    pub replace_pattern: Option<String>,
    #[serde(default)]
    pub case_sensitive: bool,
    #[serde(default)]
    pub action: FileAction,
}

/// File results always carry context snippets.
pub fn test_on_file(
    file: Option<&UploadedFile>,
    request: &TestFileRequest,
) -> Result<FileOutcome, ErrorResponse> {
    Ok(process_file(&FileJob {
        file,
        find: request.find_pattern.as_deref(),
        replace: request.replace_pattern.as_deref(),
        action: request.action,
        flags: flags(request.case_sensitive),
        context_radius: DEFAULT_CONTEXT_RADIUS,
    })?)
}
