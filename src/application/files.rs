//! Test or substitute a pattern against an uploaded file's text.

use crate::application::pattern::{MatchFlags, PatternMatcher, ReplaceMode};
use crate::domain::{AssistError, MatchResult};
use crate::infra::extract::{UploadedFile, extract_plain_text};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum FileAction {
    #[default]
    Test,
    Substitute,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FileOutcome {
    Matches { matches: Vec<MatchResult> },
    Substituted { result: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileJob<'a> {
    pub file: Option<&'a UploadedFile>,
    pub find: Option<&'a str>,
    pub replace: Option<&'a str>,
    pub action: FileAction,
    pub flags: MatchFlags,
    pub context_radius: usize,
}

/// Validation runs before extraction, and extraction before any pattern work.
/// Substitution uses the template unchanged; there is no `$` escaping here.
pub fn process_file(job: &FileJob<'_>) -> Result<FileOutcome, AssistError> {
    let file = job
        .file
        .ok_or_else(|| AssistError::validation("No file uploaded"))?;
    let find = job
        .find
        .filter(|find| !find.is_empty())
        .ok_or_else(|| AssistError::validation("Find pattern is required"))?;
    let replace = match (job.action, job.replace) {
        (FileAction::Substitute, None) => {
            return Err(AssistError::validation(
                "Replace pattern is required for substitute action",
            ));
        }
        (_, replace) => replace.unwrap_or_default(),
    };

    let text = extract_plain_text(file)?;
    debug!(
        "processing {} ({} chars), action {:?}",
        file.name,
        text.chars().count(),
        job.action
    );

    let matcher = PatternMatcher::compile(find, job.flags)?;
    Ok(match job.action {
        FileAction::Test => FileOutcome::Matches {
            matches: matcher.find_all_with_context(&text, job.context_radius),
        },
        FileAction::Substitute => FileOutcome::Substituted {
            result: matcher.substitute(&text, replace, ReplaceMode::Template),
        },
    })
}

/// Default download name for a substituted file.
pub fn substituted_file_name(original: &str) -> String {
    format!("substituted_{original}")
}
