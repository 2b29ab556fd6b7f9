use super::types::{ConvertInput, DELIMITER, RefineInput};
use crate::domain::{AssistError, ExamplePair, PatternOptions, PatternPair, PatternSpecification};
use crate::infra::completion::ChatMessage;
use crate::prompts;
use serde_json::json;

const WHOLE_WORDS: &str = "Match ENTIRE WORDS ONLY (use \\b word boundaries)";
const PART_OF_WORDS: &str = "Match part of words allowed (no word boundaries needed)";

fn word_rule(options: PatternOptions) -> &'static str {
    if options.part_of_word {
        PART_OF_WORDS
    } else {
        WHOLE_WORDS
    }
}

fn example_section<'a>(heading: &str, examples: impl Iterator<Item = &'a ExamplePair>) -> String {
    let rows: Vec<String> = examples
        .map(|example| {
            let note = example
                .note
                .as_deref()
                .map(str::trim)
                .filter(|note| !note.is_empty())
                .unwrap_or("(No description)");
            format!("Ex: {}\nDesc: {note}", example.text)
        })
        .collect();

    if rows.is_empty() {
        String::new()
    } else {
        format!("{heading} EXAMPLES:\n{}\n\n", rows.join("\n"))
    }
}

fn collapse_blank_runs(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut newlines = 0;
    for ch in text.chars() {
        if ch == '\n' {
            newlines += 1;
            if newlines > 2 {
                continue;
            }
        } else {
            newlines = 0;
        }
        out.push(ch);
    }
    out
}

/// Render a specification into the structured prompt that becomes the draft's
/// generation context. Blank examples are dropped and empty sections omitted.
pub fn render_generation_context(spec: &PatternSpecification) -> String {
    let mut out = format!("DESCRIPTION:\n{}\n\n", spec.description.trim());
    out.push_str(&example_section("MATCH", spec.usable_examples()));
    out.push_str(&example_section("DO NOT MATCH", spec.usable_not_examples()));
    out.push_str(&format!(
        "OPTIONS:\n- Case-sensitive: {}\n- {}",
        spec.options.case_sensitive,
        word_rule(spec.options)
    ));
    collapse_blank_runs(&out).trim().to_string()
}

fn render(name: &str, ctx: &serde_json::Value) -> Result<String, AssistError> {
    prompts::render(name, ctx).map_err(|err| AssistError::capability(format!("{err:#}")))
}

pub(super) fn generation_messages(context: &str) -> Result<Vec<ChatMessage>, AssistError> {
    Ok(vec![
        ChatMessage::system(render("generate_system", &json!({ "delimiter": DELIMITER }))?),
        ChatMessage::user(render(
            "generate_user",
            &json!({ "base_prompt": context, "delimiter": DELIMITER }),
        )?),
    ])
}

pub(super) fn refinement_messages(input: &RefineInput) -> Result<Vec<ChatMessage>, AssistError> {
    Ok(vec![
        ChatMessage::system(render("refine_system", &json!({ "delimiter": DELIMITER }))?),
        ChatMessage::user(render(
            "refine_user",
            &json!({
                "generation_context": input.generation_context,
                "current_find": input.current.find,
                "current_replace": input.current.replace,
                "case_sensitive": input.options.case_sensitive,
                "word_rule": word_rule(input.options),
                "feedback": input.feedback.trim(),
                "delimiter": DELIMITER,
            }),
        )?),
    ])
}

/// `context` frames the pair: the description after a generation, a neutral
/// line after a refinement.
pub(super) fn explanation_messages(
    context: &str,
    pair: &PatternPair,
) -> Result<Vec<ChatMessage>, AssistError> {
    let replace = if pair.replace.is_empty() {
        "(none)"
    } else {
        pair.replace.as_str()
    };
    Ok(vec![
        ChatMessage::system(render("explain_system", &json!({}))?),
        ChatMessage::user(render(
            "explain_user",
            &json!({ "context": context, "find": pair.find, "replace": replace }),
        )?),
    ])
}

pub(super) fn conversion_messages(input: &ConvertInput) -> Result<Vec<ChatMessage>, AssistError> {
    let description = input
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or("(No description provided)");
    let replace = if input.pair.replace.trim().is_empty() {
        "(none)"
    } else {
        input.pair.replace.as_str()
    };
    let dialect = input.dialect.label();

    Ok(vec![
        ChatMessage::system(render(
            "convert_system",
            &json!({ "dialect": dialect, "delimiter": DELIMITER }),
        )?),
        ChatMessage::user(render(
            "convert_user",
            &json!({
                "dialect": dialect,
                "description": description,
                "find": input.pair.find,
                "replace": replace,
                "delimiter": DELIMITER,
            }),
        )?),
    ])
}
