//! Global find/replace built on the matcher's scan.
//!
//! Templates use the engine's syntax: `$1`, `${1}` and `${name}` expand to
//! capture groups and `$$` is a literal dollar. `$1px` means group 1 then `px`.
//! Callers that want the replacement inserted verbatim use [`ReplaceMode::Literal`]
//! instead of escaping.

use super::matcher::{MatchFlags, PatternMatcher};
use crate::domain::AssistError;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReplaceMode {
    /// Expand back-references in the template.
    #[default]
    Template,
    /// Insert the replacement text as-is.
    Literal,
}

impl PatternMatcher {
    pub fn substitute(&self, subject: &str, replacement: &str, mode: ReplaceMode) -> String {
        let template = match mode {
            ReplaceMode::Template => brace_numbered_groups(replacement),
            ReplaceMode::Literal => Cow::Borrowed(replacement),
        };
        let mut out = String::with_capacity(subject.len());
        let mut last = 0;

        for caps in self.scan(subject) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            out.push_str(&subject[last..whole.start()]);
            match mode {
                ReplaceMode::Template => caps.expand(&template, &mut out),
                ReplaceMode::Literal => out.push_str(replacement),
            }
            last = whole.end();
        }

        out.push_str(&subject[last..]);
        out
    }
}

/// Rewrite `$12abc` to `${12}abc` so a numbered group followed by a word
/// character is not read as a group named `12abc`. `$$` and `${..}` pass through.
fn brace_numbered_groups(template: &str) -> Cow<'_, str> {
    if !template.contains('$') {
        return Cow::Borrowed(template);
    }

    let mut out = String::with_capacity(template.len() + 4);
    let mut rest = template;
    while let Some(idx) = rest.find('$') {
        out.push_str(&rest[..idx]);
        let after = &rest[idx + 1..];

        if let Some(tail) = after.strip_prefix('$') {
            out.push_str("$$");
            rest = tail;
            continue;
        }

        let digits = after.bytes().take_while(u8::is_ascii_digit).count();
        let followed_by_word = after[digits..]
            .chars()
            .next()
            .is_some_and(|ch| ch.is_ascii_alphanumeric() || ch == '_');
        if digits > 0 && followed_by_word {
            out.push_str("${");
            out.push_str(&after[..digits]);
            out.push('}');
        } else {
            out.push('$');
            out.push_str(&after[..digits]);
        }
        rest = &after[digits..];
    }
    out.push_str(rest);
    Cow::Owned(out)
}

/// Replace every match of `find_pattern` in `subject` using `replace_template`.
pub fn substitute(
    find_pattern: &str,
    flags: MatchFlags,
    replace_template: &str,
    subject: &str,
) -> Result<String, AssistError> {
    substitute_with_mode(
        find_pattern,
        flags,
        replace_template,
        subject,
        ReplaceMode::Template,
    )
}

pub fn substitute_with_mode(
    find_pattern: &str,
    flags: MatchFlags,
    replacement: &str,
    subject: &str,
    mode: ReplaceMode,
) -> Result<String, AssistError> {
    let matcher = PatternMatcher::compile(find_pattern, flags)?;
    Ok(matcher.substitute(subject, replacement, mode))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flags() -> MatchFlags {
        MatchFlags::new(false)
    }

    #[test]
    fn test_numbered_backreferences_expand() {
        let out = substitute(r"(\w+)@(\w+)", flags(), "$2 at $1", "joe@home and ann@work").unwrap();
        assert_eq!(out, "home at joe and work at ann");
    }

    #[test]
    fn test_braced_and_named_groups() {
        let out = substitute(r"(?P<num>\d+)px", flags(), "${num}rem", "12px 4px").unwrap();
        assert_eq!(out, "12rem 4rem");

        let out = substitute(r"(\d)", flags(), "${1}0", "a1b2").unwrap();
        assert_eq!(out, "a10b20");
    }

    #[test]
    fn test_numbered_group_followed_by_word_chars() {
        let out = substitute(r"(\d+)", flags(), "$1px", "width 5").unwrap();
        assert_eq!(out, "width 5px");

        let out = substitute(r"(\w+)-(\d+)", flags(), "$2_$1x", "ab-12").unwrap();
        assert_eq!(out, "12_abx");
    }

    #[test]
    fn test_brace_numbered_groups_leaves_other_syntax() {
        assert_eq!(brace_numbered_groups("$1 percent"), "$1 percent");
        assert_eq!(brace_numbered_groups("$10th"), "${10}th");
        assert_eq!(brace_numbered_groups("$$1px"), "$$1px");
        assert_eq!(brace_numbered_groups("${1}px ${name}"), "${1}px ${name}");
        assert_eq!(brace_numbered_groups("$name $"), "$name $");
    }

    #[test]
    fn test_double_dollar_is_literal_in_template_mode() {
        let out = substitute(r"\d+", flags(), "$$", "cost 5").unwrap();
        assert_eq!(out, "cost $");
    }

    #[test]
    fn test_literal_mode_skips_expansion() {
        let out =
            substitute_with_mode(r"(\d+)", flags(), "$1", "cost 5", ReplaceMode::Literal).unwrap();
        assert_eq!(out, "cost $1");
    }

    #[test]
    fn test_unknown_group_expands_to_nothing() {
        let out = substitute(r"(\d+)", flags(), "<$3>", "a1").unwrap();
        assert_eq!(out, "a<>");
    }

    #[test]
    fn test_zero_length_matches_substitute_like_find_all() {
        let out = substitute("a*", flags(), "R", "baaa").unwrap();
        assert_eq!(out, "RbRR");

        let out = substitute("x*", flags(), "-", "ab").unwrap();
        assert_eq!(out, "-a-b-");
    }

    #[test]
    fn test_case_insensitive_substitution() {
        let out = substitute("cat", flags(), "dog", "Cat CAT cat").unwrap();
        assert_eq!(out, "dog dog dog");

        let out = substitute("cat", MatchFlags::new(true), "dog", "Cat CAT cat").unwrap();
        assert_eq!(out, "Cat CAT dog");
    }

    #[test]
    fn test_invalid_pattern_fails_without_output() {
        assert!(matches!(
            substitute("(", flags(), "x", "abc"),
            Err(AssistError::PatternSyntax(_))
        ));
    }

    #[test]
    fn test_subject_is_untouched() {
        let subject = String::from("keep 1 this");
        let _ = substitute(r"\d", flags(), "#", &subject).unwrap();
        assert_eq!(subject, "keep 1 this");
    }
}
