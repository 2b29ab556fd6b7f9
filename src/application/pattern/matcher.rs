//! Find-all matching with the zero-length cursor rule.
//!
//! The scan never stops at the first match. After a zero-width match the cursor
//! moves one character past the match start, so a pattern like `a*` against
//! `"bbb"` terminates and reports each position at most once.

use crate::domain::{AssistError, MatchResult};
use regex::{Captures, Regex, RegexBuilder};

/// Characters of context kept on each side of a match in file results.
pub const DEFAULT_CONTEXT_RADIUS: usize = 50;

const ELLIPSIS: &str = "...";

/// Default compiled-program size limit (10 MiB).
pub const DEFAULT_SIZE_LIMIT: usize = 10 * (1 << 20);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchFlags {
    pub case_sensitive: bool,
    pub size_limit: usize,
}

impl MatchFlags {
    pub fn new(case_sensitive: bool) -> Self {
        Self {
            case_sensitive,
            size_limit: DEFAULT_SIZE_LIMIT,
        }
    }
}

impl Default for MatchFlags {
    fn default() -> Self {
        Self::new(false)
    }
}

/// A compiled find pattern.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    regex: Regex,
}

impl PatternMatcher {
    pub fn compile(find_pattern: &str, flags: MatchFlags) -> Result<Self, AssistError> {
        let regex = RegexBuilder::new(find_pattern)
            .case_insensitive(!flags.case_sensitive)
            .size_limit(flags.size_limit)
            .build()?;
        Ok(Self { regex })
    }

    pub(crate) fn scan<'r, 'h>(&'r self, subject: &'h str) -> MatchScan<'r, 'h> {
        MatchScan {
            regex: &self.regex,
            subject,
            cursor: 0,
            done: false,
        }
    }

    pub fn find_all(&self, subject: &str) -> Vec<MatchResult> {
        self.collect(subject, None)
    }

    pub fn find_all_with_context(&self, subject: &str, radius: usize) -> Vec<MatchResult> {
        self.collect(subject, Some(radius))
    }

    fn collect(&self, subject: &str, radius: Option<usize>) -> Vec<MatchResult> {
        let mut offsets = CharOffsets::new(subject);
        self.scan(subject)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                let start = offsets.char_index(whole.start());
                let end = offsets.char_index(whole.end());
                let groups = caps
                    .iter()
                    .skip(1)
                    .map(|group| group.map(|m| m.as_str().to_string()))
                    .collect();
                Some(MatchResult {
                    matched: whole.as_str().to_string(),
                    start,
                    end,
                    context: radius
                        .map(|radius| context_snippet(subject, whole.start(), whole.end(), radius)),
                    groups,
                })
            })
            .collect()
    }
}

/// Compile `find_pattern` and return every match in `subject`.
pub fn find_all(
    find_pattern: &str,
    flags: MatchFlags,
    subject: &str,
) -> Result<Vec<MatchResult>, AssistError> {
    Ok(PatternMatcher::compile(find_pattern, flags)?.find_all(subject))
}

/// Iterator over successive non-overlapping matches.
pub(crate) struct MatchScan<'r, 'h> {
    regex: &'r Regex,
    subject: &'h str,
    cursor: usize,
    done: bool,
}

impl<'h> Iterator for MatchScan<'_, 'h> {
    type Item = Captures<'h>;

    fn next(&mut self) -> Option<Captures<'h>> {
        if self.done || self.cursor > self.subject.len() {
            return None;
        }

        let Some(caps) = self.regex.captures_at(self.subject, self.cursor) else {
            self.done = true;
            return None;
        };
        let (start, end) = {
            let whole = caps.get(0)?;
            (whole.start(), whole.end())
        };

        if start == end {
            match self.subject[start..].chars().next() {
                Some(ch) => self.cursor = start + ch.len_utf8(),
                None => self.done = true,
            }
        } else {
            self.cursor = end;
        }

        Some(caps)
    }
}

/// Converts ascending byte offsets to character offsets without rescanning.
struct CharOffsets<'a> {
    subject: &'a str,
    byte: usize,
    chars: usize,
}

impl<'a> CharOffsets<'a> {
    fn new(subject: &'a str) -> Self {
        Self {
            subject,
            byte: 0,
            chars: 0,
        }
    }

    fn char_index(&mut self, byte: usize) -> usize {
        if byte < self.byte {
            return self.subject[..byte].chars().count();
        }
        self.chars += self.subject[self.byte..byte].chars().count();
        self.byte = byte;
        self.chars
    }
}

/// `radius` characters around `[start, end)` (byte offsets), with `...` where clipped.
pub fn context_snippet(subject: &str, start: usize, end: usize, radius: usize) -> String {
    let ctx_start = step_back(subject, start, radius);
    let ctx_end = step_forward(subject, end, radius);

    let mut snippet = String::with_capacity(ctx_end - ctx_start + 2 * ELLIPSIS.len());
    if ctx_start > 0 {
        snippet.push_str(ELLIPSIS);
    }
    snippet.push_str(&subject[ctx_start..ctx_end]);
    if ctx_end < subject.len() {
        snippet.push_str(ELLIPSIS);
    }
    snippet
}

fn step_back(subject: &str, from: usize, chars: usize) -> usize {
    if chars == 0 {
        return from;
    }
    subject[..from]
        .char_indices()
        .rev()
        .nth(chars - 1)
        .map(|(idx, _)| idx)
        .unwrap_or(0)
}

fn step_forward(subject: &str, from: usize, chars: usize) -> usize {
    subject[from..]
        .char_indices()
        .nth(chars)
        .map(|(idx, _)| from + idx)
        .unwrap_or(subject.len())
}
