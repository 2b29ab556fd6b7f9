//! Deterministic matching and substitution over in-memory strings. No I/O.

pub mod matcher;
pub mod substitution;

pub use matcher::{
    DEFAULT_CONTEXT_RADIUS, DEFAULT_SIZE_LIMIT, MatchFlags, PatternMatcher, context_snippet,
    find_all,
};
pub use substitution::{ReplaceMode, substitute, substitute_with_mode};
