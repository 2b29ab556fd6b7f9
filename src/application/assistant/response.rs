use super::types::DELIMITER;
use crate::domain::{AssistError, PatternPair};

/// Split a raw completion response into a find/replace pair.
///
/// Without a delimiter the whole response is the find pattern and the replace
/// pattern is empty. Parts after the second are ignored.
pub fn split_pattern_pair(raw: &str) -> Result<PatternPair, AssistError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(AssistError::GenerationParse(
            "No content received from the completion provider".to_string(),
        ));
    }

    let mut parts = raw.split(DELIMITER).map(str::trim);
    let find = parts.next().unwrap_or_default();
    let replace = parts.next().unwrap_or_default();

    if find.is_empty() {
        return Err(AssistError::GenerationParse(
            "Response did not contain a find pattern".to_string(),
        ));
    }
    Ok(PatternPair::new(find, replace))
}
