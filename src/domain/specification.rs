use serde::{Deserialize, Serialize};

/// One example row: the text itself plus an optional note on why it (doesn't) match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ExamplePair {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ExamplePair {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            note: None,
        }
    }

    pub fn with_note(text: impl Into<String>, note: impl Into<String>) -> Self {
        let note = note.into();
        Self {
            text: text.into(),
            note: (!note.trim().is_empty()).then_some(note),
        }
    }

    /// Rows with blank example text are dropped before generation.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl From<(String, String)> for ExamplePair {
    fn from((text, note): (String, String)) -> Self {
        Self::with_note(text, note)
    }
}

/// Matching options carried alongside a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternOptions {
    pub case_sensitive: bool,
    /// `true` allows substring matches, `false` asks for whole-word boundaries.
    pub part_of_word: bool,
}

impl Default for PatternOptions {
    fn default() -> Self {
        Self {
            case_sensitive: false,
            part_of_word: true,
        }
    }
}

/// Everything the user supplies before the first generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatternSpecification {
    pub description: String,
    #[serde(default)]
    pub examples: Vec<ExamplePair>,
    #[serde(default)]
    pub not_examples: Vec<ExamplePair>,
    #[serde(default)]
    pub options: PatternOptions,
}

impl PatternSpecification {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Default::default()
        }
    }

    pub fn with_example(mut self, example: ExamplePair) -> Self {
        self.examples.push(example);
        self
    }

    pub fn with_not_example(mut self, example: ExamplePair) -> Self {
        self.not_examples.push(example);
        self
    }

    pub fn with_options(mut self, options: PatternOptions) -> Self {
        self.options = options;
        self
    }

    pub fn usable_examples(&self) -> impl Iterator<Item = &ExamplePair> {
        self.examples.iter().filter(|ex| !ex.is_blank())
    }

    pub fn usable_not_examples(&self) -> impl Iterator<Item = &ExamplePair> {
        self.not_examples.iter().filter(|ex| !ex.is_blank())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_examples_are_filtered() {
        let spec = PatternSpecification::new("numbers")
            .with_example(ExamplePair::new("42"))
            .with_example(ExamplePair::new("   "))
            .with_not_example(ExamplePair::with_note("", "ignored"));

        assert_eq!(spec.usable_examples().count(), 1);
        assert_eq!(spec.usable_not_examples().count(), 0);
    }

    #[test]
    fn test_blank_note_becomes_none() {
        let pair = ExamplePair::from(("abc".to_string(), "  ".to_string()));
        assert_eq!(pair.note, None);
    }
}
