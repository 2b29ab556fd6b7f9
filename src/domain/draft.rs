use serde::{Deserialize, Serialize};

/// A find pattern body plus its replace template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatternPair {
    pub find: String,
    pub replace: String,
}

impl PatternPair {
    pub fn new(find: impl Into<String>, replace: impl Into<String>) -> Self {
        Self {
            find: find.into(),
            replace: replace.into(),
        }
    }
}

/// Where the generated half of a draft came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum DraftOrigin {
    Generated,
    Refined { turn: usize },
    Rule { id: String },
}

/// The working find/replace pair and everything needed to refine it.
///
/// `generated` is what the last successful generation or refinement returned and
/// is only ever replaced wholesale. `edited` starts as a copy of it, takes local
/// edits, and is what testing and refinement operate on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatternDraft {
    generated: PatternPair,
    edited: PatternPair,
    explanation: String,
    generation_context: String,
    origin: DraftOrigin,
}

impl PatternDraft {
    pub fn new(
        generated: PatternPair,
        explanation: impl Into<String>,
        generation_context: impl Into<String>,
        origin: DraftOrigin,
    ) -> Self {
        Self {
            edited: generated.clone(),
            generated,
            explanation: explanation.into(),
            generation_context: generation_context.into(),
            origin,
        }
    }

    pub fn generated(&self) -> &PatternPair {
        &self.generated
    }

    pub fn edited(&self) -> &PatternPair {
        &self.edited
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn generation_context(&self) -> &str {
        &self.generation_context
    }

    pub fn origin(&self) -> &DraftOrigin {
        &self.origin
    }

    pub fn is_edited(&self) -> bool {
        self.edited != self.generated
    }

    /// Local edits leave the explanation and generation context untouched.
    pub fn set_edited_find(&mut self, find: impl Into<String>) {
        self.edited.find = find.into();
    }

    pub fn set_edited_replace(&mut self, replace: impl Into<String>) {
        self.edited.replace = replace.into();
    }

    pub fn discard_edits(&mut self) {
        self.edited = self.generated.clone();
    }

    /// Replace the generated pair and explanation with a refinement result.
    /// Pending edits are dropped.
    pub fn apply_refinement(
        &mut self,
        pair: PatternPair,
        explanation: impl Into<String>,
        turn: usize,
    ) {
        self.edited = pair.clone();
        self.generated = pair;
        self.explanation = explanation.into();
        self.origin = DraftOrigin::Refined { turn };
    }
}
