use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnRole {
    User,
    Assistant,
}

impl std::fmt::Display for TurnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            TurnRole::User => "user",
            TurnRole::Assistant => "assistant",
        };
        write!(f, "{value}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefinementTurn {
    pub role: TurnRole,
    pub content: String,
}

impl RefinementTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            content: content.into(),
        }
    }
}

/// Append-only conversation log for one working session. Lives in memory only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinementSession {
    id: String,
    /// RFC 3339.
    started_at: String,
    turns: Vec<RefinementTurn>,
}

impl RefinementSession {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            started_at: Utc::now().to_rfc3339(),
            turns: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn started_at(&self) -> &str {
        &self.started_at
    }

    pub fn turns(&self) -> &[RefinementTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn last(&self) -> Option<&RefinementTurn> {
        self.turns.last()
    }

    pub fn push(&mut self, turn: RefinementTurn) {
        self.turns.push(turn);
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(RefinementTurn::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(RefinementTurn::assistant(content));
    }

    /// Explicit user action only.
    pub fn clear(&mut self) {
        self.turns.clear();
        self.started_at = Utc::now().to_rfc3339();
    }

    pub fn to_markdown(&self) -> String {
        let mut out = format!(
            "# Refinement session {}\n\nStarted {}\n",
            self.id, self.started_at
        );
        if self.turns.is_empty() {
            out.push_str("\n_No refinement turns._\n");
            return out;
        }
        for turn in &self.turns {
            let heading = match turn.role {
                TurnRole::User => "You",
                TurnRole::Assistant => "Assistant",
            };
            out.push_str(&format!("\n**{heading}:** {}\n", turn.content));
        }
        out
    }
}

impl Default for RefinementSession {
    fn default() -> Self {
        Self::new()
    }
}
