use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Regex dialects the syntax converter can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TargetDialect {
    #[default]
    DotNet,
    Pcre,
    Python,
    JavaScript,
    Java,
}

impl TargetDialect {
    pub fn label(self) -> &'static str {
        match self {
            Self::DotNet => ".NET",
            Self::Pcre => "PCRE",
            Self::Python => "Python re",
            Self::JavaScript => "JavaScript",
            Self::Java => "Java",
        }
    }
}

impl std::fmt::Display for TargetDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            Self::DotNet => "dotnet",
            Self::Pcre => "pcre",
            Self::Python => "python",
            Self::JavaScript => "javascript",
            Self::Java => "java",
        };
        write!(f, "{value}")
    }
}

impl FromStr for TargetDialect {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "dotnet" | ".net" | "net" | "csharp" => Ok(Self::DotNet),
            "pcre" => Ok(Self::Pcre),
            "python" | "py" => Ok(Self::Python),
            "javascript" | "js" => Ok(Self::JavaScript),
            "java" => Ok(Self::Java),
            other => Err(format!("invalid target dialect: {other}")),
        }
    }
}

/// A pattern pair rewritten for another dialect. Never fed back into the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertedPattern {
    pub dialect: TargetDialect,
    pub target_find: String,
    pub target_replace: String,
}
