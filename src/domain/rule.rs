use crate::domain::{PatternOptions, PatternSpecification};
use serde::{Deserialize, Serialize};

/// A find/replace rule read from an XML rule dictionary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub description: String,
    pub find: String,
    pub replace: String,
    pub active: bool,
    pub case_sensitive: bool,
    pub whole_word: bool,
    pub wildcard: bool,
    pub word_rule: bool,
    pub start_of_paragraph: bool,
    pub end_of_paragraph: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalised_find: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub normalised_replace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

impl Rule {
    pub fn options(&self) -> PatternOptions {
        PatternOptions {
            case_sensitive: self.case_sensitive,
            part_of_word: !self.whole_word,
        }
    }

    /// A specification that lets a loaded rule go through refinement.
    pub fn to_specification(&self) -> PatternSpecification {
        let description = if self.description.trim().is_empty() {
            format!("Rule {}", self.id)
        } else {
            self.description.clone()
        };
        PatternSpecification::new(description).with_options(self.options())
    }
}

/// A named list of rules loaded from one dictionary file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDictionary {
    pub name: String,
    pub rules: Vec<Rule>,
}

impl RuleDictionary {
    pub fn find_rule(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|rule| rule.id == id)
    }

    pub fn active_rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().filter(|rule| rule.active)
    }
}
