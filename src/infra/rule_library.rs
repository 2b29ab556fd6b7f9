//! Read-only access to the XML rule-dictionary tree
//! `<root>/<purpose>/<language>/<dictionary>.xml`.

use crate::domain::{Rule, RuleDictionary};
use log::{debug, warn};
use roxmltree::{Document, Node};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RuleLibraryError {
    #[error("Dictionary not found: {0}")]
    NotFound(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {message}")]
    Xml { path: String, message: String },

    #[error("Invalid path component: {0:?}")]
    InvalidName(String),
}

#[derive(Debug, Clone)]
pub struct RuleLibrary {
    root: PathBuf,
}

impl RuleLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn list_purposes(&self) -> Vec<String> {
        list_dirs(&self.root)
    }

    pub fn list_languages(&self, purpose: &str) -> Result<Vec<String>, RuleLibraryError> {
        let dir = self.root.join(component(purpose)?);
        Ok(list_dirs(&dir))
    }

    pub fn list_dictionaries(
        &self,
        purpose: &str,
        language: &str,
    ) -> Result<Vec<String>, RuleLibraryError> {
        let dir = self
            .root
            .join(component(purpose)?)
            .join(component(language)?);
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn!(target: "rules", "cannot list dictionaries in {}: {err}", dir.display());
                return Ok(Vec::new());
            }
        };

        let mut names: Vec<String> = entries
            .flatten()
            .filter(|entry| entry.path().is_file())
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| !name.starts_with('.') && name.to_ascii_lowercase().ends_with(".xml"))
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn load_dictionary(
        &self,
        purpose: &str,
        language: &str,
        file_name: &str,
    ) -> Result<RuleDictionary, RuleLibraryError> {
        let path = self
            .root
            .join(component(purpose)?)
            .join(component(language)?)
            .join(component(file_name)?);
        let display = format!("{purpose}/{language}/{file_name}");

        let xml = std::fs::read_to_string(&path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                RuleLibraryError::NotFound(display.clone())
            } else {
                RuleLibraryError::Io {
                    path: display.clone(),
                    source,
                }
            }
        })?;

        let dictionary = parse_dictionary(&xml, file_name).map_err(|err| RuleLibraryError::Xml {
            path: display.clone(),
            message: err.to_string(),
        })?;
        debug!(
            target: "rules",
            "loaded {display}: {} rules ({})",
            dictionary.rules.len(),
            dictionary.name
        );
        Ok(dictionary)
    }
}

fn component(name: &str) -> Result<&str, RuleLibraryError> {
    let trimmed = name.trim();
    if trimmed.is_empty()
        || trimmed == "."
        || trimmed.contains("..")
        || trimmed.contains('/')
        || trimmed.contains('\\')
    {
        return Err(RuleLibraryError::InvalidName(name.to_string()));
    }
    Ok(trimmed)
}

fn list_dirs(dir: &Path) -> Vec<String> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!(target: "rules", "cannot list {}: {err}", dir.display());
            return Vec::new();
        }
    };

    let mut names: Vec<String> = entries
        .flatten()
        .filter(|entry| entry.path().is_dir())
        .filter_map(|entry| entry.file_name().into_string().ok())
        .filter(|name| !name.starts_with('.'))
        .collect();
    names.sort();
    names
}

/// Parse a `<dictionary>` document. Any rule field may be an attribute or a child element.
pub fn parse_dictionary(
    xml: &str,
    fallback_name: &str,
) -> Result<RuleDictionary, roxmltree::Error> {
    let doc = Document::parse(xml)?;
    let root = doc.root_element();
    let dictionary = if root.has_tag_name("dictionary") {
        Some(root)
    } else {
        root.children().find(|n| n.has_tag_name("dictionary"))
    };

    let Some(dictionary) = dictionary else {
        return Ok(RuleDictionary {
            name: fallback_name.to_string(),
            rules: Vec::new(),
        });
    };

    let name = field(dictionary, "name")
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| fallback_name.to_string());

    let rules = dictionary
        .children()
        .filter(|n| n.has_tag_name("rule"))
        .map(parse_rule)
        .collect();

    Ok(RuleDictionary { name, rules })
}

fn parse_rule(node: Node<'_, '_>) -> Rule {
    let text = |key: &str| field(node, key).unwrap_or_default();
    let flag = |key: &str| field(node, key).is_some_and(|value| value == "true");

    Rule {
        id: text("id"),
        description: text("description"),
        find: text("find"),
        replace: text("replace"),
        active: flag("active"),
        case_sensitive: flag("caseSensitive"),
        whole_word: flag("wholeWord"),
        wildcard: flag("wildcard"),
        word_rule: flag("wordRule"),
        start_of_paragraph: flag("startOfParagraph"),
        end_of_paragraph: flag("endOfParagraph"),
        normalised_find: field(node, "normalisedFind"),
        normalised_replace: field(node, "normalisedReplace"),
        style: field(node, "style"),
    }
}

fn field(node: Node<'_, '_>, key: &str) -> Option<String> {
    if let Some(value) = node.attribute(key) {
        return Some(value.to_string());
    }
    node.children()
        .find(|child| child.has_tag_name(key))
        .map(|child| child.text().unwrap_or_default().to_string())
}
