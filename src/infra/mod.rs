//! Infrastructure layer (adapters/implementations).
//!
//! This module contains IO-heavy integrations (ACP agents, config files, rule
//! dictionaries on disk, uploaded documents).

pub mod agents;
pub mod app_config;
pub mod completion;
pub mod extract;
pub mod rule_library;
