//! regexcraft: describe a find/replace in plain words, get a tested regex pair back.
//!
//! Layers: [`domain`] data, [`application`] matching and agent orchestration,
//! [`state`] the session workbench, [`commands`] the request/response boundary,
//! [`infra`] agents, config and files.

pub mod application;
pub mod commands;
pub mod domain;
pub mod infra;
pub mod prompts;
pub mod state;

use std::future::Future;
use tokio::runtime::Runtime;

lazy_static::lazy_static! {
    static ref RUNTIME: Runtime = Runtime::new().expect("Failed to create Tokio runtime");
}

/// Run `future` to completion on the shared runtime. Used by the CLI for agent calls.
pub fn block_on<F: Future>(future: F) -> F::Output {
    RUNTIME.block_on(future)
}
