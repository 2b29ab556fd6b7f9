use super::{CompletionError, CompletionProvider, CompletionRequest};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Replays queued responses in order and records every request it saw.
///
/// Used by tests and by `--offline` runs of the CLI.
#[derive(Clone, Default)]
pub struct ScriptedCompletion {
    responses: Arc<Mutex<VecDeque<Result<String, CompletionError>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let scripted = Self::new();
        for response in responses {
            scripted.push_ok(response);
        }
        scripted
    }

    pub fn push_ok(&self, response: impl Into<String>) {
        self.push(Ok(response.into()));
    }

    pub fn push_err(&self, err: CompletionError) {
        self.push(Err(err));
    }

    fn push(&self, response: Result<String, CompletionError>) {
        if let Ok(mut guard) = self.responses.lock() {
            guard.push_back(response);
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.responses.lock().map(|guard| guard.len()).unwrap_or(0)
    }
}

#[async_trait]
impl CompletionProvider for ScriptedCompletion {
    fn id(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        if let Some(token) = &request.cancel
            && token.is_cancelled()
        {
            return Err(CompletionError::Cancelled);
        }

        if let Ok(mut guard) = self.requests.lock() {
            guard.push(request);
        }

        let next = self
            .responses
            .lock()
            .ok()
            .and_then(|mut guard| guard.pop_front())
            .unwrap_or_else(|| Err(CompletionError::Failed("no scripted response left".into())))?;

        let trimmed = next.trim();
        if trimmed.is_empty() {
            return Err(CompletionError::Empty);
        }
        Ok(trimmed.to_string())
    }
}
