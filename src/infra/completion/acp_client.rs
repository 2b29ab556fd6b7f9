use agent_client_protocol::{
    ContentBlock, ExtNotification, ExtRequest, ExtResponse, RequestPermissionOutcome,
    RequestPermissionRequest, RequestPermissionResponse, SessionNotification, SessionUpdate,
};
use async_trait::async_trait;
use log::debug;
use serde_json::value::RawValue;
use std::sync::{Arc, Mutex};

/// ACP client that only listens: it collects the agent's streamed message text
/// and refuses every tool permission, since a completion needs no tools.
pub(super) struct CompletionClient {
    pub message: Arc<Mutex<String>>,
    pub thoughts: Arc<Mutex<String>>,
}

impl CompletionClient {
    pub fn new() -> Self {
        Self {
            message: Arc::new(Mutex::new(String::new())),
            thoughts: Arc::new(Mutex::new(String::new())),
        }
    }

    fn append(store: &Arc<Mutex<String>>, text: &str) {
        if let Ok(mut guard) = store.lock() {
            guard.push_str(text);
        }
    }
}

#[async_trait(?Send)]
impl agent_client_protocol::Client for CompletionClient {
    async fn request_permission(
        &self,
        args: RequestPermissionRequest,
    ) -> agent_client_protocol::Result<RequestPermissionResponse> {
        debug!(
            target: "completion",
            "acp: deny permission: kind={:?} title={:?}",
            args.tool_call.fields.kind,
            args.tool_call.fields.title
        );
        Ok(RequestPermissionResponse::new(
            RequestPermissionOutcome::Cancelled,
        ))
    }

    async fn session_notification(
        &self,
        notification: SessionNotification,
    ) -> agent_client_protocol::Result<()> {
        match &notification.update {
            SessionUpdate::AgentMessageChunk(chunk) => {
                if let ContentBlock::Text(text) = &chunk.content {
                    Self::append(&self.message, &text.text);
                }
            }
            SessionUpdate::AgentThoughtChunk(chunk) => {
                if let ContentBlock::Text(text) = &chunk.content {
                    Self::append(&self.thoughts, &text.text);
                }
            }
            other => {
                debug!(target: "completion", "acp: ignored session update: {other:?}");
            }
        }
        Ok(())
    }

    async fn ext_method(&self, args: ExtRequest) -> agent_client_protocol::Result<ExtResponse> {
        debug!(target: "completion", "acp: ignored ext method {}", args.method);
        let raw = RawValue::from_string(r#"{"status":"ignored"}"#.to_string())
            .map(Arc::from)
            .map_err(|_| agent_client_protocol::Error::invalid_params())?;
        Ok(ExtResponse::new(raw))
    }

    async fn ext_notification(&self, args: ExtNotification) -> agent_client_protocol::Result<()> {
        debug!(target: "completion", "acp: ignored ext notification {}", args.method);
        Ok(())
    }
}
