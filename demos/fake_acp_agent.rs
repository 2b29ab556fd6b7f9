//! Minimal ACP agent used by the integration tests.
//!
//! Replies to every prompt with `--reply <text>` (streamed as two message
//! chunks). `--delay-ms <n>` stalls before replying.

use agent_client_protocol::{
    Agent, AgentSideConnection, AuthenticateRequest, AuthenticateResponse, Client, ContentChunk,
    Implementation, InitializeRequest, InitializeResponse, NewSessionRequest, NewSessionResponse,
    PromptRequest, PromptResponse, ProtocolVersion, SessionId, SessionNotification, SessionUpdate,
    StopReason,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::LocalSet;
use tokio_util::compat::{TokioAsyncReadCompatExt, TokioAsyncWriteCompatExt};

const DEFAULT_REPLY: &str = "\\d+|||#";

struct FakeAgent {
    reply: String,
    delay: Option<Duration>,
    notifications: mpsc::UnboundedSender<SessionNotification>,
    session_id: Arc<Mutex<SessionId>>,
}

fn flag_value(args: &[String], flag: &str) -> Option<String> {
    args.iter()
        .position(|arg| arg == flag)
        .and_then(|idx| args.get(idx + 1))
        .cloned()
}

fn text_chunk(text: &str) -> ContentChunk {
    serde_json::from_value(serde_json::json!({
        "content": { "type": "text", "text": text }
    }))
    .unwrap()
}

#[async_trait::async_trait(?Send)]
impl Agent for FakeAgent {
    async fn initialize(
        &self,
        _args: InitializeRequest,
    ) -> agent_client_protocol::Result<InitializeResponse> {
        Ok(InitializeResponse::new(ProtocolVersion::V1)
            .agent_info(Implementation::new("fake-agent", "0.1.0")))
    }

    async fn authenticate(
        &self,
        _args: AuthenticateRequest,
    ) -> agent_client_protocol::Result<AuthenticateResponse> {
        Ok(AuthenticateResponse::new())
    }

    async fn new_session(
        &self,
        _args: NewSessionRequest,
    ) -> agent_client_protocol::Result<NewSessionResponse> {
        let session_id = SessionId::new("fake-session");
        *self.session_id.lock().unwrap() = session_id.clone();
        Ok(NewSessionResponse::new(session_id))
    }

    async fn prompt(&self, _args: PromptRequest) -> agent_client_protocol::Result<PromptResponse> {
        let session_id = self.session_id.lock().unwrap().clone();

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let reply = self.reply.as_str();
        let split = reply
            .char_indices()
            .nth(reply.chars().count() / 2)
            .map(|(idx, _)| idx)
            .unwrap_or(reply.len());
        let (head, tail) = reply.split_at(split);

        for part in [head, tail] {
            let _ = self.notifications.send(SessionNotification::new(
                session_id.clone(),
                SessionUpdate::AgentMessageChunk(text_chunk(part)),
            ));
        }

        // Let the notification task flush before the turn ends.
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok(PromptResponse::new(StopReason::EndTurn))
    }

    async fn cancel(
        &self,
        _args: agent_client_protocol::CancelNotification,
    ) -> agent_client_protocol::Result<()> {
        Ok(())
    }

    async fn load_session(
        &self,
        _args: agent_client_protocol::LoadSessionRequest,
    ) -> agent_client_protocol::Result<agent_client_protocol::LoadSessionResponse> {
        Ok(agent_client_protocol::LoadSessionResponse::new())
    }

    async fn set_session_mode(
        &self,
        _args: agent_client_protocol::SetSessionModeRequest,
    ) -> agent_client_protocol::Result<agent_client_protocol::SetSessionModeResponse> {
        Ok(agent_client_protocol::SetSessionModeResponse::new())
    }

    async fn ext_method(
        &self,
        _args: agent_client_protocol::ExtRequest,
    ) -> agent_client_protocol::Result<agent_client_protocol::ExtResponse> {
        Ok(agent_client_protocol::ExtResponse::new(
            serde_json::value::RawValue::from_string("null".to_string())?.into(),
        ))
    }

    async fn ext_notification(
        &self,
        _args: agent_client_protocol::ExtNotification,
    ) -> agent_client_protocol::Result<()> {
        Ok(())
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let reply = flag_value(&args, "--reply").unwrap_or_else(|| DEFAULT_REPLY.to_string());
    let delay = flag_value(&args, "--delay-ms")
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_millis);

    let local = LocalSet::new();
    local
        .run_until(async {
            let (tx, mut rx) = mpsc::unbounded_channel();
            let agent = FakeAgent {
                reply,
                delay,
                notifications: tx,
                session_id: Arc::new(Mutex::new(SessionId::new("fake-session"))),
            };

            let stdin = tokio::io::stdin().compat();
            let stdout = tokio::io::stdout().compat_write();
            let spawn_fn = |fut| {
                tokio::task::spawn_local(fut);
            };

            let (connection, io_task) = AgentSideConnection::new(agent, stdout, stdin, spawn_fn);

            let notify_task = tokio::task::spawn_local(async move {
                while let Some(notification) = rx.recv().await {
                    let _ = connection.session_notification(notification).await;
                }
            });

            let _ = io_task.await;
            notify_task.abort();
        })
        .await;

    Ok(())
}
