//! Completion provider backed by an ACP agent process.
//!
//! Each request spawns the agent, opens one session, sends the flattened prompt
//! and returns the agent's streamed message text once the turn ends.

use super::acp_client::CompletionClient;
use super::{CompletionError, CompletionProvider, CompletionRequest};
use agent_client_protocol::{
    Agent, ClientSideConnection, ContentBlock, Implementation, InitializeRequest,
    NewSessionRequest, PromptRequest, ProtocolVersion, TextContent,
};
use anyhow::{Context as _, Result};
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use log::debug;
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::runtime::Builder;
use tokio::task::LocalSet;
use tokio_util::sync::CancellationToken;

const IO_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcpCompletionConfig {
    pub agent_id: String,
    pub command: String,
    pub args: Vec<String>,
    pub timeout_secs: u64,
    pub debug: bool,
}

pub struct AcpCompletion {
    config: AcpCompletionConfig,
}

impl AcpCompletion {
    pub fn new(config: AcpCompletionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AcpCompletionConfig {
        &self.config
    }
}

fn push_log(logs: &Arc<Mutex<Vec<String>>>, message: impl Into<String>, debug_mode: bool) {
    let msg = message.into();
    if debug_mode {
        debug!(target: "completion", "acp: {msg}");
    }
    if let Ok(mut guard) = logs.lock() {
        guard.push(msg);
    }
}

#[async_trait]
impl CompletionProvider for AcpCompletion {
    fn id(&self) -> &str {
        &self.config.agent_id
    }

    async fn complete(&self, request: CompletionRequest) -> Result<String, CompletionError> {
        if request.temperature.is_some() || request.max_tokens.is_some() {
            debug!(
                target: "completion",
                "acp: sampling hints not supported by agents, ignoring (temperature={:?}, max_tokens={:?})",
                request.temperature,
                request.max_tokens
            );
        }

        let prompt = request.flatten();
        let purpose = request.purpose;
        let cancel = request.cancel.clone();
        let config = self.config.clone();

        debug!(
            target: "completion",
            "acp: {purpose} via {} ({} chars)",
            config.agent_id,
            prompt.len()
        );

        let (sender, receiver) = futures::channel::oneshot::channel();

        // ACP futures are !Send, so each request gets its own current-thread runtime.
        thread::spawn(move || {
            let result = match Builder::new_current_thread().enable_all().build() {
                Ok(rt) => {
                    let local = LocalSet::new();
                    local.block_on(&rt, run_with_limits(config, prompt, cancel))
                }
                Err(e) => Err(CompletionError::Failed(format!(
                    "failed to start completion runtime: {e}"
                ))),
            };
            let _ = sender.send(result);
        });

        let text = receiver.await.unwrap_or_else(|_| {
            Err(CompletionError::Failed(
                "ACP worker thread unexpectedly closed".to_string(),
            ))
        })?;

        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(CompletionError::Empty);
        }
        debug!(target: "completion", "acp: {purpose} returned {} chars", trimmed.len());
        Ok(trimmed.to_string())
    }
}

async fn run_with_limits(
    config: AcpCompletionConfig,
    prompt: String,
    cancel: Option<CancellationToken>,
) -> Result<String, CompletionError> {
    let timeout_secs = config.timeout_secs;
    tokio::select! {
        res = tokio::time::timeout(Duration::from_secs(timeout_secs), run_prompt(config, prompt)) => {
            match res {
                Ok(inner) => inner.map_err(CompletionError::from),
                Err(_) => Err(CompletionError::TimedOut(timeout_secs)),
            }
        }
        _ = async {
            if let Some(token) = cancel {
                token.cancelled().await;
            } else {
                std::future::pending::<()>().await;
            }
        } => {
            Err(CompletionError::Cancelled)
        }
    }
}

async fn run_prompt(config: AcpCompletionConfig, prompt: String) -> Result<String> {
    let AcpCompletionConfig {
        agent_id: _,
        command,
        args,
        timeout_secs: _,
        debug,
    } = config;

    let logs = Arc::new(Mutex::new(Vec::new()));
    push_log(&logs, format!("spawn: {} {}", command, args.join(" ")), debug);

    let mut cmd = Command::new(&command);
    cmd.args(&args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    #[cfg(unix)]
    {
        #[allow(unused_imports)]
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let mut child = cmd
        .spawn()
        .with_context(|| format!("Failed to spawn agent: {} {}", command, args.join(" ")))?;

    let stdin = child
        .stdin
        .take()
        .ok_or_else(|| anyhow::anyhow!("Failed to get agent stdin"))?;
    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow::anyhow!("Failed to get agent stdout"))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| anyhow::anyhow!("Failed to get agent stderr"))?;

    let logs_clone = logs.clone();
    tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            push_log(&logs_clone, format!("stderr: {line}"), debug);
        }
    });

    let client = CompletionClient::new();
    let message_capture = client.message.clone();
    let thoughts_capture = client.thoughts.clone();

    use tokio_util::compat::{TokioAsyncReadCompatExt, TokioAsyncWriteCompatExt};
    let spawn_fn = |fut: LocalBoxFuture<'static, ()>| {
        tokio::task::spawn_local(fut);
    };
    let (connection, io_future) =
        ClientSideConnection::new(client, stdin.compat_write(), stdout.compat(), spawn_fn);
    let io_handle = tokio::task::spawn_local(async move {
        let _ = io_future.await;
    });

    let temp_cwd = tempfile::tempdir().context("create temp working directory")?;
    let cwd: PathBuf = temp_cwd.path().to_path_buf();

    let result: Result<()> = async {
        push_log(&logs, "initialize", debug);
        connection
            .initialize(
                InitializeRequest::new(ProtocolVersion::V1)
                    .client_info(Implementation::new("regexcraft", env!("CARGO_PKG_VERSION"))),
            )
            .await
            .map_err(|e| anyhow::anyhow!("ACP initialize failed: {e:?}"))?;

        push_log(&logs, "new_session", debug);
        let session = connection
            .new_session(NewSessionRequest::new(cwd))
            .await
            .map_err(|e| anyhow::anyhow!("ACP new_session failed: {e:?}"))?;

        push_log(&logs, "prompt", debug);
        let response = connection
            .prompt(PromptRequest::new(
                session.session_id,
                vec![ContentBlock::Text(TextContent::new(prompt))],
            ))
            .await;

        if let Err(err) = response {
            if let Ok(Some(status)) = child.try_wait() {
                push_log(&logs, format!("agent exited before prompt completed: {status}"), true);
            }
            return Err(anyhow::anyhow!("ACP prompt failed: {err:?}"));
        }
        push_log(&logs, "prompt ok", debug);
        Ok(())
    }
    .await;

    let _ = child.start_kill();
    let _ = child.wait().await;
    let _ = tokio::time::timeout(IO_DRAIN_TIMEOUT, io_handle).await;
    drop(temp_cwd);

    if let Err(err) = result {
        let collected = logs.lock().map(|guard| guard.clone()).unwrap_or_default();
        let ctx_logs = if collected.is_empty() {
            "ACP invocation produced no stderr or phase logs".to_string()
        } else {
            format!("ACP invocation logs:\n{}", collected.join("\n"))
        };
        return Err(err.context(ctx_logs));
    }

    let thoughts = thoughts_capture
        .lock()
        .map(|guard| guard.len())
        .unwrap_or(0);
    push_log(&logs, format!("agent thoughts: {thoughts} chars"), debug);

    let message = message_capture
        .lock()
        .map(|guard| guard.clone())
        .unwrap_or_default();
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::completion::ChatMessage;

    fn config(command: &str) -> AcpCompletionConfig {
        AcpCompletionConfig {
            agent_id: "missing".to_string(),
            command: command.to_string(),
            args: vec![],
            timeout_secs: 5,
            debug: false,
        }
    }

    #[tokio::test]
    async fn test_missing_agent_binary_is_failure() {
        let provider = AcpCompletion::new(config("regexcraft-definitely-not-an-agent"));
        let result = provider
            .complete(CompletionRequest::new(
                "generate",
                vec![ChatMessage::user("digits")],
            ))
            .await;
        match result {
            Err(CompletionError::Failed(msg)) => assert!(msg.contains("Failed to spawn agent")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pre_cancelled_request_reports_cancelled() {
        let provider = AcpCompletion::new(config("regexcraft-definitely-not-an-agent"));
        let token = CancellationToken::new();
        token.cancel();
        let result = provider
            .complete(CompletionRequest::new("generate", vec![]).cancel_token(Some(token)))
            .await;
        assert!(matches!(
            result,
            Err(CompletionError::Cancelled) | Err(CompletionError::Failed(_))
        ));
    }

    #[test]
    fn test_provider_id_is_agent_id() {
        let provider = AcpCompletion::new(config("x"));
        assert_eq!(provider.id(), "missing");
        assert_eq!(provider.config().timeout_secs, 5);
    }
}
