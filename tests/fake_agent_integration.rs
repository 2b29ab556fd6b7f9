use regexcraft::application::assistant::PatternAssistant;
use regexcraft::domain::{ErrorCategory, PatternSpecification};
use regexcraft::infra::completion::{
    AcpCompletion, AcpCompletionConfig, ChatMessage, CompletionError, CompletionProvider,
    CompletionRequest,
};
use std::path::PathBuf;
use std::sync::Arc;

fn fake_agent_path() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    let candidates = [
        exe.parent()?.join("examples/fake_acp_agent"),
        exe.parent()?.parent()?.join("examples/fake_acp_agent"),
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("target/debug/examples/fake_acp_agent"),
    ];
    let found = candidates.into_iter().find(|path| path.exists());
    if found.is_none() {
        eprintln!("fake_acp_agent not built; skipping");
    }
    found
}

fn provider(agent: PathBuf, args: &[&str], timeout_secs: u64) -> AcpCompletion {
    AcpCompletion::new(AcpCompletionConfig {
        agent_id: "fake".into(),
        command: agent.to_string_lossy().into_owned(),
        args: args.iter().map(|arg| arg.to_string()).collect(),
        timeout_secs,
        debug: true,
    })
}

fn request() -> CompletionRequest {
    CompletionRequest::new(
        "generate",
        vec![
            ChatMessage::system("You write regexes."),
            ChatMessage::user("numbers"),
        ],
    )
}

#[tokio::test]
async fn test_completion_collects_streamed_chunks() {
    let Some(agent) = fake_agent_path() else {
        return;
    };
    let reply = provider(agent, &["--reply", r"(\d+)|||<$1>"], 10)
        .complete(request())
        .await
        .unwrap();
    assert_eq!(reply, r"(\d+)|||<$1>");
}

#[tokio::test]
async fn test_generation_through_agent() {
    let Some(agent) = fake_agent_path() else {
        return;
    };
    let assistant = PatternAssistant::new(Arc::new(provider(agent, &["--reply", r"\d+|||#"], 10)));

    let outcome = assistant
        .generate(&PatternSpecification::new("numbers"), None)
        .await
        .unwrap();
    assert_eq!(outcome.pair.find, r"\d+");
    assert_eq!(outcome.pair.replace, "#");
    assert_eq!(assistant.provider_id(), "fake");
}

#[tokio::test]
async fn test_slow_agent_times_out() {
    let Some(agent) = fake_agent_path() else {
        return;
    };
    let err = provider(agent, &["--delay-ms", "5000"], 1)
        .complete(request())
        .await
        .unwrap_err();
    assert_eq!(err, CompletionError::TimedOut(1));
}

#[tokio::test]
async fn test_empty_reply_is_a_parse_failure() {
    let Some(agent) = fake_agent_path() else {
        return;
    };
    let assistant = PatternAssistant::new(Arc::new(provider(agent, &["--reply", "  "], 10)));
    let err = assistant
        .generate(&PatternSpecification::new("numbers"), None)
        .await
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::GenerationParse);
}
