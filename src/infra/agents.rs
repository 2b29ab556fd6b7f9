//! Discovery of ACP agents that can serve as the completion provider.

use crate::infra::app_config::AppConfig;
use crate::infra::completion::AcpCompletionConfig;

/// Id of the built-in offline provider, which never spawns a process.
pub const OFFLINE_AGENT_ID: &str = "offline";

/// A known ACP agent and how to launch it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCandidate {
    /// Unique identifier ("claude", "codex", "gemini", ...)
    pub id: String,
    pub label: String,
    /// Command to execute the agent, `None` for the offline provider.
    pub command: Option<String>,
    pub args: Vec<String>,
    /// Whether the command resolves on PATH
    pub available: bool,
}

fn is_command_available(command: &str) -> bool {
    which::which(command).is_ok()
}

fn candidate(id: &str, label: &str, command: &str, args: &[&str]) -> AgentCandidate {
    AgentCandidate {
        id: id.to_string(),
        label: label.to_string(),
        command: Some(command.to_string()),
        args: args.iter().map(|arg| arg.to_string()).collect(),
        available: is_command_available(command),
    }
}

/// Codex ships as an npm package unless `CODEX_ACP_BIN` points at a binary.
fn codex_candidate() -> AgentCandidate {
    let package = std::env::var("CODEX_ACP_PACKAGE")
        .unwrap_or_else(|_| "@zed-industries/codex-acp@latest".to_string());

    match std::env::var("CODEX_ACP_BIN") {
        Ok(bin_path) => candidate("codex", "Codex (ACP)", &bin_path, &[]),
        Err(_) => candidate("codex", "Codex (ACP)", "npx", &["-y", &package]),
    }
}

/// All known agents with their availability.
pub fn list_agent_candidates() -> Vec<AgentCandidate> {
    vec![
        AgentCandidate {
            id: OFFLINE_AGENT_ID.to_string(),
            label: "Offline (scripted)".to_string(),
            command: None,
            args: Vec::new(),
            available: true,
        },
        candidate("claude", "Claude (ACP)", "claude-code-acp", &[]),
        codex_candidate(),
        candidate("gemini", "Gemini (ACP)", "gemini", &["--experimental-acp"]),
        candidate("qwen", "Qwen Code (ACP)", "qwen", &["--experimental-acp"]),
        candidate("kimi", "Kimi (ACP)", "kimi", &["--acp"]),
        candidate("opencode", "OpenCode (ACP)", "opencode", &["acp"]),
        candidate("mistral", "Mistral Vibe (ACP)", "vibe-acp", &[]),
    ]
}

pub fn find_candidate(id: &str) -> Option<AgentCandidate> {
    list_agent_candidates()
        .into_iter()
        .find(|candidate| candidate.id == id)
}

/// Build the launch configuration for the configured agent.
///
/// `agent_command` in the config overrides the registry entry; an unknown id
/// with no explicit command is an error.
pub fn resolve_agent(config: &AppConfig) -> anyhow::Result<AcpCompletionConfig> {
    let (command, args) = match (&config.agent_command, find_candidate(&config.agent)) {
        (Some(command), _) => (command.clone(), config.agent_args.clone()),
        (None, Some(candidate)) => {
            let Some(command) = candidate.command else {
                anyhow::bail!("agent '{}' does not run as a process", candidate.id);
            };
            let args = if config.agent_args.is_empty() {
                candidate.args
            } else {
                config.agent_args.clone()
            };
            (command, args)
        }
        (None, None) => anyhow::bail!(
            "unknown agent '{}'; set agent_command in the config file",
            config.agent
        ),
    };

    Ok(AcpCompletionConfig {
        agent_id: config.agent.clone(),
        command,
        args,
        timeout_secs: config.timeout_secs,
        debug: config.debug,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lists_known_agents() {
        let candidates = list_agent_candidates();
        assert!(candidates.iter().any(|c| c.id == "claude"));
        assert!(candidates.iter().any(|c| c.id == "gemini"));
        assert!(candidates.iter().any(|c| c.id == OFFLINE_AGENT_ID && c.available));
    }

    #[test]
    fn test_resolve_uses_registry_args() {
        let config = AppConfig {
            agent: "gemini".to_string(),
            ..AppConfig::default()
        };
        let resolved = resolve_agent(&config).expect("gemini is registered");
        assert_eq!(resolved.command, "gemini");
        assert_eq!(resolved.args, vec!["--experimental-acp".to_string()]);
        assert_eq!(resolved.timeout_secs, config.timeout_secs);
    }

    #[test]
    fn test_resolve_prefers_explicit_command() {
        let config = AppConfig {
            agent: "custom".to_string(),
            agent_command: Some("/opt/agent".to_string()),
            agent_args: vec!["--acp".to_string()],
            ..AppConfig::default()
        };
        let resolved = resolve_agent(&config).expect("explicit command");
        assert_eq!(resolved.command, "/opt/agent");
        assert_eq!(resolved.agent_id, "custom");
    }

    #[test]
    fn test_resolve_rejects_unknown_and_offline() {
        let unknown = AppConfig {
            agent: "nobody".to_string(),
            ..AppConfig::default()
        };
        assert!(resolve_agent(&unknown).is_err());

        let offline = AppConfig {
            agent: OFFLINE_AGENT_ID.to_string(),
            ..AppConfig::default()
        };
        assert!(resolve_agent(&offline).is_err());
    }
}
