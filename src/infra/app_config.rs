use crate::application::pattern::{DEFAULT_CONTEXT_RADIUS, DEFAULT_SIZE_LIMIT};
use crate::domain::TargetDialect;
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_AGENT: &str = "claude";
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Built-in agent id (see `regexcraft agents`).
    pub agent: String,
    pub agent_command: Option<String>,
    pub agent_args: Vec<String>,
    pub timeout_secs: u64,
    pub rules_root: Option<PathBuf>,
    pub context_radius: usize,
    pub target_dialect: TargetDialect,
    /// Compiled-program size limit in bytes.
    pub regex_size_limit: usize,
    pub debug: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            agent: DEFAULT_AGENT.to_string(),
            agent_command: None,
            agent_args: Vec::new(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            rules_root: None,
            context_radius: DEFAULT_CONTEXT_RADIUS,
            target_dialect: TargetDialect::default(),
            regex_size_limit: DEFAULT_SIZE_LIMIT,
            debug: false,
        }
    }
}

impl AppConfig {
    /// Rules root by precedence: explicit flag, `REGEXCRAFT_RULES_ROOT`, config, data dir.
    pub fn resolve_rules_root(&self, flag: Option<&Path>) -> PathBuf {
        if let Some(path) = flag {
            return path.to_path_buf();
        }
        if let Ok(path) = std::env::var("REGEXCRAFT_RULES_ROOT")
            && !path.trim().is_empty()
        {
            return PathBuf::from(path);
        }
        if let Some(path) = &self.rules_root {
            return path.clone();
        }
        app_data_dir().join("AllRules")
    }
}

pub fn load_config() -> AppConfig {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> AppConfig {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return AppConfig::default();
    };
    match toml::from_str(&contents) {
        Ok(config) => config,
        Err(err) => {
            warn!("ignoring unreadable config {}: {err}", path.display());
            AppConfig::default()
        }
    }
}

pub fn save_config_to(config: &AppConfig, path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let contents = toml::to_string_pretty(config).map_err(std::io::Error::other)?;
    std::fs::write(path, contents)
}

pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("REGEXCRAFT_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    app_data_dir().join("config.toml")
}

pub fn app_data_dir() -> PathBuf {
    if let Ok(path) = std::env::var("REGEXCRAFT_DATA_HOME") {
        return PathBuf::from(path);
    }

    #[cfg(target_os = "macos")]
    {
        if let Some(home) = home::home_dir() {
            return home
                .join("Library")
                .join("Application Support")
                .join("RegexCraft");
        }
    }

    #[cfg(target_os = "windows")]
    {
        if let Some(appdata) = std::env::var_os("APPDATA") {
            return PathBuf::from(appdata).join("RegexCraft");
        }
    }

    #[cfg(target_os = "linux")]
    {
        if let Some(xdg) = std::env::var_os("XDG_DATA_HOME") {
            return PathBuf::from(xdg).join("regexcraft");
        }
        if let Some(home) = home::home_dir() {
            return home.join(".local").join("share").join("regexcraft");
        }
    }

    std::env::current_dir()
        .unwrap_or_else(|_| PathBuf::from("."))
        .join(".regexcraft")
}
