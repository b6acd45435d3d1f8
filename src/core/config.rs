//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.ragchat/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::history::{ConversationSummary, default_seed};
use crate::core::route::Route;
use crate::generation::http::{DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct RagChatConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub conversations: Vec<ConversationSummary>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub toast_ttl_secs: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

/// How long an error notification stays up unless dismissed.
pub const DEFAULT_TOAST_TTL: Duration = Duration::from_secs(4);

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub toast_ttl: Duration,
    pub conversations: Vec<ConversationSummary>,
    pub initial_route: Route,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.ragchat/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".ragchat").join("config.toml"))
}

/// Load config from `~/.ragchat/config.toml`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `RagChatConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config() -> Result<RagChatConfig, ConfigError> {
    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(RagChatConfig::default());
        }
    };
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<RagChatConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(RagChatConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: RagChatConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# ragchat configuration
# All settings are optional; defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# base_url = "http://127.0.0.1:8000"   # Or set RAGCHAT_BASE_URL env var
# request_timeout_secs = 60
# toast_ttl_secs = 4

# Conversations listed in the sidebar. Replaces the built-in sample list.
# [[conversations]]
# id = "1"
# title = "Onboarding questions"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_base_url` and `cli_conversation` come from CLI flags (None = not given).
pub fn resolve(
    config: &RagChatConfig,
    cli_base_url: Option<&str>,
    cli_conversation: Option<&str>,
) -> ResolvedConfig {
    resolve_with_env(
        config,
        cli_base_url,
        cli_conversation,
        std::env::var("RAGCHAT_BASE_URL").ok(),
    )
}

fn resolve_with_env(
    config: &RagChatConfig,
    cli_base_url: Option<&str>,
    cli_conversation: Option<&str>,
    env_base_url: Option<String>,
) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let base_url = cli_base_url
        .map(|s| s.to_string())
        .or(env_base_url)
        .or_else(|| config.general.base_url.clone())
        .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

    let conversations = if config.conversations.is_empty() {
        default_seed()
    } else {
        config.conversations.clone()
    };

    // `--conversation 3` opens /chat/3; `--conversation ""` opens a new chat.
    // A leading '/' means a full path such as `/chat/3` or `/`.
    let initial_route = match cli_conversation {
        Some("") => Route::new_chat(),
        Some(path) if path.starts_with('/') => Route::parse(path).unwrap_or_else(|| {
            warn!("Unknown route {}, starting at home", path);
            Route::Home
        }),
        Some(id) => Route::chat(id),
        None => Route::Home,
    };

    ResolvedConfig {
        base_url,
        request_timeout: positive_secs(
            "request_timeout_secs",
            config.general.request_timeout_secs,
            DEFAULT_REQUEST_TIMEOUT,
        ),
        toast_ttl: positive_secs(
            "toast_ttl_secs",
            config.general.toast_ttl_secs,
            DEFAULT_TOAST_TTL,
        ),
        conversations,
        initial_route,
    }
}

/// Zero would time out every request (or expire every toast) immediately,
/// so it counts as unset.
fn positive_secs(key: &str, value: Option<u64>, default: Duration) -> Duration {
    match value {
        Some(0) => {
            warn!("{} = 0 is not allowed, using default of {:?}", key, default);
            default
        }
        Some(secs) => Duration::from_secs(secs),
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = RagChatConfig::default();
        assert!(config.conversations.is_empty());
        assert!(config.general.base_url.is_none());
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with_env(&RagChatConfig::default(), None, None, None);
        assert_eq!(resolved.base_url, DEFAULT_BASE_URL);
        assert_eq!(resolved.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(resolved.toast_ttl, DEFAULT_TOAST_TTL);
        assert_eq!(resolved.conversations, default_seed());
        assert_eq!(resolved.initial_route, Route::Home);
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = RagChatConfig {
            general: GeneralConfig {
                base_url: Some("http://rag.internal:9000".to_string()),
                request_timeout_secs: Some(5),
                toast_ttl_secs: Some(10),
            },
            conversations: vec![ConversationSummary::new("a", "Alpha")],
        };
        let resolved = resolve_with_env(&config, None, None, None);
        assert_eq!(resolved.base_url, "http://rag.internal:9000");
        assert_eq!(resolved.request_timeout, Duration::from_secs(5));
        assert_eq!(resolved.toast_ttl, Duration::from_secs(10));
        assert_eq!(resolved.conversations, vec![ConversationSummary::new("a", "Alpha")]);
    }

    #[test]
    fn test_zero_durations_fall_back_to_defaults() {
        let config = RagChatConfig {
            general: GeneralConfig {
                request_timeout_secs: Some(0),
                toast_ttl_secs: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve_with_env(&config, None, None, None);
        assert_eq!(resolved.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(resolved.toast_ttl, DEFAULT_TOAST_TTL);
    }

    #[test]
    fn test_env_beats_config_and_cli_beats_env() {
        let config = RagChatConfig {
            general: GeneralConfig {
                base_url: Some("http://from-config".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let from_env = resolve_with_env(&config, None, None, Some("http://from-env".to_string()));
        assert_eq!(from_env.base_url, "http://from-env");

        let from_cli = resolve_with_env(
            &config,
            Some("http://from-cli"),
            None,
            Some("http://from-env".to_string()),
        );
        assert_eq!(from_cli.base_url, "http://from-cli");
    }

    #[test]
    fn test_cli_conversation_sets_initial_route() {
        let config = RagChatConfig::default();
        assert_eq!(
            resolve_with_env(&config, None, Some("3"), None).initial_route,
            Route::chat("3")
        );
        assert_eq!(
            resolve_with_env(&config, None, Some(""), None).initial_route,
            Route::new_chat()
        );
    }

    #[test]
    fn test_cli_route_path_is_parsed() {
        let config = RagChatConfig::default();
        assert_eq!(
            resolve_with_env(&config, None, Some("/chat/7"), None).initial_route,
            Route::chat("7")
        );
        assert_eq!(
            resolve_with_env(&config, None, Some("/chat"), None).initial_route,
            Route::new_chat()
        );
        assert_eq!(
            resolve_with_env(&config, None, Some("/nowhere/else/x"), None).initial_route,
            Route::Home
        );
    }

    #[test]
    fn test_toml_round_trip() {
        let toml_str = r#"
[general]
base_url = "http://localhost:8000"
request_timeout_secs = 30

[[conversations]]
id = "1"
title = "First"

[[conversations]]
id = "2"
title = "Second"
"#;
        let config: RagChatConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.base_url.as_deref(), Some("http://localhost:8000"));
        assert_eq!(config.general.request_timeout_secs, Some(30));
        assert_eq!(config.general.toast_ttl_secs, None);
        assert_eq!(config.conversations.len(), 2);
        assert_eq!(config.conversations[1], ConversationSummary::new("2", "Second"));
    }

    #[test]
    fn test_sparse_toml_parses() {
        // Only override one thing; everything else stays default
        let toml_str = r#"
[general]
toast_ttl_secs = 8
"#;
        let config: RagChatConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.toast_ttl_secs, Some(8));
        assert!(config.general.base_url.is_none());
        assert!(config.conversations.is_empty());
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let dir = std::env::temp_dir().join(format!("ragchat-config-{}", uuid::Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        fs::write(&path, "[general\nbase_url = ").unwrap();

        let result = load_config_from(&path);
        assert!(matches!(result, Err(ConfigError::Parse(_))));

        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file_generates_commented_default() {
        let dir = std::env::temp_dir().join(format!("ragchat-config-{}", uuid::Uuid::new_v4()));
        let path = dir.join("config.toml");

        let config = load_config_from(&path).unwrap();
        assert!(config.general.base_url.is_none());
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.contains("# base_url"));
        // The generated file is all comments, so it parses back to defaults
        let reparsed = load_config_from(&path).unwrap();
        assert!(reparsed.conversations.is_empty());

        fs::remove_dir_all(&dir).unwrap();
    }
}
