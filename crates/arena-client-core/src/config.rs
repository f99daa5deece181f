use std::collections::BTreeMap;
use std::time::Duration;

use serde::Deserialize;

use crate::model::{LobbyStatus, TicketStatus};

pub const DEFAULT_LOBBY_POLL_INTERVAL_MS: u32 = 2_000;
pub const DEFAULT_CHAT_POLL_INTERVAL_MS: u32 = 2_000;
pub const DEFAULT_TICKET_POLL_INTERVAL_MS: u32 = 3_000;
pub const DEFAULT_ALERT_AUTO_DISMISS_MS: u32 = 5_000;
pub const CONFIG_SCRIPT_ELEMENT_ID: &str = "arena-client-config";
pub const CONFIG_WINDOW_GLOBAL: &str = "__ARENA_CONFIG__";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Parse(String),
    #[error("{field} must be greater than zero")]
    ZeroInterval { field: &'static str },
    #[error("api base must be empty or use http:// or https:// with a host")]
    InvalidApiBase,
}

/// User-facing strings. Templates own localization, so these are only
/// fallbacks the page may override through the config block.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Messages {
    pub generic_error: String,
    pub action_failed: String,
    pub copied: String,
    pub friend_added: String,
    pub confirm_remove_friend: String,
    pub confirm_kick: String,
    pub confirm_ban: String,
    pub invite_unavailable: String,
    pub team_label: String,
    pub creator_badge: String,
    /// Indicator text keyed by wire value (`in_progress`, `open`, ...).
    /// Unlisted values are shown raw.
    pub ticket_status_labels: BTreeMap<String, String>,
    pub lobby_status_labels: BTreeMap<String, String>,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            generic_error: "Server request failed".to_string(),
            action_failed: "Action failed".to_string(),
            copied: "Copied to clipboard".to_string(),
            friend_added: "Friend added".to_string(),
            confirm_remove_friend: "Remove this friend?".to_string(),
            confirm_kick: "Kick this player from the lobby?".to_string(),
            confirm_ban: "Ban this player from the lobby?".to_string(),
            invite_unavailable: "Invite link is unavailable".to_string(),
            team_label: "Team".to_string(),
            creator_badge: "Creator".to_string(),
            ticket_status_labels: labels(&[
                ("open", "Open"),
                ("in_progress", "In progress"),
                ("resolved", "Resolved"),
                ("closed", "Closed"),
            ]),
            lobby_status_labels: labels(&[
                ("open", "Open"),
                ("full", "Full"),
                ("started", "Started"),
                ("finished", "Finished"),
            ]),
        }
    }
}

fn labels(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(value, label)| ((*value).to_string(), (*label).to_string()))
        .collect()
}

impl Messages {
    #[must_use]
    pub fn ticket_status_label(&self, status: &TicketStatus) -> String {
        lookup_label(&self.ticket_status_labels, status.as_str())
    }

    #[must_use]
    pub fn lobby_status_label(&self, status: &LobbyStatus) -> String {
        lookup_label(&self.lobby_status_labels, status.as_str())
    }
}

fn lookup_label(labels: &BTreeMap<String, String>, value: &str) -> String {
    labels
        .get(value)
        .cloned()
        .unwrap_or_else(|| value.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base: String,
    pub lobby_poll_interval_ms: u32,
    pub chat_poll_interval_ms: u32,
    pub ticket_poll_interval_ms: u32,
    pub alert_auto_dismiss_ms: u32,
    pub messages: Messages,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            lobby_poll_interval_ms: DEFAULT_LOBBY_POLL_INTERVAL_MS,
            chat_poll_interval_ms: DEFAULT_CHAT_POLL_INTERVAL_MS,
            ticket_poll_interval_ms: DEFAULT_TICKET_POLL_INTERVAL_MS,
            alert_auto_dismiss_ms: DEFAULT_ALERT_AUTO_DISMISS_MS,
            messages: Messages::default(),
        }
    }
}

impl ClientConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: Self =
            serde_json::from_str(raw).map_err(|error| ConfigError::Parse(error.to_string()))?;
        config.api_base = normalize_api_base(&config.api_base)?;
        config.validate()?;
        Ok(config)
    }

    /// Picks the first source that parses and validates, logging the ones
    /// that do not, and falls back to defaults.
    pub fn resolve<'a>(sources: impl IntoIterator<Item = (&'static str, &'a str)>) -> Self {
        for (source, raw) in sources {
            if raw.trim().is_empty() {
                continue;
            }
            match Self::from_json_str(raw) {
                Ok(config) => {
                    tracing::debug!(source, "loaded client config");
                    return config;
                }
                Err(error) => {
                    tracing::warn!(source, error = %error, "ignoring invalid client config");
                }
            }
        }
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let intervals = [
            ("lobby_poll_interval_ms", self.lobby_poll_interval_ms),
            ("chat_poll_interval_ms", self.chat_poll_interval_ms),
            ("ticket_poll_interval_ms", self.ticket_poll_interval_ms),
            ("alert_auto_dismiss_ms", self.alert_auto_dismiss_ms),
        ];
        for (field, value) in intervals {
            if value == 0 {
                return Err(ConfigError::ZeroInterval { field });
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn lobby_poll_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.lobby_poll_interval_ms))
    }

    #[must_use]
    pub fn chat_poll_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.chat_poll_interval_ms))
    }

    #[must_use]
    pub fn ticket_poll_interval(&self) -> Duration {
        Duration::from_millis(u64::from(self.ticket_poll_interval_ms))
    }
}

/// Empty means same-origin relative paths.
pub fn normalize_api_base(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Ok(String::new());
    }
    let Some((scheme, remainder)) = trimmed.split_once("://") else {
        return Err(ConfigError::InvalidApiBase);
    };
    if !(scheme == "http" || scheme == "https") {
        return Err(ConfigError::InvalidApiBase);
    }
    if remainder.trim().is_empty() || remainder.starts_with('/') {
        return Err(ConfigError::InvalidApiBase);
    }
    Ok(trimmed.to_string())
}
