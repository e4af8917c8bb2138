use crate::error::{ComposerError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const ENV_MAX_SHORTCUTS_PER_APP: &str = "SHARE_CHOOSER_MAX_SHORTCUTS_PER_APP";
pub const ENV_MAX_RANKED_TARGETS: &str = "SHARE_CHOOSER_MAX_RANKED_TARGETS";
pub const ENV_LOW_RAM: &str = "SHARE_CHOOSER_LOW_RAM";

pub const ACTION_SEND: &str = "android.intent.action.SEND";
pub const ACTION_SEND_MULTIPLE: &str = "android.intent.action.SEND_MULTIPLE";

/// Host configuration for the chooser list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChooserConfig {
    /// Per-batch cap for shortcut sources
    pub max_shortcut_targets_per_app: usize,

    /// Budget shared by caller and ranked sections; may be zero or negative
    pub max_ranked_targets: i32,

    /// Low-RAM devices never show the direct share row
    pub low_ram_device: bool,

    /// Intent actions that count as "send" and enable direct share
    pub send_actions: Vec<String>,

    /// Watchdog used to force completion of direct share loading
    pub service_timeout_ms: u64,
}

impl Default for ChooserConfig {
    fn default() -> Self {
        Self {
            max_shortcut_targets_per_app: 4,
            max_ranked_targets: 4,
            low_ram_device: false,
            send_actions: vec![ACTION_SEND.to_string(), ACTION_SEND_MULTIPLE.to_string()],
            service_timeout_ms: 2_000,
        }
    }
}

impl ChooserConfig {
    /// Parse a JSON document, apply environment overrides and validate.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let config: Self = serde_json::from_slice(bytes)?;
        let config = config.with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_json_slice(&bytes)
    }

    /// Defaults plus environment overrides.
    pub fn from_env() -> Result<Self> {
        let config = Self::default().with_env_overrides();
        config.validate()?;
        Ok(config)
    }

    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(value) = parse_override::<usize>(ENV_MAX_SHORTCUTS_PER_APP, &lookup) {
            self.max_shortcut_targets_per_app = value;
        }
        if let Some(value) = parse_override::<i32>(ENV_MAX_RANKED_TARGETS, &lookup) {
            self.max_ranked_targets = value;
        }
        if let Some(raw) = lookup(ENV_LOW_RAM) {
            match parse_flag(&raw) {
                Some(flag) => self.low_ram_device = flag,
                None => log::warn!("ignoring {ENV_LOW_RAM}={raw:?}: expected a boolean"),
            }
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.service_timeout_ms == 0 {
            return Err(ComposerError::invalid_config(
                "service_timeout_ms must be > 0",
            ));
        }

        if let Some(pos) = self.send_actions.iter().position(|a| a.trim().is_empty()) {
            return Err(ComposerError::invalid_config(format!(
                "send_actions[{pos}] must not be empty"
            )));
        }

        Ok(())
    }

    #[must_use]
    pub fn service_timeout(&self) -> Duration {
        Duration::from_millis(self.service_timeout_ms)
    }
}

fn parse_override<T: std::str::FromStr>(
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
) -> Option<T> {
    let raw = lookup(key)?;
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("ignoring {key}={raw:?}: not a valid number");
            None
        }
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    let trimmed = raw.trim();
    if trimmed == "1" || trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed == "0" || trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}
