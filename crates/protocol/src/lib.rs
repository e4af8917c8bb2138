use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub mod target;

pub use target::{ServiceTarget, ShareTarget, TargetKey};

/// Where a batch of direct share suggestions came from.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SourceType {
    Caller,
    LegacyService,
    ShortcutFromManager,
    ShortcutFromPrediction,
}

impl SourceType {
    #[must_use]
    pub fn is_shortcut(self) -> bool {
        matches!(
            self,
            Self::ShortcutFromManager | Self::ShortcutFromPrediction
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Caller => "caller",
            Self::LegacyService => "legacy_service",
            Self::ShortcutFromManager => "shortcut_from_manager",
            Self::ShortcutFromPrediction => "shortcut_from_prediction",
        }
    }
}

/// One of the four fixed regions of the composed list, in display order.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Section {
    Service,
    Caller,
    Ranked,
    Alphabetical,
}

impl Section {
    pub const ORDER: [Section; 4] = [
        Section::Service,
        Section::Caller,
        Section::Ranked,
        Section::Alphabetical,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::Caller => "caller",
            Self::Ranked => "ranked",
            Self::Alphabetical => "alphabetical",
        }
    }
}

/// The intent the user is sharing; only its action is inspected by the engine.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct TargetIntent {
    pub action: String,
    #[serde(default)]
    pub mime_type: Option<String>,
}

impl TargetIntent {
    pub fn new(action: impl Into<String>) -> Self {
        Self {
            action: action.into(),
            mime_type: None,
        }
    }
}

/// Opaque launch payload handed back to the host when the user picks a target.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
pub struct DestinationHandle {
    pub component: String,
    #[serde(default)]
    pub action: Option<String>,
    #[serde(default)]
    pub extras: BTreeMap<String, String>,
}

impl DestinationHandle {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            action: None,
            extras: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extras.insert(key.into(), value.into());
        self
    }
}

/// A resolved app together with the score the resolver assigned to it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AppTarget {
    pub component: String,
    pub label: String,
    #[serde(default)]
    pub score: f32,
}

impl AppTarget {
    pub fn new(component: impl Into<String>, label: impl Into<String>, score: f32) -> Self {
        Self {
            component: component.into(),
            label: label.into(),
            score,
        }
    }
}

/// An explicit destination supplied by the calling app.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct CallerTarget {
    pub label: String,
    pub destination: DestinationHandle,
}

impl CallerTarget {
    pub fn new(label: impl Into<String>, destination: DestinationHandle) -> Self {
        Self {
            label: label.into(),
            destination,
        }
    }
}

/// A raw suggestion as delivered by a provider, before base scoring.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServiceCandidate {
    pub title: String,
    #[serde(default)]
    pub score: f32,
    pub destination: DestinationHandle,
}

impl ServiceCandidate {
    pub fn new(title: impl Into<String>, score: f32, destination: DestinationHandle) -> Self {
        Self {
            title: title.into(),
            score,
            destination,
        }
    }
}

pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string(value).map_err(Into::into)
}

pub fn serialize_json_pretty<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shortcut_sources_are_classified() {
        assert!(SourceType::ShortcutFromManager.is_shortcut());
        assert!(SourceType::ShortcutFromPrediction.is_shortcut());
        assert!(!SourceType::LegacyService.is_shortcut());
        assert!(!SourceType::Caller.is_shortcut());
    }

    #[test]
    fn source_type_uses_snake_case_on_the_wire() {
        let raw = serialize_json(&SourceType::ShortcutFromPrediction).unwrap();
        assert_eq!(raw, "\"shortcut_from_prediction\"");
        let parsed: SourceType = serde_json::from_str("\"legacy_service\"").unwrap();
        assert_eq!(parsed, SourceType::LegacyService);
    }

    #[test]
    fn candidate_score_defaults_to_zero() {
        let parsed: ServiceCandidate = serde_json::from_str(
            r#"{"title": "Alice", "destination": {"component": "com.chat/.Share"}}"#,
        )
        .unwrap();
        assert_eq!(parsed.score, 0.0);
        assert!(parsed.destination.extras.is_empty());
    }
}
