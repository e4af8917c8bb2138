use crate::{AppTarget, CallerTarget, DestinationHandle, ServiceCandidate, SourceType};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Score reported by reservation and sentinel entries.
pub const NOT_SELECTABLE_SCORE: f32 = -0.1;

/// Identity used to decide whether two targets are the same destination.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Hash)]
pub struct TargetKey {
    pub component: String,
    pub label: String,
}

/// A scored direct share suggestion, wrapped with the batch context it arrived in.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServiceTarget {
    /// Component of the app that produced the suggestion; `None` for caller batches.
    pub origin: Option<String>,
    pub candidate: ServiceCandidate,
    pub source_type: SourceType,
    /// Score after the base multiplier and per-batch decay.
    pub modified_score: f32,
}

impl ServiceTarget {
    pub fn new(
        origin: Option<&AppTarget>,
        candidate: ServiceCandidate,
        source_type: SourceType,
        modified_score: f32,
    ) -> Self {
        Self {
            origin: origin.map(|app| app.component.clone()),
            candidate,
            source_type,
            modified_score,
        }
    }

    #[must_use]
    pub fn key(&self) -> TargetKey {
        TargetKey {
            component: self.candidate.destination.component.clone(),
            label: self.candidate.title.clone(),
        }
    }
}

/// Every entry the composed list can hold.
///
/// Payloads sit behind `Arc` so that snapshots handed to consumers stay cheap
/// while the owner keeps mutating its own copy.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ShareTarget {
    Caller(Arc<CallerTarget>),
    Service(Arc<ServiceTarget>),
    RankedApp(Arc<AppTarget>),
    AlphaApp(Arc<AppTarget>),
    Placeholder,
    Empty,
}

impl ShareTarget {
    #[must_use]
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    #[must_use]
    pub fn is_empty_sentinel(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// True for entries a user can actually pick from the direct share row.
    #[must_use]
    pub fn is_selectable_service(&self) -> bool {
        matches!(self, Self::Service(_))
    }

    #[must_use]
    pub fn identity_key(&self) -> Option<TargetKey> {
        match self {
            Self::Caller(caller) => Some(TargetKey {
                component: caller.destination.component.clone(),
                label: caller.label.clone(),
            }),
            Self::Service(service) => Some(service.key()),
            Self::RankedApp(app) | Self::AlphaApp(app) => Some(TargetKey {
                component: app.component.clone(),
                label: app.label.clone(),
            }),
            Self::Placeholder | Self::Empty => None,
        }
    }

    /// Score used for ordering. Caller targets are never ranked and report zero.
    #[must_use]
    pub fn modified_score(&self) -> f32 {
        match self {
            Self::Service(service) => service.modified_score,
            Self::RankedApp(app) | Self::AlphaApp(app) => app.score,
            Self::Caller(_) => 0.0,
            Self::Placeholder | Self::Empty => NOT_SELECTABLE_SCORE,
        }
    }

    /// Two entries are similar when they are the same kind and share an identity key.
    /// Placeholders and the empty sentinel are never similar to anything.
    #[must_use]
    pub fn is_similar(&self, other: &ShareTarget) -> bool {
        if std::mem::discriminant(self) != std::mem::discriminant(other) {
            return false;
        }
        match (self.identity_key(), other.identity_key()) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }

    #[must_use]
    pub fn destination(&self) -> Option<&DestinationHandle> {
        match self {
            Self::Caller(caller) => Some(&caller.destination),
            Self::Service(service) => Some(&service.candidate.destination),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(&self) -> Option<&str> {
        match self {
            Self::Caller(caller) => Some(&caller.label),
            Self::Service(service) => Some(&service.candidate.title),
            Self::RankedApp(app) | Self::AlphaApp(app) => Some(&app.label),
            Self::Placeholder | Self::Empty => None,
        }
    }
}
