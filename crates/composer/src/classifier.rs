use crate::config::ChooserConfig;
use share_protocol::TargetIntent;
use std::collections::HashSet;

/// Decides whether the active intent is a "send" that should show direct share.
pub trait SendActionClassifier: Send + Sync {
    fn is_send_action(&self, intent: &TargetIntent) -> bool;
}

impl<F> SendActionClassifier for F
where
    F: Fn(&TargetIntent) -> bool + Send + Sync,
{
    fn is_send_action(&self, intent: &TargetIntent) -> bool {
        self(intent)
    }
}

/// Matches the intent action against a fixed set of action names.
#[derive(Debug, Clone)]
pub struct ActionListClassifier {
    actions: HashSet<String>,
}

impl ActionListClassifier {
    pub fn new<I, S>(actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            actions: actions
                .into_iter()
                .map(Into::into)
                .map(|action: String| action.trim().to_string())
                .filter(|action| !action.is_empty())
                .collect(),
        }
    }

    #[must_use]
    pub fn from_config(config: &ChooserConfig) -> Self {
        Self::new(config.send_actions.iter().cloned())
    }
}

impl SendActionClassifier for ActionListClassifier {
    fn is_send_action(&self, intent: &TargetIntent) -> bool {
        self.actions.contains(intent.action.trim())
    }
}
