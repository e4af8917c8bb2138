use crate::classifier::{ActionListClassifier, SendActionClassifier};
use crate::config::ChooserConfig;
use serde::Serialize;
use share_protocol::{
    AppTarget, CallerTarget, DestinationHandle, Section, ServiceCandidate, ShareTarget,
    SourceType, TargetIntent,
};
use share_ranking::{BoundedRankedSet, ChangeSignal};
use std::cmp::Ordering;
use std::sync::Arc;

/// Caller-supplied targets beyond this are never shown.
pub const MAX_SUGGESTED_APP_TARGETS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SectionCounts {
    pub service: usize,
    pub caller: usize,
    pub ranked: usize,
    pub alphabetical: usize,
}

impl SectionCounts {
    #[must_use]
    pub fn total(&self) -> usize {
        self.service + self.caller + self.ranked + self.alphabetical
    }

    #[must_use]
    pub fn get(&self, section: Section) -> usize {
        match section {
            Section::Service => self.service,
            Section::Caller => self.caller,
            Section::Ranked => self.ranked,
            Section::Alphabetical => self.alphabetical,
        }
    }

    /// Walks the sections in display order and returns the owner of `position`.
    #[must_use]
    pub fn locate(&self, position: usize) -> Option<(Section, usize)> {
        let mut local = position;
        for section in Section::ORDER {
            let count = self.get(section);
            if local < count {
                return Some((section, local));
            }
            local -= count;
        }
        None
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SnapshotEntry {
    pub position: usize,
    pub section: Section,
    pub local_index: usize,
    pub target: ShareTarget,
}

/// Consistent view of the composed list at one point in time.
#[derive(Debug, Clone, Serialize)]
pub struct ChooserSnapshot {
    pub counts: SectionCounts,
    pub entries: Vec<SnapshotEntry>,
    pub service_loading_complete: bool,
    pub shortcut_results: usize,
    /// Set by [`ChooserEngine`](crate::ChooserEngine) while a ranking pass for
    /// the current app set has not been applied yet.
    pub ranking_pending: bool,
}

impl ChooserSnapshot {
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn section(&self, section: Section) -> impl Iterator<Item = &ShareTarget> + '_ {
        self.entries
            .iter()
            .filter(move |entry| entry.section == section)
            .map(|entry| &entry.target)
    }
}

/// One flat list over four sections: direct share, caller, ranked apps and
/// the alphabetical app list.
///
/// Section sizes are derived from the current collections on every query, so
/// the list can be read while providers are still filling it.
pub struct SectionComposer {
    config: ChooserConfig,
    intent: TargetIntent,
    classifier: Arc<dyn SendActionClassifier>,
    service_targets: BoundedRankedSet,
    caller_targets: Vec<Arc<CallerTarget>>,
    /// Resolver order; after a ranking pass its head holds the top-K apps.
    display_list: Vec<Arc<AppTarget>>,
    sorted_list: Vec<Arc<AppTarget>>,
    signal: ChangeSignal,
}

impl SectionComposer {
    #[must_use]
    pub fn new(config: ChooserConfig, intent: TargetIntent) -> Self {
        let classifier = Arc::new(ActionListClassifier::from_config(&config));
        Self::with_classifier(config, intent, classifier)
    }

    #[must_use]
    pub fn with_classifier(
        config: ChooserConfig,
        intent: TargetIntent,
        classifier: Arc<dyn SendActionClassifier>,
    ) -> Self {
        let signal = ChangeSignal::new();
        let service_targets =
            BoundedRankedSet::new(config.max_shortcut_targets_per_app, signal.clone());
        Self {
            config,
            intent,
            classifier,
            service_targets,
            caller_targets: Vec::new(),
            display_list: Vec::new(),
            sorted_list: Vec::new(),
            signal,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ChooserConfig {
        &self.config
    }

    #[must_use]
    pub fn intent(&self) -> &TargetIntent {
        &self.intent
    }

    pub fn set_caller_targets(&mut self, targets: Vec<CallerTarget>) {
        self.caller_targets = targets.into_iter().map(Arc::new).collect();
        self.signal.raise();
    }

    /// Replaces the resolver app set, in resolver order.
    pub fn set_resolved_apps(&mut self, apps: Vec<AppTarget>) {
        self.display_list = apps.into_iter().map(Arc::new).collect();
        self.update_alphabetical_list();
        self.signal.raise();
    }

    /// Applies a background top-K reordering of the resolver app set.
    pub fn apply_ranked_order(&mut self, apps: Vec<AppTarget>) {
        log::debug!("applying ranked order for {} apps", apps.len());
        self.set_resolved_apps(apps);
    }

    fn update_alphabetical_list(&mut self) {
        let mut sorted = self.display_list.clone();
        sorted.sort_by(|a, b| compare_alphabetically(a, b));
        self.sorted_list = sorted;
    }

    /// The available app set changed: drop all direct share results.
    pub fn handle_packages_changed(&mut self) {
        log::debug!("clearing direct share targets on package change");
        self.service_targets.reset();
        self.signal.raise();
    }

    pub fn add_service_results(
        &mut self,
        origin: Option<&AppTarget>,
        candidates: Vec<ServiceCandidate>,
        source_type: SourceType,
    ) -> usize {
        self.service_targets
            .add_results(origin, candidates, source_type)
    }

    /// Marks direct share loading complete; late results are ignored afterwards.
    pub fn complete_service_target_loading(&mut self) {
        self.service_targets.finalize();
    }

    #[must_use]
    pub fn service_targets(&self) -> &BoundedRankedSet {
        &self.service_targets
    }

    #[must_use]
    pub fn num_shortcut_results(&self) -> usize {
        self.service_targets.num_shortcut_results()
    }

    #[must_use]
    pub fn resolved_app_count(&self) -> usize {
        self.display_list.len()
    }

    #[must_use]
    pub fn max_ranked_targets(&self) -> i32 {
        self.config.max_ranked_targets
    }

    fn shows_direct_share(&self) -> bool {
        self.classifier.is_send_action(&self.intent) && !self.config.low_ram_device
    }

    #[must_use]
    pub fn service_count(&self) -> usize {
        if !self.shows_direct_share() {
            return 0;
        }
        self.service_targets
            .len()
            .min(self.service_targets.capacity())
    }

    /// Service entries a user could pick right now (no placeholders, no sentinel).
    #[must_use]
    pub fn selectable_service_count(&self) -> usize {
        self.service_targets.selectable_count()
    }

    #[must_use]
    pub fn caller_count(&self) -> usize {
        self.caller_targets.len().min(MAX_SUGGESTED_APP_TARGETS)
    }

    #[must_use]
    pub fn ranked_count(&self) -> usize {
        let spaces = i64::from(self.config.max_ranked_targets) - self.caller_count() as i64;
        let spaces = usize::try_from(spaces.max(0)).unwrap_or(0);
        spaces.min(self.display_list.len())
    }

    #[must_use]
    pub fn alpha_count(&self) -> usize {
        let apps = self.display_list.len();
        if apps as i64 > i64::from(self.config.max_ranked_targets) {
            apps
        } else {
            0
        }
    }

    #[must_use]
    pub fn counts(&self) -> SectionCounts {
        SectionCounts {
            service: self.service_count(),
            caller: self.caller_count(),
            ranked: self.ranked_count(),
            alphabetical: self.alpha_count(),
        }
    }

    #[must_use]
    pub fn count(&self) -> usize {
        self.counts().total()
    }

    /// Size of the list when every app is shown once ranked and once
    /// alphabetically, counting only selectable direct share entries.
    ///
    /// The raw budget is added, so a negative budget shrinks the total; the
    /// result saturates at zero.
    #[must_use]
    pub fn unfiltered_count(&self) -> usize {
        let apps = self.display_list.len() as i64;
        let budget = i64::from(self.config.max_ranked_targets);
        let mut app_targets = apps;
        if apps > budget {
            app_targets += budget;
        }
        let total = app_targets
            + self.selectable_service_count() as i64
            + self.caller_count() as i64;
        usize::try_from(total.max(0)).unwrap_or(0)
    }

    #[must_use]
    pub fn resolve_position(&self, position: usize) -> Option<(Section, usize)> {
        self.counts().locate(position)
    }

    #[must_use]
    pub fn section_type_of(&self, position: usize) -> Option<Section> {
        self.resolve_position(position).map(|(section, _)| section)
    }

    #[must_use]
    pub fn item_at(&self, position: usize) -> Option<ShareTarget> {
        self.target_for_position(position, true)
    }

    /// Looks up the target at `position`.
    ///
    /// Filtered addressing sizes the direct share section by `service_count`
    /// (placeholders included). Unfiltered addressing only counts selectable
    /// direct share entries and ignores whether direct share is shown.
    #[must_use]
    pub fn target_for_position(&self, position: usize, filtered: bool) -> Option<ShareTarget> {
        let counts = SectionCounts {
            service: if filtered {
                self.service_count()
            } else {
                self.selectable_service_count()
            },
            ..self.counts()
        };
        let (section, local) = counts.locate(position)?;
        self.target_in_section(section, local)
    }

    fn target_in_section(&self, section: Section, local: usize) -> Option<ShareTarget> {
        match section {
            Section::Service => self.service_targets.get(local).cloned(),
            Section::Caller => self
                .caller_targets
                .get(local)
                .map(|caller| ShareTarget::Caller(caller.clone())),
            Section::Ranked => self
                .display_list
                .get(local)
                .map(|app| ShareTarget::RankedApp(app.clone())),
            Section::Alphabetical => self
                .sorted_list
                .get(local)
                .map(|app| ShareTarget::AlphaApp(app.clone())),
        }
    }

    /// Launch payload for the direct share entry at `index`.
    #[must_use]
    pub fn payload_at(&self, index: usize) -> Option<&DestinationHandle> {
        self.service_targets.payload_at(index)
    }

    #[must_use]
    pub fn signal(&self) -> ChangeSignal {
        self.signal.clone()
    }

    /// Consumes the pending change, if any. Returns whether the consumer
    /// should re-read the list.
    pub fn take_change(&self) -> bool {
        self.signal.consume()
    }

    #[must_use]
    pub fn snapshot(&self) -> ChooserSnapshot {
        let counts = self.counts();
        let entries = (0..counts.total())
            .filter_map(|position| {
                let (section, local_index) = counts.locate(position)?;
                let target = self.target_in_section(section, local_index)?;
                Some(SnapshotEntry {
                    position,
                    section,
                    local_index,
                    target,
                })
            })
            .collect();
        ChooserSnapshot {
            counts,
            entries,
            service_loading_complete: self.service_targets.is_finalized(),
            shortcut_results: self.num_shortcut_results(),
            ranking_pending: false,
        }
    }
}

fn compare_alphabetically(a: &AppTarget, b: &AppTarget) -> Ordering {
    a.label
        .to_lowercase()
        .cmp(&b.label.to_lowercase())
        .then_with(|| a.component.cmp(&b.component))
}
