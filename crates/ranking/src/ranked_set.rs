use crate::score::ScoreModel;
use crate::signal::ChangeSignal;
use share_protocol::{
    AppTarget, DestinationHandle, ServiceCandidate, ServiceTarget, ShareTarget, SourceType,
};
use std::sync::Arc;

/// Slots reserved for direct share suggestions.
pub const MAX_SERVICE_TARGETS: usize = 8;
/// Per-batch cap for non-shortcut sources.
pub const MAX_CHOOSER_TARGETS_PER_APP: usize = 2;

const SCORE_DECAY: f32 = 0.95;

/// Capacity-bounded, score-ordered list of direct share suggestions.
///
/// Starts out as `capacity` placeholders. Real results overwrite placeholders
/// in place or are inserted ahead of the first lower-scoring entry; anything
/// pushed past capacity becomes unreachable but still counts for dedup.
/// `finalize` purges the remaining placeholders. Results arriving later are
/// still ranked in, unless finalize left nothing but the empty sentinel.
#[derive(Debug)]
pub struct BoundedRankedSet {
    slots: Vec<ShareTarget>,
    /// Entries shifted past capacity, kept until the next `reset`.
    overflow: Vec<ShareTarget>,
    capacity: usize,
    max_shortcut_targets_per_app: usize,
    shortcut_results: usize,
    loading_complete: bool,
    signal: ChangeSignal,
}

impl BoundedRankedSet {
    #[must_use]
    pub fn new(max_shortcut_targets_per_app: usize, signal: ChangeSignal) -> Self {
        Self::with_capacity(MAX_SERVICE_TARGETS, max_shortcut_targets_per_app, signal)
    }

    #[must_use]
    pub fn with_capacity(
        capacity: usize,
        max_shortcut_targets_per_app: usize,
        signal: ChangeSignal,
    ) -> Self {
        let mut set = Self {
            slots: Vec::with_capacity(capacity + 1),
            overflow: Vec::new(),
            capacity,
            max_shortcut_targets_per_app,
            shortcut_results: 0,
            loading_complete: false,
            signal,
        };
        set.fill_placeholders();
        set
    }

    /// Drops every result and reserves `capacity` fresh placeholders.
    pub fn reset(&mut self) {
        log::debug!("resetting ranked set to {} placeholders", self.capacity);
        self.fill_placeholders();
    }

    fn fill_placeholders(&mut self) {
        self.shortcut_results = 0;
        self.loading_complete = false;
        self.overflow.clear();
        self.slots.clear();
        self.slots
            .extend(std::iter::repeat(ShareTarget::Placeholder).take(self.capacity));
    }

    /// Scores one provider batch and inserts it. Returns how many entries landed.
    pub fn add_results(
        &mut self,
        origin: Option<&AppTarget>,
        mut candidates: Vec<ServiceCandidate>,
        source_type: SourceType,
    ) -> usize {
        let received = candidates.len();
        candidates.retain(|candidate| candidate.score.is_finite());
        if candidates.len() < received {
            log::warn!(
                "dropping {} {} candidates with non-finite scores",
                received - candidates.len(),
                source_type.as_str()
            );
        }
        if candidates.is_empty() {
            return 0;
        }

        let base_score = ScoreModel::base_score(origin, source_type);
        candidates.sort_by(|a, b| b.score.total_cmp(&a.score));

        let limit = if source_type.is_shortcut() {
            self.max_shortcut_targets_per_app
        } else {
            MAX_CHOOSER_TARGETS_PER_APP
        };
        candidates.truncate(limit);

        log::debug!(
            "add_results origin={:?} source={} candidates={} base={:.3}",
            origin.map(|app| app.component.as_str()),
            source_type.as_str(),
            candidates.len(),
            base_score
        );

        let mut last_score = 0.0f32;
        let mut inserted = 0usize;
        for (i, candidate) in candidates.into_iter().enumerate() {
            let raw = candidate.score;
            let mut score = raw * base_score;
            if i > 0 && score >= last_score {
                // Decay keeps one source from crowding out the rest.
                score = last_score * SCORE_DECAY;
            }

            let title = candidate.title.clone();
            let target = ShareTarget::Service(Arc::new(ServiceTarget::new(
                origin,
                candidate,
                source_type,
                score,
            )));
            let accepted = self.insert(target);
            log::debug!(
                " => '{}' score={:.4} raw={:.4} last={:.4} inserted={}",
                title,
                score,
                raw,
                last_score,
                accepted
            );
            if accepted {
                inserted += 1;
            }

            last_score = score;
        }

        if inserted > 0 {
            if source_type.is_shortcut() {
                self.shortcut_results += 1;
            }
            self.signal.raise();
        }

        inserted
    }

    /// First-fit placement of one scored target.
    ///
    /// This is not a strict top-K: a full list without placeholders only
    /// accepts targets that beat some entry in the scanned prefix.
    pub fn insert(&mut self, target: ShareTarget) -> bool {
        if self.ended_empty() {
            log::debug!("ignoring late result, loading already completed empty");
            return false;
        }
        if target.is_placeholder() || target.is_empty_sentinel() {
            return false;
        }
        let new_score = target.modified_score();
        if !new_score.is_finite() {
            return false;
        }
        if self
            .slots
            .iter()
            .chain(&self.overflow)
            .any(|existing| target.is_similar(existing))
        {
            return false;
        }

        let scan = self.slots.len().min(self.capacity);
        let position = self.slots[..scan]
            .iter()
            .position(|slot| slot.is_placeholder() || new_score > slot.modified_score());

        match position {
            Some(idx) if self.slots[idx].is_placeholder() => {
                self.slots[idx] = target;
                true
            }
            Some(idx) => {
                self.slots.insert(idx, target);
                if self.slots.len() > self.capacity {
                    let dropped = self.slots.split_off(self.capacity);
                    log::trace!("{} entries pushed past capacity", dropped.len());
                    self.overflow
                        .extend(dropped.into_iter().filter(|slot| !slot.is_placeholder()));
                }
                true
            }
            None if self.slots.len() < self.capacity => {
                self.slots.push(target);
                true
            }
            None => false,
        }
    }

    /// Removes leftover placeholders, leaving the empty sentinel if nothing
    /// real arrived. Safe to call repeatedly.
    pub fn finalize(&mut self) {
        if self.loading_complete {
            return;
        }
        self.slots.retain(|slot| !slot.is_placeholder());
        if self.slots.is_empty() {
            self.slots.push(ShareTarget::Empty);
        }
        self.loading_complete = true;
        log::info!(
            "direct share loading complete: {} selectable targets",
            self.selectable_count()
        );
        self.signal.raise();
    }

    /// Launch payload of the suggestion at `index`, if it is a real result.
    #[must_use]
    pub fn payload_at(&self, index: usize) -> Option<&DestinationHandle> {
        match self.slots.get(index)? {
            ShareTarget::Service(service) => Some(&service.candidate.destination),
            _ => None,
        }
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ShareTarget> {
        self.slots.get(index)
    }

    #[must_use]
    pub fn entries(&self) -> &[ShareTarget] {
        &self.slots
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Real suggestions only; placeholders and the empty sentinel are excluded.
    #[must_use]
    pub fn selectable_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.is_selectable_service())
            .count()
    }

    #[must_use]
    pub fn placeholder_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_placeholder()).count()
    }

    #[must_use]
    pub fn num_shortcut_results(&self) -> usize {
        self.shortcut_results
    }

    #[must_use]
    pub fn is_finalized(&self) -> bool {
        self.loading_complete
    }

    fn ended_empty(&self) -> bool {
        matches!(self.slots.as_slice(), [ShareTarget::Empty])
    }

    #[must_use]
    pub fn signal(&self) -> &ChangeSignal {
        &self.signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn candidate(title: &str, score: f32) -> ServiceCandidate {
        ServiceCandidate::new(
            title,
            score,
            DestinationHandle::new("com.chat/.Share").with_extra("shortcut", title),
        )
    }

    fn scored(title: &str, score: f32) -> ShareTarget {
        ShareTarget::Service(Arc::new(ServiceTarget::new(
            None,
            candidate(title, score),
            SourceType::LegacyService,
            score,
        )))
    }

    fn origin(score: f32) -> AppTarget {
        AppTarget::new("com.chat/.Main", "Chat", score)
    }

    fn titles(set: &BoundedRankedSet) -> Vec<String> {
        set.entries()
            .iter()
            .map(|slot| match slot {
                ShareTarget::Placeholder => "_".to_string(),
                ShareTarget::Empty => "<empty>".to_string(),
                other => other.label().unwrap_or_default().to_string(),
            })
            .collect()
    }

    fn scores(set: &BoundedRankedSet) -> Vec<f32> {
        set.entries()
            .iter()
            .filter(|slot| slot.is_selectable_service())
            .map(ShareTarget::modified_score)
            .collect()
    }

    #[test]
    fn starts_with_placeholders() {
        let set = BoundedRankedSet::new(4, ChangeSignal::new());
        assert_eq!(set.len(), MAX_SERVICE_TARGETS);
        assert_eq!(set.placeholder_count(), MAX_SERVICE_TARGETS);
        assert_eq!(set.selectable_count(), 0);
        assert!(!set.signal().is_pending());
    }

    #[test]
    fn legacy_batch_is_sorted_and_scored_without_decay() {
        let mut set = BoundedRankedSet::new(4, ChangeSignal::new());
        let inserted = set.add_results(
            Some(&origin(2.0)),
            vec![candidate("t1", 0.5), candidate("t2", 0.9)],
            SourceType::LegacyService,
        );

        assert_eq!(inserted, 2);
        assert_eq!(&titles(&set)[..2], &["t2".to_string(), "t1".to_string()]);
        let scores = scores(&set);
        assert!((scores[0] - 1.8).abs() < 1e-6);
        assert!((scores[1] - 1.0).abs() < 1e-6);
        assert_eq!(set.placeholder_count(), MAX_SERVICE_TARGETS - 2);
    }

    #[test]
    fn ties_within_a_batch_decay() {
        let mut set = BoundedRankedSet::new(4, ChangeSignal::new());
        set.add_results(
            Some(&origin(1.0)),
            vec![
                candidate("a", 0.8),
                candidate("b", 0.8),
                candidate("c", 0.8),
                candidate("d", 0.8),
            ],
            SourceType::ShortcutFromManager,
        );

        let scores = scores(&set);
        assert_eq!(scores.len(), 4);
        let first = 0.8 * 90.0;
        assert!((scores[0] - first).abs() < 1e-3);
        assert!((scores[1] - first * 0.95).abs() < 1e-3);
        assert!((scores[2] - first * 0.95 * 0.95).abs() < 1e-3);
        assert!((scores[3] - first * 0.95 * 0.95 * 0.95).abs() < 1e-3);
    }

    #[test]
    fn decay_tracks_last_score_even_when_insert_is_rejected() {
        let mut set = BoundedRankedSet::new(4, ChangeSignal::new());
        set.insert(scored("dup", 5.0));
        // "dup" is rejected, "next" still decays against the rejected score.
        let inserted = set.add_results(
            None,
            vec![
                ServiceCandidate::new("dup", 1.0, DestinationHandle::new("com.chat/.Share")),
                candidate("next", 1.0),
            ],
            SourceType::Caller,
        );
        assert_eq!(inserted, 1);
        let next = set
            .entries()
            .iter()
            .find(|slot| slot.label() == Some("next"))
            .expect("next inserted");
        assert!((next.modified_score() - 900.0 * 0.95).abs() < 1e-3);
    }

    #[test]
    fn non_shortcut_sources_are_capped_at_two() {
        let mut set = BoundedRankedSet::new(6, ChangeSignal::new());
        let inserted = set.add_results(
            Some(&origin(1.0)),
            vec![candidate("a", 0.3), candidate("b", 0.2), candidate("c", 0.9)],
            SourceType::LegacyService,
        );
        assert_eq!(inserted, MAX_CHOOSER_TARGETS_PER_APP);
        assert_eq!(&titles(&set)[..2], &["c".to_string(), "a".to_string()]);
    }

    #[test]
    fn shortcut_sources_use_configured_limit() {
        let mut set = BoundedRankedSet::new(3, ChangeSignal::new());
        let batch: Vec<_> = (0..6)
            .map(|i| candidate(&format!("s{i}"), 0.1 * (i + 1) as f32))
            .collect();
        let inserted = set.add_results(
            Some(&origin(1.0)),
            batch,
            SourceType::ShortcutFromPrediction,
        );
        assert_eq!(inserted, 3);
        assert_eq!(set.num_shortcut_results(), 1);
    }

    #[test]
    fn zero_shortcut_limit_inserts_nothing() {
        let signal = ChangeSignal::new();
        let mut set = BoundedRankedSet::new(0, signal.clone());
        let inserted = set.add_results(
            Some(&origin(1.0)),
            vec![candidate("a", 1.0)],
            SourceType::ShortcutFromManager,
        );
        assert_eq!(inserted, 0);
        assert_eq!(set.num_shortcut_results(), 0);
        assert!(!signal.is_pending());
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let signal = ChangeSignal::new();
        let mut set = BoundedRankedSet::new(4, signal.clone());
        assert_eq!(set.add_results(None, Vec::new(), SourceType::Caller), 0);
        assert!(!signal.is_pending());
        assert_eq!(set.placeholder_count(), MAX_SERVICE_TARGETS);
    }

    #[test]
    fn similar_target_in_later_batch_is_rejected_without_signal() {
        let signal = ChangeSignal::new();
        let mut set = BoundedRankedSet::new(4, signal.clone());
        set.add_results(
            Some(&origin(1.0)),
            vec![candidate("alice", 0.5)],
            SourceType::LegacyService,
        );
        assert!(signal.consume());
        let before = set.entries().to_vec();

        let inserted = set.add_results(
            Some(&origin(1.0)),
            vec![candidate("alice", 0.99)],
            SourceType::LegacyService,
        );

        assert_eq!(inserted, 0);
        assert_eq!(set.entries(), before.as_slice());
        assert!(!signal.is_pending());
    }

    #[test]
    fn higher_scores_shift_lower_ones_right() {
        let mut set = BoundedRankedSet::new(4, ChangeSignal::new());
        assert!(set.insert(scored("low", 1.0)));
        assert!(set.insert(scored("high", 3.0)));
        assert!(set.insert(scored("mid", 2.0)));
        assert_eq!(
            &titles(&set)[..4],
            &["high", "mid", "low", "_"].map(String::from)
        );
        assert_eq!(set.len(), MAX_SERVICE_TARGETS);
    }

    #[test]
    fn full_list_drops_tail_and_rejects_lowest() {
        let mut set = BoundedRankedSet::new(4, ChangeSignal::new());
        for i in 0..MAX_SERVICE_TARGETS {
            assert!(set.insert(scored(&format!("t{i}"), 10.0 - i as f32)));
        }
        assert_eq!(set.placeholder_count(), 0);

        assert!(!set.insert(scored("too_low", 0.5)));
        assert!(set.insert(scored("top", 100.0)));
        assert_eq!(set.len(), MAX_SERVICE_TARGETS);
        assert_eq!(titles(&set)[0], "top");
        assert!(!titles(&set).contains(&"t7".to_string()));
    }

    #[test]
    fn dropped_entries_still_block_similar_inserts() {
        let mut set = BoundedRankedSet::with_capacity(2, 4, ChangeSignal::new());
        assert!(set.insert(scored("a", 1.0)));
        assert!(set.insert(scored("b", 2.0)));
        assert!(set.insert(scored("c", 3.0)));
        assert_eq!(titles(&set), vec!["c", "b"]);
        assert!(!set.insert(scored("a", 2.5)));
        assert_eq!(titles(&set), vec!["c", "b"]);
    }

    #[test]
    fn entry_pushed_out_of_a_full_list_cannot_return() {
        let mut set = BoundedRankedSet::new(4, ChangeSignal::new());
        for i in 0..MAX_SERVICE_TARGETS {
            assert!(set.insert(scored(&format!("t{i}"), 10.0 - i as f32)));
        }
        assert!(set.insert(scored("top", 100.0)));
        assert!(!set.insert(scored("t7", 50.0)));
        assert_eq!(set.len(), MAX_SERVICE_TARGETS);
        assert!(!titles(&set).contains(&"t7".to_string()));

        set.reset();
        assert!(set.insert(scored("t7", 50.0)));
    }

    #[test]
    fn finalize_without_results_leaves_empty_sentinel() {
        let signal = ChangeSignal::new();
        let mut set = BoundedRankedSet::new(4, signal.clone());
        set.finalize();
        assert_eq!(set.entries(), &[ShareTarget::Empty]);
        assert!(signal.is_pending());
        assert!(!set.insert(scored("late", 9.0)));
        assert_eq!(set.entries(), &[ShareTarget::Empty]);
    }

    #[test]
    fn finalize_is_idempotent() {
        let mut set = BoundedRankedSet::new(4, ChangeSignal::new());
        set.insert(scored("a", 1.0));
        set.insert(scored("b", 0.5));
        set.finalize();
        let once = set.entries().to_vec();
        assert!(set.signal().consume());
        set.finalize();
        assert_eq!(set.entries(), once.as_slice());
        assert_eq!(titles(&set), vec!["a", "b"]);
        assert!(!set.signal().is_pending());
    }

    #[test]
    fn late_results_rank_into_a_non_empty_finalized_list() {
        let signal = ChangeSignal::new();
        let mut set = BoundedRankedSet::new(4, signal.clone());
        set.insert(scored("a", 1.0));
        set.finalize();
        assert!(set.is_finalized());
        assert!(signal.consume());

        assert!(set.insert(scored("late", 5.0)));
        assert!(set.insert(scored("later", 0.5)));
        assert_eq!(titles(&set), vec!["late", "a", "later"]);
        assert_eq!(set.placeholder_count(), 0);

        let inserted = set.add_results(
            Some(&origin(1.0)),
            vec![candidate("batch", 0.8)],
            SourceType::LegacyService,
        );
        assert_eq!(inserted, 1);
        assert!(signal.is_pending());
        assert_eq!(titles(&set), vec!["late", "a", "batch", "later"]);
    }

    #[test]
    fn non_finite_scores_are_dropped_from_a_batch() {
        let signal = ChangeSignal::new();
        let mut set = BoundedRankedSet::new(40, signal.clone());
        let batch = (0..40)
            .map(|i| {
                let score = if i % 3 == 0 { f32::NAN } else { i as f32 / 40.0 };
                candidate(&format!("c{i}"), score)
            })
            .collect();
        let inserted = set.add_results(Some(&origin(1.0)), batch, SourceType::ShortcutFromManager);

        assert_eq!(inserted, MAX_SERVICE_TARGETS);
        assert!(scores(&set).iter().all(|score| score.is_finite()));
        assert!(scores(&set).windows(2).all(|pair| pair[0] >= pair[1]));

        let all_bad = vec![candidate("nan", f32::NAN), candidate("inf", f32::INFINITY)];
        assert_eq!(set.add_results(None, all_bad, SourceType::Caller), 0);
        assert!(!set.insert(scored("direct_nan", f32::NAN)));
    }

    #[test]
    fn negative_scores_keep_descending_order() {
        let mut set = BoundedRankedSet::new(4, ChangeSignal::new());
        set.add_results(
            Some(&origin(1.0)),
            vec![candidate("neg", -0.5), candidate("pos", 0.4)],
            SourceType::LegacyService,
        );
        set.add_results(
            Some(&origin(1.0)),
            vec![candidate("more_neg", -2.0)],
            SourceType::LegacyService,
        );
        assert_eq!(&titles(&set)[..3], &["pos", "neg", "more_neg"].map(String::from));
        assert!(scores(&set).windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[test]
    fn reset_restores_placeholders_and_counters() {
        let mut set = BoundedRankedSet::new(4, ChangeSignal::new());
        set.add_results(
            Some(&origin(1.0)),
            vec![candidate("a", 1.0)],
            SourceType::ShortcutFromManager,
        );
        set.finalize();
        set.reset();
        assert!(!set.is_finalized());
        assert_eq!(set.placeholder_count(), MAX_SERVICE_TARGETS);
        assert_eq!(set.num_shortcut_results(), 0);
        assert!(set.insert(scored("a", 1.0)));
    }

    #[test]
    fn payload_only_for_real_results() {
        let mut set = BoundedRankedSet::new(4, ChangeSignal::new());
        set.insert(scored("alice", 1.0));
        let payload = set.payload_at(0).expect("payload");
        assert_eq!(payload.component, "com.chat/.Share");
        assert_eq!(payload.extras.get("shortcut").map(String::as_str), Some("alice"));
        assert!(set.payload_at(1).is_none());
        assert!(set.payload_at(100).is_none());

        set.finalize();
        let mut empty = BoundedRankedSet::new(4, ChangeSignal::new());
        empty.finalize();
        assert!(empty.payload_at(0).is_none());
    }

    #[test]
    fn reservations_cannot_be_inserted() {
        let mut set = BoundedRankedSet::new(4, ChangeSignal::new());
        assert!(!set.insert(ShareTarget::Placeholder));
        assert!(!set.insert(ShareTarget::Empty));
    }
}
