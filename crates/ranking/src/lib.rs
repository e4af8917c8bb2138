//! # Share Ranking
//!
//! Ranking core for streamed direct share suggestions.
//!
//! ## Pipeline
//!
//! ```text
//! Provider batch (origin, candidates, source type)
//!     │
//!     ├──> ScoreModel
//!     │      └─> base multiplier (caller / prediction / manager / legacy band)
//!     │
//!     ├──> Per-batch sort, cap and decay
//!     │
//!     └──> BoundedRankedSet::insert
//!            ├─> dedup against similar entries
//!            ├─> first-fit placement over placeholders / lower scores
//!            └─> ChangeSignal (coalesced)
//! ```
//!
//! ## Example
//!
//! ```rust
//! use share_protocol::{AppTarget, DestinationHandle, ServiceCandidate, SourceType};
//! use share_ranking::{BoundedRankedSet, ChangeSignal};
//!
//! let mut set = BoundedRankedSet::new(4, ChangeSignal::new());
//! let origin = AppTarget::new("com.chat/.Main", "Chat", 2.0);
//! let inserted = set.add_results(
//!     Some(&origin),
//!     vec![ServiceCandidate::new("Alice", 0.9, DestinationHandle::new("com.chat/.Share"))],
//!     SourceType::LegacyService,
//! );
//! assert_eq!(inserted, 1);
//! assert_eq!(set.selectable_count(), 1);
//! ```

mod ranked_set;
mod score;
mod signal;

pub use ranked_set::{BoundedRankedSet, MAX_CHOOSER_TARGETS_PER_APP, MAX_SERVICE_TARGETS};
pub use score::{ScoreModel, CALLER_TARGET_SCORE_BOOST, SHORTCUT_TARGET_SCORE_BOOST};
pub use signal::ChangeSignal;
