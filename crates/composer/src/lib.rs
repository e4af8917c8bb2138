//! # Share Composer
//!
//! Builds the chooser's flat target list out of four independently arriving
//! sources and keeps it addressable while it is still being filled.
//!
//! ## Sections
//!
//! ```text
//! position 0 ─┬─ service       direct share suggestions (BoundedRankedSet, ≤ 8)
//!             ├─ caller        caller-supplied targets (≤ 4)
//!             ├─ ranked        top of the resolver app set (budget - callers)
//!             └─ alphabetical  whole app set A-Z, only when it exceeds the budget
//! ```
//!
//! ## Ownership
//!
//! [`ChooserEngine`] owns the [`SectionComposer`] on a single tokio task.
//! Providers, the background ranker and the watchdog hand their updates to it
//! as commands; consumers read snapshots and wait on the coalesced change
//! signal.
//!
//! ## Example
//!
//! ```no_run
//! use share_composer::{ChooserConfig, ChooserEngine, SectionComposer};
//! use share_protocol::{AppTarget, TargetIntent};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ChooserConfig::from_env()?;
//!     let timeout = config.service_timeout();
//!     let composer = SectionComposer::new(config, TargetIntent::new("android.intent.action.SEND"));
//!     let engine = ChooserEngine::start(composer);
//!
//!     engine
//!         .set_resolved_apps(vec![AppTarget::new("com.chat/.Main", "Chat", 0.8)])
//!         .await?;
//!     engine.finalize_after(timeout);
//!
//!     let snapshot = engine.next_change().await?;
//!     println!("{} targets", snapshot.len());
//!     Ok(())
//! }
//! ```

mod classifier;
mod config;
mod engine;
mod error;
mod sections;
mod top_k;

pub use classifier::{ActionListClassifier, SendActionClassifier};
pub use config::{
    ChooserConfig, ACTION_SEND, ACTION_SEND_MULTIPLE, ENV_LOW_RAM, ENV_MAX_RANKED_TARGETS,
    ENV_MAX_SHORTCUTS_PER_APP,
};
pub use engine::ChooserEngine;
pub use error::{ComposerError, Result};
pub use sections::{
    ChooserSnapshot, SectionComposer, SectionCounts, SnapshotEntry, MAX_SUGGESTED_APP_TARGETS,
};
pub use top_k::{partial_top_k, BackgroundRanker, RankingOutcome, RankingRequest};
