use crate::error::{ComposerError, Result};
use crate::sections::{ChooserSnapshot, SectionComposer};
use crate::top_k::{BackgroundRanker, RankingOutcome, RankingRequest};
use log::{debug, info, warn};
use share_protocol::{AppTarget, CallerTarget, DestinationHandle, ServiceCandidate, SourceType};
use share_ranking::ChangeSignal;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

const COMMAND_BUFFER: usize = 64;

enum EngineCommand {
    AddResults {
        origin: Option<AppTarget>,
        candidates: Vec<ServiceCandidate>,
        source_type: SourceType,
    },
    Finalize,
    SetCallerTargets(Vec<CallerTarget>),
    SetResolvedApps(Vec<AppTarget>),
    RankingComplete(RankingOutcome),
    RankingFailed(u64),
    PackagesChanged,
    Snapshot {
        consume_change: bool,
        reply: oneshot::Sender<ChooserSnapshot>,
    },
    PayloadAt {
        index: usize,
        reply: oneshot::Sender<Option<DestinationHandle>>,
    },
    Shutdown,
}

/// Handle to the task that owns a [`SectionComposer`].
///
/// Every mutation is sent to the owner as a command and applied one at a time
/// in receive order, so producers never touch the list directly. Clones share
/// the same owner. The owner task keeps only a weak sender, so it stops once
/// the last clone is dropped.
#[derive(Clone)]
pub struct ChooserEngine {
    inner: Arc<ChooserEngineInner>,
}

struct ChooserEngineInner {
    command_tx: mpsc::Sender<EngineCommand>,
    signal: ChangeSignal,
}

impl ChooserEngine {
    /// Spawns the owner task. Must be called from within a tokio runtime.
    pub fn start(composer: SectionComposer) -> Self {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let signal = composer.signal();

        spawn_engine_loop(composer, command_rx, command_tx.downgrade());

        Self {
            inner: Arc::new(ChooserEngineInner { command_tx, signal }),
        }
    }

    async fn send(&self, command: EngineCommand) -> Result<()> {
        self.inner
            .command_tx
            .send(command)
            .await
            .map_err(|_| ComposerError::EngineClosed)
    }

    pub async fn add_results(
        &self,
        origin: Option<AppTarget>,
        candidates: Vec<ServiceCandidate>,
        source_type: SourceType,
    ) -> Result<()> {
        self.send(EngineCommand::AddResults {
            origin,
            candidates,
            source_type,
        })
        .await
    }

    pub async fn finalize(&self) -> Result<()> {
        self.send(EngineCommand::Finalize).await
    }

    /// Forces completion of direct share loading once `timeout` elapses.
    pub fn finalize_after(&self, timeout: Duration) -> JoinHandle<()> {
        let engine = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            debug!("direct share watchdog fired after {timeout:?}");
            if engine.finalize().await.is_err() {
                debug!("watchdog fired after engine shutdown");
            }
        })
    }

    pub async fn set_caller_targets(&self, targets: Vec<CallerTarget>) -> Result<()> {
        self.send(EngineCommand::SetCallerTargets(targets)).await
    }

    /// Replaces the resolver app set and starts a background ranking pass.
    pub async fn set_resolved_apps(&self, apps: Vec<AppTarget>) -> Result<()> {
        self.send(EngineCommand::SetResolvedApps(apps)).await
    }

    pub async fn packages_changed(&self) -> Result<()> {
        self.send(EngineCommand::PackagesChanged).await
    }

    /// Current state without consuming the change signal.
    pub async fn snapshot(&self) -> Result<ChooserSnapshot> {
        self.request_snapshot(false).await
    }

    /// Waits for a pending change, consumes it and returns the state that
    /// includes every mutation applied so far.
    pub async fn next_change(&self) -> Result<ChooserSnapshot> {
        self.inner.signal.pending().await;
        self.request_snapshot(true).await
    }

    async fn request_snapshot(&self, consume_change: bool) -> Result<ChooserSnapshot> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineCommand::Snapshot {
            consume_change,
            reply,
        })
        .await?;
        rx.await.map_err(|_| ComposerError::EngineClosed)
    }

    pub async fn payload_at(&self, index: usize) -> Result<Option<DestinationHandle>> {
        let (reply, rx) = oneshot::channel();
        self.send(EngineCommand::PayloadAt { index, reply }).await?;
        rx.await.map_err(|_| ComposerError::EngineClosed)
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.send(EngineCommand::Shutdown).await
    }

    #[must_use]
    pub fn signal(&self) -> ChangeSignal {
        self.inner.signal.clone()
    }
}

fn spawn_engine_loop(
    mut composer: SectionComposer,
    mut command_rx: mpsc::Receiver<EngineCommand>,
    command_tx: mpsc::WeakSender<EngineCommand>,
) {
    tokio::spawn(async move {
        let mut ranking_generation: u64 = 0;
        let mut applied_generation: u64 = 0;

        while let Some(command) = command_rx.recv().await {
            match command {
                EngineCommand::AddResults {
                    origin,
                    candidates,
                    source_type,
                } => {
                    composer.add_service_results(origin.as_ref(), candidates, source_type);
                }
                EngineCommand::Finalize => composer.complete_service_target_loading(),
                EngineCommand::SetCallerTargets(targets) => composer.set_caller_targets(targets),
                EngineCommand::SetResolvedApps(apps) => {
                    ranking_generation += 1;
                    let request = RankingRequest {
                        generation: ranking_generation,
                        apps: apps.clone(),
                        budget: usize::try_from(composer.max_ranked_targets().max(0))
                            .unwrap_or(0),
                    };
                    composer.set_resolved_apps(apps);
                    spawn_ranking(request, command_tx.clone());
                }
                EngineCommand::RankingComplete(outcome) => {
                    if outcome.generation != ranking_generation {
                        warn!(
                            "discarding stale ranking (generation {} != {})",
                            outcome.generation, ranking_generation
                        );
                        continue;
                    }
                    info!(
                        "ranked {} apps in {}ms",
                        outcome.apps.len(),
                        outcome.elapsed.as_millis()
                    );
                    applied_generation = outcome.generation;
                    composer.apply_ranked_order(outcome.apps);
                }
                EngineCommand::RankingFailed(generation) => {
                    if generation == ranking_generation {
                        warn!("ranking generation {generation} failed; keeping resolver order");
                        applied_generation = generation;
                        composer.signal().raise();
                    }
                }
                EngineCommand::PackagesChanged => composer.handle_packages_changed(),
                EngineCommand::Snapshot {
                    consume_change,
                    reply,
                } => {
                    if consume_change {
                        composer.take_change();
                    }
                    let mut snapshot = composer.snapshot();
                    snapshot.ranking_pending = applied_generation != ranking_generation;
                    let _ = reply.send(snapshot);
                }
                EngineCommand::PayloadAt { index, reply } => {
                    let _ = reply.send(composer.payload_at(index).cloned());
                }
                EngineCommand::Shutdown => break,
            }
        }

        debug!("chooser engine stopped");
    });
}

fn spawn_ranking(request: RankingRequest, command_tx: mpsc::WeakSender<EngineCommand>) {
    tokio::spawn(async move {
        let generation = request.generation;
        let command = match BackgroundRanker::run(request).await {
            Some(outcome) => EngineCommand::RankingComplete(outcome),
            None => EngineCommand::RankingFailed(generation),
        };
        let Some(command_tx) = command_tx.upgrade() else {
            return;
        };
        let _ = command_tx.send(command).await;
    });
}
