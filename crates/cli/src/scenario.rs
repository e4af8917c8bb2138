use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use serde::Deserialize;
use share_composer::{ChooserConfig, ChooserEngine, ChooserSnapshot, SectionComposer};
use share_protocol::{AppTarget, CallerTarget, ServiceCandidate, SourceType, TargetIntent};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tokio::task::JoinSet;

/// A recorded chooser session: what the resolver found and what each direct
/// share provider answered, replayed against a live [`ChooserEngine`].
#[derive(Debug, Deserialize)]
pub struct Scenario {
    /// Used when no `--config` file is given.
    #[serde(default)]
    pub config: Option<ChooserConfig>,
    pub intent: TargetIntent,
    #[serde(default)]
    pub callers: Vec<CallerTarget>,
    #[serde(default)]
    pub apps: Vec<AppTarget>,
    #[serde(default)]
    pub providers: Vec<ProviderBatch>,
    /// Finalize as soon as every provider answered; otherwise only the
    /// service timeout completes loading.
    #[serde(default = "default_finalize")]
    pub finalize: bool,
}

/// One batch of direct share suggestions.
#[derive(Debug, Deserialize)]
pub struct ProviderBatch {
    /// Component of the resolved app that produced the batch. Absent for
    /// caller-supplied suggestions.
    #[serde(default)]
    pub origin: Option<String>,
    pub source_type: SourceType,
    #[serde(default)]
    pub delay_ms: u64,
    pub targets: Vec<ServiceCandidate>,
}

fn default_finalize() -> bool {
    true
}

impl Scenario {
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = fs::read(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("Invalid scenario {}", path.display()))
    }

    fn origin_for(&self, batch: &ProviderBatch) -> Result<Option<AppTarget>> {
        let Some(component) = &batch.origin else {
            return Ok(None);
        };
        self.apps
            .iter()
            .find(|app| &app.component == component)
            .cloned()
            .map(Some)
            .ok_or_else(|| anyhow!("provider origin {component} is not a resolved app"))
    }

    /// Drives the engine through the whole session and returns the settled
    /// list: loading complete and the latest ranking applied.
    pub async fn run(self, config: ChooserConfig) -> Result<ChooserSnapshot> {
        let origins = self
            .providers
            .iter()
            .map(|batch| self.origin_for(batch))
            .collect::<Result<Vec<_>>>()?;

        let timeout = config.service_timeout();
        let engine = ChooserEngine::start(SectionComposer::new(config, self.intent));
        engine.set_caller_targets(self.callers).await?;
        engine.set_resolved_apps(self.apps).await?;
        let watchdog = engine.finalize_after(timeout);

        let mut producers = JoinSet::new();
        for (batch, origin) in self.providers.into_iter().zip(origins) {
            let engine = engine.clone();
            producers.spawn(async move {
                if batch.delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(batch.delay_ms)).await;
                }
                debug!(
                    "provider {} answered with {} targets",
                    batch.origin.as_deref().unwrap_or("<caller>"),
                    batch.targets.len()
                );
                engine
                    .add_results(origin, batch.targets, batch.source_type)
                    .await
            });
        }
        while let Some(joined) = producers.join_next().await {
            joined.context("provider task failed")??;
        }

        if self.finalize {
            engine.finalize().await?;
            watchdog.abort();
        } else {
            watchdog.await.context("watchdog task failed")?;
        }

        let mut snapshot = engine.snapshot().await?;
        while snapshot.ranking_pending {
            snapshot = engine.next_change().await?;
        }
        info!(
            "composed {} targets ({} direct share)",
            snapshot.len(),
            snapshot.counts.service
        );
        engine.shutdown().await?;
        Ok(snapshot)
    }
}
