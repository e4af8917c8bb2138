use share_protocol::AppTarget;
use std::cmp::Ordering;
use std::time::{Duration, Instant};

/// One ranking pass over the resolver app set.
#[derive(Debug, Clone)]
pub struct RankingRequest {
    /// Identifies the app set this request was built from; stale results are dropped.
    pub generation: u64,
    pub apps: Vec<AppTarget>,
    pub budget: usize,
}

#[derive(Debug, Clone)]
pub struct RankingOutcome {
    pub generation: u64,
    pub apps: Vec<AppTarget>,
    pub elapsed: Duration,
}

/// Reorders `apps` so its first `k` entries are the top-k by score, sorted
/// descending. The tail is left in unspecified order.
pub fn partial_top_k(apps: &mut [AppTarget], k: usize) {
    let k = k.min(apps.len());
    if k == 0 {
        return;
    }
    if k < apps.len() {
        apps.select_nth_unstable_by(k - 1, by_score_desc);
    }
    apps[..k].sort_by(by_score_desc);
}

fn by_score_desc(a: &AppTarget, b: &AppTarget) -> Ordering {
    rank_key(b).total_cmp(&rank_key(a))
}

/// Unscored (NaN) apps sort last.
fn rank_key(app: &AppTarget) -> f32 {
    if app.score.is_nan() {
        f32::NEG_INFINITY
    } else {
        app.score
    }
}

/// Runs top-k selection off the interactive path.
pub struct BackgroundRanker;

impl BackgroundRanker {
    /// Ranks on the blocking pool. Yields exactly one outcome, or `None` if the
    /// blocking task was cancelled or panicked.
    pub async fn run(request: RankingRequest) -> Option<RankingOutcome> {
        let generation = request.generation;
        let task = tokio::task::spawn_blocking(move || {
            let started = Instant::now();
            let RankingRequest {
                generation,
                mut apps,
                budget,
            } = request;
            partial_top_k(&mut apps, budget);
            RankingOutcome {
                generation,
                apps,
                elapsed: started.elapsed(),
            }
        });

        match task.await {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                log::error!("ranking task for generation {generation} failed: {err}");
                None
            }
        }
    }
}
