use std::{sync::Arc, time::Duration};

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use log::{info, warn};
use serde::Serialize;
use tokio::{
    sync::{watch, Mutex},
    task::JoinHandle,
    time,
};
use tokio_util::sync::CancellationToken;

use crate::{
    db::{models::Walk, Database},
    fitness::FitnessProvider,
};

use super::state::{RecorderPhase, RecorderState};

#[derive(Debug, Serialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct RecorderSnapshot {
    pub state: RecorderState,
    pub elapsed_secs: u64,
    /// Elapsed time as `MM:SS`, ready for display.
    pub elapsed: String,
}

struct FeedHandle {
    handle: JoinHandle<()>,
    cancel: CancellationToken,
}

/// Drives one walk recording: consumes the pedometer feed while active,
/// republishes a display snapshot on every tick, and commits the walk to the
/// store when the user confirms.
///
/// Everything funnels through one mutex-guarded [`RecorderState`], so a sample
/// delivery always sees the lifecycle state at delivery time. Transitions are
/// gated by phase; once stopped, pause and resume are rejected.
#[derive(Clone)]
pub struct RecorderController {
    state: Arc<Mutex<Option<RecorderState>>>,
    db: Database,
    provider: Arc<dyn FitnessProvider>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    feed: Arc<Mutex<Option<FeedHandle>>>,
    snapshot_tx: Arc<watch::Sender<Option<RecorderSnapshot>>>,
    tick_interval: Duration,
}

impl RecorderController {
    pub fn new(db: Database, provider: Arc<dyn FitnessProvider>) -> Self {
        let (snapshot_tx, _snapshot_rx) = watch::channel(None);
        Self {
            state: Arc::new(Mutex::new(None)),
            db,
            provider,
            ticker: Arc::new(Mutex::new(None)),
            feed: Arc::new(Mutex::new(None)),
            snapshot_tx: Arc::new(snapshot_tx),
            tick_interval: Duration::from_millis(500),
        }
    }

    /// Display snapshots, refreshed on every tick and on every transition.
    /// `None` means no recording is in progress.
    pub fn subscribe(&self) -> watch::Receiver<Option<RecorderSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    pub async fn get_snapshot(&self) -> Option<RecorderSnapshot> {
        let guard = self.state.lock().await;
        guard.as_ref().map(|state| make_snapshot(state, Utc::now()))
    }

    /// Takes over an active walk record and starts recording against it:
    /// subscribes to the pedometer feed and spawns the display ticker.
    pub async fn begin(&self, walk: &Walk) -> Result<()> {
        {
            let mut guard = self.state.lock().await;
            if guard.is_some() {
                return Err(anyhow!("a recording is already in progress"));
            }
            *guard = Some(RecorderState::begin(
                walk.id.clone(),
                walk.started_at,
                walk.pause_secs,
            ));
        }

        if let Err(err) = self.spawn_feed().await {
            // Roll back so a later begin() can succeed.
            *self.state.lock().await = None;
            return Err(err);
        }
        self.spawn_ticker().await;

        self.publish().await;
        info!("Recording started for walk {}", walk.id);
        Ok(())
    }

    pub async fn pause(&self) -> Result<()> {
        {
            let mut guard = self.state.lock().await;
            let state = guard
                .as_mut()
                .ok_or_else(|| anyhow!("no recording in progress"))?;
            state.pause(Utc::now())?;
        }
        self.publish().await;
        Ok(())
    }

    pub async fn resume(&self) -> Result<()> {
        {
            let mut guard = self.state.lock().await;
            let state = guard
                .as_mut()
                .ok_or_else(|| anyhow!("no recording in progress"))?;
            state.resume(Utc::now())?;
        }
        self.publish().await;
        Ok(())
    }

    /// Ends the recording: fixes the end instant, tears down the live feed,
    /// and requests one final pedometer reading as of the end instant. The
    /// fetch is fire-and-forget; its result is applied only if the recording
    /// is still sitting in the stopped phase for the same end instant.
    pub async fn stop(&self) -> Result<()> {
        let ended = {
            let mut guard = self.state.lock().await;
            let state = guard
                .as_mut()
                .ok_or_else(|| anyhow!("no recording in progress"))?;
            state.stop(Utc::now())?
        };

        self.cancel_feed().await;
        self.provider.stop_updates().await;
        self.publish().await;

        let provider = self.provider.clone();
        let state = self.state.clone();
        let snapshot_tx = self.snapshot_tx.clone();
        tokio::spawn(async move {
            match provider.snapshot_at(ended).await {
                Ok(sample) => {
                    let mut guard = state.lock().await;
                    if let Some(current) = guard.as_mut() {
                        if current.phase == RecorderPhase::Stopped
                            && current.ended_at == Some(ended)
                        {
                            current.sample = Some(sample);
                            snapshot_tx.send_replace(Some(make_snapshot(current, Utc::now())));
                        }
                    }
                }
                Err(err) => warn!("Final pedometer snapshot failed: {err:#}"),
            }
        });

        Ok(())
    }

    /// Commits the stopped walk as one record. On a store failure the
    /// recording stays in the stopped phase so the caller can surface the
    /// error and retry.
    pub async fn finish(&self) -> Result<Walk> {
        let committed = {
            let guard = self.state.lock().await;
            let state = guard
                .as_ref()
                .ok_or_else(|| anyhow!("no recording in progress"))?;
            if state.phase != RecorderPhase::Stopped {
                return Err(anyhow!("cannot finish: recording has not been stopped"));
            }
            state.clone()
        };

        let ended_at = committed
            .ended_at
            .ok_or_else(|| anyhow!("stopped recording has no end timestamp"))?;

        let walk = self
            .db
            .finish_walk(
                &committed.walk_id,
                ended_at,
                committed.pause_secs,
                committed.sample,
            )
            .await?;

        {
            let mut guard = self.state.lock().await;
            if let Some(state) = guard.as_mut() {
                state.finish()?;
                self.snapshot_tx
                    .send_replace(Some(make_snapshot(state, Utc::now())));
            }
            *guard = None;
        }
        self.cancel_ticker().await;

        info!("Walk {} committed", walk.id);
        Ok(walk)
    }

    /// Deterministic teardown for navigation-away, whatever phase was reached:
    /// the ticker and the feed subscription are both scoped to the recording
    /// view and must not outlive it. An uncommitted recording is discarded.
    pub async fn shutdown(&self) {
        self.cancel_ticker().await;
        self.cancel_feed().await;
        self.provider.stop_updates().await;
        *self.state.lock().await = None;
        self.snapshot_tx.send_replace(None);
    }

    async fn spawn_feed(&self) -> Result<()> {
        let mut feed_guard = self.feed.lock().await;
        if feed_guard.is_some() {
            return Err(anyhow!("pedometer feed already running"));
        }

        let mut rx = self.provider.start_updates().await?;
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let state = self.state.clone();
        let snapshot_tx = self.snapshot_tx.clone();

        let handle = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    delivery = rx.recv() => match delivery {
                        Some(sample) => {
                            let mut guard = state.lock().await;
                            if let Some(current) = guard.as_mut() {
                                if current.apply_sample(sample) {
                                    snapshot_tx
                                        .send_replace(Some(make_snapshot(current, Utc::now())));
                                }
                            }
                        }
                        None => break,
                    },
                }
            }
        });

        *feed_guard = Some(FeedHandle { handle, cancel });
        Ok(())
    }

    async fn cancel_feed(&self) {
        let feed = self.feed.lock().await.take();
        if let Some(feed) = feed {
            feed.cancel.cancel();
            if let Err(err) = feed.handle.await {
                warn!("Pedometer feed task failed to join: {err}");
            }
        }
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let snapshot_tx = self.snapshot_tx.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            loop {
                interval.tick().await;
                let guard = state.lock().await;
                match guard.as_ref() {
                    Some(current) => {
                        snapshot_tx.send_replace(Some(make_snapshot(current, Utc::now())));
                    }
                    None => break,
                }
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    async fn publish(&self) {
        let guard = self.state.lock().await;
        let snapshot = guard.as_ref().map(|state| make_snapshot(state, Utc::now()));
        self.snapshot_tx.send_replace(snapshot);
    }
}

fn make_snapshot(state: &RecorderState, now: DateTime<Utc>) -> RecorderSnapshot {
    let elapsed_secs = state.elapsed_secs(now);
    RecorderSnapshot {
        elapsed_secs,
        elapsed: crate::format::format_elapsed(elapsed_secs),
        state: state.clone(),
    }
}
