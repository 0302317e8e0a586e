// Integration tests for the recording lifecycle controller: live feed gating,
// pause/stop semantics, the final snapshot fetch, and the commit path.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use openwalk::{
    recorder::RecorderPhase, DailyTotal, Database, FitnessProvider, PedometerSample,
    RecorderController, RecorderSnapshot,
};
use tempfile::TempDir;
use tokio::sync::{mpsc, Mutex};

struct ScriptedPedometer {
    sender: Mutex<Option<mpsc::Sender<PedometerSample>>>,
    stop_calls: AtomicUsize,
    final_sample: PedometerSample,
}

impl ScriptedPedometer {
    fn new(final_sample: PedometerSample) -> Self {
        Self {
            sender: Mutex::new(None),
            stop_calls: AtomicUsize::new(0),
            final_sample,
        }
    }

    async fn push(&self, sample: PedometerSample) -> Result<()> {
        let guard = self.sender.lock().await;
        let tx = guard.as_ref().ok_or_else(|| anyhow!("feed not started"))?;
        tx.send(sample).await.map_err(|_| anyhow!("feed closed"))
    }

    fn stop_count(&self) -> usize {
        self.stop_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FitnessProvider for ScriptedPedometer {
    async fn start_updates(&self) -> Result<mpsc::Receiver<PedometerSample>> {
        let (tx, rx) = mpsc::channel(16);
        *self.sender.lock().await = Some(tx);
        Ok(rx)
    }

    async fn stop_updates(&self) {
        self.stop_calls.fetch_add(1, Ordering::SeqCst);
        *self.sender.lock().await = None;
    }

    async fn snapshot_at(&self, _instant: DateTime<Utc>) -> Result<PedometerSample> {
        Ok(self.final_sample)
    }

    async fn daily_totals(&self, _from: NaiveDate, _to: NaiveDate) -> Result<Vec<DailyTotal>> {
        Ok(Vec::new())
    }
}

fn sample(steps: u64, distance_meters: f64) -> PedometerSample {
    PedometerSample {
        steps,
        distance_meters,
    }
}

struct Harness {
    _temp: TempDir,
    db: Database,
    provider: Arc<ScriptedPedometer>,
    controller: RecorderController,
}

fn harness(final_sample: PedometerSample) -> Result<Harness> {
    let temp = TempDir::new()?;
    let db = Database::new(temp.path().join("openwalk.sqlite3"))?;
    let provider = Arc::new(ScriptedPedometer::new(final_sample));
    let controller = RecorderController::new(db.clone(), provider.clone());
    Ok(Harness {
        _temp: temp,
        db,
        provider,
        controller,
    })
}

async fn wait_for_snapshot<F>(controller: &RecorderController, mut predicate: F) -> RecorderSnapshot
where
    F: FnMut(&RecorderSnapshot) -> bool,
{
    for _ in 0..200 {
        if let Some(snapshot) = controller.get_snapshot().await {
            if predicate(&snapshot) {
                return snapshot;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("snapshot predicate not satisfied within 2s");
}

#[tokio::test]
async fn live_samples_update_only_while_active() -> Result<()> {
    let h = harness(sample(999, 800.0))?;
    let walk = h.db.start_walk().await?;
    h.controller.begin(&walk).await?;

    h.provider.push(sample(100, 80.0)).await?;
    wait_for_snapshot(&h.controller, |s| s.state.sample == Some(sample(100, 80.0))).await;

    h.controller.pause().await?;
    h.provider.push(sample(200, 160.0)).await?;
    tokio::time::sleep(Duration::from_millis(100)).await;
    let paused = h.controller.get_snapshot().await.unwrap();
    assert_eq!(paused.state.phase, RecorderPhase::Paused);
    assert_eq!(paused.state.sample, Some(sample(100, 80.0)));

    h.controller.resume().await?;
    h.provider.push(sample(300, 240.0)).await?;
    wait_for_snapshot(&h.controller, |s| s.state.sample == Some(sample(300, 240.0))).await;

    h.controller.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn stop_while_paused_freezes_end_at_pause_instant() -> Result<()> {
    let h = harness(sample(999, 800.0))?;
    let walk = h.db.start_walk().await?;
    h.controller.begin(&walk).await?;

    h.controller.pause().await?;
    let paused_at = h
        .controller
        .get_snapshot()
        .await
        .unwrap()
        .state
        .paused_at
        .expect("paused state carries pause timestamp");

    // Let wall time move on before the stop button is pressed.
    tokio::time::sleep(Duration::from_millis(100)).await;
    h.controller.stop().await?;

    let stopped = h.controller.get_snapshot().await.unwrap();
    assert_eq!(stopped.state.phase, RecorderPhase::Stopped);
    assert_eq!(stopped.state.ended_at, Some(paused_at));
    assert_eq!(stopped.state.paused_at, None);

    assert!(h.controller.pause().await.is_err());
    assert!(h.controller.resume().await.is_err());

    h.controller.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn stop_tears_down_feed_and_applies_final_snapshot() -> Result<()> {
    let h = harness(sample(4321, 3500.0))?;
    let walk = h.db.start_walk().await?;
    h.controller.begin(&walk).await?;

    h.provider.push(sample(100, 80.0)).await?;
    wait_for_snapshot(&h.controller, |s| s.state.sample == Some(sample(100, 80.0))).await;

    h.controller.stop().await?;
    assert!(h.provider.stop_count() >= 1);

    // The one-shot fetch replaces the last live reading with the reading as of
    // the end instant.
    wait_for_snapshot(&h.controller, |s| {
        s.state.sample == Some(sample(4321, 3500.0))
    })
    .await;

    h.controller.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn finish_commits_walk_and_releases_the_session() -> Result<()> {
    let h = harness(sample(4321, 3500.0))?;
    let mut active_rx = h.db.watch_active_walk();

    let walk = h.db.start_walk().await?;
    assert!(active_rx.borrow_and_update().is_some());

    h.controller.begin(&walk).await?;
    h.controller.stop().await?;
    wait_for_snapshot(&h.controller, |s| {
        s.state.sample == Some(sample(4321, 3500.0))
    })
    .await;

    let ended_at = h
        .controller
        .get_snapshot()
        .await
        .unwrap()
        .state
        .ended_at
        .unwrap();

    let committed = h.controller.finish().await?;
    assert_eq!(committed.id, walk.id);
    assert_eq!(committed.ended_at, Some(ended_at));
    assert_eq!(committed.steps, Some(4321));
    assert_eq!(committed.distance_meters, Some(3500.0));

    // Session released, in-progress set now empty.
    assert!(h.controller.get_snapshot().await.is_none());
    assert!(active_rx.borrow_and_update().is_none());

    assert!(h.controller.finish().await.is_err());
    Ok(())
}

#[tokio::test]
async fn finish_before_stop_is_rejected() -> Result<()> {
    let h = harness(sample(1, 1.0))?;
    let walk = h.db.start_walk().await?;
    h.controller.begin(&walk).await?;

    assert!(h.controller.finish().await.is_err());
    let snapshot = h.controller.get_snapshot().await.unwrap();
    assert_eq!(snapshot.state.phase, RecorderPhase::Active);

    h.controller.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn failed_commit_leaves_recording_stopped_for_retry() -> Result<()> {
    let h = harness(sample(1, 1.0))?;
    let walk = h.db.start_walk().await?;
    h.controller.begin(&walk).await?;
    h.controller.stop().await?;

    // Pull the record out from under the commit to force a store failure.
    h.db.delete_walk(&walk.id).await?;
    assert!(h.controller.finish().await.is_err());

    let snapshot = h.controller.get_snapshot().await.unwrap();
    assert_eq!(snapshot.state.phase, RecorderPhase::Stopped);

    h.controller.shutdown().await;
    Ok(())
}

#[tokio::test]
async fn only_one_recording_at_a_time() -> Result<()> {
    let h = harness(sample(1, 1.0))?;
    let walk = h.db.start_walk().await?;
    h.controller.begin(&walk).await?;
    assert!(h.controller.begin(&walk).await.is_err());
    h.controller.shutdown().await;
    Ok(())
}
