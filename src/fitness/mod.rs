//! Boundary to the device pedometer. The crate never talks to platform health
//! APIs directly; everything goes through [`FitnessProvider`].

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// A point-in-time pedometer reading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PedometerSample {
    pub steps: u64,
    pub distance_meters: f64,
}

/// Step and distance totals for one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub steps: u64,
    pub distance_meters: f64,
}

#[async_trait]
pub trait FitnessProvider: Send + Sync {
    /// Begins push delivery of samples at provider-determined intervals.
    /// Invoked once per active recording; samples arrive on the returned channel.
    async fn start_updates(&self) -> Result<mpsc::Receiver<PedometerSample>>;

    /// Halts delivery. Idempotent.
    async fn stop_updates(&self);

    /// One-shot fetch of the cumulative reading as of the given instant.
    async fn snapshot_at(&self, instant: DateTime<Utc>) -> Result<PedometerSample>;

    /// Per-day totals over an inclusive date range.
    async fn daily_totals(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<DailyTotal>>;
}
