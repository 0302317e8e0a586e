use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::fitness::PedometerSample;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum RecorderPhase {
    Active,
    Paused,
    Stopped,
    Finished,
}

/// In-memory state of one walk recording. Pure data plus transition rules;
/// the controller owns the clock, the feed, and the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecorderState {
    pub phase: RecorderPhase,
    pub walk_id: String,
    pub started_at: DateTime<Utc>,
    /// Total completed pause time in seconds. Only ever grows, and only at resume.
    pub pause_secs: u64,
    pub paused_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub sample: Option<PedometerSample>,
}

impl RecorderState {
    pub fn begin(walk_id: String, started_at: DateTime<Utc>, pause_secs: u64) -> Self {
        Self {
            phase: RecorderPhase::Active,
            walk_id,
            started_at,
            pause_secs,
            paused_at: None,
            ended_at: None,
            sample: None,
        }
    }

    /// Elapsed recording time in seconds, derived on every call rather than
    /// accumulated, so the display cannot drift. The reference instant is the
    /// end time once stopped, the pause time while paused, and `now` otherwise.
    /// Clamped at zero.
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        let reference = self.ended_at.or(self.paused_at).unwrap_or(now);
        let gross = (reference - self.started_at).num_seconds();
        gross.saturating_sub(self.pause_secs as i64).max(0) as u64
    }

    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.phase != RecorderPhase::Active {
            return Err(anyhow!("cannot pause: recording is not active"));
        }
        self.paused_at = Some(now);
        self.phase = RecorderPhase::Paused;
        Ok(())
    }

    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<()> {
        if self.phase != RecorderPhase::Paused {
            return Err(anyhow!("cannot resume: recording is not paused"));
        }
        let paused_at = self
            .paused_at
            .ok_or_else(|| anyhow!("paused recording has no pause timestamp"))?;
        self.pause_secs += (now - paused_at).num_seconds().max(0) as u64;
        self.paused_at = None;
        self.phase = RecorderPhase::Active;
        Ok(())
    }

    /// Ends the recording. Stopping while paused freezes the walk at the pause
    /// instant, not at the button press. Returns the end instant.
    pub fn stop(&mut self, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
        match self.phase {
            RecorderPhase::Active | RecorderPhase::Paused => {}
            _ => return Err(anyhow!("cannot stop: recording already ended")),
        }
        let ended = self.paused_at.take().unwrap_or(now);
        self.ended_at = Some(ended);
        self.phase = RecorderPhase::Stopped;
        Ok(ended)
    }

    pub fn finish(&mut self) -> Result<()> {
        if self.phase != RecorderPhase::Stopped {
            return Err(anyhow!("cannot finish: recording has not been stopped"));
        }
        self.phase = RecorderPhase::Finished;
        Ok(())
    }

    /// Live samples count only while actively recording; anything delivered
    /// while paused or stopped is dropped, not queued.
    pub fn apply_sample(&mut self, sample: PedometerSample) -> bool {
        if self.phase != RecorderPhase::Active {
            return false;
        }
        self.sample = Some(sample);
        true
    }
}
