//! Timer state structure and its read-only snapshot

use serde::{Deserialize, Serialize};

use super::Stage;

/// Mutable countdown state, owned by [`StageClock`](super::StageClock)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerState {
    pub stage: Stage,
    pub remaining_seconds: u64,
    pub is_running: bool,
    /// Finished work stages since the last reset
    pub completed_cycles: u32,
}

impl TimerState {
    /// Paused at the start of a work stage lasting `work_seconds`
    pub fn new(work_seconds: u64) -> Self {
        Self {
            stage: Stage::Work,
            remaining_seconds: work_seconds,
            is_running: false,
            completed_cycles: 0,
        }
    }
}

/// Point-in-time view handed to collaborators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerSnapshot {
    pub remaining_seconds: u64,
    pub is_running: bool,
    pub stage: Stage,
    pub completed_cycles: u32,
    /// Percentage of the stage elapsed, in [0, 100]
    pub progress: f64,
    /// Length of the current stage in seconds
    pub total_duration: u64,
}

impl TimerSnapshot {
    /// Remaining time as `MM:SS`
    pub fn clock_display(&self) -> String {
        crate::utils::format_clock(self.remaining_seconds)
    }
}
