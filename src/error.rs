//! Error types for the timer core and its host

use thiserror::Error;

/// Errors surfaced by the timer boundary.
///
/// The clock and controller themselves have no failure path once a valid
/// configuration is in place; everything here is caught at the edges.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimerError {
    /// A duration or cycle count was zero
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// A stage name outside work / shortBreak / longBreak
    #[error("unknown stage: {0}")]
    InvalidStageTarget(String),

    /// The shared controller could not be locked (a holder panicked)
    #[error("timer state unavailable: {0}")]
    StateUnavailable(String),
}
