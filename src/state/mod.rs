//! State management module
//!
//! This module contains the stage clock, the controller that drives it, and
//! the shared application state wrapping the single controller instance.

pub mod stage;
pub mod timer_state;
pub mod stage_clock;
pub mod controller;
pub mod app_state;

// Re-export main types
pub use stage::Stage;
pub use timer_state::{TimerSnapshot, TimerState};
pub use stage_clock::{duration_of, Rollover, StageClock, TickOutcome};
pub use controller::{FinishCallback, FinishEvent, Ticker, TimerController};
pub use app_state::AppState;
