//! Background tasks module
//!
//! This module contains the tasks that run alongside the HTTP server: the
//! one-second tick source and the finish-alert dispatcher.

pub mod stage_ticker;
pub mod finish_alerts;

// Re-export main functions
pub use stage_ticker::{stage_ticker_task, TickSchedule, TokioTicker};
pub use finish_alerts::finish_alerts_task;
