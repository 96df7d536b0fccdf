//! Focus Timer - a work / short break / long break cycle timer
//!
//! The core is [`state::StageClock`], a pure countdown state machine, driven
//! by [`state::TimerController`] from a one-second tick source. The binary
//! hosts a single controller behind an HTTP API and announces finished stages
//! with desktop notifications and sounds.

pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::{Config, TimerConfig};
pub use error::TimerError;
pub use state::{AppState, Stage, StageClock, TimerController, TimerSnapshot};
pub use api::create_router;
pub use utils::signals::shutdown_signal;
