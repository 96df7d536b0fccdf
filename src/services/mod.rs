//! External side effects module
//!
//! This module contains the collaborators that react to finished stages:
//! desktop notifications and sound playback.

pub mod alerts;

// Re-export main types
pub use alerts::{deliver_finish_alert, AlertSettings, SoundChoice, StageSounds};
