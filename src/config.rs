//! Configuration and CLI argument handling

use std::path::PathBuf;

use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::{
    error::TimerError,
    services::alerts::{AlertSettings, SoundChoice, StageSounds},
};

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "focus-timer")]
#[command(about = "A work/break cycle timer controlled over HTTP")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "25525")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Work stage length in minutes
    #[arg(short, long, default_value = "25", value_parser = clap::value_parser!(u32).range(1..))]
    pub work: u32,

    /// Short break length in minutes
    #[arg(long, default_value = "5", value_parser = clap::value_parser!(u32).range(1..))]
    pub short_break: u32,

    /// Long break length in minutes
    #[arg(long, default_value = "15", value_parser = clap::value_parser!(u32).range(1..))]
    pub long_break: u32,

    /// Completed work stages before a long break
    #[arg(short, long, default_value = "4", value_parser = clap::value_parser!(u32).range(1..))]
    pub cycles: u32,

    /// Disable desktop notifications when a stage finishes
    #[arg(long)]
    pub no_notifications: bool,

    /// Disable the sound played when a stage finishes
    #[arg(long)]
    pub no_sound: bool,

    /// Sound volume, 0-100
    #[arg(long, default_value = "50", value_parser = clap::value_parser!(u8).range(0..=100))]
    pub volume: u8,

    /// Directory holding the built-in sounds (bell.mp3, chime.mp3, ping.mp3)
    #[arg(long, default_value = "sounds")]
    pub sound_dir: PathBuf,

    /// Sound played when a work stage finishes: bell, chime, ping or a file path
    #[arg(long, default_value = "bell")]
    pub work_sound: SoundChoice,

    /// Sound played when a short break finishes
    #[arg(long, default_value = "chime")]
    pub short_break_sound: SoundChoice,

    /// Sound played when a long break finishes
    #[arg(long, default_value = "ping")]
    pub long_break_sound: SoundChoice,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// Stage durations and cycle count, validated
    pub fn timer_config(&self) -> Result<TimerConfig, TimerError> {
        TimerConfig::new(self.work, self.short_break, self.long_break, self.cycles)
    }

    /// Side-effect settings for the finish alerts task
    pub fn alert_settings(&self) -> AlertSettings {
        AlertSettings {
            notifications: !self.no_notifications,
            sound: !self.no_sound,
            volume: self.volume,
            sound_dir: self.sound_dir.clone(),
            sounds: StageSounds {
                work: self.work_sound.clone(),
                short_break: self.short_break_sound.clone(),
                long_break: self.long_break_sound.clone(),
            },
        }
    }
}

/// Stage durations in minutes and the long-break cadence.
///
/// Field names serialize in camelCase so settings objects produced by a
/// front-end can be sent as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerConfig {
    pub work_duration: u32,
    pub short_break_duration: u32,
    pub long_break_duration: u32,
    pub cycles_before_long_break: u32,
}

impl TimerConfig {
    /// Build a configuration, rejecting zero durations or cycle counts
    pub fn new(
        work_duration: u32,
        short_break_duration: u32,
        long_break_duration: u32,
        cycles_before_long_break: u32,
    ) -> Result<Self, TimerError> {
        let config = Self {
            work_duration,
            short_break_duration,
            long_break_duration,
            cycles_before_long_break,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that every field is positive
    pub fn validate(&self) -> Result<(), TimerError> {
        let fields = [
            ("workDuration", self.work_duration),
            ("shortBreakDuration", self.short_break_duration),
            ("longBreakDuration", self.long_break_duration),
            ("cyclesBeforeLongBreak", self.cycles_before_long_break),
        ];

        match fields.iter().find(|(_, value)| *value == 0) {
            Some((name, _)) => Err(TimerError::InvalidConfiguration(format!(
                "{} must be a positive integer",
                name
            ))),
            None => Ok(()),
        }
    }

    /// Whether any stage length differs from `other`
    pub fn durations_differ(&self, other: &TimerConfig) -> bool {
        (self.work_duration, self.short_break_duration, self.long_break_duration)
            != (other.work_duration, other.short_break_duration, other.long_break_duration)
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            work_duration: 25,
            short_break_duration: 5,
            long_break_duration: 15,
            cycles_before_long_break: 4,
        }
    }
}
