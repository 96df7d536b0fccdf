//! The three phases of a focus cycle

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::TimerError;

/// Current phase of the cycle. Serialized as `work`, `shortBreak`, `longBreak`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Work,
    ShortBreak,
    LongBreak,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Work, Stage::ShortBreak, Stage::LongBreak];

    /// Wire name, matching the serde representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Work => "work",
            Stage::ShortBreak => "shortBreak",
            Stage::LongBreak => "longBreak",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Stage::Work => "🍅",
            Stage::ShortBreak => "☕",
            Stage::LongBreak => "🎉",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = TimerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| TimerError::InvalidStageTarget(s.to_string()))
    }
}
