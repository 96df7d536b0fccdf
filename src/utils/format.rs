//! Human-readable renderings of the timer state

use crate::state::TimerSnapshot;

/// `MM:SS`, minutes not capped at 59
pub fn format_clock(seconds: u64) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Title line for a window or tab, e.g. `24:59 🍅 Pomodoro Timer`
pub fn window_title(snapshot: &TimerSnapshot) -> String {
    format!(
        "{} {} Pomodoro Timer",
        snapshot.clock_display(),
        snapshot.stage.emoji()
    )
}
