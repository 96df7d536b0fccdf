//! Pure stage/countdown state machine
//!
//! `StageClock` knows nothing about time sources or callbacks. It only applies
//! transitions to a [`TimerState`] and reports what a tick did.

use tracing::debug;

use super::{Stage, TimerSnapshot, TimerState};
use crate::config::TimerConfig;

/// Seconds in the given stage under `config`
pub fn duration_of(stage: Stage, config: &TimerConfig) -> u64 {
    let minutes = match stage {
        Stage::Work => config.work_duration,
        Stage::ShortBreak => config.short_break_duration,
        Stage::LongBreak => config.long_break_duration,
    };
    u64::from(minutes) * 60
}

/// Proof that a stage just ran out.
///
/// Only a finishing tick produces one, and the clock only leaves a finished
/// stage by consuming it in [`StageClock::roll_over`]. Whoever holds it can
/// still observe the completed stage before the rollover happens.
#[must_use = "a finished stage must be rolled over"]
#[derive(Debug, PartialEq, Eq)]
pub struct Rollover {
    completed: Stage,
}

impl Rollover {
    pub fn completed_stage(&self) -> Stage {
        self.completed
    }
}

/// Result of a single tick
#[derive(Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Clock was paused or already at zero; nothing changed
    Ignored,
    /// Countdown moved one second
    Counting { remaining_seconds: u64 },
    /// Countdown reached zero and the clock is now paused
    Finished(Rollover),
}

#[derive(Debug, Clone)]
pub struct StageClock {
    config: TimerConfig,
    state: TimerState,
    /// Length of the current stage, fixed when the stage was entered
    stage_total: u64,
}

impl StageClock {
    /// Paused at the start of a work stage. `config` must already be validated.
    pub fn new(config: TimerConfig) -> Self {
        let work = duration_of(Stage::Work, &config);
        Self {
            config,
            state: TimerState::new(work),
            stage_total: work,
        }
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    pub fn state(&self) -> &TimerState {
        &self.state
    }

    pub fn stage(&self) -> Stage {
        self.state.stage
    }

    pub fn remaining_seconds(&self) -> u64 {
        self.state.remaining_seconds
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running
    }

    pub fn completed_cycles(&self) -> u32 {
        self.state.completed_cycles
    }

    pub fn total_duration(&self) -> u64 {
        self.stage_total
    }

    /// Mark the clock running. Returns false if there is nothing left to count.
    pub fn start(&mut self) -> bool {
        if self.state.remaining_seconds == 0 {
            return false;
        }
        self.state.is_running = true;
        true
    }

    pub fn pause(&mut self) {
        self.state.is_running = false;
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.state.is_running || self.state.remaining_seconds == 0 {
            return TickOutcome::Ignored;
        }

        self.state.remaining_seconds -= 1;
        if self.state.remaining_seconds > 0 {
            return TickOutcome::Counting {
                remaining_seconds: self.state.remaining_seconds,
            };
        }

        self.state.is_running = false;
        TickOutcome::Finished(Rollover {
            completed: self.state.stage,
        })
    }

    /// Leave a finished stage. Returns the stage now current.
    pub fn roll_over(&mut self, rollover: Rollover) -> Stage {
        debug_assert_eq!(rollover.completed, self.state.stage);
        self.advance_stage()
    }

    /// Move to the next stage of the cycle, counting finished work stages
    pub fn advance_stage(&mut self) -> Stage {
        let next = match self.state.stage {
            Stage::Work => {
                self.state.completed_cycles += 1;
                if self.state.completed_cycles % self.config.cycles_before_long_break == 0 {
                    Stage::LongBreak
                } else {
                    Stage::ShortBreak
                }
            }
            Stage::ShortBreak | Stage::LongBreak => Stage::Work,
        };

        debug!(
            "Stage {} -> {} (completed cycles: {})",
            self.state.stage, next, self.state.completed_cycles
        );
        self.enter(next);
        next
    }

    pub fn reset_to_work(&mut self) {
        self.state.completed_cycles = 0;
        self.state.is_running = false;
        self.enter(Stage::Work);
    }

    /// Jump to `stage` paused. Not a completion, so cycles are untouched.
    pub fn skip_to(&mut self, stage: Stage) {
        self.state.is_running = false;
        self.enter(stage);
    }

    /// Adopt a new configuration.
    ///
    /// A paused clock restarts the current stage at its new length when a stage
    /// length changed; a cadence-only change leaves the countdown alone. A
    /// running countdown keeps going and the new lengths apply from the next
    /// stage entry.
    pub fn reconfigure(&mut self, config: TimerConfig) {
        let resync = !self.state.is_running && config.durations_differ(&self.config);
        self.config = config;
        if resync {
            self.enter(self.state.stage);
        }
    }

    pub fn progress(&self) -> f64 {
        if self.stage_total == 0 {
            return 0.0;
        }
        let elapsed = self.stage_total.saturating_sub(self.state.remaining_seconds);
        elapsed as f64 / self.stage_total as f64 * 100.0
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        TimerSnapshot {
            remaining_seconds: self.state.remaining_seconds,
            is_running: self.state.is_running,
            stage: self.state.stage,
            completed_cycles: self.state.completed_cycles,
            progress: self.progress(),
            total_duration: self.stage_total,
        }
    }

    fn enter(&mut self, stage: Stage) {
        let total = duration_of(stage, &self.config);
        self.state.stage = stage;
        self.state.remaining_seconds = total;
        self.stage_total = total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(work: u32, short: u32, long: u32, cycles: u32) -> StageClock {
        StageClock::new(TimerConfig::new(work, short, long, cycles).unwrap())
    }

    /// Run the current stage down to zero and roll over, returning the finished stage
    fn finish_stage(clock: &mut StageClock) -> Stage {
        assert!(clock.start());
        loop {
            match clock.tick() {
                TickOutcome::Counting { .. } => continue,
                TickOutcome::Finished(rollover) => {
                    let done = rollover.completed_stage();
                    clock.roll_over(rollover);
                    return done;
                }
                TickOutcome::Ignored => panic!("tick ignored while running"),
            }
        }
    }

    #[test]
    fn test_initial_state() {
        let clock = clock(25, 5, 15, 4);
        assert_eq!(clock.stage(), Stage::Work);
        assert_eq!(clock.remaining_seconds(), 1500);
        assert!(!clock.is_running());
        assert_eq!(clock.completed_cycles(), 0);
        assert_eq!(clock.progress(), 0.0);
    }

    #[test]
    fn test_duration_of_each_stage() {
        let config = TimerConfig::new(25, 5, 15, 4).unwrap();
        assert_eq!(duration_of(Stage::Work, &config), 1500);
        assert_eq!(duration_of(Stage::ShortBreak, &config), 300);
        assert_eq!(duration_of(Stage::LongBreak, &config), 900);
    }

    #[test]
    fn test_ticks_decrement_while_running() {
        let mut clock = clock(25, 5, 15, 4);
        clock.start();
        for _ in 0..100 {
            assert!(matches!(clock.tick(), TickOutcome::Counting { .. }));
        }
        assert_eq!(clock.remaining_seconds(), 1400);
        assert!(clock.is_running());
    }

    #[test]
    fn test_tick_ignored_while_paused() {
        let mut clock = clock(25, 5, 15, 4);
        assert_eq!(clock.tick(), TickOutcome::Ignored);
        assert_eq!(clock.remaining_seconds(), 1500);
    }

    #[test]
    fn test_finish_pauses_before_rollover() {
        let mut clock = clock(1, 1, 1, 2);
        clock.start();
        for _ in 0..59 {
            let _ = clock.tick();
        }
        let outcome = clock.tick();
        assert_eq!(clock.remaining_seconds(), 0);
        assert!(!clock.is_running());
        assert_eq!(clock.progress(), 100.0);
        assert_eq!(clock.stage(), Stage::Work);

        let TickOutcome::Finished(rollover) = outcome else {
            panic!("expected a finished stage");
        };
        assert_eq!(rollover.completed_stage(), Stage::Work);
        assert_eq!(clock.roll_over(rollover), Stage::ShortBreak);
        assert_eq!(clock.remaining_seconds(), 60);
        assert_eq!(clock.completed_cycles(), 1);
        assert_eq!(clock.progress(), 0.0);
    }

    #[test]
    fn test_long_break_parity() {
        let mut clock = clock(1, 1, 1, 3);
        for k in 1..=9u32 {
            assert_eq!(finish_stage(&mut clock), Stage::Work);
            let expected = if k % 3 == 0 { Stage::LongBreak } else { Stage::ShortBreak };
            assert_eq!(clock.stage(), expected, "after work completion {}", k);
            assert_eq!(clock.completed_cycles(), k);

            finish_stage(&mut clock);
            assert_eq!(clock.stage(), Stage::Work);
            assert_eq!(clock.completed_cycles(), k, "break completion must not count");
        }
    }

    #[test]
    fn test_single_cycle_always_long_break() {
        let mut clock = clock(1, 1, 1, 1);
        finish_stage(&mut clock);
        assert_eq!(clock.stage(), Stage::LongBreak);
        finish_stage(&mut clock);
        finish_stage(&mut clock);
        assert_eq!(clock.stage(), Stage::LongBreak);
    }

    #[test]
    fn test_skip_keeps_cycles() {
        let mut clock = clock(25, 5, 15, 4);
        clock.advance_stage();
        clock.start();
        let _ = clock.tick();
        clock.skip_to(Stage::LongBreak);
        assert_eq!(clock.stage(), Stage::LongBreak);
        assert_eq!(clock.remaining_seconds(), 900);
        assert!(!clock.is_running());
        assert_eq!(clock.completed_cycles(), 1);
    }

    #[test]
    fn test_reset_from_anywhere() {
        let mut clock = clock(25, 5, 15, 2);
        clock.advance_stage();
        clock.advance_stage();
        clock.advance_stage();
        clock.start();
        let _ = clock.tick();
        clock.reset_to_work();
        assert_eq!(clock.state(), &TimerState::new(1500));
        assert_eq!(clock.total_duration(), 1500);
    }

    #[test]
    fn test_reconfigure_while_paused_resyncs() {
        let mut clock = clock(25, 5, 15, 4);
        clock.reconfigure(TimerConfig::new(30, 5, 15, 4).unwrap());
        assert_eq!(clock.remaining_seconds(), 1800);
        assert_eq!(clock.total_duration(), 1800);
    }

    #[test]
    fn test_cycles_change_keeps_paused_countdown() {
        let mut clock = clock(25, 5, 15, 4);
        clock.start();
        for _ in 0..600 {
            let _ = clock.tick();
        }
        clock.pause();

        clock.reconfigure(TimerConfig::new(25, 5, 15, 2).unwrap());
        assert_eq!(clock.remaining_seconds(), 900);
        assert_eq!(clock.total_duration(), 1500);
        assert_eq!(clock.config().cycles_before_long_break, 2);
    }

    #[test]
    fn test_reconfigure_while_running_defers() {
        let mut clock = clock(25, 5, 15, 4);
        clock.start();
        let _ = clock.tick();
        clock.reconfigure(TimerConfig::new(30, 10, 15, 4).unwrap());
        assert_eq!(clock.remaining_seconds(), 1499);
        assert_eq!(clock.total_duration(), 1500);

        clock.advance_stage();
        assert_eq!(clock.stage(), Stage::ShortBreak);
        assert_eq!(clock.remaining_seconds(), 600);
    }

    #[test]
    fn test_progress_stays_in_range_after_shortening_running_stage() {
        let mut clock = clock(25, 5, 15, 4);
        clock.start();
        let _ = clock.tick();
        clock.reconfigure(TimerConfig::new(1, 5, 15, 4).unwrap());
        let progress = clock.progress();
        assert!((0.0..=100.0).contains(&progress));
        assert!(clock.remaining_seconds() <= clock.total_duration());
    }
}
