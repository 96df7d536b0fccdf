//! Timer controller: drives a [`StageClock`] from a periodic tick source

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{
    stage_clock::{StageClock, TickOutcome},
    Stage, TimerSnapshot,
};
use crate::{config::TimerConfig, error::TimerError};

/// Host-side periodic tick subscription.
///
/// Once armed, the host calls [`TimerController::on_tick`] once per elapsed
/// second until `cancel` is called. Implementations must guarantee that no
/// tick from an earlier arming is delivered after `cancel` returns.
pub trait Ticker: Send {
    fn arm(&mut self);
    fn cancel(&mut self);
}

/// Payload of the finish callback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishEvent {
    /// The stage that just ran out
    pub stage: Stage,
    /// Clock state at zero, before rolling into the next stage
    pub snapshot: TimerSnapshot,
}

pub type FinishCallback = Box<dyn FnMut(&FinishEvent) + Send>;

pub struct TimerController<T: Ticker> {
    clock: StageClock,
    ticker: T,
    on_finish: FinishCallback,
}

impl<T: Ticker + fmt::Debug> fmt::Debug for TimerController<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TimerController")
            .field("clock", &self.clock)
            .field("ticker", &self.ticker)
            .finish_non_exhaustive()
    }
}

impl<T: Ticker> TimerController<T> {
    /// Paused at the start of a work stage
    pub fn new(config: TimerConfig, ticker: T, on_finish: FinishCallback) -> Result<Self, TimerError> {
        config.validate()?;
        Ok(Self {
            clock: StageClock::new(config),
            ticker,
            on_finish,
        })
    }

    pub fn snapshot(&self) -> TimerSnapshot {
        self.clock.snapshot()
    }

    pub fn config(&self) -> &TimerConfig {
        self.clock.config()
    }

    pub fn clock(&self) -> &StageClock {
        &self.clock
    }

    pub fn ticker(&self) -> &T {
        &self.ticker
    }

    pub fn is_running(&self) -> bool {
        self.clock.is_running()
    }

    /// Start or pause the countdown
    pub fn toggle(&mut self) {
        if self.clock.is_running() {
            self.ticker.cancel();
            self.clock.pause();
            info!(
                "Paused {} with {}s remaining",
                self.clock.stage(),
                self.clock.remaining_seconds()
            );
        } else if self.clock.start() {
            self.ticker.arm();
            info!(
                "Started {} with {}s remaining",
                self.clock.stage(),
                self.clock.remaining_seconds()
            );
        }
    }

    /// Stop ticking and return to the first work stage with no cycles counted
    pub fn reset(&mut self) {
        self.ticker.cancel();
        self.clock.reset_to_work();
        info!("Timer reset");
    }

    /// Stop ticking and jump to the start of `stage`
    pub fn skip_to_stage(&mut self, stage: Stage) {
        self.ticker.cancel();
        self.clock.skip_to(stage);
        info!("Skipped to {}", stage);
    }

    /// Apply a new configuration.
    ///
    /// A paused timer picks up new stage lengths immediately; a running one keeps
    /// its current countdown and uses the new values from the next stage on.
    pub fn reconfigure(&mut self, config: TimerConfig) -> Result<(), TimerError> {
        config.validate()?;
        if config == *self.clock.config() {
            return Ok(());
        }

        if self.clock.is_running() {
            info!("Configuration updated; applies from the next stage");
        } else if config.durations_differ(self.clock.config()) {
            info!("Configuration updated; current stage resynced");
        } else {
            info!("Long-break cadence updated");
        }
        self.clock.reconfigure(config);
        Ok(())
    }

    /// One elapsed second. Returns whether the countdown is still running.
    pub fn on_tick(&mut self) -> bool {
        match self.clock.tick() {
            TickOutcome::Ignored => {
                debug!("Tick ignored, timer not running");
                false
            }
            TickOutcome::Counting { remaining_seconds } => {
                debug!("Tick: {}s remaining in {}", remaining_seconds, self.clock.stage());
                true
            }
            TickOutcome::Finished(rollover) => {
                self.ticker.cancel();

                let event = FinishEvent {
                    stage: rollover.completed_stage(),
                    snapshot: self.clock.snapshot(),
                };
                info!("Stage {} finished", event.stage);
                (self.on_finish)(&event);

                let next = self.clock.roll_over(rollover);
                info!("Next stage: {}", next);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    /// Ticker that only records arm/cancel calls
    #[derive(Debug, Default)]
    struct ManualTicker {
        armed: bool,
        arms: usize,
    }

    impl Ticker for ManualTicker {
        fn arm(&mut self) {
            self.armed = true;
            self.arms += 1;
        }

        fn cancel(&mut self) {
            self.armed = false;
        }
    }

    fn controller(config: TimerConfig) -> (TimerController<ManualTicker>, Arc<Mutex<Vec<FinishEvent>>>) {
        let finished = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&finished);
        let controller = TimerController::new(
            config,
            ManualTicker::default(),
            Box::new(move |event: &FinishEvent| sink.lock().unwrap().push(event.clone())),
        )
        .unwrap();
        (controller, finished)
    }

    fn tick_while_armed(controller: &mut TimerController<ManualTicker>, max: usize) -> usize {
        let mut ticks = 0;
        while controller.ticker().armed && ticks < max {
            controller.on_tick();
            ticks += 1;
        }
        ticks
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = TimerConfig {
            work_duration: 0,
            ..TimerConfig::default()
        };
        let result = TimerController::new(config, ManualTicker::default(), Box::new(|_: &FinishEvent| {}));
        assert!(matches!(result, Err(TimerError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_toggle_arms_and_cancels() {
        let (mut controller, _) = controller(TimerConfig::default());
        controller.toggle();
        assert!(controller.is_running());
        assert!(controller.ticker().armed);

        controller.on_tick();
        controller.toggle();
        assert!(!controller.is_running());
        assert!(!controller.ticker().armed);
        assert_eq!(controller.snapshot().remaining_seconds, 1499);

        controller.toggle();
        assert_eq!(controller.ticker().arms, 2);
    }

    #[test]
    fn test_work_stage_completes_into_short_break() {
        let (mut controller, finished) = controller(TimerConfig::new(1, 1, 15, 2).unwrap());
        controller.toggle();
        assert_eq!(tick_while_armed(&mut controller, 1000), 60);

        let events = finished.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].stage, Stage::Work);

        let snapshot = controller.snapshot();
        assert_eq!(snapshot.stage, Stage::ShortBreak);
        assert_eq!(snapshot.remaining_seconds, 60);
        assert_eq!(snapshot.completed_cycles, 1);
        assert!(!snapshot.is_running);
        assert!(!controller.ticker().armed);
    }

    #[test]
    fn test_callback_sees_pre_rollover_state() {
        let (mut controller, finished) = controller(TimerConfig::new(1, 1, 1, 2).unwrap());
        controller.toggle();
        tick_while_armed(&mut controller, 1000);

        let events = finished.lock().unwrap();
        let snapshot = &events[0].snapshot;
        assert_eq!(snapshot.stage, Stage::Work);
        assert_eq!(snapshot.remaining_seconds, 0);
        assert_eq!(snapshot.progress, 100.0);
        assert_eq!(snapshot.completed_cycles, 0);
        assert!(!snapshot.is_running);
    }

    #[test]
    fn test_finish_fires_once_per_stage() {
        let (mut controller, finished) = controller(TimerConfig::new(1, 1, 1, 2).unwrap());
        for _ in 0..4 {
            controller.toggle();
            tick_while_armed(&mut controller, 1000);
            // a stray tick after the finish must not fire again
            controller.on_tick();
        }

        let stages: Vec<Stage> = finished.lock().unwrap().iter().map(|e| e.stage).collect();
        assert_eq!(
            stages,
            vec![Stage::Work, Stage::ShortBreak, Stage::Work, Stage::LongBreak]
        );
        assert_eq!(controller.snapshot().stage, Stage::Work);
        assert_eq!(controller.snapshot().completed_cycles, 2);
    }

    #[test]
    fn test_reset_while_running() {
        let (mut controller, finished) = controller(TimerConfig::new(1, 1, 1, 2).unwrap());
        controller.toggle();
        tick_while_armed(&mut controller, 1000);
        controller.toggle();
        controller.on_tick();

        controller.reset();
        assert!(!controller.ticker().armed);
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.stage, Stage::Work);
        assert_eq!(snapshot.remaining_seconds, 60);
        assert!(!snapshot.is_running);
        assert_eq!(snapshot.completed_cycles, 0);
        assert_eq!(finished.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_skip_while_running() {
        let (mut controller, finished) = controller(TimerConfig::default());
        controller.toggle();
        controller.on_tick();
        controller.skip_to_stage(Stage::LongBreak);

        assert!(!controller.ticker().armed);
        let snapshot = controller.snapshot();
        assert!(!snapshot.is_running);
        assert_eq!(snapshot.stage, Stage::LongBreak);
        assert_eq!(snapshot.remaining_seconds, 900);
        assert_eq!(snapshot.completed_cycles, 0);
        assert!(finished.lock().unwrap().is_empty());
    }

    #[test]
    fn test_reconfigure_paused_and_running() {
        let (mut controller, _) = controller(TimerConfig::default());
        let longer = TimerConfig::new(30, 5, 15, 4).unwrap();
        controller.reconfigure(longer).unwrap();
        assert_eq!(controller.snapshot().remaining_seconds, 1800);

        controller.reset();
        controller.reconfigure(TimerConfig::default()).unwrap();
        controller.toggle();
        controller.reconfigure(longer).unwrap();
        assert_eq!(controller.snapshot().remaining_seconds, 1500);
        assert_eq!(controller.config(), &longer);
    }

    #[test]
    fn test_reconfigure_rejects_invalid_and_keeps_state() {
        let (mut controller, _) = controller(TimerConfig::default());
        let bad = TimerConfig {
            cycles_before_long_break: 0,
            ..TimerConfig::default()
        };
        assert!(controller.reconfigure(bad).is_err());
        assert_eq!(controller.config(), &TimerConfig::default());
    }

    #[test]
    fn test_unchanged_config_keeps_paused_progress() {
        let (mut controller, _) = controller(TimerConfig::default());
        controller.toggle();
        controller.on_tick();
        controller.toggle();
        controller.reconfigure(TimerConfig::default()).unwrap();
        assert_eq!(controller.snapshot().remaining_seconds, 1499);
    }

    #[test]
    fn test_cadence_change_keeps_paused_progress() {
        let (mut controller, _) = controller(TimerConfig::default());
        controller.toggle();
        for _ in 0..600 {
            controller.on_tick();
        }
        controller.toggle();
        assert_eq!(controller.snapshot().remaining_seconds, 900);

        controller.reconfigure(TimerConfig::new(25, 5, 15, 2).unwrap()).unwrap();
        let snapshot = controller.snapshot();
        assert_eq!(snapshot.remaining_seconds, 900);
        assert_eq!(snapshot.progress, 40.0);
        assert_eq!(controller.config().cycles_before_long_break, 2);
    }
}
