//! One-second tick source backed by a tokio interval

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    time::{interval_at, Instant, MissedTickBehavior},
};
use tracing::{debug, error, info};

use crate::state::{AppState, Ticker};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// What the ticker task should currently be doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickSchedule {
    Idle,
    /// Ticking for the arming with this generation number
    Armed(u64),
}

/// Controller-side handle of the tick schedule.
///
/// Arming and cancelling only publish a new [`TickSchedule`]; the
/// [`stage_ticker_task`] reacts to it. Each arming gets a fresh generation so a
/// tick that was already in flight for an older arming can be recognised and
/// dropped.
#[derive(Debug)]
pub struct TokioTicker {
    schedule_tx: watch::Sender<TickSchedule>,
    generation: u64,
}

impl TokioTicker {
    pub fn new() -> (Self, watch::Receiver<TickSchedule>) {
        let (schedule_tx, schedule_rx) = watch::channel(TickSchedule::Idle);
        (
            Self {
                schedule_tx,
                generation: 0,
            },
            schedule_rx,
        )
    }

    pub fn schedule(&self) -> TickSchedule {
        *self.schedule_tx.borrow()
    }

    /// Whether a tick for `generation` is still wanted
    pub fn is_current(&self, generation: u64) -> bool {
        self.schedule() == TickSchedule::Armed(generation)
    }
}

impl Ticker for TokioTicker {
    fn arm(&mut self) {
        self.generation += 1;
        self.schedule_tx
            .send_replace(TickSchedule::Armed(self.generation));
        debug!("Tick schedule armed (generation {})", self.generation);
    }

    fn cancel(&mut self) {
        if self.schedule() != TickSchedule::Idle {
            self.schedule_tx.send_replace(TickSchedule::Idle);
            debug!("Tick schedule cancelled");
        }
    }
}

/// Background task that delivers one tick per second while the timer runs
pub async fn stage_ticker_task(state: Arc<AppState>) {
    info!("Starting stage ticker task");

    let mut schedule_rx = state.schedule_receiver();

    loop {
        let schedule = *schedule_rx.borrow_and_update();
        let generation = match schedule {
            TickSchedule::Armed(generation) => generation,
            TickSchedule::Idle => {
                if schedule_rx.changed().await.is_err() {
                    info!("Tick schedule closed, stopping stage ticker task");
                    return;
                }
                continue;
            }
        };

        // First tick lands one full period after arming
        let mut interval = interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    match state.tick(generation) {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(e) => {
                            error!("Failed to apply tick: {}", e);
                            break;
                        }
                    }
                }

                changed = schedule_rx.changed() => {
                    if changed.is_err() {
                        info!("Tick schedule closed, stopping stage ticker task");
                        return;
                    }
                    debug!("Tick schedule changed, dropping interval for generation {}", generation);
                    break;
                }
            }
        }
    }
}
