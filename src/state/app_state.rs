//! Main application state management

use std::{
    sync::{Mutex, MutexGuard},
    time::Instant,
};

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, warn};

use super::{FinishEvent, Stage, TimerController, TimerSnapshot};
use crate::{
    config::TimerConfig,
    error::TimerError,
    services::AlertSettings,
    tasks::stage_ticker::{TickSchedule, TokioTicker},
};

/// Shared state behind the HTTP handlers and background tasks
#[derive(Debug)]
pub struct AppState {
    /// The single timer instance
    controller: Mutex<TimerController<TokioTicker>>,
    /// Tick schedule published by the controller's ticker
    schedule_rx: watch::Receiver<TickSchedule>,
    /// Finish events, fired synchronously from the tick handler
    pub finish_tx: broadcast::Sender<FinishEvent>,
    /// Latest snapshot after every change
    pub snapshot_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    pub _snapshot_rx: watch::Receiver<TimerSnapshot>,
    pub alerts: AlertSettings,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
}

impl AppState {
    /// Create the state with a paused timer at the start of a work stage
    pub fn new(
        port: u16,
        host: String,
        config: TimerConfig,
        alerts: AlertSettings,
    ) -> Result<Self, TimerError> {
        let (finish_tx, _) = broadcast::channel(16);
        let (ticker, schedule_rx) = TokioTicker::new();

        let event_tx = finish_tx.clone();
        let controller = TimerController::new(
            config,
            ticker,
            Box::new(move |event: &FinishEvent| {
                if let Err(e) = event_tx.send(event.clone()) {
                    debug!("No listeners for finish event: {}", e);
                }
            }),
        )?;
        let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());

        Ok(Self {
            controller: Mutex::new(controller),
            schedule_rx,
            finish_tx,
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
            alerts,
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
        })
    }

    fn lock_controller(&self) -> Result<MutexGuard<'_, TimerController<TokioTicker>>, TimerError> {
        self.controller
            .lock()
            .map_err(|e| TimerError::StateUnavailable(format!("Failed to lock controller: {}", e)))
    }

    /// Apply a control action and publish the resulting snapshot
    pub fn update_timer<F>(&self, action: &str, updater: F) -> Result<TimerSnapshot, TimerError>
    where
        F: FnOnce(&mut TimerController<TokioTicker>) -> Result<(), TimerError>,
    {
        let mut controller = self.lock_controller()?;
        updater(&mut controller)?;
        let snapshot = controller.snapshot();
        drop(controller); // Release the lock early

        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }

        self.publish(snapshot.clone());
        Ok(snapshot)
    }

    pub fn toggle(&self) -> Result<TimerSnapshot, TimerError> {
        self.update_timer("toggle", |controller| {
            controller.toggle();
            Ok(())
        })
    }

    pub fn reset(&self) -> Result<TimerSnapshot, TimerError> {
        self.update_timer("reset", |controller| {
            controller.reset();
            Ok(())
        })
    }

    pub fn skip_to_stage(&self, stage: Stage) -> Result<TimerSnapshot, TimerError> {
        self.update_timer(&format!("skip:{}", stage), |controller| {
            controller.skip_to_stage(stage);
            Ok(())
        })
    }

    pub fn reconfigure(&self, config: TimerConfig) -> Result<TimerSnapshot, TimerError> {
        self.update_timer("configure", |controller| controller.reconfigure(config))
    }

    /// Deliver one tick for the arming `generation`.
    ///
    /// Ticks from a cancelled arming are dropped. Returns whether ticking
    /// should continue.
    pub fn tick(&self, generation: u64) -> Result<bool, TimerError> {
        let mut controller = self.lock_controller()?;
        if !controller.ticker().is_current(generation) {
            debug!("Dropping stale tick for generation {}", generation);
            return Ok(false);
        }

        let running = controller.on_tick();
        let snapshot = controller.snapshot();
        drop(controller);

        self.publish(snapshot);
        Ok(running)
    }

    /// Get current timer snapshot
    pub fn get_snapshot(&self) -> Result<TimerSnapshot, TimerError> {
        Ok(self.lock_controller()?.snapshot())
    }

    /// Get the active configuration
    pub fn get_config(&self) -> Result<TimerConfig, TimerError> {
        Ok(*self.lock_controller()?.config())
    }

    pub fn schedule_receiver(&self) -> watch::Receiver<TickSchedule> {
        self.schedule_rx.clone()
    }

    pub fn subscribe_finish(&self) -> broadcast::Receiver<FinishEvent> {
        self.finish_tx.subscribe()
    }

    pub fn subscribe_snapshots(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    fn publish(&self, snapshot: TimerSnapshot) {
        if let Err(e) = self.snapshot_tx.send(snapshot) {
            warn!("Failed to send timer snapshot: {}", e);
        }
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
