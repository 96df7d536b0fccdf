//! Stage-finish side effects: desktop notification and sound

use std::{
    convert::Infallible,
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
    str::FromStr,
    time::{Duration, Instant},
};

use notify_rust::Notification;
use rodio::{Decoder, OutputStream, Sink};
use tracing::{debug, info, warn};

use crate::state::{FinishEvent, Stage};

/// Longest a finish sound may play before it is cut off
pub const SOUND_TIMEOUT: Duration = Duration::from_secs(10);

/// Upper bound on how long showing a notification may take
pub const NOTIFICATION_TIMEOUT: Duration = Duration::from_secs(5);

/// Sound to play when a stage finishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SoundChoice {
    Bell,
    Chime,
    Ping,
    /// Any other audio file
    Custom(PathBuf),
}

impl FromStr for SoundChoice {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "bell" => SoundChoice::Bell,
            "chime" => SoundChoice::Chime,
            "ping" => SoundChoice::Ping,
            other => SoundChoice::Custom(PathBuf::from(other)),
        })
    }
}

impl SoundChoice {
    /// Resolve to a file, built-in sounds living in `sound_dir`
    pub fn path(&self, sound_dir: &Path) -> PathBuf {
        match self {
            SoundChoice::Bell => sound_dir.join("bell.mp3"),
            SoundChoice::Chime => sound_dir.join("chime.mp3"),
            SoundChoice::Ping => sound_dir.join("ping.mp3"),
            SoundChoice::Custom(path) => path.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSounds {
    pub work: SoundChoice,
    pub short_break: SoundChoice,
    pub long_break: SoundChoice,
}

impl StageSounds {
    pub fn for_stage(&self, stage: Stage) -> &SoundChoice {
        match stage {
            Stage::Work => &self.work,
            Stage::ShortBreak => &self.short_break,
            Stage::LongBreak => &self.long_break,
        }
    }
}

impl Default for StageSounds {
    fn default() -> Self {
        Self {
            work: SoundChoice::Bell,
            short_break: SoundChoice::Chime,
            long_break: SoundChoice::Ping,
        }
    }
}

/// How finish events are announced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertSettings {
    pub notifications: bool,
    pub sound: bool,
    /// Playback volume, 0-100
    pub volume: u8,
    pub sound_dir: PathBuf,
    pub sounds: StageSounds,
}

impl Default for AlertSettings {
    fn default() -> Self {
        Self {
            notifications: true,
            sound: true,
            volume: 50,
            sound_dir: PathBuf::from("sounds"),
            sounds: StageSounds::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub title: &'static str,
    pub body: &'static str,
}

/// Notification text for a completed stage
pub fn finish_message(completed: Stage) -> AlertMessage {
    match completed {
        Stage::Work => AlertMessage {
            title: "Break time!",
            body: "You finished a work session. Take a breather.",
        },
        Stage::ShortBreak => AlertMessage {
            title: "Back to work!",
            body: "Your short break is over. Time to focus.",
        },
        Stage::LongBreak => AlertMessage {
            title: "Back to work!",
            body: "Your long break is over. Great progress!",
        },
    }
}

/// Show a desktop notification. Blocks until the notification server answers.
pub fn show_notification(message: &AlertMessage) -> Result<(), String> {
    debug!("Showing notification: {}", message.title);

    Notification::new()
        .appname("focus-timer")
        .summary(message.title)
        .body(message.body)
        .timeout(5000)
        .show()
        .map(|_| ())
        .map_err(|e| format!("Failed to show notification: {}", e))
}

/// Play an audio file at `volume` (0-100), blocking until it ends or `limit` passes.
///
/// The file is opened and decoded before the output device is touched, so a
/// missing or unreadable file fails without needing audio hardware.
pub fn play_sound(path: &Path, volume: u8, limit: Duration) -> Result<(), String> {
    debug!("Playing {} at volume {}", path.display(), volume);

    let file = File::open(path).map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
    let source = Decoder::new(BufReader::new(file))
        .map_err(|e| format!("Failed to decode {}: {}", path.display(), e))?;

    let (_stream, stream_handle) =
        OutputStream::try_default().map_err(|e| format!("No audio output available: {}", e))?;
    let sink = Sink::try_new(&stream_handle).map_err(|e| format!("Failed to open audio sink: {}", e))?;

    sink.set_volume(f32::from(volume.min(100)) / 100.0);
    sink.append(source);

    let deadline = Instant::now() + limit;
    while !sink.empty() {
        if Instant::now() >= deadline {
            sink.stop();
            return Err(format!("{} cut off after {:?}", path.display(), limit));
        }
        std::thread::sleep(Duration::from_millis(50));
    }

    Ok(())
}

/// Run a blocking alert job on the blocking pool, giving up after `limit`
pub async fn run_blocking<F>(limit: Duration, job: F) -> Result<(), String>
where
    F: FnOnce() -> Result<(), String> + Send + 'static,
{
    match tokio::time::timeout(limit, tokio::task::spawn_blocking(job)).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(format!("Alert job panicked: {}", e)),
        Err(_) => Err(format!("Alert job timed out after {:?}", limit)),
    }
}

/// Announce a finished stage. Never fails; problems are only logged.
///
/// Sound and notification run side by side so neither waits on the other.
pub async fn deliver_finish_alert(event: &FinishEvent, settings: &AlertSettings) {
    info!(
        "Announcing end of {} (completed cycles: {})",
        event.stage, event.snapshot.completed_cycles
    );

    let sound = async {
        if !settings.sound {
            return;
        }
        let path = settings.sounds.for_stage(event.stage).path(&settings.sound_dir);
        let volume = settings.volume;
        // The extra second lets play_sound stop the sink itself first
        let limit = SOUND_TIMEOUT + Duration::from_secs(1);
        if let Err(e) = run_blocking(limit, move || play_sound(&path, volume, SOUND_TIMEOUT)).await {
            warn!("Could not play finish sound: {}", e);
        }
    };

    let notification = async {
        if !settings.notifications {
            return;
        }
        let message = finish_message(event.stage);
        if let Err(e) = run_blocking(NOTIFICATION_TIMEOUT, move || show_notification(&message)).await {
            warn!("Could not show finish notification: {}", e);
        }
    };

    tokio::join!(sound, notification);
}
