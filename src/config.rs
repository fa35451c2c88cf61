use crate::error::{Result, SubplayError};
use crate::session::{PlaybackRate, SessionOptions};
use crate::track::TrackDefaults;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub volume: f64,
    pub muted: bool,
    pub playback_rate: PlaybackRate,
    pub subtitles_visible: bool,
    pub track: TrackDefaults,
    /// Directory holding the video record store.
    pub store_dir: PathBuf,
    /// Interval between progress ticks of the simulated player.
    pub tick_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        let session = SessionOptions::default();
        Self {
            volume: session.volume,
            muted: session.muted,
            playback_rate: session.playback_rate,
            subtitles_visible: session.subtitles_visible,
            track: TrackDefaults::default(),
            store_dir: PathBuf::from(".subplay"),
            tick_interval_ms: 250,
        }
    }
}

impl Config {
    /// Reads a JSON config file. Missing fields keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.volume.is_finite() {
            return Err(SubplayError::Config(format!("volume must be a number, got {}", self.volume)));
        }
        if self.tick_interval_ms == 0 {
            return Err(SubplayError::Config("tickIntervalMs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            volume: self.volume,
            muted: self.muted,
            playback_rate: self.playback_rate,
            subtitles_visible: self.subtitles_visible,
        }
    }
}
