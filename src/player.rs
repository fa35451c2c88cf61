use crate::session::{FullscreenCapability, PlayerProps, PlayerTransport};

use tracing::debug;

/// One progress report, as the external player delivers it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Progress {
    pub played: f64,
    pub played_seconds: f64,
}

/// An in-process stand-in for the external player: it follows the props it
/// is given and advances a clock when ticked.
#[derive(Debug)]
pub struct SimulatedPlayer {
    duration: f64,
    position: f64,
    props: Option<PlayerProps>,
    fullscreen: bool,
}

impl SimulatedPlayer {
    pub fn new(duration: f64) -> Self {
        Self {
            duration: duration.max(0.0),
            position: 0.0,
            props: None,
            fullscreen: false,
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn finished(&self) -> bool {
        self.position >= self.duration
    }

    pub fn apply(&mut self, props: PlayerProps) {
        self.props = Some(props);
    }

    /// Advances the clock by `elapsed` wall seconds, scaled by the playback
    /// rate, and reports the new position. Nothing moves while paused.
    pub fn tick(&mut self, elapsed: f64) -> Progress {
        if let Some(props) = self.props.as_ref().filter(|p| p.playing) {
            self.position = (self.position + elapsed * props.playback_rate).min(self.duration);
        }
        self.progress()
    }

    pub fn progress(&self) -> Progress {
        let played = if self.duration > 0.0 {
            self.position / self.duration
        } else {
            0.0
        };
        Progress {
            played,
            played_seconds: self.position,
        }
    }
}

impl PlayerTransport for SimulatedPlayer {
    fn seek_to(&mut self, fraction: f64) {
        self.position = (fraction.clamp(0.0, 1.0) * self.duration).min(self.duration);
        debug!(position = self.position, "Seeked");
    }
}

impl FullscreenCapability for SimulatedPlayer {
    fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    fn request_fullscreen(&mut self) {
        self.fullscreen = true;
    }

    fn exit_fullscreen(&mut self) {
        self.fullscreen = false;
    }
}
