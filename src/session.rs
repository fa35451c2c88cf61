use crate::cue::{self, Cue};
use crate::error::SubplayError;
use crate::parser::Parser;
use crate::track::{DocumentFetcher, SubtitleTrack};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// The playback speeds offered by the controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum PlaybackRate {
    Half,
    #[default]
    Normal,
    OneAndHalf,
    Double,
}

impl PlaybackRate {
    pub const ALL: [PlaybackRate; 4] = [
        PlaybackRate::Half,
        PlaybackRate::Normal,
        PlaybackRate::OneAndHalf,
        PlaybackRate::Double,
    ];

    pub fn as_f64(self) -> f64 {
        match self {
            PlaybackRate::Half => 0.5,
            PlaybackRate::Normal => 1.0,
            PlaybackRate::OneAndHalf => 1.5,
            PlaybackRate::Double => 2.0,
        }
    }
}

impl From<PlaybackRate> for f64 {
    fn from(rate: PlaybackRate) -> f64 {
        rate.as_f64()
    }
}

impl TryFrom<f64> for PlaybackRate {
    type Error = SubplayError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        PlaybackRate::ALL
            .iter()
            .copied()
            .find(|rate| rate.as_f64() == value)
            .ok_or_else(|| SubplayError::InvalidPlaybackRate(value.to_string()))
    }
}

impl FromStr for PlaybackRate {
    type Err = SubplayError;

    /// Accepts `1.5` as well as the `1.5x` form shown in the controls.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let number = trimmed.strip_suffix('x').unwrap_or(trimmed);
        let value: f64 = number
            .parse()
            .map_err(|_| SubplayError::InvalidPlaybackRate(s.to_string()))?;
        PlaybackRate::try_from(value)
    }
}

impl fmt::Display for PlaybackRate {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}x", self.as_f64())
    }
}

/// Initial control values for a new session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOptions {
    pub volume: f64,
    pub muted: bool,
    pub playback_rate: PlaybackRate,
    pub subtitles_visible: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            volume: 0.8,
            muted: false,
            playback_rate: PlaybackRate::Normal,
            subtitles_visible: true,
        }
    }
}

/// Where the subtitle pipeline is for the current session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CueState {
    /// No track has been requested.
    Idle,
    Loading,
    /// Cues are in place. A failed load also ends here, with no cues.
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    Paused,
    Playing,
    /// Terminal. The video area shows an error placeholder.
    Errored,
}

/// The values the external player is driven with.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerProps {
    pub url: String,
    pub playing: bool,
    pub volume: f64,
    pub muted: bool,
    pub playback_rate: f64,
}

/// Imperative half of the external player.
pub trait PlayerTransport {
    fn seek_to(&mut self, fraction: f64);
}

/// Fullscreen support of whatever hosts the player.
pub trait FullscreenCapability {
    fn is_fullscreen(&self) -> bool;
    fn request_fullscreen(&mut self);
    fn exit_fullscreen(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Observer = Box<dyn FnMut(&PlaybackSession)>;

/// A load that has been started but whose document has not arrived yet.
#[derive(Debug)]
pub struct PendingLoad {
    generation: u64,
    track: SubtitleTrack,
}

/// The outcome of a [`PendingLoad`], ready to be applied to its session.
#[derive(Debug)]
pub struct LoadedCues {
    generation: u64,
    label: String,
    cues: Vec<Cue>,
}

impl PendingLoad {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Fetches and parses the track's document. Failures are logged and
    /// produce an empty cue list.
    pub async fn resolve(self, fetcher: &dyn DocumentFetcher) -> LoadedCues {
        let cues = match self.track.document(fetcher).await {
            Ok(document) => {
                let mut parser = Parser::new();
                let cues = parser.parse(&document);
                info!(
                    track = %self.track.label,
                    cues = cues.len(),
                    skipped = parser.skipped(),
                    "Loaded subtitles"
                );
                cues
            }
            Err(err) => {
                warn!(track = %self.track.label, "Failed to load subtitles: {}", err);
                Vec::new()
            }
        };
        LoadedCues {
            generation: self.generation,
            label: self.track.label,
            cues,
        }
    }
}

impl LoadedCues {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }
}

/// State of one mounted player.
///
/// Every mutation goes through a method on this type, and subscribers are
/// notified after each one.
pub struct PlaybackSession {
    url: String,
    playing: bool,
    volume: f64,
    muted: bool,
    played_fraction: f64,
    current_time: f64,
    playback_rate: PlaybackRate,
    subtitles_visible: bool,
    cues: Vec<Cue>,
    cue_state: CueState,
    errored: bool,
    torn_down: bool,
    generation: u64,
    observers: Vec<(SubscriptionId, Observer)>,
    next_subscription: u64,
}

impl fmt::Debug for PlaybackSession {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("PlaybackSession")
            .field("url", &self.url)
            .field("playing", &self.playing)
            .field("volume", &self.volume)
            .field("muted", &self.muted)
            .field("played_fraction", &self.played_fraction)
            .field("current_time", &self.current_time)
            .field("playback_rate", &self.playback_rate)
            .field("subtitles_visible", &self.subtitles_visible)
            .field("cues", &self.cues.len())
            .field("cue_state", &self.cue_state)
            .field("errored", &self.errored)
            .field("generation", &self.generation)
            .finish()
    }
}

impl PlaybackSession {
    pub fn new(url: impl Into<String>, opts: SessionOptions) -> Self {
        Self {
            url: url.into(),
            playing: false,
            volume: opts.volume,
            muted: opts.muted,
            played_fraction: 0.0,
            current_time: 0.0,
            playback_rate: opts.playback_rate,
            subtitles_visible: opts.subtitles_visible,
            cues: Vec::new(),
            cue_state: CueState::Idle,
            errored: false,
            torn_down: false,
            generation: 0,
            observers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn played_fraction(&self) -> f64 {
        self.played_fraction
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    pub fn playback_rate(&self) -> PlaybackRate {
        self.playback_rate
    }

    pub fn subtitles_visible(&self) -> bool {
        self.subtitles_visible
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn cue_state(&self) -> CueState {
        self.cue_state
    }

    pub fn is_errored(&self) -> bool {
        self.errored
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Bumped by every new load and by teardown.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn transport_state(&self) -> TransportState {
        if self.errored {
            TransportState::Errored
        } else if self.playing {
            TransportState::Playing
        } else {
            TransportState::Paused
        }
    }

    pub fn player_props(&self) -> PlayerProps {
        PlayerProps {
            url: self.url.clone(),
            playing: self.playing,
            volume: self.volume,
            muted: self.muted,
            playback_rate: self.playback_rate.as_f64(),
        }
    }

    pub fn active_cue(&self) -> Option<&Cue> {
        cue::active_cue(&self.cues, self.current_time)
    }

    pub fn active_cue_index(&self) -> Option<usize> {
        cue::active_cue_index(&self.cues, self.current_time)
    }

    pub fn subscribe<F>(&mut self, observer: F) -> SubscriptionId
    where
        F: FnMut(&PlaybackSession) + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.observers.push((id, Box::new(observer)));
        id
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.observers.len();
        self.observers.retain(|(sub, _)| *sub != id);
        self.observers.len() != before
    }

    /// Starts loading `track`. Cues of any earlier load are dropped right away,
    /// and results of earlier loads that are still in flight will be discarded.
    pub fn begin_load(&mut self, track: SubtitleTrack) -> PendingLoad {
        self.generation += 1;
        self.cues.clear();
        self.cue_state = CueState::Loading;
        debug!(track = %track.label, generation = self.generation, "Loading subtitles");
        self.notify();
        PendingLoad {
            generation: self.generation,
            track,
        }
    }

    /// Installs the cues of a finished load. Returns `false` when the result
    /// belongs to an older load or the session has been torn down.
    pub fn apply_load(&mut self, loaded: LoadedCues) -> bool {
        if self.torn_down || loaded.generation != self.generation {
            debug!(
                track = %loaded.label,
                load_generation = loaded.generation,
                current_generation = self.generation,
                "Discarding stale subtitle load"
            );
            return false;
        }
        self.cues = loaded.cues;
        self.cue_state = CueState::Ready;
        self.notify();
        true
    }

    /// Loads `track` to completion. Use [`PlaybackSession::begin_load`] and
    /// [`PlaybackSession::apply_load`] when other events must be handled
    /// while the document is being fetched.
    pub async fn load(&mut self, track: SubtitleTrack, fetcher: &dyn DocumentFetcher) -> bool {
        let pending = self.begin_load(track);
        let loaded = pending.resolve(fetcher).await;
        self.apply_load(loaded)
    }

    pub fn play(&mut self) {
        self.set_playing(true);
    }

    pub fn pause(&mut self) {
        self.set_playing(false);
    }

    pub fn toggle_playing(&mut self) {
        self.set_playing(!self.playing);
    }

    fn set_playing(&mut self, playing: bool) {
        if self.errored || self.torn_down {
            debug!(
                errored = self.errored,
                torn_down = self.torn_down,
                "Ignoring transport change"
            );
            return;
        }
        self.playing = playing;
        self.notify();
    }

    /// Values outside `[0, 1]` are kept as given.
    pub fn set_volume(&mut self, volume: f64) {
        if !(0.0..=1.0).contains(&volume) {
            warn!(volume, "Volume outside of [0, 1]");
        }
        self.volume = volume;
        self.notify();
    }

    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
        self.notify();
    }

    /// Progress tick from the external player.
    pub fn on_progress(&mut self, played_fraction: f64, played_seconds: f64) {
        self.played_fraction = played_fraction;
        self.current_time = played_seconds;
        self.notify();
    }

    /// Moves the playhead without waiting for the player to confirm.
    pub fn seek(&mut self, fraction: f64, transport: &mut dyn PlayerTransport) {
        self.played_fraction = fraction;
        transport.seek_to(fraction);
        self.notify();
    }

    pub fn set_playback_rate(&mut self, rate: PlaybackRate) {
        self.playback_rate = rate;
        self.notify();
    }

    pub fn toggle_subtitles_visible(&mut self) {
        self.subtitles_visible = !self.subtitles_visible;
        self.notify();
    }

    /// The player gave up on the video. There is no way back from here.
    pub fn on_error(&mut self) {
        error!(url = %self.url, "Error loading video");
        self.errored = true;
        self.playing = false;
        self.notify();
    }

    pub fn toggle_fullscreen(&self, fullscreen: &mut dyn FullscreenCapability) {
        if fullscreen.is_fullscreen() {
            fullscreen.exit_fullscreen();
        } else {
            fullscreen.request_fullscreen();
        }
    }

    /// Unmounts the session. Loads still in flight will be discarded.
    pub fn teardown(&mut self) {
        self.generation += 1;
        self.torn_down = true;
        self.playing = false;
        self.observers.clear();
    }

    fn notify(&mut self) {
        let mut observers = std::mem::take(&mut self.observers);
        for (_, observer) in observers.iter_mut() {
            observer(&*self);
        }
        self.observers = observers;
    }
}
