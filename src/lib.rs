//! Subtitle-synchronized playback for a YouTube video catalog.
//!
//! A subtitle document is parsed once per video into [`Cue`]s. A
//! [`PlaybackSession`] holds the player state, takes progress ticks from the
//! external player and resolves the active cue, which the
//! [`OverlayRenderer`] turns into the on-screen subtitle.

pub mod catalog;
pub mod config;
pub mod cue;
pub mod error;
pub mod overlay;
pub mod parser;
pub mod player;
pub mod serialiser;
pub mod session;
pub mod store;
pub mod timestamp;
pub mod track;
pub mod youtube;

pub use crate::catalog::{StoredVideoRepository, VideoDraft, VideoRecord, VideoRepository, VideoSource};
pub use crate::config::Config;
pub use crate::cue::{active_cue, Cue};
pub use crate::error::{Result, SubplayError};
pub use crate::overlay::{render, Overlay, OverlayRenderer};
pub use crate::parser::{parse, Parser};
pub use crate::session::{PlaybackRate, PlaybackSession, SessionOptions};
pub use crate::timestamp::to_seconds;
pub use crate::track::{DocumentFetcher, SourceFetcher, SubtitleTrack};
