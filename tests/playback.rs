use subplay::catalog::{StoredVideoRepository, VideoDraft, VideoRecord, VideoRepository, VideoSource};
use subplay::overlay::OverlayRenderer;
use subplay::player::SimulatedPlayer;
use subplay::store::FileStore;
use subplay::track::TrackDefaults;
use subplay::{
    parse, render, DocumentFetcher, PlaybackSession, Result, SessionOptions, SubplayError,
    SubtitleTrack,
};

use async_trait::async_trait;

const HELLO: &str = "1\n00:00:01.000 --> 00:00:03.000\nHello\n";

struct UnreachableHost;

#[async_trait(?Send)]
impl DocumentFetcher for UnreachableHost {
    async fn fetch(&self, location: &str) -> Result<String> {
        Err(SubplayError::Fetch {
            location: location.to_string(),
            reason: "host unreachable".to_string(),
        })
    }
}

fn session() -> PlaybackSession {
    PlaybackSession::new("https://www.youtube.com/watch?v=dQw4w9WgXcQ", SessionOptions::default())
}

#[tokio::test]
async fn full_pipeline_shows_hello() {
    let mut session = session();
    session
        .load(SubtitleTrack::inline("English", "en", HELLO), &UnreachableHost)
        .await;

    session.on_progress(0.5, 2.0);

    let shown = render(session.active_cue(), true).map(|o| o.text);
    assert_eq!(shown.as_deref(), Some("Hello"));
    assert_eq!(render(session.active_cue(), false), None);
}

#[tokio::test]
async fn hidden_subtitles_render_nothing_at_any_time() {
    let mut session = session();
    session
        .load(SubtitleTrack::inline("English", "en", HELLO), &UnreachableHost)
        .await;
    session.toggle_subtitles_visible();
    let mut renderer = OverlayRenderer::new();

    for seconds in [0.0, 1.0, 2.0, 3.0, 4.0] {
        session.on_progress(seconds / 4.0, seconds);
        assert_eq!(renderer.update(&session), None);
    }
}

#[tokio::test]
async fn subtitle_fetch_failure_is_isolated_from_playback() {
    let mut session = session();
    let track = SubtitleTrack::remote("English", "en", "https://subs.example.invalid/en.srt");

    session.load(track, &UnreachableHost).await;

    assert!(!session.is_errored());
    for tick in 0..10 {
        session.toggle_playing();
        session.on_progress(tick as f64 / 10.0, tick as f64);
        assert_eq!(session.active_cue(), None);
    }
    session.play();
    assert!(session.is_playing());
    session.pause();
    assert!(!session.is_playing());
}

#[test]
fn well_formed_documents_keep_every_block() {
    let document: String = (0..25)
        .map(|i| {
            format!(
                "{}\n00:00:{:02},000 --> 00:00:{:02},500\nline {}\n\n",
                i + 1,
                i * 2,
                i * 2 + 1,
                i
            )
        })
        .collect();

    let cues = parse(&document);

    assert_eq!(cues.len(), 25);
    for (i, cue) in cues.iter().enumerate() {
        assert!(cue.end > cue.start);
        assert_eq!(cue.text, format!("line {}", i));
        assert_eq!(cue.start, (i * 2) as f64);
    }
}

#[tokio::test]
async fn catalog_record_plays_with_simulated_player() {
    let dir = tempfile::tempdir().unwrap();
    let mut repo = StoredVideoRepository::new(FileStore::new(dir.path()));
    let record = VideoRecord::from_draft(VideoDraft {
        url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
        title: "Never".to_string(),
        description: None,
        subtitle_text: Some(HELLO.to_string()),
    });
    repo.create(record.clone()).unwrap();

    let stored = repo.get(&record.id).unwrap().unwrap();
    let track = SubtitleTrack::from_record(&stored, &TrackDefaults::default()).unwrap();
    let mut session = PlaybackSession::new(stored.url.clone(), SessionOptions::default());
    session.load(track, &UnreachableHost).await;

    let mut player = SimulatedPlayer::new(4.0);
    let mut renderer = OverlayRenderer::new();
    let mut shown = Vec::new();
    session.play();
    while !player.finished() {
        player.apply(session.player_props());
        let progress = player.tick(0.5);
        session.on_progress(progress.played, progress.played_seconds);
        if let Some(overlay) = renderer.update(&session) {
            shown.push((session.current_time(), overlay.text.clone()));
        }
    }

    assert_eq!(
        shown,
        vec![
            (1.0, "Hello".to_string()),
            (1.5, "Hello".to_string()),
            (2.0, "Hello".to_string()),
            (2.5, "Hello".to_string()),
            (3.0, "Hello".to_string()),
        ]
    );
    assert_eq!(renderer.render_count(), 3);
}
