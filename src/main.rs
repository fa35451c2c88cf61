use subplay::catalog::{StoredVideoRepository, VideoDraft, VideoRecord, VideoRepository, VideoSource};
use subplay::overlay::OverlayRenderer;
use subplay::player::SimulatedPlayer;
use subplay::store::FileStore;
use subplay::timestamp::format_timestamp;
use subplay::track::{SourceFetcher, SubtitleTrack};
use subplay::youtube::youtube_video_id;
use subplay::{active_cue, overlay, parser, serialiser, Config, Cue, PlaybackRate, PlaybackSession};

use std::io::{self, Read};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser as ClapParser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    init_logging();
    match run() {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

#[derive(ClapParser)]
#[command(about = "Play subtitles in sync with a video and manage the video catalog")]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        global = true,
        help = "JSON config file. Flags given on the command line take precedence."
    )]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Parse a subtitle document and print its cues as SRT")]
    Cues {
        #[arg(
            short,
            long,
            value_name = "FILE",
            help = "The file to read from. If not supplied, the subtitles will be read from standard input.",
            default_value = "-"
        )]
        input: String,
    },
    #[command(about = "Show the subtitle that is on screen at a given time")]
    At {
        #[arg(
            short,
            long,
            value_name = "FILE",
            help = "The file to read from. If not supplied, the subtitles will be read from standard input.",
            default_value = "-"
        )]
        input: String,
        #[arg(short, long, value_name = "SECONDS", help = "Playback position in seconds.")]
        time: f64,
        #[arg(long, help = "Render with subtitles switched off.")]
        hidden: bool,
        #[arg(long, help = "Print the overlay as HTML instead of plain text.")]
        markup: bool,
    },
    #[command(about = "Simulate playback and print the subtitle overlay whenever it changes")]
    Play {
        #[arg(
            short,
            long,
            value_name = "LOCATION",
            help = "Subtitle file path or URL. '-' reads standard input.",
            default_value = "-",
            conflicts_with = "video"
        )]
        input: String,
        #[arg(long, value_name = "ID", help = "Play a video from the catalog instead.")]
        video: Option<String>,
        #[arg(long, value_name = "DIR", help = "Directory of the video catalog.")]
        store: Option<PathBuf>,
        #[arg(short, long, value_name = "RATE", help = "Playback rate: 0.5, 1, 1.5 or 2.")]
        rate: Option<PlaybackRate>,
        #[arg(
            short,
            long,
            value_name = "SECONDS",
            help = "Length of the video. Defaults to one second past the last cue."
        )]
        duration: Option<f64>,
        #[arg(long, help = "Tick at wall-clock speed instead of as fast as possible.")]
        realtime: bool,
    },
    #[command(about = "Manage the video catalog")]
    Catalog {
        #[arg(long, value_name = "DIR", help = "Directory of the video catalog.")]
        store: Option<PathBuf>,
        #[command(subcommand)]
        action: CatalogAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    #[command(about = "List all videos")]
    List,
    #[command(about = "Show one video")]
    Show { id: String },
    #[command(about = "Register a new video")]
    Add {
        #[arg(long)]
        url: String,
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_name = "FILE", help = "SRT file with the subtitles.")]
        subtitles: Option<PathBuf>,
    },
    #[command(about = "Edit a video")]
    Update {
        id: String,
        #[arg(long)]
        url: Option<String>,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, value_name = "FILE", help = "SRT file with the subtitles.")]
        subtitles: Option<PathBuf>,
    },
    #[command(about = "Remove a video")]
    Remove { id: String },
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("Failed to load config file: '{}'", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Command::Cues { input } => {
            let data = read_input(&input)?;
            let mut parser = parser::Parser::new();
            let cues = parser.parse(&data);
            if parser.skipped() > 0 {
                info!(skipped = parser.skipped(), "Some blocks had no timing line");
            }
            serialiser::serialise(&cues, io::stdout()).context("Failed to write cues")?;
        }
        Command::At {
            input,
            time,
            hidden,
            markup,
        } => {
            let data = read_input(&input)?;
            let cues = parser::parse(&data);
            if let Some(overlay) = overlay::render(active_cue(&cues, time), !hidden) {
                if markup {
                    println!("{}", overlay.to_markup());
                } else {
                    println!("{}", overlay.text);
                }
            }
        }
        Command::Play {
            input,
            video,
            store,
            rate,
            duration,
            realtime,
        } => {
            let (url, track) = match video {
                Some(id) => {
                    let repo = repository(store, &config);
                    let record = repo
                        .get(&id)?
                        .ok_or_else(|| anyhow!("No video with id '{}'", id))?;
                    let track = SubtitleTrack::from_record(&record, &config.track);
                    (record.url, track)
                }
                None => (String::new(), Some(input_track(&input, &config)?)),
            };
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .context("Failed to start the runtime")?;
            runtime.block_on(play(url, track, &config, rate, duration, realtime))?;
        }
        Command::Catalog { store, action } => {
            let mut repo = repository(store, &config);
            catalog(&mut repo, action)?;
        }
    }

    Ok(())
}

fn read_input(input: &str) -> Result<String> {
    if input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok(buffer)
    } else {
        std::fs::read_to_string(input).context(format!("Failed to open input file: '{}'", input))
    }
}

fn input_track(input: &str, config: &Config) -> Result<SubtitleTrack> {
    let defaults = &config.track;
    if input == "-" {
        Ok(SubtitleTrack::inline(&defaults.label, &defaults.language, read_input(input)?))
    } else {
        Ok(SubtitleTrack::remote(&defaults.label, &defaults.language, input))
    }
}

fn repository(store: Option<PathBuf>, config: &Config) -> StoredVideoRepository<FileStore> {
    let dir = store.unwrap_or_else(|| config.store_dir.clone());
    StoredVideoRepository::new(FileStore::new(dir))
}

async fn play(
    url: String,
    track: Option<SubtitleTrack>,
    config: &Config,
    rate: Option<PlaybackRate>,
    duration: Option<f64>,
    realtime: bool,
) -> Result<()> {
    let mut session = PlaybackSession::new(url, config.session_options());
    if let Some(rate) = rate {
        session.set_playback_rate(rate);
    }
    if let Some(track) = track {
        session.load(track, &SourceFetcher::new()).await;
    }

    let duration = video_length(duration, session.cues())?;
    let tick = Duration::from_millis(config.tick_interval_ms);
    let mut player = SimulatedPlayer::new(duration);
    let mut renderer = OverlayRenderer::new();

    session.play();
    while !player.finished() {
        player.apply(session.player_props());
        let progress = player.tick(tick.as_secs_f64());
        session.on_progress(progress.played, progress.played_seconds);

        let renders = renderer.render_count();
        let text = renderer.update(&session).map(|o| o.text.replace('\n', " / "));
        if renderer.render_count() != renders {
            println!(
                "[{}] {}",
                format_timestamp(session.current_time()),
                text.as_deref().unwrap_or("")
            );
        }
        if realtime {
            tokio::time::sleep(tick).await;
        }
    }
    session.pause();
    session.teardown();
    Ok(())
}

/// The simulated video length: the requested one, or one second past the
/// last cue.
fn video_length(requested: Option<f64>, cues: &[Cue]) -> Result<f64> {
    match requested {
        Some(seconds) if !seconds.is_finite() || seconds < 0.0 => {
            bail!("Duration must be a finite, non-negative number of seconds, got {}", seconds)
        }
        Some(seconds) => Ok(seconds),
        None => Ok(cues.iter().map(|c| c.end).fold(0.0, f64::max) + 1.0),
    }
}

fn catalog<R: VideoRepository>(repo: &mut R, action: CatalogAction) -> Result<()> {
    match action {
        CatalogAction::List => {
            let videos = repo.list()?;
            if videos.is_empty() {
                println!("No videos available.");
            }
            for video in videos {
                println!("{}", summary(&video));
            }
        }
        CatalogAction::Show { id } => {
            let video = repo
                .get(&id)?
                .ok_or_else(|| anyhow!("No video with id '{}'", id))?;
            println!("{}", serde_json::to_string_pretty(&video)?);
        }
        CatalogAction::Add {
            url,
            title,
            description,
            subtitles,
        } => {
            check_url(&url)?;
            let draft = VideoDraft {
                url,
                title,
                description,
                subtitle_text: subtitles.map(read_subtitles).transpose()?,
            };
            let record = VideoRecord::from_draft(draft);
            println!("{}", record.id);
            repo.create(record)?;
        }
        CatalogAction::Update {
            id,
            url,
            title,
            description,
            subtitles,
        } => {
            let current = repo
                .get(&id)?
                .ok_or_else(|| anyhow!("No video with id '{}'", id))?;
            if let Some(url) = &url {
                check_url(url)?;
            }
            let draft = VideoDraft {
                url: url.unwrap_or_else(|| current.url.clone()),
                title: title.unwrap_or_else(|| current.title.clone()),
                description: description.or_else(|| current.description.clone()),
                subtitle_text: match subtitles {
                    Some(path) => Some(read_subtitles(path)?),
                    None => current.subtitle_text.clone(),
                },
            };
            repo.update(current.with_draft(draft))?;
        }
        CatalogAction::Remove { id } => repo.delete(&id)?,
    }
    Ok(())
}

fn check_url(url: &str) -> Result<()> {
    if youtube_video_id(url).is_none() {
        bail!("Not a YouTube video URL: '{}'", url);
    }
    Ok(())
}

fn read_subtitles(path: PathBuf) -> Result<String> {
    std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to open subtitle file: '{}'", path.display()))
}

fn summary(video: &VideoRecord) -> String {
    let created = chrono::DateTime::from_timestamp_millis(video.created_at)
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();
    let subtitles = if video.subtitle_text.is_some() { "subtitles" } else { "-" };
    format!(
        "{}  {}  {}  {}  {}",
        video.id, created, subtitles, video.title, video.url
    )
}
