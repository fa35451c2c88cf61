use crate::catalog::VideoRecord;
use crate::error::{Result, SubplayError};

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Label and language given to the track derived from a video record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackDefaults {
    pub label: String,
    pub language: String,
}

impl Default for TrackDefaults {
    fn default() -> Self {
        Self {
            label: "Bangla".to_string(),
            language: "bn".to_string(),
        }
    }
}

/// A single subtitle document bound to a language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubtitleTrack {
    pub label: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ref: Option<String>,
}

impl SubtitleTrack {
    pub fn inline(
        label: impl Into<String>,
        language: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            language: language.into(),
            content: Some(content.into()),
            source_ref: None,
        }
    }

    pub fn remote(
        label: impl Into<String>,
        language: impl Into<String>,
        source_ref: impl Into<String>,
    ) -> Self {
        Self {
            label: label.into(),
            language: language.into(),
            content: None,
            source_ref: Some(source_ref.into()),
        }
    }

    /// The one track a record carries, if it has any subtitle text.
    pub fn from_record(record: &VideoRecord, defaults: &TrackDefaults) -> Option<Self> {
        record
            .subtitle_text
            .as_deref()
            .filter(|text| !text.trim().is_empty())
            .map(|text| Self::inline(&defaults.label, &defaults.language, text))
    }

    /// Returns the raw document: inline content when present, otherwise
    /// whatever `fetcher` retrieves from the source location.
    pub async fn document(&self, fetcher: &dyn DocumentFetcher) -> Result<String> {
        if let Some(content) = self.content.as_deref().filter(|c| !c.is_empty()) {
            return Ok(content.to_string());
        }
        match self.source_ref.as_deref().filter(|s| !s.is_empty()) {
            Some(location) => {
                debug!(track = %self.label, location, "Fetching subtitle document");
                fetcher.fetch(location).await
            }
            None => Err(SubplayError::MissingSource(self.label.clone())),
        }
    }
}

/// Retrieves subtitle documents from a location.
#[async_trait(?Send)]
pub trait DocumentFetcher {
    async fn fetch(&self, location: &str) -> Result<String>;
}

/// Fetches `http(s)://` locations over the network and reads everything else
/// (plain paths and `file://` URLs) from disk.
#[derive(Debug, Clone, Default)]
pub struct SourceFetcher {
    client: reqwest::Client,
}

impl SourceFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    async fn fetch_http(&self, location: &str) -> Result<String> {
        let fetch_error = |err: reqwest::Error| SubplayError::Fetch {
            location: location.to_string(),
            reason: err.to_string(),
        };
        self.client
            .get(location)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(fetch_error)?
            .text()
            .await
            .map_err(fetch_error)
    }

    async fn fetch_file(&self, path: &Path) -> Result<String> {
        tokio::fs::read_to_string(path)
            .await
            .map_err(|err| SubplayError::Fetch {
                location: path.display().to_string(),
                reason: err.to_string(),
            })
    }
}

#[async_trait(?Send)]
impl DocumentFetcher for SourceFetcher {
    async fn fetch(&self, location: &str) -> Result<String> {
        if location.starts_with("http://") || location.starts_with("https://") {
            self.fetch_http(location).await
        } else {
            let path = location.strip_prefix("file://").unwrap_or(location);
            self.fetch_file(Path::new(path)).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    struct PanickingFetcher;

    #[async_trait(?Send)]
    impl DocumentFetcher for PanickingFetcher {
        async fn fetch(&self, location: &str) -> Result<String> {
            panic!("unexpected fetch of {}", location);
        }
    }

    fn record(subtitles: Option<&str>) -> VideoRecord {
        VideoRecord {
            id: "a1".to_string(),
            url: "https://www.youtube.com/watch?v=abc".to_string(),
            title: "Title".to_string(),
            description: None,
            subtitle_text: subtitles.map(String::from),
            created_at: 0,
        }
    }

    #[test]
    fn record_with_subtitles_yields_one_track() {
        let track = SubtitleTrack::from_record(&record(Some("1\n...")), &TrackDefaults::default());

        assert_eq!(
            track,
            Some(SubtitleTrack::inline("Bangla", "bn", "1\n..."))
        );
    }

    #[test]
    fn record_without_subtitles_yields_none() {
        let defaults = TrackDefaults::default();

        assert_eq!(SubtitleTrack::from_record(&record(None), &defaults), None);
        assert_eq!(SubtitleTrack::from_record(&record(Some("  ")), &defaults), None);
    }

    #[tokio::test]
    async fn inline_content_wins_over_source() {
        let mut track = SubtitleTrack::inline("English", "en", "inline");
        track.source_ref = Some("https://example.com/en.srt".to_string());

        assert_eq!(track.document(&PanickingFetcher).await.unwrap(), "inline");
    }

    #[tokio::test]
    async fn track_without_any_source_is_an_error() {
        let track = SubtitleTrack {
            label: "English".to_string(),
            language: "en".to_string(),
            content: Some(String::new()),
            source_ref: None,
        };

        let err = track.document(&PanickingFetcher).await.unwrap_err();
        assert!(matches!(err, SubplayError::MissingSource(label) if label == "English"));
    }

    #[tokio::test]
    async fn reads_local_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "1\n00:00:01,000 --> 00:00:02,000\nfrom disk\n").unwrap();
        let location = format!("file://{}", file.path().display());
        let track = SubtitleTrack::remote("English", "en", location);

        let document = track.document(&SourceFetcher::new()).await.unwrap();

        assert!(document.contains("from disk"));
    }

    #[tokio::test]
    async fn missing_file_is_a_fetch_error() {
        let err = SourceFetcher::new()
            .fetch("/definitely/not/here.srt")
            .await
            .unwrap_err();

        assert!(matches!(err, SubplayError::Fetch { .. }));
    }
}
