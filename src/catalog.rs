use crate::error::Result;
use crate::store::KeyValueStore;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

/// The key the whole record list lives under.
pub const STORAGE_KEY: &str = "video_platform_videos";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoRecord {
    pub id: String,
    pub url: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        default,
        rename = "subtitles",
        alias = "subtitleText",
        skip_serializing_if = "Option::is_none"
    )]
    pub subtitle_text: Option<String>,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}

/// Fields an admin fills in to register or edit a video.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoDraft {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub subtitle_text: Option<String>,
}

impl VideoRecord {
    /// A new record with a fresh id, stamped with the current time.
    pub fn from_draft(draft: VideoDraft) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            url: draft.url,
            title: draft.title,
            description: draft.description,
            subtitle_text: draft.subtitle_text,
            created_at: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Applies an edit, keeping the id and creation time.
    pub fn with_draft(&self, draft: VideoDraft) -> Self {
        Self {
            id: self.id.clone(),
            url: draft.url,
            title: draft.title,
            description: draft.description,
            subtitle_text: draft.subtitle_text,
            created_at: self.created_at,
        }
    }
}

/// Read access to the catalog. Playback only ever needs this half.
pub trait VideoSource {
    fn list(&self) -> Result<Vec<VideoRecord>>;

    fn get(&self, id: &str) -> Result<Option<VideoRecord>> {
        Ok(self.list()?.into_iter().find(|v| v.id == id))
    }
}

pub trait VideoRepository: VideoSource {
    fn create(&mut self, record: VideoRecord) -> Result<()>;

    /// Replaces the record with the same id. Unknown ids are ignored.
    fn update(&mut self, record: VideoRecord) -> Result<()>;

    /// Removes the record with `id`, if there is one.
    fn delete(&mut self, id: &str) -> Result<()>;
}

/// Keeps the record list as one JSON array under [`STORAGE_KEY`].
///
/// There is no protection against concurrent writers: the last write wins.
#[derive(Debug)]
pub struct StoredVideoRepository<S> {
    store: S,
}

impl<S: KeyValueStore> StoredVideoRepository<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    fn save(&mut self, videos: &[VideoRecord]) -> Result<()> {
        let json = serde_json::to_string(videos)?;
        self.store.set(STORAGE_KEY, &json)?;
        debug!(count = videos.len(), "Saved video list");
        Ok(())
    }
}

impl<S: KeyValueStore> VideoSource for StoredVideoRepository<S> {
    fn list(&self) -> Result<Vec<VideoRecord>> {
        let raw = match self.store.get(STORAGE_KEY)? {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };
        match serde_json::from_str(&raw) {
            Ok(videos) => Ok(videos),
            Err(err) => {
                warn!("Stored video list is unreadable, treating it as empty: {}", err);
                Ok(Vec::new())
            }
        }
    }
}

impl<S: KeyValueStore> VideoRepository for StoredVideoRepository<S> {
    fn create(&mut self, record: VideoRecord) -> Result<()> {
        let mut videos = self.list()?;
        videos.push(record);
        self.save(&videos)
    }

    fn update(&mut self, record: VideoRecord) -> Result<()> {
        let mut videos = self.list()?;
        match videos.iter_mut().find(|v| v.id == record.id) {
            Some(slot) => {
                *slot = record;
                self.save(&videos)
            }
            None => {
                debug!(id = %record.id, "Ignoring update of unknown video");
                Ok(())
            }
        }
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        let videos: Vec<VideoRecord> = self.list()?.into_iter().filter(|v| v.id != id).collect();
        self.save(&videos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn draft(title: &str) -> VideoDraft {
        VideoDraft {
            url: "https://youtu.be/dQw4w9WgXcQ".to_string(),
            title: title.to_string(),
            description: Some("about".to_string()),
            subtitle_text: Some("1\n00:00:01,000 --> 00:00:02,000\nhi\n".to_string()),
        }
    }

    fn repo() -> StoredVideoRepository<MemoryStore> {
        StoredVideoRepository::new(MemoryStore::new())
    }

    #[test]
    fn empty_store_lists_nothing() {
        assert!(repo().list().unwrap().is_empty());
    }

    #[test]
    fn create_update_delete() {
        let mut repo = repo();
        let first = VideoRecord::from_draft(draft("first"));
        let second = VideoRecord::from_draft(draft("second"));
        repo.create(first.clone()).unwrap();
        repo.create(second.clone()).unwrap();

        let edited = first.with_draft(draft("first, edited"));
        repo.update(edited.clone()).unwrap();
        assert_eq!(repo.get(&first.id).unwrap(), Some(edited.clone()));
        assert_eq!(edited.created_at, first.created_at);

        repo.delete(&second.id).unwrap();
        assert_eq!(repo.list().unwrap(), vec![edited]);
    }

    #[test]
    fn unknown_ids_are_ignored() {
        let mut repo = repo();
        let stored = VideoRecord::from_draft(draft("kept"));
        repo.create(stored.clone()).unwrap();

        let stranger = VideoRecord::from_draft(draft("stranger"));
        repo.update(stranger.clone()).unwrap();
        repo.delete(&stranger.id).unwrap();

        assert_eq!(repo.list().unwrap(), vec![stored]);
    }

    #[test]
    fn corrupt_store_reads_as_empty() {
        let mut store = MemoryStore::new();
        store.set(STORAGE_KEY, "{not json").unwrap();
        let repo = StoredVideoRepository::new(store);

        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn reads_the_browser_json_shape() {
        let json = r#"[{"id":"1","url":"https://youtu.be/x","title":"T","subtitles":"1\n00:00:01,000 --> 00:00:02,000\nhi","createdAt":1700000000000}]"#;
        let mut store = MemoryStore::new();
        store.set(STORAGE_KEY, json).unwrap();
        let repo = StoredVideoRepository::new(store);

        let videos = repo.list().unwrap();

        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].description, None);
        assert!(videos[0].subtitle_text.as_deref().unwrap().ends_with("hi"));
        assert_eq!(videos[0].created_at, 1_700_000_000_000);
    }

    #[test]
    fn writes_camel_case_keys() {
        let mut repo = repo();
        repo.create(VideoRecord::from_draft(draft("t"))).unwrap();

        let raw = repo.into_inner().get(STORAGE_KEY).unwrap().unwrap();

        assert!(raw.contains("\"createdAt\""));
        assert!(raw.contains("\"subtitles\""));
    }
}
