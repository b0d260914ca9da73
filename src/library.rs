use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// One video record in the library index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: String,

    /// Stored file name under the video directory
    #[serde(default)]
    pub url: String,

    /// Human-readable title
    #[serde(default)]
    pub name: String,
}

/// JSON-file-backed lookup of video records.
///
/// The index lives at `<media_root>/videos.json`; a missing index yields an
/// empty library rather than an error.
pub struct VideoLibrary {
    index_path: PathBuf,
    videos: RwLock<HashMap<String, Video>>,
}

impl VideoLibrary {
    pub async fn load(media_root: &Path) -> Result<Self> {
        let index_path = media_root.join("videos.json");

        let videos = match tokio::fs::read_to_string(&index_path).await {
            Ok(raw) => {
                let records: Vec<Video> = serde_json::from_str(&raw)?;
                info!("📚 Loaded {} video records from {}", records.len(), index_path.display());
                records.into_iter().map(|v| (v.id.clone(), v)).collect()
            }
            Err(_) => {
                warn!("No video index at {}, starting empty", index_path.display());
                HashMap::new()
            }
        };

        Ok(Self {
            index_path,
            videos: RwLock::new(videos),
        })
    }

    pub async fn get(&self, id: &str) -> Option<Video> {
        self.videos.read().await.get(id).cloned()
    }

    pub async fn insert(&self, video: Video) {
        self.videos.write().await.insert(video.id.clone(), video);
    }

    /// Persist the current records back to the index file
    pub async fn save(&self) -> Result<()> {
        let mut records: Vec<Video> = self.videos.read().await.values().cloned().collect();
        records.sort_by(|a, b| a.id.cmp(&b.id));

        let raw = serde_json::to_string_pretty(&records)?;
        tokio::fs::write(&self.index_path, raw).await?;
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.videos.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.videos.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_index_yields_empty_library() {
        let dir = tempfile::tempdir().unwrap();
        let library = VideoLibrary::load(dir.path()).await.unwrap();
        assert!(library.is_empty().await);
        assert!(library.get("1").await.is_none());
    }

    #[tokio::test]
    async fn test_insert_get_and_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let library = VideoLibrary::load(dir.path()).await.unwrap();

        library
            .insert(Video {
                id: "1".to_string(),
                url: "intro.mp4".to_string(),
                name: "Intro".to_string(),
            })
            .await;
        library.save().await.unwrap();

        let reloaded = VideoLibrary::load(dir.path()).await.unwrap();
        assert_eq!(reloaded.len().await, 1);
        let video = reloaded.get("1").await.unwrap();
        assert_eq!(video.url, "intro.mp4");
        assert_eq!(video.name, "Intro");
    }
}
