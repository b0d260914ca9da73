use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::frames::FrameExtractorConfig;
use crate::llm::LLMConfig;

/// Configuration for the video note generator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Media library layout
    pub media: MediaConfig,

    /// Speech recognition service settings
    pub recognition: RecognitionConfig,

    /// LLM segmentation settings
    pub llm: LLMConfig,

    /// Frame extraction settings
    pub frames: FrameExtractorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Root of the media library; every produced path resolves under it
    pub media_root: PathBuf,

    /// Subdirectory holding source video files
    pub video_subdir: String,

    /// Subdirectory holding SRT subtitle files
    pub srt_subdir: String,

    /// Subdirectory receiving extracted note frames
    pub frame_subdir: String,
}

impl MediaConfig {
    pub fn video_dir(&self) -> PathBuf {
        self.media_root.join(&self.video_subdir)
    }

    pub fn srt_dir(&self) -> PathBuf {
        self.media_root.join(&self.srt_subdir)
    }

    /// Frame output directory for one video's generation request
    pub fn frame_output_dir(&self, video_id: &str) -> PathBuf {
        self.media_root
            .join(&self.frame_subdir)
            .join(format!("video_{}", video_id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecognitionConfig {
    /// Recognizer REST endpoint
    pub endpoint: Option<String>,

    /// API key for the recognizer
    pub api_key: Option<String>,

    /// Recognition model
    pub model: String,

    /// Expected audio sample rate
    pub sample_rate: u32,

    /// Language hints passed to the recognizer
    pub language_hints: Vec<String>,

    /// Request timeout in seconds
    pub timeout_seconds: u64,
}

impl Config {
    /// Load configuration from an explicit path or the default location.
    ///
    /// An explicit path must exist and parse; the default location falls
    /// back to `Config::default()` when absent. API keys can always be
    /// supplied through the environment.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)
                    .map_err(|e| anyhow!("cannot read config {}: {}", path.display(), e))?;
                toml::from_str(&raw)
                    .map_err(|e| anyhow!("cannot parse config {}: {}", path.display(), e))?
            }
            None => {
                let default_path = Path::new("video-notes.toml");
                if default_path.exists() {
                    let raw = std::fs::read_to_string(default_path)?;
                    toml::from_str(&raw)?
                } else {
                    Config::default()
                }
            }
        };

        if let Ok(key) = std::env::var("VIDEO_NOTES_LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Ok(key) = std::env::var("VIDEO_NOTES_ASR_API_KEY") {
            config.recognition.api_key = Some(key);
        }

        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.frames.max_retries == 0 {
            return Err(anyhow!("frames.max_retries must be greater than 0"));
        }
        if self.frames.retry_offset <= 0.0 {
            return Err(anyhow!("frames.retry_offset must be positive"));
        }

        if !self.media.media_root.exists() {
            if let Err(e) = std::fs::create_dir_all(&self.media.media_root) {
                return Err(anyhow!("cannot create media root: {}", e));
            }
        }

        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Video Notes Configuration:\n\
            - Media Root: {}\n\
            - LLM Provider: {:?}\n\
            - Recognition Model: {}\n\
            - Frame Retries: {} (step {:.1}s, blur threshold {:.0})",
            self.media.media_root.display(),
            self.llm.provider,
            self.recognition.model,
            self.frames.max_retries,
            self.frames.retry_offset,
            self.frames.blur_threshold,
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            media: MediaConfig {
                media_root: PathBuf::from("./media"),
                video_subdir: "saved_video".to_string(),
                srt_subdir: "saved_srt".to_string(),
                frame_subdir: "note_frames".to_string(),
            },
            recognition: RecognitionConfig {
                endpoint: None,
                api_key: None,
                model: "paraformer-realtime-v2".to_string(),
                sample_rate: 16000,
                language_hints: vec!["zh".to_string(), "en".to_string()],
                timeout_seconds: 300,
            },
            llm: LLMConfig::default(),
            frames: FrameExtractorConfig::default(),
        }
    }
}
