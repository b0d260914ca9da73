pub mod generator;
pub mod resolver;

pub use generator::{NoteGenerationResult, NoteGenerator};
pub use resolver::MarkerResolver;

use serde::{Deserialize, Serialize};

/// One titled, timestamped section as produced by the LLM.
///
/// Sections arrive in presentation order; their timestamps are not
/// guaranteed to be monotonic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    #[serde(default = "default_timestamp")]
    pub timestamp: String,
    #[serde(default)]
    pub title: String,
    /// Markdown body, possibly embedding `[HH:MM:SS]` or `[MM:SS]` markers
    #[serde(default)]
    pub content: String,
}

fn default_timestamp() -> String {
    "00:00:00".to_string()
}

/// One generated note chapter, serialized in the shape the viewer expects
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub timestamp: String,
    pub seconds: f64,
    pub title: String,
    /// Markdown body with markers replaced by image references
    pub content: String,
    /// Media URL of the section cover frame, if one could be extracted
    pub image_path: Option<String>,
    pub is_edited: bool,
}

/// Request-level failures for note generation.
///
/// Per-marker frame failures never surface here; they degrade to "no image"
/// inside the resolver.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("video not found: {0}")]
    VideoNotFound(String),

    #[error("no subtitle file found for video {0}")]
    SubtitleNotFound(String),

    #[error("video file missing for {0}")]
    VideoFileMissing(String),

    #[error("LLM segmentation failed: {0}")]
    Segmentation(String),

    #[error(transparent)]
    Timecode(#[from] crate::timecode::TimecodeError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_tolerates_missing_fields() {
        let section: Section = serde_json::from_str(r#"{"title": "Only a title"}"#).unwrap();
        assert_eq!(section.timestamp, "00:00:00");
        assert_eq!(section.title, "Only a title");
        assert!(section.content.is_empty());
    }

    #[test]
    fn test_note_serializes_camel_case() {
        let note = Note {
            id: "abc".to_string(),
            timestamp: "00:01:00".to_string(),
            seconds: 60.0,
            title: "t".to_string(),
            content: "c".to_string(),
            image_path: None,
            is_edited: false,
        };

        let json = serde_json::to_string(&note).unwrap();
        assert!(json.contains("\"imagePath\":null"));
        assert!(json.contains("\"isEdited\":false"));
    }
}
