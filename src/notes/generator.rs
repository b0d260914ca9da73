use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::resolver::MarkerResolver;
use super::{GenerationError, Note, Section};
use crate::config::Config;
use crate::frames::{FrameExtractor, FrameSource};
use crate::library::{Video, VideoLibrary};
use crate::llm::segmentation::{NoteStyle, SubtitleAnalyzer};
use crate::timecode::timecode_to_seconds;

/// Subtitle file name suffixes probed per base name, in order
const LOCALE_SUFFIXES: &[&str] = &["", "_zh", "_en", "_zh-CN", "_en-US"];

/// Outcome payload handed back to the caller on success
#[derive(Debug, Serialize)]
pub struct NoteGenerationResult {
    pub notes: Vec<Note>,
    pub message: String,
}

/// End-to-end note generation for one library video
pub struct NoteGenerator {
    config: Config,
    library: VideoLibrary,
    analyzer: SubtitleAnalyzer,
    frames: FrameExtractor,
}

impl NoteGenerator {
    pub fn new(config: Config, library: VideoLibrary) -> Result<Self, GenerationError> {
        let analyzer = SubtitleAnalyzer::new(&config.llm)?;
        let frames = FrameExtractor::with_config(config.frames.clone());

        Ok(Self {
            config,
            library,
            analyzer,
            frames,
        })
    }

    /// Generate illustrated notes for a video.
    ///
    /// Entity lookups and the LLM call fail the whole request; individual
    /// frame extractions only cost their marker its image.
    pub async fn generate(
        &self,
        video_id: &str,
        style: NoteStyle,
    ) -> Result<NoteGenerationResult, GenerationError> {
        info!("📝 Generating notes for video {}", video_id);

        let video = self
            .library
            .get(video_id)
            .await
            .ok_or_else(|| GenerationError::VideoNotFound(video_id.to_string()))?;

        let subtitle_text = self
            .find_subtitle_text(&video)
            .await
            .ok_or_else(|| GenerationError::SubtitleNotFound(video_id.to_string()))?;

        let video_path = self
            .resolve_video_path(&video)
            .ok_or_else(|| GenerationError::VideoFileMissing(video_id.to_string()))?;

        let sections = self
            .analyzer
            .segment(&subtitle_text, style)
            .await
            .map_err(|e| GenerationError::Segmentation(e.to_string()))?;

        let output_dir = self.config.media.frame_output_dir(video_id);
        let notes = build_notes(
            &self.frames,
            &self.config.media.media_root,
            &sections,
            &video_path,
            &output_dir,
        )
        .await?;

        info!("🎉 Generated {} note sections for video {}", notes.len(), video_id);

        Ok(NoteGenerationResult {
            message: format!("generated {} note sections", notes.len()),
            notes,
        })
    }

    /// Probe the subtitle directory for this video's SRT text
    async fn find_subtitle_text(&self, video: &Video) -> Option<String> {
        let srt_dir = self.config.media.srt_dir();

        for candidate in subtitle_candidates(video, &srt_dir) {
            if !candidate.exists() {
                continue;
            }
            match tokio::fs::read_to_string(&candidate).await {
                Ok(text) => {
                    info!("📄 Found subtitle file: {}", candidate.display());
                    return Some(text);
                }
                Err(e) => {
                    warn!("Cannot read subtitle file {}: {}", candidate.display(), e);
                }
            }
        }

        debug!("No subtitle file found under {}", srt_dir.display());
        None
    }

    /// Source video location under the library's video directory
    fn resolve_video_path(&self, video: &Video) -> Option<PathBuf> {
        if video.url.is_empty() {
            return None;
        }
        let path = self.config.media.video_dir().join(&video.url);
        path.exists().then_some(path)
    }
}

/// Build one note per section through a request-scoped frame cache.
///
/// The section's own timestamp produces its cover image via the same
/// resolution path as content markers, so a cover timestamp recurring in the
/// body costs a single extraction.
pub async fn build_notes(
    frames: &dyn FrameSource,
    media_root: &Path,
    sections: &[Section],
    video_path: &Path,
    output_dir: &Path,
) -> Result<Vec<Note>, GenerationError> {
    let mut resolver = MarkerResolver::new(frames, video_path, output_dir, media_root);
    let mut notes = Vec::with_capacity(sections.len());

    for section in sections {
        let seconds = timecode_to_seconds(&section.timestamp)?;
        let image_path = resolver.resolve(&section.timestamp).await;
        let content = resolver.render_content(&section.content).await;

        notes.push(Note {
            id: Uuid::new_v4().simple().to_string(),
            timestamp: section.timestamp.clone(),
            seconds,
            title: section.title.clone(),
            content,
            image_path,
            is_edited: false,
        });
    }

    Ok(notes)
}

/// Ordered subtitle file candidates: id, url stem and name stem, each tried
/// across the locale suffixes.
fn subtitle_candidates(video: &Video, srt_dir: &Path) -> Vec<PathBuf> {
    let mut bases = vec![video.id.clone()];
    if let Some(stem) = file_stem_of(&video.url) {
        bases.push(stem);
    }
    if let Some(stem) = file_stem_of(&video.name) {
        bases.push(stem);
    }

    let mut candidates = Vec::with_capacity(bases.len() * LOCALE_SUFFIXES.len());
    for base in &bases {
        for suffix in LOCALE_SUFFIXES {
            candidates.push(srt_dir.join(format!("{}{}.srt", base, suffix)));
        }
    }
    candidates
}

fn file_stem_of(name: &str) -> Option<String> {
    if name.is_empty() {
        return None;
    }
    Path::new(name)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
}
