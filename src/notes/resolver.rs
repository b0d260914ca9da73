use regex::Regex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::frames::FrameSource;
use crate::timecode::{normalize_timestamp, timecode_to_seconds};

/// Replaces bracketed timestamp markers in section text with extracted frame
/// images.
///
/// Resolution is memoized for the lifetime of the resolver (one generation
/// request): each distinct normalized timestamp costs at most one extraction,
/// and a failed extraction is remembered as an explicit no-frame entry so it
/// is never retried within the request.
pub struct MarkerResolver<'a> {
    frames: &'a dyn FrameSource,
    video_path: &'a Path,
    output_dir: &'a Path,
    media_root: &'a Path,
    pattern: Regex,
    cache: HashMap<String, Option<PathBuf>>,
}

impl<'a> MarkerResolver<'a> {
    pub fn new(
        frames: &'a dyn FrameSource,
        video_path: &'a Path,
        output_dir: &'a Path,
        media_root: &'a Path,
    ) -> Self {
        Self {
            frames,
            video_path,
            output_dir,
            media_root,
            pattern: Regex::new(r"\[(\d{1,2}:\d{2}(?::\d{2})?)\]").expect("marker pattern is valid"),
            cache: HashMap::new(),
        }
    }

    /// Resolve one timestamp to a media URL, extracting at most once.
    ///
    /// A failed extraction or an unusable timestamp yields `None` for this
    /// and every later resolution of the same timestamp.
    pub async fn resolve(&mut self, timestamp: &str) -> Option<String> {
        let key = normalize_timestamp(timestamp);

        if let Some(cached) = self.cache.get(&key) {
            return cached.as_ref().map(|p| self.media_url(p));
        }

        let extracted = match timecode_to_seconds(&key) {
            Ok(seconds) => {
                match self.frames.extract(self.video_path, seconds, self.output_dir).await {
                    Ok(path) => Some(path),
                    Err(e) => {
                        warn!("⚠️ Frame extraction failed for [{}]: {}", key, e);
                        None
                    }
                }
            }
            Err(e) => {
                warn!("⚠️ Unusable marker [{}]: {}", timestamp, e);
                None
            }
        };

        let url = extracted.as_ref().map(|p| self.media_url(p));
        self.cache.insert(key, extracted);
        url
    }

    /// Rewrite every marker in `content`, splicing a paragraph-level image
    /// block for each marker that resolved and leaving failed markers
    /// untouched.
    pub async fn render_content(&mut self, content: &str) -> String {
        let markers: Vec<String> = self
            .pattern
            .captures_iter(content)
            .map(|caps| caps[1].to_string())
            .collect();

        let mut resolved: HashMap<String, Option<String>> = HashMap::new();
        for marker in markers {
            if !resolved.contains_key(&marker) {
                let url = self.resolve(&marker).await;
                resolved.insert(marker, url);
            }
        }

        self.pattern
            .replace_all(content, |caps: &regex::Captures<'_>| {
                let marker = &caps[1];
                match resolved.get(marker).and_then(|url| url.as_deref()) {
                    Some(url) => format!("\n\n![{}]({})\n\n", marker, url),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }

    /// Map an extracted frame path to its URL under the configured media root
    fn media_url(&self, path: &Path) -> String {
        let relative = path.strip_prefix(self.media_root).unwrap_or(path);
        let mut url = String::from("/media");
        for component in relative.components() {
            url.push('/');
            url.push_str(&component.as_os_str().to_string_lossy());
        }
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frames::MockFrameSource;

    fn media_root() -> PathBuf {
        PathBuf::from("/media-root")
    }

    fn output_dir() -> PathBuf {
        media_root().join("note_frames").join("video_1")
    }

    fn resolver<'a>(
        frames: &'a MockFrameSource,
        output_dir: &'a Path,
        media_root: &'a Path,
    ) -> MarkerResolver<'a> {
        MarkerResolver::new(frames, Path::new("/media-root/saved_video/v.mp4"), output_dir, media_root)
    }

    #[tokio::test]
    async fn test_repeated_marker_extracts_once() {
        let frames = MockFrameSource::new();
        let root = media_root();
        let out = output_dir();
        let mut resolver = resolver(&frames, &out, &root);

        let content = "Look here [00:01:00] and again [00:01:00] later.";
        let rendered = resolver.render_content(content).await;

        assert_eq!(frames.call_count(), 1);
        assert_eq!(rendered.matches("![00:01:00](/media/note_frames/video_1/frame_60.jpg)").count(), 2);
    }

    #[tokio::test]
    async fn test_short_marker_shares_cache_with_normalized_form() {
        let frames = MockFrameSource::new();
        let root = media_root();
        let out = output_dir();
        let mut resolver = resolver(&frames, &out, &root);

        let rendered = resolver.render_content("a [01:00] b [00:01:00] c").await;

        // Both spellings normalize to 00:01:00 and share one extraction.
        assert_eq!(frames.call_count(), 1);
        // Each replacement keeps its own marker text as the label.
        assert!(rendered.contains("![01:00](/media/note_frames/video_1/frame_60.jpg)"));
        assert!(rendered.contains("![00:01:00](/media/note_frames/video_1/frame_60.jpg)"));
    }

    #[tokio::test]
    async fn test_failed_marker_left_in_place_and_neighbors_resolve() {
        let frames = MockFrameSource::with_failures(vec![10]);
        let root = media_root();
        let out = output_dir();
        let mut resolver = resolver(&frames, &out, &root);

        let rendered = resolver
            .render_content("bad [00:00:10] good [00:00:20] end")
            .await;

        assert!(rendered.contains("[00:00:10]"));
        assert!(!rendered.contains("![00:00:10]"));
        assert!(rendered.contains("![00:00:20](/media/note_frames/video_1/frame_20.jpg)"));
    }

    #[tokio::test]
    async fn test_failed_marker_not_retried() {
        let frames = MockFrameSource::with_failures(vec![10]);
        let root = media_root();
        let out = output_dir();
        let mut resolver = resolver(&frames, &out, &root);

        assert!(resolver.resolve("00:00:10").await.is_none());
        assert!(resolver.resolve("00:00:10").await.is_none());
        assert_eq!(frames.call_count(), 1);
    }

    #[tokio::test]
    async fn test_image_block_surrounded_by_blank_lines() {
        let frames = MockFrameSource::new();
        let root = media_root();
        let out = output_dir();
        let mut resolver = resolver(&frames, &out, &root);

        let rendered = resolver.render_content("before [00:00:05] after").await;
        assert_eq!(
            rendered,
            "before \n\n![00:00:05](/media/note_frames/video_1/frame_5.jpg)\n\n after"
        );
    }

    #[tokio::test]
    async fn test_text_without_markers_untouched() {
        let frames = MockFrameSource::new();
        let root = media_root();
        let out = output_dir();
        let mut resolver = resolver(&frames, &out, &root);

        let content = "No markers, just [brackets] and 12:30 times.";
        assert_eq!(resolver.render_content(content).await, content);
        assert_eq!(frames.call_count(), 0);
    }
}
