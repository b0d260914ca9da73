use async_trait::async_trait;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tracing::{debug, info};
use uuid::Uuid;

use super::probe::probe_video;
use super::sharpness::laplacian_variance;
use super::FrameError;

/// Tunables for sharpness-aware frame extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameExtractorConfig {
    /// Maximum decode attempts per extraction call
    pub max_retries: u32,
    /// Forward time step between attempts, in seconds
    pub retry_offset: f64,
    /// Laplacian variance at which a frame is accepted immediately
    pub blur_threshold: f64,
    /// JPEG quality for persisted frames
    pub jpeg_quality: u8,
}

impl Default for FrameExtractorConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            retry_offset: 0.5,
            blur_threshold: 100.0,
            jpeg_quality: 90,
        }
    }
}

/// Source of representative frames, a seam so callers can be tested without
/// video files or ffmpeg
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Extract one representative frame near `seconds` into `output_dir`,
    /// returning the saved image path.
    async fn extract(
        &self,
        video_path: &Path,
        seconds: f64,
        output_dir: &Path,
    ) -> Result<PathBuf, FrameError>;
}

/// Single-frame extractor built on ffmpeg with blur-aware retry
#[derive(Debug, Clone, Default)]
pub struct FrameExtractor {
    config: FrameExtractorConfig,
}

impl FrameExtractor {
    pub fn new() -> Self {
        Self::with_config(FrameExtractorConfig::default())
    }

    pub fn with_config(config: FrameExtractorConfig) -> Self {
        Self { config }
    }

    /// Extract the sharpest available frame near `target_seconds`.
    ///
    /// Seeks are bounded into the stream's duration; each attempt decodes one
    /// frame and scores it, stepping forward by the retry offset on blur or
    /// decode failure. The first frame clearing the blur threshold wins
    /// outright; otherwise the sharpest frame seen is persisted. Only a call
    /// that never decodes a single frame fails.
    pub async fn extract_frame(
        &self,
        video_path: &Path,
        target_seconds: f64,
        output_dir: &Path,
    ) -> Result<PathBuf, FrameError> {
        let info = probe_video(video_path).await?;
        let mut offset = clamp_offset(target_seconds, info.duration_seconds());
        debug!(
            "extracting frame near {:.2}s (clamped from {:.2}s) in {}",
            offset,
            target_seconds,
            video_path.display()
        );

        let scratch = tempfile::tempdir()?;
        let scratch_frame = scratch.path().join("probe.png");

        let mut best: Option<(DynamicImage, f64)> = None;
        for attempt in 1..=self.config.max_retries {
            match self.decode_frame_at(video_path, offset, &scratch_frame).await {
                Ok(frame) => {
                    let score = laplacian_variance(&frame.to_luma8());
                    debug!("attempt {} at {:.2}s scored {:.1}", attempt, offset, score);

                    if best.as_ref().map_or(true, |(_, s)| score > *s) {
                        best = Some((frame, score));
                    }
                    if score >= self.config.blur_threshold {
                        break;
                    }
                }
                Err(e) => {
                    debug!("attempt {} at {:.2}s decoded nothing: {}", attempt, offset, e);
                }
            }
            offset += self.config.retry_offset;
        }

        let (frame, score) = best.ok_or(FrameError::NoFrameDecoded {
            seconds: target_seconds,
            attempts: self.config.max_retries,
        })?;

        tokio::fs::create_dir_all(output_dir).await?;
        let path = output_dir.join(format!("frame_{}.jpg", short_id()));
        self.save_jpeg(&frame, &path)?;

        info!(
            "🖼️ Saved frame for {:.2}s (sharpness {:.1}) to {}",
            target_seconds,
            score,
            path.display()
        );
        Ok(path)
    }

    /// Decode exactly one frame at `seconds` into the scratch path
    async fn decode_frame_at(
        &self,
        video_path: &Path,
        seconds: f64,
        scratch_frame: &Path,
    ) -> Result<DynamicImage, FrameError> {
        let status = tokio::process::Command::new("ffmpeg")
            .arg("-ss")
            .arg(format!("{:.3}", seconds))
            .arg("-i")
            .arg(video_path)
            .args(["-frames:v", "1", "-y"])
            .arg(scratch_frame)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map_err(|e| FrameError::Decode(format!("failed to run ffmpeg: {}", e)))?;

        if !status.success() {
            return Err(FrameError::Decode(format!(
                "ffmpeg produced no frame at {:.3}s",
                seconds
            )));
        }

        image::open(scratch_frame).map_err(|e| FrameError::Decode(e.to_string()))
    }

    fn save_jpeg(&self, frame: &DynamicImage, path: &Path) -> Result<(), FrameError> {
        let rgb = frame.to_rgb8();
        let file = std::fs::File::create(path)?;
        let mut writer = std::io::BufWriter::new(file);
        let encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut writer, self.config.jpeg_quality);
        rgb.write_with_encoder(encoder)?;
        Ok(())
    }
}

#[async_trait]
impl FrameSource for FrameExtractor {
    async fn extract(
        &self,
        video_path: &Path,
        seconds: f64,
        output_dir: &Path,
    ) -> Result<PathBuf, FrameError> {
        self.extract_frame(video_path, seconds, output_dir).await
    }
}

/// Bound a requested offset into the decodable range of the stream.
///
/// The upper bound backs off 0.1s from the end so the seek lands on a
/// decodable frame; a zero-length stream collapses every request to 0.
fn clamp_offset(seconds: f64, duration: f64) -> f64 {
    seconds.min(duration - 0.1).max(0.0)
}

/// Collision-resistant short suffix for frame file names
fn short_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// Scripted frame source for tests: records calls and fails on request.
pub struct MockFrameSource {
    calls: std::sync::atomic::AtomicUsize,
    failing_seconds: Vec<u64>,
}

impl MockFrameSource {
    pub fn new() -> Self {
        Self::with_failures(Vec::new())
    }

    /// Fail extraction for these whole-second targets
    pub fn with_failures(failing_seconds: Vec<u64>) -> Self {
        Self {
            calls: std::sync::atomic::AtomicUsize::new(0),
            failing_seconds,
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

impl Default for MockFrameSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FrameSource for MockFrameSource {
    async fn extract(
        &self,
        _video_path: &Path,
        seconds: f64,
        output_dir: &Path,
    ) -> Result<PathBuf, FrameError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        if self.failing_seconds.contains(&(seconds as u64)) {
            return Err(FrameError::NoFrameDecoded { seconds, attempts: 3 });
        }
        Ok(output_dir.join(format!("frame_{}.jpg", seconds as u64)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_within_range() {
        assert_eq!(clamp_offset(5.0, 60.0), 5.0);
    }

    #[test]
    fn test_clamp_past_end_backs_off() {
        assert!((clamp_offset(120.0, 60.0) - 59.9).abs() < 1e-9);
        assert!((clamp_offset(60.0, 60.0) - 59.9).abs() < 1e-9);
    }

    #[test]
    fn test_clamp_zero_duration_collapses_to_zero() {
        assert_eq!(clamp_offset(5.0, 0.0), 0.0);
    }

    #[test]
    fn test_clamp_negative_request() {
        assert_eq!(clamp_offset(-3.0, 60.0), 0.0);
    }

    #[test]
    fn test_short_id_shape() {
        let id = short_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(short_id(), short_id());
    }

    #[test]
    fn test_default_config() {
        let config = FrameExtractorConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.retry_offset, 0.5);
        assert_eq!(config.blur_threshold, 100.0);
        assert_eq!(config.jpeg_quality, 90);
    }

    // End-to-end extraction needs ffmpeg and a fixture video; point
    // TEST_VIDEO_FILE at one to exercise it.
    #[tokio::test]
    async fn test_extraction_from_fixture_video() {
        if let Ok(video) = std::env::var("TEST_VIDEO_FILE") {
            let dir = tempfile::tempdir().unwrap();
            let extractor = FrameExtractor::new();
            let path = extractor
                .extract_frame(Path::new(&video), 1.0, dir.path())
                .await
                .unwrap();
            assert!(path.exists());
            assert_eq!(path.extension().unwrap(), "jpg");
        }
    }
}
