use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

use super::FrameError;

/// Video stream facts needed to bound a seek
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct VideoStreamInfo {
    pub fps: f64,
    pub frame_count: u64,
}

impl VideoStreamInfo {
    /// Duration derived from frame count and rate; a non-positive rate
    /// collapses the duration to zero.
    pub fn duration_seconds(&self) -> f64 {
        if self.fps > 0.0 {
            self.frame_count as f64 / self.fps
        } else {
            0.0
        }
    }
}

/// Probe a video file with ffprobe and extract stream timing facts
pub async fn probe_video(video_path: &Path) -> Result<VideoStreamInfo, FrameError> {
    let open_err = |reason: String| FrameError::VideoOpen {
        path: video_path.to_path_buf(),
        reason,
    };

    let output = tokio::process::Command::new("ffprobe")
        .args(["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"])
        .arg(video_path)
        .output()
        .await
        .map_err(|e| open_err(format!("failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        return Err(open_err("ffprobe reported an unreadable file".to_string()));
    }

    let data: serde_json::Value = serde_json::from_slice(&output.stdout)
        .map_err(|e| open_err(format!("unparsable ffprobe output: {}", e)))?;

    let streams = data["streams"].as_array().cloned().unwrap_or_default();
    let video_stream = streams
        .iter()
        .find(|s| s["codec_type"] == "video")
        .ok_or_else(|| open_err("no video stream found".to_string()))?;

    let fps = video_stream["r_frame_rate"]
        .as_str()
        .and_then(parse_frame_rate)
        .unwrap_or(0.0);

    // Some containers omit nb_frames; fall back to the container duration.
    let frame_count = video_stream["nb_frames"]
        .as_str()
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            let duration: f64 = data["format"]["duration"]
                .as_str()
                .and_then(|s| s.parse().ok())
                .unwrap_or(0.0);
            (duration * fps).round() as u64
        });

    let info = VideoStreamInfo { fps, frame_count };
    debug!(
        "probed {}: {:.2}fps, {} frames, {:.2}s",
        video_path.display(),
        info.fps,
        info.frame_count,
        info.duration_seconds()
    );

    Ok(info)
}

/// Parse ffprobe's rational frame rate ("30000/1001" or a plain number)
fn parse_frame_rate(s: &str) -> Option<f64> {
    let parts: Vec<&str> = s.split('/').collect();
    if parts.len() == 2 {
        let num: f64 = parts[0].parse().ok()?;
        let den: f64 = parts[1].parse().ok()?;
        if den == 0.0 {
            return None;
        }
        Some(num / den)
    } else {
        s.parse().ok()
    }
}
