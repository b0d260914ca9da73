//! Sharpness-aware single-frame extraction from video files.
//!
//! Strategy:
//! 1. Bound the requested offset by the probed stream duration
//! 2. Decode one frame per attempt, stepping forward on blur or decode failure
//! 3. Score each decode by Laplacian variance and keep the sharpest seen
//! 4. Accept early once a frame clears the blur threshold

pub mod extractor;
pub mod probe;
pub mod sharpness;

pub use extractor::{FrameExtractor, FrameExtractorConfig, FrameSource, MockFrameSource};
pub use probe::{probe_video, VideoStreamInfo};
pub use sharpness::laplacian_variance;

use std::path::PathBuf;

/// Errors for single-frame extraction
#[derive(thiserror::Error, Debug)]
pub enum FrameError {
    #[error("cannot open video file {path}: {reason}")]
    VideoOpen { path: PathBuf, reason: String },

    #[error("frame decode failed: {0}")]
    Decode(String),

    #[error("no frame decoded near {seconds:.2}s after {attempts} attempts")]
    NoFrameDecoded { seconds: f64, attempts: u32 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
}
