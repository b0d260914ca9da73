/// Video Notes - Rust Implementation
///
/// Turns a video's subtitle track into a structured, illustrated note
/// document: an LLM segments the subtitles into titled sections, and every
/// embedded timestamp marker is resolved to a sharp representative frame
/// extracted from the video.

pub mod config;
pub mod frames;
pub mod library;
pub mod llm;
pub mod notes;
pub mod timecode;
pub mod transcription;

// Re-export main types for easy access
pub use crate::config::Config;
pub use crate::frames::{FrameError, FrameExtractor, FrameExtractorConfig, FrameSource};
pub use crate::library::{Video, VideoLibrary};
pub use crate::llm::segmentation::{NoteStyle, SubtitleAnalyzer};
pub use crate::llm::{LLMConfig, LLMProvider};
pub use crate::notes::{GenerationError, Note, NoteGenerationResult, NoteGenerator, Section};
pub use crate::timecode::{
    millis_to_timecode, normalize_timestamp, timecode_to_seconds, TimecodeError,
};
pub use crate::transcription::{
    segment_sentences, ParaformerRecognizer, RecognitionError, Sentence, SpeechRecognizer,
    SrtDocument, SubtitleCue, Transcriber, Word,
};
