pub mod recognizer;
pub mod segmenter;
pub mod srt;

pub use recognizer::ParaformerRecognizer;
pub use segmenter::segment_sentences;
pub use srt::{SrtDocument, SubtitleCue};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

/// One recognized word with timing, as delivered by the external recognizer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Word {
    #[serde(default)]
    pub text: String,
    /// Trailing punctuation attached to this word, possibly empty
    #[serde(default)]
    pub punctuation: String,
    #[serde(rename = "begin_time", default)]
    pub begin_ms: u64,
    #[serde(rename = "end_time", default)]
    pub end_ms: u64,
}

/// One recognizer utterance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sentence {
    #[serde(default)]
    pub words: Vec<Word>,
}

/// Errors from the speech recognition request
#[derive(Debug, Error)]
pub enum RecognitionError {
    #[error("speech recognition failed: {0}")]
    Provider(String),

    #[error("audio file not found: {0}")]
    AudioNotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("recognizer request error: {0}")]
    Http(#[from] reqwest::Error),
}

/// External speech recognizer contract: audio in, word-timed sentences out
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn recognize(&self, audio_path: &Path) -> Result<Vec<Sentence>, RecognitionError>;
}

/// Audio-to-SRT transcription request flow.
///
/// A recognizer failure is fatal to the whole request: no partial SRT is
/// produced.
pub struct Transcriber {
    recognizer: Box<dyn SpeechRecognizer>,
}

impl Transcriber {
    pub fn new(recognizer: Box<dyn SpeechRecognizer>) -> Self {
        Self { recognizer }
    }

    /// Recognize the audio and segment the word timing into an SRT document
    pub async fn transcribe(&self, audio_path: &Path) -> Result<SrtDocument, RecognitionError> {
        let sentences = self.recognizer.recognize(audio_path).await?;
        info!("🗣️ Recognized {} sentences from {}", sentences.len(), audio_path.display());

        let cues = segment_sentences(&sentences);
        info!("✅ Segmented into {} subtitle cues", cues.len());

        Ok(SrtDocument::from_cues(cues))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CannedRecognizer {
        sentences: Vec<Sentence>,
    }

    #[async_trait]
    impl SpeechRecognizer for CannedRecognizer {
        async fn recognize(&self, _audio_path: &Path) -> Result<Vec<Sentence>, RecognitionError> {
            Ok(self.sentences.clone())
        }
    }

    struct FailingRecognizer;

    #[async_trait]
    impl SpeechRecognizer for FailingRecognizer {
        async fn recognize(&self, _audio_path: &Path) -> Result<Vec<Sentence>, RecognitionError> {
            Err(RecognitionError::Provider("503: overloaded".to_string()))
        }
    }

    #[tokio::test]
    async fn test_transcribe_produces_srt_document() {
        let transcriber = Transcriber::new(Box::new(CannedRecognizer {
            sentences: vec![Sentence {
                words: vec![
                    Word {
                        text: "Hello".to_string(),
                        punctuation: ",".to_string(),
                        begin_ms: 0,
                        end_ms: 500,
                    },
                    Word {
                        text: "world".to_string(),
                        punctuation: ".".to_string(),
                        begin_ms: 600,
                        end_ms: 1_200,
                    },
                ],
            }],
        }));

        let doc = transcriber.transcribe(Path::new("any.mp3")).await.unwrap();
        assert_eq!(doc.len(), 2);
        assert!(doc.render().contains("Hello,"));
    }

    #[tokio::test]
    async fn test_recognizer_failure_is_fatal() {
        let transcriber = Transcriber::new(Box::new(FailingRecognizer));
        let err = transcriber.transcribe(Path::new("any.mp3")).await.unwrap_err();
        assert!(matches!(err, RecognitionError::Provider(_)));
        assert!(err.to_string().contains("overloaded"));
    }

    #[test]
    fn test_word_deserializes_recognizer_payload() {
        let word: Word = serde_json::from_str(
            r#"{"text": "hi", "punctuation": "!", "begin_time": 10, "end_time": 40}"#,
        )
        .unwrap();
        assert_eq!(word.begin_ms, 10);
        assert_eq!(word.end_ms, 40);
        assert_eq!(word.punctuation, "!");
    }
}
