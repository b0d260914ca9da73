use anyhow::{anyhow, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use super::{RecognitionError, Sentence, SpeechRecognizer};
use crate::config::RecognitionConfig;

/// Word-timed recognizer speaking a Paraformer-style REST protocol.
///
/// The service takes the raw audio plus recognition parameters and answers
/// with sentence records carrying word-level timing.
pub struct ParaformerRecognizer {
    config: RecognitionConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RecognitionResponse {
    #[serde(default)]
    sentences: Vec<Sentence>,
}

impl ParaformerRecognizer {
    pub fn new(config: RecognitionConfig) -> Result<Self> {
        if config.endpoint.is_none() {
            return Err(anyhow!("recognizer endpoint not configured"));
        }
        if config.api_key.is_none() {
            return Err(anyhow!("recognizer API key not configured"));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self { config, client })
    }
}

#[async_trait]
impl SpeechRecognizer for ParaformerRecognizer {
    async fn recognize(&self, audio_path: &Path) -> Result<Vec<Sentence>, RecognitionError> {
        if !audio_path.exists() {
            return Err(RecognitionError::AudioNotFound(audio_path.to_path_buf()));
        }

        let endpoint = self.config.endpoint.as_deref().unwrap_or_default();
        let api_key = self.config.api_key.as_deref().unwrap_or_default();

        info!("🎤 Recognizing {} with model {}", audio_path.display(), self.config.model);

        let file_name = audio_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "audio".to_string());
        let audio = tokio::fs::read(audio_path).await?;

        let form = reqwest::multipart::Form::new()
            .text("model", self.config.model.clone())
            .text("sample_rate", self.config.sample_rate.to_string())
            .text("language_hints", self.config.language_hints.join(","))
            .text("enable_words", "true")
            .part(
                "file",
                reqwest::multipart::Part::bytes(audio).file_name(file_name),
            );

        let response = self
            .client
            .post(endpoint)
            .bearer_auth(api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = response.text().await.unwrap_or_default();
            return Err(RecognitionError::Provider(format!("{}: {}", status, message)));
        }

        let body: RecognitionResponse = response.json().await?;
        debug!("recognizer returned {} sentences", body.sentences.len());

        Ok(body.sentences)
    }
}
