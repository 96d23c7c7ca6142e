use crate::core::config::Config;
use crate::errors::MyError;
use async_trait::async_trait;
use log::{debug, info};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tempfile::NamedTempFile;

pub const TRANSCRIPTION_LANGUAGE: &str = "pt";

/// Downloaded audio kept on disk only while this value lives.
pub struct AudioFile {
    file: NamedTempFile,
}

impl AudioFile {
    pub fn write(data: &[u8]) -> Result<Self, MyError> {
        let mut file = tempfile::Builder::new()
            .prefix("gastos-")
            .suffix(".ogg")
            .tempfile()?;
        file.write_all(data)?;
        file.flush()?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Speech in the file at `audio` as trimmed text, possibly empty.
    async fn transcribe(&self, audio: &Path) -> Result<String, MyError>;
}

#[derive(Deserialize)]
struct TranscriptionResponse {
    #[serde(default)]
    text: String,
}

/// Client for a Whisper-compatible `audio/transcriptions` endpoint.
pub struct WhisperTranscriber {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
}

impl WhisperTranscriber {
    pub fn new(config: &Config) -> Result<Self, MyError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.get_stt_api_url().to_owned(),
            api_key: config.get_stt_api_key().map(str::to_owned),
            model: config.get_stt_model().to_owned(),
        })
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, audio: &Path) -> Result<String, MyError> {
        let data = tokio::fs::read(audio).await?;
        info!("Transcribing {} bytes of audio", data.len());

        let file_name = audio
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("audio.ogg")
            .to_owned();
        let part = Part::bytes(data)
            .file_name(file_name)
            .mime_str("audio/ogg")?;
        let form = Form::new()
            .text("model", self.model.clone())
            .text("language", TRANSCRIPTION_LANGUAGE)
            .text("response_format", "json")
            .part("file", part);

        let mut request = self.client.post(&self.endpoint).multipart(form);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MyError::Transcription(format!("{}: {}", status, body)));
        }

        let body: TranscriptionResponse = response.json().await?;
        let text = body.text.trim().to_owned();
        debug!("Transcription: {:?}", text);
        Ok(text)
    }
}
