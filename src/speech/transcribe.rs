use crate::error::{Result, SlidecastError};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// OpenAI transcription endpoint.
const TRANSCRIPTION_API_URL: &str = "https://api.openai.com/v1/audio/transcriptions";

/// Transcription model.
const TRANSCRIPTION_MODEL: &str = "whisper-1";

/// Maximum file size accepted by the transcription API (25 MB).
const MAX_FILE_SIZE: u64 = 25 * 1024 * 1024;

/// Response formats supported by the transcription service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Text,
    Srt,
    Vtt,
    VerboseJson,
    Json,
}

impl ResponseFormat {
    fn as_str(&self) -> &'static str {
        match self {
            ResponseFormat::Text => "text",
            ResponseFormat::Srt => "srt",
            ResponseFormat::Vtt => "vtt",
            ResponseFormat::VerboseJson => "verbose_json",
            ResponseFormat::Json => "json",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ResponseFormat::Text => "txt",
            ResponseFormat::Srt => "srt",
            ResponseFormat::Vtt => "vtt",
            ResponseFormat::VerboseJson | ResponseFormat::Json => "json",
        }
    }
}

impl std::fmt::Display for ResponseFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ResponseFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ResponseFormat::Text),
            "srt" => Ok(ResponseFormat::Srt),
            "vtt" => Ok(ResponseFormat::Vtt),
            "verbose_json" => Ok(ResponseFormat::VerboseJson),
            "json" => Ok(ResponseFormat::Json),
            _ => Err(format!(
                "Unknown format: {}. Use 'text', 'srt', 'vtt', 'verbose_json', or 'json'",
                s
            )),
        }
    }
}

/// Default output path for a transcript: the audio path with the format's
/// extension swapped in.
pub fn default_transcript_path(audio: &Path, format: ResponseFormat) -> PathBuf {
    audio.with_extension(format.extension())
}

/// OpenAI speech-to-text client.
pub struct TranscriptionClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    language: Option<String>,
    prompt: Option<String>,
    temperature: f32,
}

impl TranscriptionClient {
    /// Create a new transcription client with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: TRANSCRIPTION_API_URL.to_string(),
            language: None,
            prompt: None,
            temperature: 0.0,
        }
    }

    /// Set the source language (ISO 639-1 code).
    pub fn with_language(mut self, language: String) -> Self {
        self.language = Some(language);
        self
    }

    /// Set a prompt for vocabulary hints.
    pub fn with_prompt(mut self, prompt: String) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Set the decoding temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Override the endpoint URL. Used by tests to point at a mock server.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Build the multipart form for the API request.
    async fn build_form(&self, audio_path: &Path, format: ResponseFormat) -> Result<Form> {
        let file_bytes = fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.mp3")
            .to_string();

        let mime_type = match audio_path.extension().and_then(|e| e.to_str()) {
            Some("wav") => "audio/wav",
            Some("mp3") => "audio/mpeg",
            Some("m4a") => "audio/mp4",
            Some("flac") => "audio/flac",
            Some("ogg") => "audio/ogg",
            Some("webm") => "audio/webm",
            _ => "application/octet-stream",
        };

        let file_part = Part::bytes(file_bytes)
            .file_name(file_name)
            .mime_str(mime_type)?;

        let mut form = Form::new()
            .part("file", file_part)
            .text("model", TRANSCRIPTION_MODEL)
            .text("response_format", format.as_str())
            .text("temperature", self.temperature.to_string());

        if let Some(ref lang) = self.language {
            form = form.text("language", lang.clone());
        }

        if let Some(ref prompt) = self.prompt {
            form = form.text("prompt", prompt.clone());
        }

        Ok(form)
    }

    /// Transcribe an audio file, returning the raw response content in the
    /// requested format.
    pub async fn transcribe(&self, audio_path: &Path, format: ResponseFormat) -> Result<String> {
        if !audio_path.is_file() {
            return Err(SlidecastError::InputNotFound(
                audio_path.display().to_string(),
            ));
        }

        let metadata = fs::metadata(audio_path).await?;
        if metadata.len() > MAX_FILE_SIZE {
            return Err(SlidecastError::Transcription(format!(
                "File too large for transcription API: {} bytes (max {} bytes)",
                metadata.len(),
                MAX_FILE_SIZE
            )));
        }

        let form = self.build_form(audio_path, format).await?;

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        debug!("Transcription API response status: {}", status);

        if status.is_success() {
            return Ok(response.text().await?);
        }

        let error_body = response.text().await.unwrap_or_default();

        if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
            return Err(SlidecastError::Api(format!(
                "Transcription API error: {} ({})",
                api_error.error.message, api_error.error.r#type
            )));
        }

        Err(SlidecastError::Api(format!(
            "Transcription API error ({}): {}",
            status, error_body
        )))
    }

    /// Transcribe and write the result to a file, returning the output path.
    pub async fn transcribe_to_file(
        &self,
        audio_path: &Path,
        output: Option<&Path>,
        format: ResponseFormat,
    ) -> Result<PathBuf> {
        let content = self.transcribe(audio_path, format).await?;

        let out_path = output
            .map(Path::to_path_buf)
            .unwrap_or_else(|| default_transcript_path(audio_path, format));

        if let Some(parent) = out_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        fs::write(&out_path, content).await?;

        Ok(out_path)
    }
}

// API error response types

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
    r#type: String,
    #[allow(dead_code)]
    code: Option<String>,
}
