use crate::config::DEFAULT_MODEL;
use crate::error::{Result, SlidecastError};
use crate::speech::{AudioByteStream, SpeechSynthesizer};
use async_trait::async_trait;
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// OpenAI speech synthesis endpoint.
const SPEECH_API_URL: &str = "https://api.openai.com/v1/audio/speech";

/// OpenAI text-to-speech client.
pub struct OpenAiSpeechClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    speed: Option<f32>,
}

impl OpenAiSpeechClient {
    /// Create a new speech client with the given API key.
    pub fn new(api_key: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: SPEECH_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            speed: None,
        }
    }

    /// Set the synthesis model (e.g. "tts-1", "tts-1-hd").
    pub fn with_model(mut self, model: String) -> Self {
        self.model = model;
        self
    }

    /// Set the playback speed multiplier passed through to the service.
    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = Some(speed);
        self
    }

    /// Override the endpoint URL. Used by tests to point at a mock server.
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiSpeechClient {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<AudioByteStream> {
        let request = SpeechRequest {
            model: &self.model,
            input: text,
            voice,
            speed: self.speed,
        };

        let response = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        debug!("Speech API response status: {}", status);

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();

            // Try to parse API error
            if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&error_body) {
                return Err(SlidecastError::Api(format!(
                    "Speech API error: {} ({})",
                    api_error.error.message, api_error.error.r#type
                )));
            }

            return Err(SlidecastError::Api(format!(
                "Speech API error ({}): {}",
                status, error_body
            )));
        }

        let stream = response.bytes_stream().map_err(SlidecastError::Http);
        Ok(Box::pin(stream))
    }

    fn name(&self) -> &'static str {
        "OpenAI Speech"
    }
}

// API request/response types

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    speed: Option<f32>,
}

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_omitted_when_unset() {
        let request = SpeechRequest {
            model: "tts-1",
            input: "hello",
            voice: "onyx",
            speed: None,
        };
        let body = serde_json::to_string(&request).unwrap();
        assert!(!body.contains("speed"));
    }

    #[test]
    fn test_speed_serialized_when_set() {
        let request = SpeechRequest {
            model: "tts-1",
            input: "hello",
            voice: "nova",
            speed: Some(1.25),
        };
        let body = serde_json::to_string(&request).unwrap();
        assert!(body.contains("\"speed\":1.25"));
        assert!(body.contains("\"voice\":\"nova\""));
    }

    #[test]
    fn test_client_builders() {
        let client = OpenAiSpeechClient::new("sk-test".to_string())
            .with_model("tts-1-hd".to_string())
            .with_speed(0.9);
        assert_eq!(client.model, "tts-1-hd");
        assert_eq!(client.speed, Some(0.9));
        assert_eq!(client.name(), "OpenAI Speech");
    }
}
