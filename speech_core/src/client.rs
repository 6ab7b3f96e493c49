use bytes::Bytes;
use futures_util::future::BoxFuture;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::types::SynthesisRequest;

/// Default base URL of the speech provider.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

const SPEECH_PATH: &str = "/v1/audio/speech";

/// Errors from a synthesis round trip.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with a non-success status. Status and message
    /// are reported exactly as received.
    #[error("speech provider returned {status}: {message}")]
    Api { status: u16, message: String },

    /// The request never produced a provider response.
    #[error("speech provider request failed: {0}")]
    Network(#[from] reqwest::Error),
}

/// A backend that turns a validated request into one complete MP3 payload.
pub trait Synthesizer: Send + Sync {
    fn synthesize<'a>(
        &'a self,
        request: &'a SynthesisRequest,
    ) -> BoxFuture<'a, Result<Bytes, ProviderError>>;
}

/// Wire shape of the provider's speech endpoint.
#[derive(Serialize)]
struct ProviderRequest<'a> {
    model: &'a str,
    voice: &'a str,
    input: &'a str,
    response_format: &'a str,
}

/// Client for the provider's non-streaming speech endpoint.
pub struct OpenAiSpeechClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiSpeechClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Point the client at a non-default provider URL, e.g. a local stand-in.
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), SPEECH_PATH)
    }
}

impl Synthesizer for OpenAiSpeechClient {
    fn synthesize<'a>(
        &'a self,
        request: &'a SynthesisRequest,
    ) -> BoxFuture<'a, Result<Bytes, ProviderError>> {
        Box::pin(async move {
            let body = ProviderRequest {
                model: request.model().as_str(),
                voice: request.voice().as_str(),
                input: request.text(),
                response_format: "mp3",
            };

            debug!(
                voice = %request.voice(),
                model = %request.model(),
                chars = request.text().chars().count(),
                "forwarding synthesis request to provider"
            );

            let response = self
                .http
                .post(self.endpoint())
                .bearer_auth(&self.api_key)
                .json(&body)
                .send()
                .await?;

            let status = response.status();
            let bytes = response.bytes().await?;

            if !status.is_success() {
                return Err(ProviderError::Api {
                    status: status.as_u16(),
                    message: provider_message(&bytes),
                });
            }

            Ok(bytes)
        })
    }
}

/// Extract the human-readable message from a provider error body. The
/// provider wraps failures as `{"error": {"message": ...}}`; anything else
/// is reported as-is.
fn provider_message(body: &[u8]) -> String {
    if let Ok(value) = serde_json::from_slice::<serde_json::Value>(body) {
        if let Some(message) = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return message.to_string();
        }
    }

    let raw = String::from_utf8_lossy(body);
    let raw = raw.trim();
    if raw.is_empty() {
        "unknown provider error".to_string()
    } else {
        raw.to_string()
    }
}
