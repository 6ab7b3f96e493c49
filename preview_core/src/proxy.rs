use bytes::Bytes;
use futures_util::future::BoxFuture;
use serde::Serialize;

use speech_core::{ProviderError, SpeechModel, SynthesisRequest, Synthesizer, Voice};

const SYNTHESIS_PATH: &str = "/api/text-to-speech";

/// Wire shape of the proxy's synthesis endpoint.
#[derive(Serialize)]
struct WireRequest<'a> {
    text: &'a str,
    voice: Voice,
    model: SpeechModel,
}

/// HTTP client for the synthesis proxy endpoint.
///
/// The Rust counterpart of the browser form's fetch call: posts the request,
/// hands back the MP3 bytes, and surfaces the proxy's `error` field on
/// failure. Implements [`Synthesizer`] so a [`crate::PreviewSession`] can be
/// driven against the proxy or the provider interchangeably.
pub struct ProxyClient {
    http: reqwest::Client,
    base_url: String,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), SYNTHESIS_PATH)
    }
}

impl Synthesizer for ProxyClient {
    fn synthesize<'a>(
        &'a self,
        request: &'a SynthesisRequest,
    ) -> BoxFuture<'a, Result<Bytes, ProviderError>> {
        Box::pin(async move {
            let body = WireRequest {
                text: request.text(),
                voice: request.voice(),
                model: request.model(),
            };

            let response = self.http.post(self.endpoint()).json(&body).send().await?;
            let status = response.status();
            let bytes = response.bytes().await?;

            if !status.is_success() {
                return Err(ProviderError::Api {
                    status: status.as_u16(),
                    message: proxy_message(&bytes),
                });
            }

            Ok(bytes)
        })
    }
}

/// Pull the `error` field out of a proxy error body, with a generic fallback
/// when the body is not the expected JSON shape.
fn proxy_message(body: &[u8]) -> String {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("error")
                .and_then(|e| e.as_str())
                .map(str::to_string)
        })
        .unwrap_or_else(|| "Failed to generate speech".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proxy_message_reads_error_field() {
        let body = br#"{"error":"Text cannot be empty","code":400}"#;
        assert_eq!(proxy_message(body), "Text cannot be empty");
    }

    #[test]
    fn proxy_message_falls_back_on_unexpected_body() {
        assert_eq!(proxy_message(b"<html>bad gateway</html>"), "Failed to generate speech");
        assert_eq!(proxy_message(b"{}"), "Failed to generate speech");
    }

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let client = ProxyClient::new("http://localhost:8080/");
        assert_eq!(client.endpoint(), "http://localhost:8080/api/text-to-speech");
    }

    #[test]
    fn wire_request_serializes_enum_values() {
        let request = SynthesisRequest::new("hi", Voice::Shimmer, SpeechModel::Standard).unwrap();
        let body = WireRequest {
            text: request.text(),
            voice: request.voice(),
            model: request.model(),
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["voice"], "shimmer");
        assert_eq!(json["model"], "tts-1");
    }
}
