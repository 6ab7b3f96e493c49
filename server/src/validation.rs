use serde::Deserialize;

use speech_core::{SpeechModel, SynthesisRequest, Voice, MAX_INPUT_CHARS};

use crate::error::ApiError;

/// Wire shape of the synthesis endpoint. Handlers never act on this
/// directly; [`validate_synthesis_request`] turns it into a typed
/// [`SynthesisRequest`] or a validation error.
#[derive(Debug, Deserialize)]
pub struct RawSynthesisRequest {
    pub text: Option<String>,
    pub voice: Option<String>,
    pub model: Option<String>,
}

/// Validate a raw payload into a typed request.
///
/// Checks run in a fixed order: text presence, text length, voice, model.
/// `voice` and `model` fall back to their documented defaults when absent.
pub fn validate_synthesis_request(raw: RawSynthesisRequest) -> Result<SynthesisRequest, ApiError> {
    let text = raw.text.unwrap_or_default();
    if text.is_empty() {
        return Err(ApiError::InvalidInput("Text cannot be empty".to_string()));
    }
    if text.chars().count() > MAX_INPUT_CHARS {
        return Err(ApiError::InvalidInput(format!(
            "Text exceeds maximum length of {} characters",
            MAX_INPUT_CHARS
        )));
    }

    let voice = match raw.voice {
        Some(voice) => voice
            .parse::<Voice>()
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?,
        None => Voice::default(),
    };

    let model = match raw.model {
        Some(model) => model
            .parse::<SpeechModel>()
            .map_err(|e| ApiError::InvalidInput(e.to_string()))?,
        None => SpeechModel::default(),
    };

    SynthesisRequest::new(text, voice, model).map_err(|e| ApiError::InvalidInput(e.to_string()))
}
