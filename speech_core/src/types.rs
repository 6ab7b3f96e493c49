use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum input length accepted by the provider, in characters.
pub const MAX_INPUT_CHARS: usize = 4096;

/// The provider's built-in voices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    #[default]
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl Voice {
    pub const ALL: [Voice; 6] = [
        Voice::Alloy,
        Voice::Echo,
        Voice::Fable,
        Voice::Onyx,
        Voice::Nova,
        Voice::Shimmer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Shimmer => "shimmer",
        }
    }
}

impl fmt::Display for Voice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid voice '{0}': must be one of alloy, echo, fable, onyx, nova, shimmer")]
pub struct InvalidVoice(pub String);

impl FromStr for Voice {
    type Err = InvalidVoice;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Voice::ALL
            .iter()
            .copied()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| InvalidVoice(s.to_string()))
    }
}

/// Synthesis quality tiers offered by the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpeechModel {
    #[default]
    #[serde(rename = "tts-1")]
    Standard,
    #[serde(rename = "tts-1-hd")]
    HighDefinition,
}

impl SpeechModel {
    pub const ALL: [SpeechModel; 2] = [SpeechModel::Standard, SpeechModel::HighDefinition];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpeechModel::Standard => "tts-1",
            SpeechModel::HighDefinition => "tts-1-hd",
        }
    }
}

impl fmt::Display for SpeechModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid model '{0}': must be one of tts-1, tts-1-hd")]
pub struct InvalidModel(pub String);

impl FromStr for SpeechModel {
    type Err = InvalidModel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SpeechModel::ALL
            .iter()
            .copied()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| InvalidModel(s.to_string()))
    }
}

/// Violations of the synthesis request invariants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("text cannot be empty")]
    EmptyText,
    #[error("text exceeds maximum length of {MAX_INPUT_CHARS} characters")]
    TextTooLong,
    #[error(transparent)]
    Voice(#[from] InvalidVoice),
    #[error(transparent)]
    Model(#[from] InvalidModel),
}

/// A validated synthesis request. Constructed only through [`SynthesisRequest::new`],
/// so any value of this type satisfies the text length invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    text: String,
    voice: Voice,
    model: SpeechModel,
}

impl SynthesisRequest {
    pub fn new(
        text: impl Into<String>,
        voice: Voice,
        model: SpeechModel,
    ) -> Result<Self, RequestError> {
        let text = text.into();
        if text.is_empty() {
            return Err(RequestError::EmptyText);
        }
        if text.chars().count() > MAX_INPUT_CHARS {
            return Err(RequestError::TextTooLong);
        }
        Ok(Self { text, voice, model })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn voice(&self) -> Voice {
        self.voice
    }

    pub fn model(&self) -> SpeechModel {
        self.model
    }
}
