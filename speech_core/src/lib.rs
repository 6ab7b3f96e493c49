//! Provider-facing types and client for speech synthesis.
//!
//! The [`Synthesizer`] trait is the seam between request handling and any
//! concrete backend: the HTTP server talks to the provider through it, and
//! client code talks to the server through the same trait.

mod client;
mod types;

pub use client::{OpenAiSpeechClient, ProviderError, Synthesizer, DEFAULT_BASE_URL};
pub use types::{
    InvalidModel, InvalidVoice, RequestError, SpeechModel, SynthesisRequest, Voice,
    MAX_INPUT_CHARS,
};
