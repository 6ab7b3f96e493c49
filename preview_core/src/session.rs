use bytes::Bytes;
use chrono::Utc;
use thiserror::Error;
use tracing::debug;

use speech_core::{
    ProviderError, RequestError, SpeechModel, SynthesisRequest, Synthesizer, Voice,
    MAX_INPUT_CHARS,
};

use crate::host::AudioHost;

/// Message shown when a failure carries no usable error text.
const GENERIC_FAILURE: &str = "Failed to generate speech";

/// Where the session currently is in the preview workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Previewed,
    Finalized,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("text cannot be empty")]
    EmptyText,
    #[error("text exceeds maximum length of {MAX_INPUT_CHARS} characters")]
    TextTooLong,
    #[error("a preview request is already in flight")]
    PreviewInFlight,
    #[error("no preview request is in flight")]
    NotLoading,
    #[error("no preview audio to finalize")]
    NothingToFinalize,
    #[error("audio must be finalized before download")]
    NotFinalized,
    #[error("{0}")]
    Synthesis(String),
    #[error("host operation failed: {0}")]
    Host(#[source] anyhow::Error),
}

struct HeldAudio<H> {
    bytes: Bytes,
    handle: H,
}

/// The preview -> finalize -> download state machine.
///
/// The session never performs I/O itself: synthesis results are fed in
/// through [`PreviewSession::complete_preview`] / [`PreviewSession::fail_preview`]
/// (or the [`run_preview`] driver), and all host-environment effects go
/// through an [`AudioHost`]. At most one audio reference is held at a time;
/// the previous one is always released before a new request starts.
pub struct PreviewSession<H: AudioHost> {
    text: String,
    voice: Voice,
    model: SpeechModel,
    phase: Phase,
    audio: Option<HeldAudio<H::Handle>>,
    last_error: Option<String>,
}

impl<H: AudioHost> Default for PreviewSession<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: AudioHost> PreviewSession<H> {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            voice: Voice::default(),
            model: SpeechModel::default(),
            phase: Phase::Idle,
            audio: None,
            last_error: None,
        }
    }

    /// Held preview audio does not change when inputs are edited; the stale
    /// preview stays playable until the next request replaces it.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn set_voice(&mut self, voice: Voice) {
        self.voice = voice;
    }

    pub fn set_model(&mut self, model: SpeechModel) {
        self.model = model;
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

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn preview_audio(&self) -> Option<&[u8]> {
        self.audio.as_ref().map(|held| held.bytes.as_ref())
    }

    pub fn playable_handle(&self) -> Option<&H::Handle> {
        self.audio.as_ref().map(|held| &held.handle)
    }

    /// Characters left before the input limit; negative when over it.
    pub fn remaining_chars(&self) -> i64 {
        MAX_INPUT_CHARS as i64 - self.text.chars().count() as i64
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        self.phase != Phase::Loading
            && !self.text.trim().is_empty()
            && self.text.chars().count() <= MAX_INPUT_CHARS
    }

    /// Start a new preview. Guards the input locally, releases any
    /// previously held audio, and returns the validated request to send.
    /// A guard failure leaves the session untouched and reaches no network.
    pub fn begin_preview(&mut self, host: &mut H) -> Result<SynthesisRequest, SessionError> {
        if self.phase == Phase::Loading {
            return Err(SessionError::PreviewInFlight);
        }
        if self.text.trim().is_empty() {
            return Err(SessionError::EmptyText);
        }
        let request = match SynthesisRequest::new(self.text.clone(), self.voice, self.model) {
            Ok(request) => request,
            Err(RequestError::TextTooLong) => return Err(SessionError::TextTooLong),
            Err(_) => return Err(SessionError::EmptyText),
        };

        if let Some(held) = self.audio.take() {
            host.release(held.handle);
        }
        self.phase = Phase::Loading;
        self.last_error = None;
        Ok(request)
    }

    /// Accept the synthesized audio for the in-flight preview.
    pub fn complete_preview(&mut self, host: &mut H, audio: Bytes) -> Result<(), SessionError> {
        if self.phase != Phase::Loading {
            return Err(SessionError::NotLoading);
        }
        let handle = match host.create_playable_handle(&audio) {
            Ok(handle) => handle,
            Err(err) => {
                self.phase = Phase::Idle;
                self.last_error = Some(err.to_string());
                return Err(SessionError::Host(err));
            }
        };
        debug!(bytes = audio.len(), "preview audio ready");
        self.audio = Some(HeldAudio {
            bytes: audio,
            handle,
        });
        self.phase = Phase::Previewed;
        Ok(())
    }

    /// Record a failed preview. The session returns to Idle and keeps the
    /// message for display; no audio is held afterwards.
    pub fn fail_preview(&mut self, message: impl Into<String>) {
        if self.phase == Phase::Loading {
            self.phase = Phase::Idle;
        }
        self.last_error = Some(message.into());
    }

    /// Mark the current preview as final. Purely local; unlocks download.
    pub fn finalize(&mut self) -> Result<(), SessionError> {
        if self.phase != Phase::Previewed || self.audio.is_none() {
            return Err(SessionError::NothingToFinalize);
        }
        self.phase = Phase::Finalized;
        Ok(())
    }

    /// Save the finalized audio through the host under a timestamped
    /// filename. Repeatable; the session stays Finalized.
    pub fn download(&mut self, host: &mut H) -> Result<String, SessionError> {
        if self.phase != Phase::Finalized {
            return Err(SessionError::NotFinalized);
        }
        let held = self.audio.as_ref().ok_or(SessionError::NotFinalized)?;
        let filename = format!("speech-{}.mp3", Utc::now().timestamp_millis());
        host.persist(&held.bytes, &filename)
            .map_err(SessionError::Host)?;
        Ok(filename)
    }

    /// End the session, releasing any held audio.
    pub fn close(&mut self, host: &mut H) {
        if let Some(held) = self.audio.take() {
            host.release(held.handle);
        }
        self.phase = Phase::Idle;
        self.last_error = None;
    }
}

/// Drive one full preview round trip against a backend: guard, synthesize,
/// then settle the session with the result.
pub async fn run_preview<H, S>(
    session: &mut PreviewSession<H>,
    host: &mut H,
    backend: &S,
) -> Result<(), SessionError>
where
    H: AudioHost,
    S: Synthesizer + ?Sized,
{
    let request = session.begin_preview(host)?;
    match backend.synthesize(&request).await {
        Ok(audio) => session.complete_preview(host, audio),
        Err(err) => {
            let message = display_message(&err);
            session.fail_preview(message.clone());
            Err(SessionError::Synthesis(message))
        }
    }
}

/// User-facing message for a failed synthesis: the error reported by the
/// endpoint when there is one, a generic fallback otherwise.
fn display_message(err: &ProviderError) -> String {
    match err {
        ProviderError::Api { message, .. } if !message.trim().is_empty() => message.clone(),
        _ => GENERIC_FAILURE.to_string(),
    }
}
