//! Common utilities for integration tests

use std::sync::{Arc, Mutex};

use axum::Router;
use bytes::Bytes;
use futures_util::future::BoxFuture;

use server::config::ServerConfig;
use server::{build_router, AppState};
use speech_core::{ProviderError, SynthesisRequest, Synthesizer};

pub enum MockResponse {
    Audio(&'static [u8]),
    ApiError { status: u16, message: &'static str },
}

/// Synthesizer stand-in that records the last request it saw.
pub struct MockSynthesizer {
    response: MockResponse,
    pub last_request: Mutex<Option<SynthesisRequest>>,
}

impl MockSynthesizer {
    pub fn audio(bytes: &'static [u8]) -> Arc<Self> {
        Arc::new(Self {
            response: MockResponse::Audio(bytes),
            last_request: Mutex::new(None),
        })
    }

    pub fn api_error(status: u16, message: &'static str) -> Arc<Self> {
        Arc::new(Self {
            response: MockResponse::ApiError { status, message },
            last_request: Mutex::new(None),
        })
    }
}

impl Synthesizer for MockSynthesizer {
    fn synthesize<'a>(
        &'a self,
        request: &'a SynthesisRequest,
    ) -> BoxFuture<'a, Result<Bytes, ProviderError>> {
        Box::pin(async move {
            *self.last_request.lock().unwrap() = Some(request.clone());
            match &self.response {
                MockResponse::Audio(bytes) => Ok(Bytes::from_static(bytes)),
                MockResponse::ApiError { status, message } => Err(ProviderError::Api {
                    status: *status,
                    message: message.to_string(),
                }),
            }
        })
    }
}

/// Create a test app instance. `None` simulates a missing provider
/// credential.
pub fn create_test_app(synthesizer: Option<Arc<MockSynthesizer>>) -> Router {
    let config = ServerConfig {
        api_key: synthesizer.as_ref().map(|_| "test-key".to_string()),
        ..ServerConfig::default()
    };
    let state = AppState::new(
        synthesizer.map(|s| s as Arc<dyn Synthesizer>),
        config,
    );
    build_router(state)
}
