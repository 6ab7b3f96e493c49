//! Client-side preview workflow.
//!
//! Owns the Idle -> Loading -> Previewed -> Finalized state machine behind
//! the browser form, the [`AudioHost`] capability trait that abstracts the
//! host environment, and a [`ProxyClient`] for driving the synthesis proxy
//! over HTTP.

mod host;
mod proxy;
mod session;

pub use host::AudioHost;
pub use proxy::ProxyClient;
pub use session::{run_preview, Phase, PreviewSession, SessionError};
