use anyhow::Result;

/// Host-environment capabilities the preview session depends on.
///
/// In a browser these map to object URLs and the temporary-anchor download
/// trick; tests use an in-memory host. Handles are owned by the host and must
/// be handed back through [`AudioHost::release`] when superseded.
pub trait AudioHost {
    /// Opaque reference to playable audio held by the host.
    type Handle;

    /// Turn raw audio bytes into something the host can play.
    fn create_playable_handle(&mut self, audio: &[u8]) -> Result<Self::Handle>;

    /// Give a handle back to the host, ending its lifetime.
    fn release(&mut self, handle: Self::Handle);

    /// Save the audio under the given filename using the host's native
    /// download/save mechanism.
    fn persist(&mut self, audio: &[u8], filename: &str) -> Result<()>;
}
