use crate::models::audio_models::TerminalInfo;
use crate::models::error::SourceError;

/// The device, stream or file a managed source drives.
///
/// Calls are serialized by the owning `ManagedSource`; a backend never sees
/// two calls at once.
pub trait SourceBackend: Send {
    /// Identity of the terminal this backend binds.
    fn info(&self) -> TerminalInfo;

    /// Acquire the terminal. Called once, before the first pull.
    fn open(&mut self) -> Result<(), SourceError> {
        Ok(())
    }

    /// Release the terminal. Called exactly once.
    fn close(&mut self);

    /// Stop the terminal from advancing while paused. May be called on an
    /// already suspended backend.
    fn suspend(&mut self) -> Result<(), SourceError> {
        Ok(())
    }

    /// Reactivate after `suspend()`. May be called on a backend whose
    /// `suspend()` failed.
    fn reactivate(&mut self) -> Result<(), SourceError> {
        Ok(())
    }

    /// Reposition to the beginning of the stream.
    fn rewind(&mut self) -> Result<(), SourceError>;

    /// Whether a pull made now would produce signal.
    fn has_signal(&self) -> bool;

    /// Write signal at the start of `buf` and return how many whole frames
    /// were written. The caller silences the rest.
    fn fill(&mut self, buf: &mut [f32]) -> Result<usize, SourceError>;
}
