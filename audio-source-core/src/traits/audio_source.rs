use crate::models::error::SourceError;
use crate::models::state::PlaybackState;
use crate::traits::frame_reader::FrameReader;
use crate::traits::terminal::Terminal;

/// A pausable, restartable producer of audio frames.
///
/// Shared between one production context (pulling via [`FrameReader::read`])
/// and a control context issuing the methods below, usually as
/// `Arc<dyn AudioSource>`.
///
/// Implemented by:
/// - `ManagedSource<MemoryBackend>` (clip / file-like)
/// - `ManagedSource<StreamBackend>` (live network-like)
pub trait AudioSource: Terminal + FrameReader + Send + Sync {
    /// Current playback state. Never blocks, never fails.
    fn state(&self) -> PlaybackState;

    /// Suspend production. Idempotent; faults are deferred to the next
    /// `resume()`.
    fn pause(&self);

    /// Resume after `pause()`. A no-op success when already running.
    ///
    /// On failure the state is not `Playing`.
    fn resume(&self) -> Result<(), SourceError>;

    /// Rewind to the beginning of the stream, resuming if paused.
    ///
    /// On success the state is `Playing` or `Idle`; on failure it is not
    /// `Playing`.
    fn restart(&self) -> Result<(), SourceError>;
}
