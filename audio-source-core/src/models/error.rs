use thiserror::Error;

/// Errors surfaced by audio sources and their backends.
///
/// Control operations (`resume`, `restart`) report these instead of a bare
/// boolean; `Result::is_ok` keeps the success/failure split.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    #[error("device busy")]
    DeviceBusy,

    #[error("resource gone")]
    ResourceGone,

    #[error("end of stream")]
    EndOfStream,

    #[error("source closed")]
    Closed,

    #[error("buffer of {len} samples is not a whole number of {channels}-channel frames")]
    InvalidBuffer { len: usize, channels: u16 },

    #[error("configuration failed: {0}")]
    ConfigurationFailed(String),

    #[error("backend error: {0}")]
    Backend(String),

    /// A fault absorbed by `pause()` and reported on the next control call.
    #[error("deferred fault: {0}")]
    DeferredFault(Box<SourceError>),

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl SourceError {
    /// Whether retrying the same control operation may succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::DeviceBusy | Self::ResourceGone | Self::Backend(_) => true,
            Self::DeferredFault(_) => true,
            Self::EndOfStream
            | Self::Closed
            | Self::InvalidBuffer { .. }
            | Self::ConfigurationFailed(_)
            | Self::Unknown(_) => false,
        }
    }
}
