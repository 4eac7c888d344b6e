//! # audio-source-core
//!
//! Pull-based audio source contract and its playback state machine.
//!
//! Every producer of samples (network receiver, capture device, file reader)
//! exposes the same [`AudioSource`] surface so a driving engine can pull from
//! it and pause, resume or restart it from another thread. Concrete terminals
//! implement the small [`SourceBackend`] trait and are wrapped by
//! [`ManagedSource`], which owns the state machine and its synchronization.
//!
//! ## Architecture
//!
//! ```text
//! audio-source-core (this crate)
//! ├── traits/       ← AudioSource, FrameReader, Terminal, SourceBackend, SourceDelegate
//! ├── models/       ← PlaybackState, SourceError, StreamSpec, TerminalInfo, configuration
//! ├── processing/   ← RingBuffer
//! ├── source/       ← ManagedSource (state machine over any backend)
//! ├── backends/     ← MemoryBackend (clip), StreamBackend + StreamWriter (live)
//! └── driver/       ← SourcePump (production thread)
//! ```
//!
//! ## Usage
//! ```
//! use audio_source_core::{
//!     AudioSource, FrameReader, ManagedSource, MemoryBackend, PlaybackState, StreamSpec,
//! };
//!
//! let clip = MemoryBackend::new("beep", StreamSpec::new(48000, 1), vec![0.5f32; 480]).unwrap();
//! let source = ManagedSource::open(clip).unwrap();
//!
//! let mut buf = [0.0f32; 240];
//! assert_eq!(source.read(&mut buf), Ok(240));
//!
//! source.pause();
//! assert_eq!(source.state(), PlaybackState::Paused);
//! assert!(source.restart().is_ok());
//! assert_eq!(source.state(), PlaybackState::Playing);
//! ```

pub mod backends;
pub mod driver;
pub mod models;
pub mod processing;
pub mod source;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use backends::memory::MemoryBackend;
pub use backends::stream::{StreamBackend, StreamWriter};
pub use driver::pump::{FrameSink, PumpStats, SourcePump};
pub use models::audio_models::{
    ChannelLayout, SourceDiagnostics, StreamSpec, TerminalInfo, TerminalKind,
};
pub use models::config::{PumpConfiguration, StreamConfiguration, MAX_BUFFER_SAMPLES};
pub use models::error::SourceError;
pub use models::state::{PlaybackState, StateCell};
pub use processing::ring_buffer::RingBuffer;
pub use source::managed::ManagedSource;
pub use traits::audio_source::AudioSource;
pub use traits::backend::SourceBackend;
pub use traits::frame_reader::FrameReader;
pub use traits::source_delegate::SourceDelegate;
pub use traits::terminal::Terminal;
