use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::audio_models::{StreamSpec, TerminalInfo, TerminalKind};
use crate::models::config::StreamConfiguration;
use crate::models::error::SourceError;
use crate::processing::ring_buffer::RingBuffer;
use crate::traits::backend::SourceBackend;

/// State shared between the backend and its writers.
#[derive(Debug)]
struct StreamShared {
    spec: StreamSpec,
    ring: Mutex<RingBuffer>,
    accepting: AtomicBool,
    closed: AtomicBool,
    discard_while_paused: bool,
    dropped_samples: AtomicU64,
}

/// Live stream source fed by a receiver thread.
///
/// Stands in for a network receiver: samples arrive through a
/// [`StreamWriter`] at their own pace and are buffered in a [`RingBuffer`]
/// sized from [`StreamConfiguration`]. Starvation yields silence, and
/// `rewind()` starts a fresh session by discarding everything buffered.
///
/// ```text
/// [receiver] → StreamWriter::write → [RingBuffer] → fill → [ManagedSource]
/// ```
#[derive(Debug)]
pub struct StreamBackend {
    info: TerminalInfo,
    shared: Arc<StreamShared>,
}

/// Cloneable handle pushing interleaved samples into a [`StreamBackend`].
#[derive(Debug, Clone)]
pub struct StreamWriter {
    shared: Arc<StreamShared>,
}

impl StreamBackend {
    /// Create a backend and the writer that feeds it.
    pub fn new(
        name: impl Into<String>,
        config: &StreamConfiguration,
    ) -> Result<(Self, StreamWriter), SourceError> {
        config.validate().map_err(SourceError::ConfigurationFailed)?;

        let shared = Arc::new(StreamShared {
            spec: config.spec,
            ring: Mutex::new(RingBuffer::new(config.buffer_capacity())),
            accepting: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            discard_while_paused: config.discard_while_paused,
            dropped_samples: AtomicU64::new(0),
        });
        let backend = Self {
            info: TerminalInfo::new(name, TerminalKind::Network, config.spec),
            shared: Arc::clone(&shared),
        };
        Ok((backend, StreamWriter { shared }))
    }

    /// Whole frames waiting to be pulled.
    pub fn buffered_frames(&self) -> usize {
        self.shared.spec.frames_in(self.shared.ring.lock().count())
    }
}

impl SourceBackend for StreamBackend {
    fn info(&self) -> TerminalInfo {
        self.info.clone()
    }

    fn open(&mut self) -> Result<(), SourceError> {
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(SourceError::Closed);
        }
        self.shared.accepting.store(true, Ordering::Release);
        Ok(())
    }

    fn close(&mut self) {
        self.shared.closed.store(true, Ordering::Release);
        self.shared.accepting.store(false, Ordering::Release);
        self.shared.ring.lock().reset();
    }

    fn suspend(&mut self) -> Result<(), SourceError> {
        self.shared.accepting.store(false, Ordering::Release);
        Ok(())
    }

    fn reactivate(&mut self) -> Result<(), SourceError> {
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(SourceError::ResourceGone);
        }
        self.shared.accepting.store(true, Ordering::Release);
        Ok(())
    }

    fn rewind(&mut self) -> Result<(), SourceError> {
        if self.shared.closed.load(Ordering::Acquire) {
            return Err(SourceError::ResourceGone);
        }
        self.shared.ring.lock().reset();
        Ok(())
    }

    fn has_signal(&self) -> bool {
        self.shared.ring.lock().count() >= self.shared.spec.channels as usize
    }

    fn fill(&mut self, buf: &mut [f32]) -> Result<usize, SourceError> {
        let spec = self.shared.spec;
        let wanted = spec.samples_for(spec.frames_in(buf.len()));
        let read = self.shared.ring.lock().read_into(&mut buf[..wanted]);
        Ok(spec.frames_in(read))
    }
}

impl StreamWriter {
    /// Push interleaved samples. Must hold whole frames.
    ///
    /// While the source is paused the samples are dropped if the stream was
    /// configured to discard; otherwise they are buffered (oldest dropped on
    /// overflow). Fails with [`SourceError::Closed`] once the source is gone.
    pub fn write(&self, samples: &[f32]) -> Result<(), SourceError> {
        let shared = &self.shared;
        if shared.closed.load(Ordering::Acquire) {
            return Err(SourceError::Closed);
        }
        if samples.len() % shared.spec.channels as usize != 0 {
            return Err(SourceError::InvalidBuffer {
                len: samples.len(),
                channels: shared.spec.channels,
            });
        }

        if !shared.accepting.load(Ordering::Acquire) && shared.discard_while_paused {
            shared.dropped_samples.fetch_add(samples.len() as u64, Ordering::Relaxed);
            return Ok(());
        }

        let lost = shared.ring.lock().write(samples);
        if lost > 0 {
            shared.dropped_samples.fetch_add(lost as u64, Ordering::Relaxed);
            log::debug!("Stream buffer overflow, dropped {} samples", lost);
        }
        Ok(())
    }

    /// Samples discarded so far, by pause policy or overflow.
    pub fn dropped_samples(&self) -> u64 {
        self.shared.dropped_samples.load(Ordering::Relaxed)
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }
}
