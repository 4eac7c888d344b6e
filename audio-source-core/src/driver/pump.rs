use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use parking_lot::Mutex;

use crate::models::config::PumpConfiguration;
use crate::models::error::SourceError;
use crate::traits::audio_source::AudioSource;
use crate::traits::frame_reader::FrameReader;
use crate::traits::terminal::Terminal;

/// Callback receiving each produced chunk.
///
/// Parameters:
/// - `samples`: Interleaved f32 samples, silence included.
/// - `frames`: Number of frames in `samples`.
pub type FrameSink = Arc<dyn Fn(&[f32], usize) + Send + Sync + 'static>;

/// Counters kept by the pump thread.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PumpStats {
    pub pulls: u64,
    /// Ticks where nothing was produced (paused, or mid-transition).
    pub skipped: u64,
    pub frames: u64,
    pub errors: u64,
    pub last_error: Option<SourceError>,
}

/// Production context driving one source.
///
/// Pulls `chunk_frames` every `period` on a dedicated thread and hands the
/// result to a [`FrameSink`]. Does not pull while the source reports
/// `Paused`. Pull failures are logged and counted; retrying or replacing the
/// source is left to the owner, who watches [`SourcePump::stats`].
pub struct SourcePump {
    running: Arc<AtomicBool>,
    stats: Arc<Mutex<PumpStats>>,
    handle: Option<thread::JoinHandle<()>>,
}

impl SourcePump {
    pub fn start(
        source: Arc<dyn AudioSource>,
        config: PumpConfiguration,
        sink: FrameSink,
    ) -> Result<Self, SourceError> {
        config.validate().map_err(SourceError::ConfigurationFailed)?;

        let running = Arc::new(AtomicBool::new(true));
        let stats = Arc::new(Mutex::new(PumpStats::default()));

        let spec = source.stream_spec();
        let mut buf = vec![0.0f32; spec.samples_for(config.chunk_frames)];
        let thread_running = Arc::clone(&running);
        let thread_stats = Arc::clone(&stats);

        let handle = thread::Builder::new()
            .name("source-pump".into())
            .spawn(move || {
                while thread_running.load(Ordering::SeqCst) {
                    thread::sleep(config.period);

                    if source.state().is_paused() {
                        thread_stats.lock().skipped += 1;
                        continue;
                    }

                    match source.read(&mut buf) {
                        Ok(0) => {
                            let mut s = thread_stats.lock();
                            s.pulls += 1;
                            s.skipped += 1;
                        }
                        Ok(frames) => {
                            sink(&buf[..spec.samples_for(frames)], frames);
                            let mut s = thread_stats.lock();
                            s.pulls += 1;
                            s.frames += frames as u64;
                        }
                        Err(e) => {
                            log::error!(
                                "Pull from '{}' failed: {}",
                                source.terminal_info().name,
                                e
                            );
                            let mut s = thread_stats.lock();
                            s.pulls += 1;
                            s.errors += 1;
                            s.last_error = Some(e);
                        }
                    }
                }
            })
            .map_err(|e| SourceError::Unknown(format!("failed to spawn pump thread: {}", e)))?;

        Ok(Self {
            running,
            stats,
            handle: Some(handle),
        })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> PumpStats {
        self.stats.lock().clone()
    }

    /// Stop pulling and join the thread. Idempotent.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Source pump thread panicked");
            }
        }
    }
}

impl Drop for SourcePump {
    fn drop(&mut self) {
        self.stop();
    }
}
