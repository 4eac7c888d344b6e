use std::fmt::Display;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::models::audio_models::{SourceDiagnostics, TerminalInfo};
use crate::models::error::SourceError;
use crate::models::state::{PlaybackState, StateCell};
use crate::traits::audio_source::AudioSource;
use crate::traits::backend::SourceBackend;
use crate::traits::frame_reader::FrameReader;
use crate::traits::source_delegate::SourceDelegate;
use crate::traits::terminal::Terminal;

/// Backend plus the state only the control path changes.
struct Inner<B> {
    backend: B,
    /// Fault absorbed by `pause()`, reported by the next `resume()`.
    pending_fault: Option<SourceError>,
}

/// Counters readable without touching the backend lock.
#[derive(Debug, Default)]
struct Counters {
    pulls: AtomicU64,
    refused_pulls: AtomicU64,
    frames_produced: AtomicU64,
    silent_frames: AtomicU64,
    production_faults: AtomicU64,
    pause_faults: AtomicU64,
    resume_failures: AtomicU64,
    restart_failures: AtomicU64,
    restarts: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }
}

/// Playback state machine wrapped around a [`SourceBackend`].
///
/// One implementation of [`AudioSource`] for every backend. The backend's
/// cursor is guarded by a `parking_lot::Mutex` shared by the pull path and
/// the control path; the published state lives in a lock-free [`StateCell`]
/// so `state()` never waits on either. Diagnostics are atomics kept outside
/// that mutex, so polling them never costs the production thread a pull.
///
/// ```text
///  control thread                    production thread
///  pause/resume/restart ──lock──┐    read ──try_lock──┐
///                               ├─ [backend + cursor] ┤
///  state() ── atomic load ──────┴──── [StateCell] ────┘
/// ```
///
/// The pull path never blocks on the control path: if a transition is in
/// progress, `read` produces nothing and returns `Ok(0)`.
///
/// Failure policy:
/// - a failed `resume()` leaves the source `Paused`;
/// - a failed `restart()` suspends the backend and leaves the source `Paused`;
/// - a failed pull leaves the state unchanged.
pub struct ManagedSource<B: SourceBackend> {
    info: TerminalInfo,
    state: StateCell,
    inner: Mutex<Inner<B>>,
    open: AtomicBool,
    counters: Counters,
    last_fault: Mutex<Option<(String, DateTime<Utc>)>>,
    delegate: Option<Arc<dyn SourceDelegate>>,
}

impl<B: SourceBackend> ManagedSource<B> {
    /// Open `backend` and wrap it. The source starts `Playing` if the
    /// backend already has signal, `Idle` otherwise.
    ///
    /// On failure the backend is dropped without `close()` being called.
    pub fn open(mut backend: B) -> Result<Self, SourceError> {
        let info = backend.info();
        info.spec.validate().map_err(SourceError::ConfigurationFailed)?;
        backend.open()?;

        let initial = PlaybackState::running(backend.has_signal());
        log::debug!("Opened source '{}' ({:?}) as {:?}", info.name, info.kind, initial);

        Ok(Self {
            info,
            state: StateCell::new(initial),
            inner: Mutex::new(Inner {
                backend,
                pending_fault: None,
            }),
            open: AtomicBool::new(true),
            counters: Counters::default(),
            last_fault: Mutex::new(None),
            delegate: None,
        })
    }

    pub fn set_delegate(&mut self, delegate: Arc<dyn SourceDelegate>) {
        self.delegate = Some(delegate);
    }

    pub fn diagnostics(&self) -> SourceDiagnostics {
        let c = &self.counters;
        let load = |counter: &AtomicU64| counter.load(Ordering::Relaxed);
        let (last_fault, last_fault_at) = match self.last_fault.lock().clone() {
            Some((fault, at)) => (Some(fault), Some(at)),
            None => (None, None),
        };

        SourceDiagnostics {
            pulls: load(&c.pulls),
            refused_pulls: load(&c.refused_pulls),
            frames_produced: load(&c.frames_produced),
            silent_frames: load(&c.silent_frames),
            production_faults: load(&c.production_faults),
            pause_faults: load(&c.pause_faults),
            resume_failures: load(&c.resume_failures),
            restart_failures: load(&c.restart_failures),
            restarts: load(&c.restarts),
            last_fault,
            last_fault_at,
        }
    }

    /// Run `f` against the backend while holding the control lock.
    #[cfg(test)]
    pub(crate) fn inspect_backend<R>(&self, f: impl FnOnce(&B) -> R) -> R {
        f(&self.inner.lock().backend)
    }

    /// Release the terminal now instead of on drop. Idempotent.
    ///
    /// The state becomes `Paused`. Afterwards pulls, `resume()` and
    /// `restart()` fail with [`SourceError::Closed`].
    pub fn close(&self) {
        let mut inner = self.inner.lock();
        let changed = self.release(&mut inner);
        drop(inner);

        self.notify_state(changed);
    }

    // --- Internal helpers ---

    /// Close the backend once and park the source in `Paused`.
    fn release(&self, inner: &mut Inner<B>) -> Option<PlaybackState> {
        if !self.open.swap(false, Ordering::AcqRel) {
            return None;
        }
        inner.backend.close();
        inner.pending_fault = None;
        log::debug!("Closed source '{}'", self.info.name);
        self.publish(PlaybackState::Paused)
    }

    /// Store `state` and report whether it differs from the previous one.
    /// Callers hold the inner lock.
    fn publish(&self, state: PlaybackState) -> Option<PlaybackState> {
        (self.state.store(state) != state).then_some(state)
    }

    fn record_fault(&self, fault: &impl Display) {
        *self.last_fault.lock() = Some((fault.to_string(), Utc::now()));
    }

    fn notify_state(&self, state: Option<PlaybackState>) {
        if let (Some(state), Some(delegate)) = (state, &self.delegate) {
            delegate.on_state_changed(&state);
        }
    }

    fn notify_error(&self, error: &SourceError) {
        if let Some(ref delegate) = self.delegate {
            delegate.on_error(error);
        }
    }

    fn refuse_pull(&self) -> Result<usize, SourceError> {
        Counters::bump(&self.counters.refused_pulls, 1);
        Ok(0)
    }
}

impl<B: SourceBackend> Terminal for ManagedSource<B> {
    fn terminal_info(&self) -> &TerminalInfo {
        &self.info
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }
}

impl<B: SourceBackend> FrameReader for ManagedSource<B> {
    fn read(&self, buf: &mut [f32]) -> Result<usize, SourceError> {
        let spec = self.info.spec;
        if buf.len() % spec.channels as usize != 0 {
            return Err(SourceError::InvalidBuffer {
                len: buf.len(),
                channels: spec.channels,
            });
        }

        let Some(mut inner) = self.inner.try_lock() else {
            // A control transition is in flight
            return self.refuse_pull();
        };
        if !self.is_open() {
            return Err(SourceError::Closed);
        }
        if self.state.load().is_paused() {
            drop(inner);
            return self.refuse_pull();
        }

        let frames = spec.frames_in(buf.len());
        if frames == 0 {
            return Ok(0);
        }

        Counters::bump(&self.counters.pulls, 1);
        match inner.backend.fill(buf) {
            Ok(signal_frames) => {
                let signal_frames = signal_frames.min(frames);
                buf[spec.samples_for(signal_frames)..].fill(0.0);

                let changed = self.publish(PlaybackState::running(signal_frames > 0));
                drop(inner);

                Counters::bump(&self.counters.frames_produced, frames as u64);
                Counters::bump(&self.counters.silent_frames, (frames - signal_frames) as u64);
                self.notify_state(changed);
                Ok(frames)
            }
            Err(e) => {
                drop(inner);

                Counters::bump(&self.counters.production_faults, 1);
                self.record_fault(&e);
                log::error!("Pull from source '{}' failed: {}", self.info.name, e);
                self.notify_error(&e);
                Err(e)
            }
        }
    }
}

impl<B: SourceBackend> AudioSource for ManagedSource<B> {
    fn state(&self) -> PlaybackState {
        self.state.load()
    }

    fn pause(&self) {
        let mut inner = self.inner.lock();
        if self.state.load().is_paused() {
            return;
        }

        let fault = if self.is_open() {
            inner.backend.suspend().err()
        } else {
            None
        };
        if let Some(ref e) = fault {
            inner.pending_fault = Some(e.clone());
        }
        let changed = self.publish(PlaybackState::Paused);
        drop(inner);

        if let Some(e) = fault {
            Counters::bump(&self.counters.pause_faults, 1);
            self.record_fault(&e);
            log::warn!("Pausing source '{}' hit a fault, deferring: {}", self.info.name, e);
            self.notify_error(&e);
        }
        self.notify_state(changed);
    }

    fn resume(&self) -> Result<(), SourceError> {
        let mut inner = self.inner.lock();
        if !self.is_open() {
            return Err(SourceError::Closed);
        }
        if !self.state.load().is_paused() {
            return Ok(());
        }

        if let Some(fault) = inner.pending_fault.take() {
            drop(inner);

            Counters::bump(&self.counters.resume_failures, 1);
            let err = SourceError::DeferredFault(Box::new(fault));
            log::warn!("Resume of source '{}' reports {}", self.info.name, err);
            self.notify_error(&err);
            return Err(err);
        }

        if let Err(e) = inner.backend.reactivate() {
            drop(inner);

            Counters::bump(&self.counters.resume_failures, 1);
            self.record_fault(&e);
            log::warn!("Resume of source '{}' failed: {}", self.info.name, e);
            self.notify_error(&e);
            return Err(e);
        }

        let changed = self.publish(PlaybackState::running(inner.backend.has_signal()));
        drop(inner);

        self.notify_state(changed);
        Ok(())
    }

    fn restart(&self) -> Result<(), SourceError> {
        let mut inner = self.inner.lock();
        if !self.is_open() {
            return Err(SourceError::Closed);
        }

        // Rewind before reactivating so a live backend accepts nothing
        // from the old session.
        let was_paused = self.state.load().is_paused();
        let mut result = inner.backend.rewind();
        if result.is_ok() && was_paused {
            result = inner.backend.reactivate();
        }

        match result {
            Ok(()) => {
                if let Some(fault) = inner.pending_fault.take() {
                    log::debug!(
                        "Restart of source '{}' supersedes deferred fault: {}",
                        self.info.name,
                        fault
                    );
                }
                let changed = self.publish(PlaybackState::running(inner.backend.has_signal()));
                drop(inner);

                Counters::bump(&self.counters.restarts, 1);
                log::debug!("Restarted source '{}'", self.info.name);
                self.notify_state(changed);
                Ok(())
            }
            Err(e) => {
                if let Err(suspend_err) = inner.backend.suspend() {
                    log::debug!(
                        "Suspending source '{}' after failed restart: {}",
                        self.info.name,
                        suspend_err
                    );
                }
                let changed = self.publish(PlaybackState::Paused);
                drop(inner);

                Counters::bump(&self.counters.restart_failures, 1);
                self.record_fault(&e);
                log::warn!("Restart of source '{}' failed: {}", self.info.name, e);
                self.notify_error(&e);
                self.notify_state(changed);
                Err(e)
            }
        }
    }
}

impl<B: SourceBackend> Drop for ManagedSource<B> {
    fn drop(&mut self) {
        if self.open.swap(false, Ordering::AcqRel) {
            self.inner.get_mut().backend.close();
            self.state.store(PlaybackState::Paused);
            log::debug!("Closed source '{}' on drop", self.info.name);
        }
    }
}
