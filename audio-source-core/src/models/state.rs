use std::sync::atomic::{AtomicU8, Ordering};

use serde::{Deserialize, Serialize};

/// Playback state machine of an audio source.
///
/// State transitions:
/// ```text
/// [open] → playing | idle
/// playing ↔ idle          (internal: signal exhausted / signal resumes)
/// playing | idle → paused (pause)
/// paused → playing | idle (resume, restart)
/// any → playing | idle    (restart)
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    /// Running and producing signal.
    Playing,
    /// Running but producing silence. Safe to pause.
    Idle,
    /// Suspended. Pulls produce nothing.
    Paused,
}

impl PlaybackState {
    pub fn is_playing(&self) -> bool {
        matches!(self, Self::Playing)
    }

    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused)
    }

    /// Playing or idle.
    pub fn is_running(&self) -> bool {
        !self.is_paused()
    }

    /// Running state for a source that does or doesn't have signal available.
    pub fn running(has_signal: bool) -> Self {
        if has_signal {
            Self::Playing
        } else {
            Self::Idle
        }
    }

    fn to_bits(self) -> u8 {
        match self {
            Self::Playing => 0,
            Self::Idle => 1,
            Self::Paused => 2,
        }
    }

    fn from_bits(bits: u8) -> Self {
        match bits {
            0 => Self::Playing,
            1 => Self::Idle,
            _ => Self::Paused,
        }
    }
}

/// Lock-free holder of the published playback state.
///
/// Readers never block and never observe a partially applied transition.
/// Writers are expected to serialize among themselves (the managed source
/// only stores while holding its control lock).
#[derive(Debug)]
pub struct StateCell(AtomicU8);

impl StateCell {
    pub fn new(state: PlaybackState) -> Self {
        Self(AtomicU8::new(state.to_bits()))
    }

    pub fn load(&self) -> PlaybackState {
        PlaybackState::from_bits(self.0.load(Ordering::Acquire))
    }

    /// Publish `state`, returning the previous one.
    pub fn store(&self, state: PlaybackState) -> PlaybackState {
        PlaybackState::from_bits(self.0.swap(state.to_bits(), Ordering::AcqRel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_round_trips_every_state() {
        let cell = StateCell::new(PlaybackState::Idle);
        assert_eq!(cell.load(), PlaybackState::Idle);

        for state in [PlaybackState::Playing, PlaybackState::Paused, PlaybackState::Idle] {
            cell.store(state);
            assert_eq!(cell.load(), state);
        }
    }

    #[test]
    fn store_returns_previous() {
        let cell = StateCell::new(PlaybackState::Playing);
        assert_eq!(cell.store(PlaybackState::Paused), PlaybackState::Playing);
        assert_eq!(cell.store(PlaybackState::Paused), PlaybackState::Paused);
    }

    #[test]
    fn running_picks_by_signal() {
        assert_eq!(PlaybackState::running(true), PlaybackState::Playing);
        assert_eq!(PlaybackState::running(false), PlaybackState::Idle);
        assert!(PlaybackState::Idle.is_running());
        assert!(!PlaybackState::Paused.is_running());
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&PlaybackState::Paused).unwrap();
        assert_eq!(json, "\"paused\"");
    }
}
