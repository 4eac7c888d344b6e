use crate::models::error::SourceError;
use crate::models::state::PlaybackState;

/// Event delegate for source notifications.
///
/// State changes caused by pulls are reported from the production thread;
/// keep implementations short and non-blocking. Never called with the
/// source's internal lock held, so calling back into the source is allowed.
pub trait SourceDelegate: Send + Sync {
    /// Called after the published state changes.
    fn on_state_changed(&self, state: &PlaybackState);

    /// Called for faults, including ones absorbed by `pause()`.
    fn on_error(&self, error: &SourceError);
}
