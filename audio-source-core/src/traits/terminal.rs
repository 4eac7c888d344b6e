use crate::models::audio_models::{StreamSpec, TerminalInfo};

/// Device or stream identity bound to a source.
///
/// The terminal is opened before the first pull and released when its
/// owner is dropped.
pub trait Terminal {
    /// Identity of the bound device, stream or file.
    fn terminal_info(&self) -> &TerminalInfo;

    /// Format of the frames this terminal produces.
    fn stream_spec(&self) -> StreamSpec {
        self.terminal_info().spec
    }

    /// Whether the underlying resource is still held.
    fn is_open(&self) -> bool;
}
