use crate::models::error::SourceError;

/// Pull-style producer of interleaved f32 frames.
pub trait FrameReader {
    /// Fill `buf` with the next frames.
    ///
    /// `buf` must hold a whole number of frames for the source's channel
    /// count. Returns the number of frames produced; `Ok(0)` means the
    /// source declined to produce and nothing was consumed.
    ///
    /// Must only be called from the single production context.
    fn read(&self, buf: &mut [f32]) -> Result<usize, SourceError>;
}
