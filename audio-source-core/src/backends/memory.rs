use std::sync::Arc;

use crate::models::audio_models::{StreamSpec, TerminalInfo, TerminalKind};
use crate::models::error::SourceError;
use crate::traits::backend::SourceBackend;

/// Rewindable clip of interleaved samples held in memory.
///
/// Stands in for a file reader: the "beginning of the stream" is frame 0,
/// running off the end yields silence, and `rewind()` repositions to the
/// start. Sample storage is shared, so many sources can play one clip.
#[derive(Debug)]
pub struct MemoryBackend {
    info: TerminalInfo,
    samples: Arc<[f32]>,
    cursor: usize,
    looping: bool,
    is_open: bool,
}

impl MemoryBackend {
    pub fn new(
        name: impl Into<String>,
        spec: StreamSpec,
        samples: impl Into<Arc<[f32]>>,
    ) -> Result<Self, SourceError> {
        spec.validate().map_err(SourceError::ConfigurationFailed)?;
        let samples = samples.into();
        if samples.len() % spec.channels as usize != 0 {
            return Err(SourceError::InvalidBuffer {
                len: samples.len(),
                channels: spec.channels,
            });
        }

        Ok(Self {
            info: TerminalInfo::new(name, TerminalKind::Memory, spec),
            samples,
            cursor: 0,
            looping: false,
            is_open: false,
        })
    }

    /// Wrap around to frame 0 instead of going silent at the end.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Current read position in frames.
    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn total_frames(&self) -> usize {
        self.info.spec.frames_in(self.samples.len())
    }
}

impl SourceBackend for MemoryBackend {
    fn info(&self) -> TerminalInfo {
        self.info.clone()
    }

    fn open(&mut self) -> Result<(), SourceError> {
        self.is_open = true;
        Ok(())
    }

    fn close(&mut self) {
        self.is_open = false;
    }

    fn rewind(&mut self) -> Result<(), SourceError> {
        if !self.is_open {
            return Err(SourceError::Closed);
        }
        self.cursor = 0;
        Ok(())
    }

    fn has_signal(&self) -> bool {
        let total = self.total_frames();
        self.cursor < total || (self.looping && total > 0)
    }

    fn fill(&mut self, buf: &mut [f32]) -> Result<usize, SourceError> {
        if !self.is_open {
            return Err(SourceError::Closed);
        }

        let spec = self.info.spec;
        let total = self.total_frames();
        let wanted = spec.frames_in(buf.len());
        let mut written = 0;

        while written < wanted {
            if self.cursor == total {
                if self.looping && total > 0 {
                    self.cursor = 0;
                } else {
                    break;
                }
            }

            let n = (total - self.cursor).min(wanted - written);
            let src = spec.samples_for(self.cursor)..spec.samples_for(self.cursor + n);
            let dst = spec.samples_for(written)..spec.samples_for(written + n);
            buf[dst].copy_from_slice(&self.samples[src]);
            self.cursor += n;
            written += n;
        }

        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::models::state::PlaybackState;
    use crate::source::managed::ManagedSource;
    use crate::traits::audio_source::AudioSource;
    use crate::traits::frame_reader::FrameReader;

    fn stereo_clip(frames: usize) -> Vec<f32> {
        (0..frames).flat_map(|i| [i as f32 * 0.1, -(i as f32) * 0.1]).collect()
    }

    fn open(frames: usize) -> ManagedSource<MemoryBackend> {
        let backend =
            MemoryBackend::new("clip", StreamSpec::new(44100, 2), stereo_clip(frames)).unwrap();
        ManagedSource::open(backend).unwrap()
    }

    #[test]
    fn rejects_ragged_clip() {
        let err =
            MemoryBackend::new("clip", StreamSpec::new(44100, 2), vec![0.0f32; 3]).unwrap_err();
        assert_eq!(err, SourceError::InvalidBuffer { len: 3, channels: 2 });
    }

    #[test]
    fn reads_clip_then_silence() {
        let source = open(3);
        let mut buf = [1.0f32; 8];

        assert_eq!(source.read(&mut buf), Ok(4));
        assert_abs_diff_eq!(buf[2], 0.1);
        assert_abs_diff_eq!(buf[5], -0.2);
        assert_eq!(&buf[6..], &[0.0, 0.0]);
        assert_eq!(source.state(), PlaybackState::Playing);

        assert_eq!(source.read(&mut buf), Ok(4));
        assert_eq!(buf, [0.0; 8]);
        assert_eq!(source.state(), PlaybackState::Idle);
    }

    #[test]
    fn restart_returns_to_frame_zero() {
        let source = open(10);
        let mut buf = [0.0f32; 8];
        source.read(&mut buf).unwrap();
        assert_eq!(source.inspect_backend(MemoryBackend::position), 4);

        source.restart().unwrap();
        assert_eq!(source.inspect_backend(MemoryBackend::position), 0);
        assert_eq!(source.state(), PlaybackState::Playing);
    }

    #[test]
    fn looping_wraps_without_silence() {
        let backend = MemoryBackend::new("loop", StreamSpec::new(8000, 1), vec![1.0f32, 2.0, 3.0])
            .unwrap()
            .looping(true);
        let source = ManagedSource::open(backend).unwrap();

        let mut buf = [0.0f32; 7];
        source.read(&mut buf).unwrap();
        assert_eq!(buf, [1.0, 2.0, 3.0, 1.0, 2.0, 3.0, 1.0]);
        assert_eq!(source.state(), PlaybackState::Playing);
    }

    #[test]
    fn empty_clip_starts_idle() {
        let backend = MemoryBackend::new("empty", StreamSpec::new(8000, 1), Vec::<f32>::new())
            .unwrap()
            .looping(true);
        let source = ManagedSource::open(backend).unwrap();
        assert_eq!(source.state(), PlaybackState::Idle);

        let mut buf = [5.0f32; 4];
        assert_eq!(source.read(&mut buf), Ok(4));
        assert_eq!(buf, [0.0; 4]);
    }

    #[test]
    fn paused_clip_keeps_position() {
        let source = open(10);
        let mut buf = [0.0f32; 4];
        source.read(&mut buf).unwrap();
        source.pause();

        assert_eq!(source.read(&mut buf), Ok(0));
        source.resume().unwrap();
        source.read(&mut buf).unwrap();
        assert_abs_diff_eq!(buf[0], 0.2);
        assert_eq!(source.inspect_backend(MemoryBackend::position), 4);
    }
}
