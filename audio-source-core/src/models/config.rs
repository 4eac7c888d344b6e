use std::time::Duration;

use super::audio_models::StreamSpec;

/// Largest receive buffer a stream may ask for, in samples (256 MiB of f32).
pub const MAX_BUFFER_SAMPLES: usize = 1 << 26;

/// Configuration for a live stream backend.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfiguration {
    /// Format of the samples pushed by the writer (default: 48 kHz stereo).
    pub spec: StreamSpec,

    /// Seconds of audio the receive buffer holds before dropping the oldest (default: 5).
    pub buffer_secs: f64,

    /// Drop samples pushed while the source is paused (default: true).
    pub discard_while_paused: bool,
}

impl StreamConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        self.spec.validate()?;
        if !self.buffer_secs.is_finite() || self.buffer_secs <= 0.0 {
            return Err("buffer duration must be positive and finite".into());
        }
        if self.buffer_samples().is_none() {
            return Err(format!("buffer exceeds {} samples", MAX_BUFFER_SAMPLES));
        }
        Ok(())
    }

    /// Ring buffer capacity in samples, rounded down to whole frames.
    ///
    /// Clamped to [`MAX_BUFFER_SAMPLES`] for configurations that fail
    /// `validate()`.
    pub fn buffer_capacity(&self) -> usize {
        self.buffer_samples().unwrap_or_else(|| {
            let frames = self.spec.frames_in(MAX_BUFFER_SAMPLES);
            self.spec.samples_for(frames)
        })
    }

    fn buffer_samples(&self) -> Option<usize> {
        let frames = self.spec.sample_rate as f64 * self.buffer_secs;
        if !frames.is_finite() || frames > MAX_BUFFER_SAMPLES as f64 {
            return None;
        }
        (frames as usize)
            .max(1)
            .checked_mul(self.spec.channels as usize)
            .filter(|samples| *samples <= MAX_BUFFER_SAMPLES)
    }
}

impl Default for StreamConfiguration {
    fn default() -> Self {
        Self {
            spec: StreamSpec::default(),
            buffer_secs: 5.0,
            discard_while_paused: true,
        }
    }
}

/// Cadence of the driving pump.
#[derive(Debug, Clone, PartialEq)]
pub struct PumpConfiguration {
    /// Frames requested per pull (default: 480, 10 ms at 48 kHz).
    pub chunk_frames: usize,

    /// Interval between pulls (default: 10 ms).
    pub period: Duration,
}

impl PumpConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.chunk_frames == 0 {
            return Err("chunk size must be positive".into());
        }
        if self.period.is_zero() {
            return Err("pull period must be positive".into());
        }
        Ok(())
    }
}

impl Default for PumpConfiguration {
    fn default() -> Self {
        Self {
            chunk_frames: 480,
            period: Duration::from_millis(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_stream_capacity_is_five_seconds_stereo() {
        let config = StreamConfiguration::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.buffer_capacity(), 48000 * 5 * 2);
    }

    #[test]
    fn rejects_non_positive_buffer() {
        let config = StreamConfiguration {
            buffer_secs: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = StreamConfiguration {
            buffer_secs: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_infinite_buffer() {
        let config = StreamConfiguration {
            buffer_secs: f64::INFINITY,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(config.buffer_capacity() <= MAX_BUFFER_SAMPLES);
        assert_eq!(config.buffer_capacity() % 2, 0);
    }

    #[test]
    fn rejects_oversized_buffer() {
        let config = StreamConfiguration {
            spec: StreamSpec::new(u32::MAX, u16::MAX),
            buffer_secs: 1e12,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(format!("buffer exceeds {} samples", MAX_BUFFER_SAMPLES))
        );

        // Few frames but many channels still overflows the cap
        let config = StreamConfiguration {
            spec: StreamSpec::new(48000, u16::MAX),
            buffer_secs: 60.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(config.buffer_capacity() <= MAX_BUFFER_SAMPLES);
    }

    #[test]
    fn pump_rejects_zero_chunk() {
        let config = PumpConfiguration {
            chunk_frames: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err("chunk size must be positive".to_string()));
        assert!(PumpConfiguration::default().validate().is_ok());
    }
}
