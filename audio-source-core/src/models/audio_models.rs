use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Channel layout derived from a channel count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelLayout {
    Mono,
    Stereo,
    Multi(u16),
}

/// Sample rate and channel count of an interleaved f32 stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StreamSpec {
    pub sample_rate: u32,
    pub channels: u16,
}

impl StreamSpec {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self { sample_rate, channels }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.channels == 0 {
            return Err("channel count must be positive".into());
        }
        Ok(())
    }

    pub fn layout(&self) -> ChannelLayout {
        match self.channels {
            1 => ChannelLayout::Mono,
            2 => ChannelLayout::Stereo,
            n => ChannelLayout::Multi(n),
        }
    }

    /// Whole frames contained in `samples` interleaved samples.
    pub fn frames_in(&self, samples: usize) -> usize {
        samples / self.channels.max(1) as usize
    }

    pub fn samples_for(&self, frames: usize) -> usize {
        frames * self.channels as usize
    }
}

impl Default for StreamSpec {
    fn default() -> Self {
        Self {
            sample_rate: 48000,
            channels: 2,
        }
    }
}

/// Where a source's samples come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TerminalKind {
    Network,
    Device,
    File,
    Memory,
}

/// Identity of the terminal (device, stream, file) bound to a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalInfo {
    pub id: String,
    pub name: String,
    pub kind: TerminalKind,
    pub spec: StreamSpec,
}

impl TerminalInfo {
    /// Terminal identity with a fresh random id.
    pub fn new(name: impl Into<String>, kind: TerminalKind, spec: StreamSpec) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.into(),
            kind,
            spec,
        }
    }
}

/// Counters kept by a managed source, for debugging stuck or silent playback.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceDiagnostics {
    pub pulls: u64,
    /// Pulls that produced nothing because the source was paused or mid-transition.
    pub refused_pulls: u64,
    pub frames_produced: u64,
    pub silent_frames: u64,
    pub production_faults: u64,
    pub pause_faults: u64,
    pub resume_failures: u64,
    pub restart_failures: u64,
    pub restarts: u64,
    pub last_fault: Option<String>,
    pub last_fault_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_from_channels() {
        assert_eq!(StreamSpec::new(44100, 1).layout(), ChannelLayout::Mono);
        assert_eq!(StreamSpec::new(44100, 2).layout(), ChannelLayout::Stereo);
        assert_eq!(StreamSpec::new(44100, 6).layout(), ChannelLayout::Multi(6));
    }

    #[test]
    fn frame_sample_conversion() {
        let spec = StreamSpec::new(48000, 2);
        assert_eq!(spec.frames_in(7), 3);
        assert_eq!(spec.samples_for(3), 6);
    }

    #[test]
    fn validate_rejects_zero_fields() {
        assert!(StreamSpec::new(0, 2).validate().is_err());
        assert!(StreamSpec::new(48000, 0).validate().is_err());
        assert!(StreamSpec::default().validate().is_ok());
    }

    #[test]
    fn terminal_ids_are_unique() {
        let a = TerminalInfo::new("a", TerminalKind::Memory, StreamSpec::default());
        let b = TerminalInfo::new("a", TerminalKind::Memory, StreamSpec::default());
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn diagnostics_serialize_fault_fields() {
        let diag = SourceDiagnostics {
            last_fault: Some("device busy".into()),
            last_fault_at: Some(Utc::now()),
            ..Default::default()
        };

        let json = serde_json::to_value(&diag).unwrap();
        assert_eq!(json["last_fault"], "device busy");
        assert!(json["last_fault_at"].is_string());
    }
}
