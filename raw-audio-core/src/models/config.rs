use serde::{Deserialize, Serialize};

/// How many independent channels are interleaved per frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelLayout {
    Mono,
    Stereo,
}

impl ChannelLayout {
    pub fn channel_count(&self) -> u16 {
        match self {
            Self::Mono => 1,
            Self::Stereo => 2,
        }
    }
}

/// On-the-wire sample encoding.
///
/// The flat-file format and both engines currently speak 16-bit linear PCM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SampleEncoding {
    Pcm16,
}

impl SampleEncoding {
    pub fn bytes_per_sample(&self) -> u16 {
        match self {
            Self::Pcm16 => 2,
        }
    }
}

/// Routing intent for the capture side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaptureSource {
    Default,
    Microphone,
    VoiceCommunication,
}

/// Routing intent for the playback side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackUsage {
    Media,
    Communication,
}

/// The semantic intent declared to the platform audio system, used for
/// routing and policy decisions where the backend can honor it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceRole {
    Capture(CaptureSource),
    Playback(PlaybackUsage),
}

/// Stream parameters an engine is built with.
///
/// Immutable once the engine exists. `validate()` covers the local
/// invariants; whether the *device* accepts the combination is decided by
/// the provider's buffer-size query at build time, so rejection is always a
/// construction-time failure, never a runtime one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Sample rate in Hertz. Must be positive.
    pub sample_rate_hz: u32,

    /// Channel layout (default: mono).
    pub channel_layout: ChannelLayout,

    /// Sample encoding (default: 16-bit PCM).
    pub sample_encoding: SampleEncoding,

    /// Capture source or playback usage.
    pub device_role: DeviceRole,
}

impl StreamConfig {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate_hz == 0 {
            return Err("sample rate must be positive".into());
        }
        Ok(())
    }

    /// Samples per frame, i.e. the interleaved channel count.
    pub fn samples_per_frame(&self) -> usize {
        self.channel_layout.channel_count() as usize
    }

    /// Bytes per frame for the configured encoding.
    pub fn frame_bytes(&self) -> usize {
        self.samples_per_frame() * self.sample_encoding.bytes_per_sample() as usize
    }
}
