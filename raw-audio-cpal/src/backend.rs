use cpal::traits::HostTrait;

use raw_audio_core::models::config::{SampleEncoding, StreamConfig};
use raw_audio_core::models::error::EngineError;

/// Device backend over the default cpal host.
///
/// Implements both provider traits; the same backend instance can build
/// recorders and players. cpal exposes no routing policy, so the config's
/// `DeviceRole` selects the default endpoint of the matching direction and
/// otherwise stays declared intent.
pub struct CpalBackend {
    host: cpal::Host,
}

impl CpalBackend {
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    pub(crate) fn input_device(&self) -> Result<cpal::Device, String> {
        self.host
            .default_input_device()
            .ok_or_else(|| "no default input device".into())
    }

    pub(crate) fn output_device(&self) -> Result<cpal::Device, String> {
        self.host
            .default_output_device()
            .ok_or_else(|| "no default output device".into())
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn sample_format(encoding: SampleEncoding) -> cpal::SampleFormat {
    match encoding {
        SampleEncoding::Pcm16 => cpal::SampleFormat::I16,
    }
}

pub(crate) fn stream_config(config: &StreamConfig) -> cpal::StreamConfig {
    cpal::StreamConfig {
        channels: config.channel_layout.channel_count(),
        sample_rate: cpal::SampleRate(config.sample_rate_hz),
        buffer_size: cpal::BufferSize::Default,
    }
}

/// Scan a device's supported configurations for one matching `config` and
/// report its minimum buffer size in frames.
///
/// A device minimum below 20 ms of frames is floored to 20 ms so capture
/// reads do not degenerate into per-packet wakeups.
pub(crate) fn min_buffer_frames_from<I>(config: &StreamConfig, ranges: I) -> Result<usize, EngineError>
where
    I: Iterator<Item = cpal::SupportedStreamConfigRange>,
{
    let channels = config.channel_layout.channel_count();
    let rate = cpal::SampleRate(config.sample_rate_hz);
    let format = sample_format(config.sample_encoding);

    for range in ranges {
        if range.channels() != channels || range.sample_format() != format {
            continue;
        }
        if rate < range.min_sample_rate() || rate > range.max_sample_rate() {
            continue;
        }
        let device_min = match range.buffer_size() {
            cpal::SupportedBufferSize::Range { min, .. } => *min as usize,
            cpal::SupportedBufferSize::Unknown => 0,
        };
        return Ok(device_min.max(config.sample_rate_hz as usize / 50));
    }

    Err(EngineError::Configuration(format!(
        "device rejected {} Hz / {} channel(s) / {:?}",
        config.sample_rate_hz, channels, format
    )))
}
