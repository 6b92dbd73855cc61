//! CPAL-backed input backend.

use std::time::Duration;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, SampleFormat, Stream, StreamConfig as CpalStreamConfig, SupportedBufferSize};
use ringbuf::traits::{Observer, Producer, Split};
use ringbuf::{HeapProd, HeapRb};

use crate::source::{InputBackend, InputStream, StreamHandle};
use crate::{CaptureError, RouterConfig};

/// Divisor for normalizing i16 samples into [-1.0, 1.0).
const I16_SCALE: f32 = 32768.0;

/// Production [`InputBackend`] over the default CPAL host.
///
/// Devices are enumerated fresh from the host on every catalog call, in
/// the host's own order, so indices line up across `device_count`,
/// `device_name`, and `open` within a single UI refresh.
///
/// # Example
///
/// ```no_run
/// use mono_tap::{CpalBackend, InputBackend};
///
/// let backend = CpalBackend::new();
/// for i in 0..backend.device_count() {
///     println!("{}: {}", i, backend.device_name(i).unwrap_or_default());
/// }
/// ```
pub struct CpalBackend {
    host: cpal::Host,
}

impl CpalBackend {
    /// Creates a backend over the platform's default audio host.
    #[must_use]
    pub fn new() -> Self {
        Self {
            host: cpal::default_host(),
        }
    }

    fn input_devices(&self) -> Result<Vec<Device>, CaptureError> {
        let devices = self
            .host
            .input_devices()
            .map_err(|e| CaptureError::BackendError(e.to_string()))?;
        Ok(devices.collect())
    }

    fn build_f32_stream(
        device: &Device,
        config: &CpalStreamConfig,
        mut producer: HeapProd<f32>,
    ) -> Result<Stream, CaptureError> {
        let stride = config.channels as usize;
        let stream = device
            .build_input_stream(
                config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    // Push whole frames only so the consumer never sees a
                    // partial frame; excess is dropped, never blocked on.
                    let fit = (producer.vacant_len() / stride) * stride;
                    let take = fit.min((data.len() / stride) * stride);
                    let _ = producer.push_slice(&data[..take]);
                },
                |err| {
                    tracing::error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| CaptureError::BackendError(e.to_string()))?;

        Ok(stream)
    }

    fn build_i16_stream(
        device: &Device,
        config: &CpalStreamConfig,
        mut producer: HeapProd<f32>,
    ) -> Result<Stream, CaptureError> {
        let stride = config.channels as usize;
        // Reused across callbacks; grows to the driver's delivery size once.
        let mut converted: Vec<f32> = Vec::new();
        let stream = device
            .build_input_stream(
                config,
                move |data: &[i16], _: &cpal::InputCallbackInfo| {
                    let fit = (producer.vacant_len() / stride) * stride;
                    let take = fit.min((data.len() / stride) * stride);
                    converted.clear();
                    converted.extend(data[..take].iter().map(|&s| f32::from(s) / I16_SCALE));
                    let _ = producer.push_slice(&converted);
                },
                |err| {
                    tracing::error!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| CaptureError::BackendError(e.to_string()))?;

        Ok(stream)
    }
}

impl Default for CpalBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl InputBackend for CpalBackend {
    fn device_count(&self) -> usize {
        self.input_devices().map_or(0, |devices| devices.len())
    }

    fn device_name(&self, index: usize) -> Option<String> {
        let devices = self.input_devices().ok()?;
        devices.get(index)?.name().ok()
    }

    fn open(&self, index: usize, config: &RouterConfig) -> Result<InputStream, CaptureError> {
        let devices = self.input_devices()?;
        let count = devices.len();
        let device = devices
            .into_iter()
            .nth(index)
            .ok_or(CaptureError::DeviceOutOfRange { index, count })?;

        let name = device
            .name()
            .unwrap_or_else(|_| format!("input {index}"));

        let supported = device
            .default_input_config()
            .map_err(|e| CaptureError::DeviceUnavailable {
                name: name.clone(),
                reason: e.to_string(),
            })?;

        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels();
        if channels == 0 {
            return Err(CaptureError::UnsupportedChannelCount { channels });
        }

        let latency = estimate_latency(sample_rate, supported.buffer_size(), config);
        let sample_format = supported.sample_format();
        let cpal_config: CpalStreamConfig = supported.into();

        let ring = HeapRb::<f32>::new(config.ring_samples(sample_rate, channels));
        let (producer, consumer) = ring.split();

        let stream = match sample_format {
            SampleFormat::F32 => Self::build_f32_stream(&device, &cpal_config, producer)?,
            SampleFormat::I16 => Self::build_i16_stream(&device, &cpal_config, producer)?,
            format => {
                return Err(CaptureError::UnsupportedFormat {
                    format: format!("{format:?}"),
                });
            }
        };

        stream
            .play()
            .map_err(|e| CaptureError::BackendError(e.to_string()))?;

        tracing::info!(
            "Opened capture stream: device='{}', {}Hz, {} channels, latency={:?}",
            name,
            sample_rate,
            channels,
            latency
        );

        Ok(InputStream::new(
            name,
            sample_rate,
            channels,
            latency,
            consumer,
            config.window_frames(sample_rate),
            Box::new(CpalStreamHandle { _stream: stream }),
        ))
    }

    fn name(&self) -> &'static str {
        "cpal"
    }
}

/// Keeps the CPAL stream alive; dropping this stops capture.
struct CpalStreamHandle {
    _stream: Stream,
}

impl StreamHandle for CpalStreamHandle {}

/// Static latency estimate: the driver's smallest callback buffer plus one
/// frame window. Reported on status surfaces, not measured live.
fn estimate_latency(
    sample_rate: u32,
    buffer_size: &SupportedBufferSize,
    config: &RouterConfig,
) -> Duration {
    let driver = match buffer_size {
        SupportedBufferSize::Range { min, .. } => {
            Duration::from_secs_f64(f64::from(*min) / f64::from(sample_rate))
        }
        SupportedBufferSize::Unknown => Duration::ZERO,
    };
    driver + config.window_duration
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latency_estimate_includes_window() {
        let config = RouterConfig {
            window_duration: Duration::from_millis(80),
            ..Default::default()
        };
        let buffer = SupportedBufferSize::Range { min: 480, max: 4096 };
        let latency = estimate_latency(48_000, &buffer, &config);
        // 480 frames at 48kHz = 10ms, plus the 80ms window.
        assert_eq!(latency, Duration::from_millis(90));
    }

    #[test]
    fn test_latency_estimate_unknown_buffer() {
        let config = RouterConfig::default();
        let latency = estimate_latency(48_000, &SupportedBufferSize::Unknown, &config);
        assert_eq!(latency, config.window_duration);
    }

    #[test]
    fn test_catalog_queries_dont_panic() {
        // May see zero devices in CI, but shouldn't panic.
        let backend = CpalBackend::new();
        let count = backend.device_count();
        let _ = backend.device_name(count);
    }

    // Note: open() requires actual audio hardware and is exercised in the
    // ignored integration test instead.
    #[test]
    #[ignore = "requires audio hardware"]
    fn test_open_first_device() {
        let backend = CpalBackend::new();
        let stream = backend.open(0, &RouterConfig::default()).unwrap();
        println!("Opened: {:?}", stream);
        assert!(stream.channel_count() >= 1);
    }
}
