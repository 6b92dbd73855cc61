//! Channel router - the tick-driven core of the pipeline.

use crate::source::{InputBackend, InputStream};
use crate::{CaptureError, RouterConfig};

/// Routes one channel of a capture stream into a fixed extraction buffer.
///
/// The router owns the backend, at most one open [`InputStream`], the
/// channel selection, and the gain. Everything is driven by
/// [`tick`](Self::tick): each call refreshes the stream's frame window,
/// strides the selected channel out of it with gain applied, and updates
/// the `filled` watermark. Between ticks the extracted prefix is stable
/// and free to read.
///
/// The extraction buffer is allocated once at construction and never
/// resized; a window with more frames than fit is truncated, and that
/// shows up as `filled == capacity` rather than as an error.
///
/// # Example
///
/// ```
/// use mono_tap::{ChannelRouter, MockBackend, RouterConfig};
///
/// let mut backend = MockBackend::new();
/// let feed = backend.add_device("Virtual Mic", 48_000, 2);
///
/// let mut router = ChannelRouter::new(Box::new(backend), RouterConfig::default());
/// router.select_device(0)?;
/// router.set_channel(1);
///
/// feed.push(&[0.1, 0.5, 0.2, 0.6]);
/// router.tick();
/// assert_eq!(router.extracted(), &[0.5, 0.6]);
/// # Ok::<(), mono_tap::CaptureError>(())
/// ```
pub struct ChannelRouter {
    backend: Box<dyn InputBackend>,
    config: RouterConfig,
    stream: Option<InputStream>,
    /// Requested channel; clamped against the live stream at tick time.
    channel: usize,
    gain: f32,
    extraction: Box<[f32]>,
    filled: usize,
    ticks: u64,
}

impl ChannelRouter {
    /// Creates a router over the given backend with no stream open.
    #[must_use]
    pub fn new(backend: Box<dyn InputBackend>, config: RouterConfig) -> Self {
        tracing::debug!(
            "ChannelRouter created: backend={}, extraction capacity={}",
            backend.name(),
            config.extraction_capacity
        );
        Self {
            extraction: vec![0.0; config.extraction_capacity].into_boxed_slice(),
            backend,
            config,
            stream: None,
            channel: 0,
            gain: 1.0,
            filled: 0,
            ticks: 0,
        }
    }

    /// Number of input devices currently visible to the backend.
    pub fn device_count(&self) -> usize {
        self.backend.device_count()
    }

    /// Name of the device at `index` in the backend's catalog.
    pub fn device_name(&self, index: usize) -> Option<String> {
        self.backend.device_name(index)
    }

    /// The open stream, if any.
    pub fn stream(&self) -> Option<&InputStream> {
        self.stream.as_ref()
    }

    /// True while a capture stream is open.
    pub fn is_streaming(&self) -> bool {
        self.stream.is_some()
    }

    /// Opens the device at `index`, releasing any current stream first.
    ///
    /// The release happens unconditionally, so on failure the router is
    /// left with no stream rather than the previous one - a failed switch
    /// never keeps stale audio flowing.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unchanged; see [`CaptureError`].
    pub fn select_device(&mut self, index: usize) -> Result<(), CaptureError> {
        self.release();
        match self.backend.open(index, &self.config) {
            Ok(stream) => {
                self.stream = Some(stream);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("Failed to open device {}: {}", index, e);
                Err(e)
            }
        }
    }

    /// Releases the open stream and clears the watermark.
    ///
    /// Returns the name of the device that was streaming, or `None` if
    /// nothing was open. Safe to call repeatedly.
    pub fn release(&mut self) -> Option<String> {
        self.filled = 0;
        let stream = self.stream.take()?;
        let name = stream.device_name().to_string();
        tracing::info!("Released capture stream: device='{}'", name);
        Some(name)
    }

    /// Selects which channel of the interleaved stream to extract.
    ///
    /// The value is kept as requested; if it exceeds the live stream's
    /// channel count it is clamped to the highest valid channel at tick
    /// time, so a stale selection degrades instead of reading out of
    /// bounds.
    pub fn set_channel(&mut self, channel: usize) {
        self.channel = channel;
    }

    /// The requested channel index.
    pub fn channel(&self) -> usize {
        self.channel
    }

    /// Sets the linear gain applied during extraction.
    ///
    /// Applied as-is: values above 1.0 amplify, negatives invert phase,
    /// and nothing is clamped. 1.0 by default.
    pub fn set_gain(&mut self, gain: f32) {
        self.gain = gain;
    }

    /// The linear gain applied during extraction.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    /// The router's configuration.
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Runs one pipeline step.
    ///
    /// Refreshes the stream's frame window, then copies the selected
    /// channel into the extraction buffer with gain applied and updates
    /// the watermark. With no stream open this only clears the watermark.
    ///
    /// `filled` ends up as `min(window frames, capacity)`: a quiet tick
    /// yields 0, a burst beyond capacity is truncated at `capacity`.
    pub fn tick(&mut self) {
        let Some(stream) = self.stream.as_mut() else {
            self.filled = 0;
            return;
        };
        stream.refresh();

        let window = stream.frame_window();
        let stride = stream.channel_count() as usize;
        let frames = (window.len() / stride).min(self.extraction.len());
        let channel = self.channel.min(stride - 1);

        for i in 0..frames {
            self.extraction[i] = window[i * stride + channel] * self.gain;
        }
        self.filled = frames;

        self.ticks += 1;
        if self.ticks % 500 == 0 {
            tracing::debug!(
                "ChannelRouter tick #{}: {} frames extracted (channel {})",
                self.ticks,
                frames,
                channel
            );
        }
    }

    /// The valid prefix of the extraction buffer.
    ///
    /// Stable until the next call to [`tick`](Self::tick) or
    /// [`select_device`](Self::select_device). Samples past `filled` are
    /// stale leftovers and are deliberately not exposed.
    pub fn extracted(&self) -> &[f32] {
        &self.extraction[..self.filled]
    }

    /// Number of valid samples in the extraction buffer.
    pub fn filled(&self) -> usize {
        self.filled
    }
}
