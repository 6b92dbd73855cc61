//! Live capture stream state shared by all backends.

use std::time::Duration;

use ringbuf::traits::{Consumer, Observer};
use ringbuf::HeapCons;

/// Platform handle that keeps a capture stream running.
///
/// This is a pure RAII seam: implementations carry whatever the backend
/// needs to keep capture alive (a CPAL stream, a mock bookkeeping handle),
/// and dropping the box stops capture. No methods - the drop is the API.
pub(crate) trait StreamHandle {}

/// An open, running capture stream.
///
/// Holds the consumer side of the lock-free ring fed by the driver
/// callback, plus the stream's negotiated format. Capture continues while
/// this struct is held; dropping it stops the stream and releases the
/// device.
///
/// The stream's frame window is refreshed by the router once per tick and
/// holds the interleaved samples that arrived since the previous tick,
/// trimmed to the newest whole frames within the configured window bound.
pub struct InputStream {
    device_name: String,
    sample_rate: u32,
    channels: u16,
    latency: Duration,
    consumer: HeapCons<f32>,
    window: Vec<f32>,
    /// Window bound in interleaved samples (whole frames).
    window_samples: usize,
    /// Dropping this stops the platform stream.
    _handle: Box<dyn StreamHandle>,
}

impl InputStream {
    /// Builds a stream around a ring consumer and its platform handle.
    ///
    /// The window vector is sized to the ring capacity up front so the
    /// refresh path never allocates.
    pub(crate) fn new(
        device_name: String,
        sample_rate: u32,
        channels: u16,
        latency: Duration,
        consumer: HeapCons<f32>,
        window_frames: usize,
        handle: Box<dyn StreamHandle>,
    ) -> Self {
        let window = Vec::with_capacity(consumer.capacity().get());
        Self {
            device_name,
            sample_rate,
            channels,
            latency,
            consumer,
            window,
            window_samples: window_frames * channels as usize,
            _handle: handle,
        }
    }

    /// Name of the device this stream captures from.
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Negotiated sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Channel count of the interleaved stream. Always at least 1.
    pub fn channel_count(&self) -> u16 {
        self.channels
    }

    /// Estimated capture latency for this stream.
    ///
    /// A static per-open figure (driver callback buffer plus one window),
    /// reported for status surfaces; not a live measurement.
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// The interleaved samples gathered by the last [`refresh`](Self::refresh).
    ///
    /// Always a whole number of frames. Empty if the driver delivered
    /// nothing since the previous tick.
    pub fn frame_window(&self) -> &[f32] {
        &self.window
    }

    /// Drains the ring into the frame window.
    ///
    /// Takes everything that has arrived since the last call, then keeps
    /// only the newest frames that fit the window bound. Trimming drops
    /// whole frames from the front so channel positions stay aligned.
    pub(crate) fn refresh(&mut self) {
        self.window.clear();

        // Read in chunks, bounded by what had arrived when the tick began.
        let mut drain_buf = [0.0f32; 512];
        let mut remaining = self.consumer.occupied_len();
        while remaining > 0 {
            let to_read = remaining.min(drain_buf.len());
            let read = self.consumer.pop_slice(&mut drain_buf[..to_read]);
            if read == 0 {
                break;
            }
            self.window.extend_from_slice(&drain_buf[..read]);
            remaining -= read;
        }

        if self.window.len() > self.window_samples {
            let stride = self.channels as usize;
            let excess = self.window.len() - self.window_samples;
            let excess = excess.div_ceil(stride) * stride;
            self.window.drain(..excess);
        }
    }
}

impl std::fmt::Debug for InputStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InputStream")
            .field("device_name", &self.device_name)
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .field("latency", &self.latency)
            .field("window_len", &self.window.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ringbuf::traits::{Producer, Split};
    use ringbuf::{HeapProd, HeapRb};

    struct NoopHandle;
    impl StreamHandle for NoopHandle {}

    fn stream_with_ring(
        channels: u16,
        ring_samples: usize,
        window_frames: usize,
    ) -> (HeapProd<f32>, InputStream) {
        let (producer, consumer) = HeapRb::<f32>::new(ring_samples).split();
        let stream = InputStream::new(
            "test device".to_string(),
            48_000,
            channels,
            Duration::from_millis(10),
            consumer,
            window_frames,
            Box::new(NoopHandle),
        );
        (producer, stream)
    }

    #[test]
    fn test_refresh_takes_everything_since_last_tick() {
        let (mut producer, mut stream) = stream_with_ring(2, 64, 16);
        producer.push_slice(&[1.0, 2.0, 3.0, 4.0]);

        stream.refresh();
        assert_eq!(stream.frame_window(), &[1.0, 2.0, 3.0, 4.0]);

        // Nothing new arrived: the next window is empty, not a replay.
        stream.refresh();
        assert!(stream.frame_window().is_empty());
    }

    #[test]
    fn test_refresh_trims_to_newest_whole_frames() {
        // Window bound: 2 frames of 2 channels = 4 samples.
        let (mut producer, mut stream) = stream_with_ring(2, 64, 2);
        producer.push_slice(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

        stream.refresh();
        // Oldest frame (1.0, 2.0) dropped; the kept frames stay aligned.
        assert_eq!(stream.frame_window(), &[3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_refresh_keeps_exact_fit_untrimmed() {
        let (mut producer, mut stream) = stream_with_ring(2, 64, 2);
        producer.push_slice(&[1.0, 2.0, 3.0, 4.0]);

        stream.refresh();
        assert_eq!(stream.frame_window(), &[1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_window_is_whole_frames_after_trim() {
        let (mut producer, mut stream) = stream_with_ring(3, 99, 2);
        // 5 frames of 3 channels against a 2-frame window.
        let samples: Vec<f32> = (0..15).map(|i| i as f32).collect();
        producer.push_slice(&samples);

        stream.refresh();
        assert_eq!(stream.frame_window().len() % 3, 0);
        assert_eq!(stream.frame_window(), &[9.0, 10.0, 11.0, 12.0, 13.0, 14.0]);
    }

    #[test]
    fn test_metadata_accessors() {
        let (_producer, stream) = stream_with_ring(2, 64, 16);
        assert_eq!(stream.device_name(), "test device");
        assert_eq!(stream.sample_rate(), 48_000);
        assert_eq!(stream.channel_count(), 2);
        assert_eq!(stream.latency(), Duration::from_millis(10));
    }
}
