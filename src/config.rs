//! Configuration types for the capture pipeline.

use std::time::Duration;

/// Configuration for the router and the streams it opens.
///
/// Use [`RouterConfig::default()`] for sensible defaults, or customize as
/// needed. The same config is handed to the backend on every open, so
/// changing it between opens takes effect on the next device switch.
///
/// # Example
///
/// ```
/// use mono_tap::RouterConfig;
/// use std::time::Duration;
///
/// let config = RouterConfig {
///     window_duration: Duration::from_millis(40),
///     ..Default::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Upper bound on the frame window a single tick will present.
    ///
    /// Data older than this is trimmed away before extraction, so a stalled
    /// consumer sees fresh audio rather than an ever-growing backlog.
    /// Default: 80ms
    pub window_duration: Duration,

    /// Capacity of the lock-free ring between the driver callback and the
    /// tick thread.
    ///
    /// This buffer absorbs scheduling jitter. If it fills, the driver
    /// callback discards whole frames rather than blocking.
    /// Default: 250ms
    pub ring_duration: Duration,

    /// Capacity of the extraction buffer, in samples of the routed channel.
    ///
    /// Allocated once per router. A tick never writes more than this many
    /// samples; extra frames in the window are truncated.
    /// Default: 4096
    pub extraction_capacity: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            window_duration: Duration::from_millis(80),
            ring_duration: Duration::from_millis(250),
            extraction_capacity: 4096,
        }
    }
}

impl RouterConfig {
    /// Ring capacity in interleaved samples for a stream with the given
    /// rate and channel count, rounded up to whole frames.
    #[must_use]
    pub(crate) fn ring_samples(&self, sample_rate: u32, channels: u16) -> usize {
        let frames = duration_to_frames(self.ring_duration, sample_rate).max(1);
        frames * channels as usize
    }

    /// Window capacity in frames for a stream with the given rate.
    #[must_use]
    pub(crate) fn window_frames(&self, sample_rate: u32) -> usize {
        duration_to_frames(self.window_duration, sample_rate).max(1)
    }
}

fn duration_to_frames(duration: Duration, sample_rate: u32) -> usize {
    (duration.as_secs_f64() * f64::from(sample_rate)).ceil() as usize
}
