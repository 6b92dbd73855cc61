//! Error types for mono-tap.
//!
//! All errors here are recoverable at the session level: a failed open
//! leaves the router with no active stream, and the caller is free to try
//! another device. Runtime conditions (short windows, truncation) are not
//! errors at all - they show up as structural facts in the extraction
//! buffer's `filled` count.

/// Errors surfaced while enumerating devices or opening a capture stream.
///
/// Returned from [`ChannelRouter::select_device()`] and
/// [`InputBackend::open()`]. None of these poison the router: after an
/// error the router holds no stream and a later open may succeed.
///
/// [`ChannelRouter::select_device()`]: crate::ChannelRouter::select_device
/// [`InputBackend::open()`]: crate::InputBackend::open
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The requested device index is outside the current catalog.
    #[error("device index {index} out of range (catalog has {count})")]
    DeviceOutOfRange {
        /// The index that was requested.
        index: usize,
        /// Number of devices in the catalog.
        count: usize,
    },

    /// The device exists but could not be opened.
    #[error("device unavailable: {name} - {reason}")]
    DeviceUnavailable {
        /// Name of the device that failed to open.
        name: String,
        /// Reason reported by the driver.
        reason: String,
    },

    /// The device's native sample format has no conversion path.
    #[error("unsupported sample format: {format}")]
    UnsupportedFormat {
        /// The format that wasn't supported.
        format: String,
    },

    /// The device reported a channel count the router cannot stride over.
    #[error("unsupported channel count: {channels}")]
    UnsupportedChannelCount {
        /// The channel count that was reported.
        channels: u16,
    },

    /// An error from the underlying audio library (CPAL).
    #[error("audio backend error: {0}")]
    BackendError(String),
}
