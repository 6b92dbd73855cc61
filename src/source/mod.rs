//! Audio input sources and the backend seam.
//!
//! This module provides the interface between the platform's audio driver
//! and the rest of the mono-tap pipeline. [`InputBackend`] is the boundary:
//! the CPAL-backed [`CpalBackend`] in production, [`MockBackend`] in tests.
//! Both enumerate an index-addressed device catalog and open exclusive
//! capture streams over it.

mod device;
mod mock;
mod stream;

pub use device::CpalBackend;
pub use mock::{MockBackend, MockFeed, MockStats};
pub use stream::InputStream;

pub(crate) use stream::StreamHandle;

use crate::{CaptureError, RouterConfig};

/// A source of capture streams over an index-addressed device catalog.
///
/// The catalog is re-read from the driver on every call, so
/// [`device_count`](Self::device_count) and
/// [`device_name`](Self::device_name) always reflect the current hardware
/// set. Indices are only meaningful against the catalog they came from;
/// callers that cache them (a dropdown, say) must tolerate
/// [`CaptureError::DeviceOutOfRange`] from a stale pick.
///
/// There is no `Send` bound here: CPAL streams are not `Send`, and the
/// whole pipeline lives on one thread.
pub trait InputBackend {
    /// Number of input devices currently visible.
    fn device_count(&self) -> usize;

    /// Name of the device at `index`.
    ///
    /// Returns `None` if the index is out of range or the driver cannot
    /// produce a name for the device.
    fn device_name(&self, index: usize) -> Option<String>;

    /// Opens an exclusive capture stream on the device at `index`.
    ///
    /// The returned stream captures for as long as it is held. Callers
    /// that already hold a stream must drop it first; backends do not
    /// arbitrate sharing.
    ///
    /// # Errors
    ///
    /// Returns [`CaptureError::DeviceOutOfRange`] for a stale index, or a
    /// driver-specific error if the device cannot be opened.
    fn open(&self, index: usize, config: &RouterConfig) -> Result<InputStream, CaptureError>;

    /// Backend name for logging/debugging.
    fn name(&self) -> &'static str;
}
