//! Selection events for monitoring device switches.
//!
//! Events are non-fatal notifications about selection outcomes. The
//! controller keeps running after every event - they're for logging and
//! UI refresh, not error handling.

/// Events emitted as the active device changes.
///
/// These are informational, not errors. Even [`OpenFailed`] leaves the
/// controller in a usable state (no stream, ready for the next pick).
/// Use the [`EventCallback`] to log these or refresh a frontend.
///
/// [`OpenFailed`]: SelectorEvent::OpenFailed
///
/// # Example
///
/// ```
/// use mono_tap::SelectorEvent;
///
/// fn handle_event(event: &SelectorEvent) {
///     match event {
///         SelectorEvent::DeviceOpened { name, sample_rate, channels } => {
///             eprintln!("Opened '{}': {}Hz, {} channels", name, sample_rate, channels);
///         }
///         SelectorEvent::DeviceClosed { name } => {
///             eprintln!("Closed '{}'", name);
///         }
///         SelectorEvent::OpenFailed { name, message } => {
///             eprintln!("Failed to open '{}': {}", name, message);
///         }
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub enum SelectorEvent {
    /// A capture stream was opened on a device.
    DeviceOpened {
        /// Name of the opened device.
        name: String,
        /// Negotiated sample rate in Hz.
        sample_rate: u32,
        /// Channel count of the interleaved stream.
        channels: u16,
    },

    /// The active capture stream was released.
    ///
    /// Emitted both for an explicit "none" selection and for the implicit
    /// release that precedes opening a different device.
    DeviceClosed {
        /// Name of the device that was closed.
        name: String,
    },

    /// Opening a device failed.
    ///
    /// The previous stream (if any) was already released by the time this
    /// fires, so the controller is idle, not stuck.
    OpenFailed {
        /// Name of the device that failed to open.
        name: String,
        /// Human-readable failure description.
        message: String,
    },
}

/// Callback type for receiving selection events.
///
/// Register one via [`SelectorController::on_event()`]. The callback runs
/// synchronously on the tick thread, so keep it cheap - push to a queue if
/// real work is needed.
///
/// [`SelectorController::on_event()`]: crate::SelectorController::on_event
pub type EventCallback = Box<dyn Fn(&SelectorEvent)>;
