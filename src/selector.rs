//! Device/channel selection orchestration over the router.

use crate::event::{EventCallback, SelectorEvent};
use crate::pipeline::ChannelRouter;
use crate::source::InputBackend;
use crate::{CaptureError, RouterConfig};

/// Label for the reserved "no device" entry at the top of the device list.
const NONE_LABEL: &str = "--";

/// Read-only status summary for display.
///
/// All-zero when no stream is open, including the gain field - an idle
/// selector reports nothing rather than leftover settings.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StatusSnapshot {
    /// Sample rate in Hz; 0 when no stream is open.
    pub sample_rate: u32,
    /// Estimated capture latency in seconds; 0.0 when no stream is open.
    pub latency_seconds: f64,
    /// Gain as a display percentage (gain 1.0 reads as 100.0).
    pub gain_percent: f32,
}

impl std::fmt::Display for StatusSnapshot {
    /// Formats as the operator-facing status line.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Sampling rate: {}Hz / Software Latency: {:.2}ms / Amplifier: {:.0}%",
            self.sample_rate,
            self.latency_seconds * 1000.0,
            self.gain_percent,
        )
    }
}

/// Thin orchestration over [`ChannelRouter`] for a selection UI.
///
/// Owns the router outright: device switches, channel switches, gain, and
/// the tick all go through here, so there is exactly one mutator of the
/// capture lifecycle. UI components are passive renderers of
/// [`status`](Self::status) / [`status_line`](Self::status_line) and the
/// label lists; they never touch the stream themselves.
///
/// # Lifecycle
///
/// 1. Created over a backend; the device list is built immediately with a
///    reserved "none" entry at index 0
/// 2. [`on_device_chosen`](Self::on_device_chosen) opens/releases streams
///    as the operator picks entries
/// 3. [`tick`](Self::tick) runs the extraction each frame
/// 4. Dropping the selector releases any open stream
///
/// # Example
///
/// ```
/// use mono_tap::{MockBackend, RouterConfig, SelectorController};
///
/// let mut backend = MockBackend::new();
/// let feed = backend.add_device("Virtual Mic", 48_000, 2);
///
/// let mut selector = SelectorController::new(Box::new(backend), RouterConfig::default());
/// assert_eq!(selector.device_labels(), ["--", "Virtual Mic"]);
///
/// selector.on_device_chosen(1)?;
/// assert_eq!(selector.channel_labels(), ["Channel 1", "Channel 2"]);
///
/// feed.push(&[0.1, 0.2]);
/// selector.tick();
/// assert_eq!(selector.router().extracted(), &[0.1]);
/// # Ok::<(), mono_tap::CaptureError>(())
/// ```
pub struct SelectorController {
    router: ChannelRouter,
    device_labels: Vec<String>,
    channel_labels: Vec<String>,
    /// Message from the most recent failed open, cleared on the next pick.
    last_failure: Option<String>,
    callback: Option<EventCallback>,
}

impl SelectorController {
    /// Creates a selector over the given backend and builds the initial
    /// device list.
    #[must_use]
    pub fn new(backend: Box<dyn InputBackend>, config: RouterConfig) -> Self {
        let mut selector = Self {
            router: ChannelRouter::new(backend, config),
            device_labels: Vec::new(),
            channel_labels: Vec::new(),
            last_failure: None,
            callback: None,
        };
        selector.refresh_devices();
        selector
    }

    /// Registers a callback for selection events.
    ///
    /// Runs synchronously on the tick thread; keep it cheap.
    pub fn on_event<F>(&mut self, callback: F)
    where
        F: Fn(&SelectorEvent) + 'static,
    {
        self.callback = Some(Box::new(callback));
    }

    /// Rebuilds the device list from the backend's current catalog.
    ///
    /// The list always starts with the reserved "none" entry, so UI index
    /// `i` maps to catalog index `i - 1`. An open stream is unaffected -
    /// refreshing labels never touches the capture lifecycle.
    pub fn refresh_devices(&mut self) {
        self.device_labels.clear();
        self.device_labels.push(NONE_LABEL.to_string());
        for i in 0..self.router.device_count() {
            let label = self
                .router
                .device_name(i)
                .unwrap_or_else(|| format!("Device {i}"));
            self.device_labels.push(label);
        }
    }

    /// Handles a device pick from the UI.
    ///
    /// Index 0 is the reserved "none" entry: the current stream (if any)
    /// is released and the selector goes idle. Any other index is offset
    /// past the reserved entry and opened through the router. Whatever
    /// happens, the previous stream is released first and the channel
    /// list is cleared; on success it is rebuilt as `Channel 1..N` with
    /// the selection reset to the first channel.
    ///
    /// # Errors
    ///
    /// Returns the open failure after recording its message for
    /// [`status_line`](Self::status_line) and emitting
    /// [`SelectorEvent::OpenFailed`]. The selector is idle afterwards,
    /// not stuck: a later pick may succeed.
    pub fn on_device_chosen(&mut self, ui_index: usize) -> Result<StatusSnapshot, CaptureError> {
        self.last_failure = None;
        if let Some(name) = self.router.release() {
            self.emit(SelectorEvent::DeviceClosed { name });
        }
        self.channel_labels.clear();

        if ui_index == 0 {
            return Ok(self.status());
        }
        let device_index = ui_index - 1;

        match self.router.select_device(device_index) {
            Ok(()) => {
                let opened = self.router.stream().map(|stream| {
                    (
                        stream.device_name().to_string(),
                        stream.sample_rate(),
                        stream.channel_count(),
                    )
                });
                if let Some((name, sample_rate, channels)) = opened {
                    self.router.set_channel(0);
                    self.channel_labels = (1..=channels).map(|i| format!("Channel {i}")).collect();
                    self.emit(SelectorEvent::DeviceOpened {
                        name,
                        sample_rate,
                        channels,
                    });
                }
                Ok(self.status())
            }
            Err(e) => {
                let name = self
                    .device_labels
                    .get(ui_index)
                    .cloned()
                    .unwrap_or_else(|| format!("device {device_index}"));
                let message = e.to_string();
                self.last_failure = Some(message.clone());
                self.emit(SelectorEvent::OpenFailed { name, message });
                Err(e)
            }
        }
    }

    /// Handles a channel pick from the UI.
    ///
    /// Clamped into the current channel list; ignored while no stream is
    /// open (there are no channels to pick).
    pub fn on_channel_chosen(&mut self, index: usize) {
        if self.channel_labels.is_empty() {
            return;
        }
        self.router.set_channel(index.min(self.channel_labels.len() - 1));
    }

    /// Sets the extraction gain. Takes effect on the next tick.
    pub fn set_gain(&mut self, gain: f32) {
        self.router.set_gain(gain);
    }

    /// Runs one extraction step on the router.
    pub fn tick(&mut self) {
        self.router.tick();
    }

    /// Read access to the router for downstream consumers.
    ///
    /// All mutation goes through the selector's own operations; consumers
    /// use this for [`extracted`](ChannelRouter::extracted) and stream
    /// metadata.
    pub fn router(&self) -> &ChannelRouter {
        &self.router
    }

    /// The presentable device list, "none" entry first.
    pub fn device_labels(&self) -> &[String] {
        &self.device_labels
    }

    /// The presentable channel list for the open stream; empty when idle.
    pub fn channel_labels(&self) -> &[String] {
        &self.channel_labels
    }

    /// The message from the most recent failed open, if any.
    pub fn last_failure(&self) -> Option<&str> {
        self.last_failure.as_deref()
    }

    /// Read-only status summary; all-zero when no stream is open.
    pub fn status(&self) -> StatusSnapshot {
        match self.router.stream() {
            Some(stream) => StatusSnapshot {
                sample_rate: stream.sample_rate(),
                latency_seconds: stream.latency().as_secs_f64(),
                gain_percent: self.router.gain() * 100.0,
            },
            None => StatusSnapshot::default(),
        }
    }

    /// One-line status text for display.
    ///
    /// While streaming: the [`StatusSnapshot`] rendering (sampling rate,
    /// software latency, amplifier percentage). After a failed open:
    /// `Error: {message}` until the next pick. Idle: empty string.
    pub fn status_line(&self) -> String {
        if self.router.is_streaming() {
            self.status().to_string()
        } else if let Some(message) = &self.last_failure {
            format!("Error: {message}")
        } else {
            String::new()
        }
    }

    fn emit(&self, event: SelectorEvent) {
        if let Some(callback) = &self.callback {
            callback(&event);
        }
    }
}
