//! Mock input backend for testing without hardware.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use ringbuf::traits::{Observer, Producer, Split};
use ringbuf::{HeapProd, HeapRb};

use crate::source::{InputBackend, InputStream, StreamHandle};
use crate::{CaptureError, RouterConfig};

/// An [`InputBackend`] over scripted devices.
///
/// This allows testing the full pipeline without actual audio hardware,
/// making it suitable for CI environments. Each added device comes with a
/// [`MockFeed`] handle that plays the role of the driver callback, and the
/// backend keeps open/close counts so tests can check that streams are
/// released before new ones are opened.
///
/// # Example
///
/// ```
/// use mono_tap::{InputBackend, MockBackend, RouterConfig};
///
/// let mut backend = MockBackend::new();
/// let feed = backend.add_device("Virtual Mic", 48_000, 2);
///
/// let _stream = backend.open(0, &RouterConfig::default()).unwrap();
/// feed.push(&[0.1, 0.2, 0.3, 0.4]);
/// ```
#[derive(Default)]
pub struct MockBackend {
    devices: Vec<MockDevice>,
    stats: MockStats,
}

struct MockDevice {
    name: String,
    sample_rate: u32,
    channels: u16,
    producer: Rc<RefCell<Option<HeapProd<f32>>>>,
    failure: Option<String>,
}

impl MockBackend {
    /// Creates a backend with an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a device to the catalog and returns its feed handle.
    ///
    /// The feed stays valid across re-opens of the same device: pushes go
    /// to whichever stream is currently open on it. A `channels` of zero
    /// is accepted here and rejected at open time, mirroring a driver
    /// that reports a nonsense configuration.
    pub fn add_device(&mut self, name: &str, sample_rate: u32, channels: u16) -> MockFeed {
        let producer = Rc::new(RefCell::new(None));
        self.devices.push(MockDevice {
            name: name.to_string(),
            sample_rate,
            channels,
            producer: Rc::clone(&producer),
            failure: None,
        });
        MockFeed { producer, channels }
    }

    /// Adds a device whose open always fails with the given reason.
    pub fn add_failing_device(&mut self, name: &str, reason: &str) {
        self.devices.push(MockDevice {
            name: name.to_string(),
            sample_rate: 0,
            channels: 0,
            producer: Rc::new(RefCell::new(None)),
            failure: Some(reason.to_string()),
        });
    }

    /// Returns a handle to the backend's open/close accounting.
    #[must_use]
    pub fn stats(&self) -> MockStats {
        self.stats.clone()
    }
}

impl InputBackend for MockBackend {
    fn device_count(&self) -> usize {
        self.devices.len()
    }

    fn device_name(&self, index: usize) -> Option<String> {
        self.devices.get(index).map(|d| d.name.clone())
    }

    fn open(&self, index: usize, config: &RouterConfig) -> Result<InputStream, CaptureError> {
        let count = self.devices.len();
        let device = self
            .devices
            .get(index)
            .ok_or(CaptureError::DeviceOutOfRange { index, count })?;

        if let Some(reason) = &device.failure {
            return Err(CaptureError::DeviceUnavailable {
                name: device.name.clone(),
                reason: reason.clone(),
            });
        }
        if device.channels == 0 {
            return Err(CaptureError::UnsupportedChannelCount {
                channels: device.channels,
            });
        }

        let ring = HeapRb::<f32>::new(config.ring_samples(device.sample_rate, device.channels));
        let (producer, consumer) = ring.split();
        *device.producer.borrow_mut() = Some(producer);

        self.stats.record_open();

        Ok(InputStream::new(
            device.name.clone(),
            device.sample_rate,
            device.channels,
            // No driver buffer behind a mock; the window bound is the
            // whole latency estimate.
            config.window_duration,
            consumer,
            config.window_frames(device.sample_rate),
            Box::new(MockStreamHandle {
                producer: Rc::clone(&device.producer),
                stats: self.stats.clone(),
            }),
        ))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

/// Feed handle for a mock device - the test's stand-in for the driver
/// callback thread.
pub struct MockFeed {
    producer: Rc<RefCell<Option<HeapProd<f32>>>>,
    channels: u16,
}

impl MockFeed {
    /// Pushes interleaved samples into the open stream's ring.
    ///
    /// Behaves like the real driver boundary: only whole frames that fit
    /// the ring are accepted, and a dangling partial frame is ignored.
    /// Returns the number of samples accepted - zero when the device is
    /// not open or the ring is full.
    pub fn push(&self, samples: &[f32]) -> usize {
        let mut slot = self.producer.borrow_mut();
        let Some(producer) = slot.as_mut() else {
            return 0;
        };
        let stride = self.channels.max(1) as usize;
        let fit = (producer.vacant_len() / stride) * stride;
        let take = fit.min((samples.len() / stride) * stride);
        producer.push_slice(&samples[..take])
    }
}

/// Open/close accounting shared between a [`MockBackend`] and its tests.
///
/// Cheap to clone; all clones observe the same counters.
#[derive(Debug, Clone, Default)]
pub struct MockStats {
    opens: Rc<Cell<usize>>,
    closes: Rc<Cell<usize>>,
    max_live: Rc<Cell<usize>>,
}

impl MockStats {
    /// Number of successful opens. Failed opens are not counted.
    #[must_use]
    pub fn opens(&self) -> usize {
        self.opens.get()
    }

    /// Number of streams that have been dropped.
    #[must_use]
    pub fn closes(&self) -> usize {
        self.closes.get()
    }

    /// Number of streams currently alive.
    #[must_use]
    pub fn live(&self) -> usize {
        self.opens.get() - self.closes.get()
    }

    /// High-water mark of concurrently live streams.
    ///
    /// Stays at 1 when every stream is released before the next open.
    #[must_use]
    pub fn max_live(&self) -> usize {
        self.max_live.get()
    }

    fn record_open(&self) {
        self.opens.set(self.opens.get() + 1);
        let live = self.opens.get() - self.closes.get();
        if live > self.max_live.get() {
            self.max_live.set(live);
        }
    }

    fn record_close(&self) {
        self.closes.set(self.closes.get() + 1);
    }
}

/// Counts the stream's release and disconnects the feed; the mock has no
/// real resource to stop.
struct MockStreamHandle {
    producer: Rc<RefCell<Option<HeapProd<f32>>>>,
    stats: MockStats,
}

impl StreamHandle for MockStreamHandle {}

impl Drop for MockStreamHandle {
    fn drop(&mut self) {
        *self.producer.borrow_mut() = None;
        self.stats.record_close();
    }
}
