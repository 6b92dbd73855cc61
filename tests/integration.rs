//! Integration tests for mono-tap.
//!
//! Everything here drives the public API over [`MockBackend`], so the suite
//! runs without audio hardware. Tests that need a real device are marked
//! with `#[ignore]` and should be run manually.

use std::time::Duration;

use approx::assert_relative_eq;
use mono_tap::{
    CaptureError, Levels, MockBackend, MockFeed, MockStats, RouterConfig, SelectorController,
    StatusSnapshot,
};

/// Builds a selector over a mock backend with one stereo device.
fn stereo_rig(config: RouterConfig) -> (MockFeed, MockStats, SelectorController) {
    let mut backend = MockBackend::new();
    let feed = backend.add_device("Virtual Mic", 48_000, 2);
    let stats = backend.stats();
    let selector = SelectorController::new(Box::new(backend), config);
    (feed, stats, selector)
}

#[test]
fn test_fill_count_tracks_whole_frames() {
    let (feed, _stats, mut selector) = stereo_rig(RouterConfig::default());
    selector.on_device_chosen(1).unwrap();

    // Five interleaved samples at two channels: two whole frames, the
    // dangling sample never enters the ring.
    assert_eq!(feed.push(&[1.0, 2.0, 3.0, 4.0, 5.0]), 4);
    selector.tick();
    assert_eq!(selector.router().filled(), 2);
    assert_eq!(selector.router().extracted(), &[1.0, 3.0]);

    // A quiet tick leaves no valid samples behind.
    selector.tick();
    assert_eq!(selector.router().filled(), 0);
    assert!(selector.router().extracted().is_empty());
}

#[test]
fn test_routes_selected_channel_with_gain() {
    let (feed, _stats, mut selector) = stereo_rig(RouterConfig::default());
    selector.on_device_chosen(1).unwrap();
    selector.on_channel_chosen(1);
    selector.set_gain(10.0);

    feed.push(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    selector.tick();
    assert_eq!(selector.router().extracted(), &[20.0, 40.0, 60.0]);
    assert_eq!(selector.router().filled(), 3);
}

#[test]
fn test_extraction_truncates_at_capacity() {
    let config = RouterConfig {
        extraction_capacity: 2,
        ..Default::default()
    };
    let (feed, _stats, mut selector) = stereo_rig(config);
    selector.on_device_chosen(1).unwrap();
    selector.on_channel_chosen(1);
    selector.set_gain(10.0);

    // Three stereo frames against a two-sample buffer: extraction stops at
    // capacity and reports only what it wrote.
    feed.push(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    selector.tick();
    assert_eq!(selector.router().extracted(), &[20.0, 40.0]);
    assert_eq!(selector.router().filled(), 2);
}

#[test]
fn test_gain_is_linear_over_extraction() {
    let window = [0.11f32, -0.42, 0.87, 0.33, -0.96, 0.5];

    let (feed, _stats, mut selector) = stereo_rig(RouterConfig::default());
    selector.on_device_chosen(1).unwrap();

    // Unity-gain pass first.
    feed.push(&window);
    selector.tick();
    let reference: Vec<f32> = selector.router().extracted().to_vec();
    assert_eq!(reference.len(), 3);

    // Same window again, amplified.
    feed.push(&window);
    selector.set_gain(1.7);
    selector.tick();

    let amplified = selector.router().extracted();
    assert_eq!(amplified.len(), reference.len());
    for (amplified, reference) in amplified.iter().zip(&reference) {
        assert_relative_eq!(*amplified, reference * 1.7, epsilon = 1e-6);
    }
}

#[test]
fn test_device_switch_releases_before_opening() {
    let mut backend = MockBackend::new();
    let _feed_a = backend.add_device("A", 48_000, 1);
    let _feed_b = backend.add_device("B", 44_100, 2);
    let stats = backend.stats();
    let mut selector = SelectorController::new(Box::new(backend), RouterConfig::default());

    selector.on_device_chosen(1).unwrap();
    assert_eq!((stats.opens(), stats.closes()), (1, 0));

    // Hot-switch: the first stream must be gone before the second opens.
    selector.on_device_chosen(2).unwrap();
    assert_eq!((stats.opens(), stats.closes()), (2, 1));
    assert_eq!(stats.max_live(), 1);

    selector.on_device_chosen(0).unwrap();
    assert_eq!(stats.opens(), stats.closes());
    assert_eq!(stats.live(), 0);
}

#[test]
fn test_open_failure_leaves_an_empty_router() {
    let mut backend = MockBackend::new();
    let feed = backend.add_device("Good Mic", 48_000, 2);
    backend.add_failing_device("Broken Mic", "device is busy");
    let stats = backend.stats();
    let mut selector = SelectorController::new(Box::new(backend), RouterConfig::default());

    // Streaming normally first.
    selector.on_device_chosen(1).unwrap();
    feed.push(&[0.5, 0.5]);
    selector.tick();
    assert_eq!(selector.router().filled(), 1);

    // The failed open must not leave a half-open stream behind.
    let err = selector.on_device_chosen(2).unwrap_err();
    assert!(matches!(err, CaptureError::DeviceUnavailable { .. }));
    assert!(!selector.router().is_streaming());
    assert!(selector.channel_labels().is_empty());
    assert_eq!(stats.live(), 0);

    selector.tick();
    assert_eq!(selector.router().filled(), 0);

    // The failure is not sticky; the good device opens again.
    selector.on_device_chosen(1).unwrap();
    assert!(selector.router().is_streaming());
}

#[test]
fn test_channel_beyond_stream_range_is_clamped() {
    let (feed, _stats, mut selector) = stereo_rig(RouterConfig::default());
    selector.on_device_chosen(1).unwrap();

    // Channel 5 on a two-channel stream: pinned to the last real channel.
    selector.on_channel_chosen(5);
    feed.push(&[0.1, 0.9, 0.2, 0.8]);
    selector.tick();
    assert_eq!(selector.router().extracted(), &[0.9, 0.8]);
}

#[test]
fn test_selecting_none_closes_the_stream() {
    let (feed, stats, mut selector) = stereo_rig(RouterConfig::default());
    selector.on_device_chosen(1).unwrap();
    feed.push(&[0.3, 0.3]);
    selector.tick();
    assert_eq!(selector.router().filled(), 1);

    selector.on_device_chosen(0).unwrap();
    assert!(!selector.router().is_streaming());
    assert!(selector.channel_labels().is_empty());
    assert_eq!(stats.live(), 0);

    selector.tick();
    assert_eq!(selector.router().filled(), 0);
    assert_eq!(selector.status(), StatusSnapshot::default());
}

/// Walks a whole operator session over the mock backend: enumerate, open,
/// meter some audio, hot-switch, and shut down.
#[test]
fn test_full_session_with_mock_backend() {
    let mut backend = MockBackend::new();
    let feed_desk = backend.add_device("Desk Mixer", 48_000, 2);
    let feed_cam = backend.add_device("Camera Mic", 44_100, 1);
    let stats = backend.stats();
    let mut selector = SelectorController::new(Box::new(backend), RouterConfig::default());

    assert_eq!(selector.device_labels(), ["--", "Desk Mixer", "Camera Mic"]);

    // Open the mixer and route its right channel.
    let status = selector.on_device_chosen(1).unwrap();
    assert_eq!(status.sample_rate, 48_000);
    selector.on_channel_chosen(1);

    // A loud right channel against a silent left one.
    feed_desk.push(&[0.0, 0.5, 0.0, -0.5, 0.0, 0.5, 0.0, -0.5]);
    selector.tick();

    let levels = Levels::measure(selector.router().extracted());
    assert_relative_eq!(levels.peak, 0.5, epsilon = 1e-6);
    assert_relative_eq!(levels.rms, 0.5, epsilon = 1e-6);
    assert!(selector.status_line().starts_with("Sampling rate: 48000Hz"));

    // Hot-switch to the camera; the old feed is disconnected.
    selector.on_device_chosen(2).unwrap();
    assert_eq!(feed_desk.push(&[0.9, 0.9]), 0);
    assert_eq!(selector.channel_labels(), ["Channel 1"]);

    feed_cam.push(&[0.25, 0.25]);
    selector.tick();
    assert_eq!(selector.router().extracted(), &[0.25, 0.25]);

    // Shut down; every open has a matching close.
    selector.on_device_chosen(0).unwrap();
    assert_eq!(stats.opens(), 2);
    assert_eq!(stats.closes(), 2);
    assert_eq!(stats.max_live(), 1);
}

/// This test requires actual audio hardware and should be run manually.
#[test]
#[ignore = "requires audio hardware"]
fn test_real_capture() {
    use mono_tap::CpalBackend;

    let mut selector =
        SelectorController::new(Box::new(CpalBackend::new()), RouterConfig::default());
    assert!(
        selector.device_labels().len() > 1,
        "no input devices present"
    );

    selector
        .on_device_chosen(1)
        .expect("Failed to open capture stream");

    // Capture for roughly half a second.
    let mut total_samples = 0;
    for _ in 0..30 {
        std::thread::sleep(Duration::from_millis(16));
        selector.tick();
        total_samples += selector.router().filled();
    }

    println!(
        "Captured {} samples: {}",
        total_samples,
        selector.status_line()
    );
    assert!(total_samples > 0, "Should have captured some audio");
}
