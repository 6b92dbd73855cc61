//! # mono-tap
//!
//! Real-time audio input capture with single-channel routing.
//!
//! `mono-tap` discovers input devices, owns the lifecycle of one capture
//! stream at a time, and on every application tick extracts one
//! operator-selected channel from the freshest multi-channel frame window
//! into a flat buffer - ready for a level meter, a timecode decoder, or
//! any other mono consumer.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mono_tap::{CpalBackend, Levels, RouterConfig, SelectorController};
//!
//! let mut selector = SelectorController::new(
//!     Box::new(CpalBackend::new()),
//!     RouterConfig::default(),
//! );
//!
//! // Device list: "--" first, then the catalog.
//! for (i, label) in selector.device_labels().iter().enumerate() {
//!     println!("{i}: {label}");
//! }
//!
//! // Pick the first real device and its first channel.
//! selector.on_device_chosen(1)?;
//! selector.on_channel_chosen(0);
//!
//! // Drive the pipeline from your update loop.
//! for _ in 0..300 {
//!     selector.tick();
//!     let levels = Levels::measure(selector.router().extracted());
//!     println!("{} | rms {:.1} dB", selector.status_line(), levels.rms_db());
//!     std::thread::sleep(std::time::Duration::from_millis(16));
//! }
//! # Ok::<(), mono_tap::CaptureError>(())
//! ```
//!
//! ## Architecture
//!
//! The crate maintains a strict thread boundary:
//!
//! - **Driver Thread**: High-priority audio callback that never blocks;
//!   pushes whole frames into a lock-free SPSC ring
//! - **Tick Thread**: Everything else - device switching, window refresh,
//!   channel extraction - runs single-threaded, driven by your loop
//!
//! Short windows, truncation, and quiet ticks are structural conditions
//! read off the extraction watermark, not errors; the only `Result`s in
//! the API are around opening devices.

#![warn(missing_docs)]
// Audio code requires intentional numeric casts between sample formats
#![allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap,
    clippy::cast_lossless
)]
// unwrap/expect allowed in tests only
#![allow(clippy::unwrap_used)]
// These doc lints are too strict for internal implementation details
#![allow(clippy::missing_panics_doc, clippy::missing_errors_doc)]

mod config;
mod error;
mod event;
mod pipeline;
mod selector;
pub mod source;

pub use config::RouterConfig;
pub use error::CaptureError;
pub use event::{EventCallback, SelectorEvent};
pub use pipeline::{ChannelRouter, Levels, SILENCE_FLOOR_DB};
pub use selector::{SelectorController, StatusSnapshot};
pub use source::{CpalBackend, InputBackend, InputStream, MockBackend, MockFeed, MockStats};
