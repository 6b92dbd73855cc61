//! Lists the available audio input devices.
//!
//! Run with: cargo run --example list_devices

use mono_tap::{CpalBackend, InputBackend};

fn main() {
    tracing_subscriber::fmt::init();

    let backend = CpalBackend::new();
    let count = backend.device_count();
    if count == 0 {
        eprintln!("No input devices found!");
        return;
    }

    println!("Available input devices:");
    println!("------------------------");
    for i in 0..count {
        let name = backend
            .device_name(i)
            .unwrap_or_else(|| format!("input {i}"));
        println!("  {}. {}", i + 1, name);
    }
}
