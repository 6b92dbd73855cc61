//! Live level meter for one channel of an input device.
//!
//! Picks an input device and a channel, then drives the extraction
//! pipeline and prints a peak/RMS meter for the routed channel.
//!
//! Run with: cargo run --example level_meter

use std::io::{self, Write};
use std::time::Duration;

use mono_tap::{CpalBackend, Levels, RouterConfig, SelectorController, SILENCE_FLOOR_DB};

const METER_WIDTH: usize = 40;
const TICK_MS: u64 = 50;
const RUN_SECONDS: u64 = 10;

/// Prompts for a 1-based index, falling back to 1 on anything invalid.
fn prompt_index(prompt: &str, max: usize) -> usize {
    print!("{prompt} [1-{max}, Enter for 1]: ");
    io::stdout().flush().ok();

    let mut input = String::new();
    if io::stdin().read_line(&mut input).is_err() {
        return 1;
    }
    match input.trim().parse::<usize>() {
        Ok(n) if (1..=max).contains(&n) => n,
        _ => 1,
    }
}

/// Renders a dB value as a bar between the silence floor and full scale.
fn meter_bar(db: f32) -> String {
    let fraction = ((db - SILENCE_FLOOR_DB) / -SILENCE_FLOOR_DB).clamp(0.0, 1.0);
    let lit = (fraction * METER_WIDTH as f32).round() as usize;
    format!("[{}{}]", "#".repeat(lit), "-".repeat(METER_WIDTH - lit))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let mut selector =
        SelectorController::new(Box::new(CpalBackend::new()), RouterConfig::default());

    let device_count = selector.device_labels().len().saturating_sub(1);
    if device_count == 0 {
        eprintln!("No input devices found!");
        return Ok(());
    }

    println!("Available input devices:");
    println!("------------------------");
    for (i, label) in selector.device_labels().iter().enumerate().skip(1) {
        println!("  {i}. {label}");
    }

    let device = prompt_index("Device", device_count);
    selector.on_device_chosen(device)?;
    println!("{}", selector.status_line());

    let channel_count = selector.channel_labels().len();
    if channel_count > 1 {
        let channel = prompt_index("Channel", channel_count);
        selector.on_channel_chosen(channel - 1);
    }

    println!("Metering for {RUN_SECONDS} seconds...");
    for _ in 0..(RUN_SECONDS * 1000 / TICK_MS) {
        std::thread::sleep(Duration::from_millis(TICK_MS));
        selector.tick();

        let levels = Levels::measure(selector.router().extracted());
        print!(
            "\r{} peak {:6.1} dB / rms {:6.1} dB ",
            meter_bar(levels.peak_db()),
            levels.peak_db(),
            levels.rms_db()
        );
        io::stdout().flush().ok();
    }
    println!();

    selector.on_device_chosen(0)?;
    println!("Done.");
    Ok(())
}
