//! Print decoded sensor telemetry and calibration events.
//!
//! Bench tool for checking the sensor wiring and the calibration settings
//! without a browser. Reads from the serial port, or from a capture file
//! with `--replay`.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use navigator::config::{
    ControlConfig, SourceConfig, CALIBRATION_SAMPLE, DEFAULT_BAUD_RATE, DEFAULT_SERIAL_PORT,
};
use navigator::control::{CalibrationEvent, ControlState};
use navigator::source;
use telemetry::{DecoderConfig, Telemetry, TelemetryDecoder};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "listen_telemetry")]
#[command(about = "Dump decoded telescope sensor telemetry")]
#[command(version)]
struct Args {
    /// Serial port of the orientation sensor
    #[arg(short, long, default_value = DEFAULT_SERIAL_PORT)]
    port: String,

    /// Serial baud rate
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Read a captured telemetry file instead of the port
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Orientation sample used as the calibration reference (counted from 1)
    #[arg(
        long,
        default_value_t = CALIBRATION_SAMPLE,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    calibration_sample: u32,

    /// Use pitch as reported by the sensor instead of inverting it
    #[arg(long)]
    no_invert_pitch: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let source_config = match &args.replay {
        Some(path) => SourceConfig::Replay {
            path: path.clone(),
            chunk_size: 64,
            interval: std::time::Duration::ZERO,
        },
        None => SourceConfig::Serial {
            port: args.port.clone(),
            baud: args.baud,
        },
    };

    let mut decoder = TelemetryDecoder::new(DecoderConfig {
        invert_pitch: !args.no_invert_pitch,
    });
    let mut state = ControlState::new(ControlConfig {
        calibration_sample: args.calibration_sample,
        ..ControlConfig::default()
    });

    let (tx, rx) = crossbeam_channel::unbounded();
    let reader = source::spawn(&source_config, tx).context("Failed to open telemetry source")?;

    let mut messages = 0u64;
    for chunk in rx {
        for msg in decoder.feed(&chunk) {
            messages += 1;
            match msg {
                Telemetry::Orientation(o) => {
                    println!("yaw={:8.2} pitch={:8.2} roll={:8.2}", o.yaw, o.pitch, o.roll)
                }
                Telemetry::Pot(p) => println!(
                    "pot={:4} zoom_rate={:+.3}",
                    p.raw,
                    p.zoom_rate(state.config().pot_offset, state.config().pot_scale)
                ),
            }

            let event = state.apply(&msg);
            if event != CalibrationEvent::None {
                println!("-- {event}");
            }
        }
    }

    if let Some(reader) = reader {
        if reader.join().is_err() {
            anyhow::bail!("Telemetry reader thread panicked");
        }
    }

    info!(
        "{} messages decoded, {} lines ignored",
        messages,
        decoder.ignored_count()
    );
    Ok(())
}
