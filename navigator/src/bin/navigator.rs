//! Pan and zoom a Gigapan panorama by pointing a telescope.
//!
//! Reads orientation and zoom pot telemetry from the scope's sensor and
//! drives a Chrome session through chromedriver:
//! - `script` (default): loads the local emulation page and calls its
//!   `panBy`/`zoomBy` hooks
//! - `pointer`: drags the live gigapan.com canvas with the mouse
//! - `log`: no browser, frames are only logged

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use navigator::config::{
    ControlConfig, SourceConfig, CALIBRATION_SAMPLE, DEFAULT_BAUD_RATE, DEFAULT_CHROME_ARGS,
    DEFAULT_EMULATOR_PAGE, DEFAULT_SERIAL_PORT, DEFAULT_WEBDRIVER_URL, FRAME_RATE_HZ,
};
use navigator::control::ControlState;
use navigator::driver::FrameDriver;
use navigator::source;
use navigator::viewer::{
    LogViewer, PointerViewer, ScriptViewer, ViewerInterface, ViewerMode, WebDriverClient,
};
use telemetry::DecoderConfig;
use tracing::info;

/// Telescope-driven Gigapan navigator
#[derive(Parser, Debug)]
#[command(name = "navigator")]
#[command(about = "Pan and zoom a Gigapan image from telescope orientation telemetry")]
#[command(version)]
struct Args {
    /// Gigapan page to open, e.g. http://www.gigapan.com/gigapans/117375
    url: Option<String>,

    /// How frame updates reach the viewer
    #[arg(long, value_enum, default_value_t = ViewerMode::Script)]
    mode: ViewerMode,

    /// chromedriver endpoint
    #[arg(long, default_value = DEFAULT_WEBDRIVER_URL)]
    webdriver_url: String,

    /// Local emulation page used in script mode
    #[arg(long, default_value = DEFAULT_EMULATOR_PAGE)]
    emulator_page: PathBuf,

    /// Serial port of the orientation sensor
    #[arg(short, long, default_value = DEFAULT_SERIAL_PORT)]
    port: String,

    /// Serial baud rate
    #[arg(short, long, default_value_t = DEFAULT_BAUD_RATE)]
    baud: u32,

    /// Replay a captured telemetry file instead of opening the port
    #[arg(long, conflicts_with = "test_inputs")]
    replay: Option<PathBuf>,

    /// Run without a sensor, holding the scope 20 degrees right of center
    #[arg(long)]
    test_inputs: bool,

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

    /// Frames per second
    #[arg(long, default_value_t = FRAME_RATE_HZ)]
    frame_rate: f64,
}

impl Args {
    fn source_config(&self) -> SourceConfig {
        if self.test_inputs {
            SourceConfig::Fixed
        } else if let Some(path) = &self.replay {
            SourceConfig::replay(path.clone())
        } else {
            SourceConfig::Serial {
                port: self.port.clone(),
                baud: self.baud,
            }
        }
    }

    fn control_config(&self) -> ControlConfig {
        ControlConfig {
            frame_rate: self.frame_rate,
            calibration_sample: self.calibration_sample,
            ..ControlConfig::default()
        }
    }
}

fn build_viewer(args: &Args, url: &str) -> Box<dyn ViewerInterface> {
    let chrome_args: Vec<String> = DEFAULT_CHROME_ARGS.iter().map(|s| s.to_string()).collect();
    match args.mode {
        ViewerMode::Pointer => Box::new(PointerViewer::new(
            WebDriverClient::new(&args.webdriver_url),
            url,
            chrome_args,
        )),
        ViewerMode::Script => Box::new(ScriptViewer::new(
            WebDriverClient::new(&args.webdriver_url),
            url,
            &args.emulator_page,
            chrome_args,
        )),
        ViewerMode::Log => Box::new(LogViewer::new()),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let Some(url) = args.url.as_deref() else {
        println!("You need to specify a gigapan URL to open");
        return Ok(());
    };

    anyhow::ensure!(
        args.frame_rate > 0.0,
        "Frame rate must be positive, got {}",
        args.frame_rate
    );

    let source_config = args.source_config();
    let control = args.control_config();
    let state = match source_config {
        SourceConfig::Fixed => ControlState::with_fixed_inputs(control),
        _ => ControlState::new(control),
    };
    let decoder_config = DecoderConfig {
        invert_pitch: !args.no_invert_pitch,
    };

    let (tx, rx) = crossbeam_channel::unbounded();
    let _reader = source::spawn(&source_config, tx).context("Failed to open telemetry source")?;

    info!("Navigating {url} in {} mode", args.mode);
    let viewer = build_viewer(&args, url);
    let mut driver = FrameDriver::new(state, decoder_config, viewer);
    driver.run(rx).context("Viewer failed")?;

    Ok(())
}
