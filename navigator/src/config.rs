//! Tuning constants and the configuration structs built from them.
//!
//! The constants are the values the navigator was last tuned with on the
//! telescope. Older sensor mountings calibrated on the 10th sample and did
//! not invert pitch; both are exposed on the command line rather than
//! baked in as alternate presets.

use std::path::PathBuf;
use std::time::Duration;

/// Frames per second for the pan/zoom loop
pub const FRAME_RATE_HZ: f64 = 10.0;

/// Horizontal pan speed in viewer pixels per second per degree
pub const X_PAN_SPEED: f64 = 20.0;

/// Vertical pan speed in viewer pixels per second per degree
pub const Y_PAN_SPEED: f64 = 20.0;

/// Scope must be this many degrees away from center to pan at all
pub const PAN_DEADBAND_DEG: f64 = 7.0;

/// Zoom speed in viewer clicks per second at full pot deflection
pub const ZOOM_SPEED: f64 = 0.1;

/// Zoom rate deadband (rate is on a roughly -1..1 scale)
pub const ZOOM_DEADBAND: f64 = 0.2;

/// Multiplicative zoom of one viewer click
pub const ZOOM_CLICK_FACTOR: f64 = 2.0;

/// Orientation sample taken as the calibration reference, once the sensor has settled
pub const CALIBRATION_SAMPLE: u32 = 20;

/// Jump in yaw or pitch between consecutive samples that forces a recalibration
pub const RECALIBRATION_THRESHOLD_DEG: f64 = 20.0;

/// Pot reading treated as zero zoom
pub const POT_OFFSET: f64 = 450.0;

/// Pot counts per unit of zoom rate
pub const POT_SCALE: f64 = 400.0;

/// Starting pan position in viewer pixels
pub const INITIAL_POSITION: (f64, f64) = (1500.0, 400.0);

/// Serial device the sensor enumerates as
pub const DEFAULT_SERIAL_PORT: &str = "/dev/cu.usbmodem1421";

pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Where chromedriver listens by default
pub const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Local page hosting the scriptable Gigapan viewer
pub const DEFAULT_EMULATOR_PAGE: &str = "gigapan-emu.html";

/// Chrome flag hiding the "controlled by automated software" banner
pub const DEFAULT_CHROME_ARGS: &[&str] = &["disable-infobars"];

/// Parameters of the telemetry-to-rate conversion
#[derive(Debug, Clone, PartialEq)]
pub struct ControlConfig {
    pub frame_rate: f64,
    pub x_pan_speed: f64,
    pub y_pan_speed: f64,
    pub pan_deadband: f64,
    pub zoom_speed: f64,
    pub zoom_deadband: f64,
    pub calibration_sample: u32,
    pub recalibration_threshold: f64,
    pub pot_offset: f64,
    pub pot_scale: f64,
    pub initial_position: (f64, f64),
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            frame_rate: FRAME_RATE_HZ,
            x_pan_speed: X_PAN_SPEED,
            y_pan_speed: Y_PAN_SPEED,
            pan_deadband: PAN_DEADBAND_DEG,
            zoom_speed: ZOOM_SPEED,
            zoom_deadband: ZOOM_DEADBAND,
            calibration_sample: CALIBRATION_SAMPLE,
            recalibration_threshold: RECALIBRATION_THRESHOLD_DEG,
            pot_offset: POT_OFFSET,
            pot_scale: POT_SCALE,
            initial_position: INITIAL_POSITION,
        }
    }
}

impl ControlConfig {
    /// Interval between frames (`1000 / frame_rate` milliseconds)
    pub fn frame_period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.frame_rate)
    }
}

/// Where telemetry comes from
#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    /// Live sensor on a serial port
    Serial { port: String, baud: u32 },

    /// Captured serial output replayed from a file
    Replay {
        path: PathBuf,
        chunk_size: usize,
        interval: Duration,
    },

    /// No sensor; the control state is preloaded with fixed inputs
    Fixed,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self::Serial {
            port: DEFAULT_SERIAL_PORT.to_string(),
            baud: DEFAULT_BAUD_RATE,
        }
    }
}

impl SourceConfig {
    /// Replay a capture at roughly the sensor's serial throughput
    pub fn replay(path: PathBuf) -> Self {
        Self::Replay {
            path,
            chunk_size: 64,
            interval: Duration::from_millis(5),
        }
    }
}
