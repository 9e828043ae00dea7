//! Telescope-driven Gigapan navigation.
//!
//! An orientation sensor on a telescope mount streams yaw/pitch/roll and a
//! zoom potentiometer reading over serial. This crate turns that stream into
//! pan and zoom commands for a Gigapan viewer running in a browser, so that
//! pointing the scope moves around the panorama.
//!
//! The pieces, in data-flow order:
//!
//! - [`source`] - reader threads for the serial port or a capture file
//! - [`control`] - calibration, deadbands, and per-frame integration
//! - [`driver`] - single-owner frame loop combining the two
//! - [`viewer`] - WebDriver-backed viewer drivers and the [`viewer::ViewerInterface`] seam
//! - [`gigapan`] - image metadata scraped from the public Gigapan page

pub mod config;
pub mod control;
pub mod driver;
pub mod gigapan;
pub mod source;
pub mod viewer;

pub use config::{ControlConfig, SourceConfig};
pub use control::{CalibrationEvent, ControlState, FrameUpdate};
pub use driver::FrameDriver;
