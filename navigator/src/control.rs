//! Telemetry-to-control-signal conversion.
//!
//! Orientation samples are compared against a calibration reference to get
//! pan rates, the zoom pot reading becomes a zoom rate, and both are passed
//! through a deadband so that small wobbles of the scope leave the image
//! still. Each frame integrates the rates into a viewer position.

use telemetry::{Orientation, Telemetry};
use tracing::{debug, info};

use crate::config::{ControlConfig, ZOOM_CLICK_FACTOR};

/// Suppress values within `threshold` of zero.
///
/// Values outside the band are shifted toward zero by `threshold` rather
/// than passed through, so the output is continuous at the band edge.
pub fn deadband(x: f64, threshold: f64) -> f64 {
    if x > threshold {
        x - threshold
    } else if x < -threshold {
        x + threshold
    } else {
        0.0
    }
}

/// Bring an angle difference into [-180, 180] with a single ±360 step.
///
/// Inputs are differences of two headings in [0, 360), so one step suffices.
pub fn wrap_degrees(delta: f64) -> f64 {
    if delta > 180.0 {
        delta - 360.0
    } else if delta < -180.0 {
        delta + 360.0
    } else {
        delta
    }
}

/// Outcome of feeding one orientation sample to the [`Calibrator`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum CalibrationEvent {
    /// Reference unchanged
    None,
    /// Settling sample reached; reference captured for the first time
    Calibrated,
    /// Sample jumped past the pop threshold; reference re-captured
    Recalibrated,
}

/// Tracks the zero reference for orientation.
///
/// The sensor drifts for a while after power-up, so the reference is taken
/// at a fixed sample count rather than on the first sample. A jump larger
/// than the threshold between consecutive samples means the sensor reset
/// or the scope was bumped, and the reference is re-taken immediately.
#[derive(Debug, Clone)]
pub struct Calibrator {
    calibration_sample: u32,
    threshold: f64,
    samples: u32,
    last: Option<(f64, f64)>,
    reference: Option<Orientation>,
}

impl Calibrator {
    /// Samples are counted from 1; a `calibration_sample` of 0 calibrates on
    /// the first sample.
    pub fn new(calibration_sample: u32, threshold: f64) -> Self {
        Self {
            calibration_sample: calibration_sample.max(1),
            threshold,
            samples: 0,
            last: None,
            reference: None,
        }
    }

    /// Start out already calibrated against `reference`
    pub fn with_reference(mut self, reference: Orientation) -> Self {
        self.reference = Some(reference);
        self
    }

    pub fn observe(&mut self, sample: &Orientation) -> CalibrationEvent {
        let popped = self.last.is_some_and(|(last_yaw, last_pitch)| {
            (sample.yaw - last_yaw).abs() > self.threshold
                || (sample.pitch - last_pitch).abs() > self.threshold
        });

        self.samples = self.samples.saturating_add(1);
        self.last = Some((sample.yaw, sample.pitch));

        if popped {
            info!("Recalibrating...");
            self.reference = Some(*sample);
            CalibrationEvent::Recalibrated
        } else if self.samples == self.calibration_sample {
            info!(
                "Calibrated at sample {}: yaw={:.2} pitch={:.2} roll={:.2}",
                self.samples, sample.yaw, sample.pitch, sample.roll
            );
            self.reference = Some(*sample);
            CalibrationEvent::Calibrated
        } else {
            CalibrationEvent::None
        }
    }

    /// Current zero reference, if one has been captured
    pub fn reference(&self) -> Option<&Orientation> {
        self.reference.as_ref()
    }

    /// Orientation samples seen so far
    pub fn samples(&self) -> u32 {
        self.samples
    }
}

/// Result of one frame of integration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUpdate {
    /// Deadbanded yaw offset from reference, degrees
    pub pan_rate_x: f64,
    /// Deadbanded pitch offset from reference, degrees
    pub pan_rate_y: f64,
    /// Position change this frame, viewer pixels
    pub dx: f64,
    pub dy: f64,
    /// Integrated position after this frame
    pub cx: f64,
    pub cy: f64,
    /// Zoom this frame in viewer clicks
    pub zoom_delta: f64,
    /// `2^zoom_delta`, the multiplicative zoom for this frame
    pub zoom_factor: f64,
}

impl FrameUpdate {
    /// True when the frame neither pans nor zooms
    pub fn is_idle(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0 && self.zoom_delta == 0.0
    }
}

/// All mutable control state, owned by a single driver.
#[derive(Debug, Clone)]
pub struct ControlState {
    config: ControlConfig,
    calibrator: Calibrator,
    current: Option<Orientation>,
    zoom_rate: f64,
    position: (f64, f64),
}

impl ControlState {
    pub fn new(config: ControlConfig) -> Self {
        let calibrator = Calibrator::new(config.calibration_sample, config.recalibration_threshold);
        let position = config.initial_position;
        Self {
            config,
            calibrator,
            current: None,
            zoom_rate: 0.0,
            position,
        }
    }

    /// State for running without a sensor: calibrated at zero with the
    /// scope held 20 degrees right of center and the zoom pot centered.
    pub fn with_fixed_inputs(config: ControlConfig) -> Self {
        let mut state = Self::new(config);
        state.calibrator = state
            .calibrator
            .with_reference(Orientation::new(0.0, 0.0, 0.0));
        state.current = Some(Orientation::new(20.0, 0.0, 0.0));
        state
    }

    /// Fold one telemetry message into the state
    pub fn apply(&mut self, msg: &Telemetry) -> CalibrationEvent {
        match msg {
            Telemetry::Orientation(orientation) => {
                self.current = Some(*orientation);
                self.calibrator.observe(orientation)
            }
            Telemetry::Pot(pot) => {
                self.zoom_rate = pot.zoom_rate(self.config.pot_offset, self.config.pot_scale);
                CalibrationEvent::None
            }
        }
    }

    /// Advance one frame.
    ///
    /// Returns `None` (and leaves the position untouched) until a
    /// calibration reference exists.
    pub fn frame(&mut self) -> Option<FrameUpdate> {
        let (Some(reference), Some(current)) = (self.calibrator.reference(), self.current) else {
            debug!("not yet");
            return None;
        };
        let cfg = &self.config;

        let pan_rate_x = deadband(wrap_degrees(current.yaw - reference.yaw), cfg.pan_deadband);
        let pan_rate_y = deadband(current.pitch - reference.pitch, cfg.pan_deadband);

        // Viewer content moves opposite to the scope
        let dx = -cfg.x_pan_speed * pan_rate_x / cfg.frame_rate;
        let dy = -cfg.y_pan_speed * pan_rate_y / cfg.frame_rate;
        self.position.0 += dx;
        self.position.1 += dy;

        let zoom_delta =
            deadband(self.zoom_rate, cfg.zoom_deadband) * cfg.zoom_speed / cfg.frame_rate;

        Some(FrameUpdate {
            pan_rate_x,
            pan_rate_y,
            dx,
            dy,
            cx: self.position.0,
            cy: self.position.1,
            zoom_delta,
            zoom_factor: ZOOM_CLICK_FACTOR.powf(zoom_delta),
        })
    }

    pub fn config(&self) -> &ControlConfig {
        &self.config
    }

    pub fn calibrator(&self) -> &Calibrator {
        &self.calibrator
    }

    /// Most recent orientation sample
    pub fn current(&self) -> Option<&Orientation> {
        self.current.as_ref()
    }

    pub fn zoom_rate(&self) -> f64 {
        self.zoom_rate
    }

    pub fn position(&self) -> (f64, f64) {
        self.position
    }
}
