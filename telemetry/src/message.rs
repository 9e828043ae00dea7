//! Telemetry message types and single-line decoding

use thiserror::Error;

/// Largest value the sensor's 10-bit ADC reports for the zoom pot
pub const POT_MAX: u16 = 1023;

const ORIENTATION_TAG: &str = "Orientation:";
const POT_TAG: &str = "Pot:";

/// Absolute sensor orientation in degrees
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Orientation {
    pub yaw: f64,
    pub pitch: f64,
    pub roll: f64,
}

impl Orientation {
    pub fn new(yaw: f64, pitch: f64, roll: f64) -> Self {
        Self { yaw, pitch, roll }
    }
}

/// Raw zoom potentiometer reading (0..=1023)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PotReading {
    pub raw: u16,
}

impl PotReading {
    /// Normalize to a zoom rate of roughly [-1, 1].
    ///
    /// The pot is mounted so that turning it up zooms out, hence the sign flip:
    /// `-(raw - offset) / scale`.
    pub fn zoom_rate(&self, offset: f64, scale: f64) -> f64 {
        -(f64::from(self.raw) - offset) / scale
    }
}

/// One decoded telemetry line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Telemetry {
    Orientation(Orientation),
    Pot(PotReading),
}

/// Reasons a line carries no telemetry.
///
/// None of these are fatal; callers drop the line and move on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IgnoredLine {
    /// First token is not a recognized tag (or the line is blank)
    #[error("Unrecognized line")]
    UnknownShape,

    /// Recognized tag with the wrong number of tokens
    #[error("{tag} expects {expected} tokens, found {found}")]
    WrongTokenCount {
        tag: &'static str,
        expected: usize,
        found: usize,
    },

    /// A value token failed to parse
    #[error("Invalid number: {0}")]
    InvalidNumber(String),

    /// Pot value outside the ADC range
    #[error("Pot value {0} outside 0..=1023")]
    PotOutOfRange(i64),
}

/// Decoding options that varied between sensor mountings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecoderConfig {
    /// Negate pitch so that tilting the scope up pans the image up
    pub invert_pitch: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self { invert_pitch: true }
    }
}

/// Decode a single line (terminator already stripped).
///
/// The format is positional: `Orientation:` must be followed by exactly
/// yaw, roll and pitch, and `Pot:` by exactly one integer.
pub fn decode_line(line: &str, config: &DecoderConfig) -> Result<Telemetry, IgnoredLine> {
    let tokens: Vec<&str> = line.split_whitespace().collect();

    match tokens.first() {
        Some(&ORIENTATION_TAG) => {
            expect_tokens(ORIENTATION_TAG, &tokens, 4)?;
            let yaw = parse_float(tokens[1])?;
            let roll = parse_float(tokens[2])?;
            let pitch = parse_float(tokens[3])?;
            let pitch = if config.invert_pitch { -pitch } else { pitch };
            Ok(Telemetry::Orientation(Orientation { yaw, pitch, roll }))
        }
        Some(&POT_TAG) => {
            expect_tokens(POT_TAG, &tokens, 2)?;
            let value: i64 = tokens[1]
                .parse()
                .map_err(|_| IgnoredLine::InvalidNumber(tokens[1].to_string()))?;
            let raw = u16::try_from(value)
                .ok()
                .filter(|raw| *raw <= POT_MAX)
                .ok_or(IgnoredLine::PotOutOfRange(value))?;
            Ok(Telemetry::Pot(PotReading { raw }))
        }
        _ => Err(IgnoredLine::UnknownShape),
    }
}

fn expect_tokens(tag: &'static str, tokens: &[&str], expected: usize) -> Result<(), IgnoredLine> {
    if tokens.len() != expected {
        return Err(IgnoredLine::WrongTokenCount {
            tag,
            expected,
            found: tokens.len(),
        });
    }
    Ok(())
}

fn parse_float(token: &str) -> Result<f64, IgnoredLine> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| IgnoredLine::InvalidNumber(token.to_string()))
}
