//! Telescope orientation sensor line protocol
//!
//! The sensor firmware prints ASCII lines terminated by CR+LF. Two line
//! shapes carry data:
//!
//! ```text
//! Orientation: <yaw> <roll> <pitch>
//! Pot: <raw>
//! ```
//!
//! Everything else the firmware prints (banners, debug chatter) is ignored.
//!
//! # Example
//!
//! ```
//! use telemetry::{DecoderConfig, Telemetry, TelemetryDecoder};
//!
//! let mut decoder = TelemetryDecoder::new(DecoderConfig::default());
//! let messages = decoder.feed(b"Orientation: 10.0 0.5 -3.0\r\nPot: 8");
//! assert_eq!(messages.len(), 1);
//! assert!(matches!(messages[0], Telemetry::Orientation(_)));
//!
//! // The partial `Pot:` line completes when its terminator arrives
//! let messages = decoder.feed(b"50\r\n");
//! assert!(matches!(messages[0], Telemetry::Pot(p) if p.raw == 850));
//! ```

mod decoder;
mod line;
mod message;

pub use decoder::TelemetryDecoder;
pub use line::{LineBuffer, LINE_TERMINATOR, MAX_PENDING};
pub use message::{
    decode_line, DecoderConfig, IgnoredLine, Orientation, PotReading, Telemetry, POT_MAX,
};
