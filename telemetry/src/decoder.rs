//! Streaming decoder combining line framing with message decoding

use tracing::trace;

use crate::line::LineBuffer;
use crate::message::{decode_line, DecoderConfig, Telemetry};

/// Turns raw serial chunks into telemetry messages.
///
/// Lines that carry no telemetry are dropped and logged at trace level.
#[derive(Debug, Clone, Default)]
pub struct TelemetryDecoder {
    lines: LineBuffer,
    config: DecoderConfig,
    ignored: u64,
}

impl TelemetryDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self {
            lines: LineBuffer::new(),
            config,
            ignored: 0,
        }
    }

    /// Feed a chunk and return the messages from every line it completed
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<Telemetry> {
        let mut messages = Vec::new();
        for line in self.lines.push(chunk) {
            match decode_line(&line, &self.config) {
                Ok(msg) => messages.push(msg),
                Err(reason) => {
                    self.ignored += 1;
                    trace!("Ignoring line {line:?}: {reason}");
                }
            }
        }
        messages
    }

    /// Number of complete lines dropped so far
    pub fn ignored_count(&self) -> u64 {
        self.ignored
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }
}
