//! Frame loop tying telemetry, control state, and the viewer together.

use crossbeam_channel::{never, select, tick, Receiver};
use telemetry::{DecoderConfig, TelemetryDecoder};
use tracing::{debug, info};

use crate::control::{ControlState, FrameUpdate};
use crate::viewer::{ViewerInterface, ViewerResult};

/// Single owner of the control state and the viewer.
///
/// Telemetry chunks and frame ticks are handled on the same thread, so a
/// frame never observes a half-applied sample and no locking is needed.
pub struct FrameDriver<V: ViewerInterface> {
    state: ControlState,
    decoder: TelemetryDecoder,
    viewer: V,
    frames: u64,
}

impl<V: ViewerInterface> FrameDriver<V> {
    pub fn new(state: ControlState, decoder_config: DecoderConfig, viewer: V) -> Self {
        Self {
            state,
            decoder: TelemetryDecoder::new(decoder_config),
            viewer,
            frames: 0,
        }
    }

    /// Decode a chunk of serial data and fold it into the control state
    pub fn handle_chunk(&mut self, chunk: &[u8]) {
        for msg in self.decoder.feed(chunk) {
            self.state.apply(&msg);
        }
    }

    /// Compute one frame and send it to the viewer.
    ///
    /// Before calibration this does nothing and returns `Ok(None)`.
    pub fn tick(&mut self) -> ViewerResult<Option<FrameUpdate>> {
        self.frames += 1;
        let Some(update) = self.state.frame() else {
            return Ok(None);
        };
        self.viewer.apply(&update)?;
        Ok(Some(update))
    }

    /// Prepare the viewer, then run frames until the process is stopped.
    ///
    /// If the telemetry channel disconnects the loop keeps ticking on the
    /// last known state.
    pub fn run(&mut self, chunks: Receiver<Vec<u8>>) -> ViewerResult<()> {
        self.run_inner(chunks, None)
    }

    /// Like [`run`](Self::run) but returns after `frames` ticks
    pub fn run_frames(&mut self, chunks: Receiver<Vec<u8>>, frames: u64) -> ViewerResult<()> {
        self.run_inner(chunks, Some(frames))
    }

    fn run_inner(
        &mut self,
        mut chunks: Receiver<Vec<u8>>,
        limit: Option<u64>,
    ) -> ViewerResult<()> {
        // Frames must not start until the page hooks exist
        self.viewer.prepare()?;

        let period = self.state.config().frame_period();
        info!(
            "Viewer ready; running at {:.1} fps",
            self.state.config().frame_rate
        );
        let ticker = tick(period);
        let mut ticks = 0u64;

        while limit.map_or(true, |limit| ticks < limit) {
            let mut closed = false;
            select! {
                recv(chunks) -> chunk => match chunk {
                    Ok(chunk) => self.handle_chunk(&chunk),
                    Err(_) => closed = true,
                },
                recv(ticker) -> _ => {
                    // Frames see every byte that arrived before the tick
                    for chunk in chunks.try_iter().collect::<Vec<_>>() {
                        self.handle_chunk(&chunk);
                    }
                    self.tick()?;
                    ticks += 1;
                }
            }

            if closed {
                info!("Telemetry source closed; holding last state");
                chunks = never();
            }
        }

        debug!("Frame loop finished after {ticks} ticks");
        Ok(())
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    pub fn viewer(&self) -> &V {
        &self.viewer
    }

    /// Frames ticked so far, including those before calibration
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Lines dropped by the decoder so far
    pub fn ignored_lines(&self) -> u64 {
        self.decoder.ignored_count()
    }
}
