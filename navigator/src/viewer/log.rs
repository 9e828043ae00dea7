//! Frame logging without a browser

use tracing::info;

use super::{ViewerInterface, ViewerResult};
use crate::control::FrameUpdate;

/// Logs every frame instead of driving a viewer.
///
/// Useful on the bench for checking calibration and deadband tuning
/// against live telemetry before involving a browser.
#[derive(Debug, Default)]
pub struct LogViewer {
    frames: u64,
}

impl LogViewer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames logged so far
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl ViewerInterface for LogViewer {
    fn prepare(&mut self) -> ViewerResult<()> {
        info!("Logging frames only; no browser will be driven");
        Ok(())
    }

    fn apply(&mut self, update: &FrameUpdate) -> ViewerResult<()> {
        self.frames += 1;
        info!(
            "panx: {:.3} pany: {:.3} cx: {:.1} cy: {:.1} delta: {:.4}",
            update.pan_rate_x, update.pan_rate_y, update.cx, update.cy, update.zoom_delta
        );
        Ok(())
    }
}
