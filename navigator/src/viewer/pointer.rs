//! Drag the live Gigapan canvas with synthetic pointer events

use tracing::{debug, info};

use super::webdriver::{ElementRect, Origin, PointerAction, WebDriverClient};
use super::{ViewerError, ViewerInterface, ViewerResult};
use crate::control::FrameUpdate;

/// Pans the real Gigapan page by holding the mouse button down on its
/// canvas and moving the pointer to the integrated position each frame.
///
/// Positions are offsets from the canvas's top-left corner, so the image
/// follows the pointer as a drag. Zoom is not driven in this mode.
pub struct PointerViewer {
    client: WebDriverClient,
    page_url: String,
    chrome_args: Vec<String>,
    canvas: Option<ElementRect>,
}

impl PointerViewer {
    pub fn new(client: WebDriverClient, page_url: &str, chrome_args: Vec<String>) -> Self {
        Self {
            client,
            page_url: page_url.to_string(),
            chrome_args,
            canvas: None,
        }
    }

    fn move_to(&self, canvas: &ElementRect, x: f64, y: f64) -> PointerAction {
        PointerAction::move_to(
            (canvas.x + x).round() as i64,
            (canvas.y + y).round() as i64,
            Origin::viewport(),
        )
    }
}

impl ViewerInterface for PointerViewer {
    fn prepare(&mut self) -> ViewerResult<()> {
        self.client.new_session(&self.chrome_args)?;
        info!("Loading {}", self.page_url);
        self.client.navigate(&self.page_url)?;

        let element = self.client.find_element_by_tag("canvas")?;
        let canvas = self.client.element_rect(&element)?;
        debug!("Canvas at {canvas:?}");

        // Double click to focus the canvas, then grab the image at its corner
        self.client.perform_pointer_actions(&[
            PointerAction::move_to(0, 0, Origin::Element(element)),
            PointerAction::down(),
            PointerAction::up(),
            PointerAction::down(),
            PointerAction::up(),
            self.move_to(&canvas, 0.0, 0.0),
            PointerAction::down(),
        ])?;

        self.canvas = Some(canvas);
        Ok(())
    }

    fn apply(&mut self, update: &FrameUpdate) -> ViewerResult<()> {
        let canvas = self.canvas.ok_or(ViewerError::NotPrepared)?;
        let action = self.move_to(&canvas, update.cx, update.cy);
        self.client.perform_pointer_actions(&[action])
    }
}
