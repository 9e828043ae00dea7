//! Drive the local Gigapan emulation page through injected functions

use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tracing::info;

use super::webdriver::WebDriverClient;
use super::{ViewerError, ViewerInterface, ViewerResult};
use crate::control::FrameUpdate;
use crate::gigapan::{fetch_metadata, GigapanMetadata};

/// Initializes the emulated viewer for one image
const LOAD_VIEWER_SCRIPT: &str =
    "loadViewer(arguments[0], arguments[1], arguments[2], arguments[3]);";

/// Per-frame pan and zoom. The page may still be initializing, so each
/// hook is only called once it exists.
const FRAME_SCRIPT: &str = "\
if (typeof panBy === 'function') { panBy(arguments[0], arguments[1]); }
if (typeof zoomBy === 'function') { zoomBy(arguments[2]); }";

/// Pans and zooms the emulation page with `panBy(dx, dy)` and `zoomBy(factor)`.
///
/// The page only knows how to render an image once it has been told the
/// image's dimensions, which are scraped from the public Gigapan page.
pub struct ScriptViewer {
    client: WebDriverClient,
    gigapan_url: String,
    emulator_page: PathBuf,
    chrome_args: Vec<String>,
    metadata: Option<GigapanMetadata>,
    ready: bool,
}

impl ScriptViewer {
    pub fn new(
        client: WebDriverClient,
        gigapan_url: &str,
        emulator_page: &Path,
        chrome_args: Vec<String>,
    ) -> Self {
        Self {
            client,
            gigapan_url: gigapan_url.to_string(),
            emulator_page: emulator_page.to_path_buf(),
            chrome_args,
            metadata: None,
            ready: false,
        }
    }

    /// Use already-known metadata instead of fetching the Gigapan page
    pub fn with_metadata(mut self, metadata: GigapanMetadata) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn metadata(&self) -> Option<&GigapanMetadata> {
        self.metadata.as_ref()
    }

    fn emulator_url(&self) -> ViewerResult<String> {
        let path = std::fs::canonicalize(&self.emulator_page)?;
        Ok(format!("file://{}", path.display()))
    }
}

/// Image ids are numeric on gigapan.com; pass them to the page as numbers
fn id_argument(id: &str) -> Value {
    id.parse::<u64>().map(Value::from).unwrap_or_else(|_| json!(id))
}

impl ViewerInterface for ScriptViewer {
    fn prepare(&mut self) -> ViewerResult<()> {
        let metadata = match self.metadata.take() {
            Some(metadata) => metadata,
            None => fetch_metadata(&self.gigapan_url)?,
        };
        info!(
            "Gigapan {}: {}x{} px, {} levels",
            metadata.id, metadata.width, metadata.height, metadata.levels
        );

        let page = self.emulator_url()?;
        self.client.new_session(&self.chrome_args)?;
        self.client.navigate(&page)?;
        self.client.execute_script(
            LOAD_VIEWER_SCRIPT,
            vec![
                id_argument(&metadata.id),
                json!(metadata.width),
                json!(metadata.height),
                json!(metadata.levels),
            ],
        )?;

        self.metadata = Some(metadata);
        self.ready = true;
        Ok(())
    }

    fn apply(&mut self, update: &FrameUpdate) -> ViewerResult<()> {
        if !self.ready {
            return Err(ViewerError::NotPrepared);
        }
        if update.is_idle() {
            return Ok(());
        }

        self.client.execute_script(
            FRAME_SCRIPT,
            vec![
                json!(update.dx),
                json!(update.dy),
                json!(update.zoom_factor),
            ],
        )?;
        Ok(())
    }
}
