//! Viewer drivers that turn frame updates into browser commands.
//!
//! Three ways of showing motion are supported:
//!
//! - [`PointerViewer`] drags the live Gigapan canvas with synthetic pointer
//!   events, replaying the absolute integrated position every frame.
//! - [`ScriptViewer`] loads a local emulation page and calls its injected
//!   `panBy`/`zoomBy` functions with per-frame deltas.
//! - [`LogViewer`] drives nothing and logs each frame, for bench testing
//!   without a browser.

mod log;
mod pointer;
mod script;
pub mod webdriver;

use thiserror::Error;

use crate::control::FrameUpdate;
use crate::gigapan::GigapanError;

pub use log::LogViewer;
pub use pointer::PointerViewer;
pub use script::ScriptViewer;
pub use webdriver::{ElementRef, ElementRect, Origin, PointerAction, WebDriverClient};

#[derive(Error, Debug)]
pub enum ViewerError {
    /// Transport failure talking to the WebDriver server
    #[error("HTTP error: {0}")]
    Http(#[from] ureq::Error),

    /// WebDriver server reported an error
    #[error("WebDriver error {error}: {message}")]
    WebDriver { error: String, message: String },

    /// Response body did not have the expected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Command issued before a session was created
    #[error("No active WebDriver session")]
    NoSession,

    /// Command issued before `prepare` located the page hooks
    #[error("Viewer not prepared")]
    NotPrepared,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Gigapan metadata: {0}")]
    Metadata(#[from] GigapanError),
}

pub type ViewerResult<T> = Result<T, ViewerError>;

/// How frame updates reach the viewer
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum ViewerMode {
    /// Drag the live canvas with pointer events
    Pointer,
    /// Call panBy/zoomBy on the local emulation page
    Script,
    /// Log frames without a browser
    Log,
}

/// Interface for anything that can display frame updates.
///
/// Abstracts the browser for testability of the frame loop.
pub trait ViewerInterface {
    /// Load the page and locate whatever hooks later frames need.
    ///
    /// Called once, before the first frame.
    fn prepare(&mut self) -> ViewerResult<()>;

    /// Reflect one frame's motion in the viewer
    fn apply(&mut self, update: &FrameUpdate) -> ViewerResult<()>;
}

impl<V: ViewerInterface + ?Sized> ViewerInterface for Box<V> {
    fn prepare(&mut self) -> ViewerResult<()> {
        (**self).prepare()
    }

    fn apply(&mut self, update: &FrameUpdate) -> ViewerResult<()> {
        (**self).apply(update)
    }
}
