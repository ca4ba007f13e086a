//! Overlay module for Loupe
//!
//! Frozen screenshot overlay with region, window, fullscreen and text
//! selection. The controller is driven by [`InputEvent`]s and ticks; hosts
//! paint the [`RenderFrame`] it hands out through a [`Canvas`].

pub mod canvas;
pub mod config;
pub mod controller;
pub mod dirty;
pub mod input;
pub mod ocr;
pub mod render;
pub mod selection;
pub mod session;
pub mod zoom;

pub use canvas::{Canvas, DrawCommand, ImageCanvas, RecordingCanvas};
pub use config::OverlayConfig;
pub use controller::{CaptureOverlayController, OverlayRequest};
pub use dirty::DirtyRegion;
pub use hit_test::WindowHitTester;
pub use input::{InputEvent, Key};
pub use render::{OverlayRenderer, RenderFrame, TextMetrics};
pub use selection::{calc_selection_rect, get_gui_rectangle, AxisLock, FixAxis};
pub use session::{OverlayOrchestrator, OverlaySession};
pub use zoom::{ZoomPlacement, ZoomPlacementSolver, ZoomQuadrant};

use capture::{CaptureError, CaptureMode, Rect, WindowDescriptor};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlayError {
    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("Invalid capture: {0}")]
    InvalidCapture(String),

    #[error("Canvas error: {0}")]
    Canvas(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type OverlayResult<T> = Result<T, OverlayError>;

/// What the overlay hands back to the capture pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureOutcome {
    pub confirmed: bool,
    pub mode: CaptureMode,
    /// Relative to the screen bounds origin
    pub selection: Rect,
    pub selected_window: Option<WindowDescriptor>,
}

/// Result of feeding one event to the controller
#[derive(Debug, Clone, PartialEq)]
pub enum OverlayStatus {
    Running,
    Finished(CaptureOutcome),
    /// Superseded by a newer overlay
    Closed,
}
