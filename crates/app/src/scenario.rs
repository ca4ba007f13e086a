//! Replay scenarios
//!
//! A scenario describes the desktop at capture time and the input a user
//! gave the overlay. Paths inside it are relative to the scenario file.

use crate::fixtures::{FixtureOcr, FixtureQr};
use anyhow::{bail, Context, Result};
use capture::{
    Capture, CaptureMode, CursorInfo, OcrInformation, Point, QrResult, Rect, WindowDescriptor,
};
use image::{Rgba, RgbaImage};
use overlay::{
    CaptureOutcome, InputEvent, OverlayConfig, OverlayOrchestrator, OverlayRenderer, OverlayRequest,
    OverlayStatus,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Backdrop used when a scenario has no snapshot image
const BLANK_DESKTOP: Rgba<u8> = Rgba([32, 36, 40, 255]);

#[derive(Debug, Deserialize)]
pub struct Scenario {
    /// PNG of the frozen screen
    #[serde(default)]
    pub snapshot: Option<PathBuf>,
    /// Screen bounds; with a snapshot only the origin is used
    #[serde(default)]
    pub screen: Option<Rect>,
    #[serde(default)]
    pub monitors: Vec<Rect>,
    /// Cursor location at capture time, relative to the screen origin
    #[serde(default)]
    pub cursor: Point,
    #[serde(default)]
    pub cursor_visible: bool,
    #[serde(default)]
    pub mode: CaptureMode,
    #[serde(default)]
    pub windows: Vec<WindowDescriptor>,
    #[serde(default)]
    pub ocr: Option<OcrInformation>,
    #[serde(default)]
    pub qr: Option<QrResult>,
    #[serde(default)]
    pub config: OverlayConfig,
    #[serde(default)]
    pub events: Vec<InputEvent>,
    /// Extra ticks after the events so animations come to rest
    #[serde(default)]
    pub settle_ticks: u32,
}

/// What a replay produced
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub status: &'static str,
    pub outcome: Option<CaptureOutcome>,
    pub title: String,
    pub ocr_text: Option<String>,
    pub qr_text: Option<String>,
    pub events_handled: usize,
    #[serde(skip)]
    pub frame: RgbaImage,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read scenario {}", path.display()))?;
        let scenario: Scenario = serde_json::from_str(&json)
            .with_context(|| format!("Invalid scenario {}", path.display()))?;
        scenario.config.validate()?;
        Ok(scenario)
    }

    fn build_capture(&self, base_dir: &Path) -> Result<Capture> {
        let capture = match (&self.snapshot, self.screen) {
            (Some(snapshot), screen) => {
                let origin = screen.map(|s| s.location()).unwrap_or_default();
                let path = base_dir.join(snapshot);
                Capture::load(&path, origin)
                    .with_context(|| format!("Failed to load snapshot {}", path.display()))?
            }
            (None, Some(screen)) => {
                let image = RgbaImage::from_pixel(screen.width, screen.height, BLANK_DESKTOP);
                Capture::new(image, screen)?
            }
            (None, None) => bail!("scenario needs a snapshot or screen bounds"),
        };

        Ok(capture.with_monitors(self.monitors.clone()).with_cursor(CursorInfo {
            image: None,
            location: self.cursor,
            visible: self.cursor_visible,
        }))
    }

    /// Drive an overlay through the scripted events and render the last frame
    pub fn replay(self, base_dir: &Path) -> Result<ReplayReport> {
        let capture = self.build_capture(base_dir)?;
        let mut request = OverlayRequest::new(capture)
            .windows(self.windows)
            .mode(self.mode)
            .config(self.config.clone())
            .qr_decoder(Box::new(FixtureQr::new(self.qr)));
        if let Some(ocr) = self.ocr {
            request = request.ocr_provider(Arc::new(FixtureOcr::new(ocr)));
        }

        let orchestrator = OverlayOrchestrator::new();
        let mut session = orchestrator.open(request)?;

        let mut status = OverlayStatus::Running;
        let mut events_handled = 0;
        for event in self.events {
            status = session.handle_input(event);
            events_handled += 1;
            if status != OverlayStatus::Running {
                break;
            }
        }
        if status == OverlayStatus::Running {
            for _ in 0..self.settle_ticks {
                session.handle_input(InputEvent::Tick);
            }
        }

        let controller = session.controller();
        let frame = OverlayRenderer::new(self.config)
            .render_to_image(&controller.render_frame(), controller.capture())?;
        let details = &controller.capture().details;
        let (status, outcome) = match status {
            OverlayStatus::Finished(outcome) if outcome.confirmed => ("confirmed", Some(outcome)),
            OverlayStatus::Finished(outcome) => ("cancelled", Some(outcome)),
            OverlayStatus::Closed => ("closed", None),
            OverlayStatus::Running => ("running", None),
        };
        log::info!("replay finished after {} events: {}", events_handled, status);

        Ok(ReplayReport {
            status,
            outcome,
            title: details.title.clone(),
            ocr_text: details.ocr.as_ref().map(|ocr| ocr.text()),
            qr_text: details.qr.as_ref().map(|qr| qr.text.clone()),
            events_handled,
            frame,
        })
    }
}
