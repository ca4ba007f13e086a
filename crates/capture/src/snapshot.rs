//! Frozen snapshot handed to the overlay

use crate::providers::{OcrInformation, QrResult};
use crate::{CaptureError, CaptureResult, Point, Rect};
use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// What the user is picking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    #[default]
    Region,
    Window,
    Fullscreen,
    Text,
}

/// Mouse cursor as it was when the snapshot was taken
#[derive(Debug, Clone, Default)]
pub struct CursorInfo {
    pub image: Option<RgbaImage>,
    /// Location relative to the screen bounds origin
    pub location: Point,
    pub visible: bool,
}

impl CursorInfo {
    /// Area covered by the cursor image, empty without an image
    pub fn bounds(&self) -> Rect {
        match &self.image {
            Some(img) => Rect::new(self.location.x, self.location.y, img.width(), img.height()),
            None => Rect::at(self.location),
        }
    }
}

/// Metadata the overlay writes back for the capture pipeline
#[derive(Debug, Clone, Default)]
pub struct CaptureDetails {
    pub title: String,
    pub mode: CaptureMode,
    pub ocr: Option<Arc<OcrInformation>>,
    pub qr: Option<QrResult>,
}

/// Snapshot data plus the desktop layout it was taken from
#[derive(Debug, Clone)]
pub struct Capture {
    image: Arc<RgbaImage>,
    screen_bounds: Rect,
    monitors: Vec<Rect>,
    pub cursor: CursorInfo,
    pub details: CaptureDetails,
}

impl Capture {
    /// Wrap an already captured image covering `screen_bounds`
    pub fn new(image: RgbaImage, screen_bounds: Rect) -> CaptureResult<Self> {
        if image.width() == 0 || image.height() == 0 {
            return Err(CaptureError::InvalidCapture("snapshot image is empty".into()));
        }
        if screen_bounds.is_empty() {
            return Err(CaptureError::InvalidCapture(format!(
                "screen bounds {}x{} are empty",
                screen_bounds.width, screen_bounds.height
            )));
        }

        Ok(Self {
            image: Arc::new(image),
            screen_bounds,
            monitors: vec![screen_bounds],
            cursor: CursorInfo::default(),
            details: CaptureDetails::default(),
        })
    }

    /// Load a snapshot from disk; the screen bounds match the image size at `origin`
    pub fn load(path: &Path, origin: Point) -> CaptureResult<Self> {
        let image = image::open(path)?.to_rgba8();
        let bounds = Rect::new(origin.x, origin.y, image.width(), image.height());
        Self::new(image, bounds)
    }

    /// Replace the monitor layout (screen coordinates)
    pub fn with_monitors(mut self, monitors: Vec<Rect>) -> Self {
        if !monitors.is_empty() {
            self.monitors = monitors;
        }
        self
    }

    pub fn with_cursor(mut self, cursor: CursorInfo) -> Self {
        self.cursor = cursor;
        self
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    /// Shared handle for worker threads
    pub fn shared_image(&self) -> Arc<RgbaImage> {
        Arc::clone(&self.image)
    }

    pub fn screen_bounds(&self) -> Rect {
        self.screen_bounds
    }

    /// Screen bounds moved to the local origin
    pub fn local_bounds(&self) -> Rect {
        Rect::new(0, 0, self.screen_bounds.width, self.screen_bounds.height)
    }

    pub fn monitors(&self) -> &[Rect] {
        &self.monitors
    }

    /// Monitor containing a screen point, falling back to the whole screen
    pub fn monitor_at(&self, screen: Point) -> Rect {
        self.monitors
            .iter()
            .copied()
            .find(|m| m.contains_point(screen))
            .unwrap_or(self.screen_bounds)
    }

    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor.visible = visible;
    }

    /// Convert screen coordinates to snapshot coordinates
    pub fn screen_to_local(&self, p: Point) -> Point {
        p.offset(-self.screen_bounds.x, -self.screen_bounds.y)
    }

    /// Convert snapshot coordinates to screen coordinates
    pub fn local_to_screen(&self, p: Point) -> Point {
        p.offset(self.screen_bounds.x, self.screen_bounds.y)
    }

    pub fn screen_rect_to_local(&self, r: Rect) -> Rect {
        r.offset(-self.screen_bounds.x, -self.screen_bounds.y)
    }

    /// Pixel at a local position, `None` outside the snapshot
    pub fn pixel(&self, p: Point) -> Option<Rgba<u8>> {
        if p.x < 0 || p.y < 0 {
            return None;
        }
        let (x, y) = (p.x as u32, p.y as u32);
        if x >= self.image.width() || y >= self.image.height() {
            return None;
        }
        Some(*self.image.get_pixel(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capture_at(x: i32, y: i32) -> Capture {
        Capture::new(RgbaImage::new(200, 100), Rect::new(x, y, 200, 100)).unwrap()
    }

    #[test]
    fn rejects_empty_snapshot() {
        assert!(Capture::new(RgbaImage::new(0, 0), Rect::new(0, 0, 10, 10)).is_err());
        assert!(Capture::new(RgbaImage::new(10, 10), Rect::new(0, 0, 0, 10)).is_err());
    }

    #[test]
    fn coordinate_conversion_uses_screen_origin() {
        let capture = capture_at(-1920, 0);
        let local = capture.screen_to_local(Point::new(-1900, 40));
        assert_eq!(local, Point::new(20, 40));
        assert_eq!(capture.local_to_screen(local), Point::new(-1900, 40));
    }

    #[test]
    fn monitor_lookup_falls_back_to_screen() {
        let capture = capture_at(0, 0)
            .with_monitors(vec![Rect::new(0, 0, 100, 100), Rect::new(100, 0, 100, 100)]);
        assert_eq!(capture.monitor_at(Point::new(150, 10)), Rect::new(100, 0, 100, 100));
        assert_eq!(capture.monitor_at(Point::new(500, 500)), Rect::new(0, 0, 200, 100));
    }

    #[test]
    fn pixel_lookup_is_bounded_by_image() {
        let capture = capture_at(0, 0);
        assert!(capture.pixel(Point::new(-1, 0)).is_none());
        assert!(capture.pixel(Point::new(199, 99)).is_some());
        assert!(capture.pixel(Point::new(200, 99)).is_none());
    }
}
