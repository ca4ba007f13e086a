//! Capture model for Loupe
//!
//! Provides the frozen snapshot the overlay works on, the geometry primitives
//! shared by every crate, and the provider seams for OCR and QR decoding.

pub mod providers;
pub mod snapshot;
pub mod window;

pub use providers::{
    OcrInformation, OcrLine, OcrProvider, OcrWord, ProviderError, ProviderResult, QrDecoder,
    QrResult,
};
pub use snapshot::{Capture, CaptureDetails, CaptureMode, CursorInfo};
pub use window::WindowDescriptor;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("Invalid capture: {0}")]
    InvalidCapture(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

pub type CaptureResult<T> = Result<T, CaptureError>;

/// Point in physical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Rectangle in physical pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Zero-sized rectangle anchored at `p`
    pub fn at(p: Point) -> Self {
        Self::new(p.x, p.y, 0, 0)
    }

    /// Rectangle spanning two corners, in any order
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).unsigned_abs(), (a.y - b.y).unsigned_abs())
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    pub fn location(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    pub fn contains_point(&self, p: Point) -> bool {
        self.contains(p.x, p.y)
    }

    /// True when `other` lies entirely within this rectangle
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Empty rectangles intersect nothing
    pub fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Overlapping part of both rectangles, empty at the origin when disjoint
    pub fn intersection(&self, other: &Rect) -> Rect {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right < left || bottom < top {
            return Rect::default();
        }
        Rect::new(left, top, (right - left) as u32, (bottom - top) as u32)
    }

    /// Smallest rectangle containing both
    pub fn union(&self, other: &Rect) -> Rect {
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        let right = self.right().max(other.right());
        let bottom = self.bottom().max(other.bottom());
        Rect::new(left, top, (right - left) as u32, (bottom - top) as u32)
    }

    pub fn offset(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Grow by `dx`/`dy` on every side
    pub fn inflate(&self, dx: i32, dy: i32) -> Rect {
        Rect::new(
            self.x - dx,
            self.y - dy,
            (self.width as i32 + 2 * dx).max(0) as u32,
            (self.height as i32 + 2 * dy).max(0) as u32,
        )
    }
}
