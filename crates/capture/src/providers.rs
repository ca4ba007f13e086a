//! OCR and QR provider seams
//!
//! The engines themselves live outside Loupe; the overlay only consumes their
//! results for hit-testing and highlighting.

use crate::{Point, Rect};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Recognition failed: {0}")]
    Failed(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// Single recognized word, bounds in snapshot coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrWord {
    pub text: String,
    pub bounds: Rect,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrLine {
    pub words: Vec<OcrWord>,
}

impl OcrLine {
    pub fn text(&self) -> String {
        self.words
            .iter()
            .map(|w| w.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Union of all word bounds
    pub fn bounds(&self) -> Option<Rect> {
        self.words
            .iter()
            .map(|w| w.bounds)
            .reduce(|acc, r| acc.union(&r))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OcrInformation {
    pub lines: Vec<OcrLine>,
}

impl OcrInformation {
    pub fn words(&self) -> impl Iterator<Item = &OcrWord> {
        self.lines.iter().flat_map(|l| l.words.iter())
    }

    pub fn word_at(&self, p: Point) -> Option<&OcrWord> {
        self.words().find(|w| w.bounds.contains_point(p))
    }

    pub fn line_at(&self, p: Point) -> Option<&OcrLine> {
        self.lines
            .iter()
            .find(|l| l.words.iter().any(|w| w.bounds.contains_point(p)))
    }

    pub fn text(&self) -> String {
        self.lines
            .iter()
            .map(OcrLine::text)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Decoded barcode, bounds in snapshot coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QrResult {
    pub format: String,
    pub text: String,
    pub bounding_box: Rect,
}

/// Text recognition engine
///
/// Called from a worker thread, so implementations must be `Send + Sync`.
pub trait OcrProvider: Send + Sync {
    fn do_ocr(&self, image: &RgbaImage) -> ProviderResult<OcrInformation>;
}

/// Barcode decoder, expected to finish quickly on a single still image
pub trait QrDecoder {
    /// `Ok(None)` when the image holds no code
    fn decode(&self, image: &RgbaImage) -> ProviderResult<Option<QrResult>>;
}
