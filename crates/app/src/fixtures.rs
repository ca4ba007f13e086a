//! Canned OCR and QR results for replays

use capture::{OcrInformation, OcrProvider, ProviderResult, QrDecoder, QrResult};
use image::RgbaImage;

/// Returns the same recognition result for every image
pub struct FixtureOcr {
    info: OcrInformation,
}

impl FixtureOcr {
    pub fn new(info: OcrInformation) -> Self {
        Self { info }
    }
}

impl OcrProvider for FixtureOcr {
    fn do_ocr(&self, image: &RgbaImage) -> ProviderResult<OcrInformation> {
        log::debug!(
            "fixture OCR on {}x{} snapshot",
            image.width(),
            image.height()
        );
        Ok(self.info.clone())
    }
}

/// Decoder that "finds" a fixed code, or nothing
pub struct FixtureQr {
    result: Option<QrResult>,
}

impl FixtureQr {
    pub fn new(result: Option<QrResult>) -> Self {
        Self { result }
    }
}

impl QrDecoder for FixtureQr {
    fn decode(&self, _image: &RgbaImage) -> ProviderResult<Option<QrResult>> {
        Ok(self.result.clone())
    }
}
