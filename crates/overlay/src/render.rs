//! Overlay painting
//!
//! The controller hands out an immutable [`RenderFrame`] once per tick; the
//! renderer turns it into canvas calls and never touches controller state.

use crate::canvas::{Canvas, ImageCanvas};
use crate::config::OverlayConfig;
use crate::OverlayResult;
use capture::{Capture, CaptureMode, OcrInformation, Point, QrResult, Rect};
use image::{Rgba, RgbaImage};
use std::sync::Arc;

/// Point size of ruler and coordinate labels
pub const RULER_FONT_SIZE: f32 = 8.0;
/// Point size the centred size label starts from
pub const SIZE_FONT_SIZE: f32 = 12.0;
const RULER_DISTANCE: i32 = 8;

/// Fixed-advance approximation of a sans-serif font
pub struct TextMetrics;

impl TextMetrics {
    /// Width and height in pixels of `text` at `size` points
    pub fn measure(text: &str, size: f32) -> (u32, u32) {
        let advance = size * 0.75;
        let width = (text.chars().count() as f32 * advance).ceil() as u32 + 6;
        let height = (size * 1.6).ceil() as u32;
        (width, height)
    }
}

/// Snapshot of everything the renderer needs for one frame
#[derive(Debug, Clone)]
pub struct RenderFrame {
    pub mode: CaptureMode,
    pub mouse_down: bool,
    /// Cursor at the last tick, local coordinates
    pub cursor: Point,
    pub screen: Rect,
    pub selection: Rect,
    /// Filled area: the drag selection or the (animated) window highlight
    pub highlight: Option<Rect>,
    /// Loupe rectangle, already placed next to the cursor
    pub zoom: Option<Rect>,
    pub debug_label: Option<String>,
    /// Icon of the debugged window, drawn before its label
    pub debug_icon: Option<Arc<RgbaImage>>,
    pub cursor_visible: bool,
    pub ocr: Option<Arc<OcrInformation>>,
    pub qr: Option<QrResult>,
}

impl RenderFrame {
    /// Size shown for `rect`; a drag shows what confirming it would return
    pub fn display_size(&self, rect: Rect) -> (u32, u32) {
        let dragging =
            self.mouse_down && matches!(self.mode, CaptureMode::Region | CaptureMode::Text);
        if dragging {
            (rect.width + 1, rect.height + 1)
        } else {
            (rect.width, rect.height)
        }
    }
}

/// Overlay renderer
pub struct OverlayRenderer {
    config: OverlayConfig,
}

impl OverlayRenderer {
    pub fn new(config: OverlayConfig) -> Self {
        Self { config }
    }

    /// Paint a complete frame
    pub fn render(&self, frame: &RenderFrame, capture: &Capture, canvas: &mut dyn Canvas) {
        canvas.draw_snapshot(capture);
        self.draw_cursor(frame, capture, canvas);

        match frame.highlight {
            Some(rect) => {
                self.draw_selection(frame, rect, canvas);
                self.draw_rulers(frame, rect, canvas);
                self.draw_size_label(frame, rect, canvas);
            }
            None if frame.mode != CaptureMode::Window => self.draw_crosshair(frame, canvas),
            None => {}
        }

        if frame.mode == CaptureMode::Text {
            if let Some(ocr) = &frame.ocr {
                self.draw_ocr(frame, ocr, canvas);
            }
        }
        if let Some(qr) = &frame.qr {
            self.draw_qr(qr, canvas);
        }
        if let Some(zoom) = frame.zoom {
            self.draw_zoom(frame, capture, zoom, canvas);
        }
    }

    /// Render into a fresh image the size of the screen
    pub fn render_to_image(
        &self,
        frame: &RenderFrame,
        capture: &Capture,
    ) -> OverlayResult<RgbaImage> {
        let mut canvas = ImageCanvas::new(frame.screen.width, frame.screen.height)?;
        self.render(frame, capture, &mut canvas);
        Ok(canvas.into_image())
    }

    fn draw_cursor(&self, frame: &RenderFrame, capture: &Capture, canvas: &mut dyn Canvas) {
        if !frame.cursor_visible {
            return;
        }
        if let Some(image) = &capture.cursor.image {
            canvas.draw_image(image, capture.cursor.location);
        }
    }

    fn draw_selection(&self, frame: &RenderFrame, rect: Rect, canvas: &mut dyn Canvas) {
        let rect = rect.intersection(&frame.screen);
        canvas.fill_rect(rect, Rgba(self.config.selection_fill));
        canvas.stroke_rect(rect, Rgba(self.config.selection_border));
    }

    /// Label with a rounded background, drawn at `at`
    fn draw_label(&self, at: Point, text: &str, canvas: &mut dyn Canvas) {
        let (w, h) = TextMetrics::measure(text, RULER_FONT_SIZE);
        let background = Rect::new(at.x, at.y, w.saturating_sub(3), h);
        canvas.fill_rect(background, Rgba(self.config.label_background));
        canvas.stroke_rect(background, Rgba(self.config.ruler_color));
        canvas.text(at, text, RULER_FONT_SIZE, Rgba(self.config.ruler_color));
    }

    fn draw_rulers(&self, frame: &RenderFrame, rect: Rect, canvas: &mut dyn Canvas) {
        let (width, height) = frame.display_size(rect);
        let (width_text, height_text) = (width.to_string(), height.to_string());
        let color = Rgba(self.config.ruler_color);
        let (w, h) = (rect.width as i32, rect.height as i32);

        let (text_w, _) = TextMetrics::measure(&width_text, RULER_FONT_SIZE);
        let h_space = text_w as i32 + 3;
        if w > h_space + 3 {
            let y = rect.y - RULER_DISTANCE;
            let label_x = rect.x + w / 2 - h_space / 2;
            self.draw_label(Point::new(label_x + 3, y - 7), &width_text, canvas);
            let (left, right) = (rect.x, rect.right());
            canvas.line(Point::new(left, y), Point::new(label_x, y), color, false);
            let resume = rect.x + w / 2 + h_space / 2;
            canvas.line(Point::new(resume, y), Point::new(right, y), color, false);
            canvas.line(Point::new(left, y - 3), Point::new(left, y + 3), color, false);
            canvas.line(Point::new(right, y - 3), Point::new(right, y + 3), color, false);
        }

        let (height_w, text_h) = TextMetrics::measure(&height_text, RULER_FONT_SIZE);
        let v_space = text_h as i32 + 3;
        if h > v_space + 3 {
            let x = rect.x - RULER_DISTANCE;
            let label_y = rect.y + h / 2 - v_space / 2;
            self.draw_label(Point::new(x - height_w as i32, label_y + 3), &height_text, canvas);
            let (top, bottom) = (rect.y, rect.bottom());
            canvas.line(Point::new(x, top), Point::new(x, label_y), color, false);
            let resume = rect.y + h / 2 + v_space / 2;
            canvas.line(Point::new(x, resume), Point::new(x, bottom), color, false);
            canvas.line(Point::new(x - 3, top), Point::new(x + 3, top), color, false);
            canvas.line(Point::new(x - 3, bottom), Point::new(x + 3, bottom), color, false);
        }
    }

    /// Centred `W x H`, scaled with the selection and hidden below 4pt
    fn draw_size_label(&self, frame: &RenderFrame, rect: Rect, canvas: &mut dyn Canvas) {
        let (width, height) = frame.display_size(rect);
        let text = format!("{} x {}", width, height);
        let (extent_w, extent_h) = TextMetrics::measure(&text, SIZE_FONT_SIZE);

        let h_ratio = rect.height as f32 / (extent_h as f32 * 2.0);
        let w_ratio = rect.width as f32 / (extent_w as f32 * 2.0);
        let size = SIZE_FONT_SIZE * h_ratio.min(w_ratio);
        if size < 4.0 {
            return;
        }
        let size = size.min(20.0);
        let (scaled_w, scaled_h) = TextMetrics::measure(&text, size);
        let at = Point::new(
            rect.x + (rect.width as i32 - scaled_w as i32) / 2,
            rect.y + (rect.height as i32 - scaled_h as i32) / 2,
        );
        canvas.text(at, &text, size, Rgba(self.config.ruler_color));

        if let Some(debug) = &frame.debug_label {
            let mut at = rect.location();
            if let Some(icon) = &frame.debug_icon {
                canvas.draw_image(icon, at);
                at = at.offset(icon.width() as i32 + 2, 0);
            }
            canvas.text(at, debug, SIZE_FONT_SIZE, Rgba([255, 140, 0, 255]));
        }
    }

    fn draw_crosshair(&self, frame: &RenderFrame, canvas: &mut dyn Canvas) {
        if !self.config.show_crosshair {
            return;
        }
        let color = Rgba(self.config.ruler_color);
        let (c, s) = (frame.cursor, frame.screen);
        canvas.line(Point::new(c.x, s.y), Point::new(c.x, s.bottom()), color, true);
        canvas.line(Point::new(s.x, c.y), Point::new(s.right(), c.y), color, true);
        self.draw_label(c.offset(5, 5), &format!("{} x {}", c.x, c.y), canvas);
    }

    fn draw_ocr(&self, frame: &RenderFrame, ocr: &OcrInformation, canvas: &mut dyn Canvas) {
        let highlight = Rgba(self.config.ocr_highlight);
        for word in ocr.words() {
            canvas.fill_rect(word.bounds, highlight);
        }
        if let Some(line) = ocr.line_at(frame.cursor) {
            if let Some(bounds) = line.bounds() {
                canvas.stroke_rect(bounds.inflate(2, 2), Rgba(self.config.selection_border));
            }
        }
        if let Some(word) = ocr.word_at(frame.cursor) {
            canvas.fill_rect(word.bounds, highlight);
            canvas.stroke_rect(word.bounds, Rgba(self.config.ruler_color));
        }
    }

    fn draw_qr(&self, qr: &QrResult, canvas: &mut dyn Canvas) {
        canvas.fill_rect(qr.bounding_box, Rgba(self.config.qr_highlight));
        canvas.stroke_rect(qr.bounding_box, Rgba([255, 140, 0, 255]));
        let below = Point::new(qr.bounding_box.x, qr.bounding_box.bottom() + 4);
        self.draw_label(below, &qr.text, canvas);
    }

    fn draw_zoom(
        &self,
        frame: &RenderFrame,
        capture: &Capture,
        dest: Rect,
        canvas: &mut dyn Canvas,
    ) {
        let side = self.config.zoom_source_size;
        if dest.is_empty() || side == 0 {
            return;
        }
        let source = Rect::new(
            frame.cursor.x - (side / 2) as i32,
            frame.cursor.y - (side / 2) as i32,
            side,
            side,
        );
        canvas.magnify(capture, source, dest, self.config.zoom_opacity);

        // Frame the pixel under the cursor, with hair lines out to the rim
        let pixel = (dest.width / side).max(1);
        let center = Rect::new(
            dest.x + (side / 2 * dest.width / side) as i32,
            dest.y + (side / 2 * dest.height / side) as i32,
            pixel,
            pixel,
        );
        let color = Rgba([0, 0, 0, 160]);
        canvas.stroke_rect(center.inflate(1, 1), color);
        let (mid_x, mid_y) = (center.x + pixel as i32 / 2, center.y + pixel as i32 / 2);
        let (rim_right, rim_bottom) = (dest.right() - 1, dest.bottom() - 1);
        canvas.line(Point::new(dest.x, mid_y), Point::new(center.x - 2, mid_y), color, false);
        let right_of = center.right() + 1;
        canvas.line(Point::new(right_of, mid_y), Point::new(rim_right, mid_y), color, false);
        canvas.line(Point::new(mid_x, dest.y), Point::new(mid_x, center.y - 2), color, false);
        let below = center.bottom() + 1;
        canvas.line(Point::new(mid_x, below), Point::new(mid_x, rim_bottom), color, false);
    }
}
