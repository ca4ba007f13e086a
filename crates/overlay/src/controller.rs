//! Capture overlay state machine
//!
//! One controller per overlay. All mutation happens in
//! [`CaptureOverlayController::handle_input`] on the host's UI thread; the
//! OCR worker only hands results back through a channel that is polled here.

use crate::config::OverlayConfig;
use crate::dirty::DirtyRegion;
use crate::hit_test::WindowHitTester;
use crate::input::{InputEvent, Key};
use crate::ocr::{OcrPoll, OcrRequest};
use crate::render::{RenderFrame, TextMetrics, RULER_FONT_SIZE};
use crate::selection::{
    calc_selection_rect, confirmed_rect, get_gui_rectangle, is_valid_selection, AxisLock, FixAxis,
};
use crate::zoom::{ZoomPlacement, ZoomPlacementSolver};
use crate::{CaptureOutcome, OverlayError, OverlayResult, OverlayStatus};
use animation::{EasingFamily, EasingMode, EasingSpec, RectangleAnimator};
use capture::{Capture, CaptureMode, OcrProvider, Point, QrDecoder, Rect, WindowDescriptor};
use std::sync::Arc;

const WINDOW_EASING: EasingSpec = EasingSpec::new(EasingFamily::Quintic, EasingMode::EaseOut);
const ZOOM_EASING: EasingSpec = EasingSpec::new(EasingFamily::Quintic, EasingMode::EaseOut);
/// Margin around the animated window highlight covering its border and rulers
const WINDOW_DIRTY_MARGIN: i32 = 20;

/// Everything needed to open an overlay
pub struct OverlayRequest {
    pub capture: Capture,
    /// Top-level windows, front to back
    pub windows: Vec<WindowDescriptor>,
    pub mode: CaptureMode,
    pub config: OverlayConfig,
    pub ocr_provider: Option<Arc<dyn OcrProvider>>,
    pub qr_decoder: Option<Box<dyn QrDecoder>>,
}

impl OverlayRequest {
    pub fn new(capture: Capture) -> Self {
        Self {
            capture,
            windows: Vec::new(),
            mode: CaptureMode::Region,
            config: OverlayConfig::default(),
            ocr_provider: None,
            qr_decoder: None,
        }
    }

    pub fn windows(mut self, windows: Vec<WindowDescriptor>) -> Self {
        self.windows = windows;
        self
    }

    pub fn mode(mut self, mode: CaptureMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn config(mut self, config: OverlayConfig) -> Self {
        self.config = config;
        self
    }

    pub fn ocr_provider(mut self, provider: Arc<dyn OcrProvider>) -> Self {
        self.ocr_provider = Some(provider);
        self
    }

    pub fn qr_decoder(mut self, decoder: Box<dyn QrDecoder>) -> Self {
        self.qr_decoder = Some(decoder);
        self
    }
}

/// Interactive selection over a frozen capture
///
/// Positions kept here are relative to the screen bounds origin; incoming
/// pointer events and window rectangles are in screen coordinates.
pub struct CaptureOverlayController {
    config: OverlayConfig,
    capture: Capture,
    windows: Vec<WindowDescriptor>,
    ocr_provider: Option<Arc<dyn OcrProvider>>,
    qr_decoder: Option<Box<dyn QrDecoder>>,

    mode: CaptureMode,
    mouse_down: bool,
    anchor: Point,
    /// Latest filtered pointer reading
    pointer: Point,
    /// Pointer as of the last tick
    cursor: Point,
    selection: Rect,
    axis_lock: AxisLock,
    ctrl_down: bool,
    show_debug: bool,
    selected_window: Option<WindowDescriptor>,

    window_animator: RectangleAnimator,
    /// Loupe rectangle relative to the cursor
    zoom_animator: RectangleAnimator,
    zoom_enabled: bool,
    /// `None` until the next tick solves a placement
    zoom_placement: Option<ZoomPlacement>,
    zoom_solver: ZoomPlacementSolver,

    pending_ocr: Option<OcrRequest>,
    dirty: DirtyRegion,
    outcome: Option<CaptureOutcome>,
}

impl CaptureOverlayController {
    pub fn new(request: OverlayRequest) -> OverlayResult<Self> {
        let OverlayRequest {
            capture,
            windows,
            mode,
            config,
            ocr_provider,
            qr_decoder,
        } = request;
        config.validate()?;

        let bounds = capture.screen_bounds();
        let (width, height) = capture.image().dimensions();
        if (width, height) != (bounds.width, bounds.height) {
            return Err(OverlayError::InvalidCapture(format!(
                "snapshot is {}x{} but screen bounds are {}x{}",
                width, height, bounds.width, bounds.height
            )));
        }

        let local = capture.local_bounds();
        let pointer = capture.cursor.location;
        let mut controller = Self {
            zoom_solver: ZoomPlacementSolver::new(config.zoom_offset),
            zoom_enabled: config.zoom_enabled,
            config,
            capture,
            windows,
            ocr_provider,
            qr_decoder,
            mode: CaptureMode::Region,
            mouse_down: false,
            anchor: pointer,
            pointer,
            cursor: pointer,
            selection: Rect::default(),
            axis_lock: AxisLock::default(),
            ctrl_down: false,
            show_debug: false,
            selected_window: None,
            window_animator: RectangleAnimator::idle(Rect::at(pointer)),
            zoom_animator: RectangleAnimator::idle(Rect::default()),
            zoom_placement: None,
            pending_ocr: None,
            dirty: DirtyRegion::new(local),
            outcome: None,
        };

        match mode {
            CaptureMode::Region => controller.refresh_hover(),
            CaptureMode::Window => controller.enter_window(),
            CaptureMode::Text => controller.enter_text(),
            CaptureMode::Fullscreen => {
                controller.mode = CaptureMode::Fullscreen;
                controller.selection = local;
            }
        }
        controller.dirty.invalidate_all();

        log::debug!(
            "overlay opened in {:?} mode over {}x{} at ({}, {}), {} windows",
            controller.mode,
            bounds.width,
            bounds.height,
            bounds.x,
            bounds.y,
            controller.windows.len()
        );
        Ok(controller)
    }

    /// Feed one event; after the overlay finished this keeps returning the outcome
    pub fn handle_input(&mut self, event: InputEvent) -> OverlayStatus {
        if let Some(outcome) = &self.outcome {
            return OverlayStatus::Finished(outcome.clone());
        }
        self.poll_ocr();

        match event {
            InputEvent::KeyDown { key } => self.key_down(key),
            InputEvent::KeyUp { key } => self.key_up(key),
            InputEvent::MouseMove { x, y } => self.mouse_move(Point::new(x, y)),
            InputEvent::MouseDown { x, y } => {
                self.mouse_move(Point::new(x, y));
                self.press();
            }
            InputEvent::MouseUp { x, y } => {
                self.mouse_move(Point::new(x, y));
                self.release();
            }
            InputEvent::Tick => self.update_frame(),
        }

        match &self.outcome {
            Some(outcome) => OverlayStatus::Finished(outcome.clone()),
            None => OverlayStatus::Running,
        }
    }

    fn key_down(&mut self, key: Key) {
        match key {
            Key::Space => self.toggle_window_mode(),
            Key::Z => self.toggle_zoom(),
            Key::T => self.enter_text(),
            Key::Q => self.decode_qr(),
            Key::Shift => self.axis_lock.engage(),
            Key::Control => self.ctrl_down = true,
            Key::D if self.mode == CaptureMode::Window => {
                self.show_debug = !self.show_debug;
                self.dirty.invalidate_all();
            }
            Key::M => {
                let visible = !self.capture.cursor.visible;
                self.capture.set_cursor_visible(visible);
                self.dirty.add(self.capture.cursor.bounds());
            }
            Key::Escape => self.finish(false, self.selection),
            Key::Return => self.accept(),
            Key::Left | Key::Right | Key::Up | Key::Down => self.nudge(key),
            _ => {}
        }
    }

    fn key_up(&mut self, key: Key) {
        match key {
            Key::Shift => self.axis_lock.release(),
            Key::Control => self.ctrl_down = false,
            _ => {}
        }
    }

    fn mouse_move(&mut self, screen: Point) {
        let raw = self.capture.screen_to_local(screen);
        self.move_to(raw);
    }

    fn move_to(&mut self, raw: Point) {
        self.pointer = self.axis_lock.apply(raw);
        if self.is_dragging() {
            self.selection = calc_selection_rect(self.anchor, self.pointer);
        }
        self.refresh_hover();
    }

    fn nudge(&mut self, key: Key) {
        let step = self.config.nudge(self.ctrl_down);
        let (dx, dy) = match key {
            Key::Left => (-step, 0),
            Key::Right => (step, 0),
            Key::Up => (0, -step),
            Key::Down => (0, step),
            _ => return,
        };
        let local = self.capture.local_bounds();
        let target = self.pointer.offset(dx, dy);
        let clamped = Point::new(
            target.x.clamp(local.x, local.right() - 1),
            target.y.clamp(local.y, local.bottom() - 1),
        );
        self.move_to(clamped);
    }

    fn is_dragging(&self) -> bool {
        self.mouse_down && matches!(self.mode, CaptureMode::Region | CaptureMode::Text)
    }

    fn press(&mut self) {
        if self.mouse_down {
            return;
        }
        self.mouse_down = true;
        self.anchor = self.pointer;
        if matches!(self.mode, CaptureMode::Region | CaptureMode::Text) {
            self.selection = Rect::at(self.anchor);
        }
        self.dirty.invalidate_all();
    }

    fn release(&mut self) {
        if !self.mouse_down {
            return;
        }
        self.mouse_down = false;

        match self.mode {
            CaptureMode::Window if self.selected_window.is_some() => {
                self.finish(true, confirmed_rect(self.selection, CaptureMode::Window));
                return;
            }
            CaptureMode::Fullscreen => {
                self.finish(true, self.capture.local_bounds());
                return;
            }
            _ => {}
        }

        if is_valid_selection(&self.selection) {
            self.finish(true, confirmed_rect(self.selection, self.mode));
        } else if self.word_under_pointer() {
            self.finish(true, Rect::new(self.pointer.x, self.pointer.y, 1, 1));
        } else if self.qr_under_pointer() {
            self.finish(true, Rect::at(self.pointer));
        } else {
            self.dirty.invalidate_all();
        }
    }

    fn word_under_pointer(&self) -> bool {
        self.mode == CaptureMode::Text
            && self
                .capture
                .details
                .ocr
                .as_ref()
                .is_some_and(|ocr| ocr.word_at(self.pointer).is_some())
    }

    fn qr_under_pointer(&self) -> bool {
        self.capture
            .details
            .qr
            .as_ref()
            .is_some_and(|qr| qr.bounding_box.contains_point(self.pointer))
    }

    /// Return key: direct confirm where there is something to confirm,
    /// otherwise a press on the first stroke and a release on the second
    fn accept(&mut self) {
        match self.mode {
            CaptureMode::Window => {
                if self.selected_window.is_some() {
                    self.finish(true, self.selection);
                }
            }
            CaptureMode::Fullscreen => self.finish(true, self.capture.local_bounds()),
            CaptureMode::Region | CaptureMode::Text => {
                if self.mouse_down {
                    self.release();
                } else {
                    self.press();
                }
            }
        }
    }

    fn finish(&mut self, confirmed: bool, selection: Rect) {
        self.capture.details.mode = self.mode;
        let selected_window = if confirmed && self.mode == CaptureMode::Window {
            self.selected_window.clone()
        } else {
            None
        };
        let outcome = CaptureOutcome {
            confirmed,
            mode: self.mode,
            selection,
            selected_window,
        };
        if confirmed {
            log::info!(
                "capture confirmed: {:?} {}x{} at ({}, {})",
                outcome.mode,
                selection.width,
                selection.height,
                selection.x,
                selection.y
            );
        } else {
            log::info!("capture cancelled");
        }
        // Drops the receiver, a late OCR result is discarded by the worker
        self.pending_ocr = None;
        self.outcome = Some(outcome);
    }

    fn toggle_window_mode(&mut self) {
        if self.mouse_down {
            log::debug!("ignoring mode switch while dragging");
            return;
        }
        match self.mode {
            CaptureMode::Region => self.enter_window(),
            CaptureMode::Window => {
                self.leave_window();
                self.mode = CaptureMode::Region;
            }
            CaptureMode::Text | CaptureMode::Fullscreen => {
                self.mode = CaptureMode::Region;
                self.selection = Rect::default();
            }
        }
        log::debug!("capture mode is now {:?}", self.mode);
        self.dirty.invalidate_all();
    }

    fn enter_window(&mut self) {
        self.mode = CaptureMode::Window;
        if self.zoom_enabled {
            let frames = self.config.frames_for(self.config.zoom_fade_ms);
            self.zoom_animator.change_destination(Rect::default(), frames, None);
            self.zoom_placement = None;
        }

        let screen = self.capture.local_to_screen(self.pointer);
        self.selected_window = WindowHitTester::locate(screen, &self.windows, self.mode).cloned();
        if let Some(window) = &self.selected_window {
            self.capture.details.title = window.display_name().to_string();
        }

        let target = self.window_target();
        let frames = self.config.frames_for(self.config.window_animation_ms);
        self.window_animator =
            RectangleAnimator::new(Rect::at(self.pointer), target, frames, WINDOW_EASING);
        self.selection = if self.selected_window.is_some() {
            target
        } else {
            Rect::default()
        };
    }

    fn leave_window(&mut self) {
        let frames = self.config.frames_for(self.config.window_animation_ms);
        self.window_animator.change_destination(Rect::at(self.pointer), frames, None);
        self.selection = Rect::default();
        self.show_debug = false;
        if self.zoom_enabled {
            self.zoom_animator = RectangleAnimator::idle(Rect::default());
            self.zoom_placement = None;
        }
    }

    /// Highlight for the hovered window, or a zero rect at the pointer over the desktop
    fn window_target(&self) -> Rect {
        match &self.selected_window {
            Some(window) => self
                .capture
                .screen_rect_to_local(window.rect)
                .intersection(&self.capture.local_bounds()),
            None => Rect::at(self.pointer),
        }
    }

    fn refresh_hover(&mut self) {
        let screen = self.capture.local_to_screen(self.pointer);
        let found = WindowHitTester::locate(screen, &self.windows, self.mode);
        if found == self.selected_window.as_ref() {
            return;
        }
        self.selected_window = found.cloned();
        if let Some(window) = &self.selected_window {
            self.capture.details.title = window.display_name().to_string();
            log::trace!("hovering window {:#X} {:?}", window.handle, window.title);
        }

        if self.mode == CaptureMode::Window {
            let target = self.window_target();
            let frames = self.config.frames_for(self.config.window_animation_ms);
            self.window_animator.change_destination(target, frames, None);
            self.selection = if self.selected_window.is_some() {
                target
            } else {
                Rect::default()
            };
        }
    }

    fn toggle_zoom(&mut self) {
        if !matches!(self.mode, CaptureMode::Region | CaptureMode::Text) {
            return;
        }
        self.zoom_enabled = !self.zoom_enabled;
        self.zoom_placement = None;
        if self.zoom_enabled {
            self.zoom_animator = RectangleAnimator::idle(Rect::default());
        } else {
            let frames = self.config.frames_for(self.config.zoom_fade_ms);
            self.zoom_animator.change_destination(Rect::default(), frames, None);
        }
        log::debug!("loupe {}", if self.zoom_enabled { "enabled" } else { "disabled" });
    }

    fn enter_text(&mut self) {
        if self.mouse_down {
            log::debug!("ignoring mode switch while dragging");
            return;
        }
        if self.mode == CaptureMode::Window {
            self.leave_window();
        }
        if self.mode != CaptureMode::Text {
            self.selection = Rect::default();
        }
        self.mode = CaptureMode::Text;
        self.request_ocr();
        self.dirty.invalidate_all();
    }

    fn request_ocr(&mut self) {
        if self.capture.details.ocr.is_some() || self.pending_ocr.is_some() {
            return;
        }
        let Some(provider) = &self.ocr_provider else {
            log::debug!("no OCR provider, text highlighting unavailable");
            return;
        };
        match OcrRequest::spawn(Arc::clone(provider), self.capture.shared_image()) {
            Ok(request) => self.pending_ocr = Some(request),
            Err(e) => log::warn!("Failed to start OCR: {}", e),
        }
    }

    fn poll_ocr(&mut self) {
        let Some(request) = &self.pending_ocr else {
            return;
        };
        match request.poll() {
            OcrPoll::Pending => {}
            OcrPoll::Ready(info) => {
                self.pending_ocr = None;
                self.capture.details.ocr = Some(Arc::new(info));
                self.dirty.invalidate_all();
            }
            OcrPoll::Failed(e) => {
                self.pending_ocr = None;
                log::warn!("OCR failed: {}", e);
            }
        }
    }

    fn decode_qr(&mut self) {
        let Some(decoder) = &self.qr_decoder else {
            log::debug!("no QR decoder configured");
            return;
        };
        match decoder.decode(self.capture.image()) {
            Ok(Some(result)) => {
                log::debug!("decoded {} code: {:?}", result.format, result.text);
                self.capture.details.qr = Some(result);
            }
            Ok(None) => log::debug!("no QR code found"),
            Err(e) => log::warn!("QR decode failed: {}", e),
        }
        self.dirty.invalidate_all();
    }

    /// Per-tick update: hover, animations and dirty rectangles
    fn update_frame(&mut self) {
        let last = self.cursor;
        self.cursor = self.pointer;
        self.refresh_hover();

        let moved = last != self.cursor;
        let zoom_active = self.zoom_enabled && self.mode != CaptureMode::Window;
        let zoom_pending = self.zoom_animator.has_next()
            || (zoom_active && (moved || self.zoom_placement.is_none()));
        if !moved && !self.window_animator.has_next() && !zoom_pending {
            return;
        }

        if moved {
            if self.is_dragging() {
                let rect = self.drag_dirty_rect(last);
                self.dirty.add(rect);
            } else if self.mode != CaptureMode::Window {
                self.crosshair_dirty_rects(last);
            }
        }

        if self.window_animator.has_next() {
            let margin = WINDOW_DIRTY_MARGIN;
            self.dirty.add(self.window_animator.current().inflate(margin, margin));
            let next = self.window_animator.advance();
            self.dirty.add(next.inflate(margin, margin));
        }

        if zoom_pending {
            self.dirty.add(self.zoom_animator.current().offset(last.x, last.y));
            if zoom_active {
                self.place_zoom();
            }
            let next = self.zoom_animator.advance();
            self.dirty.add(next.offset(self.cursor.x, self.cursor.y));
        }
    }

    /// Area spanned by the anchor and both cursor positions, grown by the
    /// ruler labels drawn above and left of the selection
    fn drag_dirty_rect(&self, last: Point) -> Rect {
        let (anchor, cursor) = (self.anchor, self.cursor);
        let mut x1 = anchor.x.min(last.x).min(cursor.x);
        let mut y1 = anchor.y.min(last.y).min(cursor.y);
        let x2 = anchor.x.max(last.x).max(cursor.x) + 2;
        let y2 = anchor.y.max(last.y).max(cursor.y) + 2;

        let text_width = (anchor.x - cursor.x).abs().max((anchor.x - last.x).abs());
        let text_height = (anchor.y - cursor.y).abs().max((anchor.y - last.y).abs());
        let (label_w, _) = TextMetrics::measure(&text_width.to_string(), RULER_FONT_SIZE);
        let (_, label_h) = TextMetrics::measure(&text_height.to_string(), RULER_FONT_SIZE);
        x1 -= label_w as i32 + 15;
        y1 -= label_h as i32 + 10;

        get_gui_rectangle(x1, y1, x2 - x1, y2 - y1)
    }

    /// Old and new crosshair strips plus the coordinate label
    fn crosshair_dirty_rects(&mut self, last: Point) {
        let local = self.capture.local_bounds();
        let (width, height) = (local.width as i32, local.height as i32);
        if last.y != self.cursor.y {
            for y in [last.y, self.cursor.y] {
                self.dirty.add(get_gui_rectangle(local.x, y - 2, width + 2, 45));
            }
        }
        if last.x != self.cursor.x {
            for x in [last.x, self.cursor.x] {
                self.dirty.add(get_gui_rectangle(x - 2, local.y, 75, height + 2));
            }
        }
    }

    /// Keep the loupe where it is while it still fits, otherwise move it
    fn place_zoom(&mut self) {
        let screen_cursor = self.capture.local_to_screen(self.cursor);
        let monitor = self
            .capture
            .screen_rect_to_local(self.capture.monitor_at(screen_cursor));
        let (cursor, selection) = (self.cursor, self.selection);
        let solver = self.zoom_solver;
        let fits = |p: &ZoomPlacement, overlap| {
            solver.fits(p.relative, cursor, monitor, selection, overlap)
        };

        if self.zoom_placement.as_ref().is_some_and(|p| fits(p, false)) {
            return;
        }
        let Some(solved) = solver.solve(cursor, monitor, selection, false) else {
            return;
        };
        // Only a relaxed fit was found; stay put if the current spot is one too
        if !fits(&solved, false) && self.zoom_placement.as_ref().is_some_and(|p| fits(p, true)) {
            return;
        }
        if self.zoom_placement == Some(solved) {
            return;
        }

        log::trace!("loupe moves to {:?}", solved.quadrant);
        let frames = self.config.frames_for(self.config.zoom_animation_ms);
        self.zoom_animator.change_destination(solved.relative, frames, Some(ZOOM_EASING));
        self.zoom_placement = Some(solved);
    }

    /// Drain the rectangles invalidated since the last call
    pub fn take_dirty(&mut self) -> Vec<Rect> {
        self.dirty.take()
    }

    /// Immutable view of the current state for painting
    pub fn render_frame(&self) -> RenderFrame {
        let highlight = if self.is_dragging() {
            Some(self.selection)
        } else if self.window_animator.has_next() {
            Some(self.window_animator.current())
        } else if (self.mode == CaptureMode::Window && self.selected_window.is_some())
            || self.mode == CaptureMode::Fullscreen
        {
            Some(self.selection)
        } else {
            None
        };

        let (debug_label, debug_icon) = match &self.selected_window {
            Some(window) if self.show_debug && self.mode == CaptureMode::Window => (
                Some(format!("#{:X} - {}", window.handle, window.display_name())),
                window.icon.clone(),
            ),
            _ => (None, None),
        };

        let zoom = self.zoom_animator.current();
        RenderFrame {
            mode: self.mode,
            mouse_down: self.mouse_down,
            cursor: self.cursor,
            screen: self.capture.local_bounds(),
            selection: self.selection,
            highlight,
            zoom: (!zoom.is_empty()).then(|| zoom.offset(self.cursor.x, self.cursor.y)),
            debug_label,
            debug_icon,
            cursor_visible: self.capture.cursor.visible,
            ocr: self.capture.details.ocr.clone(),
            qr: self.capture.details.qr.clone(),
        }
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn selection(&self) -> Rect {
        self.selection
    }

    pub fn fix_axis(&self) -> FixAxis {
        self.axis_lock.state()
    }

    pub fn is_mouse_down(&self) -> bool {
        self.mouse_down
    }

    /// Pointer as seen at the last tick
    pub fn cursor(&self) -> Point {
        self.cursor
    }

    pub fn selected_window(&self) -> Option<&WindowDescriptor> {
        self.selected_window.as_ref()
    }

    pub fn window_animator(&self) -> &RectangleAnimator {
        &self.window_animator
    }

    pub fn zoom_animator(&self) -> &RectangleAnimator {
        &self.zoom_animator
    }

    pub fn zoom_enabled(&self) -> bool {
        self.zoom_enabled
    }

    pub fn zoom_placement(&self) -> Option<ZoomPlacement> {
        self.zoom_placement
    }

    pub fn show_debug(&self) -> bool {
        self.show_debug
    }

    pub fn ocr_pending(&self) -> bool {
        self.pending_ocr.is_some()
    }

    pub fn capture(&self) -> &Capture {
        &self.capture
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn outcome(&self) -> Option<&CaptureOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn controller(mode: CaptureMode) -> CaptureOverlayController {
        let capture = Capture::new(RgbaImage::new(800, 600), Rect::new(0, 0, 800, 600)).unwrap();
        let windows =
            vec![WindowDescriptor::new(0x10, Rect::new(100, 100, 300, 200)).with_title("Editor")];
        let request = OverlayRequest::new(capture).windows(windows).mode(mode);
        CaptureOverlayController::new(request).unwrap()
    }

    fn settle(c: &mut CaptureOverlayController) {
        for _ in 0..200 {
            c.handle_input(InputEvent::Tick);
        }
    }

    #[test]
    fn rejects_mismatched_snapshot() {
        let capture = Capture::new(RgbaImage::new(10, 10), Rect::new(0, 0, 20, 20)).unwrap();
        assert!(matches!(
            CaptureOverlayController::new(OverlayRequest::new(capture)),
            Err(OverlayError::InvalidCapture(_))
        ));
    }

    #[test]
    fn rejects_invalid_config() {
        let capture = Capture::new(RgbaImage::new(10, 10), Rect::new(0, 0, 10, 10)).unwrap();
        let config = OverlayConfig {
            zoom_source_size: 0,
            ..OverlayConfig::default()
        };
        assert!(matches!(
            CaptureOverlayController::new(OverlayRequest::new(capture).config(config)),
            Err(OverlayError::Config(_))
        ));
    }

    #[test]
    fn drag_normalizes_any_direction() {
        let mut c = controller(CaptureMode::Region);
        c.handle_input(InputEvent::mouse_down(Point::new(150, 80)));
        c.handle_input(InputEvent::mouse_move(Point::new(50, 50)));
        assert_eq!(c.selection(), Rect::new(50, 50, 100, 30));
        assert!(c.is_mouse_down());
    }

    #[test]
    fn shift_locks_first_moving_axis() {
        let mut c = controller(CaptureMode::Region);
        c.handle_input(InputEvent::mouse_move(Point::new(10, 10)));
        c.handle_input(InputEvent::key_down(Key::Shift));
        assert_eq!(c.fix_axis(), FixAxis::Initiated);
        c.handle_input(InputEvent::mouse_move(Point::new(30, 10)));
        assert_eq!(c.fix_axis(), FixAxis::Horizontal);
        c.handle_input(InputEvent::mouse_move(Point::new(40, 70)));
        c.handle_input(InputEvent::Tick);
        assert_eq!(c.cursor(), Point::new(40, 10));
        c.handle_input(InputEvent::key_up(Key::Shift));
        assert_eq!(c.fix_axis(), FixAxis::None);
    }

    #[test]
    fn arrows_nudge_and_clamp() {
        let mut c = controller(CaptureMode::Region);
        c.handle_input(InputEvent::mouse_move(Point::new(2, 5)));
        c.handle_input(InputEvent::key_down(Key::Control));
        c.handle_input(InputEvent::key_down(Key::Left));
        c.handle_input(InputEvent::key_up(Key::Control));
        c.handle_input(InputEvent::key_down(Key::Down));
        c.handle_input(InputEvent::Tick);
        assert_eq!(c.cursor(), Point::new(0, 6));
    }

    #[test]
    fn return_presses_then_releases() {
        let mut c = controller(CaptureMode::Region);
        c.handle_input(InputEvent::mouse_move(Point::new(10, 10)));
        c.handle_input(InputEvent::key_down(Key::Return));
        assert!(c.is_mouse_down());
        c.handle_input(InputEvent::key_down(Key::Right));
        c.handle_input(InputEvent::key_down(Key::Down));
        match c.handle_input(InputEvent::key_down(Key::Return)) {
            OverlayStatus::Finished(outcome) => {
                assert!(outcome.confirmed);
                assert_eq!(outcome.selection, Rect::new(10, 10, 2, 2));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn click_without_drag_only_repaints() {
        let mut c = controller(CaptureMode::Region);
        c.take_dirty();
        c.handle_input(InputEvent::mouse_down(Point::new(10, 10)));
        let status = c.handle_input(InputEvent::mouse_up(Point::new(10, 10)));
        assert_eq!(status, OverlayStatus::Running);
        assert!(!c.take_dirty().is_empty());
    }

    #[test]
    fn window_hover_updates_title_and_debug_label() {
        let mut c = controller(CaptureMode::Window);
        c.handle_input(InputEvent::mouse_move(Point::new(200, 150)));
        assert_eq!(c.capture().details.title, "Editor");
        c.handle_input(InputEvent::key_down(Key::D));
        settle(&mut c);
        assert_eq!(c.render_frame().debug_label.as_deref(), Some("#10 - Editor"));
        assert_eq!(c.render_frame().highlight, Some(Rect::new(100, 100, 300, 200)));
    }

    #[test]
    fn debug_frame_carries_window_icon() {
        let capture = Capture::new(RgbaImage::new(800, 600), Rect::new(0, 0, 800, 600)).unwrap();
        let mut window = WindowDescriptor::new(0x10, Rect::new(100, 100, 300, 200));
        window.icon = Some(Arc::new(RgbaImage::new(16, 16)));
        let request = OverlayRequest::new(capture)
            .windows(vec![window])
            .mode(CaptureMode::Window);
        let mut c = CaptureOverlayController::new(request).unwrap();
        c.handle_input(InputEvent::mouse_move(Point::new(200, 150)));
        assert!(c.render_frame().debug_icon.is_none());

        c.handle_input(InputEvent::key_down(Key::D));
        let icon = c.render_frame().debug_icon.expect("icon while debugging");
        assert_eq!(icon.dimensions(), (16, 16));
    }

    #[test]
    fn double_space_without_tick_keeps_animating() {
        let mut c = controller(CaptureMode::Region);
        c.handle_input(InputEvent::mouse_move(Point::new(200, 150)));
        c.handle_input(InputEvent::key_down(Key::Space));
        assert!(c.window_animator().has_next());
        c.handle_input(InputEvent::key_down(Key::Space));
        assert_eq!(c.mode(), CaptureMode::Region);
        assert!(c.window_animator().has_next());
        settle(&mut c);
        assert!(!c.window_animator().has_next());
        assert_eq!(c.window_animator().current(), Rect::at(Point::new(200, 150)));
    }

    #[test]
    fn debug_toggle_ignored_outside_window_mode() {
        let mut c = controller(CaptureMode::Region);
        c.handle_input(InputEvent::key_down(Key::D));
        assert!(!c.show_debug());
    }

    #[test]
    fn leaving_window_over_desktop_clears_selection() {
        let mut c = controller(CaptureMode::Window);
        c.handle_input(InputEvent::mouse_move(Point::new(200, 150)));
        settle(&mut c);
        c.handle_input(InputEvent::mouse_move(Point::new(600, 500)));
        assert!(c.selected_window().is_none());
        assert_eq!(c.selection(), Rect::default());
        assert!(c.window_animator().has_next());
        settle(&mut c);
        assert_eq!(c.window_animator().current(), Rect::at(Point::new(600, 500)));
    }

    #[test]
    fn cursor_visibility_toggles() {
        let mut c = controller(CaptureMode::Region);
        assert!(!c.render_frame().cursor_visible);
        c.handle_input(InputEvent::key_down(Key::M));
        assert!(c.render_frame().cursor_visible);
    }

    #[test]
    fn fullscreen_confirms_whole_screen() {
        let mut c = controller(CaptureMode::Fullscreen);
        match c.handle_input(InputEvent::key_down(Key::Return)) {
            OverlayStatus::Finished(outcome) => {
                assert_eq!(outcome.mode, CaptureMode::Fullscreen);
                assert_eq!(outcome.selection, Rect::new(0, 0, 800, 600));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(c.capture().details.mode, CaptureMode::Fullscreen);
    }

    #[test]
    fn idle_tick_marks_nothing() {
        let mut c = controller(CaptureMode::Window);
        settle(&mut c);
        c.take_dirty();
        c.handle_input(InputEvent::Tick);
        assert!(c.take_dirty().is_empty());
    }

    #[test]
    fn drag_marks_ruler_labels_dirty() {
        let mut c = controller(CaptureMode::Region);
        c.handle_input(InputEvent::mouse_down(Point::new(200, 200)));
        c.handle_input(InputEvent::Tick);
        c.take_dirty();
        c.handle_input(InputEvent::mouse_move(Point::new(300, 260)));
        c.handle_input(InputEvent::Tick);
        let dirty = c.take_dirty();
        assert!(dirty
            .iter()
            .any(|r| r.x < 200 && r.y < 200 && r.right() >= 302 && r.bottom() >= 262));
    }
}
