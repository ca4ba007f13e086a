//! Selection geometry and the modifier axis lock

use capture::{CaptureMode, Point, Rect};

/// Modifier-key axis lock, independent of the capture mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FixAxis {
    #[default]
    None,
    /// Shift is down but no movement seen yet
    Initiated,
    /// Only horizontal movement passes, y is pinned
    Horizontal,
    /// Only vertical movement passes, x is pinned
    Vertical,
}

/// Filters cursor readings while Shift is held
#[derive(Debug, Clone, Copy, Default)]
pub struct AxisLock {
    state: FixAxis,
    previous: Option<Point>,
}

impl AxisLock {
    pub fn state(&self) -> FixAxis {
        self.state
    }

    /// Shift pressed; a lock already in place is kept
    pub fn engage(&mut self) {
        if self.state == FixAxis::None {
            self.state = FixAxis::Initiated;
        }
    }

    pub fn release(&mut self) {
        self.state = FixAxis::None;
    }

    /// Clamp a raw reading; the axis is picked by the first movement after
    /// the press and the other coordinate stays at its value at lock time.
    pub fn apply(&mut self, raw: Point) -> Point {
        let fixed = match (self.state, self.previous) {
            (FixAxis::Initiated, Some(prev)) if raw.x != prev.x => {
                self.state = FixAxis::Horizontal;
                Point::new(raw.x, prev.y)
            }
            (FixAxis::Initiated, Some(prev)) if raw.y != prev.y => {
                self.state = FixAxis::Vertical;
                Point::new(prev.x, raw.y)
            }
            (FixAxis::Horizontal, Some(prev)) => Point::new(raw.x, prev.y),
            (FixAxis::Vertical, Some(prev)) => Point::new(prev.x, raw.y),
            _ => raw,
        };
        self.previous = Some(fixed);
        fixed
    }
}

/// Normalized rectangle for a corner plus a signed extent
///
/// Width and height are never negative, whatever the sign of `w` and `h`.
pub fn get_gui_rectangle(x: i32, y: i32, w: i32, h: i32) -> Rect {
    Rect::from_corners(Point::new(x, y), Point::new(x + w, y + h))
}

/// Calculate selection rectangle from the drag anchor and cursor
pub fn calc_selection_rect(anchor: Point, cursor: Point) -> Rect {
    get_gui_rectangle(cursor.x, cursor.y, anchor.x - cursor.x, anchor.y - cursor.y)
}

/// Check if a drag produced something to capture
pub fn is_valid_selection(rect: &Rect) -> bool {
    rect.width > 0 && rect.height > 0
}

/// Selection handed out on confirm
///
/// Region and Text drags span pixel to pixel inclusively, so one is added
/// to each dimension. Window and Fullscreen rectangles are used as-is.
pub fn confirmed_rect(rect: Rect, mode: CaptureMode) -> Rect {
    match mode {
        CaptureMode::Region | CaptureMode::Text => {
            Rect::new(rect.x, rect.y, rect.width + 1, rect.height + 1)
        }
        // NOTE: unverified whether Window captures need the same +1
        CaptureMode::Window | CaptureMode::Fullscreen => rect,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gui_rectangle_is_normalized_for_every_sign() {
        for (w, h) in [(30, 20), (-30, 20), (30, -20), (-30, -20), (0, 0)] {
            let r = get_gui_rectangle(100, 100, w, h);
            assert_eq!(r.x, 100.min(100 + w));
            assert_eq!(r.y, 100.min(100 + h));
            assert_eq!(r.right(), 100.max(100 + w));
            assert_eq!(r.bottom(), 100.max(100 + h));
        }
    }

    #[test]
    fn selection_rect_any_drag_direction() {
        let forward = calc_selection_rect(Point::new(50, 50), Point::new(150, 80));
        let backward = calc_selection_rect(Point::new(150, 80), Point::new(50, 50));
        assert_eq!(forward, Rect::new(50, 50, 100, 30));
        assert_eq!(forward, backward);
    }

    #[test]
    fn confirm_adds_one_for_region_and_text_only() {
        let r = Rect::new(50, 50, 100, 30);
        assert_eq!(confirmed_rect(r, CaptureMode::Region), Rect::new(50, 50, 101, 31));
        assert_eq!(confirmed_rect(r, CaptureMode::Text), Rect::new(50, 50, 101, 31));
        assert_eq!(confirmed_rect(r, CaptureMode::Window), r);
        assert_eq!(confirmed_rect(r, CaptureMode::Fullscreen), r);
    }

    #[test]
    fn axis_lock_picks_first_moving_axis() {
        let mut lock = AxisLock::default();
        assert_eq!(lock.apply(Point::new(10, 10)), Point::new(10, 10));

        lock.engage();
        assert_eq!(lock.state(), FixAxis::Initiated);
        assert_eq!(lock.apply(Point::new(10, 10)), Point::new(10, 10));
        assert_eq!(lock.state(), FixAxis::Initiated);

        assert_eq!(lock.apply(Point::new(15, 13)), Point::new(15, 10));
        assert_eq!(lock.state(), FixAxis::Horizontal);
        assert_eq!(lock.apply(Point::new(40, 90)), Point::new(40, 10));

        lock.release();
        assert_eq!(lock.state(), FixAxis::None);
        assert_eq!(lock.apply(Point::new(41, 95)), Point::new(41, 95));
    }

    #[test]
    fn axis_lock_vertical() {
        let mut lock = AxisLock::default();
        lock.apply(Point::new(20, 20));
        lock.engage();
        assert_eq!(lock.apply(Point::new(20, 30)), Point::new(20, 30));
        assert_eq!(lock.state(), FixAxis::Vertical);
        assert_eq!(lock.apply(Point::new(70, 60)), Point::new(20, 60));
        lock.engage();
        assert_eq!(lock.state(), FixAxis::Vertical);
    }
}
