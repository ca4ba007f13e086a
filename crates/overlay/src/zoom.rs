//! Loupe placement

use capture::{Point, Rect};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomQuadrant {
    BottomRight,
    BottomLeft,
    TopRight,
    TopLeft,
}

/// Loupe rectangle relative to the cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ZoomPlacement {
    pub quadrant: ZoomQuadrant,
    pub relative: Rect,
}

impl ZoomPlacement {
    /// Absolute rectangle for a cursor position
    pub fn at(&self, cursor: Point) -> Rect {
        self.relative.offset(cursor.x, cursor.y)
    }
}

/// Picks a loupe quadrant that stays on one monitor and off the selection
#[derive(Debug, Clone, Copy)]
pub struct ZoomPlacementSolver {
    offset: i32,
}

impl ZoomPlacementSolver {
    pub fn new(offset: i32) -> Self {
        Self { offset }
    }

    /// A fifth of the shorter monitor side, rounded down to a multiple of 4
    pub fn loupe_size(monitor: Rect) -> u32 {
        let size = monitor.width.min(monitor.height) / 5;
        size - size % 4
    }

    /// Candidates in priority order
    pub fn candidates(&self, size: u32) -> [ZoomPlacement; 4] {
        let near = self.offset;
        let far = -self.offset - size as i32;
        let placement = |quadrant, x, y| ZoomPlacement {
            quadrant,
            relative: Rect::new(x, y, size, size),
        };
        [
            placement(ZoomQuadrant::BottomRight, near, near),
            placement(ZoomQuadrant::BottomLeft, far, near),
            placement(ZoomQuadrant::TopRight, near, far),
            placement(ZoomQuadrant::TopLeft, far, far),
        ]
    }

    /// Whether the loupe at `relative` is usable for `cursor`
    pub fn fits(
        &self,
        relative: Rect,
        cursor: Point,
        monitor: Rect,
        selection: Rect,
        allow_overlap: bool,
    ) -> bool {
        let absolute = relative.offset(cursor.x, cursor.y);
        monitor.contains_rect(&absolute) && (allow_overlap || !selection.intersects(&absolute))
    }

    /// First fitting candidate; overlapping the selection is accepted only
    /// when nothing else fits. `None` keeps the previous placement.
    pub fn solve(
        &self,
        cursor: Point,
        monitor: Rect,
        selection: Rect,
        allow_overlap: bool,
    ) -> Option<ZoomPlacement> {
        let size = Self::loupe_size(monitor);
        if size == 0 {
            return None;
        }

        let found = self
            .candidates(size)
            .into_iter()
            .find(|c| self.fits(c.relative, cursor, monitor, selection, allow_overlap));

        match found {
            Some(placement) => Some(placement),
            None if !allow_overlap => self.solve(cursor, monitor, selection, true),
            None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Rect = Rect { x: 0, y: 0, width: 1920, height: 1080 };

    #[test]
    fn loupe_size_is_multiple_of_four() {
        assert_eq!(ZoomPlacementSolver::loupe_size(SCREEN), 216);
        assert_eq!(ZoomPlacementSolver::loupe_size(Rect::new(0, 0, 1366, 768)), 152);
        assert_eq!(ZoomPlacementSolver::loupe_size(Rect::new(0, 0, 1024, 1050)), 204);
    }

    #[test]
    fn prefers_bottom_right() {
        let solver = ZoomPlacementSolver::new(20);
        let cursor = Point::new(100, 100);
        let p = solver.solve(cursor, SCREEN, Rect::default(), false).unwrap();
        assert_eq!(p.quadrant, ZoomQuadrant::BottomRight);
        assert_eq!(p.at(cursor), Rect::new(120, 120, 216, 216));
    }

    #[test]
    fn corners_flip_to_the_free_side() {
        let solver = ZoomPlacementSolver::new(20);
        let cases = [
            (Point::new(1900, 100), ZoomQuadrant::BottomLeft),
            (Point::new(100, 1060), ZoomQuadrant::TopRight),
            (Point::new(1900, 1060), ZoomQuadrant::TopLeft),
        ];
        for (cursor, quadrant) in cases {
            let p = solver.solve(cursor, SCREEN, Rect::default(), false).unwrap();
            assert_eq!(p.quadrant, quadrant);
            assert!(SCREEN.contains_rect(&p.at(cursor)));
        }
    }

    #[test]
    fn avoids_selection_when_possible() {
        let solver = ZoomPlacementSolver::new(20);
        let cursor = Point::new(500, 500);
        let selection = Rect::new(510, 510, 300, 300);
        let p = solver.solve(cursor, SCREEN, selection, false).unwrap();
        assert_eq!(p.quadrant, ZoomQuadrant::BottomLeft);
        assert!(!selection.intersects(&p.at(cursor)));
    }

    #[test]
    fn full_screen_selection_relaxes_overlap() {
        let solver = ZoomPlacementSolver::new(20);
        let cursor = Point::new(960, 540);
        let p = solver.solve(cursor, SCREEN, SCREEN, false).unwrap();
        assert_eq!(p.quadrant, ZoomQuadrant::BottomRight);
        assert!(SCREEN.contains_rect(&p.at(cursor)));
    }

    #[test]
    fn never_spans_monitors() {
        let solver = ZoomPlacementSolver::new(20);
        let left_monitor = Rect::new(0, 0, 1920, 1080);
        let cursor = Point::new(1800, 500);
        let p = solver.solve(cursor, left_monitor, Rect::default(), false).unwrap();
        assert!(left_monitor.contains_rect(&p.at(cursor)));
    }

    #[test]
    fn too_small_monitor_has_no_placement() {
        let solver = ZoomPlacementSolver::new(20);
        let tiny = Rect::new(0, 0, 40, 40);
        assert_eq!(ZoomPlacementSolver::loupe_size(tiny), 8);
        assert!(solver.solve(Point::new(20, 20), tiny, Rect::default(), false).is_none());
    }
}
