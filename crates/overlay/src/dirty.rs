//! Invalidated areas awaiting repaint

use capture::Rect;

/// Past this many pending rects the whole screen is repainted instead
const MAX_RECTS: usize = 64;

#[derive(Debug, Clone)]
pub struct DirtyRegion {
    bounds: Rect,
    rects: Vec<Rect>,
}

impl DirtyRegion {
    pub fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            rects: Vec::new(),
        }
    }

    /// Mark an area, clipped to the screen; empty areas are ignored
    pub fn add(&mut self, rect: Rect) {
        let clipped = rect.intersection(&self.bounds);
        if clipped.is_empty() || self.is_full() {
            return;
        }
        if self.rects.len() >= MAX_RECTS {
            log::trace!("{} dirty rects pending, repainting everything", self.rects.len());
            self.invalidate_all();
            return;
        }
        self.rects.push(clipped);
    }

    pub fn invalidate_all(&mut self) {
        self.rects.clear();
        self.rects.push(self.bounds);
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.rects.first() == Some(&self.bounds)
    }

    /// Drain everything marked so far
    pub fn take(&mut self) -> Vec<Rect> {
        std::mem::take(&mut self.rects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clips_and_drains() {
        let mut dirty = DirtyRegion::new(Rect::new(0, 0, 100, 100));
        dirty.add(Rect::new(-10, -10, 20, 20));
        dirty.add(Rect::new(200, 200, 5, 5));
        assert_eq!(dirty.take(), vec![Rect::new(0, 0, 10, 10)]);
        assert!(dirty.is_empty());
    }

    #[test]
    fn full_invalidation_absorbs_later_rects() {
        let mut dirty = DirtyRegion::new(Rect::new(0, 0, 100, 100));
        dirty.add(Rect::new(5, 5, 5, 5));
        dirty.invalidate_all();
        dirty.add(Rect::new(50, 50, 5, 5));
        assert!(dirty.is_full());
        assert_eq!(dirty.take(), vec![Rect::new(0, 0, 100, 100)]);
    }

    #[test]
    fn undrained_rects_collapse_to_full_repaint() {
        let mut dirty = DirtyRegion::new(Rect::new(0, 0, 100, 100));
        for i in 0..MAX_RECTS as i32 {
            dirty.add(Rect::new(i % 90, 1, 2, 2));
        }
        assert!(!dirty.is_full());

        dirty.add(Rect::new(10, 10, 2, 2));
        assert!(dirty.is_full());
        for _ in 0..1000 {
            dirty.add(Rect::new(20, 20, 2, 2));
        }
        assert_eq!(dirty.take(), vec![Rect::new(0, 0, 100, 100)]);
    }
}
