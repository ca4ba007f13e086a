//! Window descriptors supplied by the enumerating host

use crate::{Point, Rect};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Window information for selection
///
/// Built once before the overlay opens; children are ordered front to back
/// like the top-level list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WindowDescriptor {
    pub handle: isize,
    /// Bounds in screen coordinates
    pub rect: Rect,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub process_name: String,
    /// Drawn beside the window's debug label
    #[serde(skip)]
    pub icon: Option<Arc<RgbaImage>>,
    #[serde(default)]
    pub children: Vec<WindowDescriptor>,
}

impl PartialEq for WindowDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.handle == other.handle && self.rect == other.rect
    }
}

impl WindowDescriptor {
    pub fn new(handle: isize, rect: Rect) -> Self {
        Self {
            handle,
            rect,
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_children(mut self, children: Vec<WindowDescriptor>) -> Self {
        self.children = children;
        self
    }

    /// Check if point is inside window
    pub fn contains(&self, p: Point) -> bool {
        self.rect.contains_point(p)
    }

    /// Innermost descendant containing `p`, `None` if the window itself doesn't
    pub fn child_under_point(&self, p: Point) -> Option<&WindowDescriptor> {
        if !self.contains(p) {
            return None;
        }
        let mut current = self;
        while let Some(child) = current.children.iter().find(|c| c.contains(p)) {
            current = child;
        }
        Some(current)
    }

    /// Title, or the process name for untitled windows
    pub fn display_name(&self) -> &str {
        if self.title.is_empty() {
            &self.process_name
        } else {
            &self.title
        }
    }
}
