//! Toolkit-independent input events

use capture::Point;
use serde::{Deserialize, Serialize};

/// Keys the overlay reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Key {
    Space,
    Z,
    T,
    Q,
    D,
    M,
    Shift,
    Control,
    Escape,
    Return,
    Left,
    Right,
    Up,
    Down,
    #[serde(other)]
    Other,
}

/// Everything the host forwards to the controller
///
/// Pointer positions are screen coordinates. `Tick` is the periodic redraw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    KeyDown { key: Key },
    KeyUp { key: Key },
    MouseMove { x: i32, y: i32 },
    MouseDown { x: i32, y: i32 },
    MouseUp { x: i32, y: i32 },
    Tick,
}

impl InputEvent {
    pub fn key_down(key: Key) -> Self {
        InputEvent::KeyDown { key }
    }

    pub fn key_up(key: Key) -> Self {
        InputEvent::KeyUp { key }
    }

    pub fn mouse_move(p: Point) -> Self {
        InputEvent::MouseMove { x: p.x, y: p.y }
    }

    pub fn mouse_down(p: Point) -> Self {
        InputEvent::MouseDown { x: p.x, y: p.y }
    }

    pub fn mouse_up(p: Point) -> Self {
        InputEvent::MouseUp { x: p.x, y: p.y }
    }

    /// Pointer position carried by mouse events
    pub fn position(&self) -> Option<Point> {
        match *self {
            InputEvent::MouseMove { x, y }
            | InputEvent::MouseDown { x, y }
            | InputEvent::MouseUp { x, y } => Some(Point::new(x, y)),
            _ => None,
        }
    }
}
