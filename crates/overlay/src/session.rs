//! Single active overlay
//!
//! The orchestrator hands out one [`OverlaySession`] at a time. Opening a new
//! one closes the previous session before its controller is created.

use crate::controller::{CaptureOverlayController, OverlayRequest};
use crate::input::InputEvent;
use crate::{OverlayResult, OverlayStatus};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

struct ActiveOverlay {
    token: Uuid,
    closed: Arc<AtomicBool>,
}

type Registry = Arc<Mutex<Option<ActiveOverlay>>>;

/// Owner of the at-most-one active overlay
#[derive(Clone, Default)]
pub struct OverlayOrchestrator {
    active: Registry,
}

impl OverlayOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close whatever is open, then open an overlay for `request`
    ///
    /// When the controller cannot be created the previous overlay stays
    /// closed and nothing is registered.
    pub fn open(&self, request: OverlayRequest) -> OverlayResult<OverlaySession> {
        self.close_active();

        let controller = CaptureOverlayController::new(request)?;
        let token = Uuid::new_v4();
        let closed = Arc::new(AtomicBool::new(false));
        *self.active.lock() = Some(ActiveOverlay {
            token,
            closed: Arc::clone(&closed),
        });
        log::info!("overlay {} opened", token);

        Ok(OverlaySession {
            token,
            closed,
            registry: Arc::clone(&self.active),
            controller,
        })
    }

    /// Token of the open overlay, if any
    pub fn active_token(&self) -> Option<Uuid> {
        self.active.lock().as_ref().map(|a| a.token)
    }

    pub fn close_active(&self) {
        if let Some(previous) = self.active.lock().take() {
            previous.closed.store(true, Ordering::SeqCst);
            log::info!("overlay {} closed", previous.token);
        }
    }
}

/// Handle to one overlay; input stops flowing once it is closed
pub struct OverlaySession {
    token: Uuid,
    closed: Arc<AtomicBool>,
    registry: Registry,
    controller: CaptureOverlayController,
}

impl OverlaySession {
    pub fn token(&self) -> Uuid {
        self.token
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn handle_input(&mut self, event: InputEvent) -> OverlayStatus {
        if self.is_closed() {
            return OverlayStatus::Closed;
        }
        self.controller.handle_input(event)
    }

    pub fn controller(&self) -> &CaptureOverlayController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut CaptureOverlayController {
        &mut self.controller
    }

    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        let mut active = self.registry.lock();
        if active.as_ref().is_some_and(|a| a.token == self.token) {
            *active = None;
        }
    }
}

impl Drop for OverlaySession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capture::{Capture, Rect};
    use image::RgbaImage;

    fn request() -> OverlayRequest {
        OverlayRequest::new(Capture::new(RgbaImage::new(64, 64), Rect::new(0, 0, 64, 64)).unwrap())
    }

    #[test]
    fn second_open_closes_first() {
        let orchestrator = OverlayOrchestrator::new();
        let mut first = orchestrator.open(request()).unwrap();
        let second = orchestrator.open(request()).unwrap();

        assert!(first.is_closed());
        assert_eq!(first.handle_input(InputEvent::Tick), OverlayStatus::Closed);
        assert_eq!(orchestrator.active_token(), Some(second.token()));

        // Dropping the stale session leaves the newer one registered
        drop(first);
        assert_eq!(orchestrator.active_token(), Some(second.token()));
        drop(second);
        assert_eq!(orchestrator.active_token(), None);
    }

    #[test]
    fn failed_open_registers_nothing() {
        let orchestrator = OverlayOrchestrator::new();
        let first = orchestrator.open(request()).unwrap();
        let mismatched = Capture::new(RgbaImage::new(8, 8), Rect::new(0, 0, 16, 16)).unwrap();
        let bad = OverlayRequest::new(mismatched);
        assert!(orchestrator.open(bad).is_err());
        assert!(first.is_closed());
        assert_eq!(orchestrator.active_token(), None);
    }
}
