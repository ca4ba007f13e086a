//! Overlay configuration

use crate::{OverlayError, OverlayResult};
use animation::frames_for_millis;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Overlay behaviour and appearance
///
/// Every field has a default, so partial JSON documents are accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Interval between redraw ticks
    pub frame_interval_ms: f64,
    /// Window highlight fly-in/out
    pub window_animation_ms: f64,
    /// Loupe fade-in and quadrant changes
    pub zoom_animation_ms: f64,
    /// Loupe fade-out
    pub zoom_fade_ms: f64,
    pub zoom_enabled: bool,
    /// Side of the square sampled around the cursor
    pub zoom_source_size: u32,
    /// Gap between cursor and loupe
    pub zoom_offset: i32,
    pub zoom_opacity: f32,
    pub nudge_step: i32,
    pub nudge_step_fast: i32,
    pub show_crosshair: bool,
    pub selection_fill: [u8; 4],
    pub selection_border: [u8; 4],
    pub ruler_color: [u8; 4],
    pub label_background: [u8; 4],
    pub ocr_highlight: [u8; 4],
    pub qr_highlight: [u8; 4],
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            frame_interval_ms: 1000.0 / 60.0,
            window_animation_ms: 700.0,
            zoom_animation_ms: 1000.0,
            zoom_fade_ms: 200.0,
            zoom_enabled: true,
            zoom_source_size: 25,
            zoom_offset: 20,
            zoom_opacity: 1.0,
            nudge_step: 1,
            nudge_step_fast: 10,
            show_crosshair: true,
            selection_fill: [0, 255, 0, 50],
            selection_border: [0, 128, 0, 255],
            ruler_color: [46, 139, 87, 255],
            label_background: [217, 240, 227, 200],
            ocr_highlight: [255, 255, 0, 60],
            qr_highlight: [255, 140, 0, 120],
        }
    }
}

impl OverlayConfig {
    pub fn from_json_str(json: &str) -> OverlayResult<Self> {
        let config: OverlayConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> OverlayResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> OverlayResult<()> {
        if !(self.frame_interval_ms > 0.0) {
            return Err(OverlayError::Config(format!(
                "frame_interval_ms must be positive, got {}",
                self.frame_interval_ms
            )));
        }
        if self.zoom_source_size == 0 {
            return Err(OverlayError::Config("zoom_source_size must be positive".into()));
        }
        Ok(())
    }

    /// Frames needed to play `millis` at the configured tick rate
    pub fn frames_for(&self, millis: f64) -> u32 {
        frames_for_millis(millis, self.frame_interval_ms)
    }

    pub fn nudge(&self, fast: bool) -> i32 {
        if fast {
            self.nudge_step_fast
        } else {
            self.nudge_step
        }
    }
}
