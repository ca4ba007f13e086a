//! Progress remapping curves

use serde::{Deserialize, Serialize};

/// Polynomial degree of the curve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EasingFamily {
    #[default]
    Linear,
    Quadratic,
    Cubic,
    Quartic,
    Quintic,
}

impl EasingFamily {
    pub const ALL: [EasingFamily; 5] = [
        EasingFamily::Linear,
        EasingFamily::Quadratic,
        EasingFamily::Cubic,
        EasingFamily::Quartic,
        EasingFamily::Quintic,
    ];

    fn degree(self) -> i32 {
        match self {
            EasingFamily::Linear => 1,
            EasingFamily::Quadratic => 2,
            EasingFamily::Cubic => 3,
            EasingFamily::Quartic => 4,
            EasingFamily::Quintic => 5,
        }
    }

    #[inline]
    fn curve(self, t: f64) -> f64 {
        t.powi(self.degree())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingMode {
    /// Slow start, accelerates
    #[default]
    EaseIn,
    /// Fast start, decelerates
    EaseOut,
    /// Slow start and end
    EaseInOut,
}

impl EasingMode {
    pub const ALL: [EasingMode; 3] = [
        EasingMode::EaseIn,
        EasingMode::EaseOut,
        EasingMode::EaseInOut,
    ];
}

/// Family and mode of an easing curve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EasingSpec {
    pub family: EasingFamily,
    pub mode: EasingMode,
}

impl EasingSpec {
    pub const LINEAR: EasingSpec = EasingSpec::new(EasingFamily::Linear, EasingMode::EaseIn);

    pub const fn new(family: EasingFamily, mode: EasingMode) -> Self {
        Self { family, mode }
    }

    pub fn ease(&self, progress: f64) -> f64 {
        ease(progress, self.family, self.mode)
    }
}

/// Remap `progress` in `[0, 1]` along the selected curve.
///
/// Out-of-range input is clamped and NaN is treated as 0, so the result is
/// always in `[0, 1]` with `ease(0) == 0` and `ease(1) == 1`.
pub fn ease(progress: f64, family: EasingFamily, mode: EasingMode) -> f64 {
    let t = if progress.is_nan() { 0.0 } else { progress.clamp(0.0, 1.0) };
    match mode {
        EasingMode::EaseIn => family.curve(t),
        EasingMode::EaseOut => 1.0 - family.curve(1.0 - t),
        EasingMode::EaseInOut => {
            if t < 0.5 {
                family.curve(2.0 * t) / 2.0
            } else {
                1.0 - family.curve(2.0 * (1.0 - t)) / 2.0
            }
        }
    }
}
