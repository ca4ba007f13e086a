//! Animation module for Loupe
//!
//! Frame-paced interpolation used by the overlay: easing curves, the
//! [`Lerp`] trait and a generic [`Animator`] with chained legs.

pub mod animator;
pub mod easing;
pub mod lerp;

pub use animator::{frames_for_millis, AnimationLeg, Animator, ColorAnimator, RectangleAnimator};
pub use easing::{ease, EasingFamily, EasingMode, EasingSpec};
pub use lerp::Lerp;
