//! Frame-stepped animation with queued legs

use crate::easing::EasingSpec;
use crate::lerp::Lerp;
use capture::Rect;
use image::Rgba;
use std::collections::VecDeque;

/// Frame count for a duration at a fixed frame interval, never less than one
///
/// Slow frame delivery stretches the wall-clock time, not the frame count.
pub fn frames_for_millis(millis: f64, frame_interval_ms: f64) -> u32 {
    if !(frame_interval_ms > 0.0) || !millis.is_finite() {
        return 1;
    }
    let frames = (millis / frame_interval_ms).round();
    if frames >= u32::MAX as f64 {
        u32::MAX
    } else {
        (frames as u32).max(1)
    }
}

/// One stage of a multi-stage animation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationLeg<T> {
    pub destination: T,
    pub frames: u32,
    pub easing: EasingSpec,
}

/// Interpolates from `initial` to `last` over a fixed number of frames
///
/// Call [`Animator::advance`] once per rendered frame. When a leg runs out
/// and more are queued, the next one starts from the current value.
#[derive(Debug, Clone)]
pub struct Animator<T> {
    initial: T,
    current: T,
    last: T,
    frames: u32,
    frame: u32,
    easing: EasingSpec,
    queue: VecDeque<AnimationLeg<T>>,
}

pub type RectangleAnimator = Animator<Rect>;
pub type ColorAnimator = Animator<Rgba<u8>>;

impl<T: Lerp + Copy + PartialEq> Animator<T> {
    /// Identical endpoints or zero frames produce an already finished animation
    pub fn new(initial: T, last: T, frames: u32, easing: EasingSpec) -> Self {
        let frames = if initial == last { 0 } else { frames };
        let current = if frames == 0 { last } else { initial };
        Self {
            initial,
            current,
            last,
            frames,
            frame: 0,
            easing,
            queue: VecDeque::new(),
        }
    }

    /// Animator resting at `value`
    pub fn idle(value: T) -> Self {
        Self::new(value, value, 0, EasingSpec::LINEAR)
    }

    pub fn initial(&self) -> T {
        self.initial
    }

    pub fn current(&self) -> T {
        self.current
    }

    /// Destination of the leg in flight
    pub fn last(&self) -> T {
        self.last
    }

    /// Destination once every queued leg has played
    pub fn final_destination(&self) -> T {
        self.queue.back().map_or(self.last, |leg| leg.destination)
    }

    pub fn frames(&self) -> u32 {
        self.frames
    }

    pub fn current_frame(&self) -> u32 {
        self.frame
    }

    pub fn easing(&self) -> EasingSpec {
        self.easing
    }

    pub fn queued_legs(&self) -> usize {
        self.queue.len()
    }

    pub fn has_next(&self) -> bool {
        self.frame < self.frames || !self.queue.is_empty()
    }

    /// Append a leg, played after everything already queued
    pub fn queue_leg(&mut self, destination: T, frames: u32, easing: Option<EasingSpec>) {
        self.queue.push_back(AnimationLeg {
            destination,
            frames,
            easing: easing.unwrap_or(self.easing),
        });
    }

    /// Redirect towards `last` starting from the current value
    ///
    /// Queued legs are dropped. Unlike [`Animator::new`] the leg keeps its
    /// frame count when the value already sits at `last`.
    pub fn change_destination(&mut self, last: T, frames: u32, easing: Option<EasingSpec>) {
        self.queue.clear();
        self.initial = self.current;
        self.last = last;
        self.frames = frames;
        self.frame = 0;
        if let Some(easing) = easing {
            self.easing = easing;
        }
        if self.frames == 0 {
            self.current = last;
        }
    }

    /// Step one frame and return the new current value
    ///
    /// Past the end with nothing queued this keeps returning the destination.
    pub fn advance(&mut self) -> T {
        self.promote_exhausted();
        if self.frame < self.frames {
            self.frame += 1;
            self.current = self.interpolate();
        }
        self.promote_exhausted();
        self.current
    }

    fn interpolate(&self) -> T {
        if self.frame >= self.frames {
            return self.last;
        }
        let progress = self.frame as f64 / self.frames as f64;
        self.initial.lerp(&self.last, self.easing.ease(progress))
    }

    fn promote_exhausted(&mut self) {
        while self.frame >= self.frames {
            let Some(leg) = self.queue.pop_front() else {
                break;
            };
            log::trace!("animation leg promoted, {} frames", leg.frames);
            self.initial = self.current;
            self.last = leg.destination;
            self.frames = leg.frames;
            self.frame = 0;
            self.easing = leg.easing;
            if self.frames == 0 {
                self.current = self.last;
            }
        }
    }
}
