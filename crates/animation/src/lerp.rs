//! Linear interpolation for animated values

use capture::{Point, Rect};
use image::Rgba;

/// Value that can be blended between two endpoints
pub trait Lerp: Sized {
    /// `self` at `t == 0`, `to` at `t == 1`
    fn lerp(&self, to: &Self, t: f64) -> Self;
}

#[inline]
fn lerp_f64(start: f64, end: f64, t: f64) -> f64 {
    (end - start).mul_add(t, start)
}

#[inline]
fn lerp_i32(start: i32, end: i32, t: f64) -> i32 {
    lerp_f64(start as f64, end as f64, t).round() as i32
}

#[inline]
fn lerp_u32(start: u32, end: u32, t: f64) -> u32 {
    lerp_f64(start as f64, end as f64, t).round().max(0.0) as u32
}

impl Lerp for f64 {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        lerp_f64(*self, *to, t)
    }
}

impl Lerp for i32 {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        lerp_i32(*self, *to, t)
    }
}

impl Lerp for Point {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        Point::new(lerp_i32(self.x, to.x, t), lerp_i32(self.y, to.y, t))
    }
}

/// Position and size blend independently
impl Lerp for Rect {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        Rect::new(
            lerp_i32(self.x, to.x, t),
            lerp_i32(self.y, to.y, t),
            lerp_u32(self.width, to.width, t),
            lerp_u32(self.height, to.height, t),
        )
    }
}

/// Every channel, alpha included, is clamped and rounded
impl Lerp for Rgba<u8> {
    fn lerp(&self, to: &Self, t: f64) -> Self {
        let mut out = [0u8; 4];
        for (i, channel) in out.iter_mut().enumerate() {
            let value = lerp_f64(self.0[i] as f64, to.0[i] as f64, t);
            *channel = value.round().clamp(0.0, 255.0) as u8;
        }
        Rgba(out)
    }
}
