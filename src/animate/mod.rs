//! Linear tweens for screen-space animation.
//!
//! The atlas screen animates three things: the cursor gliding between
//! cells, the viewport offset, and the zoom factor. All of them are plain
//! linear interpolations over a fixed duration, so one small [`Tween`]
//! covers the lot. Durations come from gameplay constants and are applied
//! against frame delta time.

use bevy::prelude::*;

/// Something a [`Tween`] can interpolate.
pub trait Blend: Copy {
    fn blend(from: Self, to: Self, t: f32) -> Self;
}

impl Blend for f32 {
    fn blend(from: Self, to: Self, t: f32) -> Self {
        from + (to - from) * t
    }
}

impl Blend for Vec2 {
    fn blend(from: Self, to: Self, t: f32) -> Self {
        from.lerp(to, t)
    }
}

/// A linear glide from one value to another over `duration` seconds.
///
/// A non-positive duration is complete straight away. Once complete, the
/// tween reports the end value exactly, no matter how far time overshot.
#[derive(Debug, Clone, Copy)]
pub struct Tween<T: Blend> {
    from: T,
    to: T,
    duration: f32,
    elapsed: f32,
}

impl<T: Blend> Tween<T> {
    pub fn new(from: T, to: T, duration: f32) -> Self {
        Self {
            from,
            to,
            duration,
            elapsed: 0.0,
        }
    }

    /// Advances by a frame delta and returns the new value.
    pub fn advance(&mut self, dt: f32) -> T {
        self.elapsed += dt;
        self.value()
    }

    /// Fraction complete, clamped to `0.0..=1.0`.
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn value(&self) -> T {
        if self.finished() {
            // Exact endpoint, not a lerp that lands within float error of it.
            return self.to;
        }
        T::blend(self.from, self.to, self.progress())
    }

    pub fn target(&self) -> T {
        self.to
    }

    pub fn finished(&self) -> bool {
        self.duration <= 0.0 || self.elapsed >= self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tween_moves_linearly() {
        let mut tween = Tween::new(0.0_f32, 10.0, 2.0);
        assert_eq!(tween.value(), 0.0);
        assert_eq!(tween.advance(1.0), 5.0);
        assert!(!tween.finished());
        assert_eq!(tween.advance(1.0), 10.0);
        assert!(tween.finished());
    }

    #[test]
    fn zero_duration_is_complete_immediately() {
        let tween = Tween::new(3.0_f32, 8.0, 0.0);
        assert!(tween.finished());
        assert_eq!(tween.value(), 8.0);
    }

    #[test]
    fn overshoot_clamps_to_the_end_value() {
        let mut tween = Tween::new(Vec2::ZERO, Vec2::new(4.0, 2.0), 0.5);
        tween.advance(100.0);
        assert!(tween.finished());
        assert_eq!(tween.value(), Vec2::new(4.0, 2.0));
    }

    #[test]
    fn negative_elapsed_never_undershoots() {
        let tween = Tween::new(2.0_f32, 4.0, 1.0);
        // progress is clamped at the low end too
        assert_eq!(tween.progress(), 0.0);
        assert_eq!(tween.value(), 2.0);
    }
}
