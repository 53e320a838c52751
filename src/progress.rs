use std::f32::consts::PI;

use crate::timer::RenderEvent;
use crate::utils::format_mm_ss;

pub const RING_RADIUS: f32 = 120.0;
pub const RING_CIRCUMFERENCE: f32 = 2.0 * PI * RING_RADIUS;

/// Length of the ring that is no longer drawn, for a progress in `[0, 1]`.
pub fn stroke_offset(progress_fraction: f32) -> f32 {
    progress_fraction.clamp(0.0, 1.0) * RING_CIRCUMFERENCE
}

/// Display state of the circular countdown.
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressRing {
    display: String,
    stroke_offset: f32,
    suppress_transition_frames: u8,
}

impl ProgressRing {
    pub fn new(remaining_seconds: u32) -> Self {
        Self {
            display: format_mm_ss(remaining_seconds),
            stroke_offset: 0.0,
            suppress_transition_frames: 1,
        }
    }

    pub fn apply(&mut self, event: &RenderEvent) {
        self.display = format_mm_ss(event.remaining_seconds);
        self.stroke_offset = stroke_offset(event.progress_fraction);
        if event.snap {
            self.suppress_transition_frames = 1;
        }
    }

    /// Called once per painted frame. Returns whether the offset change may
    /// be animated this frame.
    pub fn begin_frame(&mut self) -> bool {
        if self.suppress_transition_frames > 0 {
            self.suppress_transition_frames -= 1;
            false
        } else {
            true
        }
    }

    pub fn display(&self) -> &str {
        &self.display
    }

    #[cfg(test)]
    pub fn stroke_offset(&self) -> f32 {
        self.stroke_offset
    }

    /// Share of the ring still drawn.
    pub fn visible_fraction(&self) -> f32 {
        1.0 - self.stroke_offset / RING_CIRCUMFERENCE
    }
}

/// Linear transition of the visible ring fraction, timed in seconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RingTween {
    from: f32,
    to: f32,
    start: f64,
    duration: f64,
}

impl RingTween {
    pub fn new(value: f32, duration: f64) -> Self {
        Self {
            from: value,
            to: value,
            start: 0.0,
            duration,
        }
    }

    /// Moves the target. Without `animate` the value jumps immediately.
    pub fn retarget(&mut self, target: f32, now: f64, animate: bool) {
        if !animate {
            self.from = target;
            self.to = target;
            self.start = now;
            return;
        }
        if (target - self.to).abs() < f32::EPSILON {
            return;
        }
        self.from = self.value(now);
        self.to = target;
        self.start = now;
    }

    pub fn value(&self, now: f64) -> f32 {
        if self.duration <= 0.0 {
            return self.to;
        }
        let t = ((now - self.start) / self.duration).clamp(0.0, 1.0) as f32;
        if t >= 1.0 {
            return self.to;
        }
        self.from + (self.to - self.from) * t
    }

    pub fn is_animating(&self, now: f64) -> bool {
        self.from != self.to && now - self.start < self.duration
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_offset_bounds() {
        assert_eq!(stroke_offset(0.0), 0.0);
        assert!((stroke_offset(1.0) - RING_CIRCUMFERENCE).abs() < 1e-3);
        assert!((stroke_offset(0.5) - PI * RING_RADIUS).abs() < 1e-3);
        assert_eq!(stroke_offset(1.5), RING_CIRCUMFERENCE);
        assert_eq!(stroke_offset(-0.1), 0.0);
    }

    #[test]
    fn test_apply_formats_display() {
        let mut ring = ProgressRing::new(1500);
        assert_eq!(ring.display(), "25:00");

        ring.apply(&RenderEvent {
            remaining_seconds: 65,
            progress_fraction: 0.25,
            snap: false,
        });
        assert_eq!(ring.display(), "01:05");
        assert!((ring.visible_fraction() - 0.75).abs() < 1e-6);
        assert!((ring.stroke_offset() - 0.25 * RING_CIRCUMFERENCE).abs() < 1e-3);
    }

    #[test]
    fn test_snap_suppresses_transition_for_one_frame() {
        let mut ring = ProgressRing::new(1500);
        assert!(!ring.begin_frame());
        assert!(ring.begin_frame());

        ring.apply(&RenderEvent {
            remaining_seconds: 300,
            progress_fraction: 0.0,
            snap: true,
        });
        assert_eq!(ring.stroke_offset(), 0.0);
        assert!(!ring.begin_frame());
        assert!(ring.begin_frame());
        assert!(ring.begin_frame());
    }

    #[test]
    fn test_tween_interpolates_then_settles() {
        let mut tween = RingTween::new(1.0, 1.0);
        tween.retarget(0.8, 10.0, true);
        assert_eq!(tween.value(10.0), 1.0);
        assert!((tween.value(10.5) - 0.9).abs() < 1e-6);
        assert!(tween.is_animating(10.5));
        assert_eq!(tween.value(11.5), 0.8);
        assert!(!tween.is_animating(11.5));
    }

    #[test]
    fn test_tween_snap_skips_animation() {
        let mut tween = RingTween::new(0.2, 1.0);
        tween.retarget(1.0, 3.0, false);
        assert_eq!(tween.value(3.0), 1.0);
        assert!(!tween.is_animating(3.0));
    }
}
