//! Camera framing animation.
//!
//! Moves the camera from wherever it currently is to a point directly above a
//! geographic coordinate, looking at the globe center.
//!
//! ## State machine
//!
//! ```text
//! Idle --frame_on--> Animating(g) --step (t >= 1)--> Idle
//!                    Animating(g) --frame_on--> Animating(g + 1)
//! ```
//!
//! A new request replaces the running animation and starts from the camera's
//! current (possibly mid-flight) frame. Each animation carries a generation;
//! completing with a stale generation is a no-op, so an old animation can
//! never clobber a newer one.

use glam::DVec3;

use crate::camera::CameraFrame;
use crate::coords::{LatLng, slerp_dvec3, smootherstep};

/// Tunables for [`FramingAnimator`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramingSettings {
    /// Radius of the globe being framed; the globe is centered at the origin.
    pub globe_radius: f64,
    /// Camera distance from the globe center, as a multiple of the radius.
    pub distance_factor: f64,
    /// Animation duration in seconds.
    pub duration: f64,
}

impl Default for FramingSettings {
    fn default() -> Self {
        Self {
            globe_radius: 1.0,
            distance_factor: 2.5,
            duration: 1.2,
        }
    }
}

/// An in-flight framing animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramingAnimation {
    /// Clock time the animation started, in seconds.
    pub start_time: f64,
    pub from: CameraFrame,
    pub to: CameraFrame,
    pub generation: u64,
}

/// Animator state.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum FramingState {
    #[default]
    Idle,
    Animating(FramingAnimation),
}

/// Result of advancing the animator by one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FramingStep {
    /// Camera frame to apply this tick.
    pub frame: CameraFrame,
    pub generation: u64,
    /// True on the tick that reached the target.
    pub finished: bool,
}

/// Drives [`FramingState`] one tick at a time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FramingAnimator {
    settings: FramingSettings,
    state: FramingState,
    last_generation: u64,
}

impl FramingAnimator {
    pub fn new(settings: FramingSettings) -> Self {
        Self {
            settings,
            state: FramingState::Idle,
            last_generation: 0,
        }
    }

    /// Returns true if an animation is in flight.
    pub fn is_active(&self) -> bool {
        matches!(self.state, FramingState::Animating(_))
    }

    /// Generation of the in-flight animation, if any.
    pub fn current_generation(&self) -> Option<u64> {
        match self.state {
            FramingState::Animating(animation) => Some(animation.generation),
            FramingState::Idle => None,
        }
    }

    /// Progress from 0.0 to 1.0 at clock time `now`, or `None` when idle.
    pub fn progress(&self, now: f64) -> Option<f64> {
        match self.state {
            FramingState::Animating(animation) => Some(self.raw_t(&animation, now)),
            FramingState::Idle => None,
        }
    }

    /// Camera frame that centers `coord`: directly above it, looking at the
    /// globe center.
    pub fn target_frame(&self, coord: LatLng) -> CameraFrame {
        let distance = self.settings.globe_radius * self.settings.distance_factor;
        CameraFrame::new(coord.to_cartesian(distance), DVec3::ZERO)
    }

    /// Start framing `coord` from `current`, replacing any running animation.
    ///
    /// Returns the new animation's generation.
    pub fn frame_on(&mut self, coord: LatLng, current: CameraFrame, now: f64) -> u64 {
        self.last_generation += 1;
        let generation = self.last_generation;
        self.state = FramingState::Animating(FramingAnimation {
            start_time: now,
            from: current,
            to: self.target_frame(coord),
            generation,
        });
        generation
    }

    /// Advance to clock time `now`.
    ///
    /// Returns `None` when idle. On the finishing tick the returned frame is
    /// exactly the animation's target and the animator goes idle.
    pub fn step(&mut self, now: f64) -> Option<FramingStep> {
        let FramingState::Animating(animation) = self.state else {
            return None;
        };

        let t = self.raw_t(&animation, now);
        if t >= 1.0 {
            self.complete(animation.generation);
            return Some(FramingStep {
                frame: animation.to,
                generation: animation.generation,
                finished: true,
            });
        }

        Some(FramingStep {
            frame: interpolate(&animation.from, &animation.to, smootherstep(t)),
            generation: animation.generation,
            finished: false,
        })
    }

    /// Finish the animation with the given generation.
    ///
    /// Returns false (and changes nothing) if that animation has already been
    /// superseded or finished.
    pub fn complete(&mut self, generation: u64) -> bool {
        if self.current_generation() == Some(generation) {
            self.state = FramingState::Idle;
            true
        } else {
            false
        }
    }

    fn raw_t(&self, animation: &FramingAnimation, now: f64) -> f64 {
        if self.settings.duration <= 0.0 {
            return 1.0;
        }
        ((now - animation.start_time) / self.settings.duration).clamp(0.0, 1.0)
    }
}

/// Interpolate between two frames at eased parameter `t`.
///
/// Position direction follows the great circle around the globe center and
/// distance changes linearly, so the camera never cuts through the globe.
/// The look-at target moves linearly.
fn interpolate(from: &CameraFrame, to: &CameraFrame, t: f64) -> CameraFrame {
    let from_distance = from.position.length();
    let to_distance = to.position.length();
    let position = match (from.position.try_normalize(), to.position.try_normalize()) {
        (Some(a), Some(b)) => {
            slerp_dvec3(a, b, t) * (from_distance + (to_distance - from_distance) * t)
        }
        _ => from.position.lerp(to.position, t),
    };
    CameraFrame::new(position, from.target.lerp(to.target, t))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn animator() -> FramingAnimator {
        FramingAnimator::new(FramingSettings::default())
    }

    fn start_frame() -> CameraFrame {
        CameraFrame::new(DVec3::new(0.3, 1.1, 2.7), DVec3::new(0.1, 0.0, -0.2))
    }

    #[test]
    fn test_idle_step_is_none() {
        let mut animator = animator();
        assert!(animator.step(0.0).is_none());
        assert!(!animator.is_active());
        assert!(animator.progress(0.0).is_none());
    }

    #[test]
    fn test_target_frame_is_above_coordinate() {
        let animator = animator();
        let frame = animator.target_frame(LatLng::new(0.0, 0.0));
        assert!((frame.position - DVec3::new(2.5, 0.0, 0.0)).length() < 1e-12);
        assert_eq!(frame.target, DVec3::ZERO);
    }

    #[test]
    fn test_terminates_exactly_at_target() {
        let mut animator = animator();
        let coord = LatLng::new(48.85, 2.35);
        let expected = animator.target_frame(coord);

        for start in [
            start_frame(),
            CameraFrame::new(DVec3::new(-4.0, -1.0, 0.5), DVec3::ZERO),
            // Antipodal start.
            CameraFrame::new(-expected.position, DVec3::ZERO),
        ] {
            animator.frame_on(coord, start, 10.0);
            let mut last = None;
            let mut now = 10.0;
            while let Some(step) = animator.step(now) {
                last = Some(step);
                if step.finished {
                    break;
                }
                // Never passes through the globe.
                assert!(step.frame.position.length() > 1.0);
                now += 1.0 / 60.0;
            }
            let last = last.unwrap();
            assert!(last.finished);
            assert_eq!(last.frame.position, expected.position);
            assert_eq!(last.frame.target, DVec3::ZERO);
            assert!(!animator.is_active());
        }
    }

    #[test]
    fn test_starts_from_current_frame() {
        let mut animator = animator();
        let start = start_frame();
        animator.frame_on(LatLng::new(10.0, 20.0), start, 0.0);
        let step = animator.step(0.0).unwrap();
        assert!(!step.finished);
        assert!((step.frame.position - start.position).length() < 1e-12);
        assert!((step.frame.target - start.target).length() < 1e-12);

        assert_eq!(animator.progress(0.0), Some(0.0));
        assert!((animator.progress(0.6).unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(animator.progress(9.0), Some(1.0));
    }

    #[test]
    fn test_preemption_ends_at_latest_target() {
        let mut animator = animator();
        let a = LatLng::new(10.0, 20.0);
        let b = LatLng::new(-35.0, 140.0);

        let gen_a = animator.frame_on(a, start_frame(), 0.0);
        let mid = animator.step(0.5).unwrap();
        let gen_b = animator.frame_on(b, mid.frame, 0.5);
        assert!(gen_b > gen_a);

        // B starts from A's mid-flight frame, not from A's origin.
        let first_b = animator.step(0.5).unwrap();
        assert_eq!(first_b.generation, gen_b);
        assert!((first_b.frame.position - mid.frame.position).length() < 1e-12);

        // Well past A's end time, still animating B.
        let at_a_end = animator.step(1.2).unwrap();
        assert_eq!(at_a_end.generation, gen_b);
        assert!(!at_a_end.finished);

        let end = animator.step(2.0).unwrap();
        assert!(end.finished);
        assert_eq!(end.frame, animator.target_frame(b));
        assert_ne!(end.frame, animator.target_frame(a));
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut animator = animator();
        let old = animator.frame_on(LatLng::new(1.0, 2.0), start_frame(), 0.0);
        let new = animator.frame_on(LatLng::new(3.0, 4.0), start_frame(), 0.1);

        assert!(!animator.complete(old));
        assert_eq!(animator.current_generation(), Some(new));
        assert!(animator.complete(new));
        assert!(!animator.complete(new));
    }

    #[test]
    fn test_zero_duration_finishes_immediately() {
        let mut animator = FramingAnimator::new(FramingSettings {
            duration: 0.0,
            ..FramingSettings::default()
        });
        let coord = LatLng::new(-20.0, -60.0);
        animator.frame_on(coord, start_frame(), 5.0);
        let step = animator.step(5.0).unwrap();
        assert!(step.finished);
        assert_eq!(step.frame, animator.target_frame(coord));
    }
}
