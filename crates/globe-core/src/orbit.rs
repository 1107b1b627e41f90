//! Damped orbit controller.
//!
//! The camera orbits its target on a sphere described by an azimuth
//! (`theta`, around `+Y`), a polar angle (`phi`, from `+Y`) and a radius.
//! User drags accumulate angular deltas that are applied a fraction at a time
//! and decay every update, which gives the inertia-smoothed feel. Zoom scales
//! the radius. Panning is not supported: the target never moves.

use std::f64::consts::PI;

use glam::DVec3;

use crate::camera::CameraFrame;

/// Keeps the camera off the exact poles of the orbit sphere.
const POLAR_EPSILON: f64 = 1e-6;

/// Below this a pending rotation is treated as settled.
const SETTLE_THRESHOLD: f64 = 1e-7;

/// Tunables for [`OrbitController`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitSettings {
    /// Fraction of the pending rotation applied per update, in `(0, 1]`.
    pub damping_factor: f64,
    /// Closest allowed camera distance from the target.
    pub min_distance: f64,
    /// Farthest allowed camera distance from the target.
    pub max_distance: f64,
}

impl Default for OrbitSettings {
    fn default() -> Self {
        Self {
            damping_factor: 0.08,
            min_distance: 1.2,
            max_distance: 10.0,
        }
    }
}

/// Pending user input for the orbit camera.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitController {
    settings: OrbitSettings,
    /// Pending azimuth change in radians.
    pending_theta: f64,
    /// Pending polar change in radians.
    pending_phi: f64,
    /// Pending multiplicative radius change.
    pending_scale: f64,
}

impl OrbitController {
    pub fn new(settings: OrbitSettings) -> Self {
        Self {
            settings,
            pending_theta: 0.0,
            pending_phi: 0.0,
            pending_scale: 1.0,
        }
    }

    /// Orbit around the vertical axis. Positive angles move the camera to
    /// its left, so the globe appears to turn right.
    pub fn rotate_left(&mut self, angle: f64) {
        self.pending_theta -= angle;
    }

    /// Orbit over the top. Positive angles move the camera toward `+Y`.
    pub fn rotate_up(&mut self, angle: f64) {
        self.pending_phi -= angle;
    }

    /// Multiply the camera distance by `scale` on the next update
    /// (`< 1` zooms in).
    pub fn zoom(&mut self, scale: f64) {
        if scale.is_finite() && scale > 0.0 {
            self.pending_scale *= scale;
        }
    }

    /// True when there is no rotation or zoom left to apply.
    pub fn is_idle(&self) -> bool {
        self.pending_theta == 0.0 && self.pending_phi == 0.0 && self.pending_scale == 1.0
    }

    /// Drop all pending input.
    pub fn stop(&mut self) {
        self.pending_theta = 0.0;
        self.pending_phi = 0.0;
        self.pending_scale = 1.0;
    }

    /// Apply one damping step to `frame`.
    ///
    /// Leaves the frame untouched and returns `false` when idle, so a frame
    /// written by someone else (such as a finished framing animation) stays
    /// exactly where it was put.
    pub fn update(&mut self, frame: &mut CameraFrame) -> bool {
        if self.is_idle() {
            return false;
        }

        let offset = frame.position - frame.target;
        let radius = offset.length();
        let (mut theta, mut phi) = if radius > 0.0 {
            (
                offset.x.atan2(offset.z),
                (offset.y / radius).clamp(-1.0, 1.0).acos(),
            )
        } else {
            (0.0, PI / 2.0)
        };

        let damping = self.settings.damping_factor.clamp(f64::EPSILON, 1.0);
        theta += self.pending_theta * damping;
        phi = (phi + self.pending_phi * damping).clamp(POLAR_EPSILON, PI - POLAR_EPSILON);

        let radius = (radius * self.pending_scale)
            .clamp(self.settings.min_distance, self.settings.max_distance);
        self.pending_scale = 1.0;

        let sin_phi = phi.sin();
        frame.position = frame.target
            + DVec3::new(
                radius * sin_phi * theta.sin(),
                radius * phi.cos(),
                radius * sin_phi * theta.cos(),
            );

        self.pending_theta *= 1.0 - damping;
        self.pending_phi *= 1.0 - damping;
        if self.pending_theta.abs() < SETTLE_THRESHOLD {
            self.pending_theta = 0.0;
        }
        if self.pending_phi.abs() < SETTLE_THRESHOLD {
            self.pending_phi = 0.0;
        }

        true
    }
}

impl Default for OrbitController {
    fn default() -> Self {
        Self::new(OrbitSettings::default())
    }
}
