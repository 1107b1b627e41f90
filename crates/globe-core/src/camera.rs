//! Camera frame state and the perspective view model used for picking.
//!
//! The renderer and the picker both derive the camera orientation from
//! [`view_rotation`], so a ray built here lines up with what is on screen.

use glam::{DMat3, DMat4, DQuat, DVec2, DVec3};

use crate::ray::Ray;

/// Where the camera is and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraFrame {
    pub position: DVec3,
    /// Look-at target.
    pub target: DVec3,
}

impl CameraFrame {
    pub const fn new(position: DVec3, target: DVec3) -> Self {
        Self { position, target }
    }

    /// Distance from the camera to its target.
    pub fn distance(&self) -> f64 {
        self.position.distance(self.target)
    }
}

/// Rotation for a camera at `eye` looking at `target` with `+Y` as the up hint.
///
/// The camera looks down its local `-Z`. When the view direction is nearly
/// parallel to `+Y` (framing a pole) the up hint falls back to `-Z`.
pub fn view_rotation(eye: DVec3, target: DVec3) -> DQuat {
    let Some(forward) = (target - eye).try_normalize() else {
        return DQuat::IDENTITY;
    };
    let up_hint = if forward.dot(DVec3::Y).abs() > 0.999_9 {
        DVec3::NEG_Z
    } else {
        DVec3::Y
    };
    let right = forward.cross(up_hint).normalize();
    let up = right.cross(forward);
    DQuat::from_mat3(&DMat3::from_cols(right, up, -forward))
}

/// Aspect ratio of a viewport, or `None` for a degenerate (minimized) one.
pub fn aspect_ratio(width: f64, height: f64) -> Option<f64> {
    (width > 0.0 && height > 0.0).then(|| width / height)
}

/// Convert a cursor position in viewport pixels (origin top-left, `+y` down)
/// to normalized device coordinates in `[-1, 1]` on both axes (`+y` up).
pub fn viewport_to_ndc(cursor: DVec2, viewport_size: DVec2) -> DVec2 {
    DVec2::new(
        cursor.x / viewport_size.x * 2.0 - 1.0,
        1.0 - cursor.y / viewport_size.y * 2.0,
    )
}

/// Inverse of [`viewport_to_ndc`].
pub fn ndc_to_viewport(ndc: DVec2, viewport_size: DVec2) -> DVec2 {
    DVec2::new(
        (ndc.x + 1.0) * 0.5 * viewport_size.x,
        (1.0 - ndc.y) * 0.5 * viewport_size.y,
    )
}

/// A perspective camera reduced to what picking needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveView {
    pub frame: CameraFrame,
    /// Vertical field of view in radians.
    pub fov_y: f64,
    /// Width over height.
    pub aspect: f64,
    pub near: f64,
    pub far: f64,
}

impl PerspectiveView {
    pub fn new(frame: CameraFrame, fov_y: f64, aspect: f64) -> Self {
        Self {
            frame,
            fov_y,
            aspect,
            near: 0.01,
            far: 1000.0,
        }
    }

    /// World-from-view transform.
    pub fn world_from_view(&self) -> DMat4 {
        DMat4::from_rotation_translation(
            view_rotation(self.frame.position, self.frame.target),
            self.frame.position,
        )
    }

    /// Clip-from-world transform (depth in `[0, 1]`).
    pub fn clip_from_world(&self) -> DMat4 {
        DMat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
            * self.world_from_view().inverse()
    }

    /// Ray from the camera through a point in normalized device coordinates.
    pub fn ray_through_ndc(&self, ndc: DVec2) -> Option<Ray> {
        let world_from_clip = self.clip_from_world().inverse();
        let far_point = world_from_clip.project_point3(DVec3::new(ndc.x, ndc.y, 1.0));
        Ray::new(self.frame.position, far_point - self.frame.position)
    }

    /// Project a world point to normalized device coordinates.
    ///
    /// Returns `None` for points behind the camera.
    pub fn project(&self, point: DVec3) -> Option<DVec2> {
        let view = self.world_from_view().inverse().transform_point3(point);
        if view.z >= 0.0 {
            return None;
        }
        let ndc = self.clip_from_world().project_point3(point);
        Some(DVec2::new(ndc.x, ndc.y))
    }

    /// Whether a point just above a globe centered at the origin faces the
    /// camera (is on the visible hemisphere rather than behind the horizon).
    pub fn faces_camera(&self, point: DVec3) -> bool {
        point.dot(self.frame.position - point) > 0.0
    }
}
