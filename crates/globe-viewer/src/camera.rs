//! Orbit camera around the globe.
//!
//! Left-drag orbits, the scroll wheel zooms. The high-precision
//! [`CameraFrame`] on [`OrbitCamera`] is the source of truth; the camera's
//! `Transform` is rewritten from it at the end of every frame.

use bevy::ecs::message::MessageReader;
use bevy::input::mouse::{MouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};
use bevy_egui::EguiContexts;
use globe_core::{CameraFrame, OrbitController, PerspectiveView};

use crate::scene::GlobeSettings;

/// Plugin for the orbit camera and the per-frame system ordering.
pub struct OrbitCameraPlugin;

impl Plugin for OrbitCameraPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            Update,
            (
                GlobeSet::Resize,
                GlobeSet::Input,
                GlobeSet::Pick,
                GlobeSet::Requests,
                GlobeSet::Orbit,
                GlobeSet::Framing,
                GlobeSet::Apply,
            )
                .chain(),
        )
        .add_systems(Update, handle_resize.in_set(GlobeSet::Resize))
        .add_systems(Update, orbit_input.in_set(GlobeSet::Input))
        .add_systems(Update, update_orbit.in_set(GlobeSet::Orbit))
        .add_systems(Update, apply_camera_frame.in_set(GlobeSet::Apply));
    }
}

/// Order in which the globe systems run each frame.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GlobeSet {
    /// Aspect ratio follows the window.
    Resize,
    /// Pointer drags and wheel turn into orbit deltas.
    Input,
    /// Pointer presses are hit-tested.
    Pick,
    /// Plot and framing requests are applied.
    Requests,
    /// Orbit damping step.
    Orbit,
    /// Framing animation step. Runs after the orbit so it has the last word.
    Framing,
    /// The camera frame is written to the `Transform`.
    Apply,
}

/// The globe camera's state.
#[derive(Component)]
pub struct OrbitCamera {
    /// High-precision position and look-at target.
    pub frame: CameraFrame,
    pub controller: OrbitController,
}

impl OrbitCamera {
    /// View model matching what is rendered, for a viewport of the given size.
    pub fn view(&self, fov_y: f64, width: f64, height: f64) -> Option<PerspectiveView> {
        let aspect = globe_core::camera::aspect_ratio(width, height)?;
        Some(PerspectiveView::new(self.frame, fov_y, aspect))
    }
}

/// `Transform` for a camera frame.
pub fn frame_transform(frame: &CameraFrame) -> Transform {
    let rotation = globe_core::camera::view_rotation(frame.position, frame.target);
    Transform {
        translation: frame.position.as_vec3(),
        rotation: rotation.as_quat(),
        ..default()
    }
}

/// Keep the projection's aspect ratio in step with the window.
#[allow(clippy::cast_possible_truncation)]
fn handle_resize(
    mut resized: MessageReader<WindowResized>,
    mut projection: Single<&mut Projection, With<OrbitCamera>>,
) {
    // Only the latest usable size matters.
    let mut latest = None;
    for event in resized.read() {
        match globe_core::camera::aspect_ratio(f64::from(event.width), f64::from(event.height)) {
            Some(aspect) => latest = Some((aspect, event.width, event.height)),
            None => tracing::debug!("Ignoring resize to {}x{}", event.width, event.height),
        }
    }
    let Some((aspect, width, height)) = latest else {
        return;
    };

    if let Projection::Perspective(perspective) = &mut **projection {
        perspective.aspect_ratio = aspect as f32;
        tracing::debug!("Viewport resized to {width}x{height}");
    }
}

/// Turn left-drags and wheel turns into orbit deltas.
#[allow(clippy::needless_pass_by_value)]
fn orbit_input(
    mouse: Res<ButtonInput<MouseButton>>,
    mut mouse_motion: MessageReader<MouseMotion>,
    mut scroll_events: MessageReader<MouseWheel>,
    window: Single<&Window, With<PrimaryWindow>>,
    settings: Res<GlobeSettings>,
    mut contexts: EguiContexts,
    mut camera: Single<&mut OrbitCamera>,
) {
    let egui_wants_pointer = contexts
        .ctx_mut()
        .ok()
        .is_some_and(|ctx| ctx.is_pointer_over_area() || ctx.is_using_pointer());
    if egui_wants_pointer {
        mouse_motion.clear();
        scroll_events.clear();
        return;
    }

    let height = f64::from(window.height());
    if mouse.pressed(MouseButton::Left) && height > 0.0 {
        let mut delta = Vec2::ZERO;
        for motion in mouse_motion.read() {
            delta += motion.delta;
        }
        if delta != Vec2::ZERO {
            let per_pixel = settings.rotate_speed / height;
            camera.controller.rotate_left(f64::from(delta.x) * per_pixel);
            camera.controller.rotate_up(f64::from(delta.y) * per_pixel);
        }
    } else {
        mouse_motion.clear();
    }

    for event in scroll_events.read() {
        // Normalize scroll value: web reports pixels, native reports lines.
        let scroll = match event.unit {
            MouseScrollUnit::Line => event.y,
            MouseScrollUnit::Pixel => event.y / 120.0,
        };
        if scroll != 0.0 {
            // Scrolling up moves closer.
            camera
                .controller
                .zoom(settings.zoom_step.powf(f64::from(scroll)));
        }
    }
}

/// Apply one damping step of the orbit controller.
fn update_orbit(mut camera: Single<&mut OrbitCamera>) {
    let camera = &mut **camera;
    camera.controller.update(&mut camera.frame);
}

/// Write the camera frame to the camera's `Transform`.
fn apply_camera_frame(mut query: Query<(&OrbitCamera, &mut Transform), Changed<OrbitCamera>>) {
    for (camera, mut transform) in &mut query {
        *transform = frame_transform(&camera.frame);
    }
}
