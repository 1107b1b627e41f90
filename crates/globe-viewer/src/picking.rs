//! Click picking of markers and the globe surface.
//!
//! The pick ray is built from the same camera frame and field of view the
//! renderer uses, so it lines up with what is on screen.

use bevy::ecs::message::MessageWriter;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::EguiContexts;
use globe_core::{PickOutcome, resolve_pick};
use glam::DVec2;

use crate::camera::{GlobeSet, OrbitCamera};
use crate::markers::Markers;
use crate::messages::{FrameOnCoordinate, MarkerSelected, SurfaceSelected};
use crate::scene::GlobeSettings;

/// Plugin for pointer picking.
pub struct PickingPlugin;

impl Plugin for PickingPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, pick_on_pointer_down.in_set(GlobeSet::Pick));
    }
}

/// Hit-test a left press against the markers, then the globe.
#[allow(clippy::needless_pass_by_value, clippy::too_many_arguments)]
fn pick_on_pointer_down(
    mouse: Res<ButtonInput<MouseButton>>,
    window: Single<&Window, With<PrimaryWindow>>,
    camera: Single<&OrbitCamera>,
    markers: Res<Markers>,
    settings: Res<GlobeSettings>,
    mut contexts: EguiContexts,
    mut marker_selected: MessageWriter<MarkerSelected>,
    mut surface_selected: MessageWriter<SurfaceSelected>,
    mut frame_requests: MessageWriter<FrameOnCoordinate>,
) {
    if !mouse.just_pressed(MouseButton::Left) {
        return;
    }
    let Some(cursor) = window.cursor_position() else {
        return;
    };

    let egui_wants_pointer = contexts
        .ctx_mut()
        .ok()
        .is_some_and(|ctx| ctx.is_pointer_over_area());
    if egui_wants_pointer {
        return;
    }

    let size = DVec2::new(f64::from(window.width()), f64::from(window.height()));
    let Some(view) = camera.view(settings.fov_y, size.x, size.y) else {
        return;
    };
    let ndc = globe_core::camera::viewport_to_ndc(cursor.as_dvec2(), size);
    let Some(ray) = view.ray_through_ndc(ndc) else {
        return;
    };

    match resolve_pick(&ray, &**markers, settings.radius) {
        Some(PickOutcome::Marker { id, coord, .. }) => {
            tracing::info!("Selected marker {id} at {coord}");
            marker_selected.write(MarkerSelected {
                id,
                lat: coord.lat,
                lng: coord.lng,
            });
            frame_requests.write(coord.into());
        }
        Some(PickOutcome::Surface { coord, .. }) => {
            tracing::info!("Selected surface at {coord}");
            surface_selected.write(SurfaceSelected {
                lat: coord.lat,
                lng: coord.lng,
            });
        }
        None => tracing::trace!("Pick missed the globe"),
    }
}
