//! Animated camera framing on a coordinate.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use globe_core::{FramingAnimator, LatLng};

use crate::camera::{GlobeSet, OrbitCamera};
use crate::messages::FrameOnCoordinate;
use crate::scene::GlobeSettings;

/// Plugin for framing animations.
pub struct FramingPlugin;

impl Plugin for FramingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CameraFraming>()
            .add_systems(Update, handle_frame_requests.in_set(GlobeSet::Requests))
            .add_systems(Update, step_framing.in_set(GlobeSet::Framing));
    }
}

/// The framing state machine.
#[derive(Resource, Deref)]
pub struct CameraFraming(FramingAnimator);

impl FromWorld for CameraFraming {
    fn from_world(world: &mut World) -> Self {
        let settings = world
            .get_resource::<GlobeSettings>()
            .map(|settings| settings.framing)
            .unwrap_or_default();
        Self(FramingAnimator::new(settings))
    }
}

/// Start an animation for each request. Later requests replace earlier ones.
#[allow(clippy::needless_pass_by_value)]
fn handle_frame_requests(
    mut requests: MessageReader<FrameOnCoordinate>,
    mut framing: ResMut<CameraFraming>,
    camera: Single<&OrbitCamera>,
    time: Res<Time>,
) {
    let now = time.elapsed_secs_f64();
    for request in requests.read() {
        let coord = LatLng::new(request.lat, request.lng);
        let generation = framing.0.frame_on(coord, camera.frame, now);
        tracing::info!("Framing {coord} (animation {generation})");
    }
}

/// Advance the running animation and move the camera.
#[allow(clippy::needless_pass_by_value)]
fn step_framing(
    mut framing: ResMut<CameraFraming>,
    mut camera: Single<&mut OrbitCamera>,
    time: Res<Time>,
) {
    if !framing.is_active() {
        return;
    }
    let Some(step) = framing.0.step(time.elapsed_secs_f64()) else {
        return;
    };

    camera.frame = step.frame;
    if step.finished {
        // Drop inertia left from before the animation so the camera rests on
        // the exact target.
        camera.controller.stop();
        tracing::debug!("Framing animation {} complete", step.generation);
    }
}
