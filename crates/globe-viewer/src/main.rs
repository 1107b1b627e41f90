//! Interactive 3D globe for browsing geotagged messages, using Bevy.
//!
//! Messages are plotted as markers on a textured globe. Drag to orbit, scroll
//! to zoom, click a marker to fly to it, or click the globe to pick a
//! location for a new message.

mod board;
mod camera;
mod framing;
mod launch_params;
mod markers;
mod messages;
mod picking;
mod points;
mod scene;
mod ui;

use bevy::prelude::*;
use bevy_egui::EguiPlugin;
use board::MessageBoardPlugin;
use camera::OrbitCameraPlugin;
use framing::FramingPlugin;
use markers::MarkerPlugin;
use messages::GlobeMessagesPlugin;
use picking::PickingPlugin;
use scene::ScenePlugin;
use ui::OverlayUiPlugin;

/// Plugin for the globe engine and the message board on top of it.
pub struct AppPlugin;

impl Plugin for AppPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin::default())
            .add_plugins((
                GlobeMessagesPlugin,
                ScenePlugin,
                OrbitCameraPlugin,
                MarkerPlugin,
                PickingPlugin,
                FramingPlugin,
                OverlayUiPlugin,
                MessageBoardPlugin,
            ));
    }
}

fn main() {
    // Initialize tracing for native platforms.
    #[cfg(not(target_family = "wasm"))]
    {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
        tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer())
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
            )
            .init();
    }

    // Initialize tracing for WASM (logs to browser console).
    #[cfg(target_family = "wasm")]
    {
        console_error_panic_hook::set_once();
        tracing_wasm::set_as_global_default();
    }

    let params = launch_params::parse();

    let mut app = App::new();

    #[allow(unused_mut)]
    let mut window = Window {
        title: "globe-viewer".to_string(),
        resolution: (1280, 720).into(),
        ..Default::default()
    };

    // WASM: Fit canvas to parent element and prevent browser event handling.
    #[cfg(target_family = "wasm")]
    {
        window.fit_canvas_to_parent = true;
        window.prevent_default_event_handling = true;
    }

    app.add_plugins(DefaultPlugins.set(WindowPlugin {
        primary_window: Some(window),
        ..Default::default()
    }))
    .insert_resource(params)
    .add_plugins(AppPlugin)
    .run();
}
