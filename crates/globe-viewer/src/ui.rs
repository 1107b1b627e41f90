//! Egui overlays: marker labels and the debug panel.

use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use bevy_egui::{EguiContexts, EguiPrimaryContextPass, egui};
use globe_core::to_geographic;
use glam::DVec2;

use crate::camera::OrbitCamera;
use crate::framing::CameraFraming;
use crate::markers::Markers;
use crate::scene::{GlobeSettings, GlobeTexture, TextureStatus};

/// Plugin for the label overlay and debug panel.
pub struct OverlayUiPlugin;

impl Plugin for OverlayUiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(FrameTimeDiagnosticsPlugin::default())
            .add_systems(
                EguiPrimaryContextPass,
                (marker_labels_system, debug_ui_system),
            );
    }
}

/// Draw each marker's label above its head when the head faces the camera.
#[allow(clippy::needless_pass_by_value, clippy::cast_possible_truncation)]
fn marker_labels_system(
    mut contexts: EguiContexts,
    markers: Res<Markers>,
    settings: Res<GlobeSettings>,
    window: Single<&Window, With<PrimaryWindow>>,
    camera: Single<&OrbitCamera>,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    let size = DVec2::new(f64::from(window.width()), f64::from(window.height()));
    let Some(view) = camera.view(settings.fov_y, size.x, size.y) else {
        return Ok(());
    };

    let painter = ctx.layer_painter(egui::LayerId::background());
    for entry in markers.iter() {
        let Some(label) = entry.meta.label.as_deref() else {
            continue;
        };
        let head = entry.shape.head_center;
        if !view.faces_camera(head) {
            continue;
        }
        let Some(ndc) = view.project(head) else {
            continue;
        };
        let screen = globe_core::camera::ndc_to_viewport(ndc, size);
        let anchor = egui::pos2(screen.x as f32, screen.y as f32 - 8.0);
        painter.text(
            anchor,
            egui::Align2::CENTER_BOTTOM,
            label,
            egui::FontId::proportional(13.0),
            egui::Color32::WHITE,
        );
    }

    Ok(())
}

/// Render the debug panel.
#[allow(clippy::needless_pass_by_value)]
fn debug_ui_system(
    mut contexts: EguiContexts,
    diagnostics: Res<DiagnosticsStore>,
    settings: Res<GlobeSettings>,
    markers: Res<Markers>,
    framing: Res<CameraFraming>,
    texture: Option<Res<GlobeTexture>>,
    time: Res<Time>,
    camera: Single<&OrbitCamera>,
) -> Result {
    let ctx = contexts.ctx_mut()?;

    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(bevy::diagnostic::Diagnostic::smoothed)
        .unwrap_or(0.0);

    let beneath = to_geographic(camera.frame.position);
    let altitude = camera.frame.distance() - settings.radius;
    let framing_str = match framing.progress(time.elapsed_secs_f64()) {
        Some(t) => format!("animating {:.0}%", t * 100.0),
        None => "idle".to_owned(),
    };

    let texture_str = match texture.map(|texture| texture.status()) {
        Some(TextureStatus::Loaded) => "loaded",
        Some(TextureStatus::Pending) => "loading",
        Some(TextureStatus::Untextured) | None => "none",
    };

    egui::Window::new("Debug")
        .default_pos([10.0, 10.0])
        .default_open(false)
        .show(ctx, |ui| {
            ui.label(format!("FPS: {fps:.0}"));
            ui.label(format!("Above: {beneath}"));
            ui.label(format!("Altitude: {altitude:.3} units"));
            ui.label(format!("Markers: {}", markers.len()));
            ui.label(format!("Framing: {framing_str}"));
            ui.label(format!("Texture: {texture_str}"));
            ui.separator();
            ui.label("Controls:");
            ui.label("  Left drag - Orbit");
            ui.label("  Scroll - Zoom");
            ui.label("  Click - Select marker or location");
        });

    Ok(())
}
