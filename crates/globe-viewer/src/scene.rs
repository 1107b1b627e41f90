//! Scene bootstrap: globe, lights and camera.
//!
//! Everything here is spawned once at startup. The globe texture loads in the
//! background; if it fails the globe keeps rendering with a plain material.

use bevy::asset::LoadState;
use bevy::prelude::*;
use globe_core::{
    CameraFrame, FramingSettings, LatLng, MarkerDimensions, OrbitController, OrbitSettings,
};

use crate::camera::OrbitCamera;
use crate::launch_params::LaunchParams;

/// Plugin that builds the static scene.
pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<GlobeSettings>()
            .add_systems(Startup, setup_scene)
            .add_systems(Update, watch_globe_texture);
    }
}

/// Dimensions and tuning for the globe, its markers and the camera.
#[derive(Resource, Debug, Clone)]
pub struct GlobeSettings {
    /// Globe radius in scene units.
    pub radius: f64,
    /// Vertical field of view in radians.
    pub fov_y: f64,
    /// Marker geometry.
    pub markers: MarkerDimensions,
    /// Orbit camera damping and zoom limits.
    pub orbit: OrbitSettings,
    /// Framing animation distance and duration.
    pub framing: FramingSettings,
    /// Orbit radians per viewport height of mouse drag.
    pub rotate_speed: f64,
    /// Distance multiplier per scroll line.
    pub zoom_step: f64,
    /// Where the camera starts, before any framing.
    pub initial_view: LatLng,
}

impl Default for GlobeSettings {
    fn default() -> Self {
        let radius = 1.0;
        Self {
            radius,
            fov_y: std::f64::consts::FRAC_PI_4,
            markers: MarkerDimensions {
                surface_radius: radius,
                ..MarkerDimensions::default()
            },
            orbit: OrbitSettings {
                min_distance: radius * 1.2,
                max_distance: radius * 10.0,
                ..OrbitSettings::default()
            },
            framing: FramingSettings {
                globe_radius: radius,
                ..FramingSettings::default()
            },
            rotate_speed: std::f64::consts::TAU,
            zoom_step: 0.95,
            initial_view: LatLng::new(20.0, 0.0),
        }
    }
}

/// Ocean color used when the globe has no texture.
const FALLBACK_GLOBE_COLOR: Color = Color::srgb(0.11, 0.29, 0.52);

/// Marker component for the globe entity.
#[derive(Component)]
pub struct Globe;

/// Tracks the globe texture so a failed load can fall back gracefully.
#[derive(Resource)]
pub struct GlobeTexture {
    image: Option<Handle<Image>>,
    material: Handle<StandardMaterial>,
    status: TextureStatus,
}

/// Load status of the globe texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureStatus {
    /// Still loading.
    Pending,
    /// Texture applied.
    Loaded,
    /// No texture configured, or it failed to load.
    Untextured,
}

impl GlobeTexture {
    pub fn status(&self) -> TextureStatus {
        self.status
    }
}

/// Start loading the globe texture, if any, and create the globe material.
fn load_globe_texture(
    path: Option<&str>,
    asset_server: &AssetServer,
    materials: &mut Assets<StandardMaterial>,
) -> GlobeTexture {
    let image = path.map(|path| asset_server.load::<Image>(path.to_owned()));

    let material = materials.add(StandardMaterial {
        base_color: if image.is_some() {
            Color::WHITE
        } else {
            FALLBACK_GLOBE_COLOR
        },
        base_color_texture: image.clone(),
        perceptual_roughness: 0.9,
        ..default()
    });

    let status = if image.is_some() {
        TextureStatus::Pending
    } else {
        TextureStatus::Untextured
    };
    GlobeTexture {
        image,
        material,
        status,
    }
}

/// Build the globe, lights and camera.
#[allow(clippy::needless_pass_by_value, clippy::cast_possible_truncation)]
fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    asset_server: Res<AssetServer>,
    settings: Res<GlobeSettings>,
    params: Res<LaunchParams>,
) {
    let texture = load_globe_texture(params.texture.as_deref(), &asset_server, &mut materials);
    let material = texture.material.clone();

    // The UV sphere is built Z-up with u = 0 on +X. Tip it so the poles sit
    // on Y, then turn it half a revolution so the texture's prime meridian
    // (u = 0.5) lands on +X.
    let globe_rotation = Quat::from_rotation_y(std::f32::consts::PI)
        * Quat::from_rotation_x(-std::f32::consts::FRAC_PI_2);

    commands.spawn((
        Globe,
        Mesh3d(meshes.add(Sphere::new(settings.radius as f32).mesh().uv(96, 48))),
        MeshMaterial3d(material.clone()),
        Transform::from_rotation(globe_rotation),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 6_000.0,
            ..default()
        },
        Transform::from_xyz(4.0, 2.0, 3.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    commands.insert_resource(texture);

    let distance = settings.radius * settings.framing.distance_factor;
    let frame = CameraFrame::new(settings.initial_view.to_cartesian(distance), glam::DVec3::ZERO);

    commands.spawn((
        Camera3d::default(),
        Camera {
            clear_color: bevy::camera::ClearColorConfig::Custom(Color::BLACK),
            ..default()
        },
        Projection::Perspective(PerspectiveProjection {
            fov: settings.fov_y as f32,
            near: 0.01,
            far: 100.0,
            ..Default::default()
        }),
        AmbientLight {
            color: Color::WHITE,
            brightness: 250.0,
            ..default()
        },
        crate::camera::frame_transform(&frame),
        OrbitCamera {
            frame,
            controller: OrbitController::new(settings.orbit),
        },
    ));

    tracing::info!("Scene setup complete - drag to orbit, scroll to zoom, click to pick");
}

/// Swap in the fallback material if the globe texture fails to load.
#[allow(clippy::needless_pass_by_value)]
fn watch_globe_texture(
    texture: Option<ResMut<GlobeTexture>>,
    asset_server: Res<AssetServer>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(mut texture) = texture else {
        return;
    };
    if texture.status != TextureStatus::Pending {
        return;
    }
    let Some(image) = texture.image.clone() else {
        texture.status = TextureStatus::Untextured;
        return;
    };

    match asset_server.load_state(&image) {
        LoadState::Loaded => {
            tracing::info!("Globe texture loaded");
            texture.status = TextureStatus::Loaded;
        }
        LoadState::Failed(e) => {
            tracing::warn!("Globe texture failed to load, rendering untextured: {e}");
            if let Some(mut material) = materials.get_mut(&texture.material) {
                material.base_color_texture = None;
                material.base_color = FALLBACK_GLOBE_COLOR;
            }
            texture.image = None;
            texture.status = TextureStatus::Untextured;
        }
        LoadState::NotLoaded | LoadState::Loading => {}
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::asset::AssetPlugin;
    use bevy::image::ImagePlugin;

    use super::*;

    fn texture_app(path: Option<&str>) -> App {
        let mut app = App::new();
        app.add_plugins((MinimalPlugins, AssetPlugin::default(), ImagePlugin::default()))
            .init_asset::<StandardMaterial>()
            .add_systems(Update, watch_globe_texture);

        let world = app.world_mut();
        let asset_server = world.resource::<AssetServer>().clone();
        let mut materials = world.resource_mut::<Assets<StandardMaterial>>();
        let texture = load_globe_texture(path, &asset_server, &mut materials);
        world.insert_resource(texture);
        app
    }

    #[test]
    fn test_no_texture_is_untextured() {
        let mut app = texture_app(None);
        app.update();

        let texture = app.world().resource::<GlobeTexture>();
        assert_eq!(texture.status(), TextureStatus::Untextured);
        let materials = app.world().resource::<Assets<StandardMaterial>>();
        let material = materials.get(&texture.material).unwrap();
        assert!(material.base_color_texture.is_none());
        assert_eq!(material.base_color, FALLBACK_GLOBE_COLOR);
    }

    #[test]
    fn test_failed_texture_falls_back_to_plain_material() {
        let mut app = texture_app(Some("missing.png"));
        assert_eq!(
            app.world().resource::<GlobeTexture>().status(),
            TextureStatus::Pending
        );

        // Loading happens on the IO task pool.
        for _ in 0..500 {
            app.update();
            if app.world().resource::<GlobeTexture>().status() != TextureStatus::Pending {
                break;
            }
            std::thread::sleep(Duration::from_millis(5));
        }

        let texture = app.world().resource::<GlobeTexture>();
        assert_eq!(texture.status(), TextureStatus::Untextured);
        assert!(texture.image.is_none());
        let materials = app.world().resource::<Assets<StandardMaterial>>();
        let material = materials.get(&texture.material).unwrap();
        assert!(material.base_color_texture.is_none());
        assert_eq!(material.base_color, FALLBACK_GLOBE_COLOR);
    }
}
