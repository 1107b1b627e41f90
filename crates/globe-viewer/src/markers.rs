//! Marker entities on the globe.
//!
//! Each marker is a thin stem with a sphere on top, standing on the surface
//! along the local normal. Every marker gets its own meshes and material, and
//! they are removed from the asset stores when the marker set is replaced.

use bevy::ecs::message::MessageReader;
use bevy::prelude::*;
use globe_core::{GeoPoint, MarkerAssets, MarkerRegistry, MarkerShape};

use crate::camera::GlobeSet;
use crate::messages::PlotPoints;
use crate::scene::GlobeSettings;

/// Plugin that owns the marker set and applies plot requests.
pub struct MarkerPlugin;

impl Plugin for MarkerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Markers>()
            .add_systems(Update, handle_plot_requests.in_set(GlobeSet::Requests));
    }
}

/// The current marker set.
#[derive(Resource, Deref)]
pub struct Markers(MarkerRegistry<MarkerHandles>);

impl FromWorld for Markers {
    fn from_world(world: &mut World) -> Self {
        let dimensions = world
            .get_resource::<GlobeSettings>()
            .map(|settings| settings.markers)
            .unwrap_or_default();
        Self(MarkerRegistry::new(dimensions))
    }
}

/// Everything spawned or allocated for one marker.
#[derive(Debug)]
pub struct MarkerHandles {
    pub entity: Entity,
    stem_mesh: Handle<Mesh>,
    head_mesh: Handle<Mesh>,
    material: Handle<StandardMaterial>,
}

/// Component on a marker's root entity.
#[derive(Component, Debug, Clone, Copy)]
pub struct MarkerTag {
    pub id: u64,
}

/// Convert `0xRRGGBB` to a color.
pub fn marker_color(rgb: u32) -> Color {
    let [_, r, g, b] = rgb.to_be_bytes();
    Color::srgb_u8(r, g, b)
}

/// Spawns and despawns marker entities through the ECS.
struct BevyMarkerAssets<'a, 'w, 's> {
    commands: &'a mut Commands<'w, 's>,
    meshes: &'a mut Assets<Mesh>,
    materials: &'a mut Assets<StandardMaterial>,
}

#[allow(clippy::cast_possible_truncation)]
impl MarkerAssets for BevyMarkerAssets<'_, '_, '_> {
    type Handle = MarkerHandles;

    fn create(&mut self, point: &GeoPoint, shape: &MarkerShape) -> MarkerHandles {
        let stem_length = shape.base.distance(shape.stem_top);
        let head_height = shape.base.distance(shape.head_center);

        let stem_mesh = self
            .meshes
            .add(Cylinder::new(shape.stem_radius as f32, stem_length as f32));
        let head_mesh = self.meshes.add(Sphere::new(shape.head_radius as f32));
        let material = self.materials.add(StandardMaterial {
            base_color: marker_color(point.color_or_default()),
            perceptual_roughness: 0.5,
            ..default()
        });

        // Local +Y points away from the globe.
        let root = Transform::from_translation(shape.base.as_vec3())
            .with_rotation(Quat::from_rotation_arc(Vec3::Y, shape.normal.as_vec3()));

        let entity = self
            .commands
            .spawn((
                MarkerTag { id: point.id },
                root,
                Visibility::default(),
                children![
                    (
                        Mesh3d(stem_mesh.clone()),
                        MeshMaterial3d(material.clone()),
                        Transform::from_xyz(0.0, (stem_length / 2.0) as f32, 0.0),
                    ),
                    (
                        Mesh3d(head_mesh.clone()),
                        MeshMaterial3d(material.clone()),
                        Transform::from_xyz(0.0, head_height as f32, 0.0),
                    ),
                ],
            ))
            .id();

        MarkerHandles {
            entity,
            stem_mesh,
            head_mesh,
            material,
        }
    }

    fn release(&mut self, handles: MarkerHandles) {
        self.commands.entity(handles.entity).despawn();
        self.meshes.remove(&handles.stem_mesh);
        self.meshes.remove(&handles.head_mesh);
        self.materials.remove(&handles.material);
    }
}

/// Replace the marker set with the most recent plot request.
fn handle_plot_requests(
    mut requests: MessageReader<PlotPoints>,
    mut markers: ResMut<Markers>,
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let Some(PlotPoints(points)) = requests.read().last().cloned() else {
        return;
    };

    let mut assets = BevyMarkerAssets {
        commands: &mut commands,
        meshes: &mut meshes,
        materials: &mut materials,
    };
    let summary = markers.0.plot(points, &mut assets);

    if !summary.duplicate_ids.is_empty() {
        tracing::warn!(
            "Plotted points contain duplicate ids {:?}; picking returns the nearest",
            summary.duplicate_ids
        );
    }
    tracing::info!(
        "Plotted {} markers (released {})",
        summary.created,
        summary.released
    );
}
