//! Pick resolution: markers first, globe surface second.

use glam::DVec3;

use crate::coords::{LatLng, to_geographic};
use crate::markers::MarkerRegistry;
use crate::ray::Ray;

/// What a pointer press landed on.
#[derive(Debug, Clone, PartialEq)]
pub enum PickOutcome {
    /// A marker was hit; carries the marker's own coordinate.
    Marker {
        id: u64,
        coord: LatLng,
        distance: f64,
    },
    /// The globe surface was hit at this coordinate.
    Surface { coord: LatLng, distance: f64 },
}

/// Resolve a ray against the marker set and then the globe.
///
/// Any marker hit wins over the surface, even if the surface is closer.
/// Occlusion by the globe is not checked, so a marker on the far side of the
/// globe is still selected when the ray passes through it.
/// Returns `None` when the ray misses everything.
pub fn resolve_pick<H>(
    ray: &Ray,
    markers: &MarkerRegistry<H>,
    globe_radius: f64,
) -> Option<PickOutcome> {
    if let Some((entry, distance)) = markers.nearest_hit(ray) {
        return Some(PickOutcome::Marker {
            id: entry.meta.id,
            coord: entry.meta.coord,
            distance,
        });
    }

    let distance = ray.intersect_sphere(DVec3::ZERO, globe_radius)?;
    Some(PickOutcome::Surface {
        coord: to_geographic(ray.at(distance)),
        distance,
    })
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::*;
    use crate::camera::{CameraFrame, PerspectiveView};
    use crate::markers::{GeoPoint, MarkerAssets, MarkerShape};

    struct NoAssets;

    impl MarkerAssets for NoAssets {
        type Handle = ();

        fn create(&mut self, _point: &GeoPoint, _shape: &MarkerShape) -> Self::Handle {}

        fn release(&mut self, _handle: ()) {}
    }

    fn registry(points: Vec<GeoPoint>) -> MarkerRegistry<()> {
        let mut registry = MarkerRegistry::default();
        registry.plot(points, &mut NoAssets);
        registry
    }

    #[test]
    fn test_marker_beats_surface() {
        let registry = registry(vec![GeoPoint::new(9, 0.0, 0.0)]);
        let ray = Ray::new(DVec3::new(3.0, 0.0, 0.0), DVec3::NEG_X).unwrap();

        // The same ray also crosses the globe.
        assert!(ray.intersect_sphere(DVec3::ZERO, 1.0).is_some());
        match resolve_pick(&ray, &registry, 1.0) {
            Some(PickOutcome::Marker { id, coord, .. }) => {
                assert_eq!(id, 9);
                assert_eq!(coord, LatLng::new(0.0, 0.0));
            }
            other => panic!("expected marker, got {other:?}"),
        }
    }

    #[test]
    fn test_surface_hit_maps_back_to_coordinate() {
        let registry = registry(Vec::new());
        let coord = LatLng::new(35.0, -120.0);
        let origin = coord.to_cartesian(3.0);
        let ray = Ray::new(origin, -origin).unwrap();

        match resolve_pick(&ray, &registry, 1.0) {
            Some(PickOutcome::Surface { coord: hit, distance }) => {
                assert!((hit.lat - 35.0).abs() < 1e-9);
                assert!((hit.lng + 120.0).abs() < 1e-9);
                assert!((distance - 2.0).abs() < 1e-9);
            }
            other => panic!("expected surface, got {other:?}"),
        }
    }

    #[test]
    fn test_far_side_marker_is_not_occluded() {
        let registry = registry(vec![GeoPoint::new(5, 0.0, 180.0)]);
        let ray = Ray::new(DVec3::new(3.0, 0.0, 0.0), DVec3::NEG_X).unwrap();

        match resolve_pick(&ray, &registry, 1.0) {
            Some(PickOutcome::Marker { id, distance, .. }) => {
                assert_eq!(id, 5);
                // Behind the near surface, which the ray crosses at 2.
                assert!(distance > 3.0);
            }
            other => panic!("expected marker 5, got {other:?}"),
        }
    }

    #[test]
    fn test_miss_emits_nothing() {
        let registry = registry(vec![GeoPoint::new(1, 0.0, 0.0)]);
        let ray = Ray::new(DVec3::new(0.0, 5.0, 3.0), DVec3::NEG_Z).unwrap();
        assert!(resolve_pick(&ray, &registry, 1.0).is_none());
    }

    #[test]
    fn test_ray_through_projected_marker_selects_it() {
        let registry = registry(vec![
            GeoPoint::new(1, 10.0, 20.0),
            GeoPoint::new(2, -5.0, -5.0),
        ]);
        assert_eq!(registry.len(), 2);

        let eye = LatLng::new(0.0, 0.0).to_cartesian(2.5);
        let view = PerspectiveView::new(
            CameraFrame::new(eye, DVec3::ZERO),
            std::f64::consts::FRAC_PI_4,
            16.0 / 9.0,
        );

        // Click exactly where marker 2's head shows up on screen.
        let head = registry.get(2).unwrap().shape.head_center;
        let size = DVec2::new(1280.0, 720.0);
        let cursor = crate::camera::ndc_to_viewport(view.project(head).unwrap(), size);
        let ndc = crate::camera::viewport_to_ndc(cursor, size);
        let ray = view.ray_through_ndc(ndc).unwrap();

        match resolve_pick(&ray, &registry, 1.0) {
            Some(PickOutcome::Marker { id, coord, .. }) => {
                assert_eq!(id, 2);
                assert_eq!(coord, LatLng::new(-5.0, -5.0));
            }
            other => panic!("expected marker 2, got {other:?}"),
        }
    }
}
