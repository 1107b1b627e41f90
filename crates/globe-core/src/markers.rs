//! Marker set bookkeeping.
//!
//! A [`MarkerRegistry`] holds one entry per plotted [`GeoPoint`]. Every call to
//! [`MarkerRegistry::plot`] releases the whole previous set and builds a new
//! one; there is no incremental update.
//!
//! Rendering resources are created and released through the [`MarkerAssets`]
//! trait. `release` takes the handle by value, and the registry hands each
//! handle back exactly once when its entry is removed.

use std::collections::HashSet;

use glam::DVec3;

use crate::coords::{LatLng, to_cartesian};
use crate::ray::Ray;

/// Marker color used when a point does not specify one (`0xRRGGBB`).
pub const DEFAULT_MARKER_COLOR: u32 = 0xff_4d_4d;

/// A location to plot, supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoPoint {
    pub id: u64,
    /// Latitude in degrees, `[-90, 90]`.
    pub lat: f64,
    /// Longitude in degrees, `[-180, 180]`.
    pub lng: f64,
    /// Color as `0xRRGGBB`.
    pub color: Option<u32>,
    pub label: Option<String>,
}

impl GeoPoint {
    pub fn new(id: u64, lat: f64, lng: f64) -> Self {
        Self {
            id,
            lat,
            lng,
            color: None,
            label: None,
        }
    }

    #[must_use]
    pub fn with_color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn coord(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    pub fn color_or_default(&self) -> u32 {
        self.color.unwrap_or(DEFAULT_MARKER_COLOR)
    }
}

/// Sizes used to build marker geometry, in scene units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerDimensions {
    /// Radius of the globe surface the markers stand on.
    pub surface_radius: f64,
    /// Gap between the surface and the stem base, to avoid z-fighting.
    pub surface_offset: f64,
    pub stem_length: f64,
    pub stem_radius: f64,
    pub head_radius: f64,
}

impl Default for MarkerDimensions {
    fn default() -> Self {
        Self {
            surface_radius: 1.0,
            surface_offset: 0.002,
            stem_length: 0.05,
            stem_radius: 0.003,
            head_radius: 0.012,
        }
    }
}

/// Pickable geometry of one marker: a stem capsule topped by a head sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerShape {
    /// Bottom of the stem, just above the surface.
    pub base: DVec3,
    /// Outward surface normal at the marker.
    pub normal: DVec3,
    pub stem_top: DVec3,
    pub stem_radius: f64,
    pub head_center: DVec3,
    pub head_radius: f64,
}

impl MarkerShape {
    pub fn new(coord: LatLng, dimensions: &MarkerDimensions) -> Self {
        let base = to_cartesian(
            coord.lat,
            coord.lng,
            dimensions.surface_radius + dimensions.surface_offset,
        );
        let normal = base.try_normalize().unwrap_or(DVec3::Y);
        let stem_top = base + normal * dimensions.stem_length;
        Self {
            base,
            normal,
            stem_top,
            stem_radius: dimensions.stem_radius,
            head_center: stem_top + normal * dimensions.head_radius,
            head_radius: dimensions.head_radius,
        }
    }

    /// Distance along `ray` to the nearest hit on the head or stem.
    pub fn intersect(&self, ray: &Ray) -> Option<f64> {
        let head = ray.intersect_sphere(self.head_center, self.head_radius);
        let stem = ray.intersect_capsule(self.base, self.stem_top, self.stem_radius);
        match (head, stem) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (hit, None) | (None, hit) => hit,
        }
    }
}

/// Back-reference from a marker to the point it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerMeta {
    pub id: u64,
    pub coord: LatLng,
    pub label: Option<String>,
}

/// Creates and releases the rendering resources behind markers.
pub trait MarkerAssets {
    /// Whatever the implementation needs to find the resources again.
    type Handle;

    /// Build the visual for one marker.
    fn create(&mut self, point: &GeoPoint, shape: &MarkerShape) -> Self::Handle;

    /// Release everything `create` allocated for this handle.
    fn release(&mut self, handle: Self::Handle);
}

/// One plotted marker.
#[derive(Debug)]
pub struct MarkerEntry<H> {
    pub meta: MarkerMeta,
    pub shape: MarkerShape,
    pub handle: H,
}

/// What a [`MarkerRegistry::plot`] call did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlotSummary {
    pub released: usize,
    pub created: usize,
    /// Ids that appeared more than once in the input, in first-repeat order.
    pub duplicate_ids: Vec<u64>,
}

/// The current marker set.
#[derive(Debug)]
pub struct MarkerRegistry<H> {
    dimensions: MarkerDimensions,
    entries: Vec<MarkerEntry<H>>,
}

impl<H> MarkerRegistry<H> {
    pub fn new(dimensions: MarkerDimensions) -> Self {
        Self {
            dimensions,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MarkerEntry<H>> {
        self.entries.iter()
    }

    pub fn get(&self, id: u64) -> Option<&MarkerEntry<H>> {
        self.entries.iter().find(|entry| entry.meta.id == id)
    }

    /// Replace the whole marker set with one marker per point, in order.
    ///
    /// Every previous marker is released first, including when `points` is
    /// empty.
    pub fn plot<A>(
        &mut self,
        points: impl IntoIterator<Item = GeoPoint>,
        assets: &mut A,
    ) -> PlotSummary
    where
        A: MarkerAssets<Handle = H>,
    {
        let released = self.clear(assets);

        let mut seen = HashSet::new();
        let mut duplicate_ids = Vec::new();
        for point in points {
            if !seen.insert(point.id) {
                duplicate_ids.push(point.id);
            }
            let shape = MarkerShape::new(point.coord(), &self.dimensions);
            let handle = assets.create(&point, &shape);
            self.entries.push(MarkerEntry {
                meta: MarkerMeta {
                    id: point.id,
                    coord: point.coord(),
                    label: point.label,
                },
                shape,
                handle,
            });
        }

        PlotSummary {
            released,
            created: self.entries.len(),
            duplicate_ids,
        }
    }

    /// Release every marker. Returns how many were released.
    pub fn clear<A>(&mut self, assets: &mut A) -> usize
    where
        A: MarkerAssets<Handle = H>,
    {
        let released = self.entries.len();
        for entry in self.entries.drain(..) {
            assets.release(entry.handle);
        }
        released
    }

    /// Nearest marker hit by `ray`, with its distance along the ray.
    pub fn nearest_hit(&self, ray: &Ray) -> Option<(&MarkerEntry<H>, f64)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.shape.intersect(ray).map(|t| (entry, t)))
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
    }
}

impl<H> Default for MarkerRegistry<H> {
    fn default() -> Self {
        Self::new(MarkerDimensions::default())
    }
}
