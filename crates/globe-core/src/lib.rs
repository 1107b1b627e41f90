//! Renderer-independent core of the message globe.
//!
//! This crate holds everything about the globe that can be expressed as plain
//! geometry and state machines:
//!
//! - [`coords`]: geographic ↔ scene-space conversion and hemisphere formatting
//! - [`ray`] and [`camera`]: rays, intersections, and the perspective view
//!   used to turn a cursor position into a pick ray
//! - [`markers`]: the marker registry and its resource lifecycle
//! - [`pick`]: marker-first pick resolution
//! - [`orbit`]: the damped orbit controller
//! - [`framing`]: the camera framing animation

pub mod camera;
pub mod coords;
pub mod framing;
pub mod markers;
pub mod orbit;
pub mod pick;
pub mod ray;

pub use camera::{CameraFrame, PerspectiveView};
pub use coords::{Hemisphere, HemisphereCoord, LatLng, to_cartesian, to_geographic};
pub use framing::{FramingAnimator, FramingSettings, FramingStep};
pub use markers::{
    GeoPoint, MarkerAssets, MarkerDimensions, MarkerEntry, MarkerMeta, MarkerRegistry,
    MarkerShape, PlotSummary,
};
pub use orbit::{OrbitController, OrbitSettings};
pub use pick::{PickOutcome, resolve_pick};
pub use ray::Ray;
