//! Messages exchanged between the globe engine and its collaborators.
//!
//! Inbound: [`PlotPoints`] and [`FrameOnCoordinate`]. Outbound:
//! [`MarkerSelected`] and [`SurfaceSelected`].

use bevy::ecs::message::Message;
use bevy::prelude::*;
use globe_core::{GeoPoint, HemisphereCoord, LatLng};

/// Plugin registering every globe message.
pub struct GlobeMessagesPlugin;

impl Plugin for GlobeMessagesPlugin {
    fn build(&self, app: &mut App) {
        app.add_message::<PlotPoints>()
            .add_message::<FrameOnCoordinate>()
            .add_message::<MarkerSelected>()
            .add_message::<SurfaceSelected>();
    }
}

/// Replace the full marker set. When several arrive in one frame the last
/// one wins.
#[derive(Message, Debug, Clone)]
pub struct PlotPoints(pub Vec<GeoPoint>);

/// Animate the camera to look straight down at a coordinate.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct FrameOnCoordinate {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for FrameOnCoordinate {
    fn from(coord: LatLng) -> Self {
        Self {
            lat: coord.lat,
            lng: coord.lng,
        }
    }
}

/// A marker was clicked. Carries the marker's own coordinate.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct MarkerSelected {
    pub id: u64,
    pub lat: f64,
    pub lng: f64,
}

/// The bare globe was clicked.
#[derive(Message, Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSelected {
    pub lat: f64,
    pub lng: f64,
}

impl SurfaceSelected {
    pub fn coord(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    /// Latitude as magnitude plus N/S.
    pub fn latitude(&self) -> HemisphereCoord {
        self.coord().lat_hemisphere()
    }

    /// Longitude as magnitude plus E/W.
    pub fn longitude(&self) -> HemisphereCoord {
        self.coord().lng_hemisphere()
    }
}
