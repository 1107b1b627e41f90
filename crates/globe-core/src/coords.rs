//! Coordinate conversion utilities.
//!
//! Converts between geographic coordinates (latitude, longitude in degrees)
//! and points in the globe's scene space.
//!
//! Scene space is Y-up: the north pole lies on `+Y`, the prime meridian on
//! `+X`, and increasing longitude rotates toward `-Z`. This is a proper
//! rotation of standard ECEF, `scene = (ecef.x, ecef.z, -ecef.y)`, so east
//! keeps the same rotational sense in both directions of the conversion.

use std::fmt;

use glam::DVec3;

/// A geographic coordinate in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLng {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Position of this coordinate on a sphere of the given radius.
    pub fn to_cartesian(self, radius: f64) -> DVec3 {
        to_cartesian(self.lat, self.lng, radius)
    }

    /// Latitude split into magnitude and hemisphere.
    pub fn lat_hemisphere(self) -> HemisphereCoord {
        HemisphereCoord::latitude(self.lat)
    }

    /// Longitude split into magnitude and hemisphere.
    pub fn lng_hemisphere(self) -> HemisphereCoord {
        HemisphereCoord::longitude(self.lng)
    }
}

impl fmt::Display for LatLng {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}, {}", self.lat_hemisphere(), self.lng_hemisphere())
    }
}

/// Convert latitude, longitude (degrees), and radius to a scene-space position.
///
/// Uses a spherical globe.
pub fn to_cartesian(lat_deg: f64, lng_deg: f64, radius: f64) -> DVec3 {
    let lat_rad = lat_deg.to_radians();
    let lng_rad = lng_deg.to_radians();
    DVec3::new(
        radius * lat_rad.cos() * lng_rad.cos(),
        radius * lat_rad.sin(),
        -radius * lat_rad.cos() * lng_rad.sin(),
    )
}

/// Convert a scene-space position to latitude and longitude (degrees).
///
/// The radius of the input is irrelevant. The arcsine argument is clamped so
/// rounding at the poles can never produce `NaN`; the origin maps to `(0, 0)`.
pub fn to_geographic(position: DVec3) -> LatLng {
    let length = position.length();
    if length == 0.0 {
        return LatLng::new(0.0, 0.0);
    }
    let lat_rad = (position.y / length).clamp(-1.0, 1.0).asin();
    let lng_rad = (-position.z).atan2(position.x);
    LatLng::new(lat_rad.to_degrees(), lng_rad.to_degrees())
}

/// Hemisphere indicator for one axis of a geographic coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hemisphere {
    North,
    South,
    East,
    West,
}

impl Hemisphere {
    /// Single-letter compass abbreviation.
    pub fn letter(self) -> char {
        match self {
            Hemisphere::North => 'N',
            Hemisphere::South => 'S',
            Hemisphere::East => 'E',
            Hemisphere::West => 'W',
        }
    }

    /// Sign applied to the magnitude to recover the signed degree value.
    pub fn sign(self) -> f64 {
        match self {
            Hemisphere::North | Hemisphere::East => 1.0,
            Hemisphere::South | Hemisphere::West => -1.0,
        }
    }
}

/// A signed angle decomposed into magnitude and hemisphere.
///
/// Zero is reported as north / east.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphereCoord {
    /// Absolute value in degrees.
    pub magnitude: f64,
    pub hemisphere: Hemisphere,
}

impl HemisphereCoord {
    pub fn latitude(lat_deg: f64) -> Self {
        let hemisphere = if lat_deg < 0.0 {
            Hemisphere::South
        } else {
            Hemisphere::North
        };
        Self {
            magnitude: lat_deg.abs(),
            hemisphere,
        }
    }

    pub fn longitude(lng_deg: f64) -> Self {
        let hemisphere = if lng_deg < 0.0 {
            Hemisphere::West
        } else {
            Hemisphere::East
        };
        Self {
            magnitude: lng_deg.abs(),
            hemisphere,
        }
    }

    /// The signed degree value this decomposition came from.
    pub fn signed(self) -> f64 {
        self.magnitude * self.hemisphere.sign()
    }
}

impl fmt::Display for HemisphereCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}° {}", self.magnitude, self.hemisphere.letter())
    }
}

/// Smoother step interpolation (Ken Perlin's improved version).
///
/// Has zero first and second derivative at both endpoints, and returns
/// exactly `1.0` for `t >= 1.0`.
pub fn smootherstep(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    t * t * t * (t * (t * 6.0 - 15.0) + 10.0)
}

/// Spherical linear interpolation for normalized `DVec3`.
///
/// Interpolates along the great circle between two unit vectors.
pub fn slerp_dvec3(a: DVec3, b: DVec3, t: f64) -> DVec3 {
    let dot = a.dot(b).clamp(-1.0, 1.0);
    let theta = dot.acos();

    if theta.abs() < 1e-10 {
        return a.lerp(b, t).normalize();
    }

    // Antipodal: any great circle works, pick one through a perpendicular axis.
    if theta > std::f64::consts::PI - 1e-6 {
        let perp = if a.x.abs() < 0.9 {
            DVec3::X.cross(a).normalize()
        } else {
            DVec3::Y.cross(a).normalize()
        };
        let angle = t * std::f64::consts::PI;
        return (a * angle.cos() + perp * angle.sin()).normalize();
    }

    let sin_theta = theta.sin();
    let a_weight = ((1.0 - t) * theta).sin() / sin_theta;
    let b_weight = (t * theta).sin() / sin_theta;

    (a * a_weight + b * b_weight).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_close(a: DVec3, b: DVec3) {
        assert!((a - b).length() < 1e-9, "{a} != {b}");
    }

    /// Smallest difference between two longitudes, accounting for the ±180 seam.
    fn lng_delta(a: f64, b: f64) -> f64 {
        let d = (a - b).rem_euclid(360.0);
        d.min(360.0 - d)
    }

    #[test]
    fn test_to_cartesian_reference_points() {
        assert_close(to_cartesian(0.0, 0.0, 1.0), DVec3::X);
        assert_close(to_cartesian(90.0, 0.0, 1.0), DVec3::Y);
        assert_close(to_cartesian(-90.0, 0.0, 1.0), DVec3::NEG_Y);
        // East is -Z.
        assert_close(to_cartesian(0.0, 90.0, 1.0), DVec3::NEG_Z);
        assert_close(to_cartesian(0.0, -90.0, 1.0), DVec3::Z);
        assert_close(to_cartesian(0.0, 180.0, 2.0), DVec3::new(-2.0, 0.0, 0.0));
    }

    #[test]
    fn test_to_geographic_reference_points() {
        let east = to_geographic(DVec3::NEG_Z);
        assert!(east.lat.abs() < 1e-12);
        assert!((east.lng - 90.0).abs() < 1e-12);

        let west = to_geographic(DVec3::new(0.0, 0.0, 3.0));
        assert!((west.lng + 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_to_geographic_poles_are_finite() {
        for lat in [90.0, -90.0] {
            for lng in [-180.0, -45.0, 0.0, 120.0, 180.0] {
                let geo = to_geographic(to_cartesian(lat, lng, 1.0));
                assert!(geo.lat.is_finite() && geo.lng.is_finite());
                assert!((geo.lat - lat).abs() < 1e-6);
            }
        }

        // Overshoot past the unit length must not escape the asin domain.
        let geo = to_geographic(DVec3::new(0.0, 1.0 + 1e-15, 0.0));
        assert!((geo.lat - 90.0).abs() < 1e-9);
        let geo = to_geographic(DVec3::new(1e-300, -1.0, 0.0));
        assert!((geo.lat + 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_to_geographic_origin() {
        assert_eq!(to_geographic(DVec3::ZERO), LatLng::new(0.0, 0.0));
    }

    #[test]
    fn test_hemisphere_decomposition() {
        let coord = LatLng::new(-12.5, 33.25);
        assert_eq!(coord.lat_hemisphere().hemisphere, Hemisphere::South);
        assert_eq!(coord.lng_hemisphere().hemisphere, Hemisphere::East);
        assert!((coord.lat_hemisphere().magnitude - 12.5).abs() < f64::EPSILON);
        assert!((coord.lat_hemisphere().signed() + 12.5).abs() < f64::EPSILON);

        assert_eq!(HemisphereCoord::latitude(0.0).hemisphere, Hemisphere::North);
        assert_eq!(HemisphereCoord::longitude(-0.5).hemisphere, Hemisphere::West);
        assert_eq!(coord.to_string(), "12.5000° S, 33.2500° E");
    }

    #[test]
    fn test_smootherstep_endpoints() {
        assert!(smootherstep(0.0).abs() < f64::EPSILON);
        assert!((smootherstep(1.0) - 1.0).abs() < f64::EPSILON);
        assert!((smootherstep(0.5) - 0.5).abs() < 1e-12);
        assert!((smootherstep(3.0) - 1.0).abs() < f64::EPSILON);
        assert!(smootherstep(-1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_slerp_stays_on_unit_sphere() {
        let a = DVec3::X;
        let b = DVec3::NEG_X;
        for i in 0..=10 {
            let t = f64::from(i) / 10.0;
            let p = slerp_dvec3(a, b, t);
            assert!((p.length() - 1.0).abs() < 1e-9);
        }
        assert_close(slerp_dvec3(DVec3::X, DVec3::Y, 1.0), DVec3::Y);
    }

    proptest! {
        #[test]
        fn test_round_trip(
            lat in -90.0f64..=90.0,
            lng in -180.0f64..=180.0,
            radius in 1e-3f64..1e4,
        ) {
            let geo = to_geographic(to_cartesian(lat, lng, radius));
            prop_assert!((geo.lat - lat).abs() < 1e-6);
            // Longitude is meaningless at the exact poles.
            if lat.abs() < 90.0 - 1e-6 {
                prop_assert!(lng_delta(geo.lng, lng) < 1e-6);
            }
        }

        #[test]
        fn test_cartesian_length_is_radius(
            lat in -90.0f64..=90.0,
            lng in -180.0f64..=180.0,
            radius in 1e-3f64..1e4,
        ) {
            let p = to_cartesian(lat, lng, radius);
            prop_assert!((p.length() - radius).abs() < 1e-9 * radius.max(1.0));
        }
    }
}
