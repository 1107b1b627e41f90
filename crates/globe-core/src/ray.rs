//! Rays and the intersection tests used for picking.

use glam::DVec3;

/// A half-line with a normalized direction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    /// Unit-length direction.
    pub direction: DVec3,
}

impl Ray {
    /// Create a ray, normalizing the direction.
    ///
    /// Returns `None` if the direction has no usable length.
    pub fn new(origin: DVec3, direction: DVec3) -> Option<Self> {
        let direction = direction.try_normalize()?;
        Some(Self { origin, direction })
    }

    /// Point at parameter `t` along the ray.
    pub fn at(&self, t: f64) -> DVec3 {
        self.origin + self.direction * t
    }

    /// Distance to the nearest intersection with a sphere, if any.
    ///
    /// Only hits in front of the origin count. A ray starting inside the
    /// sphere reports the exit point.
    pub fn intersect_sphere(&self, center: DVec3, radius: f64) -> Option<f64> {
        let oc = self.origin - center;
        let b = oc.dot(self.direction);
        let c = oc.length_squared() - radius * radius;
        let h = b * b - c;
        if h < 0.0 {
            return None;
        }
        let h = h.sqrt();
        let near = -b - h;
        if near >= 0.0 {
            return Some(near);
        }
        let far = -b + h;
        (far >= 0.0).then_some(far)
    }

    /// Distance to the nearest intersection with a capsule (a segment `a..b`
    /// swept by `radius`), if any.
    pub fn intersect_capsule(&self, a: DVec3, b: DVec3, radius: f64) -> Option<f64> {
        let ba = b - a;
        let oa = self.origin - a;
        let baba = ba.length_squared();
        if baba == 0.0 {
            return self.intersect_sphere(a, radius);
        }

        let bard = ba.dot(self.direction);
        let baoa = ba.dot(oa);
        let rdoa = self.direction.dot(oa);
        let oaoa = oa.length_squared();

        // Infinite cylinder around the segment axis.
        let qa = baba - bard * bard;
        let qb = baba * rdoa - baoa * bard;
        let qc = baba * oaoa - baoa * baoa - radius * radius * baba;
        let h = qb * qb - qa * qc;
        if h < 0.0 {
            return None;
        }

        if qa > 1e-12 {
            let t = (-qb - h.sqrt()) / qa;
            let y = baoa + t * bard;
            if y > 0.0 && y < baba && t >= 0.0 {
                return Some(t);
            }
        }

        // Hemispherical caps.
        let cap_a = self.intersect_sphere(a, radius);
        let cap_b = self.intersect_sphere(b, radius);
        match (cap_a, cap_b) {
            (Some(ta), Some(tb)) => Some(ta.min(tb)),
            (hit, None) | (None, hit) => hit,
        }
    }
}
