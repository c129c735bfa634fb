//! Perspective (gnomonic) projection
//!
//! Radial model `r = f * tan(theta)` mapping a tangent plane to the sphere.
//! The optical axis points along -X; incident angles are measured against
//! it. Viewport-adaptive resampling uses this projection as the per-block
//! tangent-plane frame, with the optical center at the origin.

use crate::coords::{
    cartesian_to_polar, cartesian_to_spherical, polar_to_cartesian, spherical_to_cartesian, Dir3,
};
use crate::projection::Projection;

/// Perspective projection with a fixed focal length and optical center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Perspective {
    focal_length: f64,
    /// Optical center (y, x) in pixels
    optical_center: (f64, f64),
}

impl Perspective {
    pub fn new(focal_length: f64, optical_center: (f64, f64)) -> Self {
        Self {
            focal_length,
            optical_center,
        }
    }

    /// Sensor radius for a given incident angle
    #[inline]
    pub fn radius(&self, theta: f64) -> f64 {
        self.focal_length * theta.tan()
    }

    /// Incident angle for a given sensor radius
    #[inline]
    pub fn theta(&self, radius: f64) -> f64 {
        (radius / self.focal_length).atan()
    }

    /// Incident angle of a direction with respect to the optical axis (-X).
    #[inline]
    pub fn incident_angle(dir: &Dir3) -> f64 {
        (-dir.x).clamp(-1.0, 1.0).acos()
    }
}

impl Projection for Perspective {
    fn to_sphere(&self, y: f64, x: f64) -> Option<Dir3> {
        let (r, phi) = cartesian_to_polar(y - self.optical_center.0, x - self.optical_center.1);
        let theta = self.theta(r);
        let (xsr, ysr, zsr) = spherical_to_cartesian(1.0, theta, phi);
        // Axis permutation: optical axis -X, sensor y down, sensor x right
        Some(Dir3::new(-zsr, xsr, -ysr))
    }

    fn from_sphere(&self, dir: &Dir3) -> Option<(f64, f64)> {
        let (_, theta, phi) = cartesian_to_spherical(dir.y, -dir.z, -dir.x);
        let r = self.radius(theta);
        if !r.is_finite() || r < 0.0 {
            // Direction at or behind the image plane
            return None;
        }
        let (y, x) = polar_to_cartesian(r, phi);
        Some((y + self.optical_center.0, x + self.optical_center.1))
    }

    fn focal_length(&self) -> f64 {
        self.focal_length
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_optical_axis_maps_to_center() {
        let persp = Perspective::new(100.0, (3.0, -2.0));
        let (y, x) = persp.from_sphere(&Dir3::new(-1.0, 0.0, 0.0)).unwrap();
        assert!((y - 3.0).abs() < 1e-12 && (x + 2.0).abs() < 1e-12, "got ({y}, {x})");
    }

    #[test]
    fn test_roundtrip_grid() {
        let persp = Perspective::new(64.0, (0.0, 0.0));
        for &y in &[-20.0, -3.5, 0.0, 7.25, 31.0] {
            for &x in &[-31.0, -0.5, 0.0, 12.0, 20.0] {
                let dir = persp.to_sphere(y, x).unwrap();
                assert!((dir.norm() - 1.0).abs() < 1e-12);
                let (y2, x2) = persp.from_sphere(&dir).unwrap();
                assert!(
                    (y - y2).abs() < 1e-9 && (x - x2).abs() < 1e-9,
                    "roundtrip ({y}, {x}) -> ({y2}, {x2})"
                );
            }
        }
    }

    #[test]
    fn test_behind_plane_rejected() {
        let persp = Perspective::new(64.0, (0.0, 0.0));
        // +X is directly behind the optical axis
        assert!(persp.from_sphere(&Dir3::new(1.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_incident_angle() {
        let on_axis = Dir3::new(-1.0, 0.0, 0.0);
        assert!(Perspective::incident_angle(&on_axis).abs() < 1e-12);
        let orthogonal = Dir3::new(0.0, 1.0, 0.0);
        assert!((Perspective::incident_angle(&orthogonal) - std::f64::consts::FRAC_PI_2).abs() < 1e-12);
    }
}
