//! Sphere and plane coordinate conversions.
//!
//! Conventions: `theta` is the polar angle measured from the +Z axis
//! (`0..=pi`), `phi` is the azimuth measured from +X toward +Y
//! (`atan2` range). Directions on the unit sphere are stored as
//! cartesian [`Dir3`] vectors.

use serde::{Deserialize, Serialize};

/// A direction in 3D cartesian coordinates, normally of unit length.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dir3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Dir3 {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Euclidean norm
    #[inline]
    pub fn norm(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// Dot product
    #[inline]
    pub fn dot(&self, other: &Dir3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Normalized copy (returns self unchanged if the norm is zero)
    #[inline]
    pub fn normalized(&self) -> Dir3 {
        let n = self.norm();
        if n > 0.0 {
            Dir3::new(self.x / n, self.y / n, self.z / n)
        } else {
            *self
        }
    }

    /// Whether all components are finite
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Convert cartesian coordinates (y, x) to polar coordinates (r, phi).
#[inline]
pub fn cartesian_to_polar(y: f64, x: f64) -> (f64, f64) {
    let r = (y * y + x * x).sqrt();
    let phi = y.atan2(x);
    (r, phi)
}

/// Convert polar coordinates (r, phi) to cartesian coordinates (y, x).
#[inline]
pub fn polar_to_cartesian(r: f64, phi: f64) -> (f64, f64) {
    (r * phi.sin(), r * phi.cos())
}

/// Convert cartesian coordinates (x, y, z) to spherical coordinates (r, theta, phi).
#[inline]
pub fn cartesian_to_spherical(x: f64, y: f64, z: f64) -> (f64, f64, f64) {
    let r = (x * x + y * y + z * z).sqrt();
    let theta = (z / r).clamp(-1.0, 1.0).acos();
    let phi = y.atan2(x);
    (r, theta, phi)
}

/// Convert spherical coordinates (r, theta, phi) to cartesian coordinates (x, y, z).
#[inline]
pub fn spherical_to_cartesian(r: f64, theta: f64, phi: f64) -> (f64, f64, f64) {
    let x = r * theta.sin() * phi.cos();
    let y = r * theta.sin() * phi.sin();
    let z = r * theta.cos();
    (x, y, z)
}

/// A 3x3 rotation matrix in row-major order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation3 {
    m: [[f64; 3]; 3],
}

impl Rotation3 {
    pub const IDENTITY: Rotation3 = Rotation3 {
        m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
    };

    pub const fn from_rows(m: [[f64; 3]; 3]) -> Self {
        Self { m }
    }

    /// Rotation about the Z axis by `angle` radians.
    pub fn about_z(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]])
    }

    /// Rotation about the Y axis by `angle` radians.
    pub fn about_y(angle: f64) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_rows([[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]])
    }

    /// Apply the rotation to a direction.
    #[inline]
    pub fn apply(&self, d: &Dir3) -> Dir3 {
        Dir3::new(
            self.m[0][0] * d.x + self.m[0][1] * d.y + self.m[0][2] * d.z,
            self.m[1][0] * d.x + self.m[1][1] * d.y + self.m[1][2] * d.z,
            self.m[2][0] * d.x + self.m[2][1] * d.y + self.m[2][2] * d.z,
        )
    }

    /// Compose rotations: `self.then(&r)` applies `self` first, then `r`.
    pub fn then(&self, r: &Rotation3) -> Rotation3 {
        let mut out = [[0.0; 3]; 3];
        for (i, row) in out.iter_mut().enumerate() {
            for (j, v) in row.iter_mut().enumerate() {
                *v = (0..3).map(|k| r.m[i][k] * self.m[k][j]).sum();
            }
        }
        Rotation3::from_rows(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::{FRAC_PI_2, PI};

    const EPS: f64 = 1e-12;

    #[test]
    fn test_spherical_roundtrip() {
        for &(x, y, z) in &[(1.0, 0.0, 0.0), (0.3, -0.4, 0.86), (-0.5, 0.5, -0.7)] {
            let (r, theta, phi) = cartesian_to_spherical(x, y, z);
            let (x2, y2, z2) = spherical_to_cartesian(r, theta, phi);
            assert!((x - x2).abs() < EPS, "x: {} vs {}", x, x2);
            assert!((y - y2).abs() < EPS, "y: {} vs {}", y, y2);
            assert!((z - z2).abs() < EPS, "z: {} vs {}", z, z2);
        }
    }

    #[test]
    fn test_polar_roundtrip() {
        let (r, phi) = cartesian_to_polar(3.0, 4.0);
        assert!((r - 5.0).abs() < EPS);
        let (y, x) = polar_to_cartesian(r, phi);
        assert!((y - 3.0).abs() < EPS && (x - 4.0).abs() < EPS);
    }

    #[test]
    fn test_rotation_about_z() {
        let rot = Rotation3::about_z(FRAC_PI_2);
        let d = rot.apply(&Dir3::new(1.0, 0.0, 0.0));
        assert!((d.x).abs() < EPS && (d.y - 1.0).abs() < EPS && d.z.abs() < EPS);
    }

    #[test]
    fn test_rotation_composition() {
        // Z then Y equals the matrix product applied in order
        let a = Rotation3::about_z(0.3);
        let b = Rotation3::about_y(-0.7);
        let d = Dir3::new(0.2, -0.9, 0.4).normalized();
        let step = b.apply(&a.apply(&d));
        let composed = a.then(&b).apply(&d);
        assert!((step.x - composed.x).abs() < EPS);
        assert!((step.y - composed.y).abs() < EPS);
        assert!((step.z - composed.z).abs() < EPS);
    }

    #[test]
    fn test_theta_poles() {
        let (_, theta, _) = cartesian_to_spherical(0.0, 0.0, 1.0);
        assert!(theta.abs() < EPS);
        let (_, theta, _) = cartesian_to_spherical(0.0, 0.0, -1.0);
        assert!((theta - PI).abs() < EPS);
    }
}
