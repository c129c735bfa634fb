//! Equirectangular projection (ERP)
//!
//! Maps the full sphere onto a `rows x cols` rectangle: the polar angle
//! spans image rows, the azimuth spans image columns (wrapping at the
//! antimeridian). The standard layout for 360 panoramas.

use std::f64::consts::PI;

use crate::coords::{cartesian_to_spherical, spherical_to_cartesian, Dir3};
use crate::projection::Projection;

/// Equirectangular projection over a fixed image size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Equirectangular {
    rows: usize,
    cols: usize,
}

impl Equirectangular {
    /// Create an ERP layout for an image of `rows x cols` pixels.
    ///
    /// Full coverage expects `cols == 2 * rows` but other aspect ratios are
    /// not rejected.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Image extent as (rows, cols)
    pub fn size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }
}

impl Projection for Equirectangular {
    fn to_sphere(&self, y: f64, x: f64) -> Option<Dir3> {
        let phi = -((x + 0.5) / self.cols as f64) * 2.0 * PI;
        let theta = ((y + 0.5) / self.rows as f64) * PI;
        let (xs, ys, zs) = spherical_to_cartesian(1.0, theta, phi);
        Some(Dir3::new(xs, ys, zs))
    }

    fn from_sphere(&self, dir: &Dir3) -> Option<(f64, f64)> {
        let (_, theta, mut phi) = cartesian_to_spherical(dir.x, dir.y, dir.z);
        if phi > 0.0 {
            phi -= 2.0 * PI;
        }
        let y = (theta / PI) * self.rows as f64 - 0.5;
        let x = -(phi / (2.0 * PI)) * self.cols as f64 - 0.5;
        Some((y, x))
    }

    fn focal_length(&self) -> f64 {
        1.0 / (PI / self.rows as f64).tan()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip_all_pixels() {
        let erp = Equirectangular::new(16, 32);
        for row in 0..16 {
            for col in 0..32 {
                let (y, x) = (row as f64, col as f64);
                let dir = erp.to_sphere(y, x).unwrap();
                assert!((dir.norm() - 1.0).abs() < 1e-12, "unit norm at ({row}, {col})");
                let (y2, x2) = erp.from_sphere(&dir).unwrap();
                assert!(
                    (y - y2).abs() < 1e-9 && (x - x2).abs() < 1e-9,
                    "roundtrip ({y}, {x}) -> ({y2}, {x2})"
                );
            }
        }
    }

    #[test]
    fn test_poles() {
        let erp = Equirectangular::new(100, 200);
        // First row is near the +Z pole, last row near -Z
        let top = erp.to_sphere(0.0, 0.0).unwrap();
        let bottom = erp.to_sphere(99.0, 0.0).unwrap();
        assert!(top.z > 0.99, "top row should be near north pole, z = {}", top.z);
        assert!(bottom.z < -0.99, "bottom row should be near south pole, z = {}", bottom.z);
    }

    #[test]
    fn test_focal_length_scales_with_rows() {
        let small = Equirectangular::new(64, 128);
        let large = Equirectangular::new(512, 1024);
        assert!(large.focal_length() > small.focal_length());
    }
}
