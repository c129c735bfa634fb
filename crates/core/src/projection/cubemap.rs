//! Cubemap projection (CMP)
//!
//! The sphere is projected onto the six faces of an enclosing cube,
//! unfolded into a 3x2 face grid: top/left/front in the left column pairs,
//! right/back/bottom filling the remainder. Face assignment on the sphere
//! side follows the dominant coordinate axis of the direction.

use crate::coords::Dir3;
use crate::projection::Projection;
use std::f64::consts::PI;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    #[inline]
    fn component(self, d: &Dir3) -> f64 {
        match self {
            Axis::X => d.x,
            Axis::Y => d.y,
            Axis::Z => d.z,
        }
    }
}

/// Linear map between a 2D layout interval and a 3D cube-face interval.
#[derive(Debug, Clone, Copy)]
struct CoordMap {
    lo_2d: f64,
    hi_2d: f64,
    lo_3d: f64,
    hi_3d: f64,
    axis: Axis,
}

impl CoordMap {
    const fn new(interval_2d: (f64, f64), interval_3d: (f64, f64), axis: Axis) -> Self {
        Self {
            lo_2d: interval_2d.0,
            hi_2d: interval_2d.1,
            lo_3d: interval_3d.0,
            hi_3d: interval_3d.1,
            axis,
        }
    }

    #[inline]
    fn lerp(val: f64, a1: f64, b1: f64, a2: f64, b2: f64) -> f64 {
        (val - a1) * ((b2 - a2) / (b1 - a1)) + a2
    }

    #[inline]
    fn val_3d_for_2d(&self, val: f64) -> f64 {
        Self::lerp(val, self.lo_2d, self.hi_2d, self.lo_3d, self.hi_3d)
    }

    #[inline]
    fn val_2d_for_3d(&self, val: f64) -> f64 {
        Self::lerp(val, self.lo_3d, self.hi_3d, self.lo_2d, self.hi_2d)
    }

    #[inline]
    fn contains_2d(&self, val: f64) -> bool {
        val >= self.lo_2d.min(self.hi_2d) && val <= self.lo_2d.max(self.hi_2d)
    }
}

/// One cube face: the 2D layout region it occupies and the cube plane it
/// maps onto.
#[derive(Debug, Clone, Copy)]
struct Face {
    x_map: CoordMap,
    y_map: CoordMap,
    plane_axis: Axis,
    plane_val: f64,
}

impl Face {
    /// Whether normalized layout coordinates fall in this face's region
    #[inline]
    fn contains_2d(&self, ny: f64, nx: f64) -> bool {
        self.y_map.contains_2d(ny) && self.x_map.contains_2d(nx)
    }

    /// Whether a direction projects onto this cube face (dominant axis with
    /// matching sign; directions exactly on a cube edge match no face).
    fn contains_dir(&self, d: &Dir3) -> bool {
        let p = self.plane_axis.component(d);
        if self.plane_val > 0.0 && p <= 0.0 {
            return false;
        }
        if self.plane_val < 0.0 && p >= 0.0 {
            return false;
        }
        let pa = p.abs();
        pa > self.x_map.axis.component(d).abs() && pa > self.y_map.axis.component(d).abs()
    }

    /// Layout coordinates (normalized to [0, 1]) for a direction on this face
    fn to_2d(&self, d: &Dir3) -> (f64, f64) {
        // Central projection onto the cube face plane
        let scale = self.plane_val / self.plane_axis.component(d);
        let on_face = Dir3::new(d.x * scale, d.y * scale, d.z * scale);
        let ny = self.y_map.val_2d_for_3d(self.y_map.axis.component(&on_face));
        let nx = self.x_map.val_2d_for_3d(self.x_map.axis.component(&on_face));
        (ny, nx)
    }

    /// Unit direction for normalized layout coordinates in this face's region
    fn to_sphere(&self, ny: f64, nx: f64) -> Dir3 {
        let mut c = [0.0_f64; 3];
        c[self.y_map.axis as usize] = self.y_map.val_3d_for_2d(ny);
        c[self.x_map.axis as usize] = self.x_map.val_3d_for_2d(nx);
        c[self.plane_axis as usize] = self.plane_val;
        Dir3::new(c[0], c[1], c[2]).normalized()
    }
}

const THIRD: f64 = 1.0 / 3.0;
const TWO_THIRDS: f64 = 2.0 / 3.0;

const FACES: [Face; 6] = [
    // top
    Face {
        x_map: CoordMap::new((0.0, THIRD), (-1.0, 1.0), Axis::X),
        y_map: CoordMap::new((0.5, 1.0), (-1.0, 1.0), Axis::Y),
        plane_axis: Axis::Z,
        plane_val: 1.0,
    },
    // left
    Face {
        x_map: CoordMap::new((0.0, THIRD), (1.0, -1.0), Axis::X),
        y_map: CoordMap::new((0.0, 0.5), (1.0, -1.0), Axis::Z),
        plane_axis: Axis::Y,
        plane_val: -1.0,
    },
    // front
    Face {
        x_map: CoordMap::new((THIRD, TWO_THIRDS), (-1.0, 1.0), Axis::Y),
        y_map: CoordMap::new((0.0, 0.5), (1.0, -1.0), Axis::Z),
        plane_axis: Axis::X,
        plane_val: -1.0,
    },
    // right
    Face {
        x_map: CoordMap::new((TWO_THIRDS, 1.0), (-1.0, 1.0), Axis::X),
        y_map: CoordMap::new((0.0, 0.5), (1.0, -1.0), Axis::Z),
        plane_axis: Axis::Y,
        plane_val: 1.0,
    },
    // back
    Face {
        x_map: CoordMap::new((THIRD, TWO_THIRDS), (1.0, -1.0), Axis::Z),
        y_map: CoordMap::new((0.5, 1.0), (-1.0, 1.0), Axis::Y),
        plane_axis: Axis::X,
        plane_val: 1.0,
    },
    // bottom
    Face {
        x_map: CoordMap::new((TWO_THIRDS, 1.0), (1.0, -1.0), Axis::X),
        y_map: CoordMap::new((0.5, 1.0), (-1.0, 1.0), Axis::Y),
        plane_axis: Axis::Z,
        plane_val: -1.0,
    },
];

/// Cubemap projection over a fixed image size.
///
/// Expects a 3x2 layout, i.e. `cols == 3 * (rows / 2)` with each face a
/// `rows/2` square.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cubemap {
    rows: usize,
    cols: usize,
}

impl Cubemap {
    pub fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Image extent as (rows, cols)
    pub fn size(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Edge length of one cube face in pixels
    pub fn face_size(&self) -> usize {
        self.rows / 2
    }
}

impl Projection for Cubemap {
    fn to_sphere(&self, y: f64, x: f64) -> Option<Dir3> {
        let ny = (y + 0.5) / self.rows as f64;
        let nx = (x + 0.5) / self.cols as f64;
        FACES
            .iter()
            .find(|face| face.contains_2d(ny, nx))
            .map(|face| face.to_sphere(ny, nx))
    }

    fn from_sphere(&self, dir: &Dir3) -> Option<(f64, f64)> {
        let face = FACES.iter().find(|face| face.contains_dir(dir))?;
        let (ny, nx) = face.to_2d(dir);
        Some((ny * self.rows as f64 - 0.5, nx * self.cols as f64 - 0.5))
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
        let cmp = Cubemap::new(12, 18);
        for row in 0..12 {
            for col in 0..18 {
                let (y, x) = (row as f64, col as f64);
                let dir = cmp.to_sphere(y, x).expect("pixel should map to the sphere");
                assert!((dir.norm() - 1.0).abs() < 1e-12, "unit norm at ({row}, {col})");
                let (y2, x2) = cmp.from_sphere(&dir).unwrap();
                assert!(
                    (y - y2).abs() < 1e-9 && (x - x2).abs() < 1e-9,
                    "roundtrip ({y}, {x}) -> ({y2}, {x2})"
                );
            }
        }
    }

    #[test]
    fn test_face_assignment_by_dominant_axis() {
        let cmp = Cubemap::new(64, 96);
        // +Z is the top face, which occupies the bottom-left layout region
        let (y, x) = cmp.from_sphere(&Dir3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(y >= 32.0 - 0.5 && x < 32.0, "top face region, got ({y}, {x})");
        // -X is the front face: top-middle region
        let (y, x) = cmp.from_sphere(&Dir3::new(-1.0, 0.0, 0.0)).unwrap();
        assert!(y < 32.0 && (32.0 - 0.5..64.0).contains(&x), "front face region, got ({y}, {x})");
    }

    #[test]
    fn test_cube_edge_direction_unmapped() {
        let cmp = Cubemap::new(64, 96);
        // Exactly on the edge between two faces: no strictly dominant axis
        let edge = Dir3::new(-1.0, 1.0, 0.0).normalized();
        assert!(cmp.from_sphere(&edge).is_none());
    }

    #[test]
    fn test_out_of_layout_pixel_unmapped() {
        let cmp = Cubemap::new(12, 18);
        assert!(cmp.to_sphere(-5.0, 0.0).is_none());
        assert!(cmp.to_sphere(0.0, 30.0).is_none());
    }
}
