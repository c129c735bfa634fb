//! Viewport selection: per-block tangent-plane frames
//!
//! For each target block, the distortion-minimizing local frame is the
//! gnomonic viewport centered on the block: the rotation that carries the
//! block-center direction onto the perspective optical axis (-X). Within
//! the block's small angular extent this minimizes projection distortion.

use spheresample_core::{Dir3, Rotation3};
use std::f64::consts::PI;

/// A per-block viewport frame.
///
/// Pure function of the block-center direction; transient, rebuilt for
/// every block.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    rotation: Rotation3,
}

impl Viewport {
    /// Build the viewport for a block centered on `dir`.
    ///
    /// First rotates about Z so the center's azimuth becomes `pi`, then
    /// about Y to zero its elevation, leaving the center on the -X axis.
    pub fn for_direction(dir: &Dir3) -> Self {
        let gamma = PI - dir.y.atan2(dir.x);
        let rot_z = Rotation3::about_z(gamma);
        let v = rot_z.apply(dir);

        let beta = -v.z.atan2(v.x.abs());
        let rot_y = Rotation3::about_y(beta);

        Self {
            rotation: rot_z.then(&rot_y),
        }
    }

    /// Rotate a direction into the viewport frame.
    #[inline]
    pub fn rotate(&self, dir: &Dir3) -> Dir3 {
        self.rotation.apply(dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_on_axis(dir: Dir3) {
        let viewport = Viewport::for_direction(&dir);
        let rotated = viewport.rotate(&dir);
        assert!(
            (rotated.x + 1.0).abs() < 1e-12 && rotated.y.abs() < 1e-12 && rotated.z.abs() < 1e-12,
            "center {:?} should rotate onto -X, got {:?}",
            dir,
            rotated
        );
    }

    #[test]
    fn test_center_rotates_onto_optical_axis() {
        for dir in [
            Dir3::new(1.0, 0.0, 0.0),
            Dir3::new(-1.0, 0.0, 0.0),
            Dir3::new(0.0, 1.0, 0.0),
            Dir3::new(0.6, -0.48, 0.64).normalized(),
            Dir3::new(-0.2, 0.3, -0.933).normalized(),
        ] {
            assert_on_axis(dir);
        }
    }

    #[test]
    fn test_rotation_preserves_angles() {
        let center = Dir3::new(0.3, -0.5, 0.81).normalized();
        let other = Dir3::new(0.31, -0.48, 0.82).normalized();
        let viewport = Viewport::for_direction(&center);

        let angle_before = center.dot(&other).clamp(-1.0, 1.0).acos();
        let rc = viewport.rotate(&center);
        let ro = viewport.rotate(&other);
        let angle_after = rc.dot(&ro).clamp(-1.0, 1.0).acos();
        assert!(
            (angle_before - angle_after).abs() < 1e-12,
            "rigid rotation must preserve angular distances"
        );
    }
}
