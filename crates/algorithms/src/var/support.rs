//! Support-window sampling
//!
//! Gathers the source samples backing one block's model fit: every source
//! pixel whose direction falls inside the block's incident-angle window on
//! the viewport, converted to viewport-plane coordinates. The window is a
//! margin-dilated version of the block footprint; if it holds too few
//! samples it is progressively enlarged up to just short of the viewport
//! hemisphere boundary.

use spheresample_core::{Dir3, Image, Perspective, Projection};

use crate::var::viewport::Viewport;
use std::f64::consts::FRAC_PI_2;

/// Incident angles at or beyond the hemisphere edge map to infinity on the
/// viewport plane; the window never reaches it.
const MAX_INCIDENT_ANGLE: f64 = 0.999 * FRAC_PI_2;

/// Enlargement step applied to the angle window per retry.
const MARGIN_GROWTH: f64 = 1.5;

/// Floor for the block's angular radius. A single-pixel block whose pixel
/// sits exactly at the viewport center has radius zero, which no margin
/// factor could enlarge.
const MIN_BLOCK_ANGLE: f64 = 1e-6;

/// Source samples selected for one block, in viewport-plane coordinates.
#[derive(Debug, Clone)]
pub(crate) struct SupportWindow {
    /// Sample positions as `[x, y]` on the viewport plane
    pub positions: Vec<[f64; 2]>,
    /// Sample values read from the source image
    pub values: Vec<f64>,
    /// Whether even the maximal margin yielded fewer than the requested
    /// minimum sample count
    pub insufficient: bool,
}

/// Gather the support window for a block.
///
/// `src_dirs` holds the precomputed source-pixel directions in row-major
/// order (`None` for unmappable pixels), `max_block_angle` the block's own
/// angular radius in the viewport frame. The initial window is
/// `incident_angle_factor * max_block_angle`, grown by [`MARGIN_GROWTH`]
/// per retry while the sample count stays below `min_samples` and the
/// window below [`MAX_INCIDENT_ANGLE`].
pub(crate) fn gather_support(
    src_dirs: &[Option<Dir3>],
    cols: usize,
    image: &Image<f64>,
    viewport: &Viewport,
    plane: &Perspective,
    max_block_angle: f64,
    incident_angle_factor: f64,
    min_samples: usize,
) -> SupportWindow {
    // Incident angle of every mappable source pixel in this viewport
    let incident: Vec<f64> = src_dirs
        .iter()
        .map(|dir| match dir {
            Some(d) => Perspective::incident_angle(&viewport.rotate(d)),
            None => f64::INFINITY,
        })
        .collect();

    let block_angle = max_block_angle.max(MIN_BLOCK_ANGLE);
    let mut factor = incident_angle_factor;
    let (theta_max, insufficient) = loop {
        let theta_max = (factor * block_angle).min(MAX_INCIDENT_ANGLE);
        let count = incident.iter().filter(|&&a| a < theta_max).count();
        if count >= min_samples {
            break (theta_max, false);
        }
        if theta_max >= MAX_INCIDENT_ANGLE {
            break (theta_max, true);
        }
        factor *= MARGIN_GROWTH;
    };

    let mut positions = Vec::new();
    let mut values = Vec::new();
    for (idx, angle) in incident.iter().enumerate() {
        if *angle >= theta_max {
            continue;
        }
        // A finite angle implies the direction exists
        let Some(dir) = &src_dirs[idx] else {
            continue;
        };
        let rotated = viewport.rotate(dir);
        let Some((py, px)) = plane.from_sphere(&rotated) else {
            continue;
        };
        let row = idx / cols;
        let col = idx % cols;
        let Some(value) = image.sample_bilinear(row as f64, col as f64) else {
            continue;
        };
        if !value.is_finite() {
            // Invalid source pixels never enter the mesh
            continue;
        }
        positions.push([px, py]);
        values.push(value);
    }

    SupportWindow {
        positions,
        values,
        insufficient,
    }
}
