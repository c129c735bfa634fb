//! Viewport-Adaptive Resampling (VAR)
//!
//! Converts an image from one spherical projection format to another,
//! block by block: each target block gets its own distortion-minimizing
//! tangent-plane viewport, the source samples in a dilated neighborhood
//! are projected into that frame, and a pluggable mesh-to-mesh resampler
//! reconstructs the block's pixel values.
//!
//! Blocks are independent, so the block loop runs data-parallel when the
//! `parallel` feature is enabled; results are identical either way.

mod support;
mod viewport;

pub use viewport::Viewport;

use std::sync::atomic::{AtomicUsize, Ordering};

use serde::{Deserialize, Serialize};
use spheresample_core::{Dir3, Error, Image, Perspective, Projection, Result};

use crate::fsmr::MeshResampler;
use crate::maybe_rayon::*;
use crate::var::support::gather_support;

/// Parameters for viewport-adaptive resampling.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VarParams {
    /// Edge length of the square target blocks in pixels. Edge blocks are
    /// truncated at the grid boundary.
    pub block_size: usize,
    /// Initial dilation of a block's support window: the incident-angle
    /// window is this factor times the block's own angular radius.
    pub incident_angle_factor: f64,
    /// Minimum source sample count per block. Windows holding fewer
    /// samples are enlarged; blocks that stay short even at the maximal
    /// window are counted as insufficient (non-fatal).
    pub min_support_samples: usize,
}

impl Default for VarParams {
    fn default() -> Self {
        Self {
            block_size: 8,
            incident_angle_factor: 2.0,
            min_support_samples: 16,
        }
    }
}

impl VarParams {
    /// Validate all parameters, naming the first offending one.
    pub fn validate(&self) -> Result<()> {
        if self.block_size == 0 {
            return Err(Error::InvalidParameter {
                name: "block_size",
                value: self.block_size.to_string(),
                reason: "must be positive".into(),
            });
        }
        if !(self.incident_angle_factor >= 1.0 && self.incident_angle_factor.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "incident_angle_factor",
                value: self.incident_angle_factor.to_string(),
                reason: "must be finite and at least 1".into(),
            });
        }
        if self.min_support_samples == 0 {
            return Err(Error::InvalidParameter {
                name: "min_support_samples",
                value: self.min_support_samples.to_string(),
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }
}

/// Warning counters accumulated over one resample run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResampleReport {
    /// Number of blocks processed
    pub blocks: usize,
    /// Blocks whose support window stayed below the minimum sample count
    /// even at the maximal margin
    pub insufficient_samples: usize,
    /// Target pixels with no valid projection mapping (NaN in the output)
    pub unmapped_pixels: usize,
}

/// Result of one resample run: the target image plus warning counters.
#[derive(Debug, Clone)]
pub struct ResampleOutput {
    pub image: Image<f64>,
    pub report: ResampleReport,
}

/// One target block: its grid region and precomputed center direction.
#[derive(Debug, Clone, Copy)]
struct Block {
    row0: usize,
    col0: usize,
    rows: usize,
    cols: usize,
    center: Option<Dir3>,
}

/// Per-block result before assembly into the output grid.
struct BlockResult {
    /// Values in row-major block order, NaN for unmapped pixels
    values: Vec<f64>,
    insufficient: bool,
    unmapped: usize,
}

/// Viewport-adaptive resampler for a fixed source/target configuration.
///
/// Precomputes the source and target direction grids once; `resample` can
/// then be called for any number of images sharing that configuration.
pub struct ViewportAdaptiveResampler {
    src_size: (usize, usize),
    tar_size: (usize, usize),
    src_dirs: Vec<Option<Dir3>>,
    tar_dirs: Vec<Option<Dir3>>,
    blocks: Vec<Block>,
    plane: Perspective,
    params: VarParams,
}

impl ViewportAdaptiveResampler {
    /// Create a resampler for the given projection pair.
    ///
    /// Validates parameters once and precomputes per-pixel sphere
    /// directions for both layouts and the per-block center directions.
    pub fn new(
        src_size: (usize, usize),
        src_projection: &dyn Projection,
        tar_size: (usize, usize),
        tar_projection: &dyn Projection,
        params: VarParams,
    ) -> Result<Self> {
        params.validate()?;
        for (rows, cols) in [src_size, tar_size] {
            if rows == 0 || cols == 0 {
                return Err(Error::InvalidDimensions {
                    width: cols,
                    height: rows,
                });
            }
        }

        let direction_grid = |size: (usize, usize), projection: &dyn Projection| {
            (0..size.0 * size.1)
                .map(|idx| projection.to_sphere((idx / size.1) as f64, (idx % size.1) as f64))
                .collect::<Vec<_>>()
        };
        let src_dirs = direction_grid(src_size, src_projection);
        let tar_dirs = direction_grid(tar_size, tar_projection);

        let b = params.block_size;
        let mut blocks = Vec::new();
        for row0 in (0..tar_size.0).step_by(b) {
            for col0 in (0..tar_size.1).step_by(b) {
                let rows = b.min(tar_size.0 - row0);
                let cols = b.min(tar_size.1 - col0);
                let center_y = row0 as f64 + rows as f64 / 2.0 - 0.5;
                let center_x = col0 as f64 + cols as f64 / 2.0 - 0.5;
                blocks.push(Block {
                    row0,
                    col0,
                    rows,
                    cols,
                    center: tar_projection.to_sphere(center_y, center_x),
                });
            }
        }

        Ok(Self {
            src_size,
            tar_size,
            src_dirs,
            tar_dirs,
            blocks,
            plane: Perspective::new(src_projection.focal_length(), (0.0, 0.0)),
            params,
        })
    }

    /// Target image size as (rows, cols)
    pub fn target_size(&self) -> (usize, usize) {
        self.tar_size
    }

    /// Resample an image with the configured projections.
    ///
    /// The resampler capability is pluggable: anything implementing
    /// [`MeshResampler`] works. Unmappable target pixels are NaN in the
    /// output and counted in the report.
    pub fn resample<R>(&self, image: &Image<f64>, resampler: &R) -> Result<ResampleOutput>
    where
        R: MeshResampler + ?Sized,
    {
        self.resample_inner(image, resampler, None)
    }

    /// [`Self::resample`] with a progress callback invoked as
    /// `on_block(done, total)` after each completed block (from worker
    /// threads when the `parallel` feature is enabled).
    pub fn resample_with_progress<R>(
        &self,
        image: &Image<f64>,
        resampler: &R,
        on_block: &(dyn Fn(usize, usize) + Sync),
    ) -> Result<ResampleOutput>
    where
        R: MeshResampler + ?Sized,
    {
        self.resample_inner(image, resampler, Some(on_block))
    }

    /// Resample each channel of a multi-channel image independently.
    pub fn resample_channels<R>(
        &self,
        channels: &[Image<f64>],
        resampler: &R,
    ) -> Result<Vec<ResampleOutput>>
    where
        R: MeshResampler + ?Sized,
    {
        channels
            .iter()
            .map(|channel| self.resample(channel, resampler))
            .collect()
    }

    fn resample_inner<R>(
        &self,
        image: &Image<f64>,
        resampler: &R,
        on_block: Option<&(dyn Fn(usize, usize) + Sync)>,
    ) -> Result<ResampleOutput>
    where
        R: MeshResampler + ?Sized,
    {
        if image.shape() != self.src_size {
            return Err(Error::SizeMismatch {
                er: self.src_size.0,
                ec: self.src_size.1,
                ar: image.shape().0,
                ac: image.shape().1,
            });
        }

        let total = self.blocks.len();
        let done = AtomicUsize::new(0);

        let results: Vec<BlockResult> = (0..total)
            .into_par_iter()
            .map(|b| {
                let result = self.process_block(&self.blocks[b], image, resampler);
                if let Some(progress) = on_block {
                    progress(done.fetch_add(1, Ordering::Relaxed) + 1, total);
                }
                result
            })
            .collect::<Result<Vec<_>>>()?;

        // Assemble: blocks partition the grid, so writes are disjoint.
        // Should a misconfigured partition ever overlap, the last write wins.
        let mut out = Image::filled(self.tar_size.0, self.tar_size.1, f64::NAN);
        let mut report = ResampleReport {
            blocks: total,
            ..Default::default()
        };
        for (block, result) in self.blocks.iter().zip(&results) {
            for r in 0..block.rows {
                for c in 0..block.cols {
                    out.set(block.row0 + r, block.col0 + c, result.values[r * block.cols + c])?;
                }
            }
            if result.insufficient {
                report.insufficient_samples += 1;
            }
            report.unmapped_pixels += result.unmapped;
        }

        Ok(ResampleOutput { image: out, report })
    }

    fn process_block<R>(
        &self,
        block: &Block,
        image: &Image<f64>,
        resampler: &R,
    ) -> Result<BlockResult>
    where
        R: MeshResampler + ?Sized,
    {
        let pixel_count = block.rows * block.cols;

        let Some(center) = block.center else {
            // Block center outside the target projection's domain
            return Ok(BlockResult {
                values: vec![f64::NAN; pixel_count],
                insufficient: false,
                unmapped: pixel_count,
            });
        };
        let viewport = Viewport::for_direction(&center);

        // Target mesh: rotate the block's pixel directions into the
        // viewport and project onto its plane
        let mut target_positions = Vec::with_capacity(pixel_count);
        let mut target_slots = Vec::with_capacity(pixel_count);
        let mut max_block_angle: f64 = 0.0;
        for r in 0..block.rows {
            for c in 0..block.cols {
                let idx = (block.row0 + r) * self.tar_size.1 + (block.col0 + c);
                let Some(dir) = self.tar_dirs[idx] else {
                    continue;
                };
                let rotated = viewport.rotate(&dir);
                let angle = Perspective::incident_angle(&rotated);
                let Some((py, px)) = self.plane.from_sphere(&rotated) else {
                    continue;
                };
                max_block_angle = max_block_angle.max(angle);
                target_positions.push([px, py]);
                target_slots.push(r * block.cols + c);
            }
        }

        let unmapped = pixel_count - target_slots.len();
        if target_slots.is_empty() {
            return Ok(BlockResult {
                values: vec![f64::NAN; pixel_count],
                insufficient: false,
                unmapped,
            });
        }

        let window = gather_support(
            &self.src_dirs,
            self.src_size.1,
            image,
            &viewport,
            &self.plane,
            max_block_angle,
            self.params.incident_angle_factor,
            self.params.min_support_samples,
        );

        let mut values = vec![f64::NAN; pixel_count];
        if window.positions.is_empty() {
            // Nothing to fit: best effort is an empty block
            return Ok(BlockResult {
                values,
                insufficient: true,
                unmapped,
            });
        }

        let target_values =
            resampler.resample(&window.positions, &window.values, &target_positions)?;
        for (slot, value) in target_slots.iter().zip(&target_values) {
            values[*slot] = *value;
        }

        Ok(BlockResult {
            values,
            insufficient: window.insufficient,
            unmapped,
        })
    }
}

/// Resample an image between projection formats in one call.
///
/// Convenience wrapper constructing a [`ViewportAdaptiveResampler`] for the
/// image's size and running it once.
pub fn resample<R>(
    image: &Image<f64>,
    src_projection: &dyn Projection,
    tar_size: (usize, usize),
    tar_projection: &dyn Projection,
    resampler: &R,
    params: VarParams,
) -> Result<ResampleOutput>
where
    R: MeshResampler + ?Sized,
{
    let var = ViewportAdaptiveResampler::new(
        image.shape(),
        src_projection,
        tar_size,
        tar_projection,
        params,
    )?;
    var.resample(image, resampler)
}

/// Cubemap size with a sample count close to a given equirectangular size.
///
/// The face resolution is rounded to the nearest multiple of `block_size`
/// (rounding up on ties), giving a `(2 * face, 3 * face)` layout.
pub fn cmp_size(erp_size: (usize, usize), block_size: usize) -> (usize, usize) {
    let v = ((erp_size.0 * erp_size.1) as f64 / 6.0).sqrt().floor() as usize;
    let residual = v % block_size;
    let face = if residual < block_size.div_ceil(2) {
        v + (block_size - residual)
    } else {
        v - residual
    };
    (face * 2, face * 3)
}
