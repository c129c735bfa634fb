//! Frequency-Selective Mesh Resampling (FSMR)
//!
//! Reconstructs values at arbitrary target positions from irregularly
//! positioned source samples by greedily fitting a sparse 2D DCT frequency
//! model to the source mesh and evaluating it at the target mesh.
//!
//! Reference:
//! Heimann, Regensky, Seiler, Kaup (2023). Frequency-Selective Mesh-to-Grid
//! Resampling for Viewport-Adaptive Spherical Video Streaming.

mod basis;
mod fit;

pub use fit::{FitResult, SpectralModel};

use serde::{Deserialize, Serialize};
use spheresample_core::{Error, Result};

/// Parameters for FSMR.
///
/// Grouped into one immutable configuration so validation happens in a
/// single pass at the call boundary.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FsmrParams {
    /// Transform length `T`: the frequency model covers a `T x T` index grid.
    pub transform_length: usize,
    /// Orthogonality deficiency compensation factor in (0, 1]. Corrects for
    /// the basis functions not being exactly orthogonal under irregular
    /// sampling; each iteration commits this fraction of the optimal
    /// projection.
    pub odc: f64,
    /// Frequency weighting decay base in (0, 1]: basis `(k, l)` is biased
    /// by `sigma^sqrt(k^2 + l^2)` during selection.
    pub sigma: f64,
    /// Offset added to both meshes before basis evaluation, centering the
    /// local coordinates inside the transform support.
    pub shift: f64,
    /// Maximum number of greedy iterations.
    pub max_iterations: usize,
}

impl Default for FsmrParams {
    fn default() -> Self {
        Self {
            transform_length: 32,
            odc: 0.5,
            sigma: 0.93,
            shift: 16.0,
            max_iterations: 1000,
        }
    }
}

impl FsmrParams {
    /// Validate all parameters, naming the first offending one.
    pub fn validate(&self) -> Result<()> {
        if self.transform_length == 0 {
            return Err(Error::InvalidParameter {
                name: "transform_length",
                value: self.transform_length.to_string(),
                reason: "must be positive".into(),
            });
        }
        if !(self.odc > 0.0 && self.odc <= 1.0) {
            return Err(Error::InvalidParameter {
                name: "odc",
                value: self.odc.to_string(),
                reason: "must be in (0, 1]".into(),
            });
        }
        if !(self.sigma > 0.0 && self.sigma <= 1.0) {
            return Err(Error::InvalidParameter {
                name: "sigma",
                value: self.sigma.to_string(),
                reason: "must be in (0, 1]".into(),
            });
        }
        if !self.shift.is_finite() {
            return Err(Error::InvalidParameter {
                name: "shift",
                value: self.shift.to_string(),
                reason: "must be finite".into(),
            });
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iterations",
                value: self.max_iterations.to_string(),
                reason: "must be positive".into(),
            });
        }
        Ok(())
    }
}

/// Mesh-to-mesh resampling capability.
///
/// Any implementation matching this contract can drive viewport-adaptive
/// resampling: given `N` source positions with values and `L` target
/// positions (all `[x, y]` pairs in one local frame, `N` and `L`
/// independent), produce the `L` target values.
pub trait MeshResampler: Send + Sync {
    fn resample(
        &self,
        source_positions: &[[f64; 2]],
        source_values: &[f64],
        target_positions: &[[f64; 2]],
    ) -> Result<Vec<f64>>;
}

/// FSMR as a [`MeshResampler`], holding a validated parameter set.
#[derive(Debug, Clone)]
pub struct Fsmr {
    params: FsmrParams,
}

impl Fsmr {
    /// Create an FSMR resampler, validating the parameters once.
    pub fn new(params: FsmrParams) -> Result<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    pub fn params(&self) -> &FsmrParams {
        &self.params
    }
}

impl MeshResampler for Fsmr {
    fn resample(
        &self,
        source_positions: &[[f64; 2]],
        source_values: &[f64],
        target_positions: &[[f64; 2]],
    ) -> Result<Vec<f64>> {
        resample_fsmr(source_positions, source_values, target_positions, &self.params)
    }
}

/// Nearest-sample mesh-to-mesh resampler.
///
/// Assigns each target position the value of the closest source sample —
/// a fast Voronoi-style baseline useful as a drop-in substitute for FSMR.
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestMesh;

impl MeshResampler for NearestMesh {
    fn resample(
        &self,
        source_positions: &[[f64; 2]],
        source_values: &[f64],
        target_positions: &[[f64; 2]],
    ) -> Result<Vec<f64>> {
        if source_positions.is_empty() {
            return Err(Error::Algorithm("No source samples provided".into()));
        }
        if source_positions.len() != source_values.len() {
            return Err(Error::SizeMismatch {
                er: source_positions.len(),
                ec: 1,
                ar: source_values.len(),
                ac: 1,
            });
        }

        Ok(target_positions
            .iter()
            .map(|t| {
                let mut min_dist_sq = f64::MAX;
                let mut nearest_val = f64::NAN;
                for (p, &v) in source_positions.iter().zip(source_values) {
                    let dx = p[0] - t[0];
                    let dy = p[1] - t[1];
                    let dsq = dx * dx + dy * dy;
                    if dsq < min_dist_sq {
                        min_dist_sq = dsq;
                        nearest_val = v;
                    }
                }
                nearest_val
            })
            .collect())
    }
}

/// Resample from a source mesh to a target mesh using FSMR.
///
/// Positions are continuous `[x, y]` pairs in one shared local frame. The
/// model is fitted to the source mesh with uniform per-sample weighting and
/// evaluated at the target positions by direct summation.
///
/// Near-duplicate source positions are accepted but degrade conditioning
/// of the greedy fit; callers should avoid meshes with many coincident
/// samples.
///
/// # Errors
/// - `InvalidParameter` if any parameter is out of range
/// - `SizeMismatch` if positions and values disagree in length
/// - `Algorithm` if the source mesh is empty
pub fn resample_fsmr(
    source_positions: &[[f64; 2]],
    source_values: &[f64],
    target_positions: &[[f64; 2]],
    params: &FsmrParams,
) -> Result<Vec<f64>> {
    let weighting = vec![1.0; source_positions.len()];
    resample_fsmr_weighted(
        source_positions,
        source_values,
        target_positions,
        &weighting,
        params,
    )
}

/// [`resample_fsmr`] with an explicit per-sample spatial weighting.
///
/// Weights must be positive and at most 1; they bias which basis function
/// wins each greedy iteration but never discard a sample.
pub fn resample_fsmr_weighted(
    source_positions: &[[f64; 2]],
    source_values: &[f64],
    target_positions: &[[f64; 2]],
    spatial_weighting: &[f64],
    params: &FsmrParams,
) -> Result<Vec<f64>> {
    params.validate()?;
    if source_positions.len() != source_values.len() {
        return Err(Error::SizeMismatch {
            er: source_positions.len(),
            ec: 1,
            ar: source_values.len(),
            ac: 1,
        });
    }
    if spatial_weighting.len() != source_positions.len() {
        return Err(Error::SizeMismatch {
            er: source_positions.len(),
            ec: 1,
            ar: spatial_weighting.len(),
            ac: 1,
        });
    }
    if source_positions.is_empty() {
        return Err(Error::Algorithm("No source samples provided".into()));
    }
    if spatial_weighting.iter().any(|&w| !(w > 0.0 && w <= 1.0)) {
        return Err(Error::InvalidParameter {
            name: "spatial_weighting",
            value: "<per-sample>".into(),
            reason: "weights must be in (0, 1]".into(),
        });
    }

    let result = fit_model(
        source_positions,
        source_values,
        spatial_weighting,
        params,
    );

    let shifted_targets: Vec<[f64; 2]> = target_positions
        .iter()
        .map(|p| [p[0] + params.shift, p[1] + params.shift])
        .collect();
    Ok(result.model.evaluate(&shifted_targets))
}

/// Fit the frequency model to a source mesh without evaluating it.
///
/// Exposed for callers that want to inspect the model or evaluate it at
/// several target meshes. Positions passed to [`SpectralModel::evaluate`]
/// must carry the same `shift` offset applied here.
pub fn fit_model(
    source_positions: &[[f64; 2]],
    source_values: &[f64],
    spatial_weighting: &[f64],
    params: &FsmrParams,
) -> FitResult {
    let shifted_sources: Vec<[f64; 2]> = source_positions
        .iter()
        .map(|p| [p[0] + params.shift, p[1] + params.shift])
        .collect();

    let dict = basis::dct_basis_dict(&shifted_sources, params.transform_length);
    let freq_weighting = basis::dct_frequency_weighting(params.transform_length, params.sigma);

    fit::fit(
        source_values,
        &dict,
        spatial_weighting,
        &freq_weighting,
        params.transform_length,
        params.odc,
        params.max_iterations,
    )
}
