//! Greedy frequency-selective model fitting
//!
//! Matching-pursuit style loop over the DCT dictionary: each iteration
//! projects the current residual onto every basis function, compensates for
//! orthogonality deficiency under irregular sampling, and commits a
//! fraction of the best projection to the model.

use std::collections::BTreeMap;

use ndarray::Array2;

use crate::fsmr::basis::basis_at;

/// Sparse frequency-domain model: coefficient per selected flat index.
#[derive(Debug, Clone)]
pub struct SpectralModel {
    transform_length: usize,
    coeffs: BTreeMap<usize, f64>,
}

impl SpectralModel {
    /// Number of distinct frequency indices in the model
    pub fn coefficient_count(&self) -> usize {
        self.coeffs.len()
    }

    /// Coefficient for a flat frequency index, zero if not selected
    pub fn coefficient(&self, index: usize) -> f64 {
        self.coeffs.get(&index).copied().unwrap_or(0.0)
    }

    /// Evaluate the model at arbitrary positions by direct summation.
    ///
    /// Positions are `[x, y]` pairs in the same frame the model was fitted
    /// in. This is a plain sum over the selected basis functions, not an
    /// inverse fast transform: target positions need not lie on any grid.
    pub fn evaluate(&self, positions: &[[f64; 2]]) -> Vec<f64> {
        let t = self.transform_length;
        positions
            .iter()
            .map(|p| {
                self.coeffs
                    .iter()
                    .map(|(&idx, &c)| c * basis_at(idx / t, idx % t, t, p[1], p[0]))
                    .sum()
            })
            .collect()
    }
}

/// Outcome of a model fit, with the diagnostics the caller may inspect.
#[derive(Debug, Clone)]
pub struct FitResult {
    pub model: SpectralModel,
    /// Iterations actually run (early stop may end before the budget)
    pub iterations: usize,
    /// Weighted residual energy after the last iteration
    pub residual_energy: f64,
}

/// Relative threshold below which the weighted residual counts as zero.
const RESIDUAL_EPS: f64 = 1e-12;

/// Fit a sparse frequency model to irregular samples.
///
/// `basis_dict` is the `[T^2, N]` dictionary evaluated at the source
/// positions, `spatial_weighting` the per-sample weights (all positive),
/// `freq_weighting` the per-index selection bias. Each iteration selects
/// the index with maximal compensated energy gain and accumulates
/// `odc * projection / D` into its coefficient, where `D` is the weighted
/// basis energy. Stops early once the weighted residual energy falls below
/// a negligible fraction of its initial value.
///
/// The weighted residual energy is non-increasing across iterations for
/// `0 < odc < 2`.
pub(crate) fn fit(
    values: &[f64],
    basis_dict: &Array2<f64>,
    spatial_weighting: &[f64],
    freq_weighting: &[f64],
    transform_length: usize,
    odc: f64,
    max_iterations: usize,
) -> FitResult {
    let (num_bases, n) = basis_dict.dim();
    debug_assert_eq!(n, values.len());
    debug_assert_eq!(n, spatial_weighting.len());
    debug_assert_eq!(num_bases, freq_weighting.len());

    let mut residual = values.to_vec();
    let mut coeffs: BTreeMap<usize, f64> = BTreeMap::new();

    // Weighted energy of each basis function over the sample mesh
    let d: Vec<f64> = (0..num_bases)
        .map(|i| {
            (0..n)
                .map(|j| basis_dict[(i, j)] * basis_dict[(i, j)] * spatial_weighting[j])
                .sum()
        })
        .collect();

    let weighted_energy = |r: &[f64]| -> f64 {
        r.iter()
            .zip(spatial_weighting)
            .map(|(ri, wi)| ri * ri * wi)
            .sum()
    };

    let initial_energy = weighted_energy(&residual);
    let stop_energy = RESIDUAL_EPS * initial_energy.max(1.0);

    let mut iterations = 0;
    let mut energy = initial_energy;

    for _ in 0..max_iterations {
        if energy <= stop_energy {
            break;
        }
        iterations += 1;

        // Weighted projection of the residual onto every basis function
        let mut best_idx = None;
        let mut best_obj = f64::NEG_INFINITY;
        let mut best_c = 0.0;
        for i in 0..num_bases {
            if d[i] <= f64::MIN_POSITIVE {
                // Basis vanishes on this mesh, nothing to project onto
                continue;
            }
            let proj: f64 = (0..n)
                .map(|j| basis_dict[(i, j)] * residual[j] * spatial_weighting[j])
                .sum();
            let obj = freq_weighting[i] * (proj * proj) / d[i];
            if obj > best_obj {
                best_obj = obj;
                best_idx = Some(i);
                best_c = proj / d[i];
            }
        }

        let Some(idx) = best_idx else {
            break;
        };

        // Fractional update: the same index can be revisited and refined
        *coeffs.entry(idx).or_insert(0.0) += odc * best_c;
        for j in 0..n {
            residual[j] -= odc * best_c * basis_dict[(idx, j)];
        }
        energy = weighted_energy(&residual);
    }

    FitResult {
        model: SpectralModel {
            transform_length,
            coeffs,
        },
        iterations,
        residual_energy: energy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fsmr::basis::{dct_basis_dict, dct_frequency_weighting};

    fn fit_positions(
        positions: &[[f64; 2]],
        values: &[f64],
        t: usize,
        odc: f64,
        max_iterations: usize,
    ) -> FitResult {
        let dict = dct_basis_dict(positions, t);
        let fw = dct_frequency_weighting(t, 0.93);
        let sw = vec![1.0; positions.len()];
        fit(values, &dict, &sw, &fw, t, odc, max_iterations)
    }

    #[test]
    fn test_energy_non_increasing() {
        let positions: Vec<[f64; 2]> = (0..25)
            .map(|i| [(i % 5) as f64 * 1.3 + 0.2, (i / 5) as f64 * 0.9])
            .collect();
        let values: Vec<f64> = positions
            .iter()
            .map(|p| (p[0] * 0.7).sin() + 0.3 * p[1])
            .collect();

        let mut last = f64::INFINITY;
        for budget in [1, 2, 5, 10, 25, 50] {
            let result = fit_positions(&positions, &values, 8, 0.5, budget);
            assert!(
                result.residual_energy <= last + 1e-12,
                "energy increased at budget {}: {} > {}",
                budget,
                result.residual_energy,
                last
            );
            last = result.residual_energy;
        }
    }

    #[test]
    fn test_coefficient_count_bounded_by_iterations() {
        let positions: Vec<[f64; 2]> = (0..16)
            .map(|i| [(i % 4) as f64, (i / 4) as f64])
            .collect();
        let values: Vec<f64> = (0..16).map(|i| (i as f64 * 0.37).cos()).collect();

        let result = fit_positions(&positions, &values, 4, 0.5, 7);
        assert!(result.iterations <= 7);
        assert!(result.model.coefficient_count() <= result.iterations);
    }

    #[test]
    fn test_constant_signal_converges_to_dc() {
        let positions: Vec<[f64; 2]> = (0..9).map(|i| [(i % 3) as f64, (i / 3) as f64]).collect();
        let values = vec![5.0; 9];

        let result = fit_positions(&positions, &values, 4, 0.5, 500);
        let reconstructed = result.model.evaluate(&positions);
        for (i, v) in reconstructed.iter().enumerate() {
            assert!((v - 5.0).abs() < 1e-4, "sample {}: {}", i, v);
        }
    }

    #[test]
    fn test_early_stop_on_negligible_residual() {
        // A constant is exactly representable: the fit should stop long
        // before the iteration budget
        let positions: Vec<[f64; 2]> = (0..9).map(|i| [(i % 3) as f64, (i / 3) as f64]).collect();
        let values = vec![1.0; 9];

        let result = fit_positions(&positions, &values, 2, 1.0, 10_000);
        assert!(
            result.iterations < 10_000,
            "expected early stop, ran {} iterations",
            result.iterations
        );
        assert!(result.residual_energy <= RESIDUAL_EPS * 9.0);
    }

    #[test]
    fn test_underdetermined_mesh_terminates() {
        // Fewer samples than basis functions: degraded but defined result
        let positions = [[0.0, 0.0], [1.0, 2.0], [3.0, 1.0]];
        let values = [1.0, -2.0, 0.5];

        let result = fit_positions(&positions, &values, 8, 0.5, 200);
        let out = result.model.evaluate(&positions);
        assert!(out.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_deterministic() {
        let positions: Vec<[f64; 2]> = (0..20)
            .map(|i| [(i as f64 * 0.73) % 5.0, (i as f64 * 1.19) % 4.0])
            .collect();
        let values: Vec<f64> = (0..20).map(|i| ((i * i) % 7) as f64).collect();

        let a = fit_positions(&positions, &values, 8, 0.5, 64);
        let b = fit_positions(&positions, &values, 8, 0.5, 64);
        assert_eq!(a.residual_energy, b.residual_energy);
        assert_eq!(a.model.evaluate(&positions), b.model.evaluate(&positions));
    }
}
