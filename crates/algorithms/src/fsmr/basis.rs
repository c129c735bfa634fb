//! DCT basis dictionary over irregular sample positions
//!
//! The frequency model uses a 2D DCT-style basis on a `T x T` frequency
//! index grid, evaluated directly at arbitrary (non-grid) positions. Index
//! `k` pairs with the y coordinate, `l` with x; the flat dictionary index
//! is `k * T + l`.

use ndarray::Array2;

/// Per-frequency normalization factor.
///
/// Depends only on whether `k` and `l` are zero, with transform length `T`:
/// `1/T` when both are nonzero, `sqrt(2)/T` when exactly one is zero and
/// `2/T` for the DC pair.
#[inline]
pub(crate) fn basis_weight(k: usize, l: usize, transform_length: usize) -> f64 {
    let t = transform_length as f64;
    match (k == 0, l == 0) {
        (false, false) => 1.0 / t,
        (true, true) => 2.0 / t,
        _ => std::f64::consts::SQRT_2 / t,
    }
}

/// Evaluate basis function `(k, l)` at a continuous position `(y, x)`.
#[inline]
pub(crate) fn basis_at(k: usize, l: usize, transform_length: usize, y: f64, x: f64) -> f64 {
    let t = transform_length as f64;
    let scale = std::f64::consts::PI / t;
    (scale * (y - 0.5) * k as f64).cos()
        * (scale * (x - 0.5) * l as f64).cos()
        * basis_weight(k, l, transform_length)
}

/// Build the full basis dictionary evaluated at `positions`.
///
/// Returns a `[T^2, N]` array: row `k * T + l` holds basis function
/// `(k, l)` evaluated at every sample position.
pub(crate) fn dct_basis_dict(positions: &[[f64; 2]], transform_length: usize) -> Array2<f64> {
    let t = transform_length;
    let n = positions.len();
    let mut dict = Array2::zeros((t * t, n));
    for k in 0..t {
        for l in 0..t {
            let row = k * t + l;
            for (col, p) in positions.iter().enumerate() {
                // positions are stored as [x, y]
                dict[(row, col)] = basis_at(k, l, t, p[1], p[0]);
            }
        }
    }
    dict
}

/// Frequency weighting `sigma^sqrt(k^2 + l^2)` favoring low frequencies.
///
/// Returns one weight per flat dictionary index.
pub(crate) fn dct_frequency_weighting(transform_length: usize, sigma: f64) -> Vec<f64> {
    let t = transform_length;
    let mut weights = Vec::with_capacity(t * t);
    for k in 0..t {
        for l in 0..t {
            let radius = ((k * k + l * l) as f64).sqrt();
            weights.push(sigma.powf(radius));
        }
    }
    weights
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dc_basis_is_constant() {
        let t = 8;
        let v1 = basis_at(0, 0, t, 0.3, -2.0);
        let v2 = basis_at(0, 0, t, 7.9, 5.5);
        assert_eq!(v1, v2);
        assert!((v1 - 2.0 / 8.0).abs() < 1e-15);
    }

    #[test]
    fn test_weight_tiers() {
        let t = 4;
        assert!((basis_weight(0, 0, t) - 0.5).abs() < 1e-15);
        assert!((basis_weight(0, 3, t) - std::f64::consts::SQRT_2 / 4.0).abs() < 1e-15);
        assert!((basis_weight(2, 3, t) - 0.25).abs() < 1e-15);
    }

    #[test]
    fn test_dict_matches_scalar_evaluation() {
        let positions = [[0.25, 1.75], [3.0, 0.0], [-1.5, 2.25]];
        let t = 4;
        let dict = dct_basis_dict(&positions, t);
        assert_eq!(dict.dim(), (16, 3));
        for k in 0..t {
            for l in 0..t {
                for (n, p) in positions.iter().enumerate() {
                    let expected = basis_at(k, l, t, p[1], p[0]);
                    assert_eq!(dict[(k * t + l, n)], expected);
                }
            }
        }
    }

    #[test]
    fn test_frequency_weighting_decays() {
        let fw = dct_frequency_weighting(8, 0.9);
        assert_eq!(fw.len(), 64);
        assert!((fw[0] - 1.0).abs() < 1e-15, "DC weight should be 1");
        // Weight decreases with frequency radius
        assert!(fw[1] > fw[2]);
        assert!(fw[0] > fw[8 * 7 + 7]);
    }
}
