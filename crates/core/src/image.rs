//! In-memory image grid type

use crate::element::ImageElement;
use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView2, ArrayViewMut2};

/// A 2D image stored in row-major order.
///
/// `Image<T>` is a thin wrapper over [`ndarray::Array2`] with bounds-checked
/// access and sub-pixel sampling. Pixel `(row, col)` addresses `(y, x)`;
/// continuous coordinates place pixel centers at integer positions.
///
/// # Example
///
/// ```
/// use spheresample_core::Image;
///
/// let mut image: Image<f64> = Image::new(4, 8);
/// image.set(1, 2, 0.5).unwrap();
/// assert_eq!(image.get(1, 2).unwrap(), 0.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T: ImageElement> {
    data: Array2<T>,
}

impl<T: ImageElement> Image<T> {
    /// Create a new image filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            data: Array2::zeros((rows, cols)),
        }
    }

    /// Create a new image filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), value),
        }
    }

    /// Create an image from existing data in row-major order
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions {
                width: cols,
                height: rows,
            });
        }

        let array = Array2::from_shape_vec((rows, cols), data)
            .map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self { data: array })
    }

    /// Create an image from an ndarray
    pub fn from_array(data: Array2<T>) -> Self {
        Self { data }
    }

    /// Create an image with the same dimensions, filled with a value
    pub fn like(&self, fill_value: T) -> Self {
        Self {
            data: Array2::from_elem(self.data.dim(), fill_value),
        }
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Total number of pixels
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the image is empty
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Get value at (row, col)
    pub fn get(&self, row: usize, col: usize) -> Result<T> {
        self.data
            .get((row, col))
            .copied()
            .ok_or(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            })
    }

    /// Set value at (row, col)
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if row >= self.rows() || col >= self.cols() {
            return Err(Error::IndexOutOfBounds {
                row,
                col,
                rows: self.rows(),
                cols: self.cols(),
            });
        }
        self.data[(row, col)] = value;
        Ok(())
    }

    /// Get a view of the underlying data
    pub fn view(&self) -> ArrayView2<'_, T> {
        self.data.view()
    }

    /// Get a mutable view of the underlying data
    pub fn view_mut(&mut self) -> ArrayViewMut2<'_, T> {
        self.data.view_mut()
    }

    /// Get a reference to the underlying array
    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    /// Get a mutable reference to the underlying array
    pub fn data_mut(&mut self) -> &mut Array2<T> {
        &mut self.data
    }

    /// Consume the image and return the underlying array
    pub fn into_array(self) -> Array2<T> {
        self.data
    }

    /// Sample the image at a continuous position with bilinear interpolation.
    ///
    /// Pixel centers sit at integer coordinates. The 2x2 neighborhood is
    /// clamped at the image border, so positions within
    /// `[-0.5, rows-0.5] x [-0.5, cols-0.5]` replicate edge pixels.
    /// Returns `None` for positions outside that range or non-finite input.
    pub fn sample_bilinear(&self, y: f64, x: f64) -> Option<f64> {
        if !y.is_finite() || !x.is_finite() {
            return None;
        }
        let (rows, cols) = self.shape();
        if rows == 0 || cols == 0 {
            return None;
        }
        if y < -0.5 || y > rows as f64 - 0.5 || x < -0.5 || x > cols as f64 - 0.5 {
            return None;
        }

        let y0 = y.floor().clamp(0.0, rows as f64 - 1.0);
        let x0 = x.floor().clamp(0.0, cols as f64 - 1.0);
        let fy = (y - y0).clamp(0.0, 1.0);
        let fx = (x - x0).clamp(0.0, 1.0);

        let r0 = y0 as usize;
        let c0 = x0 as usize;
        let r1 = (r0 + 1).min(rows - 1);
        let c1 = (c0 + 1).min(cols - 1);

        // Zero-weight neighbors are skipped so exact pixel-center reads
        // return the pixel value untouched (relevant when neighbors are NaN)
        let lerp = |a: f64, b: f64, f: f64| {
            if f == 0.0 {
                a
            } else if f == 1.0 {
                b
            } else {
                a * (1.0 - f) + b * f
            }
        };

        let v00 = self.data[(r0, c0)].to_f64()?;
        let v01 = self.data[(r0, c1)].to_f64()?;
        let v10 = self.data[(r1, c0)].to_f64()?;
        let v11 = self.data[(r1, c1)].to_f64()?;

        let top = lerp(v00, v01, fx);
        let bottom = lerp(v10, v11, fx);
        Some(lerp(top, bottom, fy))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_creation() {
        let image: Image<f32> = Image::new(100, 200);
        assert_eq!(image.rows(), 100);
        assert_eq!(image.cols(), 200);
        assert_eq!(image.shape(), (100, 200));
    }

    #[test]
    fn test_image_access() {
        let mut image: Image<f32> = Image::new(10, 10);
        image.set(5, 5, 42.0).unwrap();
        assert_eq!(image.get(5, 5).unwrap(), 42.0);
        assert!(image.get(10, 0).is_err());
        assert!(image.set(0, 10, 1.0).is_err());
    }

    #[test]
    fn test_from_vec_rejects_bad_len() {
        let result: Result<Image<f64>> = Image::from_vec(vec![0.0; 5], 2, 3);
        assert!(result.is_err());
    }

    #[test]
    fn test_bilinear_at_pixel_centers() {
        let image = Image::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        assert_eq!(image.sample_bilinear(0.0, 0.0), Some(1.0));
        assert_eq!(image.sample_bilinear(1.0, 1.0), Some(4.0));
    }

    #[test]
    fn test_bilinear_midpoint() {
        let image = Image::from_vec(vec![1.0, 2.0, 3.0, 4.0], 2, 2).unwrap();
        let mid = image.sample_bilinear(0.5, 0.5).unwrap();
        assert!((mid - 2.5).abs() < 1e-12, "midpoint should average, got {}", mid);
    }

    #[test]
    fn test_bilinear_outside() {
        let image: Image<f64> = Image::new(2, 2);
        assert_eq!(image.sample_bilinear(-1.0, 0.0), None);
        assert_eq!(image.sample_bilinear(0.0, 5.0), None);
        assert_eq!(image.sample_bilinear(f64::NAN, 0.0), None);
    }
}
