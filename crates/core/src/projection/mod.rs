//! Projection formats mapping image pixels to the unit sphere
//!
//! Each format provides the bidirectional mapping between continuous pixel
//! coordinates `(y, x)` of a planar layout and directions on the unit
//! sphere. Pixel centers sit at integer coordinates; the half-pixel offsets
//! in the formulas place sample `(0, 0)` at the center of the first pixel.

mod cubemap;
mod equirectangular;
mod perspective;

pub use cubemap::Cubemap;
pub use equirectangular::Equirectangular;
pub use perspective::Perspective;

use crate::coords::Dir3;

/// Bidirectional pixel/sphere mapping for one projection layout.
///
/// Implementations must satisfy `from_sphere(to_sphere(p)) == p` within
/// floating tolerance for every pixel `p` with a valid mapping.
pub trait Projection: Send + Sync {
    /// Project pixel coordinates to a unit-sphere direction.
    ///
    /// Returns `None` when the pixel lies outside the projection's defined
    /// region (e.g. unused areas of a layout).
    fn to_sphere(&self, y: f64, x: f64) -> Option<Dir3>;

    /// Reproject a unit-sphere direction to pixel coordinates `(y, x)`.
    ///
    /// Returns `None` when the direction is outside the projection's domain
    /// (e.g. behind a perspective image plane).
    fn from_sphere(&self, dir: &Dir3) -> Option<(f64, f64)>;

    /// Focal length of the equivalent perspective viewport, in pixels.
    ///
    /// Used to build the per-block tangent-plane frame during
    /// viewport-adaptive resampling.
    fn focal_length(&self) -> f64;
}
