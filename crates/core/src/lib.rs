//! # spheresample core
//!
//! Core types for spherical image resampling.
//!
//! This crate provides:
//! - `Image<T>`: 2D pixel grid with sub-pixel bilinear sampling
//! - `Dir3` and coordinate conversions for the unit sphere
//! - `Projection`: the pixel/sphere mapping trait, with equirectangular,
//!   cubemap and perspective implementations

pub mod coords;
pub mod element;
pub mod error;
pub mod image;
pub mod projection;

pub use coords::{Dir3, Rotation3};
pub use element::ImageElement;
pub use error::{Error, Result};
pub use image::Image;
pub use projection::{Cubemap, Equirectangular, Perspective, Projection};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::coords::{Dir3, Rotation3};
    pub use crate::element::ImageElement;
    pub use crate::error::{Error, Result};
    pub use crate::image::Image;
    pub use crate::projection::{Cubemap, Equirectangular, Perspective, Projection};
}
