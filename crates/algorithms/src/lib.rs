//! # spheresample algorithms
//!
//! Resampling between spherical projection formats (equirectangular,
//! cubemap, ...) with higher fidelity than direct pixel interpolation.
//!
//! ## Components
//!
//! - **var**: viewport-adaptive resampling — partitions the target grid
//!   into blocks, picks a distortion-minimizing tangent-plane viewport per
//!   block and reconstructs each block from its dilated source
//!   neighborhood
//! - **fsmr**: frequency-selective mesh resampling — fits a sparse 2D DCT
//!   model to irregularly positioned samples and evaluates it at arbitrary
//!   target positions; the default mesh-to-mesh resampler driving VAR

pub mod fsmr;
pub mod maybe_rayon;
pub mod var;

pub use fsmr::{resample_fsmr, resample_fsmr_weighted, Fsmr, FsmrParams, MeshResampler, NearestMesh};
pub use var::{cmp_size, ResampleOutput, ResampleReport, VarParams, ViewportAdaptiveResampler};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::fsmr::{resample_fsmr, Fsmr, FsmrParams, MeshResampler, NearestMesh};
    pub use crate::var::{
        cmp_size, resample, ResampleOutput, ResampleReport, VarParams, ViewportAdaptiveResampler,
    };
    pub use spheresample_core::prelude::*;
}
