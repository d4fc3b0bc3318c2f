//! Grid operations supporting the removal pipelines
//!
//! - Boundary masking and in-boundary gap filling
//! - Impervious suppression
//! - 3×3 focal maximum (seam closing)
//! - Nearest-neighbor resampling onto the template

mod focal;
mod mask;
mod resample;

pub use focal::focal_max;
pub use mask::{apply_boundary, suppress_impervious};
pub use resample::resample_nearest;
