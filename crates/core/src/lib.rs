//! # N-Sink Core
//!
//! Foundation types for the N-Sink watershed nitrogen-removal library.
//!
//! This crate provides:
//! - `Raster<T>`: generic georeferenced grid
//! - `RasterTemplate`: the canonical grid every output aligns to
//! - `GeoTransform`: affine georeferencing
//! - `Crs`: coordinate reference system identifier
//! - `Feature` / `FeatureCollection`: vector output layers
//! - Shared `Error` / `Result` types

pub mod crs;
pub mod error;
pub mod raster;
pub mod vector;

pub use crs::Crs;
pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement, RasterStatistics, RasterTemplate};
pub use vector::{AttributeValue, Feature, FeatureCollection};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::Crs;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement, RasterTemplate};
    pub use crate::vector::{AttributeValue, Feature, FeatureCollection};
}
