//! Raster data structures

mod element;
mod geotransform;
mod grid;
mod template;

pub use element::RasterElement;
pub use geotransform::GeoTransform;
pub use grid::{Raster, RasterStatistics};
pub use template::RasterTemplate;
