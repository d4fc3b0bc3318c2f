//! Canonical output grid definition
//!
//! Every grid the removal core returns is pixel-aligned with one
//! `RasterTemplate`: same dimensions, same geotransform, same CRS.
//! Estimators build their grids directly on the template; the merge and
//! classification pipelines resample anything that drifted.

use crate::crs::Crs;
use crate::raster::{GeoTransform, Raster, RasterElement};

/// The canonical analysis grid (resolution, extent, CRS).
#[derive(Debug, Clone, PartialEq)]
pub struct RasterTemplate {
    rows: usize,
    cols: usize,
    transform: GeoTransform,
    crs: Crs,
}

impl RasterTemplate {
    pub fn new(rows: usize, cols: usize, transform: GeoTransform, crs: Crs) -> Self {
        Self {
            rows,
            cols,
            transform,
            crs,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Cell size (assumes square cells)
    pub fn cell_size(&self) -> f64 {
        self.transform.cell_size()
    }

    /// Build a grid on this template filled with `fill`
    pub fn grid<T: RasterElement>(&self, fill: T, nodata: Option<T>) -> Raster<T> {
        let mut raster = Raster::filled(self.rows, self.cols, fill);
        raster.set_transform(self.transform);
        raster.set_crs(Some(self.crs.clone()));
        raster.set_nodata(nodata);
        raster
    }

    /// Build an all-missing removal grid (NaN-filled `f64`)
    pub fn empty(&self) -> Raster<f64> {
        self.grid(f64::NAN, Some(f64::NAN))
    }
}
