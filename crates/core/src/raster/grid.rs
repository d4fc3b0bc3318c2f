//! Georeferenced raster grid

use crate::crs::Crs;
use crate::error::{Error, Result};
use crate::raster::{GeoTransform, RasterElement, RasterTemplate};
use ndarray::{Array2, ArrayView2};

/// A georeferenced 2D grid of cells of type `T`.
///
/// Removal surfaces are `Raster<f64>` with NaN marking missing cells;
/// removal-type surfaces are `Raster<u8>` with an explicit no-data code.
#[derive(Debug, Clone)]
pub struct Raster<T: RasterElement> {
    /// Cell values in row-major (row, col) order
    data: Array2<T>,
    /// Affine georeferencing
    transform: GeoTransform,
    /// Coordinate reference system
    crs: Option<Crs>,
    /// No-data value
    nodata: Option<T>,
}

impl<T: RasterElement> Raster<T> {
    /// Create a raster filled with zeros
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, T::zero())
    }

    /// Create a raster filled with a specific value
    pub fn filled(rows: usize, cols: usize, value: T) -> Self {
        Self {
            data: Array2::from_elem((rows, cols), value),
            transform: GeoTransform::default(),
            crs: None,
            nodata: None,
        }
    }

    /// Create a raster from a flat row-major vector
    pub fn from_vec(data: Vec<T>, rows: usize, cols: usize) -> Result<Self> {
        if data.len() != rows * cols {
            return Err(Error::InvalidDimensions { rows, cols });
        }

        let array =
            Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;

        Ok(Self {
            data: array,
            transform: GeoTransform::default(),
            crs: None,
            nodata: None,
        })
    }

    /// Create a raster of a different cell type carrying this raster's
    /// georeferencing, with the target type's default no-data sentinel
    pub fn with_same_meta<U: RasterElement>(&self, fill: U) -> Raster<U> {
        Raster {
            data: Array2::from_elem(self.data.dim(), fill),
            transform: self.transform,
            crs: self.crs.clone(),
            nodata: Some(U::default_nodata()),
        }
    }

    // Dimensions

    pub fn rows(&self) -> usize {
        self.data.nrows()
    }

    pub fn cols(&self) -> usize {
        self.data.ncols()
    }

    /// Dimensions as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    // Data access

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

    /// Get value at (row, col) without bounds checking
    ///
    /// # Safety
    /// Caller must ensure row < self.rows() and col < self.cols()
    pub unsafe fn get_unchecked(&self, row: usize, col: usize) -> T {
        unsafe { *self.data.uget((row, col)) }
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

    /// Get a mutable reference to the underlying array
    pub fn data_mut(&mut self) -> &mut Array2<T> {
        &mut self.data
    }

    // Metadata

    pub fn transform(&self) -> &GeoTransform {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: GeoTransform) {
        self.transform = transform;
    }

    pub fn crs(&self) -> Option<&Crs> {
        self.crs.as_ref()
    }

    pub fn set_crs(&mut self, crs: Option<Crs>) {
        self.crs = crs;
    }

    pub fn nodata(&self) -> Option<T> {
        self.nodata
    }

    pub fn set_nodata(&mut self, nodata: Option<T>) {
        self.nodata = nodata;
    }

    // Coordinate conversion

    /// Geographic coordinates of a pixel center
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        self.transform.pixel_to_geo(col, row)
    }

    /// Fractional pixel coordinates of a geographic point
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        self.transform.geo_to_pixel(x, y)
    }

    // Value checks

    /// Check if a value is no-data
    pub fn is_nodata(&self, value: T) -> bool {
        value.is_nodata(self.nodata)
    }

    /// Whether this raster is pixel-aligned with the template.
    ///
    /// True when dimensions and geotransform match and the CRS, if set,
    /// equals the template's.
    pub fn matches_template(&self, template: &RasterTemplate) -> bool {
        self.shape() == template.shape()
            && self.transform.aligned_with(template.transform(), 1e-9)
            && self.crs.as_ref().map_or(true, |c| c == template.crs())
    }

    /// Min/max/mean over valid (non-nodata) cells
    pub fn statistics(&self) -> RasterStatistics {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        let mut count = 0usize;

        for &value in self.data.iter() {
            if self.is_nodata(value) {
                continue;
            }
            if let Some(v) = value.to_f64() {
                min = min.min(v);
                max = max.max(v);
                sum += v;
                count += 1;
            }
        }

        if count == 0 {
            RasterStatistics {
                min: None,
                max: None,
                mean: None,
                valid_count: 0,
            }
        } else {
            RasterStatistics {
                min: Some(min),
                max: Some(max),
                mean: Some(sum / count as f64),
                valid_count: count,
            }
        }
    }
}

/// Summary statistics over valid cells
#[derive(Debug, Clone, Copy)]
pub struct RasterStatistics {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
    pub valid_count: usize,
}
