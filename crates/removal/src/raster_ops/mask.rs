//! Boundary masking and impervious suppression

use geo::{BoundingRect, Contains};
use geo_types::{MultiPolygon, Point};
use ndarray::Array2;
use nsink_core::{Error, Raster, Result};

use crate::maybe_rayon::*;

/// Mask a grid to the watershed boundary.
///
/// Cells whose center falls inside the boundary keep their value, with
/// missing (NaN) cells replaced by `fill`; cells outside become missing and
/// are excluded from all further output.
pub fn apply_boundary(
    grid: &Raster<f64>,
    boundary: &MultiPolygon<f64>,
    fill: f64,
) -> Result<Raster<f64>> {
    let (rows, cols) = grid.shape();
    let bbox = boundary.bounding_rect();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];

            for (col, out) in row_data.iter_mut().enumerate() {
                let (x, y) = grid.pixel_to_geo(col, row);

                if let Some(bb) = bbox {
                    if x < bb.min().x || x > bb.max().x || y < bb.min().y || y > bb.max().y {
                        continue;
                    }
                }
                if !boundary.contains(&Point::new(x, y)) {
                    continue;
                }

                let v = unsafe { grid.get_unchecked(row, col) };
                *out = if v.is_nan() { fill } else { v };
            }

            row_data
        })
        .collect();

    let mut output = grid.with_same_meta::<f64>(f64::NAN);
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

/// Suppress removal over impervious surfaces.
///
/// A pixel is impervious when the impervious grid is negative or missing
/// there; removal over such pixels is forced to 0. Pervious pixels
/// (non-negative indicator) pass removal through unchanged, and missing
/// removal stays missing.
pub fn suppress_impervious(removal: &Raster<f64>, impervious: &Raster<f64>) -> Result<Raster<f64>> {
    let (rows, cols) = removal.shape();
    let (ir, ic) = impervious.shape();
    if (rows, cols) != (ir, ic) {
        return Err(Error::SizeMismatch {
            er: rows,
            ec: cols,
            ar: ir,
            ac: ic,
        });
    }

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];

            for (col, out) in row_data.iter_mut().enumerate() {
                let r = unsafe { removal.get_unchecked(row, col) };
                if r.is_nan() {
                    continue;
                }
                let imp = unsafe { impervious.get_unchecked(row, col) };
                *out = if imp.is_nan() || imp < 0.0 { 0.0 } else { r };
            }

            row_data
        })
        .collect();

    let mut output = removal.with_same_meta::<f64>(f64::NAN);
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}
