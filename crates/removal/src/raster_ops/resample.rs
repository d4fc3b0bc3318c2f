//! Nearest-neighbor resampling onto the template
//!
//! Removal surfaces are discrete at their source boundaries, so nearest
//! neighbor is the only correct method here; smoothing resamplers would
//! blur removal-type edges into values no source ever produced.

use ndarray::Array2;
use nsink_core::{Error, Raster, RasterTemplate, Result};

use crate::maybe_rayon::*;

/// Resample a grid onto the template's exact grid, nearest neighbor.
///
/// A grid that is already pixel-aligned is returned unchanged. A grid in a
/// different CRS is an error: this core does not reproject.
pub fn resample_nearest(grid: &Raster<f64>, template: &RasterTemplate) -> Result<Raster<f64>> {
    if let Some(crs) = grid.crs() {
        if crs != template.crs() {
            return Err(Error::CrsMismatch(
                crs.to_string(),
                template.crs().to_string(),
            ));
        }
    }

    if grid.matches_template(template) {
        return Ok(grid.clone());
    }

    let (rows, cols) = template.shape();
    let (src_rows, src_cols) = grid.shape();
    let transform = *template.transform();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];

            for (col, out) in row_data.iter_mut().enumerate() {
                let (x, y) = transform.pixel_to_geo(col, row);
                let (cf, rf) = grid.geo_to_pixel(x, y);
                if cf < 0.0 || rf < 0.0 {
                    continue;
                }
                let (sc, sr) = (cf.floor() as usize, rf.floor() as usize);
                if sr >= src_rows || sc >= src_cols {
                    continue;
                }
                *out = unsafe { grid.get_unchecked(sr, sc) };
            }

            row_data
        })
        .collect();

    let mut output = template.empty();
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nsink_core::{Crs, GeoTransform};

    fn template(rows: usize, cols: usize, cell: f64) -> RasterTemplate {
        RasterTemplate::new(
            rows,
            cols,
            GeoTransform::new(0.0, rows as f64 * cell, cell, -cell),
            Crs::epsg(5070),
        )
    }

    #[test]
    fn test_identity_when_aligned() {
        let t = template(5, 5, 1.0);
        let grid = t.grid(0.7, Some(f64::NAN));

        let result = resample_nearest(&grid, &t).unwrap();
        assert_eq!(result.get(2, 2).unwrap(), 0.7);
        assert_eq!(result.shape(), (5, 5));
    }

    #[test]
    fn test_downscale_nearest() {
        // 2x2 coarse source over the same extent as a 4x4 template
        let coarse = template(2, 2, 2.0);
        let mut src = coarse.grid(0.0, Some(f64::NAN));
        src.set(0, 0, 0.1).unwrap();
        src.set(0, 1, 0.2).unwrap();
        src.set(1, 0, 0.3).unwrap();
        src.set(1, 1, 0.4).unwrap();

        let fine = template(4, 4, 1.0);
        let result = resample_nearest(&src, &fine).unwrap();

        // each fine quadrant inherits its coarse cell without smoothing
        assert_eq!(result.get(0, 0).unwrap(), 0.1);
        assert_eq!(result.get(1, 3).unwrap(), 0.2);
        assert_eq!(result.get(3, 0).unwrap(), 0.3);
        assert_eq!(result.get(2, 2).unwrap(), 0.4);
    }

    #[test]
    fn test_outside_source_extent_is_missing() {
        // source covers only the top-left quarter of the template extent
        let small = RasterTemplate::new(
            2,
            2,
            GeoTransform::new(0.0, 4.0, 1.0, -1.0),
            Crs::epsg(5070),
        );
        let src = small.grid(0.9, Some(f64::NAN));

        let t = template(4, 4, 1.0);
        let result = resample_nearest(&src, &t).unwrap();

        assert_eq!(result.get(0, 0).unwrap(), 0.9);
        assert!(result.get(3, 3).unwrap().is_nan());
    }

    #[test]
    fn test_crs_mismatch_is_an_error() {
        let t = template(4, 4, 1.0);
        let mut grid = t.grid(0.5, Some(f64::NAN));
        grid.set_crs(Some(Crs::epsg(4326)));

        assert!(matches!(
            resample_nearest(&grid, &t),
            Err(Error::CrsMismatch(_, _))
        ));
    }
}
