//! 3×3 focal maximum
//!
//! Closes single-pixel gaps left by rasterization and reprojection seams
//! between adjoining feature classes. Unlike a strict morphological
//! dilation, missing neighbors are skipped rather than poisoning the
//! window, and edge windows truncate: the filter must never reintroduce
//! missing values inside the analysis extent.

use ndarray::Array2;
use nsink_core::{Error, Raster, Result};

use crate::maybe_rayon::*;

/// Apply one 3×3 maximum pass.
///
/// Missing (NaN) centers stay missing; they mark cells outside the
/// watershed boundary. Valid centers always produce a valid value since the
/// window includes the center itself.
pub fn focal_max(grid: &Raster<f64>) -> Result<Raster<f64>> {
    let (rows, cols) = grid.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];

            for (col, out) in row_data.iter_mut().enumerate() {
                let center = unsafe { grid.get_unchecked(row, col) };
                if center.is_nan() {
                    continue;
                }

                let mut max_val = center;
                for dr in -1isize..=1 {
                    for dc in -1isize..=1 {
                        let nr = row as isize + dr;
                        let nc = col as isize + dc;
                        if nr < 0 || nc < 0 || nr >= rows as isize || nc >= cols as isize {
                            continue;
                        }
                        let v = unsafe { grid.get_unchecked(nr as usize, nc as usize) };
                        if !v.is_nan() && v > max_val {
                            max_val = v;
                        }
                    }
                }

                *out = max_val;
            }

            row_data
        })
        .collect();

    let mut output = grid.with_same_meta::<f64>(f64::NAN);
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform(rows: usize, cols: usize, value: f64) -> Raster<f64> {
        let mut r = Raster::filled(rows, cols, value);
        r.set_nodata(Some(f64::NAN));
        r
    }

    #[test]
    fn test_focal_max_spreads_peak() {
        let mut grid = uniform(5, 5, 0.0);
        grid.set(2, 2, 0.8).unwrap();

        let result = focal_max(&grid).unwrap();
        // the peak reaches its 8 neighbors
        assert_eq!(result.get(1, 1).unwrap(), 0.8);
        assert_eq!(result.get(2, 3).unwrap(), 0.8);
        assert_eq!(result.get(3, 3).unwrap(), 0.8);
        // two cells away is untouched
        assert_eq!(result.get(0, 0).unwrap(), 0.0);
    }

    #[test]
    fn test_focal_max_edges_truncate() {
        let mut grid = uniform(4, 4, 0.1);
        grid.set(0, 0, 0.5).unwrap();

        let result = focal_max(&grid).unwrap();
        // corner window truncates but still produces a value
        assert_eq!(result.get(0, 0).unwrap(), 0.5);
        assert_eq!(result.get(1, 1).unwrap(), 0.5);
        assert_eq!(result.get(3, 3).unwrap(), 0.1);
    }

    #[test]
    fn test_focal_max_missing_center_stays_missing() {
        let mut grid = uniform(3, 3, 0.2);
        grid.set(1, 1, f64::NAN).unwrap();

        let result = focal_max(&grid).unwrap();
        assert!(result.get(1, 1).unwrap().is_nan());
        // valid neighbors ignore the missing cell
        assert_eq!(result.get(0, 0).unwrap(), 0.2);
    }

    #[test]
    fn test_focal_max_idempotent_on_uniform() {
        let grid = uniform(6, 6, 0.3);
        let once = focal_max(&grid).unwrap();
        for row in 0..6 {
            for col in 0..6 {
                assert_eq!(once.get(row, col).unwrap(), 0.3);
            }
        }
    }
}
