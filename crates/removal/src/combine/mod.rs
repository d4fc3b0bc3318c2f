//! Combining the three removal sources
//!
//! The merge engine and the type classifier run the exact same
//! combine/mask/fill/filter/resample/overlay steps over different cell
//! semantics (magnitudes vs. class codes). The precedence ordering and the
//! pipeline live here, in one place, so the two surfaces can never drift
//! apart.

mod classify;
mod merge;

pub use classify::{classify_removal, RemovalClass, CLASS_NODATA};
pub use merge::merge_removal;

use geo_types::MultiPolygon;
use ndarray::Array2;
use nsink_core::{Error, Raster, RasterTemplate, Result};

use crate::maybe_rayon::*;
use crate::raster_ops::{apply_boundary, focal_max, resample_nearest};

/// The removal sources, in descending precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalSource {
    Stream,
    Lake,
    Land,
}

/// Fixed precedence: stream beats lake beats land.
///
/// In-channel removal physically supersedes land and lake removal at the
/// same location, so the first entry overlays the blended remainder; the
/// rest coalesce first-non-missing in order.
pub const PRECEDENCE: [RemovalSource; 3] =
    [RemovalSource::Stream, RemovalSource::Lake, RemovalSource::Land];

/// The three source grids of one pipeline run
pub(crate) struct SourceGrids<'a> {
    pub stream: &'a Raster<f64>,
    pub lake: &'a Raster<f64>,
    pub land: &'a Raster<f64>,
}

impl<'a> SourceGrids<'a> {
    fn get(&self, source: RemovalSource) -> &'a Raster<f64> {
        match source {
            RemovalSource::Stream => self.stream,
            RemovalSource::Lake => self.lake,
            RemovalSource::Land => self.land,
        }
    }
}

/// Run the shared pipeline: coalesce the lower-precedence sources, mask to
/// the boundary (filling in-boundary gaps with 0), close seams with one
/// 3×3 maximum pass, resample onto the template, then overlay the
/// highest-precedence source.
pub(crate) fn blend(
    sources: &SourceGrids,
    template: &RasterTemplate,
    boundary: &MultiPolygon<f64>,
) -> Result<Raster<f64>> {
    let [overlay_source, first, second] = PRECEDENCE;
    let combined = coalesce(sources.get(first), sources.get(second))?;

    let bounded = apply_boundary(&combined, boundary, 0.0)?;
    let filtered = focal_max(&bounded)?;
    let aligned = resample_nearest(&filtered, template)?;

    let top = resample_nearest(sources.get(overlay_source), template)?;
    overlay(&aligned, &top)
}

/// First-non-missing combine: `a` where present, else `b`
pub(crate) fn coalesce(a: &Raster<f64>, b: &Raster<f64>) -> Result<Raster<f64>> {
    pixelwise(a, b, |va, vb| if va.is_nan() { vb } else { va })
}

/// Overlay `top` onto `base`: top wins wherever it is present, but only
/// inside the analysis extent (cells where `base` is missing stay missing)
pub(crate) fn overlay(base: &Raster<f64>, top: &Raster<f64>) -> Result<Raster<f64>> {
    pixelwise(base, top, |vb, vt| {
        if vb.is_nan() || vt.is_nan() {
            vb
        } else {
            vt
        }
    })
}

/// Recode exact zeros to missing.
///
/// Land and stream zeros mean "no information", and must not win a
/// first-non-missing combine against real data from another source.
pub(crate) fn zero_to_missing(grid: &Raster<f64>) -> Raster<f64> {
    let mut output = grid.clone();
    output.data_mut().mapv_inplace(|v| if v == 0.0 { f64::NAN } else { v });
    output.set_nodata(Some(f64::NAN));
    output
}

fn pixelwise(
    a: &Raster<f64>,
    b: &Raster<f64>,
    op: impl Fn(f64, f64) -> f64 + Sync + Send,
) -> Result<Raster<f64>> {
    let (rows, cols) = a.shape();
    let (br, bc) = b.shape();
    if (rows, cols) != (br, bc) {
        return Err(Error::SizeMismatch {
            er: rows,
            ec: cols,
            ar: br,
            ac: bc,
        });
    }

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, out) in row_data.iter_mut().enumerate() {
                let va = unsafe { a.get_unchecked(row, col) };
                let vb = unsafe { b.get_unchecked(row, col) };
                *out = op(va, vb);
            }
            row_data
        })
        .collect();

    let mut output = a.with_same_meta::<f64>(f64::NAN);
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}
