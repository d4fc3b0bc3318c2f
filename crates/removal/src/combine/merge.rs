//! Merging removal magnitudes into one surface

use geo_types::MultiPolygon;
use nsink_core::{Raster, RasterTemplate, Result};

use super::{blend, zero_to_missing, SourceGrids};

/// Merge the three removal grids into a single magnitude surface.
///
/// Land and stream zeros are recoded to missing before combining, so a
/// zero never shadows a real estimate from a lower-precedence source.
/// Lake zeros survive: a clamped regression is still an estimate. Cells
/// inside the boundary with no estimate from any source come out 0; cells
/// outside the boundary come out missing.
pub fn merge_removal(
    land: &Raster<f64>,
    stream: &Raster<f64>,
    lake: &Raster<f64>,
    template: &RasterTemplate,
    boundary: &MultiPolygon<f64>,
) -> Result<Raster<f64>> {
    let land = zero_to_missing(land);
    let stream = zero_to_missing(stream);

    blend(
        &SourceGrids {
            stream: &stream,
            lake,
            land: &land,
        },
        template,
        boundary,
    )
}
