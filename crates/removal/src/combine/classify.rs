//! Classifying which source removed nitrogen at each cell

use geo_types::MultiPolygon;
use ndarray::Array2;
use nsink_core::{Error, Raster, RasterTemplate, Result};
use serde::{Deserialize, Serialize};

use super::{blend, SourceGrids};

/// Nodata code for the class grid
pub const CLASS_NODATA: u8 = 255;

/// Which removal source acted at a cell.
///
/// Codes are ordered so that within the coalesced pair (lake over land),
/// the higher code is the higher-precedence source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum RemovalClass {
    /// Inside the analysis extent, no removal signal
    None = 0,
    /// Hydric-soil land removal
    Hydric = 1,
    /// In-channel stream removal
    Stream = 2,
    /// Lake removal
    Lake = 3,
}

impl RemovalClass {
    pub fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for RemovalClass {
    type Error = Error;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            0 => Ok(Self::None),
            1 => Ok(Self::Hydric),
            2 => Ok(Self::Stream),
            3 => Ok(Self::Lake),
            other => Err(Error::InvalidParameter {
                name: "class code",
                value: other.to_string(),
                reason: "not a removal class".to_string(),
            }),
        }
    }
}

/// Classify each cell by the source that supplies its merged removal.
///
/// Each source grid recodes to its class value and runs through the same
/// pipeline as the magnitude merge, so the class surface agrees with the
/// merged surface cell for cell: wherever one reports a source the other
/// reports that source's magnitude. Land and stream zeros are missing
/// here exactly as in the merge; a clamped lake zero still classifies as
/// lake.
pub fn classify_removal(
    land: &Raster<f64>,
    stream: &Raster<f64>,
    lake: &Raster<f64>,
    template: &RasterTemplate,
    boundary: &MultiPolygon<f64>,
) -> Result<Raster<u8>> {
    let land = recode(land, RemovalClass::Hydric, false);
    let stream = recode(stream, RemovalClass::Stream, false);
    let lake = recode(lake, RemovalClass::Lake, true);

    let blended = blend(
        &SourceGrids {
            stream: &stream,
            lake: &lake,
            land: &land,
        },
        template,
        boundary,
    )?;

    to_class_grid(&blended)
}

/// Replace each valid cell with the class code; exact zeros become missing
/// unless the source treats 0 as a real estimate
fn recode(grid: &Raster<f64>, class: RemovalClass, zero_is_real: bool) -> Raster<f64> {
    let code = class.code() as f64;
    let mut output = grid.clone();
    output.data_mut().mapv_inplace(|v| {
        if v.is_nan() || (v == 0.0 && !zero_is_real) {
            f64::NAN
        } else {
            code
        }
    });
    output.set_nodata(Some(f64::NAN));
    output
}

fn to_class_grid(blended: &Raster<f64>) -> Result<Raster<u8>> {
    let (rows, cols) = blended.shape();
    let data: Vec<u8> = blended
        .view()
        .iter()
        .map(|v| if v.is_nan() { CLASS_NODATA } else { *v as u8 })
        .collect();

    let mut output = blended.with_same_meta::<u8>(CLASS_NODATA);
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}
