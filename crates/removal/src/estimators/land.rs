//! Land (hydric-soil) removal
//!
//! Hydric soils mark saturated, denitrifying ground: removal scales
//! linearly with a soil unit's hydric percentage, and impervious cover
//! suppresses it entirely. A computed removal of exactly 0 means "no
//! land-based removal signal", not a true zero: the regression has
//! nothing to say about non-hydric ground.

use geo::ConvexHull;
use geo_types::{Geometry, MultiPoint, Point, Polygon};
use nsink_core::{AttributeValue, Feature, FeatureCollection, Raster, RasterTemplate, Result};
use std::collections::{HashMap, VecDeque};

use crate::attributes::SoilUnit;
use crate::raster_ops::suppress_impervious;
use crate::rasterize::burn_polygons_max;

/// Parameters for the land removal regression
#[derive(Debug, Clone)]
pub struct LandRemovalParams {
    /// Fraction of load removed by a fully hydric unit
    pub hydric_coefficient: f64,
}

impl Default for LandRemovalParams {
    fn default() -> Self {
        Self {
            hydric_coefficient: 0.8,
        }
    }
}

/// Land estimator output: the removal grid and the dissolved region layer
#[derive(Debug, Clone)]
pub struct LandRemoval {
    pub grid: Raster<f64>,
    pub regions: FeatureCollection,
}

/// Removal fraction for one soil unit; exactly-zero results are missing
pub fn unit_removal(hydric_pct: f64, params: &LandRemovalParams) -> Option<f64> {
    if !hydric_pct.is_finite() || hydric_pct <= 0.0 {
        return None;
    }
    Some(params.hydric_coefficient * hydric_pct / 100.0)
}

/// Estimate land removal over the template.
///
/// Soil units sharing a hydric percentage collapse to one removal class
/// before burning; overlapping classes resolve by per-pixel maximum; cells
/// under no unit default to 0; impervious pixels are suppressed to 0.
pub fn land_removal(
    soil_units: &[SoilUnit],
    impervious: &Raster<f64>,
    template: &RasterTemplate,
    params: &LandRemovalParams,
) -> Result<LandRemoval> {
    // one class per distinct removal value
    let mut classes: HashMap<u64, Vec<&Polygon<f64>>> = HashMap::new();
    for unit in soil_units {
        if let Some(removal) = unit_removal(unit.hydric_pct, params) {
            classes.entry(removal.to_bits()).or_default().push(&unit.geometry);
        }
    }

    let mut burn: Vec<(Polygon<f64>, f64)> = Vec::new();
    for (bits, polys) in classes {
        let removal = f64::from_bits(bits);
        for poly in polys {
            burn.push((poly.clone(), removal));
        }
    }
    burn.sort_by(|a, b| a.1.total_cmp(&b.1));

    let rasterized = burn_polygons_max(&burn, template, 0.0)?;
    let grid = suppress_impervious(&rasterized, impervious)?;
    let regions = dissolve_regions(&grid);

    Ok(LandRemoval { grid, regions })
}

/// Dissolve contiguous equal-removal cells into reporting polygons.
///
/// Regions are 4-connected runs of identical positive removal; each is
/// approximated by the convex hull of its cell corners.
fn dissolve_regions(grid: &Raster<f64>) -> FeatureCollection {
    let (rows, cols) = grid.shape();
    let mut visited = vec![false; rows * cols];
    let mut regions = FeatureCollection::new();

    for start_row in 0..rows {
        for start_col in 0..cols {
            if visited[start_row * cols + start_col] {
                continue;
            }
            let value = unsafe { grid.get_unchecked(start_row, start_col) };
            if value.is_nan() || value <= 0.0 {
                continue;
            }

            // flood-fill one region of this exact value
            let mut cells = Vec::new();
            let mut queue = VecDeque::from([(start_row, start_col)]);
            visited[start_row * cols + start_col] = true;

            while let Some((row, col)) = queue.pop_front() {
                cells.push((row, col));

                let neighbors = [
                    (row.wrapping_sub(1), col),
                    (row + 1, col),
                    (row, col.wrapping_sub(1)),
                    (row, col + 1),
                ];
                for (nr, nc) in neighbors {
                    if nr >= rows || nc >= cols || visited[nr * cols + nc] {
                        continue;
                    }
                    let v = unsafe { grid.get_unchecked(nr, nc) };
                    if v.to_bits() == value.to_bits() {
                        visited[nr * cols + nc] = true;
                        queue.push_back((nr, nc));
                    }
                }
            }

            regions.push(region_feature(grid, &cells, value));
        }
    }

    regions
}

fn region_feature(grid: &Raster<f64>, cells: &[(usize, usize)], value: f64) -> Feature {
    let transform = grid.transform();
    let corners: Vec<Point<f64>> = cells
        .iter()
        .flat_map(|&(row, col)| {
            [
                transform.pixel_to_geo_corner(col, row),
                transform.pixel_to_geo_corner(col + 1, row),
                transform.pixel_to_geo_corner(col, row + 1),
                transform.pixel_to_geo_corner(col + 1, row + 1),
            ]
        })
        .map(|(x, y)| Point::new(x, y))
        .collect();

    let hull = MultiPoint::from(corners).convex_hull();

    Feature::new(Geometry::Polygon(hull))
        .with("removal", AttributeValue::Float(value))
        .with("cells", AttributeValue::Int(cells.len() as i64))
}
