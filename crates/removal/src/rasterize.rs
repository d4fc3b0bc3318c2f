//! Feature burning onto the template grid
//!
//! Both burns combine overlapping features with a per-pixel maximum, so a
//! cell covered by several removal sources of the same kind keeps the
//! strongest signal. Cells touched by no feature keep the caller's
//! background value (0 for the land grid, NaN for stream and lake grids).

use geo::{BoundingRect, Contains};
use geo_types::{LineString, Point, Polygon, Rect};
use nsink_core::{Raster, RasterTemplate, Result};

use crate::maybe_rayon::*;

/// Burn polygons onto the template, per-pixel maximum over overlaps.
///
/// A cell belongs to a polygon when its center lies inside it.
pub fn burn_polygons_max(
    polygons: &[(Polygon<f64>, f64)],
    template: &RasterTemplate,
    background: f64,
) -> Result<Raster<f64>> {
    let (rows, cols) = template.shape();
    let transform = *template.transform();

    // bbox per polygon, converted to an inclusive pixel range
    let prepared: Vec<(&Polygon<f64>, Rect<f64>, f64)> = polygons
        .iter()
        .filter(|(_, v)| v.is_finite())
        .filter_map(|(p, v)| p.bounding_rect().map(|bb| (p, bb, *v)))
        .collect();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![background; cols];

            for (poly, bbox, value) in &prepared {
                let (_, r_top) = transform.geo_to_pixel(bbox.min().x, bbox.max().y);
                let (_, r_bot) = transform.geo_to_pixel(bbox.max().x, bbox.min().y);
                let row_min = r_top.min(r_bot).floor();
                let row_max = r_top.max(r_bot).ceil();
                if (row as f64) < row_min || (row as f64) > row_max {
                    continue;
                }

                let (c_left, _) = transform.geo_to_pixel(bbox.min().x, bbox.max().y);
                let (c_right, _) = transform.geo_to_pixel(bbox.max().x, bbox.min().y);
                let col_min = c_left.min(c_right).floor().max(0.0) as usize;
                let col_max = (c_left.max(c_right).ceil() as usize).min(cols.saturating_sub(1));

                for col in col_min..=col_max {
                    let (x, y) = transform.pixel_to_geo(col, row);
                    if !poly.contains(&Point::new(x, y)) {
                        continue;
                    }
                    let cur = row_data[col];
                    if cur.is_nan() || *value > cur {
                        row_data[col] = *value;
                    }
                }
            }

            row_data
        })
        .collect();

    into_grid(data, template)
}

/// Burn line features onto the template, per-pixel maximum over overlaps.
///
/// Each segment is walked at half-cell steps; every cell the walk lands in
/// is burned.
pub fn burn_lines_max(
    lines: &[(LineString<f64>, f64)],
    template: &RasterTemplate,
    background: f64,
) -> Result<Raster<f64>> {
    let (rows, cols) = template.shape();
    let transform = *template.transform();
    let step = template.cell_size() * 0.5;

    let mut data = vec![background; rows * cols];

    for (line, value) in lines {
        if !value.is_finite() {
            continue;
        }

        for segment in line.0.windows(2) {
            let (a, b) = (segment[0], segment[1]);
            let length = (b.x - a.x).hypot(b.y - a.y);
            let steps = ((length / step).ceil() as usize).max(1);

            for i in 0..=steps {
                let t = i as f64 / steps as f64;
                let x = a.x + t * (b.x - a.x);
                let y = a.y + t * (b.y - a.y);

                let (cf, rf) = transform.geo_to_pixel(x, y);
                if cf < 0.0 || rf < 0.0 {
                    continue;
                }
                let (col, row) = (cf.floor() as usize, rf.floor() as usize);
                if row >= rows || col >= cols {
                    continue;
                }

                let idx = row * cols + col;
                let cur = data[idx];
                if cur.is_nan() || *value > cur {
                    data[idx] = *value;
                }
            }
        }
    }

    into_grid(data, template)
}

fn into_grid(data: Vec<f64>, template: &RasterTemplate) -> Result<Raster<f64>> {
    let (rows, cols) = template.shape();
    let mut grid = Raster::from_vec(data, rows, cols)?;
    grid.set_transform(*template.transform());
    grid.set_crs(Some(template.crs().clone()));
    grid.set_nodata(Some(f64::NAN));
    Ok(grid)
}
