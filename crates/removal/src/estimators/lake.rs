//! Lake removal via hydraulic residence time
//!
//! Residence time accumulates from the travel times of every stream
//! segment flowing into a lake; the regression relates removal to the
//! depth/residence-time ratio. Very short residence times push the
//! regression negative; those results are clamped to 0 because the fit
//! extrapolates poorly there, not because removal is truly negative.

use geo_types::Polygon;
use nsink_core::{AttributeValue, FeatureCollection, Raster, RasterTemplate, Result};
use std::collections::HashMap;

use crate::attributes::{Lake, LakeDepths, StreamSegment, TravelTimes, MINUTES_TO_YEARS};
use crate::estimators::stream::segment_feature;
use crate::rasterize::burn_polygons_max;

/// Parameters for the lake removal regression
#[derive(Debug, Clone)]
pub struct LakeRemovalParams {
    /// Regression intercept (percent)
    pub intercept: f64,
    /// Regression slope on log10(mean_depth / residence_time) (percent)
    pub slope: f64,
}

impl Default for LakeRemovalParams {
    fn default() -> Self {
        Self {
            intercept: 79.24,
            slope: 33.26,
        }
    }
}

/// Lake estimator output: the removal grid and the per-segment flow-path layer
#[derive(Debug, Clone)]
pub struct LakeRemoval {
    pub grid: Raster<f64>,
    pub flowlines: FeatureCollection,
}

/// Removal fraction for one lake.
///
/// Undefined (None) when depth or residence time is missing or
/// non-positive; negative regression output clamps to 0.
pub fn lake_regression(
    mean_depth_m: Option<f64>,
    residence_time_years: Option<f64>,
    params: &LakeRemovalParams,
) -> Option<f64> {
    let depth = mean_depth_m.filter(|d| *d > 0.0)?;
    let residence = residence_time_years.filter(|r| *r > 0.0)?;

    let pct = params.intercept - params.slope * (depth / residence).log10();
    Some((pct / 100.0).max(0.0))
}

/// Accumulate residence time per lake from contributing segments.
///
/// A segment contributes when its `lake_id` is set; segments with an
/// unavailable travel time contribute nothing.
pub fn residence_times(
    streams: &[StreamSegment],
    travel_times: &TravelTimes,
) -> HashMap<u64, f64> {
    let mut years: HashMap<u64, f64> = HashMap::new();

    for segment in streams {
        let Some(lake_id) = segment.lake_id else {
            continue;
        };
        if let Some(minutes) = travel_times.minutes(segment.id) {
            *years.entry(lake_id).or_insert(0.0) += minutes * MINUTES_TO_YEARS;
        }
    }

    years
}

/// Estimate lake removal over the template.
///
/// Produces the lake removal grid plus a flow-path layer attributing each
/// lake's removal back to its contributing segments, so downstream tracing
/// can pick up lake removal at the segment passing through it.
pub fn lake_removal(
    streams: &[StreamSegment],
    lakes: &[Lake],
    travel_times: &TravelTimes,
    lake_depths: &LakeDepths,
    template: &RasterTemplate,
    params: &LakeRemovalParams,
) -> Result<LakeRemoval> {
    let residence = residence_times(streams, travel_times);

    let mut removal_by_lake: HashMap<u64, Option<f64>> = HashMap::new();
    let mut burn: Vec<(Polygon<f64>, f64)> = Vec::new();

    for lake in lakes {
        let removal = lake_regression(
            lake_depths.meters(lake.id),
            residence.get(&lake.id).copied(),
            params,
        );
        removal_by_lake.insert(lake.id, removal);

        if let Some(r) = removal {
            burn.push((lake.geometry.clone(), r));
        }
    }

    let grid = burn_polygons_max(&burn, template, f64::NAN)?;

    // flow-path view: contributing segments inherit their lake's removal
    let mut flowlines = FeatureCollection::new();
    for segment in streams {
        let Some(lake_id) = segment.lake_id else {
            continue;
        };
        let removal = removal_by_lake.get(&lake_id).copied().flatten();
        let feature = segment_feature(segment, removal).with(
            "residence_time_years",
            AttributeValue::from(residence.get(&lake_id).copied()),
        );
        flowlines.push(feature);
    }

    Ok(LakeRemoval { grid, flowlines })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::SegmentKind;
    use approx::assert_relative_eq;
    use geo_types::{line_string, polygon};
    use nsink_core::{Crs, GeoTransform};

    fn template() -> RasterTemplate {
        RasterTemplate::new(
            10,
            10,
            GeoTransform::new(0.0, 10.0, 1.0, -1.0),
            Crs::epsg(5070),
        )
    }

    fn lake(id: u64) -> Lake {
        Lake {
            id,
            name: Some("Round Pond".into()),
            geometry: polygon![
                (x: 2.0, y: 2.0), (x: 8.0, y: 2.0), (x: 8.0, y: 8.0), (x: 2.0, y: 8.0),
            ],
        }
    }

    fn inflow(id: u64, lake_id: u64) -> StreamSegment {
        StreamSegment {
            id,
            name: None,
            kind: SegmentKind::Channel,
            lake_id: Some(lake_id),
            geometry: line_string![(x: 2.5, y: 5.5), (x: 7.5, y: 5.5)],
        }
    }

    #[test]
    fn test_regression_value() {
        let p = LakeRemovalParams::default();
        // depth 5 m, residence 0.1 yr: ratio 50, log10 ≈ 1.69897
        let r = lake_regression(Some(5.0), Some(0.1), &p).unwrap();
        let expected = (79.24 - 33.26 * 50.0_f64.log10()) / 100.0;
        assert_relative_eq!(r, expected, epsilon = 1e-12);
        assert!(r > 0.0);
    }

    #[test]
    fn test_negative_regression_clamps_to_zero() {
        let p = LakeRemovalParams::default();
        // depth 5 m, residence 0.01 yr: ratio 500, regression goes negative
        let r = lake_regression(Some(5.0), Some(0.01), &p).unwrap();
        assert_eq!(r, 0.0);
    }

    #[test]
    fn test_missing_or_zero_residence_is_missing() {
        let p = LakeRemovalParams::default();
        assert_eq!(lake_regression(Some(5.0), None, &p), None);
        assert_eq!(lake_regression(Some(5.0), Some(0.0), &p), None);
        assert_eq!(lake_regression(None, Some(0.1), &p), None);
    }

    #[test]
    fn test_residence_accumulation() {
        // two inflows of half a year of minutes each
        let half_year_minutes = 0.5 / MINUTES_TO_YEARS;
        let times: TravelTimes = vec![(1, half_year_minutes), (2, half_year_minutes)]
            .into_iter()
            .collect();
        let streams = vec![inflow(1, 10), inflow(2, 10)];

        let residence = residence_times(&streams, &times);
        assert_relative_eq!(residence[&10], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_negative_travel_time_does_not_contribute() {
        // a dirty negative row decodes to missing, it must not subtract
        // residence time from the valid inflow
        let times: TravelTimes = vec![(1, 1000.0), (2, -500.0)].into_iter().collect();
        let streams = vec![inflow(1, 10), inflow(2, 10)];

        let residence = residence_times(&streams, &times);
        assert_relative_eq!(
            residence[&10],
            1000.0 * MINUTES_TO_YEARS,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_non_lake_segments_do_not_contribute() {
        let times: TravelTimes = vec![(1, 1000.0)].into_iter().collect();
        let mut seg = inflow(1, 10);
        seg.lake_id = None;

        let residence = residence_times(&[seg], &times);
        assert!(residence.is_empty());
    }

    #[test]
    fn test_lake_removal_grid_and_flowlines() {
        // residence 0.1 years
        let minutes = 0.1 / MINUTES_TO_YEARS;
        let times: TravelTimes = vec![(1, minutes)].into_iter().collect();
        let depths: LakeDepths = vec![(10, 5.0)].into_iter().collect();
        let streams = vec![inflow(1, 10)];

        let result = lake_removal(
            &streams,
            &[lake(10)],
            &times,
            &depths,
            &template(),
            &LakeRemovalParams::default(),
        )
        .unwrap();

        let expected = (79.24 - 33.26 * 50.0_f64.log10()) / 100.0;
        assert_relative_eq!(result.grid.get(5, 5).unwrap(), expected, epsilon = 1e-9);
        assert!(result.grid.get(0, 0).unwrap().is_nan());

        assert_eq!(result.flowlines.len(), 1);
        let feature = &result.flowlines.features[0];
        assert_eq!(feature.get_i64("lake_id"), Some(10));
        assert_relative_eq!(
            feature.get_f64("removal").unwrap(),
            expected,
            epsilon = 1e-9
        );
        assert_relative_eq!(
            feature.get_f64("residence_time_years").unwrap(),
            0.1,
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_lake_without_depth_is_missing() {
        let minutes = 0.1 / MINUTES_TO_YEARS;
        let times: TravelTimes = vec![(1, minutes)].into_iter().collect();
        let streams = vec![inflow(1, 10)];

        let result = lake_removal(
            &streams,
            &[lake(10)],
            &times,
            &LakeDepths::new(),
            &template(),
            &LakeRemovalParams::default(),
        )
        .unwrap();

        assert_eq!(result.grid.statistics().valid_count, 0);
        assert!(result.flowlines.features[0].get("removal").unwrap().is_null());
    }
}
