//! In-channel stream removal
//!
//! Nitrogen decays exponentially with the time water spends in contact
//! with the channel bed; deeper reaches remove less per minute of travel.
//! Artificial connectors are not real channels and never receive a
//! removal estimate.

use geo_types::{Geometry, LineString};
use nsink_core::{AttributeValue, Feature, FeatureCollection, Raster, RasterTemplate, Result};

use crate::attributes::{ReachDepths, StreamSegment, TravelTimes};
use crate::rasterize::burn_lines_max;

/// Parameters for the stream decay regression
#[derive(Debug, Clone)]
pub struct StreamRemovalParams {
    /// Decay rate coefficient
    pub decay_coefficient: f64,
    /// Exponent on mean reach depth
    pub depth_exponent: f64,
}

impl Default for StreamRemovalParams {
    fn default() -> Self {
        Self {
            decay_coefficient: 0.0513,
            depth_exponent: -1.319,
        }
    }
}

/// Stream estimator output: the removal grid and the per-segment layer
#[derive(Debug, Clone)]
pub struct StreamRemoval {
    pub grid: Raster<f64>,
    pub segments: FeatureCollection,
}

/// Removal fraction for one segment.
///
/// Undefined (None) when depth or travel time is missing or depth is
/// non-positive. Travel times arrive already decoded by
/// [`TravelTimes::minutes`], which never yields a negative value.
pub fn segment_removal(
    depth_m: Option<f64>,
    travel_time_min: Option<f64>,
    params: &StreamRemovalParams,
) -> Option<f64> {
    let depth = depth_m.filter(|d| *d > 0.0)?;
    let time = travel_time_min?;

    let decayed = 1.0 - (-params.decay_coefficient * depth.powf(params.depth_exponent) * time).exp();
    Some(decayed / 100.0)
}

/// Estimate in-channel removal over the template.
///
/// Travel time and depth join onto segments by stream id; unmatched ids
/// carry missing values and produce no removal. The output layer keeps one
/// feature per non-artificial segment, with a null removal where the
/// estimate is undefined.
pub fn stream_removal(
    streams: &[StreamSegment],
    travel_times: &TravelTimes,
    reach_depths: &ReachDepths,
    template: &RasterTemplate,
    params: &StreamRemovalParams,
) -> Result<StreamRemoval> {
    let mut burn: Vec<(LineString<f64>, f64)> = Vec::new();
    let mut segments = FeatureCollection::new();

    for segment in streams {
        if segment.kind.is_artificial() {
            continue;
        }

        let removal = segment_removal(
            reach_depths.meters(segment.id),
            travel_times.minutes(segment.id),
            params,
        );

        if let Some(r) = removal {
            burn.push((segment.geometry.clone(), r));
        }

        segments.push(segment_feature(segment, removal));
    }

    let grid = burn_lines_max(&burn, template, f64::NAN)?;

    Ok(StreamRemoval { grid, segments })
}

pub(crate) fn segment_feature(segment: &StreamSegment, removal: Option<f64>) -> Feature {
    Feature::new(Geometry::LineString(segment.geometry.clone()))
        .with("comid", AttributeValue::Int(segment.id as i64))
        .with(
            "lake_id",
            match segment.lake_id {
                Some(id) => AttributeValue::Int(id as i64),
                None => AttributeValue::Null,
            },
        )
        .with(
            "name",
            match &segment.name {
                Some(name) => AttributeValue::String(name.clone()),
                None => AttributeValue::Null,
            },
        )
        .with(
            "ftype",
            AttributeValue::String(segment.kind.as_str().to_string()),
        )
        .with("removal", AttributeValue::from(removal))
}
