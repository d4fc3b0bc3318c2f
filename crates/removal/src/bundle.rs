//! Validated input bundle
//!
//! The removal core consumes exactly one bundle of already-prepared,
//! already-aligned layers from the data-preparation tooling. Validation is
//! all-or-nothing: a bundle missing any layer fails at build time with the
//! full list of absent keys, and no partial computation ever starts.

use geo_types::MultiPolygon;
use nsink_core::{Error, Raster, RasterTemplate, Result};

use crate::attributes::{Lake, LakeDepths, ReachDepths, SoilUnit, StreamSegment, TravelTimes};

/// The complete, validated set of inputs for one removal computation
#[derive(Debug, Clone)]
pub struct InputBundle {
    pub soil_units: Vec<SoilUnit>,
    pub impervious: Raster<f64>,
    pub streams: Vec<StreamSegment>,
    pub travel_times: TravelTimes,
    pub reach_depths: ReachDepths,
    pub lakes: Vec<Lake>,
    pub lake_depths: LakeDepths,
    pub template: RasterTemplate,
    pub boundary: MultiPolygon<f64>,
}

impl InputBundle {
    pub fn builder() -> InputBundleBuilder {
        InputBundleBuilder::default()
    }
}

/// Builder enforcing the fail-fast input contract.
///
/// Empty collections are valid inputs (a watershed with no lakes is fine);
/// only layers that were never provided count as missing.
#[derive(Debug, Default)]
pub struct InputBundleBuilder {
    soil_units: Option<Vec<SoilUnit>>,
    impervious: Option<Raster<f64>>,
    streams: Option<Vec<StreamSegment>>,
    travel_times: Option<TravelTimes>,
    reach_depths: Option<ReachDepths>,
    lakes: Option<Vec<Lake>>,
    lake_depths: Option<LakeDepths>,
    template: Option<RasterTemplate>,
    boundary: Option<MultiPolygon<f64>>,
}

impl InputBundleBuilder {
    pub fn soil_units(mut self, units: Vec<SoilUnit>) -> Self {
        self.soil_units = Some(units);
        self
    }

    pub fn impervious(mut self, grid: Raster<f64>) -> Self {
        self.impervious = Some(grid);
        self
    }

    pub fn streams(mut self, segments: Vec<StreamSegment>) -> Self {
        self.streams = Some(segments);
        self
    }

    pub fn travel_times(mut self, table: TravelTimes) -> Self {
        self.travel_times = Some(table);
        self
    }

    pub fn reach_depths(mut self, table: ReachDepths) -> Self {
        self.reach_depths = Some(table);
        self
    }

    pub fn lakes(mut self, lakes: Vec<Lake>) -> Self {
        self.lakes = Some(lakes);
        self
    }

    pub fn lake_depths(mut self, table: LakeDepths) -> Self {
        self.lake_depths = Some(table);
        self
    }

    pub fn template(mut self, template: RasterTemplate) -> Self {
        self.template = Some(template);
        self
    }

    pub fn boundary(mut self, boundary: MultiPolygon<f64>) -> Self {
        self.boundary = Some(boundary);
        self
    }

    /// Validate and build; reports every missing layer at once
    pub fn build(self) -> Result<InputBundle> {
        let mut missing = Vec::new();

        if self.soil_units.is_none() {
            missing.push("soil_units");
        }
        if self.impervious.is_none() {
            missing.push("impervious");
        }
        if self.streams.is_none() {
            missing.push("streams");
        }
        if self.travel_times.is_none() {
            missing.push("travel_times");
        }
        if self.reach_depths.is_none() {
            missing.push("reach_depths");
        }
        if self.lakes.is_none() {
            missing.push("lakes");
        }
        if self.lake_depths.is_none() {
            missing.push("lake_depths");
        }
        if self.template.is_none() {
            missing.push("template");
        }
        if self.boundary.is_none() {
            missing.push("boundary");
        }

        match (
            self.soil_units,
            self.impervious,
            self.streams,
            self.travel_times,
            self.reach_depths,
            self.lakes,
            self.lake_depths,
            self.template,
            self.boundary,
        ) {
            (
                Some(soil_units),
                Some(impervious),
                Some(streams),
                Some(travel_times),
                Some(reach_depths),
                Some(lakes),
                Some(lake_depths),
                Some(template),
                Some(boundary),
            ) => Ok(InputBundle {
                soil_units,
                impervious,
                streams,
                travel_times,
                reach_depths,
                lakes,
                lake_depths,
                template,
                boundary,
            }),
            _ => Err(Error::MissingInputs { keys: missing }),
        }
    }
}
