//! Watershed nitrogen removal estimation
//!
//! Estimates where and how strongly a watershed removes nitrogen in
//! transit, from three independent sinks: hydric soils on land, contact
//! with the channel bed in streams, and settling in lakes. The three
//! estimators each produce a removal grid and a vector layer; the combine
//! pipeline merges the grids into one magnitude surface and one matching
//! type surface under a fixed stream > lake > land precedence.
//!
//! ```no_run
//! use nsink_removal::{estimate_removal, InputBundle};
//! # fn bundle() -> InputBundle { unimplemented!() }
//!
//! let output = estimate_removal(&bundle())?;
//! let stats = output.surface.removal.statistics();
//! # Ok::<(), nsink_core::Error>(())
//! ```

pub mod attributes;
pub mod bundle;
pub mod combine;
pub mod estimators;
pub(crate) mod maybe_rayon;
pub mod raster_ops;
pub mod rasterize;

pub use attributes::{
    Lake, LakeDepths, ReachDepths, SegmentKind, SoilUnit, StreamSegment, TravelTimes,
};
pub use bundle::{InputBundle, InputBundleBuilder};
pub use combine::{
    classify_removal, merge_removal, RemovalClass, RemovalSource, CLASS_NODATA, PRECEDENCE,
};
pub use estimators::{
    lake_removal, land_removal, stream_removal, LakeRemovalParams, LandRemovalParams,
    StreamRemovalParams,
};

use nsink_core::{FeatureCollection, Raster, Result};

/// Parameters for all three estimators
#[derive(Debug, Clone, Default)]
pub struct RemovalParams {
    pub land: LandRemovalParams,
    pub stream: StreamRemovalParams,
    pub lake: LakeRemovalParams,
}

/// The paired output surfaces: removal magnitude and removal type.
///
/// The two grids agree cell for cell: nodata in one is nodata in the
/// other, and a cell classified `None` always carries magnitude 0.
#[derive(Debug, Clone)]
pub struct RemovalSurface {
    pub removal: Raster<f64>,
    pub class: Raster<u8>,
}

/// Full output of one removal computation
#[derive(Debug, Clone)]
pub struct RemovalOutput {
    pub surface: RemovalSurface,
    /// Dissolved land regions with their removal fraction
    pub land_regions: FeatureCollection,
    /// Per-segment layer: channel segments with in-channel removal, plus
    /// lake flow paths carrying their lake's removal and residence time
    pub flowlines: FeatureCollection,
}

/// Run the full removal computation with default parameters.
pub fn estimate_removal(bundle: &InputBundle) -> Result<RemovalOutput> {
    estimate_removal_with(bundle, &RemovalParams::default())
}

/// Run the full removal computation.
///
/// The three estimators are independent and run as a parallel fan-out;
/// the magnitude merge and the type classification then run over the same
/// three grids through the same pipeline.
pub fn estimate_removal_with(bundle: &InputBundle, params: &RemovalParams) -> Result<RemovalOutput> {
    let (land, (stream, lake)) = maybe_rayon::join(
        || {
            land_removal(
                &bundle.soil_units,
                &bundle.impervious,
                &bundle.template,
                &params.land,
            )
        },
        || {
            maybe_rayon::join(
                || {
                    stream_removal(
                        &bundle.streams,
                        &bundle.travel_times,
                        &bundle.reach_depths,
                        &bundle.template,
                        &params.stream,
                    )
                },
                || {
                    lake_removal(
                        &bundle.streams,
                        &bundle.lakes,
                        &bundle.travel_times,
                        &bundle.lake_depths,
                        &bundle.template,
                        &params.lake,
                    )
                },
            )
        },
    );
    let (land, stream, lake) = (land?, stream?, lake?);

    let (removal, class) = maybe_rayon::join(
        || {
            merge_removal(
                &land.grid,
                &stream.grid,
                &lake.grid,
                &bundle.template,
                &bundle.boundary,
            )
        },
        || {
            classify_removal(
                &land.grid,
                &stream.grid,
                &lake.grid,
                &bundle.template,
                &bundle.boundary,
            )
        },
    );

    let mut flowlines = stream.segments;
    flowlines.extend(lake.flowlines);

    Ok(RemovalOutput {
        surface: RemovalSurface {
            removal: removal?,
            class: class?,
        },
        land_regions: land.regions,
        flowlines,
    })
}

pub mod prelude {
    pub use crate::attributes::{
        Lake, LakeDepths, ReachDepths, SegmentKind, SoilUnit, StreamSegment, TravelTimes,
    };
    pub use crate::bundle::{InputBundle, InputBundleBuilder};
    pub use crate::combine::{RemovalClass, RemovalSource, CLASS_NODATA, PRECEDENCE};
    pub use crate::{
        estimate_removal, estimate_removal_with, RemovalOutput, RemovalParams, RemovalSurface,
    };
    pub use nsink_core::prelude::*;
}
