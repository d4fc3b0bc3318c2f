//! End-to-end run over a small synthetic watershed: a hydric soil unit,
//! one estimated channel, and a lake with one inflow, all inside a
//! boundary that clips the right edge of the template.

use approx::assert_relative_eq;
use geo_types::{line_string, polygon, MultiPolygon};
use nsink_core::{Crs, GeoTransform, RasterTemplate};
use nsink_removal::attributes::MINUTES_TO_YEARS;
use nsink_removal::prelude::*;

fn template() -> RasterTemplate {
    RasterTemplate::new(
        12,
        12,
        GeoTransform::new(0.0, 12.0, 1.0, -1.0),
        Crs::epsg(5070),
    )
}

fn bundle() -> InputBundle {
    let t = template();

    // watershed covers x < 10; columns 10 and 11 fall outside
    let boundary = MultiPolygon::new(vec![polygon![
        (x: 0.0, y: 0.0), (x: 10.0, y: 0.0), (x: 10.0, y: 12.0), (x: 0.0, y: 12.0),
    ]]);

    let soil = SoilUnit {
        geometry: polygon![
            (x: 1.0, y: 1.0), (x: 7.0, y: 1.0), (x: 7.0, y: 7.0), (x: 1.0, y: 7.0),
        ],
        hydric_pct: 50.0,
    };

    let channel = StreamSegment {
        id: 1,
        name: Some("Mill Brook".into()),
        kind: SegmentKind::Channel,
        lake_id: None,
        geometry: line_string![(x: 1.5, y: 3.5), (x: 8.5, y: 3.5)],
    };
    let inflow = StreamSegment {
        id: 2,
        name: None,
        kind: SegmentKind::Channel,
        lake_id: Some(10),
        geometry: line_string![(x: 8.5, y: 8.5), (x: 9.5, y: 8.5)],
    };

    let lake = Lake {
        id: 10,
        name: Some("Round Pond".into()),
        geometry: polygon![
            (x: 6.0, y: 6.0), (x: 10.0, y: 6.0), (x: 10.0, y: 10.0), (x: 6.0, y: 10.0),
        ],
    };

    // channel: 100 minutes; inflow: half a year of residence time
    let travel_times: TravelTimes = vec![(1, 100.0), (2, 0.5 / MINUTES_TO_YEARS)]
        .into_iter()
        .collect();
    let reach_depths: ReachDepths = vec![(1, 1.0)].into_iter().collect();
    let lake_depths: LakeDepths = vec![(10, 5.0)].into_iter().collect();

    InputBundle::builder()
        .soil_units(vec![soil])
        .impervious(t.grid(1.0, Some(f64::NAN)))
        .streams(vec![channel, inflow])
        .travel_times(travel_times)
        .reach_depths(reach_depths)
        .lakes(vec![lake])
        .lake_depths(lake_depths)
        .template(t)
        .boundary(boundary)
        .build()
        .unwrap()
}

fn expected_stream() -> f64 {
    (1.0 - (-5.13_f64).exp()) / 100.0
}

// depth 5 m over 0.5 years of residence: ratio 10, removal 45.98%
fn expected_lake() -> f64 {
    (79.24 - 33.26) / 100.0
}

#[test]
fn stream_beats_land_where_both_estimate() {
    let output = estimate_removal(&bundle()).unwrap();

    // cell (8, 3): hydric soil underneath, channel through it
    let merged = output.surface.removal.get(8, 3).unwrap();
    assert_relative_eq!(merged, expected_stream(), epsilon = 1e-12);
    assert!(merged < 0.4, "channel estimate replaces the larger land value");
    assert_eq!(
        output.surface.class.get(8, 3).unwrap(),
        RemovalClass::Stream.code()
    );
}

#[test]
fn lake_beats_land_where_both_estimate() {
    let output = estimate_removal(&bundle()).unwrap();

    // cell (5, 6): soil unit and lake overlap
    assert_relative_eq!(
        output.surface.removal.get(5, 6).unwrap(),
        expected_lake(),
        epsilon = 1e-9
    );
    assert_eq!(
        output.surface.class.get(5, 6).unwrap(),
        RemovalClass::Lake.code()
    );
}

#[test]
fn land_estimate_stands_alone() {
    let output = estimate_removal(&bundle()).unwrap();

    // cell (6, 2): hydric soil only, 0.8 * 50 / 100
    assert_relative_eq!(output.surface.removal.get(6, 2).unwrap(), 0.4);
    assert_eq!(
        output.surface.class.get(6, 2).unwrap(),
        RemovalClass::Hydric.code()
    );
}

#[test]
fn boundary_clips_both_surfaces() {
    let output = estimate_removal(&bundle()).unwrap();

    // inside the boundary with no estimate
    assert_eq!(output.surface.removal.get(0, 0).unwrap(), 0.0);
    assert_eq!(
        output.surface.class.get(0, 0).unwrap(),
        RemovalClass::None.code()
    );

    // outside the boundary
    assert!(output.surface.removal.get(6, 11).unwrap().is_nan());
    assert_eq!(output.surface.class.get(6, 11).unwrap(), CLASS_NODATA);
}

#[test]
fn surfaces_agree_cell_for_cell() {
    let output = estimate_removal(&bundle()).unwrap();
    let (rows, cols) = output.surface.removal.shape();

    for row in 0..rows {
        for col in 0..cols {
            let removal = output.surface.removal.get(row, col).unwrap();
            let class = output.surface.class.get(row, col).unwrap();

            assert_eq!(
                removal.is_nan(),
                class == CLASS_NODATA,
                "nodata disagreement at ({row}, {col})"
            );
            if class == RemovalClass::None.code() {
                assert_eq!(removal, 0.0, "unclassified cell with removal at ({row}, {col})");
            }
            if removal > 0.0 {
                assert_ne!(
                    class,
                    RemovalClass::None.code(),
                    "removal without a source at ({row}, {col})"
                );
            }
        }
    }
}

#[test]
fn repeated_runs_are_bit_identical() {
    let b = bundle();
    let first = estimate_removal(&b).unwrap();
    let second = estimate_removal(&b).unwrap();

    let (rows, cols) = first.surface.removal.shape();
    for row in 0..rows {
        for col in 0..cols {
            let a = first.surface.removal.get(row, col).unwrap();
            let b = second.surface.removal.get(row, col).unwrap();
            assert_eq!(a.to_bits(), b.to_bits(), "magnitude drift at ({row}, {col})");
            assert_eq!(
                first.surface.class.get(row, col).unwrap(),
                second.surface.class.get(row, col).unwrap(),
                "class drift at ({row}, {col})"
            );
        }
    }
}

#[test]
fn vector_layers_cover_all_segments() {
    let output = estimate_removal(&bundle()).unwrap();

    // one dissolved hydric region of 6x6 cells
    assert_eq!(output.land_regions.len(), 1);
    assert_eq!(output.land_regions.features[0].get_f64("removal"), Some(0.4));
    assert_eq!(output.land_regions.features[0].get_i64("cells"), Some(36));

    // both channel segments plus the lake flow path for the inflow
    assert_eq!(output.flowlines.len(), 3);

    let channel = output
        .flowlines
        .iter()
        .find(|f| f.get_i64("comid") == Some(1))
        .unwrap();
    assert_relative_eq!(
        channel.get_f64("removal").unwrap(),
        expected_stream(),
        epsilon = 1e-12
    );

    let flow_path = output
        .flowlines
        .iter()
        .find(|f| f.get_f64("residence_time_years").is_some())
        .unwrap();
    assert_eq!(flow_path.get_i64("comid"), Some(2));
    assert_eq!(flow_path.get_i64("lake_id"), Some(10));
    assert_relative_eq!(
        flow_path.get_f64("removal").unwrap(),
        expected_lake(),
        epsilon = 1e-9
    );
}
