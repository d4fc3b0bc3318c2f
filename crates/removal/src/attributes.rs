//! Typed hydrography and soils attribute model
//!
//! The upstream data carries magic numbers: a reserved travel-time value
//! for "unavailable" and negative depths for "not measured". Those
//! sentinels are decoded into `Option<f64>` at the table boundary so they
//! can never leak into the regression arithmetic.

use geo_types::{LineString, Polygon};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Reserved travel-time value marking "unavailable" in the hydrography source
pub const TRAVEL_TIME_UNAVAILABLE: f64 = -9999.0;

/// Minutes → years, for residence-time accumulation
pub const MINUTES_TO_YEARS: f64 = 1.0 / (60.0 * 24.0 * 365.25);

/// Categorical stream-segment type.
///
/// Artificial connectors join waterbodies in the hydrography network but do
/// not represent real channel flow; the stream estimator never assigns them
/// a removal value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SegmentKind {
    Channel,
    ArtificialConnector,
}

impl SegmentKind {
    pub fn is_artificial(self) -> bool {
        matches!(self, SegmentKind::ArtificialConnector)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SegmentKind::Channel => "channel",
            SegmentKind::ArtificialConnector => "artificial_connector",
        }
    }
}

/// Soil map unit polygon with its hydric percentage (0–100)
#[derive(Debug, Clone)]
pub struct SoilUnit {
    pub geometry: Polygon<f64>,
    pub hydric_pct: f64,
}

/// A stream segment from the hydrography network
#[derive(Debug, Clone)]
pub struct StreamSegment {
    pub id: u64,
    pub name: Option<String>,
    pub kind: SegmentKind,
    /// Owning lake for inflow/outflow segments; `None` when the segment is
    /// not part of any lake's flow path (0 in the source data)
    pub lake_id: Option<u64>,
    pub geometry: LineString<f64>,
}

/// A lake polygon
#[derive(Debug, Clone)]
pub struct Lake {
    pub id: u64,
    pub name: Option<String>,
    pub geometry: Polygon<f64>,
}

/// Key-indexed attribute lookup with defined join behavior: unmatched keys
/// yield `None`, duplicate keys keep the first value seen.
#[derive(Debug, Clone, Default)]
pub struct AttributeTable {
    values: HashMap<u64, f64>,
}

impl AttributeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value; returns false (and keeps the existing value) when the
    /// key was already present
    pub fn insert(&mut self, key: u64, value: f64) -> bool {
        use std::collections::hash_map::Entry;
        match self.values.entry(key) {
            Entry::Vacant(e) => {
                e.insert(value);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Raw stored value, sentinel and all
    pub fn raw(&self, key: u64) -> Option<f64> {
        self.values.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(u64, f64)> for AttributeTable {
    fn from_iter<I: IntoIterator<Item = (u64, f64)>>(iter: I) -> Self {
        let mut table = Self::new();
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}

/// Travel times keyed by stream id, in minutes
#[derive(Debug, Clone, Default)]
pub struct TravelTimes(AttributeTable);

impl TravelTimes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u64, minutes: f64) -> bool {
        self.0.insert(id, minutes)
    }

    /// Travel time in minutes. The reserved sentinel, any other negative
    /// value, and non-finite values all decode to `None`, so every consumer
    /// of the table sees the same missing rows.
    pub fn minutes(&self, id: u64) -> Option<f64> {
        self.0.raw(id).filter(|t| t.is_finite() && *t >= 0.0)
    }
}

impl FromIterator<(u64, f64)> for TravelTimes {
    fn from_iter<I: IntoIterator<Item = (u64, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Mean reach depths keyed by stream id, in meters
#[derive(Debug, Clone, Default)]
pub struct ReachDepths(AttributeTable);

impl ReachDepths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u64, meters: f64) -> bool {
        self.0.insert(id, meters)
    }

    /// Mean reach depth in meters; non-positive and non-finite values decode
    /// to `None` (the decay regression is undefined there)
    pub fn meters(&self, id: u64) -> Option<f64> {
        self.0.raw(id).filter(|d| d.is_finite() && *d > 0.0)
    }
}

impl FromIterator<(u64, f64)> for ReachDepths {
    fn from_iter<I: IntoIterator<Item = (u64, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Lake mean depths keyed by lake id, in meters
#[derive(Debug, Clone, Default)]
pub struct LakeDepths(AttributeTable);

impl LakeDepths {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: u64, meters: f64) -> bool {
        self.0.insert(id, meters)
    }

    /// Mean lake depth in meters; negative values mean "unavailable" in the
    /// morphometry source and decode to `None`
    pub fn meters(&self, id: u64) -> Option<f64> {
        self.0.raw(id).filter(|d| d.is_finite() && *d > 0.0)
    }
}

impl FromIterator<(u64, f64)> for LakeDepths {
    fn from_iter<I: IntoIterator<Item = (u64, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_keys_first_wins() {
        let mut table = AttributeTable::new();
        assert!(table.insert(7, 1.5));
        assert!(!table.insert(7, 9.9));
        assert_eq!(table.raw(7), Some(1.5));
    }

    #[test]
    fn test_unmatched_key_is_missing() {
        let table = AttributeTable::new();
        assert_eq!(table.raw(1), None);
    }

    #[test]
    fn test_travel_time_sentinel_decodes_to_none() {
        let times: TravelTimes = vec![(1, 120.0), (2, TRAVEL_TIME_UNAVAILABLE)]
            .into_iter()
            .collect();

        assert_eq!(times.minutes(1), Some(120.0));
        assert_eq!(times.minutes(2), None);
        assert_eq!(times.minutes(3), None);
    }

    #[test]
    fn test_travel_time_negative_decodes_to_none() {
        let times: TravelTimes = vec![(1, -500.0), (2, 0.0)].into_iter().collect();

        assert_eq!(times.minutes(1), None);
        assert_eq!(times.minutes(2), Some(0.0));
    }

    #[test]
    fn test_reach_depth_rejects_nonpositive() {
        let depths: ReachDepths = vec![(1, 2.5), (2, 0.0), (3, -1.0)].into_iter().collect();

        assert_eq!(depths.meters(1), Some(2.5));
        assert_eq!(depths.meters(2), None);
        assert_eq!(depths.meters(3), None);
    }

    #[test]
    fn test_lake_depth_negative_is_missing() {
        let depths: LakeDepths = vec![(10, 4.0), (11, -9998.0)].into_iter().collect();

        assert_eq!(depths.meters(10), Some(4.0));
        assert_eq!(depths.meters(11), None);
    }

    #[test]
    fn test_minutes_to_years_constant() {
        // one year of minutes should accumulate to one year
        let year_minutes = 60.0 * 24.0 * 365.25;
        assert!((year_minutes * MINUTES_TO_YEARS - 1.0).abs() < 1e-12);
    }
}
