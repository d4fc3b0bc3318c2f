//! Coordinate reference system identification
//!
//! The removal core never reprojects. It only has to verify that every grid
//! and feature layer it combines agrees on a CRS, so an authority/code pair
//! is all that is stored; projection math belongs to the data-preparation
//! tooling upstream.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A coordinate reference system identifier (e.g. `EPSG:5070`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Crs {
    authority: String,
    code: u32,
}

impl Crs {
    /// Create a CRS from an arbitrary authority and code
    pub fn new(authority: impl Into<String>, code: u32) -> Self {
        Self {
            authority: authority.into(),
            code,
        }
    }

    /// Create an EPSG-authority CRS
    pub fn epsg(code: u32) -> Self {
        Self::new("EPSG", code)
    }

    pub fn authority(&self) -> &str {
        &self.authority
    }

    pub fn code(&self) -> u32 {
        self.code
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.authority, self.code)
    }
}
