//! Affine georeferencing for removal grids

use serde::{Deserialize, Serialize};

/// Affine transformation between pixel coordinates (col, row) and
/// geographic coordinates (x, y):
///
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// All the grids this library produces are north-up (`row_rotation` and
/// `col_rotation` zero, `pixel_height` negative); the rotation terms exist
/// so foreign transforms can be compared without losing information.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Cell size in the X direction
    pub pixel_width: f64,
    /// Cell size in the Y direction (negative for north-up grids)
    pub pixel_height: f64,
    /// Rotation about the X axis (usually 0)
    pub row_rotation: f64,
    /// Rotation about the Y axis (usually 0)
    pub col_rotation: f64,
}

impl GeoTransform {
    /// Create a north-up transform
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    /// Geographic coordinates of a pixel center
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        let col_f = col as f64 + 0.5;
        let row_f = row as f64 + 0.5;

        let x = self.origin_x + col_f * self.pixel_width + row_f * self.row_rotation;
        let y = self.origin_y + col_f * self.col_rotation + row_f * self.pixel_height;

        (x, y)
    }

    /// Geographic coordinates of a pixel's top-left corner
    pub fn pixel_to_geo_corner(&self, col: usize, row: usize) -> (f64, f64) {
        let col_f = col as f64;
        let row_f = row as f64;

        let x = self.origin_x + col_f * self.pixel_width + row_f * self.row_rotation;
        let y = self.origin_y + col_f * self.col_rotation + row_f * self.pixel_height;

        (x, y)
    }

    /// Fractional pixel coordinates of a geographic point; `.floor()` the
    /// components to get integer indices
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let det = self.pixel_width * self.pixel_height - self.row_rotation * self.col_rotation;

        if det.abs() < 1e-10 {
            // Degenerate transform
            return (f64::NAN, f64::NAN);
        }

        let dx = x - self.origin_x;
        let dy = y - self.origin_y;

        let col = (self.pixel_height * dx - self.row_rotation * dy) / det;
        let row = (-self.col_rotation * dx + self.pixel_width * dy) / det;

        (col, row)
    }

    /// Cell size (assumes square pixels)
    pub fn cell_size(&self) -> f64 {
        self.pixel_width.abs()
    }

    /// Whether two transforms describe the same grid geometry within `eps`.
    ///
    /// Used to decide if a grid is already pixel-aligned with the template
    /// and resampling can be skipped.
    pub fn aligned_with(&self, other: &GeoTransform, eps: f64) -> bool {
        (self.origin_x - other.origin_x).abs() < eps
            && (self.origin_y - other.origin_y).abs() < eps
            && (self.pixel_width - other.pixel_width).abs() < eps
            && (self.pixel_height - other.pixel_height).abs() < eps
            && (self.row_rotation - other.row_rotation).abs() < eps
            && (self.col_rotation - other.col_rotation).abs() < eps
    }

}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}
