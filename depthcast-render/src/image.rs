//! Depth image output buffers

use serde::{Deserialize, Serialize};

/// Body index recorded for pixels no mesh triangle covers
pub const NO_BODY: i32 = -1;

/// Row-major depth and body-index buffers produced by a render call
///
/// Depths are the distance along the camera's forward axis to the nearest
/// intersected surface; pixels with no intersection hold `f32::INFINITY`
/// and [`NO_BODY`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthImage {
    pub n_rows: usize,
    pub n_cols: usize,
    pub depths: Vec<f32>,
    pub body_indices: Vec<i32>,
}

impl DepthImage {
    /// Create an image with every pixel marked as no-hit
    pub(crate) fn empty(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            depths: vec![f32::INFINITY; n_rows * n_cols],
            body_indices: vec![NO_BODY; n_rows * n_cols],
        }
    }

    /// Get the number of pixels
    pub fn pixel_count(&self) -> usize {
        self.n_rows * self.n_cols
    }

    /// Get the depth at pixel (row, col)
    ///
    /// Panics if the pixel is out of range.
    pub fn depth_at(&self, row: usize, col: usize) -> f32 {
        self.depths[row * self.n_cols + col]
    }

    /// Get the body index at pixel (row, col), [`NO_BODY`] where nothing was hit
    ///
    /// Panics if the pixel is out of range.
    pub fn body_at(&self, row: usize, col: usize) -> i32 {
        self.body_indices[row * self.n_cols + col]
    }
}
