//! Pinhole camera intrinsics and pixel back-projection

use depthcast_core::{Error, Result, Vector3d};
use nalgebra::Matrix3;
use serde::{Deserialize, Serialize};

/// Intrinsic camera matrix plus image resolution
///
/// The inverse matrix is cached at construction so that per-pixel
/// back-projection is a single matrix-vector product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraIntrinsics {
    matrix: Matrix3<f64>,
    inverse: Matrix3<f64>,
    n_rows: usize,
    n_cols: usize,
}

impl CameraIntrinsics {
    /// Create camera parameters from a 3x3 intrinsic matrix and a resolution
    ///
    /// Fails if the matrix is singular, since back-projection needs its
    /// inverse.
    pub fn new(matrix: Matrix3<f64>, n_rows: usize, n_cols: usize) -> Result<Self> {
        let inverse = matrix.try_inverse().ok_or_else(|| {
            Error::InvalidArgument(
                "camera matrix is singular and cannot back-project pixels".to_string(),
            )
        })?;

        Ok(Self {
            matrix,
            inverse,
            n_rows,
            n_cols,
        })
    }

    /// Get the intrinsic matrix
    pub fn matrix(&self) -> &Matrix3<f64> {
        &self.matrix
    }

    /// Get the number of image rows
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Get the number of image columns
    pub fn n_cols(&self) -> usize {
        self.n_cols
    }

    /// Get the number of pixels in the image
    pub fn pixel_count(&self) -> usize {
        self.n_rows * self.n_cols
    }

    /// Camera-space ray direction through pixel (row, col)
    ///
    /// The direction is the unnormalized back-projection K⁻¹ · (col, row, 1),
    /// so for a standard intrinsic matrix its z component is 1 and the ray
    /// parameter equals depth along the camera's forward axis.
    pub fn backproject(&self, row: usize, col: usize) -> Vector3d {
        self.inverse * Vector3d::new(col as f64, row as f64, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_backproject_identity_matrix() {
        let camera = CameraIntrinsics::new(Matrix3::identity(), 4, 6).unwrap();

        assert_relative_eq!(camera.backproject(0, 0), Vector3d::new(0.0, 0.0, 1.0));
        assert_relative_eq!(camera.backproject(2, 5), Vector3d::new(5.0, 2.0, 1.0));
        assert_eq!(camera.pixel_count(), 24);
    }

    #[test]
    fn test_backproject_pinhole_matrix() {
        // fx = fy = 100, principal point at (10, 20)
        let matrix = Matrix3::new(100.0, 0.0, 10.0, 0.0, 100.0, 20.0, 0.0, 0.0, 1.0);
        let camera = CameraIntrinsics::new(matrix, 64, 128).unwrap();

        // the ray through the principal point is the optical axis
        assert_relative_eq!(
            camera.backproject(20, 10),
            Vector3d::new(0.0, 0.0, 1.0),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            camera.backproject(20, 110),
            Vector3d::new(1.0, 0.0, 1.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_singular_matrix_rejected() {
        let result = CameraIntrinsics::new(Matrix3::zeros(), 4, 4);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}
