//! Ray/triangle casting kernel

use depthcast_core::{Point3d, Vector3d};
use rayon::prelude::*;

use crate::camera::CameraIntrinsics;
use crate::image::{DepthImage, NO_BODY};

/// Rejection threshold for vanishing intersection determinants
const EPSILON: f64 = 1e-12;

/// A triangle in camera space, tagged with the body it belongs to
pub(crate) struct CameraSpaceTriangle {
    body: i32,
    v0: Point3d,
    edge1: Vector3d,
    edge2: Vector3d,
}

impl CameraSpaceTriangle {
    pub(crate) fn new(body: i32, v0: Point3d, v1: Point3d, v2: Point3d) -> Self {
        Self {
            body,
            v0,
            edge1: v1 - v0,
            edge2: v2 - v0,
        }
    }
}

/// Cast one ray per pixel against every triangle, keeping the nearest hit
///
/// Rays originate at the camera center and pass through the back-projection
/// of each pixel. A hit counts only if it lies inside the triangle and at
/// strictly positive depth along the camera's forward axis. Ties on exactly
/// equal depth go to the first triangle in body-major, declaration order, so
/// repeated casts of the same scene are reproducible. Rows are processed in
/// parallel; per-pixel results are independent of the row schedule.
pub(crate) fn cast(triangles: &[CameraSpaceTriangle], camera: &CameraIntrinsics) -> DepthImage {
    let n_rows = camera.n_rows();
    let n_cols = camera.n_cols();
    let mut image = DepthImage::empty(n_rows, n_cols);
    if n_rows == 0 || n_cols == 0 {
        return image;
    }

    image
        .depths
        .par_chunks_mut(n_cols)
        .zip(image.body_indices.par_chunks_mut(n_cols))
        .enumerate()
        .for_each(|(row, (depth_row, index_row))| {
            for col in 0..n_cols {
                let ray = camera.backproject(row, col);
                let mut nearest_depth = f64::INFINITY;
                let mut nearest_body = NO_BODY;

                for triangle in triangles {
                    if let Some(parameter) = intersect(&ray, triangle) {
                        let depth = parameter * ray.z;
                        if depth > 0.0 && depth < nearest_depth {
                            nearest_depth = depth;
                            nearest_body = triangle.body;
                        }
                    }
                }

                depth_row[col] = nearest_depth as f32;
                index_row[col] = nearest_body;
            }
        });

    image
}

/// Möller–Trumbore ray/triangle intersection for a ray from the origin
///
/// Returns the ray parameter of the hit. Parallel rays and degenerate
/// triangles make the determinant vanish and yield no intersection; hits
/// behind the ray origin are rejected.
fn intersect(ray: &Vector3d, triangle: &CameraSpaceTriangle) -> Option<f64> {
    let p = ray.cross(&triangle.edge2);
    let determinant = triangle.edge1.dot(&p);
    if determinant.abs() < EPSILON {
        return None;
    }
    let inverse_determinant = 1.0 / determinant;

    let origin_offset = -triangle.v0.coords;
    let u = origin_offset.dot(&p) * inverse_determinant;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = origin_offset.cross(&triangle.edge1);
    let v = ray.dot(&q) * inverse_determinant;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let parameter = triangle.edge2.dot(&q) * inverse_determinant;
    if parameter <= 0.0 {
        return None;
    }
    Some(parameter)
}
