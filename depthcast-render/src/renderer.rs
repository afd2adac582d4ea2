//! Depth renderer over posed multi-body meshes

use std::sync::Arc;

use depthcast_core::{Error, MeshSet, Point3d, Pose, PoseSource, Result, Vector3d};
use nalgebra::{DVector, Isometry3, Matrix3, RealField};

use crate::camera::CameraIntrinsics;
use crate::image::DepthImage;
use crate::raycast::{self, CameraSpaceTriangle};

/// Renders depth images of a multi-body mesh under its current poses
///
/// The renderer owns a mutable pose per body (identity at construction) and
/// optionally cached camera parameters; the mesh geometry itself is an
/// immutable, reference-counted resource that any number of renderer
/// instances can share. Poses place each body directly in camera space, so
/// a render call composes pose and back-projected pixel rays with nothing
/// in between.
///
/// A single instance is meant to be driven from one thread: mutate poses,
/// then render. For evaluating many pose hypotheses concurrently, give each
/// worker its own renderer over the same `Arc<MeshSet>`.
pub struct DepthRenderer {
    mesh: Arc<MeshSet>,
    poses: Vec<Pose>,
    camera: Option<CameraIntrinsics>,
}

impl DepthRenderer {
    /// Create a renderer with identity poses and no camera parameters
    pub fn new(mesh: Arc<MeshSet>) -> Self {
        let poses = vec![Pose::identity(); mesh.body_count()];
        Self {
            mesh,
            poses,
            camera: None,
        }
    }

    /// Create a renderer with identity poses and cached camera parameters
    pub fn with_camera(mesh: Arc<MeshSet>, camera: CameraIntrinsics) -> Self {
        let mut renderer = Self::new(mesh);
        renderer.camera = Some(camera);
        renderer
    }

    /// Create a renderer directly from per-body vertex and index sequences
    pub fn from_parts(
        vertices: Vec<Vec<Point3d>>,
        indices: Vec<Vec<[usize; 3]>>,
    ) -> Result<Self> {
        Ok(Self::new(Arc::new(MeshSet::new(vertices, indices)?)))
    }

    /// Get the number of bodies
    pub fn body_count(&self) -> usize {
        self.mesh.body_count()
    }

    /// Get the shared mesh geometry
    pub fn mesh(&self) -> &Arc<MeshSet> {
        &self.mesh
    }

    /// Get the cached camera parameters, if any were set
    pub fn camera(&self) -> Option<&CameraIntrinsics> {
        self.camera.as_ref()
    }

    /// Replace the current pose of every body
    ///
    /// Both slices must have length equal to the body count; on failure no
    /// pose is changed.
    pub fn set_poses(
        &mut self,
        rotations: &[Matrix3<f64>],
        translations: &[Vector3d],
    ) -> Result<()> {
        if rotations.len() != self.body_count() || translations.len() != self.body_count() {
            return Err(Error::InvalidArgument(format!(
                "expected {} rotations and translations, got {} and {}",
                self.body_count(),
                rotations.len(),
                translations.len()
            )));
        }

        self.poses = rotations
            .iter()
            .zip(translations)
            .map(|(rotation, translation)| Pose::from_parts(*rotation, *translation))
            .collect();
        Ok(())
    }

    /// Replace the current pose of every body from affine transforms
    pub fn set_pose_transforms(&mut self, transforms: &[Isometry3<f64>]) -> Result<()> {
        if transforms.len() != self.body_count() {
            return Err(Error::InvalidArgument(format!(
                "expected {} pose transforms, got {}",
                self.body_count(),
                transforms.len()
            )));
        }

        self.poses = transforms.iter().map(|iso| Pose::from(*iso)).collect();
        Ok(())
    }

    /// Replace the cached camera parameters used by camera-less render calls
    pub fn set_camera(&mut self, camera: CameraIntrinsics) {
        self.camera = Some(camera);
    }

    /// Get, per body, the vertex positions under the current pose
    pub fn vertices(&self) -> Vec<Vec<Point3d>> {
        self.mesh
            .bodies()
            .iter()
            .zip(&self.poses)
            .map(|(body, pose)| {
                body.vertices()
                    .iter()
                    .map(|vertex| pose.transform_point(vertex))
                    .collect()
            })
            .collect()
    }

    /// Get, per body, the cached center of mass under the current pose
    pub fn centers_of_mass(&self) -> Vec<Point3d> {
        self.mesh
            .bodies()
            .iter()
            .zip(&self.poses)
            .map(|(body, pose)| pose.transform_point(&body.center_of_mass()))
            .collect()
    }

    /// Render depth and body-index buffers with explicit camera parameters
    ///
    /// Does not touch the cached camera parameters.
    pub fn render_with_camera(&self, camera: &CameraIntrinsics) -> DepthImage {
        raycast::cast(&self.camera_space_triangles(), camera)
    }

    /// Render only the depth buffer with explicit camera parameters
    pub fn render_depth_with_camera(&self, camera: &CameraIntrinsics) -> Vec<f32> {
        self.render_with_camera(camera).depths
    }

    /// Render the depth buffer with the cached camera parameters
    ///
    /// Fails if no camera parameters were ever set.
    pub fn render(&self) -> Result<Vec<f32>> {
        let camera = self.camera.as_ref().ok_or(Error::MissingCameraParameters)?;
        Ok(self.render_depth_with_camera(camera))
    }

    /// Set poses from a pose source, then render with the cached camera
    ///
    /// The source's part count must equal the body count.
    pub fn render_state<S: PoseSource>(&mut self, source: &S) -> Result<Vec<f32>> {
        let rotations: Vec<Matrix3<f64>> = (0..source.part_count())
            .map(|part| source.part_rotation(part))
            .collect();
        let translations: Vec<Vector3d> = (0..source.part_count())
            .map(|part| source.part_position(part))
            .collect();

        self.set_poses(&rotations, &translations)?;
        self.render()
    }

    /// Render a pose source into a dense numeric vector
    ///
    /// Non-finite samples (pixels with no intersection) are replaced by
    /// `bad_value`, so the result can feed a likelihood computation
    /// directly. The scalar type picks the output precision.
    pub fn render_state_dense<S, T>(&mut self, source: &S, bad_value: T) -> Result<DVector<T>>
    where
        S: PoseSource,
        T: RealField + Copy + From<f32>,
    {
        let depths = self.render_state(source)?;
        Ok(DVector::from_iterator(
            depths.len(),
            depths.iter().map(|&depth| {
                if depth.is_finite() {
                    T::from(depth)
                } else {
                    bad_value
                }
            }),
        ))
    }

    fn camera_space_triangles(&self) -> Vec<CameraSpaceTriangle> {
        let mut triangles = Vec::with_capacity(self.mesh.triangle_count());
        for (body_index, (body, pose)) in
            self.mesh.bodies().iter().zip(&self.poses).enumerate()
        {
            let posed: Vec<Point3d> = body
                .vertices()
                .iter()
                .map(|vertex| pose.transform_point(vertex))
                .collect();
            for triangle in body.triangles() {
                triangles.push(CameraSpaceTriangle::new(
                    body_index as i32,
                    posed[triangle[0]],
                    posed[triangle[1]],
                    posed[triangle[2]],
                ));
            }
        }
        triangles
    }
}
