//! Canonical multi-body state vector
//!
//! A flat vector of 13 scalars per body in fixed order: position (3),
//! orientation quaternion (4), linear velocity (3), angular velocity (3).
//! The quaternion is stored as (x, y, z, w) with the scalar part last, so
//! the identity rotation is (0, 0, 0, 1). This is the data contract every
//! filter component exchanges with the renderer.

use crate::error::{Error, Result};
use crate::point::Vector3d;
use nalgebra::{
    Const, DVector, Dyn, Matrix3, Matrix4, Quaternion, UnitQuaternion, Vector4, VectorView,
    VectorViewMut, VectorViewMut3, VectorViewMut4, U1,
};
use serde::{Deserialize, Serialize};

/// Number of scalars per body block
pub const BLOCK_SIZE: usize = 13;
/// Offset of the position sub-vector within a body block
pub const POSITION_OFFSET: usize = 0;
/// Length of the position sub-vector
pub const POSITION_LEN: usize = 3;
/// Offset of the orientation quaternion within a body block
pub const ORIENTATION_OFFSET: usize = 3;
/// Length of the orientation quaternion
pub const ORIENTATION_LEN: usize = 4;
/// Offset of the linear velocity sub-vector within a body block
pub const LINEAR_VELOCITY_OFFSET: usize = 7;
/// Length of the linear velocity sub-vector
pub const LINEAR_VELOCITY_LEN: usize = 3;
/// Offset of the angular velocity sub-vector within a body block
pub const ANGULAR_VELOCITY_OFFSET: usize = 10;
/// Length of the angular velocity sub-vector
pub const ANGULAR_VELOCITY_LEN: usize = 3;

/// State of N rigid bodies in the canonical flat layout
///
/// The body count is chosen at construction and fixed afterwards. All
/// per-body accessors panic if the body index is out of range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiBodyState {
    state: DVector<f64>,
}

impl MultiBodyState {
    /// Create a zero state for `body_count` bodies
    ///
    /// Every component is zero except the orientation quaternions, which are
    /// set to the identity rotation.
    pub fn new(body_count: usize) -> Self {
        let mut state = DVector::zeros(body_count * BLOCK_SIZE);
        reset_orientations(&mut state);
        Self { state }
    }

    /// Create a state adopting an existing flat vector
    ///
    /// The body count is inferred as `state.len() / 13`; fails if the length
    /// is not a multiple of 13. Orientation quaternion blocks are reset to
    /// the identity rotation; all other components are adopted verbatim.
    pub fn from_vector(state: DVector<f64>) -> Result<Self> {
        if state.len() % BLOCK_SIZE != 0 {
            return Err(Error::InvalidArgument(format!(
                "state length {} is not a multiple of the per-body block size {}",
                state.len(),
                BLOCK_SIZE
            )));
        }

        let mut state = state;
        reset_orientations(&mut state);
        Ok(Self { state })
    }

    /// Get the number of bodies
    pub fn body_count(&self) -> usize {
        self.state.len() / BLOCK_SIZE
    }

    /// Get the total number of scalars in the state
    pub fn state_size(&self) -> usize {
        self.state.len()
    }

    /// Get the position of body `body`
    pub fn position(&self, body: usize) -> Vector3d {
        self.state
            .fixed_rows::<POSITION_LEN>(self.offset(body, POSITION_OFFSET))
            .into_owned()
    }

    /// Get the raw orientation quaternion coefficients (x, y, z, w) of body `body`
    pub fn orientation(&self, body: usize) -> Vector4<f64> {
        self.state
            .fixed_rows::<ORIENTATION_LEN>(self.offset(body, ORIENTATION_OFFSET))
            .into_owned()
    }

    /// Get the orientation of body `body` as a unit quaternion
    ///
    /// The stored coefficients are normalized on read, so small drift from
    /// external mutation does not leak into rotation extraction. A zero
    /// block reads as the identity rotation.
    pub fn quaternion(&self, body: usize) -> UnitQuaternion<f64> {
        let coefficients = self.orientation(body);
        let norm = coefficients.norm();
        if norm > 0.0 && norm.is_finite() {
            UnitQuaternion::from_quaternion(Quaternion::from(coefficients))
        } else {
            UnitQuaternion::identity()
        }
    }

    /// Get the orientation of body `body` as a rotation matrix
    pub fn rotation_matrix(&self, body: usize) -> Matrix3<f64> {
        self.quaternion(body).to_rotation_matrix().into_inner()
    }

    /// Get the pose of body `body` as a homogeneous 4x4 matrix
    pub fn homogeneous_matrix(&self, body: usize) -> Matrix4<f64> {
        let mut matrix = Matrix4::identity();
        matrix
            .fixed_view_mut::<3, 3>(0, 0)
            .copy_from(&self.rotation_matrix(body));
        matrix
            .fixed_view_mut::<3, 1>(0, 3)
            .copy_from(&self.position(body));
        matrix
    }

    /// Get the linear velocity of body `body`
    pub fn linear_velocity(&self, body: usize) -> Vector3d {
        self.state
            .fixed_rows::<LINEAR_VELOCITY_LEN>(self.offset(body, LINEAR_VELOCITY_OFFSET))
            .into_owned()
    }

    /// Get the angular velocity of body `body`
    pub fn angular_velocity(&self, body: usize) -> Vector3d {
        self.state
            .fixed_rows::<ANGULAR_VELOCITY_LEN>(self.offset(body, ANGULAR_VELOCITY_OFFSET))
            .into_owned()
    }

    /// Get a mutable view of the position of body `body`
    pub fn position_mut(&mut self, body: usize) -> VectorViewMut3<'_, f64, U1, Dyn> {
        let offset = self.offset(body, POSITION_OFFSET);
        self.state.fixed_rows_mut::<POSITION_LEN>(offset)
    }

    /// Get a mutable view of the raw orientation quaternion of body `body`
    ///
    /// Writes are not renormalized; callers mutating the raw coefficients
    /// own keeping the quaternion unit norm.
    pub fn orientation_mut(&mut self, body: usize) -> VectorViewMut4<'_, f64, U1, Dyn> {
        let offset = self.offset(body, ORIENTATION_OFFSET);
        self.state.fixed_rows_mut::<ORIENTATION_LEN>(offset)
    }

    /// Get a mutable view of the linear velocity of body `body`
    pub fn linear_velocity_mut(&mut self, body: usize) -> VectorViewMut3<'_, f64, U1, Dyn> {
        let offset = self.offset(body, LINEAR_VELOCITY_OFFSET);
        self.state.fixed_rows_mut::<LINEAR_VELOCITY_LEN>(offset)
    }

    /// Get a mutable view of the angular velocity of body `body`
    pub fn angular_velocity_mut(&mut self, body: usize) -> VectorViewMut3<'_, f64, U1, Dyn> {
        let offset = self.offset(body, ANGULAR_VELOCITY_OFFSET);
        self.state.fixed_rows_mut::<ANGULAR_VELOCITY_LEN>(offset)
    }

    /// Set the orientation of body `body` from a unit quaternion
    pub fn set_quaternion(&mut self, body: usize, orientation: &UnitQuaternion<f64>) {
        self.orientation_mut(body).copy_from(orientation.as_vector());
    }

    /// Get the full 13-component block of body `body`
    pub fn body(&self, body: usize) -> VectorView<'_, f64, Const<BLOCK_SIZE>, U1, Dyn> {
        let offset = self.offset(body, 0);
        self.state.fixed_rows::<BLOCK_SIZE>(offset)
    }

    /// Get a mutable view of the full 13-component block of body `body`
    pub fn body_mut(&mut self, body: usize) -> VectorViewMut<'_, f64, Const<BLOCK_SIZE>, U1, Dyn> {
        let offset = self.offset(body, 0);
        self.state.fixed_rows_mut::<BLOCK_SIZE>(offset)
    }

    /// Get the flat state vector
    pub fn as_vector(&self) -> &DVector<f64> {
        &self.state
    }

    /// Consume the state and return the flat vector
    pub fn into_vector(self) -> DVector<f64> {
        self.state
    }

    fn offset(&self, body: usize, field_offset: usize) -> usize {
        assert!(
            body < self.body_count(),
            "body index {} out of range for {} bodies",
            body,
            self.body_count()
        );
        body * BLOCK_SIZE + field_offset
    }
}

fn reset_orientations(state: &mut DVector<f64>) {
    let identity = Vector4::new(0.0, 0.0, 0.0, 1.0);
    for body in 0..state.len() / BLOCK_SIZE {
        state
            .fixed_rows_mut::<ORIENTATION_LEN>(body * BLOCK_SIZE + ORIENTATION_OFFSET)
            .copy_from(&identity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::FRAC_PI_3;

    #[test]
    fn test_state_size_matches_body_count() {
        for body_count in 0..5 {
            let state = MultiBodyState::new(body_count);
            assert_eq!(state.body_count(), body_count);
            assert_eq!(state.state_size(), body_count * BLOCK_SIZE);
        }
    }

    #[test]
    fn test_orientations_are_identity_after_construction() {
        let state = MultiBodyState::new(3);
        for body in 0..3 {
            let q = state.orientation(body);
            assert_relative_eq!(q.norm(), 1.0, epsilon = 1e-12);
            assert_relative_eq!(q, Vector4::new(0.0, 0.0, 0.0, 1.0), epsilon = 1e-12);
            assert_relative_eq!(
                state.rotation_matrix(body),
                Matrix3::identity(),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_from_vector_resets_orientations_only() {
        let raw = DVector::from_iterator(26, (0..26).map(|i| i as f64));
        let state = MultiBodyState::from_vector(raw).unwrap();

        assert_eq!(state.body_count(), 2);
        // positions and velocities adopted verbatim
        assert_relative_eq!(state.position(0), Vector3d::new(0.0, 1.0, 2.0));
        assert_relative_eq!(state.linear_velocity(0), Vector3d::new(7.0, 8.0, 9.0));
        assert_relative_eq!(state.angular_velocity(1), Vector3d::new(23.0, 24.0, 25.0));
        // quaternion blocks reset
        for body in 0..2 {
            assert_relative_eq!(
                state.orientation(body),
                Vector4::new(0.0, 0.0, 0.0, 1.0),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_from_vector_rejects_bad_length() {
        let result = MultiBodyState::from_vector(DVector::zeros(14));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_mutable_views_write_through() {
        let mut state = MultiBodyState::new(2);
        state.position_mut(1).copy_from(&Vector3d::new(1.0, 2.0, 3.0));
        state
            .linear_velocity_mut(0)
            .copy_from(&Vector3d::new(-1.0, 0.5, 0.0));

        assert_relative_eq!(state.position(1), Vector3d::new(1.0, 2.0, 3.0));
        assert_relative_eq!(state.linear_velocity(0), Vector3d::new(-1.0, 0.5, 0.0));
        // the other body is untouched
        assert_relative_eq!(state.position(0), Vector3d::zeros());
    }

    #[test]
    fn test_set_quaternion_round_trip() {
        let mut state = MultiBodyState::new(1);
        let rotation = UnitQuaternion::from_axis_angle(&Vector3d::y_axis(), FRAC_PI_3);
        state.set_quaternion(0, &rotation);

        assert_relative_eq!(
            state.rotation_matrix(0),
            rotation.to_rotation_matrix().into_inner(),
            epsilon = 1e-12
        );
        assert_relative_eq!(state.orientation(0).norm(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_quaternion_read_normalizes_drift() {
        let mut state = MultiBodyState::new(1);
        // scale the identity block away from unit norm
        state.orientation_mut(0).copy_from(&Vector4::new(0.0, 0.0, 0.0, 2.0));

        let q = state.quaternion(0);
        assert_relative_eq!(q.norm(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(state.rotation_matrix(0), Matrix3::identity(), epsilon = 1e-12);
    }

    #[test]
    fn test_zero_orientation_reads_as_identity() {
        let mut state = MultiBodyState::new(1);
        state.orientation_mut(0).copy_from(&Vector4::zeros());

        assert_eq!(state.quaternion(0), UnitQuaternion::identity());
    }

    #[test]
    fn test_body_block_spans_all_components() {
        let mut state = MultiBodyState::new(2);
        state.position_mut(1).copy_from(&Vector3d::new(4.0, 5.0, 6.0));

        let block = state.body(1).into_owned();
        assert_eq!(block.len(), BLOCK_SIZE);
        assert_relative_eq!(block[POSITION_OFFSET], 4.0);
        assert_relative_eq!(block[ORIENTATION_OFFSET + 3], 1.0);

        state.body_mut(0).fill(0.25);
        assert_relative_eq!(state.position(0), Vector3d::new(0.25, 0.25, 0.25));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_read_accessor_panics_out_of_range() {
        let state = MultiBodyState::new(2);
        state.position(2);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_write_accessor_panics_out_of_range() {
        let mut state = MultiBodyState::new(1);
        state.orientation_mut(1);
    }

    #[test]
    fn test_homogeneous_matrix_assembles_pose() {
        let mut state = MultiBodyState::new(1);
        let rotation = UnitQuaternion::from_axis_angle(&Vector3d::z_axis(), 0.4);
        state.set_quaternion(0, &rotation);
        state.position_mut(0).copy_from(&Vector3d::new(1.0, -2.0, 3.0));

        let matrix = state.homogeneous_matrix(0);
        assert_relative_eq!(
            matrix.fixed_view::<3, 3>(0, 0).into_owned(),
            rotation.to_rotation_matrix().into_inner(),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            matrix.fixed_view::<3, 1>(0, 3).into_owned(),
            Vector3d::new(1.0, -2.0, 3.0),
            epsilon = 1e-12
        );
        assert_relative_eq!(matrix[(3, 3)], 1.0);
    }
}
