//! Capability traits for depthcast

use crate::point::Vector3d;
use crate::state::MultiBodyState;
use nalgebra::{Matrix3, UnitQuaternion};

/// Per-part pose capability consumed by the renderer
///
/// Any object that can report an orientation and a position for each of its
/// parts can drive a render call; the renderer stays decoupled from the
/// concrete state representation the surrounding filter uses.
pub trait PoseSource {
    /// Number of independently posed parts
    fn part_count(&self) -> usize;

    /// Orientation of part `index` as a unit quaternion
    fn part_orientation(&self, index: usize) -> UnitQuaternion<f64>;

    /// Position of part `index`
    fn part_position(&self, index: usize) -> Vector3d;

    /// Orientation of part `index` as a rotation matrix
    fn part_rotation(&self, index: usize) -> Matrix3<f64> {
        self.part_orientation(index).to_rotation_matrix().into_inner()
    }
}

impl PoseSource for MultiBodyState {
    fn part_count(&self) -> usize {
        self.body_count()
    }

    fn part_orientation(&self, index: usize) -> UnitQuaternion<f64> {
        self.quaternion(index)
    }

    fn part_position(&self, index: usize) -> Vector3d {
        self.position(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_state_is_a_pose_source() {
        let mut state = MultiBodyState::new(2);
        let rotation = UnitQuaternion::from_axis_angle(&Vector3d::x_axis(), 0.9);
        state.set_quaternion(1, &rotation);
        state.position_mut(1).copy_from(&Vector3d::new(0.1, 0.2, 0.3));

        let source: &dyn PoseSource = &state;
        assert_eq!(source.part_count(), 2);
        assert_relative_eq!(
            source.part_rotation(1),
            rotation.to_rotation_matrix().into_inner(),
            epsilon = 1e-12
        );
        assert_relative_eq!(source.part_position(1), Vector3d::new(0.1, 0.2, 0.3));
        assert_relative_eq!(
            source.part_rotation(0),
            Matrix3::identity(),
            epsilon = 1e-12
        );
    }
}
