//! Rigid-body poses

use crate::point::{Point3d, Vector3d};
use nalgebra::{Isometry3, Matrix3, Matrix4, UnitQuaternion};
use serde::{Deserialize, Serialize};

/// A rigid transform placing a body's local geometry into world or camera space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub rotation: Matrix3<f64>,
    pub translation: Vector3d,
}

impl Pose {
    /// Create an identity pose
    pub fn identity() -> Self {
        Self {
            rotation: Matrix3::identity(),
            translation: Vector3d::zeros(),
        }
    }

    /// Create a pose from a rotation matrix and a translation
    pub fn from_parts(rotation: Matrix3<f64>, translation: Vector3d) -> Self {
        Self {
            rotation,
            translation,
        }
    }

    /// Create a pose from a unit quaternion and a translation
    pub fn from_quaternion(orientation: UnitQuaternion<f64>, translation: Vector3d) -> Self {
        Self {
            rotation: orientation.to_rotation_matrix().into_inner(),
            translation,
        }
    }

    /// Apply the pose to a point
    pub fn transform_point(&self, point: &Point3d) -> Point3d {
        self.rotation * point + self.translation
    }

    /// Apply the rotational part of the pose to a vector
    pub fn transform_vector(&self, vector: &Vector3d) -> Vector3d {
        self.rotation * vector
    }

    /// Compose this pose with another, applying `other` first
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            rotation: self.rotation * other.rotation,
            translation: self.rotation * other.translation + self.translation,
        }
    }

    /// Get the inverse pose
    pub fn inverse(&self) -> Self {
        let rotation = self.rotation.transpose();
        Self {
            rotation,
            translation: -(rotation * self.translation),
        }
    }

    /// The pose as a homogeneous 4x4 matrix
    pub fn to_homogeneous(&self) -> Matrix4<f64> {
        let mut matrix = Matrix4::identity();
        matrix.fixed_view_mut::<3, 3>(0, 0).copy_from(&self.rotation);
        matrix.fixed_view_mut::<3, 1>(0, 3).copy_from(&self.translation);
        matrix
    }

    /// Check if this is approximately the identity pose
    pub fn is_identity(&self, epsilon: f64) -> bool {
        (self.rotation - Matrix3::identity()).norm() < epsilon
            && self.translation.norm() < epsilon
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::identity()
    }
}

impl std::ops::Mul for Pose {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        self.compose(&rhs)
    }
}

impl From<Isometry3<f64>> for Pose {
    fn from(isometry: Isometry3<f64>) -> Self {
        Self {
            rotation: isometry.rotation.to_rotation_matrix().into_inner(),
            translation: isometry.translation.vector,
        }
    }
}
