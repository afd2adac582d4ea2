//! Core data structures and contracts for depthcast
//!
//! This crate provides the fundamental types for rendering depth images of
//! posed multi-part rigid bodies: triangle meshes, rigid poses, the canonical
//! multi-body state vector, and the pose-source capability consumed by the
//! renderer.

pub mod error;
pub mod mesh;
pub mod point;
pub mod pose;
pub mod state;
pub mod traits;

pub use error::*;
pub use mesh::*;
pub use point::*;
pub use pose::*;
pub use state::*;
pub use traits::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{DVector, Isometry3, Matrix3, Matrix4, Point3, UnitQuaternion, Vector3, Vector4};
