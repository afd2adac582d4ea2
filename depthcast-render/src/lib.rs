//! Ray-casting depth renderer for posed multi-body meshes
//!
//! This crate turns mesh geometry, camera intrinsics, and per-body poses
//! into depth images: per-pixel distance to the nearest visible surface
//! along the camera's forward axis, optionally annotated with the index of
//! the body that produced each pixel. It is the measurement model of a
//! range-sensor pose tracker: the surrounding filter asks "what would the
//! sensor see for this hypothesis?" many times per step.

pub mod camera;
pub mod image;
pub mod renderer;

mod raycast;

pub use camera::*;
pub use image::*;
pub use renderer::*;
