//! Core spatial types shared by the generator and its consumers.
//!
//! This crate provides the foundational types used across the workspace:
//! - Transform and its GPU-ready raw form
//! - The vertex layout produced by procedural meshes

pub mod transform;
pub mod vertex;

pub use transform::*;
pub use vertex::*;

// Re-export commonly used types
pub use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
