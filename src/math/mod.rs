// src/math/mod.rs
//! Geometry primitives shared by the controller and the collision pass.

pub mod vector;

pub use vector::{clamp_magnitude, distance, Vec3};

/// Magnitudes below this are treated as zero when normalizing or clamping.
pub const EPSILON: f64 = 1e-8;
