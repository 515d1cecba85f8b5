pub mod point;
pub mod ray;
pub mod rotation;
pub mod shape;
pub mod vector;

/// Geometric precision
pub const EPS: f64 = 1e-12;

