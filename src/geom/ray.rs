//! Ray primitive shared by the shapes and the propagation engine.

use crate::{Point, Vector};

/// A ray defined by an origin point and a direction vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Origin point of the ray
    pub origin: Point,
    /// Unit direction vector
    pub direction: Vector,
}

impl Ray {
    /// Creates a new ray from origin point and direction vector.
    ///
    /// The direction vector is automatically normalized.
    /// Returns `None` if the direction has zero length.
    pub fn new(origin: Point, direction: Vector) -> Option<Self> {
        let direction = direction.normalize()?;
        Some(Self { origin, direction })
    }

    /// Returns the point along the ray at parameter t.
    ///
    /// point = origin + t * direction
    pub fn point_at(&self, t: f64) -> Point {
        self.origin + self.direction * t
    }
}
