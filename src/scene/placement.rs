use anyhow::{Result, ensure};
use ndarray as nd;

use crate::geom::rotation::{euler_matrix, rotate_point, rotate_vector};
use crate::{Point, Vector};

/// Position, orientation and size of a component in the world.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub position: Point,
    /// Euler angles in radians, XYZ order
    pub rotation: [f64; 3],
    /// Uniform scale
    pub scale: f64,
}

impl Placement {
    pub fn new(position: Point, rotation: [f64; 3]) -> Self {
        Self {
            position,
            rotation,
            scale: 1.0,
        }
    }

    pub fn at(position: Point) -> Self {
        Self::new(position, [0.; 3])
    }

    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.position.is_finite(),
            "Placement position must be finite, got {}",
            self.position
        );
        ensure!(
            self.rotation.iter().all(|a| a.is_finite()),
            "Placement rotation must be finite, got {:?}",
            self.rotation
        );
        ensure!(
            self.scale.is_finite() && self.scale > 0.,
            "Placement scale must be positive, got {}",
            self.scale
        );
        Ok(())
    }

    /// Local-to-world transform for this placement.
    pub fn frame(&self) -> Frame {
        Frame {
            position: self.position,
            rotation: euler_matrix(self.rotation),
            scale: self.scale,
        }
    }
}

impl Default for Placement {
    fn default() -> Self {
        Self::at(Point::default())
    }
}

/// Precomputed local-to-world transform.
#[derive(Debug, Clone)]
pub struct Frame {
    position: Point,
    rotation: nd::Array2<f64>,
    scale: f64,
}

impl Frame {
    pub fn point(&self, local: Point) -> Point {
        let rotated = rotate_point(local, &self.rotation.view());
        self.position + Vector::new(rotated.x, rotated.y, rotated.z) * self.scale
    }

    /// Rotates a direction; lengths are not scaled.
    pub fn direction(&self, local: Vector) -> Vector {
        rotate_vector(local, &self.rotation.view())
    }

    pub fn length(&self, local: f64) -> f64 {
        local * self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_identity_frame() {
        let frame = Placement::default().frame();
        let p = Point::new(1., 2., 3.);
        assert!(frame.point(p).is_within(&p, 1e-12));
        assert!((frame.length(0.5) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_frame_rotates_scales_and_translates() {
        let placement = Placement::new(Point::new(10., 0., 0.), [FRAC_PI_2, 0., 0.]).with_scale(2.);
        let frame = placement.frame();
        let p = frame.point(Point::new(0., 1., 0.));
        assert!(p.is_within(&Point::new(10., 0., 2.), 1e-12));
        let d = frame.direction(Vector::new(0., 1., 0.));
        assert!(d.is_within(&Vector::new(0., 0., 1.), 1e-12));
    }

    #[test]
    fn test_validate() {
        assert!(Placement::default().validate().is_ok());
        assert!(Placement::default().with_scale(0.).validate().is_err());
        assert!(Placement::at(Point::new(f64::NAN, 0., 0.)).validate().is_err());
        assert!(
            Placement::new(Point::default(), [0., f64::INFINITY, 0.])
                .validate()
                .is_err()
        );
    }
}
