//! Lens face curvature safety.
//!
//! Radii of curvature are signed: positive is convex, negative is concave.
//! A face spans a clear aperture of diameter `aperture_height`.

use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};

/// Radius returned for a zero (flat) request.
pub const FLAT_RADIUS: f64 = 1e6;

/// Fraction of the thickness kept in reserve when limiting concave sag.
pub const THICKNESS_MARGIN: f64 = 0.01;

/// Floor applied to the thickness so the concave limit stays finite.
const MIN_THICKNESS: f64 = 1e-9;

/// Sagittal depth of a spherical cap of radius `r` spanning aperture `h`.
///
/// `sag(r, h) = |r| - sqrt(r^2 - h^2 / 4)`. The radicand is clamped at zero,
/// so a radius smaller than the half aperture reports a full hemisphere.
pub fn sagittal_depth(radius: f64, aperture_height: f64) -> f64 {
    let r = radius.abs();
    r - (r * r - aperture_height * aperture_height / 4.).max(0.).sqrt()
}

/// Returns `true` when the radius stands for a flat face.
pub fn is_flat(radius: f64) -> bool {
    radius.abs() >= FLAT_RADIUS
}

/// Clamps a requested radius of curvature so the face geometry stays valid.
///
/// - zero maps to [`FLAT_RADIUS`];
/// - the magnitude is raised to at least `aperture_height / 2`;
/// - a concave face whose sag would exceed half the (margined) thickness is
///   replaced by the concave radius whose sag is exactly that half thickness.
pub fn safe_radius(requested: f64, aperture_height: f64, thickness: f64) -> f64 {
    if requested == 0. {
        return FLAT_RADIUS;
    }
    let half_aperture = aperture_height.abs() / 2.;
    let mag = requested.abs().max(half_aperture);
    if requested > 0. {
        return mag;
    }

    let t = (thickness * (1. - THICKNESS_MARGIN)).max(MIN_THICKNESS);
    if sagittal_depth(mag, aperture_height) > t / 2. {
        -(aperture_height * aperture_height / (4. * t) + t / 4.)
    } else {
        -mag
    }
}

/// Shape parameters of a two-faced spherical lens.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LensParams {
    /// Front face radius (positive = convex)
    pub r1: f64,
    /// Back face radius (positive = convex)
    pub r2: f64,
    /// Clear aperture diameter
    pub aperture_height: f64,
    /// On-axis thickness
    pub thickness: f64,
    /// Index of refraction of the glass
    pub ior: f64,
}

impl LensParams {
    pub fn new() -> Self {
        Self {
            r1: 0.5,
            r2: 0.5,
            aperture_height: 0.5,
            thickness: 0.1,
            ior: 1.6,
        }
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.r1.is_finite() && self.r2.is_finite(),
            "Lens radii must be finite (r1={}, r2={})",
            self.r1,
            self.r2
        );
        ensure!(
            self.aperture_height.is_finite() && self.aperture_height > 0.,
            "Lens aperture height must be positive, got {}",
            self.aperture_height
        );
        ensure!(
            self.thickness.is_finite() && self.thickness > 0.,
            "Lens thickness must be positive, got {}",
            self.thickness
        );
        ensure!(
            self.ior.is_finite() && self.ior >= 1.,
            "Lens index of refraction must be >= 1.0, got {}",
            self.ior
        );
        Ok(())
    }

    pub fn safe_r1(&self) -> f64 {
        safe_radius(self.r1, self.aperture_height, self.thickness)
    }

    pub fn safe_r2(&self) -> f64 {
        safe_radius(self.r2, self.aperture_height, self.thickness)
    }

    pub fn front_sag(&self) -> f64 {
        face_sag(self.safe_r1(), self.aperture_height)
    }

    pub fn back_sag(&self) -> f64 {
        face_sag(self.safe_r2(), self.aperture_height)
    }
}

impl Default for LensParams {
    fn default() -> Self {
        Self::new()
    }
}

fn face_sag(radius: f64, aperture_height: f64) -> f64 {
    if is_flat(radius) {
        0.
    } else {
        sagittal_depth(radius, aperture_height)
    }
}
