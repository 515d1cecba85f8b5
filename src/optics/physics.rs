//! Reflection and refraction at a single surface.
//!
//! All functions are pure. Normals may point to either side of the surface;
//! the refraction formula orients the normal against the incident direction
//! before applying the vector form of Snell's law.

use crate::Vector;

/// Index of refraction of the surrounding air.
pub const AIR_IOR: f64 = 1.0;

/// Outcome of a refraction attempt at a boundary between two media.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Refraction {
    /// The ray crossed into the second medium.
    Transmitted(Vector),
    /// Incidence beyond the critical angle, the ray stays in the first medium.
    TotallyReflected(Vector),
}

impl Refraction {
    pub fn direction(&self) -> Vector {
        match self {
            Refraction::Transmitted(d) | Refraction::TotallyReflected(d) => *d,
        }
    }

    pub fn is_transmitted(&self) -> bool {
        matches!(self, Refraction::Transmitted(_))
    }
}

/// Perfect specular reflection: `incident - 2 (incident . normal) normal`, normalized.
pub fn reflect(incident: Vector, normal: Vector) -> Vector {
    let reflected = incident - 2.0 * incident.dot(normal) * normal;
    reflected.normalize().unwrap_or(incident)
}

/// Refracts `incident` passing from a medium with index `n1` into one with index `n2`.
///
/// Falls back to reflection when `k = 1 - eta^2 (1 - cos_i^2)` is negative
/// (total internal reflection).
pub fn refract(incident: Vector, normal: Vector, n1: f64, n2: f64) -> Refraction {
    let mut normal = normal;
    let mut cos_i = -normal.dot(incident);
    if cos_i < 0. {
        normal = -normal;
        cos_i = -cos_i;
    }
    let cos_i = cos_i.min(1.0);

    let eta = n1 / n2;
    let k = 1.0 - eta * eta * (1.0 - cos_i * cos_i);
    if k < 0.0 {
        return Refraction::TotallyReflected(reflect(incident, normal));
    }

    let transmitted = incident * eta + normal * (eta * cos_i - k.sqrt());
    Refraction::Transmitted(transmitted.normalize().unwrap_or(incident))
}

/// Outgoing direction at a lens face with index `ior` surrounded by air.
///
/// `is_exiting` selects the media pair: glass to air when true, air to glass
/// otherwise. The normal is negated when exiting so it points back into the
/// medium the ray is leaving.
pub fn interact(incident: Vector, normal: Vector, ior: f64, is_exiting: bool) -> Vector {
    let (n1, n2, normal) = if is_exiting {
        (ior, AIR_IOR, -normal)
    } else {
        (AIR_IOR, ior, normal)
    };
    refract(incident, normal, n1, n2).direction()
}

/// Angle between the surface normal and the travel direction, in degrees.
pub fn incidence_angle_deg(direction: Vector, normal: Vector) -> f64 {
    normal.dot(direction).clamp(-1.0, 1.0).acos().to_degrees()
}

/// Geometric entering/exiting classification: exiting when the angle between
/// the reported normal and the travel direction exceeds 90 degrees.
pub fn is_exiting(direction: Vector, normal: Vector) -> bool {
    incidence_angle_deg(direction, normal) > 90.0
}

/// Critical angle (radians) for light going from `n1` into `n2`.
///
/// Returns `None` when `n1 <= n2` since total internal reflection cannot occur.
pub fn critical_angle(n1: f64, n2: f64) -> Option<f64> {
    if n1 <= n2 {
        None
    } else {
        Some((n2 / n1).asin())
    }
}
