//! Contract between the propagation engine and whatever owns the scene.

use crate::{Point, Vector};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How a surface responds to an incident ray.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SurfaceRole {
    Mirror,
    LensEntry,
    LensExit,
    BeamSplitter,
    Transparent,
    Opaque,
}

impl SurfaceRole {
    pub fn is_lens(&self) -> bool {
        matches!(self, SurfaceRole::LensEntry | SurfaceRole::LensExit)
    }
}

impl fmt::Display for SurfaceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SurfaceRole::Mirror => "mirror",
            SurfaceRole::LensEntry => "lens entry",
            SurfaceRole::LensExit => "lens exit",
            SurfaceRole::BeamSplitter => "beam splitter",
            SurfaceRole::Transparent => "transparent",
            SurfaceRole::Opaque => "opaque",
        };
        write!(f, "{name}")
    }
}

/// Opaque handle of the element that owns a surface.
///
/// Both faces of a lens share the same owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ElementId(pub usize);

/// Nearest intersection reported by a [`SurfaceQuery`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitRecord {
    pub point: Point,
    /// Unit normal of arbitrary orientation
    pub normal: Vector,
    pub role: SurfaceRole,
    /// Index of refraction, only meaningful for lens roles
    pub ior: f64,
    pub owner: ElementId,
}

impl HitRecord {
    pub fn new(point: Point, normal: Vector, role: SurfaceRole) -> Self {
        Self {
            point,
            normal,
            role,
            ior: 1.0,
            owner: ElementId::default(),
        }
    }

    pub fn with_ior(mut self, ior: f64) -> Self {
        self.ior = ior;
        self
    }

    pub fn with_owner(mut self, owner: ElementId) -> Self {
        self.owner = owner;
        self
    }
}

/// Ray-vs-scene intersection used by the engine.
///
/// Implementations must not report hits behind the origin and should be free
/// of side effects; the engine calls this once per traced segment.
pub trait SurfaceQuery {
    /// Returns the nearest hit along `direction` (unit length) from `origin`.
    fn nearest_hit(&self, origin: Point, direction: Vector) -> Option<HitRecord>;
}

impl<F> SurfaceQuery for F
where
    F: Fn(Point, Vector) -> Option<HitRecord>,
{
    fn nearest_hit(&self, origin: Point, direction: Vector) -> Option<HitRecord> {
        self(origin, direction)
    }
}
