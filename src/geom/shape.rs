//! Intersectable surface patches.
//!
//! Every shape reports the ray parameter `t` of the nearest intersection
//! with `t > t_min` together with the geometric normal at that point. The
//! normal orientation is a property of the shape (rectangle and disk: the
//! stored normal; spherical cap: pointing away from the sphere center),
//! not of the ray.

use crate::geom::ray::Ray;
use crate::{Point, Vector};

/// Rays closer to parallel than this are treated as missing a plane.
const PARALLEL_TOL: f64 = 1e-12;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rectangle {
    pub center: Point,
    /// Unit normal
    pub normal: Vector,
    /// Unit in-plane axis, perpendicular to `normal`
    pub u_axis: Vector,
    pub half_u: f64,
    pub half_v: f64,
}

impl Rectangle {
    /// Creates a rectangle with sides `width` along `u_axis` and `height` along `normal x u_axis`.
    ///
    /// `u_axis` is made orthogonal to `normal`. Returns `None` for degenerate axes.
    pub fn new(center: Point, normal: Vector, u_axis: Vector, width: f64, height: f64) -> Option<Self> {
        let normal = normal.normalize()?;
        let u_axis = (u_axis - normal * u_axis.dot(normal)).normalize()?;
        Some(Self {
            center,
            normal,
            u_axis,
            half_u: width.abs() / 2.,
            half_v: height.abs() / 2.,
        })
    }

    pub fn v_axis(&self) -> Vector {
        self.normal.cross(self.u_axis)
    }

    pub fn intersect(&self, ray: &Ray, t_min: f64) -> Option<(f64, Vector)> {
        let t = intersect_plane(ray, self.center, self.normal, t_min)?;
        let local = ray.point_at(t) - self.center;
        if local.dot(self.u_axis).abs() <= self.half_u && local.dot(self.v_axis()).abs() <= self.half_v
        {
            Some((t, self.normal))
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disk {
    pub center: Point,
    /// Unit normal
    pub normal: Vector,
    pub radius: f64,
}

impl Disk {
    pub fn new(center: Point, normal: Vector, radius: f64) -> Option<Self> {
        Some(Self {
            center,
            normal: normal.normalize()?,
            radius: radius.abs(),
        })
    }

    pub fn intersect(&self, ray: &Ray, t_min: f64) -> Option<(f64, Vector)> {
        let t = intersect_plane(ray, self.center, self.normal, t_min)?;
        let local = ray.point_at(t) - self.center;
        if local.dot(local) <= self.radius * self.radius {
            Some((t, self.normal))
        } else {
            None
        }
    }
}

/// Part of a sphere around the apex direction, limited by the aperture radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphericalCap {
    pub center: Point,
    pub radius: f64,
    /// Unit vector from the sphere center towards the cap vertex
    pub apex_dir: Vector,
    /// Distance from the cap axis to the rim
    pub aperture_radius: f64,
}

impl SphericalCap {
    pub fn new(center: Point, radius: f64, apex_dir: Vector, aperture_radius: f64) -> Option<Self> {
        Some(Self {
            center,
            radius: radius.abs(),
            apex_dir: apex_dir.normalize()?,
            aperture_radius: aperture_radius.abs(),
        })
    }

    /// Vertex of the cap (point on the axis).
    pub fn vertex(&self) -> Point {
        self.center + self.apex_dir * self.radius
    }

    fn contains(&self, pt: Point) -> bool {
        let w = pt - self.center;
        let axial = w.dot(self.apex_dir);
        if axial <= 0. {
            return false;
        }
        let lateral_sq = w.dot(w) - axial * axial;
        lateral_sq <= self.aperture_radius * self.aperture_radius
    }

    pub fn intersect(&self, ray: &Ray, t_min: f64) -> Option<(f64, Vector)> {
        // |o + t d - c|^2 = r^2 with |d| = 1
        let w = ray.origin - self.center;
        let b = w.dot(ray.direction);
        let c = w.dot(w) - self.radius * self.radius;
        let disc = b * b - c;
        if disc < 0. {
            return None;
        }
        let sq = disc.sqrt();
        for t in [-b - sq, -b + sq] {
            if t <= t_min {
                continue;
            }
            let pt = ray.point_at(t);
            if self.contains(pt) {
                let normal = (pt - self.center).normalize()?;
                return Some((t, normal));
            }
        }
        None
    }
}

/// A surface patch in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    Rectangle(Rectangle),
    Disk(Disk),
    SphericalCap(SphericalCap),
}

impl Shape {
    pub fn intersect(&self, ray: &Ray, t_min: f64) -> Option<(f64, Vector)> {
        match self {
            Shape::Rectangle(r) => r.intersect(ray, t_min),
            Shape::Disk(d) => d.intersect(ray, t_min),
            Shape::SphericalCap(s) => s.intersect(ray, t_min),
        }
    }
}

fn intersect_plane(ray: &Ray, center: Point, normal: Vector, t_min: f64) -> Option<f64> {
    let denom = normal.dot(ray.direction);
    if denom.abs() < PARALLEL_TOL {
        return None; // Ray parallel to plane
    }
    let t = normal.dot(center - ray.origin) / denom;
    if t > t_min { Some(t) } else { None }
}
