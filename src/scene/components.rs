use anyhow::{Context, Result};
use std::f64::consts::SQRT_2;

use crate::geom::shape::{Disk, Rectangle, Shape, SphericalCap};
use crate::optics::lens::{LensParams, is_flat};
use crate::optics::surface::{ElementId, SurfaceRole};
use crate::scene::placement::{Frame, Placement};
use crate::{Point, Vector};

/// Thickness of mirrors, beam blocks and their frames.
pub const OBJECT_DEPTH: f64 = 0.1;
/// Width of the opaque frame around a mirror face.
pub const OBJECT_PADDING: f64 = 0.05;

/// Optical component kinds that can be placed in a scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Component {
    Mirror,
    BeamBlock,
    BeamSplitter,
    Lens(LensParams),
}

impl Component {
    pub fn name(&self) -> &'static str {
        match self {
            Component::Mirror => "mirror",
            Component::BeamBlock => "beam block",
            Component::BeamSplitter => "beam splitter",
            Component::Lens(_) => "lens",
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let Component::Lens(params) = self {
            params.validate()?;
        }
        Ok(())
    }

    /// Builds the world-space surfaces of this component.
    pub fn surfaces(&self, placement: &Placement, owner: ElementId) -> Result<Vec<SceneSurface>> {
        placement.validate()?;
        self.validate()?;

        let frame = placement.frame();
        let mut builder = SurfaceBuilder {
            frame: &frame,
            owner,
            out: Vec::new(),
        };
        match self {
            Component::Mirror => builder.mirror(),
            Component::BeamBlock => builder.slab(SurfaceRole::Opaque),
            Component::BeamSplitter => builder.beam_splitter(),
            Component::Lens(params) => builder.lens(params),
        }
        .with_context(|| format!("Failed to build {} surfaces", self.name()))?;

        Ok(builder.out)
    }
}

/// World-space surface with its optical role.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneSurface {
    pub shape: Shape,
    pub role: SurfaceRole,
    pub ior: f64,
    pub owner: ElementId,
    /// Reported normal is the negated geometric normal
    pub flip_normal: bool,
}

struct SurfaceBuilder<'a> {
    frame: &'a Frame,
    owner: ElementId,
    out: Vec<SceneSurface>,
}

impl SurfaceBuilder<'_> {
    fn push(&mut self, shape: Shape, role: SurfaceRole, ior: f64, flip_normal: bool) {
        self.out.push(SceneSurface {
            shape,
            role,
            ior,
            owner: self.owner,
            flip_normal,
        });
    }

    /// Adds a local-space rectangle.
    fn rect(
        &mut self,
        center: Point,
        normal: Vector,
        u_axis: Vector,
        width: f64,
        height: f64,
        role: SurfaceRole,
    ) -> Result<()> {
        let rect = Rectangle::new(
            self.frame.point(center),
            self.frame.direction(normal),
            self.frame.direction(u_axis),
            self.frame.length(width),
            self.frame.length(height),
        )
        .context("Degenerate rectangle")?;
        self.push(Shape::Rectangle(rect), role, 1.0, false);
        Ok(())
    }

    /// Four side walls of a `1 x 1 x depth` box centred at the origin.
    fn side_walls(&mut self, depth: f64, role: SurfaceRole) -> Result<()> {
        let x = Vector::new(1., 0., 0.);
        let y = Vector::new(0., 1., 0.);
        let z = Vector::new(0., 0., 1.);
        self.rect(Point::new(0., 0.5, 0.), y, x, 1., depth, role)?;
        self.rect(Point::new(0., -0.5, 0.), -y, x, 1., depth, role)?;
        self.rect(Point::new(0.5, 0., 0.), x, z, depth, 1., role)?;
        self.rect(Point::new(-0.5, 0., 0.), -x, z, depth, 1., role)?;
        Ok(())
    }

    fn slab(&mut self, role: SurfaceRole) -> Result<()> {
        let x = Vector::new(1., 0., 0.);
        let z = Vector::new(0., 0., 1.);
        let half = OBJECT_DEPTH / 2.;
        self.rect(Point::new(0., 0., half), z, x, 1., 1., role)?;
        self.rect(Point::new(0., 0., -half), -z, x, 1., 1., role)?;
        self.side_walls(OBJECT_DEPTH, role)
    }

    fn mirror(&mut self) -> Result<()> {
        let x = Vector::new(1., 0., 0.);
        let z = Vector::new(0., 0., 1.);
        let half = OBJECT_DEPTH / 2.;
        let p = OBJECT_PADDING;
        let inner = 1. - 2. * p;

        // Mirror faces go first so they win ties against the frame
        for side in [1., -1.] {
            self.rect(Point::new(0., 0., side * half), z * side, x, inner, inner, SurfaceRole::Mirror)?;
        }
        for side in [1., -1.] {
            let zc = side * half;
            let n = z * side;
            let edge = 0.5 - p / 2.;
            self.rect(Point::new(-edge, 0., zc), n, x, p, 1., SurfaceRole::Opaque)?;
            self.rect(Point::new(edge, 0., zc), n, x, p, 1., SurfaceRole::Opaque)?;
            self.rect(Point::new(0., -edge, zc), n, x, 1., p, SurfaceRole::Opaque)?;
            self.rect(Point::new(0., edge, zc), n, x, 1., p, SurfaceRole::Opaque)?;
        }
        self.side_walls(OBJECT_DEPTH, SurfaceRole::Opaque)
    }

    fn beam_splitter(&mut self) -> Result<()> {
        let x = Vector::new(1., 0., 0.);
        let y = Vector::new(0., 1., 0.);
        let z = Vector::new(0., 0., 1.);
        // The splitter goes first so a hit on its edge is not masked by the case
        let normal = Vector::new(-1., -1., 0.) * (1. / SQRT_2);
        self.rect(Point::default(), normal, z, 1., SQRT_2, SurfaceRole::BeamSplitter)?;

        let t = SurfaceRole::Transparent;
        self.rect(Point::new(0., 0., 0.5), z, x, 1., 1., t)?;
        self.rect(Point::new(0., 0., -0.5), -z, x, 1., 1., t)?;
        self.rect(Point::new(0., 0.5, 0.), y, x, 1., 1., t)?;
        self.rect(Point::new(0., -0.5, 0.), -y, x, 1., 1., t)?;
        self.rect(Point::new(0.5, 0., 0.), x, z, 1., 1., t)?;
        self.rect(Point::new(-0.5, 0., 0.), -x, z, 1., 1., t)?;
        Ok(())
    }

    /// Lens faces around the local `y` axis. Reported normals point into the glass.
    ///
    /// The face rims lie in the planes `y = -thickness/2` and `y = +thickness/2`.
    /// Convex faces bulge outward from their rim, concave faces dip into the glass.
    fn lens(&mut self, params: &LensParams) -> Result<()> {
        let y = Vector::new(0., 1., 0.);
        let half_t = params.thickness / 2.;
        let aperture = params.aperture_height / 2.;

        let front = LensFace {
            radius: params.safe_r1(),
            sag: params.front_sag(),
            rim_y: -half_t,
            inward: y,
        };
        let back = LensFace {
            radius: params.safe_r2(),
            sag: params.back_sag(),
            rim_y: half_t,
            inward: -y,
        };
        self.lens_face(&front, aperture, SurfaceRole::LensEntry, params.ior)?;
        self.lens_face(&back, aperture, SurfaceRole::LensExit, params.ior)?;
        Ok(())
    }

    fn lens_face(&mut self, face: &LensFace, aperture: f64, role: SurfaceRole, ior: f64) -> Result<()> {
        let rim_center = Point::new(0., face.rim_y, 0.);
        if is_flat(face.radius) {
            let disk = Disk::new(
                self.frame.point(rim_center),
                self.frame.direction(face.inward),
                self.frame.length(aperture),
            )
            .context("Degenerate lens face")?;
            self.push(Shape::Disk(disk), role, ior, false);
            return Ok(());
        }

        let vertex = rim_center - face.inward * (face.sag * face.radius.signum());
        let center = vertex + face.inward * face.radius;
        let apex_dir = face.inward * (-face.radius.signum());
        let cap = SphericalCap::new(
            self.frame.point(center),
            self.frame.length(face.radius),
            self.frame.direction(apex_dir),
            self.frame.length(aperture),
        )
        .context("Degenerate lens face")?;
        // Convex faces have the sphere center inside the glass
        self.push(Shape::SphericalCap(cap), role, ior, face.radius > 0.);
        Ok(())
    }
}

/// One spherical lens face in the lens frame.
struct LensFace {
    /// Safe radius, positive bulges away from the glass
    radius: f64,
    sag: f64,
    /// Axial position of the rim plane
    rim_y: f64,
    /// Axis direction pointing into the glass
    inward: Vector,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::ray::Ray;

    fn hits(surfaces: &[SceneSurface], ray: &Ray) -> Vec<(usize, f64)> {
        surfaces
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.shape.intersect(ray, 1e-9).map(|(t, _)| (i, t)))
            .collect()
    }

    #[test]
    fn test_mirror_surfaces() -> Result<()> {
        let surfaces = Component::Mirror.surfaces(&Placement::default(), ElementId(3))?;
        assert_eq!(surfaces.len(), 2 + 8 + 4);
        assert!(surfaces.iter().all(|s| s.owner == ElementId(3)));
        let mirrors = surfaces.iter().filter(|s| s.role == SurfaceRole::Mirror).count();
        assert_eq!(mirrors, 2);

        // Through the centre: front mirror face first
        let ray = Ray::new(Point::new(0., 0., 5.), Vector::new(0., 0., -1.)).unwrap();
        let nearest = hits(&surfaces, &ray)
            .into_iter()
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .unwrap();
        assert_eq!(surfaces[nearest.0].role, SurfaceRole::Mirror);
        assert!((nearest.1 - (5. - OBJECT_DEPTH / 2.)).abs() < 1e-9);

        // Through the frame
        let ray = Ray::new(Point::new(0.48, 0., 5.), Vector::new(0., 0., -1.)).unwrap();
        let roles: Vec<_> = hits(&surfaces, &ray).iter().map(|(i, _)| surfaces[*i].role).collect();
        assert!(!roles.is_empty());
        assert!(roles.iter().all(|r| *r == SurfaceRole::Opaque));
        Ok(())
    }

    #[test]
    fn test_beam_block_is_closed() -> Result<()> {
        let surfaces = Component::BeamBlock.surfaces(&Placement::default(), ElementId(0))?;
        assert_eq!(surfaces.len(), 6);
        assert!(surfaces.iter().all(|s| s.role == SurfaceRole::Opaque));
        for dir in [
            Vector::new(1., 0., 0.),
            Vector::new(0., -1., 0.),
            Vector::new(0., 0., 1.),
        ] {
            let ray = Ray::new(Point::new(0., 0., 0.), dir).unwrap();
            assert_eq!(hits(&surfaces, &ray).len(), 1);
        }
        Ok(())
    }

    #[test]
    fn test_beam_splitter_diagonal() -> Result<()> {
        let surfaces = Component::BeamSplitter.surfaces(&Placement::default(), ElementId(0))?;
        assert_eq!(surfaces.len(), 7);
        assert_eq!(surfaces[0].role, SurfaceRole::BeamSplitter);

        // Along +x the splitter plane sits at the cube centre
        let ray = Ray::new(Point::new(-2., 0., 0.), Vector::new(1., 0., 0.)).unwrap();
        let (t, n) = surfaces[0].shape.intersect(&ray, 1e-9).unwrap();
        assert!((t - 2.).abs() < 1e-9);
        assert!((n.dot(Vector::new(1., 1., 0.)).abs() - SQRT_2).abs() < 1e-9);
        // Entry face plus splitter plus exit face
        assert_eq!(hits(&surfaces, &ray).len(), 3);
        Ok(())
    }

    #[test]
    fn test_lens_normals_point_into_glass() -> Result<()> {
        for (r1, r2) in [(0.5, 0.5), (-0.5, -0.5), (0., 0.), (0.5, -0.8)] {
            let params = LensParams {
                r1,
                r2,
                ..LensParams::default()
            };
            let surfaces = Component::Lens(params).surfaces(&Placement::default(), ElementId(1))?;
            assert_eq!(surfaces.len(), 2);
            assert_eq!(surfaces[0].role, SurfaceRole::LensEntry);
            assert_eq!(surfaces[1].role, SurfaceRole::LensExit);

            let ray = Ray::new(Point::new(0., -5., 0.), Vector::new(0., 1., 0.)).unwrap();
            let (_, n) = surfaces[0].shape.intersect(&ray, 1e-9).unwrap();
            let n = if surfaces[0].flip_normal { -n } else { n };
            assert!(n.dy > 0.99, "front normal {n} for r1 = {r1}");

            let ray = Ray::new(Point::new(0., 5., 0.), Vector::new(0., -1., 0.)).unwrap();
            let (_, n) = surfaces[1].shape.intersect(&ray, 1e-9).unwrap();
            let n = if surfaces[1].flip_normal { -n } else { n };
            assert!(n.dy < -0.99, "back normal {n} for r2 = {r2}");
        }
        Ok(())
    }

    #[test]
    fn test_lens_rims_on_thickness_planes() -> Result<()> {
        let ray = Ray::new(Point::new(0., -5., 0.), Vector::new(0., 1., 0.)).unwrap();
        let back_ray = Ray::new(Point::new(0., 5., 0.), Vector::new(0., -1., 0.)).unwrap();

        // Convex faces bulge out of the rim planes
        let params = LensParams::default();
        let surfaces = Component::Lens(params).surfaces(&Placement::default(), ElementId(1))?;
        let (t, _) = surfaces[0].shape.intersect(&ray, 1e-9).unwrap();
        assert!((t - (5. - params.thickness / 2. - params.front_sag())).abs() < 1e-9);
        let (t, _) = surfaces[1].shape.intersect(&back_ray, 1e-9).unwrap();
        assert!((t - (5. - params.thickness / 2. - params.back_sag())).abs() < 1e-9);

        // Concave faces dip into the glass but never meet on the axis
        let params = LensParams {
            r1: -0.3,
            r2: -0.3,
            ..LensParams::default()
        };
        let surfaces = Component::Lens(params).surfaces(&Placement::default(), ElementId(1))?;
        let (t_front, _) = surfaces[0].shape.intersect(&ray, 1e-9).unwrap();
        assert!((t_front - (5. - params.thickness / 2. + params.front_sag())).abs() < 1e-9);
        let (t_back, _) = surfaces[1].shape.intersect(&ray, 1e-9).unwrap();
        assert!(t_back > t_front);
        Ok(())
    }

    #[test]
    fn test_lens_entry_hit_first_across_aperture() -> Result<()> {
        let cases = [
            LensParams::default(),
            LensParams {
                r1: -0.3,
                r2: -0.3,
                ..LensParams::default()
            },
            LensParams {
                r1: 0.26,
                r2: -0.4,
                thickness: 0.02,
                ..LensParams::default()
            },
            LensParams {
                r1: 0.,
                r2: 0.5,
                ..LensParams::default()
            },
        ];
        for params in cases {
            let surfaces = Component::Lens(params).surfaces(&Placement::default(), ElementId(1))?;
            let rim = params.aperture_height / 2.;
            for i in 0..=50 {
                let x = rim * 0.9999 * f64::from(i) / 50.;
                for (origin_y, dir_y, expected) in [(-3., 1., 0), (3., -1., 1)] {
                    let dir = Vector::new(0., dir_y, 0.);
                    let ray = Ray::new(Point::new(x, origin_y, 0.), dir).unwrap();
                    let (idx, _, normal) = surfaces
                        .iter()
                        .enumerate()
                        .filter_map(|(i, s)| s.shape.intersect(&ray, 1e-9).map(|(t, n)| (i, t, n)))
                        .min_by(|a, b| a.1.total_cmp(&b.1))
                        .unwrap();
                    assert_eq!(idx, expected, "x = {x}, {params:?}");
                    // Entering: the reported normal points along the ray
                    let normal = if surfaces[idx].flip_normal { -normal } else { normal };
                    assert!(normal.dot(dir) > 0., "x = {x}, {params:?}");
                }
            }
        }
        Ok(())
    }

    #[test]
    fn test_invalid_lens_rejected() {
        let params = LensParams {
            ior: 0.5,
            ..LensParams::default()
        };
        assert!(Component::Lens(params).surfaces(&Placement::default(), ElementId(0)).is_err());
        assert!(
            Component::Mirror
                .surfaces(&Placement::default().with_scale(-1.), ElementId(0))
                .is_err()
        );
    }
}
