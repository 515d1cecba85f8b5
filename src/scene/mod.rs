//! Reference scene: placed components flattened to world-space surfaces.

pub mod components;
pub mod placement;
pub mod presets;

use anyhow::{Result, bail};
use log::debug;

use crate::geom::ray::Ray;
use crate::optics::config::TraceConfig;
use crate::optics::surface::{ElementId, HitRecord, SurfaceQuery};
use crate::optics::trace::{RayTrace, trace};
use crate::uid::UID;
use crate::{Point, Vector};

pub use components::{Component, OBJECT_DEPTH, OBJECT_PADDING, SceneSurface};
pub use placement::{Frame, Placement};

/// Hits closer than this to the query origin are ignored.
pub const T_MIN: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub uid: UID,
    pub component: Component,
    pub placement: Placement,
}

/// Emits a single ray along its local `+y` axis.
#[derive(Debug, Clone, PartialEq)]
pub struct RaySource {
    pub uid: UID,
    pub placement: Placement,
}

impl RaySource {
    pub fn origin(&self) -> Point {
        self.placement.position
    }

    pub fn direction(&self) -> Vector {
        self.placement.frame().direction(Vector::new(0., 1., 0.))
    }
}

#[derive(Debug, Clone, Default)]
pub struct Scene {
    elements: Vec<Element>,
    /// World-space surfaces of all elements, in element order
    surfaces: Vec<SceneSurface>,
    sources: Vec<RaySource>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a component under a fresh random key.
    pub fn add(&mut self, component: Component, placement: Placement) -> Result<UID> {
        let uid = UID::new();
        self.insert(uid.clone(), component, placement)?;
        Ok(uid)
    }

    /// Adds a component under the given key, which must not be in use.
    pub fn insert(&mut self, uid: UID, component: Component, placement: Placement) -> Result<()> {
        if self.contains(&uid) {
            bail!("Key {uid} is already used in the scene");
        }
        let owner = ElementId(self.elements.len());
        let surfaces = component.surfaces(&placement, owner)?;
        debug!(
            "Adding {} {} with {} surfaces",
            component.name(),
            uid,
            surfaces.len()
        );
        self.surfaces.extend(surfaces);
        self.elements.push(Element {
            uid,
            component,
            placement,
        });
        Ok(())
    }

    pub fn get(&self, uid: &UID) -> Option<&Element> {
        self.elements.iter().find(|e| &e.uid == uid)
    }

    /// Moves an element. The scene is left unchanged if the placement is invalid.
    pub fn set_placement(&mut self, uid: &UID, placement: Placement) -> Result<()> {
        let Some(idx) = self.elements.iter().position(|e| &e.uid == uid) else {
            bail!("No element with key {uid}");
        };
        self.elements[idx].component.surfaces(&placement, ElementId(idx))?;
        self.elements[idx].placement = placement;
        self.rebuild()
    }

    pub fn remove(&mut self, uid: &UID) -> Result<Element> {
        let Some(idx) = self.elements.iter().position(|e| &e.uid == uid) else {
            bail!("No element with key {uid}");
        };
        let element = self.elements.remove(idx);
        debug!("Removed {} {}", element.component.name(), uid);
        self.rebuild()?;
        Ok(element)
    }

    /// Number of elements (ray sources are not counted).
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    pub fn surfaces(&self) -> &[SceneSurface] {
        &self.surfaces
    }

    pub fn add_source(&mut self, placement: Placement) -> Result<UID> {
        let uid = UID::new();
        self.insert_source(uid.clone(), placement)?;
        Ok(uid)
    }

    pub fn insert_source(&mut self, uid: UID, placement: Placement) -> Result<()> {
        if self.contains(&uid) {
            bail!("Key {uid} is already used in the scene");
        }
        placement.validate()?;
        debug!("Adding ray source {uid} at {}", placement.position);
        self.sources.push(RaySource { uid, placement });
        Ok(())
    }

    pub fn remove_source(&mut self, uid: &UID) -> Result<RaySource> {
        let Some(idx) = self.sources.iter().position(|s| &s.uid == uid) else {
            bail!("No ray source with key {uid}");
        };
        Ok(self.sources.remove(idx))
    }

    pub fn sources(&self) -> &[RaySource] {
        &self.sources
    }

    /// Traces every ray source through the scene, in insertion order.
    pub fn trace_sources(&self, config: &TraceConfig) -> Vec<(UID, RayTrace)> {
        self.sources
            .iter()
            .map(|source| {
                let result = trace(source.origin(), source.direction(), self, config);
                debug!(
                    "Source {}: {} segments, {} branch ends",
                    source.uid,
                    result.segments.len(),
                    result.ends.len()
                );
                (source.uid.clone(), result)
            })
            .collect()
    }

    fn contains(&self, uid: &UID) -> bool {
        self.elements.iter().any(|e| &e.uid == uid) || self.sources.iter().any(|s| &s.uid == uid)
    }

    /// Recomputes all surfaces so owners match element indices.
    fn rebuild(&mut self) -> Result<()> {
        let mut surfaces = Vec::with_capacity(self.surfaces.len());
        for (idx, element) in self.elements.iter().enumerate() {
            surfaces.extend(element.component.surfaces(&element.placement, ElementId(idx))?);
        }
        self.surfaces = surfaces;
        Ok(())
    }
}

impl SurfaceQuery for Scene {
    fn nearest_hit(&self, origin: Point, direction: Vector) -> Option<HitRecord> {
        let ray = Ray::new(origin, direction)?;

        let mut closest: Option<(f64, Vector, &SceneSurface)> = None;
        for surface in self.surfaces.iter() {
            if let Some((t, normal)) = surface.shape.intersect(&ray, T_MIN) {
                match closest {
                    None => closest = Some((t, normal, surface)),
                    Some((best_t, _, _)) if t < best_t => closest = Some((t, normal, surface)),
                    _ => {}
                }
            }
        }

        let (t, normal, surface) = closest?;
        let normal = if surface.flip_normal { -normal } else { normal };
        Some(
            HitRecord::new(ray.point_at(t), normal, surface.role)
                .with_ior(surface.ior)
                .with_owner(surface.owner),
        )
    }
}
