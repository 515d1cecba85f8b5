//! Ray propagation engine.
//!
//! A traced ray forms a tree: mirrors and lens faces continue a branch,
//! beam splitters fork it in two, opaque surfaces end it. The tree is walked
//! depth-first with an explicit stack (transmitted branch before reflected
//! branch) and flattened into an ordered list of segments.

use log::{debug, trace as trace_log, warn};

use crate::optics::config::{ArrowConfig, MediumTracking, TraceConfig};
use crate::optics::physics::{AIR_IOR, interact, is_exiting, reflect, refract};
use crate::optics::surface::{ElementId, HitRecord, SurfaceQuery, SurfaceRole};
use crate::{Point, Vector};

/// Arrow-head marker for drawing the travel direction of a segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrow {
    /// Tail of the arrow
    pub position: Point,
    /// Unit direction the arrow points to
    pub direction: Vector,
}

/// A drawn piece of a ray path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
    /// Number of interactions before this segment (0 for the source segment)
    pub depth: usize,
    pub arrow: Option<Arrow>,
}

impl Segment {
    pub fn length(&self) -> f64 {
        self.start.distance(&self.end)
    }

    pub fn direction(&self) -> Option<Vector> {
        (self.end - self.start).normalize()
    }
}

/// Why a branch stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Termination {
    /// Nothing was hit, the last segment runs off to "infinity".
    Escaped,
    /// Stopped by an opaque surface.
    Absorbed,
    /// The branch bounced more than `max_depth` times.
    DepthExceeded,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchEnd {
    pub point: Point,
    pub depth: usize,
    pub termination: Termination,
}

/// Output of one propagation call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RayTrace {
    pub segments: Vec<Segment>,
    /// One entry per finished branch, in the order the branches finished
    pub ends: Vec<BranchEnd>,
}

impl RayTrace {
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of branches that finished with `termination`.
    pub fn count(&self, termination: Termination) -> usize {
        self.ends
            .iter()
            .filter(|end| end.termination == termination)
            .count()
    }

    /// Deepest segment depth in the trace.
    pub fn max_depth(&self) -> usize {
        self.segments.iter().map(|s| s.depth).max().unwrap_or(0)
    }
}

/// A lens the branch is currently inside.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Medium {
    owner: ElementId,
    ior: f64,
}

#[derive(Debug, Clone)]
struct Branch {
    origin: Point,
    direction: Vector,
    depth: usize,
    /// Only populated with `MediumTracking::Explicit`
    media: Vec<Medium>,
}

impl Branch {
    fn spawn(&self, hit_point: Point, direction: Vector, media: Vec<Medium>, epsilon: f64) -> Self {
        Self {
            origin: hit_point + direction * epsilon,
            direction,
            depth: self.depth + 1,
            media,
        }
    }
}

/// Traces a ray and returns only the drawn segments.
pub fn propagate<Q>(origin: Point, direction: Vector, query: &Q, max_depth: usize) -> Vec<Segment>
where
    Q: SurfaceQuery + ?Sized,
{
    let config = TraceConfig::new().with_max_depth(max_depth);
    trace(origin, direction, query, &config).segments
}

/// Traces a ray through the surfaces reported by `query`.
///
/// `direction` is normalized internally. A zero-length direction gives an
/// empty trace.
pub fn trace<Q>(origin: Point, direction: Vector, query: &Q, config: &TraceConfig) -> RayTrace
where
    Q: SurfaceQuery + ?Sized,
{
    let mut result = RayTrace::default();
    let Some(direction) = direction.normalize() else {
        warn!("Cannot trace a ray from {origin} with direction {direction}");
        return result;
    };
    debug_assert!(origin.is_finite(), "ray origin must be finite");

    let mut stack = vec![Branch {
        origin,
        direction,
        depth: 0,
        media: Vec::new(),
    }];

    while let Some(branch) = stack.pop() {
        if branch.depth > config.max_depth {
            debug!(
                "Branch exceeded max depth {} at {:.3}",
                config.max_depth, branch.origin
            );
            result.ends.push(BranchEnd {
                point: branch.origin,
                depth: branch.depth,
                termination: Termination::DepthExceeded,
            });
            continue;
        }

        let Some(hit) = query.nearest_hit(branch.origin, branch.direction) else {
            let end = branch.origin + branch.direction * config.escape_length;
            result.segments.push(Segment {
                start: branch.origin,
                end,
                depth: branch.depth,
                arrow: escape_arrow(branch.origin, branch.direction, &config.arrows),
            });
            result.ends.push(BranchEnd {
                point: end,
                depth: branch.depth,
                termination: Termination::Escaped,
            });
            continue;
        };

        trace_log!(
            "depth {}: hit {} surface at {:.3}",
            branch.depth,
            hit.role,
            hit.point
        );
        result.segments.push(Segment {
            start: branch.origin,
            end: hit.point,
            depth: branch.depth,
            arrow: hit_arrow(branch.origin, hit.point, &config.arrows),
        });

        let continuations = interact_with(&branch, &hit, config);
        if continuations.is_empty() {
            result.ends.push(BranchEnd {
                point: hit.point,
                depth: branch.depth,
                termination: Termination::Absorbed,
            });
        }
        // Reversed so the first continuation is popped first
        stack.extend(continuations.into_iter().rev());
    }

    debug!(
        "Traced ray from {:.3}: {} segments, {} escaped, {} absorbed, {} cut at depth limit",
        origin,
        result.segments.len(),
        result.count(Termination::Escaped),
        result.count(Termination::Absorbed),
        result.count(Termination::DepthExceeded)
    );
    result
}

/// Continuation rays spawned by `branch` at `hit`, transmitted before reflected.
fn interact_with(branch: &Branch, hit: &HitRecord, config: &TraceConfig) -> Vec<Branch> {
    let incident = branch.direction;
    let eps = config.epsilon;

    let Some(normal) = hit.normal.normalize() else {
        trace_log!("Degenerate normal at {:.3}, passing through", hit.point);
        return vec![branch.spawn(hit.point, incident, branch.media.clone(), eps)];
    };

    match hit.role {
        SurfaceRole::Opaque => Vec::new(),
        SurfaceRole::Transparent => {
            vec![branch.spawn(hit.point, incident, branch.media.clone(), eps)]
        }
        SurfaceRole::Mirror => {
            let reflected = reflect(incident, normal);
            vec![branch.spawn(hit.point, reflected, branch.media.clone(), eps)]
        }
        SurfaceRole::BeamSplitter => {
            let reflected = reflect(incident, normal);
            vec![
                branch.spawn(hit.point, incident, branch.media.clone(), eps),
                branch.spawn(hit.point, reflected, branch.media.clone(), eps),
            ]
        }
        SurfaceRole::LensEntry | SurfaceRole::LensExit => {
            let (direction, media) = match config.medium_tracking {
                MediumTracking::Geometric => {
                    let exiting = is_exiting(incident, normal);
                    (
                        interact(incident, normal, hit.ior, exiting),
                        branch.media.clone(),
                    )
                }
                MediumTracking::Explicit => refract_tracked(&branch.media, incident, normal, hit),
            };
            vec![branch.spawn(hit.point, direction, media, eps)]
        }
    }
}

/// Refraction with the media stack deciding entry versus exit.
fn refract_tracked(
    media: &[Medium],
    incident: Vector,
    normal: Vector,
    hit: &HitRecord,
) -> (Vector, Vec<Medium>) {
    let current = media.last().map_or(AIR_IOR, |m| m.ior);
    let inside = media.last().is_some_and(|m| m.owner == hit.owner);
    let n2 = if inside {
        media
            .len()
            .checked_sub(2)
            .map_or(AIR_IOR, |below| media[below].ior)
    } else {
        hit.ior
    };

    let refraction = refract(incident, normal, current, n2);
    let mut media = media.to_vec();
    if refraction.is_transmitted() {
        if inside {
            media.pop();
        } else {
            media.push(Medium {
                owner: hit.owner,
                ior: hit.ior,
            });
        }
    }
    (refraction.direction(), media)
}

fn hit_arrow(start: Point, end: Point, arrows: &ArrowConfig) -> Option<Arrow> {
    if !arrows.enabled {
        return None;
    }
    let direction = (end - start).normalize()?;
    let mid = Point::new_between_2_points(start, end, 0.5);
    Some(Arrow {
        position: mid - direction * (arrows.length * 0.5),
        direction,
    })
}

fn escape_arrow(start: Point, direction: Vector, arrows: &ArrowConfig) -> Option<Arrow> {
    if !arrows.enabled {
        return None;
    }
    let anchor = start + direction * arrows.escape_distance;
    Some(Arrow {
        position: anchor - direction * (arrows.length * 0.5),
        direction,
    })
}
