pub mod geom;
pub mod optics;
pub mod scene;
pub mod uid;

// Prelude
pub use geom::point::Point;
pub use geom::ray::Ray;
pub use geom::vector::Vector;
pub use optics::{
    HitRecord, MediumTracking, RayTrace, Segment, SurfaceQuery, SurfaceRole, Termination,
    TraceConfig, propagate, trace,
};
pub use scene::{Component, Placement, Scene};
pub use uid::UID;
