pub mod config;
pub mod lens;
pub mod physics;
pub mod surface;
pub mod trace;

pub use config::{ArrowConfig, MediumTracking, TraceConfig, read_config};
pub use lens::{LensParams, safe_radius, sagittal_depth};
pub use physics::{Refraction, interact, reflect, refract};
pub use surface::{ElementId, HitRecord, SurfaceQuery, SurfaceRole};
pub use trace::{Arrow, BranchEnd, RayTrace, Segment, Termination, propagate, trace};
