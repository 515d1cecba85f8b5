use anyhow::Result;
use lightpath::optics::read_config;
use lightpath::scene::presets::default_bench;
use lightpath::scene::{Component, Placement, Scene};
use lightpath::{MediumTracking, Point, RayTrace, Termination, TraceConfig, Vector};
use std::io::Write;

fn assert_same_paths(a: &RayTrace, b: &RayTrace, tol: f64) {
    assert_eq!(a.segments.len(), b.segments.len());
    for (sa, sb) in a.segments.iter().zip(b.segments.iter()) {
        assert_eq!(sa.depth, sb.depth);
        assert!(sa.start.is_within(&sb.start, tol), "{} vs {}", sa.start, sb.start);
        assert!(sa.end.is_within(&sb.end, tol), "{} vs {}", sa.end, sb.end);
    }
}

#[test]
fn test_default_bench_terminates() -> Result<()> {
    let scene = default_bench()?;
    let config = TraceConfig::new();
    for (uid, result) in scene.trace_sources(&config) {
        assert!(!result.is_empty(), "source {uid} produced no segments");
        assert_eq!(result.count(Termination::DepthExceeded), 0);
        assert!(result.max_depth() <= config.max_depth);
        assert!(result.segments.iter().all(|s| s.start.is_finite() && s.end.is_finite()));
    }
    Ok(())
}

#[test]
fn test_lens_bends_off_axis_rays() -> Result<()> {
    let scene = default_bench()?;
    let results = scene.trace_sources(&TraceConfig::new());

    // Sources at y = +0.1 and y = -0.1 reach the lens off its axis and leave it converging
    for ((_, result), y0) in results.iter().skip(1).zip([0.1, -0.1]) {
        let after_lens = result
            .segments
            .iter()
            .find(|s| s.start.z > 4.0 && s.start.z < 4.2 && s.end.z > 4.5)
            .expect("a segment should leave the lens");
        let dir = after_lens.direction().unwrap();
        assert!(dir.dz > 0.9);
        assert!(dir.dy * y0 < 0., "ray at y = {y0} was not bent towards the axis: {dir}");
        // Folding leaves the beam slightly before the lens axis at x = 2
        assert!(dir.dx > 1e-3);
    }
    Ok(())
}

#[test]
fn test_explicit_tracking_matches_geometric_on_bench() -> Result<()> {
    let scene = default_bench()?;
    let geometric = TraceConfig::new();
    let explicit = TraceConfig {
        medium_tracking: MediumTracking::Explicit,
        ..TraceConfig::new()
    };

    let a = scene.trace_sources(&geometric);
    let b = scene.trace_sources(&explicit);
    assert_eq!(a.len(), b.len());
    for ((_, ra), (_, rb)) in a.iter().zip(b.iter()) {
        assert_same_paths(ra, rb, 1e-9);
    }
    Ok(())
}

#[test]
fn test_zero_depth_traces_single_segment() -> Result<()> {
    let scene = default_bench()?;
    let config = TraceConfig::new().with_max_depth(0);
    for (_, result) in scene.trace_sources(&config) {
        assert_eq!(result.segments.len(), 1);
        assert_eq!(result.count(Termination::DepthExceeded), 1);
    }
    Ok(())
}

#[test]
fn test_config_file_drives_trace() -> Result<()> {
    let mut file = tempfile::NamedTempFile::new()?;
    write!(file, r#"{{ "max_depth": 3, "arrows": {{ "enabled": false }} }}"#)?;
    let config = read_config(file.path())?;

    let scene = default_bench()?;
    for (_, result) in scene.trace_sources(&config) {
        assert!(result.max_depth() <= 3);
        assert!(result.segments.iter().all(|s| s.arrow.is_none()));
    }
    Ok(())
}

#[test]
fn test_parallel_mirrors_in_scene() -> Result<()> {
    let mut scene = Scene::new();
    scene.add(Component::Mirror, Placement::at(Point::new(0., 0., 1.)))?;
    scene.add(Component::Mirror, Placement::at(Point::new(0., 0., -1.)))?;

    let config = TraceConfig::new().with_max_depth(10);
    let result = lightpath::trace(Point::default(), Vector::new(0., 0., 1.), &scene, &config);
    assert_eq!(result.segments.len(), 11);
    assert_eq!(result.count(Termination::DepthExceeded), 1);
    Ok(())
}
