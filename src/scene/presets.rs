use anyhow::Result;
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};

use crate::Point;
use crate::optics::lens::LensParams;
use crate::scene::{Component, Placement, Scene};
use crate::uid::UID;

/// Initial bench layout: three parallel sources aimed along `+z` at a
/// 45 degree mirror, which folds the beam into a beam splitter. The reflected
/// half goes through a lens into a beam block, the transmitted half escapes.
pub fn default_bench() -> Result<Scene> {
    let mut scene = Scene::new();

    scene.insert(
        UID::from("3123948214"),
        Component::Mirror,
        Placement::new(Point::new(0., 0., 2.), [-PI, FRAC_PI_4, 0.]),
    )?;
    scene.insert(
        UID::from("1209480129"),
        Component::BeamBlock,
        Placement::new(Point::new(2., 0., 6.), [0., PI, 0.]),
    )?;
    scene.insert(
        UID::from("1209480130"),
        Component::BeamSplitter,
        Placement::new(Point::new(2., 0., 2.), [-FRAC_PI_2, 0., 0.]),
    )?;

    for (key, y) in [("1294021582", 0.), ("1294021586", 0.1), ("1294021589", -0.1)] {
        scene.insert_source(
            UID::from(key),
            Placement::new(Point::new(0., y, -2.), [FRAC_PI_2, 0., 0.]),
        )?;
    }

    scene.insert(
        UID::from("53475687667"),
        Component::Lens(LensParams {
            r1: 0.5,
            r2: 0.5,
            aperture_height: 0.5,
            thickness: 0.1,
            ior: 1.6,
        }),
        Placement::new(Point::new(2., 0., 4.), [FRAC_PI_2, 0., 0.]),
    )?;

    Ok(scene)
}
