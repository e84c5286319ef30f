// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Helpful functions for tests.

use crate::{
    calibration::{Calibration, DetArrayTable, HornArrayTable, OpticsTable, PrimBeamTable},
    Scene, SceneKind,
};

/// A calibration file with the same contents as [`get_small_calibration`].
pub(crate) const SMALL_CALIBRATION_FILE: &str = "test_files/calibration_small.toml";

pub(crate) const SMALL_NUM_DETECTORS_PER_SIDE: usize = 4;
pub(crate) const SMALL_DETECTOR_PITCH: f64 = 0.0031;
pub(crate) const SMALL_DETECTOR_HALF_SIDE: f64 = 0.0015;
pub(crate) const SMALL_FOCAL_LENGTH: f64 = 0.3;
pub(crate) const SMALL_NUM_HORNS_PER_SIDE: usize = 4;
pub(crate) const SMALL_HORN_SPACING: f64 = 0.014;
pub(crate) const SMALL_PRIMBEAM_FWHM: f64 = 13.0;

/// A 4x4 array of square 3 mm bolometers behind a 4x4 array of horns. The
/// detectors are numbered row by row from the most negative (x, y) corner, and
/// the quadrant is 0, 1, 2 or 3 for (-x, -y), (+x, -y), (-x, +y) and (+x, +y).
pub(crate) fn get_small_calibration() -> Calibration {
    let n = SMALL_NUM_DETECTORS_PER_SIDE;
    let mut vertex = Vec::with_capacity(n * n);
    let mut quadrant = Vec::with_capacity(n * n);
    for iy in 0..n {
        for ix in 0..n {
            let x = (ix as f64 - 1.5) * SMALL_DETECTOR_PITCH;
            let y = (iy as f64 - 1.5) * SMALL_DETECTOR_PITCH;
            let h = SMALL_DETECTOR_HALF_SIDE;
            vertex.push(vec![
                [x - h, y - h],
                [x + h, y - h],
                [x + h, y + h],
                [x - h, y + h],
            ]);
            quadrant.push(u32::from(x > 0.0) + 2 * u32::from(y > 0.0));
        }
    }

    let n = SMALL_NUM_HORNS_PER_SIDE;
    let center = (0..n * n)
        .map(|i| {
            let (ix, iy) = (i % n, i / n);
            [
                (ix as f64 - 1.5) * SMALL_HORN_SPACING,
                (iy as f64 - 1.5) * SMALL_HORN_SPACING,
                0.0,
            ]
        })
        .collect();

    Calibration {
        detarray: DetArrayTable {
            vertex,
            removed: vec![],
            index: vec![],
            quadrant,
        },
        optics: OpticsTable {
            focal_length: SMALL_FOCAL_LENGTH,
        },
        primbeam: PrimBeamTable {
            fwhm: SMALL_PRIMBEAM_FWHM,
        },
        hornarray: HornArrayTable {
            spacing: SMALL_HORN_SPACING,
            center,
            open: vec![],
        },
        path: None,
    }
}

/// A 150 GHz scene.
pub(crate) fn get_scene(kind: SceneKind, nside: usize) -> Scene {
    Scene::new(kind, nside, 150e9).unwrap()
}
