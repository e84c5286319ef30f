// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::*;
use crate::pixel::pixel_to_angle;

#[test]
fn test_focal_plane_positions() {
    assert_eq!(
        FocalPlanePositions::new(None, None, vec![1.0]).unwrap(),
        FocalPlanePositions::Detectors
    );
    assert!(matches!(
        FocalPlanePositions::new(Some(vec![0.0]), None, vec![1.0]),
        Err(InstrumentError::MissingCoordinate("y"))
    ));
    assert!(matches!(
        FocalPlanePositions::new(None, Some(vec![0.0]), vec![1.0]),
        Err(InstrumentError::MissingCoordinate("x"))
    ));
    assert!(matches!(
        FocalPlanePositions::new(Some(vec![0.0, 1.0]), Some(vec![0.0]), vec![1.0]),
        Err(InstrumentError::PositionLength { x: 2, y: 1, area: 1 })
    ));
    assert!(matches!(
        FocalPlanePositions::new(Some(vec![0.0, 1.0]), Some(vec![0.0, 1.0]), vec![1.0; 3]),
        Err(InstrumentError::PositionLength { .. })
    ));

    // A single area applies to every position.
    let positions =
        FocalPlanePositions::new(Some(vec![0.0, 0.001]), Some(vec![0.0, 0.0]), vec![2e-6]).unwrap();
    match positions {
        FocalPlanePositions::Points { area, .. } => assert_eq!(area, vec![2e-6, 2e-6]),
        FocalPlanePositions::Detectors => panic!("expected points"),
    }
}

#[test]
fn test_response_shapes() {
    let instrument = get_instrument(InstrumentKind::Interferometer, 2);
    let scene = get_scene(SceneKind::I, 8);
    let a = instrument
        .response_from_horns_to_focalplane(&scene, &FocalPlanePositions::Detectors)
        .unwrap();
    assert_eq!(a.dim(), (32, 16));
    let b = instrument
        .response_from_sources_to_horns(&scene, &[0.0, 0.1, 0.2], &[0.0, 1.0, 2.0], &[1.0])
        .unwrap();
    assert_eq!(b.dim(), (16, 3));
    let e = instrument
        .response(
            &scene,
            &[0.0, 0.1, 0.2],
            &[0.0, 1.0, 2.0],
            &[1.0, 2.0, 3.0],
            &FocalPlanePositions::Detectors,
        )
        .unwrap();
    assert_eq!(e.dim(), (32, 3));

    // Horns only change the phase of the transmission to a given position.
    for row in a.outer_iter() {
        let first = row[0].norm();
        assert!(first > 0.0);
        for v in row.iter() {
            assert_abs_diff_eq!(v.norm(), first, epsilon = 1e-12);
        }
    }
}

#[test]
fn test_single_horn_response() {
    let instrument = get_instrument(InstrumentKind::Interferometer, 1);
    let horns = instrument.horns().clone().with_only_open(&[0]);
    let instrument = instrument.with_horns(horns);
    let scene = get_scene(SceneKind::I, 8);
    let (theta, phi, power) = (0.1, 0.3, 2.0);
    let e = instrument
        .response(
            &scene,
            &[theta],
            &[phi],
            &[power],
            &FocalPlanePositions::point(0.0, 0.0),
        )
        .unwrap();
    assert_eq!(e.dim(), (1, 1));

    // On the optical axis the solid-angle correction is area / f^2 and the
    // secondary beam transmits fully.
    let f = SMALL_FOCAL_LENGTH;
    let expected = 1.0 / (f * f) / instrument.secondary_beam().get_solid_angle()
        * power
        * instrument.primary_beam().calc_value(theta, phi);
    assert_abs_diff_eq!(e[(0, 0)].norm_sqr(), expected, epsilon = 1e-9 * expected);
}

#[test]
fn test_coherent_sum_over_horns() {
    // A source at the zenith seen from the optical axis arrives in phase
    // through every horn.
    let instrument = get_instrument(InstrumentKind::Interferometer, 1);
    let scene = get_scene(SceneKind::I, 8);
    let position = FocalPlanePositions::point(0.0, 0.0);
    let all = instrument
        .response(&scene, &[0.0], &[0.0], &[1.0], &position)
        .unwrap();

    let horns = instrument.horns().clone().with_only_open(&[5]);
    let instrument = instrument.with_horns(horns);
    let one = instrument
        .response(&scene, &[0.0], &[0.0], &[1.0], &position)
        .unwrap();

    let n = 16.0;
    let expected = n * n * one[(0, 0)].norm_sqr();
    assert_abs_diff_eq!(all[(0, 0)].norm_sqr(), expected, epsilon = 1e-9 * expected);
}

#[test]
fn test_response_errors() {
    let instrument = get_instrument(InstrumentKind::Interferometer, 1);
    let scene = get_scene(SceneKind::I, 8);
    let result = instrument.response_from_sources_to_horns(&scene, &[0.0, 0.1], &[0.0], &[1.0]);
    assert!(matches!(
        result,
        Err(InstrumentError::SourceLength {
            theta: 2,
            phi: 1,
            power: 1
        })
    ));

    let positions = FocalPlanePositions::Points {
        x: vec![0.0, 0.0],
        y: vec![0.0, 0.0],
        area: vec![1e-6, -1e-6],
    };
    let result = instrument.response_from_horns_to_focalplane(&scene, &positions);
    assert!(matches!(
        result,
        Err(InstrumentError::BadSolidAngleCorrection { position: 1, .. })
    ));
}

#[test]
fn test_synthesized_beam_map() {
    let instrument = get_instrument(InstrumentKind::Interferometer, 1);
    let scene = get_scene(SceneKind::I, 8);
    let theta_max = 30.0;
    let maps = instrument
        .synthesized_beam_map(&scene, &FocalPlanePositions::Detectors, theta_max)
        .unwrap();
    assert_eq!(maps.dim(), (16, scene.npix()));

    for map in maps.outer_iter() {
        assert_abs_diff_eq!(map.sum(), 1.0, epsilon = 1e-10);
        assert!(map.iter().all(|&v| v >= 0.0));
        for (pixel, &v) in map.iter().enumerate() {
            let (theta, _) = pixel_to_angle(scene.nside(), pixel);
            if theta > theta_max.to_radians() {
                assert_eq!(v, 0.0);
            }
        }
    }
}

#[test]
fn test_synthesized_beam_map_positions_normalised_separately() {
    let instrument = get_instrument(InstrumentKind::Interferometer, 1);
    let scene = get_scene(SceneKind::I, 8);
    // The same point with two areas: the second collects four times the power.
    let positions = FocalPlanePositions::new(
        Some(vec![0.001, 0.001]),
        Some(vec![0.0, 0.0]),
        vec![1e-6, 4e-6],
    )
    .unwrap();
    let maps = instrument
        .synthesized_beam_map(&scene, &positions, 30.0)
        .unwrap();
    assert_abs_diff_eq!(maps.row(0).sum(), 1.0, epsilon = 1e-10);
    assert_abs_diff_eq!(maps.row(1).sum(), 1.0, epsilon = 1e-10);
    assert_abs_diff_eq!(maps.row(0), maps.row(1), epsilon = 1e-12);
}

#[test]
fn test_synthesized_beam_map_bad_theta_max() {
    let instrument = get_instrument(InstrumentKind::Interferometer, 1);
    let scene = get_scene(SceneKind::I, 8);
    for theta_max in [0.0, -10.0, 180.5, f64::NAN] {
        let result = instrument.synthesized_beam_map(
            &scene,
            &FocalPlanePositions::point(0.0, 0.0),
            theta_max,
        );
        assert!(matches!(result, Err(InstrumentError::BadThetaMax(_))));
    }
}
