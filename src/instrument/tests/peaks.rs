// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::f64::consts::PI;

use approx::assert_abs_diff_eq;

use super::*;

#[test]
fn test_peak_angles_kmax_zero() {
    let instrument = get_instrument(InstrumentKind::Interferometer, 1);
    let scene = get_scene(SceneKind::I, 16);
    let (theta, phi) = instrument.peak_angles_kmax(&scene, 0);
    assert_eq!(theta.dim(), (16, 1));
    assert_eq!(phi.dim(), (16, 1));

    // The only peak is along the line of sight: detector 0 sits in the
    // (-x, -y) corner, so it looks towards (+x, +y).
    let c = instrument.layout().center();
    let expected_theta = c[(0, 0)].hypot(c[(0, 1)]).atan2(SMALL_FOCAL_LENGTH);
    assert_abs_diff_eq!(theta[(0, 0)], expected_theta, epsilon = 1e-12);
    assert_abs_diff_eq!(phi[(0, 0)], PI / 4.0, epsilon = 1e-12);
}

#[test]
fn test_peak_angles_kmax_orders() {
    let instrument = get_instrument(InstrumentKind::Interferometer, 1);
    let scene = get_scene(SceneKind::I, 16);
    let (theta, phi) = instrument.peak_angles_kmax(&scene, 2);
    assert_eq!(theta.dim(), (16, 25));

    // The central order is the middle column. The order (kx, ky) = (1, 0)
    // comes 5 columns later and is displaced by lambda / spacing along -x.
    let (central, _) = instrument.peak_angles_kmax(&scene, 0);
    assert_abs_diff_eq!(theta[(3, 12)], central[(3, 0)], epsilon = 1e-12);
    let c = instrument.layout().center();
    let norm = (c[(3, 0)].powi(2) + c[(3, 1)].powi(2) + SMALL_FOCAL_LENGTH.powi(2)).sqrt();
    let nx = -c[(3, 0)] / norm - scene.wavelength() / SMALL_HORN_SPACING;
    let ny = -c[(3, 1)] / norm;
    assert_abs_diff_eq!(theta[(3, 17)], nx.hypot(ny).asin(), epsilon = 1e-12);
    assert_abs_diff_eq!(phi[(3, 17)], ny.atan2(nx), epsilon = 1e-12);
}

#[test]
fn test_normalised_peaks() {
    let instrument = get_instrument(InstrumentKind::Interferometer, 1);
    let scene = get_scene(SceneKind::I, 16);
    let peaks = instrument.normalised_peaks(&scene, 0.99).unwrap();
    assert_eq!(peaks.num_detectors(), 16);
    assert!(peaks.ncolmax() >= 1);
    assert!(peaks.ncolmax() <= 17 * 17);

    for row in peaks.amplitude.outer_iter() {
        assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-12);
        // Decreasing amplitudes.
        for pair in row.as_slice().unwrap().windows(2) {
            assert!(pair[0] >= pair[1]);
        }
    }
    assert!(peaks.theta.iter().all(|t| t.is_finite()));
    assert!(peaks.phi.iter().all(|p| p.is_finite()));
}

#[test]
fn test_fraction_is_monotonic() {
    let scene = get_scene(SceneKind::I, 16);
    let mut previous = 0;
    for fraction in [0.3, 0.6, 0.9, 0.99] {
        let instrument = get_instrument_with_fraction(fraction);
        let ncolmax = instrument.peak_angles(&scene).unwrap().ncolmax();
        assert!(ncolmax >= previous, "{fraction}: {ncolmax} < {previous}");
        previous = ncolmax;
    }
}

#[test]
fn test_interferometer_peaks_scaled_by_secondary_beam() {
    let instrument = get_instrument(InstrumentKind::Interferometer, 2);
    let scene = get_scene(SceneKind::I, 16);
    let peaks = instrument.peak_angles(&scene).unwrap();
    assert_eq!(peaks.num_detectors(), 32);
    for (row, &theta) in peaks
        .amplitude
        .outer_iter()
        .zip(instrument.layout().theta().iter())
    {
        let expected = instrument.secondary_beam().calc_value(theta, 0.0);
        assert_abs_diff_eq!(row.sum(), expected, epsilon = 1e-12);
    }
}

#[test]
fn test_simple_peaks() {
    let instrument = get_instrument(InstrumentKind::Simple, 1);
    let scene = get_scene(SceneKind::I, 16);
    let peaks = instrument.peak_angles(&scene).unwrap();
    assert_eq!(peaks.ncolmax(), 1);
    let layout = instrument.layout();
    for d in 0..instrument.len() {
        assert_abs_diff_eq!(peaks.theta[(d, 0)], -layout.theta()[d]);
        assert_abs_diff_eq!(peaks.phi[(d, 0)], layout.phi()[d] + PI);
        assert_abs_diff_eq!(peaks.amplitude[(d, 0)], 1.0);
    }
}

#[test]
fn test_directions_are_unit_vectors() {
    let instrument = get_instrument(InstrumentKind::Interferometer, 1);
    let scene = get_scene(SceneKind::I, 16);
    let peaks = instrument.peak_angles(&scene).unwrap();
    let directions = peaks.directions();
    assert_eq!(directions.dim(), (16, peaks.ncolmax(), 3));
    for v in directions.lanes(Axis(2)) {
        assert_abs_diff_eq!(v.dot(&v), 1.0, epsilon = 1e-12);
    }
}

#[test]
fn test_zero_primary_beam() {
    // A beam that sees nothing in front of the instrument.
    let instrument = get_instrument(InstrumentKind::Interferometer, 1).with_beams(
        crate::beam::create_uniform_beam_object(true),
        crate::beam::create_uniform_beam_object(true),
    );
    let scene = get_scene(SceneKind::I, 16);
    let result = instrument.peak_angles(&scene);
    assert!(matches!(
        result,
        Err(InstrumentError::ZeroPeakAmplitude { detector: 0 })
    ));
}
