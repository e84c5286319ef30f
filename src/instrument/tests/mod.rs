// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

mod peaks;
mod response;

use ndarray::prelude::*;

use super::*;
use crate::{tests::*, SceneKind};

pub(super) fn get_instrument(kind: InstrumentKind, ngrids: u8) -> Instrument {
    let config = InstrumentConfig {
        kind,
        ngrids,
        ..Default::default()
    };
    Instrument::new(get_small_calibration(), config).unwrap()
}

pub(super) fn get_instrument_with_fraction(fraction: f64) -> Instrument {
    let mut config = InstrumentConfig {
        ngrids: 1,
        ..Default::default()
    };
    config.synthbeam.fraction = fraction;
    Instrument::new(get_small_calibration(), config).unwrap()
}

#[test]
fn test_new_instrument() {
    let instrument = get_instrument(InstrumentKind::Interferometer, 2);
    assert_eq!(instrument.len(), 32);
    assert!(!instrument.is_empty());
    assert_eq!(instrument.kind(), InstrumentKind::Interferometer);
    assert_eq!(instrument.horns().num_open(), 16);
    assert!(!instrument.primary_beam().is_backward());
    assert!(instrument.secondary_beam().is_backward());
    assert_eq!(instrument.focal_length(), SMALL_FOCAL_LENGTH);
}

#[test]
fn test_bad_fraction() {
    for fraction in [0.0, -0.5, 1.5, f64::NAN] {
        let mut config = InstrumentConfig::default();
        config.synthbeam.fraction = fraction;
        let result = Instrument::new(get_small_calibration(), config);
        assert!(matches!(result, Err(InstrumentError::BadFraction(_))));
    }

    // A fraction of exactly 1 is fine.
    let mut config = InstrumentConfig::default();
    config.synthbeam.fraction = 1.0;
    assert!(Instrument::new(get_small_calibration(), config).is_ok());
}

#[test]
fn test_bad_ngrids() {
    let config = InstrumentConfig {
        ngrids: 3,
        ..Default::default()
    };
    let result = Instrument::new(get_small_calibration(), config);
    assert!(matches!(result, Err(InstrumentError::Layout(_))));
}

#[test]
fn test_display() {
    let s = get_instrument(InstrumentKind::Interferometer, 2).to_string();
    assert!(s.starts_with("Instrument:\n"));
    assert!(s.contains("    kind: interferometer\n"));
    assert!(s.contains("    ngrids: 2\n"));
    assert!(s.contains("    synthbeam_fraction: 0.99\n"));
    assert!(s.contains("\nCalibration:\n"));
    assert!(s.contains("    optics: focal length 0.3 m\n"));

    let s = get_instrument(InstrumentKind::Simple, 1).to_string();
    assert!(s.contains("    kind: simple\n"));
    assert!(!s.contains("synthbeam_fraction"));
}

#[test]
fn test_simple_instrument_is_not_an_interferometer() {
    let instrument = get_instrument(InstrumentKind::Simple, 1);
    let scene = get_scene(SceneKind::I, 8);
    let result =
        instrument.response_from_horns_to_focalplane(&scene, &FocalPlanePositions::Detectors);
    assert!(matches!(
        result,
        Err(InstrumentError::NotInterferometer("response_from_horns_to_focalplane"))
    ));
    let result = instrument.synthesized_beam_map(&scene, &FocalPlanePositions::Detectors, 45.0);
    assert!(matches!(result, Err(InstrumentError::NotInterferometer(_))));
}
