// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::*;
use crate::tests::SMALL_CALIBRATION_FILE;

#[test]
fn test_instrument_args_merge_prefers_cli() {
    let cli = InstrumentArgs {
        ngrids: Some(1),
        synthbeam_fraction: Some(0.5),
        ..Default::default()
    };
    let file = InstrumentArgs {
        calibration: Some(PathBuf::from(SMALL_CALIBRATION_FILE)),
        ngrids: Some(2),
        synthbeam_kmax: Some(4),
        ..Default::default()
    };
    let merged = cli.merge(file);
    assert_eq!(
        merged.calibration,
        Some(PathBuf::from(SMALL_CALIBRATION_FILE))
    );
    assert_eq!(merged.ngrids, Some(1));
    assert_eq!(merged.synthbeam_fraction, Some(0.5));
    assert_eq!(merged.synthbeam_kmax, Some(4));
    assert!(merged.synthbeam_dtype.is_none());
}

#[test]
fn test_instrument_args_parse() {
    let args = InstrumentArgs {
        calibration: Some(PathBuf::from(SMALL_CALIBRATION_FILE)),
        ngrids: Some(1),
        synthbeam_dtype: Some("float64".to_string()),
        ..Default::default()
    };
    let instrument = args.parse().unwrap();
    assert_eq!(instrument.len(), 16);
    assert_eq!(instrument.kind(), InstrumentKind::Interferometer);
    assert_eq!(instrument.config().synthbeam.dtype, ValueDtype::F64);
    assert_abs_diff_eq!(
        instrument.config().synthbeam.fraction,
        DEFAULT_SYNTHBEAM_FRACTION
    );
}

#[test]
fn test_instrument_args_errors() {
    let result = InstrumentArgs::default().parse();
    assert!(matches!(result, Err(QubicError::Calibration(_))));

    let args = InstrumentArgs {
        calibration: Some(PathBuf::from(SMALL_CALIBRATION_FILE)),
        instrument_kind: Some("telescope".to_string()),
        ..Default::default()
    };
    assert!(matches!(args.parse(), Err(QubicError::Instrument(_))));

    let args = InstrumentArgs {
        calibration: Some(PathBuf::from(SMALL_CALIBRATION_FILE)),
        synthbeam_dtype: Some("float16".to_string()),
        ..Default::default()
    };
    assert!(matches!(args.parse(), Err(QubicError::Instrument(_))));

    let args = InstrumentArgs {
        calibration: Some(PathBuf::from(SMALL_CALIBRATION_FILE)),
        synthbeam_fraction: Some(1.5),
        ..Default::default()
    };
    assert!(matches!(args.parse(), Err(QubicError::SyntheticBeam(_))));
}

#[test]
fn test_scene_args() {
    let scene = SceneArgs::default().parse().unwrap();
    assert_eq!(scene.kind(), DEFAULT_SCENE_KIND);
    assert_eq!(scene.nside(), DEFAULT_NSIDE);
    assert_abs_diff_eq!(scene.nu(), DEFAULT_FREQ_GHZ * 1e9);

    let scene = SceneArgs {
        scene_kind: Some("IQU".to_string()),
        nside: Some(16),
        freq_ghz: None,
    }
    .merge(SceneArgs {
        scene_kind: Some("QU".to_string()),
        nside: Some(32),
        freq_ghz: Some(220.0),
    })
    .parse()
    .unwrap();
    assert_eq!(scene.kind(), SceneKind::IQU);
    assert_eq!(scene.nside(), 16);
    assert_abs_diff_eq!(scene.nu(), 220e9);

    let result = SceneArgs {
        scene_kind: Some("V".to_string()),
        ..Default::default()
    }
    .parse();
    assert!(matches!(result, Err(QubicError::Scene(_))));
}
