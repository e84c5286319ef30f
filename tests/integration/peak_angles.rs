// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Write;

use approx::assert_abs_diff_eq;
use indoc::formatdoc;
use tempfile::TempDir;

use crate::{get_cmd_output, get_small_calibration_file, qubic, read_tsv};

#[test]
fn test_peak_angles() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("peaks.tsv");
    let calibration = get_small_calibration_file();

    #[rustfmt::skip]
    let cmd = qubic()
        .args([
            "peak-angles",
            "--no-progress-bars",
            "--calibration", &calibration,
            "--ngrids", "1",
            "--nside", "16",
            "--output", &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "peak-angles failed: {}", cmd.err().unwrap());

    let rows = read_tsv(&output);
    assert!(!rows.is_empty());
    assert_eq!(rows.len() % 16, 0);
    let ncolmax = rows.len() / 16;
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.len(), 5);
        assert_eq!(row[0] as usize, i / ncolmax);
        assert_eq!(row[1] as usize, i % ncolmax);
        assert!(row[4] >= 0.0);
    }
    // Peaks are sorted by decreasing amplitude.
    for detector in rows.chunks(ncolmax) {
        for pair in detector.windows(2) {
            assert!(pair[0][4] >= pair[1][4]);
        }
    }
}

#[test]
fn test_peak_angles_dry_run() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("peaks.tsv");
    let calibration = get_small_calibration_file();

    #[rustfmt::skip]
    let cmd = qubic()
        .args([
            "peak-angles",
            "--dry-run",
            "--calibration", &calibration,
            "--nside", "16",
            "--output", &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "peak-angles failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Dry run"), "{stdout}");
    assert!(!output.exists());
}

#[test]
fn test_peak_angles_arg_file() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("peaks.tsv");
    let arg_file = tmp_dir.path().join("args.toml");
    let saved = tmp_dir.path().join("saved.toml");
    let calibration = get_small_calibration_file();

    let mut f = std::fs::File::create(&arg_file).unwrap();
    write!(
        f,
        "{}",
        formatdoc! {r#"
            [instrument]
            calibration = "{calibration}"
            ngrids = 1
            instrument_kind = "simple"

            [scene]
            nside = 16

            [peak-angles]
            output = "{}"
        "#, output.display()}
    )
    .unwrap();
    drop(f);

    #[rustfmt::skip]
    let cmd = qubic()
        .args([
            "peak-angles",
            &format!("{}", arg_file.display()),
            // The command line overrides the file.
            "--ngrids", "2",
            "--save-toml", &format!("{}", saved.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "peak-angles failed: {}", cmd.err().unwrap());

    // A simple instrument has a single peak per detector.
    let rows = read_tsv(&output);
    assert_eq!(rows.len(), 32);
    for row in rows {
        assert_abs_diff_eq!(row[4], 1.0);
    }

    let saved = std::fs::read_to_string(saved).unwrap();
    assert!(saved.contains("[instrument]"), "{saved}");
    assert!(saved.contains("ngrids = 2"), "{saved}");
}
