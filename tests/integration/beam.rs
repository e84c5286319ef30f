// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use crate::{get_small_calibration_file, qubic, read_tsv};

#[test]
fn test_beam() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("beam.tsv");
    let calibration = get_small_calibration_file();

    #[rustfmt::skip]
    let cmd = qubic()
        .args([
            "beam",
            "--calibration", &calibration,
            "--max-za", "10.5",
            "--output", &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "beam failed: {}", cmd.err().unwrap());

    let rows = read_tsv(&output);
    assert_eq!(rows.len(), 11);
    assert_abs_diff_eq!(rows[0][1], 1.0);
    assert_abs_diff_eq!(rows[0][2], 1.0);
    for row in &rows {
        // The secondary beam is the primary beam looking backward.
        assert_abs_diff_eq!(row[1], row[2], epsilon = 1e-12);
    }
    // 6.5 degrees is half the FWHM of the calibration file.
    assert!(rows[6][1] > 0.5 && rows[7][1] < 0.5);
}

#[test]
fn test_beam_uniform() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("beam.tsv");

    #[rustfmt::skip]
    let cmd = qubic()
        .args([
            "beam",
            "--beam-type", "uniform",
            "--step", "10",
            "--output", &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "beam failed: {}", cmd.err().unwrap());
    let rows = read_tsv(&output);
    assert!(rows.len() >= 9);
    for row in &rows {
        assert_abs_diff_eq!(row[1], 1.0);
    }
}
