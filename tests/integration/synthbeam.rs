// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;
use tempfile::TempDir;

use crate::{get_cmd_output, get_small_calibration_file, qubic, read_tsv};

#[test]
fn test_synthbeam() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("synthbeam.tsv");
    let calibration = get_small_calibration_file();

    #[rustfmt::skip]
    let cmd = qubic()
        .args([
            "synthbeam",
            "--no-progress-bars",
            "--calibration", &calibration,
            "--nside", "16",
            "-x", "0.001",
            "-y", "-0.002",
            "--theta-max", "30",
            "--output", &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "synthbeam failed: {}", cmd.err().unwrap());

    let rows = read_tsv(&output);
    assert!(!rows.is_empty());
    let mut sum = 0.0;
    for row in &rows {
        assert_eq!(row.len(), 4);
        assert!(row[1] <= 30f64.to_radians());
        assert!(row[3] >= 0.0);
        sum += row[3];
    }
    assert_abs_diff_eq!(sum, 1.0, epsilon = 1e-9);
}

#[test]
fn test_synthbeam_simple_instrument() {
    let calibration = get_small_calibration_file();

    #[rustfmt::skip]
    let cmd = qubic()
        .args([
            "synthbeam",
            "--calibration", &calibration,
            "--instrument-kind", "simple",
            "--nside", "16",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(
        stderr.contains("only available for the interferometric instrument"),
        "{stderr}"
    );
}
