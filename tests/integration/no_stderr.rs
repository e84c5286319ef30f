// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{get_cmd_output, get_small_calibration_file, qubic};

#[test]
fn test_peak_angles_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let output = tmp_dir.path().join("peaks.tsv");
    let calibration = get_small_calibration_file();

    #[rustfmt::skip]
    let cmd = qubic()
        .args([
            "peak-angles",
            "--calibration", &calibration,
            "--nside", "16",
            "--output", &format!("{}", output.display()),
        ])
        .ok();
    assert!(cmd.is_ok(), "peak-angles failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_projection_no_stderr() {
    let calibration = get_small_calibration_file();

    #[rustfmt::skip]
    let cmd = qubic()
        .args([
            "projection",
            "--calibration", &calibration,
            "--nside", "16",
            "--num-samples", "2",
        ])
        .ok();
    assert!(cmd.is_ok(), "projection failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}
