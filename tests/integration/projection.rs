// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{get_cmd_output, get_small_calibration_file, qubic};

#[test]
fn test_projection_dry_run() {
    let calibration = get_small_calibration_file();

    #[rustfmt::skip]
    let cmd = qubic()
        .args([
            "projection",
            "--dry-run",
            "--calibration", &calibration,
            "--nside", "16",
            "--scene-kind", "IQU",
            "--num-samples", "5",
        ])
        .ok();
    assert!(cmd.is_ok(), "projection failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("ncolmax"), "{stdout}");
    assert!(stdout.contains("Indices: int32, values: float32"), "{stdout}");
    assert!(stdout.contains("Dry run"), "{stdout}");
}

#[test]
fn test_projection() {
    let calibration = get_small_calibration_file();

    #[rustfmt::skip]
    let cmd = qubic()
        .args([
            "projection",
            "--no-progress-bars",
            "--calibration", &calibration,
            "--nside", "16",
            "--synthbeam-dtype", "float64",
            "--num-samples", "3",
            "--boresight-za", "10",
            "--check-uniform-sky",
        ])
        .ok();
    assert!(cmd.is_ok(), "projection failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("values: float64"), "{stdout}");
    assert!(stdout.contains("A uniform unit sky gives timelines"), "{stdout}");
}

#[test]
fn test_projection_bad_dtype() {
    let calibration = get_small_calibration_file();

    #[rustfmt::skip]
    let cmd = qubic()
        .args([
            "projection",
            "--calibration", &calibration,
            "--synthbeam-dtype", "float16",
        ])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("float16"), "{stderr}");
}
