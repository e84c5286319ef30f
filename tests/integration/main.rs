// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! Some help for laying out these tests was taken from:
//! https://matklad.github.io/2021/02/27/delete-cargo-integration-tests.html

mod beam;
mod no_stderr;
mod peak_angles;
mod projection;
mod synthbeam;

use std::{
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};

const SMALL_CALIBRATION_FILE: &str = "test_files/calibration_small.toml";

fn qubic() -> Command {
    Command::cargo_bin("qubic").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

fn get_small_calibration_file() -> String {
    let pb = PathBuf::from(SMALL_CALIBRATION_FILE);
    assert!(
        pb.exists(),
        "Could not find {}, which is required for this test",
        pb.display()
    );
    SMALL_CALIBRATION_FILE.to_string()
}

/// Read a tab-separated file into rows of numbers.
fn read_tsv<P: AsRef<Path>>(path: P) -> Vec<Vec<f64>> {
    std::fs::read_to_string(path)
        .unwrap()
        .lines()
        .map(|l| l.split('\t').map(|v| v.parse().unwrap()).collect())
        .collect()
}

#[test]
fn test_help() {
    let cmd = qubic().arg("--help").ok();
    assert!(cmd.is_ok());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("peak-angles"));
    assert!(stdout.contains("synthbeam"));
    assert!(stdout.contains("projection"));
}

#[test]
fn test_missing_calibration() {
    let cmd = qubic()
        .args(["peak-angles", "--calibration", "does_not_exist.toml"])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("does_not_exist.toml"), "{stderr}");
}
