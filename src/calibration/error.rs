// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading and validating calibration tables.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CalibrationError {
    #[error("Calibration file {0:?} doesn't have a recognised file extension! Valid extensions are: {}", *super::CALIBRATION_FILE_TYPES_COMMA_SEPARATED)]
    UnrecognisedExtension(PathBuf),

    #[error("Couldn't decode toml structure from {file:?}:\n{err}")]
    Toml { file: PathBuf, err: toml::de::Error },

    #[error("Couldn't decode json structure from {file:?}:\n{err}")]
    Json {
        file: PathBuf,
        err: serde_json::Error,
    },

    #[error("Couldn't decode yaml structure from {file:?}:\n{err}")]
    Yaml {
        file: PathBuf,
        err: serde_yaml::Error,
    },

    #[error("The detector array table is empty")]
    NoDetectors,

    #[error("Detector {detector} has {got} vertices, but detector 0 has {expected}")]
    RaggedVertices {
        detector: usize,
        got: usize,
        expected: usize,
    },

    #[error("Detector polygons need at least 3 vertices, but got {0}")]
    TooFewVertices(usize),

    #[error("The detector array field '{field}' has {got} entries, but there are {expected} detectors")]
    DetectorFieldLength {
        field: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("The focal length must be positive, but got {0} m")]
    BadFocalLength(f64),

    #[error("The primary beam FWHM must be positive, but got {0} degrees")]
    BadBeamFwhm(f64),

    #[error("The horn array is empty")]
    NoHorns,

    #[error("The horn array field 'open' has {got} entries, but there are {expected} horns")]
    HornFieldLength { got: usize, expected: usize },

    #[error("No horns in the horn array are open")]
    NoOpenHorns,

    #[error("The horn spacing must be positive, but got {0} m")]
    BadHornSpacing(f64),

    #[error("IO error when attempting to read {file:?}: {err}")]
    IO {
        file: PathBuf,
        err: std::io::Error,
    },
}
