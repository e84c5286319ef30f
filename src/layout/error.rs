// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with building the focal-plane layout.

use thiserror::Error;

use crate::calibration::CalibrationError;

#[derive(Error, Debug)]
pub enum LayoutError {
    #[error("The number of detector grids must be 1 or 2, but got {0}")]
    BadNumGrids(u8),

    #[error("The detector parameter '{name}' has {got} values, but there are {expected} detectors (including removed detectors)")]
    ParamLength {
        name: &'static str,
        got: usize,
        expected: usize,
    },

    #[error("The detector parameter '{name}' contains a non-finite value")]
    NonFiniteParam { name: &'static str },

    #[error("All detectors are marked as removed")]
    AllRemoved,

    #[error(transparent)]
    Calibration(#[from] CalibrationError),
}
