// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with beam calculations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BeamError {
    #[error("The beam FWHM must be positive and finite, but got {0} degrees")]
    BadFwhm(f64),

    #[error("Got {theta} zenith angles but {phi} azimuths")]
    DirectionLengthMismatch { theta: usize, phi: usize },

    #[error("The results buffer has length {got}, but {expected} directions were given")]
    ResultsLengthMismatch { got: usize, expected: usize },
}
