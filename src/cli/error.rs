// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all qubic-related errors. This should be the *only* error
//! enum that is publicly visible from the binary.

use thiserror::Error;

use crate::{
    beam::BeamError, calibration::CalibrationError, instrument::InstrumentError,
    layout::LayoutError, sampling::SamplingError, scene::SceneError, sparse::SparseError,
};

/// The *only* publicly visible error from the `qubic` binary. Each error
/// message should say where to look for more information, unless it's
/// "generic".
#[derive(Error, Debug)]
pub enum QubicError {
    /// An error related to calibration tables.
    #[error("{0}\n\nCalibration tables need 'detarray', 'optics', 'primbeam' and 'hornarray' sections; see the README for their fields.")]
    Calibration(String),

    /// An error related to the detector layout or horn array.
    #[error("{0}\n\nSee 'qubic <subcommand> --help' for the instrument arguments.")]
    Instrument(String),

    /// An error related to the scene.
    #[error("{0}\n\nSee 'qubic <subcommand> --help' for the scene arguments.")]
    Scene(String),

    /// An error related to the synthetic beam or its peaks.
    #[error("{0}\n\nTry a larger synthetic-beam fraction or kmax, or check the primary-beam FWHM in the calibration file.")]
    SyntheticBeam(String),

    /// An error related to beam code.
    #[error("{0}\n\nSee 'qubic beam --help'.")]
    Beam(String),

    /// An error related to pointings.
    #[error("{0}\n\nSee 'qubic projection --help' for the pointing arguments.")]
    Sampling(String),

    /// An error related to projection matrices.
    #[error("{0}\n\nSee 'qubic projection --help'.")]
    Projection(String),

    /// An error related to argument files.
    #[error("{0}\n\nArgument files use the same names as the long command-line arguments, grouped into 'instrument', 'scene' and subcommand tables.")]
    ArgFile(String),

    /// A generic error that can't be clarified further with documentation, e.g.
    /// IO errors.
    #[error("{0}")]
    Generic(String),
}

// When changing the error propagation below, ensure `Self::from(e)` uses the
// correct `e`!

impl From<CalibrationError> for QubicError {
    fn from(e: CalibrationError) -> Self {
        let s = e.to_string();
        match e {
            CalibrationError::IO { .. } => Self::Generic(s),
            _ => Self::Calibration(s),
        }
    }
}

impl From<LayoutError> for QubicError {
    fn from(e: LayoutError) -> Self {
        Self::Instrument(e.to_string())
    }
}

impl From<BeamError> for QubicError {
    fn from(e: BeamError) -> Self {
        Self::Beam(e.to_string())
    }
}

impl From<SceneError> for QubicError {
    fn from(e: SceneError) -> Self {
        Self::Scene(e.to_string())
    }
}

impl From<SamplingError> for QubicError {
    fn from(e: SamplingError) -> Self {
        Self::Sampling(e.to_string())
    }
}

impl From<SparseError> for QubicError {
    fn from(e: SparseError) -> Self {
        let s = e.to_string();
        match e {
            SparseError::UnsupportedValueDtype(_) => Self::Instrument(s),
            SparseError::BadShape { .. } | SparseError::Shape(_) => Self::Projection(s),
        }
    }
}

impl From<InstrumentError> for QubicError {
    fn from(e: InstrumentError) -> Self {
        let s = e.to_string();
        match e {
            InstrumentError::Layout(e) => Self::from(e),
            InstrumentError::Beam(e) => Self::from(e),
            InstrumentError::Sparse(e) => Self::from(e),
            InstrumentError::BadFraction(_)
            | InstrumentError::ZeroPeakAmplitude { .. }
            | InstrumentError::ZeroBeamMap { .. }
            | InstrumentError::BadThetaMax(_) => Self::SyntheticBeam(s),
            InstrumentError::MissingCoordinate(_)
            | InstrumentError::PositionLength { .. }
            | InstrumentError::SourceLength { .. }
            | InstrumentError::BadSolidAngleCorrection { .. }
            | InstrumentError::SingleGridPolarisation
            | InstrumentError::NotInterferometer(_)
            | InstrumentError::TauLength { .. } => Self::Instrument(s),
            InstrumentError::TimelineShape { .. } => Self::Projection(s),
        }
    }
}

impl From<std::io::Error> for QubicError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
