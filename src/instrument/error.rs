// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from instrument-model calculations.

use thiserror::Error;

use crate::{beam::BeamError, layout::LayoutError, sparse::SparseError};

#[derive(Error, Debug)]
pub enum InstrumentError {
    #[error("The synthetic-beam fraction must be in (0, 1], but got {0}")]
    BadFraction(f64),

    #[error("The primary beam is zero (or non-finite) at every synthetic-beam peak of detector {detector}; its peak amplitudes cannot be normalised")]
    ZeroPeakAmplitude { detector: usize },

    #[error("Focal-plane positions need both x and y coordinates, but {0} is missing")]
    MissingCoordinate(&'static str),

    #[error("Got {x} x coordinates, {y} y coordinates and {area} areas; these must all be equal (or 1 area)")]
    PositionLength { x: usize, y: usize, area: usize },

    #[error("Got {theta} zenith angles, {phi} azimuths and {power} powers; these must all be equal (or 1 power)")]
    SourceLength {
        theta: usize,
        phi: usize,
        power: usize,
    },

    #[error("The solid-angle correction of focal-plane position {position} is {value}; the position must be in front of the focal plane and have a positive area")]
    BadSolidAngleCorrection { position: usize, value: f64 },

    #[error("The synthesised beam of focal-plane position {position} is zero everywhere within {theta_max} degrees of the zenith")]
    ZeroBeamMap { position: usize, theta_max: f64 },

    #[error("The maximum zenith angle must be in (0, 180] degrees, but got {0}")]
    BadThetaMax(f64),

    #[error("Polarised input not handled by a single detector grid")]
    SingleGridPolarisation,

    #[error("'{0}' is only available for the interferometric instrument")]
    NotInterferometer(&'static str),

    #[error("Expected timelines of shape {expected:?}, but got {got:?}")]
    TimelineShape {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Got {got} detector time constants, but there are {expected} detectors")]
    TauLength { got: usize, expected: usize },

    #[error(transparent)]
    Layout(#[from] LayoutError),

    #[error(transparent)]
    Beam(#[from] BeamError),

    #[error(transparent)]
    Sparse(#[from] SparseError),
}
