// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Code to abstract beam calculations.
//!
//! [`Beam`] is a trait detailing how to get the power transmission of a horn
//! (or of the combiner optics seen from the focal plane) as a function of
//! direction. By making this trait, we can neatly abstract over multiple beam
//! shapes, including a simple [`UniformHalfSpaceBeam`] (which transmits
//! everything in front of it).
//!
//! Directions are always given as a zenith angle `theta` and an azimuth `phi`
//! \[radians\]. A "backward" beam looks down the negative z axis, i.e. the
//! zenith angle is replaced by `pi - theta`. Non-finite directions produce
//! non-finite values; callers decide what to do with them.

mod error;
mod gaussian;

pub use error::BeamError;
pub use gaussian::GaussianBeam;

use std::f64::consts::{FRAC_PI_2, PI, TAU};

use itertools::Itertools;
use rayon::prelude::*;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

lazy_static::lazy_static! {
    pub(crate) static ref BEAM_TYPES_COMMA_SEPARATED: String = BeamType::iter().join(", ");
}

/// Supported beam types.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, EnumIter, EnumString)]
pub enum BeamType {
    /// A Gaussian profile in zenith angle.
    #[strum(serialize = "gaussian")]
    Gaussian,

    /// Unity over a half space, zero elsewhere.
    #[strum(serialize = "uniform")]
    UniformHalfSpace,
}

/// A trait abstracting beam code functions.
pub trait Beam: Sync + Send {
    /// Get the type of beam.
    fn get_beam_type(&self) -> BeamType;

    /// Does this beam look down the negative z axis?
    fn is_backward(&self) -> bool;

    /// The integral of the beam over the sphere \[steradians\].
    fn get_solid_angle(&self) -> f64;

    /// Calculate the beam transmission for a single direction.
    fn calc_value(&self, theta: f64, phi: f64) -> f64;

    /// Calculate the beam transmission for multiple directions.
    fn calc_values(&self, theta: &[f64], phi: &[f64]) -> Result<Vec<f64>, BeamError> {
        let mut results = vec![0.0; theta.len()];
        self.calc_values_inner(theta, phi, &mut results)?;
        Ok(results)
    }

    /// Calculate the beam transmission for multiple directions, saving the
    /// results into the supplied slice. The slice must have the same length as
    /// `theta` and `phi`.
    fn calc_values_inner(
        &self,
        theta: &[f64],
        phi: &[f64],
        results: &mut [f64],
    ) -> Result<(), BeamError> {
        if theta.len() != phi.len() {
            return Err(BeamError::DirectionLengthMismatch {
                theta: theta.len(),
                phi: phi.len(),
            });
        }
        if results.len() != theta.len() {
            return Err(BeamError::ResultsLengthMismatch {
                got: results.len(),
                expected: theta.len(),
            });
        }
        results
            .par_iter_mut()
            .zip(theta.par_iter().zip(phi.par_iter()))
            .for_each(|(result, (&theta, &phi))| {
                *result = self.calc_value(theta, phi);
            });
        Ok(())
    }
}

/// The zenith angle as seen by a beam, i.e. flipped for backward beams.
#[inline]
fn beam_zenith_angle(theta: f64, backward: bool) -> f64 {
    if backward {
        PI - theta
    } else {
        theta
    }
}

/// A beam transmitting everything in its half space.
#[derive(Debug, Clone, Copy)]
pub struct UniformHalfSpaceBeam {
    backward: bool,
}

impl UniformHalfSpaceBeam {
    pub fn new(backward: bool) -> UniformHalfSpaceBeam {
        UniformHalfSpaceBeam { backward }
    }
}

impl Beam for UniformHalfSpaceBeam {
    fn get_beam_type(&self) -> BeamType {
        BeamType::UniformHalfSpace
    }

    fn is_backward(&self) -> bool {
        self.backward
    }

    fn get_solid_angle(&self) -> f64 {
        TAU
    }

    fn calc_value(&self, theta: f64, _phi: f64) -> f64 {
        let theta = beam_zenith_angle(theta, self.backward);
        if theta.is_nan() {
            f64::NAN
        } else if theta <= FRAC_PI_2 {
            1.0
        } else {
            0.0
        }
    }
}

/// Create a Gaussian beam object.
pub fn create_gaussian_beam_object(
    fwhm_deg: f64,
    backward: bool,
) -> Result<Box<dyn Beam>, BeamError> {
    Ok(Box::new(GaussianBeam::new(fwhm_deg, backward)?))
}

/// Create a uniform half-space beam object.
pub fn create_uniform_beam_object(backward: bool) -> Box<dyn Beam> {
    Box::new(UniformHalfSpaceBeam::new(backward))
}

/// Create a beam object of the requested type. The FWHM is only used by
/// Gaussian beams.
pub fn create_beam_object(
    beam_type: BeamType,
    fwhm_deg: f64,
    backward: bool,
) -> Result<Box<dyn Beam>, BeamError> {
    match beam_type {
        BeamType::Gaussian => create_gaussian_beam_object(fwhm_deg, backward),
        BeamType::UniformHalfSpace => Ok(create_uniform_beam_object(backward)),
    }
}
