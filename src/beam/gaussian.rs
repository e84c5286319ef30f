// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::f64::consts::TAU;

use super::{beam_zenith_angle, Beam, BeamError, BeamType};
use crate::constants::FWHM_FACTOR;

/// A beam that is a Gaussian function of zenith angle and independent of
/// azimuth.
#[derive(Debug, Clone, Copy)]
pub struct GaussianBeam {
    /// \[degrees\]
    fwhm: f64,

    /// \[radians\]
    sigma: f64,

    backward: bool,
}

impl GaussianBeam {
    pub fn new(fwhm_deg: f64, backward: bool) -> Result<GaussianBeam, BeamError> {
        if !(fwhm_deg > 0.0) || !fwhm_deg.is_finite() {
            return Err(BeamError::BadFwhm(fwhm_deg));
        }
        Ok(GaussianBeam {
            fwhm: fwhm_deg,
            sigma: fwhm_deg.to_radians() / FWHM_FACTOR,
            backward,
        })
    }

    /// The full width at half maximum \[degrees\].
    pub fn fwhm(&self) -> f64 {
        self.fwhm
    }

    /// The standard deviation \[radians\].
    pub fn sigma(&self) -> f64 {
        self.sigma
    }
}

impl Beam for GaussianBeam {
    fn get_beam_type(&self) -> BeamType {
        BeamType::Gaussian
    }

    fn is_backward(&self) -> bool {
        self.backward
    }

    fn get_solid_angle(&self) -> f64 {
        TAU * self.sigma * self.sigma
    }

    fn calc_value(&self, theta: f64, _phi: f64) -> f64 {
        let theta = beam_zenith_angle(theta, self.backward);
        (-theta * theta / (2.0 * self.sigma * self.sigma)).exp()
    }
}
