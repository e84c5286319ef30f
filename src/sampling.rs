// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Time-ordered pointing information.

use thiserror::Error;
use vec1::Vec1;

use crate::math::{euler_zyz, transpose, Rot3};

#[derive(Error, Debug)]
pub enum SamplingError {
    #[error("A sampling needs at least one time sample")]
    NoSamples,

    #[error("Got {got} half-wave plate angles, but there are {expected} time samples")]
    HwpLength { got: usize, expected: usize },

    #[error("The sampling period must be non-negative and finite, but got {0} s")]
    BadPeriod(f64),

    #[error("The rotation of time sample {0} contains non-finite values")]
    NonFiniteRotation(usize),
}

/// A boresight direction and a rotation about it \[degrees\].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pointing {
    /// The zenith angle of the boresight on the sky.
    pub theta: f64,

    /// The azimuth of the boresight on the sky.
    pub phi: f64,

    /// The rotation of the instrument about its boresight.
    pub psi: f64,
}

/// The pointing of the instrument at each time sample.
#[derive(Debug, Clone)]
pub struct Sampling {
    /// Sky-frame to instrument-frame rotations.
    rotations: Vec1<Rot3>,

    /// \[degrees\]
    angle_hwp: Option<Vec<f64>>,

    /// \[seconds\]
    period: f64,
}

impl Sampling {
    /// Create a sampling from the sky-to-instrument rotation of each time
    /// sample.
    pub fn new(rotations: Vec<Rot3>, period: f64) -> Result<Sampling, SamplingError> {
        let rotations = Vec1::try_from_vec(rotations).map_err(|_| SamplingError::NoSamples)?;
        if let Some(i) = rotations
            .iter()
            .position(|r| r.iter().flatten().any(|e| !e.is_finite()))
        {
            return Err(SamplingError::NonFiniteRotation(i));
        }
        if !(period >= 0.0) || !period.is_finite() {
            return Err(SamplingError::BadPeriod(period));
        }
        Ok(Sampling {
            rotations,
            angle_hwp: None,
            period,
        })
    }

    /// Create a sampling from boresight pointings.
    pub fn from_pointings(pointings: &[Pointing], period: f64) -> Result<Sampling, SamplingError> {
        let rotations = pointings
            .iter()
            .map(|p| {
                let instrument_to_sky =
                    euler_zyz(p.phi.to_radians(), p.theta.to_radians(), p.psi.to_radians());
                transpose(&instrument_to_sky)
            })
            .collect();
        Sampling::new(rotations, period)
    }

    /// Attach half-wave plate angles \[degrees\], one per time sample.
    pub fn with_hwp_angles(mut self, angles: Vec<f64>) -> Result<Sampling, SamplingError> {
        if angles.len() != self.len() {
            return Err(SamplingError::HwpLength {
                got: angles.len(),
                expected: self.len(),
            });
        }
        self.angle_hwp = Some(angles);
        Ok(self)
    }

    /// The number of time samples.
    pub fn len(&self) -> usize {
        self.rotations.len()
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn rotations(&self) -> &[Rot3] {
        &self.rotations
    }

    /// The half-wave plate angle of each time sample \[degrees\]. Without a
    /// half-wave plate, all angles are zero.
    pub fn angle_hwp(&self) -> Vec<f64> {
        match &self.angle_hwp {
            Some(a) => a.clone(),
            None => vec![0.0; self.len()],
        }
    }

    pub fn has_hwp(&self) -> bool {
        self.angle_hwp.is_some()
    }

    /// \[seconds\]
    pub fn period(&self) -> f64 {
        self.period
    }
}
