// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Operators acting on detector timelines: the polarising grid, the half-wave
//! plate and the bolometer time response.
//!
//! Timelines have shape (ndet, ntimes), or (ndet, ntimes, ndim) when they
//! still carry Stokes parameters.

use ndarray::{parallel::prelude::*, prelude::*};

use super::{Instrument, InstrumentError};
use crate::{Sampling, Scene, SceneKind};

fn check_shape(got: &[usize], expected: &[usize]) -> Result<(), InstrumentError> {
    if got != expected {
        return Err(InstrumentError::TimelineShape {
            expected: expected.to_vec(),
            got: got.to_vec(),
        });
    }
    Ok(())
}

/// The polarising grid in front of the detectors.
#[derive(Debug, Clone)]
pub enum PolarizerOperator {
    /// Unpolarised input is shared equally between the grids.
    Homothety {
        factor: f64,
        shape: (usize, usize),
    },

    /// Each detector sees a weighted sum of the Stokes parameters. `weights`
    /// has shape (ndet, ndim).
    Grids { weights: Array2<f64>, ntimes: usize },
}

impl PolarizerOperator {
    /// Map timelines to (ndet, ntimes).
    pub fn apply(&self, input: ArrayViewD<f64>) -> Result<Array2<f64>, InstrumentError> {
        match self {
            PolarizerOperator::Homothety { factor, shape } => {
                check_shape(input.shape(), &[shape.0, shape.1])?;
                Ok(input
                    .to_shape(*shape)
                    .map_err(crate::sparse::SparseError::from)?
                    .mapv(|v| v * factor))
            }
            PolarizerOperator::Grids { weights, ntimes } => {
                let (ndet, ndim) = weights.dim();
                check_shape(input.shape(), &[ndet, *ntimes, ndim])?;
                let mut out = Array2::zeros((ndet, *ntimes));
                for ((mut out, input), w) in out
                    .outer_iter_mut()
                    .zip(input.outer_iter())
                    .zip(weights.outer_iter())
                {
                    for (out, stokes) in out.iter_mut().zip(input.outer_iter()) {
                        *out = stokes.iter().zip(w.iter()).map(|(s, w)| s * w).sum();
                    }
                }
                Ok(out)
            }
        }
    }
}

/// The rotation of the polarisation by the half-wave plate.
#[derive(Debug, Clone)]
pub struct HwpOperator {
    kind: SceneKind,
    ndet: usize,

    /// The rotation angle of each time sample \[degrees\].
    angles: Vec<f64>,
}

impl HwpOperator {
    /// The rotation angle of each time sample \[degrees\].
    pub fn angles(&self) -> &[f64] {
        &self.angles
    }

    /// Rotate the (Q, U) components of the timelines. Intensity timelines are
    /// returned as is.
    pub fn apply(&self, input: ArrayViewD<f64>) -> Result<ArrayD<f64>, InstrumentError> {
        let ntimes = self.angles.len();
        match self.kind {
            SceneKind::I => {
                check_shape(input.shape(), &[self.ndet, ntimes])?;
                Ok(input.to_owned())
            }
            SceneKind::QU | SceneKind::IQU => {
                let ndim = self.kind.ndim();
                check_shape(input.shape(), &[self.ndet, ntimes, ndim])?;
                // Q and U are the last two components.
                let (iq, iu) = (ndim - 2, ndim - 1);
                let mut out = input.to_owned();
                for mut det in out.outer_iter_mut() {
                    for (mut stokes, angle) in det.outer_iter_mut().zip(&self.angles) {
                        let (s, c) = angle.to_radians().sin_cos();
                        let (q, u) = (stokes[iq], stokes[iu]);
                        stokes[iq] = c * q - s * u;
                        stokes[iu] = s * q + c * u;
                    }
                }
                Ok(out)
            }
        }
    }
}

/// The bolometer time response.
#[derive(Debug, Clone)]
pub enum DetectorResponseOperator {
    Identity { shape: (usize, usize) },

    /// Convolution with a truncated exponential; one time constant per
    /// detector in units of the sampling period.
    TruncatedExponential {
        tau_over_period: Vec<f64>,
        ntimes: usize,
    },
}

impl DetectorResponseOperator {
    /// Apply the response to (ndet, ntimes) timelines. The filter is causal
    /// with unit gain for constant timelines.
    pub fn apply(&self, input: ArrayView2<f64>) -> Result<Array2<f64>, InstrumentError> {
        match self {
            DetectorResponseOperator::Identity { shape } => {
                check_shape(input.shape(), &[shape.0, shape.1])?;
                Ok(input.to_owned())
            }
            DetectorResponseOperator::TruncatedExponential {
                tau_over_period,
                ntimes,
            } => {
                check_shape(input.shape(), &[tau_over_period.len(), *ntimes])?;
                let mut out = input.to_owned();
                out.outer_iter_mut()
                    .into_par_iter()
                    .zip(tau_over_period.par_iter())
                    .for_each(|(mut timeline, &tau)| {
                        let w = if tau > 0.0 { (-1.0 / tau).exp() } else { 0.0 };
                        for i in 1..timeline.len() {
                            timeline[i] = w * timeline[i - 1] + (1.0 - w) * timeline[i];
                        }
                    });
                Ok(out)
            }
        }
    }
}

impl Instrument {
    /// The operator for the polarising grid. A single grid cannot separate
    /// polarised input.
    pub fn polarizer_operator(
        &self,
        sampling: &Sampling,
        scene: &Scene,
    ) -> Result<PolarizerOperator, InstrumentError> {
        let ndet = self.len();
        let ntimes = sampling.len();
        let ngrids = self.layout.ngrids();
        if scene.kind() == SceneKind::I {
            return Ok(PolarizerOperator::Homothety {
                factor: 1.0 / f64::from(ngrids),
                shape: (ndet, ntimes),
            });
        }
        if ngrids == 1 {
            return Err(InstrumentError::SingleGridPolarisation);
        }

        let ndim = scene.ndim();
        let mut weights = Array2::zeros((ndet, ndim));
        for (mut w, grid) in weights.outer_iter_mut().zip(self.layout.grid()) {
            let q = 0.5 - f64::from(grid);
            match scene.kind() {
                SceneKind::IQU => w.assign(&array![0.5, q, 0.0]),
                _ => w.assign(&array![q, 0.0]),
            }
        }
        Ok(PolarizerOperator::Grids { weights, ntimes })
    }

    /// The rotation by the half-wave plate: minus four times its angle.
    pub fn hwp_operator(&self, sampling: &Sampling, scene: &Scene) -> HwpOperator {
        HwpOperator {
            kind: scene.kind(),
            ndet: self.len(),
            angles: sampling.angle_hwp().into_iter().map(|a| -4.0 * a).collect(),
        }
    }

    /// The bolometer time response. Without `tau` \[seconds\], the
    /// detector time constants are used. With a zero sampling period the
    /// response is the identity.
    pub fn detector_response_operator(
        &self,
        sampling: &Sampling,
        tau: Option<&[f64]>,
    ) -> Result<DetectorResponseOperator, InstrumentError> {
        let ndet = self.len();
        let ntimes = sampling.len();
        let period = sampling.period();
        if period == 0.0 {
            return Ok(DetectorResponseOperator::Identity {
                shape: (ndet, ntimes),
            });
        }
        let tau = match tau {
            Some(t) if t.len() == 1 => vec![t[0]; ndet],
            Some(t) if t.len() == ndet => t.to_vec(),
            Some(t) => {
                return Err(InstrumentError::TauLength {
                    got: t.len(),
                    expected: ndet,
                })
            }
            None => self.layout.tau().to_vec(),
        };
        Ok(DetectorResponseOperator::TruncatedExponential {
            tau_over_period: tau.into_iter().map(|t| t / period).collect(),
            ntimes,
        })
    }
}
