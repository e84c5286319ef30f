// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Synthetic-beam peaks.

use std::f64::consts::{FRAC_PI_2, PI};

use log::{debug, trace};
use ndarray::prelude::*;

use super::{Instrument, InstrumentError, InstrumentKind};
use crate::{
    math::{atan2, zenith_azimuth_to_cartesian},
    Scene,
};

/// The synthetic-beam peaks of every detector, sorted by decreasing amplitude.
/// All arrays have shape (ndet, ncolmax); unused peaks have zero amplitude.
#[derive(Debug, Clone)]
pub struct PeakSet {
    /// \[radians\]
    pub theta: Array2<f64>,

    /// \[radians\]
    pub phi: Array2<f64>,

    pub amplitude: Array2<f64>,
}

impl PeakSet {
    pub fn num_detectors(&self) -> usize {
        self.theta.nrows()
    }

    /// The number of peaks per detector.
    pub fn ncolmax(&self) -> usize {
        self.theta.ncols()
    }

    /// The Cartesian direction of every peak in the instrument frame. Shape
    /// (ndet, ncolmax, 3).
    pub fn directions(&self) -> Array3<f64> {
        let mut out = Array3::zeros((self.num_detectors(), self.ncolmax(), 3));
        for ((mut out, &theta), &phi) in out
            .lanes_mut(Axis(2))
            .into_iter()
            .zip(self.theta.iter())
            .zip(self.phi.iter())
        {
            let v = zenith_azimuth_to_cartesian(theta, phi);
            out[0] = v[0];
            out[1] = v[1];
            out[2] = v[2];
        }
        out
    }
}

impl Instrument {
    /// The (unfiltered) peak positions for all diffraction orders up to
    /// `kmax`. Both arrays have shape (ndet, (2 kmax + 1)^2); the order index
    /// `kx` varies slowest. Peaks that don't exist (the perturbed direction
    /// leaves the unit sphere) have a NaN zenith angle.
    pub fn peak_angles_kmax(&self, scene: &Scene, kmax: usize) -> (Array2<f64>, Array2<f64>) {
        let ndet = self.len();
        let f = self.focal_length();
        let lambda_over_dx = scene.wavelength() / self.horns.spacing();
        let kmax = kmax as i64;
        let orders: Vec<(f64, f64)> = (-kmax..=kmax)
            .flat_map(|kx| (-kmax..=kmax).map(move |ky| (kx as f64, ky as f64)))
            .collect();

        let mut theta = Array2::zeros((ndet, orders.len()));
        let mut phi = Array2::zeros((ndet, orders.len()));
        for ((c, mut theta), mut phi) in self
            .layout
            .center()
            .outer_iter()
            .zip(theta.outer_iter_mut())
            .zip(phi.outer_iter_mut())
        {
            // The unit line of sight of the detector.
            let norm = (c[0] * c[0] + c[1] * c[1] + f * f).sqrt();
            let (los_x, los_y) = (-c[0] / norm, -c[1] / norm);
            for ((theta, phi), &(kx, ky)) in theta.iter_mut().zip(phi.iter_mut()).zip(&orders) {
                let nx = los_x - lambda_over_dx * kx;
                let ny = los_y - lambda_over_dx * ky;
                *theta = (nx * nx + ny * ny).sqrt().asin();
                *phi = atan2(ny, nx);
            }
        }
        (theta, phi)
    }

    /// The peaks of the synthetic beam of every detector.
    ///
    /// For the interferometer, peaks are weighted by the primary beam, only the
    /// most significant peaks carrying the configured fraction of the power are
    /// kept, and each detector's amplitudes are scaled by the secondary-beam
    /// transmission along its line of sight. The simple imager has a single
    /// peak of unit amplitude per detector.
    pub fn peak_angles(&self, scene: &Scene) -> Result<PeakSet, InstrumentError> {
        match self.config.kind {
            InstrumentKind::Simple => Ok(self.single_peaks()),
            InstrumentKind::Interferometer => {
                let mut peaks = self.normalised_peaks(scene, self.config.synthbeam.fraction)?;
                for (mut amplitude, &theta) in peaks
                    .amplitude
                    .outer_iter_mut()
                    .zip(self.layout.theta().iter())
                {
                    let secondary = self.secondary_beam.calc_value(theta, 0.0);
                    amplitude.mapv_inplace(|a| a * secondary);
                }
                Ok(peaks)
            }
        }
    }

    fn single_peaks(&self) -> PeakSet {
        let theta = self.layout.theta().mapv(|t| -t).insert_axis(Axis(1));
        let phi = self.layout.phi().mapv(|p| p + PI).insert_axis(Axis(1));
        let amplitude = Array2::ones(theta.raw_dim());
        PeakSet {
            theta,
            phi,
            amplitude,
        }
    }

    /// The significant peaks with amplitudes summing to one for each detector.
    pub(crate) fn normalised_peaks(
        &self,
        scene: &Scene,
        fraction: f64,
    ) -> Result<PeakSet, InstrumentError> {
        let (theta, phi) = self.peak_angles_kmax(scene, self.config.synthbeam.kmax);
        let ndet = theta.nrows();
        let npeaks = theta.ncols();

        // Weight by the primary beam; non-finite values don't contribute.
        let mut amplitude = Array2::zeros((ndet, npeaks));
        for ((a, &t), &p) in amplitude.iter_mut().zip(theta.iter()).zip(phi.iter()) {
            let v = self.primary_beam.calc_value(t, p);
            *a = if v.is_finite() { v } else { 0.0 };
        }
        normalise_rows(amplitude.view_mut())?;

        // Sort each detector's peaks by decreasing amplitude (stable, so ties
        // keep their diffraction order) and find how many are needed to reach
        // the fraction. If it's never reached, all peaks are kept.
        let mut order = Vec::with_capacity(ndet);
        let mut imaxs = Vec::with_capacity(ndet);
        for row in amplitude.outer_iter() {
            let mut o: Vec<usize> = (0..npeaks).collect();
            o.sort_by(|&a, &b| row[b].total_cmp(&row[a]));
            let mut cumsum = 0.0;
            let imax = o
                .iter()
                .position(|&i| {
                    cumsum += row[i];
                    cumsum >= fraction
                })
                .map_or(npeaks, |i| i + 1);
            order.push(o);
            imaxs.push(imax);
        }
        let imax = imaxs.iter().copied().max().unwrap_or(0);
        debug!("Keeping {imax} of {npeaks} synthetic-beam peaks per detector");
        trace!("Peaks kept per detector: {imaxs:?}");

        let mut out = PeakSet {
            theta: Array2::zeros((ndet, imax)),
            phi: Array2::zeros((ndet, imax)),
            amplitude: Array2::zeros((ndet, imax)),
        };
        for (d, (o, &imax_d)) in order.iter().zip(imaxs.iter()).enumerate() {
            for (k, &i) in o.iter().take(imax).enumerate() {
                let a = amplitude[(d, i)];
                let (t, p) = (theta[(d, i)], phi[(d, i)]);
                // Insignificant peaks (and peaks that don't exist) point
                // somewhere harmless.
                if k >= imax_d || !t.is_finite() || !p.is_finite() {
                    out.theta[(d, k)] = FRAC_PI_2;
                    out.phi[(d, k)] = 0.0;
                    out.amplitude[(d, k)] = if k >= imax_d { 0.0 } else { a };
                } else {
                    out.theta[(d, k)] = t;
                    out.phi[(d, k)] = p;
                    out.amplitude[(d, k)] = a;
                }
            }
        }
        normalise_rows(out.amplitude.view_mut())?;
        Ok(out)
    }
}

/// Make every row sum to one. A row summing to zero (or a non-finite value) is
/// an error.
fn normalise_rows(mut a: ArrayViewMut2<f64>) -> Result<(), InstrumentError> {
    for (detector, mut row) in a.outer_iter_mut().enumerate() {
        let sum = row.sum();
        if !(sum > 0.0) || !sum.is_finite() {
            return Err(InstrumentError::ZeroPeakAmplitude { detector });
        }
        row.mapv_inplace(|v| v / sum);
    }
    Ok(())
}
