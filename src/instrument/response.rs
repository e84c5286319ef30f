// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Electric-field transmission through the interferometer.
//!
//! The field on the focal plane is the coherent sum over the open horns of the
//! transmission from the sources to each horn ("B") times the transmission from
//! each horn to the focal plane ("A").

use std::f64::consts::TAU;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, trace};
use ndarray::{parallel::prelude::*, prelude::*};
use num_complex::Complex64;

use super::{Instrument, InstrumentError};
use crate::{
    constants::{SPEED_OF_LIGHT, SYNTHBEAM_BYTES_PER_ELEMENT, SYNTHBEAM_MAX_MEMORY_BYTES},
    math::{cartesian_to_zenith_azimuth, cexp, normalise, split, zenith_azimuth_to_cartesian},
    pixel::pixel_to_angle,
    Scene, PROGRESS_BARS,
};

/// Where on the focal plane a response is computed.
#[derive(Debug, Clone, PartialEq)]
pub enum FocalPlanePositions {
    /// The centres of the detectors, each with the detector area.
    Detectors,

    /// Explicit positions \[metres\] and integration areas \[m^2\].
    Points {
        x: Vec<f64>,
        y: Vec<f64>,
        area: Vec<f64>,
    },
}

impl FocalPlanePositions {
    /// Without coordinates, the detectors are used. Both coordinates must be
    /// given otherwise. A single area applies to all positions.
    pub fn new(
        x: Option<Vec<f64>>,
        y: Option<Vec<f64>>,
        area: Vec<f64>,
    ) -> Result<FocalPlanePositions, InstrumentError> {
        match (x, y) {
            (None, None) => Ok(FocalPlanePositions::Detectors),
            (Some(_), None) => Err(InstrumentError::MissingCoordinate("y")),
            (None, Some(_)) => Err(InstrumentError::MissingCoordinate("x")),
            (Some(x), Some(y)) => {
                if x.len() != y.len() || (area.len() != 1 && area.len() != x.len()) {
                    return Err(InstrumentError::PositionLength {
                        x: x.len(),
                        y: y.len(),
                        area: area.len(),
                    });
                }
                let area = if area.len() == 1 {
                    vec![area[0]; x.len()]
                } else {
                    area
                };
                Ok(FocalPlanePositions::Points { x, y, area })
            }
        }
    }

    /// A single position with unit area.
    pub fn point(x: f64, y: f64) -> FocalPlanePositions {
        FocalPlanePositions::Points {
            x: vec![x],
            y: vec![y],
            area: vec![1.0],
        }
    }
}

impl Instrument {
    /// (x, y, z) and area of each focal-plane position.
    fn resolve_positions(&self, positions: &FocalPlanePositions) -> (Array2<f64>, Vec<f64>) {
        match positions {
            FocalPlanePositions::Detectors => (
                self.layout.center().to_owned(),
                vec![self.layout.area(); self.len()],
            ),
            FocalPlanePositions::Points { x, y, area } => {
                let f = self.focal_length();
                let xyz = Array2::from_shape_fn((x.len(), 3), |(i, j)| match j {
                    0 => x[i],
                    1 => y[i],
                    _ => -f,
                });
                (xyz, area.clone())
            }
        }
    }

    /// The phase and transmission from the open horns to positions on the
    /// focal plane. Shape (npos, nopen).
    pub fn response_from_horns_to_focalplane(
        &self,
        scene: &Scene,
        positions: &FocalPlanePositions,
    ) -> Result<Array2<Complex64>, InstrumentError> {
        self.require_interferometer("response_from_horns_to_focalplane")?;
        let f = self.focal_length();
        let (xyz, area) = self.resolve_positions(positions);
        let horns = self.horns.open_centers();
        let k = TAU * scene.nu() / SPEED_OF_LIGHT;
        let solid_angle = self.secondary_beam.get_solid_angle();

        let mut out = Array2::zeros((xyz.nrows(), horns.nrows()));
        for (position, ((mut out, p), &area)) in out
            .outer_iter_mut()
            .zip(xyz.outer_iter())
            .zip(area.iter())
            .enumerate()
        {
            let uvec = normalise([p[0], p[1], p[2]]);
            let (theta, phi) = cartesian_to_zenith_azimuth(&uvec);
            let sr = -area / (f * f) * theta.cos().powi(3);
            if !(sr >= 0.0) || !sr.is_finite() {
                return Err(InstrumentError::BadSolidAngleCorrection {
                    position,
                    value: sr,
                });
            }
            let tr = (self.secondary_beam.calc_value(theta, phi) * sr / solid_angle).sqrt();
            for (out, h) in out.iter_mut().zip(horns.outer_iter()) {
                let product = uvec[0] * h[0] + uvec[1] * h[1] + uvec[2] * h[2];
                *out = tr * cexp(k * product);
            }
        }
        Ok(out)
    }

    /// The phase and transmission from sources at (theta, phi) \[radians\]
    /// with the given power \[W\] to the open horns. Shape (nopen, nsources).
    /// A single power applies to all sources.
    pub fn response_from_sources_to_horns(
        &self,
        scene: &Scene,
        theta: &[f64],
        phi: &[f64],
        power: &[f64],
    ) -> Result<Array2<Complex64>, InstrumentError> {
        self.require_interferometer("response_from_sources_to_horns")?;
        if theta.len() != phi.len() || (power.len() != 1 && power.len() != theta.len()) {
            return Err(InstrumentError::SourceLength {
                theta: theta.len(),
                phi: phi.len(),
                power: power.len(),
            });
        }
        let horns = self.horns.open_centers();
        let k = TAU * scene.nu() / SPEED_OF_LIGHT;
        let primary = self.primary_beam.calc_values(theta, phi)?;

        let mut out = Array2::zeros((horns.nrows(), theta.len()));
        out.axis_iter_mut(Axis(1))
            .into_par_iter()
            .enumerate()
            .for_each(|(s, mut out)| {
                let uvec = zenith_azimuth_to_cartesian(theta[s], phi[s]);
                let power = if power.len() == 1 { power[0] } else { power[s] };
                let source_e = (power * primary[s]).sqrt();
                for (out, h) in out.iter_mut().zip(horns.outer_iter()) {
                    let product = h[0] * uvec[0] + h[1] * uvec[1] + h[2] * uvec[2];
                    *out = source_e * cexp(k * product);
                }
            });
        Ok(out)
    }

    /// The electric field created by sources at (theta, phi) \[radians\] on
    /// the focal-plane positions. Shape (npos, nsources).
    pub fn response(
        &self,
        scene: &Scene,
        theta: &[f64],
        phi: &[f64],
        power: &[f64],
        positions: &FocalPlanePositions,
    ) -> Result<Array2<Complex64>, InstrumentError> {
        let a = self.response_from_horns_to_focalplane(scene, positions)?;
        let b = self.response_from_sources_to_horns(scene, theta, phi, power)?;
        Ok(a.dot(&b))
    }

    /// The monochromatic synthetic beam of focal-plane positions as HEALPix
    /// maps of the scene. Shape (npos, npix).
    ///
    /// Only pixels within `theta_max` \[degrees\] of the zenith are computed;
    /// the others are zero. Pixels are processed in chunks so that the
    /// temporary horn-by-pixel arrays stay within a fixed memory budget. Each
    /// position's map is normalised to sum to one on its own; the maps don't
    /// share a single normalisation.
    pub fn synthesized_beam_map(
        &self,
        scene: &Scene,
        positions: &FocalPlanePositions,
        theta_max: f64,
    ) -> Result<Array2<f64>, InstrumentError> {
        self.require_interferometer("synthesized_beam_map")?;
        if !(theta_max > 0.0 && theta_max <= 180.0) {
            return Err(InstrumentError::BadThetaMax(theta_max));
        }
        let nside = scene.nside();
        let theta_max_rad = theta_max.to_radians();
        let (index, (theta, phi)): (Vec<usize>, (Vec<f64>, Vec<f64>)) = (0..scene.npix())
            .map(|p| (p, pixel_to_angle(nside, p)))
            .filter(|(_, (t, _))| *t <= theta_max_rad)
            .unzip();

        let nhorn = self.horns.len();
        let npix = index.len();
        let nbytes = (npix * nhorn * SYNTHBEAM_BYTES_PER_ELEMENT) as f64;
        let ngroup = (nbytes / SYNTHBEAM_MAX_MEMORY_BYTES).ceil() as usize;
        let groups = split(npix, ngroup);
        debug!(
            "Synthesising beams over {npix} pixels within {theta_max}° in {} chunk(s)",
            groups.len()
        );

        let a = self.response_from_horns_to_focalplane(scene, positions)?;
        let mut out = Array2::zeros((a.nrows(), scene.npix()));
        let progress = ProgressBar::with_draw_target(
            Some(groups.len() as _),
            if PROGRESS_BARS.load() {
                ProgressDrawTarget::stdout()
            } else {
                ProgressDrawTarget::hidden()
            },
        )
        .with_style(
            ProgressStyle::default_bar()
                .template("{msg:17}: [{wide_bar:.blue}] {pos:2}/{len:2} chunks ({elapsed_precise}<{eta_precise})").unwrap()
                .progress_chars("=> "),
        )
        .with_position(0)
        .with_message("Synthesising beam");
        for group in groups {
            trace!("Pixel chunk {group:?}");
            let b = self.response_from_sources_to_horns(
                scene,
                &theta[group.clone()],
                &phi[group.clone()],
                &[1.0],
            )?;
            let e = a.dot(&b);
            for (mut out, e) in out.outer_iter_mut().zip(e.outer_iter()) {
                for (&pixel, e) in index[group.clone()].iter().zip(e.iter()) {
                    out[pixel] = e.norm_sqr();
                }
            }
            progress.inc(1);
        }
        progress.abandon_with_message("Finished beam");

        for (position, mut row) in out.outer_iter_mut().enumerate() {
            let sum = row.sum();
            if !(sum > 0.0) || !sum.is_finite() {
                return Err(InstrumentError::ZeroBeamMap {
                    position,
                    theta_max,
                });
            }
            row.mapv_inplace(|v| v / sum);
        }
        Ok(out)
    }
}
