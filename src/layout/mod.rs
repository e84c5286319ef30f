// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The geometry of the focal plane.
//!
//! Detectors are read from the `detarray` calibration table and placed in 3D at
//! `z = -focal_length`. With two grids, the whole detector set is duplicated
//! (the second grid follows the first), the ordering of the second grid is
//! offset by `max(index) + 1` and its quadrants by 4.
//!
//! A detector has a "logical" index, which is its position in the duplicated
//! table including removed detectors. Removed detectors are not part of the
//! layout, but the logical index of every kept detector is retained.

mod error;
mod horns;

pub use error::LayoutError;
pub use horns::HornArray;

use std::f64::consts::PI;

use log::{debug, trace};
use ndarray::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    calibration::Calibration,
    constants::*,
    math::{atan2, polygon_area},
};

/// A detector parameter given either for all detectors at once or for every
/// logical detector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DetectorParam {
    Scalar(f64),
    PerDetector(Vec<f64>),
}

impl From<f64> for DetectorParam {
    fn from(v: f64) -> Self {
        DetectorParam::Scalar(v)
    }
}

impl From<Vec<f64>> for DetectorParam {
    fn from(v: Vec<f64>) -> Self {
        DetectorParam::PerDetector(v)
    }
}

impl DetectorParam {
    /// Get a value for each of the `n` logical detectors.
    fn expand(&self, name: &'static str, n: usize) -> Result<Vec<f64>, LayoutError> {
        let values = match self {
            DetectorParam::Scalar(v) => vec![*v; n],
            DetectorParam::PerDetector(v) => {
                if v.len() != n {
                    return Err(LayoutError::ParamLength {
                        name,
                        got: v.len(),
                        expected: n,
                    });
                }
                v.clone()
            }
        };
        if values.iter().any(|v| !v.is_finite()) {
            return Err(LayoutError::NonFiniteParam { name });
        }
        Ok(values)
    }
}

/// Noise properties of the bolometers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorNoise {
    /// The standard deviation of the white noise component.
    pub sigma: DetectorParam,

    /// The 1/f knee frequency \[Hz\].
    pub fknee: DetectorParam,

    /// The 1/f slope index.
    pub fslope: DetectorParam,

    /// The time constants \[seconds\].
    pub tau: DetectorParam,

    /// The 1/f correlation length \[samples\].
    pub ncorr: usize,
}

impl Default for DetectorNoise {
    fn default() -> Self {
        DetectorNoise {
            sigma: DEFAULT_DETECTOR_SIGMA.into(),
            fknee: DEFAULT_DETECTOR_FKNEE.into(),
            fslope: DEFAULT_DETECTOR_FSLOPE.into(),
            tau: DEFAULT_DETECTOR_TAU.into(),
            ncorr: DEFAULT_DETECTOR_NCORR,
        }
    }
}

/// The (unremoved) bolometers of the focal plane.
#[derive(Debug, Clone)]
pub struct DetectorLayout {
    ngrids: u8,

    /// Shape (ndet, nvertex, 3) \[metres\].
    vertex: Array3<f64>,

    /// Shape (ndet, 3) \[metres\].
    center: Array2<f64>,

    /// The zenith angle of the line of sight of each detector \[radians\].
    theta: Array1<f64>,

    /// The azimuth of the line of sight of each detector \[radians\].
    phi: Array1<f64>,

    quadrant: Vec<u32>,
    ordering: Vec<i64>,
    logical_index: Vec<usize>,

    /// Whether each logical detector is part of the layout.
    selection: Vec<bool>,

    sigma: Array1<f64>,
    fknee: Array1<f64>,
    fslope: Array1<f64>,
    tau: Array1<f64>,
    ncorr: usize,

    /// The area of every detector \[m^2\].
    area: f64,

    /// \[metres\]
    focal_length: f64,
}

impl DetectorLayout {
    pub fn new(
        calibration: &Calibration,
        ngrids: u8,
        noise: &DetectorNoise,
    ) -> Result<DetectorLayout, LayoutError> {
        if !(1..=2).contains(&ngrids) {
            return Err(LayoutError::BadNumGrids(ngrids));
        }
        // The tables may have been built in memory rather than read from a
        // file.
        calibration.validate()?;
        let focal_length = calibration.optics.focal_length;
        let num_per_grid = calibration.num_detectors();
        let num_logical = num_per_grid * usize::from(ngrids);
        let num_vertices = calibration.detarray.vertex.first().map_or(0, Vec::len);
        debug!(
            "Building a layout of {ngrids} grid(s) with {num_per_grid} detectors each, focal length {focal_length} m"
        );

        // Everything is built for the logical detectors first and then the
        // removed ones are dropped.
        let removed = calibration.removed();
        let index = calibration.ordering();
        let quadrant = calibration.quadrants();
        let index_offset = index.iter().copied().max().unwrap_or(0) + 1;
        let mut all_removed = Vec::with_capacity(num_logical);
        let mut all_ordering = Vec::with_capacity(num_logical);
        let mut all_quadrant = Vec::with_capacity(num_logical);
        for grid in 0..ngrids {
            all_removed.extend_from_slice(&removed);
            all_ordering.extend(index.iter().map(|&i| i + i64::from(grid) * index_offset));
            all_quadrant.extend(quadrant.iter().map(|&q| q + 4 * u32::from(grid)));
        }

        let sigma = noise.sigma.expand("sigma", num_logical)?;
        let fknee = noise.fknee.expand("fknee", num_logical)?;
        let fslope = noise.fslope.expand("fslope", num_logical)?;
        let tau = noise.tau.expand("tau", num_logical)?;

        // Kept detectors, sorted by their readout ordering. The sort is stable
        // so equal orderings keep their table order.
        let mut logical_index: Vec<usize> = (0..num_logical).filter(|&i| !all_removed[i]).collect();
        if logical_index.is_empty() {
            return Err(LayoutError::AllRemoved);
        }
        logical_index.sort_by_key(|&i| all_ordering[i]);
        let ndet = logical_index.len();
        trace!("{} of {num_logical} detectors are kept", ndet);

        let vertex = Array3::from_shape_fn((ndet, num_vertices, 3), |(d, v, k)| {
            let xy = calibration.detarray.vertex[logical_index[d] % num_per_grid][v];
            match k {
                0 => xy[0],
                1 => xy[1],
                _ => -focal_length,
            }
        });
        let center = vertex.mean_axis(Axis(1)).unwrap_or_else(|| Array2::zeros((ndet, 3)));
        let theta = center
            .outer_iter()
            .map(|c| PI - atan2(c[0].hypot(c[1]), focal_length))
            .collect();
        let phi = center.outer_iter().map(|c| atan2(c[1], c[0])).collect();

        // All detectors are assumed to have the same area as the first kept
        // one.
        let area = polygon_area(vertex.index_axis(Axis(0), 0));

        let select = |values: &[f64]| -> Array1<f64> {
            logical_index.iter().map(|&i| values[i]).collect()
        };
        Ok(DetectorLayout {
            ngrids,
            vertex,
            center,
            theta,
            phi,
            quadrant: logical_index.iter().map(|&i| all_quadrant[i]).collect(),
            ordering: logical_index.iter().map(|&i| all_ordering[i]).collect(),
            selection: all_removed.iter().map(|&r| !r).collect(),
            sigma: select(&sigma),
            fknee: select(&fknee),
            fslope: select(&fslope),
            tau: select(&tau),
            ncorr: noise.ncorr,
            area,
            focal_length,
            logical_index,
        })
    }

    /// The number of detectors in the layout (i.e. not removed).
    pub fn len(&self) -> usize {
        self.logical_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logical_index.is_empty()
    }

    /// The number of logical detectors, including removed ones.
    pub fn num_logical(&self) -> usize {
        self.selection.len()
    }

    pub fn ngrids(&self) -> u8 {
        self.ngrids
    }

    pub fn vertex(&self) -> ArrayView3<f64> {
        self.vertex.view()
    }

    pub fn center(&self) -> ArrayView2<f64> {
        self.center.view()
    }

    pub fn theta(&self) -> ArrayView1<f64> {
        self.theta.view()
    }

    pub fn phi(&self) -> ArrayView1<f64> {
        self.phi.view()
    }

    pub fn quadrant(&self) -> &[u32] {
        &self.quadrant
    }

    /// The grid (0 or 1) of each detector.
    pub fn grid(&self) -> Vec<u32> {
        self.quadrant.iter().map(|q| q / 4).collect()
    }

    pub fn ordering(&self) -> &[i64] {
        &self.ordering
    }

    pub fn logical_index(&self) -> &[usize] {
        &self.logical_index
    }

    pub fn selection(&self) -> &[bool] {
        &self.selection
    }

    pub fn sigma(&self) -> ArrayView1<f64> {
        self.sigma.view()
    }

    pub fn fknee(&self) -> ArrayView1<f64> {
        self.fknee.view()
    }

    pub fn fslope(&self) -> ArrayView1<f64> {
        self.fslope.view()
    }

    pub fn tau(&self) -> ArrayView1<f64> {
        self.tau.view()
    }

    pub fn ncorr(&self) -> usize {
        self.ncorr
    }

    /// \[m^2\]
    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn focal_length(&self) -> f64 {
        self.focal_length
    }
}
