// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use ndarray::prelude::*;

use crate::calibration::Calibration;

/// The array of horns (sub-apertures) feeding the combiner.
#[derive(Debug, Clone)]
pub struct HornArray {
    /// The 3D position of each horn \[metres\]. Shape (nhorn, 3).
    center: Array2<f64>,

    open: Vec<bool>,

    /// \[metres\]
    spacing: f64,
}

impl HornArray {
    pub fn new(calibration: &Calibration) -> HornArray {
        let center = &calibration.hornarray.center;
        let center = Array2::from_shape_fn((center.len(), 3), |(i, j)| center[i][j]);
        HornArray {
            center,
            open: calibration.horns_open(),
            spacing: calibration.hornarray.spacing,
        }
    }

    /// The number of horns, open or closed.
    pub fn len(&self) -> usize {
        self.open.len()
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub fn num_open(&self) -> usize {
        self.open.iter().filter(|&&o| o).count()
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn open(&self) -> &[bool] {
        &self.open
    }

    pub fn center(&self) -> ArrayView2<f64> {
        self.center.view()
    }

    /// The positions of the open horns only. Shape (nopen, 3).
    pub fn open_centers(&self) -> Array2<f64> {
        let open: Vec<usize> = self
            .open
            .iter()
            .enumerate()
            .filter(|(_, &o)| o)
            .map(|(i, _)| i)
            .collect();
        self.center.select(Axis(0), &open)
    }

    /// Close all horns except those listed. Indices out of range are ignored.
    pub fn with_only_open(mut self, horns: &[usize]) -> HornArray {
        self.open.iter_mut().for_each(|o| *o = false);
        for &h in horns {
            if let Some(o) = self.open.get_mut(h) {
                *o = true;
            }
        }
        self
    }
}
