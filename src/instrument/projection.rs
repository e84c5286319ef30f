// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The peak sampling operator.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use log::{debug, info};
use ndarray::{parallel::prelude::*, prelude::*};

use super::{Instrument, InstrumentError};
use crate::{
    sparse::{
        kernels::{fill_indices, fill_values, ValueKernel},
        with_matrix, FsrMatrix, MatrixValue, PixelIndex, ProjectionOperator, SparseError,
        SparseProjection,
    },
    Sampling, Scene, SceneKind, PROGRESS_BARS,
};

impl Instrument {
    /// Build the operator projecting a sky map of the scene into the
    /// timelines of every detector.
    ///
    /// Each row block (detector, time) holds one entry per synthetic-beam
    /// peak: the pixel the peak falls in and the peak amplitude, combined with
    /// the polarisation rotation for polarised scenes.
    pub fn projection_operator(
        &self,
        sampling: &Sampling,
        scene: &Scene,
    ) -> Result<ProjectionOperator, InstrumentError> {
        let peaks = self.peak_angles(scene)?;
        let directions = peaks.directions();
        let ndet = self.len();
        let ntimes = sampling.len();
        let ncolmax = peaks.ncolmax();
        let ndim = scene.ndim();
        let index_dtype = scene.index_dtype();
        let value_dtype = self.config.synthbeam.dtype;

        let mut matrix = SparseProjection::new(
            index_dtype,
            value_dtype,
            ndet * ntimes,
            scene.npix(),
            ndim,
            ncolmax,
        );
        info!(
            "Allocated a {:?} projection matrix with {ncolmax} entries per row ({index_dtype} indices, {value_dtype} values): {:.3} MiB",
            matrix.shape(),
            matrix.nbytes() as f64 / 1024.0 / 1024.0
        );

        let kernel = ValueKernel::for_scene(scene.kind());
        with_matrix!(&mut matrix, m => fill_matrix(
            m,
            kernel,
            directions.view(),
            peaks.amplitude.view(),
            sampling,
            scene.nside(),
        )?);

        let shapeout = match scene.kind() {
            SceneKind::I => vec![ndet, ntimes],
            SceneKind::QU => vec![ndet, ntimes, 2],
            SceneKind::IQU => vec![ndet, ntimes, 3],
        };
        Ok(ProjectionOperator::new(matrix, shapeout)?)
    }
}

/// Fill the indices of every detector, then their values. Detectors are
/// processed in parallel; each writes only to its own row block.
fn fill_matrix<I: PixelIndex, V: MatrixValue>(
    matrix: &mut FsrMatrix<I, V>,
    kernel: ValueKernel,
    directions: ArrayView3<f64>,
    amplitudes: ArrayView2<f64>,
    sampling: &Sampling,
    nside: usize,
) -> Result<(), InstrumentError> {
    let ndet = directions.len_of(Axis(0));
    let ncolmax = directions.len_of(Axis(1));
    let ntimes = sampling.len();
    let ndim = matrix.ndim();
    let rotations = sampling.rotations();
    let (index, value) = matrix.data_mut();
    let mut index = index
        .into_shape_with_order((ndet, ntimes, ncolmax))
        .map_err(SparseError::from)?;
    let mut value = value
        .into_shape_with_order((ndet, ntimes, ncolmax, ndim))
        .map_err(SparseError::from)?;

    let progress = ProgressBar::with_draw_target(
        Some(ndet as _),
        if PROGRESS_BARS.load() {
            ProgressDrawTarget::stdout()
        } else {
            ProgressDrawTarget::hidden()
        },
    )
    .with_style(
        ProgressStyle::default_bar()
            .template("{msg:17}: [{wide_bar:.blue}] {pos:2}/{len:2} detectors ({elapsed_precise}<{eta_precise})").unwrap()
            .progress_chars("=> "),
    )
    .with_position(0)
    .with_message("Pixel indices");
    index
        .outer_iter_mut()
        .into_par_iter()
        .zip(directions.outer_iter())
        .for_each(|(index, directions)| {
            fill_indices(index, directions, rotations, nside);
            progress.inc(1);
        });
    progress.abandon_with_message("Finished pixel indices");
    debug!("Filled pixel indices of {ndet} detectors");

    value
        .outer_iter_mut()
        .into_par_iter()
        .zip(directions.outer_iter())
        .zip(amplitudes.outer_iter())
        .for_each(|((value, directions), amplitudes)| {
            fill_values(kernel, value, directions, amplitudes, rotations);
        });
    debug!("Filled {kernel:?} values of {ndet} detectors");
    Ok(())
}
