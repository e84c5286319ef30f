// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Kernels filling the row block of one detector of a projection matrix.
//!
//! Each kernel is generic over the index and value types, so the inner loops
//! over (time, peak) are monomorphised for every supported combination.

use ndarray::prelude::*;

use super::{MatrixValue, PixelIndex};
use crate::{
    math::{atan2, cartesian_to_zenith_azimuth, dot, normalise, rotate_transpose, Rot3, Vec3},
    pixel::vector_to_pixel,
    SceneKind,
};

/// How the values of a projection matrix are computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValueKernel {
    /// The peak amplitude, identical at all times.
    Intensity,

    /// (Q, U) rotation blocks.
    Rotation2d,

    /// (I, Q, U) blocks, rotating (Q, U) only.
    Rotation3d,
}

impl ValueKernel {
    pub(crate) fn for_scene(kind: SceneKind) -> ValueKernel {
        match kind {
            SceneKind::I => ValueKernel::Intensity,
            SceneKind::QU => ValueKernel::Rotation2d,
            SceneKind::IQU => ValueKernel::Rotation3d,
        }
    }
}

/// Rotate the fixed peak directions of a detector into the sky frame at every
/// time sample and write their pixel indices.
///
/// `index` has shape (ntimes, ncolmax) and `directions` (ncolmax, 3).
pub(crate) fn fill_indices<I: PixelIndex>(
    mut index: ArrayViewMut2<I>,
    directions: ArrayView2<f64>,
    rotations: &[Rot3],
    nside: usize,
) {
    for (mut index, rotation) in index.outer_iter_mut().zip(rotations) {
        for (index, direction) in index.iter_mut().zip(directions.outer_iter()) {
            let e_nf = [direction[0], direction[1], direction[2]];
            let e_ni = rotate_transpose(rotation, &e_nf);
            *index = I::from_pixel(vector_to_pixel(nside, &e_ni));
        }
    }
}

/// Write the values of a detector's row block.
///
/// `value` has shape (ntimes, ncolmax, ndim), `directions` (ncolmax, 3) and
/// `amplitudes` (ncolmax).
pub(crate) fn fill_values<V: MatrixValue>(
    kernel: ValueKernel,
    value: ArrayViewMut3<V>,
    directions: ArrayView2<f64>,
    amplitudes: ArrayView1<f64>,
    rotations: &[Rot3],
) {
    match kernel {
        ValueKernel::Intensity => intensity(value, amplitudes),
        ValueKernel::Rotation2d => rotation::<V, false>(value, directions, amplitudes, rotations),
        ValueKernel::Rotation3d => rotation::<V, true>(value, directions, amplitudes, rotations),
    }
}

fn intensity<V: MatrixValue>(mut value: ArrayViewMut3<V>, amplitudes: ArrayView1<f64>) {
    for mut value in value.outer_iter_mut() {
        for (mut block, &a) in value.outer_iter_mut().zip(amplitudes) {
            block[0] = V::from_f64(a);
        }
    }
}

fn rotation<V: MatrixValue, const WITH_I: bool>(
    mut value: ArrayViewMut3<V>,
    directions: ArrayView2<f64>,
    amplitudes: ArrayView1<f64>,
    rotations: &[Rot3],
) {
    for (mut value, rotation) in value.outer_iter_mut().zip(rotations) {
        for ((mut block, direction), &a) in value
            .outer_iter_mut()
            .zip(directions.outer_iter())
            .zip(amplitudes)
        {
            let e_nf = [direction[0], direction[1], direction[2]];
            let psi = polarisation_angle(rotation, &e_nf);
            let (s, c) = (2.0 * psi).sin_cos();
            if WITH_I {
                block[0] = V::from_f64(a);
                block[1] = V::from_f64(a * c);
                block[2] = V::from_f64(a * s);
            } else {
                block[0] = V::from_f64(a * c);
                block[1] = V::from_f64(a * s);
            }
        }
    }
}

/// The angle \[radians\] on the sky between the local meridian and the
/// polarisation direction of the instrument (its x axis) for a ray arriving
/// from the instrument-frame direction `e_nf`. `rotation` maps the sky frame to
/// the instrument frame. At the poles, the meridian of zero azimuth is used.
pub(crate) fn polarisation_angle(rotation: &Rot3, e_nf: &Vec3) -> f64 {
    // The instrument x axis, made perpendicular to the ray.
    let x = [1.0, 0.0, 0.0];
    let d = dot(&x, e_nf);
    let ex_f = normalise([x[0] - d * e_nf[0], x[1] - d * e_nf[1], x[2] - d * e_nf[2]]);

    let e_ni = rotate_transpose(rotation, e_nf);
    let ex_i = rotate_transpose(rotation, &ex_f);
    let (theta, phi) = cartesian_to_zenith_azimuth(&e_ni);
    let (s_theta, c_theta) = theta.sin_cos();
    let (s_phi, c_phi) = phi.sin_cos();
    let e_theta = [c_theta * c_phi, c_theta * s_phi, -s_theta];
    let e_phi = [-s_phi, c_phi, 0.0];
    atan2(dot(&ex_i, &e_phi), dot(&ex_i, &e_theta))
}
