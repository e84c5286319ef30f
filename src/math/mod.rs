// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.


use std::ops::Range;

use itertools::Itertools;
use ndarray::ArrayView2;
use num_complex::Complex64;

/// A Cartesian unit vector.
pub type Vec3 = [f64; 3];

/// A 3x3 rotation matrix, row major.
pub type Rot3 = [[f64; 3]; 3];

/// Inverse tangent. y comes before x, like the C function.
///
/// # Examples
///
/// `assert_abs_diff_eq!(atan2(1, -1), 3.0 / 4.0 * PI);`
// I don't like Rust's atan2. This fn helps me sleep at night knowing I'm using
// it correctly.
#[inline]
pub(crate) fn atan2(y: f64, x: f64) -> f64 {
    y.atan2(x)
}

/// Complex exponential. The argument is assumed to be purely imaginary.
///
/// This function doesn't actually use complex numbers; it just returns the real
/// and imag components from Euler's formula (i.e. e^{ix} = cos{x} + i sin{x}).
///
/// # Examples
///
/// `assert_abs_diff_eq!(cexp(PI), Complex64::new(-1.0, 0.0));`
#[inline]
pub(crate) fn cexp(x: f64) -> Complex64 {
    let (im, re) = x.sin_cos();
    Complex64::new(re, im)
}

#[inline]
pub(crate) fn dot(a: &Vec3, b: &Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub(crate) fn norm(a: &Vec3) -> f64 {
    dot(a, a).sqrt()
}

/// Scale a vector to unit length. A zero vector is returned as is.
#[inline]
pub(crate) fn normalise(a: Vec3) -> Vec3 {
    let n = norm(&a);
    if n == 0.0 {
        return a;
    }
    [a[0] / n, a[1] / n, a[2] / n]
}

/// Spherical (zenith angle, azimuth) \[radians\] to a Cartesian unit vector.
#[inline]
pub fn zenith_azimuth_to_cartesian(theta: f64, phi: f64) -> Vec3 {
    let (s_theta, c_theta) = theta.sin_cos();
    let (s_phi, c_phi) = phi.sin_cos();
    [s_theta * c_phi, s_theta * s_phi, c_theta]
}

/// Cartesian vector (not necessarily normalised) to spherical (zenith angle,
/// azimuth) \[radians\]. The azimuth is within (-pi, pi].
#[inline]
pub fn cartesian_to_zenith_azimuth(v: &Vec3) -> (f64, f64) {
    let theta = atan2((v[0] * v[0] + v[1] * v[1]).sqrt(), v[2]);
    let phi = atan2(v[1], v[0]);
    (theta, phi)
}

/// Apply the transpose (i.e. the inverse) of a rotation matrix to a vector.
#[inline]
pub(crate) fn rotate_transpose(r: &Rot3, v: &Vec3) -> Vec3 {
    [
        r[0][0] * v[0] + r[1][0] * v[1] + r[2][0] * v[2],
        r[0][1] * v[0] + r[1][1] * v[1] + r[2][1] * v[2],
        r[0][2] * v[0] + r[1][2] * v[1] + r[2][2] * v[2],
    ]
}

/// Apply a rotation matrix to a vector.
#[inline]
pub(crate) fn rotate(r: &Rot3, v: &Vec3) -> Vec3 {
    [dot(&r[0], v), dot(&r[1], v), dot(&r[2], v)]
}

pub(crate) fn transpose(r: &Rot3) -> Rot3 {
    [
        [r[0][0], r[1][0], r[2][0]],
        [r[0][1], r[1][1], r[2][1]],
        [r[0][2], r[1][2], r[2][2]],
    ]
}

pub(crate) fn matmul(a: &Rot3, b: &Rot3) -> Rot3 {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in out.iter_mut().enumerate() {
        for (j, elem) in row.iter_mut().enumerate() {
            *elem = (0..3).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// The rotation Rz(phi) Ry(theta) Rz(psi) \[radians\]. Applied to the z axis,
/// it gives the direction with zenith angle `theta` and azimuth `phi`.
pub fn euler_zyz(phi: f64, theta: f64, psi: f64) -> Rot3 {
    let rz = |a: f64| {
        let (s, c) = a.sin_cos();
        [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]]
    };
    let (s, c) = theta.sin_cos();
    let ry = [[c, 0.0, s], [0.0, 1.0, 0.0], [-s, 0.0, c]];
    matmul(&matmul(&rz(phi), &ry), &rz(psi))
}

/// The area of a simple (non self-intersecting) polygon with the shoelace
/// formula. Each row of `vertices` is an (x, y) pair.
pub(crate) fn polygon_area(vertices: ArrayView2<f64>) -> f64 {
    let n = vertices.nrows();
    let twice_area: f64 = (0..n)
        .map(|i| {
            let j = (i + 1) % n;
            vertices[(i, 0)] * vertices[(j, 1)] - vertices[(j, 0)] * vertices[(i, 1)]
        })
        .sum();
    twice_area.abs() / 2.0
}

/// Partition `n` items into `num_groups` contiguous ranges of roughly equal
/// size. The first `n % num_groups` ranges are one item longer than the rest.
pub(crate) fn split(n: usize, num_groups: usize) -> Vec<Range<usize>> {
    let num_groups = num_groups.clamp(1, n.max(1));
    let base = n / num_groups;
    let remainder = n % num_groups;
    let mut start = 0;
    (0..num_groups)
        .map(|i| {
            let len = base + usize::from(i < remainder);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

/// Represent the `true` elements of a mask as ranges of indices, e.g.
/// "0-3,7,9-10". An empty selection is "none".
pub(crate) fn compress_mask(mask: &[bool]) -> String {
    let ranges = mask
        .iter()
        .enumerate()
        .filter(|(_, &m)| m)
        .map(|(i, _)| i)
        .fold(Vec::<(usize, usize)>::new(), |mut acc, i| {
            match acc.last_mut() {
                Some((_, end)) if *end + 1 == i => *end = i,
                _ => acc.push((i, i)),
            }
            acc
        });
    if ranges.is_empty() {
        return "none".to_string();
    }
    ranges
        .into_iter()
        .map(|(start, end)| {
            if start == end {
                format!("{start}")
            } else {
                format!("{start}-{end}")
            }
        })
        .join(",")
}
