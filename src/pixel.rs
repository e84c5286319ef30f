// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Thin wrappers around the HEALPix ring-scheme pixelization of `scorus`.

use std::f64::consts::{PI, TAU};

use scorus::{
    coordinates::SphCoord,
    healpix::{
        pix::{ang2pix_ring, pix2ang_ring},
        utils::nside2npix,
    },
};

use crate::math::{cartesian_to_zenith_azimuth, Vec3};

/// The number of pixels of a map with the given `nside`.
#[inline]
pub fn num_pixels(nside: usize) -> usize {
    nside2npix(nside)
}

/// Convert a (zenith angle, azimuth) direction \[radians\] to a ring-scheme
/// pixel index. The azimuth may take any value; it is wrapped into [0, 2pi).
#[inline]
pub fn angle_to_pixel(nside: usize, theta: f64, phi: f64) -> usize {
    let theta = theta.clamp(0.0, PI);
    let phi = phi.rem_euclid(TAU);
    ang2pix_ring::<f64>(nside, SphCoord::new(theta, phi))
}

/// Convert a ring-scheme pixel index to the (zenith angle, azimuth) of its
/// centre \[radians\].
#[inline]
pub fn pixel_to_angle(nside: usize, pixel: usize) -> (f64, f64) {
    let dir = pix2ang_ring::<f64>(nside, pixel);
    (dir.pol, dir.az)
}

/// Convert a Cartesian direction (need not be normalised) to a ring-scheme
/// pixel index.
#[inline]
pub fn vector_to_pixel(nside: usize, v: &Vec3) -> usize {
    let (theta, phi) = cartesian_to_zenith_azimuth(v);
    angle_to_pixel(nside, theta, phi)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;
    use crate::math::zenith_azimuth_to_cartesian;

    #[test]
    fn test_num_pixels() {
        assert_eq!(num_pixels(1), 12);
        assert_eq!(num_pixels(16), 3072);
        assert_eq!(num_pixels(8192), 12 * 8192 * 8192);
    }

    #[test]
    fn test_pixel_round_trip() {
        let nside = 32;
        for pixel in [0, 1, 100, 5000, num_pixels(nside) - 1] {
            let (theta, phi) = pixel_to_angle(nside, pixel);
            assert_eq!(angle_to_pixel(nside, theta, phi), pixel);
            let v = zenith_azimuth_to_cartesian(theta, phi);
            assert_eq!(vector_to_pixel(nside, &v), pixel);
        }
    }

    #[test]
    fn test_azimuth_is_wrapped() {
        let nside = 16;
        let (theta, phi) = pixel_to_angle(nside, 1234);
        assert_eq!(angle_to_pixel(nside, theta, phi - TAU), 1234);
        assert_eq!(angle_to_pixel(nside, theta, phi + 2.0 * TAU), 1234);
    }

    #[test]
    fn test_poles() {
        let nside = 8;
        let north = vector_to_pixel(nside, &[0.0, 0.0, 1.0]);
        let south = vector_to_pixel(nside, &[0.0, 0.0, -2.0]);
        assert!(north < 4);
        assert!(south >= num_pixels(nside) - 4);
        let (theta, _) = pixel_to_angle(nside, north);
        assert_abs_diff_eq!(theta, 0.0, epsilon = 0.2);
    }
}
