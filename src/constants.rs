// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Useful constants.

All constants *must* be double precision. Calculations should be done in double
precision as much as possible before converting to a lower precision (e.g. when
filling the values of a projection matrix).
 */

pub use std::f64::consts::{FRAC_PI_2, PI, TAU};

/// Speed of light in vacuum \[m/s\].
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// The number of detector grids (one per polarisation direction) behind the
/// polarising grid.
pub const DEFAULT_DETECTOR_NGRIDS: u8 = 2;

/// The standard deviation of the detector white noise component.
pub const DEFAULT_DETECTOR_SIGMA: f64 = 10.0;

/// The detector 1/f knee frequency \[Hz\].
pub const DEFAULT_DETECTOR_FKNEE: f64 = 0.0;

/// The detector 1/f slope index.
pub const DEFAULT_DETECTOR_FSLOPE: f64 = 1.0;

/// The detector 1/f correlation length \[samples\].
pub const DEFAULT_DETECTOR_NCORR: usize = 10;

/// The detector time constant \[s\].
pub const DEFAULT_DETECTOR_TAU: f64 = 0.01;

/// The fraction of the synthetic-beam power retained when discarding
/// non-significant peaks.
pub const DEFAULT_SYNTHBEAM_FRACTION: f64 = 0.99;

/// The diffraction order above which synthetic-beam peaks are ignored. With 8,
/// all physically meaningful peaks are considered.
pub const DEFAULT_SYNTHBEAM_KMAX: usize = 8;

/// Above this `nside`, pixel indices no longer fit in 32-bit integers.
pub const MAX_NSIDE_INDEX32: usize = 8192;

/// The largest temporary horn-by-pixel array allowed when synthesising beam
/// maps \[bytes\].
pub const SYNTHBEAM_MAX_MEMORY_BYTES: f64 = 1e9;

/// The number of bytes used per (horn, pixel) pair when synthesising beam maps
/// (one complex double and one double).
pub const SYNTHBEAM_BYTES_PER_ELEMENT: usize = 24;
static_assertions::const_assert_eq!(
    SYNTHBEAM_BYTES_PER_ELEMENT,
    std::mem::size_of::<num_complex::Complex64>() + std::mem::size_of::<f64>()
);

/// The default zenith angle above which synthesised beams are assumed to be
/// zero \[degrees\].
pub const DEFAULT_SYNTHBEAM_THETA_MAX_DEG: f64 = 45.0;

/// FWHM = sqrt(8 ln 2) sigma for a Gaussian.
pub const FWHM_FACTOR: f64 = 2.354_820_045_030_949_3;
