// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The pixelised sky observed by the instrument.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

use crate::{constants::SPEED_OF_LIGHT, pixel::num_pixels, sparse::IndexDtype};

lazy_static::lazy_static! {
    pub(crate) static ref SCENE_KINDS_COMMA_SEPARATED: String = SceneKind::iter().join(", ");
}

/// HEALPix maps with a larger `nside` would overflow 64-bit pixel counts in
/// the projection matrix shape.
const MAX_NSIDE: usize = 1 << 29;

/// The Stokes parameters of the sky.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
pub enum SceneKind {
    I,
    QU,
    IQU,
}

impl SceneKind {
    /// The number of Stokes parameters per pixel.
    pub fn ndim(self) -> usize {
        match self {
            SceneKind::I => 1,
            SceneKind::QU => 2,
            SceneKind::IQU => 3,
        }
    }

    pub fn is_polarised(self) -> bool {
        !matches!(self, SceneKind::I)
    }
}

#[derive(Error, Debug)]
pub enum SceneError {
    #[error("nside must be between 1 and {MAX_NSIDE}, but got {0}")]
    BadNside(usize),

    #[error("The observing frequency must be positive and finite, but got {0} Hz")]
    BadFrequency(f64),
}

/// A HEALPix sky at a single frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scene {
    kind: SceneKind,
    nside: usize,

    /// \[Hz\]
    nu: f64,
}

impl Scene {
    pub fn new(kind: SceneKind, nside: usize, nu: f64) -> Result<Scene, SceneError> {
        if nside == 0 || nside > MAX_NSIDE {
            return Err(SceneError::BadNside(nside));
        }
        if !(nu > 0.0) || !nu.is_finite() {
            return Err(SceneError::BadFrequency(nu));
        }
        Ok(Scene { kind, nside, nu })
    }

    pub fn kind(&self) -> SceneKind {
        self.kind
    }

    pub fn nside(&self) -> usize {
        self.nside
    }

    /// The observing frequency \[Hz\].
    pub fn nu(&self) -> f64 {
        self.nu
    }

    /// The observing wavelength \[metres\].
    pub fn wavelength(&self) -> f64 {
        SPEED_OF_LIGHT / self.nu
    }

    pub fn npix(&self) -> usize {
        num_pixels(self.nside)
    }

    pub fn ndim(&self) -> usize {
        self.kind.ndim()
    }

    /// The integer type needed to index the pixels of this scene.
    pub fn index_dtype(&self) -> IndexDtype {
        IndexDtype::for_nside(self.nside)
    }
}

impl std::fmt::Display for Scene {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} scene, nside {} ({} pixels), {} GHz",
            self.kind,
            self.nside,
            self.npix(),
            self.nu / 1e9
        )
    }
}
