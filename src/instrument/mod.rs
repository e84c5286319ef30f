// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The instrument model.
//!
//! An [`Instrument`] owns the focal-plane layout, the horn array and the beams
//! built from a [`Calibration`]. Two kinds of instrument exist: a classical
//! imager with a single-peak beam, and the bolometric interferometer whose
//! synthetic beam is a grid of diffraction peaks.

mod error;
mod operators;
mod peaks;
mod projection;
mod response;
#[cfg(test)]
mod tests;

pub use error::InstrumentError;
pub use operators::{DetectorResponseOperator, HwpOperator, PolarizerOperator};
pub use peaks::PeakSet;
pub use response::FocalPlanePositions;

use log::debug;
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::{
    beam::{create_beam_object, Beam, BeamType},
    calibration::Calibration,
    constants::*,
    layout::{DetectorLayout, DetectorNoise, HornArray},
    math::compress_mask,
    sparse::ValueDtype,
};

/// The kind of instrument.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
pub enum InstrumentKind {
    /// A classical imager with a well-behaved single-peak beam.
    #[strum(serialize = "simple")]
    #[serde(rename = "simple")]
    Simple,

    /// The bolometric interferometer.
    #[strum(serialize = "interferometer")]
    #[serde(rename = "interferometer")]
    Interferometer,
}

/// Settings of the synthetic beam.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticBeamConfig {
    /// The type used to store the values of projection matrices.
    pub dtype: ValueDtype,

    /// The fraction of significant peaks retained.
    pub fraction: f64,

    /// The diffraction order above which peaks are ignored.
    pub kmax: usize,
}

impl Default for SyntheticBeamConfig {
    fn default() -> Self {
        SyntheticBeamConfig {
            dtype: ValueDtype::F32,
            fraction: DEFAULT_SYNTHBEAM_FRACTION,
            kmax: DEFAULT_SYNTHBEAM_KMAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstrumentConfig {
    pub kind: InstrumentKind,

    /// The number of detector grids (1 or 2).
    pub ngrids: u8,

    pub noise: DetectorNoise,

    pub synthbeam: SyntheticBeamConfig,
}

impl Default for InstrumentConfig {
    fn default() -> Self {
        InstrumentConfig {
            kind: InstrumentKind::Interferometer,
            ngrids: DEFAULT_DETECTOR_NGRIDS,
            noise: DetectorNoise::default(),
            synthbeam: SyntheticBeamConfig::default(),
        }
    }
}

pub struct Instrument {
    config: InstrumentConfig,
    calibration: Calibration,
    layout: DetectorLayout,
    horns: HornArray,
    primary_beam: Box<dyn Beam>,
    secondary_beam: Box<dyn Beam>,
}

impl Instrument {
    /// Build an instrument. The primary beam is a forward Gaussian with the
    /// calibrated FWHM, the secondary beam the same Gaussian looking backward.
    pub fn new(
        calibration: Calibration,
        config: InstrumentConfig,
    ) -> Result<Instrument, InstrumentError> {
        let fraction = config.synthbeam.fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(InstrumentError::BadFraction(fraction));
        }

        let layout = DetectorLayout::new(&calibration, config.ngrids, &config.noise)?;
        let horns = HornArray::new(&calibration);
        let fwhm = calibration.primbeam.fwhm;
        let primary_beam = create_beam_object(BeamType::Gaussian, fwhm, false)?;
        let secondary_beam = create_beam_object(BeamType::Gaussian, fwhm, true)?;
        debug!(
            "Created a {} instrument with {} detectors and {} open horns",
            config.kind,
            layout.len(),
            horns.num_open()
        );

        Ok(Instrument {
            config,
            calibration,
            layout,
            horns,
            primary_beam,
            secondary_beam,
        })
    }

    /// Replace the primary and secondary beams.
    pub fn with_beams(mut self, primary: Box<dyn Beam>, secondary: Box<dyn Beam>) -> Instrument {
        self.primary_beam = primary;
        self.secondary_beam = secondary;
        self
    }

    /// Replace the horn array, e.g. to close some horns.
    pub fn with_horns(mut self, horns: HornArray) -> Instrument {
        self.horns = horns;
        self
    }

    /// The number of (unremoved) detectors.
    pub fn len(&self) -> usize {
        self.layout.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layout.is_empty()
    }

    pub fn kind(&self) -> InstrumentKind {
        self.config.kind
    }

    pub fn config(&self) -> &InstrumentConfig {
        &self.config
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn layout(&self) -> &DetectorLayout {
        &self.layout
    }

    pub fn horns(&self) -> &HornArray {
        &self.horns
    }

    pub fn primary_beam(&self) -> &dyn Beam {
        self.primary_beam.as_ref()
    }

    pub fn secondary_beam(&self) -> &dyn Beam {
        self.secondary_beam.as_ref()
    }

    pub fn focal_length(&self) -> f64 {
        self.layout.focal_length()
    }

    fn require_interferometer(&self, operation: &'static str) -> Result<(), InstrumentError> {
        match self.config.kind {
            InstrumentKind::Interferometer => Ok(()),
            InstrumentKind::Simple => Err(InstrumentError::NotInterferometer(operation)),
        }
    }
}

impl std::fmt::Display for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Instrument:")?;
        writeln!(f, "    kind: {}", self.config.kind)?;
        writeln!(f, "    ngrids: {}", self.layout.ngrids())?;
        writeln!(f, "    selection: {}", compress_mask(self.layout.selection()))?;
        if self.config.kind == InstrumentKind::Interferometer {
            writeln!(f, "    synthbeam_fraction: {}", self.config.synthbeam.fraction)?;
        }
        writeln!(f)?;
        writeln!(f, "Calibration:")?;
        for line in self.calibration.to_string().lines() {
            writeln!(f, "    {line}")?;
        }
        Ok(())
    }
}
