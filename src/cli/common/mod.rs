// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Common arguments for command-line interfaces. Most `qubic` subcommands need
//! an instrument and a scene, so the arguments describing them are shared.

mod printers;
#[cfg(test)]
mod tests;

pub(super) use printers::InfoPrinter;
pub(crate) use printers::{display_warnings, Warn};

use std::{path::PathBuf, str::FromStr};

use clap::Parser;
use itertools::Itertools;
use log::debug;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use super::QubicError;
use crate::{
    calibration::Calibration,
    constants::*,
    instrument::{Instrument, InstrumentConfig, InstrumentKind, SyntheticBeamConfig},
    layout::DetectorNoise,
    math::compress_mask,
    scene::{Scene, SceneKind, SCENE_KINDS_COMMA_SEPARATED},
    sparse::{ValueDtype, VALUE_DTYPES_COMMA_SEPARATED},
};

const DEFAULT_SCENE_KIND: SceneKind = SceneKind::I;
const DEFAULT_NSIDE: usize = 256;
const DEFAULT_FREQ_GHZ: f64 = 150.0;

lazy_static::lazy_static! {
    pub(super) static ref ARG_FILE_TYPES_COMMA_SEPARATED: String = ArgFileTypes::iter().join(", ");

    pub(super) static ref ARG_FILE_HELP: String =
        format!("All arguments may be specified in a file. Any CLI arguments override arguments set in the file. Supported formats: {}", *ARG_FILE_TYPES_COMMA_SEPARATED);

    static ref INSTRUMENT_KIND_HELP: String =
        format!("The kind of instrument. Valid kinds are: {}. Default: {}",
                InstrumentKind::iter().join(", "), InstrumentKind::Interferometer);

    static ref NGRIDS_HELP: String =
        format!("The number of detector grids behind the polarising grid (1 or 2). Default: {DEFAULT_DETECTOR_NGRIDS}");

    static ref FRACTION_HELP: String =
        format!("The fraction of the synthetic-beam power carried by the retained peaks. Default: {DEFAULT_SYNTHBEAM_FRACTION}");

    static ref KMAX_HELP: String =
        format!("The diffraction order above which synthetic-beam peaks are ignored. Default: {DEFAULT_SYNTHBEAM_KMAX}");

    static ref DTYPE_HELP: String =
        format!("The type of projection-matrix values. Valid types are: {}. Default: {}",
                *VALUE_DTYPES_COMMA_SEPARATED, ValueDtype::default());

    static ref TAU_HELP: String =
        format!("The time constant of every bolometer [seconds]. Default: {DEFAULT_DETECTOR_TAU}");

    static ref SCENE_KIND_HELP: String =
        format!("The Stokes parameters of the sky. Valid kinds are: {}. Default: {DEFAULT_SCENE_KIND}", *SCENE_KINDS_COMMA_SEPARATED);

    static ref NSIDE_HELP: String =
        format!("The HEALPix nside of the sky maps. Default: {DEFAULT_NSIDE}");

    static ref FREQ_HELP: String =
        format!("The observing frequency [GHz]. Default: {DEFAULT_FREQ_GHZ}");
}

#[derive(Debug, Display, EnumIter, EnumString)]
pub(super) enum ArgFileTypes {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

macro_rules! unpack_arg_file {
    ($arg_file:expr) => ({
        use std::{fs::File, io::Read, str::FromStr};

        use crate::cli::common::{ArgFileTypes, ARG_FILE_TYPES_COMMA_SEPARATED};

        debug!("Attempting to parse argument file {}", $arg_file.display());

        let mut contents = String::new();
        let arg_file_type = $arg_file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ArgFileTypes::from_str(&e).ok());

        match arg_file_type {
            Some(ArgFileTypes::Toml) => {
                debug!("Parsing toml file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match toml::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(QubicError::ArgFile(format!(
                            "Couldn't decode toml structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }
            Some(ArgFileTypes::Json) => {
                debug!("Parsing json file...");
                let mut fh = File::open(&$arg_file)?;
                fh.read_to_string(&mut contents)?;
                match serde_json::from_str(&contents) {
                    Ok(p) => p,
                    Err(err) => {
                        return Err(QubicError::ArgFile(format!(
                            "Couldn't decode json structure from {:?}:\n{err}",
                            $arg_file
                        )))
                    }
                }
            }

            _ => {
                return Err(QubicError::ArgFile(format!(
                    "Argument file '{:?}' doesn't have a recognised file extension! Valid extensions are: {}", $arg_file, *ARG_FILE_TYPES_COMMA_SEPARATED)
                ))
            }
        }
    });
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct InstrumentArgs {
    /// Path to the calibration file describing the detectors, optics and
    /// horns (toml, json or yaml).
    #[clap(short, long, parse(from_str), help_heading = "INSTRUMENT")]
    pub(super) calibration: Option<PathBuf>,

    #[clap(long, help = INSTRUMENT_KIND_HELP.as_str(), help_heading = "INSTRUMENT")]
    pub(super) instrument_kind: Option<String>,

    #[clap(long, help = NGRIDS_HELP.as_str(), help_heading = "INSTRUMENT")]
    pub(super) ngrids: Option<u8>,

    #[clap(long, help = TAU_HELP.as_str(), help_heading = "INSTRUMENT")]
    pub(super) detector_tau: Option<f64>,

    #[clap(long, help = FRACTION_HELP.as_str(), help_heading = "SYNTHETIC BEAM")]
    pub(super) synthbeam_fraction: Option<f64>,

    #[clap(long, help = KMAX_HELP.as_str(), help_heading = "SYNTHETIC BEAM")]
    pub(super) synthbeam_kmax: Option<usize>,

    #[clap(long, help = DTYPE_HELP.as_str(), help_heading = "SYNTHETIC BEAM")]
    pub(super) synthbeam_dtype: Option<String>,
}

impl InstrumentArgs {
    pub(super) fn merge(self, other: Self) -> Self {
        Self {
            calibration: self.calibration.or(other.calibration),
            instrument_kind: self.instrument_kind.or(other.instrument_kind),
            ngrids: self.ngrids.or(other.ngrids),
            detector_tau: self.detector_tau.or(other.detector_tau),
            synthbeam_fraction: self.synthbeam_fraction.or(other.synthbeam_fraction),
            synthbeam_kmax: self.synthbeam_kmax.or(other.synthbeam_kmax),
            synthbeam_dtype: self.synthbeam_dtype.or(other.synthbeam_dtype),
        }
    }

    /// Read the calibration file and build the instrument.
    pub(super) fn parse(self) -> Result<Instrument, QubicError> {
        let Self {
            calibration,
            instrument_kind,
            ngrids,
            detector_tau,
            synthbeam_fraction,
            synthbeam_kmax,
            synthbeam_dtype,
        } = self;

        let calibration = match calibration {
            Some(c) => Calibration::from_file(c)?,
            None => {
                return Err(QubicError::Calibration(
                    "No calibration file was supplied".to_string(),
                ))
            }
        };
        let kind = match instrument_kind {
            Some(k) => InstrumentKind::from_str(&k).map_err(|_| {
                QubicError::Instrument(format!(
                    "Unrecognised instrument kind '{k}'; valid kinds are: {}",
                    InstrumentKind::iter().join(", ")
                ))
            })?,
            None => InstrumentKind::Interferometer,
        };
        let dtype = match synthbeam_dtype {
            Some(d) => ValueDtype::parse(&d)?,
            None => ValueDtype::default(),
        };
        let noise = DetectorNoise {
            tau: detector_tau.unwrap_or(DEFAULT_DETECTOR_TAU).into(),
            ..Default::default()
        };
        let config = InstrumentConfig {
            kind,
            ngrids: ngrids.unwrap_or(DEFAULT_DETECTOR_NGRIDS),
            noise,
            synthbeam: SyntheticBeamConfig {
                dtype,
                fraction: synthbeam_fraction.unwrap_or(DEFAULT_SYNTHBEAM_FRACTION),
                kmax: synthbeam_kmax.unwrap_or(DEFAULT_SYNTHBEAM_KMAX),
            },
        };
        let instrument = Instrument::new(calibration, config)?;

        let mut printer = InfoPrinter::new(format!("{} instrument", instrument.kind()).into());
        if let Some(path) = &instrument.calibration().path {
            printer.push_line(format!("Calibration: {}", path.display()).into());
        }
        let layout = instrument.layout();
        printer.push_block(vec![
            format!(
                "{} detectors ({} grid(s) of {})",
                layout.len(),
                layout.ngrids(),
                instrument.calibration().num_detectors()
            )
            .into(),
            format!("Selection: {}", compress_mask(layout.selection())).into(),
            format!("Focal length: {} m", instrument.focal_length()).into(),
        ]);
        printer.push_line(
            format!(
                "{} of {} horns open",
                instrument.horns().num_open(),
                instrument.horns().len()
            )
            .into(),
        );
        if instrument.kind() == InstrumentKind::Interferometer {
            let synthbeam = instrument.config().synthbeam;
            printer.push_block(vec![
                format!("Synthetic-beam fraction: {}", synthbeam.fraction).into(),
                format!("kmax: {}", synthbeam.kmax).into(),
                format!("Matrix values: {}", synthbeam.dtype).into(),
            ]);
        }
        printer.display();

        Ok(instrument)
    }
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SceneArgs {
    #[clap(long, help = SCENE_KIND_HELP.as_str(), help_heading = "SCENE")]
    pub(super) scene_kind: Option<String>,

    #[clap(long, help = NSIDE_HELP.as_str(), help_heading = "SCENE")]
    pub(super) nside: Option<usize>,

    #[clap(long, help = FREQ_HELP.as_str(), help_heading = "SCENE")]
    pub(super) freq_ghz: Option<f64>,
}

impl SceneArgs {
    pub(super) fn merge(self, other: Self) -> Self {
        Self {
            scene_kind: self.scene_kind.or(other.scene_kind),
            nside: self.nside.or(other.nside),
            freq_ghz: self.freq_ghz.or(other.freq_ghz),
        }
    }

    pub(super) fn parse(self) -> Result<Scene, QubicError> {
        let Self {
            scene_kind,
            nside,
            freq_ghz,
        } = self;

        let kind = match scene_kind {
            Some(k) => SceneKind::from_str(&k).map_err(|_| {
                QubicError::Scene(format!(
                    "Unrecognised scene kind '{k}'; valid kinds are: {}",
                    *SCENE_KINDS_COMMA_SEPARATED
                ))
            })?,
            None => DEFAULT_SCENE_KIND,
        };
        let nside = nside.unwrap_or(DEFAULT_NSIDE);
        let freq_ghz = freq_ghz.unwrap_or(DEFAULT_FREQ_GHZ);
        let scene = Scene::new(kind, nside, freq_ghz * 1e9)?;
        debug!("{scene}");

        let mut printer = InfoPrinter::new("Scene".into());
        printer.push_block(vec![
            format!("Stokes: {}", scene.kind()).into(),
            format!("nside {} ({} pixels)", scene.nside(), scene.npix()).into(),
            format!("{freq_ghz} GHz (wavelength {:.4} mm)", scene.wavelength() * 1e3).into(),
        ]);
        printer.display();

        Ok(scene)
    }
}
