// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Calibration tables describing the instrument.
//!
//! A calibration is a set of named tables: `detarray` (the bolometer
//! footprints), `optics` (the focal length of the combiner), `primbeam` (the
//! shape of the horn beams) and `hornarray` (the positions of the horns). The
//! tables are read from a toml, json or yaml file; which format is used is
//! decided by the file extension.

mod error;

pub use error::CalibrationError;

use std::{
    fs::File,
    io::Read,
    path::{Path, PathBuf},
    str::FromStr,
};

use itertools::Itertools;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

lazy_static::lazy_static! {
    pub(crate) static ref CALIBRATION_FILE_TYPES_COMMA_SEPARATED: String =
        CalibrationFileType::iter().join(", ");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter, EnumString)]
pub(crate) enum CalibrationFileType {
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
    #[strum(serialize = "yaml")]
    Yaml,
}

/// The bolometer array. Only (x, y) focal-plane coordinates are given for each
/// vertex \[metres\]; the plane sits at minus the focal length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetArrayTable {
    /// The polygon vertices of each detector footprint.
    pub vertex: Vec<Vec<[f64; 2]>>,

    /// Which detectors are not used. If empty, all detectors are used.
    #[serde(default)]
    pub removed: Vec<bool>,

    /// The readout ordering of each detector. If empty, the table order is
    /// used.
    #[serde(default)]
    pub index: Vec<i64>,

    /// The focal-plane quadrant of each detector. If empty, all detectors are
    /// in quadrant 0.
    #[serde(default)]
    pub quadrant: Vec<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OpticsTable {
    /// \[metres\]
    pub focal_length: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrimBeamTable {
    /// The full width at half maximum of the horn beams \[degrees\].
    pub fwhm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HornArrayTable {
    /// The distance between adjacent horns \[metres\].
    pub spacing: f64,

    /// The 3D position of each horn \[metres\].
    pub center: Vec<[f64; 3]>,

    /// Whether each horn is open. If empty, all horns are open.
    #[serde(default)]
    pub open: Vec<bool>,
}

/// The calibration tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    pub detarray: DetArrayTable,
    pub optics: OpticsTable,
    pub primbeam: PrimBeamTable,
    pub hornarray: HornArrayTable,

    /// Where the tables were read from, if they came from a file.
    #[serde(skip)]
    pub path: Option<PathBuf>,
}

impl Calibration {
    /// Read and validate calibration tables from a file.
    pub fn from_file<P: AsRef<Path>>(file: P) -> Result<Calibration, CalibrationError> {
        let file = file.as_ref();
        debug!("Attempting to read calibration file {}", file.display());

        let file_type = file
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| match e.as_str() {
                "yml" => Some(CalibrationFileType::Yaml),
                e => CalibrationFileType::from_str(e).ok(),
            })
            .ok_or_else(|| CalibrationError::UnrecognisedExtension(file.to_path_buf()))?;

        let mut contents = String::new();
        File::open(file)
            .and_then(|mut fh| fh.read_to_string(&mut contents))
            .map_err(|err| CalibrationError::IO {
                file: file.to_path_buf(),
                err,
            })?;

        let mut calibration = Calibration::from_str_with_type(&contents, file_type)
            .map_err(|e| e.with_file(file))?;
        calibration.path = Some(file.to_path_buf());
        Ok(calibration)
    }

    pub(crate) fn from_str_with_type(
        contents: &str,
        file_type: CalibrationFileType,
    ) -> Result<Calibration, CalibrationError> {
        trace!("Parsing {file_type} calibration tables");
        let calibration: Calibration = match file_type {
            CalibrationFileType::Toml => {
                toml::from_str(contents).map_err(|err| CalibrationError::Toml {
                    file: PathBuf::new(),
                    err,
                })?
            }
            CalibrationFileType::Json => {
                serde_json::from_str(contents).map_err(|err| CalibrationError::Json {
                    file: PathBuf::new(),
                    err,
                })?
            }
            CalibrationFileType::Yaml => {
                serde_yaml::from_str(contents).map_err(|err| CalibrationError::Yaml {
                    file: PathBuf::new(),
                    err,
                })?
            }
        };
        calibration.validate()?;
        Ok(calibration)
    }

    /// Check that all tables are self consistent. Optional fields are not
    /// filled in here; use the accessor methods for that.
    pub fn validate(&self) -> Result<(), CalibrationError> {
        let DetArrayTable {
            vertex,
            removed,
            index,
            quadrant,
        } = &self.detarray;

        let num_detectors = vertex.len();
        if num_detectors == 0 {
            return Err(CalibrationError::NoDetectors);
        }
        let num_vertices = vertex[0].len();
        if num_vertices < 3 {
            return Err(CalibrationError::TooFewVertices(num_vertices));
        }
        if let Some((detector, v)) = vertex
            .iter()
            .enumerate()
            .find(|(_, v)| v.len() != num_vertices)
        {
            return Err(CalibrationError::RaggedVertices {
                detector,
                got: v.len(),
                expected: num_vertices,
            });
        }
        for (field, len) in [
            ("removed", removed.len()),
            ("index", index.len()),
            ("quadrant", quadrant.len()),
        ] {
            if len != 0 && len != num_detectors {
                return Err(CalibrationError::DetectorFieldLength {
                    field,
                    got: len,
                    expected: num_detectors,
                });
            }
        }

        if !(self.optics.focal_length > 0.0) {
            return Err(CalibrationError::BadFocalLength(self.optics.focal_length));
        }
        if !(self.primbeam.fwhm > 0.0) {
            return Err(CalibrationError::BadBeamFwhm(self.primbeam.fwhm));
        }

        let HornArrayTable {
            spacing,
            center,
            open,
        } = &self.hornarray;
        if center.is_empty() {
            return Err(CalibrationError::NoHorns);
        }
        if !(*spacing > 0.0) {
            return Err(CalibrationError::BadHornSpacing(*spacing));
        }
        if !open.is_empty() {
            if open.len() != center.len() {
                return Err(CalibrationError::HornFieldLength {
                    got: open.len(),
                    expected: center.len(),
                });
            }
            if !open.iter().any(|&o| o) {
                return Err(CalibrationError::NoOpenHorns);
            }
        }

        Ok(())
    }

    pub fn num_detectors(&self) -> usize {
        self.detarray.vertex.len()
    }

    /// The removed flag of each detector.
    pub fn removed(&self) -> Vec<bool> {
        if self.detarray.removed.is_empty() {
            vec![false; self.num_detectors()]
        } else {
            self.detarray.removed.clone()
        }
    }

    /// The readout ordering of each detector.
    pub fn ordering(&self) -> Vec<i64> {
        if self.detarray.index.is_empty() {
            (0..self.num_detectors() as i64).collect()
        } else {
            self.detarray.index.clone()
        }
    }

    /// The quadrant of each detector.
    pub fn quadrants(&self) -> Vec<u32> {
        if self.detarray.quadrant.is_empty() {
            vec![0; self.num_detectors()]
        } else {
            self.detarray.quadrant.clone()
        }
    }

    /// Whether each horn is open.
    pub fn horns_open(&self) -> Vec<bool> {
        if self.hornarray.open.is_empty() {
            vec![true; self.hornarray.center.len()]
        } else {
            self.hornarray.open.clone()
        }
    }
}

impl CalibrationError {
    /// Attach a file name to decoding errors.
    fn with_file(self, file: &Path) -> CalibrationError {
        let file = file.to_path_buf();
        match self {
            CalibrationError::Toml { err, .. } => CalibrationError::Toml { file, err },
            CalibrationError::Json { err, .. } => CalibrationError::Json { file, err },
            CalibrationError::Yaml { err, .. } => CalibrationError::Yaml { file, err },
            e => e,
        }
    }
}

impl std::fmt::Display for Calibration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.path {
            Some(p) => writeln!(f, "path: {}", p.display())?,
            None => writeln!(f, "path: <in memory>")?,
        }
        writeln!(
            f,
            "detarray: {} detectors with {} vertices",
            self.num_detectors(),
            self.detarray.vertex.first().map_or(0, Vec::len)
        )?;
        writeln!(f, "optics: focal length {} m", self.optics.focal_length)?;
        writeln!(f, "primbeam: FWHM {}°", self.primbeam.fwhm)?;
        write!(
            f,
            "hornarray: {} horns ({} open), spacing {} m",
            self.hornarray.center.len(),
            self.horns_open().into_iter().filter(|&o| o).count(),
            self.hornarray.spacing
        )
    }
}
