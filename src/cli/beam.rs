// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::{
    f64::consts::PI,
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
    str::FromStr,
};

use clap::Parser;
use log::info;

use crate::{
    beam::{create_beam_object, BeamType, BEAM_TYPES_COMMA_SEPARATED},
    calibration::Calibration,
    QubicError,
};

lazy_static::lazy_static! {
    static ref BEAM_TYPE_HELP: String =
        format!("The type of beam. Valid types are: {}", *BEAM_TYPES_COMMA_SEPARATED);
}

/// Generate beam-response values.
#[derive(Parser, Debug)]
pub struct BeamArgs {
    #[clap(short, long, help = BEAM_TYPE_HELP.as_str(), default_value = "gaussian")]
    beam_type: String,

    /// The full width at half maximum of the beam [degrees]. Ignored if a
    /// calibration file is given.
    #[clap(short, long, default_value = "13.0")]
    fwhm: f64,

    /// Take the FWHM from the primary-beam table of this calibration file.
    #[clap(short, long, parse(from_str))]
    calibration: Option<PathBuf>,

    /// Get beam responses from the beam axis out to this angle [degrees].
    #[clap(long, default_value = "90.0")]
    max_za: f64,

    /// The step in zenith angle to use [degrees].
    #[clap(short, long, default_value = "1.0")]
    step: f64,

    /// The file to write the results to. The file is tab separated, with each
    /// line (1) the angle from the beam axis in radians, (2) the primary-beam
    /// value and (3) the secondary-beam value at the same angle from its
    /// (backward) axis.
    #[clap(short, long, default_value = "beam_responses.tsv")]
    output: PathBuf,
}

impl BeamArgs {
    pub(super) fn run(&self) -> Result<(), QubicError> {
        let BeamArgs {
            beam_type,
            fwhm,
            calibration,
            max_za,
            step,
            output,
        } = self;

        let beam_type = BeamType::from_str(beam_type).map_err(|_| {
            QubicError::Beam(format!(
                "Unrecognised beam type '{beam_type}'; valid types are: {}",
                *BEAM_TYPES_COMMA_SEPARATED
            ))
        })?;
        let fwhm = match calibration {
            Some(c) => Calibration::from_file(c)?.primbeam.fwhm,
            None => *fwhm,
        };
        if !(*step > 0.0) {
            return Err(QubicError::Beam(format!(
                "The zenith-angle step must be positive, but got {step}"
            )));
        }
        let primary = create_beam_object(beam_type, fwhm, false)?;
        let secondary = create_beam_object(beam_type, fwhm, true)?;
        info!(
            "Tabulating a {beam_type} beam (FWHM {fwhm}°) out to {max_za}° in steps of {step}°"
        );

        let max_za_rad = max_za.to_radians();
        let step_rad = step.to_radians();
        let zas: Vec<f64> = (0..)
            .map(|i| step_rad * i as f64)
            .take_while(|za| *za <= max_za_rad)
            .collect();
        let backward: Vec<f64> = zas.iter().map(|za| PI - za).collect();
        let phis = vec![0.0; zas.len()];
        let primary = primary.calc_values(&zas, &phis)?;
        let secondary = secondary.calc_values(&backward, &phis)?;

        let mut out = BufWriter::new(File::create(output)?);
        for ((za, p), s) in zas.iter().zip(primary).zip(secondary) {
            writeln!(&mut out, "{za}\t{p:e}\t{s:e}")?;
        }
        out.flush()?;
        info!("Wrote {} beam values to {}", zas.len(), output.display());

        Ok(())
    }
}
