// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Write the synthesised beam of a focal-plane position as a HEALPix map.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use clap::Parser;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::common::{InfoPrinter, InstrumentArgs, SceneArgs, ARG_FILE_HELP};
use crate::{
    constants::DEFAULT_SYNTHBEAM_THETA_MAX_DEG, instrument::FocalPlanePositions,
    pixel::pixel_to_angle, QubicError,
};

const DEFAULT_OUTPUT_FILENAME: &str = "synthbeam.tsv";

lazy_static::lazy_static! {
    static ref THETA_MAX_HELP: String =
        format!("Only pixels within this angle of the zenith are computed [degrees]. Default: {DEFAULT_SYNTHBEAM_THETA_MAX_DEG}");

    static ref OUTPUT_HELP: String =
        format!("The file to write the map to. Each line is tab separated: (1) the pixel index, (2) the zenith angle [radians], (3) the azimuth [radians] and (4) the normalised beam value. Pixels outside the maximum zenith angle are not written. Default: {DEFAULT_OUTPUT_FILENAME}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SynthbeamCliArgs {
    /// The x coordinate of the focal-plane position [metres]. Default: 0
    #[clap(short, long, allow_hyphen_values = true, help_heading = "FOCAL PLANE")]
    pub(super) x: Option<f64>,

    /// The y coordinate of the focal-plane position [metres]. Default: 0
    #[clap(short, long, allow_hyphen_values = true, help_heading = "FOCAL PLANE")]
    pub(super) y: Option<f64>,

    /// The area integrated over at the position [m^2]. Default: the detector
    /// area
    #[clap(long, help_heading = "FOCAL PLANE")]
    pub(super) area: Option<f64>,

    #[clap(long, help = THETA_MAX_HELP.as_str(), help_heading = "FOCAL PLANE")]
    pub(super) theta_max: Option<f64>,

    #[clap(short, long, help = OUTPUT_HELP.as_str(), help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,
}

impl SynthbeamCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            x: self.x.or(other.x),
            y: self.y.or(other.y),
            area: self.area.or(other.area),
            theta_max: self.theta_max.or(other.theta_max),
            output: self.output.or(other.output),
        }
    }
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct SynthbeamArgs {
    #[clap(name = "ARGUMENTS_FILE", help = ARG_FILE_HELP.as_str(), parse(from_os_str))]
    pub(super) args_file: Option<PathBuf>,

    #[clap(flatten)]
    #[serde(rename = "instrument")]
    #[serde(default)]
    pub(super) instrument_args: InstrumentArgs,

    #[clap(flatten)]
    #[serde(rename = "scene")]
    #[serde(default)]
    pub(super) scene_args: SceneArgs,

    #[clap(flatten)]
    #[serde(rename = "synthbeam")]
    #[serde(default)]
    pub(super) synthbeam_args: SynthbeamCliArgs,
}

impl SynthbeamArgs {
    pub(super) fn merge(self) -> Result<SynthbeamArgs, QubicError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let SynthbeamArgs {
                args_file: _,
                instrument_args,
                scene_args,
                synthbeam_args,
            } = unpack_arg_file!(arg_file);

            Ok(SynthbeamArgs {
                args_file: None,
                instrument_args: cli_args.instrument_args.merge(instrument_args),
                scene_args: cli_args.scene_args.merge(scene_args),
                synthbeam_args: cli_args.synthbeam_args.merge(synthbeam_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), QubicError> {
        debug!("{:#?}", self);

        let SynthbeamArgs {
            args_file: _,
            instrument_args,
            scene_args,
            synthbeam_args:
                SynthbeamCliArgs {
                    x,
                    y,
                    area,
                    theta_max,
                    output,
                },
        } = self;

        let instrument = instrument_args.parse()?;
        let scene = scene_args.parse()?;
        let (x, y) = (x.unwrap_or(0.0), y.unwrap_or(0.0));
        let area = area.unwrap_or_else(|| instrument.layout().area());
        let theta_max = theta_max.unwrap_or(DEFAULT_SYNTHBEAM_THETA_MAX_DEG);
        let output = output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILENAME));
        let positions = FocalPlanePositions::new(Some(vec![x]), Some(vec![y]), vec![area])?;

        let mut printer = InfoPrinter::new("Synthesised beam".into());
        printer.push_block(vec![
            format!("Focal-plane position: ({x}, {y}) m").into(),
            format!("Area: {area:e} m^2").into(),
        ]);
        printer.push_line(format!("Maximum zenith angle: {theta_max}°").into());
        printer.push_line(format!("Output: {}", output.display()).into());
        printer.display();

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        let map = instrument.synthesized_beam_map(&scene, &positions, theta_max)?;
        let mut out = BufWriter::new(File::create(&output)?);
        let theta_max_rad = theta_max.to_radians();
        let mut num_written = 0;
        for (pixel, &value) in map.row(0).iter().enumerate() {
            let (theta, phi) = pixel_to_angle(scene.nside(), pixel);
            if theta > theta_max_rad {
                continue;
            }
            writeln!(&mut out, "{pixel}\t{theta}\t{phi}\t{value:e}")?;
            num_written += 1;
        }
        out.flush()?;
        info!("Wrote {num_written} pixels to {}", output.display());

        Ok(())
    }
}
