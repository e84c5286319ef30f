// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Write the synthetic-beam peaks of every detector.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::PathBuf,
};

use clap::Parser;
use log::{debug, info};
use serde::{Deserialize, Serialize};

use super::common::{InfoPrinter, InstrumentArgs, SceneArgs, ARG_FILE_HELP};
use crate::QubicError;

const DEFAULT_OUTPUT_FILENAME: &str = "peak_angles.tsv";

lazy_static::lazy_static! {
    static ref OUTPUT_HELP: String =
        format!("The file to write the peaks to. Each line is tab separated: (1) the logical detector index, (2) the peak index, (3) the zenith angle [radians], (4) the azimuth [radians] and (5) the amplitude. Default: {DEFAULT_OUTPUT_FILENAME}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct PeakAnglesCliArgs {
    #[clap(short, long, help = OUTPUT_HELP.as_str(), help_heading = "OUTPUT FILES")]
    pub(super) output: Option<PathBuf>,

    /// Don't write peaks with zero amplitude.
    #[clap(long, help_heading = "OUTPUT FILES")]
    #[serde(default)]
    pub(super) skip_empty: bool,
}

impl PeakAnglesCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            output: self.output.or(other.output),
            skip_empty: self.skip_empty || other.skip_empty,
        }
    }
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct PeakAnglesArgs {
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
    #[serde(rename = "peak-angles")]
    #[serde(default)]
    pub(super) peak_args: PeakAnglesCliArgs,
}

impl PeakAnglesArgs {
    /// Consolidate the command-line and file arguments, preferring the
    /// command line.
    pub(super) fn merge(self) -> Result<PeakAnglesArgs, QubicError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let PeakAnglesArgs {
                args_file: _,
                instrument_args,
                scene_args,
                peak_args,
            } = unpack_arg_file!(arg_file);

            Ok(PeakAnglesArgs {
                args_file: None,
                instrument_args: cli_args.instrument_args.merge(instrument_args),
                scene_args: cli_args.scene_args.merge(scene_args),
                peak_args: cli_args.peak_args.merge(peak_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), QubicError> {
        debug!("{:#?}", self);

        let PeakAnglesArgs {
            args_file: _,
            instrument_args,
            scene_args,
            peak_args: PeakAnglesCliArgs { output, skip_empty },
        } = self;

        let instrument = instrument_args.parse()?;
        let scene = scene_args.parse()?;
        let output = output.unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_FILENAME));

        let peaks = instrument.peak_angles(&scene)?;
        let mut printer = InfoPrinter::new("Synthetic-beam peaks".into());
        printer.push_line(
            format!(
                "{} peaks for each of {} detectors",
                peaks.ncolmax(),
                peaks.num_detectors()
            )
            .into(),
        );
        printer.push_line(format!("Output: {}", output.display()).into());
        printer.display();

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        let mut out = BufWriter::new(File::create(&output)?);
        let logical_index = instrument.layout().logical_index();
        let mut num_written = 0;
        for (d, &logical) in logical_index.iter().enumerate() {
            for k in 0..peaks.ncolmax() {
                let amplitude = peaks.amplitude[(d, k)];
                if skip_empty && amplitude == 0.0 {
                    continue;
                }
                writeln!(
                    &mut out,
                    "{logical}\t{k}\t{}\t{}\t{amplitude:e}",
                    peaks.theta[(d, k)],
                    peaks.phi[(d, k)]
                )?;
                num_written += 1;
            }
        }
        out.flush()?;
        info!("Wrote {num_written} peaks to {}", output.display());

        Ok(())
    }
}
