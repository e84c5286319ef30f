// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Build the projection operator for a synthetic scan and report on it.

use std::{path::PathBuf, time::Instant};

use clap::Parser;
use log::{debug, info};
use ndarray::ArrayD;
use serde::{Deserialize, Serialize};

use super::common::{InfoPrinter, InstrumentArgs, SceneArgs, Warn, ARG_FILE_HELP};
use crate::{
    sampling::{Pointing, Sampling},
    QubicError,
};

const DEFAULT_NUM_SAMPLES: usize = 100;
const DEFAULT_PERIOD: f64 = 1.0;
const DEFAULT_SCAN_STEP_DEG: f64 = 0.1;

lazy_static::lazy_static! {
    static ref NUM_SAMPLES_HELP: String =
        format!("The number of time samples in the scan. Default: {DEFAULT_NUM_SAMPLES}");

    static ref PERIOD_HELP: String =
        format!("The sampling period [seconds]. Default: {DEFAULT_PERIOD}");

    static ref SCAN_STEP_HELP: String =
        format!("The change in boresight azimuth between samples [degrees]. Default: {DEFAULT_SCAN_STEP_DEG}");
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct ProjectionCliArgs {
    #[clap(short, long, help = NUM_SAMPLES_HELP.as_str(), help_heading = "POINTING")]
    pub(super) num_samples: Option<usize>,

    #[clap(long, help = PERIOD_HELP.as_str(), help_heading = "POINTING")]
    pub(super) period: Option<f64>,

    /// The zenith angle of the boresight throughout the scan [degrees].
    /// Default: 0
    #[clap(long, help_heading = "POINTING")]
    pub(super) boresight_za: Option<f64>,

    #[clap(long, allow_hyphen_values = true, help = SCAN_STEP_HELP.as_str(), help_heading = "POINTING")]
    pub(super) scan_step: Option<f64>,

    /// Apply a uniform unit sky to the operator and report the timelines.
    #[clap(long, help_heading = "POINTING")]
    #[serde(default)]
    pub(super) check_uniform_sky: bool,
}

impl ProjectionCliArgs {
    fn merge(self, other: Self) -> Self {
        Self {
            num_samples: self.num_samples.or(other.num_samples),
            period: self.period.or(other.period),
            boresight_za: self.boresight_za.or(other.boresight_za),
            scan_step: self.scan_step.or(other.scan_step),
            check_uniform_sky: self.check_uniform_sky || other.check_uniform_sky,
        }
    }
}

#[derive(Parser, Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct ProjectionArgs {
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
    #[serde(rename = "projection")]
    #[serde(default)]
    pub(super) projection_args: ProjectionCliArgs,
}

impl ProjectionArgs {
    pub(super) fn merge(self) -> Result<ProjectionArgs, QubicError> {
        debug!("Merging command-line arguments with the argument file");

        let cli_args = self;

        if let Some(arg_file) = cli_args.args_file {
            let ProjectionArgs {
                args_file: _,
                instrument_args,
                scene_args,
                projection_args,
            } = unpack_arg_file!(arg_file);

            Ok(ProjectionArgs {
                args_file: None,
                instrument_args: cli_args.instrument_args.merge(instrument_args),
                scene_args: cli_args.scene_args.merge(scene_args),
                projection_args: cli_args.projection_args.merge(projection_args),
            })
        } else {
            Ok(cli_args)
        }
    }

    pub(super) fn run(self, dry_run: bool) -> Result<(), QubicError> {
        debug!("{:#?}", self);

        let ProjectionArgs {
            args_file: _,
            instrument_args,
            scene_args,
            projection_args:
                ProjectionCliArgs {
                    num_samples,
                    period,
                    boresight_za,
                    scan_step,
                    check_uniform_sky,
                },
        } = self;

        let instrument = instrument_args.parse()?;
        let scene = scene_args.parse()?;

        let num_samples = num_samples.unwrap_or(DEFAULT_NUM_SAMPLES);
        let boresight_za = boresight_za.unwrap_or(0.0);
        let scan_step = scan_step.unwrap_or(DEFAULT_SCAN_STEP_DEG);
        if boresight_za == 0.0 && scan_step != 0.0 {
            "The boresight is at the zenith, so the scan only rotates about it".warn();
        }
        let pointings: Vec<Pointing> = (0..num_samples)
            .map(|i| Pointing {
                theta: boresight_za,
                phi: i as f64 * scan_step,
                psi: 0.0,
            })
            .collect();
        let sampling = Sampling::from_pointings(&pointings, period.unwrap_or(DEFAULT_PERIOD))?;

        // Everything about the matrix can be reported before allocating it.
        let ndet = instrument.len();
        let ntimes = sampling.len();
        let ncolmax = instrument.peak_angles(&scene)?.ncolmax();
        let index_dtype = scene.index_dtype();
        let value_dtype = instrument.config().synthbeam.dtype;
        let nbytes =
            ndet * ntimes * ncolmax * (index_dtype.size() + scene.ndim() * value_dtype.size());
        let mut printer = InfoPrinter::new("Projection operator".into());
        printer.push_block(vec![
            format!("{ntimes} samples, period {} s", sampling.period()).into(),
            format!("Boresight zenith angle {boresight_za}°, azimuth step {scan_step}°").into(),
        ]);
        printer.push_block(vec![
            format!(
                "Shape: ({}, {}) blocks of {}x{}",
                ndet * ntimes,
                scene.npix(),
                scene.ndim(),
                scene.ndim()
            )
            .into(),
            format!("ncolmax: {ncolmax}").into(),
            format!("Indices: {index_dtype}, values: {value_dtype}").into(),
            format!("Memory: {:.3} MiB", nbytes as f64 / 1024.0 / 1024.0).into(),
        ]);
        printer.display();
        super::common::display_warnings();

        if dry_run {
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        let start = Instant::now();
        let operator = instrument.projection_operator(&sampling, &scene)?;
        info!(
            "Built the projection operator in {:.3} s",
            start.elapsed().as_secs_f64()
        );
        debug!(
            "Input shape {:?}, output shape {:?}",
            operator.shapein(),
            operator.shapeout()
        );

        if check_uniform_sky {
            let sky = ArrayD::ones(operator.shapein());
            let timelines = operator.apply(sky.view())?;
            let (min, max) = timelines
                .iter()
                .fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), &v| {
                    (min.min(v), max.max(v))
                });
            info!("A uniform unit sky gives timelines between {min:.6} and {max:.6}");
        }

        Ok(())
    }
}
