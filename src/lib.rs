// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Instrument model of the QUBIC bolometric interferometer.

Given calibration tables describing the horns, the optical combiner and the
bolometer array, this crate computes the peaks of the synthetic beam of every
detector, the electric field transmitted to the focal plane, synthesised beam
maps, and sparse operators projecting HEALPix sky maps into detector
timelines.
 */

pub mod beam;
pub mod calibration;
mod cli;
pub mod constants;
pub mod instrument;
pub mod layout;
pub(crate) mod math;
pub mod pixel;
pub mod sampling;
pub mod scene;
pub mod sparse;

#[cfg(test)]
mod tests;

use crossbeam_utils::atomic::AtomicCell;

/// Are progress bars being drawn? This should only ever be enabled by CLI code.
static PROGRESS_BARS: AtomicCell<bool> = AtomicCell::new(false);

// Re-exports.
pub use calibration::{Calibration, CalibrationError};
pub use cli::{Qubic, QubicError};
pub use instrument::{Instrument, InstrumentConfig, InstrumentError, InstrumentKind};
pub use math::{euler_zyz, Rot3, Vec3};
pub use sampling::{Pointing, Sampling};
pub use scene::{Scene, SceneKind};
pub use sparse::{ProjectionOperator, SparseProjection};
