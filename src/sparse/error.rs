// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with sparse projection matrices.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SparseError {
    #[error("The projection matrix cannot be created with value type '{0}'; supported types are: {}", *super::VALUE_DTYPES_COMMA_SEPARATED)]
    UnsupportedValueDtype(String),

    #[error("Expected an input of shape {expected:?}, but got {got:?}")]
    BadShape {
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),
}
