// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fixed-sparse-row (FSR) matrices.
//!
//! Every row block of an FSR matrix has exactly `ncolmax` (index, value)
//! entries. A row block is `ndim` rows tall and each entry is an `ndim` by
//! `ndim` block, stored compactly:
//!
//! - `ndim == 1`: a scalar `a`;
//! - `ndim == 2`: `(r11, r21)` of the rotation block `[[r11, -r21], [r21, r11]]`;
//! - `ndim == 3`: `(r11, r22, r32)` of `[[r11, 0, 0], [0, r22, -r32], [0, r32, r22]]`.
//!
//! Negative indices mark unused entries.

mod error;
pub(crate) mod kernels;

pub use error::SparseError;

use std::{fmt::Debug, mem::size_of};

use itertools::Itertools;
use ndarray::{parallel::prelude::*, prelude::*, IxDyn};
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::constants::MAX_NSIDE_INDEX32;

lazy_static::lazy_static! {
    pub(crate) static ref VALUE_DTYPES_COMMA_SEPARATED: String = ValueDtype::iter().join(", ");
}

/// The integer type of the pixel indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum IndexDtype {
    #[strum(serialize = "int32")]
    I32,
    #[strum(serialize = "int64")]
    I64,
}

impl IndexDtype {
    /// 32-bit indices overflow for large `nside`.
    pub fn for_nside(nside: usize) -> IndexDtype {
        if nside > MAX_NSIDE_INDEX32 {
            IndexDtype::I64
        } else {
            IndexDtype::I32
        }
    }

    /// \[bytes\]
    pub fn size(self) -> usize {
        match self {
            IndexDtype::I32 => size_of::<i32>(),
            IndexDtype::I64 => size_of::<i64>(),
        }
    }
}

/// The floating-point type of the matrix values.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum ValueDtype {
    #[default]
    #[strum(serialize = "float32")]
    #[serde(rename = "float32")]
    F32,
    #[strum(serialize = "float64")]
    #[serde(rename = "float64")]
    F64,
}

impl ValueDtype {
    /// Parse a type name like "float32". Anything unsupported is an error.
    pub fn parse(s: &str) -> Result<ValueDtype, SparseError> {
        s.parse()
            .map_err(|_| SparseError::UnsupportedValueDtype(s.to_string()))
    }

    /// \[bytes\]
    pub fn size(self) -> usize {
        match self {
            ValueDtype::F32 => size_of::<f32>(),
            ValueDtype::F64 => size_of::<f64>(),
        }
    }
}

/// Integers usable as pixel indices.
pub trait PixelIndex: Copy + Debug + Send + Sync + 'static {
    /// The marker of an unused entry.
    const NONE: Self;
    const DTYPE: IndexDtype;

    fn from_pixel(pixel: usize) -> Self;

    /// `None` for unused entries.
    fn to_pixel(self) -> Option<usize>;
}

impl PixelIndex for i32 {
    const NONE: Self = -1;
    const DTYPE: IndexDtype = IndexDtype::I32;

    #[inline]
    fn from_pixel(pixel: usize) -> Self {
        pixel as i32
    }

    #[inline]
    fn to_pixel(self) -> Option<usize> {
        usize::try_from(self).ok()
    }
}

impl PixelIndex for i64 {
    const NONE: Self = -1;
    const DTYPE: IndexDtype = IndexDtype::I64;

    #[inline]
    fn from_pixel(pixel: usize) -> Self {
        pixel as i64
    }

    #[inline]
    fn to_pixel(self) -> Option<usize> {
        usize::try_from(self).ok()
    }
}

/// Floats usable as matrix values. All arithmetic is done in double precision.
pub trait MatrixValue: num_traits::Float + Debug + Send + Sync + 'static {
    const DTYPE: ValueDtype;

    fn from_f64(v: f64) -> Self;

    fn to_f64(self) -> f64;
}

impl MatrixValue for f32 {
    const DTYPE: ValueDtype = ValueDtype::F32;

    #[inline]
    fn from_f64(v: f64) -> Self {
        v as f32
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl MatrixValue for f64 {
    const DTYPE: ValueDtype = ValueDtype::F64;

    #[inline]
    fn from_f64(v: f64) -> Self {
        v
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}

/// A fixed-sparse-row matrix with `nrows` row blocks and `ncols` column blocks.
#[derive(Debug, Clone)]
pub struct FsrMatrix<I, V> {
    /// Shape (nrows, ncolmax).
    index: Array2<I>,

    /// Shape (nrows, ncolmax, ndim).
    value: Array3<V>,

    ncols: usize,
}

impl<I: PixelIndex, V: MatrixValue> FsrMatrix<I, V> {
    /// A matrix with all entries unused.
    pub fn new(nrows: usize, ncols: usize, ndim: usize, ncolmax: usize) -> FsrMatrix<I, V> {
        FsrMatrix {
            index: Array2::from_elem((nrows, ncolmax), I::NONE),
            value: Array3::zeros((nrows, ncolmax, ndim)),
            ncols,
        }
    }

    /// The full shape, i.e. (nrows * ndim, ncols * ndim).
    pub fn shape(&self) -> (usize, usize) {
        let ndim = self.ndim();
        (self.nrows() * ndim, self.ncols * ndim)
    }

    /// The number of row blocks.
    pub fn nrows(&self) -> usize {
        self.index.nrows()
    }

    /// The number of column blocks.
    pub fn ncols(&self) -> usize {
        self.ncols
    }

    pub fn ndim(&self) -> usize {
        self.value.len_of(Axis(2))
    }

    pub fn ncolmax(&self) -> usize {
        self.index.ncols()
    }

    pub fn index(&self) -> ArrayView2<I> {
        self.index.view()
    }

    pub fn value(&self) -> ArrayView3<V> {
        self.value.view()
    }

    pub fn index_mut(&mut self) -> ArrayViewMut2<I> {
        self.index.view_mut()
    }

    pub fn value_mut(&mut self) -> ArrayViewMut3<V> {
        self.value.view_mut()
    }

    /// Mutable access to both the indices and the values.
    pub(crate) fn data_mut(&mut self) -> (ArrayViewMut2<I>, ArrayViewMut3<V>) {
        (self.index.view_mut(), self.value.view_mut())
    }

    /// \[bytes\]
    pub fn nbytes(&self) -> usize {
        self.index.len() * size_of::<I>() + self.value.len() * size_of::<V>()
    }

    /// Compute `y = M x`, where `x` has shape (ncols, ndim).
    pub fn apply(&self, x: ArrayView2<f64>) -> Result<Array2<f64>, SparseError> {
        let ndim = self.ndim();
        check_shape(x.shape(), &[self.ncols, ndim])?;
        let mut y = Array2::zeros((self.nrows(), ndim));
        y.outer_iter_mut()
            .into_par_iter()
            .zip(self.index.outer_iter())
            .zip(self.value.outer_iter())
            .for_each(|((mut y, index), value)| {
                for (pixel, block) in index.iter().zip(value.outer_iter()) {
                    let Some(pixel) = pixel.to_pixel() else {
                        continue;
                    };
                    let x = x.row(pixel);
                    let b = |i: usize| block[i].to_f64();
                    match ndim {
                        1 => y[0] += b(0) * x[0],
                        2 => {
                            y[0] += b(0) * x[0] - b(1) * x[1];
                            y[1] += b(1) * x[0] + b(0) * x[1];
                        }
                        _ => {
                            y[0] += b(0) * x[0];
                            y[1] += b(1) * x[1] - b(2) * x[2];
                            y[2] += b(2) * x[1] + b(1) * x[2];
                        }
                    }
                }
            });
        Ok(y)
    }

    /// Compute `x = M^T y`, where `y` has shape (nrows, ndim).
    pub fn apply_transpose(&self, y: ArrayView2<f64>) -> Result<Array2<f64>, SparseError> {
        let ndim = self.ndim();
        check_shape(y.shape(), &[self.nrows(), ndim])?;
        let mut x = Array2::zeros((self.ncols, ndim));
        for ((index, value), y) in self
            .index
            .outer_iter()
            .zip(self.value.outer_iter())
            .zip(y.outer_iter())
        {
            for (pixel, block) in index.iter().zip(value.outer_iter()) {
                let Some(pixel) = pixel.to_pixel() else {
                    continue;
                };
                let mut x = x.row_mut(pixel);
                let b = |i: usize| block[i].to_f64();
                match ndim {
                    1 => x[0] += b(0) * y[0],
                    2 => {
                        x[0] += b(0) * y[0] + b(1) * y[1];
                        x[1] += -b(1) * y[0] + b(0) * y[1];
                    }
                    _ => {
                        x[0] += b(0) * y[0];
                        x[1] += b(1) * y[1] + b(2) * y[2];
                        x[2] += -b(2) * y[1] + b(1) * y[2];
                    }
                }
            }
        }
        Ok(x)
    }
}

fn check_shape(got: &[usize], expected: &[usize]) -> Result<(), SparseError> {
    if got != expected {
        return Err(SparseError::BadShape {
            expected: expected.to_vec(),
            got: got.to_vec(),
        });
    }
    Ok(())
}

/// A projection matrix with one of the supported (index, value) type
/// combinations.
#[derive(Debug, Clone)]
pub enum SparseProjection {
    I32F32(FsrMatrix<i32, f32>),
    I32F64(FsrMatrix<i32, f64>),
    I64F32(FsrMatrix<i64, f32>),
    I64F64(FsrMatrix<i64, f64>),
}

/// Run the same expression on whichever matrix is inside a [`SparseProjection`].
macro_rules! with_matrix {
    ($projection:expr, $m:ident => $body:expr) => {
        match $projection {
            SparseProjection::I32F32($m) => $body,
            SparseProjection::I32F64($m) => $body,
            SparseProjection::I64F32($m) => $body,
            SparseProjection::I64F64($m) => $body,
        }
    };
}
pub(crate) use with_matrix;

impl SparseProjection {
    pub fn new(
        index_dtype: IndexDtype,
        value_dtype: ValueDtype,
        nrows: usize,
        ncols: usize,
        ndim: usize,
        ncolmax: usize,
    ) -> SparseProjection {
        match (index_dtype, value_dtype) {
            (IndexDtype::I32, ValueDtype::F32) => {
                SparseProjection::I32F32(FsrMatrix::new(nrows, ncols, ndim, ncolmax))
            }
            (IndexDtype::I32, ValueDtype::F64) => {
                SparseProjection::I32F64(FsrMatrix::new(nrows, ncols, ndim, ncolmax))
            }
            (IndexDtype::I64, ValueDtype::F32) => {
                SparseProjection::I64F32(FsrMatrix::new(nrows, ncols, ndim, ncolmax))
            }
            (IndexDtype::I64, ValueDtype::F64) => {
                SparseProjection::I64F64(FsrMatrix::new(nrows, ncols, ndim, ncolmax))
            }
        }
    }

    pub fn index_dtype(&self) -> IndexDtype {
        with_matrix!(self, m => index_dtype_of(m))
    }

    pub fn value_dtype(&self) -> ValueDtype {
        with_matrix!(self, m => value_dtype_of(m))
    }

    pub fn shape(&self) -> (usize, usize) {
        with_matrix!(self, m => m.shape())
    }

    pub fn nrows(&self) -> usize {
        with_matrix!(self, m => m.nrows())
    }

    pub fn ncols(&self) -> usize {
        with_matrix!(self, m => m.ncols())
    }

    pub fn ndim(&self) -> usize {
        with_matrix!(self, m => m.ndim())
    }

    pub fn ncolmax(&self) -> usize {
        with_matrix!(self, m => m.ncolmax())
    }

    pub fn nbytes(&self) -> usize {
        with_matrix!(self, m => m.nbytes())
    }

    /// The pixel indices, widened to 64 bits.
    pub fn indices(&self) -> Array2<i64> {
        with_matrix!(self, m => m.index().mapv(|i| i.to_pixel().map_or(-1, |p| p as i64)))
    }

    /// The values, widened to double precision.
    pub fn values(&self) -> Array3<f64> {
        with_matrix!(self, m => m.value().mapv(MatrixValue::to_f64))
    }

    pub fn apply(&self, x: ArrayView2<f64>) -> Result<Array2<f64>, SparseError> {
        with_matrix!(self, m => m.apply(x))
    }

    pub fn apply_transpose(&self, y: ArrayView2<f64>) -> Result<Array2<f64>, SparseError> {
        with_matrix!(self, m => m.apply_transpose(y))
    }
}

fn index_dtype_of<I: PixelIndex, V>(_: &FsrMatrix<I, V>) -> IndexDtype {
    I::DTYPE
}

fn value_dtype_of<I, V: MatrixValue>(_: &FsrMatrix<I, V>) -> ValueDtype {
    V::DTYPE
}

/// A sparse matrix together with the shapes of the sky maps it accepts and the
/// timelines it produces.
#[derive(Debug, Clone)]
pub struct ProjectionOperator {
    matrix: SparseProjection,
    shapein: Vec<usize>,
    shapeout: Vec<usize>,
}

impl ProjectionOperator {
    /// The input shape is (npix,) for a single Stokes parameter and
    /// (npix, ndim) otherwise. `shapeout` must hold as many elements as the
    /// matrix has rows.
    pub fn new(
        matrix: SparseProjection,
        shapeout: Vec<usize>,
    ) -> Result<ProjectionOperator, SparseError> {
        let ndim = matrix.ndim();
        let expected = matrix.nrows() * ndim;
        if shapeout.iter().product::<usize>() != expected {
            return Err(SparseError::BadShape {
                expected: vec![matrix.nrows(), ndim],
                got: shapeout,
            });
        }
        let shapein = if ndim == 1 {
            vec![matrix.ncols()]
        } else {
            vec![matrix.ncols(), ndim]
        };
        Ok(ProjectionOperator {
            matrix,
            shapein,
            shapeout,
        })
    }

    pub fn matrix(&self) -> &SparseProjection {
        &self.matrix
    }

    pub fn into_matrix(self) -> SparseProjection {
        self.matrix
    }

    pub fn shapein(&self) -> &[usize] {
        &self.shapein
    }

    pub fn shapeout(&self) -> &[usize] {
        &self.shapeout
    }

    /// Project a sky map into timelines.
    pub fn apply(&self, sky: ArrayViewD<f64>) -> Result<ArrayD<f64>, SparseError> {
        check_shape(sky.shape(), &self.shapein)?;
        let ndim = self.matrix.ndim();
        let sky = sky.to_shape((self.matrix.ncols(), ndim))?;
        let out = self.matrix.apply(sky.view())?;
        Ok(out.into_shape_with_order(IxDyn(&self.shapeout))?)
    }

    /// Back-project timelines onto the sky.
    pub fn apply_transpose(&self, timelines: ArrayViewD<f64>) -> Result<ArrayD<f64>, SparseError> {
        check_shape(timelines.shape(), &self.shapeout)?;
        let ndim = self.matrix.ndim();
        let timelines = timelines.to_shape((self.matrix.nrows(), ndim))?;
        let out = self.matrix.apply_transpose(timelines.view())?;
        Ok(out.into_shape_with_order(IxDyn(&self.shapein))?)
    }
}
