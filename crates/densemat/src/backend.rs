//! Primitive-operation providers.
//!
//! A [`Backend`] is a compile-time tag that supplies the numeric kernels a [`Matrix`] dispatches
//! to. Backends are never instantiated; every operation is an associated function over raw
//! row-major buffers, and the matrix type selects its backend through a type parameter. Choosing
//! a backend therefore has no per-call cost and involves no dynamic dispatch.
//!
//! All shape validation happens in the matrix layer before a backend is invoked. Backend
//! functions may assume that the buffers they receive are large enough for the stated operation
//! and are allowed to panic if they are not.
//!
//! Two backends are available:
//!
//! - [`Reference`]: straightforward loops, always available. Results of this backend define the
//!   expected behavior of every other backend.
//! - [`Ndarray`]: forwards to the [`ndarray`] crate (and its `matrixmultiply` GEMM kernels).
//!   Enabled by the `ndarray` Cargo feature, which is on by default.
//!
//! Different backends are only required to produce *numerically* compatible results. The
//! summation order of dot products and matrix products may differ, so results can differ in the
//! last bits. Use the [`approx`] trait implementations on [`Matrix`] to compare across backends.
//!
//! [`Matrix`]: crate::Matrix
//! [`ndarray`]: https://docs.rs/ndarray

use std::{collections::TryReserveError, fmt};

#[cfg(feature = "ndarray")]
mod array;
mod reference;

#[cfg(feature = "ndarray")]
pub use array::Ndarray;
pub use reference::Reference;

/// Whether an operand of a generalized matrix multiply is used as stored or transposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Transpose {
    /// Use the operand as stored.
    #[default]
    No,
    /// Use the transpose of the operand.
    Yes,
}

impl Transpose {
    /// Returns the `(rows, cols)` of `op(X)` for an operand stored as `rows x cols`.
    #[inline]
    pub fn apply(self, rows: usize, cols: usize) -> (usize, usize) {
        match self {
            Transpose::No => (rows, cols),
            Transpose::Yes => (cols, rows),
        }
    }
}

impl From<bool> for Transpose {
    fn from(transpose: bool) -> Self {
        if transpose {
            Transpose::Yes
        } else {
            Transpose::No
        }
    }
}

/// A borrowed, densely packed, row-major matrix operand handed to [`Backend::gemm`].
#[derive(Clone, Copy)]
pub struct Operand<'a> {
    /// Row-major elements; `data.len() == rows * cols`.
    pub data: &'a [f64],
    /// Stored row count.
    pub rows: usize,
    /// Stored column count (and row stride).
    pub cols: usize,
}

impl<'a> Operand<'a> {
    #[inline]
    pub fn new(data: &'a [f64], rows: usize, cols: usize) -> Self {
        debug_assert_eq!(data.len(), rows * cols);
        Self { data, rows, cols }
    }

    /// Element `(row, col)` of `op(self)`.
    #[inline]
    pub fn at(&self, trans: Transpose, row: usize, col: usize) -> f64 {
        match trans {
            Transpose::No => self.data[row * self.cols + col],
            Transpose::Yes => self.data[col * self.cols + row],
        }
    }
}

impl fmt::Debug for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operand")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish_non_exhaustive()
    }
}

/// The primitive operations a matrix backend has to provide.
///
/// Strided arguments follow BLAS conventions: element `i` of a source `x` with stride `incx` is
/// `x[i * incx]`. A stride of 0 broadcasts `x[0]`.
pub trait Backend: 'static {
    /// Short name of the backend, used in logs and benchmark ids.
    const NAME: &'static str;

    /// Allocates a buffer holding `len` elements.
    ///
    /// The contents of the returned buffer are unspecified; callers must write every element
    /// before reading it. The default implementation uses the global allocator.
    fn alloc(len: usize) -> Result<Box<[f64]>, TryReserveError> {
        let mut buf = Vec::new();
        buf.try_reserve_exact(len)?;
        buf.resize(len, 0.0);
        Ok(buf.into_boxed_slice())
    }

    /// Releases a buffer obtained from [`Backend::alloc`].
    fn dealloc(buf: Box<[f64]>) {
        drop(buf);
    }

    /// `y[i] = x[i * incx]` for every element of `y`.
    fn copy(x: &[f64], incx: usize, y: &mut [f64]);

    /// `y[i] += alpha * x[i * incx]` for every element of `y`.
    fn axpy(alpha: f64, x: &[f64], incx: usize, y: &mut [f64]);

    /// Rank-one update of the row-major `x.len() x y.len()` matrix `a`:
    /// `a[i][j] += alpha * x[i] * y[j]`.
    fn ger(alpha: f64, x: &[f64], y: &[f64], a: &mut [f64]);

    /// Returns the sum of the elementwise products of `x` and `y` (which have equal length).
    fn dot(x: &[f64], y: &[f64]) -> f64;

    /// `out[i] = x[i] * y[i]`.
    fn hprod(x: &[f64], y: &[f64], out: &mut [f64]);

    /// `x[i] *= y[i]`.
    fn hprod_assign(x: &mut [f64], y: &[f64]) {
        for (x, y) in x.iter_mut().zip(y) {
            *x *= y;
        }
    }

    /// Generalized matrix multiply: `c = alpha * op(a) * op(b)`.
    ///
    /// `op(a)` is `m x k` and `op(b)` is `k x n`. The result is written to the first `n` columns
    /// of the first `m` rows of `c`, whose rows are `ldc` elements apart. Other elements of `c`
    /// are left untouched.
    fn gemm(
        trans_a: Transpose,
        trans_b: Transpose,
        alpha: f64,
        a: Operand<'_>,
        b: Operand<'_>,
        c: &mut [f64],
        ldc: usize,
    );

    /// `x[i] *= alpha`.
    fn scal(alpha: f64, x: &mut [f64]);

    /// Euclidean norm of `x` (the Frobenius norm when `x` holds a matrix).
    fn nrm2(x: &[f64]) -> f64;

    /// `out[i] = x[i] - y[i]`.
    fn sub(x: &[f64], y: &[f64], out: &mut [f64]);

    /// `x[i] = tanh(x[i])`.
    fn tanh(x: &mut [f64]);
}
