//! Dense `f64` matrices with ownership-aware operators and compile-time backends.
//!
//! [`Matrix`] stores its elements in a single row-major buffer that it owns exclusively. All
//! numeric work is delegated to a [`Backend`], selected by a type parameter: dispatch is resolved
//! at compile time and a matrix of one backend can't be mixed with a matrix of another.
//!
//! # Storage Reuse
//!
//! Arithmetic operators never copy a matrix implicitly, and they allocate only when the result
//! can't live in one of the operands:
//!
//! - `alpha * a` and `a * alpha` scale `a` in place and return it. `alpha * &mut a` does the
//!   same but leaves `a` where it is. [`Matrix::take`] moves the storage out of a variable
//!   while leaving the empty matrix behind.
//! - `a + &b` and `a - &b` accumulate into `a`. `&a + b` accumulates into `b`, and `&a - b`
//!   computes `-(b - a)` in the storage of `b`.
//! - `&a * &b` (and every other operand combination of `*`) allocates the
//!   `a.rows() x b.cols()` result. Use [`mprod`], [`mprod_ld`] or [`mprod_t`] to write into an
//!   existing matrix instead.
//!
//! ```
//! # use densemat::*;
//! let a = Matrix::<Reference>::from_rows(&[[0.0, 1.0], [-1.0, 0.0]]);
//! let b = Matrix::filled(2, 2, 1.0);
//! let ptr = b.as_slice().as_ptr();
//!
//! let c = &a + b;
//! assert_eq!(c.as_slice().as_ptr(), ptr);
//! assert_eq!(&a * &a, -Matrix::from_rows(&[[1.0, 0.0], [0.0, 1.0]]));
//! ```
//!
//! Adding two borrowed matrices would require a fresh allocation, so it doesn't compile. Clone
//! one of the operands explicitly if that's what you want:
//!
//! ```compile_fail
//! # use densemat::*;
//! let a = Matrix::<Reference>::zeros(2, 2);
//! let b = Matrix::<Reference>::zeros(2, 2);
//! let c = &a + &b;
//! ```
//!
//! # Errors
//!
//! Shape mismatches are detected before any buffer is touched, so failed operations have no
//! effect. The free functions and `try_*` methods return them as [`Error`]. Operators can't
//! return errors and panic with the same message instead.
//!
//! # Environment Variables
//!
//! * `DENSEMAT_SEED`: Seeds the generator used by [`Matrix::randn`] with the given unsigned
//!   integer. If unset, the generator is seeded from system entropy. See [`random`].
//!
//! # Cargo Features
//!
//! * `ndarray` (enabled by default): Enables the [`Ndarray`] backend.

use log::LevelFilter;

mod arith;
pub mod backend;
pub mod codec;
mod error;
mod matrix;
pub mod random;

pub use arith::*;
#[cfg(feature = "ndarray")]
pub use backend::Ndarray;
pub use backend::{Backend, Reference, Transpose};
pub use error::Error;
pub use matrix::{Matrix, Row, Shape};

/// macro-use only, not part of public API.
#[doc(hidden)]
pub fn init_logger(calling_crate: &'static str) {
    let log_level = LevelFilter::Debug;
    env_logger::Builder::new()
        .filter(Some(calling_crate), log_level)
        .filter(Some(env!("CARGO_PKG_NAME")), log_level)
        .parse_default_env()
        .try_init()
        .ok();
}

/// Initializes logging to *stderr*.
///
/// The calling crate and `densemat` log at *debug* level. `RUST_LOG` can override this (eg.
/// `RUST_LOG=densemat=trace` shows every allocation and release of matrix storage).
///
/// If a global logger is already registered, this macro will do nothing.
#[macro_export]
macro_rules! init_logger {
    () => {
        $crate::init_logger(env!("CARGO_CRATE_NAME"))
    };
}
