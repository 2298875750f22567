use std::io;

use thiserror::Error;

use crate::Shape;

/// Error type returned by every checked matrix operation.
///
/// All operations validate their arguments before touching any buffer, so an operation that
/// returns an error has left every operand unmodified.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Operand shapes are incompatible with the requested operation.
    #[error("dimension mismatch in `{op}`: {lhs} vs {rhs}")]
    DimensionMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },

    /// The backend could not obtain storage for a matrix of the given shape.
    #[error("failed to allocate storage for a {shape} matrix")]
    AllocationFailure { shape: Shape },

    /// A strided source buffer is too short to supply every element.
    #[error(
        "buffer of length {len} with stride {stride} cannot supply {count} elements \
         (needs at least {required})"
    )]
    InvalidStride {
        stride: usize,
        len: usize,
        count: usize,
        required: usize,
    },

    /// A serialized matrix header declares a shape that cannot exist.
    #[error("invalid matrix header: {rows} rows × {cols} cols")]
    InvalidHeader { rows: i64, cols: i64 },

    /// The stream ended before supplying the payload its header declares.
    #[error("payload of {shape} matrix is truncated: expected {expected} bytes, found {available}")]
    TruncatedPayload {
        shape: Shape,
        expected: u64,
        available: u64,
    },

    /// Underlying IO failure.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl Error {
    pub(crate) fn mismatch(op: &'static str, lhs: Shape, rhs: Shape) -> Self {
        Self::DimensionMismatch { op, lhs, rhs }
    }
}

/// Panics with the message of `err`.
///
/// Operator overloads can't return a [`Result`], so they report failures the same way slice
/// indexing does.
#[cold]
#[track_caller]
pub(crate) fn raise(err: Error) -> ! {
    panic!("{err}")
}
