//! Non-allocating matrix kernels.
//!
//! Every function here validates the shapes of its operands first and returns
//! [`Error::DimensionMismatch`] without touching any buffer if they don't fit. Results are
//! written into caller-supplied destinations, so the only function that allocates is
//! [`matmul`] (and [`transpose`], which returns a new matrix by definition).

use crate::{
    backend::{Backend, Operand, Transpose},
    Error, Matrix, Shape,
};

fn operand<B: Backend>(mat: &Matrix<B>) -> Operand<'_> {
    Operand::new(mat.as_slice(), mat.rows(), mat.cols())
}

fn ensure(ok: bool, op: &'static str, lhs: Shape, rhs: Shape) -> Result<(), Error> {
    if ok {
        Ok(())
    } else {
        Err(Error::mismatch(op, lhs, rhs))
    }
}

/// Checks that a buffer of length `len` can supply `count` elements `stride` apart.
fn check_stride(len: usize, stride: usize, count: usize) -> Result<(), Error> {
    if count == 0 {
        return Ok(());
    }
    let required = (count - 1)
        .checked_mul(stride)
        .and_then(|last| last.checked_add(1))
        .unwrap_or(usize::MAX);
    if len < required {
        return Err(Error::InvalidStride {
            stride,
            len,
            count,
            required,
        });
    }
    Ok(())
}

/// Computes the matrix product `a * b` into a newly allocated `a.rows() x b.cols()` matrix.
///
/// This is the checked version of `&a * &b`.
pub fn matmul<B: Backend>(a: &Matrix<B>, b: &Matrix<B>) -> Result<Matrix<B>, Error> {
    ensure(a.cols() == b.rows(), "matmul", a.shape(), b.shape())?;
    let mut c = Matrix::try_new(a.rows(), b.cols())?;
    mprod(a, b, &mut c)?;
    Ok(c)
}

/// `c = a * b`.
///
/// `c` must already have shape `a.rows() x b.cols()`.
pub fn mprod<B: Backend>(a: &Matrix<B>, b: &Matrix<B>, c: &mut Matrix<B>) -> Result<(), Error> {
    mprod_t(false, false, 1.0, a, b, c)
}

/// `c = a * b`, where the rows of `c` are `ldc` elements apart.
///
/// `c` has to have exactly `ldc` columns, at least as many as `b`. Only the left-most
/// `b.cols()` columns of `c` are written; the others keep their contents.
///
/// # Examples
///
/// ```
/// # use densemat::*;
/// let a = Matrix::<Reference>::from_rows(&[[0.0, 1.0], [-1.0, 0.0]]);
/// let x = Matrix::column(&[2.0, 1.0]);
/// let mut c = Matrix::filled(2, 3, 9.0);
/// mprod_ld(&a, &x, &mut c, 3)?;
/// assert_eq!(c, Matrix::from_rows(&[[1.0, 9.0, 9.0], [-2.0, 9.0, 9.0]]));
/// # Ok::<_, densemat::Error>(())
/// ```
pub fn mprod_ld<B: Backend>(
    a: &Matrix<B>,
    b: &Matrix<B>,
    c: &mut Matrix<B>,
    ldc: usize,
) -> Result<(), Error> {
    let shape = Shape::new(a.rows(), ldc);
    ensure(c.shape() == shape, "mprod_ld", shape, c.shape())?;
    ensure(a.cols() == b.rows(), "mprod_ld", a.shape(), b.shape())?;
    ensure(b.cols() <= ldc, "mprod_ld", b.shape(), c.shape())?;
    B::gemm(
        Transpose::No,
        Transpose::No,
        1.0,
        operand(a),
        operand(b),
        c.as_mut_slice(),
        ldc,
    );
    Ok(())
}

/// `c = alpha * op(a) * op(b)`, where `op(x)` is `x` or its transpose depending on the
/// corresponding flag.
///
/// `c` must have shape `rows(op(a)) x cols(op(b))`.
pub fn mprod_t<B: Backend>(
    trans_a: impl Into<Transpose>,
    trans_b: impl Into<Transpose>,
    alpha: f64,
    a: &Matrix<B>,
    b: &Matrix<B>,
    c: &mut Matrix<B>,
) -> Result<(), Error> {
    let (trans_a, trans_b) = (trans_a.into(), trans_b.into());
    let (m, k) = trans_a.apply(a.rows(), a.cols());
    let (kb, n) = trans_b.apply(b.rows(), b.cols());
    let op_a = Shape::new(m, k);
    let op_b = Shape::new(kb, n);
    ensure(k == kb, "mprod", op_a, op_b)?;
    ensure(c.shape() == Shape::new(m, n), "mprod", Shape::new(m, n), c.shape())?;
    B::gemm(
        trans_a,
        trans_b,
        alpha,
        operand(a),
        operand(b),
        c.as_mut_slice(),
        n,
    );
    Ok(())
}

/// `c = a - b`, element by element.
pub fn msub<B: Backend>(a: &Matrix<B>, b: &Matrix<B>, c: &mut Matrix<B>) -> Result<(), Error> {
    a.check_same_shape("msub", b)?;
    a.check_same_shape("msub", c)?;
    B::sub(a.as_slice(), b.as_slice(), c.as_mut_slice());
    Ok(())
}

/// `c = a .* b`, the element-wise (Hadamard) product.
///
/// Use [`Matrix::hprod_assign`] to multiply in place.
pub fn hprod<B: Backend>(a: &Matrix<B>, b: &Matrix<B>, c: &mut Matrix<B>) -> Result<(), Error> {
    a.check_same_shape("hprod", b)?;
    a.check_same_shape("hprod", c)?;
    B::hprod(a.as_slice(), b.as_slice(), c.as_mut_slice());
    Ok(())
}

/// `y += alpha * x`. Both matrices must have the same shape.
pub fn maxpy<B: Backend>(alpha: f64, x: &Matrix<B>, y: &mut Matrix<B>) -> Result<(), Error> {
    x.check_same_shape("maxpy", y)?;
    B::axpy(alpha, x.as_slice(), 1, y.as_mut_slice());
    Ok(())
}

/// `y += alpha * x`, reading element `i` of `y` (in row-major order) from `x[i * incx]`.
///
/// An `incx` of 0 adds the same value `alpha * x[0]` to every element.
pub fn maxpy_raw<B: Backend>(
    alpha: f64,
    x: &[f64],
    incx: usize,
    y: &mut Matrix<B>,
) -> Result<(), Error> {
    check_stride(x.len(), incx, y.numel())?;
    B::axpy(alpha, x, incx, y.as_mut_slice());
    Ok(())
}

/// Rank-one update `a += alpha * x * yᵗ`.
///
/// `x` and `y` can have any shape; their elements are used in row-major order. `a` has to have
/// `numel(x)` rows and `numel(y)` columns.
pub fn mger<B: Backend>(
    alpha: f64,
    x: &Matrix<B>,
    y: &Matrix<B>,
    a: &mut Matrix<B>,
) -> Result<(), Error> {
    let shape = Shape::new(x.numel(), y.numel());
    ensure(a.shape() == shape, "mger", shape, a.shape())?;
    B::ger(alpha, x.as_slice(), y.as_slice(), a.as_mut_slice());
    Ok(())
}

/// Copies the contents of `x` into `y`, which must have the same shape.
pub fn mcopy<B: Backend>(x: &Matrix<B>, y: &mut Matrix<B>) -> Result<(), Error> {
    x.check_same_shape("mcopy", y)?;
    B::copy(x.as_slice(), 1, y.as_mut_slice());
    Ok(())
}

/// Fills `y` (in row-major order) with `x[i * incx]`.
///
/// An `incx` of 0 broadcasts `x[0]` to every element.
pub fn mcopy_raw<B: Backend>(x: &[f64], incx: usize, y: &mut Matrix<B>) -> Result<(), Error> {
    check_stride(x.len(), incx, y.numel())?;
    B::copy(x, incx, y.as_mut_slice());
    Ok(())
}

/// Returns the sum of the element-wise products of two equally shaped matrices.
pub fn dot<B: Backend>(a: &Matrix<B>, b: &Matrix<B>) -> Result<f64, Error> {
    a.check_same_shape("dot", b)?;
    Ok(B::dot(a.as_slice(), b.as_slice()))
}

/// Returns the Frobenius norm of `a` (the Euclidean norm, if `a` is a vector).
pub fn norm<B: Backend>(a: &Matrix<B>) -> f64 {
    B::nrm2(a.as_slice())
}

/// Applies the hyperbolic tangent to every element of `a`, in place.
pub fn tanh<B: Backend>(a: &mut Matrix<B>) {
    B::tanh(a.as_mut_slice());
}

/// Returns the transpose of `a`. See [`Matrix::transpose`].
pub fn transpose<B: Backend>(a: &Matrix<B>) -> Matrix<B> {
    a.transpose()
}

/// Returns the number of elements of `a`.
#[inline]
pub fn numel<B: Backend>(a: &Matrix<B>) -> usize {
    a.numel()
}
