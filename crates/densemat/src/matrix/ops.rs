//! Indexing, comparison and arithmetic operators.
//!
//! Operators that consume an operand reuse its storage for the result. Operators on borrowed
//! operands only exist where the result needs fresh storage anyway (the matrix product), so
//! `&a + &b` is rejected at compile time.

use std::ops::{Add, AddAssign, Index, IndexMut, Mul, MulAssign, Neg, Sub, SubAssign};

use approx::{AbsDiffEq, RelativeEq, UlpsEq};

use crate::{
    backend::Backend,
    error::{raise, Error},
    Matrix, Row,
};

impl<B: Backend> Matrix<B> {
    /// `self += rhs`, returning [`Error::DimensionMismatch`] unless both shapes are equal.
    ///
    /// `self` is left unchanged on error.
    pub fn try_add_assign(&mut self, rhs: &Self) -> Result<(), Error> {
        self.check_same_shape("add", rhs)?;
        B::axpy(1.0, &rhs.data, 1, &mut self.data);
        Ok(())
    }

    /// `self -= rhs`, returning [`Error::DimensionMismatch`] unless both shapes are equal.
    ///
    /// `self` is left unchanged on error.
    pub fn try_sub_assign(&mut self, rhs: &Self) -> Result<(), Error> {
        self.check_same_shape("sub", rhs)?;
        B::axpy(-1.0, &rhs.data, 1, &mut self.data);
        Ok(())
    }

    /// Multiplies `self` with `rhs` element by element, in place.
    pub fn hprod_assign(&mut self, rhs: &Self) -> Result<(), Error> {
        self.check_same_shape("hprod", rhs)?;
        B::hprod_assign(&mut self.data, &rhs.data);
        Ok(())
    }

    pub(crate) fn check_same_shape(&self, op: &'static str, other: &Self) -> Result<(), Error> {
        if self.shape() == other.shape() {
            Ok(())
        } else {
            Err(Error::mismatch(op, self.shape(), other.shape()))
        }
    }

    /// `self = lhs - self`, reusing the storage of `self`.
    fn rsub_assign(&mut self, lhs: &Self) -> Result<(), Error> {
        lhs.check_same_shape("sub", self)?;
        // -(self - lhs)
        B::axpy(-1.0, &lhs.data, 1, &mut self.data);
        B::scal(-1.0, &mut self.data);
        Ok(())
    }
}

impl<B: Backend> Index<usize> for Matrix<B> {
    type Output = Row;

    #[inline]
    #[track_caller]
    fn index(&self, row: usize) -> &Row {
        assert!(
            row < self.rows,
            "row index {row} out of range for {} matrix",
            self.shape()
        );
        Row::new(&self.data[row * self.cols..(row + 1) * self.cols])
    }
}

impl<B: Backend> IndexMut<usize> for Matrix<B> {
    #[inline]
    #[track_caller]
    fn index_mut(&mut self, row: usize) -> &mut Row {
        assert!(
            row < self.rows,
            "row index {row} out of range for {} matrix",
            self.shape()
        );
        Row::new_mut(&mut self.data[row * self.cols..(row + 1) * self.cols])
    }
}

// Matrices with different backends are never compared; their results are only approximately
// equal anyway.
impl<B: Backend> PartialEq for Matrix<B> {
    fn eq(&self, other: &Self) -> bool {
        self.shape() == other.shape() && self.data == other.data
    }
}

impl<B: Backend> AbsDiffEq for Matrix<B> {
    type Epsilon = f64;

    fn default_epsilon() -> f64 {
        f64::default_epsilon()
    }

    fn abs_diff_eq(&self, other: &Self, epsilon: f64) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.abs_diff_eq(b, epsilon))
    }
}

impl<B: Backend> RelativeEq for Matrix<B> {
    fn default_max_relative() -> f64 {
        f64::default_max_relative()
    }

    fn relative_eq(&self, other: &Self, epsilon: f64, max_relative: f64) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.relative_eq(b, epsilon, max_relative))
    }
}

impl<B: Backend> UlpsEq for Matrix<B> {
    fn default_max_ulps() -> u32 {
        f64::default_max_ulps()
    }

    fn ulps_eq(&self, other: &Self, epsilon: f64, max_ulps: u32) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| a.ulps_eq(b, epsilon, max_ulps))
    }
}

/// Scalar * Matrix, scaling the storage of the matrix in place.
impl<B: Backend> Mul<Matrix<B>> for f64 {
    type Output = Matrix<B>;

    fn mul(self, mut rhs: Matrix<B>) -> Matrix<B> {
        B::scal(self, &mut rhs.data);
        rhs
    }
}

/// Scalar * mutably borrowed Matrix.
///
/// Scales the matrix in place and yields the same borrow, so the matrix stays where it is.
impl<'a, B: Backend> Mul<&'a mut Matrix<B>> for f64 {
    type Output = &'a mut Matrix<B>;

    fn mul(self, rhs: &'a mut Matrix<B>) -> &'a mut Matrix<B> {
        B::scal(self, &mut rhs.data);
        rhs
    }
}

/// Matrix * Scalar.
impl<B: Backend> Mul<f64> for Matrix<B> {
    type Output = Matrix<B>;

    fn mul(self, rhs: f64) -> Matrix<B> {
        rhs * self
    }
}

impl<B: Backend> MulAssign<f64> for Matrix<B> {
    fn mul_assign(&mut self, rhs: f64) {
        B::scal(rhs, &mut self.data);
    }
}

impl<B: Backend> Neg for Matrix<B> {
    type Output = Matrix<B>;

    fn neg(self) -> Matrix<B> {
        -1.0 * self
    }
}

impl<B: Backend> AddAssign<&Matrix<B>> for Matrix<B> {
    #[track_caller]
    fn add_assign(&mut self, rhs: &Matrix<B>) {
        if let Err(e) = self.try_add_assign(rhs) {
            raise(e);
        }
    }
}

impl<B: Backend> AddAssign<Matrix<B>> for Matrix<B> {
    #[track_caller]
    fn add_assign(&mut self, rhs: Matrix<B>) {
        *self += &rhs;
    }
}

impl<B: Backend> SubAssign<&Matrix<B>> for Matrix<B> {
    #[track_caller]
    fn sub_assign(&mut self, rhs: &Matrix<B>) {
        if let Err(e) = self.try_sub_assign(rhs) {
            raise(e);
        }
    }
}

impl<B: Backend> SubAssign<Matrix<B>> for Matrix<B> {
    #[track_caller]
    fn sub_assign(&mut self, rhs: Matrix<B>) {
        *self -= &rhs;
    }
}

/// Owned + borrowed: the sum is accumulated into the left operand.
impl<B: Backend> Add<&Matrix<B>> for Matrix<B> {
    type Output = Matrix<B>;

    #[track_caller]
    fn add(mut self, rhs: &Matrix<B>) -> Matrix<B> {
        self += rhs;
        self
    }
}

/// Borrowed + owned: the sum is accumulated into the right operand.
impl<B: Backend> Add<Matrix<B>> for &Matrix<B> {
    type Output = Matrix<B>;

    #[track_caller]
    fn add(self, rhs: Matrix<B>) -> Matrix<B> {
        rhs + self
    }
}

impl<B: Backend> Add<Matrix<B>> for Matrix<B> {
    type Output = Matrix<B>;

    #[track_caller]
    fn add(self, rhs: Matrix<B>) -> Matrix<B> {
        self + &rhs
    }
}

/// Owned - borrowed: the difference is accumulated into the left operand.
impl<B: Backend> Sub<&Matrix<B>> for Matrix<B> {
    type Output = Matrix<B>;

    #[track_caller]
    fn sub(mut self, rhs: &Matrix<B>) -> Matrix<B> {
        self -= rhs;
        self
    }
}

/// Borrowed - owned: computes `-(rhs - self)` in the storage of the right operand.
impl<B: Backend> Sub<Matrix<B>> for &Matrix<B> {
    type Output = Matrix<B>;

    #[track_caller]
    fn sub(self, mut rhs: Matrix<B>) -> Matrix<B> {
        if let Err(e) = rhs.rsub_assign(self) {
            raise(e);
        }
        rhs
    }
}

impl<B: Backend> Sub<Matrix<B>> for Matrix<B> {
    type Output = Matrix<B>;

    #[track_caller]
    fn sub(self, rhs: Matrix<B>) -> Matrix<B> {
        self - &rhs
    }
}

/// Matrix product. Always allocates a new `lhs.rows() x rhs.cols()` matrix.
impl<B: Backend> Mul<&Matrix<B>> for &Matrix<B> {
    type Output = Matrix<B>;

    #[track_caller]
    fn mul(self, rhs: &Matrix<B>) -> Matrix<B> {
        match crate::matmul(self, rhs) {
            Ok(mat) => mat,
            Err(e) => raise(e),
        }
    }
}

impl<B: Backend> Mul<Matrix<B>> for &Matrix<B> {
    type Output = Matrix<B>;

    #[track_caller]
    fn mul(self, rhs: Matrix<B>) -> Matrix<B> {
        self * &rhs
    }
}

impl<B: Backend> Mul<&Matrix<B>> for Matrix<B> {
    type Output = Matrix<B>;

    #[track_caller]
    fn mul(self, rhs: &Matrix<B>) -> Matrix<B> {
        &self * rhs
    }
}

impl<B: Backend> Mul<Matrix<B>> for Matrix<B> {
    type Output = Matrix<B>;

    #[track_caller]
    fn mul(self, rhs: Matrix<B>) -> Matrix<B> {
        &self * &rhs
    }
}
