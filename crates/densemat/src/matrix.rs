use std::{fmt, marker::PhantomData, mem};

use crate::{backend::Backend, random, Error, Reference};

mod ops;
mod view;

pub use view::Row;

/// The dimensions of a [`Matrix`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Shape {
    /// Number of rows.
    pub rows: usize,
    /// Number of columns (the length of each row).
    pub cols: usize,
}

impl Shape {
    #[inline]
    pub const fn new(rows: usize, cols: usize) -> Self {
        Self { rows, cols }
    }

    /// Returns the number of elements of a matrix with this shape, or [`None`] on overflow.
    #[inline]
    pub fn checked_numel(&self) -> Option<usize> {
        self.rows.checked_mul(self.cols)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// A dense, row-major matrix of [`f64`] elements whose primitive operations are provided by the
/// backend `B`.
///
/// # Ownership
///
/// A [`Matrix`] exclusively owns its storage. It is not [`Copy`], and no operation copies it
/// behind your back:
///
/// - [`Clone`] is the only way to duplicate a matrix and always allocates.
/// - Rust moves transfer the storage in O(1). [`Matrix::take`] does the same while leaving an
///   empty matrix behind, so the source stays usable.
/// - Operators only reuse storage of operands that are passed *by value*. See the
///   [crate-level documentation](crate) for the exact rules.
///
/// A matrix with zero elements owns no storage. The canonical *empty* matrix has 0 rows and 0
/// columns; it is returned by [`Matrix::empty`] and [`Default`], and is what [`Matrix::take`]
/// leaves behind.
///
/// # Element Access
///
/// Indexing with a single `usize` yields a [`Row`], which can be indexed again to reach an
/// element. A single-column matrix is treated as a vector: its rows dereference to their only
/// element.
///
/// ```
/// # use densemat::*;
/// let mut mat = Matrix::<Reference>::from_rows(&[
///     [0.0, 1.0],
///     [2.0, 3.0],
/// ]);
/// mat[1][0] = 4.0;
/// assert_eq!(mat[1][0], 4.0);
///
/// let mut x = Matrix::<Reference>::vector(2);
/// *x[0] = 4.0;
/// assert_eq!(*x[0], 4.0);
/// assert_eq!(x[0][0], 4.0);
/// ```
///
/// Indexing out of bounds panics, just like it does for slices. [`Matrix::get`] and
/// [`Matrix::get_mut`] return [`Option`]s instead.
///
/// # Equality
///
/// `==` is exact: two matrices are equal if their shapes match and every element compares equal.
/// No floating-point tolerance is applied. The [`approx`] traits are implemented for
/// tolerance-based comparisons.
pub struct Matrix<B: Backend = Reference> {
    rows: usize,
    cols: usize,
    data: Box<[f64]>,
    backend: PhantomData<fn() -> B>,
}

impl<B: Backend> Matrix<B> {
    /// Returns the canonical empty matrix (0 rows, 0 columns, no storage).
    pub fn empty() -> Self {
        Self {
            rows: 0,
            cols: 0,
            data: Box::default(),
            backend: PhantomData,
        }
    }

    /// Creates a `rows x cols` matrix.
    ///
    /// The contents of the matrix are unspecified; write every element before reading it (for
    /// example with [`Matrix::fill`]). Use [`Matrix::zeros`] if a defined value is needed.
    ///
    /// # Panics
    ///
    /// Panics if the storage cannot be allocated. [`Matrix::try_new`] reports this as an error
    /// instead.
    #[track_caller]
    pub fn new(rows: usize, cols: usize) -> Self {
        match Self::try_new(rows, cols) {
            Ok(mat) => mat,
            Err(e) => crate::error::raise(e),
        }
    }

    /// Creates a `rows x cols` matrix, returning [`Error::AllocationFailure`] if storage can't
    /// be allocated.
    pub fn try_new(rows: usize, cols: usize) -> Result<Self, Error> {
        let shape = Shape::new(rows, cols);
        let len = shape
            .checked_numel()
            .ok_or(Error::AllocationFailure { shape })?;
        let data = if len == 0 {
            Box::default()
        } else {
            log::trace!("allocating {shape} matrix ({} backend)", B::NAME);
            B::alloc(len).map_err(|_| Error::AllocationFailure { shape })?
        };
        Ok(Self {
            rows,
            cols,
            data,
            backend: PhantomData,
        })
    }

    /// Creates a column vector with `len` rows.
    ///
    /// Like [`Matrix::new`], the contents are unspecified.
    #[track_caller]
    pub fn vector(len: usize) -> Self {
        Self::new(len, 1)
    }

    /// Creates a `rows x cols` matrix with every element set to 0.
    #[track_caller]
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self::filled(rows, cols, 0.0)
    }

    /// Creates a `rows x cols` matrix with every element set to `value`.
    #[track_caller]
    pub fn filled(rows: usize, cols: usize, value: f64) -> Self {
        let mut mat = Self::new(rows, cols);
        mat.fill(value);
        mat
    }

    /// Creates a matrix by invoking a closure with the position (row and column) of each
    /// element.
    ///
    /// # Examples
    ///
    /// ```
    /// # use densemat::*;
    /// let mat = Matrix::<Reference>::from_fn(2, 3, |row, col| (row * 10 + col) as f64);
    /// assert_eq!(mat, Matrix::from_rows(&[
    ///     [ 0.0,  1.0,  2.0],
    ///     [10.0, 11.0, 12.0],
    /// ]));
    /// ```
    #[track_caller]
    pub fn from_fn<F>(rows: usize, cols: usize, mut cb: F) -> Self
    where
        F: FnMut(usize, usize) -> f64,
    {
        let mut mat = Self::new(rows, cols);
        for (i, elem) in mat.data.iter_mut().enumerate() {
            *elem = cb(i / cols, i % cols);
        }
        mat
    }

    /// Creates a matrix from a slice of rows.
    #[track_caller]
    pub fn from_rows<const C: usize>(rows: &[[f64; C]]) -> Self {
        let mut mat = Self::new(rows.len(), C);
        for (dest, row) in mat.data.chunks_exact_mut(C.max(1)).zip(rows) {
            B::copy(row, 1, dest);
        }
        mat
    }

    /// Creates a column vector holding `values`.
    #[track_caller]
    pub fn column(values: &[f64]) -> Self {
        let mut mat = Self::vector(values.len());
        B::copy(values, 1, &mut mat.data);
        mat
    }

    /// Creates a `rows x cols` matrix from its elements in row-major order.
    ///
    /// Returns [`Error::DimensionMismatch`] if `values` doesn't hold exactly `rows * cols`
    /// elements.
    pub fn from_vec(rows: usize, cols: usize, values: Vec<f64>) -> Result<Self, Error> {
        let shape = Shape::new(rows, cols);
        if shape.checked_numel() != Some(values.len()) {
            return Err(Error::mismatch(
                "from_vec",
                shape,
                Shape::new(values.len(), 1),
            ));
        }
        let mut mat = Self::try_new(rows, cols)?;
        B::copy(&values, 1, &mut mat.data);
        Ok(mat)
    }

    /// Creates a `rows x cols` matrix of independent standard-normal samples.
    ///
    /// Samples are drawn from a process-wide generator; see the [`random`] module for how it is
    /// seeded.
    #[track_caller]
    pub fn randn(rows: usize, cols: usize) -> Self {
        let mut mat = Self::new(rows, cols);
        random::fill_standard_normal(&mut mat.data);
        mat
    }

    /// Returns the number of rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the dimensions of the matrix.
    #[inline]
    pub fn shape(&self) -> Shape {
        Shape::new(self.rows, self.cols)
    }

    /// Returns the number of elements (`rows * cols`).
    #[inline]
    pub fn numel(&self) -> usize {
        self.data.len()
    }

    /// Returns whether the matrix has no elements (and therefore no storage).
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the elements in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Returns the elements in row-major order.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Copies the elements into a [`Vec`], in row-major order.
    pub fn to_vec(&self) -> Vec<f64> {
        self.data.to_vec()
    }

    /// Moves the storage out of `self` into a new matrix, leaving the empty matrix behind.
    ///
    /// This is an O(1) operation and never allocates.
    ///
    /// # Examples
    ///
    /// ```
    /// # use densemat::*;
    /// let mut a = Matrix::<Reference>::zeros(2, 2);
    /// let b = a.take();
    /// assert_eq!(a, Matrix::empty());
    /// assert_eq!(b, Matrix::zeros(2, 2));
    /// ```
    #[inline]
    pub fn take(&mut self) -> Self {
        mem::take(self)
    }

    /// Overwrites every element with `value`.
    pub fn fill(&mut self, value: f64) {
        B::copy(&[value], 0, &mut self.data);
    }

    /// Returns the transpose of this matrix in newly allocated storage.
    ///
    /// # Examples
    ///
    /// ```
    /// # use densemat::*;
    /// let mat = Matrix::<Reference>::from_rows(&[
    ///     [0.0, 1.0, 2.0],
    ///     [3.0, 4.0, 5.0],
    /// ]).transpose();
    /// assert_eq!(mat, Matrix::from_rows(&[
    ///     [0.0, 3.0],
    ///     [1.0, 4.0],
    ///     [2.0, 5.0],
    /// ]));
    /// ```
    #[track_caller]
    pub fn transpose(&self) -> Self {
        let mut out = Self::new(self.cols, self.rows);
        for (i, row) in self.row_iter().enumerate() {
            for (j, &elem) in row.iter().enumerate() {
                out.data[j * self.rows + i] = elem;
            }
        }
        out
    }

    /// Returns the element at `(row, col)`, or [`None`] if out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.offset(row, col).map(|i| self.data[i])
    }

    /// Returns a mutable reference to the element at `(row, col)`, or [`None`] if out of bounds.
    pub fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut f64> {
        self.offset(row, col).map(|i| &mut self.data[i])
    }

    fn offset(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows && col < self.cols).then(|| row * self.cols + col)
    }

    /// Returns an iterator over the rows of the matrix.
    pub fn row_iter(&self) -> impl ExactSizeIterator<Item = &Row> + '_ {
        (0..self.rows).map(move |i| &self[i])
    }
}

impl<B: Backend> Default for Matrix<B> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Deep copy. The clone has its own storage.
impl<B: Backend> Clone for Matrix<B> {
    fn clone(&self) -> Self {
        let mut out = Self::new(self.rows, self.cols);
        B::copy(&self.data, 1, &mut out.data);
        out
    }
}

impl<B: Backend> Drop for Matrix<B> {
    fn drop(&mut self) {
        if !self.data.is_empty() {
            log::trace!("releasing {} matrix ({} backend)", self.shape(), B::NAME);
            B::dealloc(mem::take(&mut self.data));
        }
    }
}

impl<B: Backend> fmt::Debug for Matrix<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Empty matrices with columns would otherwise print as `[]`, same as the empty matrix.
        if self.rows == 0 && self.cols != 0 {
            return write!(f, "[; {}]", self.cols);
        }
        f.debug_list().entries(self.row_iter()).finish()
    }
}
