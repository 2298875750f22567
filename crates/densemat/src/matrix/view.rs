use std::{
    fmt,
    ops::{Deref, DerefMut, Index, IndexMut},
    slice,
};

/// A borrowed row of a [`Matrix`](crate::Matrix).
///
/// Rows are obtained by indexing a matrix with a row index and borrow from it. They can be
/// indexed again to access individual elements.
///
/// A row of exactly one element (which is what every row of a column vector is) also
/// dereferences to that element.
#[repr(transparent)]
pub struct Row([f64]);

impl Row {
    #[inline]
    pub(crate) fn new(elems: &[f64]) -> &Self {
        // Safety: `Row` is a `#[repr(transparent)]` wrapper around `[f64]`.
        unsafe { &*(elems as *const [f64] as *const Row) }
    }

    #[inline]
    pub(crate) fn new_mut(elems: &mut [f64]) -> &mut Self {
        // Safety: see above.
        unsafe { &mut *(elems as *mut [f64] as *mut Row) }
    }

    /// Returns the number of elements in this row (the column count of the matrix).
    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.0
    }

    #[inline]
    pub fn iter(&self) -> slice::Iter<'_, f64> {
        self.0.iter()
    }

    #[inline]
    pub fn iter_mut(&mut self) -> slice::IterMut<'_, f64> {
        self.0.iter_mut()
    }
}

impl Index<usize> for Row {
    type Output = f64;

    #[inline]
    fn index(&self, col: usize) -> &f64 {
        &self.0[col]
    }
}

impl IndexMut<usize> for Row {
    #[inline]
    fn index_mut(&mut self, col: usize) -> &mut f64 {
        &mut self.0[col]
    }
}

/// Scalar access for rows of column vectors.
///
/// Panics if the row doesn't have exactly one element.
impl Deref for Row {
    type Target = f64;

    #[inline]
    #[track_caller]
    fn deref(&self) -> &f64 {
        match &self.0 {
            [elem] => elem,
            _ => panic!("scalar access to a row of {} elements", self.len()),
        }
    }
}

impl DerefMut for Row {
    #[inline]
    #[track_caller]
    fn deref_mut(&mut self) -> &mut f64 {
        let len = self.len();
        match &mut self.0 {
            [elem] => elem,
            _ => panic!("scalar access to a row of {len} elements"),
        }
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl PartialEq<[f64]> for Row {
    fn eq(&self, other: &[f64]) -> bool {
        self.0 == *other
    }
}

impl<const N: usize> PartialEq<[f64; N]> for Row {
    fn eq(&self, other: &[f64; N]) -> bool {
        self.0 == *other
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = &'a f64;
    type IntoIter = slice::Iter<'a, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Rows print on a single line, even with `{:#?}`.
impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, elem) in self.0.iter().enumerate() {
            if i != 0 {
                write!(f, ", ")?;
            }
            write!(f, "{:?}", elem)?;
        }
        write!(f, "]")
    }
}
