//! Behavior every backend has to agree on.
//!
//! Each check is a generic function over the backend. [`suite!`] instantiates all of them as
//! `#[test]`s for one backend.

use std::panic::{catch_unwind, AssertUnwindSafe};

use approx::assert_relative_eq;
use densemat::*;

macro_rules! instantiate {
    ($module:ident, $backend:ty, [$($test:ident),* $(,)?]) => {
        mod $module {
            $(
                #[test]
                fn $test() {
                    densemat::init_logger!();
                    super::$test::<$backend>();
                }
            )*
        }
    };
}

macro_rules! suite {
    ($module:ident, $backend:ty) => {
        instantiate!(
            $module,
            $backend,
            [
                empty,
                move_semantics,
                copy,
                equality,
                scalar_multiply,
                addition,
                addition_mismatch,
                add_assign,
                subtraction,
                subtraction_mismatch,
                sub_assign,
                multiplication,
                multiplication_transposed,
                multiplication_left_cols_only,
                zero_sized_operands,
                hadamard,
                maxpy_accumulates,
                mger_rank_one,
                mcopy_copies,
                reductions,
                transpose_swaps_indices,
                tanh_in_place,
                vector_index,
                fill_all,
                serialization,
                random_shape,
            ]
        );
    };
}

suite!(reference_backend, densemat::Reference);
#[cfg(feature = "ndarray")]
suite!(ndarray_backend, densemat::Ndarray);

#[rustfmt::skip]
fn rot<B: Backend>() -> Matrix<B> {
    Matrix::from_rows(&[
        [ 0.0, 1.0],
        [-1.0, 0.0],
    ])
}

fn panics<R>(f: impl FnOnce() -> R) -> bool {
    catch_unwind(AssertUnwindSafe(f)).is_err()
}

fn empty<B: Backend>() {
    let a = Matrix::<B>::empty();
    assert_eq!(a.rows(), 0);
    assert_eq!(a.cols(), 0);
    assert!(a.as_slice().is_empty());
    assert_eq!(a, Matrix::new(0, 0));
    assert_eq!(a, a.clone());
}

fn move_semantics<B: Backend>() {
    let reference = rot::<B>();
    let mut a = reference.clone();
    let mut b = Matrix::<B>::empty();
    assert!(b.is_empty());

    b = a.take();
    assert_eq!(a, Matrix::empty());
    assert_eq!(b, reference);

    // Moving a matrix into itself keeps its contents.
    b = b.take();
    assert_eq!(b, reference);

    let ptr = b.as_slice().as_ptr();
    let c = b;
    assert_eq!(c.as_slice().as_ptr(), ptr);
}

fn copy<B: Backend>() {
    let b = rot::<B>();
    let mut a = b.clone();
    assert_eq!(a, b);

    a.as_mut_slice()[0] += 1.0;
    assert_ne!(a, b);
    assert_eq!(b, rot());
}

fn equality<B: Backend>() {
    let b = rot::<B>();
    let mut a = b.clone();
    assert!(a == b);
    assert!(!(a != b));

    a.as_mut_slice()[0] += 1.0;
    assert!(a != b);

    // Same elements, flattened into a column.
    let c = Matrix::<B>::column(b.as_slice());
    assert_eq!(c.numel(), b.numel());
    assert!(b != c);

    assert_ne!(Matrix::<B>::new(0, 2), Matrix::new(2, 0));
}

fn scalar_multiply<B: Backend>() {
    let alpha = 3.14;
    let a = rot::<B>();
    let mut x = a.clone();

    // Scaling a borrowed matrix writes in place.
    let ptr = x.as_slice().as_ptr();
    let _ = alpha * &mut x;
    assert_eq!(x.as_slice().as_ptr(), ptr);
    for (scaled, orig) in x.as_slice().iter().zip(a.as_slice()) {
        assert_eq!(*scaled, alpha * orig);
    }

    // Binding the result elsewhere moves the storage out.
    let mut y = a.clone();
    let ptr = y.as_slice().as_ptr();
    let z = (alpha * &mut y).take();
    assert_eq!(z, x);
    assert_eq!(z.as_slice().as_ptr(), ptr);
    assert_eq!(y, Matrix::empty());

    assert_eq!(a.clone() * alpha, x);
    let mut w = a.clone();
    w *= alpha;
    assert_eq!(w, x);
}

fn addition<B: Backend>() {
    let a = rot::<B>();
    let twice = 2.0 * a.clone();

    // Owned left operand.
    let mut x = a.clone();
    let ptr = x.as_slice().as_ptr();
    let z = x.take() + &a;
    assert_eq!(z, twice);
    assert_eq!(z.as_slice().as_ptr(), ptr);
    assert_eq!(x, Matrix::empty());

    // Owned right operand.
    let mut y = a.clone();
    let ptr = y.as_slice().as_ptr();
    let z = &a + y.take();
    assert_eq!(z, twice);
    assert_eq!(z.as_slice().as_ptr(), ptr);
    assert_eq!(y, Matrix::empty());

    // Explicit copy of a persistent operand.
    let z = a.clone() + &a;
    assert_eq!(z, twice);
    assert_eq!(a, rot());
}

fn addition_mismatch<B: Backend>() {
    let x = rot::<B>();
    let z = Matrix::<B>::zeros(4, 1);
    assert!(panics(|| &x + z.clone()));
    assert!(panics(|| z.clone() + &x));
    assert_eq!(x, rot());
    assert_eq!(z, Matrix::zeros(4, 1));
}

fn add_assign<B: Backend>() {
    let x = rot::<B>();
    let mut y = Matrix::<B>::zeros(2, 2);
    y += &x;
    assert_eq!(x, y);
    y += x.clone();
    assert_eq!(y, 2.0 * x.clone());
    assert_ne!(x, y);

    let before = y.clone();
    let err = y.try_add_assign(&Matrix::empty()).unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { .. }));
    let err = y.try_add_assign(&Matrix::zeros(4, 1)).unwrap_err();
    assert_eq!(err.to_string(), "dimension mismatch in `add`: 2x2 vs 4x1");
    assert_eq!(y, before);

    assert!(panics(|| y += &Matrix::<B>::zeros(1, 4)));
}

fn subtraction<B: Backend>() {
    let a = rot::<B>();
    let zeros = Matrix::<B>::zeros(2, 2);

    let mut c = Matrix::<B>::new(2, 2);
    msub(&a, &a, &mut c).unwrap();
    assert_eq!(c, zeros);

    // Owned left operand.
    let mut x = 2.0 * a.clone();
    let ptr = x.as_slice().as_ptr();
    let z = x.take() - &a;
    assert_eq!(z, a);
    assert_eq!(z.as_slice().as_ptr(), ptr);

    // Owned right operand: `a - 2a`, computed as `-(2a - a)` in the right operand.
    let mut y = 2.0 * a.clone();
    let ptr = y.as_slice().as_ptr();
    let z = &a - y.take();
    assert_eq!(z, -1.0 * a.clone());
    assert_eq!(z.as_slice().as_ptr(), ptr);
    assert_eq!(y, Matrix::empty());

    let z = a.clone() - a.clone();
    assert_eq!(z, zeros);
}

fn subtraction_mismatch<B: Backend>() {
    let x = rot::<B>();
    let z = Matrix::<B>::zeros(4, 1);
    assert!(panics(|| &x - z.clone()));
    assert!(panics(|| z.clone() - &x));
    assert_eq!(x, rot());

    let mut c = Matrix::<B>::zeros(2, 2);
    assert!(msub(&x, &z, &mut c).is_err());
    assert_eq!(c, Matrix::zeros(2, 2));
}

fn sub_assign<B: Backend>() {
    let x = rot::<B>();
    let mut y = x.clone();
    y -= &x;
    assert_eq!(y, Matrix::zeros(2, 2));
    y -= x.clone();
    assert_eq!(y, -x.clone());

    let before = y.clone();
    assert!(y.try_sub_assign(&Matrix::empty()).is_err());
    assert!(y.try_sub_assign(&Matrix::zeros(4, 1)).is_err());
    assert_eq!(y, before);
}

fn multiplication<B: Backend>() {
    let a = rot::<B>();
    #[rustfmt::skip]
    let squared = Matrix::<B>::from_rows(&[
        [-1.0,  0.0],
        [ 0.0, -1.0],
    ]);

    assert_eq!(&a * &a, squared);
    let mut e = Matrix::new(2, 2);
    mprod(&a, &a, &mut e).unwrap();
    assert_eq!(e, squared);
    assert_eq!(matmul(&a, &a).unwrap(), squared);

    // y = A * x
    let x = Matrix::<B>::column(&[2.0, 1.0]);
    let y = Matrix::<B>::column(&[1.0, -2.0]);
    assert_eq!(&a * &x, y);
    let mut e = Matrix::vector(2);
    mprod(&a, &x, &mut e).unwrap();
    assert_eq!(e, y);

    // Result storage is always fresh.
    let c = &a * &a;
    assert_ne!(c.as_slice().as_ptr(), a.as_slice().as_ptr());

    assert!(matmul(&x, &a).is_err());
    assert!(panics(|| &x * &a));
}

fn multiplication_transposed<B: Backend>() {
    // Circulant shift operator; orthogonal, so C^T * C == C * C^T == I.
    let mut c = Matrix::<B>::zeros(3, 3);
    c[1][0] = 1.0;
    c[2][1] = 1.0;
    c[0][2] = 1.0;
    let identity = Matrix::<B>::from_fn(3, 3, |i, j| if i == j { 1.0 } else { 0.0 });

    let mut d = Matrix::new(3, 3);
    mprod_t(true, false, 1.0, &c, &c, &mut d).unwrap();
    assert_eq!(d, identity);

    let mut d = Matrix::new(3, 3);
    mprod_t(false, true, 1.0, &c, &c, &mut d).unwrap();
    assert_eq!(d, identity);

    let mut d = Matrix::new(3, 3);
    mprod_t(Transpose::No, Transpose::Yes, 2.0, &c, &c, &mut d).unwrap();
    assert_eq!(d, 2.0 * identity.clone());

    // C * C is another permutation, not the identity.
    let mut d = Matrix::new(3, 3);
    mprod_t(false, false, 1.0, &c, &c, &mut d).unwrap();
    assert_ne!(d, identity);
    assert_eq!(d, &c * &c);
}

fn multiplication_left_cols_only<B: Backend>() {
    let a = rot::<B>();
    let x = Matrix::<B>::column(&[2.0, 1.0]);
    #[rustfmt::skip]
    let expected = Matrix::<B>::from_rows(&[
        [ 1.0, -3.0],
        [-2.0,  5.0],
    ]);

    // Zero the left-most column, then recompute it as `a * x`.
    let mut e = expected.clone();
    e[0][0] = 0.0;
    e[1][0] = 0.0;
    mprod_ld(&a, &x, &mut e, 2).unwrap();
    assert_eq!(e, expected);

    assert!(mprod_ld(&a, &x, &mut e, 3).is_err());
    assert_eq!(e, expected);
}

fn zero_sized_operands<B: Backend>() {
    let c = &Matrix::<B>::new(0, 3) * &Matrix::<B>::new(3, 2);
    assert_eq!(c.shape(), Shape::new(0, 2));

    // An empty inner dimension yields zeros, whatever `c` held before.
    let (a, b) = (Matrix::<B>::new(3, 0), Matrix::<B>::new(0, 2));
    let mut c = Matrix::<B>::filled(3, 2, f64::NAN);
    mprod(&a, &b, &mut c).unwrap();
    assert_eq!(c, Matrix::zeros(3, 2));
    assert_eq!(&a * &b, Matrix::zeros(3, 2));

    let mut c = Matrix::<B>::filled(3, 4, f64::NAN);
    mprod_ld(&a, &b, &mut c, 4).unwrap();
    for row in c.row_iter() {
        assert_eq!((row[0], row[1]), (0.0, 0.0));
        assert!(row[2].is_nan() && row[3].is_nan());
    }

    let mut c = Matrix::<B>::new(0, 2);
    mprod_t(true, false, 1.0, &Matrix::new(3, 0), &Matrix::new(3, 2), &mut c).unwrap();
    let mut c = Matrix::<B>::filled(2, 3, f64::NAN);
    mprod_t(true, true, 2.0, &Matrix::new(0, 2), &Matrix::new(3, 0), &mut c).unwrap();
    assert_eq!(c, Matrix::zeros(2, 3));

    let mut a = Matrix::<B>::new(0, 2);
    mger(1.0, &Matrix::new(0, 1), &Matrix::column(&[1.0, 2.0]), &mut a).unwrap();
    let mut a = Matrix::<B>::new(2, 0);
    mger(1.0, &Matrix::column(&[1.0, 2.0]), &Matrix::new(0, 1), &mut a).unwrap();

    let x = Matrix::<B>::new(0, 4);
    let mut y = Matrix::<B>::new(0, 4);
    hprod(&x, &x, &mut y).unwrap();
    y.hprod_assign(&x).unwrap();
    assert_eq!(dot(&x, &x).unwrap(), 0.0);
    assert_eq!(norm(&x), 0.0);
    assert_eq!(norm(&Matrix::<B>::empty()), 0.0);
    assert_eq!(transpose(&x).shape(), Shape::new(4, 0));
}

fn hadamard<B: Backend>() {
    let a = rot::<B>();
    let squares = Matrix::<B>::from_fn(2, 2, |i, j| a[i][j] * a[i][j]);

    let mut d = Matrix::new(2, 2);
    hprod(&a, &a, &mut d).unwrap();
    assert_eq!(d, squares);

    let mut d = a.clone();
    d.hprod_assign(&a).unwrap();
    assert_eq!(d, squares);

    assert!(d.hprod_assign(&Matrix::zeros(4, 1)).is_err());
    assert_eq!(d, squares);
}

fn maxpy_accumulates<B: Backend>() {
    let a = rot::<B>();
    let mut b = Matrix::<B>::filled(2, 2, 1.0);
    maxpy(2.0, &a, &mut b).unwrap();
    assert_eq!(b, Matrix::from_rows(&[[1.0, 3.0], [-1.0, 1.0]]));

    assert!(maxpy(1.0, &a, &mut Matrix::zeros(4, 1)).is_err());

    // Stride 0 adds the same value everywhere.
    let mut b = a.clone();
    maxpy_raw(0.5, &[2.0], 0, &mut b).unwrap();
    assert_eq!(b, Matrix::from_rows(&[[1.0, 2.0], [0.0, 1.0]]));

    let mut b = Matrix::<B>::zeros(2, 2);
    maxpy_raw(1.0, a.as_slice(), 1, &mut b).unwrap();
    assert_eq!(b, a);
    assert!(maxpy_raw(1.0, &[1.0; 3], 1, &mut b).is_err());
}

fn mger_rank_one<B: Backend>() {
    let x = Matrix::<B>::column(&[1.0, 2.0]);
    let y = Matrix::<B>::column(&[2.0, 3.0]);
    let mut a = rot::<B>();
    mger(1.0, &x, &y, &mut a).unwrap();
    assert_eq!(a, Matrix::from_rows(&[[2.0, 4.0], [3.0, 6.0]]));

    let mut a = Matrix::<B>::zeros(2, 2);
    mger(-1.0, &x, &y, &mut a).unwrap();
    assert_eq!(a, Matrix::from_rows(&[[-2.0, -3.0], [-4.0, -6.0]]));

    assert!(mger(1.0, &x, &y, &mut Matrix::zeros(4, 1)).is_err());
}

fn mcopy_copies<B: Backend>() {
    let a = rot::<B>();
    let mut b = Matrix::<B>::zeros(2, 2);
    mcopy(&a, &mut b).unwrap();
    assert_eq!(a, b);
    assert_ne!(a.as_slice().as_ptr(), b.as_slice().as_ptr());

    assert!(mcopy(&a, &mut Matrix::zeros(4, 1)).is_err());

    mcopy_raw(&[7.0], 0, &mut b).unwrap();
    assert_eq!(b, Matrix::filled(2, 2, 7.0));
    assert!(mcopy_raw(&[], 0, &mut b).is_err());
}

fn reductions<B: Backend>() {
    let x = Matrix::<B>::column(&[1.0, 1.0]);
    let y = Matrix::<B>::column(&[1.0, -1.0]);
    assert_eq!(dot(&x, &y).unwrap(), 0.0);
    assert_eq!(dot(&x, &x).unwrap(), 2.0);
    assert!(dot(&x, &rot()).is_err());

    assert_eq!(norm(&Matrix::<B>::column(&[-3.0, 4.0])), 5.0);
    assert_eq!(norm(&rot::<B>()), 2.0f64.sqrt());
}

fn transpose_swaps_indices<B: Backend>() {
    let (m, n) = (10, 5);
    let x = Matrix::<B>::from_fn(m, n, |i, j| (i * n + j) as f64);
    let y = transpose(&x);
    assert_eq!(y.shape(), Shape::new(n, m));
    for i in 0..m {
        for j in 0..n {
            assert_eq!(x[i][j], y[j][i]);
        }
    }
    assert_eq!(y.transpose(), x);
}

fn tanh_in_place<B: Backend>() {
    let mut a = Matrix::<B>::from_rows(&[[0.0, 1.0, -1.0, 20.0]]);
    tanh(&mut a);
    let expected = Matrix::from_rows(&[[0.0, 1.0f64.tanh(), (-1.0f64).tanh(), 1.0]]);
    assert_relative_eq!(a, expected);
}

fn vector_index<B: Backend>() {
    let mut x = Matrix::<B>::vector(2);
    assert_eq!(x.shape(), Shape::new(2, 1));
    *x[0] = 2.0;
    *x[1] = 1.0;
    assert_eq!(*x[0], 2.0);
    assert_eq!(x[1][0], 1.0);
    assert_eq!(x, Matrix::column(&[2.0, 1.0]));

    assert!(panics(|| *x[2]));
    assert!(panics(|| *rot::<B>()[0]));
    assert!(panics(|| Matrix::<B>::empty()[0][0]));
}

fn fill_all<B: Backend>() {
    let alpha = 3.14;
    let mut x = Matrix::<B>::new(100, 20);
    x.fill(alpha);
    assert_eq!(numel(&x), 2000);
    assert!(x.as_slice().iter().all(|&e| e == alpha));
}

fn serialization<B: Backend>() {
    let a = Matrix::<B>::from_fn(3, 4, |i, j| (i as f64 + 1.0) / (j as f64 + 3.0));
    let mut buf = Vec::new();
    a.write_to(&mut buf).unwrap();
    assert_eq!(buf.len(), 16 + 12 * 8);

    let b = Matrix::<B>::read_from(&buf[..]).unwrap();
    assert_eq!(a, b);

    // Deserializing into an existing matrix replaces its shape and contents.
    let mut c = Matrix::<B>::zeros(1, 7);
    c.read_into(&buf[..]).unwrap();
    assert_eq!(c, a);
}

fn random_shape<B: Backend>() {
    let a = Matrix::<B>::randn(5, 3);
    let b = Matrix::<B>::randn(5, 3);
    assert_eq!(a.shape(), Shape::new(5, 3));
    assert!(a.as_slice().iter().all(|e| e.is_finite()));
    // Consecutive draws continue the sequence instead of restarting it.
    assert_ne!(a, b);
}

#[cfg(feature = "ndarray")]
#[test]
fn backends_agree() {
    densemat::init_logger!();

    let a = Matrix::<Reference>::randn(37, 23);
    let b = Matrix::<Reference>::randn(23, 41);
    let expected = &a * &b;

    let nd = |m: &Matrix<Reference>| {
        Matrix::<Ndarray>::from_vec(m.rows(), m.cols(), m.to_vec()).unwrap()
    };
    let actual = &nd(&a) * &nd(&b);
    let actual = Matrix::<Reference>::from_vec(actual.rows(), actual.cols(), actual.to_vec())
        .unwrap();

    assert_relative_eq!(expected, actual, epsilon = 1e-12, max_relative = 1e-12);
    assert_relative_eq!(
        norm(&a),
        norm(&nd(&a)),
        epsilon = 1e-12,
        max_relative = 1e-12
    );
}
