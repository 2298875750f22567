use ndarray::{
    linalg::general_mat_mul, ArrayView1, ArrayView2, ArrayViewMut1, ArrayViewMut2, ShapeBuilder,
    Zip,
};

use super::{Backend, Operand, Reference, Transpose};

/// A backend forwarding to the [`ndarray`] crate.
///
/// Matrix products use `ndarray`'s GEMM (backed by `matrixmultiply`), which blocks and
/// vectorizes the computation. Its summation order differs from [`Reference`], so results are
/// numerically compatible but not necessarily bit-identical.
///
/// Strided copies and accumulations with a stride other than 1 use the [`Reference`] loops.
///
/// [`ndarray`]: https://docs.rs/ndarray
#[derive(Debug)]
pub enum Ndarray {}

fn view(op: Operand<'_>, trans: Transpose) -> ArrayView2<'_, f64> {
    let view = ArrayView2::from_shape((op.rows, op.cols), op.data)
        .expect("operand length must match its shape");
    match trans {
        Transpose::No => view,
        Transpose::Yes => view.reversed_axes(),
    }
}

impl Backend for Ndarray {
    const NAME: &'static str = "NDARRAY";

    fn copy(x: &[f64], incx: usize, y: &mut [f64]) {
        if incx != 1 {
            return Reference::copy(x, incx, y);
        }
        let len = y.len();
        ArrayViewMut1::from(y).assign(&ArrayView1::from(&x[..len]));
    }

    fn axpy(alpha: f64, x: &[f64], incx: usize, y: &mut [f64]) {
        if incx != 1 {
            return Reference::axpy(alpha, x, incx, y);
        }
        let len = y.len();
        ArrayViewMut1::from(y).scaled_add(alpha, &ArrayView1::from(&x[..len]));
    }

    fn ger(alpha: f64, x: &[f64], y: &[f64], a: &mut [f64]) {
        if a.is_empty() {
            return;
        }
        let mut a = ArrayViewMut2::from_shape((x.len(), y.len()), a)
            .expect("rank-one update target must be x.len() x y.len()");
        let y = ArrayView1::from(y);
        for (mut row, &xi) in a.rows_mut().into_iter().zip(x) {
            row.scaled_add(alpha * xi, &y);
        }
    }

    fn dot(x: &[f64], y: &[f64]) -> f64 {
        ArrayView1::from(x).dot(&ArrayView1::from(y))
    }

    fn hprod(x: &[f64], y: &[f64], out: &mut [f64]) {
        Zip::from(out)
            .and(x)
            .and(y)
            .for_each(|out, &x, &y| *out = x * y);
    }

    fn hprod_assign(x: &mut [f64], y: &[f64]) {
        Zip::from(x).and(y).for_each(|x, &y| *x *= y);
    }

    fn gemm(
        trans_a: Transpose,
        trans_b: Transpose,
        alpha: f64,
        a: Operand<'_>,
        b: Operand<'_>,
        c: &mut [f64],
        ldc: usize,
    ) {
        let a = view(a, trans_a);
        let b = view(b, trans_b);
        let (m, k, n) = (a.nrows(), a.ncols(), b.ncols());
        // `from_shape` rejects strided views with zero rows, so handle empty products here.
        if m == 0 || n == 0 {
            return;
        }
        if k == 0 {
            for row in c.chunks_mut(ldc).take(m) {
                row[..n].fill(0.0);
            }
            return;
        }
        let mut c = ArrayViewMut2::from_shape((m, n).strides((ldc, 1)), c)
            .expect("destination must hold `m` rows of stride `ldc`");
        general_mat_mul(alpha, &a, &b, 0.0, &mut c);
    }

    fn scal(alpha: f64, x: &mut [f64]) {
        ArrayViewMut1::from(x).mapv_inplace(|x| x * alpha);
    }

    fn nrm2(x: &[f64]) -> f64 {
        let x = ArrayView1::from(x);
        x.dot(&x).sqrt()
    }

    fn sub(x: &[f64], y: &[f64], out: &mut [f64]) {
        Zip::from(out)
            .and(x)
            .and(y)
            .for_each(|out, &x, &y| *out = x - y);
    }

    fn tanh(x: &mut [f64]) {
        ArrayViewMut1::from(x).mapv_inplace(f64::tanh);
    }
}
