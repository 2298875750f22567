use super::{Backend, Operand, Transpose};

/// The reference backend, implementing every primitive with plain loops.
///
/// This backend has no dependencies and is always available. It is the default backend of
/// [`Matrix`](crate::Matrix).
#[derive(Debug)]
pub enum Reference {}

impl Backend for Reference {
    const NAME: &'static str = "REF";

    fn copy(x: &[f64], incx: usize, y: &mut [f64]) {
        for (i, y) in y.iter_mut().enumerate() {
            *y = x[i * incx];
        }
    }

    fn axpy(alpha: f64, x: &[f64], incx: usize, y: &mut [f64]) {
        for (i, y) in y.iter_mut().enumerate() {
            *y += alpha * x[i * incx];
        }
    }

    fn ger(alpha: f64, x: &[f64], y: &[f64], a: &mut [f64]) {
        let n = y.len();
        for (i, &xi) in x.iter().enumerate() {
            let row = &mut a[i * n..(i + 1) * n];
            for (aij, &yj) in row.iter_mut().zip(y) {
                *aij += alpha * xi * yj;
            }
        }
    }

    fn dot(x: &[f64], y: &[f64]) -> f64 {
        x.iter().zip(y).fold(0.0, |acc, (x, y)| acc + x * y)
    }

    fn hprod(x: &[f64], y: &[f64], out: &mut [f64]) {
        for ((out, x), y) in out.iter_mut().zip(x).zip(y) {
            *out = x * y;
        }
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
        let (m, k) = trans_a.apply(a.rows, a.cols);
        let (_, n) = trans_b.apply(b.rows, b.cols);
        for i in 0..m {
            for j in 0..n {
                let mut acc = 0.0;
                for p in 0..k {
                    acc += a.at(trans_a, i, p) * b.at(trans_b, p, j);
                }
                c[i * ldc + j] = alpha * acc;
            }
        }
    }

    fn scal(alpha: f64, x: &mut [f64]) {
        for x in x {
            *x *= alpha;
        }
    }

    fn nrm2(x: &[f64]) -> f64 {
        Self::dot(x, x).sqrt()
    }

    fn sub(x: &[f64], y: &[f64], out: &mut [f64]) {
        for ((out, x), y) in out.iter_mut().zip(x).zip(y) {
            *out = x - y;
        }
    }

    fn tanh(x: &mut [f64]) {
        for x in x {
            *x = x.tanh();
        }
    }
}
