//! Dense helpers on top of Faer.
//!
//! Block extraction and integer powers used by the propagator update matrices
//! and by the matrix form of the Parareal iteration.

use faer::Mat;

/// Copy the `nrows × ncols` block whose top-left corner is (row0, col0).
pub fn extract_block(a: &Mat<f64>, row0: usize, col0: usize, nrows: usize, ncols: usize) -> Mat<f64> {
    Mat::from_fn(nrows, ncols, |i, j| a[(row0 + i, col0 + j)])
}

/// `a^n` by repeated multiplication; `a^0` is the identity.
pub fn mat_pow(a: &Mat<f64>, n: usize) -> Mat<f64> {
    assert_eq!(a.nrows(), a.ncols(), "matrix power needs a square matrix");
    let mut result = Mat::<f64>::identity(a.nrows(), a.ncols());
    for _ in 0..n {
        result = a * &result;
    }
    result
}

/// Sum `a[i,j] + alpha * b[i,j]`.
pub fn add_scaled(a: &Mat<f64>, alpha: f64, b: &Mat<f64>) -> Mat<f64> {
    assert_eq!((a.nrows(), a.ncols()), (b.nrows(), b.ncols()));
    Mat::from_fn(a.nrows(), a.ncols(), |i, j| a[(i, j)] + alpha * b[(i, j)])
}

/// True if every entry is finite.
pub fn all_finite(a: &Mat<f64>) -> bool {
    (0..a.ncols()).all(|j| (0..a.nrows()).all(|i| a[(i, j)].is_finite()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn power_of_diagonal() {
        let a = Mat::from_fn(2, 2, |i, j| if i == j { (i + 2) as f64 } else { 0.0 });
        let p = mat_pow(&a, 3);
        assert_eq!(p[(0, 0)], 8.0);
        assert_eq!(p[(1, 1)], 27.0);
        assert_eq!(p[(0, 1)], 0.0);
        assert_eq!(mat_pow(&a, 0)[(1, 1)], 1.0);
    }

    #[test]
    fn block_and_norms() {
        let a = Mat::from_fn(3, 3, |i, j| (i * 3 + j) as f64 - 4.0);
        let b = extract_block(&a, 1, 1, 2, 2);
        assert_eq!(b[(0, 0)], 0.0);
        assert_eq!(b[(1, 1)], 4.0);
        assert!(all_finite(&a));
        let c = add_scaled(&a, -1.0, &a);
        assert!((0..3).all(|i| (0..3).all(|j| c[(i, j)] == 0.0)));
        let mut d = a.clone();
        d[(2, 0)] = f64::NAN;
        assert!(!all_finite(&d));
    }
}
