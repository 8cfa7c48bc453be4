// Sparse CSR operator and block assembly

use crate::core::traits::MatShape;
use crate::error::PararealError;
use faer::Mat;

/// A compressed-sparse-row matrix of `f64` values.
///
/// Construction validates the structure, so every `CsrMatrix` in circulation
/// has monotone row pointers and in-range column indices.
#[derive(Clone, Debug, PartialEq)]
pub struct CsrMatrix {
    nrows: usize,
    ncols: usize,
    row_ptr: Vec<usize>,
    col_idx: Vec<usize>,
    values: Vec<f64>,
}

impl CsrMatrix {
    /// Build a CSR from raw row‐ptr, col‐idx, and values.
    pub fn from_csr(
        nrows: usize,
        ncols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<f64>,
    ) -> Result<Self, PararealError> {
        if row_ptr.len() != nrows + 1 {
            return Err(PararealError::InvalidCsr(format!(
                "row_ptr has length {}, expected {}",
                row_ptr.len(),
                nrows + 1
            )));
        }
        if row_ptr[0] != 0 || row_ptr.windows(2).any(|w| w[0] > w[1]) {
            return Err(PararealError::InvalidCsr(
                "row_ptr must start at 0 and be non-decreasing".into(),
            ));
        }
        let nnz = row_ptr[nrows];
        if col_idx.len() != nnz || values.len() != nnz {
            return Err(PararealError::InvalidCsr(format!(
                "expected {} entries, got {} column indices and {} values",
                nnz,
                col_idx.len(),
                values.len()
            )));
        }
        if let Some(&j) = col_idx.iter().find(|&&j| j >= ncols) {
            return Err(PararealError::InvalidCsr(format!(
                "column index {j} out of range for {ncols} columns"
            )));
        }
        Ok(Self { nrows, ncols, row_ptr, col_idx, values })
    }

    /// Diagonal matrix with the given entries.
    pub fn from_diagonal(diag: &[f64]) -> Self {
        let n = diag.len();
        Self {
            nrows: n,
            ncols: n,
            row_ptr: (0..=n).collect(),
            col_idx: (0..n).collect(),
            values: diag.to_vec(),
        }
    }

    /// n×n identity.
    pub fn identity(n: usize) -> Self {
        Self::from_diagonal(&vec![1.0; n])
    }

    /// Banded matrix from `(offset, value)` pairs, e.g. `[(-1, 1.0), (0, -2.0), (1, 1.0)]`
    /// for the standard second-difference stencil.
    pub fn from_bands(n: usize, bands: &[(isize, f64)]) -> Self {
        let mut builder = TripletBuilder::new(n, n);
        for i in 0..n {
            for &(offset, v) in bands {
                let j = i as isize + offset;
                if j >= 0 && (j as usize) < n {
                    builder.push(i, j as usize, v);
                }
            }
        }
        builder.build()
    }

    /// Dense matrix to CSR, dropping exact zeros.
    pub fn from_dense(a: &Mat<f64>) -> Self {
        let mut builder = TripletBuilder::new(a.nrows(), a.ncols());
        builder.push_block(0, 0, a);
        builder.build()
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Compute y = A * x, checking dimensions.
    pub fn spmv(&self, x: &[f64], y: &mut [f64]) -> Result<(), PararealError> {
        PararealError::check_dim(self.ncols, x.len())?;
        PararealError::check_dim(self.nrows, y.len())?;
        for (i, yi) in y.iter_mut().enumerate() {
            *yi = self.row_dot(i, x);
        }
        Ok(())
    }

    fn row_dot(&self, i: usize, x: &[f64]) -> f64 {
        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        self.col_idx[range.clone()]
            .iter()
            .zip(&self.values[range])
            .map(|(&j, &v)| v * x[j])
            .sum()
    }

    /// Densify into a faer matrix.
    pub fn to_dense(&self) -> Mat<f64> {
        let mut dense = Mat::<f64>::zeros(self.nrows, self.ncols);
        for i in 0..self.nrows {
            for k in self.row_ptr[i]..self.row_ptr[i + 1] {
                dense[(i, self.col_idx[k])] += self.values[k];
            }
        }
        dense
    }
}

impl MatShape for CsrMatrix {
    fn nrows(&self) -> usize {
        self.nrows
    }
    fn ncols(&self) -> usize {
        self.ncols
    }
}

/// Accumulates (row, col, value) triplets and compresses them into CSR.
///
/// Duplicate entries are summed. Used to assemble the global block operators
/// of the time mesh from per-slice propagation matrices.
#[derive(Debug)]
pub struct TripletBuilder {
    nrows: usize,
    ncols: usize,
    entries: Vec<(usize, usize, f64)>,
}

impl TripletBuilder {
    pub fn new(nrows: usize, ncols: usize) -> Self {
        Self { nrows, ncols, entries: Vec::new() }
    }

    pub fn push(&mut self, i: usize, j: usize, v: f64) {
        assert!(i < self.nrows && j < self.ncols, "triplet ({i}, {j}) out of bounds");
        self.entries.push((i, j, v));
    }

    /// Add the nonzeros of a dense block with its top-left corner at (row0, col0).
    pub fn push_block(&mut self, row0: usize, col0: usize, block: &Mat<f64>) {
        self.push_block_scaled(row0, col0, block, 1.0);
    }

    /// Add `scale * block` with its top-left corner at (row0, col0).
    pub fn push_block_scaled(&mut self, row0: usize, col0: usize, block: &Mat<f64>, scale: f64) {
        for i in 0..block.nrows() {
            for j in 0..block.ncols() {
                let v = block[(i, j)];
                if v != 0.0 {
                    self.push(row0 + i, col0 + j, scale * v);
                }
            }
        }
    }

    /// Add `scale * I` of size `n` at (row0, col0).
    pub fn push_identity(&mut self, row0: usize, col0: usize, n: usize, scale: f64) {
        for k in 0..n {
            self.push(row0 + k, col0 + k, scale);
        }
    }

    pub fn build(mut self) -> CsrMatrix {
        self.entries.sort_by(|a, b| (a.0, a.1).cmp(&(b.0, b.1)));
        let mut row_ptr = vec![0; self.nrows + 1];
        let mut col_idx: Vec<usize> = Vec::with_capacity(self.entries.len());
        let mut values: Vec<f64> = Vec::with_capacity(self.entries.len());
        let mut last: Option<(usize, usize)> = None;
        for (i, j, v) in self.entries {
            if last == Some((i, j)) {
                if let Some(tail) = values.last_mut() {
                    *tail += v;
                }
                continue;
            }
            col_idx.push(j);
            values.push(v);
            row_ptr[i + 1] += 1;
            last = Some((i, j));
        }
        for i in 0..self.nrows {
            row_ptr[i + 1] += row_ptr[i];
        }
        CsrMatrix {
            nrows: self.nrows,
            ncols: self.ncols,
            row_ptr,
            col_idx,
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_spmv() {
        // 3×3 identity in CSR: row_ptr=[0,1,2,3], col_idx=[0,1,2], vals=[1,1,1]
        let m = CsrMatrix::from_csr(3, 3, vec![0, 1, 2, 3], vec![0, 1, 2], vec![1.0, 1.0, 1.0]).unwrap();
        let x = vec![2.0, 3.0, 5.0];
        let mut y = vec![0.0; 3];
        m.spmv(&x, &mut y).unwrap();
        assert_eq!(y, x);
    }

    #[test]
    fn simple_pattern() {
        // 2×3 matrix [[1,2,0],[0,3,4]]
        let m = CsrMatrix::from_csr(
            2, 3,
            vec![0, 2, 4],
            vec![0, 1, 1, 2],
            vec![1.0, 2.0, 3.0, 4.0],
        )
        .unwrap();
        let x = vec![1.0, 1.0, 1.0];
        let mut y = vec![0.0; 2];
        m.spmv(&x, &mut y).unwrap();
        assert_eq!(y, vec![3.0, 7.0]);
        let d = m.to_dense();
        assert_eq!(d[(1, 2)], 4.0);
        assert_eq!(d[(1, 0)], 0.0);
    }

    #[test]
    fn rejects_bad_structure() {
        let err = CsrMatrix::from_csr(2, 2, vec![0, 1], vec![0], vec![1.0]).unwrap_err();
        assert!(matches!(err, PararealError::InvalidCsr(_)));
        let err = CsrMatrix::from_csr(1, 2, vec![0, 1], vec![5], vec![1.0]).unwrap_err();
        assert!(matches!(err, PararealError::InvalidCsr(_)));
    }

    #[test]
    fn spmv_dimension_mismatch() {
        let m = CsrMatrix::identity(3);
        let mut y = vec![0.0; 3];
        let err = m.spmv(&[1.0, 2.0], &mut y).unwrap_err();
        assert_eq!(err, PararealError::Dimension { expected: 3, found: 2 });
    }

    #[test]
    fn triplets_sum_duplicates() {
        let mut b = TripletBuilder::new(2, 2);
        b.push(1, 0, 1.5);
        b.push(0, 1, 2.0);
        b.push(1, 0, 0.5);
        let m = b.build();
        assert_eq!(m.nnz(), 2);
        let d = m.to_dense();
        assert_eq!(d[(1, 0)], 2.0);
        assert_eq!(d[(0, 1)], 2.0);
    }

    #[test]
    fn bands_match_dense() {
        let m = CsrMatrix::from_bands(4, &[(-1, 1.0), (0, -2.0), (1, 1.0)]);
        let d = m.to_dense();
        assert_eq!(d[(0, 0)], -2.0);
        assert_eq!(d[(2, 1)], 1.0);
        assert_eq!(d[(0, 3)], 0.0);
        assert_eq!(CsrMatrix::from_dense(&d), m);
    }
}
