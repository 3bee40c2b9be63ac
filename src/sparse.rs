//! Sparse matrix utilities.
//!
//! Helpers for building the nalgebra-sparse operators handed to Clarabel.

use nalgebra_sparse::{CooMatrix, CscMatrix};

/// Assemble an `nrows x ncols` CSC matrix from `(row, col, value)` entries.
///
/// Repeated positions are summed; explicit zeros are not stored.
pub fn csc_from_entries(
    nrows: usize,
    ncols: usize,
    entries: impl IntoIterator<Item = (usize, usize, f64)>,
) -> CscMatrix<f64> {
    let mut coo = CooMatrix::new(nrows, ncols);
    for (row, col, val) in entries {
        debug_assert!(row < nrows && col < ncols, "entry ({}, {}) out of range", row, col);
        if val != 0.0 {
            coo.push(row, col, val);
        }
    }
    CscMatrix::from(&coo)
}

/// `scale * I` as an `n x n` CSC matrix.
pub fn csc_scaled_identity(n: usize, scale: f64) -> CscMatrix<f64> {
    csc_from_entries(n, n, (0..n).map(|i| (i, i, scale)))
}
