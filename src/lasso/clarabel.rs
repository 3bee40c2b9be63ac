//! Exact Lasso through the Clarabel interior-point solver.
//!
//! Splitting `b = u - v` with `u, v >= 0` turns
//! `0.5 * ||y - X b||^2 + lambda * ||b||_1` into the QP
//!
//! ```text
//! minimize    0.5 z' P z + q' z
//! subject to  z >= 0
//! ```
//!
//! with `z = [u; v]`, `P = [[G, -G], [-G, G]]`, `G = X'X` and
//! `q = [lambda - X'y; lambda + X'y]`. The constant `0.5 * ||y||^2` is dropped.

use clarabel::algebra::CscMatrix as ClarabelCsc;
use clarabel::solver::{
    DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT,
};
use log::debug;
use nalgebra::{DMatrix, DVector};
use nalgebra_sparse::CscMatrix;

use crate::check;
use crate::error::{LassoError, Result};
use crate::sparse::{csc_from_entries, csc_scaled_identity};

/// Reference solver settings.
#[derive(Debug, Clone)]
pub struct QpSettings {
    /// Print solver output.
    pub verbose: bool,
    /// Maximum interior-point iterations.
    pub max_iter: u32,
    /// Time limit in seconds.
    pub time_limit: f64,
    /// Absolute duality-gap tolerance.
    pub tol_gap_abs: f64,
    /// Relative duality-gap tolerance.
    pub tol_gap_rel: f64,
}

impl Default for QpSettings {
    fn default() -> Self {
        QpSettings {
            verbose: false,
            max_iter: 200,
            time_limit: f64::INFINITY,
            tol_gap_abs: 1e-10,
            tol_gap_rel: 1e-10,
        }
    }
}

/// Solve the Lasso problem with default reference settings.
pub fn solve_qp(x: &DMatrix<f64>, y: &DVector<f64>, lambda: f64) -> Result<DVector<f64>> {
    solve_qp_with(x, y, lambda, &QpSettings::default())
}

/// Solve the Lasso problem exactly as a QP.
///
/// Same preconditions as [`solve`](super::solve). Zero-norm columns need no
/// special handling here: the penalty alone drives their coefficient to zero.
///
/// # Errors
///
/// `SolverError` when Clarabel stops with any status other than solved.
pub fn solve_qp_with(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    lambda: f64,
    settings: &QpSettings,
) -> Result<DVector<f64>> {
    check::problem(x, y, lambda)?;
    let n = x.ncols();
    if n == 0 {
        return Ok(DVector::zeros(0));
    }

    let gram = x.transpose() * x;
    let xty = x.transpose() * y;

    let p = to_clarabel_csc(split_hessian(&gram));
    let q: Vec<f64> = (0..2 * n)
        .map(|k| if k < n { lambda - xty[k] } else { lambda + xty[k - n] })
        .collect();
    // -z + s = 0 with s in the nonnegative cone.
    let a = to_clarabel_csc(csc_scaled_identity(2 * n, -1.0));
    let b = vec![0.0; 2 * n];
    let cones = [SupportedConeT::NonnegativeConeT(2 * n)];

    let clarabel_settings = DefaultSettingsBuilder::default()
        .verbose(settings.verbose)
        .max_iter(settings.max_iter)
        .time_limit(settings.time_limit)
        .tol_gap_abs(settings.tol_gap_abs)
        .tol_gap_rel(settings.tol_gap_rel)
        .build()
        .map_err(|e| LassoError::SolverError(format!("invalid settings: {:?}", e)))?;

    let mut solver = DefaultSolver::new(&p, &q, &a, &b, &cones, clarabel_settings);
    solver.solve();

    if !matches!(solver.solution.status, SolverStatus::Solved) {
        return Err(LassoError::SolverError(format!(
            "clarabel finished with status {:?}",
            solver.solution.status
        )));
    }
    debug!(
        "clarabel lasso lambda={:.3e} solved in {} iterations",
        lambda, solver.info.iterations
    );

    let z = &solver.solution.x;
    Ok(DVector::from_fn(n, |j, _| z[j] - z[n + j]))
}

/// Upper triangle of `[[G, -G], [-G, G]]`.
fn split_hessian(gram: &DMatrix<f64>) -> CscMatrix<f64> {
    let n = gram.nrows();
    let entries = (0..n).flat_map(move |j| {
        (0..n).flat_map(move |i| {
            let g = gram[(i, j)];
            // The -G block is entirely above the diagonal; the two G blocks
            // contribute only their own upper triangles.
            let diagonal_blocks = (i <= j).then_some([(i, j, g), (n + i, n + j, g)]);
            std::iter::once((i, n + j, -g)).chain(diagonal_blocks.into_iter().flatten())
        })
    });
    csc_from_entries(2 * n, 2 * n, entries)
}

/// Hand a nalgebra-sparse CSC matrix over to Clarabel without copying.
fn to_clarabel_csc(m: CscMatrix<f64>) -> ClarabelCsc<f64> {
    let (nrows, ncols) = (m.nrows(), m.ncols());
    let (col_offsets, row_indices, values) = m.disassemble();
    ClarabelCsc::new(nrows, ncols, col_offsets, row_indices, values)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = QpSettings::default();
        assert!(!settings.verbose);
        assert_eq!(settings.max_iter, 200);
    }

    #[test]
    fn test_split_hessian_is_upper_triangular() {
        let gram = DMatrix::from_row_slice(2, 2, &[2.0, 0.5, 0.5, 1.0]);
        let p = split_hessian(&gram);
        assert!(p.triplet_iter().all(|(r, c, _)| r <= c));
        let mut dense = DMatrix::zeros(4, 4);
        for (r, c, v) in p.triplet_iter() {
            dense[(r, c)] = *v;
        }
        assert_eq!(dense[(0, 1)], 0.5);
        assert_eq!(dense[(2, 3)], 0.5);
        assert_eq!(dense[(0, 3)], -0.5);
        assert_eq!(dense[(1, 2)], -0.5);
        assert_eq!(dense[(1, 3)], -1.0);
        assert_eq!(dense[(3, 3)], 1.0);
    }

    #[test]
    fn test_single_column_matches_closed_form() {
        let x = DMatrix::from_column_slice(4, 1, &[1.0, 2.0, -1.0, 0.5]);
        let y = DVector::from_vec(vec![2.0, 3.0, -1.0, 1.0]);
        let beta = solve_qp(&x, &y, 0.5).unwrap();
        let expected = (9.5 - 0.5) / 6.25;
        assert!(
            (beta[0] - expected).abs() < 1e-6,
            "Expected {}, got {}",
            expected,
            beta[0]
        );
    }
}
