//! Coordinate-descent Lasso solver.
//!
//! Minimizes `0.5 * ||y - X b||^2 + lambda * ||b||_1` by cycling over the
//! columns of `X` and replacing one coefficient at a time with its
//! closed-form soft-thresholded optimum. The design matrix is expected to be
//! standardized per column: the penalty is not scale-invariant.

use log::{debug, warn};
use nalgebra::{DMatrix, DVector};

use crate::check;
use crate::error::{LassoError, Result};

/// What to do with a design column whose squared norm is zero.
///
/// The coordinate update divides by `||x_j||^2`, so such a column has no
/// well-defined coefficient. The guard is on the norm, not the variance: a
/// constant non-zero column is a valid (if uninformative) regressor and is
/// fitted normally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroColumnPolicy {
    /// Fail with [`LassoError::DegenerateColumn`].
    #[default]
    Reject,
    /// Pin the coefficient to exactly zero and keep going.
    Exclude,
}

/// Coordinate-descent settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Maximum number of full sweeps over the columns.
    pub max_iter: usize,
    /// Stop once the largest coefficient change in a sweep is below this.
    pub tol: f64,
    /// Handling of zero-norm columns.
    pub zero_columns: ZeroColumnPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            max_iter: 1000,
            tol: 1e-5,
            zero_columns: ZeroColumnPolicy::Reject,
        }
    }
}

impl Settings {
    /// Set the sweep limit.
    pub fn max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set the convergence tolerance.
    pub fn tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the zero-norm column policy.
    pub fn zero_columns(mut self, policy: ZeroColumnPolicy) -> Self {
        self.zero_columns = policy;
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_iter == 0 {
            return Err(LassoError::InvalidParameter(
                "max_iter must be positive".into(),
            ));
        }
        if !self.tol.is_finite() || self.tol <= 0.0 {
            return Err(LassoError::InvalidParameter(format!(
                "tol must be finite and positive, got {}",
                self.tol
            )));
        }
        Ok(())
    }
}

/// Result of a coordinate-descent run.
#[derive(Debug, Clone)]
pub struct LassoFit {
    /// One coefficient per design column, in column order.
    pub coefficients: DVector<f64>,
    /// Number of sweeps performed.
    pub iterations: usize,
    /// Whether the last sweep changed no coefficient by `tol` or more.
    pub converged: bool,
    /// Largest coefficient change in the last sweep.
    pub max_change: f64,
}

impl LassoFit {
    /// Indices of the non-zero coefficients, ascending.
    pub fn support(&self) -> Vec<usize> {
        self.coefficients
            .iter()
            .enumerate()
            .filter(|(_, b)| **b != 0.0)
            .map(|(j, _)| j)
            .collect()
    }

    /// Number of non-zero coefficients.
    pub fn nnz(&self) -> usize {
        self.coefficients.iter().filter(|b| **b != 0.0).count()
    }
}

/// Soft-threshold operator, the proximal map of `lambda * |.|`.
///
/// Returns `rho - lambda` above the band, `rho + lambda` below it and zero
/// inside `[-lambda, lambda]`.
pub fn soft_threshold(rho: f64, lambda: f64) -> f64 {
    if rho > lambda {
        rho - lambda
    } else if rho < -lambda {
        rho + lambda
    } else {
        0.0
    }
}

/// Fit Lasso coefficients with default settings.
pub fn solve(x: &DMatrix<f64>, y: &DVector<f64>, lambda: f64) -> Result<DVector<f64>> {
    solve_with(x, y, lambda, &Settings::default()).map(|fit| fit.coefficients)
}

/// Fit Lasso coefficients by cyclic coordinate descent.
///
/// Coefficients start at zero. Each sweep visits columns `0..N` in order and
/// sets `b_j = S(x_j . r_j, lambda) / ||x_j||^2`, where `r_j` is the residual
/// with column `j`'s own contribution added back. Running out of sweeps is not
/// an error; check [`LassoFit::converged`].
///
/// # Errors
///
/// - `DimensionMismatch` if `x` and `y` disagree on the number of rows.
/// - `InvalidParameter` for a negative or non-finite `lambda`, bad settings,
///   or non-finite data.
/// - `DegenerateColumn` for a zero-norm column under [`ZeroColumnPolicy::Reject`].
pub fn solve_with(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    lambda: f64,
    settings: &Settings,
) -> Result<LassoFit> {
    check::problem(x, y, lambda)?;
    settings.validate()?;

    let norms = column_norms(x, settings.zero_columns)?;
    let n = x.ncols();

    // The only mutable state: coefficients and the running residual y - X b.
    let mut beta = DVector::<f64>::zeros(n);
    let mut residual = y.clone_owned();

    let mut iterations = 0;
    let mut max_change = 0.0;
    let mut converged = n == 0;

    while !converged && iterations < settings.max_iter {
        max_change = 0.0_f64;
        for (j, norm_sq) in norms.iter().enumerate() {
            let Some(norm_sq) = *norm_sq else { continue };
            let col = x.column(j);
            let old = beta[j];

            let rho = col.dot(&residual) + old * norm_sq;
            let new = soft_threshold(rho, lambda) / norm_sq;
            let delta = new - old;

            if delta != 0.0 {
                residual.axpy(-delta, &col, 1.0);
                beta[j] = new;
            }
            max_change = max_change.max(delta.abs());
        }
        iterations += 1;
        converged = max_change < settings.tol;
    }

    if converged {
        debug!(
            "lasso lambda={:.3e} converged after {} sweeps (max change {:.3e})",
            lambda, iterations, max_change
        );
    } else {
        warn!(
            "lasso lambda={:.3e} stopped at max_iter={} with max change {:.3e} >= tol {:.1e}",
            lambda, settings.max_iter, max_change, settings.tol
        );
    }

    Ok(LassoFit {
        coefficients: beta,
        iterations,
        converged,
        max_change,
    })
}

/// Lasso objective `0.5 * ||y - X b||^2 + lambda * ||b||_1`.
pub fn objective(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    beta: &DVector<f64>,
    lambda: f64,
) -> Result<f64> {
    check::same_rows(x, y)?;
    if beta.len() != x.ncols() {
        return Err(LassoError::length_mismatch(x.ncols(), beta.len()));
    }
    let residual = y - x * beta;
    Ok(0.5 * residual.norm_squared() + lambda * beta.lp_norm(1))
}

/// Smallest penalty at which the all-zero vector is optimal: `max_j |x_j . y|`.
pub fn lambda_max(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<f64> {
    check::same_rows(x, y)?;
    Ok(x.column_iter()
        .map(|col| col.dot(y).abs())
        .fold(0.0, f64::max))
}

/// Squared column norms; `None` marks a column excluded by policy.
fn column_norms(x: &DMatrix<f64>, policy: ZeroColumnPolicy) -> Result<Vec<Option<f64>>> {
    x.column_iter()
        .enumerate()
        .map(|(j, col)| {
            let norm_sq = col.norm_squared();
            if !norm_sq.is_finite() {
                return Err(LassoError::InvalidParameter(format!(
                    "squared norm of column {} overflows",
                    j
                )));
            }
            if norm_sq > 0.0 {
                return Ok(Some(norm_sq));
            }
            match policy {
                ZeroColumnPolicy::Reject => Err(LassoError::DegenerateColumn { column: j }),
                ZeroColumnPolicy::Exclude => {
                    warn!("column {} has zero norm; coefficient pinned to 0", j);
                    Ok(None)
                }
            }
        })
        .collect()
}
