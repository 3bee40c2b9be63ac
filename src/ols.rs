//! Ordinary least squares refit and prediction.

use nalgebra::{DMatrix, DVector};

use crate::check;
use crate::error::{LassoError, Result};

/// Squared pivot ratio of the Cholesky factor of the unit-diagonal Gram
/// matrix below which the normal equations are treated as singular.
const MIN_RCOND: f64 = 1e-12;

/// Fitted values and residuals of a linear predictor.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    /// `X * betas`.
    pub prediction: DVector<f64>,
    /// `y - prediction`.
    pub residuals: DVector<f64>,
}

impl Prediction {
    /// Mean squared residual; zero when there are no rows.
    pub fn mse(&self) -> f64 {
        if self.residuals.is_empty() {
            return 0.0;
        }
        self.residuals.norm_squared() / self.residuals.len() as f64
    }

    /// Split into `(prediction, residuals)`.
    pub fn into_parts(self) -> (DVector<f64>, DVector<f64>) {
        (self.prediction, self.residuals)
    }
}

/// Closed-form least squares `beta = (X'X)^-1 X'y`.
///
/// The normal equations are solved through a Cholesky factorization of
/// `X'X` after scaling it to unit diagonal, so columns measured in very
/// different units do not look singular. A design with no columns yields an
/// empty coefficient vector.
///
/// # Errors
///
/// - `DimensionMismatch` if `x` and `y` disagree on the number of rows.
/// - `SingularMatrix` if `X'X` is not numerically positive definite, which
///   covers collinear columns and fewer rows than columns.
pub fn fit_ols(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<DVector<f64>> {
    check::same_rows(x, y)?;
    check::finite_matrix(x, "design matrix")?;
    check::finite_vector(y, "target")?;

    let k = x.ncols();
    if k == 0 {
        return Ok(DVector::zeros(0));
    }
    if x.nrows() < k {
        return Err(LassoError::SingularMatrix(format!(
            "{} observations cannot identify {} coefficients",
            x.nrows(),
            k
        )));
    }

    let xt = x.transpose();
    let gram = &xt * x;

    // Jacobi scaling: D^-1/2 G D^-1/2 has a unit diagonal.
    if let Some(j) = gram.diagonal().iter().position(|d| !d.is_finite() || *d <= 0.0) {
        return Err(LassoError::SingularMatrix(format!(
            "column {} has zero norm",
            j
        )));
    }
    let scales = gram.diagonal().map(|d| 1.0 / d.sqrt());
    let scaled = DMatrix::from_fn(k, k, |i, j| gram[(i, j)] * scales[i] * scales[j]);
    let moment = (&xt * y).component_mul(&scales);

    let chol = scaled.cholesky().ok_or_else(|| {
        LassoError::SingularMatrix("X'X is not positive definite".into())
    })?;

    let pivots = chol.l_dirty().diagonal();
    let (lo, hi) = pivots
        .iter()
        .fold((f64::INFINITY, 0.0_f64), |(lo, hi), p| (lo.min(*p), hi.max(*p)));
    let rcond = (lo / hi).powi(2);
    if rcond.is_nan() || rcond < MIN_RCOND {
        return Err(LassoError::SingularMatrix(format!(
            "X'X is numerically singular (reciprocal condition {:.2e})",
            rcond
        )));
    }

    Ok(chol.solve(&moment).component_mul(&scales))
}

/// Apply `betas` to `x` and compare with `y`.
///
/// # Errors
///
/// `DimensionMismatch` if `betas` does not have one entry per column of `x`
/// or `y` does not have one entry per row.
pub fn predict(x: &DMatrix<f64>, y: &DVector<f64>, betas: &DVector<f64>) -> Result<Prediction> {
    check::same_rows(x, y)?;
    if betas.len() != x.ncols() {
        return Err(LassoError::length_mismatch(x.ncols(), betas.len()));
    }

    let prediction = if x.ncols() == 0 {
        DVector::zeros(x.nrows())
    } else {
        x * betas
    };
    let residuals = y - &prediction;
    Ok(Prediction {
        prediction,
        residuals,
    })
}
