//! Entry-point argument checks shared by the solvers and the search harness.

use nalgebra::{DMatrix, DVector};

use crate::error::{LassoError, Result};

/// X and y must describe the same number of observations.
pub(crate) fn same_rows(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(LassoError::row_mismatch(x.nrows(), y.len()));
    }
    Ok(())
}

pub(crate) fn finite_matrix(x: &DMatrix<f64>, what: &str) -> Result<()> {
    if let Some(pos) = x.iter().position(|v| !v.is_finite()) {
        let (row, col) = (pos % x.nrows(), pos / x.nrows());
        return Err(LassoError::InvalidParameter(format!(
            "{} has a non-finite entry at ({}, {})",
            what, row, col
        )));
    }
    Ok(())
}

pub(crate) fn finite_vector(v: &DVector<f64>, what: &str) -> Result<()> {
    if let Some(i) = v.iter().position(|v| !v.is_finite()) {
        return Err(LassoError::InvalidParameter(format!(
            "{} has a non-finite entry at {}",
            what, i
        )));
    }
    Ok(())
}

pub(crate) fn penalty(lambda: f64) -> Result<()> {
    if !lambda.is_finite() || lambda < 0.0 {
        return Err(LassoError::InvalidParameter(format!(
            "lambda must be finite and non-negative, got {}",
            lambda
        )));
    }
    Ok(())
}

/// Validates a full regression problem: shapes, finiteness and penalty.
pub(crate) fn problem(x: &DMatrix<f64>, y: &DVector<f64>, lambda: f64) -> Result<()> {
    same_rows(x, y)?;
    penalty(lambda)?;
    finite_matrix(x, "design matrix")?;
    finite_vector(y, "target")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_mismatch() {
        let x = DMatrix::zeros(3, 2);
        let y = DVector::zeros(4);
        assert!(matches!(
            same_rows(&x, &y),
            Err(LassoError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_non_finite_entry_located() {
        let mut x = DMatrix::zeros(3, 2);
        x[(2, 1)] = f64::NAN;
        let err = finite_matrix(&x, "design matrix").unwrap_err();
        assert!(err.to_string().contains("(2, 1)"), "{}", err);
    }

    #[test]
    fn test_penalty_range() {
        assert!(penalty(0.0).is_ok());
        assert!(penalty(-1e-12).is_err());
        assert!(penalty(f64::INFINITY).is_err());
        assert!(penalty(f64::NAN).is_err());
    }
}
