//! Input preparation for the selection engine.
//!
//! The solver expects returns, not price levels, with every candidate column
//! scaled to unit standard deviation. These helpers turn a price panel into
//! that shape. They work on in-memory matrices only; reading and writing
//! files is left to the caller.

use log::warn;
use nalgebra::{DMatrix, DVector};

use crate::check;
use crate::error::{LassoError, Result};

/// Rows kept by [`drop_incomplete_rows`].
#[derive(Debug, Clone)]
pub struct CompleteRows {
    pub x: DMatrix<f64>,
    pub y: DVector<f64>,
    /// Original row index of every kept row, ascending.
    pub kept: Vec<usize>,
}

/// Column-standardized matrix and the scales divided out.
#[derive(Debug, Clone)]
pub struct Standardized {
    pub matrix: DMatrix<f64>,
    /// Sample standard deviation of each original column; 1 where the column
    /// had no variation and was left unscaled.
    pub scales: DVector<f64>,
}

/// Log returns `ln(p_t / p_{t-1})` per column.
///
/// The result has one row fewer than `prices`. Non-positive or missing
/// prices produce non-finite returns, which [`drop_incomplete_rows`] removes.
pub fn log_returns(prices: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let t = prices.nrows();
    if t < 2 {
        return Err(LassoError::InvalidParameter(format!(
            "log returns need at least 2 price rows, got {}",
            t
        )));
    }
    Ok(DMatrix::from_fn(t - 1, prices.ncols(), |i, j| {
        (prices[(i + 1, j)] / prices[(i, j)]).ln()
    }))
}

/// Drop every row where `x` or `y` holds a non-finite value.
pub fn drop_incomplete_rows(x: &DMatrix<f64>, y: &DVector<f64>) -> Result<CompleteRows> {
    check::same_rows(x, y)?;

    let kept: Vec<usize> = (0..x.nrows())
        .filter(|&i| y[i].is_finite() && x.row(i).iter().all(|v| v.is_finite()))
        .collect();
    if kept.len() < x.nrows() {
        warn!(
            "dropped {} of {} rows with missing values",
            x.nrows() - kept.len(),
            x.nrows()
        );
    }

    Ok(CompleteRows {
        x: x.select_rows(kept.iter()),
        y: y.select_rows(kept.iter()),
        kept,
    })
}

/// Divide each column by its sample standard deviation.
///
/// Columns are not centered. A column with zero deviation is left as is
/// with scale 1.
pub fn standardize_columns(x: &DMatrix<f64>) -> Result<Standardized> {
    check::finite_matrix(x, "design matrix")?;
    if x.nrows() < 2 {
        return Err(LassoError::InvalidParameter(format!(
            "standard deviation needs at least 2 rows, got {}",
            x.nrows()
        )));
    }

    let scales = DVector::from_iterator(
        x.ncols(),
        x.column_iter().enumerate().map(|(j, col)| {
            let values: Vec<f64> = col.iter().copied().collect();
            let sd = sample_sd(&values);
            if sd > 0.0 {
                sd
            } else {
                warn!("column {} has zero standard deviation; left unscaled", j);
                1.0
            }
        }),
    );

    let mut matrix = x.clone_owned();
    for (mut col, scale) in matrix.column_iter_mut().zip(scales.iter()) {
        col /= *scale;
    }
    Ok(Standardized { matrix, scales })
}

/// Divide `y` by its sample standard deviation, returning the scaled series
/// and the deviation.
pub fn scale_to_unit_sd(y: &DVector<f64>) -> Result<(DVector<f64>, f64)> {
    check::finite_vector(y, "target")?;
    if y.len() < 2 {
        return Err(LassoError::InvalidParameter(format!(
            "standard deviation needs at least 2 observations, got {}",
            y.len()
        )));
    }
    let sd = sample_sd(y.as_slice());
    if sd <= 0.0 {
        return Err(LassoError::InvalidParameter(
            "target has zero standard deviation".into(),
        ));
    }
    Ok((y / sd, sd))
}

/// Standard deviation with the `n - 1` denominator.
fn sample_sd(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (ss / (n - 1.0)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_returns() {
        let prices = DMatrix::from_row_slice(3, 2, &[100.0, 10.0, 110.0, 10.0, 99.0, 20.0]);
        let r = log_returns(&prices).unwrap();
        assert_eq!(r.shape(), (2, 2));
        assert!((r[(0, 0)] - (1.1f64).ln()).abs() < 1e-15);
        assert!((r[(1, 0)] - (0.9f64).ln()).abs() < 1e-15);
        assert_eq!(r[(0, 1)], 0.0);
        assert!((r[(1, 1)] - (2.0f64).ln()).abs() < 1e-15);
    }

    #[test]
    fn test_log_returns_too_short() {
        assert!(log_returns(&DMatrix::from_element(1, 3, 1.0)).is_err());
    }

    #[test]
    fn test_drop_incomplete_rows() {
        let x = DMatrix::from_row_slice(4, 2, &[1.0, 2.0, f64::NAN, 1.0, 3.0, 4.0, 5.0, 6.0]);
        let y = DVector::from_vec(vec![1.0, 2.0, f64::INFINITY, 4.0]);
        let rows = drop_incomplete_rows(&x, &y).unwrap();
        assert_eq!(rows.kept, vec![0, 3]);
        assert_eq!(rows.x, DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 5.0, 6.0]));
        assert_eq!(rows.y, DVector::from_vec(vec![1.0, 4.0]));
    }

    #[test]
    fn test_standardize_columns() {
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 5.0, 2.0, 5.0, 3.0, 5.0]);
        let s = standardize_columns(&x).unwrap();
        // Column 0 has sample sd 1, column 1 is constant.
        assert!((s.scales[0] - 1.0).abs() < 1e-15);
        assert_eq!(s.scales[1], 1.0);
        assert_eq!(s.matrix.column(1), x.column(1));

        let x = DMatrix::from_row_slice(3, 1, &[2.0, 4.0, 6.0]);
        let s = standardize_columns(&x).unwrap();
        assert!((s.scales[0] - 2.0).abs() < 1e-15);
        assert!((s.matrix[(2, 0)] - 3.0).abs() < 1e-15);
    }

    #[test]
    fn test_scale_to_unit_sd() {
        let y = DVector::from_vec(vec![1.0, 3.0, 5.0, 7.0]);
        let (scaled, sd) = scale_to_unit_sd(&y).unwrap();
        assert!((sd - (20.0f64 / 3.0).sqrt()).abs() < 1e-12);
        let mean = scaled.mean();
        let var = scaled.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / 3.0;
        assert!((var - 1.0).abs() < 1e-12);

        assert!(scale_to_unit_sd(&DVector::from_element(3, 2.0)).is_err());
    }
}
