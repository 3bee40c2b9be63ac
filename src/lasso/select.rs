//! Top-K factor selection and reduced views over selected columns.

use nalgebra::{DMatrix, DVector};

use crate::error::{LassoError, Result};

/// Indices of the `top_k` largest coefficients by absolute value.
///
/// The sort is stable over ascending column index, so equal magnitudes keep
/// the lower index first. Zero coefficients are ranked like any other value:
/// asking for more indices than the support size returns zero-coefficient
/// columns in index order.
///
/// # Errors
///
/// `InvalidParameter` if `top_k` exceeds the number of coefficients.
pub fn select_top_k(coefficients: &DVector<f64>, top_k: usize) -> Result<Vec<usize>> {
    let n = coefficients.len();
    if top_k > n {
        return Err(LassoError::InvalidParameter(format!(
            "top_k = {} exceeds the number of factors ({})",
            top_k, n
        )));
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| coefficients[b].abs().total_cmp(&coefficients[a].abs()));
    order.truncate(top_k);
    Ok(order)
}

/// Copy of the given columns of `x`, in the order listed.
pub fn subset_columns(x: &DMatrix<f64>, columns: &[usize]) -> Result<DMatrix<f64>> {
    if let Some(&bad) = columns.iter().find(|&&j| j >= x.ncols()) {
        return Err(LassoError::InvalidParameter(format!(
            "column index {} out of range for {} columns",
            bad,
            x.ncols()
        )));
    }
    Ok(DMatrix::from_fn(x.nrows(), columns.len(), |i, k| {
        x[(i, columns[k])]
    }))
}

/// Entries of `coefficients` at `indices`, in the order listed.
pub fn gather(coefficients: &DVector<f64>, indices: &[usize]) -> Result<DVector<f64>> {
    if let Some(&bad) = indices.iter().find(|&&j| j >= coefficients.len()) {
        return Err(LassoError::InvalidParameter(format!(
            "index {} out of range for {} coefficients",
            bad,
            coefficients.len()
        )));
    }
    Ok(DVector::from_iterator(
        indices.len(),
        indices.iter().map(|&j| coefficients[j]),
    ))
}
