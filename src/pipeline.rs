//! Grouped factor selection.
//!
//! Candidate factors are often organized in groups (one asset class each).
//! Each group runs its own penalty search, then every selected factor is
//! refit jointly by OLS over all rows.

use log::info;
use nalgebra::{DMatrix, DVector};

use crate::check;
use crate::error::{LassoError, Result};
use crate::lasso::subset_columns;
use crate::ols::{fit_ols, predict, Prediction};
use crate::search::{search_with, SearchSettings};

/// Selection made inside one group.
#[derive(Debug, Clone)]
pub struct GroupSelection {
    /// Position of the group in the input list.
    pub group: usize,
    pub best_lambda: f64,
    /// Selected columns as indices into the full design matrix.
    pub selected: Vec<usize>,
    /// Lasso coefficients of the selected columns, from the training rows.
    pub shrunk_coefficients: DVector<f64>,
    /// OLS coefficients of the selected columns over all rows.
    pub refit_coefficients: DVector<f64>,
    /// Fit of the refit coefficients over all rows.
    pub fit: Prediction,
}

/// Joint OLS refit over every group's selection.
#[derive(Debug, Clone)]
pub struct FinalRefit {
    /// Union of the group selections, in group order.
    pub selected: Vec<usize>,
    pub coefficients: DVector<f64>,
    pub fit: Prediction,
}

#[derive(Debug, Clone)]
pub struct GroupedSelection {
    pub groups: Vec<GroupSelection>,
    pub final_refit: FinalRefit,
}

/// Consecutive groups of `size` columns out of `n`; the last group holds
/// the remainder.
pub fn chunk_groups(n: usize, size: usize) -> Result<Vec<Vec<usize>>> {
    if size == 0 {
        return Err(LassoError::InvalidParameter(
            "group size must be positive".into(),
        ));
    }
    Ok((0..n)
        .step_by(size)
        .map(|start| (start..(start + size).min(n)).collect())
        .collect())
}

/// Search each group separately, then refit the union of selections.
///
/// # Errors
///
/// - `InvalidParameter` if there are no groups, a group is empty, an index is
///   out of range or appears in two groups, or `top_k` exceeds a group's size.
/// - Any search or refit error; a collinear union fails with `SingularMatrix`.
pub fn select_by_groups(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    groups: &[Vec<usize>],
    grid: &[f64],
    top_k: usize,
    settings: &SearchSettings,
) -> Result<GroupedSelection> {
    check::same_rows(x, y)?;
    validate_groups(groups, x.ncols())?;

    let mut selections = Vec::with_capacity(groups.len());
    for (g, columns) in groups.iter().enumerate() {
        let x_group = subset_columns(x, columns)?;
        let result = search_with(&x_group, y, grid, top_k, settings)?;

        let selected: Vec<usize> = result.selected.iter().map(|&k| columns[k]).collect();
        let shrunk_coefficients = DVector::from_iterator(
            result.selected.len(),
            result.selected.iter().map(|&k| result.coefficients[k]),
        );

        let x_selected = subset_columns(x, &selected)?;
        let refit_coefficients = fit_ols(&x_selected, y)?;
        let fit = predict(&x_selected, y, &refit_coefficients)?;

        info!(
            "group {}: lambda={:.3e} selected={:?} refit_mse={:.6e}",
            g,
            result.best_lambda,
            selected,
            fit.mse()
        );

        selections.push(GroupSelection {
            group: g,
            best_lambda: result.best_lambda,
            selected,
            shrunk_coefficients,
            refit_coefficients,
            fit,
        });
    }

    let union: Vec<usize> = selections
        .iter()
        .flat_map(|s| s.selected.iter().copied())
        .collect();
    let x_union = subset_columns(x, &union)?;
    let coefficients = fit_ols(&x_union, y)?;
    let fit = predict(&x_union, y, &coefficients)?;
    info!("final refit on {:?}: mse={:.6e}", union, fit.mse());

    Ok(GroupedSelection {
        groups: selections,
        final_refit: FinalRefit {
            selected: union,
            coefficients,
            fit,
        },
    })
}

fn validate_groups(groups: &[Vec<usize>], n: usize) -> Result<()> {
    if groups.is_empty() {
        return Err(LassoError::InvalidParameter("no column groups given".into()));
    }
    let mut owner: Vec<Option<usize>> = vec![None; n];
    for (g, columns) in groups.iter().enumerate() {
        if columns.is_empty() {
            return Err(LassoError::InvalidParameter(format!("group {} is empty", g)));
        }
        for &j in columns {
            let slot = owner.get_mut(j).ok_or_else(|| {
                LassoError::InvalidParameter(format!(
                    "group {} references column {} of {}",
                    g, j, n
                ))
            })?;
            if let Some(prev) = slot.replace(g) {
                return Err(LassoError::InvalidParameter(format!(
                    "column {} appears in groups {} and {}",
                    j, prev, g
                )));
            }
        }
    }
    Ok(())
}
