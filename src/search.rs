//! Penalty selection by held-out validation error.
//!
//! The data is split chronologically: the first `floor(T * train_ratio)` rows
//! train the Lasso, the remaining rows score it. Each candidate penalty is
//! scored with the solver's shrunk coefficients on its top-K columns, not with
//! an OLS refit, so the validation error includes the shrinkage bias.

use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use rayon::prelude::*;

use crate::check;
use crate::error::{LassoError, Result};
use crate::lasso::{gather, select_top_k, solve_with, subset_columns, Settings};
use crate::ols::predict;

/// Search settings.
#[derive(Debug, Clone)]
pub struct SearchSettings {
    /// Fraction of rows used for training, in `(0, 1)`.
    pub train_ratio: f64,
    /// Coordinate-descent settings used at every grid point.
    pub solver: Settings,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            train_ratio: 0.8,
            solver: Settings::default(),
        }
    }
}

impl SearchSettings {
    /// Set the training fraction.
    pub fn train_ratio(mut self, train_ratio: f64) -> Self {
        self.train_ratio = train_ratio;
        self
    }

    /// Set the solver settings.
    pub fn solver(mut self, solver: Settings) -> Self {
        self.solver = solver;
        self
    }
}

/// Chronological train/validation partition of `(X, y)`.
#[derive(Debug, Clone)]
pub struct Split {
    /// First validation row; rows before it are training rows.
    pub index: usize,
    pub x_train: DMatrix<f64>,
    pub y_train: DVector<f64>,
    pub x_val: DMatrix<f64>,
    pub y_val: DVector<f64>,
}

/// Evaluation of one grid point.
#[derive(Debug, Clone, PartialEq)]
pub struct GridPoint {
    pub lambda: f64,
    pub selected: Vec<usize>,
    pub validation_mse: f64,
    /// Coordinate-descent sweeps used on the training rows.
    pub iterations: usize,
    pub converged: bool,
}

/// Outcome of a penalty search.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Penalty with the lowest validation MSE (first one on ties).
    pub best_lambda: f64,
    /// Top-K columns of the winning fit, by descending magnitude.
    pub selected: Vec<usize>,
    /// Full coefficient vector of the winning fit.
    pub coefficients: DVector<f64>,
    /// Validation MSE of the winning fit.
    pub validation_mse: f64,
    /// Every grid point, in grid order.
    pub path: Vec<GridPoint>,
}

impl SearchResult {
    /// `(best_lambda, selected, coefficients)`.
    pub fn into_tuple(self) -> (f64, Vec<usize>, DVector<f64>) {
        (self.best_lambda, self.selected, self.coefficients)
    }
}

/// `num` values spaced evenly in exponent from `10^start_exp` to `10^end_exp`.
///
/// Returns an empty grid for `num = 0` and `[10^start_exp]` for `num = 1`.
pub fn log_space(start_exp: f64, end_exp: f64, num: usize) -> Vec<f64> {
    match num {
        0 => Vec::new(),
        1 => vec![10f64.powf(start_exp)],
        _ => {
            let step = (end_exp - start_exp) / (num - 1) as f64;
            (0..num)
                .map(|i| 10f64.powf(start_exp + step * i as f64))
                .collect()
        }
    }
}

/// Split rows at `floor(T * train_ratio)` without shuffling.
///
/// # Errors
///
/// `InvalidParameter` if `train_ratio` is outside `(0, 1)` or the split would
/// leave the training or validation part empty.
pub fn split_rows(x: &DMatrix<f64>, y: &DVector<f64>, train_ratio: f64) -> Result<Split> {
    check::same_rows(x, y)?;
    if !(train_ratio > 0.0 && train_ratio < 1.0) {
        return Err(LassoError::InvalidParameter(format!(
            "train_ratio must lie in (0, 1), got {}",
            train_ratio
        )));
    }

    let t = x.nrows();
    let index = (t as f64 * train_ratio).floor() as usize;
    if index == 0 || index >= t {
        return Err(LassoError::InvalidParameter(format!(
            "train_ratio {} splits {} rows at {}, leaving an empty partition",
            train_ratio, t, index
        )));
    }

    Ok(Split {
        index,
        x_train: x.rows(0, index).into_owned(),
        y_train: y.rows(0, index).into_owned(),
        x_val: x.rows(index, t - index).into_owned(),
        y_val: y.rows(index, t - index).into_owned(),
    })
}

/// Pick the best penalty with default settings and the given training fraction.
///
/// Returns `(best_lambda, selected, coefficients)`.
pub fn search(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    grid: &[f64],
    top_k: usize,
    train_ratio: f64,
) -> Result<(f64, Vec<usize>, DVector<f64>)> {
    let settings = SearchSettings::default().train_ratio(train_ratio);
    search_with(x, y, grid, top_k, &settings).map(SearchResult::into_tuple)
}

/// Evaluate every penalty in `grid`, in order, and keep the lowest
/// validation MSE. Ties keep the earlier grid entry.
///
/// # Errors
///
/// - `InvalidParameter` for an empty grid, a negative or non-finite penalty,
///   `top_k` above the number of columns, or a degenerate split.
/// - Any solver error raised on the training rows.
pub fn search_with(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    grid: &[f64],
    top_k: usize,
    settings: &SearchSettings,
) -> Result<SearchResult> {
    let split = prepare(x, y, grid, top_k, settings)?;

    let mut best = Best::default();
    for &lambda in grid {
        best.offer(evaluate(&split, lambda, top_k, &settings.solver)?);
    }
    best.finish()
}

/// Same as [`search_with`], with grid points fitted in parallel.
///
/// Results are reduced in grid order, so the outcome is identical to the
/// sequential search.
pub fn search_parallel(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    grid: &[f64],
    top_k: usize,
    settings: &SearchSettings,
) -> Result<SearchResult> {
    let split = prepare(x, y, grid, top_k, settings)?;

    let candidates: Vec<Result<Candidate>> = grid
        .par_iter()
        .map(|&lambda| evaluate(&split, lambda, top_k, &settings.solver))
        .collect();

    let mut best = Best::default();
    for candidate in candidates {
        best.offer(candidate?);
    }
    best.finish()
}

/// Entry checks shared by both search flavours.
fn prepare(
    x: &DMatrix<f64>,
    y: &DVector<f64>,
    grid: &[f64],
    top_k: usize,
    settings: &SearchSettings,
) -> Result<Split> {
    if grid.is_empty() {
        return Err(LassoError::InvalidParameter(
            "lambda grid is empty".into(),
        ));
    }
    for &lambda in grid {
        check::penalty(lambda)?;
    }
    if top_k > x.ncols() {
        return Err(LassoError::InvalidParameter(format!(
            "top_k = {} exceeds the number of factors ({})",
            top_k,
            x.ncols()
        )));
    }
    settings.solver.validate()?;
    check::finite_matrix(x, "design matrix")?;
    check::finite_vector(y, "target")?;
    split_rows(x, y, settings.train_ratio)
}

/// A fitted and scored grid point.
struct Candidate {
    lambda: f64,
    selected: Vec<usize>,
    coefficients: DVector<f64>,
    validation_mse: f64,
    iterations: usize,
    converged: bool,
}

fn evaluate(split: &Split, lambda: f64, top_k: usize, solver: &Settings) -> Result<Candidate> {
    let fit = solve_with(&split.x_train, &split.y_train, lambda, solver)?;
    let selected = select_top_k(&fit.coefficients, top_k)?;

    let x_reduced = subset_columns(&split.x_val, &selected)?;
    let betas = gather(&fit.coefficients, &selected)?;
    let validation_mse = predict(&x_reduced, &split.y_val, &betas)?.mse();

    debug!(
        "lambda={:.3e} nnz={} selected={:?} validation_mse={:.6e}",
        lambda,
        fit.nnz(),
        selected,
        validation_mse
    );

    Ok(Candidate {
        lambda,
        selected,
        coefficients: fit.coefficients,
        validation_mse,
        iterations: fit.iterations,
        converged: fit.converged,
    })
}

/// Running minimum over grid points, first-wins on ties.
#[derive(Default)]
struct Best {
    winner: Option<Candidate>,
    path: Vec<GridPoint>,
}

impl Best {
    fn offer(&mut self, candidate: Candidate) {
        self.path.push(GridPoint {
            lambda: candidate.lambda,
            selected: candidate.selected.clone(),
            validation_mse: candidate.validation_mse,
            iterations: candidate.iterations,
            converged: candidate.converged,
        });

        let better = match &self.winner {
            None => true,
            Some(current) => candidate.validation_mse < current.validation_mse,
        };
        if better {
            self.winner = Some(candidate);
        }
    }

    fn finish(self) -> Result<SearchResult> {
        let winner = self.winner.ok_or_else(|| {
            LassoError::InvalidParameter("lambda grid is empty".into())
        })?;
        info!(
            "best lambda={:.3e} selected={:?} validation_mse={:.6e}",
            winner.lambda, winner.selected, winner.validation_mse
        );
        Ok(SearchResult {
            best_lambda: winner.lambda,
            selected: winner.selected,
            coefficients: winner.coefficients,
            validation_mse: winner.validation_mse,
            path: self.path,
        })
    }
}
