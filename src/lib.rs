//! # factor-lasso
//!
//! Sparse factor selection for a target return series.
//!
//! Given a design matrix of candidate factor returns (rows = time steps,
//! columns = factors) and a target series, factor-lasso fits an
//! L1-regularized regression by coordinate descent, keeps the K factors with
//! the largest coefficients, and picks the penalty that minimizes error on a
//! chronologically held-out validation slice.
//!
//! ## Quick Start
//!
//! ```ignore
//! use factor_lasso::prelude::*;
//!
//! // x: T x N standardized factor returns, y: length-T target returns
//! let grid = log_space(-6.0, 0.0, 10);
//! let (best_lambda, selected, coeffs) = search(&x, &y, &grid, 1, 0.8)?;
//!
//! // Refit the selected factors by OLS over the full sample
//! let x_sel = subset_columns(&x, &selected)?;
//! let betas = fit_ols(&x_sel, &y)?;
//! let fit = predict(&x_sel, &y, &betas)?;
//! println!("lambda {:.1e}, residual MSE {:.4}", best_lambda, fit.mse());
//! ```
//!
//! ## Input Contract
//!
//! Every design column must be scaled to unit standard deviation before
//! solving: the soft-threshold penalty is not scale-invariant. The
//! [`preprocess`] module turns a price panel into that form.
//!
//! ## Architecture
//!
//! - **Coordinate descent** with a soft-threshold update per column
//! - **Top-K selection** by descending absolute coefficient, stable on ties
//! - **OLS refit** via Cholesky-factored normal equations
//! - **Penalty search** over a log-spaced grid, scored by validation MSE
//!   with the shrunk (not refit) coefficients
//! - **Clarabel QP** as an exact reference for the Lasso objective

mod check;

pub mod error;
pub mod lasso;
pub mod ols;
pub mod pipeline;
pub mod preprocess;
pub mod search;
pub mod sparse;

/// Prelude module for convenient imports.
///
/// ```ignore
/// use factor_lasso::prelude::*;
/// ```
pub mod prelude {
    // Solver and selection
    pub use crate::lasso::{
        gather, lambda_max, objective, select_top_k, soft_threshold, solve, solve_qp,
        solve_qp_with, solve_with, subset_columns, LassoFit, QpSettings, Settings,
        ZeroColumnPolicy,
    };

    // Refit
    pub use crate::ols::{fit_ols, predict, Prediction};

    // Search
    pub use crate::search::{
        log_space, search, search_parallel, search_with, split_rows, GridPoint, SearchResult,
        SearchSettings, Split,
    };

    // Pipeline and preprocessing
    pub use crate::pipeline::{chunk_groups, select_by_groups, GroupedSelection};
    pub use crate::preprocess::{
        drop_incomplete_rows, log_returns, scale_to_unit_sd, standardize_columns,
    };

    // Errors
    pub use crate::error::{LassoError, Result};

    pub use nalgebra::{DMatrix, DVector};
}

// Re-export main types at crate root
pub use error::{LassoError, Result};
pub use lasso::{select_top_k, solve, LassoFit};
pub use ols::{fit_ols, predict, Prediction};
pub use search::{log_space, search, SearchResult};
