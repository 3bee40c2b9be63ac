//! Sparse regression engine.
//!
//! This module provides:
//! - The coordinate-descent Lasso solver and its soft-threshold update
//! - Top-K selection of the largest coefficients
//! - An exact Clarabel-backed solver for cross-checking

pub mod clarabel;
pub mod coordinate;
pub mod select;

pub use self::clarabel::{solve_qp, solve_qp_with, QpSettings};
pub use coordinate::{
    lambda_max, objective, soft_threshold, solve, solve_with, LassoFit, Settings,
    ZeroColumnPolicy,
};
pub use select::{gather, select_top_k, subset_columns};
