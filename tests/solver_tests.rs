//! Coordinate descent, reference QP and OLS refit on generated designs.

use factor_lasso::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

/// Tolerance for comparing floating point results
const TOL: f64 = 1e-4;

fn gaussian_matrix(rng: &mut StdRng, rows: usize, cols: usize) -> DMatrix<f64> {
    let normal = Normal::new(0.0, 1.0).unwrap();
    DMatrix::from_fn(rows, cols, |_, _| normal.sample(rng))
}

fn gaussian_vector(rng: &mut StdRng, len: usize) -> DVector<f64> {
    let normal = Normal::new(0.0, 1.0).unwrap();
    DVector::from_fn(len, |_, _| normal.sample(rng))
}

fn tight() -> Settings {
    Settings::default().tol(1e-12).max_iter(100_000)
}

#[test]
fn test_coordinate_descent_matches_qp() {
    let mut rng = StdRng::seed_from_u64(7);
    let x = standardize_columns(&gaussian_matrix(&mut rng, 50, 5)).unwrap().matrix;
    let truth = DVector::from_vec(vec![1.5, 0.0, -0.7, 0.0, 0.2]);
    let y = &x * &truth + gaussian_vector(&mut rng, 50) * 0.3;

    let lmax = lambda_max(&x, &y).unwrap();
    for frac in [0.0, 0.01, 0.1, 0.5, 0.9] {
        let lambda = frac * lmax;
        let cd = solve_with(&x, &y, lambda, &tight()).unwrap();
        assert!(cd.converged, "lambda {} did not converge", lambda);
        let qp = solve_qp(&x, &y, lambda).unwrap();

        let gap = (&cd.coefficients - &qp).amax();
        assert!(gap < TOL, "lambda {}: cd {:?} vs qp {:?}", lambda, cd.coefficients, qp);

        let f_cd = objective(&x, &y, &cd.coefficients, lambda).unwrap();
        let f_qp = objective(&x, &y, &qp, lambda).unwrap();
        assert!(f_cd <= f_qp + 1e-6 * f_qp.abs().max(1.0), "{} > {}", f_cd, f_qp);
    }
}

#[test]
fn test_sparsity_grows_with_lambda() {
    let mut rng = StdRng::seed_from_u64(11);
    let q = gaussian_matrix(&mut rng, 30, 4).qr().q();
    let y = gaussian_vector(&mut rng, 30);
    let lmax = lambda_max(&q, &y).unwrap();

    let mut previous = usize::MAX;
    for step in 0..=25 {
        let lambda = lmax * step as f64 / 25.0;
        let nnz = solve_with(&q, &y, lambda, &Settings::default()).unwrap().nnz();
        assert!(nnz <= previous, "nnz rose to {} at lambda {}", nnz, lambda);
        previous = nnz;
    }
    assert_eq!(previous, 0);
}

#[test]
fn test_orthonormal_design_recovers_ols_at_zero_penalty() {
    let mut rng = StdRng::seed_from_u64(3);
    let q = gaussian_matrix(&mut rng, 40, 5).qr().q();
    let y = gaussian_vector(&mut rng, 40);

    let lasso = solve(&q, &y, 0.0).unwrap();
    let ols = fit_ols(&q, &y).unwrap();
    let projection = q.transpose() * &y;

    assert!((&lasso - &ols).amax() < 1e-8);
    assert!((&lasso - &projection).amax() < 1e-8);
}

#[test]
fn test_ols_recovers_noiseless_coefficients() {
    let mut rng = StdRng::seed_from_u64(19);
    let x = gaussian_matrix(&mut rng, 40, 4);
    let truth = DVector::from_vec(vec![0.5, -2.0, 0.0, 3.25]);
    let y = &x * &truth;

    let beta = fit_ols(&x, &y).unwrap();
    assert!((&beta - &truth).amax() < 1e-8, "got {:?}", beta);

    let fit = predict(&x, &y, &beta).unwrap();
    assert!(fit.mse() < 1e-20);
}

#[test]
fn test_prediction_plus_residual_is_target() {
    let mut rng = StdRng::seed_from_u64(23);
    let x = gaussian_matrix(&mut rng, 25, 3);
    let y = gaussian_vector(&mut rng, 25);
    let betas = gaussian_vector(&mut rng, 3);

    let (prediction, residuals) = predict(&x, &y, &betas).unwrap().into_parts();
    let rebuilt = prediction + residuals;
    for (a, b) in rebuilt.iter().zip(y.iter()) {
        assert!((a - b).abs() < 1e-12, "{} vs {}", a, b);
    }
}

#[test]
fn test_duplicate_columns_are_singular_for_ols() {
    let mut rng = StdRng::seed_from_u64(29);
    let base = gaussian_matrix(&mut rng, 20, 2);
    let x = DMatrix::from_fn(20, 3, |i, j| base[(i, j.min(1))]);
    let y = gaussian_vector(&mut rng, 20);
    assert!(matches!(fit_ols(&x, &y), Err(LassoError::SingularMatrix(_))));

    // Lasso still fits duplicated columns.
    let beta = solve(&x, &y, 0.5).unwrap();
    assert!(beta.iter().all(|b| b.is_finite()));
}

#[test]
fn test_zero_column_policies() {
    let mut rng = StdRng::seed_from_u64(31);
    let mut x = gaussian_matrix(&mut rng, 20, 3);
    x.column_mut(1).fill(0.0);
    let y = gaussian_vector(&mut rng, 20);

    assert!(matches!(
        solve(&x, &y, 0.1),
        Err(LassoError::DegenerateColumn { column: 1 })
    ));

    let settings = Settings::default().zero_columns(ZeroColumnPolicy::Exclude);
    let fit = solve_with(&x, &y, 0.1, &settings).unwrap();
    assert_eq!(fit.coefficients[1], 0.0);
    assert!(fit.coefficients.iter().all(|b| b.is_finite()));

    let qp = solve_qp(&x, &y, 0.1).unwrap();
    assert!(qp[1].abs() < TOL);
}

#[test]
fn test_top_k_on_solver_output() {
    let mut rng = StdRng::seed_from_u64(37);
    let x = standardize_columns(&gaussian_matrix(&mut rng, 60, 6)).unwrap().matrix;
    let truth = DVector::from_vec(vec![0.0, 2.0, 0.0, -1.0, 0.0, 0.0]);
    let y = &x * &truth + gaussian_vector(&mut rng, 60) * 0.1;

    let beta = solve(&x, &y, 5.0).unwrap();
    assert_eq!(select_top_k(&beta, 2).unwrap(), vec![1, 3]);

    let all = select_top_k(&beta, 6).unwrap();
    let mut sorted = all.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..6).collect::<Vec<_>>());
    for pair in all.windows(2) {
        assert!(beta[pair[0]].abs() >= beta[pair[1]].abs());
    }
}
