//! Lasso Path Example
//!
//! Solves the same L1-regularized least-squares problem
//!
//! minimize    0.5 * ||Ax - b||_2^2 + lambda * ||x||_1
//!
//! with coordinate descent and with the Clarabel reference solver, for a
//! range of penalties, and prints how the support shrinks.

use factor_lasso::prelude::*;

fn main() -> Result<()> {
    env_logger::init();
    println!("=== Lasso Path ===\n");

    // Only 3 out of 10 coefficients matter.
    #[rustfmt::skip]
    let a = DMatrix::from_row_slice(8, 10, &[
        1.0, 0.5, 0.2, 0.8, 0.1, 0.3, 0.4, 0.6, 0.2, 0.1,
        0.8, 0.3, 0.1, 0.9, 0.2, 0.4, 0.3, 0.7, 0.1, 0.2,
        0.6, 0.4, 0.3, 0.7, 0.3, 0.2, 0.5, 0.5, 0.3, 0.3,
        0.9, 0.2, 0.4, 0.6, 0.1, 0.5, 0.2, 0.8, 0.4, 0.1,
        0.7, 0.6, 0.2, 0.5, 0.4, 0.1, 0.6, 0.4, 0.2, 0.4,
        0.5, 0.1, 0.5, 0.4, 0.2, 0.6, 0.1, 0.9, 0.1, 0.2,
        0.2, 0.9, 0.6, 0.1, 0.7, 0.3, 0.8, 0.2, 0.5, 0.6,
        0.4, 0.7, 0.9, 0.3, 0.5, 0.8, 0.2, 0.1, 0.7, 0.9,
    ]);
    let a = standardize_columns(&a)?.matrix;

    // True model: b = 3*a1 + 2*a4 + 1*a8
    let truth = DVector::from_fn(10, |j, _| match j {
        0 => 3.0,
        3 => 2.0,
        7 => 1.0,
        _ => 0.0,
    });
    let b = &a * &truth;

    let lmax = lambda_max(&a, &b)?;
    println!("lambda_max = {:.4}\n", lmax);

    for frac in [0.001, 0.05, 0.2, 0.5, 0.9] {
        let lambda = frac * lmax;
        let cd = solve_with(&a, &b, lambda, &Settings::default().tol(1e-10))?;
        let qp = solve_qp(&a, &b, lambda)?;

        println!("--- lambda = {:.4} ({} sweeps) ---", lambda, cd.iterations);
        for j in 0..10 {
            let marker = if cd.coefficients[j].abs() > 1e-8 { " <--" } else { "" };
            println!(
                "  x{:<2}: cd {:>10.6}  qp {:>10.6}{}",
                j + 1,
                cd.coefficients[j],
                qp[j],
                marker
            );
        }
        println!(
            "  Objective: cd {:.6}  qp {:.6}\n",
            objective(&a, &b, &cd.coefficients, lambda)?,
            objective(&a, &b, &qp, lambda)?
        );
    }

    Ok(())
}
