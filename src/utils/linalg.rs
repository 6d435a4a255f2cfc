//! Small dense linear algebra routines used by the linear estimators and
//! the kernel explanation engine.

use crate::error::{Result, ShapcastError};

/// Solve a symmetric positive definite system `A x = b` via Cholesky
/// decomposition. Returns `None` when `A` is not positive definite.
pub fn solve_symmetric(a: &[Vec<f64>], b: &[f64]) -> Option<Vec<f64>> {
    let n = b.len();
    if n == 0 || a.len() != n {
        return None;
    }

    // Cholesky decomposition A = L L'
    let mut l = vec![vec![0.0; n]; n];
    for i in 0..n {
        for j in 0..=i {
            let mut sum = a[i][j];
            for k in 0..j {
                sum -= l[i][k] * l[j][k];
            }
            if i == j {
                if sum <= 0.0 {
                    return None;
                }
                l[i][j] = sum.sqrt();
            } else {
                l[i][j] = sum / l[j][j];
            }
        }
    }

    // Forward substitution: L y = b
    let mut y = vec![0.0; n];
    for i in 0..n {
        let mut sum = b[i];
        for j in 0..i {
            sum -= l[i][j] * y[j];
        }
        y[i] = sum / l[i][i];
    }

    // Backward substitution: L' x = y
    let mut x = vec![0.0; n];
    for i in (0..n).rev() {
        let mut sum = y[i];
        for j in (i + 1)..n {
            sum -= l[j][i] * x[j];
        }
        x[i] = sum / l[i][i];
    }

    Some(x)
}

/// Solve the weighted least squares problem `min ||W^(1/2) (X b - y)||^2`.
///
/// `x` is row-major with `p` columns, `weights` has one entry per row. A
/// small ridge term is added to the normal equations for stability.
pub fn weighted_least_squares(
    x: &[Vec<f64>],
    y: &[f64],
    weights: &[f64],
) -> Result<Vec<f64>> {
    if x.is_empty() {
        return Err(ShapcastError::EmptyData);
    }
    if x.len() != y.len() || x.len() != weights.len() {
        return Err(ShapcastError::DimensionMismatch {
            expected: x.len(),
            got: y.len().min(weights.len()),
        });
    }
    let p = x[0].len();
    let mut xtx = vec![vec![0.0; p]; p];
    let mut xty = vec![0.0; p];

    for (row, (&yi, &wi)) in x.iter().zip(y.iter().zip(weights.iter())) {
        if row.len() != p {
            return Err(ShapcastError::DimensionMismatch {
                expected: p,
                got: row.len(),
            });
        }
        for i in 0..p {
            let wxi = wi * row[i];
            xty[i] += wxi * yi;
            for j in 0..=i {
                xtx[i][j] += wxi * row[j];
            }
        }
    }
    // Mirror the lower triangle and regularize the diagonal.
    for i in 0..p {
        for j in (i + 1)..p {
            xtx[i][j] = xtx[j][i];
        }
        xtx[i][i] += 1e-10;
    }

    solve_symmetric(&xtx, &xty).ok_or_else(|| {
        ShapcastError::ComputationError(
            "weighted least squares failed: matrix not positive definite".to_string(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn solves_symmetric_system() {
        let a = vec![vec![4.0, 2.0], vec![2.0, 3.0]];
        let b = vec![10.0, 8.0];
        let x = solve_symmetric(&a, &b).unwrap();
        // Check A x = b
        assert_relative_eq!(4.0 * x[0] + 2.0 * x[1], 10.0, epsilon = 1e-10);
        assert_relative_eq!(2.0 * x[0] + 3.0 * x[1], 8.0, epsilon = 1e-10);
    }

    #[test]
    fn rejects_non_positive_definite() {
        let a = vec![vec![0.0, 1.0], vec![1.0, 0.0]];
        let b = vec![1.0, 1.0];
        assert!(solve_symmetric(&a, &b).is_none());
    }

    #[test]
    fn recovers_exact_linear_fit() {
        // y = 2 x0 - x1, uniform weights
        let x: Vec<Vec<f64>> = vec![
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 1.0],
            vec![2.0, 1.0],
        ];
        let y: Vec<f64> = x.iter().map(|r| 2.0 * r[0] - r[1]).collect();
        let w = vec![1.0; 4];
        let beta = weighted_least_squares(&x, &y, &w).unwrap();
        assert_relative_eq!(beta[0], 2.0, epsilon = 1e-6);
        assert_relative_eq!(beta[1], -1.0, epsilon = 1e-6);
    }

    #[test]
    fn weights_tilt_the_fit() {
        // Two contradictory observations of a single coefficient; the
        // heavier one dominates.
        let x = vec![vec![1.0], vec![1.0]];
        let y = vec![0.0, 10.0];
        let beta = weighted_least_squares(&x, &y, &[1.0, 9.0]).unwrap();
        assert_relative_eq!(beta[0], 9.0, epsilon = 1e-6);
    }
}
