use log::warn;
use nalgebra::linalg::{LU, Schur};
use nalgebra::{DMatrix, Dyn};
/// Rows whose diagonal element is zero or negligible compared to the largest element of A.
/// Such a diagonal makes the splitting A = D - L - U useless: neither D (Gauss-Jacobi)
/// nor D - L (Gauss-Seidel, its determinant is the product of the same diagonal) can be inverted.
pub fn negligible_diagonal_rows(A: &DMatrix<f64>) -> Vec<usize> {
    let scale = A.amax();
    let eps = f64::EPSILON * scale;
    A.diagonal()
        .iter()
        .enumerate()
        .filter(|(_, d)| !d.is_finite() || d.abs() <= eps)
        .map(|(i, _)| i)
        .collect()
}

/// Strict row diagonal dominance |a_ii| > sum_{j!=i} |a_ij| - sufficient condition for
/// convergence of Gauss-Jacobi and Gauss-Seidel for any initial guess.
pub fn is_diagonally_dominant(A: &DMatrix<f64>) -> bool {
    for (i, row) in A.row_iter().enumerate() {
        let diag = row[i].abs();
        let off_diag: f64 = row
            .iter()
            .enumerate()
            .filter(|(j, _)| *j != i)
            .map(|(_, a)| a.abs())
            .sum();
        if diag <= off_diag {
            warn!(
                "Matrix is not strictly diagonally dominant: row {} has |a_ii| = {} <= {}",
                i, diag, off_diag
            );
            return false;
        }
    }
    true
}

/// Largest modulus of the eigenvalues of a square matrix. The stationary iteration
/// x_(k+1) = M x_k + c converges for every x_0 iff spectral_radius(M) < 1.
/// None if the Schur decomposition did not converge.
pub fn spectral_radius(M: &DMatrix<f64>) -> Option<f64> {
    if M.is_empty() {
        return Some(0.0);
    }
    let schur = Schur::try_new(M.clone(), f64::EPSILON, 10_000)?;
    let eigenvalues = schur.complex_eigenvalues();
    Some(eigenvalues.iter().map(|c| c.norm()).fold(0.0, f64::max))
}

/// LU factors are treated as singular when the smallest pivot is zero
/// or negligible relative to the largest one
pub fn lu_is_singular(lu: &LU<f64, Dyn, Dyn>) -> bool {
    let u = lu.u();
    let pivots = u.diagonal();
    if pivots.is_empty() {
        return true;
    }
    let max_pivot = pivots.amax();
    let min_pivot = pivots.iter().fold(f64::INFINITY, |acc, p| acc.min(p.abs()));
    let threshold = 10.0 * f64::EPSILON * pivots.len() as f64 * max_pivot;
    !min_pivot.is_finite() || max_pivot == 0.0 || min_pivot <= threshold
}

/// A system of linear equations is poorly conditioned if its solution is sensitive to small
/// changes of the input data. The condition number is the ratio of the largest singular value
/// to the smallest one.
pub fn poorly_conditioned(A: &DMatrix<f64>, threshold: f64) -> bool {
    let singular_values = A.singular_values();
    if singular_values.is_empty() {
        return false;
    }
    let max_sigma = singular_values.max();
    let min_sigma = singular_values.min();
    let condition_number = max_sigma / min_sigma;

    let poorly_conditioned = !condition_number.is_finite() || condition_number > threshold;
    if poorly_conditioned {
        warn!(
            "The system of linear equations is poorly conditioned. Condition number = {:.2e}",
            condition_number
        );
    }
    poorly_conditioned
}
