/*
 Finite difference approximation of the Jacobian matrix of fun: R^n -> R^m at the point x.
 Element (i, j) equals d f_i / d x_j.
 The step for each column is h_j = c * max(|x_j|, 1), c = sqrt(EPS) for forward
 differences (truncation error O(h)) and c = EPS^(1/3) for central differences (O(h^2)).
 The step is then corrected so that x_j + h_j - x_j == h_j exactly in floating point,
 otherwise the round-off of the argument leaks straight into the derivative.
*/
use nalgebra::{DMatrix, DVector};
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DiffScheme {
    Forward,
    #[default]
    Central,
}

impl DiffScheme {
    fn relative_step(&self) -> f64 {
        match self {
            DiffScheme::Forward => f64::EPSILON.sqrt(),
            DiffScheme::Central => f64::EPSILON.cbrt(),
        }
    }
}

/// returns Jacobian and the number of function evaluations spent on it
/// `f0` must be fun(x); it is reused by the forward scheme
pub fn finite_difference_jacobian(
    fun: &dyn Fn(&DVector<f64>) -> DVector<f64>,
    x: &DVector<f64>,
    f0: &DVector<f64>,
    scheme: DiffScheme,
) -> (DMatrix<f64>, usize) {
    let n = x.len();
    let m = f0.len();
    let mut jac = DMatrix::zeros(m, n);
    let mut evaluations = 0;
    let c = scheme.relative_step();
    let mut x_work = x.clone();
    for j in 0..n {
        let x_j = x[j];
        let h = c * x_j.abs().max(1.0);
        let h = (x_j + h) - x_j;
        match scheme {
            DiffScheme::Forward => {
                x_work[j] = x_j + h;
                let f_plus = fun(&x_work);
                evaluations += 1;
                jac.set_column(j, &((f_plus - f0) / h));
            }
            DiffScheme::Central => {
                x_work[j] = x_j + h;
                let f_plus = fun(&x_work);
                x_work[j] = x_j - h;
                let f_minus = fun(&x_work);
                evaluations += 2;
                jac.set_column(j, &((f_plus - f_minus) / (2.0 * h)));
            }
        }
        x_work[j] = x_j;
    }
    (jac, evaluations)
}
