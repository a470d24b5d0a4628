use crate::Utils::task_parser::parse_document;
use crate::somelinalg::iterative_solvers_cpu::{
    IterativeMethod, LinearIterativeSolver, gauss_jacobi, gauss_seidel,
};
use nalgebra::{DMatrix, DVector};
use std::error::Error;
use strum::IntoEnumIterator;

/// diagonally dominant 4x4 system with solution [1, 2, -1, 1]
pub fn four_by_four_system() -> (DMatrix<f64>, DVector<f64>) {
    let A = DMatrix::from_row_slice(
        4,
        4,
        &[
            10.0, -1.0, 2.0, 0.0, //
            -1.0, 11.0, -1.0, 3.0, //
            2.0, -1.0, 10.0, -1.0, //
            0.0, 3.0, -1.0, 8.0,
        ],
    );
    let b = DVector::from_vec(vec![6.0, 25.0, -11.0, 15.0]);
    (A, b)
}

pub fn linear_eqs_examples(example: usize) -> Result<(), Box<dyn Error>> {
    match example {
        0 => {
            // free functions, no logging
            let A = DMatrix::from_row_slice(2, 2, &[4.0, 1.0, 1.0, 3.0]);
            let b = DVector::from_vec(vec![1.0, 2.0]);
            let x0 = DVector::zeros(2);
            let gj = gauss_jacobi(&A, &b, &x0, 100, 1e-10)?;
            let gs = gauss_seidel(&A, &b, &x0, 100, 1e-10)?;
            println!(
                "Gauss-Jacobi: {} iterations, Gauss-Seidel: {} iterations",
                gj.iterations(),
                gs.iterations()
            );
            println!("Gauss-Seidel iterations: \n{}", gs.trace().to_table());
            let direct = A.lu().solve(&b);
            println!(
                "iterative solution {:?}, LU solution {:?}",
                gs.into_solution()?,
                direct
            );
        }
        1 => {
            let (A, b) = four_by_four_system();
            for method in IterativeMethod::iter() {
                let mut solver = LinearIterativeSolver::new();
                solver.set_linear_system(A.clone(), b.clone(), DVector::zeros(4), 1e-8, 100)?;
                solver.set_solver_params(Some(method), Some("info".to_string()))?;
                solver.solve()?;
                println!("{}: {:?}", method, solver.get_result());
            }
        }
        2 => {
            let task = parse_document(
                "
                # iterative solver settings
                linear
                method: gs
                tolerance: 1e-10
                max_iterations: 200
                loglevel: warn
                ",
            )?;
            let (A, b) = four_by_four_system();
            let mut solver = LinearIterativeSolver::new();
            solver.set_linear_system(A, b, DVector::zeros(4), 1e-6, 100)?;
            solver.set_params_from_task(&task)?;
            let outcome = solver.solve()?;
            println!(
                "{} with task settings: converged = {} after {} iterations",
                solver.method,
                outcome.is_converged(),
                outcome.iterations()
            );
        }
        3 => {
            // not diagonally dominant: the iterations blow up and the partial trace comes back
            let A = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 1.0]);
            let b = DVector::from_vec(vec![1.0, 1.0]);
            let outcome = gauss_jacobi(&A, &b, &DVector::zeros(2), 50, 1e-8)?;
            println!(
                "converged = {}, last record: {:?}",
                outcome.is_converged(),
                outcome.trace().last()
            );
        }
        _ => {
            println!("example not found");
        }
    }
    Ok(())
}
