use crate::Utils::logger::save_trace_to_csv;
use crate::Utils::task_parser::parse_document;
use crate::numerical::NR::{LinearSysMethod, NR, newton_raphson};
use nalgebra::{DMatrix, DVector};
use std::error::Error;
use std::path::Path;

/// Market with nonlinear supply and demand curves, unknowns X = [P, Q]:
/// supply P = 20*1.5^(Q/100), demand P = (2000 - Q)^0.7.
/// Equilibrium: P = 165.55, Q = 521.26
pub fn market_equilibrium(x: &DVector<f64>) -> DVector<f64> {
    let (p, q) = (x[0], x[1]);
    DVector::from_vec(vec![
        20.0 * 1.5f64.powf(q / 100.0) - p,
        (2000.0 - q).powf(0.7) - p,
    ])
}

/// Reaction curves of three Cournot competitors, unknowns q1, q2, q3:
/// q1 = 5 - 0.5 q2 - 0.3 q3, q2 = 7 - 0.6 q1 - 0.1 q3, q3 = 4 - 0.2 q1 - 0.4 q2.
/// Equilibrium: q1 = 1.67, q2 = 5.87, q3 = 1.32
pub fn cournot_reaction(q: &DVector<f64>) -> DVector<f64> {
    DVector::from_vec(vec![
        5.0 - 0.5 * q[1] - 0.3 * q[2] - q[0],
        7.0 - 0.6 * q[0] - 0.1 * q[2] - q[1],
        4.0 - 0.2 * q[0] - 0.4 * q[1] - q[2],
    ])
}

pub fn nonlinear_eqs_examples(example: usize) -> Result<(), Box<dyn Error>> {
    match example {
        0 => {
            // only the function and the initial guess are required, defaults tol = 1e-6, maxiter = 50
            let outcome = newton_raphson(market_equilibrium, DVector::zeros(2), 1e-6, 50)?;
            println!("\nExample 1: Nonlinear Market");
            let trace = outcome.trace().to_table();
            let solution = outcome.into_solution()?;
            println!(
                "Price in the market is {:.3}, and the Quantity Demanded is {:.3}.",
                solution[0], solution[1]
            );
            println!("\n Iteration Output: \n{}", trace);
        }
        1 => {
            let outcome = newton_raphson(cournot_reaction, DVector::zeros(3), 1e-6, 50)?;
            println!("\nExample 2: Cournot competitors");
            let trace = outcome.trace().to_table();
            let solution = outcome.into_solution()?;
            println!(
                "Q1 is {:.3}, Q2 is {:.3}, and Q3 is {:.3}.",
                solution[0], solution[1], solution[2]
            );
            println!("\n Iteration Output: \n{}", trace);
        }
        2 => {
            // verbose way: analytic Jacobian, solver settings, logging and statistics
            let mut NR_instanse = NR::new();
            NR_instanse.set_equation_system(
                Box::new(|x: &DVector<f64>| {
                    DVector::from_vec(vec![x[0] * x[0] + x[1] * x[1] - 10.0, x[0] - x[1] - 4.0])
                }),
                DVector::from_vec(vec![1.0, 1.0]),
                1e-8,
                100,
            )?;
            NR_instanse.set_jacobian(Box::new(|x: &DVector<f64>| {
                DMatrix::from_row_slice(2, 2, &[2.0 * x[0], 2.0 * x[1], 1.0, -1.0])
            }));
            NR_instanse.set_solver_params(
                Some("info".to_string()),
                Some(LinearSysMethod::LU),
                Some(1.0),
                None,
            )?;
            NR_instanse.solve()?;
            println!("result = {:?} \n", NR_instanse.get_result());
            save_trace_to_csv(NR_instanse.get_trace(), Path::new("newton_trace.csv"))?;
        }
        3 => {
            // settings from a task document
            let task = parse_document(
                "
                newton
                tolerance: 1e-8
                max_iterations: 50
                damping_factor: 0.9
                linear_sys_method: inv
                diff_scheme: forward
                initial_guess: 0.0, 0.0
                loglevel: info
                ",
            )?;
            let mut NR_instanse = NR::new();
            NR_instanse.set_equation_system(
                Box::new(market_equilibrium),
                DVector::zeros(2),
                1e-6,
                50,
            )?;
            NR_instanse.set_params_from_task(&task)?;
            let outcome = NR_instanse.solve()?;
            println!(
                "converged = {}, iterations = {}, damping = {}, scheme = {}",
                outcome.is_converged(),
                outcome.iterations(),
                NR_instanse.damping_factor,
                NR_instanse.diff_scheme
            );
        }
        _ => {
            println!("example not found");
        }
    }
    Ok(())
}
