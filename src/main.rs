#![allow(non_snake_case)]
use RustedNumMethods::Examples::linear_eqs_examples::linear_eqs_examples;
use RustedNumMethods::Examples::nonlinear_eqs_examples::nonlinear_eqs_examples;
use RustedNumMethods::Examples::quadrature_examples::quadrature_examples;
use std::env;

/// cargo run -- <example number>
fn main() {
    let example: usize = env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(0);
    let result = match example {
        // Newton-Raphson
        0..=3 => nonlinear_eqs_examples(example),
        // Gauss-Jacobi, Gauss-Seidel
        10..=13 => linear_eqs_examples(example - 10),
        // quadrature
        20..=22 => quadrature_examples(example - 20),
        _ => {
            println!("example not found");
            Ok(())
        }
    };
    if let Err(e) = result {
        eprintln!("example {} failed: {}", example, e);
        std::process::exit(1);
    }
}
