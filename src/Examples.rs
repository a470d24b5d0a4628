//! examples of usage of RustedNumMethods
/// Gauss-Jacobi and Gauss-Seidel examples
pub mod linear_eqs_examples;
/// Newton-Raphson examples: nonlinear market, Cournot competitors
pub mod nonlinear_eqs_examples;
/// quadrature rules and parameter sweeps
pub mod quadrature_examples;
