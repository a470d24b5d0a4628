//! numerical integration of functions of one variable
pub mod adaptive_quad;
pub mod gauss_rules;
/// trapezoid and Simpson rules
pub mod newton_cotes;
/// one integrand over many parameter vectors, truncation of infinite upper bounds
pub mod param_sweep;
pub mod quad_errors;
