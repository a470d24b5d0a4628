use std::fmt;

/// Error types for the quadrature rules and parameter sweeps
#[derive(Debug, Clone, PartialEq)]
pub enum QuadratureError {
    /// sample count not valid for the rule (Simpson needs an even count, etc.)
    InvalidIntervals {
        rule: String,
        n: usize,
        reason: String,
    },
    /// bounds the rule cannot handle: NaN, infinite bounds of a fixed-sample rule
    InvalidBounds { lower: f64, upper: f64, reason: String },
    /// nodes and weights could not be built
    RuleConstruction(String),
    /// doubling the upper bound never changed the integral by less than the threshold
    TruncationDidNotSettle {
        doublings: usize,
        last_bound: f64,
        last_change: f64,
    },
}

impl fmt::Display for QuadratureError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            QuadratureError::InvalidIntervals { rule, n, reason } => {
                write!(f, "Invalid number of intervals {} for {} rule: {}", n, rule, reason)
            }
            QuadratureError::InvalidBounds {
                lower,
                upper,
                reason,
            } => write!(
                f,
                "Invalid integration bounds [{}, {}]: {}",
                lower, upper, reason
            ),
            QuadratureError::RuleConstruction(msg) => {
                write!(f, "Failed to construct quadrature rule: {}", msg)
            }
            QuadratureError::TruncationDidNotSettle {
                doublings,
                last_bound,
                last_change,
            } => write!(
                f,
                "Integral did not settle after {} doublings of the upper bound (last bound {}, last change {:e})",
                doublings, last_bound, last_change
            ),
        }
    }
}

impl std::error::Error for QuadratureError {}

#[test]
fn test_quadrature_error_display() {
    let e = QuadratureError::InvalidIntervals {
        rule: "simpson".to_string(),
        n: 7,
        reason: "number of intervals must be even".to_string(),
    };
    assert_eq!(
        e.to_string(),
        "Invalid number of intervals 7 for simpson rule: number of intervals must be even"
    );
    let e = QuadratureError::TruncationDidNotSettle {
        doublings: 30,
        last_bound: 50.0,
        last_change: 1.0,
    };
    assert!(e.to_string().contains("30 doublings"));
}
