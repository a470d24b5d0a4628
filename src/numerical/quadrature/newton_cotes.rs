//! Composite Newton-Cotes rules on n equal bins of width h = (b - a)/n:
//! * trapezoid: h * (f(a)/2 + f(a + h) + ... + f(b - h) + f(b)/2), error O(h^2)
//! * Simpson:   h/3 * (f(a) + 4 f(a + h) + 2 f(a + 2h) + ... + 4 f(b - h) + f(b)), error O(h^4),
//!   n must be even
use crate::numerical::quadrature::quad_errors::QuadratureError;

fn check_bounds(a: f64, b: f64) -> Result<(), QuadratureError> {
    if !a.is_finite() || !b.is_finite() {
        return Err(QuadratureError::InvalidBounds {
            lower: a,
            upper: b,
            reason: "fixed-sample rules need finite bounds".to_string(),
        });
    }
    Ok(())
}

pub fn trapezoid<F>(f: F, a: f64, b: f64, n: usize) -> Result<f64, QuadratureError>
where
    F: Fn(f64) -> f64,
{
    check_bounds(a, b)?;
    if n == 0 {
        return Err(QuadratureError::InvalidIntervals {
            rule: "trapezoid".to_string(),
            n,
            reason: "at least one interval is needed".to_string(),
        });
    }
    let h = (b - a) / n as f64;
    let inner: f64 = (1..n).map(|i| f(a + i as f64 * h)).sum();
    Ok(h * (0.5 * (f(a) + f(b)) + inner))
}

pub fn simpson<F>(f: F, a: f64, b: f64, n: usize) -> Result<f64, QuadratureError>
where
    F: Fn(f64) -> f64,
{
    check_bounds(a, b)?;
    if n < 2 || n % 2 != 0 {
        return Err(QuadratureError::InvalidIntervals {
            rule: "simpson".to_string(),
            n,
            reason: "number of intervals must be even and at least 2".to_string(),
        });
    }
    let h = (b - a) / n as f64;
    let inner: f64 = (1..n)
        .map(|i| {
            let weight = if i % 2 == 0 { 2.0 } else { 4.0 };
            weight * f(a + i as f64 * h)
        })
        .sum();
    Ok(h / 3.0 * (f(a) + inner + f(b)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    #[test]
    fn test_trapezoid_sin() {
        assert_relative_eq!(trapezoid(f64::sin, 0.0, PI, 4).unwrap(), 1.896119, epsilon = 1e-6);
        assert_relative_eq!(trapezoid(f64::sin, 0.0, PI, 16).unwrap(), 2.0, epsilon = 1e-2);
        // second order: doubling n divides the error by about 4
        let e8 = (2.0 - trapezoid(f64::sin, 0.0, PI, 8).unwrap()).abs();
        let e16 = (2.0 - trapezoid(f64::sin, 0.0, PI, 16).unwrap()).abs();
        assert_relative_eq!(e8 / e16, 4.0, epsilon = 0.05);
    }

    #[test]
    fn test_simpson_beats_trapezoid() {
        for n in [4, 8, 16, 64] {
            let t = trapezoid(f64::sin, 0.0, PI, n).unwrap();
            let s = simpson(f64::sin, 0.0, PI, n).unwrap();
            assert!((s - 2.0).abs() < (t - 2.0).abs());
        }
        assert_relative_eq!(simpson(f64::sin, 0.0, PI, 16).unwrap(), 2.0, epsilon = 2e-5);
    }

    #[test]
    fn test_simpson_exact_for_cubics() {
        let cubic = |x: f64| x * x * x - 2.0 * x + 1.0;
        // antiderivative x^4/4 - x^2 + x on [0, 2] = 4 - 4 + 2
        assert_relative_eq!(simpson(cubic, 0.0, 2.0, 2).unwrap(), 2.0, epsilon = 1e-14);
    }

    #[test]
    fn test_reversed_and_empty_interval() {
        let forward = trapezoid(f64::exp, 0.0, 1.0, 100).unwrap();
        let backward = trapezoid(f64::exp, 1.0, 0.0, 100).unwrap();
        assert_relative_eq!(forward, -backward, epsilon = 1e-14);
        assert_eq!(simpson(f64::exp, 3.0, 3.0, 10).unwrap(), 0.0);
    }

    #[test]
    fn test_invalid_input() {
        assert!(matches!(
            simpson(f64::sin, 0.0, 1.0, 7),
            Err(QuadratureError::InvalidIntervals { n: 7, .. })
        ));
        assert!(matches!(
            trapezoid(f64::sin, 0.0, 1.0, 0),
            Err(QuadratureError::InvalidIntervals { .. })
        ));
        assert!(matches!(
            trapezoid(f64::sin, 0.0, f64::INFINITY, 10),
            Err(QuadratureError::InvalidBounds { .. })
        ));
    }
}
