//! Integration of a parametrized integrand f(x, p) over a list of parameter vectors.
//!
//! An `Integrator` holds one prepared rule (Gauss nodes are computed once) and is reused for every
//! parameter vector. A fixed-sample rule cannot take an infinite upper bound directly, so the
//! integral is truncated: starting from b = max(b0, lower + b0) the bound is doubled until two
//! successive integrals differ by no more than the threshold, and the integral over the last bound
//! is returned. The adaptive rule maps infinite intervals itself.
//! ```
//! use RustedNumMethods::numerical::quadrature::param_sweep::{Integrator, QuadRule, integrate_over_params};
//! use nalgebra::DVector;
//! let integrator = Integrator::new(QuadRule::Simpson, 1000).unwrap();
//! let params: Vec<DVector<f64>> = [0.5, 1.0].iter().map(|k| DVector::from_vec(vec![*k])).collect();
//! let f = |x: f64, p: &DVector<f64>| (-p[0] * x).exp();
//! let res = integrate_over_params(&integrator, f, &params, 0.0, f64::INFINITY).unwrap();
//! assert!((res[0] - 2.0).abs() < 1e-3 && (res[1] - 1.0).abs() < 1e-3);
//! ```
use crate::numerical::quadrature::adaptive_quad::{QuadOptions, adaptive_quad};
use crate::numerical::quadrature::gauss_rules::{GaussChebyshevRule, GaussLegendreRule};
use crate::numerical::quadrature::newton_cotes::{simpson, trapezoid};
use crate::numerical::quadrature::quad_errors::QuadratureError;
use log::{debug, info};
use nalgebra::DVector;
use strum_macros::{Display, EnumIter, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum QuadRule {
    Trapezoid,
    Simpson,
    GaussLegendre,
    GaussChebyshev,
    Adaptive,
}

/// doubling of a truncated infinite upper bound
#[derive(Debug, Clone, PartialEq)]
pub struct TruncationSettings {
    /// first finite bound is max(initial_bound, lower + initial_bound)
    pub initial_bound: f64,
    /// stop when |I(2b) - I(b)| <= threshold
    pub threshold: f64,
    pub max_doublings: usize,
}

impl Default for TruncationSettings {
    fn default() -> Self {
        TruncationSettings {
            initial_bound: 50.0,
            threshold: 0.01,
            max_doublings: 30,
        }
    }
}

enum PreparedRule {
    Trapezoid(usize),
    Simpson(usize),
    GaussLegendre(GaussLegendreRule),
    GaussChebyshev(GaussChebyshevRule),
    Adaptive(QuadOptions),
}

pub struct Integrator {
    rule: PreparedRule,
    truncation: TruncationSettings,
}

impl Integrator {
    /// `n` is the number of bins for trapezoid and Simpson, the number of nodes for the Gauss rules
    /// and is ignored by the adaptive rule (default options)
    pub fn new(rule: QuadRule, n: usize) -> Result<Integrator, QuadratureError> {
        let rule = match rule {
            QuadRule::Trapezoid => {
                if n == 0 {
                    return Err(QuadratureError::InvalidIntervals {
                        rule: rule.to_string(),
                        n,
                        reason: "at least one interval is needed".to_string(),
                    });
                }
                PreparedRule::Trapezoid(n)
            }
            QuadRule::Simpson => {
                if n < 2 || n % 2 != 0 {
                    return Err(QuadratureError::InvalidIntervals {
                        rule: rule.to_string(),
                        n,
                        reason: "number of intervals must be even and at least 2".to_string(),
                    });
                }
                PreparedRule::Simpson(n)
            }
            QuadRule::GaussLegendre => PreparedRule::GaussLegendre(GaussLegendreRule::new(n)?),
            QuadRule::GaussChebyshev => PreparedRule::GaussChebyshev(GaussChebyshevRule::new(n)?),
            QuadRule::Adaptive => PreparedRule::Adaptive(QuadOptions::default()),
        };
        Ok(Integrator {
            rule,
            truncation: TruncationSettings::default(),
        })
    }

    pub fn adaptive(options: QuadOptions) -> Integrator {
        Integrator {
            rule: PreparedRule::Adaptive(options),
            truncation: TruncationSettings::default(),
        }
    }

    pub fn with_truncation(mut self, truncation: TruncationSettings) -> Integrator {
        self.truncation = truncation;
        self
    }

    pub fn rule(&self) -> QuadRule {
        match self.rule {
            PreparedRule::Trapezoid(_) => QuadRule::Trapezoid,
            PreparedRule::Simpson(_) => QuadRule::Simpson,
            PreparedRule::GaussLegendre(_) => QuadRule::GaussLegendre,
            PreparedRule::GaussChebyshev(_) => QuadRule::GaussChebyshev,
            PreparedRule::Adaptive(_) => QuadRule::Adaptive,
        }
    }

    pub fn truncation(&self) -> &TruncationSettings {
        &self.truncation
    }

    /// integral over [a, b] with finite bounds (any bounds for the adaptive rule)
    pub fn integrate_finite<F>(&self, f: &F, a: f64, b: f64) -> Result<f64, QuadratureError>
    where
        F: Fn(f64) -> f64,
    {
        if !matches!(self.rule, PreparedRule::Adaptive(_)) && !(a.is_finite() && b.is_finite()) {
            return Err(QuadratureError::InvalidBounds {
                lower: a,
                upper: b,
                reason: format!("{} rule needs finite bounds", self.rule()),
            });
        }
        match &self.rule {
            PreparedRule::Trapezoid(n) => trapezoid(f, a, b, *n),
            PreparedRule::Simpson(n) => simpson(f, a, b, *n),
            PreparedRule::GaussLegendre(rule) => Ok(rule.integrate(f, a, b)),
            PreparedRule::GaussChebyshev(rule) => Ok(rule.integrate(f, a, b)),
            PreparedRule::Adaptive(options) => Ok(adaptive_quad(f, a, b, options)?.integral),
        }
    }

    /// integral over [lower, upper]; upper = +inf is truncated by doubling for fixed-sample rules
    pub fn integrate<F>(&self, f: &F, lower: f64, upper: f64) -> Result<f64, QuadratureError>
    where
        F: Fn(f64) -> f64,
    {
        if lower.is_nan() || upper.is_nan() {
            return Err(QuadratureError::InvalidBounds {
                lower,
                upper,
                reason: "bounds must not be NaN".to_string(),
            });
        }
        if matches!(self.rule, PreparedRule::Adaptive(_)) {
            return self.integrate_finite(f, lower, upper);
        }
        if !lower.is_finite() {
            return Err(QuadratureError::InvalidBounds {
                lower,
                upper,
                reason: format!("{} rule needs a finite lower bound", self.rule()),
            });
        }
        if upper == f64::INFINITY {
            self.integrate_truncated(f, lower)
        } else {
            self.integrate_finite(f, lower, upper)
        }
    }

    fn integrate_truncated<F>(&self, f: &F, lower: f64) -> Result<f64, QuadratureError>
    where
        F: Fn(f64) -> f64,
    {
        let settings = &self.truncation;
        let mut bound = settings.initial_bound.max(lower + settings.initial_bound);
        let mut integral = self.integrate_finite(f, lower, bound)?;
        let mut change = f64::INFINITY;
        for doubling in 1..=settings.max_doublings {
            let new_bound = 2.0 * bound;
            let new_integral = self.integrate_finite(f, lower, new_bound)?;
            change = (new_integral - integral).abs();
            debug!(
                "doubling {}: upper bound {} -> {}, change {:e}",
                doubling, bound, new_bound, change
            );
            if change <= settings.threshold {
                info!(
                    "infinite upper bound truncated at {} after {} doublings",
                    new_bound, doubling
                );
                return Ok(new_integral);
            }
            bound = new_bound;
            integral = new_integral;
        }
        Err(QuadratureError::TruncationDidNotSettle {
            doublings: settings.max_doublings,
            last_bound: bound,
            last_change: change,
        })
    }
}

/// int_lower^upper f(x, p) dx for every parameter vector p, in the order of `params`
pub fn integrate_over_params<F>(
    integrator: &Integrator,
    f: F,
    params: &[DVector<f64>],
    lower: f64,
    upper: f64,
) -> Result<DVector<f64>, QuadratureError>
where
    F: Fn(f64, &DVector<f64>) -> f64,
{
    let mut solution = DVector::zeros(params.len());
    for (i, p) in params.iter().enumerate() {
        let integrand = |x: f64| f(x, p);
        solution[i] = integrator.integrate(&integrand, lower, upper)?;
    }
    Ok(solution)
}
