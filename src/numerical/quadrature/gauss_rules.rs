//! Gaussian rules: nodes x_i and weights w_i on [-1, 1], mapped to [a, b] by
//! y = (x + 1)(b - a)/2 + a, so that  I = (b - a)/2 * sum w_i g(y_i).
//!
//! Gauss-Legendre nodes and weights come from the `gauss-quad` crate.
//! Gauss-Chebyshev (first kind) integrates f(x)/sqrt(1 - x^2) exactly for polynomial f, its nodes
//! are x_i = cos((2i - 1)pi/2n) and all weights equal pi/n. To approximate plain int f the
//! integrand is multiplied back by sqrt(1 - x_i^2).
use crate::numerical::quadrature::quad_errors::QuadratureError;
use gauss_quad::GaussLegendre;
use std::f64::consts::PI;

pub struct GaussLegendreRule {
    rule: GaussLegendre,
    n: usize,
}

impl GaussLegendreRule {
    /// n-point rule, n >= 2
    pub fn new(n: usize) -> Result<GaussLegendreRule, QuadratureError> {
        if n < 2 {
            return Err(QuadratureError::InvalidIntervals {
                rule: "gauss-legendre".to_string(),
                n,
                reason: "at least 2 nodes are needed".to_string(),
            });
        }
        let rule = GaussLegendre::new(n)
            .map_err(|e| QuadratureError::RuleConstruction(format!("{:?}", e)))?;
        Ok(GaussLegendreRule { rule, n })
    }

    pub fn degree(&self) -> usize {
        self.n
    }

    pub fn integrate<F>(&self, f: F, a: f64, b: f64) -> f64
    where
        F: Fn(f64) -> f64,
    {
        self.rule.integrate(a, b, f)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaussChebyshevRule {
    nodes: Vec<f64>,
    weights: Vec<f64>,
}

impl GaussChebyshevRule {
    pub fn new(n: usize) -> Result<GaussChebyshevRule, QuadratureError> {
        if n == 0 {
            return Err(QuadratureError::InvalidIntervals {
                rule: "gauss-chebyshev".to_string(),
                n,
                reason: "at least 1 node is needed".to_string(),
            });
        }
        let nodes = (1..=n)
            .map(|i| ((2 * i - 1) as f64 * PI / (2 * n) as f64).cos())
            .collect();
        let weights = vec![PI / n as f64; n];
        Ok(GaussChebyshevRule { nodes, weights })
    }

    pub fn nodes(&self) -> &[f64] {
        &self.nodes
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn integrate<F>(&self, f: F, a: f64, b: f64) -> f64
    where
        F: Fn(f64) -> f64,
    {
        let m = (b - a) / 2.0;
        let sum: f64 = self
            .nodes
            .iter()
            .zip(&self.weights)
            .map(|(x, w)| {
                let y = (x + 1.0) * m + a;
                w * f(y) * (1.0 - x * x).sqrt()
            })
            .sum();
        sum * m
    }
}
