use crate::numerical::quadrature::adaptive_quad::{QuadOptions, adaptive_quad};
use crate::numerical::quadrature::param_sweep::{
    Integrator, QuadRule, TruncationSettings, integrate_over_params,
};
use nalgebra::DVector;
use std::error::Error;
use std::f64::consts::PI;
use strum::IntoEnumIterator;
use tabled::{builder::Builder, settings::Style};

/// exp(-(p0 + p1) x) * x^p2, its integral over [0, inf) is Gamma(p2 + 1)/(p0 + p1)^(p2 + 1)
pub fn decay_integrand(x: f64, p: &DVector<f64>) -> f64 {
    (-(p[0] + p[1]) * x).exp() * x.powf(p[2])
}

/// parameter vectors [0.04, lambda, 0.5] for each lambda
pub fn lambda_params(lambdas: &[f64]) -> Vec<DVector<f64>> {
    lambdas
        .iter()
        .map(|lam| DVector::from_vec(vec![0.04, *lam, 0.5]))
        .collect()
}

pub fn quadrature_examples(example: usize) -> Result<(), Box<dyn Error>> {
    match example {
        0 => {
            // every rule on int_0^pi sin(x) dx = 2
            let mut builder = Builder::default();
            builder.push_record(["rule", "n", "integral", "error"]);
            for rule in QuadRule::iter() {
                for n in [4, 8, 16] {
                    let integrator = Integrator::new(rule, n)?;
                    let value = integrator.integrate(&f64::sin, 0.0, PI)?;
                    builder.push_record([
                        rule.to_string(),
                        n.to_string(),
                        format!("{:.10}", value),
                        format!("{:.3e}", (value - 2.0).abs()),
                    ]);
                }
            }
            let mut table = builder.build();
            table.with(Style::modern_rounded());
            println!("{}", table);
        }
        1 => {
            // the same integral over [0, inf) for a range of lambdas with every rule
            let lambdas: Vec<f64> = (1..=5).map(|i| 0.2 * i as f64).collect();
            let params = lambda_params(&lambdas);
            let mut builder = Builder::default();
            let mut header = vec!["rule".to_string()];
            header.extend(lambdas.iter().map(|l| format!("lambda = {:.1}", l)));
            builder.push_record(header);
            for rule in QuadRule::iter() {
                let n = match rule {
                    QuadRule::GaussLegendre | QuadRule::GaussChebyshev => 200,
                    _ => 1000,
                };
                let integrator = Integrator::new(rule, n)?;
                let values =
                    integrate_over_params(&integrator, decay_integrand, &params, 0.0, f64::INFINITY)?;
                let mut row = vec![rule.to_string()];
                row.extend(values.iter().map(|v| format!("{:.6}", v)));
                builder.push_record(row);
            }
            let gamma_3_2 = PI.sqrt() / 2.0;
            let mut exact = vec!["exact".to_string()];
            exact.extend(
                lambdas
                    .iter()
                    .map(|l| format!("{:.6}", gamma_3_2 / (0.04 + l).powf(1.5))),
            );
            builder.push_record(exact);
            let mut table = builder.build();
            table.with(Style::modern_rounded());
            println!("{}", table);
        }
        2 => {
            // truncation of the infinite bound with a tighter threshold
            let integrator = Integrator::new(QuadRule::Simpson, 2000)?.with_truncation(
                TruncationSettings {
                    threshold: 1e-6,
                    ..TruncationSettings::default()
                },
            );
            let value = integrator.integrate(&|x: f64| (-x * x).exp(), 0.0, f64::INFINITY)?;
            println!("int_0^inf exp(-x^2) dx = {}, exact {}", value, PI.sqrt() / 2.0);
            let res = adaptive_quad(
                |x: f64| (-x * x).exp(),
                f64::NEG_INFINITY,
                f64::INFINITY,
                &QuadOptions::default(),
            )?;
            println!("int_-inf^inf exp(-x^2) dx = {:?}", res);
        }
        _ => {
            println!("example not found");
        }
    }
    Ok(())
}
