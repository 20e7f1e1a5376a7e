// SPDX-License-Identifier: AGPL-3.0-only
// Copyright (C) 2024 Jonathan Lee
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License version 3
// as published by the Free Software Foundation.
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.
// See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see https://www.gnu.org/licenses/.

//! Numerical Gamma evaluators.
//!
//! Both routines are plain fixed-cost evaluations: a left Riemann sum for the complete
//! Gamma function and a fixed-length alternating power series for the lower
//! incomplete Gamma function.
//!
//! # Limitations
//!
//! The series loses precision to cancellation once `z` grows past roughly
//! 20 (the exact point depends on `s`); by `z ≈ 50` it no longer converges in
//! 100 terms. [`SeriesEvaluation`] reports how much of the result can be
//! trusted so callers can decide what to do about it.

use crate::config::EngineConfig;
use crate::error::{NumericError, NumericResult};
use rayon::prelude::*;

/// Γ(x) with the default grid (U = 100, Δt = 1e-4).
pub fn complete_gamma(x: f64) -> NumericResult<f64> {
    complete_gamma_with(x, &EngineConfig::default())
}

/// Γ(x) ≈ Σ Δt · t^(x−1) · e^(−t) for t = 0, Δt, 2Δt, … ≤ U.
///
/// For 0 < x < 1 the integrand is unbounded at t = 0, so the sum is taken
/// for x + 1 and divided by x.
pub fn complete_gamma_with(x: f64, config: &EngineConfig) -> NumericResult<f64> {
    if !x.is_finite() || x <= 0.0 {
        return Err(NumericError::invalid(
            "x",
            x,
            "complete Gamma is only evaluated for finite x > 0",
        ));
    }
    if x < 1.0 {
        return Ok(riemann_sum(x + 1.0, config) / x);
    }
    Ok(riemann_sum(x, config))
}

fn riemann_sum(x: f64, config: &EngineConfig) -> f64 {
    let dt = config.gamma_step;
    let steps = config.gamma_steps();
    let sample = |i: usize| integrand(x, i as f64 * dt);
    let total: f64 = if config.parallel {
        (0..=steps).into_par_iter().map(sample).sum()
    } else {
        (0..=steps).map(sample).sum()
    };
    total * dt
}

/// t^(x−1) · e^(−t), evaluated in log space so large x does not overflow.
fn integrand(x: f64, t: f64) -> f64 {
    if t == 0.0 {
        return if x == 1.0 { 1.0 } else { 0.0 };
    }
    ((x - 1.0) * t.ln() - t).exp()
}

/// Result of the truncated incomplete Gamma series plus what it costs in accuracy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesEvaluation {
    pub value: f64,
    /// Largest |term| seen; its rounding error survives the cancellation.
    pub largest_term: f64,
    /// |term| of the final term kept; bounds the truncation error.
    pub last_term: f64,
    pub terms: usize,
}
impl SeriesEvaluation {
    pub fn estimated_error(&self) -> f64 {
        self.largest_term * f64::EPSILON * self.terms as f64 + self.last_term
    }
    pub fn is_reliable(&self, relative_tolerance: f64) -> bool {
        self.estimated_error() <= relative_tolerance * self.value.abs()
    }
}

/// γ(s, z) with the reference 100-term series.
pub fn incomplete_lower_gamma(s: f64, z: f64) -> f64 {
    incomplete_lower_gamma_series(s, z, EngineConfig::default().series_terms).value
}

/// γ(s, z) ≈ Σ_{k<terms} (−1)^k / k! · z^(s+k) / (s+k).
///
/// Expects s > 0 and z ≥ 0; see the module docs for where the result stops
/// being trustworthy.
pub fn incomplete_lower_gamma_series(s: f64, z: f64, terms: usize) -> SeriesEvaluation {
    // z^(s+k) / k!, advanced by z / (k + 1) each step
    let mut power = z.powf(s);
    let mut sign = 1.0;
    let mut value = 0.0;
    let mut largest_term: f64 = 0.0;
    let mut last_term = 0.0;
    for k in 0..terms {
        let magnitude = power / (s + k as f64);
        value += sign * magnitude;
        largest_term = largest_term.max(magnitude);
        last_term = magnitude;
        power *= z / (k + 1) as f64;
        sign = -sign;
    }
    SeriesEvaluation {
        value,
        largest_term,
        last_term,
        terms,
    }
}
