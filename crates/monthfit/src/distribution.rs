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

//! Chi-squared tail probabilities built from the two Gamma evaluators.
//!
//! `chi_squared_cdf` keeps its historical name but returns the upper tail
//! `1 − γ(k/2, x/2) / Γ(k/2)`, i.e. the p-value of a statistic `x` with `k`
//! degrees of freedom. The regularised lower tail is available separately as
//! [`chi_squared_lower_tail`].

use crate::config::{EngineConfig, PValuePolicy};
use crate::error::{NumericError, NumericResult};
use crate::gamma::{complete_gamma_with, incomplete_lower_gamma_series, SeriesEvaluation};
use tracing::warn;

/// Absolute error in a tail probability above which the series value is not
/// reported as-is under [`PValuePolicy::Clamp`].
pub const P_VALUE_TOLERANCE: f64 = 1e-3;

/// Both Gamma evaluations behind one tail probability.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailEvaluation {
    /// Shape `s = k/2`.
    pub shape: f64,
    /// Series argument `z = x/2`.
    pub z: f64,
    pub lower_gamma: SeriesEvaluation,
    pub complete_gamma: f64,
}
impl TailEvaluation {
    /// γ(k/2, x/2) / Γ(k/2), unclamped.
    pub fn lower_raw(&self) -> f64 {
        self.lower_gamma.value / self.complete_gamma
    }
    /// 1 − γ(k/2, x/2) / Γ(k/2), unclamped.
    pub fn upper_raw(&self) -> f64 {
        1.0 - self.lower_raw()
    }
    /// Error bound of the series carried over to the probability scale.
    pub fn probability_error(&self) -> f64 {
        self.lower_gamma.estimated_error() / self.complete_gamma
    }
    /// Whether the series resolves the tail to within [`P_VALUE_TOLERANCE`].
    pub fn is_resolved(&self) -> bool {
        let error = self.probability_error();
        error.is_finite() && error <= P_VALUE_TOLERANCE && self.upper_raw().is_finite()
    }
    /// Upper tail implied by the position of `z` against the mode of the
    /// distribution, used when the series cannot resolve the tail.
    ///
    /// Past the centre (`z > s`) the upper tail is taken as 0, otherwise 1.
    /// The series only breaks down for large `z`, so in practice this is 0.
    pub fn settled_upper(&self) -> f64 {
        if self.z > self.shape {
            0.0
        } else {
            1.0
        }
    }
    /// Upper tail under `policy`.
    ///
    /// `Raw` returns the series value untouched. `Clamp` returns it clamped
    /// to [0, 1] when the series resolves it, and [`Self::settled_upper`]
    /// when it does not.
    pub fn p_value(&self, policy: PValuePolicy) -> f64 {
        match policy {
            PValuePolicy::Raw => self.upper_raw(),
            PValuePolicy::Clamp if self.is_resolved() => clamp_unit(self.upper_raw()),
            PValuePolicy::Clamp => self.settle(self.settled_upper()),
        }
    }
    /// Regularised lower tail under `policy`, the complement of [`Self::p_value`].
    pub fn lower_tail(&self, policy: PValuePolicy) -> f64 {
        match policy {
            PValuePolicy::Raw => self.lower_raw(),
            PValuePolicy::Clamp if self.is_resolved() => clamp_unit(self.lower_raw()),
            PValuePolicy::Clamp => 1.0 - self.settle(self.settled_upper()),
        }
    }
    fn settle(&self, upper: f64) -> f64 {
        warn!(
            s = self.shape,
            z = self.z,
            raw = self.upper_raw(),
            probability_error = self.probability_error(),
            settled = upper,
            "incomplete Gamma series cannot resolve the tail; settling on the tail z points to"
        );
        upper
    }
}

/// Upper-tail probability with the default engine configuration.
pub fn chi_squared_cdf(x: f64, k: u32) -> NumericResult<f64> {
    chi_squared_cdf_with(x, k, &EngineConfig::default())
}

pub fn chi_squared_cdf_with(x: f64, k: u32, config: &EngineConfig) -> NumericResult<f64> {
    let gamma = complete_gamma_with(half_dof(k)?, config)?;
    let tail = evaluate_tail(x, k, gamma, config.series_terms)?;
    Ok(tail.p_value(config.p_value_policy))
}

/// Regularised lower tail P(k/2, x/2); zero at x = 0 and non-decreasing in x.
pub fn chi_squared_lower_tail(x: f64, k: u32) -> NumericResult<f64> {
    chi_squared_lower_tail_with(x, k, &EngineConfig::default())
}

pub fn chi_squared_lower_tail_with(x: f64, k: u32, config: &EngineConfig) -> NumericResult<f64> {
    let gamma = complete_gamma_with(half_dof(k)?, config)?;
    let tail = evaluate_tail(x, k, gamma, config.series_terms)?;
    Ok(tail.lower_tail(config.p_value_policy))
}

/// Evaluates the tail for a precomputed Γ(k/2), so callers can reuse one
/// Gamma integral across many statistics.
pub fn evaluate_tail(
    x: f64,
    k: u32,
    complete_gamma: f64,
    terms: usize,
) -> NumericResult<TailEvaluation> {
    let s = half_dof(k)?;
    if !x.is_finite() || x < 0.0 {
        return Err(NumericError::invalid(
            "x",
            x,
            "statistic must be finite and non-negative",
        ));
    }
    Ok(TailEvaluation {
        shape: s,
        z: x / 2.0,
        lower_gamma: incomplete_lower_gamma_series(s, x / 2.0, terms),
        complete_gamma,
    })
}

pub(crate) fn half_dof(k: u32) -> NumericResult<f64> {
    if k == 0 {
        return Err(NumericError::invalid(
            "k",
            0.0,
            "degrees of freedom must be positive",
        ));
    }
    Ok(f64::from(k) / 2.0)
}

fn clamp_unit(raw: f64) -> f64 {
    let clamped = raw.clamp(0.0, 1.0);
    if clamped != raw {
        warn!(raw = raw, clamped = clamped, "tail probability left [0, 1]; clamping");
    }
    clamped
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn upper_tail_is_one_at_zero() {
        for k in [1, 2, 5, 11] {
            assert!((chi_squared_cdf(0.0, k).unwrap() - 1.0).abs() < 1e-12);
            assert!(chi_squared_lower_tail(0.0, k).unwrap().abs() < 1e-12);
        }
    }

    #[test]
    fn two_dof_matches_exponential() {
        // χ²(2) upper tail is e^(−x/2)
        let p = chi_squared_cdf(2.0, 2).unwrap();
        assert!((p - (-1.0_f64).exp()).abs() < 1e-4);
    }

    #[test]
    fn eleven_dof_critical_value() {
        // χ²(11, 0.95) = 19.675
        let p = chi_squared_cdf(19.675, 11).unwrap();
        assert!((p - 0.05).abs() < 1e-4, "p = {p}");
    }

    #[test]
    fn rejects_invalid_arguments() {
        assert!(chi_squared_cdf(1.0, 0).is_err());
        assert!(chi_squared_cdf(-1.0, 3).is_err());
        assert!(chi_squared_cdf(f64::INFINITY, 3).is_err());
    }

    #[test]
    fn raw_policy_passes_through_unreliable_values() {
        let gamma = complete_gamma_with(5.5, &EngineConfig::default()).unwrap();
        let tail = evaluate_tail(120.0, 11, gamma, 100).unwrap();
        assert!(!tail.is_resolved());
        assert!(tail.p_value(PValuePolicy::Raw) > 1.0);
    }

    #[test]
    fn unresolved_far_tail_settles_to_zero() {
        // z = 60 against s = 5.5: the 100-term series ends on a huge term
        let gamma = complete_gamma_with(5.5, &EngineConfig::default()).unwrap();
        let tail = evaluate_tail(120.0, 11, gamma, 100).unwrap();
        assert_eq!(tail.p_value(PValuePolicy::Clamp), 0.0);
        assert_eq!(tail.lower_tail(PValuePolicy::Clamp), 1.0);
    }

    #[test]
    fn resolved_tail_is_reported_as_is() {
        let gamma = complete_gamma_with(5.5, &EngineConfig::default()).unwrap();
        let tail = evaluate_tail(7.0902, 11, gamma, 100).unwrap();
        assert!(tail.is_resolved());
        assert_eq!(tail.p_value(PValuePolicy::Clamp), tail.upper_raw());
        assert!((tail.p_value(PValuePolicy::Clamp) - 0.7917).abs() < 1e-3);
    }

    #[test]
    fn lower_tail_honours_custom_config() {
        let serial = EngineConfig::default().with_parallel(false);
        let raw = serial.clone().with_p_value_policy(PValuePolicy::Raw);
        let default = chi_squared_lower_tail(19.675, 11).unwrap();
        let custom = chi_squared_lower_tail_with(19.675, 11, &serial).unwrap();
        assert!((default - 0.95).abs() < 1e-4);
        assert!((custom - default).abs() < 1e-9);

        let clamped = chi_squared_lower_tail_with(120.0, 11, &serial).unwrap();
        let unclamped = chi_squared_lower_tail_with(120.0, 11, &raw).unwrap();
        assert_eq!(clamped, 1.0);
        assert!(unclamped < 0.0);

        let coarse = EngineConfig::default().with_series_terms(2);
        let truncated = chi_squared_lower_tail_with(6.0, 2, &coarse).unwrap();
        assert!((truncated - chi_squared_lower_tail(6.0, 2).unwrap()).abs() > 1e-3);
    }

    fn gamma_for(k: u32) -> f64 {
        complete_gamma_with(f64::from(k) / 2.0, &EngineConfig::default()).unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn tails_are_monotone(k in 1u32..=12, x in 0.0f64..20.0, dx in 0.01f64..5.0) {
            let gamma = gamma_for(k);
            let here = evaluate_tail(x, k, gamma, 100).unwrap();
            let there = evaluate_tail(x + dx, k, gamma, 100).unwrap();
            prop_assert!(there.upper_raw() <= here.upper_raw() + 1e-6);
            prop_assert!(there.lower_raw() + 1e-6 >= here.lower_raw());
        }
    }
}
