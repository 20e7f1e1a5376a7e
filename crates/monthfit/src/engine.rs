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

use crate::calculator::{chi_squared_statistic, CategoryCounts, FitReport, TestResult};
use crate::config::{EngineConfig, PValuePolicy};
use crate::distribution::{evaluate_tail, half_dof, TailEvaluation};
use crate::error::{NumericError, NumericResult, Result, ValidationError};
use crate::expected::{expected_frequencies, MONTHS};
use crate::gamma::complete_gamma_with;
use crate::sample::{ObservedSample, RawLabel};
use dashmap::DashMap;
use tracing::{debug, warn};

/// Relative accuracy below which the incomplete Gamma series is reported.
const SERIES_TOLERANCE: f64 = 1e-6;

/// Month-weighted chi-squared goodness-of-fit engine.
///
/// Γ(k/2) costs a million integrand evaluations, so results are memoised per
/// argument for the lifetime of the engine.
pub struct GoodnessOfFit {
    config: EngineConfig,
    gamma_cache: DashMap<u64, f64>,
}
impl GoodnessOfFit {
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            gamma_cache: DashMap::new(),
        }
    }
    pub fn with_config(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            gamma_cache: DashMap::new(),
        })
    }
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn complete_gamma(&self, x: f64) -> NumericResult<f64> {
        let key = x.to_bits();
        if let Some(cached) = self.gamma_cache.get(&key) {
            return Ok(*cached);
        }
        let value = complete_gamma_with(x, &self.config)?;
        debug!(x, value, "complete Gamma evaluated");
        self.gamma_cache.insert(key, value);
        Ok(value)
    }

    /// Upper-tail probability of `statistic` under χ²(dof).
    pub fn p_value(&self, statistic: f64, dof: u32) -> NumericResult<f64> {
        Ok(self.tail(statistic, dof)?.p_value(self.config.p_value_policy))
    }

    /// Both Gamma evaluations for `statistic` under χ²(dof), with Γ(dof/2)
    /// taken from the cache.
    pub fn tail(&self, statistic: f64, dof: u32) -> NumericResult<TailEvaluation> {
        let gamma = self.complete_gamma(half_dof(dof)?)?;
        let tail = evaluate_tail(statistic, dof, gamma, self.config.series_terms)?;
        // unresolved tails under Clamp are reported when they are settled
        let settles = !tail.is_resolved() && self.config.p_value_policy == PValuePolicy::Clamp;
        if !tail.lower_gamma.is_reliable(SERIES_TOLERANCE) && !settles {
            warn!(
                statistic,
                dof,
                largest_term = tail.lower_gamma.largest_term,
                estimated_error = tail.lower_gamma.estimated_error(),
                "incomplete Gamma series outside its reliable range; p-value is approximate"
            );
        }
        Ok(tail)
    }

    pub fn compute(&self, observed: &[RawLabel], num_cats: usize) -> Result<TestResult> {
        Ok(self.compute_detailed(observed, num_cats)?.result)
    }

    pub fn compute_detailed(&self, observed: &[RawLabel], num_cats: usize) -> Result<FitReport> {
        if num_cats != MONTHS {
            return Err(ValidationError::UnsupportedCategoryCount { num_cats }.into());
        }
        let sample = ObservedSample::validate(observed, num_cats)?;
        self.evaluate(&sample)
    }

    pub fn evaluate(&self, sample: &ObservedSample) -> Result<FitReport> {
        let counts = CategoryCounts::tally(sample);
        let expected = expected_frequencies(sample.len());
        let cells = counts.cells(&expected);
        let statistic = chi_squared_statistic(&cells);
        let degrees_of_freedom = u32::try_from(counts.len().saturating_sub(1)).map_err(|_| {
            NumericError::invalid(
                "degrees_of_freedom",
                counts.len() as f64,
                "too many categories",
            )
        })?;
        debug!(
            observations = sample.len(),
            statistic, degrees_of_freedom, "chi-squared statistic computed"
        );
        let tail = self.tail(statistic, degrees_of_freedom)?;
        Ok(FitReport {
            result: TestResult {
                statistic,
                degrees_of_freedom,
                p_value: tail.p_value(self.config.p_value_policy),
            },
            series_unresolved: !tail.is_resolved(),
            cells,
        })
    }
}
impl Default for GoodnessOfFit {
    fn default() -> Self {
        Self::new()
    }
}
