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

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

pub const ENV_GAMMA_UPPER_BOUND: &str = "MONTHFIT_GAMMA_UPPER_BOUND";
pub const ENV_GAMMA_STEP: &str = "MONTHFIT_GAMMA_STEP";
pub const ENV_SERIES_TERMS: &str = "MONTHFIT_SERIES_TERMS";
pub const ENV_PARALLEL: &str = "MONTHFIT_PARALLEL";
pub const ENV_P_VALUE_POLICY: &str = "MONTHFIT_P_VALUE_POLICY";

/// Largest Riemann grid `validate` accepts, in samples after t = 0.
pub const MAX_GAMMA_STEPS: f64 = 1e9;

/// What to do with a p-value the two Gamma approximations push outside [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PValuePolicy {
    #[default]
    Clamp,
    Raw,
}
impl PValuePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "clamp" => Some(PValuePolicy::Clamp),
            "raw" => Some(PValuePolicy::Raw),
            _ => None,
        }
    }
}

/// Numeric knobs for the Gamma evaluators.
///
/// The defaults reproduce the reference behaviour: a Riemann sum up to
/// t = 100 in steps of 1e-4, and a 100-term incomplete Gamma series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub gamma_upper_bound: f64,
    pub gamma_step: f64,
    pub series_terms: usize,
    pub parallel: bool,
    pub p_value_policy: PValuePolicy,
}
impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            gamma_upper_bound: 100.0,
            gamma_step: 1e-4,
            series_terms: 100,
            parallel: true,
            p_value_policy: PValuePolicy::Clamp,
        }
    }
}
impl EngineConfig {
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
    pub fn with_p_value_policy(mut self, policy: PValuePolicy) -> Self {
        self.p_value_policy = policy;
        self
    }
    pub fn with_gamma_grid(mut self, upper_bound: f64, step: f64) -> Self {
        self.gamma_upper_bound = upper_bound;
        self.gamma_step = step;
        self
    }
    pub fn with_series_terms(mut self, terms: usize) -> Self {
        self.series_terms = terms;
        self
    }

    /// Defaults overridden by any `MONTHFIT_*` variables present in the process environment.
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(raw) = lookup(ENV_GAMMA_UPPER_BOUND) {
            config.gamma_upper_bound = parse_field(ENV_GAMMA_UPPER_BOUND, &raw)?;
        }
        if let Some(raw) = lookup(ENV_GAMMA_STEP) {
            config.gamma_step = parse_field(ENV_GAMMA_STEP, &raw)?;
        }
        if let Some(raw) = lookup(ENV_SERIES_TERMS) {
            config.series_terms = parse_field(ENV_SERIES_TERMS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_PARALLEL) {
            config.parallel = match raw.trim().to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => return Err(invalid(ENV_PARALLEL, &raw)),
            };
        }
        if let Some(raw) = lookup(ENV_P_VALUE_POLICY) {
            config.p_value_policy =
                PValuePolicy::parse(&raw).ok_or_else(|| invalid(ENV_P_VALUE_POLICY, &raw))?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if !self.gamma_upper_bound.is_finite() || self.gamma_upper_bound <= 0.0 {
            return Err(invalid(
                "gamma_upper_bound",
                &self.gamma_upper_bound.to_string(),
            ));
        }
        if !self.gamma_step.is_finite()
            || self.gamma_step <= 0.0
            || self.gamma_step >= self.gamma_upper_bound
            || self.gamma_upper_bound / self.gamma_step > MAX_GAMMA_STEPS
        {
            return Err(invalid("gamma_step", &self.gamma_step.to_string()));
        }
        if self.series_terms == 0 {
            return Err(invalid("series_terms", "0"));
        }
        Ok(())
    }

    /// Number of Riemann samples after t = 0. The small slack keeps t = U on the
    /// grid when U / Δt lands a rounding error below an integer.
    pub(crate) fn gamma_steps(&self) -> usize {
        (self.gamma_upper_bound / self.gamma_step + 1e-6).floor() as usize
    }
}

fn parse_field<T: std::str::FromStr>(field: &str, raw: &str) -> ConfigResult<T> {
    raw.trim().parse::<T>().map_err(|_| invalid(field, raw))
}

fn invalid(field: &str, value: &str) -> ConfigError {
    ConfigError::InvalidField {
        field: field.to_string(),
        value: value.to_string(),
    }
}
