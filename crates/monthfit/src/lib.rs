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

//! Chi-squared goodness of fit for monthly count data.
//!
//! Observed category labels (1 = January … 12 = December) are compared with
//! the counts expected if observations fell in proportion to the number of
//! days in each month. The Gamma functions behind the p-value are evaluated
//! numerically in [`gamma`].

pub mod calculator;
pub mod config;
pub mod distribution;
pub mod engine;
pub mod error;
pub mod expected;
pub mod gamma;
pub mod sample;

pub use calculator::{
    compute, compute_detailed, CategoryCell, CategoryCounts, FitReport, TestResult,
};
pub use config::{EngineConfig, PValuePolicy};
pub use distribution::{
    chi_squared_cdf, chi_squared_cdf_with, chi_squared_lower_tail, chi_squared_lower_tail_with,
};
pub use engine::GoodnessOfFit;
pub use error::{ConfigError, FitError, NumericError, ParseError, Result, ValidationError};
pub use expected::{
    expected_frequencies, month_proportions, DAYS_IN_MONTH, DAYS_IN_YEAR, MONTHS,
};
pub use gamma::{complete_gamma, incomplete_lower_gamma};
pub use sample::{
    parse_category_count, parse_observed_literal, Category, ObservedSample, RawLabel,
};
