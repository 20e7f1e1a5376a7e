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

use clap::Parser;
use monthfit::{EngineConfig, PValuePolicy};

#[derive(Parser, Debug, Clone)]
#[command(name = "chi-squared")]
#[command(
    about = "Chi-squared test of monthly data against a day-weighted uniform distribution",
    long_about = "Calculates the chi-squared test statistic for a nominally uniformly-distributed \
dataset of month labels (1 = January … 12 = December), weighting each month by its number of days, \
and the p-value of that statistic.\n\nExample:\n    chi-squared [1,2,3,4,5] 12"
)]
pub struct Cli {
    /// Sequence of category labels, e.g. [1,2,3,4,5], (1,2,3) or 1,2,3
    #[arg(allow_hyphen_values = true)]
    pub observed: String,
    /// Number of categories (12 for monthly data)
    pub num_cats: String,
    /// Print the per-month breakdown as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
    /// Report the p-value without clamping it to [0, 1]
    #[arg(long, default_value_t = false)]
    pub raw_p: bool,
    /// Evaluate the Gamma integral on a single thread
    #[arg(long, default_value_t = false)]
    pub serial: bool,
    #[arg(long, default_value_t = false)]
    pub debug: bool,
}

impl Cli {
    /// Environment settings with any command-line overrides applied.
    pub fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let mut config = EngineConfig::from_env()?;
        if self.raw_p {
            config = config.with_p_value_policy(PValuePolicy::Raw);
        }
        if self.serial {
            config = config.with_parallel(false);
        }
        Ok(config)
    }
}
