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

mod args;
pub use args::Cli;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use monthfit::{parse_category_count, parse_observed_literal, FitError, GoodnessOfFit};
use tracing::info;
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: i32 = 1;
const EXIT_USAGE: i32 = 2;

fn main() {
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            let usage = e
                .downcast_ref::<FitError>()
                .is_some_and(FitError::is_usage_error);
            eprintln!("error: {e}");
            if usage {
                eprintln!("\n{}", Cli::command().render_long_help());
                std::process::exit(EXIT_USAGE);
            }
            std::process::exit(EXIT_FAILURE);
        }
    }
}

fn run(cli: &Cli) -> Result<String> {
    info!(observed = %cli.observed, num_cats = %cli.num_cats, "chi-squared requested");

    let observed = parse_observed_literal(&cli.observed).map_err(FitError::from)?;
    let num_cats = parse_category_count(&cli.num_cats).map_err(FitError::from)?;

    let engine = GoodnessOfFit::with_config(cli.engine_config()?)?;
    let report = engine.compute_detailed(&observed, num_cats)?;

    if cli.json {
        Ok(serde_json::to_string_pretty(&report)?)
    } else {
        Ok(report.result.summary_line())
    }
}
