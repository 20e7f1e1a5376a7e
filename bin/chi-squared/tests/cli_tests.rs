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

use assert_cmd::Command;
use predicates::prelude::*;

fn chi_squared() -> Command {
    let mut cmd = Command::cargo_bin("chi-squared").unwrap();
    cmd.env_remove("RUST_LOG");
    for key in [
        "MONTHFIT_GAMMA_UPPER_BOUND",
        "MONTHFIT_GAMMA_STEP",
        "MONTHFIT_SERIES_TERMS",
        "MONTHFIT_PARALLEL",
        "MONTHFIT_P_VALUE_POLICY",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

#[test]
fn prints_single_summary_line() {
    chi_squared()
        .args(["[1,2,3,4,5]", "12"])
        .assert()
        .success()
        .stdout("χ² = 7.09; p = 0.792\n");
}

#[test]
fn accepts_bare_sequence() {
    chi_squared()
        .args(["1,2,3,4,5", "12"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("χ² = 7.09;"));
}

#[test]
fn json_output_includes_breakdown() {
    chi_squared()
        .args(["[1,6,7,12]", "12", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"degrees_of_freedom\": 11"))
        .stdout(predicate::str::contains("\"cells\""));
}

#[test]
fn malformed_literal_prints_usage() {
    chi_squared()
        .args(["[1,abc", "12"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn out_of_range_label_fails() {
    chi_squared()
        .args(["[1,13]", "12"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("out of range 1 - 12"));
}

#[test]
fn unsupported_category_count_fails() {
    chi_squared()
        .args(["[1,2]", "7"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Unsupported category count 7"));
}

#[test]
fn invalid_environment_config_fails() {
    chi_squared()
        .env("MONTHFIT_SERIES_TERMS", "none")
        .args(["[1,2]", "12"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("MONTHFIT_SERIES_TERMS"));
}

#[test]
fn skewed_sample_reports_zero_p_value() {
    chi_squared()
        .args(["[1,1,1,1,1,1,1,1,1,1]", "12"])
        .assert()
        .success()
        .stdout("χ² = 107.82; p = 0.000\n");
}

#[test]
fn apostrophe_label_is_a_validation_failure() {
    chi_squared()
        .args([r#"[1, "it's"]"#, "12"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("is type string"));
}

#[test]
fn unbounded_gamma_grid_is_rejected() {
    chi_squared()
        .env("MONTHFIT_GAMMA_STEP", "1e-300")
        .args(["[1,2]", "12"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("gamma_step"));
}
