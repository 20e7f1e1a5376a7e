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

use crate::engine::GoodnessOfFit;
use crate::error::Result;
use crate::expected::ExpectedFrequencyTable;
use crate::sample::{Category, ObservedSample, RawLabel};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub statistic: f64,
    pub degrees_of_freedom: u32,
    pub p_value: f64,
}
impl TestResult {
    /// `χ² = 7.09; p = 0.792`
    pub fn summary_line(&self) -> String {
        format!("χ² = {:.2}; p = {:.3}", self.statistic, self.p_value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryCell {
    pub category: Category,
    pub observed: u64,
    pub expected: f64,
    pub contribution: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitReport {
    #[serde(flatten)]
    pub result: TestResult,
    /// Set when the incomplete Gamma series could not resolve the p-value
    /// and the reported value was settled from the direction of the tail.
    #[serde(default)]
    pub series_unresolved: bool,
    pub cells: Vec<CategoryCell>,
}

/// Occurrences per label, with every label in 1..=num_cats present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCounts {
    counts: BTreeMap<Category, u64>,
}
impl CategoryCounts {
    pub fn tally(sample: &ObservedSample) -> Self {
        let mut counts: BTreeMap<Category, u64> = BTreeMap::new();
        for &category in sample.categories() {
            *counts.entry(category).or_insert(0) += 1;
        }
        for label in 1..=sample.num_cats() {
            if let Ok(category) = Category::new(label, sample.num_cats()) {
                counts.entry(category).or_insert(0);
            }
        }
        Self { counts }
    }
    pub fn get(&self, category: Category) -> u64 {
        self.counts.get(&category).copied().unwrap_or(0)
    }
    pub fn len(&self) -> usize {
        self.counts.len()
    }
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
    pub fn iter(&self) -> impl Iterator<Item = (Category, u64)> + '_ {
        self.counts.iter().map(|(&c, &n)| (c, n))
    }

    /// Pairs each count with its expected value and (O − E)² / E.
    pub fn cells(&self, expected: &ExpectedFrequencyTable) -> Vec<CategoryCell> {
        self.iter()
            .map(|(category, observed)| {
                let e = expected[category.index()];
                let diff = observed as f64 - e;
                CategoryCell {
                    category,
                    observed,
                    expected: e,
                    contribution: diff * diff / e,
                }
            })
            .collect()
    }
}

pub fn chi_squared_statistic(cells: &[CategoryCell]) -> f64 {
    cells.iter().map(|cell| cell.contribution).sum()
}

/// Runs the full goodness-of-fit pipeline with a default engine.
pub fn compute(observed: &[RawLabel], num_cats: usize) -> Result<TestResult> {
    GoodnessOfFit::new().compute(observed, num_cats)
}

pub fn compute_detailed(observed: &[RawLabel], num_cats: usize) -> Result<FitReport> {
    GoodnessOfFit::new().compute_detailed(observed, num_cats)
}
