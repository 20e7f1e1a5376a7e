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

pub const MONTHS: usize = 12;
pub const DAYS_IN_YEAR: f64 = 365.25;
/// February carries the leap-day quarter.
pub const DAYS_IN_MONTH: [f64; MONTHS] = [
    31.0, 28.25, 31.0, 30.0, 31.0, 30.0, 31.0, 31.0, 30.0, 31.0, 30.0, 31.0,
];

pub type ExpectedFrequencyTable = [f64; MONTHS];

pub fn month_proportions() -> [f64; MONTHS] {
    DAYS_IN_MONTH.map(|days| days / DAYS_IN_YEAR)
}

/// Expected count per month for a sample of `total_count` observations.
pub fn expected_frequencies(total_count: usize) -> ExpectedFrequencyTable {
    let total = total_count as f64;
    month_proportions().map(|p| p * total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proportions_sum_to_one() {
        let sum: f64 = month_proportions().iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn expected_scales_with_total() {
        let table = expected_frequencies(1461);
        assert!((table[0] - 124.0).abs() < 1e-9);
        assert!((table[1] - 113.0).abs() < 1e-9);
        assert!((table[3] - 120.0).abs() < 1e-9);
        assert!((table.iter().sum::<f64>() - 1461.0).abs() < 1e-9);
    }

    #[test]
    fn empty_sample_expects_nothing() {
        assert!(expected_frequencies(0).iter().all(|&e| e == 0.0));
    }
}
