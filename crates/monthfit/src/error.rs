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

use thiserror::Error;
#[derive(Error, Debug)]
pub enum FitError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
    #[error("Numeric error: {0}")]
    Numeric(#[from] NumericError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Malformed literal '{literal}': {reason}")]
    MalformedLiteral { literal: String, reason: String },
    #[error("Literal is empty")]
    EmptyLiteral,
    #[error("Category count '{literal}' is not a positive integer")]
    InvalidCategoryCount { literal: String },
}
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Key \"{value}\" is type {kind}: integer or float required")]
    NonNumericLabel { value: String, kind: String },
    #[error("Key \"{value}\" out of range 1 - {max}")]
    LabelOutOfRange { value: String, max: usize },
    #[error("Observed sample is empty")]
    EmptySample,
    #[error("Unsupported category count {num_cats}: the month model has exactly 12 categories")]
    UnsupportedCategoryCount { num_cats: usize },
}
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericError {
    #[error("Invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        name: String,
        value: f64,
        reason: String,
    },
}
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Invalid engine configuration: {field} = {value}")]
    InvalidField { field: String, value: String },
}
pub type Result<T> = std::result::Result<T, FitError>;
pub type ParseResult<T> = std::result::Result<T, ParseError>;
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
pub type NumericResult<T> = std::result::Result<T, NumericError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
impl FitError {
    /// Errors caused by the shape of the caller's input rather than its values.
    pub fn is_usage_error(&self) -> bool {
        matches!(self, FitError::Parse(_))
    }
    pub fn category(&self) -> &'static str {
        match self {
            FitError::Parse(_) => "Parse",
            FitError::Validation(_) => "Validation",
            FitError::Numeric(_) => "Numeric",
            FitError::Config(_) => "Configuration",
        }
    }
}
impl NumericError {
    pub fn invalid(name: &str, value: f64, reason: &str) -> Self {
        NumericError::InvalidParameter {
            name: name.to_string(),
            value,
            reason: reason.to_string(),
        }
    }
}
