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

//! Observed samples: literal parsing and label validation.
//!
//! Parsing only checks the structure of the literal; every element becomes a
//! [`RawLabel`] whatever its type. Validation then turns the whole sequence
//! into typed [`Category`] values or fails on the first bad label.

use crate::error::{ParseError, ParseResult, ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum RawLabel {
    Integer(i64),
    Real(f64),
    Text(String),
    Other { kind: &'static str, value: String },
}
impl RawLabel {
    pub fn kind(&self) -> &'static str {
        match self {
            RawLabel::Integer(_) => "integer",
            RawLabel::Real(_) => "float",
            RawLabel::Text(_) => "string",
            RawLabel::Other { kind, .. } => *kind,
        }
    }
    fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(n) => match n.as_i64() {
                Some(i) => RawLabel::Integer(i),
                None => RawLabel::Real(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => RawLabel::Text(s.clone()),
            Value::Bool(b) => RawLabel::Other {
                kind: "boolean",
                value: b.to_string(),
            },
            Value::Null => RawLabel::Other {
                kind: "null",
                value: "null".to_string(),
            },
            Value::Array(_) => RawLabel::Other {
                kind: "sequence",
                value: value.to_string(),
            },
            Value::Object(_) => RawLabel::Other {
                kind: "mapping",
                value: value.to_string(),
            },
        }
    }
}
impl fmt::Display for RawLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawLabel::Integer(i) => write!(f, "{i}"),
            RawLabel::Real(r) => write!(f, "{r}"),
            RawLabel::Text(s) => write!(f, "{s}"),
            RawLabel::Other { value, .. } => write!(f, "{value}"),
        }
    }
}

/// A validated 1-based category label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Category(usize);
impl Category {
    pub fn new(label: usize, num_cats: usize) -> ValidationResult<Self> {
        if (1..=num_cats).contains(&label) {
            Ok(Self(label))
        } else {
            Err(out_of_range(label.to_string(), num_cats))
        }
    }
    pub fn label(self) -> usize {
        self.0
    }
    /// Zero-based position in the expected-frequency table.
    pub fn index(self) -> usize {
        self.0 - 1
    }
}
impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObservedSample {
    categories: Vec<Category>,
    num_cats: usize,
}
impl ObservedSample {
    /// Validates every label up front; nothing is tallied until all pass.
    pub fn validate(raw: &[RawLabel], num_cats: usize) -> ValidationResult<Self> {
        if raw.is_empty() {
            return Err(ValidationError::EmptySample);
        }
        let categories = raw
            .iter()
            .map(|label| validate_label(label, num_cats))
            .collect::<ValidationResult<Vec<_>>>()?;
        Ok(Self {
            categories,
            num_cats,
        })
    }
    pub fn from_labels(labels: &[i64], num_cats: usize) -> ValidationResult<Self> {
        let raw: Vec<RawLabel> = labels.iter().copied().map(RawLabel::Integer).collect();
        Self::validate(&raw, num_cats)
    }
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }
    pub fn num_cats(&self) -> usize {
        self.num_cats
    }
    pub fn len(&self) -> usize {
        self.categories.len()
    }
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

pub fn validate_label(raw: &RawLabel, num_cats: usize) -> ValidationResult<Category> {
    match raw {
        RawLabel::Integer(i) => usize::try_from(*i)
            .ok()
            .and_then(|label| Category::new(label, num_cats).ok())
            .ok_or_else(|| out_of_range(raw.to_string(), num_cats)),
        RawLabel::Real(r) => {
            if r.is_finite() && r.fract() == 0.0 && *r >= 1.0 && *r <= num_cats as f64 {
                Category::new(*r as usize, num_cats)
            } else {
                Err(out_of_range(raw.to_string(), num_cats))
            }
        }
        RawLabel::Text(_) | RawLabel::Other { .. } => Err(ValidationError::NonNumericLabel {
            value: raw.to_string(),
            kind: raw.kind().to_string(),
        }),
    }
}

fn out_of_range(value: String, max: usize) -> ValidationError {
    ValidationError::LabelOutOfRange { value, max }
}

/// Parses `[1,2,3]`, `(1,2,3)` or a bare `1,2,3` into raw labels.
///
/// Single-quoted strings are accepted alongside double-quoted ones; bare
/// words are a parse error.
pub fn parse_observed_literal(literal: &str) -> ParseResult<Vec<RawLabel>> {
    let trimmed = literal.trim();
    if trimmed.is_empty() {
        return Err(ParseError::EmptyLiteral);
    }
    let inner = if let Some(rest) = trimmed.strip_prefix('[') {
        rest.strip_suffix(']')
            .ok_or_else(|| malformed(literal, "unclosed '['"))?
    } else if let Some(rest) = trimmed.strip_prefix('(') {
        rest.strip_suffix(')')
            .ok_or_else(|| malformed(literal, "unclosed '('"))?
    } else {
        trimmed
    };
    // (1,) is a valid one-element tuple
    let inner = inner.trim().strip_suffix(',').unwrap_or(inner.trim());
    let json = format!("[{}]", requote(inner));
    let value: Value =
        serde_json::from_str(&json).map_err(|e| malformed(literal, &e.to_string()))?;
    match value {
        Value::Array(items) => Ok(items.iter().map(RawLabel::from_json).collect()),
        _ => Err(malformed(literal, "expected a sequence of labels")),
    }
}

/// Rewrites single-quoted strings as JSON strings. Double-quoted strings
/// pass through; `\'` escapes become a plain `'` in either form.
fn requote(inner: &str) -> String {
    let mut out = String::with_capacity(inner.len() + 2);
    let mut open: Option<char> = None;
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match (open, c) {
            (None, '\'' | '"') => {
                open = Some(c);
                out.push('"');
            }
            (None, _) => out.push(c),
            (Some(_), '\\') => match chars.next() {
                Some('\'') => out.push('\''),
                Some(next) => {
                    out.push('\\');
                    out.push(next);
                }
                None => out.push('\\'),
            },
            (Some(quote), _) if c == quote => {
                open = None;
                out.push('"');
            }
            (Some(_), '"') => out.push_str("\\\""),
            (Some(_), _) => out.push(c),
        }
    }
    out
}

pub fn parse_category_count(literal: &str) -> ParseResult<usize> {
    let invalid = || ParseError::InvalidCategoryCount {
        literal: literal.to_string(),
    };
    let value: Value = serde_json::from_str(literal.trim()).map_err(|_| invalid())?;
    value
        .as_u64()
        .filter(|&n| n > 0)
        .and_then(|n| usize::try_from(n).ok())
        .ok_or_else(invalid)
}

fn malformed(literal: &str, reason: &str) -> ParseError {
    ParseError::MalformedLiteral {
        literal: literal.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bracketed_tuple_and_bare_forms() {
        let expected = vec![
            RawLabel::Integer(1),
            RawLabel::Integer(2),
            RawLabel::Integer(3),
        ];
        assert_eq!(parse_observed_literal("[1,2,3]").unwrap(), expected);
        assert_eq!(parse_observed_literal("(1, 2, 3)").unwrap(), expected);
        assert_eq!(parse_observed_literal(" 1,2,3 ").unwrap(), expected);
        assert_eq!(
            parse_observed_literal("(7,)").unwrap(),
            vec![RawLabel::Integer(7)]
        );
    }

    #[test]
    fn keeps_mixed_types_for_validation() {
        let labels = parse_observed_literal("[1, 2.0, 'a', true]").unwrap();
        assert_eq!(labels[0], RawLabel::Integer(1));
        assert_eq!(labels[1], RawLabel::Real(2.0));
        assert_eq!(labels[2], RawLabel::Text("a".to_string()));
        assert_eq!(labels[3].kind(), "boolean");
    }

    #[test]
    fn strings_may_contain_the_other_quote() {
        let labels = parse_observed_literal(r#"[1, "it's"]"#).unwrap();
        assert_eq!(labels[1], RawLabel::Text("it's".to_string()));

        let labels = parse_observed_literal(r#"['say "hi"', 'don\'t']"#).unwrap();
        assert_eq!(labels[0], RawLabel::Text(r#"say "hi""#.to_string()));
        assert_eq!(labels[1], RawLabel::Text("don't".to_string()));

        let raw = parse_observed_literal(r#"[1, "it's"]"#).unwrap();
        let err = ObservedSample::validate(&raw, 12).unwrap_err();
        assert!(matches!(
            err,
            ValidationError::NonNumericLabel { ref value, ref kind } if value == "it's" && kind == "string"
        ));
    }

    #[test]
    fn rejects_malformed_literals() {
        assert_eq!(parse_observed_literal("  "), Err(ParseError::EmptyLiteral));
        assert!(matches!(
            parse_observed_literal("[1,2"),
            Err(ParseError::MalformedLiteral { .. })
        ));
        assert!(matches!(
            parse_observed_literal("[1,abc]"),
            Err(ParseError::MalformedLiteral { .. })
        ));
    }

    #[test]
    fn category_count_must_be_positive_integer() {
        assert_eq!(parse_category_count("12"), Ok(12));
        assert!(parse_category_count("0").is_err());
        assert!(parse_category_count("12.5").is_err());
        assert!(parse_category_count("twelve").is_err());
    }

    #[test]
    fn validation_names_offending_value() {
        let err = ObservedSample::from_labels(&[1, 13], 12).unwrap_err();
        assert_eq!(
            err,
            ValidationError::LabelOutOfRange {
                value: "13".to_string(),
                max: 12
            }
        );

        let raw = vec![RawLabel::Integer(4), RawLabel::Text("x".to_string())];
        let err = ObservedSample::validate(&raw, 12).unwrap_err();
        assert_eq!(err.to_string(), "Key \"x\" is type string: integer or float required");
    }

    #[test]
    fn integral_reals_are_categories() {
        let raw = vec![RawLabel::Real(3.0), RawLabel::Integer(12)];
        let sample = ObservedSample::validate(&raw, 12).unwrap();
        assert_eq!(sample.categories()[0].label(), 3);
        assert_eq!(sample.categories()[1].index(), 11);

        assert!(validate_label(&RawLabel::Real(2.5), 12).is_err());
        assert!(validate_label(&RawLabel::Integer(0), 12).is_err());
        assert!(validate_label(&RawLabel::Integer(-4), 12).is_err());
    }

    #[test]
    fn empty_sample_is_rejected() {
        assert_eq!(
            ObservedSample::validate(&[], 12),
            Err(ValidationError::EmptySample)
        );
    }
}
