//! Comparison references and field expressions.
//!
//! A rule compares a field against a [`Reference`]: either a constant or an
//! expression naming another field (`"u1"`) or a ratio of two fields
//! (`"pk/sn"`). Expressions are parsed when the rule runs; anything else is a
//! structural error.

use std::fmt;

use gridval_core::{Column, ComponentTable, GridError, GridResult};

/// Right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    Value(f64),
    Expression(String),
}

impl From<f64> for Reference {
    fn from(value: f64) -> Self {
        Reference::Value(value)
    }
}

impl From<&str> for Reference {
    fn from(expr: &str) -> Self {
        Reference::Expression(expr.to_string())
    }
}

impl From<String> for Reference {
    fn from(expr: String) -> Self {
        Reference::Expression(expr)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Value(v) => write!(f, "{v}"),
            Reference::Expression(expr) => f.write_str(expr),
        }
    }
}

/// Fallback used when a compared field is not provided.
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Scalar(f64),
    /// Value of another field in the same row
    Field(String),
    /// One value per row
    Values(Vec<f64>),
}

impl From<f64> for DefaultValue {
    fn from(value: f64) -> Self {
        DefaultValue::Scalar(value)
    }
}

impl From<&str> for DefaultValue {
    fn from(field: &str) -> Self {
        DefaultValue::Field(field.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr<'s> {
    Field(&'s str),
    Ratio(&'s str, &'s str),
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn parse(expr: &str) -> GridResult<Expr<'_>> {
    let invalid = || GridError::InvalidExpression(expr.to_string());
    match expr.split_once('/') {
        None if is_identifier(expr) => Ok(Expr::Field(expr)),
        Some((num, den)) if is_identifier(num) && is_identifier(den) => {
            Ok(Expr::Ratio(num, den))
        }
        _ => Err(invalid()),
    }
}

/// A reference resolved against one table.
#[derive(Debug, Clone)]
pub(crate) enum Operand<'a> {
    Constant(f64),
    Field(&'a Column),
    Ratio(&'a Column, &'a Column),
    PerRow(&'a [f64]),
}

fn phase_value(column: &Column, row: usize, phase: usize) -> Option<f64> {
    let phase = phase.min(column.phases().saturating_sub(1));
    column.value(row, phase)
}

impl<'a> Operand<'a> {
    pub(crate) fn resolve(reference: &Reference, table: &'a ComponentTable) -> GridResult<Self> {
        match reference {
            Reference::Value(v) => Ok(Operand::Constant(*v)),
            Reference::Expression(expr) => match parse(expr)? {
                Expr::Field(name) => Ok(Operand::Field(table.column(name)?)),
                Expr::Ratio(num, den) => {
                    Ok(Operand::Ratio(table.column(num)?, table.column(den)?))
                }
            },
        }
    }

    pub(crate) fn from_default(default: &'a DefaultValue, table: &'a ComponentTable) -> GridResult<Self> {
        match default {
            DefaultValue::Scalar(v) => Ok(Operand::Constant(*v)),
            DefaultValue::Field(name) => Ok(Operand::Field(table.column(name)?)),
            DefaultValue::Values(values) => Ok(Operand::PerRow(values)),
        }
    }

    /// Value at `(row, phase)`; `None` when not available.
    ///
    /// A ratio with a zero or non-finite denominator has no value.
    pub(crate) fn at(&self, row: usize, phase: usize) -> Option<f64> {
        match self {
            Operand::Constant(v) => (!v.is_nan()).then_some(*v),
            Operand::Field(column) => phase_value(column, row, phase),
            Operand::Ratio(num, den) => {
                let den = phase_value(den, row, phase).filter(|d| *d != 0.0 && d.is_finite())?;
                Some(phase_value(num, row, phase)? / den)
            }
            Operand::PerRow(values) => values.get(row).copied().filter(|v| !v.is_nan()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridval_core::{ComponentType, DatasetKind};

    fn transformers() -> ComponentTable {
        ComponentTable::initialize(ComponentType::Transformer, DatasetKind::Input, 3)
            .unwrap()
            .with_f64("pk", &[100.0, 100.0, f64::NAN])
            .unwrap()
            .with_f64("sn", &[1000.0, 0.0, 1000.0])
            .unwrap()
    }

    #[test]
    fn test_parse_expressions() {
        assert_eq!(parse("u1").unwrap(), Expr::Field("u1"));
        assert_eq!(parse("pk/sn").unwrap(), Expr::Ratio("pk", "sn"));
        for bad in ["", "pk//sn", "pk/sn/u1", "2*pk", "pk sn", "/sn"] {
            assert!(
                matches!(parse(bad), Err(GridError::InvalidExpression(_))),
                "should reject {bad:?}"
            );
        }
    }

    #[test]
    fn test_ratio_with_zero_denominator_has_no_value() {
        let table = transformers();
        let op = Operand::resolve(&"pk/sn".into(), &table).unwrap();
        assert_eq!(op.at(0, 0), Some(0.1));
        assert_eq!(op.at(1, 0), None);
        assert_eq!(op.at(2, 0), None);
    }

    #[test]
    fn test_unknown_field_is_structural() {
        let table = transformers();
        let err = Operand::resolve(&"pk/s_nom".into(), &table).unwrap_err();
        assert!(matches!(err, GridError::UnknownField { .. }));
    }

    #[test]
    fn test_reference_display() {
        assert_eq!(Reference::from(0.0).to_string(), "0");
        assert_eq!(Reference::from("pk/sn").to_string(), "pk/sn");
    }
}
