//! Rule primitives.
//!
//! Every primitive inspects one component (or a few) of a dataset and returns
//! zero or one [`ValidationError`]. `Err` is reserved for structural problems
//! such as an unknown field or an unparseable expression. A component absent
//! from the dataset never produces an error.
//!
//! Entries that are not provided are skipped by every rule except
//! [`none_missing`] (which looks for them) and [`all_identical`] (which compares
//! values as stored). For multi-phase fields a row is reported when any phase
//! violates the rule.
//!
//! Comparisons go through the [`field`] builder:
//!
//! ```
//! use gridval_core::*;
//! use gridval_rules::rules;
//!
//! # fn main() -> GridResult<()> {
//! let data = Dataset::new(DatasetKind::Input).with_table(
//!     ComponentTable::initialize(ComponentType::Transformer, DatasetKind::Input, 2)?
//!         .with_i32("id", &[1, 2])?
//!         .with_f64("uk", &[0.1, 0.001])?
//!         .with_f64("pk", &[1e3, 1e3])?
//!         .with_f64("sn", &[1e5, 1e5])?,
//! )?;
//!
//! let err = rules::field(&data, ComponentType::Transformer, "uk")
//!     .greater_or_equal("pk/sn")?
//!     .expect("second transformer violates uk >= pk/sn");
//! assert_eq!(err.id_values(), vec![2]);
//! # Ok(())
//! # }
//! ```

use std::collections::{BTreeSet, HashMap, HashSet};

use gridval_core::{
    ComponentTable, ComponentType, Dataset, Dtype, EnumKind, FaultPhase, FaultType, GridResult,
    MeasuredTerminalType, WindingType,
};

use crate::errors::{ErrorKind, FieldRef, ObjectRef, ValidationError};
use crate::expression::{DefaultValue, Operand, Reference};

/// Reference dataset name used in update id errors.
pub const INPUT_DATA: &str = "input_data";

/// Ids of `rows`, skipping rows whose id is not provided.
fn ids_at(table: &ComponentTable, rows: &[usize]) -> Vec<i32> {
    let ids = table.ids();
    rows.iter().filter_map(|&row| ids.get(row).copied().flatten()).collect()
}

/// Build an error for the offending rows, or nothing when there are none.
fn report(
    kind: ErrorKind,
    table: &ComponentTable,
    fields: &[&str],
    rows: &[usize],
) -> Option<ValidationError> {
    if rows.is_empty() {
        return None;
    }
    Some(ValidationError::new(
        kind,
        table.component(),
        fields,
        ids_at(table, rows),
    ))
}

pub(crate) fn is_enabled(status: Option<i64>) -> bool {
    status.is_some_and(|s| s != 0)
}

/// Set of ids present in the given components.
pub(crate) fn id_set(data: &Dataset, components: &[ComponentType]) -> HashSet<i64> {
    components
        .iter()
        .filter_map(|c| data.get(*c))
        .flat_map(|table| table.ids().into_iter().flatten().map(i64::from))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comparison {
    GreaterThan,
    GreaterOrEqual,
    LessThan,
    LessOrEqual,
}

impl Comparison {
    fn holds(self, value: f64, reference: f64) -> bool {
        match self {
            Comparison::GreaterThan => value > reference,
            Comparison::GreaterOrEqual => value >= reference,
            Comparison::LessThan => value < reference,
            Comparison::LessOrEqual => value <= reference,
        }
    }

    fn kind(self, reference: String) -> ErrorKind {
        match self {
            Comparison::GreaterThan => ErrorKind::NotGreaterThan { reference },
            Comparison::GreaterOrEqual => ErrorKind::NotGreaterOrEqual { reference },
            Comparison::LessThan => ErrorKind::NotLessThan { reference },
            Comparison::LessOrEqual => ErrorKind::NotLessOrEqual { reference },
        }
    }
}

/// Comparison rule on one field, with optional defaults.
#[derive(Debug, Clone)]
pub struct FieldRule<'a> {
    data: &'a Dataset,
    component: ComponentType,
    field: &'a str,
    defaults: Vec<DefaultValue>,
}

/// Start a comparison rule on `component.field`.
pub fn field<'a>(data: &'a Dataset, component: ComponentType, field: &'a str) -> FieldRule<'a> {
    FieldRule {
        data,
        component,
        field,
        defaults: Vec::new(),
    }
}

impl<'a> FieldRule<'a> {
    /// Substitute `default` where the field is not provided.
    ///
    /// Defaults chain: the first one with a value wins.
    pub fn with_default(mut self, default: impl Into<DefaultValue>) -> Self {
        self.defaults.push(default.into());
        self
    }

    fn evaluate<F>(&self, fields: &[&str], kind: ErrorKind, violates: F) -> GridResult<Option<ValidationError>>
    where
        F: Fn(&ComponentTable, usize, usize, f64) -> GridResult<bool>,
    {
        let Some(table) = self.data.get(self.component) else {
            return Ok(None);
        };
        let column = table.column(self.field)?;
        let defaults = self
            .defaults
            .iter()
            .map(|d| Operand::from_default(d, table))
            .collect::<GridResult<Vec<_>>>()?;

        let mut rows = Vec::new();
        for row in 0..table.n_rows() {
            let mut bad = false;
            for phase in 0..column.phases() {
                let value = column
                    .value(row, phase)
                    .or_else(|| defaults.iter().find_map(|d| d.at(row, phase)));
                if let Some(value) = value {
                    if violates(table, row, phase, value)? {
                        bad = true;
                        break;
                    }
                }
            }
            if bad {
                rows.push(row);
            }
        }
        Ok(report(kind, table, fields, &rows))
    }

    fn compare(&self, op: Comparison, reference: Reference) -> GridResult<Option<ValidationError>> {
        let Some(table) = self.data.get(self.component) else {
            return Ok(None);
        };
        let operand = Operand::resolve(&reference, table)?;
        self.evaluate(
            &[self.field],
            op.kind(reference.to_string()),
            |_, row, phase, value| {
                Ok(operand
                    .at(row, phase)
                    .is_some_and(|r| !op.holds(value, r)))
            },
        )
    }

    pub fn greater_than(self, reference: impl Into<Reference>) -> GridResult<Option<ValidationError>> {
        self.compare(Comparison::GreaterThan, reference.into())
    }

    pub fn greater_or_equal(
        self,
        reference: impl Into<Reference>,
    ) -> GridResult<Option<ValidationError>> {
        self.compare(Comparison::GreaterOrEqual, reference.into())
    }

    pub fn less_than(self, reference: impl Into<Reference>) -> GridResult<Option<ValidationError>> {
        self.compare(Comparison::LessThan, reference.into())
    }

    pub fn less_or_equal(self, reference: impl Into<Reference>) -> GridResult<Option<ValidationError>> {
        self.compare(Comparison::LessOrEqual, reference.into())
    }

    pub fn greater_than_zero(self) -> GridResult<Option<ValidationError>> {
        self.greater_than(0.0)
    }

    pub fn greater_or_equal_zero(self) -> GridResult<Option<ValidationError>> {
        self.greater_or_equal(0.0)
    }

    fn range(
        &self,
        lower: Reference,
        upper: Reference,
        inclusive: bool,
    ) -> GridResult<Option<ValidationError>> {
        let Some(table) = self.data.get(self.component) else {
            return Ok(None);
        };
        let lo = Operand::resolve(&lower, table)?;
        let hi = Operand::resolve(&upper, table)?;
        let (lower, upper) = (lower.to_string(), upper.to_string());
        let kind = if inclusive {
            ErrorKind::NotBetweenOrAt { lower, upper }
        } else {
            ErrorKind::NotBetween { lower, upper }
        };
        self.evaluate(&[self.field], kind, |_, row, phase, value| {
            let (Some(a), Some(b)) = (lo.at(row, phase), hi.at(row, phase)) else {
                return Ok(false);
            };
            let (min, max) = (a.min(b), a.max(b));
            Ok(if inclusive {
                !(min <= value && value <= max)
            } else {
                !(min < value && value < max)
            })
        })
    }

    /// Strictly between the two references (either order).
    pub fn between(
        self,
        lower: impl Into<Reference>,
        upper: impl Into<Reference>,
    ) -> GridResult<Option<ValidationError>> {
        self.range(lower.into(), upper.into(), false)
    }

    /// Between the two references, bounds included (either order).
    pub fn between_or_at(
        self,
        lower: impl Into<Reference>,
        upper: impl Into<Reference>,
    ) -> GridResult<Option<ValidationError>> {
        self.range(lower.into(), upper.into(), true)
    }
}

/// Rows whose `field` value (any phase) satisfies `pred`.
fn rows_where<F>(table: &ComponentTable, field: &str, pred: F) -> GridResult<Vec<usize>>
where
    F: Fn(usize, f64) -> bool,
{
    let column = table.column(field)?;
    Ok((0..table.n_rows())
        .filter(|&row| {
            (0..column.phases()).any(|p| column.value(row, p).is_some_and(|v| pred(row, v)))
        })
        .collect())
}

/// `field` is 0 or 1.
pub fn all_boolean(
    data: &Dataset,
    component: ComponentType,
    field: &str,
) -> GridResult<Option<ValidationError>> {
    let Some(table) = data.get(component) else {
        return Ok(None);
    };
    let rows = rows_where(table, field, |_, v| v != 0.0 && v != 1.0)?;
    Ok(report(ErrorKind::NotBoolean, table, &[field], &rows))
}

/// `field` belongs to one of the enum domains.
pub fn all_valid_enum_values(
    data: &Dataset,
    component: ComponentType,
    field: &str,
    enums: &[EnumKind],
) -> GridResult<Option<ValidationError>> {
    let Some(table) = data.get(component) else {
        return Ok(None);
    };
    let rows = rows_where(table, field, |_, v| {
        !enums.iter().any(|e| e.contains(v as i64)) || v.fract() != 0.0
    })?;
    Ok(report(
        ErrorKind::InvalidEnumValue {
            enums: enums.to_vec(),
        },
        table,
        &[field],
        &rows,
    ))
}

/// `field` is valid for the component type referenced by `ref_object_field`.
///
/// Rows referencing an id of `ref_components` must hold a value from `enums`;
/// rows referencing anything else are left to the id rules.
pub fn all_valid_associated_enum_values(
    data: &Dataset,
    component: ComponentType,
    field: &str,
    ref_object_field: &str,
    ref_components: &[ComponentType],
    enums: &[EnumKind],
) -> GridResult<Option<ValidationError>> {
    let Some(table) = data.get(component) else {
        return Ok(None);
    };
    let refs = table.column(ref_object_field)?;
    let targets = id_set(data, ref_components);
    let rows = rows_where(table, field, |row, v| {
        refs.int(row).is_some_and(|id| targets.contains(&id))
            && !enums.iter().any(|e| e.contains(v as i64))
    })?;
    Ok(report(
        ErrorKind::InvalidAssociatedEnumValue {
            enums: enums.to_vec(),
        },
        table,
        &[field, ref_object_field],
        &rows,
    ))
}

fn duplicate_rows(table: &ComponentTable, field: &str, rows: &[usize]) -> GridResult<Vec<usize>> {
    let column = table.column(field)?;
    let mut seen: HashMap<i64, Vec<usize>> = HashMap::new();
    for &row in rows {
        if let Some(value) = column.int(row) {
            seen.entry(value).or_default().push(row);
        }
    }
    let mut dups: Vec<usize> = seen
        .into_values()
        .filter(|rows| rows.len() > 1)
        .flatten()
        .collect();
    dups.sort_unstable();
    Ok(dups)
}

/// Every provided value of `field` occurs once.
pub fn all_unique(
    data: &Dataset,
    component: ComponentType,
    field: &str,
) -> GridResult<Option<ValidationError>> {
    let Some(table) = data.get(component) else {
        return Ok(None);
    };
    let all: Vec<usize> = (0..table.n_rows()).collect();
    let rows = duplicate_rows(table, field, &all)?;
    Ok(report(ErrorKind::NotUnique, table, &[field], &rows))
}

/// `field` is unique among the enabled rows.
pub fn all_enabled_unique(
    data: &Dataset,
    component: ComponentType,
    field: &str,
    status_field: &str,
) -> GridResult<Option<ValidationError>> {
    let Some(table) = data.get(component) else {
        return Ok(None);
    };
    let status = table.column(status_field)?;
    let enabled: Vec<usize> = (0..table.n_rows())
        .filter(|&row| is_enabled(status.int(row)))
        .collect();
    let rows = duplicate_rows(table, field, &enabled)?;
    Ok(report(ErrorKind::NotUnique, table, &[field, status_field], &rows))
}

/// Values shared between different `(component, field)` pairs.
///
/// Duplicates inside a single pair are left to [`all_unique`]. Every object
/// holding a shared value is reported once, and every pair taking part is
/// named.
pub fn all_cross_unique(
    data: &Dataset,
    pairs: &[(ComponentType, &str)],
) -> GridResult<Option<ValidationError>> {
    let mut occurrences: HashMap<i64, Vec<(usize, ComponentType, Option<i32>)>> = HashMap::new();
    for (pair, (component, field)) in pairs.iter().enumerate() {
        let Some(table) = data.get(*component) else {
            continue;
        };
        let column = table.column(field)?;
        let ids = table.ids();
        for row in 0..table.n_rows() {
            if let Some(value) = column.int(row) {
                occurrences
                    .entry(value)
                    .or_default()
                    .push((pair, *component, ids[row]));
            }
        }
    }

    let mut fields = BTreeSet::new();
    let mut objects = BTreeSet::new();
    for entries in occurrences.values() {
        let distinct: HashSet<usize> = entries.iter().map(|(pair, _, _)| *pair).collect();
        if distinct.len() < 2 {
            continue;
        }
        for (pair, component, id) in entries {
            fields.insert(FieldRef::new(*component, pairs[*pair].1));
            if let Some(id) = id {
                objects.insert(ObjectRef {
                    component: *component,
                    id: *id,
                });
            }
        }
    }
    if fields.is_empty() {
        return Ok(None);
    }
    Ok(Some(ValidationError::multi(
        ErrorKind::MultiComponentNotUnique,
        fields.into_iter().collect(),
        objects.into_iter().collect(),
    )))
}

fn pairwise<F>(
    data: &Dataset,
    component: ComponentType,
    field_1: &str,
    field_2: &str,
    kind: ErrorKind,
    violates: F,
) -> GridResult<Option<ValidationError>>
where
    F: Fn(f64, f64) -> bool,
{
    let Some(table) = data.get(component) else {
        return Ok(None);
    };
    let a = table.column(field_1)?;
    let b = table.column(field_2)?;
    let rows: Vec<usize> = (0..table.n_rows())
        .filter(|&row| {
            (0..a.phases().max(b.phases())).any(|p| {
                let pa = p.min(a.phases() - 1);
                let pb = p.min(b.phases() - 1);
                matches!((a.value(row, pa), b.value(row, pb)), (Some(x), Some(y)) if violates(x, y))
            })
        })
        .collect();
    Ok(report(kind, table, &[field_1, field_2], &rows))
}

/// Not both `field_1` and `field_2` equal to zero.
pub fn all_not_two_values_zero(
    data: &Dataset,
    component: ComponentType,
    field_1: &str,
    field_2: &str,
) -> GridResult<Option<ValidationError>> {
    pairwise(data, component, field_1, field_2, ErrorKind::TwoValuesZero, |x, y| {
        x == 0.0 && y == 0.0
    })
}

/// `field_1` differs from `field_2`.
pub fn all_not_two_values_equal(
    data: &Dataset,
    component: ComponentType,
    field_1: &str,
    field_2: &str,
) -> GridResult<Option<ValidationError>> {
    pairwise(data, component, field_1, field_2, ErrorKind::SameValue, |x, y| x == y)
}

/// `field` holds an id of one of `ref_components`.
///
/// With `filters`, only rows where every `(filter_field, value)` matches are
/// checked.
pub fn all_valid_ids(
    data: &Dataset,
    component: ComponentType,
    field: &str,
    ref_components: &[ComponentType],
    filters: &[(&str, i64)],
) -> GridResult<Option<ValidationError>> {
    let Some(table) = data.get(component) else {
        return Ok(None);
    };
    let column = table.column(field)?;
    let filter_columns = filters
        .iter()
        .map(|(name, value)| Ok((table.column(name)?, *value)))
        .collect::<GridResult<Vec<_>>>()?;
    let valid = id_set(data, ref_components);

    let rows: Vec<usize> = (0..table.n_rows())
        .filter(|&row| {
            filter_columns
                .iter()
                .all(|(col, value)| col.int(row) == Some(*value))
        })
        .filter(|&row| column.int(row).is_some_and(|id| !valid.contains(&id)))
        .collect();
    Ok(report(
        ErrorKind::InvalidId {
            ref_components: ref_components.to_vec(),
            filters: filters
                .iter()
                .map(|(name, value)| (name.to_string(), *value))
                .collect(),
        },
        table,
        &[field],
        &rows,
    ))
}

fn identical_rows(table: &ComponentTable, field: &str, rows: &[usize]) -> GridResult<Vec<usize>> {
    let column = table.column(field)?;
    let same = |a: f64, b: f64| a == b || (a.is_nan() && b.is_nan());
    let Some(&first) = rows.first() else {
        return Ok(Vec::new());
    };
    let differs = rows.iter().any(|&row| {
        (0..column.phases()).any(|p| !same(column.raw(row, p), column.raw(first, p)))
    });
    Ok(if differs { rows.to_vec() } else { Vec::new() })
}

/// `field` holds the same stored value in every row; all rows are reported
/// when it does not.
pub fn all_identical(
    data: &Dataset,
    component: ComponentType,
    field: &str,
) -> GridResult<Option<ValidationError>> {
    let Some(table) = data.get(component) else {
        return Ok(None);
    };
    let all: Vec<usize> = (0..table.n_rows()).collect();
    let rows = identical_rows(table, field, &all)?;
    Ok(report(ErrorKind::NotIdentical, table, &[field], &rows))
}

/// Like [`all_identical`] but over enabled rows only.
pub fn all_enabled_identical(
    data: &Dataset,
    component: ComponentType,
    field: &str,
    status_field: &str,
) -> GridResult<Option<ValidationError>> {
    let Some(table) = data.get(component) else {
        return Ok(None);
    };
    let status = table.column(status_field)?;
    let enabled: Vec<usize> = (0..table.n_rows())
        .filter(|&row| is_enabled(status.int(row)))
        .collect();
    let rows = identical_rows(table, field, &enabled)?;
    Ok(report(ErrorKind::NotIdentical, table, &[field, status_field], &rows))
}

/// Rows among `rows` where `field` is not provided (any phase).
pub fn none_missing_in_rows(
    table: &ComponentTable,
    field: &str,
    rows: &[usize],
) -> GridResult<Option<ValidationError>> {
    let column = table.column(field)?;
    let missing: Vec<usize> = rows
        .iter()
        .copied()
        .filter(|&row| column.row_has_missing(row))
        .collect();
    Ok(report(ErrorKind::MissingValue, table, &[field], &missing))
}

/// One missing-value error per field that is not provided somewhere.
pub fn none_missing(
    data: &Dataset,
    component: ComponentType,
    fields: &[&str],
) -> GridResult<Vec<ValidationError>> {
    let Some(table) = data.get(component) else {
        return Ok(Vec::new());
    };
    let all: Vec<usize> = (0..table.n_rows()).collect();
    let mut errors = Vec::new();
    for field in fields {
        errors.extend(none_missing_in_rows(table, field, &all)?);
    }
    Ok(errors)
}

/// Float fields holding +/- infinity, except the listed fields.
pub fn all_finite(data: &Dataset, exceptions: &[(ComponentType, &[&str])]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for table in data.tables() {
        let skipped: &[&str] = match exceptions
            .iter()
            .find(|(component, _)| *component == table.component())
        {
            Some((_, fields)) => fields,
            None => &[],
        };
        for (spec, column) in table.columns() {
            if spec.dtype != Dtype::Float64 || skipped.contains(&spec.name) {
                continue;
            }
            let rows: Vec<usize> = (0..table.n_rows())
                .filter(|&row| (0..column.phases()).any(|p| column.is_infinite(row, p)))
                .collect();
            errors.extend(report(ErrorKind::Infinity, table, &[spec.name], &rows));
        }
    }
    errors
}

/// Clock number consistent with the winding pair.
///
/// An odd clock needs exactly one wye-type winding; an even clock needs both
/// or neither.
pub fn all_valid_clocks(
    data: &Dataset,
    component: ComponentType,
    clock_field: &str,
    winding_from_field: &str,
    winding_to_field: &str,
) -> GridResult<Option<ValidationError>> {
    let Some(table) = data.get(component) else {
        return Ok(None);
    };
    let clock = table.column(clock_field)?;
    let from = table.column(winding_from_field)?;
    let to = table.column(winding_to_field)?;
    let rows: Vec<usize> = (0..table.n_rows())
        .filter(|&row| {
            let (Some(clock), Some(from), Some(to)) = (
                clock.int(row),
                from.int(row).and_then(WindingType::from_value),
                to.int(row).and_then(WindingType::from_value),
            ) else {
                return false;
            };
            let odd = clock.rem_euclid(2) == 1;
            if odd {
                from.is_wye() == to.is_wye()
            } else {
                from.is_wye() != to.is_wye()
            }
        })
        .collect();
    Ok(report(
        ErrorKind::TransformerClock,
        table,
        &[clock_field, winding_from_field, winding_to_field],
        &rows,
    ))
}

/// Fault phase compatible with the fault type.
///
/// A missing phase is fine when the type is known. A missing or unknown type
/// accepts no phase at all, and a phase outside the enum domain is never
/// supported.
pub fn all_valid_fault_phases(
    data: &Dataset,
    component: ComponentType,
    fault_type_field: &str,
    fault_phase_field: &str,
) -> GridResult<Option<ValidationError>> {
    let Some(table) = data.get(component) else {
        return Ok(None);
    };
    let types = table.column(fault_type_field)?;
    let phases = table.column(fault_phase_field)?;
    let rows: Vec<usize> = (0..table.n_rows())
        .filter(|&row| {
            let Some(fault_type) = types.int(row).and_then(FaultType::from_value) else {
                return true;
            };
            phases.int(row).is_some_and(|raw| {
                FaultPhase::from_value(raw)
                    .map_or(true, |phase| !fault_type.supported_phases().contains(&phase))
            })
        })
        .collect();
    Ok(report(
        ErrorKind::FaultPhase,
        table,
        &[fault_type_field, fault_phase_field],
        &rows,
    ))
}

/// `field` limited to the supported measured terminal types.
pub fn all_in_valid_values(
    data: &Dataset,
    component: ComponentType,
    field: &str,
    supported: &[MeasuredTerminalType],
) -> GridResult<Option<ValidationError>> {
    let Some(table) = data.get(component) else {
        return Ok(None);
    };
    let rows = rows_where(table, field, |_, v| {
        MeasuredTerminalType::from_value(v as i64).is_some_and(|t| !supported.contains(&t))
    })?;
    Ok(report(
        ErrorKind::UnsupportedMeasuredTerminalType {
            supported: supported.to_vec(),
        },
        table,
        &[field],
        &rows,
    ))
}

/// Update ids of `component` refer to objects of the base dataset.
///
/// Either every id is provided and exists in the base, or no id is provided
/// and the row count matches the base (positional update).
pub fn ids_valid_in_update(
    update: &Dataset,
    base: &Dataset,
    component: ComponentType,
) -> GridResult<Option<ValidationError>> {
    let Some(table) = update.get(component) else {
        return Ok(None);
    };
    if table.is_empty() {
        return Ok(None);
    }
    let ids = table.ids();
    let provided = ids.iter().filter(|id| id.is_some()).count();

    if provided == 0 {
        let input_rows = base.n_rows(component);
        if table.n_rows() == input_rows {
            return Ok(None);
        }
        return Ok(Some(positional_mismatch(
            component,
            vec![
                (String::from("update_rows"), table.n_rows() as i64),
                (String::from("input_rows"), input_rows as i64),
            ],
            Vec::new(),
        )));
    }
    if provided < ids.len() {
        return Ok(Some(positional_mismatch(
            component,
            vec![(String::from("rows_without_id"), (ids.len() - provided) as i64)],
            ids.iter().flatten().copied().collect(),
        )));
    }

    let known = id_set(base, &[component]);
    let rows: Vec<usize> = ids
        .iter()
        .enumerate()
        .filter(|(_, id)| id.is_some_and(|id| !known.contains(&i64::from(id))))
        .map(|(row, _)| row)
        .collect();
    Ok(report(
        ErrorKind::IdNotInDataset {
            ref_dataset: INPUT_DATA.to_string(),
        },
        table,
        &["id"],
        &rows,
    ))
}

/// Update rows that can be applied neither by id nor by position.
///
/// `rows` describes the offending update rows; `ids` holds whatever ids the
/// update did provide.
fn positional_mismatch(
    component: ComponentType,
    rows: Vec<(String, i64)>,
    ids: Vec<i32>,
) -> ValidationError {
    ValidationError::new(
        ErrorKind::InvalidId {
            ref_components: vec![component],
            filters: rows,
        },
        component,
        &["id"],
        ids,
    )
}
