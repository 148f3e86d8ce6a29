//! Validation error model.
//!
//! Semantic problems are collected as [`ValidationError`] values and never
//! raised. Each error carries a typed [`ErrorKind`] (with the reference values,
//! enum domains or reference components the rule used), the fields involved
//! and the offending objects. Equality is structural, so tests can assert on
//! exact errors without depending on message text.
//!
//! # Example
//!
//! ```
//! use gridval_core::ComponentType;
//! use gridval_rules::{ErrorKind, ValidationError};
//!
//! let err = ValidationError::new(
//!     ErrorKind::TwoValuesZero,
//!     ComponentType::Line,
//!     &["r1", "x1"],
//!     vec![4],
//! );
//! assert_eq!(
//!     err.to_string(),
//!     "Fields 'r1' and 'x1' are both zero for 1 line."
//! );
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use gridval_core::{ComponentType, EnumKind, GridError, MeasuredTerminalType};
use serde::Serialize;
use thiserror::Error;

/// A `(component, field)` pair an error refers to.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct FieldRef {
    pub component: ComponentType,
    pub field: String,
}

impl FieldRef {
    pub fn new(component: ComponentType, field: impl Into<String>) -> Self {
        Self {
            component,
            field: field.into(),
        }
    }
}

/// An offending object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ObjectRef {
    pub component: ComponentType,
    pub id: i32,
}

/// What went wrong, with the rule parameters needed to explain it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ErrorKind {
    NotGreaterThan { reference: String },
    NotGreaterOrEqual { reference: String },
    NotLessThan { reference: String },
    NotLessOrEqual { reference: String },
    NotBetween { lower: String, upper: String },
    NotBetweenOrAt { lower: String, upper: String },
    NotBoolean,
    TwoValuesZero,
    SameValue,
    NotUnique,
    MultiComponentNotUnique,
    InvalidEnumValue { enums: Vec<EnumKind> },
    InvalidAssociatedEnumValue { enums: Vec<EnumKind> },
    InvalidId {
        ref_components: Vec<ComponentType>,
        filters: Vec<(String, i64)>,
    },
    IdNotInDataset { ref_dataset: String },
    MissingValue,
    MultiFieldValidation,
    NotIdentical,
    TransformerClock,
    FaultPhase,
    InvalidTapRegulatorControlSide,
    Infinity,
    MixedSensorTypes,
    MixedCurrentAngleMeasurementType,
    MissingVoltageAngleMeasurement,
    UnsupportedMeasuredTerminalType {
        supported: Vec<MeasuredTerminalType>,
    },
}

impl ErrorKind {
    /// Stable name of the error type.
    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::NotGreaterThan { .. } => "NotGreaterThanError",
            ErrorKind::NotGreaterOrEqual { .. } => "NotGreaterOrEqualError",
            ErrorKind::NotLessThan { .. } => "NotLessThanError",
            ErrorKind::NotLessOrEqual { .. } => "NotLessOrEqualError",
            ErrorKind::NotBetween { .. } => "NotBetweenError",
            ErrorKind::NotBetweenOrAt { .. } => "NotBetweenOrAtError",
            ErrorKind::NotBoolean => "NotBooleanError",
            ErrorKind::TwoValuesZero => "TwoValuesZeroError",
            ErrorKind::SameValue => "SameValueError",
            ErrorKind::NotUnique => "NotUniqueError",
            ErrorKind::MultiComponentNotUnique => "MultiComponentNotUniqueError",
            ErrorKind::InvalidEnumValue { .. } => "InvalidEnumValueError",
            ErrorKind::InvalidAssociatedEnumValue { .. } => "InvalidAssociatedEnumValueError",
            ErrorKind::InvalidId { .. } => "InvalidIdError",
            ErrorKind::IdNotInDataset { .. } => "IdNotInDatasetError",
            ErrorKind::MissingValue => "MissingValueError",
            ErrorKind::MultiFieldValidation => "MultiFieldValidationError",
            ErrorKind::NotIdentical => "NotIdenticalError",
            ErrorKind::TransformerClock => "TransformerClockError",
            ErrorKind::FaultPhase => "FaultPhaseError",
            ErrorKind::InvalidTapRegulatorControlSide => "InvalidTapRegulatorControlSideError",
            ErrorKind::Infinity => "InfinityError",
            ErrorKind::MixedSensorTypes => "MixedPowerCurrentSensorError",
            ErrorKind::MixedCurrentAngleMeasurementType => {
                "MixedCurrentAngleMeasurementTypeError"
            }
            ErrorKind::MissingVoltageAngleMeasurement => {
                "MissingVoltageAngleMeasurementError"
            }
            ErrorKind::UnsupportedMeasuredTerminalType { .. } => {
                "UnsupportedMeasuredTerminalType"
            }
        }
    }
}

/// A collected semantic validation error.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationError {
    pub kind: ErrorKind,
    pub fields: Vec<FieldRef>,
    pub ids: Vec<ObjectRef>,
}

/// Errors per batch index; only batches with errors are present.
pub type BatchErrors = BTreeMap<usize, Vec<ValidationError>>;

impl ValidationError {
    /// Error about fields of a single component.
    pub fn new(kind: ErrorKind, component: ComponentType, fields: &[&str], ids: Vec<i32>) -> Self {
        Self {
            kind,
            fields: fields
                .iter()
                .map(|field| FieldRef::new(component, *field))
                .collect(),
            ids: ids
                .into_iter()
                .map(|id| ObjectRef { component, id })
                .collect(),
        }
    }

    /// Error spanning several components.
    pub fn multi(kind: ErrorKind, fields: Vec<FieldRef>, ids: Vec<ObjectRef>) -> Self {
        Self { kind, fields, ids }
    }

    /// The component when every field belongs to the same one.
    pub fn component(&self) -> Option<ComponentType> {
        let first = self.fields.first()?.component;
        self.fields
            .iter()
            .all(|f| f.component == first)
            .then_some(first)
    }

    /// Distinct components named by the fields, in order of appearance.
    pub fn components(&self) -> Vec<ComponentType> {
        let mut out: Vec<ComponentType> = Vec::new();
        for field in &self.fields {
            if !out.contains(&field.component) {
                out.push(field.component);
            }
        }
        out
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.field.as_str()).collect()
    }

    pub fn id_values(&self) -> Vec<i32> {
        self.ids.iter().map(|o| o.id).collect()
    }

    fn field_text(&self) -> String {
        let single = self.component().is_some();
        let names: Vec<String> = self
            .fields
            .iter()
            .map(|f| {
                if single {
                    format!("'{}'", f.field)
                } else {
                    format!("'{}.{}'", f.component, f.field)
                }
            })
            .collect();
        match names.as_slice() {
            [] => String::new(),
            [one] => one.clone(),
            [init @ .., last] => format!("{} and {}", init.join(", "), last),
        }
    }

    fn subject(&self) -> String {
        let components: Vec<&str> = self.components().iter().map(|c| c.as_str()).collect();
        let n = self.ids.len();
        let name = components.join("/");
        match n {
            0 => name,
            1 => format!("1 {name}"),
            _ => format!("{n} {name}s"),
        }
    }

    /// Key/value context lines for detailed reporting.
    pub fn context(&self, id_lookup: Option<&IdLookup>) -> Vec<(String, String)> {
        let mut out = vec![("type".to_string(), self.kind.name().to_string())];
        match self.component() {
            Some(component) => {
                out.push(("component".into(), component.to_string()));
                let names = self.field_names();
                if names.len() == 1 {
                    out.push(("field".into(), format!("'{}'", names[0])));
                } else {
                    out.push(("fields".into(), format!("{names:?}")));
                }
            }
            None => {
                let fields: Vec<String> = self
                    .fields
                    .iter()
                    .map(|f| format!("{}.{}", f.component, f.field))
                    .collect();
                out.push(("fields".into(), format!("{fields:?}")));
            }
        }
        out.push(("ids".into(), render_ids(self, id_lookup)));

        match &self.kind {
            ErrorKind::NotGreaterThan { reference }
            | ErrorKind::NotGreaterOrEqual { reference }
            | ErrorKind::NotLessThan { reference }
            | ErrorKind::NotLessOrEqual { reference } => {
                out.push(("ref_value".into(), reference.clone()));
            }
            ErrorKind::NotBetween { lower, upper } | ErrorKind::NotBetweenOrAt { lower, upper } => {
                out.push(("ref_value".into(), format!("({lower}, {upper})")));
            }
            ErrorKind::InvalidEnumValue { enums }
            | ErrorKind::InvalidAssociatedEnumValue { enums } => {
                out.push(("enum".into(), enum_text(enums)));
            }
            ErrorKind::InvalidId {
                ref_components,
                filters,
            } => {
                let refs: Vec<&str> = ref_components.iter().map(|c| c.as_str()).collect();
                out.push(("ref_components".into(), refs.join(", ")));
                if !filters.is_empty() {
                    out.push(("filters".into(), filter_text(filters)));
                }
            }
            ErrorKind::IdNotInDataset { ref_dataset } => {
                out.push(("ref_dataset".into(), ref_dataset.clone()));
            }
            ErrorKind::UnsupportedMeasuredTerminalType { supported } => {
                let names: Vec<&str> = supported.iter().map(|t| t.label()).collect();
                out.push(("supported".into(), names.join(", ")));
            }
            _ => {}
        }
        out
    }
}

fn enum_text(enums: &[EnumKind]) -> String {
    let names: Vec<&str> = enums.iter().map(|e| e.name()).collect();
    names.join("/")
}

fn filter_text(filters: &[(String, i64)]) -> String {
    let parts: Vec<String> = filters
        .iter()
        .map(|(field, value)| format!("{field}={value}"))
        .collect();
    format!("({})", parts.join(", "))
}

fn render_ids(error: &ValidationError, id_lookup: Option<&IdLookup>) -> String {
    let single = error.component().is_some();
    let parts: Vec<String> = error
        .ids
        .iter()
        .map(|object| {
            let base = if single {
                object.id.to_string()
            } else {
                format!("({}, {})", object.component, object.id)
            };
            match id_lookup.and_then(|lookup| lookup.name(object.id)) {
                Some(name) => format!("{base}: {name}"),
                None => base,
            }
        })
        .collect();
    format!("[{}]", parts.join(", "))
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let field = self.field_text();
        let n = self.subject();
        match &self.kind {
            ErrorKind::NotGreaterThan { reference } => {
                write!(f, "Field {field} is not greater than {reference} for {n}.")
            }
            ErrorKind::NotGreaterOrEqual { reference } => write!(
                f,
                "Field {field} is not greater than (or equal to) {reference} for {n}."
            ),
            ErrorKind::NotLessThan { reference } => {
                write!(f, "Field {field} is not smaller than {reference} for {n}.")
            }
            ErrorKind::NotLessOrEqual { reference } => write!(
                f,
                "Field {field} is not smaller than (or equal to) {reference} for {n}."
            ),
            ErrorKind::NotBetween { lower, upper } => write!(
                f,
                "Field {field} is not between {lower} and {upper} for {n}."
            ),
            ErrorKind::NotBetweenOrAt { lower, upper } => write!(
                f,
                "Field {field} is not between (or at) {lower} and {upper} for {n}."
            ),
            ErrorKind::NotBoolean => {
                write!(f, "Field {field} is not a boolean (0 or 1) for {n}.")
            }
            ErrorKind::TwoValuesZero => write!(f, "Fields {field} are both zero for {n}."),
            ErrorKind::SameValue => {
                write!(f, "Fields {field} contain the same values for {n}.")
            }
            ErrorKind::NotUnique => write!(f, "Field {field} is not unique for {n}."),
            ErrorKind::MultiComponentNotUnique => {
                write!(f, "Fields {field} are not unique for {n}.")
            }
            ErrorKind::InvalidEnumValue { enums } => write!(
                f,
                "Field {field} contains invalid {} values for {n}.",
                enum_text(enums)
            ),
            ErrorKind::InvalidAssociatedEnumValue { enums } => write!(
                f,
                "The combination of fields {field} results in invalid {} values for {n}.",
                enum_text(enums)
            ),
            ErrorKind::InvalidId {
                ref_components,
                filters,
            } => {
                let refs: Vec<&str> = ref_components.iter().map(|c| c.as_str()).collect();
                write!(
                    f,
                    "Field {field} does not contain a valid {} id for {n}.",
                    refs.join("/")
                )?;
                if !filters.is_empty() {
                    write!(f, " {}", filter_text(filters))?;
                }
                Ok(())
            }
            ErrorKind::IdNotInDataset { ref_dataset } => {
                write!(f, "ID does not exist in {ref_dataset} for {n}.")
            }
            ErrorKind::MissingValue => write!(f, "Field {field} is missing for {n}."),
            ErrorKind::MultiFieldValidation => {
                write!(f, "Combination of fields {field} is not valid for {n}.")
            }
            ErrorKind::NotIdentical => write!(f, "Field {field} is not identical for {n}."),
            ErrorKind::TransformerClock => write!(
                f,
                "Invalid clock number for the winding types {field} for {n}."
            ),
            ErrorKind::FaultPhase => write!(
                f,
                "The fault phase is not applicable to the corresponding fault type for {n}."
            ),
            ErrorKind::InvalidTapRegulatorControlSide => write!(
                f,
                "Field {field} is not the side farthest from the source for {n}."
            ),
            ErrorKind::Infinity => write!(f, "Field {field} contains +/- infinity for {n}."),
            ErrorKind::MixedSensorTypes => write!(
                f,
                "Power and current sensors measure the same terminal for {n}."
            ),
            ErrorKind::MixedCurrentAngleMeasurementType => write!(
                f,
                "Mixed current angle measurement types on the same terminal for {n}."
            ),
            ErrorKind::MissingVoltageAngleMeasurement => write!(
                f,
                "Global angle current measurements require a voltage angle measurement for {n}."
            ),
            ErrorKind::UnsupportedMeasuredTerminalType { .. } => write!(
                f,
                "Field {field} contains unsupported measured terminal types for {n}."
            ),
        }
    }
}

/// Human-readable names for object ids in reports.
#[derive(Debug, Clone)]
pub enum IdLookup {
    /// Name at position `id`
    List(Vec<String>),
    Map(HashMap<i32, String>),
}

impl IdLookup {
    pub fn name(&self, id: i32) -> Option<&str> {
        match self {
            IdLookup::List(names) => usize::try_from(id)
                .ok()
                .and_then(|i| names.get(i))
                .map(String::as_str),
            IdLookup::Map(names) => names.get(&id).map(String::as_str),
        }
    }
}

/// Failure raised by the `assert_valid_*` wrappers.
#[derive(Error, Debug)]
pub enum AssertionError {
    /// The dataset is malformed
    #[error(transparent)]
    Structural(#[from] GridError),

    #[error("{}", crate::render::errors_to_string(.errors, .name, false, None))]
    Invalid {
        name: String,
        errors: Vec<ValidationError>,
    },

    #[error("{}", crate::render::batch_errors_to_string(.errors, .name, false, None))]
    InvalidBatch { name: String, errors: BatchErrors },
}

impl AssertionError {
    /// Number of validation errors carried (all batches combined).
    pub fn error_count(&self) -> usize {
        match self {
            AssertionError::Structural(_) => 0,
            AssertionError::Invalid { errors, .. } => errors.len(),
            AssertionError::InvalidBatch { errors, .. } => errors.values().map(Vec::len).sum(),
        }
    }
}
