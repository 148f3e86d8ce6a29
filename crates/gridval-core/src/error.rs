//! Structural error type for the gridval workspace.
//!
//! [`GridError`] covers everything that makes a dataset *malformed* rather than
//! *invalid*: unknown component names, fields that do not exist in the schema,
//! columns with the wrong dtype or shape, inconsistent batch layouts and
//! unparseable field expressions. These abort validation of the dataset (or
//! batch) they occur in. Semantic problems with otherwise well-formed data are
//! never reported through this type; they are collected as validation errors by
//! `gridval-rules`.
//!
//! # Example
//!
//! ```
//! use gridval_core::{ComponentType, GridError, GridResult};
//!
//! fn parse(name: &str) -> GridResult<ComponentType> {
//!     name.parse()
//! }
//!
//! assert!(matches!(parse("line"), Ok(ComponentType::Line)));
//! assert!(matches!(parse("cable"), Err(GridError::UnknownComponent(_))));
//! ```

use thiserror::Error;

use crate::component::{ComponentType, DatasetKind};
use crate::schema::Dtype;

/// Structural failures that make further validation meaningless.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridError {
    /// Component name not part of the closed component set
    #[error("Unknown component '{0}'")]
    UnknownComponent(String),

    /// Component exists but has no schema for this dataset kind
    #[error("Component '{component}' is not allowed in {kind} data")]
    ComponentNotAllowed {
        component: ComponentType,
        kind: DatasetKind,
    },

    /// Field name not present in the component schema
    #[error("Unknown field '{field}' for {component} in {kind} data")]
    UnknownField {
        component: ComponentType,
        kind: DatasetKind,
        field: String,
    },

    /// Column data does not match the schema dtype
    #[error("Field '{field}' of {component} expects {expected}, got {actual}")]
    DtypeMismatch {
        component: ComponentType,
        field: String,
        expected: Dtype,
        actual: Dtype,
    },

    /// Column length or phase count does not match the table
    #[error("Field '{field}' of {component}: {reason}")]
    ShapeMismatch {
        component: ComponentType,
        field: String,
        reason: String,
    },

    /// Dataset of the wrong kind handed to an entry point
    #[error("Expected {expected} data, got {actual} data")]
    DatasetKindMismatch {
        expected: DatasetKind,
        actual: DatasetKind,
    },

    /// Sparse batch index pointer violates its invariants
    #[error("Malformed indptr for {component}: {reason}")]
    MalformedIndptr {
        component: ComponentType,
        reason: String,
    },

    /// Dense batch data that cannot be split evenly
    #[error("Invalid dense batch shape for {component}: {reason}")]
    InvalidBatchShape {
        component: ComponentType,
        reason: String,
    },

    /// Components disagree on the number of batches
    #[error(
        "Inconsistent number of batches in batch data. Component '{component}' contains {found} batches, while {checked} contained {expected} batches."
    )]
    InconsistentBatchSize {
        component: ComponentType,
        found: usize,
        checked: String,
        expected: usize,
    },

    /// Field expression that is neither a field name nor a ratio of two fields
    #[error("Invalid field expression '{0}'")]
    InvalidExpression(String),
}

/// Convenience type alias for Results using GridError.
pub type GridResult<T> = Result<T, GridError>;
