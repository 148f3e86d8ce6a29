//! # gridval-rules: Grid Data Validation
//!
//! Checks a [`gridval_core::Dataset`] before it is handed to a calculation
//! engine and reports every problem found, not just the first.
//!
//! ## Validation passes
//!
//! 1. **Structure**: schema conformance, a hard error ([`gridval_core::GridError`])
//! 2. **Required values**: fields the requested calculation needs
//! 3. **Id uniqueness**: ids are unique across all component types
//! 4. **Values**: infinity check, per-component rule sets, sensor
//!    combinations and the tap regulator topology check
//!
//! Passes 2 to 4 collect [`ValidationError`] values.
//!
//! ## Quick Start
//!
//! ```rust
//! use gridval_core::*;
//! use gridval_rules::{validate_input_data, ErrorKind};
//!
//! # fn main() -> GridResult<()> {
//! let nodes = ComponentTable::initialize(ComponentType::Node, DatasetKind::Input, 2)?
//!     .with_i32("id", &[1, 2])?
//!     .with_f64("u_rated", &[10.5e3, -1.0])?;
//! let data = Dataset::new(DatasetKind::Input).with_table(nodes)?;
//!
//! let errors = validate_input_data(&data, Some(CalculationType::PowerFlow), true)?
//!     .expect("u_rated must be positive");
//! assert_eq!(errors.len(), 1);
//! assert!(matches!(errors[0].kind, ErrorKind::NotGreaterThan { .. }));
//! assert_eq!(errors[0].id_values(), vec![2]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`rules`] - Rule primitives over one or more fields
//! - [`components`] - Rule sets per component type
//! - [`required`] - Required fields per calculation
//! - [`defaults`] - Engine defaults applied before comparing
//! - [`sensors`] - Cross-sensor checks for state estimation
//! - [`topology`] - Tap regulator control side check
//! - [`errors`] / [`render`] - Error model and text output

pub mod components;
pub mod config;
pub mod defaults;
pub mod errors;
pub mod expression;
pub mod render;
pub mod required;
pub mod rules;
pub mod sensors;
pub mod topology;
pub mod validate;

pub use config::ValidationConfig;
pub use defaults::with_defaults;
pub use errors::{
    AssertionError, BatchErrors, ErrorKind, FieldRef, IdLookup, ObjectRef, ValidationError,
};
pub use expression::{DefaultValue, Reference};
pub use render::{batch_errors_to_string, errors_to_string};
pub use required::{required_fields, validate_required_values};
pub use validate::{
    assert_valid_input_data, validate_input_data, validate_input_data_with,
    validate_unique_ids_across_components, validate_values,
};
