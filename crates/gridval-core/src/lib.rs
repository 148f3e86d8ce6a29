//! # gridval-core: Grid Dataset Model
//!
//! Typed, tabular description of an electrical grid as consumed by a
//! calculation engine, together with the schema registry it conforms to.
//!
//! ## Design Philosophy
//!
//! A dataset is a map from a **closed set of component types** to tables:
//! - **Tables**: one [`ComponentTable`] per component type, one [`Column`] per field
//! - **Schemas**: fixed field lists per `(DatasetKind, ComponentType)`
//! - **Missing values**: every field may be "not provided"; the sentinel
//!   encoding is private to [`Column`] and reads return `Option`
//!
//! Structural problems (unknown fields, wrong dtype, wrong shape) are rejected
//! when tables are built and surface as [`GridError`].
//!
//! ## Quick Start
//!
//! ```rust
//! use gridval_core::*;
//!
//! # fn main() -> GridResult<()> {
//! let nodes = ComponentTable::initialize(ComponentType::Node, DatasetKind::Input, 2)?
//!     .with_i32("id", &[1, 2])?
//!     .with_f64("u_rated", &[10.5e3, f64::NAN])?;
//!
//! let data = Dataset::new(DatasetKind::Input).with_table(nodes)?;
//! data.check_structure(DatasetKind::Input)?;
//!
//! let u_rated = data.get(ComponentType::Node).unwrap().column("u_rated")?;
//! assert_eq!(u_rated.value(0, 0), Some(10.5e3));
//! assert_eq!(u_rated.value(1, 0), None);
//! # Ok(())
//! # }
//! ```
//!
//! ## Modules
//!
//! - [`component`] - Component type tags and families
//! - [`enums`] - Enumerated field domains (winding, fault type, ...)
//! - [`schema`] - Field registry per component and dataset kind
//! - [`column`] - Column storage
//! - [`dataset`] - Component tables and datasets
//! - [`error`] - Structural errors

pub mod column;
pub mod component;
pub mod dataset;
pub mod enums;
pub mod error;
pub mod schema;

pub use column::Column;
pub use component::{ComponentFamily, ComponentType, DatasetKind};
pub use dataset::{ComponentTable, Dataset, DatasetStats};
pub use enums::{
    AngleMeasurementType, Branch3Side, BranchSide, CalculationType, EnumKind, FaultPhase,
    FaultType, LoadGenType, MeasuredTerminalType, WindingType,
};
pub use error::{GridError, GridResult};
pub use schema::{Dtype, FieldSpec};
