//! # gridval-batch: Batch Validation
//!
//! Validates many update scenarios against one base input dataset. Each
//! batch is merged onto its own copy of the base and checked independently on
//! a rayon thread pool.
//!
//! ```rust
//! use gridval_batch::{validate_batch_data, BatchComponent, BatchDataset};
//! use gridval_core::*;
//!
//! # fn main() -> GridResult<()> {
//! let nodes = ComponentTable::initialize(ComponentType::Node, DatasetKind::Input, 1)?
//!     .with_i32("id", &[1])?
//!     .with_f64("u_rated", &[10.5e3])?;
//! let base = Dataset::new(DatasetKind::Input).with_table(nodes)?;
//!
//! // batch 0 touches node 1, batch 1 refers to an unknown node
//! let updates = ComponentTable::initialize(ComponentType::Node, DatasetKind::Update, 2)?
//!     .with_i32("id", &[1, 7])?;
//! let batch = BatchDataset::new().with_component(BatchComponent::Sparse {
//!     indptr: vec![0, 1, 2],
//!     data: updates,
//! })?;
//!
//! let errors = validate_batch_data(&base, &batch, None, true)?.unwrap();
//! assert_eq!(errors.keys().copied().collect::<Vec<_>>(), vec![1]);
//! # Ok(())
//! # }
//! ```

pub mod reshape;
pub mod runner;
pub mod update;

pub use reshape::{
    check_indptr_consistency, convert_batch_dataset_to_batch_list, convert_list_to_batch_data,
    merge_sparse, split_dense, split_sparse, BatchComponent, BatchDataset,
};
pub use runner::{
    assert_valid_batch_data, validate_batch_data, validate_batch_data_with, BatchValidationConfig,
};
pub use update::{update_input_data, validate_ids_exist};
