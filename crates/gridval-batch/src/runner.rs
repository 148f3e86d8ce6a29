//! Parallel validation of batch update data.
//!
//! Every batch is checked for unknown update ids, merged onto a private copy
//! of the base input data and then validated like a single dataset.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use gridval_core::{CalculationType, Dataset, DatasetKind, GridResult};
use gridval_rules::{
    validate_required_values, validate_unique_ids_across_components, validate_values,
    AssertionError, BatchErrors, ValidationConfig, ValidationError,
};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::reshape::{convert_batch_dataset_to_batch_list, BatchDataset};
use crate::update::{update_input_data, validate_ids_exist};

/// Settings for a batch validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchValidationConfig {
    /// Calculation the batches are meant for.
    pub validation: ValidationConfig,

    /// Number of worker threads (0 = auto-detect).
    pub threads: usize,
}

impl Default for BatchValidationConfig {
    fn default() -> Self {
        Self {
            validation: ValidationConfig::default(),
            threads: 0,
        }
    }
}

impl BatchValidationConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("parsing batch validation config")
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading batch validation config {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("loading batch validation config {}", path.display()))
    }

    fn thread_count(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}

/// Validate one batch: update ids first, then the merged dataset.
fn validate_batch(
    index: usize,
    base: &Dataset,
    update: &Dataset,
    base_errors: &[ValidationError],
    config: &ValidationConfig,
) -> GridResult<Vec<ValidationError>> {
    update.check_structure(DatasetKind::Update)?;
    let mut errors = base_errors.to_vec();

    let id_errors = validate_ids_exist(update, base)?;
    if !id_errors.is_empty() {
        debug!(batch = index, errors = id_errors.len(), "update ids rejected");
        errors.extend(id_errors);
        return Ok(errors);
    }

    let merged = update_input_data(base, update)?;
    errors.extend(validate_required_values(
        &merged,
        config.calculation_type,
        config.symmetric,
    )?);
    errors.extend(validate_values(&merged, config.calculation_type)?);
    Ok(errors)
}

/// Validate every batch of `batch` applied to `base`.
///
/// Batches run in parallel, each on its own merged copy of `base`. Returns
/// `Ok(None)` when all batches are valid; otherwise the map holds only the
/// batches with errors. A structural problem in any batch aborts the run.
pub fn validate_batch_data_with(
    config: &BatchValidationConfig,
    base: &Dataset,
    batch: &BatchDataset,
) -> GridResult<Option<BatchErrors>> {
    base.check_structure(DatasetKind::Input)?;
    let base_errors = validate_unique_ids_across_components(base)?;
    let updates = convert_batch_dataset_to_batch_list(batch)?;
    let threads = config.thread_count();
    info!(batches = updates.len(), threads, "validating batch data");

    let run = || {
        updates
            .par_iter()
            .enumerate()
            .map(|(index, update)| {
                validate_batch(index, base, update, &base_errors, &config.validation)
                    .map(|errors| (index, errors))
                    .inspect_err(|err| warn!(batch = index, %err, "batch validation aborted"))
            })
            .collect::<GridResult<Vec<_>>>()
    };
    let results = match ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(run)?,
        Err(err) => {
            warn!(%err, "could not build thread pool, using the global pool");
            run()?
        }
    };

    let errors: BatchErrors = results
        .into_iter()
        .filter(|(_, errors)| !errors.is_empty())
        .collect::<BTreeMap<_, _>>();
    info!(invalid = errors.len(), "batch data validated");
    Ok((!errors.is_empty()).then_some(errors))
}

pub fn validate_batch_data(
    base: &Dataset,
    batch: &BatchDataset,
    calculation: Option<CalculationType>,
    symmetric: bool,
) -> GridResult<Option<BatchErrors>> {
    let config = BatchValidationConfig {
        validation: ValidationConfig::new(calculation, symmetric),
        ..BatchValidationConfig::default()
    };
    validate_batch_data_with(&config, base, batch)
}

pub fn assert_valid_batch_data(
    base: &Dataset,
    batch: &BatchDataset,
    calculation: Option<CalculationType>,
    symmetric: bool,
) -> Result<(), AssertionError> {
    match validate_batch_data(base, batch, calculation, symmetric)? {
        None => Ok(()),
        Some(errors) => Err(AssertionError::InvalidBatch {
            name: String::from("update_data"),
            errors,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_defaults() {
        let config = BatchValidationConfig::from_toml_str("threads = 2").unwrap();
        assert_eq!(config.threads, 2);
        assert_eq!(config.validation, ValidationConfig::default());
        assert_eq!(BatchValidationConfig::default().thread_count(), num_cpus::get());
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "threads = 1").unwrap();
        writeln!(file, "[validation]").unwrap();
        writeln!(file, "calculation_type = \"power_flow\"").unwrap();
        let config = BatchValidationConfig::from_path(file.path()).unwrap();
        assert_eq!(
            config.validation.calculation_type,
            Some(CalculationType::PowerFlow)
        );
        assert!(config.validation.symmetric);
    }
}
