//! Batch representations and conversions between them.
//!
//! A batch holds many update datasets for one base dataset. Per component the
//! updates are stored either
//! - **dense**: every batch has the same number of rows, stacked in batch order
//! - **sparse**: rows of all batches concatenated, with `indptr[b]..indptr[b + 1]`
//!   giving the rows of batch `b`
//!
//! Every conversion checks the index pointer before using it.

use std::collections::BTreeMap;

use gridval_core::{ComponentTable, ComponentType, Dataset, DatasetKind, GridError, GridResult};

/// Update rows of one component across all batches.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchComponent {
    Dense {
        n_batches: usize,
        data: ComponentTable,
    },
    Sparse {
        indptr: Vec<i64>,
        data: ComponentTable,
    },
}

impl BatchComponent {
    pub fn data(&self) -> &ComponentTable {
        match self {
            BatchComponent::Dense { data, .. } | BatchComponent::Sparse { data, .. } => data,
        }
    }

    pub fn component(&self) -> ComponentType {
        self.data().component()
    }

    /// Number of batches, after checking the layout.
    pub fn n_batches(&self) -> GridResult<usize> {
        match self {
            BatchComponent::Dense { n_batches, data } => {
                check_dense_shape(*n_batches, data)?;
                Ok(*n_batches)
            }
            BatchComponent::Sparse { indptr, data } => {
                check_indptr_consistency(data.component(), indptr, data.n_rows())?;
                Ok(indptr.len() - 1)
            }
        }
    }

    /// One table per batch.
    pub fn split(&self) -> GridResult<Vec<ComponentTable>> {
        match self {
            BatchComponent::Dense { n_batches, data } => split_dense(*n_batches, data),
            BatchComponent::Sparse { indptr, data } => split_sparse(indptr, data),
        }
    }
}

fn check_dense_shape(n_batches: usize, data: &ComponentTable) -> GridResult<()> {
    let rows = data.n_rows();
    if n_batches == 0 {
        if rows == 0 {
            return Ok(());
        }
        return Err(GridError::InvalidBatchShape {
            component: data.component(),
            reason: format!("{rows} rows for zero batches"),
        });
    }
    if rows % n_batches != 0 {
        return Err(GridError::InvalidBatchShape {
            component: data.component(),
            reason: format!("{rows} rows cannot be split into {n_batches} equal batches"),
        });
    }
    Ok(())
}

/// Check a sparse index pointer against the number of data rows.
///
/// It must start at zero, never decrease and end at `n_rows`.
pub fn check_indptr_consistency(
    component: ComponentType,
    indptr: &[i64],
    n_rows: usize,
) -> GridResult<()> {
    let malformed = |reason: String| GridError::MalformedIndptr { component, reason };
    let (Some(&first), Some(&last)) = (indptr.first(), indptr.last()) else {
        return Err(malformed(String::from("indptr is empty")));
    };
    if first != 0 {
        return Err(malformed(format!("indptr should start from zero, got {first}")));
    }
    if let Some(pos) = indptr.windows(2).position(|w| w[1] < w[0]) {
        return Err(malformed(format!(
            "indptr should be increasing, but decreases after position {pos}"
        )));
    }
    if usize::try_from(last).ok() != Some(n_rows) {
        return Err(malformed(format!(
            "indptr should end with the number of rows ({n_rows}), got {last}"
        )));
    }
    Ok(())
}

/// Per-batch tables of a sparse component.
pub fn split_sparse(indptr: &[i64], data: &ComponentTable) -> GridResult<Vec<ComponentTable>> {
    check_indptr_consistency(data.component(), indptr, data.n_rows())?;
    Ok(indptr
        .windows(2)
        .map(|w| data.slice(w[0] as usize, w[1] as usize))
        .collect())
}

/// Concatenate per-batch tables into a sparse component.
pub fn merge_sparse(component: ComponentType, tables: &[ComponentTable]) -> GridResult<BatchComponent> {
    let mut indptr = Vec::with_capacity(tables.len() + 1);
    indptr.push(0);
    let mut offset = 0i64;
    for table in tables {
        offset += table.n_rows() as i64;
        indptr.push(offset);
    }
    let refs: Vec<&ComponentTable> = tables.iter().collect();
    let data = ComponentTable::concat(component, DatasetKind::Update, &refs)?;
    Ok(BatchComponent::Sparse { indptr, data })
}

/// Per-batch tables of a dense component.
pub fn split_dense(n_batches: usize, data: &ComponentTable) -> GridResult<Vec<ComponentTable>> {
    check_dense_shape(n_batches, data)?;
    if n_batches == 0 {
        return Ok(Vec::new());
    }
    let per_batch = data.n_rows() / n_batches;
    Ok((0..n_batches)
        .map(|b| data.slice(b * per_batch, (b + 1) * per_batch))
        .collect())
}

/// Update data for many batches, keyed by component.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchDataset {
    components: BTreeMap<ComponentType, BatchComponent>,
}

impl BatchDataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the batch data of its component type.
    pub fn insert(&mut self, batch: BatchComponent) -> GridResult<()> {
        let kind = batch.data().kind();
        if kind != DatasetKind::Update {
            return Err(GridError::DatasetKindMismatch {
                expected: DatasetKind::Update,
                actual: kind,
            });
        }
        self.components.insert(batch.component(), batch);
        Ok(())
    }

    pub fn with_component(mut self, batch: BatchComponent) -> GridResult<Self> {
        self.insert(batch)?;
        Ok(self)
    }

    pub fn get(&self, component: ComponentType) -> Option<&BatchComponent> {
        self.components.get(&component)
    }

    pub fn components(&self) -> impl Iterator<Item = (ComponentType, &BatchComponent)> {
        self.components.iter().map(|(c, b)| (*c, b))
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Number of batches shared by all components; zero when empty.
    pub fn batch_size(&self) -> GridResult<usize> {
        let mut checked: Vec<ComponentType> = Vec::new();
        let mut size = None;
        for (component, batch) in &self.components {
            let n = batch.n_batches()?;
            match size {
                None => size = Some(n),
                Some(expected) if expected != n => {
                    let names: Vec<String> = checked.iter().map(|c| format!("'{c}'")).collect();
                    return Err(GridError::InconsistentBatchSize {
                        component: *component,
                        found: n,
                        checked: names.join("/"),
                        expected,
                    });
                }
                Some(_) => {}
            }
            checked.push(*component);
        }
        Ok(size.unwrap_or(0))
    }
}

/// One update dataset per batch.
///
/// Components without rows in a batch are left out of that batch's dataset.
pub fn convert_batch_dataset_to_batch_list(batch: &BatchDataset) -> GridResult<Vec<Dataset>> {
    let n_batches = batch.batch_size()?;
    let mut out: Vec<Dataset> = (0..n_batches).map(|_| Dataset::new(DatasetKind::Update)).collect();
    for (_, component) in batch.components() {
        for (dataset, table) in out.iter_mut().zip(component.split()?) {
            if !table.is_empty() {
                dataset.insert(table)?;
            }
        }
    }
    Ok(out)
}

/// Batch data from a list of update datasets.
///
/// A component with the same row count in every batch is stored dense,
/// otherwise sparse. A component missing from a dataset counts as zero rows.
pub fn convert_list_to_batch_data(list: &[Dataset]) -> GridResult<BatchDataset> {
    let mut components: Vec<ComponentType> = Vec::new();
    for dataset in list {
        if dataset.kind() != DatasetKind::Update {
            return Err(GridError::DatasetKindMismatch {
                expected: DatasetKind::Update,
                actual: dataset.kind(),
            });
        }
        for component in dataset.components() {
            if !components.contains(&component) {
                components.push(component);
            }
        }
    }

    let mut out = BatchDataset::new();
    for component in components {
        let tables = list
            .iter()
            .map(|dataset| match dataset.get(component) {
                Some(table) => Ok(table.clone()),
                None => ComponentTable::initialize(component, DatasetKind::Update, 0),
            })
            .collect::<GridResult<Vec<_>>>()?;
        let first_rows = tables.first().map_or(0, ComponentTable::n_rows);
        let uniform = tables.iter().all(|t| t.n_rows() == first_rows);
        let batch = if uniform {
            let refs: Vec<&ComponentTable> = tables.iter().collect();
            BatchComponent::Dense {
                n_batches: tables.len(),
                data: ComponentTable::concat(component, DatasetKind::Update, &refs)?,
            }
        } else {
            merge_sparse(component, &tables)?
        };
        out.insert(batch)?;
    }
    Ok(out)
}
