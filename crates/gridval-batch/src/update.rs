//! Applying one update dataset to the base input data.

use std::collections::HashMap;

use gridval_core::{Dataset, DatasetKind, GridError, GridResult};
use gridval_rules::rules::ids_valid_in_update;
use gridval_rules::ValidationError;

/// Update ids that do not refer to objects of the base dataset.
pub fn validate_ids_exist(update: &Dataset, base: &Dataset) -> GridResult<Vec<ValidationError>> {
    let mut errors = Vec::new();
    for component in update.components() {
        errors.extend(ids_valid_in_update(update, base, component)?);
    }
    Ok(errors)
}

/// Copy of `base` with the provided update values written over it.
///
/// Rows are matched by id. An update table without any ids is applied by
/// position. Missing entries in the update leave the base value in place, and
/// rows whose id is unknown to the base are skipped; check them with
/// [`validate_ids_exist`] first.
pub fn update_input_data(base: &Dataset, update: &Dataset) -> GridResult<Dataset> {
    if update.kind() != DatasetKind::Update {
        return Err(GridError::DatasetKindMismatch {
            expected: DatasetKind::Update,
            actual: update.kind(),
        });
    }
    let mut out = base.clone();
    for changes in update.tables() {
        let Some(target) = out.get_mut(changes.component()) else {
            continue;
        };
        let update_ids = changes.ids();
        let rows: Vec<Option<usize>> = if update_ids.iter().all(Option::is_none) {
            (0..changes.n_rows())
                .map(|row| (row < target.n_rows()).then_some(row))
                .collect()
        } else {
            let positions: HashMap<i32, usize> = target
                .ids()
                .into_iter()
                .enumerate()
                .filter_map(|(row, id)| id.map(|id| (id, row)))
                .collect();
            update_ids
                .iter()
                .map(|id| id.and_then(|id| positions.get(&id).copied()))
                .collect()
        };

        for (spec, column) in changes.columns() {
            if spec.name == "id" {
                continue;
            }
            let destination = target.column_mut(spec.name)?;
            for (src_row, dst_row) in rows.iter().enumerate() {
                if let Some(dst_row) = dst_row {
                    destination.overlay_row(*dst_row, column, src_row);
                }
            }
        }
    }
    Ok(out)
}
