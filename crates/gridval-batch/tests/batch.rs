use gridval_batch::{
    assert_valid_batch_data, convert_batch_dataset_to_batch_list, convert_list_to_batch_data,
    merge_sparse, split_sparse, validate_batch_data, validate_batch_data_with, BatchComponent,
    BatchDataset, BatchValidationConfig,
};
use gridval_core::{CalculationType, ComponentTable, ComponentType, Dataset, DatasetKind, GridError};
use gridval_rules::{ErrorKind, ValidationConfig};
use proptest::prelude::*;

fn base() -> Dataset {
    let nodes = ComponentTable::initialize(ComponentType::Node, DatasetKind::Input, 1)
        .unwrap()
        .with_i32("id", &[1])
        .unwrap()
        .with_f64("u_rated", &[400.0])
        .unwrap();
    let loads = ComponentTable::initialize(ComponentType::SymLoad, DatasetKind::Input, 2)
        .unwrap()
        .with_i32("id", &[10, 11])
        .unwrap()
        .with_i32("node", &[1, 1])
        .unwrap()
        .with_i8("status", &[1, 1])
        .unwrap()
        .with_i8("type", &[0, 1])
        .unwrap()
        .with_f64("p_specified", &[1e3, 2e3])
        .unwrap()
        .with_f64("q_specified", &[0.0, 0.0])
        .unwrap();
    Dataset::new(DatasetKind::Input)
        .with_table(nodes)
        .unwrap()
        .with_table(loads)
        .unwrap()
}

/// One load update per batch; batch `bad` switches the load to status 5.
fn status_batches(n: usize, bad: usize) -> BatchDataset {
    let status: Vec<i8> = (0..n).map(|b| if b == bad { 5 } else { 0 }).collect();
    let updates = ComponentTable::initialize(ComponentType::SymLoad, DatasetKind::Update, n)
        .unwrap()
        .with_i32("id", &vec![11; n])
        .unwrap()
        .with_i8("status", &status)
        .unwrap();
    BatchDataset::new()
        .with_component(BatchComponent::Dense {
            n_batches: n,
            data: updates,
        })
        .unwrap()
}

#[test]
fn test_valid_batches() {
    let batch = status_batches(3, usize::MAX);
    assert_eq!(validate_batch_data(&base(), &batch, None, true).unwrap(), None);
    assert!(assert_valid_batch_data(&base(), &batch, None, true).is_ok());
}

#[test]
fn test_positional_update_with_wrong_row_count() {
    let updates = ComponentTable::initialize(ComponentType::SymLoad, DatasetKind::Update, 1)
        .unwrap()
        .with_f64("p_specified", &[5e3])
        .unwrap();
    let batch = BatchDataset::new()
        .with_component(BatchComponent::Sparse {
            indptr: vec![0, 0, 1],
            data: updates,
        })
        .unwrap();
    let errors = validate_batch_data(&base(), &batch, Some(CalculationType::PowerFlow), true)
        .unwrap()
        .unwrap();
    assert_eq!(errors.keys().copied().collect::<Vec<_>>(), vec![1]);
    assert_eq!(errors[&1].len(), 1);
    assert_eq!(
        errors[&1][0].kind,
        ErrorKind::InvalidId {
            ref_components: vec![ComponentType::SymLoad],
            filters: vec![
                (String::from("update_rows"), 1),
                (String::from("input_rows"), 2),
            ],
        }
    );
}

#[test]
fn test_update_mixing_ids_and_positions() {
    let updates = ComponentTable::initialize(ComponentType::SymLoad, DatasetKind::Update, 2)
        .unwrap()
        .with_optional_i32("id", &[None, Some(11)])
        .unwrap();
    let batch = BatchDataset::new()
        .with_component(BatchComponent::Dense {
            n_batches: 1,
            data: updates,
        })
        .unwrap();
    let errors = validate_batch_data(&base(), &batch, None, true)
        .unwrap()
        .unwrap();
    assert_eq!(errors[&0].len(), 1);
    assert_eq!(errors[&0][0].id_values(), vec![11]);
    assert_eq!(
        errors[&0][0].kind,
        ErrorKind::InvalidId {
            ref_components: vec![ComponentType::SymLoad],
            filters: vec![(String::from("rows_without_id"), 1)],
        }
    );
}

#[test]
fn test_base_id_conflicts_reported_for_every_batch() {
    let mut base = base();
    let clash = ComponentTable::initialize(ComponentType::Shunt, DatasetKind::Input, 1)
        .unwrap()
        .with_i32("id", &[10])
        .unwrap()
        .with_i32("node", &[1])
        .unwrap()
        .with_i8("status", &[1])
        .unwrap()
        .with_f64("g1", &[0.0])
        .unwrap()
        .with_f64("b1", &[0.0])
        .unwrap();
    base.insert(clash).unwrap();

    let errors = validate_batch_data(&base, &status_batches(2, usize::MAX), None, true)
        .unwrap()
        .unwrap();
    assert_eq!(errors.len(), 2);
    assert!(errors
        .values()
        .all(|e| e[0].kind == ErrorKind::MultiComponentNotUnique));
}

#[test]
fn test_malformed_indptr_aborts() {
    let updates = ComponentTable::initialize(ComponentType::SymLoad, DatasetKind::Update, 2).unwrap();
    let batch = BatchDataset::new()
        .with_component(BatchComponent::Sparse {
            indptr: vec![0, 3],
            data: updates,
        })
        .unwrap();
    let err = validate_batch_data(&base(), &batch, None, true).unwrap_err();
    assert!(matches!(err, GridError::MalformedIndptr { .. }));
}

#[test]
fn test_single_thread_config() {
    let config = BatchValidationConfig {
        validation: ValidationConfig::new(Some(CalculationType::PowerFlow), true),
        threads: 1,
    };
    let errors = validate_batch_data_with(&config, &base(), &status_batches(4, 2))
        .unwrap()
        .unwrap();
    assert_eq!(errors.keys().copied().collect::<Vec<_>>(), vec![2]);
}

#[test]
fn test_list_round_trip() {
    let batch = status_batches(3, 1);
    let list = convert_batch_dataset_to_batch_list(&batch).unwrap();
    assert_eq!(convert_list_to_batch_data(&list).unwrap(), batch);
}

proptest! {
    #[test]
    fn only_the_broken_batch_is_reported((n, bad) in (1usize..8).prop_flat_map(|n| (Just(n), 0..n))) {
        let errors = validate_batch_data(&base(), &status_batches(n, bad), None, true)
            .unwrap()
            .unwrap();
        prop_assert_eq!(errors.keys().copied().collect::<Vec<_>>(), vec![bad]);
        prop_assert_eq!(errors[&bad].len(), 1);
        prop_assert_eq!(errors[&bad][0].kind.clone(), ErrorKind::NotBoolean);
        prop_assert_eq!(errors[&bad][0].id_values(), vec![11]);
    }

    #[test]
    fn split_then_merge_restores_sparse_batch(sizes in prop::collection::vec(0usize..5, 1..10)) {
        let total: usize = sizes.iter().sum();
        let ids: Vec<i32> = (0..total as i32).collect();
        let data = ComponentTable::initialize(ComponentType::SymGen, DatasetKind::Update, total)
            .unwrap()
            .with_i32("id", &ids)
            .unwrap();
        let mut indptr = vec![0i64];
        for size in &sizes {
            indptr.push(indptr[indptr.len() - 1] + *size as i64);
        }

        let parts = split_sparse(&indptr, &data).unwrap();
        prop_assert_eq!(parts.len(), sizes.len());
        let merged = merge_sparse(ComponentType::SymGen, &parts).unwrap();
        prop_assert_eq!(merged, BatchComponent::Sparse { indptr, data });
    }
}
