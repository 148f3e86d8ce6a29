//! Integration tests for building and reshaping component tables.

use gridval_core::*;
use proptest::prelude::*;

#[test]
fn test_every_component_initializes_in_both_kinds() {
    for component in ComponentType::ALL {
        for kind in [DatasetKind::Input, DatasetKind::Update] {
            let table = ComponentTable::initialize(component, kind, 4).unwrap();
            assert_eq!(table.n_rows(), 4);
            assert!(
                table.check_structure().is_ok(),
                "fresh table must conform: {component} {kind}"
            );
            assert!(table.ids().iter().all(Option::is_none));
        }
    }
}

#[test]
fn test_asymmetric_table_roundtrip() {
    let loads = ComponentTable::initialize(ComponentType::AsymLoad, DatasetKind::Input, 2)
        .unwrap()
        .with_i32("id", &[7, 8])
        .unwrap()
        .with_f64_phases("p_specified", &[[1.0, 2.0, 3.0], [f64::NAN, 5.0, 6.0]])
        .unwrap();

    let p = loads.column("p_specified").unwrap();
    assert_eq!(p.phases(), 3);
    assert_eq!(p.value(0, 2), Some(3.0));
    assert!(p.row_has_missing(1));
    assert!(!p.row_has_missing(0));
}

#[test]
fn test_dataset_iterates_in_canonical_order() {
    let data = Dataset::new(DatasetKind::Input)
        .with_table(
            ComponentTable::initialize(ComponentType::Source, DatasetKind::Input, 1).unwrap(),
        )
        .unwrap()
        .with_table(ComponentTable::initialize(ComponentType::Node, DatasetKind::Input, 1).unwrap())
        .unwrap();
    let order: Vec<_> = data.components().collect();
    assert_eq!(order, vec![ComponentType::Node, ComponentType::Source]);
    assert_eq!(data.stats().rows, 2);
}

proptest! {
    #[test]
    fn split_then_concat_preserves_rows(
        statuses in prop::collection::vec(prop::option::of(0i8..2), 0..20),
        cut in 0usize..20,
    ) {
        let n = statuses.len();
        let cut = cut.min(n);
        let table = ComponentTable::initialize(ComponentType::SymLoad, DatasetKind::Update, n)
            .unwrap()
            .with_optional_i8("status", &statuses)
            .unwrap();

        let head = table.slice(0, cut);
        let tail = table.slice(cut, n);
        let joined = ComponentTable::concat(
            ComponentType::SymLoad,
            DatasetKind::Update,
            &[&head, &tail],
        )
        .unwrap();

        prop_assert_eq!(&joined, &table);
        let column = joined.column("status").unwrap();
        for (row, expected) in statuses.iter().enumerate() {
            prop_assert_eq!(column.int(row), expected.map(i64::from));
        }
    }
}
