//! Validation entry points for a single dataset.

use gridval_core::{CalculationType, ComponentType, Dataset, DatasetKind, GridResult};
use tracing::{debug, info};

use crate::config::ValidationConfig;
use crate::components::rule_set;
use crate::defaults::with_defaults;
use crate::errors::{AssertionError, ValidationError};
use crate::required::validate_required_values;
use crate::rules::{all_cross_unique, all_finite};
use crate::sensors::validate_sensor_combinations;
use crate::topology::validate_tap_regulator_control_side_topology;

const POWER_SIGMAS: &[&str] = &["p_sigma", "q_sigma"];
const CURRENT_SIGMAS: &[&str] = &["i_sigma", "i_angle_sigma"];

/// Float fields where infinity is a legal value.
const INFINITY_ALLOWED: &[(ComponentType, &[&str])] = &[
    (ComponentType::SymPowerSensor, POWER_SIGMAS),
    (ComponentType::AsymPowerSensor, POWER_SIGMAS),
    (ComponentType::SymCurrentSensor, CURRENT_SIGMAS),
    (ComponentType::AsymCurrentSensor, CURRENT_SIGMAS),
];

/// Ids shared between objects of different component types.
pub fn validate_unique_ids_across_components(data: &Dataset) -> GridResult<Vec<ValidationError>> {
    let pairs: Vec<(ComponentType, &str)> = data.components().map(|c| (c, "id")).collect();
    Ok(all_cross_unique(data, &pairs)?.into_iter().collect())
}

/// Value rules for every present component.
///
/// Works on a defaulted copy of `data`; the caller's dataset is untouched.
pub fn validate_values(
    data: &Dataset,
    calculation: Option<CalculationType>,
) -> GridResult<Vec<ValidationError>> {
    let data = with_defaults(data)?;
    let mut errors = all_finite(&data, INFINITY_ALLOWED);

    for component in data.components() {
        let rules = rule_set(component);
        if !rules.applies_to(calculation) {
            continue;
        }
        let found = (rules.check)(&data, component)?;
        debug!(%component, errors = found.len(), "checked rule set");
        errors.extend(found);
    }

    if CalculationType::StateEstimation.applies_to(calculation) {
        errors.extend(validate_sensor_combinations(&data)?);
    }
    if CalculationType::PowerFlow.applies_to(calculation) {
        errors.extend(validate_tap_regulator_control_side_topology(&data)?);
    }
    Ok(errors)
}

/// Validate an input dataset.
///
/// Returns `Ok(None)` when the data is valid and `Ok(Some(errors))` otherwise.
/// A malformed dataset (unknown field, wrong dtype or shape) is an `Err` and
/// no rules are run.
pub fn validate_input_data(
    data: &Dataset,
    calculation: Option<CalculationType>,
    symmetric: bool,
) -> GridResult<Option<Vec<ValidationError>>> {
    data.check_structure(DatasetKind::Input)?;
    let stats = data.stats();
    debug!(
        components = stats.components,
        rows = stats.rows,
        ?calculation,
        symmetric,
        "validating input data"
    );

    let mut errors = validate_required_values(data, calculation, symmetric)?;
    errors.extend(validate_unique_ids_across_components(data)?);
    errors.extend(validate_values(data, calculation)?);

    info!(errors = errors.len(), "input data validated");
    Ok((!errors.is_empty()).then_some(errors))
}

/// [`validate_input_data`] with settings from a [`ValidationConfig`].
pub fn validate_input_data_with(
    config: &ValidationConfig,
    data: &Dataset,
) -> GridResult<Option<Vec<ValidationError>>> {
    validate_input_data(data, config.calculation_type, config.symmetric)
}

pub fn assert_valid_input_data(
    data: &Dataset,
    calculation: Option<CalculationType>,
    symmetric: bool,
) -> Result<(), AssertionError> {
    match validate_input_data(data, calculation, symmetric)? {
        None => Ok(()),
        Some(errors) => Err(AssertionError::Invalid {
            name: String::from("input_data"),
            errors,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use gridval_core::ComponentTable;

    fn nodes(ids: &[i32]) -> ComponentTable {
        ComponentTable::initialize(ComponentType::Node, DatasetKind::Input, ids.len())
            .unwrap()
            .with_i32("id", ids)
            .unwrap()
            .with_f64("u_rated", &vec![10.5e3; ids.len()])
            .unwrap()
    }

    #[test]
    fn test_valid_nodes() {
        let data = Dataset::new(DatasetKind::Input).with_table(nodes(&[1, 2])).unwrap();
        assert_eq!(validate_input_data(&data, None, true).unwrap(), None);
        assert!(assert_valid_input_data(&data, None, true).is_ok());
    }

    #[test]
    fn test_ids_unique_across_components() {
        let source = ComponentTable::initialize(ComponentType::Source, DatasetKind::Input, 1)
            .unwrap()
            .with_i32("id", &[2])
            .unwrap()
            .with_i32("node", &[1])
            .unwrap()
            .with_i8("status", &[1])
            .unwrap()
            .with_f64("u_ref", &[1.0])
            .unwrap();
        let data = Dataset::new(DatasetKind::Input)
            .with_table(nodes(&[1, 2]))
            .unwrap()
            .with_table(source)
            .unwrap();
        let errors = validate_input_data(&data, Some(CalculationType::PowerFlow), true)
            .unwrap()
            .unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::MultiComponentNotUnique);
        assert_eq!(errors[0].components(), vec![ComponentType::Node, ComponentType::Source]);
    }

    #[test]
    fn test_update_dataset_is_structural_error() {
        let data = Dataset::new(DatasetKind::Update);
        assert!(validate_input_data(&data, None, true).is_err());
    }

    #[test]
    fn test_infinite_sigma_allowed() {
        let sensors = ComponentTable::initialize(ComponentType::SymPowerSensor, DatasetKind::Input, 1)
            .unwrap()
            .with_f64("p_sigma", &[f64::INFINITY])
            .unwrap()
            .with_f64("p_measured", &[f64::INFINITY])
            .unwrap();
        let data = Dataset::new(DatasetKind::Input).with_table(sensors).unwrap();
        let errors = all_finite(&data, INFINITY_ALLOWED);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field_names(), vec!["p_measured"]);
    }

    #[test]
    fn test_assertion_error_reports_count() {
        let data = Dataset::new(DatasetKind::Input).with_table(nodes(&[1, 1])).unwrap();
        let err = assert_valid_input_data(&data, None, true).unwrap_err();
        assert_eq!(err.error_count(), 1);
        assert!(err.to_string().contains("input_data"));
    }
}
