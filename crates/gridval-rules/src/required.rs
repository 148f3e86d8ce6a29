//! Required-field resolver.
//!
//! Which fields must be provided depends on the component, on the calculation
//! the data is meant for and on whether that calculation is symmetric. A few
//! components accept alternative field groups; those are resolved per row
//! before looking for missing values.

use gridval_core::{
    CalculationType, ComponentFamily, ComponentTable, ComponentType, Dataset, FaultType,
    GridResult,
};
use tracing::debug;

use crate::errors::ValidationError;
use crate::rules::none_missing_in_rows;

const ASYM_LINE_RX: [&str; 12] = [
    "r_aa", "r_ba", "r_bb", "r_ca", "r_cb", "r_cc", "x_aa", "x_ba", "x_bb", "x_ca", "x_cb", "x_cc",
];
const ASYM_LINE_C: [&str; 6] = ["c_aa", "c_ba", "c_bb", "c_ca", "c_cb", "c_cc"];

/// Whether asymmetric quantities are needed for this run.
///
/// Besides an explicitly asymmetric calculation, a fault of any type other
/// than three-phase makes a short-circuit calculation asymmetric.
pub fn is_asymmetric(
    data: &Dataset,
    calculation: Option<CalculationType>,
    symmetric: bool,
) -> bool {
    if !symmetric {
        return true;
    }
    if !CalculationType::ShortCircuit.applies_to(calculation) {
        return false;
    }
    let Some(faults) = data.get(ComponentType::Fault) else {
        return false;
    };
    let Ok(types) = faults.column("fault_type") else {
        return false;
    };
    (0..faults.n_rows()).any(|row| {
        types
            .int(row)
            .and_then(FaultType::from_value)
            .is_some_and(|t| t != FaultType::ThreePhase)
    })
}

/// Fields every row of `component` must provide.
pub fn required_fields(
    component: ComponentType,
    calculation: Option<CalculationType>,
    asymmetric: bool,
) -> Vec<&'static str> {
    let pf = CalculationType::PowerFlow.applies_to(calculation);
    let se = CalculationType::StateEstimation.applies_to(calculation);
    let sc = CalculationType::ShortCircuit.applies_to(calculation);

    let mut fields = vec!["id"];
    match component.family() {
        ComponentFamily::Node => {}
        ComponentFamily::Branch => {
            fields.extend(["from_node", "to_node", "from_status", "to_status"])
        }
        ComponentFamily::Branch3 => fields.extend([
            "node_1", "node_2", "node_3", "status_1", "status_2", "status_3",
        ]),
        ComponentFamily::Appliance => fields.extend(["node", "status"]),
        ComponentFamily::Sensor => fields.push("measured_object"),
        ComponentFamily::Fault => fields.push("fault_object"),
        ComponentFamily::Regulator => fields.extend(["regulated_object", "status"]),
    }

    match component {
        ComponentType::Node => fields.push("u_rated"),
        ComponentType::Line => {
            fields.extend(["r1", "x1", "c1", "tan1"]);
            if asymmetric {
                fields.extend(["r0", "x0", "c0", "tan0"]);
            }
        }
        ComponentType::AsymLine => fields.extend(ASYM_LINE_RX),
        ComponentType::Link => {}
        ComponentType::GenericBranch => fields.extend(["r1", "x1", "g1", "b1"]),
        ComponentType::Transformer => fields.extend([
            "u1",
            "u2",
            "sn",
            "uk",
            "pk",
            "i0",
            "p0",
            "winding_from",
            "winding_to",
            "clock",
            "tap_side",
            "tap_min",
            "tap_max",
            "tap_size",
        ]),
        ComponentType::ThreeWindingTransformer => fields.extend([
            "u1", "u2", "u3", "sn_1", "sn_2", "sn_3", "uk_12", "uk_13", "uk_23", "pk_12",
            "pk_13", "pk_23", "i0", "p0", "winding_1", "winding_2", "winding_3", "clock_12",
            "clock_13", "tap_side", "tap_min", "tap_max", "tap_size",
        ]),
        ComponentType::Source => {
            if pf {
                fields.push("u_ref");
            }
        }
        ComponentType::Shunt => {
            fields.extend(["g1", "b1"]);
            if asymmetric {
                fields.extend(["g0", "b0"]);
            }
        }
        ComponentType::SymLoad
        | ComponentType::SymGen
        | ComponentType::AsymLoad
        | ComponentType::AsymGen => {
            fields.push("type");
            if pf {
                fields.extend(["p_specified", "q_specified"]);
            }
        }
        ComponentType::SymVoltageSensor | ComponentType::AsymVoltageSensor => {
            if se {
                fields.extend(["u_sigma", "u_measured"]);
            }
        }
        ComponentType::SymPowerSensor | ComponentType::AsymPowerSensor => {
            fields.push("measured_terminal_type");
            if se {
                fields.extend(["p_measured", "q_measured"]);
            }
        }
        ComponentType::SymCurrentSensor | ComponentType::AsymCurrentSensor => {
            fields.extend(["measured_terminal_type", "angle_measurement_type"]);
            if se {
                fields.extend(["i_sigma", "i_angle_sigma", "i_measured", "i_angle_measured"]);
            }
        }
        ComponentType::Fault => {
            if sc {
                fields.extend(["status", "fault_type"]);
            }
        }
        ComponentType::TransformerTapRegulator => {
            if pf {
                fields.extend(["control_side", "u_set", "u_band"]);
            }
        }
    }
    fields
}

/// How completely a row provides a group of fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Coverage {
    Full,
    Partial,
    Empty,
}

fn coverage(table: &ComponentTable, fields: &[&str], row: usize) -> GridResult<Coverage> {
    let mut present = 0;
    let mut total = 0;
    for field in fields {
        let column = table.column(field)?;
        for phase in 0..column.phases() {
            total += 1;
            if !column.is_missing(row, phase) {
                present += 1;
            }
        }
    }
    Ok(match present {
        0 => Coverage::Empty,
        p if p == total => Coverage::Full,
        _ => Coverage::Partial,
    })
}

/// Per-row requirements for components with alternative field groups.
///
/// `group` fully provided needs nothing more; a group absent altogether needs
/// `fallback`; a partly provided group must be completed.
fn alternative_requirements(
    table: &ComponentTable,
    group: &[&'static str],
    fallback: &[&'static str],
) -> GridResult<Vec<(&'static str, Vec<usize>)>> {
    let mut partial = Vec::new();
    let mut empty = Vec::new();
    for row in 0..table.n_rows() {
        match coverage(table, group, row)? {
            Coverage::Full => {}
            Coverage::Partial => partial.push(row),
            Coverage::Empty => empty.push(row),
        }
    }
    let mut out: Vec<(&'static str, Vec<usize>)> = Vec::new();
    if !empty.is_empty() {
        out.extend(fallback.iter().map(|f| (*f, empty.clone())));
    }
    if !partial.is_empty() {
        out.extend(group.iter().map(|f| (*f, partial.clone())));
    }
    Ok(out)
}

/// Missing-value errors for every present component.
///
/// One error per `(component, field)`, ids in row order.
pub fn validate_required_values(
    data: &Dataset,
    calculation: Option<CalculationType>,
    symmetric: bool,
) -> GridResult<Vec<ValidationError>> {
    let asymmetric = is_asymmetric(data, calculation, symmetric);
    let se = CalculationType::StateEstimation.applies_to(calculation);
    debug!(?calculation, asymmetric, "checking required values");

    let mut errors = Vec::new();
    for table in data.tables() {
        let component = table.component();
        let all_rows: Vec<usize> = (0..table.n_rows()).collect();
        for field in required_fields(component, calculation, asymmetric) {
            errors.extend(none_missing_in_rows(table, field, &all_rows)?);
        }

        let alternatives = match component {
            ComponentType::SymPowerSensor | ComponentType::AsymPowerSensor if se => {
                alternative_requirements(table, &["p_sigma", "q_sigma"], &["power_sigma"])?
            }
            ComponentType::AsymLine => alternative_requirements(table, &ASYM_LINE_C, &["c0", "c1"])?,
            _ => Vec::new(),
        };
        for (field, rows) in alternatives {
            errors.extend(none_missing_in_rows(table, field, &rows)?);
        }
    }
    Ok(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use gridval_core::DatasetKind;

    #[test]
    fn test_power_flow_needs_load_setpoints() {
        let pf = required_fields(ComponentType::SymLoad, Some(CalculationType::PowerFlow), false);
        assert!(pf.contains(&"p_specified"));
        let sc = required_fields(ComponentType::SymLoad, Some(CalculationType::ShortCircuit), false);
        assert!(!sc.contains(&"p_specified"));
        assert_eq!(&sc[..4], &["id", "node", "status", "type"]);
    }

    #[test]
    fn test_unspecified_calculation_needs_everything() {
        let all = required_fields(ComponentType::Fault, None, false);
        assert!(all.contains(&"fault_type"));
        let pf = required_fields(ComponentType::Fault, Some(CalculationType::PowerFlow), false);
        assert!(!pf.contains(&"fault_type"));
    }

    #[test]
    fn test_asymmetric_fault_makes_short_circuit_asymmetric() {
        let faults = ComponentTable::initialize(ComponentType::Fault, DatasetKind::Input, 1)
            .unwrap()
            .with_i8("fault_type", &[1])
            .unwrap();
        let data = Dataset::new(DatasetKind::Input).with_table(faults).unwrap();
        assert!(is_asymmetric(&data, Some(CalculationType::ShortCircuit), true));
        assert!(is_asymmetric(&data, None, true));
        assert!(!is_asymmetric(&data, Some(CalculationType::PowerFlow), true));
    }

    #[test]
    fn test_asymmetric_run_needs_zero_sequence() {
        let symmetric = required_fields(ComponentType::Line, Some(CalculationType::PowerFlow), false);
        let asymmetric = required_fields(ComponentType::Line, Some(CalculationType::PowerFlow), true);
        for name in ["r0", "x0", "c0", "tan0"] {
            assert!(!symmetric.contains(&name));
            assert!(asymmetric.contains(&name));
        }

        let shunts = ComponentTable::initialize(ComponentType::Shunt, DatasetKind::Input, 1)
            .unwrap()
            .with_i32("id", &[4])
            .unwrap()
            .with_i32("node", &[1])
            .unwrap()
            .with_i8("status", &[1])
            .unwrap()
            .with_f64("g1", &[0.0])
            .unwrap()
            .with_f64("b1", &[0.0])
            .unwrap();
        let data = Dataset::new(DatasetKind::Input).with_table(shunts).unwrap();
        assert!(validate_required_values(&data, Some(CalculationType::PowerFlow), true)
            .unwrap()
            .is_empty());

        let errors =
            validate_required_values(&data, Some(CalculationType::PowerFlow), false).unwrap();
        let summary: Vec<_> = errors
            .iter()
            .map(|e| (e.field_names()[0], e.id_values()))
            .collect();
        assert_eq!(summary, vec![("g0", vec![4]), ("b0", vec![4])]);
    }

    #[test]
    fn test_asym_line_capacitance_alternatives() {
        // row 1: full matrix, row 2: no capacitance at all, row 3: only c_aa
        let mut lines = ComponentTable::initialize(ComponentType::AsymLine, DatasetKind::Input, 3)
            .unwrap()
            .with_i32("id", &[1, 2, 3])
            .unwrap()
            .with_f64("c_aa", &[1e-9, f64::NAN, 1e-9])
            .unwrap();
        for name in &ASYM_LINE_C[1..] {
            lines = lines.with_f64(name, &[1e-9, f64::NAN, f64::NAN]).unwrap();
        }
        let data = Dataset::new(DatasetKind::Input).with_table(lines).unwrap();

        let errors = validate_required_values(&data, Some(CalculationType::PowerFlow), true).unwrap();
        let summary: Vec<_> = errors
            .iter()
            .filter(|e| {
                let name = e.field_names()[0];
                name == "c0" || name == "c1" || ASYM_LINE_C.iter().any(|c| *c == name)
            })
            .map(|e| (e.field_names()[0], e.id_values()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("c0", vec![2]),
                ("c1", vec![2]),
                ("c_ba", vec![3]),
                ("c_bb", vec![3]),
                ("c_ca", vec![3]),
                ("c_cb", vec![3]),
                ("c_cc", vec![3]),
            ]
        );
    }

    #[test]
    fn test_power_sigma_alternatives() {
        let sensors = ComponentTable::initialize(ComponentType::SymPowerSensor, DatasetKind::Input, 3)
            .unwrap()
            .with_i32("id", &[1, 2, 3])
            .unwrap()
            .with_i32("measured_object", &[9, 9, 9])
            .unwrap()
            .with_i8("measured_terminal_type", &[9, 9, 9])
            .unwrap()
            .with_f64("p_measured", &[1.0, 1.0, 1.0])
            .unwrap()
            .with_f64("q_measured", &[1.0, 1.0, 1.0])
            .unwrap()
            .with_f64("p_sigma", &[1.0, f64::NAN, 1.0])
            .unwrap()
            .with_f64("q_sigma", &[1.0, f64::NAN, f64::NAN])
            .unwrap();
        let data = Dataset::new(DatasetKind::Input).with_table(sensors).unwrap();
        let errors =
            validate_required_values(&data, Some(CalculationType::StateEstimation), true).unwrap();
        let summary: Vec<_> = errors
            .iter()
            .map(|e| (e.field_names()[0].to_string(), e.id_values()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("power_sigma".to_string(), vec![2]),
                ("q_sigma".to_string(), vec![3]),
            ]
        );
        assert!(errors.iter().all(|e| e.kind == ErrorKind::MissingValue));
    }
}
