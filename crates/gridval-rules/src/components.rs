//! Component rule sets.
//!
//! Each component type maps to one check function in a static registry
//! ([`rule_set`]). Families share rules by composition: a line runs the branch
//! rules, which run the base rules, and so on. Sensors, faults and regulators
//! are only checked for the calculation they matter to.

use gridval_core::{CalculationType, ComponentType, Dataset, EnumKind, GridResult, MeasuredTerminalType};

use crate::errors::{ErrorKind, ValidationError};
use crate::rules::{self, field};

/// Signature shared by all component checks.
pub type CheckFn = fn(&Dataset, ComponentType) -> GridResult<Vec<ValidationError>>;

/// Registry entry for one component type.
#[derive(Clone, Copy)]
pub struct RuleSet {
    pub check: CheckFn,
    /// Calculation the rules are tied to; `None` runs for every calculation
    pub calculation: Option<CalculationType>,
}

impl RuleSet {
    const fn always(check: CheckFn) -> Self {
        Self {
            check,
            calculation: None,
        }
    }

    const fn only_for(calculation: CalculationType, check: CheckFn) -> Self {
        Self {
            check,
            calculation: Some(calculation),
        }
    }

    /// Whether the rules run when validating for `requested`.
    pub fn applies_to(&self, requested: Option<CalculationType>) -> bool {
        self.calculation.map_or(true, |c| c.applies_to(requested))
    }
}

impl std::fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleSet")
            .field("calculation", &self.calculation)
            .finish_non_exhaustive()
    }
}

/// Rule set for a component type.
pub fn rule_set(component: ComponentType) -> RuleSet {
    use CalculationType::*;
    use ComponentType as C;
    match component {
        C::Node => RuleSet::always(validate_node),
        C::Line => RuleSet::always(validate_line),
        C::AsymLine => RuleSet::always(validate_asym_line),
        C::Link => RuleSet::always(validate_branch),
        C::GenericBranch => RuleSet::always(validate_generic_branch),
        C::Transformer => RuleSet::always(validate_transformer),
        C::ThreeWindingTransformer => RuleSet::always(validate_three_winding_transformer),
        C::SymLoad | C::SymGen | C::AsymLoad | C::AsymGen => RuleSet::always(validate_load_gen),
        C::Shunt => RuleSet::always(validate_appliance),
        C::Source => RuleSet::always(validate_source),
        C::SymVoltageSensor | C::AsymVoltageSensor => {
            RuleSet::only_for(StateEstimation, validate_voltage_sensor)
        }
        C::SymPowerSensor | C::AsymPowerSensor => {
            RuleSet::only_for(StateEstimation, validate_power_sensor)
        }
        C::SymCurrentSensor | C::AsymCurrentSensor => {
            RuleSet::only_for(StateEstimation, validate_current_sensor)
        }
        C::Fault => RuleSet::only_for(ShortCircuit, validate_fault),
        C::TransformerTapRegulator => RuleSet::only_for(PowerFlow, validate_transformer_tap_regulator),
    }
}

/// Components a power sensor may measure, whatever the terminal type.
const POWER_MEASURABLE: [ComponentType; 13] = [
    ComponentType::Node,
    ComponentType::Line,
    ComponentType::AsymLine,
    ComponentType::Link,
    ComponentType::GenericBranch,
    ComponentType::Transformer,
    ComponentType::ThreeWindingTransformer,
    ComponentType::Source,
    ComponentType::Shunt,
    ComponentType::SymLoad,
    ComponentType::AsymLoad,
    ComponentType::SymGen,
    ComponentType::AsymGen,
];

const CURRENT_MEASURABLE: [ComponentType; 6] = [
    ComponentType::Line,
    ComponentType::AsymLine,
    ComponentType::Link,
    ComponentType::GenericBranch,
    ComponentType::Transformer,
    ComponentType::ThreeWindingTransformer,
];

const BRANCH3_TERMINALS: [MeasuredTerminalType; 3] = [
    MeasuredTerminalType::Branch3Side1,
    MeasuredTerminalType::Branch3Side2,
    MeasuredTerminalType::Branch3Side3,
];

/// Components a measured terminal type may refer to.
pub fn terminal_targets(terminal: MeasuredTerminalType) -> &'static [ComponentType] {
    match terminal {
        MeasuredTerminalType::BranchFrom | MeasuredTerminalType::BranchTo => {
            &ComponentType::BRANCHES
        }
        MeasuredTerminalType::Source => &[ComponentType::Source],
        MeasuredTerminalType::Shunt => &[ComponentType::Shunt],
        MeasuredTerminalType::Load => &ComponentType::LOADS,
        MeasuredTerminalType::Generator => &ComponentType::GENERATORS,
        MeasuredTerminalType::Branch3Side1
        | MeasuredTerminalType::Branch3Side2
        | MeasuredTerminalType::Branch3Side3 => &[ComponentType::ThreeWindingTransformer],
        MeasuredTerminalType::Node => &[ComponentType::Node],
    }
}

pub fn validate_base(data: &Dataset, component: ComponentType) -> GridResult<Vec<ValidationError>> {
    Ok(rules::all_unique(data, component, "id")?.into_iter().collect())
}

pub fn validate_node(data: &Dataset, component: ComponentType) -> GridResult<Vec<ValidationError>> {
    let mut errors = validate_base(data, component)?;
    errors.extend(field(data, component, "u_rated").greater_than_zero()?);
    Ok(errors)
}

pub fn validate_branch(data: &Dataset, component: ComponentType) -> GridResult<Vec<ValidationError>> {
    let mut errors = validate_base(data, component)?;
    let nodes = [ComponentType::Node];
    errors.extend(rules::all_valid_ids(data, component, "from_node", &nodes, &[])?);
    errors.extend(rules::all_valid_ids(data, component, "to_node", &nodes, &[])?);
    errors.extend(rules::all_not_two_values_equal(data, component, "to_node", "from_node")?);
    errors.extend(rules::all_boolean(data, component, "from_status")?);
    errors.extend(rules::all_boolean(data, component, "to_status")?);
    Ok(errors)
}

pub fn validate_line(data: &Dataset, component: ComponentType) -> GridResult<Vec<ValidationError>> {
    let mut errors = validate_branch(data, component)?;
    errors.extend(rules::all_not_two_values_zero(data, component, "r1", "x1")?);
    errors.extend(rules::all_not_two_values_zero(data, component, "r0", "x0")?);
    errors.extend(field(data, component, "i_n").greater_than_zero()?);
    Ok(errors)
}

const ASYM_LINE_PHASE_RX: [&str; 12] = [
    "r_aa", "r_ba", "r_bb", "r_ca", "r_cb", "r_cc", "x_aa", "x_ba", "x_bb", "x_ca", "x_cb", "x_cc",
];
const ASYM_LINE_NEUTRAL: [&str; 8] = [
    "r_na", "r_nb", "r_nc", "r_nn", "x_na", "x_nb", "x_nc", "x_nn",
];
const ASYM_LINE_C: [&str; 6] = ["c_aa", "c_ba", "c_bb", "c_ca", "c_cb", "c_cc"];

pub fn validate_asym_line(data: &Dataset, component: ComponentType) -> GridResult<Vec<ValidationError>> {
    let mut errors = validate_branch(data, component)?;
    errors.extend(field(data, component, "i_n").greater_than_zero()?);
    for name in ASYM_LINE_PHASE_RX.iter().chain(ASYM_LINE_NEUTRAL.iter()) {
        errors.extend(field(data, component, name).greater_than_zero()?);
    }
    for name in ASYM_LINE_C {
        errors.extend(field(data, component, name).greater_or_equal_zero()?);
    }

    // neutral row and column are given completely or not at all
    if let Some(table) = data.get(component) {
        let columns = ASYM_LINE_NEUTRAL
            .iter()
            .map(|name| table.column(name))
            .collect::<GridResult<Vec<_>>>()?;
        let ids = table.ids();
        let bad: Vec<i32> = (0..table.n_rows())
            .filter(|&row| {
                let present = columns.iter().filter(|c| !c.is_missing(row, 0)).count();
                present != 0 && present != columns.len()
            })
            .filter_map(|row| ids[row])
            .collect();
        if !bad.is_empty() {
            errors.push(ValidationError::new(
                ErrorKind::MultiFieldValidation,
                component,
                &ASYM_LINE_NEUTRAL,
                bad,
            ));
        }
    }
    Ok(errors)
}

pub fn validate_generic_branch(
    data: &Dataset,
    component: ComponentType,
) -> GridResult<Vec<ValidationError>> {
    let mut errors = validate_branch(data, component)?;
    errors.extend(field(data, component, "k").with_default(1.0).greater_than_zero()?);
    errors.extend(field(data, component, "sn").greater_or_equal_zero()?);
    Ok(errors)
}

fn tap_rules(data: &Dataset, component: ComponentType, side_enum: EnumKind) -> GridResult<Vec<ValidationError>> {
    let mut errors = Vec::new();
    errors.extend(rules::all_valid_enum_values(data, component, "tap_side", &[side_enum])?);
    errors.extend(field(data, component, "tap_pos").between_or_at("tap_min", "tap_max")?);
    errors.extend(field(data, component, "tap_nom").between_or_at("tap_min", "tap_max")?);
    errors.extend(field(data, component, "tap_size").greater_or_equal_zero()?);
    Ok(errors)
}

fn short_circuit_voltage_rules(
    data: &Dataset,
    component: ComponentType,
    uk: &str,
    pk: &str,
    ratings: &[&str],
) -> GridResult<Vec<ValidationError>> {
    let mut errors = Vec::new();
    for sn in ratings {
        errors.extend(field(data, component, uk).greater_or_equal(format!("{pk}/{sn}"))?);
    }
    errors.extend(field(data, component, uk).between(0.0, 1.0)?);
    errors.extend(field(data, component, pk).greater_or_equal_zero()?);
    Ok(errors)
}

pub fn validate_transformer(
    data: &Dataset,
    component: ComponentType,
) -> GridResult<Vec<ValidationError>> {
    let mut errors = validate_branch(data, component)?;
    for name in ["u1", "u2", "sn"] {
        errors.extend(field(data, component, name).greater_than_zero()?);
    }
    for suffix in ["", "_min", "_max"] {
        let uk = format!("uk{suffix}");
        let pk = format!("pk{suffix}");
        errors.extend(short_circuit_voltage_rules(data, component, &uk, &pk, &["sn"])?);
    }
    errors.extend(field(data, component, "i0").greater_or_equal("p0/sn")?);
    errors.extend(field(data, component, "i0").less_than(1.0)?);
    errors.extend(field(data, component, "p0").greater_or_equal_zero()?);
    for winding in ["winding_from", "winding_to"] {
        errors.extend(rules::all_valid_enum_values(data, component, winding, &[EnumKind::WindingType])?);
    }
    errors.extend(field(data, component, "clock").between_or_at(-12.0, 12.0)?);
    errors.extend(rules::all_valid_clocks(data, component, "clock", "winding_from", "winding_to")?);
    errors.extend(tap_rules(data, component, EnumKind::BranchSide)?);
    Ok(errors)
}

pub fn validate_branch3(data: &Dataset, component: ComponentType) -> GridResult<Vec<ValidationError>> {
    let mut errors = validate_base(data, component)?;
    let nodes = [ComponentType::Node];
    for node in ["node_1", "node_2", "node_3"] {
        errors.extend(rules::all_valid_ids(data, component, node, &nodes, &[])?);
    }
    errors.extend(rules::all_not_two_values_equal(data, component, "node_1", "node_2")?);
    errors.extend(rules::all_not_two_values_equal(data, component, "node_1", "node_3")?);
    errors.extend(rules::all_not_two_values_equal(data, component, "node_2", "node_3")?);
    for status in ["status_1", "status_2", "status_3"] {
        errors.extend(rules::all_boolean(data, component, status)?);
    }
    Ok(errors)
}

pub fn validate_three_winding_transformer(
    data: &Dataset,
    component: ComponentType,
) -> GridResult<Vec<ValidationError>> {
    let mut errors = validate_branch3(data, component)?;
    for name in ["u1", "u2", "u3", "sn_1", "sn_2", "sn_3"] {
        errors.extend(field(data, component, name).greater_than_zero()?);
    }
    let pairs = [("12", "sn_1", "sn_2"), ("13", "sn_1", "sn_3"), ("23", "sn_2", "sn_3")];
    for (pair, sn_a, sn_b) in pairs {
        for suffix in ["", "_min", "_max"] {
            let uk = format!("uk_{pair}{suffix}");
            let pk = format!("pk_{pair}{suffix}");
            errors.extend(short_circuit_voltage_rules(data, component, &uk, &pk, &[sn_a, sn_b])?);
        }
    }
    errors.extend(field(data, component, "i0").greater_or_equal("p0/sn_1")?);
    errors.extend(field(data, component, "i0").less_than(1.0)?);
    errors.extend(field(data, component, "p0").greater_or_equal_zero()?);
    for winding in ["winding_1", "winding_2", "winding_3"] {
        errors.extend(rules::all_valid_enum_values(data, component, winding, &[EnumKind::WindingType])?);
    }
    for (clock, other) in [("clock_12", "winding_2"), ("clock_13", "winding_3")] {
        errors.extend(field(data, component, clock).between_or_at(-12.0, 12.0)?);
        errors.extend(rules::all_valid_clocks(data, component, clock, "winding_1", other)?);
    }
    errors.extend(tap_rules(data, component, EnumKind::Branch3Side)?);
    Ok(errors)
}

pub fn validate_appliance(data: &Dataset, component: ComponentType) -> GridResult<Vec<ValidationError>> {
    let mut errors = validate_base(data, component)?;
    errors.extend(rules::all_valid_ids(data, component, "node", &[ComponentType::Node], &[])?);
    errors.extend(rules::all_boolean(data, component, "status")?);
    Ok(errors)
}

pub fn validate_source(data: &Dataset, component: ComponentType) -> GridResult<Vec<ValidationError>> {
    let mut errors = validate_appliance(data, component)?;
    errors.extend(field(data, component, "u_ref").greater_than_zero()?);
    errors.extend(field(data, component, "sk").greater_than_zero()?);
    errors.extend(field(data, component, "rx_ratio").greater_or_equal_zero()?);
    errors.extend(field(data, component, "z01_ratio").greater_than_zero()?);
    Ok(errors)
}

pub fn validate_load_gen(data: &Dataset, component: ComponentType) -> GridResult<Vec<ValidationError>> {
    let mut errors = validate_appliance(data, component)?;
    errors.extend(rules::all_valid_enum_values(data, component, "type", &[EnumKind::LoadGenType])?);
    Ok(errors)
}

pub fn validate_voltage_sensor(
    data: &Dataset,
    component: ComponentType,
) -> GridResult<Vec<ValidationError>> {
    let mut errors = validate_base(data, component)?;
    errors.extend(field(data, component, "u_sigma").greater_than_zero()?);
    errors.extend(field(data, component, "u_measured").greater_than_zero()?);
    errors.extend(rules::all_valid_ids(
        data,
        component,
        "measured_object",
        &[ComponentType::Node],
        &[],
    )?);
    Ok(errors)
}

/// `measured_object` valid overall and for each terminal type in `terminals`.
fn measured_object_rules(
    data: &Dataset,
    component: ComponentType,
    measurable: &[ComponentType],
    terminals: &[MeasuredTerminalType],
) -> GridResult<Vec<ValidationError>> {
    let mut errors = Vec::new();
    errors.extend(rules::all_valid_ids(data, component, "measured_object", measurable, &[])?);
    for terminal in terminals {
        errors.extend(rules::all_valid_ids(
            data,
            component,
            "measured_object",
            terminal_targets(*terminal),
            &[("measured_terminal_type", i64::from(terminal.value()))],
        )?);
    }
    Ok(errors)
}

pub fn validate_power_sensor(
    data: &Dataset,
    component: ComponentType,
) -> GridResult<Vec<ValidationError>> {
    let mut errors = validate_base(data, component)?;
    for sigma in ["power_sigma", "p_sigma", "q_sigma"] {
        errors.extend(field(data, component, sigma).greater_than_zero()?);
    }
    errors.extend(rules::all_valid_enum_values(
        data,
        component,
        "measured_terminal_type",
        &[EnumKind::MeasuredTerminalType],
    )?);
    errors.extend(measured_object_rules(
        data,
        component,
        &POWER_MEASURABLE,
        MeasuredTerminalType::VALUES,
    )?);

    // p_sigma and q_sigma come as a pair
    if let Some(table) = data.get(component) {
        let p = table.column("p_sigma")?;
        let q = table.column("q_sigma")?;
        let ids = table.ids();
        let bad: Vec<i32> = (0..table.n_rows())
            .filter(|&row| (0..p.phases()).any(|ph| p.is_missing(row, ph) != q.is_missing(row, ph)))
            .filter_map(|row| ids[row])
            .collect();
        if !bad.is_empty() {
            errors.push(ValidationError::new(
                ErrorKind::MultiFieldValidation,
                component,
                &["p_sigma", "q_sigma"],
                bad,
            ));
        }
    }
    Ok(errors)
}

pub fn validate_current_sensor(
    data: &Dataset,
    component: ComponentType,
) -> GridResult<Vec<ValidationError>> {
    let mut errors = validate_base(data, component)?;
    errors.extend(field(data, component, "i_sigma").greater_than_zero()?);
    errors.extend(field(data, component, "i_angle_sigma").greater_than_zero()?);
    errors.extend(rules::all_valid_enum_values(
        data,
        component,
        "measured_terminal_type",
        &[EnumKind::MeasuredTerminalType],
    )?);
    let supported = [
        MeasuredTerminalType::BranchFrom,
        MeasuredTerminalType::BranchTo,
        MeasuredTerminalType::Branch3Side1,
        MeasuredTerminalType::Branch3Side2,
        MeasuredTerminalType::Branch3Side3,
    ];
    errors.extend(rules::all_in_valid_values(data, component, "measured_terminal_type", &supported)?);
    errors.extend(rules::all_valid_enum_values(
        data,
        component,
        "angle_measurement_type",
        &[EnumKind::AngleMeasurementType],
    )?);
    let mut terminals = vec![MeasuredTerminalType::BranchFrom, MeasuredTerminalType::BranchTo];
    terminals.extend(BRANCH3_TERMINALS);
    errors.extend(measured_object_rules(data, component, &CURRENT_MEASURABLE, &terminals)?);
    Ok(errors)
}

pub fn validate_fault(data: &Dataset, component: ComponentType) -> GridResult<Vec<ValidationError>> {
    let mut errors = validate_base(data, component)?;
    errors.extend(rules::all_boolean(data, component, "status")?);
    errors.extend(rules::all_valid_enum_values(data, component, "fault_type", &[EnumKind::FaultType])?);
    errors.extend(rules::all_valid_enum_values(data, component, "fault_phase", &[EnumKind::FaultPhase])?);
    errors.extend(rules::all_valid_fault_phases(data, component, "fault_type", "fault_phase")?);
    errors.extend(rules::all_valid_ids(
        data,
        component,
        "fault_object",
        &[ComponentType::Node],
        &[],
    )?);
    errors.extend(field(data, component, "r_f").greater_or_equal_zero()?);
    errors.extend(rules::all_enabled_identical(data, component, "fault_type", "status")?);
    errors.extend(rules::all_enabled_identical(data, component, "fault_phase", "status")?);
    Ok(errors)
}

pub fn validate_transformer_tap_regulator(
    data: &Dataset,
    component: ComponentType,
) -> GridResult<Vec<ValidationError>> {
    let mut errors = validate_base(data, component)?;
    let regulated = [ComponentType::Transformer, ComponentType::ThreeWindingTransformer];
    errors.extend(rules::all_valid_ids(data, component, "regulated_object", &regulated, &[])?);
    errors.extend(rules::all_boolean(data, component, "status")?);
    errors.extend(rules::all_enabled_unique(data, component, "regulated_object", "status")?);
    errors.extend(rules::all_valid_associated_enum_values(
        data,
        component,
        "control_side",
        "regulated_object",
        &[ComponentType::Transformer],
        &[EnumKind::BranchSide],
    )?);
    errors.extend(rules::all_valid_associated_enum_values(
        data,
        component,
        "control_side",
        "regulated_object",
        &[ComponentType::ThreeWindingTransformer],
        &[EnumKind::Branch3Side],
    )?);
    errors.extend(field(data, component, "u_set").greater_or_equal_zero()?);
    errors.extend(field(data, component, "u_band").greater_than_zero()?);
    errors.extend(field(data, component, "line_drop_compensation_r").greater_or_equal_zero()?);
    errors.extend(field(data, component, "line_drop_compensation_x").greater_or_equal_zero()?);
    Ok(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridval_core::{ComponentTable, DatasetKind};

    fn run(table: ComponentTable) -> Vec<ValidationError> {
        let component = table.component();
        let data = Dataset::new(DatasetKind::Input).with_table(table).unwrap();
        (rule_set(component).check)(&data, component).unwrap()
    }

    #[test]
    fn test_short_circuit_voltage_ratio_reported_once() {
        let table = ComponentTable::initialize(ComponentType::Transformer, DatasetKind::Input, 1)
            .unwrap()
            .with_i32("id", &[3])
            .unwrap()
            .with_f64("uk", &[0.001])
            .unwrap()
            .with_f64("pk", &[1e3])
            .unwrap()
            .with_f64("sn", &[1e5])
            .unwrap();
        let data = Dataset::new(DatasetKind::Input).with_table(table).unwrap();
        let data = crate::defaults::with_defaults(&data).unwrap();

        let errors: Vec<ValidationError> = validate_transformer(&data, ComponentType::Transformer)
            .unwrap()
            .into_iter()
            .filter(|e| matches!(e.kind, ErrorKind::NotGreaterOrEqual { .. }))
            .collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field_names(), vec!["uk"]);
        assert_eq!(
            errors[0].kind,
            ErrorKind::NotGreaterOrEqual {
                reference: String::from("pk/sn")
            }
        );
        assert_eq!(errors[0].id_values(), vec![3]);
    }

    #[test]
    fn test_gating() {
        assert!(rule_set(ComponentType::Line).applies_to(Some(CalculationType::ShortCircuit)));
        assert!(rule_set(ComponentType::SymVoltageSensor).applies_to(None));
        assert!(!rule_set(ComponentType::SymVoltageSensor)
            .applies_to(Some(CalculationType::PowerFlow)));
        assert!(!rule_set(ComponentType::Fault).applies_to(Some(CalculationType::StateEstimation)));
        assert!(rule_set(ComponentType::TransformerTapRegulator)
            .applies_to(Some(CalculationType::PowerFlow)));
    }

    #[test]
    fn test_every_component_runs_on_empty_table() {
        for component in ComponentType::ALL {
            let table = ComponentTable::initialize(component, DatasetKind::Input, 0).unwrap();
            assert!(run(table).is_empty(), "empty {component} should be valid");
        }
    }

    #[test]
    fn test_every_component_runs_on_unset_rows() {
        for component in ComponentType::ALL {
            let table = ComponentTable::initialize(component, DatasetKind::Input, 2).unwrap();
            let errors = run(table);
            assert!(
                errors
                    .iter()
                    .all(|e| matches!(e.kind, ErrorKind::FaultPhase | ErrorKind::NotIdentical)),
                "unexpected errors for unset {component}: {errors:?}"
            );
        }
    }

    #[test]
    fn test_asym_line_neutral_all_or_nothing() {
        let table = ComponentTable::initialize(ComponentType::AsymLine, DatasetKind::Input, 2)
            .unwrap()
            .with_i32("id", &[1, 2])
            .unwrap()
            .with_f64("r_na", &[0.1, 0.1])
            .unwrap()
            .with_f64("r_nb", &[0.1, 0.1])
            .unwrap()
            .with_f64("r_nc", &[0.1, 0.1])
            .unwrap()
            .with_f64("r_nn", &[0.1, 0.1])
            .unwrap()
            .with_f64("x_na", &[0.1, 0.1])
            .unwrap()
            .with_f64("x_nb", &[0.1, 0.1])
            .unwrap()
            .with_f64("x_nc", &[0.1, 0.1])
            .unwrap()
            .with_f64("x_nn", &[0.1, f64::NAN])
            .unwrap();
        let errors = run(table);
        let neutral: Vec<_> = errors
            .iter()
            .filter(|e| e.kind == ErrorKind::MultiFieldValidation)
            .collect();
        assert_eq!(neutral.len(), 1);
        assert_eq!(neutral[0].id_values(), vec![2]);
    }

    #[test]
    fn test_power_sensor_sigma_pair() {
        let table = ComponentTable::initialize(ComponentType::SymPowerSensor, DatasetKind::Input, 2)
            .unwrap()
            .with_i32("id", &[1, 2])
            .unwrap()
            .with_f64("p_sigma", &[1.0, 1.0])
            .unwrap()
            .with_f64("q_sigma", &[1.0, f64::NAN])
            .unwrap();
        let errors = run(table);
        assert_eq!(
            errors,
            vec![ValidationError::new(
                ErrorKind::MultiFieldValidation,
                ComponentType::SymPowerSensor,
                &["p_sigma", "q_sigma"],
                vec![2],
            )]
        );
    }

    #[test]
    fn test_current_sensor_terminal_limited_to_branches() {
        let table = ComponentTable::initialize(ComponentType::SymCurrentSensor, DatasetKind::Input, 2)
            .unwrap()
            .with_i32("id", &[1, 2])
            .unwrap()
            .with_i8("measured_terminal_type", &[0, 4])
            .unwrap();
        let errors = run(table);
        let unsupported: Vec<_> = errors
            .iter()
            .filter(|e| matches!(e.kind, ErrorKind::UnsupportedMeasuredTerminalType { .. }))
            .collect();
        assert_eq!(unsupported.len(), 1);
        assert_eq!(unsupported[0].id_values(), vec![2]);
    }
}
