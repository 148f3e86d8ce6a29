//! Schema registry: field lists per component type and dataset kind.
//!
//! The registry is the lookup service the validator consumes. For each
//! `(DatasetKind, ComponentType)` it lists the fields in canonical order with
//! their [`Dtype`] and phase count. The "not provided" sentinel follows from the
//! dtype (NaN, `i32::MIN`, `i8::MIN`) and is applied by
//! [`Column`](crate::column::Column); rule code never sees it.
//!
//! Schemas are assembled from family prefixes the same way the component
//! families share fields: every branch carries the branch prefix, every
//! appliance the appliance prefix, and so on.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::Serialize;

use crate::component::{ComponentFamily, ComponentType, DatasetKind};
use crate::error::{GridError, GridResult};

/// Storage kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dtype {
    Float64,
    Int32,
    Int8,
}

impl fmt::Display for Dtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dtype::Float64 => f.write_str("float64"),
            Dtype::Int32 => f.write_str("int32"),
            Dtype::Int8 => f.write_str("int8"),
        }
    }
}

/// One field of a component schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,
    pub dtype: Dtype,
    /// 1 for scalar fields, 3 for per-phase fields of asymmetric components
    pub phases: usize,
}

impl FieldSpec {
    const fn new(name: &'static str, dtype: Dtype, phases: usize) -> Self {
        Self {
            name,
            dtype,
            phases,
        }
    }
}

fn f64s(names: &[&'static str]) -> Vec<FieldSpec> {
    names
        .iter()
        .map(|name| FieldSpec::new(name, Dtype::Float64, 1))
        .collect()
}

fn i32s(names: &[&'static str]) -> Vec<FieldSpec> {
    names
        .iter()
        .map(|name| FieldSpec::new(name, Dtype::Int32, 1))
        .collect()
}

fn i8s(names: &[&'static str]) -> Vec<FieldSpec> {
    names
        .iter()
        .map(|name| FieldSpec::new(name, Dtype::Int8, 1))
        .collect()
}

/// Float fields that are scalar for symmetric and 3-phase for asymmetric types.
fn phased(component: ComponentType, names: &[&'static str]) -> Vec<FieldSpec> {
    let phases = if component.is_asymmetric() { 3 } else { 1 };
    names
        .iter()
        .map(|name| FieldSpec::new(name, Dtype::Float64, phases))
        .collect()
}

const ASYM_LINE_R: [&str; 10] = [
    "r_aa", "r_ba", "r_bb", "r_ca", "r_cb", "r_cc", "r_na", "r_nb", "r_nc", "r_nn",
];
const ASYM_LINE_X: [&str; 10] = [
    "x_aa", "x_ba", "x_bb", "x_ca", "x_cb", "x_cc", "x_na", "x_nb", "x_nc", "x_nn",
];
const ASYM_LINE_C: [&str; 6] = ["c_aa", "c_ba", "c_bb", "c_ca", "c_cb", "c_cc"];

fn input_schema(component: ComponentType) -> Vec<FieldSpec> {
    let mut fields = i32s(&["id"]);
    match component.family() {
        ComponentFamily::Node => {}
        ComponentFamily::Branch => {
            fields.extend(i32s(&["from_node", "to_node"]));
            fields.extend(i8s(&["from_status", "to_status"]));
        }
        ComponentFamily::Branch3 => {
            fields.extend(i32s(&["node_1", "node_2", "node_3"]));
            fields.extend(i8s(&["status_1", "status_2", "status_3"]));
        }
        ComponentFamily::Appliance => {
            fields.extend(i32s(&["node"]));
            fields.extend(i8s(&["status"]));
        }
        ComponentFamily::Sensor => fields.extend(i32s(&["measured_object"])),
        ComponentFamily::Fault => {}
        ComponentFamily::Regulator => {
            fields.extend(i32s(&["regulated_object"]));
            fields.extend(i8s(&["status"]));
        }
    }

    match component {
        ComponentType::Node => fields.extend(f64s(&["u_rated"])),
        ComponentType::Line => fields.extend(f64s(&[
            "r1", "x1", "c1", "tan1", "r0", "x0", "c0", "tan0", "i_n",
        ])),
        ComponentType::AsymLine => {
            fields.extend(f64s(&ASYM_LINE_R));
            fields.extend(f64s(&ASYM_LINE_X));
            fields.extend(f64s(&ASYM_LINE_C));
            fields.extend(f64s(&["c0", "c1", "i_n"]));
        }
        ComponentType::Link => {}
        ComponentType::GenericBranch => {
            fields.extend(f64s(&["r1", "x1", "g1", "b1", "k", "theta", "sn"]))
        }
        ComponentType::Transformer => {
            fields.extend(f64s(&["u1", "u2", "sn", "uk", "pk", "i0", "p0"]));
            fields.extend(i8s(&[
                "winding_from",
                "winding_to",
                "clock",
                "tap_side",
                "tap_pos",
                "tap_min",
                "tap_max",
                "tap_nom",
            ]));
            fields.extend(f64s(&[
                "tap_size",
                "uk_min",
                "uk_max",
                "pk_min",
                "pk_max",
                "r_grounding_from",
                "x_grounding_from",
                "r_grounding_to",
                "x_grounding_to",
            ]));
        }
        ComponentType::ThreeWindingTransformer => {
            fields.extend(f64s(&[
                "u1", "u2", "u3", "sn_1", "sn_2", "sn_3", "uk_12", "uk_13", "uk_23", "pk_12",
                "pk_13", "pk_23", "i0", "p0",
            ]));
            fields.extend(i8s(&[
                "winding_1",
                "winding_2",
                "winding_3",
                "clock_12",
                "clock_13",
                "tap_side",
                "tap_pos",
                "tap_min",
                "tap_max",
                "tap_nom",
            ]));
            fields.extend(f64s(&[
                "tap_size",
                "uk_12_min",
                "uk_12_max",
                "uk_13_min",
                "uk_13_max",
                "uk_23_min",
                "uk_23_max",
                "pk_12_min",
                "pk_12_max",
                "pk_13_min",
                "pk_13_max",
                "pk_23_min",
                "pk_23_max",
                "r_grounding_1",
                "x_grounding_1",
                "r_grounding_2",
                "x_grounding_2",
                "r_grounding_3",
                "x_grounding_3",
            ]));
        }
        ComponentType::SymLoad
        | ComponentType::SymGen
        | ComponentType::AsymLoad
        | ComponentType::AsymGen => {
            fields.extend(i8s(&["type"]));
            fields.extend(phased(component, &["p_specified", "q_specified"]));
        }
        ComponentType::Shunt => fields.extend(f64s(&["g1", "b1", "g0", "b0"])),
        ComponentType::Source => fields.extend(f64s(&[
            "u_ref",
            "u_ref_angle",
            "sk",
            "rx_ratio",
            "z01_ratio",
        ])),
        ComponentType::SymVoltageSensor | ComponentType::AsymVoltageSensor => {
            fields.extend(f64s(&["u_sigma"]));
            fields.extend(phased(component, &["u_measured", "u_angle_measured"]));
        }
        ComponentType::SymPowerSensor | ComponentType::AsymPowerSensor => {
            fields.extend(i8s(&["measured_terminal_type"]));
            fields.extend(f64s(&["power_sigma"]));
            fields.extend(phased(
                component,
                &["p_measured", "q_measured", "p_sigma", "q_sigma"],
            ));
        }
        ComponentType::SymCurrentSensor | ComponentType::AsymCurrentSensor => {
            fields.extend(i8s(&["measured_terminal_type", "angle_measurement_type"]));
            fields.extend(f64s(&["i_sigma", "i_angle_sigma"]));
            fields.extend(phased(component, &["i_measured", "i_angle_measured"]));
        }
        ComponentType::Fault => {
            fields.extend(i8s(&["status", "fault_type", "fault_phase"]));
            fields.extend(i32s(&["fault_object"]));
            fields.extend(f64s(&["r_f", "x_f"]));
        }
        ComponentType::TransformerTapRegulator => {
            fields.extend(i8s(&["control_side"]));
            fields.extend(f64s(&[
                "u_set",
                "u_band",
                "line_drop_compensation_r",
                "line_drop_compensation_x",
            ]));
        }
    }
    fields
}

fn update_schema(component: ComponentType) -> Vec<FieldSpec> {
    let mut fields = i32s(&["id"]);
    match component.family() {
        ComponentFamily::Branch => fields.extend(i8s(&["from_status", "to_status"])),
        ComponentFamily::Branch3 => fields.extend(i8s(&["status_1", "status_2", "status_3"])),
        ComponentFamily::Appliance | ComponentFamily::Regulator => {
            fields.extend(i8s(&["status"]))
        }
        ComponentFamily::Node | ComponentFamily::Sensor | ComponentFamily::Fault => {}
    }

    match component {
        ComponentType::Transformer | ComponentType::ThreeWindingTransformer => {
            fields.extend(i8s(&["tap_pos"]))
        }
        ComponentType::Source => fields.extend(f64s(&["u_ref", "u_ref_angle"])),
        ComponentType::Shunt => fields.extend(f64s(&["g1", "b1", "g0", "b0"])),
        ComponentType::SymLoad
        | ComponentType::SymGen
        | ComponentType::AsymLoad
        | ComponentType::AsymGen => {
            fields.extend(phased(component, &["p_specified", "q_specified"]))
        }
        ComponentType::SymVoltageSensor | ComponentType::AsymVoltageSensor => {
            fields.extend(f64s(&["u_sigma"]));
            fields.extend(phased(component, &["u_measured", "u_angle_measured"]));
        }
        ComponentType::SymPowerSensor | ComponentType::AsymPowerSensor => {
            fields.extend(f64s(&["power_sigma"]));
            fields.extend(phased(
                component,
                &["p_measured", "q_measured", "p_sigma", "q_sigma"],
            ));
        }
        ComponentType::SymCurrentSensor | ComponentType::AsymCurrentSensor => {
            fields.extend(f64s(&["i_sigma", "i_angle_sigma"]));
            fields.extend(phased(component, &["i_measured", "i_angle_measured"]));
        }
        ComponentType::Fault => {
            fields.extend(i8s(&["status", "fault_type", "fault_phase"]));
            fields.extend(i32s(&["fault_object"]));
            fields.extend(f64s(&["r_f", "x_f"]));
        }
        ComponentType::TransformerTapRegulator => fields.extend(f64s(&[
            "u_set",
            "u_band",
            "line_drop_compensation_r",
            "line_drop_compensation_x",
        ])),
        _ => {}
    }
    fields
}

static REGISTRY: Lazy<HashMap<(DatasetKind, ComponentType), Vec<FieldSpec>>> = Lazy::new(|| {
    let mut registry = HashMap::with_capacity(ComponentType::ALL.len() * 2);
    for component in ComponentType::ALL {
        registry.insert((DatasetKind::Input, component), input_schema(component));
        registry.insert((DatasetKind::Update, component), update_schema(component));
    }
    registry
});

/// Ordered field list for a component in a dataset kind.
pub fn fields(kind: DatasetKind, component: ComponentType) -> GridResult<&'static [FieldSpec]> {
    REGISTRY
        .get(&(kind, component))
        .map(Vec::as_slice)
        .ok_or(GridError::ComponentNotAllowed { component, kind })
}

/// Look up a single field, failing structurally if it is not in the schema.
pub fn field(
    kind: DatasetKind,
    component: ComponentType,
    name: &str,
) -> GridResult<&'static FieldSpec> {
    fields(kind, component)?
        .iter()
        .find(|spec| spec.name == name)
        .ok_or_else(|| GridError::UnknownField {
            component,
            kind,
            field: name.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_schema_starts_with_id() {
        for kind in [DatasetKind::Input, DatasetKind::Update] {
            for component in ComponentType::ALL {
                let schema = fields(kind, component).unwrap();
                assert_eq!(schema[0].name, "id");
                assert_eq!(schema[0].dtype, Dtype::Int32);
            }
        }
    }

    #[test]
    fn test_asymmetric_fields_have_three_phases() {
        let spec = field(DatasetKind::Input, ComponentType::AsymLoad, "p_specified").unwrap();
        assert_eq!(spec.phases, 3);
        let spec = field(DatasetKind::Input, ComponentType::SymLoad, "p_specified").unwrap();
        assert_eq!(spec.phases, 1);
        let spec = field(DatasetKind::Input, ComponentType::AsymPowerSensor, "power_sigma").unwrap();
        assert_eq!(spec.phases, 1);
    }

    #[test]
    fn test_update_schema_is_narrower() {
        assert!(field(DatasetKind::Update, ComponentType::Line, "from_status").is_ok());
        let err = field(DatasetKind::Update, ComponentType::Line, "r1").unwrap_err();
        assert!(matches!(err, GridError::UnknownField { .. }));
    }

    #[test]
    fn test_field_names_are_unique_per_schema() {
        for component in ComponentType::ALL {
            let schema = fields(DatasetKind::Input, component).unwrap();
            let mut names: Vec<_> = schema.iter().map(|s| s.name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), schema.len(), "duplicate field in {component}");
        }
    }
}
