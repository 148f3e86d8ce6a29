//! Closed set of grid component types.
//!
//! Every table in a dataset is keyed by a [`ComponentType`]. The set is fixed at
//! compile time so that dispatch over component types (schemas, rule sets,
//! required fields) is an exhaustive `match` instead of a lookup on open string
//! keys.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{GridError, GridResult};

/// Grid component type tag.
///
/// The declaration order is the canonical iteration order of a dataset, which
/// keeps error lists deterministic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ComponentType {
    Node,
    Line,
    AsymLine,
    Link,
    GenericBranch,
    Transformer,
    ThreeWindingTransformer,
    SymLoad,
    SymGen,
    AsymLoad,
    AsymGen,
    Shunt,
    Source,
    SymVoltageSensor,
    AsymVoltageSensor,
    SymPowerSensor,
    AsymPowerSensor,
    SymCurrentSensor,
    AsymCurrentSensor,
    Fault,
    TransformerTapRegulator,
}

/// Structural family a component type belongs to.
///
/// Families share a prefix of fields and a base set of rules (e.g. every branch
/// has `from_node`/`to_node` and every appliance has `node`/`status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentFamily {
    Node,
    Branch,
    Branch3,
    Appliance,
    Sensor,
    Fault,
    Regulator,
}

impl ComponentType {
    /// All component types in canonical order.
    pub const ALL: [ComponentType; 21] = [
        ComponentType::Node,
        ComponentType::Line,
        ComponentType::AsymLine,
        ComponentType::Link,
        ComponentType::GenericBranch,
        ComponentType::Transformer,
        ComponentType::ThreeWindingTransformer,
        ComponentType::SymLoad,
        ComponentType::SymGen,
        ComponentType::AsymLoad,
        ComponentType::AsymGen,
        ComponentType::Shunt,
        ComponentType::Source,
        ComponentType::SymVoltageSensor,
        ComponentType::AsymVoltageSensor,
        ComponentType::SymPowerSensor,
        ComponentType::AsymPowerSensor,
        ComponentType::SymCurrentSensor,
        ComponentType::AsymCurrentSensor,
        ComponentType::Fault,
        ComponentType::TransformerTapRegulator,
    ];

    /// Two-terminal branches.
    pub const BRANCHES: [ComponentType; 5] = [
        ComponentType::Line,
        ComponentType::AsymLine,
        ComponentType::Link,
        ComponentType::GenericBranch,
        ComponentType::Transformer,
    ];

    pub const LOADS: [ComponentType; 2] = [ComponentType::SymLoad, ComponentType::AsymLoad];

    pub const GENERATORS: [ComponentType; 2] = [ComponentType::SymGen, ComponentType::AsymGen];

    pub const VOLTAGE_SENSORS: [ComponentType; 2] = [
        ComponentType::SymVoltageSensor,
        ComponentType::AsymVoltageSensor,
    ];

    pub const POWER_SENSORS: [ComponentType; 2] = [
        ComponentType::SymPowerSensor,
        ComponentType::AsymPowerSensor,
    ];

    pub const CURRENT_SENSORS: [ComponentType; 2] = [
        ComponentType::SymCurrentSensor,
        ComponentType::AsymCurrentSensor,
    ];

    /// Snake-case name used in schemas and messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentType::Node => "node",
            ComponentType::Line => "line",
            ComponentType::AsymLine => "asym_line",
            ComponentType::Link => "link",
            ComponentType::GenericBranch => "generic_branch",
            ComponentType::Transformer => "transformer",
            ComponentType::ThreeWindingTransformer => "three_winding_transformer",
            ComponentType::SymLoad => "sym_load",
            ComponentType::SymGen => "sym_gen",
            ComponentType::AsymLoad => "asym_load",
            ComponentType::AsymGen => "asym_gen",
            ComponentType::Shunt => "shunt",
            ComponentType::Source => "source",
            ComponentType::SymVoltageSensor => "sym_voltage_sensor",
            ComponentType::AsymVoltageSensor => "asym_voltage_sensor",
            ComponentType::SymPowerSensor => "sym_power_sensor",
            ComponentType::AsymPowerSensor => "asym_power_sensor",
            ComponentType::SymCurrentSensor => "sym_current_sensor",
            ComponentType::AsymCurrentSensor => "asym_current_sensor",
            ComponentType::Fault => "fault",
            ComponentType::TransformerTapRegulator => "transformer_tap_regulator",
        }
    }

    pub fn family(&self) -> ComponentFamily {
        match self {
            ComponentType::Node => ComponentFamily::Node,
            ComponentType::Line
            | ComponentType::AsymLine
            | ComponentType::Link
            | ComponentType::GenericBranch
            | ComponentType::Transformer => ComponentFamily::Branch,
            ComponentType::ThreeWindingTransformer => ComponentFamily::Branch3,
            ComponentType::SymLoad
            | ComponentType::SymGen
            | ComponentType::AsymLoad
            | ComponentType::AsymGen
            | ComponentType::Shunt
            | ComponentType::Source => ComponentFamily::Appliance,
            ComponentType::SymVoltageSensor
            | ComponentType::AsymVoltageSensor
            | ComponentType::SymPowerSensor
            | ComponentType::AsymPowerSensor
            | ComponentType::SymCurrentSensor
            | ComponentType::AsymCurrentSensor => ComponentFamily::Sensor,
            ComponentType::Fault => ComponentFamily::Fault,
            ComponentType::TransformerTapRegulator => ComponentFamily::Regulator,
        }
    }

    /// Whether per-phase quantities of this component carry three columns.
    pub fn is_asymmetric(&self) -> bool {
        matches!(
            self,
            ComponentType::AsymLoad
                | ComponentType::AsymGen
                | ComponentType::AsymVoltageSensor
                | ComponentType::AsymPowerSensor
                | ComponentType::AsymCurrentSensor
        )
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ComponentType {
    type Err = GridError;

    fn from_str(s: &str) -> GridResult<Self> {
        ComponentType::ALL
            .iter()
            .copied()
            .find(|component| component.as_str() == s)
            .ok_or_else(|| GridError::UnknownComponent(s.to_string()))
    }
}

/// Which schema a dataset follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatasetKind {
    /// Full description of a grid
    Input,
    /// Mutations applied on top of an input dataset
    Update,
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetKind::Input => f.write_str("input"),
            DatasetKind::Update => f.write_str("update"),
        }
    }
}
