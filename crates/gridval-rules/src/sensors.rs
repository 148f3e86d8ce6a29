//! Checks spanning several sensor types.
//!
//! These only make sense for state estimation and look at power, current and
//! voltage sensors together:
//! - a terminal is measured by power sensors or by current sensors, not both
//! - current sensors on one terminal agree on the angle measurement type
//! - a global-angle current measurement needs a voltage angle measurement on
//!   the node of the measured terminal

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};

use gridval_core::{
    AngleMeasurementType, ComponentType, Dataset, GridResult, MeasuredTerminalType,
};

use crate::errors::{ErrorKind, FieldRef, ObjectRef, ValidationError};

/// `(measured_object, measured_terminal_type)`
type Terminal = (i64, i64);

struct SensorRow {
    object: ObjectRef,
    terminal: Terminal,
    angle_type: Option<i64>,
}

fn sensor_rows(data: &Dataset, components: &[ComponentType]) -> GridResult<Vec<SensorRow>> {
    let mut out = Vec::new();
    for component in components {
        let Some(table) = data.get(*component) else {
            continue;
        };
        let objects = table.column("measured_object")?;
        let terminals = table.column("measured_terminal_type")?;
        let angles = table.column("angle_measurement_type").ok();
        let ids = table.ids();
        for row in 0..table.n_rows() {
            let (Some(id), Some(object), Some(terminal)) =
                (ids[row], objects.int(row), terminals.int(row))
            else {
                continue;
            };
            out.push(SensorRow {
                object: ObjectRef {
                    component: *component,
                    id,
                },
                terminal: (object, terminal),
                angle_type: angles.and_then(|col| col.int(row)),
            });
        }
    }
    Ok(out)
}

fn fields_for(components: &[ComponentType], names: &[&str], rows: &[&SensorRow]) -> Vec<FieldRef> {
    let used: BTreeSet<ComponentType> = rows.iter().map(|r| r.object.component).collect();
    components
        .iter()
        .filter(|c| used.contains(c))
        .flat_map(|c| names.iter().map(move |n| FieldRef::new(*c, *n)))
        .collect()
}

fn collect_error(kind: ErrorKind, fields: Vec<FieldRef>, rows: &[&SensorRow]) -> Option<ValidationError> {
    if rows.is_empty() {
        return None;
    }
    let ids: BTreeSet<ObjectRef> = rows.iter().map(|r| r.object).collect();
    Some(ValidationError::multi(kind, fields, ids.into_iter().collect()))
}

/// Power and current sensors measuring the same terminal.
pub fn validate_mixed_sensor_types(data: &Dataset) -> GridResult<Option<ValidationError>> {
    let power = sensor_rows(data, &ComponentType::POWER_SENSORS)?;
    let current = sensor_rows(data, &ComponentType::CURRENT_SENSORS)?;
    let power_terminals: HashSet<Terminal> = power.iter().map(|r| r.terminal).collect();
    let current_terminals: HashSet<Terminal> = current.iter().map(|r| r.terminal).collect();
    let shared: HashSet<&Terminal> = power_terminals.intersection(&current_terminals).collect();

    let rows: Vec<&SensorRow> = power
        .iter()
        .chain(current.iter())
        .filter(|r| shared.contains(&r.terminal))
        .collect();
    let mut fields = fields_for(
        &ComponentType::POWER_SENSORS,
        &["measured_object", "measured_terminal_type"],
        &rows,
    );
    fields.extend(fields_for(
        &ComponentType::CURRENT_SENSORS,
        &["measured_object", "measured_terminal_type"],
        &rows,
    ));
    Ok(collect_error(ErrorKind::MixedSensorTypes, fields, &rows))
}

/// Current sensors on the same terminal with different angle types.
pub fn validate_current_angle_types(data: &Dataset) -> GridResult<Option<ValidationError>> {
    let current = sensor_rows(data, &ComponentType::CURRENT_SENSORS)?;
    let mut by_terminal: BTreeMap<Terminal, Vec<&SensorRow>> = BTreeMap::new();
    for row in &current {
        if row.angle_type.is_some() {
            by_terminal.entry(row.terminal).or_default().push(row);
        }
    }
    let rows: Vec<&SensorRow> = by_terminal
        .into_values()
        .filter(|group| {
            let kinds: HashSet<Option<i64>> = group.iter().map(|r| r.angle_type).collect();
            kinds.len() > 1
        })
        .flatten()
        .collect();
    let fields = fields_for(
        &ComponentType::CURRENT_SENSORS,
        &["measured_object", "measured_terminal_type", "angle_measurement_type"],
        &rows,
    );
    Ok(collect_error(ErrorKind::MixedCurrentAngleMeasurementType, fields, &rows))
}

/// Node ids at the terminals of every branch and three-winding transformer.
fn terminal_nodes(data: &Dataset) -> GridResult<HashMap<Terminal, i64>> {
    let mut out = HashMap::new();
    let mut add = |component: ComponentType, sides: &[(&str, MeasuredTerminalType)]| -> GridResult<()> {
        let Some(table) = data.get(component) else {
            return Ok(());
        };
        let ids = table.ids();
        for (field, terminal) in sides {
            let nodes = table.column(field)?;
            for row in 0..table.n_rows() {
                if let (Some(id), Some(node)) = (ids[row], nodes.int(row)) {
                    out.insert((i64::from(id), i64::from(terminal.value())), node);
                }
            }
        }
        Ok(())
    };
    for component in ComponentType::BRANCHES {
        add(
            component,
            &[
                ("from_node", MeasuredTerminalType::BranchFrom),
                ("to_node", MeasuredTerminalType::BranchTo),
            ],
        )?;
    }
    add(
        ComponentType::ThreeWindingTransformer,
        &[
            ("node_1", MeasuredTerminalType::Branch3Side1),
            ("node_2", MeasuredTerminalType::Branch3Side2),
            ("node_3", MeasuredTerminalType::Branch3Side3),
        ],
    )?;
    Ok(out)
}

/// Nodes with a voltage sensor providing a voltage angle.
fn nodes_with_voltage_angle(data: &Dataset) -> GridResult<HashSet<i64>> {
    let mut out = HashSet::new();
    for component in ComponentType::VOLTAGE_SENSORS {
        let Some(table) = data.get(component) else {
            continue;
        };
        let objects = table.column("measured_object")?;
        let angles = table.column("u_angle_measured")?;
        for row in 0..table.n_rows() {
            let has_angle = (0..angles.phases()).any(|p| !angles.is_missing(row, p));
            if let (true, Some(node)) = (has_angle, objects.int(row)) {
                out.insert(node);
            }
        }
    }
    Ok(out)
}

/// Global-angle current sensors without a voltage angle reference.
pub fn validate_global_angle_references(data: &Dataset) -> GridResult<Option<ValidationError>> {
    let global = i64::from(AngleMeasurementType::GlobalAngle.value());
    let current = sensor_rows(data, &ComponentType::CURRENT_SENSORS)?;
    if !current.iter().any(|r| r.angle_type == Some(global)) {
        return Ok(None);
    }
    let nodes = terminal_nodes(data)?;
    let referenced = nodes_with_voltage_angle(data)?;

    let rows: Vec<&SensorRow> = current
        .iter()
        .filter(|r| r.angle_type == Some(global))
        .filter(|r| {
            nodes
                .get(&r.terminal)
                .is_some_and(|node| !referenced.contains(node))
        })
        .collect();
    let fields = fields_for(
        &ComponentType::CURRENT_SENSORS,
        &["measured_object", "angle_measurement_type"],
        &rows,
    );
    Ok(collect_error(ErrorKind::MissingVoltageAngleMeasurement, fields, &rows))
}

/// All cross-sensor checks.
pub fn validate_sensor_combinations(data: &Dataset) -> GridResult<Vec<ValidationError>> {
    let mut errors = Vec::new();
    errors.extend(validate_mixed_sensor_types(data)?);
    errors.extend(validate_current_angle_types(data)?);
    errors.extend(validate_global_angle_references(data)?);
    Ok(errors)
}
