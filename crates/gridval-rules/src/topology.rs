//! Control-side topology check for tap regulators.
//!
//! The grid is modelled as an undirected graph over node ids mapped to dense
//! vertex indices. Enabled branches become edges; an enabled three-winding
//! transformer gets an internal star vertex joined to its three nodes. A
//! breadth-first search from every enabled source gives each vertex its hop
//! distance to the nearest source.
//!
//! A regulator must control the side of its transformer that lies farther from
//! the source than some other side. Transformers with an unreachable side are
//! not checked.

use std::collections::{HashMap, VecDeque};

use gridval_core::{ComponentTable, ComponentType, Dataset, GridResult};
use petgraph::graph::{NodeIndex, UnGraph};
use tracing::debug;

use crate::errors::{ErrorKind, ValidationError};
use crate::rules::is_enabled;

/// Energized network: vertices for nodes, edges for enabled branches.
#[derive(Debug, Default)]
pub struct GridGraph {
    graph: UnGraph<(), ()>,
    index: HashMap<i64, NodeIndex>,
}

fn all_connected(table: &ComponentTable, fields: &[&str], row: usize) -> GridResult<bool> {
    for field in fields {
        if table.column(field)?.int(row) != Some(1) {
            return Ok(false);
        }
    }
    Ok(true)
}

impl GridGraph {
    /// Build the graph of enabled branches of `data`.
    pub fn build(data: &Dataset) -> GridResult<Self> {
        let mut grid = GridGraph::default();
        if let Some(nodes) = data.get(ComponentType::Node) {
            for id in nodes.ids().into_iter().flatten() {
                let vertex = grid.graph.add_node(());
                grid.index.entry(i64::from(id)).or_insert(vertex);
            }
        }

        for component in ComponentType::BRANCHES {
            let Some(table) = data.get(component) else {
                continue;
            };
            let from = table.column("from_node")?;
            let to = table.column("to_node")?;
            for row in 0..table.n_rows() {
                if !all_connected(table, &["from_status", "to_status"], row)? {
                    continue;
                }
                if let (Some(a), Some(b)) = (grid.vertex(from.int(row)), grid.vertex(to.int(row))) {
                    grid.graph.add_edge(a, b, ());
                }
            }
        }

        if let Some(table) = data.get(ComponentType::ThreeWindingTransformer) {
            let sides = [
                table.column("node_1")?,
                table.column("node_2")?,
                table.column("node_3")?,
            ];
            for row in 0..table.n_rows() {
                if !all_connected(table, &["status_1", "status_2", "status_3"], row)? {
                    continue;
                }
                let vertices: Option<Vec<NodeIndex>> =
                    sides.iter().map(|col| grid.vertex(col.int(row))).collect();
                let Some(vertices) = vertices else {
                    continue;
                };
                let star = grid.graph.add_node(());
                for vertex in vertices {
                    grid.graph.add_edge(star, vertex, ());
                }
            }
        }
        Ok(grid)
    }

    fn vertex(&self, node: Option<i64>) -> Option<NodeIndex> {
        node.and_then(|id| self.index.get(&id).copied())
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Hop distance from the nearest root for every vertex.
    pub fn distances(&self, roots: &[i64]) -> Vec<Option<usize>> {
        let mut distance = vec![None; self.graph.node_count()];
        let mut queue = VecDeque::new();
        for root in roots {
            if let Some(vertex) = self.index.get(root) {
                if distance[vertex.index()].is_none() {
                    distance[vertex.index()] = Some(0);
                    queue.push_back(*vertex);
                }
            }
        }
        while let Some(vertex) = queue.pop_front() {
            let next = distance[vertex.index()].map_or(0, |d| d + 1);
            for neighbor in self.graph.neighbors(vertex) {
                if distance[neighbor.index()].is_none() {
                    distance[neighbor.index()] = Some(next);
                    queue.push_back(neighbor);
                }
            }
        }
        distance
    }

    /// Distance of node `id`, if connected to a root.
    pub fn distance_of(&self, distances: &[Option<usize>], id: i64) -> Option<usize> {
        self.index
            .get(&id)
            .and_then(|vertex| distances.get(vertex.index()).copied().flatten())
    }
}

/// Nodes of enabled sources.
fn source_nodes(data: &Dataset) -> GridResult<Vec<i64>> {
    let Some(sources) = data.get(ComponentType::Source) else {
        return Ok(Vec::new());
    };
    let nodes = sources.column("node")?;
    let status = sources.column("status")?;
    Ok((0..sources.n_rows())
        .filter(|&row| status.int(row) == Some(1))
        .filter_map(|row| nodes.int(row))
        .collect())
}

/// Side nodes of every regulatable object, keyed by object id.
fn regulated_sides(data: &Dataset) -> GridResult<HashMap<i64, Vec<Option<i64>>>> {
    let mut out = HashMap::new();
    let objects: [(ComponentType, &[&str]); 2] = [
        (ComponentType::Transformer, &["from_node", "to_node"]),
        (
            ComponentType::ThreeWindingTransformer,
            &["node_1", "node_2", "node_3"],
        ),
    ];
    for (component, fields) in objects {
        let Some(table) = data.get(component) else {
            continue;
        };
        let columns = fields
            .iter()
            .map(|f| table.column(f))
            .collect::<GridResult<Vec<_>>>()?;
        for (row, id) in table.ids().into_iter().enumerate() {
            if let Some(id) = id {
                let sides = columns.iter().map(|c| c.int(row)).collect();
                out.insert(i64::from(id), sides);
            }
        }
    }
    Ok(out)
}

/// Enabled tap regulators controlling the side nearest to the source.
pub fn validate_tap_regulator_control_side_topology(
    data: &Dataset,
) -> GridResult<Option<ValidationError>> {
    let component = ComponentType::TransformerTapRegulator;
    let Some(regulators) = data.get(component) else {
        return Ok(None);
    };
    let graph = GridGraph::build(data)?;
    let distances = graph.distances(&source_nodes(data)?);
    let sides = regulated_sides(data)?;
    debug!(
        vertices = graph.node_count(),
        edges = graph.edge_count(),
        "built topology for control side check"
    );

    let objects = regulators.column("regulated_object")?;
    let control = regulators.column("control_side")?;
    let status = regulators.column("status")?;
    let ids = regulators.ids();

    let mut bad = Vec::new();
    for row in 0..regulators.n_rows() {
        if !is_enabled(status.int(row)) {
            continue;
        }
        let (Some(object), Some(side)) = (objects.int(row), control.int(row)) else {
            continue;
        };
        let Some(nodes) = sides.get(&object) else {
            continue;
        };
        let Some(side) = usize::try_from(side).ok().filter(|s| *s < nodes.len()) else {
            continue;
        };
        let reach: Option<Vec<usize>> = nodes
            .iter()
            .map(|node| node.and_then(|n| graph.distance_of(&distances, n)))
            .collect();
        let Some(reach) = reach else {
            continue;
        };
        let farther = reach
            .iter()
            .enumerate()
            .any(|(other, d)| other != side && reach[side] > *d);
        if !farther {
            if let Some(id) = ids[row] {
                bad.push(id);
            }
        }
    }

    if bad.is_empty() {
        return Ok(None);
    }
    Ok(Some(ValidationError::new(
        ErrorKind::InvalidTapRegulatorControlSide,
        component,
        &["control_side", "regulated_object"],
        bad,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridval_core::DatasetKind;

    /// source -> node 1 -[transformer 10]- node 2 -[line 11]- node 3
    fn feeder(control_side: i8) -> Dataset {
        let nodes = ComponentTable::initialize(ComponentType::Node, DatasetKind::Input, 3)
            .unwrap()
            .with_i32("id", &[1, 2, 3])
            .unwrap();
        let source = ComponentTable::initialize(ComponentType::Source, DatasetKind::Input, 1)
            .unwrap()
            .with_i32("id", &[20])
            .unwrap()
            .with_i32("node", &[1])
            .unwrap()
            .with_i8("status", &[1])
            .unwrap();
        let transformer = ComponentTable::initialize(ComponentType::Transformer, DatasetKind::Input, 1)
            .unwrap()
            .with_i32("id", &[10])
            .unwrap()
            .with_i32("from_node", &[1])
            .unwrap()
            .with_i32("to_node", &[2])
            .unwrap()
            .with_i8("from_status", &[1])
            .unwrap()
            .with_i8("to_status", &[1])
            .unwrap();
        let line = ComponentTable::initialize(ComponentType::Line, DatasetKind::Input, 1)
            .unwrap()
            .with_i32("id", &[11])
            .unwrap()
            .with_i32("from_node", &[2])
            .unwrap()
            .with_i32("to_node", &[3])
            .unwrap()
            .with_i8("from_status", &[1])
            .unwrap()
            .with_i8("to_status", &[1])
            .unwrap();
        let regulator =
            ComponentTable::initialize(ComponentType::TransformerTapRegulator, DatasetKind::Input, 1)
                .unwrap()
                .with_i32("id", &[30])
                .unwrap()
                .with_i32("regulated_object", &[10])
                .unwrap()
                .with_i8("status", &[1])
                .unwrap()
                .with_i8("control_side", &[control_side])
                .unwrap();
        let mut data = Dataset::new(DatasetKind::Input);
        for table in [nodes, source, transformer, line, regulator] {
            data.insert(table).unwrap();
        }
        data
    }

    #[test]
    fn test_distances_from_source() {
        let data = feeder(1);
        let graph = GridGraph::build(&data).unwrap();
        let distances = graph.distances(&[1]);
        assert_eq!(graph.distance_of(&distances, 1), Some(0));
        assert_eq!(graph.distance_of(&distances, 2), Some(1));
        assert_eq!(graph.distance_of(&distances, 3), Some(2));
    }

    #[test]
    fn test_control_on_far_side_is_valid() {
        assert_eq!(
            validate_tap_regulator_control_side_topology(&feeder(1)).unwrap(),
            None
        );
    }

    #[test]
    fn test_control_on_source_side_is_reported() {
        let err = validate_tap_regulator_control_side_topology(&feeder(0))
            .unwrap()
            .unwrap();
        assert_eq!(err.kind, ErrorKind::InvalidTapRegulatorControlSide);
        assert_eq!(err.id_values(), vec![30]);
    }

    #[test]
    fn test_unreachable_transformer_is_exempt() {
        let mut data = feeder(0);
        let transformer = data.get_mut(ComponentType::Transformer).unwrap();
        transformer.set_i8("to_status", &[Some(0)]).unwrap();
        assert_eq!(
            validate_tap_regulator_control_side_topology(&data).unwrap(),
            None
        );
    }

    /// source -> node 1 -[three-winding transformer 10]- nodes 2 and 3
    fn three_winding_feeder(control_side: i8, status_3: i8) -> Dataset {
        let nodes = ComponentTable::initialize(ComponentType::Node, DatasetKind::Input, 3)
            .unwrap()
            .with_i32("id", &[1, 2, 3])
            .unwrap();
        let source = ComponentTable::initialize(ComponentType::Source, DatasetKind::Input, 1)
            .unwrap()
            .with_i32("id", &[20])
            .unwrap()
            .with_i32("node", &[1])
            .unwrap()
            .with_i8("status", &[1])
            .unwrap();
        let transformer =
            ComponentTable::initialize(ComponentType::ThreeWindingTransformer, DatasetKind::Input, 1)
                .unwrap()
                .with_i32("id", &[10])
                .unwrap()
                .with_i32("node_1", &[1])
                .unwrap()
                .with_i32("node_2", &[2])
                .unwrap()
                .with_i32("node_3", &[3])
                .unwrap()
                .with_i8("status_1", &[1])
                .unwrap()
                .with_i8("status_2", &[1])
                .unwrap()
                .with_i8("status_3", &[status_3])
                .unwrap();
        let regulator =
            ComponentTable::initialize(ComponentType::TransformerTapRegulator, DatasetKind::Input, 1)
                .unwrap()
                .with_i32("id", &[30])
                .unwrap()
                .with_i32("regulated_object", &[10])
                .unwrap()
                .with_i8("status", &[1])
                .unwrap()
                .with_i8("control_side", &[control_side])
                .unwrap();
        let mut data = Dataset::new(DatasetKind::Input);
        for table in [nodes, source, transformer, regulator] {
            data.insert(table).unwrap();
        }
        data
    }

    #[test]
    fn test_three_winding_star_vertex() {
        let graph = GridGraph::build(&three_winding_feeder(1, 1)).unwrap();
        assert_eq!(graph.node_count(), 4);
        assert_eq!(graph.edge_count(), 3);
        let distances = graph.distances(&[1]);
        assert_eq!(graph.distance_of(&distances, 1), Some(0));
        assert_eq!(graph.distance_of(&distances, 2), Some(2));
        assert_eq!(graph.distance_of(&distances, 3), Some(2));
    }

    #[test]
    fn test_three_winding_control_on_source_side_is_reported() {
        let err = validate_tap_regulator_control_side_topology(&three_winding_feeder(0, 1))
            .unwrap()
            .unwrap();
        assert_eq!(err.kind, ErrorKind::InvalidTapRegulatorControlSide);
        assert_eq!(err.id_values(), vec![30]);
    }

    #[test]
    fn test_three_winding_control_on_far_side_is_valid() {
        for control_side in [1, 2] {
            assert_eq!(
                validate_tap_regulator_control_side_topology(&three_winding_feeder(control_side, 1))
                    .unwrap(),
                None
            );
        }
    }

    /// Known ambiguity: with one winding open, nodes 1 and 2 are still coupled
    /// through the transformer, but the whole transformer leaves the graph and
    /// its regulator is not checked even when it controls the source side.
    #[test]
    fn test_partially_connected_three_winding_is_exempt_known_ambiguity() {
        let data = three_winding_feeder(0, 0);
        let graph = GridGraph::build(&data).unwrap();
        assert_eq!(graph.edge_count(), 0);
        let distances = graph.distances(&[1]);
        assert_eq!(graph.distance_of(&distances, 2), None);
        assert_eq!(
            validate_tap_regulator_control_side_topology(&data).unwrap(),
            None
        );
    }

    #[test]
    fn test_disabled_regulator_is_ignored() {
        let mut data = feeder(0);
        let regulator = data.get_mut(ComponentType::TransformerTapRegulator).unwrap();
        regulator.set_i8("status", &[Some(0)]).unwrap();
        assert_eq!(
            validate_tap_regulator_control_side_topology(&data).unwrap(),
            None
        );
    }
}
