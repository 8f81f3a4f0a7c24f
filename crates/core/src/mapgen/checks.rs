//! Structural and rule checks over a finished map.
//!
//! Used by the fuzz harness and the integration tests; a map produced by
//! `MapGenerator` should never yield a violation.

use std::collections::HashMap;
use std::fmt;

use super::model::{GeneratedMap, NodeId, NodeType};
use super::rules::{MAX_SHOPS_PER_COLUMN, TREASURE_SPACING, is_shop_column};
use super::weights::{MAX_ENCOUNTERS, MAX_TREASURES};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MapViolation {
    NonSequentialId { expected: NodeId, found: NodeId },
    NodeCountMismatch { column: usize, declared: u32, actual: usize },
    UntypedNode { node: NodeId },
    ConnectionCountMismatch { node: NodeId, declared: u32, actual: usize },
    MissingExits { node: NodeId },
    TerminalNodeHasExits { node: NodeId },
    ExitOutsideNextColumn { node: NodeId, target: NodeId },
    OrphanedNode { node: NodeId },
    EncounterIdMismatch { node: NodeId },
    TooManyEncounters { count: usize },
    TooManyTreasures { count: usize },
    TreasureTooClose { node: NodeId, ancestor: NodeId },
    MissingShop { column: usize },
    TooManyShops { column: usize, count: usize },
}

impl fmt::Display for MapViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonSequentialId { expected, found } => {
                write!(f, "expected node id {expected}, found {found}")
            }
            Self::NodeCountMismatch { column, declared, actual } => {
                write!(f, "column {column} declares {declared} nodes but holds {actual}")
            }
            Self::UntypedNode { node } => write!(f, "node {node} has no type"),
            Self::ConnectionCountMismatch { node, declared, actual } => {
                write!(f, "node {node} declares {declared} connections but has {actual} exits")
            }
            Self::MissingExits { node } => write!(f, "node {node} has no exit list"),
            Self::TerminalNodeHasExits { node } => {
                write!(f, "terminal node {node} has outgoing connections")
            }
            Self::ExitOutsideNextColumn { node, target } => {
                write!(f, "node {node} exits to {target}, which is not in the next column")
            }
            Self::OrphanedNode { node } => write!(f, "node {node} has no incoming connection"),
            Self::EncounterIdMismatch { node } => {
                write!(f, "node {node} encounter id does not match its type")
            }
            Self::TooManyEncounters { count } => write!(f, "map has {count} encounters"),
            Self::TooManyTreasures { count } => write!(f, "map has {count} treasures"),
            Self::TreasureTooClose { node, ancestor } => {
                write!(f, "treasure {node} follows treasure {ancestor} too closely")
            }
            Self::MissingShop { column } => write!(f, "shop column {column} has no shop"),
            Self::TooManyShops { column, count } => {
                write!(f, "column {column} has {count} shops")
            }
        }
    }
}

/// Returns every violation found; an empty list means the map is sound.
pub fn audit(map: &GeneratedMap) -> Vec<MapViolation> {
    let mut violations = Vec::new();
    let mut predecessors: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
    let mut expected_id = 0_u32;

    for (column_index, column) in map.columns.iter().enumerate() {
        if column.node_count as usize != column.nodes.len() {
            violations.push(MapViolation::NodeCountMismatch {
                column: column_index,
                declared: column.node_count,
                actual: column.nodes.len(),
            });
        }

        let next = map.columns.get(column_index + 1);
        for node in &column.nodes {
            let expected = NodeId(expected_id);
            if node.id != expected {
                violations.push(MapViolation::NonSequentialId { expected, found: node.id });
            }
            expected_id = node.id.0 + 1;

            if node.node_type.is_none() {
                violations.push(MapViolation::UntypedNode { node: node.id });
            }
            let is_encounter = node.node_type == Some(NodeType::Encounter);
            if is_encounter != node.encounter_id.is_some() {
                violations.push(MapViolation::EncounterIdMismatch { node: node.id });
            }

            match (next, &node.exit_nodes) {
                (None, Some(_)) => {
                    violations.push(MapViolation::TerminalNodeHasExits { node: node.id });
                }
                (Some(_), None) => violations.push(MapViolation::MissingExits { node: node.id }),
                (Some(next), Some(exits)) => {
                    if node.connection_count as usize != exits.len() {
                        violations.push(MapViolation::ConnectionCountMismatch {
                            node: node.id,
                            declared: node.connection_count,
                            actual: exits.len(),
                        });
                    }
                    for exit in exits {
                        if !next.contains(exit.exit_nodeid) {
                            violations.push(MapViolation::ExitOutsideNextColumn {
                                node: node.id,
                                target: exit.exit_nodeid,
                            });
                        }
                        predecessors.entry(exit.exit_nodeid).or_default().push(node.id);
                    }
                }
                (None, None) => {}
            }
        }

        let shops = column.nodes.iter().filter(|n| n.node_type == Some(NodeType::Shop)).count();
        if shops > MAX_SHOPS_PER_COLUMN as usize {
            violations.push(MapViolation::TooManyShops { column: column_index, count: shops });
        }
        if is_shop_column(column_index) && shops == 0 {
            violations.push(MapViolation::MissingShop { column: column_index });
        }
    }

    for column in map.columns.iter().skip(1) {
        for node in &column.nodes {
            if !predecessors.contains_key(&node.id) {
                violations.push(MapViolation::OrphanedNode { node: node.id });
            }
        }
    }

    let encounters = map.count_of(NodeType::Encounter);
    if encounters > MAX_ENCOUNTERS as usize {
        violations.push(MapViolation::TooManyEncounters { count: encounters });
    }
    let treasures = map.count_of(NodeType::Treasure);
    if treasures > MAX_TREASURES as usize {
        violations.push(MapViolation::TooManyTreasures { count: treasures });
    }

    for node in map.nodes().filter(|node| node.node_type == Some(NodeType::Treasure)) {
        if let Some(ancestor) = nearby_treasure(map, &predecessors, node.id) {
            violations.push(MapViolation::TreasureTooClose { node: node.id, ancestor });
        }
    }

    violations
}

/// Breadth-first walk back through predecessors, `TREASURE_SPACING` steps deep.
fn nearby_treasure(
    map: &GeneratedMap,
    predecessors: &HashMap<NodeId, Vec<NodeId>>,
    node: NodeId,
) -> Option<NodeId> {
    let mut frontier = vec![node];
    for _ in 0..TREASURE_SPACING {
        let mut next_frontier: Vec<NodeId> = frontier
            .iter()
            .filter_map(|id| predecessors.get(id))
            .flatten()
            .copied()
            .collect();
        next_frontier.sort_unstable();
        next_frontier.dedup();

        if let Some(&ancestor) = next_frontier.iter().find(|&&id| {
            map.node(id).and_then(|ancestor| ancestor.node_type) == Some(NodeType::Treasure)
        }) {
            return Some(ancestor);
        }
        frontier = next_frontier;
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapgen::model::{Column, ExitNode, Node};

    fn typed_node(id: u32, column: usize, index: usize, node_type: NodeType) -> Node {
        let mut node = Node::new(NodeId(id), column, index);
        node.node_type = Some(node_type);
        node
    }

    fn link(node: &mut Node, targets: &[u32]) {
        node.connection_count = targets.len() as u32;
        node.exit_nodes =
            Some(targets.iter().map(|&id| ExitNode { exit_nodeid: NodeId(id) }).collect());
    }

    /// A straight chain of single-node columns with the given types.
    fn chain(types: &[NodeType]) -> GeneratedMap {
        let last = types.len() - 1;
        let columns = types
            .iter()
            .enumerate()
            .map(|(index, &node_type)| {
                let mut node = typed_node(index as u32, index, 0, node_type);
                if index < last {
                    link(&mut node, &[index as u32 + 1]);
                }
                Column { node_count: 1, nodes: vec![node] }
            })
            .collect();
        GeneratedMap { columns }
    }

    #[test]
    fn sound_chain_has_no_violations() {
        let map = chain(&[NodeType::Combat, NodeType::Combat, NodeType::Shop, NodeType::Combat]);
        assert_eq!(audit(&map), Vec::new());
    }

    #[test]
    fn reports_orphans_and_bad_exits() {
        let mut entry = typed_node(0, 0, 0, NodeType::Combat);
        link(&mut entry, &[1, 7]);
        entry.connection_count = 3;
        let map = GeneratedMap {
            columns: vec![
                Column { node_count: 1, nodes: vec![entry] },
                Column {
                    node_count: 2,
                    nodes: vec![
                        typed_node(1, 1, 0, NodeType::Combat),
                        typed_node(2, 1, 1, NodeType::Combat),
                    ],
                },
            ],
        };

        let violations = audit(&map);
        assert!(violations.contains(&MapViolation::ConnectionCountMismatch {
            node: NodeId(0),
            declared: 3,
            actual: 2
        }));
        assert!(violations
            .contains(&MapViolation::ExitOutsideNextColumn { node: NodeId(0), target: NodeId(7) }));
        assert!(violations.contains(&MapViolation::OrphanedNode { node: NodeId(2) }));
    }

    #[test]
    fn reports_treasures_closer_than_the_spacing() {
        let close = chain(&[
            NodeType::Combat,
            NodeType::Treasure,
            NodeType::Shop,
            NodeType::Combat,
            NodeType::Treasure,
        ]);
        assert_eq!(
            audit(&close),
            vec![MapViolation::TreasureTooClose { node: NodeId(4), ancestor: NodeId(1) }]
        );

        let spaced = chain(&[
            NodeType::Treasure,
            NodeType::Combat,
            NodeType::Shop,
            NodeType::Combat,
            NodeType::Combat,
            NodeType::Shop,
            NodeType::Treasure,
        ]);
        assert_eq!(audit(&spaced), Vec::new());
    }

    #[test]
    fn reports_missing_shop_and_encounter_limits() {
        let mut map = chain(&[
            NodeType::Combat,
            NodeType::Encounter,
            NodeType::Combat,
            NodeType::Encounter,
        ]);
        map.columns[1].nodes[0].encounter_id = Some(3);

        let violations = audit(&map);
        assert!(violations.contains(&MapViolation::MissingShop { column: 2 }));
        assert!(violations.contains(&MapViolation::TooManyEncounters { count: 2 }));
        assert!(violations.contains(&MapViolation::EncounterIdMismatch { node: NodeId(3) }));
    }

    #[test]
    fn violations_render_readable_messages() {
        let message = MapViolation::OrphanedNode { node: NodeId(4) }.to_string();
        assert_eq!(message, "node 4 has no incoming connection");
    }
}
