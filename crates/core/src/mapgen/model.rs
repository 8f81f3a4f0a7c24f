//! Public data models for generated maps: columns, nodes, and their exits.
//!
//! Field names on the wire follow the map JSON consumed by game clients.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NodeType {
    Combat,
    EliteCombat,
    Camp,
    Shop,
    Encounter,
    Treasure,
}

impl NodeType {
    /// Every category in sampling order.
    pub const ALL: [NodeType; 6] = [
        NodeType::Combat,
        NodeType::EliteCombat,
        NodeType::Camp,
        NodeType::Shop,
        NodeType::Encounter,
        NodeType::Treasure,
    ];

    pub fn slot(self) -> usize {
        match self {
            NodeType::Combat => 0,
            NodeType::EliteCombat => 1,
            NodeType::Camp => 2,
            NodeType::Shop => 3,
            NodeType::Encounter => 4,
            NodeType::Treasure => 5,
        }
    }

    pub fn is_combat(self) -> bool {
        matches!(self, NodeType::Combat | NodeType::EliteCombat)
    }

    pub fn label(self) -> &'static str {
        match self {
            NodeType::Combat => "combat",
            NodeType::EliteCombat => "eliteCombat",
            NodeType::Camp => "camp",
            NodeType::Shop => "shop",
            NodeType::Encounter => "encounter",
            NodeType::Treasure => "treasure",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitNode {
    pub exit_nodeid: NodeId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    /// `"<column number>-<index in column>"`, column numbers starting at 1.
    #[serde(rename = "columnBasedId")]
    pub column_label: String,
    /// `None` only while the generation pass has not reached this node.
    #[serde(rename = "type")]
    pub node_type: Option<NodeType>,
    #[serde(rename = "encounterId", default, skip_serializing_if = "Option::is_none")]
    pub encounter_id: Option<u8>,
    #[serde(rename = "noOfConnections")]
    pub connection_count: u32,
    /// `None` for nodes of the terminal column.
    #[serde(rename = "exit_nodes", default, skip_serializing_if = "Option::is_none")]
    pub exit_nodes: Option<Vec<ExitNode>>,
}

impl Node {
    pub fn new(id: NodeId, column_index: usize, index_in_column: usize) -> Self {
        Self {
            id,
            column_label: format!("{}-{}", column_index + 1, index_in_column),
            node_type: None,
            encounter_id: None,
            connection_count: 0,
            exit_nodes: None,
        }
    }

    pub fn exit_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.exit_nodes.iter().flatten().map(|exit| exit.exit_nodeid)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    #[serde(rename = "noOfNodes")]
    pub node_count: u32,
    pub nodes: Vec<Node>,
}

impl Column {
    pub fn first_id(&self) -> Option<NodeId> {
        self.nodes.first().map(|node| node.id)
    }

    pub fn last_id(&self) -> Option<NodeId> {
        self.nodes.last().map(|node| node.id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.iter().any(|node| node.id == id)
    }
}

/// A finished map: columns ordered from the entry column to the terminal column.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GeneratedMap {
    pub columns: Vec<Column>,
}

impl GeneratedMap {
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.columns.iter().flat_map(|column| column.nodes.iter())
    }

    pub fn node_count(&self) -> usize {
        self.columns.iter().map(|column| column.nodes.len()).sum()
    }

    /// Node ids are dense and allocated in column order, so lookup is an index.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes().nth(id.index()).filter(|node| node.id == id)
    }

    pub fn count_of(&self, node_type: NodeType) -> usize {
        self.nodes().filter(|node| node.node_type == Some(node_type)).count()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_map() -> GeneratedMap {
        let mut entry = Node::new(NodeId(0), 0, 0);
        entry.node_type = Some(NodeType::Combat);
        entry.connection_count = 1;
        entry.exit_nodes = Some(vec![ExitNode { exit_nodeid: NodeId(1) }]);

        let mut terminal = Node::new(NodeId(1), 1, 0);
        terminal.node_type = Some(NodeType::Encounter);
        terminal.encounter_id = Some(7);

        GeneratedMap {
            columns: vec![
                Column { node_count: 1, nodes: vec![entry] },
                Column { node_count: 1, nodes: vec![terminal] },
            ],
        }
    }

    #[test]
    fn column_label_is_one_based_column_and_zero_based_index() {
        assert_eq!(Node::new(NodeId(9), 2, 1).column_label, "3-1");
    }

    #[test]
    fn serializes_with_client_field_names() {
        let value = serde_json::to_value(sample_map()).expect("map should serialize");
        assert_eq!(
            value,
            json!([
                {
                    "noOfNodes": 1,
                    "nodes": [{
                        "id": 0,
                        "columnBasedId": "1-0",
                        "type": "combat",
                        "noOfConnections": 1,
                        "exit_nodes": [{ "exit_nodeid": 1 }]
                    }]
                },
                {
                    "noOfNodes": 1,
                    "nodes": [{
                        "id": 1,
                        "columnBasedId": "2-0",
                        "type": "encounter",
                        "encounterId": 7,
                        "noOfConnections": 0
                    }]
                }
            ])
        );
    }

    #[test]
    fn node_type_labels_match_serde_names() {
        for node_type in NodeType::ALL {
            let encoded = serde_json::to_value(node_type).expect("type should serialize");
            assert_eq!(encoded, json!(node_type.label()));
        }
    }

    #[test]
    fn lookup_by_id_and_counts() {
        let map = sample_map();
        assert_eq!(map.node_count(), 2);
        assert_eq!(map.node(NodeId(1)).map(|node| node.column_label.as_str()), Some("2-0"));
        assert!(map.node(NodeId(2)).is_none());
        assert_eq!(map.count_of(NodeType::Encounter), 1);
        assert_eq!(map.columns[0].nodes[0].exit_ids().collect::<Vec<_>>(), vec![NodeId(1)]);
    }
}
