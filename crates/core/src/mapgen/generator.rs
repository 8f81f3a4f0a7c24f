//! High-level map generation: column construction followed by one
//! left-to-right pass that connects, traces lineage, and types every node.

use rand_chacha::ChaCha8Rng;
use rand_chacha::rand_core::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::config::Configuration;

use super::connections::NextColumnCursor;
use super::lineage::LineageTable;
use super::model::{Column, ExitNode, GeneratedMap, Node, NodeId, NodeType};
use super::rng::{random_in_range, runtime_seed};
use super::rules::{PathSummary, RuleContext, compute_weights};
use super::sampling::draw_type;
use super::weights::{UsageCounters, WeightSnapshot};

pub const ENCOUNTER_ID_RANGE: (u32, u32) = (1, 20);

pub struct MapGenerator<R: Rng = ChaCha8Rng> {
    config: Configuration,
    rng: R,
    columns: Vec<Column>,
    next_node_id: u32,
}

/// State that lives for exactly one `connect_and_type` pass.
struct RunState {
    usage: UsageCounters,
    lineage: LineageTable,
    types: Vec<Option<NodeType>>,
}

impl RunState {
    fn new(node_count: usize) -> Self {
        Self {
            usage: UsageCounters::default(),
            lineage: LineageTable::new(),
            types: vec![None; node_count],
        }
    }

    fn type_of(&self, id: NodeId) -> Option<NodeType> {
        self.types.get(id.index()).copied().flatten()
    }
}

impl MapGenerator<ChaCha8Rng> {
    /// `config` must already have passed `Configuration::validate`.
    pub fn new(config: Configuration) -> Self {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(runtime_seed()))
    }
}

impl<R: Rng> MapGenerator<R> {
    pub fn with_rng(config: Configuration, rng: R) -> Self {
        Self { config, rng, columns: Vec::new(), next_node_id: 0 }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn generate(mut self) -> GeneratedMap {
        let config = self.config;
        self.build_columns(config.min_nodes, config.max_nodes, config.nodes_must_differ());
        self.connect_and_type(config.min_connection, config.max_connection);
        debug!(columns = self.columns.len(), nodes = self.next_node_id, "map generated");
        self.into_map()
    }

    pub fn into_map(self) -> GeneratedMap {
        GeneratedMap { columns: self.columns }
    }

    /// Allocates every column with a random node count in `min_nodes..=max_nodes`.
    ///
    /// With `must_differ_from_previous`, a column never repeats the size of the
    /// column before it.
    pub fn build_columns(
        &mut self,
        min_nodes: u32,
        max_nodes: u32,
        must_differ_from_previous: bool,
    ) -> &mut Self {
        let can_differ = max_nodes > min_nodes;
        while self.columns.len() < self.config.columns as usize {
            let mut node_count = random_in_range(&mut self.rng, min_nodes, max_nodes);
            if let Some(previous) = self.columns.last().map(|column| column.node_count)
                && must_differ_from_previous
                && can_differ
            {
                while node_count == previous {
                    node_count = random_in_range(&mut self.rng, min_nodes, max_nodes);
                }
            }

            let column_index = self.columns.len();
            let nodes = (0..node_count as usize)
                .map(|index_in_column| {
                    let node = Node::new(NodeId(self.next_node_id), column_index, index_in_column);
                    self.next_node_id += 1;
                    node
                })
                .collect();

            debug!(column = column_index + 1, nodes = node_count, "column built");
            self.columns.push(Column { node_count, nodes });
        }
        self
    }

    pub fn connect_and_type(&mut self, min_connection: u32, max_connection: u32) -> &mut Self {
        self.connect_and_type_observed(min_connection, max_connection, |_, _| {})
    }

    /// Same as `connect_and_type`, handing each node and the weights it was
    /// sampled from to `observe` right after the node is typed.
    pub fn connect_and_type_observed<F>(
        &mut self,
        min_connection: u32,
        max_connection: u32,
        mut observe: F,
    ) -> &mut Self
    where
        F: FnMut(&Node, &WeightSnapshot),
    {
        let mut run = RunState::new(self.next_node_id as usize);
        let column_count = self.columns.len();

        for column_index in 0..column_count {
            let node_count = self.columns[column_index].nodes.len();
            let mut cursor = self.columns.get(column_index + 1).and_then(|next| {
                Some(NextColumnCursor::new(next.first_id()?, next.last_id()?, max_connection))
            });
            let mut shops_in_column = 0;

            for node_index in 0..node_count {
                let node_id = self.columns[column_index].nodes[node_index].id;

                if let Some(cursor) = cursor.as_mut() {
                    let requested = random_in_range(&mut self.rng, min_connection, max_connection);
                    let count = cursor.plan(requested, (node_count - node_index - 1) as u32);
                    let targets = cursor.issue(count);
                    for &target in &targets {
                        run.lineage.extend(node_id, target);
                    }

                    let node = &mut self.columns[column_index].nodes[node_index];
                    node.connection_count = count;
                    node.exit_nodes = Some(
                        targets.into_iter().map(|exit_nodeid| ExitNode { exit_nodeid }).collect(),
                    );
                }

                let context = RuleContext {
                    column_index,
                    node_index,
                    column_node_count: node_count,
                    shops_in_column,
                    usage: run.usage,
                    path: PathSummary::collect(&run.lineage, node_id, |id| run.type_of(id)),
                };
                let snapshot = compute_weights(&context).snapshot();
                let (node_type, tickets) = draw_type(&mut self.rng, &snapshot);

                let node = &mut self.columns[column_index].nodes[node_index];
                node.node_type = Some(node_type);
                match node_type {
                    NodeType::Shop => shops_in_column += 1,
                    NodeType::Encounter => {
                        let (min_id, max_id) = ENCOUNTER_ID_RANGE;
                        let encounter_id = random_in_range(&mut self.rng, min_id, max_id);
                        node.encounter_id = Some(encounter_id as u8);
                    }
                    _ => {}
                }
                run.usage.record(node_type);
                run.types[node_id.index()] = Some(node_type);

                trace!(node = %node_id, label = %node.column_label, %node_type, tickets, "node typed");
                observe(node, &snapshot);
            }

            debug!(column = column_index + 1, shops = shops_in_column, "column typed");
        }
        self
    }
}
