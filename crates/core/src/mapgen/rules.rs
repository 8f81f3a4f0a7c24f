//! Rule layers that turn a node's position and history into a type distribution.
//!
//! Every node gets a fresh evaluation: start from pure combat, then apply the
//! column, node and path layers in that order, then normalize. Later layers
//! may override earlier ones; nothing carries over between nodes except the
//! run's usage counters.

use std::collections::{BTreeSet, HashSet};

use super::lineage::LineageTable;
use super::model::{NodeId, NodeType};
use super::weights::{TypeWeights, UsageCounters};

pub const COMBAT_WEIGHT: f64 = 0.5;
pub const ELITE_COMBAT_WEIGHT: f64 = 0.1;
pub const SHOP_WEIGHT: f64 = 0.15;
pub const ENCOUNTER_WEIGHT: f64 = 0.15;
pub const TREASURE_WEIGHT: f64 = 0.05;
/// Camp weight added per combat beyond the free allowance.
pub const CAMP_WEIGHT_STEP: f64 = 0.1;

pub const ELITE_COMBAT_FIRST_COLUMN: usize = 4;
pub const SHOP_COLUMN_INTERVAL: usize = 3;
pub const MAX_SHOPS_PER_COLUMN: u32 = 2;
pub const FREE_COMBATS_BEFORE_CAMP: usize = 2;
/// A treasure this many steps back (or nearer) blocks another treasure.
pub const TREASURE_SPACING: usize = 5;

pub fn is_shop_column(column_index: usize) -> bool {
    (column_index + 1) % SHOP_COLUMN_INTERVAL == 0
}

/// What the paths leading into a node have seen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PathSummary {
    /// Distinct combat or elite nodes met before the nearest camp, over all paths.
    pub distinct_combat_count: usize,
    pub treasure_nearby: bool,
}

impl PathSummary {
    /// Summarizes the lineage of `node` by searching its predecessor graph.
    ///
    /// Equivalent to `from_paths` but linear in the number of ancestors rather
    /// than in the number of distinct paths, which grows geometrically with
    /// fan-in. Every chain back to a given column has the same length, so a
    /// visited set per search is exact.
    pub fn collect<F>(lineage: &LineageTable, node: NodeId, type_of: F) -> Self
    where
        F: Fn(NodeId) -> Option<NodeType>,
    {
        // Combats count until a camp is met; a camp ends the search along that chain.
        let mut combat_ids = BTreeSet::new();
        let mut visited = HashSet::new();
        let mut stack: Vec<NodeId> = lineage.sources(node).to_vec();
        while let Some(ancestor) = stack.pop() {
            if !visited.insert(ancestor) {
                continue;
            }
            match type_of(ancestor) {
                Some(NodeType::Camp) => continue,
                Some(node_type) if node_type.is_combat() => {
                    combat_ids.insert(ancestor);
                }
                _ => {}
            }
            stack.extend_from_slice(lineage.sources(ancestor));
        }

        let mut treasure_nearby = false;
        let mut frontier: Vec<NodeId> = lineage.sources(node).to_vec();
        for _ in 0..TREASURE_SPACING {
            if frontier.iter().any(|&ancestor| type_of(ancestor) == Some(NodeType::Treasure)) {
                treasure_nearby = true;
                break;
            }
            let mut next: Vec<NodeId> =
                frontier.iter().flat_map(|&ancestor| lineage.sources(ancestor)).copied().collect();
            next.sort_unstable();
            next.dedup();
            frontier = next;
        }

        Self { distinct_combat_count: combat_ids.len(), treasure_nearby }
    }

    /// Summarizes the lineage of `node` by walking every distinct path into it.
    pub fn from_paths<F>(lineage: &LineageTable, node: NodeId, type_of: F) -> Self
    where
        F: Fn(NodeId) -> Option<NodeType>,
    {
        let mut combat_ids = BTreeSet::new();
        let mut treasure_nearby = false;

        lineage.walk_paths(node, |path| {
            let mut counting_combat = true;
            for (step, &ancestor) in path.iter().enumerate() {
                let ancestor_type = type_of(ancestor);
                match ancestor_type {
                    Some(node_type) if counting_combat && node_type.is_combat() => {
                        combat_ids.insert(ancestor);
                    }
                    Some(NodeType::Camp) => counting_combat = false,
                    _ => {}
                }
                if step < TREASURE_SPACING && ancestor_type == Some(NodeType::Treasure) {
                    treasure_nearby = true;
                }
            }
        });

        Self { distinct_combat_count: combat_ids.len(), treasure_nearby }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RuleContext {
    pub column_index: usize,
    pub node_index: usize,
    pub column_node_count: usize,
    pub shops_in_column: u32,
    pub usage: UsageCounters,
    pub path: PathSummary,
}

impl RuleContext {
    fn is_last_node(&self) -> bool {
        self.node_index + 1 == self.column_node_count
    }
}

/// Fully evaluated, normalized weights for one node.
pub fn compute_weights(context: &RuleContext) -> TypeWeights {
    let mut weights = TypeWeights::new(context.usage);
    apply_column_rules(&mut weights, context.column_index);
    let shop_forced = apply_node_rules(&mut weights, context);
    apply_path_rules(&mut weights, &context.path, shop_forced);
    weights.normalize();
    weights
}

pub fn apply_column_rules(weights: &mut TypeWeights, column_index: usize) {
    if column_index > 0 {
        weights
            .set(NodeType::Combat, COMBAT_WEIGHT)
            .set(NodeType::Encounter, ENCOUNTER_WEIGHT)
            .set(NodeType::Treasure, TREASURE_WEIGHT);
    }
    if column_index >= ELITE_COMBAT_FIRST_COLUMN {
        weights.set(NodeType::EliteCombat, ELITE_COMBAT_WEIGHT);
    }
    let shop = if is_shop_column(column_index) { SHOP_WEIGHT } else { 0.0 };
    weights.set(NodeType::Shop, shop);
}

/// Returns whether the column's guaranteed shop was forced onto this node.
pub fn apply_node_rules(weights: &mut TypeWeights, context: &RuleContext) -> bool {
    let mut shop_forced = false;
    if context.shops_in_column >= MAX_SHOPS_PER_COLUMN {
        weights.set(NodeType::Shop, 0.0);
    } else if is_shop_column(context.column_index)
        && context.shops_in_column == 0
        && context.is_last_node()
    {
        weights.force_only(NodeType::Shop);
        shop_forced = true;
    }

    if context.usage.encounter_locked() {
        weights.set(NodeType::Encounter, 0.0);
    }
    if context.usage.treasure_locked() {
        weights.set(NodeType::Treasure, 0.0);
    }
    shop_forced
}

pub fn apply_path_rules(weights: &mut TypeWeights, path: &PathSummary, shop_forced: bool) {
    let mut camp = 0.0;
    if !shop_forced && path.distinct_combat_count > FREE_COMBATS_BEFORE_CAMP {
        camp = (path.distinct_combat_count - FREE_COMBATS_BEFORE_CAMP) as f64 * CAMP_WEIGHT_STEP;
    }

    if camp >= 1.0 {
        weights.force_only(NodeType::Camp);
    } else {
        weights.set(NodeType::Camp, camp);
    }

    if path.treasure_nearby {
        weights.set(NodeType::Treasure, 0.0);
    }
}
