//! Path lineage: for every node, which predecessors feed it and the lineage
//! each of those predecessors carried.
//!
//! Records live in one arena so that a lineage can point at its
//! predecessors' lineages by index. Paths are enumerated with an explicit
//! stack, never by recursion, so deep or wide maps cannot exhaust the call
//! stack.

use std::collections::{BTreeMap, HashMap};

use super::model::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LineageIndex(usize);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathLineage {
    /// Predecessors in the order their edges were issued, without repeats.
    pub source_node_ids: Vec<NodeId>,
    /// Taken from the first predecessor that reached this node.
    pub step_count_from_entry: u32,
    /// Only predecessors that themselves had a lineage appear here.
    pub predecessor_lineage: BTreeMap<NodeId, LineageIndex>,
}

#[derive(Debug, Default)]
pub struct LineageTable {
    records: Vec<PathLineage>,
    by_node: HashMap<NodeId, LineageIndex>,
}

impl LineageTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lineage_of(&self, node: NodeId) -> Option<&PathLineage> {
        self.by_node.get(&node).map(|&index| &self.records[index.0])
    }

    /// Direct predecessors of `node`; empty for entry-column nodes.
    pub fn sources(&self, node: NodeId) -> &[NodeId] {
        self.lineage_of(node).map_or(&[], |lineage| lineage.source_node_ids.as_slice())
    }

    pub fn record(&self, index: LineageIndex) -> &PathLineage {
        &self.records[index.0]
    }

    /// Records the edge `source -> target`.
    pub fn extend(&mut self, source: NodeId, target: NodeId) {
        let upstream = self.by_node.get(&source).copied();
        let index = match self.by_node.get(&target) {
            Some(&index) => index,
            None => {
                let step_count_from_entry =
                    upstream.map_or(1, |index| self.records[index.0].step_count_from_entry + 1);
                let index = LineageIndex(self.records.len());
                self.records.push(PathLineage {
                    source_node_ids: Vec::new(),
                    step_count_from_entry,
                    predecessor_lineage: BTreeMap::new(),
                });
                self.by_node.insert(target, index);
                index
            }
        };

        let lineage = &mut self.records[index.0];
        if !lineage.source_node_ids.contains(&source) {
            lineage.source_node_ids.push(source);
        }
        if let Some(upstream) = upstream {
            lineage.predecessor_lineage.insert(source, upstream);
        }
    }

    /// Calls `visit` once per distinct path into `node`. Each path lists
    /// ancestor ids nearest first and ends at a node with no lineage of its own.
    pub fn walk_paths<F: FnMut(&[NodeId])>(&self, node: NodeId, mut visit: F) {
        let Some(&root) = self.by_node.get(&node) else {
            return;
        };

        // `None` marks a finished path waiting to be visited.
        let mut stack: Vec<(Option<LineageIndex>, Vec<NodeId>)> = vec![(Some(root), Vec::new())];
        while let Some((pending, path)) = stack.pop() {
            let Some(index) = pending else {
                visit(&path);
                continue;
            };

            let lineage = &self.records[index.0];
            for &source in lineage.source_node_ids.iter().rev() {
                let mut extended = path.clone();
                extended.push(source);
                stack.push((lineage.predecessor_lineage.get(&source).copied(), extended));
            }
        }
    }

    pub fn paths_into(&self, node: NodeId) -> Vec<Vec<NodeId>> {
        let mut paths = Vec::new();
        self.walk_paths(node, |path| paths.push(path.to_vec()));
        paths
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[u32]) -> Vec<NodeId> {
        raw.iter().copied().map(NodeId).collect()
    }

    /// Two entry nodes funnel into 2, which fans out to 3 and 4, which meet at 5.
    fn diamond() -> LineageTable {
        let mut table = LineageTable::new();
        for (source, target) in [(0, 2), (1, 2), (2, 3), (2, 4), (3, 5), (4, 5)] {
            table.extend(NodeId(source), NodeId(target));
        }
        table
    }

    #[test]
    fn entry_nodes_have_no_lineage() {
        let table = diamond();
        assert!(table.lineage_of(NodeId(0)).is_none());
        assert!(table.paths_into(NodeId(0)).is_empty());
    }

    #[test]
    fn first_hop_lineage_is_rooted_at_its_sources() {
        let table = diamond();
        let lineage = table.lineage_of(NodeId(2)).expect("node 2 has sources");
        assert_eq!(lineage.source_node_ids, ids(&[0, 1]));
        assert_eq!(lineage.step_count_from_entry, 1);
        assert!(lineage.predecessor_lineage.is_empty());
    }

    #[test]
    fn step_count_grows_along_the_chain() {
        let table = diamond();
        assert_eq!(table.lineage_of(NodeId(3)).map(|l| l.step_count_from_entry), Some(2));
        assert_eq!(table.lineage_of(NodeId(5)).map(|l| l.step_count_from_entry), Some(3));
    }

    #[test]
    fn predecessor_lineage_points_at_each_source_record() {
        let table = diamond();
        let lineage = table.lineage_of(NodeId(5)).expect("node 5 has sources");
        assert_eq!(lineage.predecessor_lineage.len(), 2);
        let via_three = lineage.predecessor_lineage[&NodeId(3)];
        assert_eq!(table.record(via_three).source_node_ids, ids(&[2]));
    }

    #[test]
    fn enumerates_every_path_nearest_ancestor_first() {
        let table = diamond();
        assert_eq!(
            table.paths_into(NodeId(5)),
            vec![ids(&[3, 2, 0]), ids(&[3, 2, 1]), ids(&[4, 2, 0]), ids(&[4, 2, 1])]
        );
    }

    #[test]
    fn sources_lists_direct_predecessors() {
        let table = diamond();
        assert_eq!(table.sources(NodeId(5)), ids(&[3, 4]).as_slice());
        assert!(table.sources(NodeId(1)).is_empty());
    }

    #[test]
    fn repeated_edge_does_not_duplicate_source() {
        let mut table = LineageTable::new();
        table.extend(NodeId(0), NodeId(1));
        table.extend(NodeId(0), NodeId(1));
        assert_eq!(table.paths_into(NodeId(1)), vec![ids(&[0])]);
    }

    #[test]
    fn long_chains_walk_without_recursion() {
        let mut table = LineageTable::new();
        for id in 0..5_000 {
            table.extend(NodeId(id), NodeId(id + 1));
        }
        let paths = table.paths_into(NodeId(5_000));
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 5_000);
        assert_eq!(paths[0].first(), Some(&NodeId(4_999)));
        assert_eq!(paths[0].last(), Some(&NodeId(0)));
    }
}
