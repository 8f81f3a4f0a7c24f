//! Connection assignment between one column and the next.
//!
//! All nodes of a column share one cursor over the next column. A node's
//! edges start at the cursor target and move right one target per edge, and
//! its last edge leaves the cursor in place, so the following node's first
//! edge reuses that target. Edges therefore never cross and every
//! next-column node up to the cursor has at least one incoming edge.

use super::model::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NextColumnCursor {
    current: u32,
    last: u32,
    max_connection: u32,
}

impl NextColumnCursor {
    pub fn new(first: NodeId, last: NodeId, max_connection: u32) -> Self {
        debug_assert!(first <= last);
        Self { current: first.0, last: last.0, max_connection: max_connection.max(1) }
    }

    pub fn current(&self) -> NodeId {
        NodeId(self.current)
    }

    /// Next-column targets from the cursor to the end of the column, inclusive.
    pub fn remaining(&self) -> u32 {
        self.last - self.current + 1
    }

    /// Number of edges a node should issue given its random draw and how many
    /// nodes of its column still follow it.
    ///
    /// The draw is raised just enough for the following nodes to reach the
    /// rest of the next column without exceeding the maximum; when even that
    /// is impossible the shortfall is spread over the remaining nodes. The
    /// result never exceeds the targets left, so the column's last node always
    /// ends on the next column's last node.
    pub fn plan(&self, requested: u32, sources_after: u32) -> u32 {
        let remaining = self.remaining();
        let later_reach = sources_after.saturating_mul(self.max_connection - 1);
        let minimal = remaining.saturating_sub(later_reach);
        let floor = if minimal <= self.max_connection {
            minimal
        } else {
            (remaining + sources_after).div_ceil(sources_after + 1)
        };
        requested.max(floor).min(remaining)
    }

    /// Issues `count` edges and returns their targets in order.
    pub fn issue(&mut self, count: u32) -> Vec<NodeId> {
        let mut targets = Vec::with_capacity(count as usize);
        for edge_index in 0..count {
            targets.push(NodeId(self.current));
            if self.current < self.last && edge_index + 1 < count {
                self.current += 1;
            }
        }
        targets
    }
}
