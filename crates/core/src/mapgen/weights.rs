//! Probability vector over the six node types.
//!
//! Encounter and treasure are gated by run-wide usage counters: once the run
//! has spent its encounter (or both treasures) the component stays at zero no
//! matter what a rule asks for.

use super::model::NodeType;

pub const MAX_ENCOUNTERS: u32 = 1;
pub const MAX_TREASURES: u32 = 2;

/// Totals within this distance of 1.0 are already normalized.
const NORMALIZED_TOLERANCE: f64 = 1e-12;

/// Per-run usage of the limited node types. Copied into every `TypeWeights`
/// built during the run; only the generator's run state advances it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UsageCounters {
    pub encounter_used: u32,
    pub treasure_used: u32,
}

impl UsageCounters {
    pub fn encounter_locked(&self) -> bool {
        self.encounter_used >= MAX_ENCOUNTERS
    }

    pub fn treasure_locked(&self) -> bool {
        self.treasure_used >= MAX_TREASURES
    }

    pub fn record(&mut self, node_type: NodeType) {
        match node_type {
            NodeType::Encounter => self.encounter_used = MAX_ENCOUNTERS,
            NodeType::Treasure => self.treasure_used += 1,
            _ => {}
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TypeWeights {
    components: [f64; 6],
    usage: UsageCounters,
}

impl TypeWeights {
    /// Starts from the entry-column distribution: combat only.
    pub fn new(usage: UsageCounters) -> Self {
        let mut components = [0.0; 6];
        components[NodeType::Combat.slot()] = 1.0;
        Self { components, usage }
    }

    pub fn usage(&self) -> UsageCounters {
        self.usage
    }

    pub fn get(&self, node_type: NodeType) -> f64 {
        self.components[node_type.slot()]
    }

    pub fn set(&mut self, node_type: NodeType, value: f64) -> &mut Self {
        let locked = match node_type {
            NodeType::Encounter => self.usage.encounter_locked(),
            NodeType::Treasure => self.usage.treasure_locked(),
            _ => false,
        };
        self.components[node_type.slot()] = if locked { 0.0 } else { value };
        self
    }

    /// Gives `node_type` the whole distribution.
    pub fn force_only(&mut self, node_type: NodeType) -> &mut Self {
        self.components = [0.0; 6];
        self.components[node_type.slot()] = 1.0;
        self
    }

    pub fn total(&self) -> f64 {
        self.components.iter().sum()
    }

    /// Brings the total to exactly 1.
    ///
    /// Overflow comes out of combat. When combat alone cannot absorb it,
    /// combat drops to zero and the other components are scaled down, so no
    /// component ever goes negative. A shortfall is split evenly over the
    /// nonzero components; zero components stay unreachable.
    pub fn normalize(&mut self) -> &mut Self {
        let total = self.total();
        if (total - 1.0).abs() <= NORMALIZED_TOLERANCE {
            return self;
        }

        let combat = NodeType::Combat.slot();
        if total > 1.0 {
            let excess = total - 1.0;
            if self.components[combat] >= excess {
                self.components[combat] -= excess;
            } else {
                let rest = total - self.components[combat];
                self.components[combat] = 0.0;
                for component in &mut self.components {
                    *component /= rest;
                }
            }
            return self;
        }

        let nonzero = self.components.iter().filter(|&&value| value != 0.0).count();
        if nonzero == 0 {
            self.components[combat] = 1.0;
            return self;
        }
        let share = (1.0 - total) / nonzero as f64;
        for component in self.components.iter_mut().filter(|value| **value != 0.0) {
            *component += share;
        }
        self
    }

    pub fn snapshot(&self) -> WeightSnapshot {
        WeightSnapshot { entries: NodeType::ALL.map(|node_type| (node_type, self.get(node_type))) }
    }
}

/// Category labels paired with the probabilities handed to the sampler.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WeightSnapshot {
    pub entries: [(NodeType, f64); 6],
}

impl WeightSnapshot {
    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, probability)| probability).sum()
    }

    pub fn probability(&self, node_type: NodeType) -> f64 {
        self.entries[node_type.slot()].1
    }
}
