//! Ticket-list sampling over a `WeightSnapshot`.
//!
//! Each category gets `round(probability * 100)` tickets and one ticket is
//! drawn uniformly. Probabilities below half a percent earn no ticket and
//! are unreachable for that draw.

use std::iter::repeat_n;

use rand_chacha::rand_core::Rng;

use super::model::NodeType;
use super::rng::random_index;
use super::weights::WeightSnapshot;

const TICKETS_PER_UNIT: f64 = 100.0;

pub fn ticket_count(probability: f64) -> usize {
    // Saturating cast: negative weights earn nothing.
    (probability * TICKETS_PER_UNIT).round() as usize
}

pub fn build_tickets(snapshot: &WeightSnapshot) -> Vec<NodeType> {
    snapshot
        .entries
        .iter()
        .flat_map(|&(node_type, probability)| repeat_n(node_type, ticket_count(probability)))
        .collect()
}

/// Draws one type and reports how many tickets were in play.
pub fn draw_type<R: Rng + ?Sized>(rng: &mut R, snapshot: &WeightSnapshot) -> (NodeType, usize) {
    let tickets = build_tickets(snapshot);
    if tickets.is_empty() {
        return (NodeType::Combat, 0);
    }
    (tickets[random_index(rng, tickets.len())], tickets.len())
}
