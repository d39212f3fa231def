//! Generic A* search over caller-supplied neighborhoods.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

/// Candidate edge produced by a neighborhood callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Edge<N> {
    /// Node reached by the edge.
    pub node: N,
    /// Cost of traversing the edge.
    pub cost: u32,
    /// Heuristic estimate from `node` to the goal.
    pub estimate: u32,
}

impl<N> Edge<N> {
    /// Creates an edge.
    #[must_use]
    pub const fn new(node: N, cost: u32, estimate: u32) -> Self {
        Self {
            node,
            cost,
            estimate,
        }
    }
}

/// Finds a cheapest path from `start` to `goal`.
///
/// `neighbors` appends the edges leaving a node to the supplied buffer. The
/// returned path includes both endpoints. Among equally promising entries the
/// one queued first is expanded first, so ties resolve in neighbor order.
pub fn astar<N, F>(start: N, goal: N, start_estimate: u32, mut neighbors: F) -> Option<Vec<N>>
where
    N: Copy + Eq + Hash,
    F: FnMut(N, &mut Vec<Edge<N>>),
{
    let mut open: BinaryHeap<Reverse<(u32, u64)>> = BinaryHeap::new();
    let mut entries: Vec<(N, u32)> = Vec::new();
    let mut best_cost: HashMap<N, u32> = HashMap::new();
    let mut came_from: HashMap<N, N> = HashMap::new();
    let mut buffer = Vec::new();

    open.push(Reverse((start_estimate, 0)));
    entries.push((start, 0));
    let _ = best_cost.insert(start, 0);

    while let Some(Reverse((_, sequence))) = open.pop() {
        let (node, cost) = entries[sequence as usize];
        if best_cost.get(&node).map_or(false, |best| cost > *best) {
            continue;
        }
        if node == goal {
            return Some(reconstruct(&came_from, start, goal));
        }

        buffer.clear();
        neighbors(node, &mut buffer);
        for edge in buffer.drain(..) {
            let tentative = cost.saturating_add(edge.cost);
            if best_cost
                .get(&edge.node)
                .map_or(false, |best| tentative >= *best)
            {
                continue;
            }
            let _ = best_cost.insert(edge.node, tentative);
            let _ = came_from.insert(edge.node, node);
            let next_sequence = entries.len() as u64;
            entries.push((edge.node, tentative));
            open.push(Reverse((
                tentative.saturating_add(edge.estimate),
                next_sequence,
            )));
        }
    }

    None
}

fn reconstruct<N>(came_from: &HashMap<N, N>, start: N, goal: N) -> Vec<N>
where
    N: Copy + Eq + Hash,
{
    let mut path = vec![goal];
    let mut cursor = goal;
    while cursor != start {
        match came_from.get(&cursor) {
            Some(previous) => {
                cursor = *previous;
                path.push(cursor);
            }
            None => break,
        }
    }
    path.reverse();
    path
}
