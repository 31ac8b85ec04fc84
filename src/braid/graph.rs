//! Dependency-graph ordering: constraints form a DAG via
//! `depends_on`; Braid needs a single deterministic processing order so
//! that conflict resolution and artifact assembly never depend on input
//! order. Traversal itself runs over the crate's [`RingQueue`] — the same
//! FIFO primitive used anywhere else a breadth-first walk needs one.

use std::collections::HashMap;

use crate::model::Constraint;
use crate::ring_queue::RingQueue;

/// A cycle was found and broken by dropping the dependency edge the losing
/// node held on the winning one, deterministically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokenEdge {
    pub from: u64,
    pub to: u64,
}

pub struct OrderingResult {
    /// Constraint ids in dependency order: every id appears after every id
    /// it `depends_on`, modulo edges listed in `broken_edges`.
    pub order: Vec<u64>,
    pub broken_edges: Vec<BrokenEdge>,
}

/// Topologically sorts `constraints` by `depends_on`, breaking any cycles
/// by repeatedly admitting the readiest remaining node (best
/// `tie_break_key`) and dropping whichever of its outstanding dependency
/// edges point back into the unresolved set. Ids not present in the input
/// set are treated as already-satisfied externally — a dangling
/// `depends_on` reference is not itself an error here (the validator
/// doesn't check `depends_on` targets exist).
pub fn topological_order(constraints: &[Constraint]) -> OrderingResult {
    let mut indegree: HashMap<u64, usize> = HashMap::new();
    let mut dependents: HashMap<u64, Vec<u64>> = HashMap::new();
    let present: std::collections::HashSet<u64> = constraints.iter().map(|c| c.id).collect();

    for c in constraints {
        indegree.entry(c.id).or_insert(0);
        for &dep in &c.depends_on {
            if !present.contains(&dep) {
                continue;
            }
            *indegree.entry(c.id).or_insert(0) += 1;
            dependents.entry(dep).or_default().push(c.id);
        }
    }

    let by_id: HashMap<u64, &Constraint> = constraints.iter().map(|c| (c.id, c)).collect();

    let mut order = Vec::with_capacity(constraints.len());
    let mut broken_edges = Vec::new();
    let mut queue: RingQueue<u64> = RingQueue::with_capacity(constraints.len().max(1));

    let mut ready: Vec<u64> = indegree.iter().filter(|(_, &d)| d == 0).map(|(&id, _)| id).collect();
    sort_by_tie_break(&mut ready, &by_id);
    for id in ready {
        queue.enqueue(id);
    }

    while let Ok(id) = queue.dequeue() {
        order.push(id);
        if let Some(deps) = dependents.get(&id) {
            let mut newly_ready = Vec::new();
            for &dependent in deps {
                let entry = indegree.get_mut(&dependent).expect("dependent must have an indegree entry");
                *entry -= 1;
                if *entry == 0 {
                    newly_ready.push(dependent);
                }
            }
            sort_by_tie_break(&mut newly_ready, &by_id);
            for id in newly_ready {
                queue.enqueue(id);
            }
        }
    }

    // Anything left has indegree > 0 only because it sits on a cycle.
    // Break ties deterministically: repeatedly admit the readiest
    // remaining node and drop whatever edges still point into the
    // unresolved set from it.
    let mut remaining: Vec<u64> = indegree
        .iter()
        .filter(|(id, _)| !order.contains(id))
        .map(|(&id, _)| id)
        .collect();

    while !remaining.is_empty() {
        sort_by_tie_break(&mut remaining, &by_id);
        let winner = remaining.remove(0);
        if let Some(constraint) = by_id.get(&winner) {
            for &dep in &constraint.depends_on {
                if remaining.contains(&dep) || (present.contains(&dep) && !order.contains(&dep)) {
                    broken_edges.push(BrokenEdge { from: winner, to: dep });
                }
            }
        }
        order.push(winner);
        if let Some(deps) = dependents.get(&winner) {
            for &dependent in deps {
                if let Some(entry) = indegree.get_mut(&dependent) {
                    if *entry > 0 {
                        *entry -= 1;
                    }
                }
            }
        }
    }

    OrderingResult { order, broken_edges }
}

fn sort_by_tie_break(ids: &mut [u64], by_id: &HashMap<u64, &Constraint>) {
    ids.sort_by_key(|id| tie_break_sort_key(*by_id.get(id).expect("id must be present in by_id")));
}

/// `tie_break_key` sorts highest-first on priority/confidence; graph
/// readiness wants the same "best first" order, so this just negates the
/// orderable fields into an ascending sort key.
fn tie_break_sort_key(c: &Constraint) -> (std::cmp::Reverse<crate::model::Priority>, std::cmp::Reverse<crate::model::ordered_confidence::OrderedF64>, u64) {
    let (priority, confidence, id) = c.tie_break_key();
    (std::cmp::Reverse(priority), std::cmp::Reverse(confidence), id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConstraintKind, Enforcement, Priority};

    fn c(id: u64, depends_on: Vec<u64>) -> Constraint {
        let mut constraint = Constraint::new(id, format!("c{id}"), "d", ConstraintKind::Syntactic, Enforcement::Syntactic);
        constraint.depends_on = depends_on;
        constraint
    }

    #[test]
    fn linear_chain_orders_dependencies_first() {
        let constraints = vec![c(3, vec![2]), c(2, vec![1]), c(1, vec![])];
        let result = topological_order(&constraints);
        assert_eq!(result.order, vec![1, 2, 3]);
        assert!(result.broken_edges.is_empty());
    }

    #[test]
    fn ties_broken_by_priority_then_id() {
        let mut high = c(2, vec![]);
        high.priority = Priority::High;
        let low = c(1, vec![]);
        let result = topological_order(&[low, high]);
        assert_eq!(result.order, vec![2, 1]);
    }

    #[test]
    fn cycle_is_broken_deterministically() {
        let constraints = vec![c(1, vec![2]), c(2, vec![1])];
        let result = topological_order(&constraints);
        assert_eq!(result.order.len(), 2);
        assert_eq!(result.broken_edges.len(), 1);
        // Re-running over the same input breaks the same edge.
        let again = topological_order(&constraints);
        assert_eq!(result.broken_edges, again.broken_edges);
    }

    #[test]
    fn dangling_dependency_reference_is_not_an_error() {
        let constraints = vec![c(1, vec![999])];
        let result = topological_order(&constraints);
        assert_eq!(result.order, vec![1]);
        assert!(result.broken_edges.is_empty());
    }
}
