//! Bounded graph edit distance.
//!
//! [`ExactEditDistance`] runs a depth-first branch and bound over node
//! assignments. Nodes of the first graph are assigned, in decreasing degree
//! order, either to an unused node of the second graph or to deletion; the
//! partial cost is extended edge by edge as both endpoints become assigned.
//! Whatever is left unused in the second graph at a leaf is inserted.
//!
//! # Costs
//!
//! | Operation | Default |
//! |-----------|---------|
//! | node insertion / deletion | 1 |
//! | node relabel | 0 |
//! | edge insertion / deletion | 1 |
//! | edge relabel (different interaction) | 1 |
//!
//! The search checks its deadline at every expanded state and reports
//! [`EditDistance::TimedOut`] with the best complete assignment found so far.

use crate::models::{EditDistance, Interaction, NodeId, StructuralGraph};
use std::time::{Duration, Instant};

/// Computes a graph edit distance under a time budget.
///
/// Implementations never block much past `timeout`.
pub trait EditDistanceOracle: Send + Sync {
    /// Returns the edit distance between `a` and `b`, or a timeout marker.
    fn distance(
        &self,
        a: &StructuralGraph,
        b: &StructuralGraph,
        timeout: Duration,
    ) -> EditDistance;
}

/// Edit operation costs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EditCosts {
    /// Cost of inserting or deleting a node.
    pub node_indel: f64,
    /// Cost of mapping a node onto one with a different residue label.
    pub node_relabel: f64,
    /// Cost of inserting or deleting an edge.
    pub edge_indel: f64,
    /// Cost of mapping an edge onto one with a different interaction.
    pub edge_relabel: f64,
}

impl Default for EditCosts {
    fn default() -> Self {
        Self {
            node_indel: 1.0,
            node_relabel: 0.0,
            edge_indel: 1.0,
            edge_relabel: 1.0,
        }
    }
}

/// Exact branch-and-bound edit distance.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExactEditDistance {
    costs: EditCosts,
}

impl ExactEditDistance {
    /// Creates an oracle with unit costs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the edit costs.
    #[must_use]
    pub const fn with_costs(mut self, costs: EditCosts) -> Self {
        self.costs = costs;
        self
    }

    /// Returns the edit costs.
    #[must_use]
    pub const fn costs(&self) -> EditCosts {
        self.costs
    }
}

impl EditDistanceOracle for ExactEditDistance {
    fn distance(
        &self,
        a: &StructuralGraph,
        b: &StructuralGraph,
        timeout: Duration,
    ) -> EditDistance {
        let mut search = Search::new(Compact::new(a), Compact::new(b), self.costs, timeout);
        search.descend(0, 0.0);
        if search.timed_out {
            tracing::debug!(
                left = a.node_count(),
                right = b.node_count(),
                expanded = search.expanded,
                "edit distance timed out"
            );
            EditDistance::TimedOut {
                best_upper_bound: Some(search.best),
            }
        } else {
            EditDistance::exact(search.best)
        }
    }
}

/// Index-based view of a graph.
struct Compact<'g> {
    labels: Vec<&'g str>,
    edges: Vec<Vec<Option<&'g Interaction>>>,
    edge_count: usize,
}

impl<'g> Compact<'g> {
    fn new(graph: &'g StructuralGraph) -> Self {
        let mut order: Vec<&NodeId> = graph.nodes().collect();
        order.sort_by_key(|node| std::cmp::Reverse(graph.degree(node)));

        let labels = order
            .iter()
            .map(|node| graph.label(node).unwrap_or_default())
            .collect();
        let edges = order
            .iter()
            .map(|u| order.iter().map(|v| graph.edge(u, v)).collect())
            .collect();
        Self {
            labels,
            edges,
            edge_count: graph.edge_count(),
        }
    }

    fn len(&self) -> usize {
        self.labels.len()
    }
}

struct Search<'g> {
    left: Compact<'g>,
    right: Compact<'g>,
    costs: EditCosts,
    deadline: Option<Instant>,
    assignment: Vec<Option<usize>>,
    used: Vec<bool>,
    used_count: usize,
    best: f64,
    timed_out: bool,
    expanded: u64,
}

impl<'g> Search<'g> {
    #[allow(clippy::cast_precision_loss)]
    fn new(left: Compact<'g>, right: Compact<'g>, costs: EditCosts, timeout: Duration) -> Self {
        // Deleting everything then inserting everything is always possible.
        let best = (left.len() + right.len()) as f64 * costs.node_indel
            + (left.edge_count + right.edge_count) as f64 * costs.edge_indel;
        let used = vec![false; right.len()];
        Self {
            assignment: Vec::with_capacity(left.len()),
            left,
            right,
            costs,
            deadline: Instant::now().checked_add(timeout),
            used,
            used_count: 0,
            best,
            timed_out: false,
            expanded: 0,
        }
    }

    #[allow(clippy::cast_precision_loss)]
    fn descend(&mut self, depth: usize, cost: f64) {
        if self.timed_out {
            return;
        }
        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            self.timed_out = true;
            return;
        }
        self.expanded += 1;

        if depth == self.left.len() {
            let total = cost + self.completion_cost();
            if total < self.best {
                self.best = total;
            }
            return;
        }

        let mut options: Vec<(f64, Option<usize>)> = (0..self.right.len())
            .filter(|&v| !self.used[v])
            .map(|v| (self.assignment_cost(depth, Some(v)), Some(v)))
            .collect();
        options.push((self.assignment_cost(depth, None), None));
        options.sort_by(|a, b| a.0.total_cmp(&b.0));

        let left_after = self.left.len() - depth - 1;
        for (delta, target) in options {
            let next = cost + delta;
            let right_after = self.right.len() - self.used_count - usize::from(target.is_some());
            let bound = next + left_after.abs_diff(right_after) as f64 * self.costs.node_indel;
            if bound >= self.best {
                continue;
            }

            self.assignment.push(target);
            if let Some(v) = target {
                self.used[v] = true;
                self.used_count += 1;
            }
            self.descend(depth + 1, next);
            if let Some(v) = target {
                self.used[v] = false;
                self.used_count -= 1;
            }
            self.assignment.pop();

            if self.timed_out {
                return;
            }
        }
    }

    /// Cost of assigning left node `u` (the next one) to `target`, including
    /// every edge to an already assigned left node.
    fn assignment_cost(&self, u: usize, target: Option<usize>) -> f64 {
        let mut cost = match target {
            Some(v) if self.left.labels[u] != self.right.labels[v] => self.costs.node_relabel,
            Some(_) => 0.0,
            None => self.costs.node_indel,
        };

        for (k, mapped) in self.assignment.iter().enumerate() {
            let left_edge = self.left.edges[u][k];
            let right_edge = match (target, mapped) {
                (Some(v), Some(w)) => self.right.edges[v][*w],
                _ => None,
            };
            cost += match (left_edge, right_edge) {
                (Some(x), Some(y)) if x != y => self.costs.edge_relabel,
                (Some(_), None) | (None, Some(_)) => self.costs.edge_indel,
                _ => 0.0,
            };
        }
        cost
    }

    /// Inserts every unused right node and every right edge touching one.
    #[allow(clippy::cast_precision_loss)]
    fn completion_cost(&self) -> f64 {
        let n = self.right.len();
        let unused_nodes = n - self.used_count;
        let mut unused_edges = 0usize;
        for v in 0..n {
            for w in (v + 1)..n {
                if self.right.edges[v][w].is_some() && (!self.used[v] || !self.used[w]) {
                    unused_edges += 1;
                }
            }
        }
        unused_nodes as f64 * self.costs.node_indel + unused_edges as f64 * self.costs.edge_indel
    }
}
