use crate::context::Context;
use crate::datastructures::{sorted_intersection, sorted_union};
use crate::error::DecompositionError;
use crate::graph::HyperedgeGraph;
use crate::manipulation::{ManipulationOutcome, TreeDecompositionOperation};
use crate::tree_decomposition::{NodeId, TreeDecomposition};

/// Ensures no node introduces more than `limit` vertices. Leaves grow a chain of children,
/// nodes with one child get a chain of introduce nodes above that child.
#[derive(Debug, Clone, Copy)]
pub struct LimitMaximumIntroducedVertexCount {
    limit: usize,
}

impl LimitMaximumIntroducedVertexCount {
    pub fn new(limit: usize) -> Self {
        assert!(limit > 0, "the introduced vertex limit must be positive");
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    fn split_leaf(
        &self,
        graph: &dyn HyperedgeGraph,
        td: &mut TreeDecomposition,
        node: NodeId,
    ) -> Vec<NodeId> {
        let introduced = td.introduced_vertices(node);
        let chunks: Vec<&[usize]> = introduced.chunks(self.limit).collect();
        let mut bags = Vec::with_capacity(chunks.len() - 1);
        let mut bag = Vec::new();
        for chunk in chunks.iter().take(chunks.len() - 1) {
            bag = sorted_union(&bag, chunk);
            bags.push(bag.clone());
        }

        let mut created = Vec::with_capacity(bags.len());
        let mut above = node;
        for bag in bags.into_iter().rev() {
            let induced = td.restricted_induced_edges(graph, node, &bag);
            above = td.add_child(above, bag, induced);
            created.push(above);
        }
        created
    }

    fn split_above_child(
        &self,
        graph: &dyn HyperedgeGraph,
        td: &mut TreeDecomposition,
        node: NodeId,
    ) -> Vec<NodeId> {
        let child = td.children(node)[0];
        let introduced = td.introduced_vertices(node);
        let chunks: Vec<&[usize]> = introduced.chunks(self.limit).collect();

        let mut created = Vec::with_capacity(chunks.len() - 1);
        let mut below = child;
        let mut bag = sorted_intersection(td.bag(node), td.bag(child));
        for chunk in chunks.iter().take(chunks.len() - 1) {
            bag = sorted_union(&bag, chunk);
            let induced = td.restricted_induced_edges(graph, node, &bag);
            below = td.add_parent(below, bag.clone(), induced);
            created.push(below);
        }
        created
    }
}

impl TreeDecompositionOperation for LimitMaximumIntroducedVertexCount {
    fn apply(
        &self,
        graph: &dyn HyperedgeGraph,
        td: &mut TreeDecomposition,
        ctx: &Context,
    ) -> Result<ManipulationOutcome, DecompositionError> {
        let violating: Vec<NodeId> = td
            .nodes()
            .filter(|n| td.introduced_vertices(*n).len() > self.limit)
            .collect();
        if let Some(node) = violating.iter().copied().find(|n| td.is_join(*n)) {
            return Err(DecompositionError::NotSingleChild {
                node,
                children: td.children(node).len(),
            });
        }

        let mut outcome = ManipulationOutcome::default();
        for node in violating {
            if ctx.is_terminated() {
                break;
            }
            let created = if td.is_leaf(node) {
                self.split_leaf(graph, td, node)
            } else {
                self.split_above_child(graph, td, node)
            };
            outcome.created.extend(created);
        }
        Ok(outcome)
    }
}
