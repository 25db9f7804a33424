use crate::context::Context;
use crate::datastructures::sorted_difference;
use crate::error::DecompositionError;
use crate::graph::HyperedgeGraph;
use crate::manipulation::{ManipulationOutcome, TreeDecompositionOperation};
use crate::tree_decomposition::{NodeId, TreeDecomposition};

/// Ensures no node forgets more than `limit` vertices by inserting a chain of forget nodes
/// between offending nodes and their only child.
#[derive(Debug, Clone, Copy)]
pub struct LimitMaximumForgottenVertexCount {
    limit: usize,
}

impl LimitMaximumForgottenVertexCount {
    pub fn new(limit: usize) -> Self {
        assert!(limit > 0, "the forgotten vertex limit must be positive");
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl TreeDecompositionOperation for LimitMaximumForgottenVertexCount {
    fn apply(
        &self,
        graph: &dyn HyperedgeGraph,
        td: &mut TreeDecomposition,
        ctx: &Context,
    ) -> Result<ManipulationOutcome, DecompositionError> {
        let violating: Vec<NodeId> = td
            .nodes()
            .filter(|n| td.forgotten_vertices(*n).len() > self.limit)
            .collect();
        if let Some(node) = violating
            .iter()
            .copied()
            .find(|n| td.children(*n).len() != 1)
        {
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
            let child = td.children(node)[0];
            let forgotten = td.forgotten_vertices(node);
            let chunks: Vec<&[usize]> = forgotten.chunks(self.limit).collect();

            let mut below = child;
            let mut bag = td.bag(child).to_vec();
            for chunk in chunks.iter().take(chunks.len() - 1) {
                bag = sorted_difference(&bag, chunk);
                let induced = td.restricted_induced_edges(graph, child, &bag);
                below = td.add_parent(below, bag.clone(), induced);
                outcome.created.push(below);
            }
        }
        Ok(outcome)
    }
}
