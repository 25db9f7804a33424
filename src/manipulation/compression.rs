use crate::context::Context;
use crate::datastructures::is_sorted_subset;
use crate::error::DecompositionError;
use crate::graph::HyperedgeGraph;
use crate::manipulation::{ManipulationOutcome, TreeDecompositionOperation};
use crate::tree_decomposition::{NodeId, TreeDecomposition};

/// Removes every node whose bag is a subset of an adjacent bag.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compression;

impl Compression {
    fn find_combinable(td: &TreeDecomposition, node: NodeId) -> Option<NodeId> {
        td.neighbors(node)
            .into_iter()
            .find(|n| is_sorted_subset(td.bag(node), td.bag(*n)))
    }

    /// Merges `node` into its neighbor `target`, whose bag contains the bag of `node`.
    fn merge_into(td: &mut TreeDecomposition, node: NodeId, target: NodeId) {
        if td.parent(target) == Some(node) {
            td.swap_with_parent(target);
        }
        td.remove_node(node);
    }
}

impl TreeDecompositionOperation for Compression {
    fn apply(
        &self,
        _graph: &dyn HyperedgeGraph,
        td: &mut TreeDecomposition,
        ctx: &Context,
    ) -> Result<ManipulationOutcome, DecompositionError> {
        let mut outcome = ManipulationOutcome::default();
        let mut changed = true;
        while changed {
            changed = false;
            let nodes: Vec<NodeId> = td.nodes().collect();
            for node in nodes {
                if ctx.is_terminated() {
                    return Ok(outcome);
                }
                if !td.is_node(node) {
                    continue;
                }
                if let Some(target) = Self::find_combinable(td, node) {
                    Self::merge_into(td, node, target);
                    outcome.removed.push(node);
                    changed = true;
                }
            }
        }
        Ok(outcome)
    }
}
