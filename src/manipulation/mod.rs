use crate::context::Context;
use crate::error::DecompositionError;
use crate::graph::HyperedgeGraph;
use crate::labeling::LabelingFunction;
use crate::tree_decomposition::{NodeId, TreeDecomposition};
use std::fmt::Debug;

pub use compression::Compression;
pub use join_node_replacement::JoinNodeReplacement;
pub use limit_forgotten_vertex_count::LimitMaximumForgottenVertexCount;
pub use limit_introduced_vertex_count::LimitMaximumIntroducedVertexCount;
pub use width_reduction::WidthReduction;

mod compression;
mod join_node_replacement;
mod limit_forgotten_vertex_count;
mod limit_introduced_vertex_count;
mod width_reduction;

/// Nodes created and removed by one application of an operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManipulationOutcome {
    pub created: Vec<NodeId>,
    pub removed: Vec<NodeId>,
}

impl ManipulationOutcome {
    pub fn is_unchanged(&self) -> bool {
        self.created.is_empty() && self.removed.is_empty()
    }

    /// Appends `other`. A node created and removed again is dropped from both lists.
    pub fn merge(&mut self, other: ManipulationOutcome) {
        self.created.extend(other.created);
        for node in other.removed {
            match self.created.iter().position(|c| *c == node) {
                Some(i) => {
                    self.created.remove(i);
                }
                None => self.removed.push(node),
            }
        }
    }
}

/// A structural rewrite of a tree decomposition that keeps it valid.
///
/// Operations poll `ctx` once per visited node and finish rewriting the current node before
/// they return, so a cancelled operation still leaves a valid decomposition behind.
pub trait TreeDecompositionOperation: Debug {
    fn apply(
        &self,
        graph: &dyn HyperedgeGraph,
        td: &mut TreeDecomposition,
        ctx: &Context,
    ) -> Result<ManipulationOutcome, DecompositionError>;
}

#[derive(Debug)]
pub enum ManipulationOperation {
    Labeling(Box<dyn LabelingFunction>),
    Structural(Box<dyn TreeDecompositionOperation>),
}

impl ManipulationOperation {
    pub fn apply(
        &self,
        graph: &dyn HyperedgeGraph,
        td: &mut TreeDecomposition,
        ctx: &Context,
    ) -> Result<ManipulationOutcome, DecompositionError> {
        match self {
            ManipulationOperation::Structural(operation) => operation.apply(graph, td, ctx),
            ManipulationOperation::Labeling(function) => {
                let nodes: Vec<NodeId> = td.nodes().collect();
                for node in nodes {
                    if ctx.is_terminated() {
                        break;
                    }
                    let labels = td.labels_of(node);
                    let label = function.compute_label(graph, td.bag(node), &labels);
                    td.set_label(function.name(), node, label);
                }
                Ok(ManipulationOutcome::default())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::manipulation::ManipulationOutcome;

    #[test]
    fn merge_outcomes() {
        let mut outcome = ManipulationOutcome {
            created: vec![4, 5],
            removed: vec![1],
        };
        outcome.merge(ManipulationOutcome {
            created: vec![6],
            removed: vec![5, 2],
        });
        assert_eq!(outcome.created, vec![4, 6]);
        assert_eq!(outcome.removed, vec![1, 2]);
        assert!(!outcome.is_unchanged());
        assert!(ManipulationOutcome::default().is_unchanged());
    }
}
