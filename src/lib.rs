macro_rules! impl_setter {
    ($self:ident, $field:ident, $type:ty) => {
        pub fn $field(mut $self, $field: $type) -> Self {
            $self.$field = $field;
            $self
        }
    };
}

pub mod datastructures;

pub mod bucket_elimination;
pub mod context;
pub mod error;
pub mod graph;
pub mod heuristic_elimination_order;
pub mod io;
pub mod labeling;
pub mod manipulation;
pub mod solver;
pub mod timeout;
pub mod tree_decomposition;

#[cfg(feature = "pace-logging")]
pub mod logger;
#[cfg(feature = "handle-ctrlc")]
pub mod signals;

pub use bucket_elimination::{BucketElimination, BucketEliminationDecomposer};
pub use context::Context;
pub use error::DecompositionError;
pub use heuristic_elimination_order::{compute_order, OrderingAlgorithmType, VertexOrdering};
pub use manipulation::{ManipulationOperation, TreeDecompositionOperation};
pub use solver::{FitnessEvaluation, FitnessFunction, IterativeImprovement, WidthFitness};
pub use tree_decomposition::TreeDecomposition;
