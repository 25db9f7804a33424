pub use base_graph::{BaseGraph, Hyperedge, HyperedgeGraph};
pub use components::{ConnectedComponents, DepthFirstComponents};
pub use hash_map_graph::HashMapGraph;
pub use hypergraph::Hypergraph;
pub use mutable_graph::MutableGraph;
pub use separator::{GraphSeparator, MinimumVertexSeparator};

mod base_graph;
mod components;
mod hash_map_graph;
mod hypergraph;
mod mutable_graph;
mod separator;
