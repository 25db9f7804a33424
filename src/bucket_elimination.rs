use crate::context::Context;
use crate::datastructures::{is_sorted_subset, sorted_difference, sorted_union};
use crate::error::DecompositionError;
use crate::graph::{BaseGraph, ConnectedComponents, DepthFirstComponents, HashMapGraph};
use crate::graph::{HyperedgeGraph, MutableGraph};
use crate::heuristic_elimination_order::{OrderingAlgorithmType, VertexOrdering};
use crate::manipulation::{Compression, ManipulationOperation, TreeDecompositionOperation};
use crate::tree_decomposition::{NodeId, TreeDecomposition};
use fxhash::FxHashMap;
use rand::prelude::{SliceRandom, StdRng};
use rand::SeedableRng;
use std::collections::VecDeque;

#[cfg(feature = "log")]
use log::debug;

/// Result of bucket elimination: the final bucket of every vertex and the graph connecting
/// each vertex to the vertex its bucket was passed on to.
#[derive(Debug, Clone)]
pub struct EliminationStructure {
    ordering: VertexOrdering,
    buckets: Vec<Vec<usize>>,
    connections: HashMapGraph,
}

impl EliminationStructure {
    pub fn ordering(&self) -> &VertexOrdering {
        &self.ordering
    }

    /// Final bucket of the vertex at `position` in the ordering.
    pub fn bucket_at(&self, position: usize) -> &[usize] {
        &self.buckets[position]
    }

    pub fn bucket(&self, v: usize) -> Option<&[usize]> {
        self.ordering
            .position(v)
            .map(|p| self.buckets[p].as_slice())
    }

    pub fn connections(&self) -> &HashMapGraph {
        &self.connections
    }
}

/// Bucket elimination followed by assembly of the rooted tree decomposition.
#[derive(Debug)]
pub struct BucketElimination {
    compression: bool,
    components: Box<dyn ConnectedComponents>,
}

impl Default for BucketElimination {
    fn default() -> Self {
        Self {
            compression: true,
            components: Box::new(DepthFirstComponents),
        }
    }
}

impl BucketElimination {
    impl_setter!(self, compression, bool);
    impl_setter!(self, components, Box<dyn ConnectedComponents>);

    /// Computes the elimination structure for `ordering`. Returns `Ok(None)` if `ctx` was
    /// terminated while processing the vertices.
    pub fn eliminate(
        &self,
        graph: &dyn HyperedgeGraph,
        ordering: &VertexOrdering,
        ctx: &Context,
    ) -> Result<Option<EliminationStructure>, DecompositionError> {
        if ordering.len() != graph.order() || !ordering.is_permutation() {
            return Err(DecompositionError::InvalidOrdering {
                expected: graph.order(),
                found: ordering.len(),
            });
        }
        if let Some(v) = ordering
            .sequence()
            .iter()
            .copied()
            .find(|v| !graph.is_vertex(*v))
        {
            return Err(DecompositionError::UnknownVertex(v));
        }

        let mut buckets: Vec<Vec<usize>> = ordering.sequence().iter().map(|v| vec![*v]).collect();
        let position = |v: usize| ordering.position(v).unwrap_or(usize::MAX);

        for edge in graph.hyperedges() {
            if let Some(first) = edge.elements().iter().copied().min_by_key(|v| position(*v)) {
                let p = position(first);
                buckets[p] = sorted_union(&buckets[p], edge.elements());
            }
        }

        let mut connections = HashMapGraph::with_capacity(ordering.len());
        for (p, v) in ordering.sequence().iter().copied().enumerate() {
            if ctx.is_terminated() {
                return Ok(None);
            }
            connections.add_vertex(v);
            if buckets[p].len() <= 1 {
                continue;
            }
            let rest = sorted_difference(&buckets[p], &[v]);
            let target = rest.iter().copied().map(position).min().unwrap_or(p);
            debug_assert!(target > p);
            buckets[target] = sorted_union(&buckets[target], &rest);
            connections.add_edge(v, ordering.sequence()[target]);
        }

        Ok(Some(EliminationStructure {
            ordering: ordering.clone(),
            buckets,
            connections,
        }))
    }

    /// Turns an elimination structure into a rooted tree decomposition. The root holds the
    /// bucket of the last vertex of the ordering. Returns `None` if `ctx` was terminated.
    pub fn assemble(
        &self,
        graph: &dyn HyperedgeGraph,
        structure: EliminationStructure,
        rng: &mut StdRng,
        ctx: &Context,
    ) -> Option<TreeDecomposition> {
        let mut td = TreeDecomposition::new();
        let EliminationStructure {
            ordering,
            buckets,
            mut connections,
        } = structure;
        let root = match ordering.sequence().last() {
            Some(root) => *root,
            None => {
                td.insert_root(vec![], vec![]);
                return Some(td);
            }
        };

        let mut vertices = ordering.sequence().to_vec();
        vertices.sort_unstable();
        let mut components = self.components.components(&connections, &vertices);
        if let Some(i) = components.iter().position(|c| c.binary_search(&root).is_ok()) {
            components.swap(0, i);
        }
        let mut representative = root;
        for component in components.iter().skip(1) {
            let next = *component.choose(rng)?;
            connections.add_edge(representative, next);
            representative = next;
        }

        let bucket = |v: usize| -> Vec<usize> {
            ordering
                .position(v)
                .map(|p| buckets[p].clone())
                .unwrap_or_default()
        };
        let mut node_of: FxHashMap<usize, NodeId> = FxHashMap::default();
        node_of.insert(root, td.insert_root(bucket(root), vec![]));
        let mut queue = VecDeque::new();
        queue.push_back(root);
        while let Some(v) = queue.pop_front() {
            if ctx.is_terminated() {
                return None;
            }
            let parent = node_of[&v];
            let mut neighbors: Vec<usize> = connections.neighborhood(v).collect();
            neighbors.sort_unstable();
            for u in neighbors {
                if node_of.contains_key(&u) {
                    continue;
                }
                node_of.insert(u, td.add_child(parent, bucket(u), vec![]));
                queue.push_back(u);
            }
        }

        let position = |v: &usize| ordering.position(*v).unwrap_or(usize::MAX);
        let mut induced: FxHashMap<NodeId, Vec<usize>> = FxHashMap::default();
        for edge in graph.hyperedges() {
            let start = match edge.elements().iter().min_by_key(|v| position(*v)) {
                Some(first) => node_of[first],
                None => continue,
            };
            let mut stack = vec![start];
            let mut seen = vec![start];
            while let Some(n) = stack.pop() {
                induced.entry(n).or_insert_with(Vec::new).push(edge.id());
                for m in td.neighbors(n) {
                    if !seen.contains(&m) && is_sorted_subset(edge.elements(), td.bag(m)) {
                        seen.push(m);
                        stack.push(m);
                    }
                }
            }
        }
        for (node, edges) in induced {
            td.set_induced_edges(node, edges);
        }
        Some(td)
    }

    pub fn compute_decomposition(
        &self,
        graph: &dyn HyperedgeGraph,
        ordering: &VertexOrdering,
        rng: &mut StdRng,
        ctx: &Context,
    ) -> Result<Option<TreeDecomposition>, DecompositionError> {
        let structure = match self.eliminate(graph, ordering, ctx)? {
            Some(structure) => structure,
            None => return Ok(None),
        };
        let mut td = match self.assemble(graph, structure, rng, ctx) {
            Some(td) => td,
            None => return Ok(None),
        };
        if self.compression {
            Compression.apply(graph, &mut td, ctx)?;
            if ctx.is_terminated() {
                return Ok(None);
            }
        }
        Ok(Some(td))
    }
}

/// Full pipeline: ordering, bucket elimination, assembly and manipulation operations.
///
/// Structural operations run in the configured order; labeling functions run afterwards on
/// the final tree.
#[derive(Debug, Default)]
pub struct BucketEliminationDecomposer {
    ordering: OrderingAlgorithmType,
    engine: BucketElimination,
    operations: Vec<ManipulationOperation>,
    seed: Option<u64>,
}

impl BucketEliminationDecomposer {
    pub fn new() -> Self {
        Self::default()
    }

    impl_setter!(self, ordering, OrderingAlgorithmType);
    impl_setter!(self, engine, BucketElimination);
    impl_setter!(self, operations, Vec<ManipulationOperation>);
    impl_setter!(self, seed, Option<u64>);

    pub fn with_operation(mut self, operation: ManipulationOperation) -> Self {
        self.operations.push(operation);
        self
    }

    pub fn operation_count(&self) -> usize {
        self.operations.len()
    }

    pub fn compute(
        &self,
        graph: &dyn HyperedgeGraph,
        ctx: &Context,
    ) -> Result<Option<TreeDecomposition>, DecompositionError> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.compute_with_rng(graph, &mut rng, ctx)
    }

    pub fn compute_with_rng(
        &self,
        graph: &dyn HyperedgeGraph,
        rng: &mut StdRng,
        ctx: &Context,
    ) -> Result<Option<TreeDecomposition>, DecompositionError> {
        let ordering = match self.ordering.compute(graph, rng, ctx) {
            Some(ordering) => ordering,
            None => return Ok(None),
        };
        let mut td = match self.engine.compute_decomposition(graph, &ordering, rng, ctx)? {
            Some(td) => td,
            None => return Ok(None),
        };
        #[cfg(feature = "log")]
        debug!("decomposition of width {} with {} nodes", td.width(), td.node_count());

        let (structural, labeling): (Vec<_>, Vec<_>) = self
            .operations
            .iter()
            .partition(|op| matches!(op, ManipulationOperation::Structural(_)));
        for operation in structural.into_iter().chain(labeling) {
            operation.apply(graph, &mut td, ctx)?;
            if ctx.is_terminated() {
                return Ok(None);
            }
        }
        Ok(Some(td))
    }
}

#[cfg(test)]
mod tests {
    use crate::bucket_elimination::{BucketElimination, BucketEliminationDecomposer};
    use crate::context::Context;
    use crate::error::DecompositionError;
    use crate::graph::{BaseGraph, HyperedgeGraph, Hypergraph};
    use crate::heuristic_elimination_order::{compute_order, VertexOrdering};
    use crate::labeling::{InducedSubgraphLabelingFunction, Label, INDUCED_SUBGRAPH_LABEL};
    use crate::manipulation::{JoinNodeReplacement, ManipulationOperation};
    use rand::prelude::StdRng;
    use rand::{Rng, SeedableRng};

    fn random_hypergraph(n: usize, edges: usize, seed: u64) -> Hypergraph {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut graph = Hypergraph::new(n);
        for _ in 0..edges {
            let size = rng.gen_range(1..4);
            let elements = (0..size).map(|_| rng.gen_range(0..n)).collect();
            graph.add_hyperedge(elements);
        }
        graph
    }

    fn cycle(n: usize) -> Hypergraph {
        let mut graph = Hypergraph::new(n);
        for i in 0..n {
            graph.add_edge(i, (i + 1) % n);
        }
        graph
    }

    #[test]
    fn buckets_follow_ordering() {
        let mut graph = Hypergraph::new(4);
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        graph.add_edge(2, 3);
        let ordering = VertexOrdering::new(vec![0, 1, 2, 3]);
        let structure = BucketElimination::default()
            .eliminate(&graph, &ordering, &Context::new())
            .unwrap()
            .unwrap();
        assert_eq!(structure.bucket_at(0), &[0, 1]);
        assert_eq!(structure.bucket_at(1), &[1, 2]);
        assert_eq!(structure.bucket_at(2), &[2, 3]);
        assert_eq!(structure.bucket(3), Some(&[3][..]));
        assert!(structure.connections().has_edge(0, 1));
        assert!(structure.connections().has_edge(2, 3));
        assert_eq!(structure.connections().order(), 4);
    }

    #[test]
    fn cycle_has_width_two() {
        let graph = cycle(4);
        for seed in 0..5 {
            let mut rng = StdRng::seed_from_u64(seed);
            let ctx = Context::new();
            let ordering = compute_order(&graph, &mut rng, &ctx).unwrap();
            let td = BucketElimination::default()
                .compute_decomposition(&graph, &ordering, &mut rng, &ctx)
                .unwrap()
                .unwrap();
            assert!(td.verify(&graph).is_ok());
            assert_eq!(td.width(), 2);
        }
    }

    #[test]
    fn star_has_width_one() {
        let mut graph = Hypergraph::new(6);
        for leaf in 1..6 {
            graph.add_edge(0, leaf);
        }
        let td = BucketEliminationDecomposer::new()
            .seed(Some(3))
            .compute(&graph, &Context::new())
            .unwrap()
            .unwrap();
        assert!(td.verify(&graph).is_ok());
        assert_eq!(td.width(), 1);
    }

    #[test]
    fn random_hypergraphs_are_valid() {
        for seed in 0..10 {
            let graph = random_hypergraph(30, 40, seed);
            for compression in [true, false].iter() {
                let engine = BucketElimination::default().compression(*compression);
                let td = BucketEliminationDecomposer::new()
                    .engine(engine)
                    .seed(Some(seed))
                    .compute(&graph, &Context::new())
                    .unwrap()
                    .unwrap();
                assert!(td.verify(&graph).is_ok());
                for node in td.nodes() {
                    for id in td.induced_edges(node) {
                        let edge = graph.hyperedge(*id).unwrap();
                        assert!(edge.elements().iter().all(|v| td.bag(node).contains(v)));
                    }
                }
            }
        }
    }

    #[test]
    fn isolated_vertices_are_stitched() {
        let mut graph = Hypergraph::new(5);
        graph.add_edge(0, 1);
        let ordering = VertexOrdering::new(vec![2, 0, 4, 1, 3]);
        let mut rng = StdRng::seed_from_u64(1);
        let td = BucketElimination::default()
            .compression(false)
            .compute_decomposition(&graph, &ordering, &mut rng, &Context::new())
            .unwrap()
            .unwrap();
        assert_eq!(td.node_count(), 5);
        assert_eq!(td.bag(td.root().unwrap()), &[3]);
        assert!(td.verify(&graph).is_ok());
    }

    #[test]
    fn empty_graph_gives_empty_root() {
        let graph = Hypergraph::new(0);
        let td = BucketEliminationDecomposer::new()
            .compute(&graph, &Context::new())
            .unwrap()
            .unwrap();
        assert_eq!(td.node_count(), 1);
        assert!(td.bag(td.root().unwrap()).is_empty());
        assert!(td.verify(&graph).is_ok());
    }

    #[test]
    fn invalid_ordering_is_rejected() {
        let graph = cycle(4);
        let mut rng = StdRng::seed_from_u64(0);
        let engine = BucketElimination::default();
        let ctx = Context::new();
        assert_eq!(
            engine
                .compute_decomposition(&graph, &VertexOrdering::new(vec![0, 1, 2]), &mut rng, &ctx)
                .unwrap_err(),
            DecompositionError::InvalidOrdering {
                expected: 4,
                found: 3
            }
        );
        assert!(engine
            .compute_decomposition(&graph, &VertexOrdering::new(vec![0, 1, 1, 2]), &mut rng, &ctx)
            .is_err());
        assert_eq!(
            engine
                .compute_decomposition(&graph, &VertexOrdering::new(vec![0, 1, 2, 9]), &mut rng, &ctx)
                .unwrap_err(),
            DecompositionError::UnknownVertex(9)
        );
    }

    #[test]
    fn terminated_context_yields_none() {
        let graph = cycle(6);
        let ctx = Context::new();
        ctx.terminate();
        let mut rng = StdRng::seed_from_u64(0);
        let ordering = VertexOrdering::new((0..6).collect());
        let result = BucketElimination::default()
            .compute_decomposition(&graph, &ordering, &mut rng, &ctx)
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn pipeline_runs_labeling_last() {
        let graph = random_hypergraph(20, 30, 4);
        let td = BucketEliminationDecomposer::new()
            .seed(Some(4))
            .with_operation(ManipulationOperation::Labeling(Box::new(
                InducedSubgraphLabelingFunction,
            )))
            .with_operation(ManipulationOperation::Structural(Box::new(
                JoinNodeReplacement::default(),
            )))
            .compute(&graph, &Context::new())
            .unwrap()
            .unwrap();
        assert!(td.verify(&graph).is_ok());
        for node in td.nodes() {
            assert!(td.children(node).len() <= 2);
            match td.label(INDUCED_SUBGRAPH_LABEL, node) {
                Some(Label::Hyperedges(_)) => {}
                other => panic!("unexpected label {:?}", other),
            }
        }
    }
}
