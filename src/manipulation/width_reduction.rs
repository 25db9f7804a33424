use crate::context::Context;
use crate::datastructures::{is_sorted_subset, sorted_difference, sorted_intersection};
use crate::datastructures::{sorted_intersects, sorted_union};
use crate::error::DecompositionError;
use crate::graph::{ConnectedComponents, DepthFirstComponents, GraphSeparator};
use crate::graph::{HashMapGraph, HyperedgeGraph, MinimumVertexSeparator, MutableGraph};
use crate::manipulation::{ManipulationOutcome, TreeDecompositionOperation};
use crate::tree_decomposition::{NodeId, TreeDecomposition};
use std::collections::VecDeque;

#[cfg(feature = "log")]
use log::debug;

/// Splits bags along separators of their local graph.
///
/// The local graph of a node is the primal graph induced by its bag plus a clique on the
/// intersection with every adjacent bag. If it has a separator S, the bag shrinks to S and
/// each component C of the remainder moves into a node with bag C ∪ S. Bags never grow.
#[derive(Debug)]
pub struct WidthReduction {
    restricted_to_largest_bags: bool,
    separator: Box<dyn GraphSeparator>,
    components: Box<dyn ConnectedComponents>,
}

impl Default for WidthReduction {
    fn default() -> Self {
        Self {
            restricted_to_largest_bags: true,
            separator: Box::new(MinimumVertexSeparator),
            components: Box::new(DepthFirstComponents),
        }
    }
}

impl WidthReduction {
    pub fn new() -> Self {
        Self::default()
    }

    impl_setter!(self, restricted_to_largest_bags, bool);
    impl_setter!(self, separator, Box<dyn GraphSeparator>);
    impl_setter!(self, components, Box<dyn ConnectedComponents>);

    fn local_graph(graph: &dyn HyperedgeGraph, td: &TreeDecomposition, node: NodeId) -> HashMapGraph {
        let bag = td.bag(node);
        let mut local = HashMapGraph::from_graph_induced(graph, bag);
        for neighbor in td.neighbors(node) {
            local.make_clique(&sorted_intersection(bag, td.bag(neighbor)));
        }
        local
    }

    /// Reduces the bag of `node` once. Returns `Ok(None)` if the bag cannot be split.
    pub fn reduce_node(
        &self,
        graph: &dyn HyperedgeGraph,
        td: &mut TreeDecomposition,
        node: NodeId,
    ) -> Result<Option<ManipulationOutcome>, DecompositionError> {
        td.check_node(node)?;
        Ok(self.split_bag(graph, td, node))
    }

    fn split_bag(
        &self,
        graph: &dyn HyperedgeGraph,
        td: &mut TreeDecomposition,
        node: NodeId,
    ) -> Option<ManipulationOutcome> {
        let bag = td.bag(node).to_vec();
        if bag.len() < 2 {
            return None;
        }
        let local = Self::local_graph(graph, td, node);
        if local.is_complete() {
            return None;
        }
        let separator = self.separator.compute_separator(&local, &bag);
        let rest = sorted_difference(&bag, &separator);
        let components = self.components.components(&local, &rest);
        if components.len() < 2 {
            return None;
        }

        let mut outcome = ManipulationOutcome::default();
        let neighbors = td.neighbors(node);
        let mut anchors = Vec::with_capacity(components.len());
        for component in components.iter() {
            let target = sorted_union(component, &separator);
            let anchor = match neighbors
                .iter()
                .copied()
                .find(|n| is_sorted_subset(&target, td.bag(*n)))
            {
                Some(anchor) => anchor,
                None => {
                    let induced = td.restricted_induced_edges(graph, node, &target);
                    let anchor = td.add_child(node, target, induced);
                    outcome.created.push(anchor);
                    anchor
                }
            };
            anchors.push(anchor);
        }

        let induced = td.restricted_induced_edges(graph, node, &separator);
        td.set_bag(node, separator.clone());
        td.set_induced_edges(node, induced);

        let parent = td.parent(node);
        for neighbor in neighbors {
            if anchors.contains(&neighbor) {
                continue;
            }
            let shared = sorted_intersection(&bag, td.bag(neighbor));
            let anchor = match components
                .iter()
                .position(|c| sorted_intersects(c, &shared))
            {
                Some(i) => anchors[i],
                None => continue,
            };
            if Some(neighbor) == parent {
                if td.parent(anchor) == Some(node) {
                    td.swap_with_parent(anchor);
                }
            } else {
                td.set_parent(neighbor, anchor);
            }
        }

        if let Some(target) = td
            .neighbors(node)
            .into_iter()
            .find(|n| is_sorted_subset(&separator, td.bag(*n)))
        {
            if td.parent(target) == Some(node) {
                for child in td.children(node).to_vec() {
                    if child != target {
                        td.set_parent(child, target);
                    }
                }
            }
            td.remove_node(node);
            outcome.removed.push(node);
        }
        Some(outcome)
    }
}

impl TreeDecompositionOperation for WidthReduction {
    fn apply(
        &self,
        graph: &dyn HyperedgeGraph,
        td: &mut TreeDecomposition,
        ctx: &Context,
    ) -> Result<ManipulationOutcome, DecompositionError> {
        let mut outcome = ManipulationOutcome::default();
        loop {
            let mut worklist: VecDeque<NodeId> = if self.restricted_to_largest_bags {
                td.largest_bags().into_iter().collect()
            } else {
                td.nodes().collect()
            };
            let mut changed = false;
            while let Some(node) = worklist.pop_front() {
                if ctx.is_terminated() {
                    return Ok(outcome);
                }
                if !td.is_node(node) {
                    continue;
                }
                if let Some(reduced) = self.split_bag(graph, td, node) {
                    changed = true;
                    if !self.restricted_to_largest_bags {
                        worklist.extend(reduced.created.iter().copied());
                        if td.is_node(node) {
                            worklist.push_back(node);
                        }
                    }
                    outcome.merge(reduced);
                }
            }
            if !changed {
                break;
            }
        }
        #[cfg(feature = "log")]
        debug!(
            "width reduction created {} and removed {} nodes",
            outcome.created.len(),
            outcome.removed.len()
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use crate::bucket_elimination::BucketElimination;
    use crate::context::Context;
    use crate::error::DecompositionError;
    use crate::graph::Hypergraph;
    use crate::heuristic_elimination_order::VertexOrdering;
    use crate::manipulation::{TreeDecompositionOperation, WidthReduction};
    use crate::tree_decomposition::TreeDecomposition;
    use rand::prelude::StdRng;
    use rand::{Rng, SeedableRng};

    fn bags(td: &TreeDecomposition) -> Vec<(usize, Vec<usize>)> {
        td.nodes().map(|n| (n, td.bag(n).to_vec())).collect()
    }

    #[test]
    fn splits_path_bag() {
        let mut graph = Hypergraph::new(4);
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        graph.add_edge(2, 3);
        let mut td = TreeDecomposition::new();
        td.insert_root(vec![0, 1, 2, 3], vec![0, 1, 2]);
        assert_eq!(td.width(), 3);

        let outcome = WidthReduction::new()
            .apply(&graph, &mut td, &Context::new())
            .unwrap();
        assert!(!outcome.is_unchanged());
        assert_eq!(td.width(), 1);
        assert!(td.verify(&graph).is_ok());

        let before = bags(&td);
        let again = WidthReduction::new()
            .apply(&graph, &mut td, &Context::new())
            .unwrap();
        assert!(again.is_unchanged());
        assert_eq!(bags(&td), before);
    }

    #[test]
    fn complete_bag_is_kept() {
        let mut graph = Hypergraph::new(3);
        graph.add_hyperedge(vec![0, 1, 2]);
        let mut td = TreeDecomposition::new();
        let root = td.insert_root(vec![0, 1, 2], vec![0]);
        let outcome = WidthReduction::new()
            .apply(&graph, &mut td, &Context::new())
            .unwrap();
        assert!(outcome.is_unchanged());
        assert_eq!(td.bag(root), &[0, 1, 2]);
    }

    #[test]
    fn disconnected_bag_is_split() {
        let mut graph = Hypergraph::new(4);
        graph.add_edge(0, 1);
        graph.add_edge(2, 3);
        let mut td = TreeDecomposition::new();
        td.insert_root(vec![0, 1, 2, 3], vec![0, 1]);
        WidthReduction::new()
            .apply(&graph, &mut td, &Context::new())
            .unwrap();
        assert_eq!(td.max_bag_size(), 2);
        assert!(td.verify(&graph).is_ok());
    }

    #[test]
    fn never_increases_width_on_random_graphs() {
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut graph = Hypergraph::new(25);
            for _ in 0..45 {
                let u = rng.gen_range(0..25);
                let v = rng.gen_range(0..25);
                graph.add_edge(u, v);
            }
            // a poor ordering leaves room for improvement
            let ordering = VertexOrdering::new((0..25).collect());
            let mut td = BucketElimination::default()
                .compute_decomposition(&graph, &ordering, &mut rng, &Context::new())
                .unwrap()
                .unwrap();
            let before = td.max_bag_size();

            for restricted in [true, false].iter() {
                WidthReduction::new()
                    .restricted_to_largest_bags(*restricted)
                    .apply(&graph, &mut td, &Context::new())
                    .unwrap();
                assert!(td.max_bag_size() <= before);
                assert!(td.verify(&graph).is_ok());
            }
            let snapshot = bags(&td);
            let again = WidthReduction::new()
                .restricted_to_largest_bags(false)
                .apply(&graph, &mut td, &Context::new())
                .unwrap();
            assert!(again.is_unchanged());
            assert_eq!(bags(&td), snapshot);
        }
    }

    #[test]
    fn terminated_context_leaves_tree_unchanged() {
        let mut graph = Hypergraph::new(4);
        graph.add_edge(0, 1);
        graph.add_edge(2, 3);
        let mut td = TreeDecomposition::new();
        let root = td.insert_root(vec![0, 1, 2, 3], vec![0, 1]);
        let ctx = Context::new();
        ctx.terminate();
        let outcome = WidthReduction::new().apply(&graph, &mut td, &ctx).unwrap();
        assert!(outcome.is_unchanged());
        assert_eq!(td.bag(root), &[0, 1, 2, 3]);
    }

    #[test]
    fn reduce_node_rejects_unknown_nodes() {
        let mut graph = Hypergraph::new(4);
        graph.add_edge(0, 1);
        graph.add_edge(2, 3);
        let mut td = TreeDecomposition::new();
        let root = td.insert_root(vec![0, 1, 2, 3], vec![0, 1]);
        let reduction = WidthReduction::new();
        assert_eq!(
            reduction.reduce_node(&graph, &mut td, 7),
            Err(DecompositionError::UnknownNode(7))
        );
        assert_eq!(td.bag(root), &[0, 1, 2, 3]);

        let outcome = reduction.reduce_node(&graph, &mut td, root).unwrap().unwrap();
        assert!(!outcome.is_unchanged());
        assert!(td.verify(&graph).is_ok());
        for removed in outcome.removed {
            assert_eq!(
                reduction.reduce_node(&graph, &mut td, removed),
                Err(DecompositionError::UnknownNode(removed))
            );
        }
    }
}
