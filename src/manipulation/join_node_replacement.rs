use crate::context::Context;
use crate::datastructures::{sorted_intersection, sorted_union};
use crate::error::DecompositionError;
use crate::graph::HyperedgeGraph;
use crate::manipulation::{ManipulationOutcome, TreeDecompositionOperation};
use crate::tree_decomposition::{NodeId, TreeDecomposition};

/// Turns every node with more than two children into a chain of binary join nodes.
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinNodeReplacement;

impl JoinNodeReplacement {
    fn replace(
        graph: &dyn HyperedgeGraph,
        td: &mut TreeDecomposition,
        node: NodeId,
    ) -> Vec<NodeId> {
        let children = td.children(node).to_vec();
        let k = children.len();
        if k <= 2 {
            return Vec::new();
        }
        let bag = td.bag(node).to_vec();

        // required[i] = vertices of the bag still needed by children i..k
        let mut required = vec![Vec::new(); k];
        let mut union = Vec::new();
        for i in (0..k).rev() {
            union = sorted_union(&union, td.bag(children[i]));
            required[i] = sorted_intersection(&bag, &union);
        }

        let mut created = Vec::with_capacity(k - 2);
        let mut previous = node;
        for i in 1..=(k - 2) {
            let induced = td.restricted_induced_edges(graph, node, &required[i]);
            let intermediate = td.add_child(previous, required[i].clone(), induced);
            td.set_parent(children[i], intermediate);
            created.push(intermediate);
            previous = intermediate;
        }
        td.set_parent(children[k - 1], previous);
        created
    }
}

impl TreeDecompositionOperation for JoinNodeReplacement {
    fn apply(
        &self,
        graph: &dyn HyperedgeGraph,
        td: &mut TreeDecomposition,
        ctx: &Context,
    ) -> Result<ManipulationOutcome, DecompositionError> {
        let mut outcome = ManipulationOutcome::default();
        let nodes: Vec<NodeId> = td.nodes().collect();
        for node in nodes {
            if ctx.is_terminated() {
                break;
            }
            outcome.created.extend(Self::replace(graph, td, node));
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use crate::context::Context;
    use crate::graph::Hypergraph;
    use crate::manipulation::{JoinNodeReplacement, TreeDecompositionOperation};
    use crate::tree_decomposition::TreeDecomposition;

    #[test]
    fn splits_wide_join() {
        let mut graph = Hypergraph::new(6);
        for leaf in 2..6 {
            graph.add_hyperedge(vec![0, 1, leaf]);
        }
        let mut td = TreeDecomposition::new();
        let root = td.insert_root(vec![0, 1], vec![]);
        let children: Vec<_> = (2..6)
            .map(|leaf| td.add_child(root, vec![0, 1, leaf], vec![leaf - 2]))
            .collect();
        assert!(td.verify(&graph).is_ok());

        let outcome = JoinNodeReplacement
            .apply(&graph, &mut td, &Context::new())
            .unwrap();
        assert_eq!(outcome.created.len(), 2);
        assert_eq!(td.node_count(), 7);
        assert!(td.verify(&graph).is_ok());
        for node in td.nodes() {
            assert!(td.children(node).len() <= 2);
        }
        assert_eq!(td.children(root), &[children[0], outcome.created[0]]);
        assert_eq!(td.bag(outcome.created[0]), &[0, 1]);
        assert_eq!(td.parent(children[3]), Some(outcome.created[1]));

        let again = JoinNodeReplacement
            .apply(&graph, &mut td, &Context::new())
            .unwrap();
        assert!(again.is_unchanged());
    }

    #[test]
    fn bags_keep_only_required_vertices() {
        let mut graph = Hypergraph::new(5);
        graph.add_edge(0, 1);
        graph.add_edge(0, 2);
        graph.add_edge(0, 3);
        graph.add_edge(4, 4);
        let mut td = TreeDecomposition::new();
        let root = td.insert_root(vec![0, 1, 2, 3, 4], vec![3]);
        td.add_child(root, vec![0, 1], vec![0]);
        td.add_child(root, vec![0, 2], vec![1]);
        td.add_child(root, vec![0, 3], vec![2]);

        let outcome = JoinNodeReplacement
            .apply(&graph, &mut td, &Context::new())
            .unwrap();
        assert_eq!(outcome.created.len(), 1);
        assert_eq!(td.bag(outcome.created[0]), &[0, 2, 3]);
        assert!(td.induced_edges(outcome.created[0]).is_empty());
        assert!(td.verify(&graph).is_ok());
    }
}
