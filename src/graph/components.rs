use crate::graph::base_graph::BaseGraph;
use bitvec::prelude::*;
use fxhash::FxHashMap;
use std::fmt::Debug;

/// Splits a graph into connected components.
pub trait ConnectedComponents: Debug {
    /// Components of `graph` restricted to `vertices` (ascending). Each component is
    /// ascending, and components are ordered by their smallest vertex.
    fn components(&self, graph: &dyn BaseGraph, vertices: &[usize]) -> Vec<Vec<usize>>;
}

/// Iterative depth-first search.
#[derive(Debug, Clone, Copy, Default)]
pub struct DepthFirstComponents;

impl ConnectedComponents for DepthFirstComponents {
    fn components(&self, graph: &dyn BaseGraph, vertices: &[usize]) -> Vec<Vec<usize>> {
        let index: FxHashMap<usize, usize> = vertices
            .iter()
            .copied()
            .enumerate()
            .map(|(i, v)| (v, i))
            .collect();
        let mut visited = bitvec![0; vertices.len()];
        let mut components = Vec::new();
        let mut stack = Vec::new();

        for (i, start) in vertices.iter().copied().enumerate() {
            if visited[i] {
                continue;
            }
            visited.set(i, true);
            stack.push(start);
            let mut component = vec![start];
            while let Some(v) = stack.pop() {
                for u in graph.neighborhood(v) {
                    if let Some(j) = index.get(&u).copied() {
                        if !visited[j] {
                            visited.set(j, true);
                            stack.push(u);
                            component.push(u);
                        }
                    }
                }
            }
            component.sort_unstable();
            components.push(component);
        }
        components
    }
}

#[cfg(test)]
mod tests {
    use crate::graph::{ConnectedComponents, DepthFirstComponents, Hypergraph};

    #[test]
    fn components_of_restriction() {
        let mut graph = Hypergraph::new(6);
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        graph.add_edge(3, 4);

        let all: Vec<usize> = (0..6).collect();
        let components = DepthFirstComponents.components(&graph, &all);
        assert_eq!(components, vec![vec![0, 1, 2], vec![3, 4], vec![5]]);

        let components = DepthFirstComponents.components(&graph, &[0, 2, 3, 4]);
        assert_eq!(components, vec![vec![0], vec![2], vec![3, 4]]);

        assert!(DepthFirstComponents.components(&graph, &[]).is_empty());
    }
}
