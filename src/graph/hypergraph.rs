use crate::datastructures::sorted_union;
use crate::graph::base_graph::{BaseGraph, Hyperedge, HyperedgeGraph};

/// Hypergraph with dense vertex ids `0..order` and hyperedges with stable ids.
///
/// The primal adjacency (two vertices sharing a hyperedge) is maintained as sorted neighbor
/// lists. Single-element hyperedges and self-loops are kept as hyperedges but never show up
/// in a neighborhood.
#[derive(Debug, Clone, Default)]
pub struct Hypergraph {
    neighbors: Vec<Vec<usize>>,
    hyperedges: Vec<Hyperedge>,
}

impl Hypergraph {
    pub fn new(order: usize) -> Self {
        Self {
            neighbors: vec![Vec::new(); order],
            hyperedges: Vec::new(),
        }
    }

    /// Adds a vertex and returns its id.
    pub fn add_vertex(&mut self) -> usize {
        self.neighbors.push(Vec::new());
        self.neighbors.len() - 1
    }

    pub fn add_vertices(&mut self, count: usize) -> Vec<usize> {
        (0..count).map(|_| self.add_vertex()).collect()
    }

    /// Adds the edge `{u, v}` and returns its id.
    pub fn add_edge(&mut self, u: usize, v: usize) -> usize {
        self.add_hyperedge(vec![u, v])
    }

    /// Adds a hyperedge over `elements` and returns its id.
    pub fn add_hyperedge(&mut self, elements: Vec<usize>) -> usize {
        let id = self.hyperedges.len();
        let edge = Hyperedge::new(id, elements);
        assert!(!edge.is_empty());
        for v in edge.elements() {
            assert!(self.is_vertex(*v), "unknown vertex {}", v);
        }
        for v in edge.elements().iter().copied() {
            let others: Vec<usize> = edge
                .elements()
                .iter()
                .copied()
                .filter(|u| *u != v)
                .collect();
            if !others.is_empty() {
                self.neighbors[v] = sorted_union(&self.neighbors[v], &others);
            }
        }
        self.hyperedges.push(edge);
        id
    }
}

impl BaseGraph for Hypergraph {
    fn order(&self) -> usize {
        self.neighbors.len()
    }

    fn is_vertex(&self, u: usize) -> bool {
        u < self.neighbors.len()
    }

    fn degree(&self, u: usize) -> usize {
        self.neighbors[u].len()
    }

    fn has_edge(&self, u: usize, v: usize) -> bool {
        self.neighbors[u].binary_search(&v).is_ok()
    }

    fn vertices(&self) -> Box<dyn Iterator<Item = usize> + '_> {
        Box::new(0..self.neighbors.len())
    }

    fn neighborhood(&self, u: usize) -> Box<dyn Iterator<Item = usize> + '_> {
        Box::new(self.neighbors[u].iter().copied())
    }
}

impl HyperedgeGraph for Hypergraph {
    fn hyperedge_count(&self) -> usize {
        self.hyperedges.len()
    }

    fn hyperedge(&self, id: usize) -> Option<&Hyperedge> {
        self.hyperedges.get(id)
    }

    fn hyperedges(&self) -> Box<dyn Iterator<Item = &Hyperedge> + '_> {
        Box::new(self.hyperedges.iter())
    }
}
