use crate::datastructures::is_sorted_subset;
use std::fmt::Debug;

/// Read-only view on an undirected graph. Hypergraphs expose their primal graph here.
pub trait BaseGraph: Debug {
    fn order(&self) -> usize;
    fn is_vertex(&self, u: usize) -> bool;
    fn degree(&self, u: usize) -> usize;
    fn has_edge(&self, u: usize, v: usize) -> bool;
    fn vertices(&self) -> Box<dyn Iterator<Item = usize> + '_>;
    fn neighborhood(&self, u: usize) -> Box<dyn Iterator<Item = usize> + '_>;

    fn is_clique(&self, vertices: &[usize]) -> bool {
        for (i, v) in vertices.iter().enumerate() {
            for u in vertices.iter().skip(i + 1) {
                if !self.has_edge(*v, *u) {
                    return false;
                }
            }
        }
        true
    }

    /// Number of missing edges among the neighbors of `u`.
    fn fill_in_count(&self, u: usize) -> usize {
        let neighbors: Vec<usize> = self.neighborhood(u).filter(|v| *v != u).collect();
        let mut count = 0;
        for (i, x) in neighbors.iter().enumerate() {
            for y in neighbors.iter().skip(i + 1) {
                if !self.has_edge(*x, *y) {
                    count += 1;
                }
            }
        }
        count
    }
}

/// A hyperedge with a stable id. Elements are sorted and free of duplicates.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Hyperedge {
    id: usize,
    elements: Vec<usize>,
}

impl Hyperedge {
    pub fn new(id: usize, mut elements: Vec<usize>) -> Self {
        elements.sort_unstable();
        elements.dedup();
        Self { id, elements }
    }

    #[inline]
    pub fn id(&self) -> usize {
        self.id
    }

    #[inline]
    pub fn elements(&self) -> &[usize] {
        &self.elements
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

/// Graph views that also carry hyperedges with stable ids.
pub trait HyperedgeGraph: BaseGraph {
    fn hyperedge_count(&self) -> usize;
    fn hyperedge(&self, id: usize) -> Option<&Hyperedge>;
    fn hyperedges(&self) -> Box<dyn Iterator<Item = &Hyperedge> + '_>;

    /// Ids of all hyperedges that are fully contained in the ascending `vertices`.
    fn induced_hyperedges(&self, vertices: &[usize]) -> Vec<usize> {
        self.hyperedges()
            .filter(|e| is_sorted_subset(e.elements(), vertices))
            .map(|e| e.id())
            .collect()
    }
}
