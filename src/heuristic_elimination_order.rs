use crate::context::Context;
use crate::datastructures::{sorted_difference, sorted_intersection, sorted_intersection_size};
use crate::datastructures::{BucketQueue, SortedVertexSet};
use crate::graph::{BaseGraph, HashMapGraph, MutableGraph};
use bitvec::prelude::*;
use fxhash::FxHashMap;
use num::integer::binomial;
use rand::prelude::StdRng;
use rand::Rng;

/// A vertex elimination order together with the position of every vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexOrdering {
    sequence: Vec<usize>,
    positions: FxHashMap<usize, usize>,
}

impl VertexOrdering {
    pub fn new(sequence: Vec<usize>) -> Self {
        let positions = sequence
            .iter()
            .copied()
            .enumerate()
            .map(|(i, v)| (v, i))
            .collect();
        Self {
            sequence,
            positions,
        }
    }

    #[inline]
    pub fn sequence(&self) -> &[usize] {
        &self.sequence
    }

    #[inline]
    pub fn position(&self, v: usize) -> Option<usize> {
        self.positions.get(&v).copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    /// Whether every vertex occurs exactly once.
    pub fn is_permutation(&self) -> bool {
        self.positions.len() == self.sequence.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderingAlgorithmType {
    MinFill,
    MinDegree,
}

impl Default for OrderingAlgorithmType {
    fn default() -> Self {
        OrderingAlgorithmType::MinFill
    }
}

impl OrderingAlgorithmType {
    /// Returns `None` if `ctx` was terminated before the order was complete.
    pub fn compute(
        &self,
        graph: &dyn BaseGraph,
        rng: &mut StdRng,
        ctx: &Context,
    ) -> Option<VertexOrdering> {
        let (vertices, adjacency) = dense_adjacency(graph);
        match self {
            OrderingAlgorithmType::MinFill => {
                greedy_ordering(MinFillSelector::new(&adjacency), &vertices, rng, ctx)
            }
            OrderingAlgorithmType::MinDegree => {
                greedy_ordering(MinDegreeSelector::new(&adjacency), &vertices, rng, ctx)
            }
        }
    }
}

/// Min-fill elimination order of `graph`.
pub fn compute_order(
    graph: &dyn BaseGraph,
    rng: &mut StdRng,
    ctx: &Context,
) -> Option<VertexOrdering> {
    OrderingAlgorithmType::MinFill.compute(graph, rng, ctx)
}

/// Sorted vertex ids plus sorted neighbor lists over the positions `0..n`, without self-loops.
fn dense_adjacency(graph: &dyn BaseGraph) -> (Vec<usize>, Vec<Vec<usize>>) {
    let mut vertices: Vec<usize> = graph.vertices().collect();
    vertices.sort_unstable();
    let index: FxHashMap<usize, usize> = vertices
        .iter()
        .copied()
        .enumerate()
        .map(|(i, v)| (v, i))
        .collect();
    let adjacency = vertices
        .iter()
        .copied()
        .map(|v| {
            let mut neighbors: Vec<usize> = graph
                .neighborhood(v)
                .filter(|u| *u != v)
                .filter_map(|u| index.get(&u).copied())
                .collect();
            neighbors.sort_unstable();
            neighbors.dedup();
            neighbors
        })
        .collect();
    (vertices, adjacency)
}

/// Greedy elimination guided by a selector over the positions `0..n`.
pub trait Selector {
    /// Priority of `v`; lower values are eliminated first.
    fn value(&self, v: usize) -> usize;
    /// Number of remaining neighbors of `v`.
    fn degree(&self, v: usize) -> usize;
    /// Eliminates `v` and returns the remaining vertices whose value may have changed.
    fn eliminate_vertex(&mut self, v: usize) -> Vec<usize>;
}

fn greedy_ordering<S: Selector>(
    mut selector: S,
    vertices: &[usize],
    rng: &mut StdRng,
    ctx: &Context,
) -> Option<VertexOrdering> {
    let mut pq = BucketQueue::new();
    for v in 0..vertices.len() {
        pq.push(v, selector.value(v));
    }

    let mut sequence = Vec::with_capacity(vertices.len());
    let mut pool = Vec::new();
    while !pq.is_empty() {
        if ctx.is_terminated() {
            return None;
        }
        let min_degree = pq
            .top_collection()
            .iter()
            .map(|v| selector.degree(*v))
            .min()?;
        pool.clear();
        pool.extend(
            pq.top_collection()
                .iter()
                .copied()
                .filter(|v| selector.degree(*v) == min_degree),
        );
        let v = pool[rng.gen_range(0..pool.len())];

        pq.erase(v);
        for u in selector.eliminate_vertex(v) {
            pq.push(u, selector.value(u));
        }
        sequence.push(vertices[v]);
    }
    Some(VertexOrdering::new(sequence))
}

pub struct MinDegreeSelector {
    graph: HashMapGraph,
}

impl MinDegreeSelector {
    fn new(adjacency: &[Vec<usize>]) -> Self {
        let mut graph = HashMapGraph::with_capacity(adjacency.len());
        for (v, neighbors) in adjacency.iter().enumerate() {
            graph.add_vertex(v);
            for u in neighbors.iter().copied().filter(|u| v < *u) {
                graph.add_edge(v, u);
            }
        }
        Self { graph }
    }
}

impl Selector for MinDegreeSelector {
    fn value(&self, v: usize) -> usize {
        self.graph.degree(v)
    }

    fn degree(&self, v: usize) -> usize {
        self.graph.degree(v)
    }

    fn eliminate_vertex(&mut self, v: usize) -> Vec<usize> {
        let neighbors: Vec<usize> = self.graph.neighborhood(v).collect();
        self.graph.eliminate_vertex(v);
        neighbors
    }
}

const AFFECTED_NEIGHBOR: u8 = 1;
const AFFECTED_SECOND_ORDER: u8 = 2;
const PRIORITY_CHANGED: u8 = 4;

/// The additional, unaffected and existing neighbors of a neighbor `x` of the eliminated
/// vertex `v`, relative to the closed neighborhood S of `v`.
struct NeighborhoodSplit {
    additional: Vec<usize>,
    unaffected: Vec<usize>,
    existing: Vec<usize>,
}

/// Min-fill selector with incremental fill maintenance.
///
/// Every vertex keeps its closed neighborhood and the number of edges missing to turn its
/// open neighborhood into a clique. Eliminating `v` only touches the fills of its
/// neighbors and of vertices adjacent to at least one neighbor.
pub struct MinFillSelector {
    neighborhood: Vec<SortedVertexSet>,
    fill: Vec<usize>,
    eliminated: BitVec,
    status: Vec<u8>,
}

impl MinFillSelector {
    fn new(adjacency: &[Vec<usize>]) -> Self {
        let neighborhood: Vec<SortedVertexSet> = adjacency
            .iter()
            .enumerate()
            .map(|(v, neighbors)| {
                let mut closed = SortedVertexSet::from_sorted(neighbors);
                closed.insert(v);
                closed
            })
            .collect();
        let fill = adjacency
            .iter()
            .map(|neighbors| {
                let mut existing = 0;
                for (i, x) in neighbors.iter().enumerate() {
                    existing += sorted_intersection_size(&neighbors[i + 1..], &adjacency[*x]);
                }
                binomial(neighbors.len(), 2) - existing
            })
            .collect();
        Self {
            neighborhood,
            fill,
            eliminated: bitvec![0; adjacency.len()],
            status: vec![0; adjacency.len()],
        }
    }

    #[cfg(test)]
    fn fill(&self, v: usize) -> usize {
        self.fill[v]
    }

    /// Edges missing among `vertices` in the current graph.
    fn missing_edges(&self, vertices: &[usize]) -> usize {
        let mut missing = 0;
        for (i, x) in vertices.iter().enumerate() {
            for y in vertices.iter().skip(i + 1) {
                if !self.neighborhood[*x].contains(*y) {
                    missing += 1;
                }
            }
        }
        missing
    }

    fn split(&self, x: usize, v: usize, closed: &[usize]) -> NeighborhoodSplit {
        let own = self.neighborhood[x].to_vec();
        let existing = sorted_intersection(&own, closed)
            .into_iter()
            .filter(|y| *y != x && *y != v)
            .collect();
        NeighborhoodSplit {
            additional: sorted_difference(closed, &own),
            unaffected: sorted_difference(&own, closed),
            existing,
        }
    }

    fn eliminate_simplicial(&mut self, v: usize, closed: &[usize]) -> Vec<usize> {
        let mut changed = Vec::new();
        for u in closed.iter().copied().filter(|u| *u != v) {
            let unaffected = self.neighborhood[u].len() - closed.len();
            self.neighborhood[u].erase(v);
            if unaffected > 0 {
                self.fill[u] -= unaffected;
                changed.push(u);
            }
        }
        changed
    }
}

impl Selector for MinFillSelector {
    fn value(&self, v: usize) -> usize {
        self.fill[v]
    }

    fn degree(&self, v: usize) -> usize {
        self.neighborhood[v].len() - 1
    }

    fn eliminate_vertex(&mut self, v: usize) -> Vec<usize> {
        assert!(!self.eliminated[v]);
        let closed = self.neighborhood[v].to_vec();
        self.eliminated.set(v, true);

        if self.fill[v] == 0 {
            return self.eliminate_simplicial(v, &closed);
        }

        let neighbors: Vec<usize> = closed.iter().copied().filter(|u| *u != v).collect();
        let splits: FxHashMap<usize, NeighborhoodSplit> = neighbors
            .iter()
            .map(|u| (*u, self.split(*u, v, &closed)))
            .collect();

        // all new fills are computed against the graph before elimination
        let mut updates: Vec<(usize, usize)> = Vec::new();
        let mut second_order = Vec::new();
        for u in neighbors.iter().copied() {
            self.status[u] |= AFFECTED_NEIGHBOR;
        }
        for u in neighbors.iter().copied() {
            let split = &splits[&u];
            let mut fill = self.fill[u] + split.additional.len() * split.unaffected.len();
            for a in split.additional.iter() {
                fill -= sorted_intersection_size(&split.unaffected, &splits[a].unaffected);
            }
            fill -= split.unaffected.len() + self.missing_edges(&split.existing);
            updates.push((u, fill));

            for w in split.unaffected.iter().copied() {
                if self.status[w] & AFFECTED_SECOND_ORDER == 0 {
                    self.status[w] |= AFFECTED_SECOND_ORDER;
                    second_order.push(w);
                }
            }
        }
        for w in second_order.iter().copied() {
            let existing = sorted_intersection(&self.neighborhood[w].to_vec(), &neighbors);
            let missing = self.missing_edges(&existing);
            updates.push((w, self.fill[w] - missing));
        }

        for u in neighbors.iter().copied() {
            self.neighborhood[u].merge(&neighbors);
            self.neighborhood[u].erase(v);
        }

        let mut changed = Vec::with_capacity(updates.len());
        for (x, fill) in updates {
            if self.fill[x] != fill {
                self.fill[x] = fill;
                self.status[x] |= PRIORITY_CHANGED;
            }
            if self.status[x] & PRIORITY_CHANGED != 0 {
                changed.push(x);
            }
            self.status[x] = 0;
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use crate::context::Context;
    use crate::graph::{BaseGraph, HashMapGraph, Hypergraph, MutableGraph};
    use crate::heuristic_elimination_order::{
        compute_order, dense_adjacency, MinFillSelector, OrderingAlgorithmType, Selector,
    };
    use rand::prelude::{SliceRandom, StdRng};
    use rand::{Rng, SeedableRng};

    fn random_graph(n: usize, p: f64, seed: u64) -> Hypergraph {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut graph = Hypergraph::new(n);
        for u in 0..n {
            for v in (u + 1)..n {
                if rng.gen_bool(p) {
                    graph.add_edge(u, v);
                }
            }
        }
        graph
    }

    #[test]
    fn initial_fill_matches_recount() {
        let graph = random_graph(40, 0.2, 1);
        let (_, adjacency) = dense_adjacency(&graph);
        let selector = MinFillSelector::new(&adjacency);
        for v in graph.vertices() {
            assert_eq!(selector.fill(v), graph.fill_in_count(v));
        }
    }

    #[test]
    fn eliminate() {
        for seed in 0..5 {
            let graph = random_graph(35, 0.15, seed);
            let (_, adjacency) = dense_adjacency(&graph);
            let mut selector = MinFillSelector::new(&adjacency);
            let mut vertices: Vec<usize> = graph.vertices().collect();
            let mut mirror = HashMapGraph::from_graph_induced(&graph, &vertices);

            vertices.shuffle(&mut StdRng::seed_from_u64(seed));
            while let Some(v) = vertices.pop() {
                selector.eliminate_vertex(v);
                mirror.eliminate_vertex(v);
                for u in vertices.iter().copied() {
                    assert_eq!(selector.fill(u), mirror.fill_in_count(u));
                    assert_eq!(selector.degree(u), mirror.degree(u));
                }
            }
        }
    }

    #[test]
    fn order_is_permutation() {
        let graph = random_graph(60, 0.1, 7);
        let mut rng = StdRng::seed_from_u64(7);
        for algorithm in [OrderingAlgorithmType::MinFill, OrderingAlgorithmType::MinDegree].iter() {
            let ordering = algorithm.compute(&graph, &mut rng, &Context::new()).unwrap();
            assert_eq!(ordering.len(), 60);
            assert!(ordering.is_permutation());
            for v in 0..60 {
                assert!(ordering.position(v).is_some());
            }
        }
    }

    #[test]
    fn empty_graph() {
        let graph = Hypergraph::new(0);
        let mut rng = StdRng::seed_from_u64(0);
        let ordering = compute_order(&graph, &mut rng, &Context::new()).unwrap();
        assert!(ordering.is_empty());
    }

    #[test]
    fn cycle_starts_with_degree_two_vertex() {
        let mut graph = Hypergraph::new(4);
        graph.add_edge(0, 1);
        graph.add_edge(1, 2);
        graph.add_edge(2, 3);
        graph.add_edge(3, 0);
        let mut rng = StdRng::seed_from_u64(3);
        let ordering = compute_order(&graph, &mut rng, &Context::new()).unwrap();
        assert_eq!(ordering.len(), 4);
        assert_eq!(graph.degree(ordering.sequence()[0]), 2);
    }

    #[test]
    fn star_eliminates_leaves_first() {
        let mut graph = Hypergraph::new(6);
        for leaf in 1..6 {
            graph.add_edge(0, leaf);
        }
        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let ordering = compute_order(&graph, &mut rng, &Context::new()).unwrap();
            // with one leaf left the center has degree 1 as well
            assert!(ordering.position(0).unwrap() >= 4);
        }
    }

    #[test]
    fn same_seed_same_order() {
        let graph = random_graph(50, 0.1, 11);
        let a = compute_order(&graph, &mut StdRng::seed_from_u64(5), &Context::new());
        let b = compute_order(&graph, &mut StdRng::seed_from_u64(5), &Context::new());
        assert_eq!(a, b);
    }

    #[test]
    fn terminated_context_yields_none() {
        let graph = random_graph(10, 0.3, 2);
        let ctx = Context::new();
        ctx.terminate();
        let mut rng = StdRng::seed_from_u64(0);
        assert!(compute_order(&graph, &mut rng, &ctx).is_none());
    }
}
