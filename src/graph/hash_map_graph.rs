use crate::graph::base_graph::BaseGraph;
use crate::graph::mutable_graph::MutableGraph;
use fxhash::{FxHashMap, FxHashSet};

/// Adjacency-set graph over arbitrary vertex ids. Used for the scratch graphs built while
/// eliminating and while reducing bags.
#[derive(Clone, Debug)]
pub struct HashMapGraph {
    data: FxHashMap<usize, FxHashSet<usize>>,
}

impl HashMapGraph {
    /// Whether every pair of distinct vertices is adjacent.
    pub fn is_complete(&self) -> bool {
        let n = self.data.len();
        self.data.values().all(|nb| nb.len() + 1 >= n)
    }

    /// Copies the graph induced by `vertices` out of any graph view.
    pub fn from_graph_induced<G: BaseGraph + ?Sized>(graph: &G, vertices: &[usize]) -> Self {
        let mut result = Self::with_capacity(vertices.len());
        for v in vertices.iter().copied() {
            result.add_vertex(v);
        }
        for (i, v) in vertices.iter().copied().enumerate() {
            for u in vertices.iter().copied().skip(i + 1) {
                if u != v && graph.has_edge(u, v) {
                    result.add_edge(u, v);
                }
            }
        }
        result
    }
}

impl MutableGraph for HashMapGraph {
    fn add_vertex(&mut self, u: usize) {
        self.data.entry(u).or_insert_with(FxHashSet::default);
    }

    fn add_edge(&mut self, u: usize, v: usize) {
        assert_ne!(u, v);
        let first = self.data.entry(u).or_insert_with(FxHashSet::default);
        first.insert(v);
        let second = self.data.entry(v).or_insert_with(FxHashSet::default);
        second.insert(u);
    }

    fn eliminate_vertex(&mut self, u: usize) {
        assert!(self.data.contains_key(&u));
        let nb: Vec<usize> = match self.data.remove(&u) {
            Some(nb) => nb.into_iter().collect(),
            None => return,
        };
        for i in &nb {
            if let Some(x) = self.data.get_mut(i) {
                x.remove(&u);
            }
        }
        self.make_clique(&nb);
    }

    fn new() -> Self {
        HashMapGraph {
            data: FxHashMap::default(),
        }
    }

    fn with_capacity(capacity: usize) -> Self {
        HashMapGraph {
            data: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }
}

impl BaseGraph for HashMapGraph {
    fn order(&self) -> usize {
        self.data.len()
    }

    fn is_vertex(&self, u: usize) -> bool {
        self.data.contains_key(&u)
    }

    fn degree(&self, u: usize) -> usize {
        self.data.get(&u).map_or(0, |nb| nb.len())
    }

    fn has_edge(&self, u: usize, v: usize) -> bool {
        self.data.get(&u).map_or(false, |nb| nb.contains(&v))
    }

    fn vertices(&self) -> Box<dyn Iterator<Item = usize> + '_> {
        Box::new(self.data.keys().copied())
    }

    fn neighborhood(&self, u: usize) -> Box<dyn Iterator<Item = usize> + '_> {
        match self.data.get(&u) {
            Some(nb) => Box::new(nb.iter().copied()),
            None => Box::new(std::iter::empty()),
        }
    }
}
