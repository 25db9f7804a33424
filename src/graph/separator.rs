use crate::graph::base_graph::BaseGraph;
use crate::graph::components::{ConnectedComponents, DepthFirstComponents};
use std::collections::VecDeque;
use std::fmt::Debug;

/// Computes a vertex separator of a graph.
pub trait GraphSeparator: Debug {
    /// A set of vertices (ascending) whose removal disconnects `vertices` in `graph`.
    /// Returns the empty set if the graph is already disconnected, and also if it is
    /// complete, because no separator exists then.
    fn compute_separator(&self, graph: &dyn BaseGraph, vertices: &[usize]) -> Vec<usize>;
}

/// Smallest vertex separator over all non-adjacent pairs, found by unit capacity max flow.
#[derive(Debug, Clone, Copy, Default)]
pub struct MinimumVertexSeparator;

const UNSET: usize = usize::MAX;

struct FlowNetwork {
    head: Vec<Vec<usize>>,
    to: Vec<usize>,
    rev: Vec<usize>,
    cap: Vec<usize>,
    residual: Vec<usize>,
    parent_edge: Vec<usize>,
}

impl FlowNetwork {
    fn with_size(n: usize) -> Self {
        Self {
            head: vec![Vec::new(); n],
            to: Vec::new(),
            rev: Vec::new(),
            cap: Vec::new(),
            residual: Vec::new(),
            parent_edge: vec![UNSET; n],
        }
    }

    fn link(&mut self, u: usize, v: usize, cap: usize) {
        let e = self.to.len();
        let f = e + 1;
        self.head[u].push(e);
        self.head[v].push(f);
        self.to.extend([v, u].iter());
        self.rev.extend([f, e].iter());
        self.cap.extend([cap, 0].iter());
        self.residual.extend([cap, 0].iter());
    }

    fn reset(&mut self) {
        self.residual.copy_from_slice(&self.cap);
    }

    /// Marks every node reachable from `src` in the residual network.
    fn search(&mut self, src: usize, sink: Option<usize>) -> bool {
        self.parent_edge.iter_mut().for_each(|p| *p = UNSET);
        let mut queue = VecDeque::new();
        self.parent_edge[src] = usize::MAX - 1;
        queue.push_back(src);
        while let Some(u) = queue.pop_front() {
            for e in self.head[u].iter().copied() {
                let v = self.to[e];
                if self.residual[e] == 0 || self.parent_edge[v] != UNSET {
                    continue;
                }
                self.parent_edge[v] = e;
                if Some(v) == sink {
                    return true;
                }
                queue.push_back(v);
            }
        }
        false
    }

    fn augment(&mut self, src: usize, sink: usize) -> bool {
        if !self.search(src, Some(sink)) {
            return false;
        }
        let mut u = sink;
        while u != src {
            let e = self.parent_edge[u];
            let f = self.rev[e];
            self.residual[e] -= 1;
            self.residual[f] += 1;
            u = self.to[f];
        }
        true
    }

    /// Max flow from `src` to `sink`, giving up once it reaches `limit`.
    fn run(&mut self, src: usize, sink: usize, limit: usize) -> usize {
        self.reset();
        let mut flow = 0;
        while flow < limit && self.augment(src, sink) {
            flow += 1;
        }
        flow
    }

    fn is_reached(&self, u: usize) -> bool {
        self.parent_edge[u] != UNSET
    }
}

impl GraphSeparator for MinimumVertexSeparator {
    fn compute_separator(&self, graph: &dyn BaseGraph, vertices: &[usize]) -> Vec<usize> {
        if DepthFirstComponents.components(graph, vertices).len() != 1 {
            return Vec::new();
        }
        let n = vertices.len();
        let infinity = n + 1;

        // vertex i is split into in = 2i and out = 2i + 1
        let mut network = FlowNetwork::with_size(2 * n);
        for i in 0..n {
            network.link(2 * i, 2 * i + 1, 1);
        }
        for (i, u) in vertices.iter().copied().enumerate() {
            for (j, v) in vertices.iter().copied().enumerate().skip(i + 1) {
                if graph.has_edge(u, v) {
                    network.link(2 * i + 1, 2 * j, infinity);
                    network.link(2 * j + 1, 2 * i, infinity);
                }
            }
        }

        let mut best: Option<(usize, usize, usize)> = None;
        for (i, u) in vertices.iter().copied().enumerate() {
            for (j, v) in vertices.iter().copied().enumerate().skip(i + 1) {
                if graph.has_edge(u, v) {
                    continue;
                }
                let limit = best.map_or(infinity, |(size, _, _)| size);
                let flow = network.run(2 * i + 1, 2 * j, limit);
                if flow < limit {
                    best = Some((flow, i, j));
                }
            }
        }

        match best {
            None => Vec::new(),
            Some((_, i, j)) => {
                network.run(2 * i + 1, 2 * j, infinity);
                network.search(2 * i + 1, None);
                (0..n)
                    .filter(|k| network.is_reached(2 * k) && !network.is_reached(2 * k + 1))
                    .map(|k| vertices[k])
                    .collect()
            }
        }
    }
}
