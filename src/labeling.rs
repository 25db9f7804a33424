use crate::datastructures::{sorted_difference, sorted_intersection_size};
use crate::graph::HyperedgeGraph;
use fxhash::FxHashMap;
use std::fmt::Debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Label {
    Vertices(Vec<usize>),
    Hyperedges(Vec<usize>),
    Integer(i64),
    Real(f64),
    Text(String),
}

/// Computes a label for a bag. Labeling functions run after all structural operations of a
/// pipeline, once per node, and may read the labels the node already carries.
pub trait LabelingFunction: Debug {
    fn name(&self) -> &str;
    fn compute_label(
        &self,
        graph: &dyn HyperedgeGraph,
        bag: &[usize],
        labels: &FxHashMap<String, Label>,
    ) -> Label;
}

pub const INDUCED_SUBGRAPH_LABEL: &str = "Induced Subgraph";
pub const COVERING_EDGES_LABEL: &str = "Edges";

/// Labels each node with the ids of all hyperedges contained in its bag.
#[derive(Debug, Clone, Copy, Default)]
pub struct InducedSubgraphLabelingFunction;

impl LabelingFunction for InducedSubgraphLabelingFunction {
    fn name(&self) -> &str {
        INDUCED_SUBGRAPH_LABEL
    }

    fn compute_label(
        &self,
        graph: &dyn HyperedgeGraph,
        bag: &[usize],
        _labels: &FxHashMap<String, Label>,
    ) -> Label {
        Label::Hyperedges(graph.induced_hyperedges(bag))
    }
}

/// Labels each node with a set of hyperedges covering its bag, which turns a tree
/// decomposition into a (generalized) hypertree decomposition.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoveringEdgesLabelingFunction;

impl LabelingFunction for CoveringEdgesLabelingFunction {
    fn name(&self) -> &str {
        COVERING_EDGES_LABEL
    }

    fn compute_label(
        &self,
        graph: &dyn HyperedgeGraph,
        bag: &[usize],
        _labels: &FxHashMap<String, Label>,
    ) -> Label {
        let edges: Vec<(usize, &[usize])> =
            graph.hyperedges().map(|e| (e.id(), e.elements())).collect();
        let containers: Vec<&[usize]> = edges.iter().map(|(_, elements)| *elements).collect();
        Label::Hyperedges(
            greedy_set_cover(bag, &containers)
                .into_iter()
                .map(|i| edges[i].0)
                .collect(),
        )
    }
}

/// Greedy set cover: repeatedly takes the container covering the most uncovered elements.
/// Returns the chosen container indices in ascending order. Elements no container holds
/// stay uncovered.
pub fn greedy_set_cover(elements: &[usize], containers: &[&[usize]]) -> Vec<usize> {
    let mut uncovered = elements.to_vec();
    let mut candidates: Vec<usize> = (0..containers.len()).collect();
    let mut result = Vec::new();

    while !uncovered.is_empty() {
        let mut best: Option<(usize, usize)> = None;
        candidates.retain(|c| {
            let overlap = sorted_intersection_size(&uncovered, containers[*c]);
            if overlap > best.map_or(0, |(_, o)| o) {
                best = Some((*c, overlap));
            }
            overlap > 0
        });
        match best {
            Some((c, _)) => {
                uncovered = sorted_difference(&uncovered, containers[c]);
                candidates.retain(|x| *x != c);
                result.push(c);
            }
            None => break,
        }
    }
    result.sort_unstable();
    result
}
