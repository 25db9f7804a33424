use crate::datastructures::{is_sorted_subset, sorted_difference, sorted_intersection, sorted_union};
use crate::error::DecompositionError;
use crate::graph::HyperedgeGraph;
use crate::labeling::Label;
use bitvec::prelude::*;
use fxhash::FxHashMap;
use std::fmt;
use std::fmt::{Display, Formatter};

pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeDecompositionValidationError {
    HasCycle,
    NotConnected,
    MissingRoot,
    MissingVertex(usize),
    MissingEdge(usize),
    NotInducingSubtree(usize),
}

impl Display for TreeDecompositionValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            TreeDecompositionValidationError::HasCycle => write!(f, "Has Cycle"),
            TreeDecompositionValidationError::NotConnected => write!(f, "Not Connected"),
            TreeDecompositionValidationError::MissingRoot => write!(f, "Missing Root"),
            TreeDecompositionValidationError::MissingVertex(v) => {
                write!(f, "Missing Vertex: {}", v)
            }
            TreeDecompositionValidationError::MissingEdge(id) => {
                write!(f, "Missing Edge: {}", id)
            }
            TreeDecompositionValidationError::NotInducingSubtree(v) => {
                write!(f, "Not Inducing Subtree: {}", v)
            }
        }
    }
}

impl std::error::Error for TreeDecompositionValidationError {}

#[derive(Debug, Clone)]
struct Node {
    bag: Vec<usize>,
    induced_edges: Vec<usize>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Rooted tree decomposition.
///
/// Nodes live in a slab and keep their id for their whole lifetime; ids of removed nodes
/// are never handed out again. Bags and induced hyperedge ids are kept sorted.
#[derive(Debug, Clone, Default)]
pub struct TreeDecomposition {
    nodes: Vec<Option<Node>>,
    root: Option<NodeId>,
    node_count: usize,
    labels: FxHashMap<String, FxHashMap<NodeId, Label>>,
}

impl TreeDecomposition {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self, mut bag: Vec<usize>, mut induced_edges: Vec<usize>) -> NodeId {
        bag.sort_unstable();
        bag.dedup();
        induced_edges.sort_unstable();
        induced_edges.dedup();
        self.nodes.push(Some(Node {
            bag,
            induced_edges,
            parent: None,
            children: Vec::new(),
        }));
        self.node_count += 1;
        self.nodes.len() - 1
    }

    fn node(&self, id: NodeId) -> &Node {
        match self.nodes.get(id) {
            Some(Some(node)) => node,
            _ => panic!("unknown node {}", id),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        match self.nodes.get_mut(id) {
            Some(Some(node)) => node,
            _ => panic!("unknown node {}", id),
        }
    }

    pub fn insert_root(&mut self, bag: Vec<usize>, induced_edges: Vec<usize>) -> NodeId {
        assert!(self.root.is_none());
        let id = self.allocate(bag, induced_edges);
        self.root = Some(id);
        id
    }

    /// Appends a new child below `parent`.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        bag: Vec<usize>,
        induced_edges: Vec<usize>,
    ) -> NodeId {
        assert!(self.is_node(parent));
        let id = self.allocate(bag, induced_edges);
        self.node_mut(id).parent = Some(parent);
        self.node_mut(parent).children.push(id);
        id
    }

    /// Inserts a new node between `node` and its parent. The new node takes the place of
    /// `node` among its parent's children, or becomes the root.
    pub fn add_parent(
        &mut self,
        node: NodeId,
        bag: Vec<usize>,
        induced_edges: Vec<usize>,
    ) -> NodeId {
        assert!(self.is_node(node));
        let id = self.allocate(bag, induced_edges);
        let parent = self.node(node).parent;
        match parent {
            Some(parent) => {
                self.replace_child(parent, node, id);
                self.node_mut(id).parent = Some(parent);
            }
            None => self.root = Some(id),
        }
        self.node_mut(id).children.push(node);
        self.node_mut(node).parent = Some(id);
        id
    }

    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        let children = &mut self.node_mut(parent).children;
        if let Some(slot) = children.iter_mut().find(|c| **c == old) {
            *slot = new;
        }
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.node(node).parent {
            self.node_mut(parent).children.retain(|c| *c != node);
        }
        self.node_mut(node).parent = None;
    }

    /// Moves the subtree rooted at `node` below `new_parent`.
    pub fn set_parent(&mut self, node: NodeId, new_parent: NodeId) {
        assert!(self.is_node(node) && self.is_node(new_parent));
        assert_ne!(Some(node), self.root);
        assert!(
            !self.is_in_subtree(new_parent, node),
            "moving {} below {} would create a cycle",
            node,
            new_parent
        );
        if self.node(node).parent == Some(new_parent) {
            return;
        }
        self.detach(node);
        self.node_mut(node).parent = Some(new_parent);
        self.node_mut(new_parent).children.push(node);
    }

    /// Rotates `node` above its parent: `node` takes its parent's place and the former
    /// parent becomes its last child.
    pub fn swap_with_parent(&mut self, node: NodeId) {
        let parent = match self.node(node).parent {
            Some(parent) => parent,
            None => return,
        };
        let grandparent = self.node(parent).parent;
        self.node_mut(parent).children.retain(|c| *c != node);
        match grandparent {
            Some(grandparent) => {
                self.replace_child(grandparent, parent, node);
            }
            None => self.root = Some(node),
        }
        self.node_mut(node).parent = grandparent;
        self.node_mut(node).children.push(parent);
        self.node_mut(parent).parent = Some(node);
    }

    /// Removes `node` and links its children to its parent at its position. Removing the
    /// root promotes its first child, which adopts the remaining children.
    pub fn remove_node(&mut self, node: NodeId) {
        assert!(self.is_node(node));
        let Node {
            parent, children, ..
        } = self.node(node).clone();
        match parent {
            Some(parent) => {
                let siblings = &mut self.node_mut(parent).children;
                let position = siblings.iter().position(|c| *c == node).unwrap_or(0);
                siblings.splice(position..=position, children.iter().copied());
                for c in children {
                    self.node_mut(c).parent = Some(parent);
                }
            }
            None => {
                self.root = children.first().copied();
                if let Some((first, rest)) = children.split_first() {
                    self.node_mut(*first).parent = None;
                    for c in rest.iter().copied() {
                        self.node_mut(c).parent = Some(*first);
                        self.node_mut(*first).children.push(c);
                    }
                }
            }
        }
        self.nodes[node] = None;
        self.node_count -= 1;
        for labels in self.labels.values_mut() {
            labels.remove(&node);
        }
    }

    #[inline]
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    #[inline]
    pub fn is_node(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id), Some(Some(_)))
    }

    /// Like [`TreeDecomposition::is_node`], but reports unknown ids as an error.
    pub fn check_node(&self, id: NodeId) -> Result<(), DecompositionError> {
        if self.is_node(id) {
            Ok(())
        } else {
            Err(DecompositionError::UnknownNode(id))
        }
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// Ids of all nodes in ascending order.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.is_some())
            .map(|(i, _)| i)
    }

    pub fn bag(&self, id: NodeId) -> &[usize] {
        &self.node(id).bag
    }

    pub fn set_bag(&mut self, id: NodeId, mut bag: Vec<usize>) {
        bag.sort_unstable();
        bag.dedup();
        self.node_mut(id).bag = bag;
    }

    pub fn induced_edges(&self, id: NodeId) -> &[usize] {
        &self.node(id).induced_edges
    }

    pub fn set_induced_edges(&mut self, id: NodeId, mut edges: Vec<usize>) {
        edges.sort_unstable();
        edges.dedup();
        self.node_mut(id).induced_edges = edges;
    }

    /// The induced hyperedges of `from` that fit into `bag`.
    pub fn restricted_induced_edges(
        &self,
        graph: &dyn HyperedgeGraph,
        from: NodeId,
        bag: &[usize],
    ) -> Vec<usize> {
        self.induced_edges(from)
            .iter()
            .copied()
            .filter(|id| {
                graph
                    .hyperedge(*id)
                    .map_or(false, |e| is_sorted_subset(e.elements(), bag))
            })
            .collect()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    /// Parent first, then the children in order.
    pub fn neighbors(&self, id: NodeId) -> Vec<NodeId> {
        let node = self.node(id);
        node.parent
            .iter()
            .chain(node.children.iter())
            .copied()
            .collect()
    }

    pub fn is_leaf(&self, id: NodeId) -> bool {
        self.node(id).children.is_empty()
    }

    pub fn is_join(&self, id: NodeId) -> bool {
        self.node(id).children.len() > 1
    }

    /// Whether `node` lies in the subtree rooted at `ancestor` (a node is in its own subtree).
    pub fn is_in_subtree(&self, node: NodeId, ancestor: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.node(c).parent;
        }
        false
    }

    fn children_union(&self, id: NodeId) -> Vec<usize> {
        self.node(id)
            .children
            .iter()
            .fold(Vec::new(), |acc, c| sorted_union(&acc, &self.node(*c).bag))
    }

    /// Vertices in some child bag but not in the bag of `id`.
    pub fn forgotten_vertices(&self, id: NodeId) -> Vec<usize> {
        sorted_difference(&self.children_union(id), &self.node(id).bag)
    }

    /// Vertices in the bag of `id` that occur in no child bag.
    pub fn introduced_vertices(&self, id: NodeId) -> Vec<usize> {
        sorted_difference(&self.node(id).bag, &self.children_union(id))
    }

    /// Vertices of the bag of `id` that also occur in a child bag.
    pub fn remembered_vertices(&self, id: NodeId) -> Vec<usize> {
        sorted_intersection(&self.node(id).bag, &self.children_union(id))
    }

    pub fn max_bag_size(&self) -> usize {
        self.nodes
            .iter()
            .flatten()
            .map(|n| n.bag.len())
            .max()
            .unwrap_or(0)
    }

    pub fn width(&self) -> usize {
        self.max_bag_size().saturating_sub(1)
    }

    /// Nodes whose bag has the maximum size.
    pub fn largest_bags(&self) -> Vec<NodeId> {
        let max = self.max_bag_size();
        self.nodes().filter(|n| self.bag(*n).len() == max).collect()
    }

    /// Pre-order traversal starting at the root.
    pub fn dfs(&self) -> TreeDecompositionIterator {
        let mut visited = bitvec![0; self.nodes.len()];
        let stack = match self.root {
            Some(root) => {
                visited.set(root, true);
                vec![root]
            }
            None => vec![],
        };
        TreeDecompositionIterator {
            td: self,
            stack,
            visited,
        }
    }

    pub fn set_label(&mut self, name: &str, node: NodeId, label: Label) {
        assert!(self.is_node(node));
        self.labels
            .entry(name.to_string())
            .or_insert_with(FxHashMap::default)
            .insert(node, label);
    }

    pub fn label(&self, name: &str, node: NodeId) -> Option<&Label> {
        self.labels.get(name).and_then(|labels| labels.get(&node))
    }

    /// All labels attached to `node`, keyed by label name.
    pub fn labels_of(&self, node: NodeId) -> FxHashMap<String, Label> {
        self.labels
            .iter()
            .filter_map(|(name, labels)| labels.get(&node).map(|l| (name.clone(), l.clone())))
            .collect()
    }

    pub fn label_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.labels.keys().map(|k| k.as_str())
    }

    pub fn verify(&self, graph: &dyn HyperedgeGraph) -> Result<(), TreeDecompositionValidationError> {
        let root = self
            .root
            .ok_or(TreeDecompositionValidationError::MissingRoot)?;
        if !self.is_node(root) || self.node(root).parent.is_some() {
            return Err(TreeDecompositionValidationError::MissingRoot);
        }

        let mut visited = bitvec![0; self.nodes.len()];
        visited.set(root, true);
        let mut stack = vec![root];
        let mut reached = 1;
        while let Some(n) = stack.pop() {
            for c in self.node(n).children.iter().copied() {
                if !self.is_node(c) || self.node(c).parent != Some(n) || visited[c] {
                    return Err(TreeDecompositionValidationError::HasCycle);
                }
                visited.set(c, true);
                reached += 1;
                stack.push(c);
            }
        }
        if reached != self.node_count {
            return Err(TreeDecompositionValidationError::NotConnected);
        }

        // a vertex induces a subtree iff exactly one of its nodes has a parent without it
        let mut tops: FxHashMap<usize, usize> = FxHashMap::default();
        for id in self.nodes() {
            let node = self.node(id);
            for v in node.bag.iter().copied() {
                let continues_up = node
                    .parent
                    .map_or(false, |p| self.node(p).bag.binary_search(&v).is_ok());
                if !continues_up {
                    *tops.entry(v).or_insert(0) += 1;
                }
            }
        }
        let mut vertices: Vec<usize> = graph.vertices().collect();
        vertices.sort_unstable();
        for v in vertices {
            match tops.get(&v) {
                None => return Err(TreeDecompositionValidationError::MissingVertex(v)),
                Some(1) => {}
                Some(_) => return Err(TreeDecompositionValidationError::NotInducingSubtree(v)),
            }
        }

        for edge in graph.hyperedges() {
            if !self
                .nodes()
                .any(|n| is_sorted_subset(edge.elements(), self.bag(n)))
            {
                return Err(TreeDecompositionValidationError::MissingEdge(edge.id()));
            }
        }
        Ok(())
    }
}

pub struct TreeDecompositionIterator<'a> {
    td: &'a TreeDecomposition,
    stack: Vec<NodeId>,
    visited: BitVec,
}

impl<'a> Iterator for TreeDecompositionIterator<'a> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        for c in self.td.children(current).iter().rev().copied() {
            if !self.visited[c] {
                self.stack.push(c);
                self.visited.set(c, true);
            }
        }
        Some(current)
    }
}
