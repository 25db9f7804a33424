use crate::tree_decomposition::NodeId;
use std::fmt;
use std::fmt::{Display, Formatter};

/// Precondition violations reported by the decomposition engine and the manipulation
/// operations. None of these leave a tree decomposition partially rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecompositionError {
    InvalidOrdering { expected: usize, found: usize },
    UnknownVertex(usize),
    UnknownNode(NodeId),
    NotSingleChild { node: NodeId, children: usize },
}

impl Display for DecompositionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            DecompositionError::InvalidOrdering { expected, found } => write!(
                f,
                "Invalid Ordering: expected a permutation of {} vertices, found {} entries",
                expected, found
            ),
            DecompositionError::UnknownVertex(v) => write!(f, "Unknown Vertex: {}", v),
            DecompositionError::UnknownNode(n) => write!(f, "Unknown Node: {}", n),
            DecompositionError::NotSingleChild { node, children } => write!(
                f,
                "Node {} must have exactly one child, but has {}",
                node, children
            ),
        }
    }
}

impl std::error::Error for DecompositionError {}
