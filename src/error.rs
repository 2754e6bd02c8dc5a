use std::fmt::{Debug, Display};

use thiserror::Error;

/// Everything a query or mutation can reject.
///
/// All variants are caller errors: they are reported synchronously and the
/// index is left exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReachError<K: Debug + Display> {
    /// The key has no live vertex, either because it was never added or
    /// because its node has been removed.
    #[error("Node was not found with the given id: {0}")]
    NodeNotFound(K),

    #[error("Node already exists with the given id: {0}")]
    DuplicateNode(K),

    #[error("Edge {from} -> {to} already exists")]
    EdgeAlreadyExists { from: K, to: K },

    #[error("Edge {from} -> {to} does not exist")]
    EdgeNotFound { from: K, to: K },

    /// `to` already reaches `from` (or they are the same node).
    #[error("Adding edge {from} -> {to} would create a cycle")]
    Cycle { from: K, to: K },

    /// Bulk construction was handed edges containing a cycle. `cycle` lists
    /// the nodes that could not be ordered: the cycles themselves and
    /// everything downstream of them.
    #[error("Graph is not acyclic, unordered nodes: {cycle:?}")]
    NonAcyclicGraph { cycle: Vec<K> },

    #[error("Removing edge {from} -> {to} would disconnect paths that depend on it")]
    WouldDisconnect { from: K, to: K },

    #[error("Node {node} still has {dependents} outgoing edge(s) and cannot be removed")]
    NotALeaf { node: K, dependents: usize },

    #[error("Path count does not fit the counter type")]
    PathCountOverflow,
}

impl<K: Debug + Display> ReachError<K> {
    /// The missing key, for [`ReachError::NodeNotFound`].
    pub fn node_id(&self) -> Option<&K> {
        match self {
            ReachError::NodeNotFound(k) => Some(k),
            _ => None,
        }
    }
}

pub type Result<T, K> = std::result::Result<T, ReachError<K>>;
