//! # The reachability index
//!
//! [`GraphStore`] owns one vertex space and one matrix pair behind a single
//! reader/writer lock. Queries share the lock, mutations hold it exclusively
//! for their whole duration, so every call observes the latest committed
//! mutation and no mutation is ever seen half applied. No lock guard or matrix
//! reference leaves a method; callers only get owned keys, counts and
//! snapshots.
//!
//! Mutations check every precondition before touching anything:
//!
//! | operation     | rejected with                                             |
//! |---------------|-----------------------------------------------------------|
//! | `add_node`    | `DuplicateNode`                                           |
//! | `remove_node` | `NodeNotFound`, `NotALeaf`                                |
//! | `add_edge`    | `NodeNotFound`, `EdgeAlreadyExists`, `Cycle`              |
//! | `remove_edge` | `NodeNotFound`, `EdgeNotFound`, `WouldDisconnect`         |

use std::fmt;
use std::hash::{Hash, Hasher};

use ahash::AHashSet;
use parking_lot::RwLock;
use tracing::debug;

use crate::builder::GraphBuilder;
use crate::closure::ClosureBuilder;
use crate::config::{EdgeRemovalPolicy, ReachConfig};
use crate::error::{ReachError, Result};
use crate::maintain::MaintainError;
use crate::matrix::CountMatrix;
use crate::num_traits::PathCount;
use crate::pair::MatrixPair;
use crate::vertex::{NodeKey, VertexIndex, VertexSpace};

#[cfg(test)]
mod proptests;

#[derive(Clone, Debug)]
struct GraphInner<K, T> {
    vertices: VertexSpace<K>,
    matrices: MatrixPair<T>,
}

pub struct GraphStore<K, T = i64> {
    inner: RwLock<GraphInner<K, T>>,
    config: ReachConfig,
}

impl<K: NodeKey, T: PathCount> GraphInner<K, T> {
    fn require(&self, key: &K) -> Result<VertexIndex, K> {
        self.vertices.require(key)
    }

    fn keys(&self, vertices: impl Iterator<Item = VertexIndex>) -> Vec<K> {
        vertices
            .filter_map(|v| self.vertices.resolve(v).cloned())
            .collect()
    }

    /// Live `(from, to, multiplicity)` triples in row-major vertex order.
    fn live_edges(&self) -> impl Iterator<Item = (&K, &K, T)> + '_ {
        let adjacency = self.matrices.adjacency();
        adjacency.support().filter_map(move |(i, j)| {
            let from = self.vertices.resolve(VertexIndex(i))?;
            let to = self.vertices.resolve(VertexIndex(j))?;
            Some((from, to, adjacency.get(i, j)))
        })
    }

    fn add_node(&mut self, key: K) -> Result<VertexIndex, K> {
        let v = self.vertices.assign(key)?;
        self.matrices.ensure_vertex(v);
        Ok(v)
    }

    fn remove_node(&mut self, key: &K) -> Result<VertexIndex, K> {
        let v = self.require(key)?;
        let dependents = self.matrices.out_degree(v);
        if dependents > 0 {
            return Err(ReachError::NotALeaf {
                node: key.clone(),
                dependents,
            });
        }
        self.matrices.clear_vertex(v);
        self.vertices.retire(key);
        Ok(v)
    }

    fn add_edge(&mut self, from: &K, to: &K) -> Result<(), K> {
        let u = self.require(from)?;
        let v = self.require(to)?;
        if self.matrices.edges(u, v).is_positive() {
            return Err(ReachError::EdgeAlreadyExists {
                from: from.clone(),
                to: to.clone(),
            });
        }
        if u == v || self.matrices.paths(v, u).is_positive() {
            return Err(ReachError::Cycle {
                from: from.clone(),
                to: to.clone(),
            });
        }
        self.matrices
            .insert_edge(u, v)
            .map_err(|_| ReachError::PathCountOverflow)
    }

    fn remove_edge(&mut self, from: &K, to: &K, policy: EdgeRemovalPolicy) -> Result<(), K> {
        let u = self.require(from)?;
        let v = self.require(to)?;
        let disconnect = || ReachError::WouldDisconnect {
            from: from.clone(),
            to: to.clone(),
        };
        if !self.matrices.edges(u, v).is_positive() {
            return Err(ReachError::EdgeNotFound {
                from: from.clone(),
                to: to.clone(),
            });
        }
        if policy == EdgeRemovalPolicy::RequireAlternatePath
            && !self
                .matrices
                .paths_without_edge(u, v)
                .is_some_and(|p| p.is_positive())
        {
            return Err(disconnect());
        }
        self.matrices.delete_edge(u, v).map_err(|e| match e {
            MaintainError::Negative { .. } => disconnect(),
            MaintainError::Overflow { .. } => ReachError::PathCountOverflow,
        })
    }
}

impl<K: NodeKey, T: PathCount> GraphStore<K, T> {
    /// An empty index with the default configuration.
    pub fn new() -> Self {
        Self::with_config(ReachConfig::default())
    }

    pub fn with_config(config: ReachConfig) -> Self {
        Self::from_parts(
            VertexSpace::new(config.reuse_retired_slots),
            MatrixPair::empty(0),
            config,
        )
    }

    pub(crate) fn from_parts(
        vertices: VertexSpace<K>,
        matrices: MatrixPair<T>,
        config: ReachConfig,
    ) -> Self {
        GraphStore {
            inner: RwLock::new(GraphInner { vertices, matrices }),
            config,
        }
    }

    pub fn config(&self) -> ReachConfig {
        self.config
    }

    /// Re-stages the live nodes (in vertex order) and edges (with their
    /// multiplicity) under the same configuration.
    pub fn to_builder(&self) -> GraphBuilder<K> {
        let inner = self.inner.read();
        let mut builder = GraphBuilder::new().with_config(self.config);
        builder.add_nodes(inner.vertices.iter_live().map(|(_, k)| k.clone()));
        for (from, to, count) in inner.live_edges() {
            for _ in 0..count.as_usize() {
                builder.add_edge(from.clone(), to.clone());
            }
        }
        builder
    }

    /* ——————————————————————————— queries ——————————————————————————— */

    pub fn get_node(&self, key: &K) -> Option<K> {
        let inner = self.inner.read();
        inner.vertices.lookup(key).and_then(|v| inner.vertices.resolve(v).cloned())
    }

    pub fn contains_node(&self, key: &K) -> bool {
        self.inner.read().vertices.lookup(key).is_some()
    }

    pub fn node_count(&self) -> usize {
        self.inner.read().vertices.len()
    }

    /// Number of distinct live `(from, to)` pairs joined by at least one edge.
    pub fn edge_count(&self) -> usize {
        self.inner.read().live_edges().count()
    }

    /// All live nodes in vertex-number order.
    pub fn get_nodes(&self) -> Vec<K> {
        let inner = self.inner.read();
        inner.vertices.iter_live().map(|(_, k)| k.clone()).collect()
    }

    /// Every live `(from, to)` pair with at least one direct edge, once.
    pub fn get_edges(&self) -> Vec<(K, K)> {
        let inner = self.inner.read();
        inner
            .live_edges()
            .map(|(from, to, _)| (from.clone(), to.clone()))
            .collect()
    }

    /// Every node with a path into `key`, in vertex-number order.
    pub fn get_ancestors(&self, key: &K) -> Result<Vec<K>, K> {
        let inner = self.inner.read();
        let v = inner.require(key)?;
        Ok(inner.keys(inner.matrices.ancestors(v)))
    }

    /// Every node reachable from `key`, in vertex-number order.
    pub fn get_descendants(&self, key: &K) -> Result<Vec<K>, K> {
        let inner = self.inner.read();
        let v = inner.require(key)?;
        Ok(inner.keys(inner.matrices.descendants(v)))
    }

    /// Whether a path of length at least one leads from `from` to `to`.
    pub fn does_path_exist(&self, from: &K, to: &K) -> Result<bool, K> {
        self.path_count(from, to).map(|p| p.is_positive())
    }

    /// Number of distinct directed paths from `from` to `to`.
    pub fn path_count(&self, from: &K, to: &K) -> Result<T, K> {
        let inner = self.inner.read();
        let u = inner.require(from)?;
        let v = inner.require(to)?;
        Ok(inner.matrices.paths(u, v))
    }

    /// Number of parallel direct edges from `from` to `to`.
    pub fn edge_multiplicity(&self, from: &K, to: &K) -> Result<T, K> {
        let inner = self.inner.read();
        let u = inner.require(from)?;
        let v = inner.require(to)?;
        Ok(inner.matrices.edges(u, v))
    }

    /// Snapshot of `A`, indexed by vertex number; retired rows and columns are
    /// zero.
    pub fn adjacency(&self) -> CountMatrix<T> {
        self.inner.read().matrices.adjacency().clone()
    }

    /// Snapshot of `R`, indexed by vertex number.
    pub fn reachability(&self) -> CountMatrix<T> {
        self.inner.read().matrices.reachability().clone()
    }

    /// Vertex number currently assigned to `key`.
    pub fn vertex_of(&self, key: &K) -> Option<VertexIndex> {
        self.inner.read().vertices.lookup(key)
    }

    /// Recomputes the closure from the current `A` and compares it with the
    /// incrementally maintained `R`.
    pub fn is_consistent(&self) -> bool {
        let inner = self.inner.read();
        ClosureBuilder::reachability(inner.matrices.adjacency())
            .is_ok_and(|r| &r == inner.matrices.reachability())
    }

    /* ——————————————————————————— mutations ——————————————————————————— */

    /// Inserts an isolated node, reusing a retired vertex number when the
    /// configuration allows it.
    pub fn add_node(&self, key: K) -> Result<(), K> {
        let mut inner = self.inner.write();
        match inner.add_node(key) {
            Ok(v) => {
                debug!(vertex = %v, dim = inner.matrices.dim(), "added node");
                Ok(())
            }
            Err(e) => {
                debug!(error = %e, "rejected node insertion");
                Err(e)
            }
        }
    }

    /// Removes a node that has no outgoing edges. Its incoming edges and every
    /// path ending in it disappear with it; its vertex number is retired.
    pub fn remove_node(&self, key: &K) -> Result<(), K> {
        let mut inner = self.inner.write();
        match inner.remove_node(key) {
            Ok(v) => {
                debug!(node = %key, vertex = %v, "removed node");
                Ok(())
            }
            Err(e) => {
                debug!(node = %key, error = %e, "rejected node removal");
                Err(e)
            }
        }
    }

    pub fn add_edge(&self, from: &K, to: &K) -> Result<(), K> {
        let mut inner = self.inner.write();
        let result = inner.add_edge(from, to);
        match &result {
            Ok(()) => debug!(%from, %to, "added edge"),
            Err(e) => debug!(%from, %to, error = %e, "rejected edge insertion"),
        }
        result
    }

    /// Removes one `from -> to` edge. With parallel edges the remaining ones
    /// stay.
    pub fn remove_edge(&self, from: &K, to: &K) -> Result<(), K> {
        let mut inner = self.inner.write();
        let result = inner.remove_edge(from, to, self.config.edge_removal);
        match &result {
            Ok(()) => debug!(%from, %to, "removed edge"),
            Err(e) => debug!(%from, %to, error = %e, "rejected edge removal"),
        }
        result
    }

    /// Live node set and live edge set, the parts of a graph that equality
    /// looks at.
    fn shape(&self) -> (AHashSet<K>, AHashSet<(K, K)>) {
        let inner = self.inner.read();
        let nodes = inner.vertices.iter_live().map(|(_, k)| k.clone()).collect();
        let edges = inner
            .live_edges()
            .map(|(from, to, _)| (from.clone(), to.clone()))
            .collect();
        (nodes, edges)
    }
}

impl<K: NodeKey> GraphStore<K> {
    /// Starts staging a graph with the default `i64` counters; pick another
    /// counter type through [`GraphBuilder::build`].
    pub fn builder() -> GraphBuilder<K> {
        GraphBuilder::new()
    }
}

impl<K: NodeKey, T: PathCount> Default for GraphStore<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: NodeKey, T: PathCount> Clone for GraphStore<K, T> {
    fn clone(&self) -> Self {
        GraphStore {
            inner: RwLock::new(self.inner.read().clone()),
            config: self.config,
        }
    }
}

impl<K: NodeKey, T: PathCount> fmt::Debug for GraphStore<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphStore")
            .field("nodes", &self.get_nodes())
            .field("edges", &self.get_edges())
            .finish()
    }
}

/// Two graphs are equal when they have the same live nodes and the same live
/// edges; vertex numbering, retired slots and edge multiplicities are not
/// compared.
impl<K: NodeKey, T: PathCount> PartialEq for GraphStore<K, T> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || self.shape() == other.shape()
    }
}

impl<K: NodeKey, T: PathCount> Eq for GraphStore<K, T> {}

impl<K: NodeKey + Ord, T: PathCount> Hash for GraphStore<K, T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut nodes = self.get_nodes();
        let mut edges = self.get_edges();
        nodes.sort();
        edges.sort();
        nodes.hash(state);
        edges.hash(state);
    }
}
