use indexmap::IndexMap;

use crate::closure::ClosureBuilder;
use crate::config::ReachConfig;
use crate::error::Result;
use crate::num_traits::PathCount;
use crate::store::GraphStore;
use crate::vertex::NodeKey;

/// Staging area for a [`GraphStore`]: an ordered node list and an edge
/// multimap, consumed once by [`build`](Self::build).
///
/// Nothing is validated while staging; duplicate nodes, unknown edge
/// endpoints and cycles are all reported by `build`.
#[derive(Clone, Debug)]
pub struct GraphBuilder<K> {
    nodes: Vec<K>,
    edges: IndexMap<K, Vec<K>>,
    config: ReachConfig,
}

impl<K: NodeKey> GraphBuilder<K> {
    pub fn new() -> Self {
        GraphBuilder {
            nodes: Vec::new(),
            edges: IndexMap::new(),
            config: ReachConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ReachConfig) -> Self {
        self.config = config;
        self
    }

    pub fn add_node(&mut self, node: K) -> &mut Self {
        self.nodes.push(node);
        self
    }

    pub fn add_nodes(&mut self, nodes: impl IntoIterator<Item = K>) -> &mut Self {
        self.nodes.extend(nodes);
        self
    }

    /// Stages an edge. Repeating a pair stages a parallel edge.
    pub fn add_edge(&mut self, from: K, to: K) -> &mut Self {
        self.edges.entry(from).or_default().push(to);
        self
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.values().map(Vec::len).sum()
    }

    /// Runs the closure construction over everything staged.
    pub fn build<T: PathCount>(self) -> Result<GraphStore<K, T>, K> {
        let GraphBuilder {
            nodes,
            edges,
            config,
        } = self;
        let edges = edges
            .into_iter()
            .flat_map(|(from, tos)| tos.into_iter().map(move |to| (from.clone(), to)));
        let (vertices, matrices) = ClosureBuilder::build(nodes, edges, &config)?;
        Ok(GraphStore::from_parts(vertices, matrices, config))
    }
}

impl<K: NodeKey> Default for GraphBuilder<K> {
    fn default() -> Self {
        Self::new()
    }
}
