//! # Bulk closure construction
//!
//! Builds the vertex numbering and both matrices from a complete node/edge
//! snapshot in one pass:
//!
//! 1. every node gets the vertex number of its position in the input,
//! 2. `A[from][to]` is incremented once per edge entry, so parallel edges
//!    accumulate,
//! 3. `R = (I − A)⁻¹ − I`, which equals `Σ_{k ≥ 1} Aᵏ`, the number of walks of
//!    every length. On a DAG `A` is nilpotent, the sum is finite and `I − A`
//!    is unipotent; a cycle is detected before any inversion is attempted.
//!
//! The inversion is `O(n³)` and meant to run once; afterwards the
//! [`maintain`](crate::maintain) module keeps `R` current per edge.

use tracing::debug;

use crate::config::ReachConfig;
use crate::error::{ReachError, Result};
use crate::matrix::{CountMatrix, MatrixError};
use crate::num_traits::PathCount;
use crate::pair::MatrixPair;
use crate::vertex::{NodeKey, VertexIndex, VertexSpace};

pub struct ClosureBuilder;

impl ClosureBuilder {
    /// Numbers `nodes`, accumulates `edges` into `A` and derives `R`.
    pub fn build<K, T, I>(
        nodes: Vec<K>,
        edges: I,
        config: &ReachConfig,
    ) -> Result<(VertexSpace<K>, MatrixPair<T>), K>
    where
        K: NodeKey,
        T: PathCount,
        I: IntoIterator<Item = (K, K)>,
    {
        let n = nodes.len();
        let mut vertices = VertexSpace::new(config.reuse_retired_slots);
        for node in nodes {
            vertices.assign(node)?;
        }

        let mut adjacency = CountMatrix::zeros(n);
        let mut edge_count = 0usize;
        for (from, to) in edges {
            let i = vertices.require(&from)?;
            let j = vertices.require(&to)?;
            adjacency
                .checked_add_at(i.0, j.0, T::ONE)
                .map_err(|_| ReachError::PathCountOverflow)?;
            edge_count += 1;
        }

        let unordered = |indices: Vec<usize>| ReachError::NonAcyclicGraph {
            cycle: indices
                .into_iter()
                .filter_map(|i| vertices.resolve(VertexIndex(i)).cloned())
                .collect(),
        };
        let reachability = Self::reachability(&adjacency).map_err(|e| match e {
            MatrixError::NotUnipotent { remaining, .. } => {
                unordered(remaining.into_iter().map(|(i, _)| i).collect())
            }
            // A self loop leaves a non-unit entry on the diagonal of I − A.
            MatrixError::NonUnitDiagonal { index } => unordered(vec![index]),
            MatrixError::Overflow { .. } | MatrixError::DimensionMismatch { .. } => {
                ReachError::PathCountOverflow
            }
        })?;

        debug!(nodes = n, edges = edge_count, "built reachability closure");
        Ok((
            vertices,
            MatrixPair {
                adjacency,
                reachability,
            },
        ))
    }

    /// `R = (I − A)⁻¹ − I`.
    pub fn reachability<T: PathCount>(
        adjacency: &CountMatrix<T>,
    ) -> std::result::Result<CountMatrix<T>, MatrixError> {
        let identity = CountMatrix::identity(adjacency.dim());
        identity
            .checked_sub(adjacency)?
            .invert_unipotent()?
            .checked_sub(&identity)
    }
}
