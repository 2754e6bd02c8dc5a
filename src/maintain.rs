//! # Incremental maintenance
//!
//! Keeps `R` exact after a single edge insertion or deletion without
//! inverting anything.
//!
//! Write `M = I + R = (I − A)⁻¹`. Inserting edge `u -> v` changes `A` by the
//! rank-one matrix `e_u e_vᵀ`, and Sherman–Morrison gives
//!
//! `M' = M + (M e_u)(e_vᵀ M) / (1 − M[v][u])`
//!
//! On a DAG `v` does not reach `u`, so `M[v][u] = 0` and the denominator is one.
//! With `c = M[*][u]` (every ancestor of `u`, plus `u` itself) and
//! `r = M[v][*]` (every descendant of `v`, plus `v` itself):
//!
//! `R'[a][b] = R[a][b] + c[a] · r[b]`
//!
//! which in one step pushes `v`'s row into every ancestor row of `u`, pulls
//! `u`'s column into every descendant column of `v`, adds the cross terms for
//! ancestor/descendant pairs and bumps `R[u][v]` for the edge itself.
//! Column `u` and row `v` are unchanged by the update, so deletion subtracts
//! the very same term computed from the current `R` and undoes an insertion
//! exactly.
//!
//! Both directions validate every touched entry before writing any of them.

use thiserror::Error;
use tracing::trace;

use crate::num_traits::PathCount;
use crate::pair::MatrixPair;
use crate::vertex::VertexIndex;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaintainError {
    #[error("Path count overflow at ({row}, {col})")]
    Overflow { row: VertexIndex, col: VertexIndex },
    #[error("Path count at ({row}, {col}) would become negative")]
    Negative { row: VertexIndex, col: VertexIndex },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Update {
    Insert,
    Delete,
}

/// The rank-one correction for edge `from -> to`, as the non-zero parts of
/// its two factors.
struct RankOne<T> {
    column: Vec<(VertexIndex, T)>,
    row: Vec<(VertexIndex, T)>,
}

impl<T: PathCount> MatrixPair<T> {
    /// `c = R[*][from] + e_from`, `r = R[to][*] + e_to`, restricted to their
    /// non-zero entries.
    fn rank_one(&self, from: VertexIndex, to: VertexIndex) -> RankOne<T> {
        let column = self
            .reachability
            .column(from.0)
            .enumerate()
            .map(|(a, p)| (VertexIndex(a), if a == from.0 { T::ONE } else { p }))
            .filter(|(_, c)| !c.is_zero())
            .collect();
        let row = self
            .reachability
            .row(to.0)
            .iter()
            .enumerate()
            .map(|(b, p)| (VertexIndex(b), if b == to.0 { T::ONE } else { *p }))
            .filter(|(_, r)| !r.is_zero())
            .collect();
        RankOne { column, row }
    }

    fn apply(
        &mut self,
        from: VertexIndex,
        to: VertexIndex,
        update: Update,
    ) -> Result<(), MaintainError> {
        let RankOne { column, row } = self.rank_one(from, to);
        trace!(
            ?update,
            %from,
            %to,
            ancestors = column.len(),
            descendants = row.len(),
            "rank-one path update"
        );

        let step = |current: T, c: T, r: T, a: VertexIndex, b: VertexIndex| -> Result<T, MaintainError> {
            let overflow = MaintainError::Overflow { row: a, col: b };
            let term = c.checked_mul(r).ok_or(overflow.clone())?;
            let next = match update {
                Update::Insert => current.checked_add(term),
                Update::Delete => current.checked_sub(term),
            }
            .ok_or(overflow)?;
            if next.is_negative() {
                return Err(MaintainError::Negative { row: a, col: b });
            }
            Ok(next)
        };

        let edges = self.edges(from, to);
        let edges = match update {
            Update::Insert => edges.checked_add(T::ONE),
            Update::Delete => edges.checked_sub(T::ONE),
        }
        .ok_or(MaintainError::Overflow { row: from, col: to })?;
        if edges.is_negative() {
            return Err(MaintainError::Negative { row: from, col: to });
        }

        for &(a, c) in &column {
            for &(b, r) in &row {
                step(self.paths(a, b), c, r, a, b)?;
            }
        }

        for &(a, c) in &column {
            for &(b, r) in &row {
                let next = step(self.paths(a, b), c, r, a, b)?;
                self.reachability.set(a.0, b.0, next);
            }
        }
        self.adjacency.set(from.0, to.0, edges);
        Ok(())
    }

    /// Records one more edge `from -> to` and every path it opens.
    ///
    /// The caller guarantees the edge keeps the graph acyclic, i.e.
    /// `from != to` and `R[to][from] == 0`.
    pub fn insert_edge(
        &mut self,
        from: VertexIndex,
        to: VertexIndex,
    ) -> Result<(), MaintainError> {
        debug_assert!(from != to && self.paths(to, from).is_zero());
        self.apply(from, to, Update::Insert)
    }

    /// Drops one edge `from -> to` and every path that went through it.
    pub fn delete_edge(
        &mut self,
        from: VertexIndex,
        to: VertexIndex,
    ) -> Result<(), MaintainError> {
        self.apply(from, to, Update::Delete)
    }

    /// `R[from][to]` after deleting one `from -> to` edge, without applying it.
    pub fn paths_without_edge(&self, from: VertexIndex, to: VertexIndex) -> Option<T> {
        // c[from] = r[to] = 1, so the correction at (from, to) is exactly one.
        self.paths(from, to).checked_sub(T::ONE)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::closure::ClosureBuilder;
    use crate::config::ReachConfig;

    fn v(i: usize) -> VertexIndex {
        VertexIndex(i)
    }

    fn build(n: usize, edges: &[(usize, usize)]) -> MatrixPair<i64> {
        let (_, pair) = ClosureBuilder::build(
            (0..n).collect(),
            edges.iter().copied(),
            &ReachConfig::default(),
        )
        .unwrap();
        pair
    }

    #[test]
    fn insertion_matches_rebuild() {
        // A=0 B=1 C=2 D=3 E=4, then close the gap B -> D.
        let base = [(0, 1), (1, 2), (0, 3), (2, 4), (3, 4)];
        let mut pair = build(5, &base);
        pair.insert_edge(v(1), v(3)).unwrap();

        let rebuilt = build(5, &[(0, 1), (1, 2), (0, 3), (2, 4), (3, 4), (1, 3)]);
        similar_asserts::assert_eq!(pair, rebuilt);

        // A now reaches E three ways: A-B-C-E, A-D-E, A-B-D-E.
        assert_eq!(pair.paths(v(0), v(4)), 3);
        assert_eq!(pair.paths(v(1), v(4)), 2);
    }

    #[test]
    fn parallel_edge_doubles_paths_through_it() {
        let mut pair = build(3, &[(0, 1), (1, 2)]);
        pair.insert_edge(v(0), v(1)).unwrap();

        assert_eq!(pair.edges(v(0), v(1)), 2);
        assert_eq!(pair.paths(v(0), v(2)), 2);
        assert_eq!(pair, build(3, &[(0, 1), (0, 1), (1, 2)]));
    }

    #[test]
    fn deletion_undoes_insertion() {
        let base = build(6, &[(0, 1), (1, 2), (0, 3), (3, 2), (2, 4), (5, 0)]);
        let mut pair = base.clone();

        pair.insert_edge(v(3), v(4)).unwrap();
        assert_ne!(pair, base);
        pair.delete_edge(v(3), v(4)).unwrap();
        similar_asserts::assert_eq!(pair, base);

        pair.delete_edge(v(1), v(2)).unwrap();
        assert_eq!(pair, build(6, &[(0, 1), (0, 3), (3, 2), (2, 4), (5, 0)]));
        assert_eq!(pair.paths_without_edge(v(0), v(3)), Some(0));
    }

    #[test]
    fn deleting_a_missing_edge_is_rejected_untouched() {
        let base = build(3, &[(0, 1), (1, 2)]);
        let mut pair = base.clone();

        // 0 -> 2 exists only as a path, not as an edge.
        assert_eq!(
            pair.delete_edge(v(0), v(2)),
            Err(MaintainError::Negative { row: v(0), col: v(2) })
        );
        assert_eq!(pair, base);
    }

    #[test]
    fn overflow_leaves_matrices_untouched() {
        let mut pair = MatrixPair::<i32>::empty(3);
        pair.insert_edge(v(0), v(1)).unwrap();
        pair.reachability.set(1, 2, i32::MAX);
        let before = pair.clone();

        assert!(matches!(
            pair.insert_edge(v(1), v(2)),
            Err(MaintainError::Overflow { .. })
        ));
        assert_eq!(pair, before);
    }
}
