use crate::matrix::CountMatrix;
use crate::num_traits::PathCount;
use crate::vertex::VertexIndex;

/// The adjacency matrix `A` and reachability matrix `R`, always the same
/// dimension.
///
/// `A[i][j]` counts direct edges `i -> j`; `R[i][j]` counts distinct directed
/// paths `i -> j` of length at least one, so `R[i][j] >= 1` exactly when `j`
/// is reachable from `i`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatrixPair<T> {
    pub(crate) adjacency: CountMatrix<T>,
    pub(crate) reachability: CountMatrix<T>,
}

impl<T: PathCount> MatrixPair<T> {
    pub fn empty(dim: usize) -> Self {
        MatrixPair {
            adjacency: CountMatrix::zeros(dim),
            reachability: CountMatrix::zeros(dim),
        }
    }

    pub fn dim(&self) -> usize {
        self.adjacency.dim()
    }

    pub fn adjacency(&self) -> &CountMatrix<T> {
        &self.adjacency
    }

    pub fn reachability(&self) -> &CountMatrix<T> {
        &self.reachability
    }

    #[inline]
    pub fn edges(&self, from: VertexIndex, to: VertexIndex) -> T {
        self.adjacency.get(from.0, to.0)
    }

    #[inline]
    pub fn paths(&self, from: VertexIndex, to: VertexIndex) -> T {
        self.reachability.get(from.0, to.0)
    }

    /// Makes room for vertex `v` as an isolated vertex.
    pub fn ensure_vertex(&mut self, v: VertexIndex) {
        if v.0 >= self.dim() {
            self.adjacency.grow(v.0 + 1);
            self.reachability.grow(v.0 + 1);
        }
    }

    /// Zeroes row and column `v` in both matrices.
    pub fn clear_vertex(&mut self, v: VertexIndex) {
        self.adjacency.clear_row(v.0);
        self.adjacency.clear_column(v.0);
        self.reachability.clear_row(v.0);
        self.reachability.clear_column(v.0);
    }

    /// Vertices with at least one path into `v`, in vertex-number order.
    pub fn ancestors(&self, v: VertexIndex) -> impl Iterator<Item = VertexIndex> + '_ {
        self.reachability
            .column(v.0)
            .enumerate()
            .filter(|(_, p)| p.is_positive())
            .map(|(i, _)| VertexIndex(i))
    }

    /// Vertices reachable from `v`, in vertex-number order.
    pub fn descendants(&self, v: VertexIndex) -> impl Iterator<Item = VertexIndex> + '_ {
        self.reachability
            .row(v.0)
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_positive())
            .map(|(i, _)| VertexIndex(i))
    }

    /// Number of distinct targets `v` has a direct edge to.
    pub fn out_degree(&self, v: VertexIndex) -> usize {
        self.adjacency
            .row(v.0)
            .iter()
            .filter(|e| e.is_positive())
            .count()
    }
}
