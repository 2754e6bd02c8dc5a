//! # Exact count matrices
//!
//! A small dense, row-major, square matrix over a [`PathCount`] entry type.
//! It offers exactly what the reachability index needs from a linear-algebra
//! layer: element access, whole row/column access, checked subtraction and
//! multiplication, and exact inversion of unipotent matrices (`I − N` with
//! `N` nilpotent), which is the only kind of inverse the closure requires.
//!
//! Entries are exact integers. Reachability is decided by `R[i][j] >= 1` and
//! incremental removal subtracts counts, so no rounding is tolerable.

use std::collections::VecDeque;
use std::fmt::{self, Display};

use itertools::Itertools;
use thiserror::Error;

use crate::num_traits::PathCount;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MatrixError {
    #[error("Dimension mismatch: {left}x{left} against {right}x{right}")]
    DimensionMismatch { left: usize, right: usize },
    #[error("Entry arithmetic overflowed at ({row}, {col})")]
    Overflow { row: usize, col: usize },
    #[error("Diagonal entry ({index}, {index}) is not one")]
    NonUnitDiagonal { index: usize },
    /// The off-diagonal support has a cycle, so the matrix is not of the form
    /// `I − N` with `N` nilpotent.
    #[error("Not unipotent: {processed} of {total} indices ordered. Remaining indices with non-zero in-degrees: {remaining:?}")]
    NotUnipotent {
        processed: usize,
        total: usize,
        remaining: Vec<(usize, usize)>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CountMatrix<T> {
    dim: usize,
    entries: Vec<T>,
}

impl<T: PathCount> CountMatrix<T> {
    pub fn zeros(dim: usize) -> Self {
        CountMatrix {
            dim,
            entries: vec![T::ZERO; dim * dim],
        }
    }

    pub fn identity(dim: usize) -> Self {
        let mut m = Self::zeros(dim);
        for i in 0..dim {
            m.set(i, i, T::ONE);
        }
        m
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> T {
        self.entries[row * self.dim + col]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: T) {
        self.entries[row * self.dim + col] = value;
    }

    pub fn row(&self, row: usize) -> &[T] {
        &self.entries[row * self.dim..(row + 1) * self.dim]
    }

    pub fn column(&self, col: usize) -> impl Iterator<Item = T> + '_ {
        (0..self.dim).map(move |row| self.get(row, col))
    }

    /// Adds `delta` to a single entry.
    pub fn checked_add_at(
        &mut self,
        row: usize,
        col: usize,
        delta: T,
    ) -> Result<(), MatrixError> {
        let value = self
            .get(row, col)
            .checked_add(delta)
            .ok_or(MatrixError::Overflow { row, col })?;
        self.set(row, col, value);
        Ok(())
    }

    pub fn clear_row(&mut self, row: usize) {
        self.entries[row * self.dim..(row + 1) * self.dim].fill(T::ZERO);
    }

    pub fn clear_column(&mut self, col: usize) {
        for row in 0..self.dim {
            self.set(row, col, T::ZERO);
        }
    }

    /// Extends the matrix to `dim`×`dim`; existing entries keep their
    /// coordinates and the new rows/columns are zero.
    pub fn grow(&mut self, dim: usize) {
        if dim <= self.dim {
            return;
        }
        let mut entries = vec![T::ZERO; dim * dim];
        for row in 0..self.dim {
            entries[row * dim..row * dim + self.dim].copy_from_slice(self.row(row));
        }
        self.dim = dim;
        self.entries = entries;
    }

    /// Coordinates of every non-zero entry, row-major.
    pub fn support(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.entries
            .iter()
            .positions(|e| !e.is_zero())
            .map(|p| (p / self.dim, p % self.dim))
    }

    fn check_dim(&self, other: &Self) -> Result<(), MatrixError> {
        if self.dim != other.dim {
            return Err(MatrixError::DimensionMismatch {
                left: self.dim,
                right: other.dim,
            });
        }
        Ok(())
    }

    pub fn checked_sub(&self, other: &Self) -> Result<Self, MatrixError> {
        self.check_dim(other)?;
        let entries = self
            .entries
            .iter()
            .zip(&other.entries)
            .enumerate()
            .map(|(p, (a, b))| {
                a.checked_sub(*b).ok_or(MatrixError::Overflow {
                    row: p / self.dim,
                    col: p % self.dim,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CountMatrix {
            dim: self.dim,
            entries,
        })
    }

    pub fn checked_mul(&self, other: &Self) -> Result<Self, MatrixError> {
        self.check_dim(other)?;
        let n = self.dim;
        let mut out = Self::zeros(n);
        for i in 0..n {
            for k in 0..n {
                let a = self.get(i, k);
                if a.is_zero() {
                    continue;
                }
                for j in 0..n {
                    let b = other.get(k, j);
                    if b.is_zero() {
                        continue;
                    }
                    let term = a
                        .checked_mul(b)
                        .ok_or(MatrixError::Overflow { row: i, col: j })?;
                    out.checked_add_at(i, j, term)?;
                }
            }
        }
        Ok(out)
    }

    /// Kahn ordering of the off-diagonal support: index `i` precedes `j`
    /// whenever entry `(i, j)` is non-zero.
    pub fn support_order(&self) -> Result<Vec<usize>, MatrixError> {
        let n = self.dim;
        let mut indeg = vec![0usize; n];
        for (i, j) in self.support() {
            if i != j {
                indeg[j] += 1;
            }
        }

        let mut q: VecDeque<usize> = indeg.iter().positions(|d| *d == 0).collect();

        let mut order = Vec::with_capacity(n);
        while let Some(v) = q.pop_front() {
            order.push(v);
            for (u, e) in self.row(v).iter().enumerate() {
                if u == v || e.is_zero() {
                    continue;
                }
                indeg[u] -= 1;
                if indeg[u] == 0 {
                    q.push_back(u);
                }
            }
        }

        if order.len() != n {
            let remaining = indeg
                .iter()
                .enumerate()
                .filter(|(_, d)| **d > 0)
                .map(|(i, d)| (i, *d))
                .collect();
            return Err(MatrixError::NotUnipotent {
                processed: order.len(),
                total: n,
                remaining,
            });
        }
        Ok(order)
    }

    /// Exact inverse of a unipotent matrix `M = I − N`, `N` nilpotent.
    ///
    /// After permuting by [`support_order`](Self::support_order), `M` is upper
    /// unitriangular, so the inverse is obtained by back substitution, row by
    /// row in reverse order:
    ///
    /// `X[i][*] = e_i − Σ_{j ≠ i} M[i][j] · X[j][*]`
    ///
    /// All arithmetic stays in the integers. A support with a cycle means the
    /// matrix is not of this form (for `I − A` it means the graph has a cycle)
    /// and is reported as [`MatrixError::NotUnipotent`] instead of attempting a
    /// general inverse.
    pub fn invert_unipotent(&self) -> Result<Self, MatrixError> {
        let n = self.dim;
        if let Some(index) = (0..n).find(|&i| self.get(i, i) != T::ONE) {
            return Err(MatrixError::NonUnitDiagonal { index });
        }
        let order = self.support_order()?;

        let mut inv = Self::identity(n);
        for &i in order.iter().rev() {
            for j in 0..n {
                let m = self.get(i, j);
                if j == i || m.is_zero() {
                    continue;
                }
                for col in 0..n {
                    let x = inv.get(j, col);
                    if x.is_zero() {
                        continue;
                    }
                    let value = m
                        .checked_mul(x)
                        .and_then(|t| inv.get(i, col).checked_sub(t))
                        .ok_or(MatrixError::Overflow { row: i, col })?;
                    inv.set(i, col, value);
                }
            }
        }
        Ok(inv)
    }
}

impl<T: PathCount> Display for CountMatrix<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..self.dim {
            writeln!(f, "{}", self.row(row).iter().join(" "))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn from_rows(rows: &[&[i64]]) -> CountMatrix<i64> {
        let mut m = CountMatrix::zeros(rows.len());
        for (i, r) in rows.iter().enumerate() {
            for (j, v) in r.iter().enumerate() {
                m.set(i, j, *v);
            }
        }
        m
    }

    #[test]
    fn identity_has_unit_diagonal() {
        let n = 10;
        let id = CountMatrix::<i64>::identity(n);
        for i in 0..n {
            for j in 0..n {
                assert_eq!(id.get(i, j), if i == j { 1 } else { 0 });
            }
        }
    }

    #[test]
    fn sub_and_mul() {
        let a = from_rows(&[&[0, 1, 0], &[0, 0, 2], &[0, 0, 0]]);
        let i = CountMatrix::identity(3);

        let m = i.checked_sub(&a).unwrap();
        assert_eq!(m, from_rows(&[&[1, -1, 0], &[0, 1, -2], &[0, 0, 1]]));

        let a2 = a.checked_mul(&a).unwrap();
        assert_eq!(a2, from_rows(&[&[0, 0, 2], &[0, 0, 0], &[0, 0, 0]]));
        assert!(a2.checked_mul(&a).unwrap().support().next().is_none());

        assert_eq!(
            a.checked_mul(&CountMatrix::identity(2)),
            Err(MatrixError::DimensionMismatch { left: 3, right: 2 })
        );
    }

    #[test]
    fn inverse_of_unipotent_matrix() {
        // Rows deliberately not in topological order: 2 -> 0 -> 1.
        let a = from_rows(&[&[0, 1, 0], &[0, 0, 0], &[1, 1, 0]]);
        let m = CountMatrix::identity(3).checked_sub(&a).unwrap();

        let inv = m.invert_unipotent().unwrap();
        assert_eq!(inv, from_rows(&[&[1, 1, 0], &[0, 1, 0], &[1, 2, 1]]));
        assert_eq!(m.checked_mul(&inv).unwrap(), CountMatrix::identity(3));
        assert_eq!(inv.checked_mul(&m).unwrap(), CountMatrix::identity(3));
    }

    #[test]
    fn cyclic_support_is_not_unipotent() {
        let a = from_rows(&[&[0, 1, 0], &[0, 0, 1], &[1, 0, 0]]);
        let m = CountMatrix::identity(3).checked_sub(&a).unwrap();

        match m.invert_unipotent() {
            Err(MatrixError::NotUnipotent {
                processed,
                total,
                remaining,
            }) => {
                assert_eq!(processed, 0);
                assert_eq!(total, 3);
                assert_eq!(remaining, vec![(0, 1), (1, 1), (2, 1)]);
            }
            other => panic!("expected NotUnipotent, got {other:?}"),
        }

        assert_eq!(
            CountMatrix::<i64>::zeros(2).invert_unipotent(),
            Err(MatrixError::NonUnitDiagonal { index: 0 })
        );
    }

    #[test]
    fn grow_keeps_coordinates() {
        let mut m = from_rows(&[&[1, 2], &[3, 4]]);
        m.grow(3);
        insta::assert_snapshot!(m.to_string().trim_end(), @r"
        1 2 0
        3 4 0
        0 0 0
        ");

        m.clear_row(0);
        m.clear_column(1);
        assert_eq!(m.support().collect::<Vec<_>>(), vec![(1, 0)]);
        assert_eq!(m.column(0).collect::<Vec<_>>(), vec![0, 3, 0]);
    }

    #[test]
    fn overflow_is_an_error() {
        let mut m = CountMatrix::<i32>::zeros(1);
        m.set(0, 0, i32::MAX);
        assert_eq!(
            m.checked_add_at(0, 0, 1),
            Err(MatrixError::Overflow { row: 0, col: 0 })
        );
        assert_eq!(m.get(0, 0), i32::MAX);
    }
}
