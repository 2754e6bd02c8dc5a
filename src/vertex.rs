//! # Vertex numbering
//!
//! [`VertexSpace`] keeps the bijection between caller supplied node keys and
//! the dense vertex numbers used as matrix coordinates. Removing a node does
//! not compact anything: its number is marked retired, stays out of every
//! read, and may later be handed to a new node so the matrices never have to
//! be renumbered.

use std::fmt::{Debug, Display};
use std::hash::Hash;

use ahash::AHashMap;
use bitvec::vec::BitVec;

use crate::error::{ReachError, Result};

/// Anything usable as a node key. The index only hashes, compares, clones and
/// prints keys; it never looks inside them.
pub trait NodeKey: Clone + Eq + Hash + Debug + Display {}

impl<K: Clone + Eq + Hash + Debug + Display> NodeKey for K {}

crate::define_indexed_vec!(
    /// Dense vertex number, the row/column coordinate of a node.
    pub struct VertexIndex;

    /// A vector indexed by [`VertexIndex`].
    pub struct VertexVec;
);

#[derive(Clone, Debug)]
pub struct VertexSpace<K> {
    by_key: AHashMap<K, VertexIndex>,
    keys: VertexVec<Option<K>>,
    retired: BitVec,
    reuse_retired: bool,
}

impl<K: NodeKey> VertexSpace<K> {
    pub fn new(reuse_retired: bool) -> Self {
        VertexSpace {
            by_key: AHashMap::new(),
            keys: VertexVec::new(),
            retired: BitVec::new(),
            reuse_retired,
        }
    }

    /// Gives `key` a vertex number: the lowest retired one when reuse is
    /// enabled, otherwise the next number past the current dimension.
    pub fn assign(&mut self, key: K) -> Result<VertexIndex, K> {
        if self.by_key.contains_key(&key) {
            return Err(ReachError::DuplicateNode(key));
        }

        let reused = if self.reuse_retired {
            self.retired.first_one().map(VertexIndex)
        } else {
            None
        };

        let v = match reused {
            Some(v) => {
                self.retired.set(v.0, false);
                self.keys[v] = Some(key.clone());
                v
            }
            None => {
                self.retired.push(false);
                self.keys.push(Some(key.clone()))
            }
        };
        self.by_key.insert(key, v);
        Ok(v)
    }

    pub fn lookup(&self, key: &K) -> Option<VertexIndex> {
        self.by_key.get(key).copied()
    }

    /// Like [`lookup`](Self::lookup), failing with `NodeNotFound`.
    pub fn require(&self, key: &K) -> Result<VertexIndex, K> {
        self.lookup(key)
            .ok_or_else(|| ReachError::NodeNotFound(key.clone()))
    }

    pub fn resolve(&self, v: VertexIndex) -> Option<&K> {
        self.keys.get(v).and_then(Option::as_ref)
    }

    /// Drops the mapping for `key` and marks its number retired. The matrices
    /// are the caller's business.
    pub fn retire(&mut self, key: &K) -> Option<VertexIndex> {
        let v = self.by_key.remove(key)?;
        self.keys[v] = None;
        self.retired.set(v.0, true);
        Some(v)
    }

    pub fn is_live(&self, v: VertexIndex) -> bool {
        self.resolve(v).is_some()
    }

    pub fn is_retired(&self, v: VertexIndex) -> bool {
        self.retired.get(v.0).is_some_and(|b| *b)
    }

    /// Number of vertex slots, live or retired; the matrix dimension.
    pub fn dim(&self) -> usize {
        self.keys.len()
    }

    /// Number of live nodes.
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn retired_count(&self) -> usize {
        self.retired.count_ones()
    }

    /// Live vertices in increasing vertex-number order.
    pub fn iter_live(&self) -> impl Iterator<Item = (VertexIndex, &K)> {
        self.keys
            .iter()
            .filter_map(|(v, k)| k.as_ref().map(|k| (v, k)))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn assign_in_order_and_resolve_back() {
        let mut space = VertexSpace::new(true);
        for (i, k) in ["A", "B", "C"].into_iter().enumerate() {
            assert_eq!(space.assign(k).unwrap(), VertexIndex(i));
        }

        assert_eq!(space.lookup(&"B"), Some(VertexIndex(1)));
        assert_eq!(space.resolve(VertexIndex(2)), Some(&"C"));
        assert_eq!(space.lookup(&"Z"), None);
        assert_eq!(space.resolve(VertexIndex(7)), None);
        assert_eq!(
            space.require(&"Z"),
            Err(ReachError::NodeNotFound("Z"))
        );
        assert_eq!(space.assign("A"), Err(ReachError::DuplicateNode("A")));
        assert_eq!(space.len(), 3);
    }

    #[test]
    fn retired_slots_are_hidden_then_reused_lowest_first() {
        let mut space = VertexSpace::new(true);
        for k in 0..4u32 {
            space.assign(k).unwrap();
        }

        assert_eq!(space.retire(&2), Some(VertexIndex(2)));
        assert_eq!(space.retire(&0), Some(VertexIndex(0)));
        assert_eq!(space.retire(&0), None);

        assert!(space.is_retired(VertexIndex(0)));
        assert!(!space.is_live(VertexIndex(2)));
        assert_eq!(space.lookup(&2), None);
        assert_eq!(
            space.iter_live().map(|(v, k)| (v.0, *k)).collect::<Vec<_>>(),
            vec![(1, 1), (3, 3)]
        );
        assert_eq!((space.dim(), space.len(), space.retired_count()), (4, 2, 2));

        assert_eq!(space.assign(10).unwrap(), VertexIndex(0));
        assert_eq!(space.assign(11).unwrap(), VertexIndex(2));
        assert_eq!(space.assign(12).unwrap(), VertexIndex(4));
        assert_eq!(space.retired_count(), 0);
    }

    #[test]
    fn retired_slots_kept_when_reuse_is_off() {
        let mut space = VertexSpace::new(false);
        space.assign('a').unwrap();
        space.retire(&'a');

        assert_eq!(space.assign('a').unwrap(), VertexIndex(1));
        assert!(space.is_retired(VertexIndex(0)));
        assert_eq!(space.dim(), 2);
    }
}
