//! Tunables for a [`GraphStore`](crate::store::GraphStore).

use derive_more::Display;

/// When is `remove_edge` allowed to take a path away?
#[derive(Clone, Copy, Debug, Default, Display, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EdgeRemovalPolicy {
    /// Reject only if a path count on the affected closure would become
    /// negative.
    #[default]
    #[display(fmt = "counts-only")]
    CountsOnly,
    /// Additionally require that `from` still reaches `to` afterwards, through
    /// a parallel edge or an indirect path.
    #[display(fmt = "require-alternate-path")]
    RequireAlternatePath,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ReachConfig {
    pub edge_removal: EdgeRemovalPolicy,
    /// Hand retired vertex numbers to new nodes before growing the matrices.
    pub reuse_retired_slots: bool,
}

impl Default for ReachConfig {
    fn default() -> Self {
        ReachConfig {
            edge_removal: EdgeRemovalPolicy::default(),
            reuse_retired_slots: true,
        }
    }
}

impl ReachConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edge_removal(mut self, policy: EdgeRemovalPolicy) -> Self {
        self.edge_removal = policy;
        self
    }

    pub fn reuse_retired_slots(mut self, reuse: bool) -> Self {
        self.reuse_retired_slots = reuse;
        self
    }
}
