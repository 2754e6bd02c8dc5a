//! # dagreach
//!
//! A reachability index over a mutable directed acyclic graph. It answers
//! "is `a` an ancestor of `b`?", "what are the ancestors/descendants of `a`?"
//! and "how many distinct paths lead from `a` to `b`?" from a path-count
//! matrix, and keeps that matrix exact through point mutations.
//!
//! The pieces, leaves first:
//!
//! - [`vertex`]: node keys to dense vertex numbers, with retired slots.
//! - [`matrix`] / [`pair`]: exact integer matrices, the adjacency matrix `A`
//!   and the reachability matrix `R`.
//! - [`closure`]: one-shot construction of `R = (I − A)⁻¹ − I`.
//! - [`maintain`]: rank-one updates of `R` per inserted or deleted edge.
//! - [`store`]: [`GraphStore`], the locked aggregate with the public
//!   query/mutation API.
//! - [`builder`]: [`GraphBuilder`], the staging area consumed by construction.
//!
//! ```
//! use dagreach::GraphStore;
//!
//! let mut builder = GraphStore::<&str>::builder();
//! builder
//!     .add_nodes(["A", "B", "C", "D", "E"])
//!     .add_edge("A", "B")
//!     .add_edge("B", "C")
//!     .add_edge("A", "D")
//!     .add_edge("C", "E")
//!     .add_edge("D", "E");
//! let graph: GraphStore<&str> = builder.build().unwrap();
//!
//! assert_eq!(graph.get_ancestors(&"E").unwrap(), ["A", "B", "C", "D"]);
//! assert_eq!(graph.path_count(&"A", &"E").unwrap(), 2);
//! assert!(graph.add_edge(&"E", &"A").is_err());
//! ```

pub mod builder;
pub mod closure;
pub mod config;
pub mod error;
pub mod maintain;
pub mod matrix;
pub mod num_traits;
pub mod pair;
pub mod store;
pub mod typed_vec;
pub mod vertex;

pub use builder::GraphBuilder;
pub use config::{EdgeRemovalPolicy, ReachConfig};
pub use error::ReachError;
pub use store::GraphStore;
pub use vertex::{NodeKey, VertexIndex};
