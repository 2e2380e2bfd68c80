//! Directed graphs with breadth-first and depth-first traversals, path
//! searches, and an earliest-ancestor solver over parent/child relationships.
//!
//! # Entry points
//!
//! Build a [`DirectedGraph`] with [`DirectedGraph::add_vertex`] and
//! [`DirectedGraph::add_edge`] (or [`DirectedGraph::from_edges`]), then call
//! one of `bft`, `dft`, `dft_recursive`, `bfs`, `dfs` or `dfs_recursive` on
//! it.  For ancestry questions use [`earliest_ancestor`] or a [`FamilyTree`].
//!
//! ## Anti-features
//!
//! * No weights on either edges or vertices.
//! * No vertex or edge removal.
//! * No serde impls.

use std::fmt::Debug;
use std::hash::Hash;

pub mod ancestry;
pub mod containers;
pub mod digraph;
pub mod error;
pub mod traversal;

/// Anything usable as a vertex identifier: small, copyable, hashable and
/// totally ordered.
pub trait Vertex: Copy + Eq + Hash + Ord + Debug {}

impl<T: Copy + Eq + Hash + Ord + Debug> Vertex for T {}

pub use ancestry::{earliest_ancestor, FamilyTree};
pub use containers::{Queue, Stack};
pub use digraph::{arb_digraph, DirectedGraph};
pub use error::{GraphError, Result};
pub use traversal::{BftIterator, DftIterator};
