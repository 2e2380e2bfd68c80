//! An adjacency-list directed graph over arbitrary [`Vertex`] identifiers.
//!
//! Vertices are interned into dense `u32` indices on insertion so that the
//! traversals can keep their visited sets in a [`RoaringBitmap`].  Neighbour
//! lists keep edge insertion order and ignore duplicate edges, which makes
//! every traversal order reproducible for a given construction sequence.

use std::collections::HashMap;
use std::ops::Range;

use proptest::prelude::*;
use proptest::strategy::{NewTree, ValueTree};
use proptest::test_runner::TestRunner;
use rand::distributions::Uniform;
use rand::prelude::Distribution;
use roaring::RoaringBitmap;

use crate::error::{GraphError, Result};
use crate::Vertex;

/// A mutable, single-threaded directed graph.  Edges are only ever added.
#[derive(Clone)]
pub struct DirectedGraph<V> {
    index: HashMap<V, u32>,
    vertices: Vec<V>,
    adjacency: Vec<Vec<u32>>,
}

impl<V: Vertex> std::fmt::Debug for DirectedGraph<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let edges: Vec<(V, V)> = self.iter_edges().collect();
        f.debug_struct("DirectedGraph")
            .field("vertices", &self.vertices)
            .field("edges", &edges)
            .finish()
    }
}

impl<V: Vertex> Default for DirectedGraph<V> {
    fn default() -> Self {
        Self {
            index: HashMap::new(),
            vertices: Vec::new(),
            adjacency: Vec::new(),
        }
    }
}

impl<V: Vertex> DirectedGraph<V> {
    /// Constructs a graph without any vertices.
    pub fn new() -> Self {
        Self::default()
    }

    /// Constructs a graph from `(from, to)` pairs, adding both endpoints of
    /// every pair as vertices.
    pub fn from_edges<I: IntoIterator<Item = (V, V)>>(edges: I) -> Self {
        let mut graph = Self::new();
        for (from, to) in edges {
            let from = graph.intern(from);
            let to = graph.intern(to);
            graph.link(from, to);
        }
        graph
    }

    /// Adds `vertex` with no outgoing edges.  Adding a vertex that is already
    /// present leaves its edges untouched.
    pub fn add_vertex(&mut self, vertex: V) {
        self.intern(vertex);
    }

    /// Adds the directed edge `from -> to`.  Both endpoints must have been
    /// added before.  Adding an existing edge is a no-op.
    pub fn add_edge(&mut self, from: V, to: V) -> Result<()> {
        let from = self.index_of(&from)?;
        let to = self.index_of(&to)?;
        self.link(from, to);
        Ok(())
    }

    /// Iterates over the targets of the outgoing edges of `vertex` in the
    /// order the edges were added.
    pub fn get_neighbors(&self, vertex: V) -> Result<impl Iterator<Item = V> + '_> {
        let u = self.index_of(&vertex)?;
        Ok(self.neighbours_at(u).iter().map(move |v| self.vertex_at(*v)))
    }

    pub fn contains_vertex(&self, vertex: V) -> bool {
        self.index.contains_key(&vertex)
    }

    #[inline]
    pub fn get_vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn get_edge_count(&self) -> usize {
        self.adjacency.iter().map(Vec::len).sum()
    }

    /// Iterates over the vertices in insertion order.
    pub fn iter_vertices(&self) -> impl Iterator<Item = V> + '_ {
        self.vertices.iter().copied()
    }

    /// Iterates over the edges grouped by source vertex, sources in insertion
    /// order and each group in edge insertion order.
    pub fn iter_edges(&self) -> impl Iterator<Item = (V, V)> + '_ {
        self.adjacency.iter().enumerate().flat_map(move |(u, targets)| {
            let from = self.vertices[u];
            targets.iter().map(move |v| (from, self.vertex_at(*v)))
        })
    }

    pub(crate) fn intern(&mut self, vertex: V) -> u32 {
        if let Some(u) = self.index.get(&vertex) {
            return *u;
        }
        assert!(self.vertices.len() < u32::MAX as usize);
        let u = self.vertices.len() as u32;
        self.index.insert(vertex, u);
        self.vertices.push(vertex);
        self.adjacency.push(Vec::new());
        u
    }

    pub(crate) fn link(&mut self, from: u32, to: u32) {
        assert!((to as usize) < self.vertices.len());
        let targets = &mut self.adjacency[from as usize];
        if !targets.contains(&to) {
            targets.push(to);
        }
    }

    pub(crate) fn index_of(&self, vertex: &V) -> Result<u32> {
        self.index
            .get(vertex)
            .copied()
            .ok_or_else(|| GraphError::vertex_not_found(vertex))
    }

    #[inline]
    pub(crate) fn vertex_at(&self, u: u32) -> V {
        self.vertices[u as usize]
    }

    #[inline]
    pub(crate) fn neighbours_at(&self, u: u32) -> &[u32] {
        &self.adjacency[u as usize]
    }
}

/// Random graphs over the vertices `0..n`, `n` drawn from `vertex_count`.
/// Every ordered pair (self-loops included) becomes an edge with probability
/// `edge_probability`.  Shrinking drops edges one at a time.
pub fn arb_digraph(
    vertex_count: impl Into<Range<u32>>,
    edge_probability: f64,
) -> DirectedGraphStrategy {
    DirectedGraphStrategy {
        vertex_count: vertex_count.into(),
        edge_probability,
    }
}

#[derive(Debug)]
pub struct DirectedGraphStrategy {
    vertex_count: Range<u32>,
    edge_probability: f64,
}

#[derive(Debug)]
pub struct DirectedGraphValueTree {
    vertex_count: u32,
    candidate_edges: Vec<(u32, u32)>,
    kept_edges: RoaringBitmap,
    next_to_drop: u32,
    last_dropped: Option<u32>,
}

impl Strategy for DirectedGraphStrategy {
    type Tree = DirectedGraphValueTree;

    type Value = DirectedGraph<u32>;

    fn new_tree(&self, runner: &mut TestRunner) -> NewTree<Self> {
        if self.vertex_count.is_empty() {
            panic!(
                "Invalid use of empty size range. (hint: did you \
                 accidentally write {}..{} where you meant {}..={} \
                 somewhere?)",
                self.vertex_count.start,
                self.vertex_count.end,
                self.vertex_count.start,
                self.vertex_count.end
            );
        }
        if !(0.0..=1.0).contains(&self.edge_probability) {
            panic!(
                "Edge probability needs to be a number between 0 and 1, but got {}",
                self.edge_probability
            );
        }
        let vertex_count =
            Uniform::new(self.vertex_count.start, self.vertex_count.end).sample(runner.rng());

        let mut candidate_edges = Vec::new();
        for from in 0..vertex_count {
            for to in 0..vertex_count {
                if runner.rng().gen_bool(self.edge_probability) {
                    candidate_edges.push((from, to));
                }
            }
        }
        let mut kept_edges = RoaringBitmap::new();
        kept_edges.insert_range(0..candidate_edges.len() as u32);

        Ok(DirectedGraphValueTree {
            vertex_count,
            candidate_edges,
            kept_edges,
            next_to_drop: 0,
            last_dropped: None,
        })
    }
}

impl ValueTree for DirectedGraphValueTree {
    type Value = DirectedGraph<u32>;

    fn current(&self) -> Self::Value {
        let mut graph = DirectedGraph::new();
        for vertex in 0..self.vertex_count {
            graph.add_vertex(vertex);
        }
        // Vertices were interned in order, so a vertex is its own index.
        for edge_idx in self.kept_edges.iter() {
            let (from, to) = self.candidate_edges[edge_idx as usize];
            graph.link(from, to);
        }
        graph
    }

    fn simplify(&mut self) -> bool {
        while (self.next_to_drop as usize) < self.candidate_edges.len() {
            let edge_idx = self.next_to_drop;
            self.next_to_drop += 1;
            if self.kept_edges.remove(edge_idx) {
                self.last_dropped = Some(edge_idx);
                return true;
            }
        }
        false
    }

    fn complicate(&mut self) -> bool {
        match self.last_dropped.take() {
            Some(edge_idx) => {
                self.kept_edges.insert(edge_idx);
                true
            }
            None => false,
        }
    }
}
