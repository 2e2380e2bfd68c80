//! Earliest-ancestor lookups over parent/child relationships.
//!
//! A [`FamilyTree`] stores every relationship as an edge from the child to
//! the parent, so walking the graph forward from a person walks up through
//! their ancestors.

use roaring::RoaringBitmap;

use crate::containers::Stack;
use crate::digraph::DirectedGraph;
use crate::error::Result;
use crate::Vertex;

/// People connected by child -> parent edges.
#[derive(Clone)]
pub struct FamilyTree<V> {
    graph: DirectedGraph<V>,
}

impl<V: Vertex> std::fmt::Debug for FamilyTree<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let relationships: Vec<(V, V)> = self
            .graph
            .iter_edges()
            .map(|(child, parent)| (parent, child))
            .collect();
        f.debug_struct("FamilyTree")
            .field("relationships", &relationships)
            .finish()
    }
}

impl<V: Vertex> Default for FamilyTree<V> {
    fn default() -> Self {
        Self {
            graph: DirectedGraph::new(),
        }
    }
}

impl<V: Vertex> FamilyTree<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a tree from `(parent, child)` pairs.
    pub fn from_relationships<I: IntoIterator<Item = (V, V)>>(relationships: I) -> Self {
        let mut tree = Self::new();
        for (parent, child) in relationships {
            tree.add_relationship(parent, child);
        }
        tree
    }

    pub fn add_person(&mut self, person: V) {
        self.graph.add_vertex(person);
    }

    /// Records that `parent` is a parent of `child`, adding either of them if
    /// not yet present.
    pub fn add_relationship(&mut self, parent: V, child: V) {
        let child = self.graph.intern(child);
        let parent = self.graph.intern(parent);
        self.graph.link(child, parent);
    }

    pub fn contains_person(&self, person: V) -> bool {
        self.graph.contains_vertex(person)
    }

    pub fn parents_of(&self, child: V) -> Result<impl Iterator<Item = V> + '_> {
        self.graph.get_neighbors(child)
    }

    /// Returns the ancestor of `start` that is the most parent links away from
    /// it, preferring the smallest vertex among equally distant ones, or
    /// `None` when `start` has no parents.  `start` itself is never the
    /// answer, even when a cycle leads back to it.
    ///
    /// The walk is a depth-first traversal carrying the distance from
    /// `start` along with every vertex.  Every `(vertex, distance)` pair taken
    /// off the stack is a candidate, including pairs for vertices that were
    /// already expanded through another route.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn earliest_ancestor(&self, start: V) -> Result<Option<V>> {
        let start = self.graph.index_of(&start)?;

        let mut visited = RoaringBitmap::new();
        let mut to_visit: Stack<(u32, u32)> = Stack::new();
        to_visit.push((start, 0));

        let mut earliest: Option<(u32, V)> = None;
        while let Some((u, distance)) = to_visit.pop() {
            let person = self.graph.vertex_at(u);
            if u != start {
                earliest = match earliest {
                    Some((best, ancestor))
                        if best > distance || (best == distance && ancestor <= person) =>
                    {
                        Some((best, ancestor))
                    }
                    _ => Some((distance, person)),
                };
            }
            if !visited.insert(u) {
                cov_mark::hit!(ancestor_reached_twice);
                continue;
            }
            for parent in self.graph.neighbours_at(u) {
                to_visit.push((*parent, distance + 1));
            }
        }

        match earliest {
            Some((distance, ancestor)) => {
                tracing::debug!(?ancestor, distance, "earliest ancestor found");
                Ok(Some(ancestor))
            }
            None => {
                tracing::debug!("no ancestors");
                Ok(None)
            }
        }
    }
}

/// Builds a [`FamilyTree`] from `(parent, child)` pairs and returns the
/// earliest ancestor of `start`, or `None` if `start` has no parents.
/// Fails when `start` appears in none of the pairs.
pub fn earliest_ancestor<V, I>(relationships: I, start: V) -> Result<Option<V>>
where
    V: Vertex,
    I: IntoIterator<Item = (V, V)>,
{
    FamilyTree::from_relationships(relationships).earliest_ancestor(start)
}
