//! Breadth-first and depth-first traversals of a [`DirectedGraph`] and their
//! path-returning search counterparts.
//!
//! All of them deduplicate at visit time: a vertex may sit in the frontier
//! several times but is only expanded once.  Each call owns its visited set
//! and frontier, so repeated calls never observe each other.

use roaring::RoaringBitmap;

use crate::containers::{Queue, Stack};
use crate::digraph::DirectedGraph;
use crate::error::Result;
use crate::Vertex;

/// See [`DirectedGraph::bft`].
pub struct BftIterator<'a, V> {
    graph: &'a DirectedGraph<V>,
    visited: RoaringBitmap,
    to_visit: Queue<u32>,
}

impl<'a, V: Vertex> Iterator for BftIterator<'a, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(u) = self.to_visit.dequeue() {
            if !self.visited.insert(u) {
                cov_mark::hit!(bft_skips_visited_vertex);
                continue;
            }
            self.to_visit
                .extend(self.graph.neighbours_at(u).iter().copied());
            let vertex = self.graph.vertex_at(u);
            tracing::trace!(?vertex, "bft visit");
            return Some(vertex);
        }
        None
    }
}

/// See [`DirectedGraph::dft`].
pub struct DftIterator<'a, V> {
    graph: &'a DirectedGraph<V>,
    visited: RoaringBitmap,
    to_visit: Stack<u32>,
}

impl<'a, V: Vertex> Iterator for DftIterator<'a, V> {
    type Item = V;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(u) = self.to_visit.pop() {
            if !self.visited.insert(u) {
                cov_mark::hit!(dft_skips_visited_vertex);
                continue;
            }
            self.to_visit
                .extend(self.graph.neighbours_at(u).iter().copied());
            let vertex = self.graph.vertex_at(u);
            tracing::trace!(?vertex, "dft visit");
            return Some(vertex);
        }
        None
    }
}

impl<V: Vertex> DirectedGraph<V> {
    /// Visit all vertices reachable from `start` in a breadth-first order.
    /// Siblings are visited in edge insertion order.
    pub fn bft(&self, start: V) -> Result<BftIterator<'_, V>> {
        let start = self.index_of(&start)?;
        let mut to_visit = Queue::new();
        to_visit.enqueue(start);
        Ok(BftIterator {
            graph: self,
            visited: RoaringBitmap::new(),
            to_visit,
        })
    }

    /// Visit all vertices reachable from `start` in a depth-first order using
    /// an explicit stack.  The most recently added edge of a vertex is
    /// followed first.
    pub fn dft(&self, start: V) -> Result<DftIterator<'_, V>> {
        let start = self.index_of(&start)?;
        let mut to_visit = Stack::new();
        to_visit.push(start);
        Ok(DftIterator {
            graph: self,
            visited: RoaringBitmap::new(),
            to_visit,
        })
    }

    /// Same reachable set as [`Self::dft`], but recursing on the call stack,
    /// which follows the oldest edge of a vertex first.
    pub fn dft_recursive(&self, start: V) -> Result<Vec<V>> {
        let start = self.index_of(&start)?;
        let mut visited = RoaringBitmap::new();
        let mut order = Vec::new();
        self.dft_recursive_from(start, &mut visited, &mut order);
        Ok(order)
    }

    fn dft_recursive_from(&self, u: u32, visited: &mut RoaringBitmap, order: &mut Vec<V>) {
        if !visited.insert(u) {
            return;
        }
        order.push(self.vertex_at(u));
        for v in self.neighbours_at(u) {
            self.dft_recursive_from(*v, visited, order);
        }
    }

    /// Returns a shortest path (by edge count) from `start` to `destination`,
    /// both ends included, or `None` if `destination` is unreachable.
    ///
    /// Every frontier entry is its own copy of the path leading to it, so
    /// memory grows with frontier size times path length.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn bfs(&self, start: V, destination: V) -> Result<Option<Vec<V>>> {
        let start = self.index_of(&start)?;
        let destination = self.index_of(&destination)?;

        let mut visited = RoaringBitmap::new();
        let mut to_visit = Queue::new();
        to_visit.enqueue(vec![start]);

        while let Some(path) = to_visit.dequeue() {
            let u = path[path.len() - 1];
            if u == destination {
                return Ok(Some(self.resolve_path(&path)));
            }
            if !visited.insert(u) {
                continue;
            }
            for v in self.neighbours_at(u) {
                let mut next = path.clone();
                next.push(*v);
                to_visit.enqueue(next);
            }
        }
        tracing::debug!("destination unreachable");
        Ok(None)
    }

    /// Returns some path from `start` to `destination`, not necessarily the
    /// shortest one, or `None` if `destination` is unreachable.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn dfs(&self, start: V, destination: V) -> Result<Option<Vec<V>>> {
        let start = self.index_of(&start)?;
        let destination = self.index_of(&destination)?;

        let mut visited = RoaringBitmap::new();
        let mut to_visit = Stack::new();
        to_visit.push(vec![start]);

        while let Some(path) = to_visit.pop() {
            let u = path[path.len() - 1];
            if u == destination {
                return Ok(Some(self.resolve_path(&path)));
            }
            if !visited.insert(u) {
                continue;
            }
            for v in self.neighbours_at(u) {
                let mut next = path.clone();
                next.push(*v);
                to_visit.push(next);
            }
        }
        tracing::debug!("destination unreachable");
        Ok(None)
    }

    /// Recursive form of [`Self::dfs`].  The visited set and the path under
    /// construction are created afresh for every call and threaded through
    /// the recursion explicitly.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn dfs_recursive(&self, start: V, destination: V) -> Result<Option<Vec<V>>> {
        let start = self.index_of(&start)?;
        let destination = self.index_of(&destination)?;

        let mut visited = RoaringBitmap::new();
        let mut path = Vec::new();
        if self.dfs_recursive_from(start, destination, &mut visited, &mut path) {
            return Ok(Some(self.resolve_path(&path)));
        }
        tracing::debug!("destination unreachable");
        Ok(None)
    }

    fn dfs_recursive_from(
        &self,
        u: u32,
        destination: u32,
        visited: &mut RoaringBitmap,
        path: &mut Vec<u32>,
    ) -> bool {
        if !visited.insert(u) {
            return false;
        }
        path.push(u);
        if u == destination {
            return true;
        }
        for v in self.neighbours_at(u) {
            if self.dfs_recursive_from(*v, destination, visited, path) {
                return true;
            }
        }
        path.pop();
        false
    }

    fn resolve_path(&self, path: &[u32]) -> Vec<V> {
        tracing::debug!(vertices = path.len(), "path found");
        path.iter().map(|u| self.vertex_at(*u)).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};

    use proptest::prelude::*;

    use super::*;
    use crate::digraph::arb_digraph;
    use crate::error::GraphError;

    fn sample_graph() -> DirectedGraph<u32> {
        let mut graph = DirectedGraph::new();
        for vertex in 1..=7 {
            graph.add_vertex(vertex);
        }
        for (from, to) in [
            (5, 3),
            (6, 3),
            (7, 1),
            (4, 7),
            (1, 2),
            (7, 6),
            (2, 4),
            (3, 5),
            (2, 3),
            (4, 6),
        ] {
            graph.add_edge(from, to).unwrap();
        }
        graph
    }

    #[test]
    fn bft_visits_level_by_level() {
        cov_mark::check!(bft_skips_visited_vertex);
        let graph = sample_graph();
        let order: Vec<u32> = graph.bft(1).unwrap().collect();
        assert_eq!(order, vec![1, 2, 4, 3, 7, 6, 5]);
    }

    #[test]
    fn dft_follows_newest_edge_first() {
        cov_mark::check!(dft_skips_visited_vertex);
        let graph = sample_graph();
        let order: Vec<u32> = graph.dft(1).unwrap().collect();
        assert_eq!(order, vec![1, 2, 3, 5, 4, 6, 7]);
    }

    #[test]
    fn dft_recursive_follows_oldest_edge_first() {
        let graph = sample_graph();
        assert_eq!(graph.dft_recursive(1).unwrap(), vec![1, 2, 4, 7, 6, 3, 5]);
    }

    #[test]
    fn repeated_recursive_calls_start_fresh() {
        let graph = sample_graph();
        let first = graph.dft_recursive(3).unwrap();
        let second = graph.dft_recursive(3).unwrap();
        assert_eq!(first, vec![3, 5]);
        assert_eq!(first, second);
        assert_eq!(graph.dfs_recursive(1, 6).unwrap(), graph.dfs_recursive(1, 6).unwrap());
    }

    #[test]
    fn bfs_finds_shortest_path() {
        let graph = sample_graph();
        assert_eq!(graph.bfs(1, 6).unwrap(), Some(vec![1, 2, 4, 6]));
    }

    #[test]
    fn dfs_finds_a_path() {
        let graph = sample_graph();
        let valid = [vec![1, 2, 4, 6], vec![1, 2, 4, 7, 6]];
        let path = graph.dfs(1, 6).unwrap().unwrap();
        assert!(valid.contains(&path), "{:?}", path);
        assert_eq!(path, vec![1, 2, 4, 6]);
        let path = graph.dfs_recursive(1, 6).unwrap().unwrap();
        assert!(valid.contains(&path), "{:?}", path);
        assert_eq!(path, vec![1, 2, 4, 7, 6]);
    }

    #[test]
    fn unreachable_destination_is_not_an_empty_path() {
        let graph = sample_graph();
        assert_eq!(graph.bfs(6, 1).unwrap(), None);
        assert_eq!(graph.dfs(6, 1).unwrap(), None);
        assert_eq!(graph.dfs_recursive(6, 1).unwrap(), None);
        assert_eq!(graph.bfs(6, 6).unwrap(), Some(vec![6]));
        assert_eq!(graph.dfs(6, 6).unwrap(), Some(vec![6]));
        assert_eq!(graph.dfs_recursive(6, 6).unwrap(), Some(vec![6]));
    }

    #[test]
    fn unknown_vertices_are_errors() {
        let graph = sample_graph();
        let not_found = || Err(GraphError::VertexNotFound("42".to_string()));
        assert_eq!(graph.bfs(42, 1), not_found());
        assert_eq!(graph.dfs(1, 42), not_found());
        assert_eq!(graph.dfs_recursive(42, 42), not_found());
        assert!(graph.bft(42).is_err());
        assert!(graph.dft(42).is_err());
        assert_eq!(graph.dft_recursive(42), Err(GraphError::VertexNotFound("42".to_string())));
    }

    #[test]
    fn works_with_non_integer_vertices() {
        let graph = DirectedGraph::from_edges(vec![
            ("amsterdam", "berlin"),
            ("berlin", "prague"),
            ("amsterdam", "paris"),
            ("paris", "prague"),
            ("prague", "vienna"),
        ]);
        assert_eq!(
            graph.bfs("amsterdam", "vienna").unwrap(),
            Some(vec!["amsterdam", "berlin", "prague", "vienna"])
        );
        assert_eq!(
            graph.dfs("amsterdam", "vienna").unwrap(),
            Some(vec!["amsterdam", "paris", "prague", "vienna"])
        );
    }

    /// Edge-hop distances from `start` computed by relaxing every edge until
    /// nothing changes.
    fn hop_distances(graph: &DirectedGraph<u32>, start: u32) -> HashMap<u32, usize> {
        let mut distances = HashMap::from([(start, 0)]);
        loop {
            let mut changed = false;
            for (from, to) in graph.iter_edges() {
                if let Some(&d) = distances.get(&from) {
                    let candidate = d + 1;
                    if distances.get(&to).map_or(true, |&known| candidate < known) {
                        distances.insert(to, candidate);
                        changed = true;
                    }
                }
            }
            if !changed {
                return distances;
            }
        }
    }

    fn is_walk(graph: &DirectedGraph<u32>, path: &[u32], start: u32, destination: u32) -> bool {
        path.first() == Some(&start)
            && path.last() == Some(&destination)
            && path.windows(2).all(|pair| {
                graph
                    .get_neighbors(pair[0])
                    .map(|mut neighbours| neighbours.any(|v| v == pair[1]))
                    .unwrap_or(false)
            })
    }

    proptest! {
        #[test]
        fn traversals_equal_modulo_order(graph in arb_digraph(1..25, 0.15)) {
            let bft: HashSet<u32> = graph.bft(0).unwrap().collect();
            let dft: HashSet<u32> = graph.dft(0).unwrap().collect();
            let dft_recursive: HashSet<u32> = graph.dft_recursive(0).unwrap().into_iter().collect();
            let expected: HashSet<u32> = hop_distances(&graph, 0).into_keys().collect();
            prop_assert_eq!(&bft, &dft);
            prop_assert_eq!(&dft, &dft_recursive);
            prop_assert_eq!(&bft, &expected);
        }

        #[test]
        fn traversals_visit_each_vertex_once(graph in arb_digraph(1..25, 0.3)) {
            let order: Vec<u32> = graph.bft(0).unwrap().collect();
            let unique: HashSet<u32> = order.iter().copied().collect();
            prop_assert_eq!(order.len(), unique.len());
            let order: Vec<u32> = graph.dft(0).unwrap().collect();
            let unique: HashSet<u32> = order.iter().copied().collect();
            prop_assert_eq!(order.len(), unique.len());
        }

        #[test]
        fn bfs_paths_are_shortest(graph in arb_digraph(1..20, 0.15)) {
            let distances = hop_distances(&graph, 0);
            for destination in graph.iter_vertices() {
                let bfs = graph.bfs(0, destination).unwrap();
                let dfs = graph.dfs(0, destination).unwrap();
                let dfs_recursive = graph.dfs_recursive(0, destination).unwrap();
                match distances.get(&destination) {
                    Some(&hops) => {
                        let bfs = bfs.unwrap();
                        let dfs = dfs.unwrap();
                        let dfs_recursive = dfs_recursive.unwrap();
                        prop_assert!(is_walk(&graph, &bfs, 0, destination));
                        prop_assert!(is_walk(&graph, &dfs, 0, destination));
                        prop_assert!(is_walk(&graph, &dfs_recursive, 0, destination));
                        prop_assert_eq!(bfs.len() - 1, hops);
                        prop_assert!(bfs.len() <= dfs.len());
                        prop_assert!(bfs.len() <= dfs_recursive.len());
                    }
                    None => {
                        prop_assert!(bfs.is_none());
                        prop_assert!(dfs.is_none());
                        prop_assert!(dfs_recursive.is_none());
                    }
                }
            }
        }
    }
}
