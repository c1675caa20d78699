//! A directed graph over indexed vertices.
//!
//! Vertices are identified by the index they report, and there is at most one
//! edge between an ordered pair of vertices. Successors are always visited in
//! index order, so every walk of a graph is deterministic.

use crate::Error;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

pub trait Vertex: Clone {
    fn index(&self) -> usize;
    /// The label of this vertex in graphviz dot output.
    fn dot_label(&self) -> String;
}

pub trait Edge: Clone {
    /// Index of the vertex this edge leaves.
    fn head(&self) -> usize;
    /// Index of the vertex this edge enters.
    fn tail(&self) -> usize;
    /// The label of this edge in graphviz dot output.
    fn dot_label(&self) -> String {
        String::new()
    }
}

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Graph<V: Vertex, E: Edge> {
    vertices: BTreeMap<usize, V>,
    // Keyed by (head, tail), so the edges leaving a vertex are a range
    edges: BTreeMap<(usize, usize), E>,
}

impl<V: Vertex, E: Edge> Graph<V, E> {
    pub fn new() -> Graph<V, E> {
        Graph {
            vertices: BTreeMap::new(),
            edges: BTreeMap::new(),
        }
    }

    pub fn has_vertex(&self, index: usize) -> bool {
        self.vertices.contains_key(&index)
    }

    pub fn has_edge(&self, head: usize, tail: usize) -> bool {
        self.edges.contains_key(&(head, tail))
    }

    /// # Errors
    /// `Error::DuplicateVertex` if a vertex with the same index exists.
    pub fn insert_vertex(&mut self, vertex: V) -> Result<(), Error> {
        let index = vertex.index();
        if self.has_vertex(index) {
            return Err(Error::DuplicateVertex(index));
        }
        self.vertices.insert(index, vertex);
        Ok(())
    }

    /// # Errors
    /// `Error::DuplicateEdge` if the edge exists, `Error::GraphVertexNotFound`
    /// if either end is missing.
    pub fn insert_edge(&mut self, edge: E) -> Result<(), Error> {
        let key = (edge.head(), edge.tail());
        if self.edges.contains_key(&key) {
            return Err(Error::DuplicateEdge(key.0, key.1));
        }
        for index in [key.0, key.1] {
            if !self.has_vertex(index) {
                return Err(Error::GraphVertexNotFound(index));
            }
        }
        self.edges.insert(key, edge);
        Ok(())
    }

    pub fn vertex(&self, index: usize) -> Result<&V, Error> {
        self.vertices
            .get(&index)
            .ok_or(Error::GraphVertexNotFound(index))
    }

    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    fn successor_indices(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.edges
            .range((index, 0)..=(index, usize::MAX))
            .map(|(&(_, tail), _)| tail)
    }

    /// The vertices `index` has an edge to, in index order.
    pub fn successors(&self, index: usize) -> Result<Vec<&V>, Error> {
        self.vertex(index)?;
        self.successor_indices(index)
            .map(|tail| self.vertex(tail))
            .collect()
    }

    /// Walk the vertices reachable from `root` breadth-first, `root` first.
    ///
    /// Each reachable vertex is visited at most once. When `visit` returns
    /// `false`, the walk does not follow that vertex's edges, though its
    /// successors may still be reached along other paths.
    pub fn breadth_first_walk<F>(&self, root: usize, mut visit: F) -> Result<(), Error>
    where
        F: FnMut(&V) -> bool,
    {
        self.vertex(root)?;

        let mut queued = FxHashSet::default();
        queued.insert(root);
        let mut queue = VecDeque::from(vec![root]);

        while let Some(index) = queue.pop_front() {
            if !visit(self.vertex(index)?) {
                continue;
            }
            for tail in self.successor_indices(index) {
                if queued.insert(tail) {
                    queue.push_back(tail);
                }
            }
        }

        Ok(())
    }

    /// Indices of the vertices reachable from `root`, in breadth-first order.
    pub fn breadth_first_order(&self, root: usize) -> Result<Vec<usize>, Error> {
        let mut order = Vec::new();
        self.breadth_first_walk(root, |vertex| {
            order.push(vertex.index());
            true
        })?;
        Ok(order)
    }

    /// This graph in graphviz dot format.
    pub fn dot_graph(&self) -> String {
        let escape = |label: String| label.replace('"', "\\\"");

        let mut lines = vec!["digraph G {".to_string()];
        lines.push("  node [shape=\"box\", fontname=\"Courier New\"];".to_string());
        for (index, vertex) in &self.vertices {
            lines.push(format!("  {} [label=\"{}\"];", index, escape(vertex.dot_label())));
        }
        for (&(head, tail), edge) in &self.edges {
            lines.push(format!(
                "  {} -> {} [label=\"{}\"];",
                head,
                tail,
                escape(edge.dot_label())
            ));
        }
        lines.push("}".to_string());
        lines.join("\n")
    }
}
