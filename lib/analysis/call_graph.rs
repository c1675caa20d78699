//! Static call graphs.

use crate::graph::{Edge, Graph, Vertex};
use crate::il::{MethodSignature, Program};
use crate::Error;
use std::collections::BTreeMap;

/// A method in a `CallGraph`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MethodVertex {
    index: usize,
    signature: MethodSignature,
}

impl MethodVertex {
    pub fn signature(&self) -> &MethodSignature {
        &self.signature
    }
}

impl Vertex for MethodVertex {
    fn index(&self) -> usize {
        self.index
    }

    fn dot_label(&self) -> String {
        self.signature.to_string()
    }
}

/// A static call from `head` to `tail`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CallEdge {
    head: usize,
    tail: usize,
}

impl Edge for CallEdge {
    fn head(&self) -> usize {
        self.head
    }

    fn tail(&self) -> usize {
        self.tail
    }
}

/// The static calls between the methods of one program.
#[derive(Clone, Debug)]
pub struct CallGraph {
    graph: Graph<MethodVertex, CallEdge>,
    indices: BTreeMap<MethodSignature, usize>,
}

impl CallGraph {
    /// Create a new, empty `CallGraph`.
    pub fn new() -> CallGraph {
        CallGraph {
            graph: Graph::new(),
            indices: BTreeMap::new(),
        }
    }

    /// Add a method, if it is not already in the graph, and return its index.
    pub fn add_method(&mut self, signature: MethodSignature) -> Result<usize, Error> {
        if let Some(&index) = self.indices.get(&signature) {
            return Ok(index);
        }
        let index = self.indices.len();
        self.graph.insert_vertex(MethodVertex {
            index,
            signature: signature.clone(),
        })?;
        self.indices.insert(signature, index);
        Ok(index)
    }

    /// Add a call from `caller` to `callee`, adding either method as needed.
    pub fn add_call(&mut self, caller: MethodSignature, callee: MethodSignature) -> Result<(), Error> {
        let head = self.add_method(caller)?;
        let tail = self.add_method(callee)?;
        if !self.graph.has_edge(head, tail) {
            self.graph.insert_edge(CallEdge { head, tail })?;
        }
        Ok(())
    }

    pub fn contains(&self, signature: &MethodSignature) -> bool {
        self.indices.contains_key(signature)
    }

    fn index(&self, signature: &MethodSignature) -> Result<usize, Error> {
        self.indices
            .get(signature)
            .cloned()
            .ok_or_else(|| Error::MethodNotFound(signature.clone()))
    }

    /// Every method in the graph, ordered by signature.
    pub fn methods(&self) -> impl Iterator<Item = &MethodSignature> {
        self.indices.keys()
    }

    pub fn num_calls(&self) -> usize {
        self.graph.num_edges()
    }

    /// The methods `signature` calls.
    pub fn callees(&self, signature: &MethodSignature) -> Result<Vec<&MethodSignature>, Error> {
        Ok(self
            .graph
            .successors(self.index(signature)?)?
            .into_iter()
            .map(|vertex| vertex.signature())
            .collect())
    }

    /// Walk the graph breadth-first from `start`, `start` included.
    ///
    /// `visit` is called as `visit(start, current)` once for every method
    /// reached. When it returns `false`, the walk does not descend into the
    /// callees of `current`.
    ///
    /// # Errors
    /// `Error::MethodNotFound` if `start` is not in the graph.
    pub fn bfs_walk<F>(&self, start: &MethodSignature, mut visit: F) -> Result<(), Error>
    where
        F: FnMut(&MethodSignature, &MethodSignature) -> bool,
    {
        let root = self.index(start)?;
        self.graph
            .breadth_first_walk(root, |vertex| visit(start, vertex.signature()))
    }

    /// Every method reachable from `start`, `start` included, in breadth-first
    /// order.
    pub fn reachable(&self, start: &MethodSignature) -> Result<Vec<&MethodSignature>, Error> {
        self.graph
            .breadth_first_order(self.index(start)?)?
            .into_iter()
            .map(|index| self.graph.vertex(index).map(|vertex| vertex.signature()))
            .collect()
    }

    /// The graph in graphviz dot format.
    pub fn dot_graph(&self) -> String {
        self.graph.dot_graph()
    }
}

impl Default for CallGraph {
    fn default() -> CallGraph {
        CallGraph::new()
    }
}

/// Build the call graph of a program.
///
/// Every method of the program is a node. Every static invoke of a method in
/// the program is an edge. Other invokes, and invokes of methods outside of
/// the program, are not part of the graph.
pub fn build_call_graph(program: &Program) -> Result<CallGraph, Error> {
    let mut call_graph = CallGraph::new();

    for method in program.all_methods() {
        call_graph.add_method(method.signature().clone())?;
    }

    for method in program.all_methods() {
        for callee in method.static_callees() {
            if !program.contains_method(&callee) {
                trace!("skipping call from {} to {}", method.signature(), callee);
                continue;
            }
            call_graph.add_call(method.signature().clone(), callee)?;
        }
    }

    debug!(
        "call graph with {} methods and {} calls",
        call_graph.methods().count(),
        call_graph.num_calls()
    );

    Ok(call_graph)
}
