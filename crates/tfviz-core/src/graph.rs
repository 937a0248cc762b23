//! Graph wrapper using petgraph::StableDiGraph with name lookup

use crate::model::*;
use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};
use petgraph::visit::EdgeRef;
use std::collections::HashMap;

/// The flat dependency graph, a directed multigraph with stable node and edge indices.
///
/// Node names are unique. Removing a node removes every edge touching it.
pub struct Graph {
    inner: StableDiGraph<GraphNode, GraphEdge>,
    by_name: HashMap<String, NodeId>,
    /// Name of the graph as declared in the DOT header, if any.
    pub name: Option<String>,
}

impl std::fmt::Debug for Graph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Graph")
            .field("name", &self.name)
            .field("node_count", &self.inner.node_count())
            .field("edge_count", &self.inner.edge_count())
            .finish()
    }
}

fn node_index(id: NodeId) -> NodeIndex {
    NodeIndex::new(id.0 as usize)
}

fn node_id(idx: NodeIndex) -> NodeId {
    NodeId(idx.index() as u32)
}

impl Graph {
    pub fn new() -> Self {
        Graph {
            inner: StableDiGraph::new(),
            by_name: HashMap::new(),
            name: None,
        }
    }

    /// Add a node to the graph. Returns its NodeId.
    ///
    /// If a node with the same name exists, the new attributes are merged into
    /// it and the existing id is returned. Kind and label of the first
    /// declaration are kept unless the new declaration carries a label.
    pub fn add_node(&mut self, node: GraphNode) -> NodeId {
        if let Some(&id) = self.by_name.get(&node.name) {
            if let Some(existing) = self.inner.node_weight_mut(node_index(id)) {
                if node.attrs.get("label").is_some() {
                    existing.label = node.label;
                }
                existing.attrs.extend(node.attrs);
            }
            return id;
        }
        let name = node.name.clone();
        let id = node_id(self.inner.add_node(node));
        self.by_name.insert(name, id);
        id
    }

    /// Add an edge. Returns `None` when an endpoint is not in the graph.
    pub fn add_edge(&mut self, edge: GraphEdge) -> Option<EdgeId> {
        let source = node_index(edge.source);
        let target = node_index(edge.target);
        if !self.inner.contains_node(source) || !self.inner.contains_node(target) {
            return None;
        }
        let idx = self.inner.add_edge(source, target, edge);
        Some(EdgeId(idx.index() as u32))
    }

    /// Get a node by ID.
    pub fn node(&self, id: NodeId) -> Option<&GraphNode> {
        self.inner.node_weight(node_index(id))
    }

    /// Get a mutable node by ID.
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut GraphNode> {
        self.inner.node_weight_mut(node_index(id))
    }

    /// Get an edge by ID.
    pub fn edge(&self, id: EdgeId) -> Option<&GraphEdge> {
        self.inner.edge_weight(EdgeIndex::new(id.0 as usize))
    }

    /// Find a node by its DOT identifier.
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Iterate over all nodes in insertion order.
    pub fn all_nodes(&self) -> impl Iterator<Item = (NodeId, &GraphNode)> {
        self.inner
            .node_indices()
            .filter_map(move |idx| self.inner.node_weight(idx).map(|n| (node_id(idx), n)))
    }

    /// Iterate over all edges in insertion order.
    pub fn all_edges(&self) -> impl Iterator<Item = (EdgeId, &GraphEdge)> {
        self.inner.edge_indices().filter_map(move |idx| {
            self.inner
                .edge_weight(idx)
                .map(|e| (EdgeId(idx.index() as u32), e))
        })
    }

    /// Get all outgoing edges from a node.
    pub fn edges_from(&self, source: NodeId) -> impl Iterator<Item = &GraphEdge> {
        self.inner
            .edges_directed(node_index(source), Direction::Outgoing)
            .filter_map(move |edge_ref| self.inner.edge_weight(edge_ref.id()))
    }

    /// Get all incoming edges to a node.
    pub fn edges_to(&self, target: NodeId) -> impl Iterator<Item = &GraphEdge> {
        self.inner
            .edges_directed(node_index(target), Direction::Incoming)
            .filter_map(move |edge_ref| self.inner.edge_weight(edge_ref.id()))
    }

    /// Check if an edge exists between two nodes.
    pub fn has_edge_between(&self, source: NodeId, target: NodeId) -> bool {
        self.edges_from(source).any(|e| e.target == target)
    }

    /// Get all nodes of a specific kind.
    pub fn nodes_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = NodeId> + '_ {
        self.all_nodes()
            .filter(move |(_, n)| n.kind == kind)
            .map(|(id, _)| id)
    }

    /// Remove a node and all its edges.
    pub fn remove_node(&mut self, id: NodeId) -> Option<GraphNode> {
        let node = self.inner.remove_node(node_index(id))?;
        self.by_name.remove(&node.name);
        Some(node)
    }

    /// Remove every node for which `remove` returns true, with their edges.
    /// Returns the number of removed nodes.
    pub fn remove_nodes_where<F>(&mut self, mut remove: F) -> usize
    where
        F: FnMut(&GraphNode) -> bool,
    {
        let doomed: Vec<NodeId> = self
            .all_nodes()
            .filter(|(_, n)| remove(*n))
            .map(|(id, _)| id)
            .collect();
        for id in &doomed {
            self.remove_node(*id);
        }
        doomed.len()
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
