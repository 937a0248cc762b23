//! Core data structures for the infrastructure graph

use serde::{Deserialize, Serialize};

/// Stable handle of a node inside a [`crate::Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct NodeId(pub u32);

/// Stable handle of an edge inside a [`crate::Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct EdgeId(pub u32);

/// What a node stands for once classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// A real infrastructure object: resource, data source, variable, output...
    Resource,
    /// A module call (`module.<name>` address with nothing after it).
    Module,
    /// Generator bookkeeping: root placeholder, providers, meta nodes, close nodes.
    Junk,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Resource => "resource",
            NodeKind::Module => "module",
            NodeKind::Junk => "junk",
        }
    }
}

/// One `key = value` pair. `html` marks values written as `<...>` HTML strings.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Attr {
    key: String,
    value: String,
    html: bool,
}

/// Insertion-ordered DOT attribute bag. Values are kept verbatim; an HTML
/// string keeps its outer angle brackets and is flagged as such.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<Attr>);

impl Attributes {
    pub fn new() -> Self {
        Attributes(Vec::new())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }

    /// Whether `key` holds an HTML string.
    pub fn is_html(&self, key: &str) -> bool {
        self.0.iter().any(|a| a.key == key && a.html)
    }

    /// Set `key`, replacing an existing value in place so the original order survives.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.set(key.into(), value.into(), false);
    }

    /// Set `key` to an HTML string such as `<<b>x</b>>`.
    pub fn insert_html(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.set(key.into(), value.into(), true);
    }

    fn set(&mut self, key: String, value: String, html: bool) {
        match self.0.iter_mut().find(|a| a.key == key) {
            Some(slot) => {
                slot.value = value;
                slot.html = html;
            }
            None => self.0.push(Attr { key, value, html }),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let pos = self.0.iter().position(|a| a.key == key)?;
        Some(self.0.remove(pos).value)
    }

    /// Merge `other` into `self`; later values win.
    pub fn extend(&mut self, other: Attributes) {
        for attr in other.0 {
            self.set(attr.key, attr.value, attr.html);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|a| (a.key.as_str(), a.value.as_str()))
    }

    /// Like [`Attributes::iter`], with the HTML flag of each value.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str, bool)> {
        self.0
            .iter()
            .map(|a| (a.key.as_str(), a.value.as_str(), a.html))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attrs = Attributes::new();
        for (k, v) in iter {
            attrs.insert(k, v);
        }
        attrs
    }
}

/// A single node of the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphNode {
    /// Identifier exactly as written in the DOT source.
    pub name: String,
    pub label: String,
    pub kind: NodeKind,
    /// Every attribute from the DOT source, `label` included.
    pub attrs: Attributes,
}

impl GraphNode {
    /// The label defaults to the address, or to the identifier when the
    /// address is empty (`[root]`).
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        let name = name.into();
        let label = match resource_address(&name) {
            "" => name.clone(),
            address => address.to_string(),
        };
        GraphNode {
            name,
            label,
            kind,
            attrs: Attributes::new(),
        }
    }

    /// Terraform address of this node, see [`resource_address`].
    pub fn address(&self) -> &str {
        resource_address(&self.name)
    }
}

/// A directed dependency edge.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphEdge {
    pub source: NodeId,
    pub target: NodeId,
    pub attrs: Attributes,
}

impl GraphEdge {
    pub fn new(source: NodeId, target: NodeId) -> Self {
        GraphEdge {
            source,
            target,
            attrs: Attributes::new(),
        }
    }
}

const ROOT_MARKER: &str = "[root]";

/// Strip the `[root] ` prefix and a trailing ` (...)` annotation from a
/// `terraform graph` identifier.
///
/// `[root] module.net.aws_subnet.s1 (expand)` becomes `module.net.aws_subnet.s1`.
/// Identifiers without these decorations are returned unchanged.
pub fn resource_address(identifier: &str) -> &str {
    let mut address = identifier.trim();
    if let Some(rest) = address.strip_prefix(ROOT_MARKER) {
        address = rest.trim_start();
    }
    if address.ends_with(')') {
        if let Some(open) = address.rfind(" (") {
            address = address[..open].trim_end();
        }
    }
    address
}
