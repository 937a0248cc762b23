//! Cytoscape.js element list
//!
//! Modules become compound nodes. Embedded mode nests module elements through
//! their `parent`; sibling mode leaves modules unparented and adds a
//! `module-link` edge from each parent module to each child module. Resources
//! always point at the module that contains them.

use crate::{RenderOptions, Result};
use serde::{Deserialize, Serialize};
use tfviz_core::{GraphModel, Module, ModuleId, NodeId, NodeKind};

pub const MODULE_TYPE: &str = "module";
pub const MODULE_LINK_EDGE_TYPE: &str = "module-link";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Group {
    Nodes,
    Edges,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeData {
    pub id: String,
    pub source: String,
    pub target: String,
    /// Only synthetic edges carry a type.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ElementData {
    Edge(EdgeData),
    Node(NodeData),
}

/// One entry of the Cytoscape.js `elements` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub group: Group,
    pub data: ElementData,
}

impl Element {
    fn node(id: String, label: String, kind: &str, parent: Option<String>) -> Self {
        Element {
            group: Group::Nodes,
            data: ElementData::Node(NodeData {
                id,
                label,
                kind: kind.to_string(),
                parent,
            }),
        }
    }

    fn edge(id: String, source: String, target: String, kind: Option<&str>) -> Self {
        Element {
            group: Group::Edges,
            data: ElementData::Edge(EdgeData {
                id,
                source,
                target,
                kind: kind.map(str::to_string),
            }),
        }
    }

    pub fn id(&self) -> &str {
        match &self.data {
            ElementData::Node(n) => &n.id,
            ElementData::Edge(e) => &e.id,
        }
    }
}

/// Element id of a module: its declaring node's identifier, or its address.
pub fn module_element_id(model: &GraphModel, module: &Module) -> String {
    module
        .declared_by
        .and_then(|id| model.graph().node(id))
        .map(|n| n.name.clone())
        .unwrap_or_else(|| module.address())
}

/// Element id of the container of `module`, `None` for the root.
fn container_id(model: &GraphModel, module: ModuleId) -> Option<String> {
    let module = model.module(module);
    (!module.is_root()).then(|| module_element_id(model, module))
}

/// Nodes keep their DOT identifier as element id. A declaring node therefore
/// shares its id with the module element it stands for.
fn node_element_id(model: &GraphModel, node: NodeId) -> Option<String> {
    model.graph().node(node).map(|n| n.name.clone())
}

/// Build the ordered element list: modules in pre-order, each followed by its
/// members, then dependency edges, then module links in sibling mode.
pub fn build_elements(model: &GraphModel, embed_modules: bool) -> Vec<Element> {
    let mut elements = Vec::new();

    for module_id in model.walk(ModuleId::ROOT) {
        let module = model.module(module_id);
        if !module.is_root() {
            let parent = match model.parent(module_id) {
                Some(parent) if embed_modules => container_id(model, parent),
                _ => None,
            };
            elements.push(Element::node(
                module_element_id(model, module),
                module.name.clone(),
                MODULE_TYPE,
                parent,
            ));
        }

        for &member in &module.members {
            let Some(node) = model.graph().node(member) else {
                continue;
            };
            let label = model.local_name(member).unwrap_or(&node.label).to_string();
            let kind = match node.kind {
                NodeKind::Junk => NodeKind::Junk.as_str(),
                _ => NodeKind::Resource.as_str(),
            };
            elements.push(Element::node(
                node.name.clone(),
                label,
                kind,
                container_id(model, module_id),
            ));
        }
    }

    for (index, (_, edge)) in model.graph().all_edges().enumerate() {
        let (Some(source), Some(target)) = (
            node_element_id(model, edge.source),
            node_element_id(model, edge.target),
        ) else {
            continue;
        };
        elements.push(Element::edge(format!("e{}", index), source, target, None));
    }

    if !embed_modules {
        let mut links = 0;
        for module in model.modules() {
            let Some(parent) = model.parent(module.id).and_then(|p| container_id(model, p)) else {
                continue;
            };
            elements.push(Element::edge(
                format!("module-link-{}", links),
                parent,
                module_element_id(model, module),
                Some(MODULE_LINK_EDGE_TYPE),
            ));
            links += 1;
        }
    }

    tracing::debug!(
        "Built {} Cytoscape elements (embed_modules = {})",
        elements.len(),
        embed_modules
    );
    elements
}

/// Pretty printed JSON array of elements.
pub fn render_json(model: &GraphModel, options: &RenderOptions) -> Result<Vec<u8>> {
    let elements = build_elements(model, options.embed_modules);
    let mut json = serde_json::to_vec_pretty(&elements)?;
    json.push(b'\n');
    Ok(json)
}
