//! Module hierarchy rebuilt from resource addresses
//!
//! `terraform graph` output is flat: module nesting only shows in identifiers
//! such as `module.net.module.sub.aws_subnet.s1`. The builder turns those paths
//! into an arena of [`Module`] records owned by the [`GraphModel`]. Parents own
//! their children by index; a child→parent map answers upward queries.

use crate::address::{module_address, parse_address};
use crate::graph::Graph;
use crate::model::{EdgeId, NodeId, NodeKind};
use std::collections::HashMap;

/// Index of a module in the model's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleId(pub usize);

impl ModuleId {
    pub const ROOT: ModuleId = ModuleId(0);
}

/// One level of module nesting.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub id: ModuleId,
    /// Last path segment, empty for the root module.
    pub name: String,
    /// Module names from the outermost one down to this one.
    pub path: Vec<String>,
    pub children: Vec<ModuleId>,
    /// Nodes directly inside this module: resources, kept junk and any
    /// declaring node after the first.
    pub members: Vec<NodeId>,
    /// Edges whose nearest common ancestor is this module.
    pub edges: Vec<EdgeId>,
    /// Input node that declared this module call, if the graph had one.
    pub declared_by: Option<NodeId>,
}

impl Module {
    fn new(id: ModuleId, path: Vec<String>) -> Self {
        Module {
            id,
            name: path.last().cloned().unwrap_or_default(),
            path,
            children: Vec::new(),
            members: Vec::new(),
            edges: Vec::new(),
            declared_by: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.id == ModuleId::ROOT
    }

    /// `module.a.module.b` style address; empty for the root.
    pub fn address(&self) -> String {
        module_address(&self.path)
    }
}

/// The normalized graph handed to renderers: flat tables plus the module tree.
#[derive(Debug)]
pub struct GraphModel {
    graph: Graph,
    modules: Vec<Module>,
    parents: HashMap<ModuleId, ModuleId>,
    by_path: HashMap<Vec<String>, ModuleId>,
    /// Module each node sits in. A module node sits in the module it declares.
    location: HashMap<NodeId, ModuleId>,
    local_names: HashMap<NodeId, String>,
}

impl GraphModel {
    fn new(graph: Graph) -> Self {
        let root = Module::new(ModuleId::ROOT, Vec::new());
        let mut by_path = HashMap::new();
        by_path.insert(Vec::new(), ModuleId::ROOT);
        GraphModel {
            graph,
            modules: vec![root],
            parents: HashMap::new(),
            by_path,
            location: HashMap::new(),
            local_names: HashMap::new(),
        }
    }

    /// Flat node and edge tables.
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn root(&self) -> &Module {
        &self.modules[ModuleId::ROOT.0]
    }

    pub fn module(&self, id: ModuleId) -> &Module {
        &self.modules[id.0]
    }

    /// All modules, parents before children, root first.
    pub fn modules(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter()
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn parent(&self, id: ModuleId) -> Option<ModuleId> {
        self.parents.get(&id).copied()
    }

    pub fn find_module(&self, path: &[&str]) -> Option<ModuleId> {
        let key: Vec<String> = path.iter().map(|s| s.to_string()).collect();
        self.by_path.get(&key).copied()
    }

    /// Module a node belongs to; the root for unknown ids.
    pub fn module_of(&self, node: NodeId) -> ModuleId {
        self.location.get(&node).copied().unwrap_or(ModuleId::ROOT)
    }

    /// Display name of a node relative to its module, e.g. `aws_subnet.s1`.
    pub fn local_name(&self, node: NodeId) -> Option<&str> {
        self.local_names.get(&node).map(String::as_str)
    }

    /// `id`, its parent, ..., the root.
    pub fn ancestors(&self, id: ModuleId) -> Vec<ModuleId> {
        let mut chain = vec![id];
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            chain.push(parent);
            current = parent;
        }
        chain
    }

    pub fn nearest_common_ancestor(&self, a: ModuleId, b: ModuleId) -> ModuleId {
        let above_a = self.ancestors(a);
        self.ancestors(b)
            .into_iter()
            .find(|m| above_a.contains(m))
            .unwrap_or(ModuleId::ROOT)
    }

    /// Modules in depth-first pre-order starting at `from`.
    pub fn walk(&self, from: ModuleId) -> Vec<ModuleId> {
        let mut order = Vec::new();
        let mut stack = vec![from];
        while let Some(id) = stack.pop() {
            order.push(id);
            stack.extend(self.module(id).children.iter().rev());
        }
        order
    }

    fn ensure_module(&mut self, path: &[&str]) -> ModuleId {
        let mut current = ModuleId::ROOT;
        for depth in 1..=path.len() {
            let key: Vec<String> = path[..depth].iter().map(|s| s.to_string()).collect();
            current = match self.by_path.get(&key) {
                Some(&id) => id,
                None => {
                    let id = ModuleId(self.modules.len());
                    tracing::trace!("New module {}", module_address(&key));
                    self.modules.push(Module::new(id, key.clone()));
                    self.modules[current.0].children.push(id);
                    self.parents.insert(id, current);
                    self.by_path.insert(key, id);
                    id
                }
            };
        }
        current
    }
}

/// Build the module tree from the filtered flat graph.
#[tracing::instrument(level = "debug", skip_all)]
pub fn build_hierarchy(graph: Graph) -> GraphModel {
    let nodes: Vec<(NodeId, NodeKind, String, String)> = graph
        .all_nodes()
        .map(|(id, n)| (id, n.kind, n.address().to_string(), n.label.clone()))
        .collect();
    let mut model = GraphModel::new(graph);

    for (id, kind, address, label) in nodes {
        let parsed = parse_address(&address);
        match kind {
            NodeKind::Junk => {
                model.modules[ModuleId::ROOT.0].members.push(id);
                model.location.insert(id, ModuleId::ROOT);
                model.local_names.insert(id, label);
            }
            NodeKind::Module if parsed.is_module() => {
                let module = model.ensure_module(&parsed.modules);
                let entry = &mut model.modules[module.0];
                if entry.declared_by.is_none() {
                    entry.declared_by = Some(id);
                } else {
                    // Later declarations render as ordinary nodes inside the module.
                    tracing::debug!("Module {} declared again by {:?}", address, id);
                    entry.members.push(id);
                }
                model.location.insert(id, module);
                model
                    .local_names
                    .insert(id, parsed.modules.last().copied().unwrap_or_default().to_string());
            }
            _ => {
                let module = model.ensure_module(&parsed.modules);
                model.modules[module.0].members.push(id);
                model.location.insert(id, module);
                let local = parsed.resource.unwrap_or(address.as_str()).to_string();
                model.local_names.insert(id, local);
            }
        }
    }

    let edges: Vec<(EdgeId, NodeId, NodeId)> = model
        .graph
        .all_edges()
        .map(|(id, e)| (id, e.source, e.target))
        .collect();
    for (id, source, target) in edges {
        let owner = model.nearest_common_ancestor(model.module_of(source), model.module_of(target));
        model.modules[owner.0].edges.push(id);
    }

    tracing::debug!(
        "Built {} modules over {} nodes and {} edges",
        model.module_count() - 1,
        model.graph.node_count(),
        model.graph.edge_count()
    );
    model
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{GraphEdge, GraphNode};

    fn model_of(nodes: &[(&str, NodeKind)], edges: &[(&str, &str)]) -> GraphModel {
        let mut graph = Graph::new();
        for (name, kind) in nodes {
            graph.add_node(GraphNode::new(*name, *kind));
        }
        for (from, to) in edges {
            let source = graph.find_node(from).unwrap();
            let target = graph.find_node(to).unwrap();
            graph.add_edge(GraphEdge::new(source, target));
        }
        build_hierarchy(graph)
    }

    fn node(model: &GraphModel, name: &str) -> NodeId {
        model.graph().find_node(name).unwrap()
    }

    #[test]
    fn test_nested_module_placement() {
        let model = model_of(
            &[
                ("module.net.module.sub.aws_subnet.s1", NodeKind::Resource),
                ("aws_vpc.v1", NodeKind::Resource),
            ],
            &[],
        );

        let net = model.find_module(&["net"]).unwrap();
        let sub = model.find_module(&["net", "sub"]).unwrap();
        assert_eq!(model.parent(net), Some(ModuleId::ROOT));
        assert_eq!(model.parent(sub), Some(net));
        assert_eq!(model.module(sub).name, "sub");
        assert_eq!(model.module(sub).address(), "module.net.module.sub");
        assert_eq!(model.root().children, vec![net]);
        assert_eq!(model.module(net).children, vec![sub]);

        let s1 = node(&model, "module.net.module.sub.aws_subnet.s1");
        let v1 = node(&model, "aws_vpc.v1");
        assert_eq!(model.module(sub).members, vec![s1]);
        assert_eq!(model.root().members, vec![v1]);
        assert!(model.module(net).members.is_empty());
        assert_eq!(model.local_name(s1), Some("aws_subnet.s1"));
        assert_eq!(model.local_name(v1), Some("aws_vpc.v1"));
    }

    #[test]
    fn test_module_names_are_case_sensitive() {
        let model = model_of(
            &[
                ("module.Net.aws_a.x", NodeKind::Resource),
                ("module.net.aws_a.y", NodeKind::Resource),
            ],
            &[],
        );
        assert_eq!(model.module_count(), 3);
        assert_ne!(model.find_module(&["Net"]), model.find_module(&["net"]));
    }

    #[test]
    fn test_module_node_declares_module() {
        let model = model_of(
            &[
                ("[root] module.app (expand)", NodeKind::Module),
                ("[root] module.app.aws_instance.i (expand)", NodeKind::Resource),
            ],
            &[],
        );
        let app = model.find_module(&["app"]).unwrap();
        let decl = node(&model, "[root] module.app (expand)");
        assert_eq!(model.module(app).declared_by, Some(decl));
        assert_eq!(model.module(app).members.len(), 1);
        assert_eq!(model.module_of(decl), app);
        assert_eq!(model.local_name(decl), Some("app"));
    }

    #[test]
    fn test_second_declaration_becomes_member() {
        let model = model_of(
            &[
                ("module.a", NodeKind::Module),
                ("[root] module.a (expand)", NodeKind::Module),
                ("aws_x.two", NodeKind::Resource),
            ],
            &[("[root] module.a (expand)", "aws_x.two")],
        );
        let a = model.find_module(&["a"]).unwrap();
        let first = node(&model, "module.a");
        let second = node(&model, "[root] module.a (expand)");
        assert_eq!(model.module(a).declared_by, Some(first));
        assert_eq!(model.module(a).members, vec![second]);
        assert_eq!(model.module_of(second), a);
        assert_eq!(model.root().edges.len(), 1);
    }

    #[test]
    fn test_unparseable_address_is_top_level() {
        let model = model_of(&[("module..broken", NodeKind::Resource)], &[]);
        assert_eq!(model.module_count(), 1);
        assert_eq!(model.root().members.len(), 1);
    }

    #[test]
    fn test_edges_go_to_nearest_common_ancestor() {
        let model = model_of(
            &[
                ("module.a.module.b.x.one", NodeKind::Resource),
                ("module.a.module.c.x.two", NodeKind::Resource),
                ("module.a.module.b.x.three", NodeKind::Resource),
                ("top.level", NodeKind::Resource),
            ],
            &[
                ("module.a.module.b.x.one", "module.a.module.c.x.two"),
                ("module.a.module.b.x.one", "module.a.module.b.x.three"),
                ("top.level", "module.a.module.b.x.one"),
            ],
        );
        let a = model.find_module(&["a"]).unwrap();
        let b = model.find_module(&["a", "b"]).unwrap();
        assert_eq!(model.module(a).edges.len(), 1);
        assert_eq!(model.module(b).edges.len(), 1);
        assert_eq!(model.root().edges.len(), 1);
    }

    #[test]
    fn test_junk_stays_at_root() {
        let model = model_of(
            &[("[root] module.m (close)", NodeKind::Junk), ("A", NodeKind::Resource)],
            &[("[root] module.m (close)", "A")],
        );
        assert_eq!(model.module_count(), 1);
        assert_eq!(model.root().members.len(), 2);
        assert_eq!(model.root().edges.len(), 1);
    }

    #[test]
    fn test_walk_is_preorder() {
        let model = model_of(
            &[
                ("module.a.module.b.r.x", NodeKind::Resource),
                ("module.c.r.y", NodeKind::Resource),
                ("module.a.r.z", NodeKind::Resource),
            ],
            &[],
        );
        let names: Vec<_> = model
            .walk(ModuleId::ROOT)
            .into_iter()
            .map(|id| model.module(id).address())
            .collect();
        assert_eq!(names, vec!["", "module.a", "module.a.module.b", "module.c"]);
    }
}
