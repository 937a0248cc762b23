//! Graphviz DOT output
//!
//! Embedded mode nests one `cluster_` subgraph per module inside its parent's
//! cluster. Sibling mode writes every module cluster at the top level, gives
//! each one an anchor node and links parent anchors to child anchors with
//! dashed edges.

use crate::RenderOptions;
use std::collections::HashMap;
use std::fmt::Write;
use tfviz_core::{Attributes, GraphModel, Module, ModuleId, NodeId};

/// Quote a DOT identifier.
///
/// Only the backslashes the reader would otherwise swallow are doubled, so
/// sequences such as `\n` keep their Graphviz meaning.
pub fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    let mut chars = value.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => quoted.push_str("\\\""),
            '\\' => match chars.peek() {
                None | Some('"') | Some('\\') => quoted.push_str("\\\\"),
                Some(_) => quoted.push('\\'),
            },
            c => quoted.push(c),
        }
    }
    quoted.push('"');
    quoted
}

/// Whether `value` is one balanced `<...>` HTML string, scanned the way the
/// reader scans it.
fn is_html_string(value: &str) -> bool {
    let mut depth = 0usize;
    for (i, c) in value.char_indices() {
        match c {
            '<' => depth += 1,
            '>' if depth == 0 => return false,
            '>' => {
                depth -= 1;
                if depth == 0 {
                    return i + 1 == value.len();
                }
            }
            _ if depth == 0 => return false,
            _ => {}
        }
    }
    false
}

/// An attribute value: HTML strings stay raw, everything else is quoted.
fn attr_value(value: &str, html: bool) -> String {
    if html && is_html_string(value) {
        value.to_string()
    } else {
        quote(value)
    }
}

/// Attribute names are plain words and stay unquoted when possible.
fn attr_key(key: &str) -> String {
    let mut chars = key.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if plain { key.to_string() } else { quote(key) }
}

fn write_indent(output: &mut String, level: usize) {
    for _ in 0..level {
        output.push('\t');
    }
}

fn write_attrs<'a>(
    output: &mut String,
    attrs: impl IntoIterator<Item = (&'a str, &'a str, bool)>,
) {
    let mut attrs = attrs.into_iter().peekable();
    if attrs.peek().is_none() {
        return;
    }
    output.push_str(" [");
    for (i, (key, value, html)) in attrs.enumerate() {
        if i > 0 {
            output.push_str(", ");
        }
        let _ = write!(output, "{} = {}", attr_key(key), attr_value(value, html));
    }
    output.push(']');
}

/// Incremental writer for a directed DOT graph.
pub struct DotWriter {
    output: String,
    indent: usize,
}

impl DotWriter {
    pub fn new(name: &str) -> Self {
        let mut output = String::with_capacity(4096);
        let _ = writeln!(output, "digraph {} {{", quote(name));
        DotWriter { output, indent: 1 }
    }

    /// Graph or cluster attribute statement.
    pub fn attr(&mut self, key: &str, value: &str) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = writeln!(self.output, "{} = {}", attr_key(key), quote(value));
        self
    }

    /// Node statement. `label` comes first, the other attributes keep their order.
    pub fn node(&mut self, id: &str, label: &str, attrs: &Attributes) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        self.output.push_str(&quote(id));
        let html = attrs.is_html("label") && attrs.get("label") == Some(label);
        let rest = attrs.entries().filter(|(key, _, _)| *key != "label");
        write_attrs(&mut self.output, std::iter::once(("label", label, html)).chain(rest));
        self.output.push('\n');
        self
    }

    pub fn edge(&mut self, from: &str, to: &str, attrs: &Attributes) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = write!(self.output, "{} -> {}", quote(from), quote(to));
        write_attrs(&mut self.output, attrs.entries());
        self.output.push('\n');
        self
    }

    pub fn start_cluster(&mut self, id: &str, label: &str) -> &mut Self {
        write_indent(&mut self.output, self.indent);
        let _ = writeln!(self.output, "subgraph {} {{", quote(&format!("cluster_{}", id)));
        self.indent += 1;
        self.attr("label", label)
    }

    pub fn end_cluster(&mut self) -> &mut Self {
        self.indent = self.indent.saturating_sub(1);
        write_indent(&mut self.output, self.indent);
        self.output.push_str("}\n");
        self
    }

    pub fn build(mut self) -> String {
        self.output.push_str("}\n");
        self.output
    }
}

struct DotRenderer<'m> {
    model: &'m GraphModel,
    writer: DotWriter,
}

impl<'m> DotRenderer<'m> {
    fn node(&mut self, id: NodeId) {
        let model = self.model;
        if let Some(node) = model.graph().node(id) {
            self.writer.node(&node.name, &node.label, &node.attrs);
        }
    }

    fn edges(&mut self, edges: impl IntoIterator<Item = tfviz_core::EdgeId>) {
        let model = self.model;
        let graph = model.graph();
        for id in edges {
            let Some(edge) = graph.edge(id) else { continue };
            let (Some(source), Some(target)) = (graph.node(edge.source), graph.node(edge.target))
            else {
                continue;
            };
            self.writer.edge(&source.name, &target.name, &edge.attrs);
        }
    }

    fn members(&mut self, module: &'m Module) {
        for &member in &module.members {
            self.node(member);
        }
    }

    /// Module cluster with its declaration, members, child clusters and edges.
    fn embedded(&mut self, id: ModuleId) {
        let model = self.model;
        let module = model.module(id);
        if !module.is_root() {
            self.writer.start_cluster(&module.address(), &module.name);
            if let Some(decl) = module.declared_by {
                self.node(decl);
            }
        }
        self.members(module);
        for &child in &module.children {
            self.embedded(child);
        }
        self.edges(module.edges.iter().copied());
        if !module.is_root() {
            self.writer.end_cluster();
        }
    }

    fn siblings(&mut self) {
        let model = self.model;
        self.members(model.root());

        let mut anchors: HashMap<ModuleId, String> = HashMap::with_capacity(model.module_count());
        let mut order = Vec::with_capacity(model.module_count());
        for id in model.walk(ModuleId::ROOT).into_iter().skip(1) {
            let module = model.module(id);
            self.writer.start_cluster(&module.address(), &module.name);
            let anchor = match module.declared_by.and_then(|decl| model.graph().node(decl)) {
                Some(decl) => {
                    self.writer.node(&decl.name, &decl.label, &decl.attrs);
                    decl.name.clone()
                }
                None => {
                    let address = module.address();
                    let attrs: Attributes = [("shape", "folder")].into_iter().collect();
                    self.writer.node(&address, &module.name, &attrs);
                    address
                }
            };
            self.members(module);
            self.writer.end_cluster();
            anchors.insert(id, anchor);
            order.push(id);
        }

        self.edges(model.graph().all_edges().map(|(id, _)| id));

        let dashed: Attributes = [("style", "dashed")].into_iter().collect();
        for id in order {
            let parent = model.parent(id).filter(|p| *p != ModuleId::ROOT);
            let Some(parent) = parent else { continue };
            if let (Some(parent_anchor), Some(anchor)) = (anchors.get(&parent), anchors.get(&id)) {
                self.writer.edge(parent_anchor, anchor, &dashed);
            }
        }
    }
}

/// Render the model as a DOT document named after `options.graph_name`.
pub fn render_dot(model: &GraphModel, options: &RenderOptions) -> String {
    let mut renderer = DotRenderer {
        model,
        writer: DotWriter::new(&options.graph_name),
    };
    if options.embed_modules {
        renderer.embedded(ModuleId::ROOT);
    } else {
        renderer.siblings();
    }
    tracing::debug!(
        "Wrote DOT graph {} ({} modules, embed_modules = {})",
        options.graph_name,
        model.module_count() - 1,
        options.embed_modules
    );
    renderer.writer.build()
}
