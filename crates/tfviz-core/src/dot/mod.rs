//! DOT reader for `terraform graph` output
//!
//! Only the subset of the language that Terraform (and tfviz itself) writes is
//! understood: node and edge statements with attribute lists, graph attribute
//! assignments, default attribute statements and nested subgraphs, which are
//! flattened into the enclosing graph.

mod lexer;
mod parser;

use crate::error::{Error, Result};
use crate::filter::JunkRules;
use crate::graph::Graph;
use std::io::Read;

pub use parser::classify;

/// Parse DOT source into a flat graph, tagging junk nodes with `junk`.
#[tracing::instrument(level = "debug", skip_all)]
pub fn parse_dot(source: &str, junk: &JunkRules) -> Result<Graph> {
    let graph = parser::Parser::new(source, junk)?.parse()?;
    tracing::debug!(
        "Parsed graph {:?}: {} nodes, {} edges",
        graph.name,
        graph.node_count(),
        graph.edge_count()
    );
    Ok(graph)
}

/// Read the whole stream, then parse it.
pub fn read_dot<R: Read>(mut reader: R, junk: &JunkRules) -> Result<Graph> {
    let mut source = String::new();
    reader
        .read_to_string(&mut source)
        .map_err(|e| Error::io("cannot read the DOT input", e))?;
    parse_dot(&source, junk)
}
