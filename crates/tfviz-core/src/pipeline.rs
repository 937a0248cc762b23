//! Reader → junk filter → exclusion filter → hierarchy builder

use crate::config::PipelineConfig;
use crate::dot::{parse_dot, read_dot};
use crate::error::Result;
use crate::filter::{ExclusionFilter, remove_junk};
use crate::graph::Graph;
use crate::hierarchy::{GraphModel, build_hierarchy};
use std::io::Read;

/// Load a `terraform graph` DOT stream into a [`GraphModel`].
///
/// Exclusion patterns are compiled before the input is read, so a bad pattern
/// fails the run without touching the input.
#[tracing::instrument(level = "debug", skip_all, fields(keep_junk = config.keep_junk))]
pub fn load_graph<R: Read>(input: R, config: &PipelineConfig) -> Result<GraphModel> {
    let exclusion = ExclusionFilter::new(&config.exclude)?;
    let graph = read_dot(input, &config.junk_rules)?;
    Ok(transform(graph, &exclusion, config))
}

/// Same as [`load_graph`] for in-memory DOT source.
pub fn load_graph_str(source: &str, config: &PipelineConfig) -> Result<GraphModel> {
    let exclusion = ExclusionFilter::new(&config.exclude)?;
    let graph = parse_dot(source, &config.junk_rules)?;
    Ok(transform(graph, &exclusion, config))
}

fn transform(mut graph: Graph, exclusion: &ExclusionFilter, config: &PipelineConfig) -> GraphModel {
    remove_junk(&mut graph, config.keep_junk);
    exclusion.apply(&mut graph);
    build_hierarchy(graph)
}
