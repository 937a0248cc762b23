//! tfviz core: DOT reader, graph model, filters and module hierarchy

pub mod address;
pub mod config;
pub mod dot;
pub mod error;
pub mod filter;
pub mod graph;
pub mod hierarchy;
pub mod model;
pub mod pipeline;


#[cfg(test)]
pub mod test_utils;

pub use address::{ParsedAddress, module_address, parse_address};
pub use config::{FileConfig, PipelineConfig};
pub use dot::{classify, parse_dot, read_dot};
pub use error::{Error, Result};
pub use filter::{DEFAULT_JUNK_PATTERNS, ExclusionFilter, JunkRules, remove_junk};
pub use graph::Graph;
pub use hierarchy::{GraphModel, Module, ModuleId, build_hierarchy};
pub use model::{Attributes, EdgeId, GraphEdge, GraphNode, NodeId, NodeKind, resource_address};
pub use pipeline::{load_graph, load_graph_str};
