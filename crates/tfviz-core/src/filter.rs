//! Junk and exclusion filters applied to the flat graph

use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::model::NodeKind;
use regex::Regex;

/// Identifier patterns of the bookkeeping nodes emitted by `terraform graph`.
pub const DEFAULT_JUNK_PATTERNS: &[&str] = &[
    r"^\[root\]\s*(root)?$",
    r"^(\[root\]\s+)?root$",
    r"^(\[root\]\s+)?meta\.",
    r"^(\[root\]\s+)?provider(\[|\.)",
    r"\(close\)$",
];

fn compile(patterns: &[impl AsRef<str>]) -> Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            let pattern = p.as_ref();
            Regex::new(pattern).map_err(|source| Error::Pattern {
                pattern: pattern.to_string(),
                source,
            })
        })
        .collect()
}

/// Ordered set of patterns that mark a node identifier as generator junk.
#[derive(Debug, Clone)]
pub struct JunkRules {
    patterns: Vec<Regex>,
}

impl JunkRules {
    /// Build rules from explicit patterns only.
    pub fn new(patterns: &[impl AsRef<str>]) -> Result<Self> {
        Ok(JunkRules {
            patterns: compile(patterns)?,
        })
    }

    /// Append more patterns after the current ones.
    pub fn extend(&mut self, patterns: &[impl AsRef<str>]) -> Result<()> {
        self.patterns.extend(compile(patterns)?);
        Ok(())
    }

    pub fn is_junk(&self, identifier: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(identifier))
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

impl Default for JunkRules {
    fn default() -> Self {
        JunkRules {
            patterns: DEFAULT_JUNK_PATTERNS
                .iter()
                .filter_map(|p| Regex::new(p).ok())
                .collect(),
        }
    }
}

/// Remove every junk node and its edges unless `keep` is set.
/// Returns the number of removed nodes.
#[tracing::instrument(level = "debug", skip(graph))]
pub fn remove_junk(graph: &mut Graph, keep: bool) -> usize {
    if keep {
        tracing::debug!("Keeping junk nodes");
        return 0;
    }
    let removed = graph.remove_nodes_where(|n| n.kind == NodeKind::Junk);
    tracing::debug!(
        "Removed {} junk nodes, {} nodes and {} edges left",
        removed,
        graph.node_count(),
        graph.edge_count()
    );
    removed
}

/// Drops nodes whose identifier matches any of the user supplied patterns.
#[derive(Debug, Clone, Default)]
pub struct ExclusionFilter {
    patterns: Vec<Regex>,
}

impl ExclusionFilter {
    /// Compile every pattern up front; the first invalid one aborts.
    pub fn new(patterns: &[impl AsRef<str>]) -> Result<Self> {
        Ok(ExclusionFilter {
            patterns: compile(patterns)?,
        })
    }

    pub fn is_excluded(&self, identifier: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(identifier))
    }

    /// Returns the number of removed nodes.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn apply(&self, graph: &mut Graph) -> usize {
        if self.patterns.is_empty() {
            return 0;
        }
        let removed = graph.remove_nodes_where(|n| self.is_excluded(&n.name));
        tracing::debug!(
            "Excluded {} nodes using {} patterns",
            removed,
            self.patterns.len()
        );
        removed
    }
}
