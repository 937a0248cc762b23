//! Renderers turning a [`GraphModel`] into DOT, Cytoscape.js JSON or HTML
//!
//! The set of output formats is closed: [`OutputType`] selects one of the
//! renderers and [`render`] dispatches to it. Renderers only read the model.

pub mod assets;
pub mod cytoscape;
pub mod dot;
pub mod html;

#[cfg(test)]
mod tests;

use std::fmt;
use std::str::FromStr;
use tfviz_core::GraphModel;
use thiserror::Error;

pub use cytoscape::{Element, ElementData, Group, build_elements};

/// Failure while producing the output bytes.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The HTML template is missing, malformed or uses unknown placeholders.
    #[error("template error: {0}")]
    Template(String),

    #[error("cannot serialize the graph elements")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Core(#[from] tfviz_core::Error),
}

pub type Result<T> = std::result::Result<T, RenderError>;

/// Output format selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputType {
    /// Cytoscape.js element list as JSON.
    CytoJson,
    /// HTML page embedding the elements and Cytoscape.js.
    #[default]
    CytoHtml,
    /// Cleaned-up Graphviz DOT.
    Graphviz,
}

impl OutputType {
    pub const ALL: [OutputType; 3] = [OutputType::CytoJson, OutputType::CytoHtml, OutputType::Graphviz];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputType::CytoJson => "cyto-json",
            OutputType::CytoHtml => "cyto-html",
            OutputType::Graphviz => "graphviz",
        }
    }
}

impl fmt::Display for OutputType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputType {
    type Err = tfviz_core::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        OutputType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| {
                let valid: Vec<_> = OutputType::ALL.iter().map(|t| t.as_str()).collect();
                tfviz_core::Error::Config(format!(
                    "invalid output type `{}`, expected one of: {}",
                    s,
                    valid.join(", ")
                ))
            })
    }
}

/// Rendering choices made once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub output_type: OutputType,
    pub graph_name: String,
    /// Nest modules inside their parent; otherwise modules are siblings linked
    /// parent → child.
    pub embed_modules: bool,
    /// Custom HTML template source. `None` uses the built-in one.
    pub html_template: Option<String>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            output_type: OutputType::default(),
            graph_name: "terraform".to_string(),
            embed_modules: true,
            html_template: None,
        }
    }
}

/// Render the model in the format selected by `options.output_type`.
#[tracing::instrument(level = "debug", skip_all, fields(output_type = %options.output_type))]
pub fn render(model: &GraphModel, options: &RenderOptions) -> Result<Vec<u8>> {
    let bytes = match options.output_type {
        OutputType::CytoJson => cytoscape::render_json(model, options)?,
        OutputType::CytoHtml => html::render_html(model, options)?,
        OutputType::Graphviz => dot::render_dot(model, options).into_bytes(),
    };
    tracing::debug!("Rendered {} bytes", bytes.len());
    Ok(bytes)
}
