//! HTML page around the Cytoscape.js elements
//!
//! Templates are plain HTML with `{{ name }}` placeholders. Known names are
//! `graph_name`, inserted HTML-escaped, and `graph_elements`, inserted as raw
//! JSON. `graph_elements` is mandatory.

use crate::{RenderError, RenderOptions, Result, assets, cytoscape};
use regex::Regex;
use tfviz_core::GraphModel;

const PLACEHOLDER: &str = r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}";

pub const GRAPH_NAME: &str = "graph_name";
pub const GRAPH_ELEMENTS: &str = "graph_elements";

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// JSON may contain `</script>` inside labels.
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/")
}

/// Fill `template` with the graph name and the element JSON.
pub fn render_template(template: &str, graph_name: &str, elements_json: &str) -> Result<String> {
    let placeholder =
        Regex::new(PLACEHOLDER).map_err(|e| RenderError::Template(e.to_string()))?;

    let mut output = String::with_capacity(template.len() + elements_json.len());
    let mut last = 0;
    let mut has_elements = false;

    while let Some(open) = template[last..].find("{{").map(|i| i + last) {
        let captures = placeholder
            .captures_at(template, open)
            .filter(|c| c.get(0).is_some_and(|m| m.start() == open))
            .ok_or_else(|| {
                RenderError::Template(format!(
                    "unclosed or malformed placeholder at line {}",
                    line_of(template, open)
                ))
            })?;
        let end = open + captures[0].len();
        let name = &captures[1];

        output.push_str(&template[last..open]);
        match name {
            GRAPH_NAME => output.push_str(&escape_html(graph_name)),
            GRAPH_ELEMENTS => {
                output.push_str(&escape_script(elements_json));
                has_elements = true;
            }
            other => {
                return Err(RenderError::Template(format!(
                    "unknown placeholder `{}` at line {}",
                    other,
                    line_of(template, open)
                )));
            }
        }
        last = end;
    }
    output.push_str(&template[last..]);

    if !has_elements {
        return Err(RenderError::Template(format!(
            "the template has no {{{{ {} }}}} placeholder",
            GRAPH_ELEMENTS
        )));
    }
    Ok(output)
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

/// Render the Cytoscape.js elements into the configured or built-in template.
pub fn render_html(model: &GraphModel, options: &RenderOptions) -> Result<Vec<u8>> {
    let template = match &options.html_template {
        Some(template) => template.clone(),
        None => assets::default_template()?,
    };
    let elements = cytoscape::build_elements(model, options.embed_modules);
    let json = serde_json::to_string(&elements)?;
    let html = render_template(&template, &options.graph_name, &json)?;
    Ok(html.into_bytes())
}
