//! Built-in files embedded with rust-embed

use crate::{RenderError, Result};
use rust_embed::RustEmbed;

pub const DEFAULT_TEMPLATE: &str = "index.html";

/// Embed the assets directory at compile time
#[derive(RustEmbed)]
#[folder = "assets"]
struct TemplateAssets;

/// Source of the built-in HTML template.
pub fn default_template() -> Result<String> {
    let file = TemplateAssets::get(DEFAULT_TEMPLATE).ok_or_else(|| {
        RenderError::Template(format!("built-in template {} is missing", DEFAULT_TEMPLATE))
    })?;
    String::from_utf8(file.data.into_owned())
        .map_err(|_| RenderError::Template(format!("built-in template {} is not UTF-8", DEFAULT_TEMPLATE)))
}
