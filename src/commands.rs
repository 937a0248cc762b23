//! The conversion run: options, input, pipeline, rendering, output

use anyhow::Context;
use clap::Args;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tfviz_core::{FileConfig, PipelineConfig, load_graph};
use tfviz_render::{OutputType, RenderOptions, render};

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Input file produced by `terraform graph` (defaults to stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Output file (defaults to stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format: cyto-json, cyto-html or graphviz [default: cyto-html]
    #[arg(short = 't', long)]
    output_type: Option<OutputType>,

    /// Remove nodes whose identifier matches this regular expression (repeatable)
    #[arg(short, long, value_name = "REGEX")]
    exclude: Vec<String>,

    /// Keep Terraform bookkeeping nodes (root, providers, meta, close nodes)
    #[arg(long)]
    keep_tf_junk: bool,

    /// Graph name (defaults to the working directory name)
    #[arg(short = 'n', long)]
    graph_name: Option<String>,

    /// Nest module sub-graphs inside their parent; `false` draws them as
    /// siblings linked parent to child [default: true]
    #[arg(long, value_name = "BOOL")]
    embed_modules: Option<bool>,

    /// HTML template used by the cyto-html output
    #[arg(long, value_name = "FILE")]
    cyto_html_template: Option<PathBuf>,

    /// TOML configuration file; command line flags take precedence
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,
}

/// Settings after merging the configuration file with the command line.
#[derive(Debug)]
struct Settings {
    pipeline: PipelineConfig,
    render: RenderOptions,
    template: Option<PathBuf>,
}

fn settings(args: &ConvertArgs) -> anyhow::Result<Settings> {
    let file = match &args.config {
        Some(path) => FileConfig::load(path).context("Cannot load the configuration")?,
        None => FileConfig::default(),
    };

    let output_type = match (args.output_type, &file.output_type) {
        (Some(output_type), _) => output_type,
        (None, Some(name)) => name
            .parse()
            .context("Invalid output type in the configuration file")?,
        (None, None) => OutputType::default(),
    };

    let mut exclude = file.exclude.clone();
    exclude.extend(args.exclude.iter().cloned());

    let graph_name = match args.graph_name.clone().or_else(|| file.graph_name.clone()) {
        Some(name) => name,
        None => default_graph_name()?,
    };

    Ok(Settings {
        pipeline: PipelineConfig {
            keep_junk: args.keep_tf_junk || file.keep_tf_junk.unwrap_or(false),
            exclude,
            junk_rules: file.junk_rules().context("Invalid junk pattern in the configuration file")?,
        },
        render: RenderOptions {
            output_type,
            graph_name,
            embed_modules: args.embed_modules.or(file.embed_modules).unwrap_or(true),
            html_template: None,
        },
        template: args
            .cyto_html_template
            .clone()
            .or_else(|| file.cyto_html_template.clone().map(PathBuf::from)),
    })
}

/// Base name of the working directory.
fn default_graph_name() -> anyhow::Result<String> {
    let cwd = std::env::current_dir().context("Cannot determine the working directory")?;
    Ok(cwd
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| RenderOptions::default().graph_name))
}

fn read_template(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read the HTML template {}", path.display()))
}

/// Run one conversion. Nothing is written unless every earlier step succeeded.
pub fn convert(args: ConvertArgs) -> anyhow::Result<()> {
    let Settings {
        pipeline,
        render: mut options,
        template,
    } = settings(&args)?;

    if let (OutputType::CytoHtml, Some(path)) = (options.output_type, &template) {
        options.html_template = Some(read_template(path)?);
    }

    let input: Box<dyn Read> = match &args.input {
        Some(path) => Box::new(
            File::open(path).with_context(|| format!("Cannot open {} for reading", path.display()))?,
        ),
        None => Box::new(io::stdin().lock()),
    };
    let model = load_graph(input, &pipeline).context("Cannot load the graph")?;
    tracing::debug!(
        "Loaded {} nodes, {} edges, {} modules",
        model.graph().node_count(),
        model.graph().edge_count(),
        model.module_count() - 1
    );

    let bytes = render(&model, &options)
        .with_context(|| format!("Cannot render the graph as {}", options.output_type))?;

    match &args.output {
        Some(path) => std::fs::write(path, &bytes)
            .with_context(|| format!("Cannot write {}", path.display()))?,
        None => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(&bytes).context("Cannot write to stdout")?;
            stdout.flush().context("Cannot write to stdout")?;
        }
    }
    tracing::debug!("Wrote {} bytes", bytes.len());
    Ok(())
}
