//! Integration tests for tfviz
//!
//! These run the compiled binary end to end and drive the library crates
//! the same way the binary does.

use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;
use tfviz_core::{JunkRules, PipelineConfig, load_graph_str, parse_dot};
use tfviz_render::{OutputType, RenderOptions, render};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn tfviz(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tfviz"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("Failed to run tfviz")
}

fn run_ok(args: &[&str]) -> String {
    let output = tfviz(args);
    assert!(
        output.status.success(),
        "tfviz {:?} failed: {}",
        args,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}

fn node_names(dot: &str) -> BTreeSet<String> {
    let graph = parse_dot(dot, &JunkRules::default()).unwrap();
    graph.all_nodes().map(|(_, n)| n.name.clone()).collect()
}

fn edge_count(dot: &str) -> usize {
    parse_dot(dot, &JunkRules::default()).unwrap().edge_count()
}

#[test]
fn test_version() {
    let short = run_ok(&["-v"]);
    let long = run_ok(&["--version"]);
    assert_eq!(short, format!("tfviz {}\n", env!("CARGO_PKG_VERSION")));
    assert_eq!(short, long);
}

#[test]
fn test_junk_removed_by_default() {
    let input = fixture("simple.dot");
    let dot = run_ok(&[
        "--input",
        input.to_str().unwrap(),
        "--output-type",
        "graphviz",
        "--graph-name",
        "g",
    ]);
    assert_eq!(
        dot,
        "digraph \"g\" {\n\t\"A\" [label = \"A\"]\n\t\"B\" [label = \"B\"]\n\t\"A\" -> \"B\"\n}\n"
    );
}

#[test]
fn test_keep_tf_junk() {
    let input = fixture("simple.dot");
    let dot = run_ok(&[
        "--input",
        input.to_str().unwrap(),
        "--output-type",
        "graphviz",
        "--keep-tf-junk",
    ]);
    let expected: BTreeSet<String> = ["[root]", "A", "B"].iter().map(|s| s.to_string()).collect();
    assert_eq!(node_names(&dot), expected);
    assert_eq!(edge_count(&dot), 2);
}

#[test]
fn test_cyto_json_modules() {
    let input = fixture("modules.dot");
    let json = run_ok(&[
        "--input",
        input.to_str().unwrap(),
        "--output-type",
        "cyto-json",
        "--embed-modules",
        "true",
    ]);
    let elements: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(
        elements,
        serde_json::json!([
            {"group": "nodes", "data": {"id": "[root] aws_instance.i2 (expand)", "label": "aws_instance.i2", "type": "resource"}},
            {"group": "nodes", "data": {"id": "module.m", "label": "m", "type": "module"}},
            {"group": "nodes", "data": {"id": "[root] module.m.aws_instance.i1 (expand)", "label": "aws_instance.i1", "type": "resource", "parent": "module.m"}}
        ])
    );
}

#[test]
fn test_html_output_to_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("graph.html");
    let input = fixture("modules.dot");
    let stdout = run_ok(&[
        "--input",
        input.to_str().unwrap(),
        "--output",
        output.to_str().unwrap(),
        "--graph-name",
        "demo <infra>",
    ]);
    assert!(stdout.is_empty());

    let html = std::fs::read_to_string(&output).unwrap();
    assert!(html.contains("<title>demo &lt;infra&gt;</title>"));
    assert!(html.contains("\"parent\":\"module.m\""));
}

#[test]
fn test_custom_template() {
    let dir = TempDir::new().unwrap();
    let template = dir.path().join("page.html");
    std::fs::write(&template, "<p>{{ graph_name }}</p>{{ graph_elements }}").unwrap();
    let input = fixture("simple.dot");
    let html = run_ok(&[
        "--input",
        input.to_str().unwrap(),
        "--cyto-html-template",
        template.to_str().unwrap(),
        "--graph-name",
        "t",
    ]);
    assert_snapshot!(html, @r#"<p>t</p>[{"group":"nodes","data":{"id":"A","label":"A","type":"resource"}},{"group":"nodes","data":{"id":"B","label":"B","type":"resource"}},{"group":"edges","data":{"id":"e0","source":"A","target":"B"}}]"#);
}

#[test]
fn test_invalid_exclusion_pattern_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let input = fixture("simple.dot");
    for output_type in OutputType::ALL {
        let output = dir.path().join(format!("out.{}", output_type));
        let result = tfviz(&[
            "--input",
            input.to_str().unwrap(),
            "--output",
            output.to_str().unwrap(),
            "--output-type",
            output_type.as_str(),
            "--exclude",
            "aws_(",
        ]);
        assert_eq!(result.status.code(), Some(1));
        assert!(result.stdout.is_empty());
        assert!(String::from_utf8_lossy(&result.stderr).contains("aws_("));
        assert!(!output.exists(), "{} created an output file", output_type);
    }
}

#[test]
fn test_malformed_input_fails() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("broken.dot");
    std::fs::write(&input, "digraph {\n  A -> \n").unwrap();
    let result = tfviz(&["--input", input.to_str().unwrap(), "--output-type", "graphviz"]);
    assert_eq!(result.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&result.stderr).contains("parse error at line 3"));
}

#[test]
fn test_unknown_output_type_is_a_usage_error() {
    let result = tfviz(&["--output-type", "svg"]);
    assert_eq!(result.status.code(), Some(2));
}

#[test]
fn test_config_file_merges_with_flags() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("tfviz.toml");
    std::fs::write(
        &config,
        "output_type = \"graphviz\"\ngraph_name = \"from-file\"\nexclude = [\"^B$\"]\n",
    )
    .unwrap();
    let input = fixture("simple.dot");
    let dot = run_ok(&[
        "--input",
        input.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
        "--keep-tf-junk",
        "--exclude",
        "^A$",
    ]);
    assert!(dot.starts_with("digraph \"from-file\" {"));
    let expected: BTreeSet<String> = ["[root]".to_string()].into_iter().collect();
    assert_eq!(node_names(&dot), expected);
}

#[test]
fn test_sibling_modules_through_library() {
    let source = std::fs::read_to_string(fixture("modules.dot")).unwrap();
    let model = load_graph_str(&source, &PipelineConfig::default()).unwrap();
    let options = RenderOptions {
        output_type: OutputType::Graphviz,
        graph_name: "m".to_string(),
        embed_modules: false,
        html_template: None,
    };
    let dot = String::from_utf8(render(&model, &options).unwrap()).unwrap();
    let nodes = node_names(&dot);
    assert!(nodes.contains("module.m"));
    assert!(nodes.contains("[root] module.m.aws_instance.i1 (expand)"));
    assert_eq!(nodes.len(), 3);
}
