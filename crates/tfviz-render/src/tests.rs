//! Cross-renderer tests for tfviz-render

use crate::*;
use std::collections::BTreeSet;
use tfviz_core::{GraphModel, PipelineConfig, load_graph_str};

const MODULES: &str = r#"digraph {
	"[root] aws_vpc.main (expand)" [label = "aws_vpc.main", shape = "box"]
	"[root] module.net (expand)" [label = "module.net", shape = "box"]
	"[root] module.net.aws_subnet.s1 (expand)" [label = "module.net.aws_subnet.s1", shape = "box"]
	"[root] module.net.module.sub.aws_route.r (expand)" [label = "module.net.module.sub.aws_route.r", shape = "box"]
	"[root] provider[\"registry.terraform.io/hashicorp/aws\"]" [label = "provider", shape = "diamond"]
	"[root] module.net.aws_subnet.s1 (expand)" -> "[root] aws_vpc.main (expand)"
	"[root] module.net.aws_subnet.s1 (expand)" -> "[root] module.net (expand)"
	"[root] module.net.module.sub.aws_route.r (expand)" -> "[root] module.net.aws_subnet.s1 (expand)"
	"[root] aws_vpc.main (expand)" -> "[root] provider[\"registry.terraform.io/hashicorp/aws\"]"
}"#;

fn model(source: &str) -> GraphModel {
    load_graph_str(source, &PipelineConfig::default()).unwrap()
}

fn options(output_type: OutputType, embed_modules: bool) -> RenderOptions {
    RenderOptions {
        output_type,
        graph_name: "infra".to_string(),
        embed_modules,
        html_template: None,
    }
}

fn dependency_edges(elements: &[Element]) -> BTreeSet<(String, String)> {
    elements
        .iter()
        .filter_map(|e| match &e.data {
            ElementData::Edge(d) if d.kind.is_none() => Some((d.source.clone(), d.target.clone())),
            _ => None,
        })
        .collect()
}

#[test]
fn test_output_type_parsing() {
    for output_type in OutputType::ALL {
        assert_eq!(output_type.as_str().parse::<OutputType>().unwrap(), output_type);
    }
    let err = "svg".parse::<OutputType>().unwrap_err();
    assert_eq!(
        err.to_string(),
        "configuration error: invalid output type `svg`, expected one of: cyto-json, cyto-html, graphviz"
    );
    assert_eq!(OutputType::default(), OutputType::CytoHtml);
}

#[test]
fn test_connectivity_is_independent_of_embedding() {
    let model = model(MODULES);
    let embedded = build_elements(&model, true);
    let siblings = build_elements(&model, false);
    assert_eq!(dependency_edges(&embedded), dependency_edges(&siblings));
    assert_eq!(dependency_edges(&embedded).len(), 3);

    let nodes = |elements: &[Element]| -> BTreeSet<String> {
        elements
            .iter()
            .filter(|e| e.group == Group::Nodes)
            .map(|e| e.id().to_string())
            .collect()
    };
    assert_eq!(nodes(&embedded), nodes(&siblings));
}

#[test]
fn test_every_format_renders() {
    let model = model(MODULES);
    for output_type in OutputType::ALL {
        for embed_modules in [true, false] {
            let bytes = render(&model, &options(output_type, embed_modules)).unwrap();
            let text = String::from_utf8(bytes).unwrap();
            assert!(!text.is_empty(), "{} produced nothing", output_type);
            assert!(!text.contains("provider"), "{} kept a junk node", output_type);
        }
    }
}

#[test]
fn test_html_embeds_elements_and_name() {
    let model = model(MODULES);
    let html = render(&model, &options(OutputType::CytoHtml, true)).unwrap();
    let html = String::from_utf8(html).unwrap();
    assert!(html.contains("<title>infra</title>"));
    assert!(html.contains("\"id\":\"[root] module.net (expand)\""));
    assert!(!html.contains("{{"));
}

#[test]
fn test_graphviz_matches_both_modes() {
    let model = model(MODULES);
    let embedded = String::from_utf8(render(&model, &options(OutputType::Graphviz, true)).unwrap()).unwrap();
    let siblings = String::from_utf8(render(&model, &options(OutputType::Graphviz, false)).unwrap()).unwrap();

    assert!(embedded.starts_with("digraph \"infra\" {\n"));
    assert!(embedded.contains("\t\tsubgraph \"cluster_module.net.module.sub\" {\n"));
    assert!(siblings.contains("\n\tsubgraph \"cluster_module.net.module.sub\" {\n"));
    assert!(siblings.contains(
        "\"[root] module.net (expand)\" -> \"module.net.module.sub\" [style = \"dashed\"]"
    ));
}

#[test]
fn test_invalid_template_is_reported() {
    let model = model(MODULES);
    let options = RenderOptions {
        html_template: Some("<html>{{ graph_name }}</html>".to_string()),
        ..Default::default()
    };
    assert!(matches!(render(&model, &options), Err(RenderError::Template(_))));
}

#[test]
fn test_repeated_module_declaration_keeps_every_edge_endpoint() {
    let model = model(
        r#"digraph { "module.a" -> "aws_x.one"; "[root] module.a (expand)" -> "aws_x.two" }"#,
    );
    for embed_modules in [true, false] {
        let elements = build_elements(&model, embed_modules);
        let nodes: BTreeSet<&str> = elements
            .iter()
            .filter(|e| e.group == Group::Nodes)
            .map(Element::id)
            .collect();
        assert!(nodes.contains("[root] module.a (expand)"));
        for element in &elements {
            if let ElementData::Edge(edge) = &element.data {
                assert!(nodes.contains(edge.source.as_str()), "dangling source {}", edge.source);
                assert!(nodes.contains(edge.target.as_str()), "dangling target {}", edge.target);
            }
        }

        let dot = String::from_utf8(render(&model, &options(OutputType::Graphviz, embed_modules)).unwrap()).unwrap();
        assert!(dot.contains("\"[root] module.a (expand)\" [label = \"module.a\"]"));
    }
}
