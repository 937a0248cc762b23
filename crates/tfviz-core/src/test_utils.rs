//! Test fixtures for tfviz-core

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// `terraform graph` output for a small two-module configuration.
pub const TERRAFORM_GRAPH: &str = r#"digraph {
	compound = "true"
	newrank = "true"
	subgraph "root" {
		"[root] aws_vpc.main (expand)" [label = "aws_vpc.main", shape = "box"]
		"[root] module.network (expand)" [label = "module.network", shape = "box"]
		"[root] module.network.aws_subnet.private (expand)" [label = "module.network.aws_subnet.private", shape = "box"]
		"[root] module.network.module.nat.aws_nat_gateway.gw (expand)" [label = "module.network.module.nat.aws_nat_gateway.gw", shape = "box"]
		"[root] aws_iam_role.app (expand)" [label = "aws_iam_role.app", shape = "box"]
		"[root] var.region" [label = "var.region", shape = "note"]
		"[root] provider[\"registry.terraform.io/hashicorp/aws\"]" [label = "provider[\"registry.terraform.io/hashicorp/aws\"]", shape = "diamond"]
		"[root] meta.count-boundary (EachMode fixup)" [label = "meta.count-boundary (EachMode fixup)", shape = "box"]
		"[root] module.network (close)" [label = "module.network (close)", shape = "box"]
		"[root] root" [label = "root", shape = "box"]
		"[root] aws_vpc.main (expand)" -> "[root] provider[\"registry.terraform.io/hashicorp/aws\"]"
		"[root] aws_vpc.main (expand)" -> "[root] var.region"
		"[root] module.network.aws_subnet.private (expand)" -> "[root] aws_vpc.main (expand)"
		"[root] module.network.aws_subnet.private (expand)" -> "[root] module.network (expand)"
		"[root] module.network.module.nat.aws_nat_gateway.gw (expand)" -> "[root] module.network.aws_subnet.private (expand)"
		"[root] aws_iam_role.app (expand)" -> "[root] provider[\"registry.terraform.io/hashicorp/aws\"]"
		"[root] meta.count-boundary (EachMode fixup)" -> "[root] aws_iam_role.app (expand)"
		"[root] module.network (close)" -> "[root] module.network.module.nat.aws_nat_gateway.gw (expand)"
		"[root] root" -> "[root] meta.count-boundary (EachMode fixup)"
		"[root] root" -> "[root] module.network (close)"
	}
}
"#;

/// Number of non-junk nodes in [`TERRAFORM_GRAPH`].
pub const TERRAFORM_GRAPH_REAL_NODES: usize = 6;

/// Number of edges between non-junk nodes in [`TERRAFORM_GRAPH`].
pub const TERRAFORM_GRAPH_REAL_EDGES: usize = 4;

/// Create a temporary directory holding `graph.dot` with [`TERRAFORM_GRAPH`].
pub fn create_graph_file() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("graph.dot");
    fs::write(&path, TERRAFORM_GRAPH).unwrap();
    (temp_dir, path)
}
