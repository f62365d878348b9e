//! Serializer: a [`Graph`] to DOT text in a fixed section order.
//!
//! Header and defaults, top-level nodes, top-level ordering edges, cluster
//! blocks, the same-rank directive, visible edges, closing brace. The graph
//! already holds sanitized ids and attribute values, so this module only
//! lays out text.

use crate::graph::{Attrs, Cluster, Graph, GraphEdge, GraphNode};
use crate::options::RenderOptions;
use crate::sanitize::{sanitize_id, sanitize_label};

const INDENT: &str = "  ";

/// Render `graph` as a complete DOT program.
#[must_use]
pub fn to_dot(graph: &Graph, options: &RenderOptions) -> String {
    let mut out = String::new();
    out.push_str(&format!("digraph {} {{\n", sanitize_id(&options.graph_name)));
    for comment in &graph.comments {
        out.push_str(&format!("{INDENT}// {comment}\n"));
    }
    if graph.is_empty() {
        out.push_str("}\n");
        return out;
    }

    write_defaults(&mut out, options);

    if !graph.nodes.is_empty() {
        out.push('\n');
        for node in &graph.nodes {
            write_node(&mut out, INDENT, node);
        }
    }

    if !graph.ordering.is_empty() {
        out.push('\n');
        for edge in &graph.ordering {
            write_edge(&mut out, INDENT, edge);
        }
    }

    for cluster in &graph.clusters {
        out.push('\n');
        write_cluster(&mut out, 1, cluster);
    }

    if !graph.same_rank.is_empty() {
        out.push('\n');
        out.push_str(&format!("{INDENT}{{ rank=same; {}; }}\n", graph.same_rank.join("; ")));
    }

    if !graph.edges.is_empty() {
        out.push('\n');
        for edge in &graph.edges {
            write_edge(&mut out, INDENT, edge);
        }
    }

    out.push_str("}\n");
    out
}

fn write_defaults(out: &mut String, options: &RenderOptions) {
    let font = sanitize_label(&options.font);
    out.push_str(&format!(
        "{INDENT}graph [rankdir={}, fontname=\"{font}\", fontsize=11, compound=true, newrank=true, nodesep=0.35, ranksep=0.25];\n",
        options.rankdir
    ));
    out.push_str(&format!(
        "{INDENT}node [fontname=\"{font}\", fontsize=10, shape=box, style=\"rounded,filled\", fillcolor=\"#FFFFFF\"];\n"
    ));
    out.push_str(&format!("{INDENT}edge [fontname=\"{font}\", fontsize=9];\n"));
}

fn write_cluster(out: &mut String, depth: usize, cluster: &Cluster) {
    let outer = INDENT.repeat(depth);
    let inner = INDENT.repeat(depth + 1);

    out.push_str(&format!("{outer}subgraph {} {{\n", cluster.id));
    for (key, value) in cluster.attrs.iter() {
        out.push_str(&format!("{inner}{key}={value};\n"));
    }
    for node in &cluster.nodes {
        write_node(out, &inner, node);
    }
    for child in &cluster.clusters {
        write_cluster(out, depth + 1, child);
    }
    for edge in &cluster.ordering {
        write_edge(out, &inner, edge);
    }
    out.push_str(&format!("{outer}}}\n"));
}

fn write_node(out: &mut String, indent: &str, node: &GraphNode) {
    out.push_str(&format!("{indent}{}{};\n", node.id, attr_list(&node.attrs)));
}

fn write_edge(out: &mut String, indent: &str, edge: &GraphEdge) {
    out.push_str(&format!("{indent}{} -> {}{};\n", edge.from, edge.to, attr_list(&edge.attrs)));
}

fn attr_list(attrs: &Attrs) -> String {
    if attrs.is_empty() {
        return String::new();
    }
    let body: Vec<String> = attrs.iter().map(|(key, value)| format!("{key}={value}")).collect();
    format!(" [{}]", body.join(", "))
}

#[cfg(test)]
#[path = "serialize_test.rs"]
mod tests;
