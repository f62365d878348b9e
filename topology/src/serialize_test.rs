use super::*;
use crate::graph::{EntityType, GraphBuilder, NodeDecl};

fn decl(key: &str) -> NodeDecl {
    NodeDecl::new(key, EntityType::Device, key).label(vec![key.to_owned()])
}

#[test]
fn empty_graph_is_header_comment_and_brace() {
    let mut builder = GraphBuilder::new();
    builder.comment("nothing here");
    let (graph, _, _) = builder.finish();
    assert_eq!(to_dot(&graph, &RenderOptions::default()), "digraph topology {\n  // nothing here\n}\n");
}

#[test]
fn sections_come_in_fixed_order() {
    let mut builder = GraphBuilder::new();
    let top = builder.node(decl("top"));
    let anchors: Vec<String> = ["r1", "r2"]
        .iter()
        .map(|rack| {
            builder.cluster(rack, Attrs::new().text("style", "rounded"), |b| {
                let anchor = b.node(decl(&format!("rack_{rack}")));
                let dev = b.node(decl(&format!("{rack}_dev")));
                b.ordering_edge(&anchor, &dev);
                anchor
            })
        })
        .collect();
    builder.same_rank(&anchors);
    builder.edge(&top, "r1_dev", Attrs::new().text("label", "x"));
    let (graph, _, _) = builder.finish();
    let dot = to_dot(&graph, &RenderOptions::default());

    let position = |needle: &str| dot.find(needle).unwrap_or_else(|| panic!("missing {needle:?} in\n{dot}"));
    let order = [
        position("graph [rankdir=TB"),
        position("  top [label=\"top\"];"),
        position("subgraph cluster_r1 {"),
        position("    rack_r1 -> r1_dev [style=invis];"),
        position("subgraph cluster_r2 {"),
        position("{ rank=same; rack_r1; rack_r2; }"),
        position("  top -> r1_dev [label=\"x\"];"),
    ];
    assert!(order.windows(2).all(|w| w[0] < w[1]), "out of order:\n{dot}");
    assert!(dot.ends_with("}\n"));
}

#[test]
fn nested_clusters_indent_one_level_deeper() {
    let mut builder = GraphBuilder::new();
    builder.cluster("outer", Attrs::new(), |b| {
        b.cluster("inner", Attrs::new(), |b| {
            b.node(decl("leaf"));
        });
    });
    let (graph, _, _) = builder.finish();
    let dot = to_dot(&graph, &RenderOptions::default());
    assert!(dot.contains("\n  subgraph cluster_outer {\n    subgraph cluster_inner {\n      leaf [label=\"leaf\"];\n    }\n  }\n"), "{dot}");
}

#[test]
fn options_flow_into_header() {
    let mut builder = GraphBuilder::new();
    builder.node(decl("a"));
    let (graph, _, _) = builder.finish();
    let options = RenderOptions {
        graph_name: "rack plan".to_owned(),
        rankdir: crate::options::RankDir::LeftRight,
        font: "Noto Sans CJK JP".to_owned(),
        include_ports: true,
    };
    let dot = to_dot(&graph, &options);
    assert!(dot.starts_with("digraph \"rack plan\" {\n"));
    assert!(dot.contains("rankdir=LR"));
    assert!(dot.contains("fontname=\"Noto Sans CJK JP\""));
}
