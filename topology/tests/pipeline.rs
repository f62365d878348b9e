//! End-to-end generation: documents in, DOT text and node map out.

use std::collections::HashSet;

use serde_json::{Value, json};
use topology::{Diagnostic, Kind, RenderOptions, generate};

fn dot_of(doc: &Value) -> String {
    generate(doc, &RenderOptions::default()).unwrap().dot
}

/// Ids of node statements (`id [..];` or `id;`), skipping the `graph`,
/// `node` and `edge` defaults.
fn declared_ids(dot: &str) -> HashSet<String> {
    dot.lines()
        .map(str::trim)
        .filter_map(split_id)
        .filter(|(id, rest)| {
            let rest = rest.trim_start();
            (rest.starts_with('[') || rest.starts_with(';')) && !["graph", "node", "edge"].contains(&id.as_str())
        })
        .map(|(id, _)| id)
        .collect()
}

fn edge_endpoints(dot: &str) -> Vec<(String, String)> {
    dot.lines()
        .map(str::trim)
        .filter_map(|line| {
            let (from, rest) = split_id(line)?;
            let rest = rest.trim_start().strip_prefix("->")?;
            let (to, _) = split_id(rest.trim_start())?;
            Some((from, to))
        })
        .collect()
}

/// Split a leading DOT id (bare or quoted) off `line`.
fn split_id(line: &str) -> Option<(String, &str)> {
    if let Some(rest) = line.strip_prefix('"') {
        let mut escaped = false;
        for (i, c) in rest.char_indices() {
            match c {
                '\\' if !escaped => escaped = true,
                '"' if !escaped => return Some((format!("\"{}\"", &rest[..i]), &rest[i + 1..])),
                _ => escaped = false,
            }
        }
        return None;
    }
    let end = line.find(|c: char| !(c.is_ascii_alphanumeric() || c == '_')).unwrap_or(line.len());
    (end > 0).then(|| (line[..end].to_owned(), &line[end..]))
}

fn canonical(id: &str) -> &str {
    id.strip_prefix('"').and_then(|s| s.strip_suffix('"')).unwrap_or(id)
}

fn assert_no_dangling_edges(dot: &str) {
    let declared: HashSet<String> = declared_ids(dot).iter().map(|id| canonical(id).to_owned()).collect();
    for (from, to) in edge_endpoints(dot) {
        assert!(declared.contains(canonical(&from)), "undeclared {from} in\n{dot}");
        assert!(declared.contains(canonical(&to)), "undeclared {to} in\n{dot}");
    }
}

fn datacenter() -> Value {
    json!({
        "site": {"id": "hq", "label": "HQ DC"},
        "cable_types": {"c13": {"spec": "C13-C14"}, "dac": {"name": "DAC 3m"}},
        "racks": [
            {"id": "rack-a", "label": "Rack A", "devices": [
                {"id": "tor-a", "type": "switch", "position": {"unit": 42}, "ports": ["1", "2"]},
                {"id": "web01", "type": "server", "positionRange": [10, 11]},
                {"id": "pdu-a", "type": "pdu"}
            ]},
            {"id": "rack-b", "label": "Rack \"B\"", "equipment": [
                {"id": "db01", "type": "server", "position": {"unit": "20-21"}}
            ]}
        ],
        "power_connections": [{"from": "pdu-a", "to": "web01", "cable_type": "c13", "count": 2}],
        "data_connections": [
            {"from": {"device": "web01", "port": "eth0"}, "to": {"device": "tor-a", "port": "1"}, "cable_type": "dac", "speed": "25G"},
            {"from": "db01", "to": "switch", "status": "inactive"}
        ],
        "optional_connections": [{"from": "db01", "to": "undefined", "condition": "phase 2"}]
    })
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn minimal_site_topology() {
    let doc = json!({
        "sites": [{"id": "a", "label": "A"}, {"id": "b", "label": "B"}],
        "connections": [{"from": "a", "to": "b", "type": "fiber"}]
    });
    let out = generate(&doc, &RenderOptions::default()).unwrap();
    assert_eq!(out.kind, Kind::SiteTopology);
    assert!(out.diagnostics.is_empty());

    let declared = declared_ids(&out.dot);
    assert!(declared.contains("a") && declared.contains("b"), "{}", out.dot);

    let edges: Vec<&str> = out.dot.lines().filter(|l| l.contains(" -> ")).collect();
    assert_eq!(edges.len(), 1, "{}", out.dot);
    assert!(edges[0].trim_start().starts_with("a -> b"));
    assert!(edges[0].contains("label=\"fiber\""));
}

#[test]
fn type_fallback_resolution() {
    let doc = json!({
        "rack": {"id": "r1", "devices": [{"id": "srv1", "type": "server"}]},
        "connections": [{"from": "server", "to": "srv1"}]
    });
    let out = generate(&doc, &RenderOptions::default()).unwrap();
    assert!(out.diagnostics.is_empty(), "{:?}", out.diagnostics);
    assert!(out.dot.contains("  srv1 -> srv1;"), "{}", out.dot);
}

#[test]
fn unknown_document() {
    let out = generate(&json!({}), &RenderOptions::default()).unwrap();
    assert_eq!(out.kind, Kind::Unknown);
    assert_eq!(out.diagnostics, vec![Diagnostic::UnknownSchema { keys: Vec::new() }]);
    assert!(out.dot.starts_with("digraph topology {\n  // "));
    assert!(out.dot.ends_with("}\n"));
    assert_eq!(out.dot.matches('{').count(), out.dot.matches('}').count());
    assert!(out.node_ids.is_empty());
}

#[test]
fn rack_units_map_to_descending_chain() {
    let doc = json!({"rack": {"id": "r", "devices": [
        {"id": "u5", "position": {"unit": 5}},
        {"id": "u20", "position": {"unit": 20}},
        {"id": "u1", "position": {"unit": 1}}
    ]}});
    let dot = dot_of(&doc);
    let chain: Vec<(String, String)> = dot
        .lines()
        .filter(|l| l.contains("style=invis"))
        .filter_map(|l| edge_endpoints(l).into_iter().next())
        .collect();
    let expected = [("rack_r", "u20"), ("u20", "u5"), ("u5", "u1")];
    let expected: Vec<(String, String)> = expected.iter().map(|(a, b)| ((*a).to_owned(), (*b).to_owned())).collect();
    assert_eq!(chain, expected);
}

#[test]
fn singular_and_plural_rack_render_identically() {
    let rack = json!({"id": "r1", "label": "Rack 1", "devices": [
        {"id": "sw", "type": "switch", "position": {"unit": 40}},
        {"id": "srv", "type": "server", "position": {"unit": 10}}
    ]});
    let single = dot_of(&json!({"rack": rack.clone()}));
    let plural = dot_of(&json!({"racks": [rack]}));
    assert_eq!(single, plural);
}

// =============================================================================
// PROPERTIES OF A FULL DOCUMENT
// =============================================================================

#[test]
fn output_is_deterministic() {
    let doc = datacenter();
    let first = generate(&doc, &RenderOptions::default()).unwrap();
    for _ in 0..5 {
        assert_eq!(generate(&doc, &RenderOptions::default()).unwrap(), first);
    }
}

#[test]
fn every_edge_endpoint_is_declared() {
    let dot = dot_of(&datacenter());
    assert_no_dangling_edges(&dot);
}

#[test]
fn datacenter_document_end_to_end() {
    let out = generate(&datacenter(), &RenderOptions::default()).unwrap();
    assert_eq!(out.kind, Kind::SiteEquipment);

    assert!(out.dot.contains("subgraph cluster_site_hq {"));
    assert!(out.dot.contains("subgraph \"cluster_rack-a\" {"), "{}", out.dot);
    assert!(out.dot.contains("{ rank=same; \"rack_rack-a\"; \"rack_rack-b\"; }"));
    assert!(out.dot.contains("label=\"Rack \\\"B\\\"\""));
    assert!(out.dot.contains("\"pdu-a\" -> web01 [label=\"C13-C14 (2本)\", style=dashed, color=\"#C62828\"];"));
    assert!(out.dot.contains("web01 -> \"tor-a:1\" [label=\"DAC 3m 25G\", taillabel=\"eth0\"];"), "{}", out.dot);
    assert!(out.dot.contains("db01 -> \"tor-a\" [label=\"ケーブル\", style=dashed"));

    assert_eq!(out.node_ids["tor-a:1"].graph_node_id, "\"tor-a:1\"");
    assert_eq!(out.node_ids["rack_rack-b"].source_id, "rack-b");

    let unresolved: Vec<&Diagnostic> =
        out.diagnostics.iter().filter(|d| matches!(d, Diagnostic::UnresolvedEndpoint { .. })).collect();
    assert_eq!(unresolved.len(), 1);
}

#[test]
fn collisions_stay_distinct_in_output() {
    let doc = json!({"links": [{"from": "a-b", "to": "\"a-b\""}]});
    let out = generate(&doc, &RenderOptions::default()).unwrap();
    assert!(out.dot.contains("\"a-b\" -> \"a-b_2\";"), "{}", out.dot);
    assert!(out.diagnostics.iter().any(|d| matches!(d, Diagnostic::IdentifierCollision { .. })));
    assert_no_dangling_edges(&out.dot);
}

#[test]
fn independent_documents_share_no_ids() {
    let first = generate(&json!({"sites": [{"id": "x"}]}), &RenderOptions::default()).unwrap();
    let second = generate(&json!({"sites": [{"id": "x"}]}), &RenderOptions::default()).unwrap();
    assert_eq!(first.node_ids["x"].graph_node_id, "x");
    assert_eq!(second.node_ids["x"].graph_node_id, "x");
}

#[test]
fn generation_runs_on_many_threads() {
    let handles: Vec<_> = (0..4)
        .map(|_| std::thread::spawn(|| generate(&datacenter(), &RenderOptions::default()).map(|g| g.dot)))
        .collect();
    let outputs: Vec<String> = handles.into_iter().map(|h| h.join().unwrap().unwrap()).collect();
    assert!(outputs.windows(2).all(|w| w[0] == w[1]));
}
