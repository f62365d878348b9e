use serde_json::json;

use super::*;
use crate::diagnostics::Diagnostic;
use crate::graph::{EntityType, NodeDecl};
use crate::model::device;

fn at_unit(id: &str, unit: Option<u32>, order: usize) -> Device {
    let value = match unit {
        Some(unit) => json!({"id": id, "position": {"unit": unit}}),
        None => json!({"id": id}),
    };
    device(&value, "r", order, "$", "device").unwrap()
}

fn ids(devices: &[&Device]) -> Vec<String> {
    devices.iter().map(|d| d.id.clone()).collect()
}

#[test]
fn rack_order_is_descending_by_unit() {
    let devices = vec![at_unit("u5", Some(5), 0), at_unit("u20", Some(20), 1), at_unit("u1", Some(1), 2)];
    assert_eq!(ids(&rack_order(&devices)), vec!["u20", "u5", "u1"]);
}

#[test]
fn ties_keep_document_order() {
    let devices = vec![at_unit("b", Some(10), 0), at_unit("a", Some(10), 1)];
    assert_eq!(ids(&rack_order(&devices)), vec!["b", "a"]);
}

#[test]
fn unpositioned_devices_go_last() {
    let devices = vec![at_unit("loose", None, 0), at_unit("low", Some(1), 1), at_unit("loose2", None, 2)];
    assert_eq!(ids(&rack_order(&devices)), vec!["low", "loose", "loose2"]);
}

#[test]
fn order_chain_links_consecutive_ids() {
    let mut builder = GraphBuilder::new();
    let chain: Vec<String> =
        ["a", "b", "c"].iter().map(|k| builder.node(NodeDecl::new(*k, EntityType::Device, *k))).collect();
    order_chain(&mut builder, &chain);
    let (graph, _, _) = builder.finish();
    let pairs: Vec<_> = graph.ordering.iter().map(|e| (e.from.as_str(), e.to.as_str())).collect();
    assert_eq!(pairs, vec![("a", "b"), ("b", "c")]);
}

#[test]
fn order_chain_reports_undeclared_links() {
    let mut builder = GraphBuilder::new();
    let a = builder.node(NodeDecl::new("a", EntityType::Device, "a"));
    let c = builder.node(NodeDecl::new("c", EntityType::Device, "c"));
    order_chain(&mut builder, &[a, "ghost".to_owned(), c]);
    let (graph, _, diagnostics) = builder.finish();
    assert!(graph.ordering.is_empty());
    assert_eq!(
        diagnostics,
        vec![
            Diagnostic::DanglingEdge { from: "a".to_owned(), to: "ghost".to_owned() },
            Diagnostic::DanglingEdge { from: "ghost".to_owned(), to: "c".to_owned() },
        ]
    );
}

#[test]
fn single_anchor_needs_no_same_rank() {
    let mut builder = GraphBuilder::new();
    let a = builder.node(NodeDecl::new("a", EntityType::Rack, "a"));
    side_by_side(&mut builder, &[a]);
    let (graph, _, _) = builder.finish();
    assert!(graph.same_rank.is_empty());
}
