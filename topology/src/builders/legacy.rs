//! Builders for the four legacy generic schemas: `topology`, `device`,
//! `links` and `intent`.

use std::collections::{HashMap, HashSet};

use serde_json::{Map, Value};

use super::{anchor_style, cluster_style, connect_all, device_decl, device_lines, device_style, port_node};
use crate::connection::{CableCatalog, Category, decode_list};
use crate::diagnostics::GenerateError;
use crate::graph::{Attrs, EntityType, GraphBuilder, NodeDecl};
use crate::layout;
use crate::model::{self, Device, first_text, text};
use crate::options::RenderOptions;
use crate::resolve::{Resolver, is_placeholder};

// =============================================================================
// TOPOLOGY
// =============================================================================

/// Flat device list, optionally grouped into `zone` clusters.
pub(super) fn build_topology(doc: &Map<String, Value>, builder: &mut GraphBuilder) -> Result<(), GenerateError> {
    let Some(topology) = model::mapping(doc.get("topology"), "$.topology")? else {
        return Ok(());
    };
    if let Some(name) = text(topology, "name") {
        builder.comment(&format!("topology: {name}"));
    }

    let devices = model::device_list(topology, &["devices", "nodes"], "device", "$.topology", "device")?;
    let (inner, inner_path) = model::list_alias(topology, &["connections", "links"], "$.topology")?;
    let outer = model::list(doc, "connections", "$")?;

    let catalog = CableCatalog::default();
    let (mut connections, mut problems) = decode_list(inner, Category::Link, &inner_path, &catalog);
    let (more, skipped) = decode_list(outer, Category::Link, "$.connections", &catalog);
    connections.extend(more);
    problems.extend(skipped);

    emit_zoned(builder, &devices);
    connect_all(builder, &Resolver::for_devices(&devices), &connections, problems);
    Ok(())
}

/// Devices without a zone at top level, then one cluster per zone in
/// first-seen order. Returns the node ids in emission order.
fn emit_zoned(builder: &mut GraphBuilder, devices: &[Device]) -> Vec<String> {
    let mut zones: Vec<&str> = Vec::new();
    for zone in devices.iter().filter_map(|d| d.zone.as_deref()) {
        if !zones.contains(&zone) {
            zones.push(zone);
        }
    }

    let mut ids: Vec<String> = devices
        .iter()
        .filter(|d| d.zone.is_none())
        .map(|device| builder.node(device_decl(device, EntityType::Device, false)))
        .collect();
    for zone in zones {
        builder.cluster(&format!("zone_{zone}"), cluster_style(Some(zone)), |b| {
            for device in devices.iter().filter(|d| d.zone.as_deref() == Some(zone)) {
                ids.push(b.node(device_decl(device, EntityType::Device, false)));
            }
        });
    }
    ids
}

// =============================================================================
// DEVICE
// =============================================================================

/// A single device as a cluster with its ports stacked below it.
pub(super) fn build_device(
    doc: &Map<String, Value>,
    builder: &mut GraphBuilder,
    options: &RenderOptions,
) -> Result<(), GenerateError> {
    let device = match doc.get("device") {
        None | Some(Value::Null) => return Ok(()),
        Some(value) => model::device(value, "device", 0, "$.device", "device")?,
    };
    let records = model::list(doc, "connections", "$")?;
    let (connections, problems) = decode_list(records, Category::Link, "$.connections", &CableCatalog::default());

    builder.cluster(&device.id, cluster_style(None), |b| {
        let anchor = b.node(
            NodeDecl::new(&device.id, EntityType::Device, &device.id)
                .label(device_lines(&device, false))
                .attrs(anchor_style()),
        );
        let mut chain = vec![anchor];
        if options.include_ports {
            chain.extend(device.ports.iter().map(|port| port_node(b, &device.id, port)));
        }
        layout::order_chain(b, &chain);
    });

    connect_all(builder, &Resolver::for_devices([&device]), &connections, problems);
    Ok(())
}

// =============================================================================
// LINKS
// =============================================================================

/// Bare link list; nodes are implied by the endpoints.
///
/// An optional top-level `devices` list supplies labels and types for those
/// nodes. A token naming a device type implies the first device of that
/// type; only tokens matching neither an id nor a type become bare nodes.
pub(super) fn build_links(doc: &Map<String, Value>, builder: &mut GraphBuilder) -> Result<(), GenerateError> {
    let records = model::list(doc, "links", "$")?;
    let (links, problems) = decode_list(records, Category::Link, "$.links", &CableCatalog::default());
    let known = model::device_list(doc, &["devices"], "device", "$", "device")?;
    let by_id: HashMap<&str, &Device> = known.iter().map(|d| (d.id.as_str(), d)).collect();

    let mut seen = HashSet::new();
    let mut implied: Vec<(&str, Option<&Device>)> = Vec::new();
    for link in &links {
        for endpoint in [&link.from, &link.to] {
            let token = endpoint.device.trim();
            if is_placeholder(token) {
                continue;
            }
            let device = by_id.get(token).copied().or_else(|| known.iter().find(|d| d.kind == token));
            let key = device.map_or(token, |d| d.id.as_str());
            if seen.insert(key) {
                implied.push((key, device));
            }
        }
    }

    for (key, device) in implied {
        let decl = match device {
            Some(device) => device_decl(device, EntityType::Device, false),
            None => NodeDecl::new(key, EntityType::Device, key).label(vec![key.to_owned()]).attrs(device_style("")),
        };
        builder.node(decl);
    }

    connect_all(builder, &Resolver::for_devices(&known), &links, problems);
    Ok(())
}

// =============================================================================
// INTENT
// =============================================================================

/// An intent note, the devices it names and the flows between them.
pub(super) fn build_intent(doc: &Map<String, Value>, builder: &mut GraphBuilder) -> Result<(), GenerateError> {
    let Some(intent) = model::mapping(doc.get("intent"), "$.intent")? else {
        return Ok(());
    };
    let name = first_text(intent, &["name", "id"]).unwrap_or_else(|| "intent".to_owned());
    let devices = model::device_list(intent, &["devices", "endpoints"], "device", "$.intent", "device")?;
    let (flows, flows_path) = model::list_alias(intent, &["flows", "paths"], "$.intent")?;
    let (connections, problems) = decode_list(flows, Category::Flow, &flows_path, &CableCatalog::default());

    let mut lines = vec![name.clone()];
    lines.extend(text(intent, "description"));
    let (goals, _) = model::list_alias(intent, &["goals", "requirements"], "$.intent")?;
    lines.extend(goals.iter().filter_map(Value::as_str).map(|goal| format!("• {goal}")));

    let note = builder.node(
        NodeDecl::new(format!("intent_{name}"), EntityType::Intent, &name)
            .label(lines)
            .attrs(Attrs::new().raw("shape", "note").text("fillcolor", "#FFF9C4")),
    );

    let ids = emit_zoned(builder, &devices);
    if let Some(first) = ids.first() {
        builder.ordering_edge(&note, first);
    }

    connect_all(builder, &Resolver::for_devices(&devices), &connections, problems);
    Ok(())
}
