//! Per-kind node/edge builders.
//!
//! Each builder reads its document through [`crate::model`], declares nodes
//! and clusters on the shared [`GraphBuilder`], then resolves and adds its
//! connections. Everything the builders have in common (styles, rack
//! clusters, port nodes, edge resolution) lives here.

mod legacy;
mod rack_servers;
mod server_details;
mod site_equipment;
mod site_topology;

use serde_json::{Map, Value};

use crate::classify::Kind;
use crate::connection::{Connection, Endpoint};
use crate::diagnostics::{Diagnostic, GenerateError};
use crate::graph::{Attrs, EntityType, GraphBuilder, NodeDecl};
use crate::layout;
use crate::model::{Device, Port, Rack};
use crate::options::RenderOptions;
use crate::resolve::Resolver;

/// Comment written into the output for unclassifiable documents.
pub const UNKNOWN_SCHEMA_COMMENT: &str = "unrecognized document schema: no diagram generated";

/// Run the builder for `kind`.
///
/// # Errors
///
/// Returns [`GenerateError::StructurallyInvalidDocument`] when a container the
/// builder needs holds a scalar.
pub fn build(
    kind: Kind,
    doc: &Map<String, Value>,
    builder: &mut GraphBuilder,
    options: &RenderOptions,
) -> Result<(), GenerateError> {
    tracing::debug!(kind = %kind, "building graph");
    match kind {
        Kind::SiteTopology => site_topology::build(doc, builder),
        Kind::SiteEquipment => site_equipment::build(doc, builder, options),
        Kind::RackServers => rack_servers::build(doc, builder, options),
        Kind::ServerDetails => server_details::build(doc, builder, options),
        Kind::Topology => legacy::build_topology(doc, builder),
        Kind::Device => legacy::build_device(doc, builder, options),
        Kind::Links => legacy::build_links(doc, builder),
        Kind::Intent => legacy::build_intent(doc, builder),
        Kind::Unknown => {
            builder.comment(UNKNOWN_SCHEMA_COMMENT);
            builder.warn(Diagnostic::UnknownSchema { keys: doc.keys().cloned().collect() });
            Ok(())
        }
    }
}

// =============================================================================
// STYLES
// =============================================================================

fn device_style(kind: &str) -> Attrs {
    let (shape, fill) = match kind.to_ascii_lowercase().as_str() {
        "server" => ("box", "#E3F2FD"),
        "server_group" => ("box3d", "#BBDEFB"),
        "switch" | "spine" | "leaf" => ("box", "#C8E6C9"),
        "router" => ("box", "#FFE0B2"),
        "firewall" => ("box", "#FFCDD2"),
        "storage" => ("cylinder", "#E1BEE7"),
        "pdu" | "ups" => ("box", "#FFF9C4"),
        "load_balancer" | "lb" => ("box", "#D1C4E9"),
        "patch_panel" => ("box", "#F5F5F5"),
        _ => ("box", "#ECEFF1"),
    };
    Attrs::new().raw("shape", shape).text("fillcolor", fill)
}

fn anchor_style() -> Attrs {
    Attrs::new()
        .raw("shape", "box")
        .text("style", "filled,bold")
        .text("fillcolor", "#37474F")
        .text("fontcolor", "#FFFFFF")
}

fn port_style() -> Attrs {
    Attrs::new().raw("shape", "box").raw("fontsize", "8").text("fillcolor", "#FAFAFA")
}

fn peer_style(kind: &str) -> Attrs {
    device_style(kind).text("style", "filled,dashed")
}

fn cluster_style(label: Option<&str>) -> Attrs {
    let attrs = Attrs::new().text("style", "rounded").text("color", "#607D8B");
    match label {
        Some(label) => attrs.text("label", label),
        None => attrs,
    }
}

// =============================================================================
// NODES
// =============================================================================

/// Label lines for a device: name, model when distinct, optional rack unit.
fn device_lines(device: &Device, show_unit: bool) -> Vec<String> {
    let mut lines = vec![device.label.clone()];
    if let Some(model) = &device.model
        && !device.label.starts_with(model.as_str())
    {
        lines.push(model.clone());
    }
    if show_unit && device.is_positioned() {
        lines.push(format!("U{}", device.rack_unit_start));
    }
    lines
}

fn device_decl(device: &Device, entity: EntityType, show_unit: bool) -> NodeDecl {
    NodeDecl::new(&device.id, entity, &device.id)
        .label(device_lines(device, show_unit))
        .attrs(device_style(&device.kind))
}

/// Logical key of a port node.
fn port_key(owner: &str, port: &str) -> String {
    format!("{owner}:{port}")
}

fn port_node(builder: &mut GraphBuilder, owner: &str, port: &Port) -> String {
    let key = port_key(owner, &port.name);
    let mut lines = vec![port.label.clone()];
    lines.extend(port.speed.clone());
    builder.node(NodeDecl::new(&key, EntityType::Port, &key).label(lines).attrs(port_style()))
}

/// Emit one rack as a cluster: anchor, devices by descending rack unit, then
/// the ports of those devices. Returns the anchor id.
fn rack_cluster(builder: &mut GraphBuilder, rack: &Rack, entity: EntityType, options: &RenderOptions) -> String {
    builder.cluster(&rack.id, cluster_style(None), |b| {
        let anchor = b.node(
            NodeDecl::new(format!("rack_{}", rack.id), EntityType::Rack, &rack.id)
                .label(vec![rack.label.clone()])
                .attrs(anchor_style()),
        );
        let ordered = layout::rack_order(&rack.devices);

        let mut chain = vec![anchor.clone()];
        let mut owners = Vec::with_capacity(ordered.len());
        for device in &ordered {
            let id = b.node(device_decl(device, entity, true));
            owners.push(id.clone());
            chain.push(id);
        }

        if options.include_ports {
            for (device, owner) in ordered.iter().zip(&owners) {
                for port in &device.ports {
                    let port_id = port_node(b, &device.id, port);
                    b.edge(owner, &port_id, port_link_style());
                    chain.push(port_id);
                }
            }
        }

        layout::order_chain(b, &chain);
        anchor
    })
}

fn port_link_style() -> Attrs {
    Attrs::new().raw("dir", "none").raw("style", "dotted").text("color", "#9E9E9E")
}

// =============================================================================
// EDGES
// =============================================================================

/// A resolved endpoint: the node to attach to and the port to print, if the
/// port has no node of its own.
struct Attachment {
    id: String,
    port_label: Option<String>,
}

/// Resolve one endpoint. A `{device, port}` endpoint attaches to the port
/// node when one was emitted, otherwise to the device with a port label.
fn attach(
    builder: &mut GraphBuilder,
    resolver: &Resolver,
    endpoint: &Endpoint,
    context: &str,
) -> Option<Attachment> {
    let device = match resolver.resolve(&endpoint.device, builder) {
        Ok(device) => device,
        Err(unresolved) => {
            builder.warn(Diagnostic::UnresolvedEndpoint {
                token: endpoint.device.clone(),
                reason: unresolved.reason().to_owned(),
                context: context.to_owned(),
            });
            return None;
        }
    };
    let Some(port) = &endpoint.port else {
        return Some(Attachment { id: device.graph_id, port_label: None });
    };
    match builder.lookup(&port_key(&device.key, port)) {
        Some(port_id) => Some(Attachment { id: port_id.to_owned(), port_label: None }),
        None => Some(Attachment { id: device.graph_id, port_label: Some(port.clone()) }),
    }
}

/// Resolve and add one connection edge. Unresolved ends drop the edge.
fn connect(builder: &mut GraphBuilder, resolver: &Resolver, connection: &Connection) {
    let from = attach(builder, resolver, &connection.from, &connection.context);
    let to = attach(builder, resolver, &connection.to, &connection.context);
    let (Some(from), Some(to)) = (from, to) else {
        return;
    };

    let mut attrs = connection.edge_attrs();
    if let Some(port) = &from.port_label {
        attrs = attrs.text("taillabel", port);
    }
    if let Some(port) = &to.port_label {
        attrs = attrs.text("headlabel", port);
    }
    builder.edge(&from.id, &to.id, attrs);
}

fn connect_all(builder: &mut GraphBuilder, resolver: &Resolver, connections: &[Connection], problems: Vec<Diagnostic>) {
    for problem in problems {
        builder.warn(problem);
    }
    for connection in connections {
        connect(builder, resolver, connection);
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
