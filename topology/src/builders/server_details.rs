//! Per-server hardware detail: one cluster per server with a nested port
//! cluster, peer equipment as plain nodes, and per-port links.

use serde_json::{Map, Value};

use super::{anchor_style, cluster_style, connect_all, device_lines, peer_style, port_node};
use crate::connection::{CableCatalog, Category, Connection, Endpoint, LineStyle, decode_equipment};
use crate::diagnostics::GenerateError;
use crate::graph::{EntityType, GraphBuilder, NodeDecl};
use crate::layout;
use crate::model::{self, Device};
use crate::options::RenderOptions;
use crate::resolve::Resolver;

pub(super) fn build(
    doc: &Map<String, Value>,
    builder: &mut GraphBuilder,
    options: &RenderOptions,
) -> Result<(), GenerateError> {
    let servers = model::one_or_many(doc, "server", "servers", "$")?
        .into_iter()
        .enumerate()
        .map(|(i, (value, path))| model::device(value, "server", i, &path, "server"))
        .collect::<Result<Vec<_>, _>>()?;
    let peers = model::device_list(doc, &["devices", "peers"], "peer", "$", "device")?;
    let (mut connections, problems) = decode_equipment(doc, &CableCatalog::from_document(doc))?;
    connections.extend(port_links(&servers));

    let anchors: Vec<String> = servers.iter().map(|server| server_cluster(builder, server, options)).collect();
    layout::order_chain(builder, &anchors);

    for peer in &peers {
        builder.node(
            NodeDecl::new(&peer.id, EntityType::Peer, &peer.id)
                .label(device_lines(peer, false))
                .attrs(peer_style(&peer.kind)),
        );
    }

    let resolver = Resolver::for_devices(servers.iter().chain(&peers));
    connect_all(builder, &resolver, &connections, problems);
    Ok(())
}

fn server_cluster(builder: &mut GraphBuilder, server: &Device, options: &RenderOptions) -> String {
    builder.cluster(&server.id, cluster_style(None), |b| {
        let mut lines = device_lines(server, true);
        lines.extend(server.details.iter().cloned());
        let anchor =
            b.node(NodeDecl::new(&server.id, EntityType::Server, &server.id).label(lines).attrs(anchor_style()));

        if options.include_ports && !server.ports.is_empty() {
            let ports = b.cluster(&format!("{}_ports", server.id), cluster_style(Some("Ports")), |pb| {
                let ids: Vec<String> = server.ports.iter().map(|port| port_node(pb, &server.id, port)).collect();
                layout::order_chain(pb, &ids);
                ids
            });
            if let Some(first) = ports.first() {
                b.ordering_edge(&anchor, first);
            }
        }
        anchor
    })
}

/// Links declared on the ports themselves via `connected_to`.
fn port_links(servers: &[Device]) -> Vec<Connection> {
    servers
        .iter()
        .flat_map(|server| {
            server.ports.iter().enumerate().filter_map(move |(i, port)| {
                let peer = port.connected_to.clone()?;
                Some(Connection {
                    from: Endpoint { device: server.id.clone(), port: Some(port.name.clone()) },
                    to: peer,
                    label: port.speed.iter().cloned().collect(),
                    style: LineStyle::Solid,
                    category: Category::Link,
                    context: format!("{}.ports[{i}].connected_to", server.id),
                })
            })
        })
        .collect()
}
