//! Topology-to-diagram generator.
//!
//! Takes a decoded infrastructure document (sites, racks, equipment, servers,
//! ports, connections) in any of the supported schema versions and produces a
//! Graphviz DOT program plus a node-id map for click-to-navigate UIs. The
//! crate is synchronous and does no I/O; rendering the DOT text is left to an
//! external Graphviz process.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`classify`] | Schema classifier: document → [`Kind`] |
//! | [`sanitize`] | DOT identifier and label escaping, rack-unit extraction |
//! | [`model`] | Normalized views of sites, racks, devices and ports |
//! | [`connection`] | Connection records of every shape → [`connection::Connection`] |
//! | [`builders`] | Per-kind node, cluster and edge emission |
//! | [`resolve`] | Endpoint token → emitted node |
//! | [`layout`] | Invisible ordering edges and the same-rank directive |
//! | [`serialize`] | Graph → DOT text |
//! | [`graph`] | Output graph model, [`GraphBuilder`], [`NodeIdMap`] |
//! | [`diagnostics`] | [`GenerateError`] and recoverable [`Diagnostic`]s |
//! | [`options`] | [`RenderOptions`] |

pub mod builders;
pub mod classify;
pub mod connection;
pub mod diagnostics;
pub mod graph;
pub mod layout;
pub mod model;
pub mod options;
pub mod resolve;
pub mod sanitize;
pub mod serialize;

use serde::Serialize;
use serde_json::Value;

pub use classify::{Kind, classify};
pub use diagnostics::{Diagnostic, ErrorCode, GenerateError};
pub use graph::{EntityType, GraphBuilder, NodeIdMap, NodeRef};
pub use options::{RankDir, RenderOptions};

/// Result of one generation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Generated {
    pub kind: Kind,
    pub dot: String,
    pub node_ids: NodeIdMap,
    pub diagnostics: Vec<Diagnostic>,
}

/// Generate a DOT program and node-id map for `document`.
///
/// Every call builds its own id allocator and node map, so calls are
/// independent and may run concurrently.
///
/// # Errors
///
/// Returns [`GenerateError::StructurallyInvalidDocument`] when the document is
/// not a mapping, or when a container the matching builder needs holds a
/// scalar. Everything else is reported through [`Generated::diagnostics`].
pub fn generate(document: &Value, options: &RenderOptions) -> Result<Generated, GenerateError> {
    let Some(map) = document.as_object() else {
        return Err(GenerateError::invalid("$", "mapping", document));
    };

    let kind = classify(document);
    tracing::debug!(kind = %kind, keys = map.len(), "classified document");

    let mut builder = GraphBuilder::new();
    builders::build(kind, map, &mut builder, options)?;
    let (graph, node_ids, diagnostics) = builder.finish();
    let dot = serialize::to_dot(&graph, options);

    tracing::debug!(
        kind = %kind,
        nodes = node_ids.len(),
        edges = graph.edges.len(),
        diagnostics = diagnostics.len(),
        "generated diagram"
    );
    Ok(Generated { kind, dot, node_ids, diagnostics })
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
