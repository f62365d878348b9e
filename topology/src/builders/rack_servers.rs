//! Servers keyed by the rack they are mounted in.

use serde_json::{Map, Value};

use super::connect_all;
use super::site_equipment::emit_racks;
use crate::connection::{CableCatalog, decode_equipment};
use crate::diagnostics::GenerateError;
use crate::graph::{EntityType, GraphBuilder};
use crate::layout;
use crate::model;
use crate::options::RenderOptions;
use crate::resolve::Resolver;

pub(super) fn build(
    doc: &Map<String, Value>,
    builder: &mut GraphBuilder,
    options: &RenderOptions,
) -> Result<(), GenerateError> {
    let racks = model::rack_servers(doc)?;
    let (connections, problems) = decode_equipment(doc, &CableCatalog::from_document(doc))?;

    let anchors = emit_racks(builder, &racks, EntityType::Server, options);
    layout::side_by_side(builder, &anchors);

    let resolver = Resolver::for_devices(racks.iter().flat_map(|r| &r.devices));
    connect_all(builder, &resolver, &connections, problems);
    Ok(())
}
