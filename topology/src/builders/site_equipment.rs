//! Racks with mounted equipment and categorized cabling.

use serde_json::{Map, Value};

use super::{cluster_style, connect_all, rack_cluster};
use crate::connection::{CableCatalog, decode_equipment};
use crate::diagnostics::GenerateError;
use crate::graph::{EntityType, GraphBuilder};
use crate::layout;
use crate::model::{self, Rack};
use crate::options::RenderOptions;
use crate::resolve::Resolver;

pub(super) fn build(
    doc: &Map<String, Value>,
    builder: &mut GraphBuilder,
    options: &RenderOptions,
) -> Result<(), GenerateError> {
    let racks = model::racks(doc)?;
    let site = model::site_header(doc)?;
    let (connections, problems) = decode_equipment(doc, &CableCatalog::from_document(doc))?;

    let anchors = match &site {
        Some(site) => builder.cluster(&format!("site_{}", site.id), cluster_style(Some(&site.label)), |b| {
            emit_racks(b, &racks, EntityType::Device, options)
        }),
        None => emit_racks(builder, &racks, EntityType::Device, options),
    };
    layout::side_by_side(builder, &anchors);

    let resolver = Resolver::for_devices(racks.iter().flat_map(|r| &r.devices));
    connect_all(builder, &resolver, &connections, problems);
    Ok(())
}

/// One cluster per rack, in document order. Returns the anchor ids.
pub(super) fn emit_racks(
    builder: &mut GraphBuilder,
    racks: &[Rack],
    entity: EntityType,
    options: &RenderOptions,
) -> Vec<String> {
    racks.iter().map(|rack| rack_cluster(builder, rack, entity, options)).collect()
}
