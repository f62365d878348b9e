//! Sites as top-level nodes, site links as labelled edges.

use serde_json::{Map, Value};

use super::connect_all;
use crate::connection::{CableCatalog, Category, decode_list};
use crate::diagnostics::GenerateError;
use crate::graph::{Attrs, EntityType, GraphBuilder, NodeDecl};
use crate::model::{self, Site};
use crate::resolve::Resolver;

pub(super) fn build(doc: &Map<String, Value>, builder: &mut GraphBuilder) -> Result<(), GenerateError> {
    let sites = model::sites(doc)?;
    let records = model::list(doc, "connections", "$")?;
    let (connections, problems) = decode_list(records, Category::Site, "$.connections", &CableCatalog::default());

    for site in &sites {
        builder.node(site_decl(site));
    }

    let resolver = Resolver::new(sites.iter().map(|s| (s.id.clone(), s.kind.clone().unwrap_or_default())));
    connect_all(builder, &resolver, &connections, problems);
    Ok(())
}

fn site_decl(site: &Site) -> NodeDecl {
    let mut lines = vec![site.label.clone()];
    lines.extend(site.address.clone());
    lines.extend(site.capacity.as_ref().map(|c| format!("capacity: {c}")));
    NodeDecl::new(&site.id, EntityType::Site, &site.id)
        .label(lines)
        .attrs(Attrs::new().raw("shape", "box3d").text("fillcolor", "#E8EAF6"))
}
