//! Layout annotator: ordering hints for the external renderer.
//!
//! Graphviz takes no coordinates, so vertical order inside a cluster is forced
//! with invisible edges between consecutive siblings, and sibling racks are
//! pinned side by side with one same-rank group per document.

use std::cmp::Reverse;

use crate::graph::GraphBuilder;
use crate::model::Device;

/// Devices of a rack in display order: highest rack unit first, ties by
/// document order, unpositioned devices last.
#[must_use]
pub fn rack_order(devices: &[Device]) -> Vec<&Device> {
    let mut ordered: Vec<&Device> = devices.iter().collect();
    ordered.sort_by_key(|d| (!d.is_positioned(), Reverse(d.rack_unit_start), d.order));
    ordered
}

/// Chain `ids` top to bottom with invisible edges in the open cluster.
pub fn order_chain(builder: &mut GraphBuilder, ids: &[String]) {
    for pair in ids.windows(2) {
        builder.ordering_edge(&pair[0], &pair[1]);
    }
}

/// Put `anchors` on one rank. A single anchor needs no directive.
pub fn side_by_side(builder: &mut GraphBuilder, anchors: &[String]) {
    if anchors.len() > 1 {
        builder.same_rank(anchors);
    }
}

#[cfg(test)]
#[path = "layout_test.rs"]
mod tests;
