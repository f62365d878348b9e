//! Schema classifier: decides which builder handles a document.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Category of an input document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    /// Sites and the links between them.
    SiteTopology,
    /// One or more racks with their mounted equipment and cabling.
    SiteEquipment,
    /// Servers keyed by the rack they are mounted in.
    RackServers,
    /// Per-server hardware detail with ports.
    ServerDetails,
    /// Legacy flat device/connection topology.
    Topology,
    /// Legacy single-device description.
    Device,
    /// Legacy bare link list.
    Links,
    /// Legacy network intent.
    Intent,
    /// Nothing recognizable.
    Unknown,
}

/// Marker keys in priority order. Document-specific markers come before the
/// four legacy generic keys.
const MARKERS: &[(&str, Kind)] = &[
    ("sites", Kind::SiteTopology),
    ("rack_servers", Kind::RackServers),
    ("server", Kind::ServerDetails),
    ("servers", Kind::ServerDetails),
    ("rack", Kind::SiteEquipment),
    ("racks", Kind::SiteEquipment),
    ("topology", Kind::Topology),
    ("device", Kind::Device),
    ("links", Kind::Links),
    ("intent", Kind::Intent),
];

impl Kind {
    /// Stable snake_case name used in logs and reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SiteTopology => "site_topology",
            Self::SiteEquipment => "site_equipment",
            Self::RackServers => "rack_servers",
            Self::ServerDetails => "server_details",
            Self::Topology => "topology",
            Self::Device => "device",
            Self::Links => "links",
            Self::Intent => "intent",
            Self::Unknown => "unknown",
        }
    }

    #[must_use]
    pub fn is_legacy(self) -> bool {
        matches!(self, Self::Topology | Self::Device | Self::Links | Self::Intent)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classify a decoded document by the presence of top-level marker keys.
///
/// Total: anything that is not a mapping, or has no marker key, is
/// [`Kind::Unknown`].
#[must_use]
pub fn classify(document: &Value) -> Kind {
    let Some(map) = document.as_object() else {
        return Kind::Unknown;
    };
    MARKERS
        .iter()
        .find(|(key, _)| map.contains_key(*key))
        .map_or(Kind::Unknown, |&(_, kind)| kind)
}

#[cfg(test)]
#[path = "classify_test.rs"]
mod tests;
