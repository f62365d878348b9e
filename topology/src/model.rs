//! Read-only views over a decoded document.
//!
//! DESIGN
//! ======
//! Schema versions disagree on shape, so the differences are flattened here,
//! once, right after classification:
//!
//! - singular `rack` and plural `racks` become one list;
//! - `devices` and `equipment` become one field (`devices` wins);
//! - `ports` and `interfaces` become one field (`ports` wins);
//! - bare strings in entity lists become id-only entries.
//!
//! Builders only ever see [`Rack`], [`Device`], [`Port`] and [`Site`].

use serde_json::{Map, Value};

use crate::connection::Endpoint;
use crate::diagnostics::GenerateError;
use crate::sanitize::{UNPOSITIONED_RACK_UNIT, rack_unit_start};

/// Device type collapsed into a single node regardless of `count`.
pub const SERVER_GROUP_TYPE: &str = "server_group";

/// Scalar fields shown as extra label lines on detailed servers.
const DETAIL_FIELDS: &[(&str, &str)] = &[
    ("cpu", "CPU"),
    ("memory", "Memory"),
    ("storage", "Storage"),
    ("os", "OS"),
    ("ip", "IP"),
    ("management_ip", "Mgmt"),
];

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub id: String,
    pub label: String,
    pub kind: Option<String>,
    pub address: Option<String>,
    pub capacity: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rack {
    pub id: String,
    pub label: String,
    /// Mounted devices in document order.
    pub devices: Vec<Device>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub id: String,
    pub label: String,
    pub kind: String,
    pub model: Option<String>,
    pub rack_unit_start: u32,
    pub is_group: bool,
    pub count: Option<u64>,
    pub zone: Option<String>,
    pub details: Vec<String>,
    pub ports: Vec<Port>,
    /// Position in the source list; breaks rack-unit ties.
    pub order: usize,
}

impl Device {
    #[must_use]
    pub fn is_positioned(&self) -> bool {
        self.rack_unit_start != UNPOSITIONED_RACK_UNIT
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub name: String,
    pub label: String,
    pub speed: Option<String>,
    pub connected_to: Option<Endpoint>,
}

// =============================================================================
// SCALARS
// =============================================================================

/// Non-blank scalar field as text. Numbers and booleans are stringified.
#[must_use]
pub fn text(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First of `keys` that holds a non-blank scalar.
#[must_use]
pub fn first_text(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| text(map, key))
}

// =============================================================================
// CONTAINERS
// =============================================================================

/// A list field. Absent or null is empty; anything but a list is invalid.
///
/// # Errors
///
/// Returns [`GenerateError::StructurallyInvalidDocument`] when the field holds
/// a scalar or mapping.
pub fn list<'a>(map: &'a Map<String, Value>, key: &str, path: &str) -> Result<&'a [Value], GenerateError> {
    match map.get(key) {
        None | Some(Value::Null) => Ok(&[]),
        Some(Value::Array(items)) => Ok(items),
        Some(other) => Err(GenerateError::invalid(format!("{path}.{key}"), "list", other)),
    }
}

/// The first present list among `keys`, with its path.
///
/// # Errors
///
/// Same as [`list`].
pub fn list_alias<'a>(
    map: &'a Map<String, Value>,
    keys: &[&str],
    path: &str,
) -> Result<(&'a [Value], String), GenerateError> {
    for key in keys {
        if map.get(*key).is_some_and(|v| !v.is_null()) {
            return Ok((list(map, key, path)?, format!("{path}.{key}")));
        }
    }
    Ok((&[], format!("{path}.{}", keys.first().copied().unwrap_or_default())))
}

/// An optional mapping. Null is treated as absent.
///
/// # Errors
///
/// Returns [`GenerateError::StructurallyInvalidDocument`] for scalars and lists.
pub fn mapping<'a>(value: Option<&'a Value>, path: &str) -> Result<Option<&'a Map<String, Value>>, GenerateError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map)),
        Some(other) => Err(GenerateError::invalid(path, "mapping", other)),
    }
}

/// Normalize a field that may hold one entity (`singular`) or many
/// (`plural`) into a list of `(entity, path)` pairs.
///
/// The singular field wins when both are present. Null yields an empty list.
///
/// # Errors
///
/// Returns [`GenerateError::StructurallyInvalidDocument`] when the field holds
/// a number or boolean.
pub fn one_or_many<'a>(
    map: &'a Map<String, Value>,
    singular: &str,
    plural: &str,
    path: &str,
) -> Result<Vec<(&'a Value, String)>, GenerateError> {
    let (key, value) = match (map.get(singular), map.get(plural)) {
        (Some(v), _) if !v.is_null() => (singular, v),
        (_, Some(v)) => (plural, v),
        _ => return Ok(Vec::new()),
    };
    let base = format!("{path}.{key}");
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Object(_) | Value::String(_) => Ok(vec![(value, base)]),
        Value::Array(items) => Ok(items.iter().enumerate().map(|(i, v)| (v, format!("{base}[{i}]"))).collect()),
        other => Err(GenerateError::invalid(base, "mapping or list", other)),
    }
}

// =============================================================================
// ENTITIES
// =============================================================================

/// All racks of a site-equipment style document.
///
/// # Errors
///
/// Propagates structural errors from nested racks and devices.
pub fn racks(doc: &Map<String, Value>) -> Result<Vec<Rack>, GenerateError> {
    one_or_many(doc, "rack", "racks", "$")?
        .into_iter()
        .enumerate()
        .map(|(i, (value, path))| rack(value, i, &path))
        .collect()
}

/// One rack. Strings are id-only racks.
///
/// # Errors
///
/// Returns [`GenerateError::StructurallyInvalidDocument`] for non-mapping racks
/// or malformed device containers.
pub fn rack(value: &Value, index: usize, path: &str) -> Result<Rack, GenerateError> {
    match value {
        Value::String(id) => Ok(Rack { id: id.clone(), label: id.clone(), devices: Vec::new() }),
        Value::Object(map) => {
            let id = first_text(map, &["id", "name"]).unwrap_or_else(|| format!("rack{}", index + 1));
            let label = first_text(map, &["label", "name"]).unwrap_or_else(|| id.clone());
            let devices = device_list(map, &["devices", "equipment"], &id, path, "device")?;
            Ok(Rack { id, label, devices })
        }
        other => Err(GenerateError::invalid(path, "mapping", other)),
    }
}

/// The first present device container among `keys`.
///
/// # Errors
///
/// Propagates structural errors from the list and its entries.
pub fn device_list(
    map: &Map<String, Value>,
    keys: &[&str],
    parent: &str,
    path: &str,
    default_kind: &str,
) -> Result<Vec<Device>, GenerateError> {
    let (items, list_path) = list_alias(map, keys, path)?;
    items
        .iter()
        .enumerate()
        .map(|(i, value)| device(value, parent, i, &format!("{list_path}[{i}]"), default_kind))
        .collect()
}

/// One device, server or group.
///
/// # Errors
///
/// Returns [`GenerateError::StructurallyInvalidDocument`] for entries that are
/// neither a mapping nor a string.
pub fn device(
    value: &Value,
    parent: &str,
    index: usize,
    path: &str,
    default_kind: &str,
) -> Result<Device, GenerateError> {
    let map = match value {
        Value::Object(map) => map,
        Value::String(id) => {
            return Ok(Device {
                id: id.clone(),
                label: id.clone(),
                kind: default_kind.to_owned(),
                model: None,
                rack_unit_start: UNPOSITIONED_RACK_UNIT,
                is_group: false,
                count: None,
                zone: None,
                details: Vec::new(),
                ports: Vec::new(),
                order: index,
            });
        }
        other => return Err(GenerateError::invalid(path, "mapping", other)),
    };

    let id = first_text(map, &["id", "name", "hostname"]).unwrap_or_else(|| format!("{parent}_{}", index + 1));
    let kind = first_text(map, &["type", "device_type"]).unwrap_or_else(|| default_kind.to_owned());
    let model = text(map, "model");
    let is_group = kind == SERVER_GROUP_TYPE;
    let count = map.get("count").and_then(count_value);
    let explicit_label = first_text(map, &["label", "name", "hostname"]);

    let label = match (explicit_label, is_group) {
        (Some(label), _) => label,
        (None, true) => group_label(model.as_deref(), count),
        (None, false) => model.clone().unwrap_or_else(|| id.clone()),
    };

    let details = DETAIL_FIELDS
        .iter()
        .filter_map(|(key, caption)| text(map, key).map(|v| format!("{caption}: {v}")))
        .collect();

    let ports = ports(map, path)?;

    Ok(Device {
        label,
        kind,
        model,
        rack_unit_start: rack_unit_start(map),
        is_group,
        count,
        zone: first_text(map, &["zone", "group"]),
        details,
        ports,
        order: index,
        id,
    })
}

/// Default label of a collapsed server group.
#[must_use]
pub fn group_label(model: Option<&str>, count: Option<u64>) -> String {
    let name = model.unwrap_or("Server Group");
    match count {
        Some(count) => format!("{name} ({count}台)"),
        None => name.to_owned(),
    }
}

fn count_value(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => {
            let Ok(count) = s.trim().parse::<u64>() else {
                return None;
            };
            Some(count)
        }
        _ => None,
    }
}

fn ports(map: &Map<String, Value>, path: &str) -> Result<Vec<Port>, GenerateError> {
    let (items, list_path) = list_alias(map, &["ports", "interfaces"], path)?;
    items
        .iter()
        .enumerate()
        .map(|(i, value)| port(value, i, &format!("{list_path}[{i}]")))
        .collect()
}

fn port(value: &Value, index: usize, path: &str) -> Result<Port, GenerateError> {
    match value {
        Value::String(name) => Ok(Port { name: name.clone(), label: name.clone(), speed: None, connected_to: None }),
        Value::Object(map) => {
            let name = first_text(map, &["name", "id", "port"]).unwrap_or_else(|| format!("port{}", index + 1));
            let label = text(map, "label").unwrap_or_else(|| name.clone());
            let connected_to = ["connected_to", "connectedTo", "peer"]
                .iter()
                .find_map(|key| map.get(*key))
                .and_then(Endpoint::decode);
            Ok(Port { name, label, speed: text(map, "speed"), connected_to })
        }
        other => Err(GenerateError::invalid(path, "mapping", other)),
    }
}

/// All sites of a site-topology document.
///
/// # Errors
///
/// Returns [`GenerateError::StructurallyInvalidDocument`] when `sites` is not a
/// list or an entry is neither a mapping nor a string.
pub fn sites(doc: &Map<String, Value>) -> Result<Vec<Site>, GenerateError> {
    list(doc, "sites", "$")?
        .iter()
        .enumerate()
        .map(|(i, value)| match value {
            Value::String(id) => Ok(Site { id: id.clone(), label: id.clone(), kind: None, address: None, capacity: None }),
            Value::Object(map) => {
                let id = first_text(map, &["id", "name"]).unwrap_or_else(|| format!("site{}", i + 1));
                Ok(Site {
                    label: first_text(map, &["label", "name"]).unwrap_or_else(|| id.clone()),
                    kind: text(map, "type"),
                    address: text(map, "address"),
                    capacity: text(map, "capacity"),
                    id,
                })
            }
            other => Err(GenerateError::invalid(format!("$.sites[{i}]"), "mapping", other)),
        })
        .collect()
}

/// The optional `site` header of an equipment document.
///
/// # Errors
///
/// Returns [`GenerateError::StructurallyInvalidDocument`] for scalar headers
/// other than a string id.
pub fn site_header(doc: &Map<String, Value>) -> Result<Option<Site>, GenerateError> {
    match doc.get("site") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(id)) => {
            Ok(Some(Site { id: id.clone(), label: id.clone(), kind: None, address: None, capacity: None }))
        }
        Some(Value::Object(map)) => {
            let id = first_text(map, &["id", "name"]).unwrap_or_else(|| "site".to_owned());
            Ok(Some(Site {
                label: first_text(map, &["label", "name"]).unwrap_or_else(|| id.clone()),
                kind: text(map, "type"),
                address: text(map, "address"),
                capacity: text(map, "capacity"),
                id,
            }))
        }
        Some(other) => Err(GenerateError::invalid("$.site", "mapping", other)),
    }
}

/// Racks of a rack-servers document: `racks` metadata first, then any rack
/// only named by a `rack_servers` key, in mapping order.
///
/// # Errors
///
/// Returns [`GenerateError::StructurallyInvalidDocument`] when `rack_servers`
/// is not a mapping or a rack entry is neither a list nor a mapping.
pub fn rack_servers(doc: &Map<String, Value>) -> Result<Vec<Rack>, GenerateError> {
    let mut out = racks(doc)?;
    let Some(mapping) = mapping(doc.get("rack_servers"), "$.rack_servers")? else {
        return Ok(out);
    };

    for (rack_id, entry) in mapping {
        let path = format!("$.rack_servers.{rack_id}");
        let (items, label) = match entry {
            Value::Null => (&[][..], None),
            Value::Array(items) => (items.as_slice(), None),
            Value::Object(map) => (list(map, "servers", &path)?, first_text(map, &["label", "name"])),
            other => return Err(GenerateError::invalid(path, "list or mapping", other)),
        };

        let position = match out.iter().position(|r| &r.id == rack_id) {
            Some(position) => position,
            None => {
                out.push(Rack { id: rack_id.clone(), label: label.unwrap_or_else(|| rack_id.clone()), devices: Vec::new() });
                out.len() - 1
            }
        };
        let rack = &mut out[position];
        let offset = rack.devices.len();
        for (i, value) in items.iter().enumerate() {
            rack.devices.push(device(value, rack_id, offset + i, &format!("{path}[{i}]"), "server")?);
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;
