//! Connection records: every schema's link shape adapted into [`Connection`].
//!
//! Records come as flat strings (`from: "sw1"`), as `{device, port}` objects,
//! or as one of the categorized equipment lists (power, data, optional).
//! Decoding never fails: a record without both endpoints is skipped and
//! reported as [`Diagnostic::MalformedConnectionRecord`].

use serde_json::{Map, Value};

use crate::diagnostics::{Diagnostic, GenerateError, json_type_name};
use crate::graph::Attrs;
use crate::model::{first_text, list, text};

/// Fallback cable name when neither the catalog nor the record names one.
pub const DEFAULT_CABLE_NAME: &str = "ケーブル";

const POWER_COLOR: &str = "#C62828";
const INACTIVE_COLOR: &str = "gray60";

// =============================================================================
// ENDPOINTS
// =============================================================================

/// One end of a connection: a device token and an optional port name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub device: String,
    pub port: Option<String>,
}

impl Endpoint {
    /// Decode `"sw1"`, `42` or `{device|id|node, port|interface}`.
    #[must_use]
    pub fn decode(value: &Value) -> Option<Self> {
        match value {
            Value::String(device) => Some(Self { device: device.clone(), port: None }),
            Value::Number(n) => Some(Self { device: n.to_string(), port: None }),
            Value::Object(map) => {
                let device = ["device", "id", "node"].iter().find_map(|key| match map.get(*key)? {
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                })?;
                Some(Self { device, port: first_text(map, &["port", "interface"]) })
            }
            _ => None,
        }
    }
}

// =============================================================================
// CONNECTIONS
// =============================================================================

/// Which list a record came from. Drives label composition and styling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    /// Legacy `connections` / `links`.
    Link,
    /// Site-to-site links.
    Site,
    Power,
    Data,
    Optional,
    /// Intent flows.
    Flow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Solid,
    Dashed,
    Dotted,
    /// Data link switched off; dashed and grey.
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub from: Endpoint,
    pub to: Endpoint,
    /// Label lines, already composed.
    pub label: Vec<String>,
    pub style: LineStyle,
    pub category: Category,
    /// JSON path of the source record, for diagnostics.
    pub context: String,
}

impl Connection {
    /// Edge attributes for this connection, port labels excluded.
    #[must_use]
    pub fn edge_attrs(&self) -> Attrs {
        let mut attrs = Attrs::new();
        if self.label.iter().any(|line| !line.trim().is_empty()) {
            attrs = attrs.lines("label", &self.label);
        }
        attrs = match self.style {
            LineStyle::Solid => attrs,
            LineStyle::Dashed => attrs.raw("style", "dashed"),
            LineStyle::Dotted => attrs.raw("style", "dotted"),
            LineStyle::Inactive => {
                attrs.raw("style", "dashed").text("color", INACTIVE_COLOR).text("fontcolor", INACTIVE_COLOR)
            }
        };
        if self.category == Category::Power {
            attrs = attrs.text("color", POWER_COLOR);
        }
        attrs
    }
}

// =============================================================================
// CABLE CATALOG
// =============================================================================

/// The document's optional `cable_types` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct CableCatalog<'a> {
    table: Option<&'a Map<String, Value>>,
}

impl<'a> CableCatalog<'a> {
    #[must_use]
    pub fn from_document(doc: &'a Map<String, Value>) -> Self {
        Self { table: doc.get("cable_types").and_then(Value::as_object) }
    }

    /// Display name of a record's cable.
    ///
    /// `cable_types[key].spec` → `.name` → the raw key → the record's own
    /// `name` → [`DEFAULT_CABLE_NAME`].
    #[must_use]
    pub fn describe(&self, record: &Map<String, Value>) -> String {
        let key = first_text(record, &["cable_type", "cable"]);
        if let Some(key) = key {
            let entry = self.table.and_then(|t| t.get(&key)).and_then(Value::as_object);
            return entry.and_then(|e| first_text(e, &["spec", "name"])).unwrap_or(key);
        }
        text(record, "name").unwrap_or_else(|| DEFAULT_CABLE_NAME.to_owned())
    }
}

// =============================================================================
// DECODING
// =============================================================================

/// Decode one list of connection records.
///
/// Returns the usable connections and one diagnostic per skipped record.
#[must_use]
pub fn decode_list(
    records: &[Value],
    category: Category,
    path: &str,
    catalog: &CableCatalog<'_>,
) -> (Vec<Connection>, Vec<Diagnostic>) {
    let mut connections = Vec::with_capacity(records.len());
    let mut problems = Vec::new();

    for (i, record) in records.iter().enumerate() {
        let context = format!("{path}[{i}]");
        let Some(map) = record.as_object() else {
            problems.push(Diagnostic::MalformedConnectionRecord {
                context,
                reason: format!("expected mapping, found {}", json_type_name(record)),
            });
            continue;
        };

        let from = map.get("from").or_else(|| map.get("source")).and_then(Endpoint::decode);
        let to = map.get("to").or_else(|| map.get("target")).and_then(Endpoint::decode);
        let (from, to) = match (from, to) {
            (Some(from), Some(to)) => (from, to),
            (None, _) => {
                problems.push(Diagnostic::MalformedConnectionRecord {
                    context,
                    reason: "missing source endpoint `from`".to_owned(),
                });
                continue;
            }
            (_, None) => {
                problems.push(Diagnostic::MalformedConnectionRecord {
                    context,
                    reason: "missing destination endpoint `to`".to_owned(),
                });
                continue;
            }
        };

        let (label, style) = compose(map, category, catalog);
        connections.push(Connection { from, to, label, style, category, context });
    }

    (connections, problems)
}

/// Decode every connection list an equipment document may carry, in the
/// order `connections`, `power_connections`, `data_connections`,
/// `optional_connections`.
///
/// # Errors
///
/// Returns [`GenerateError::StructurallyInvalidDocument`] when one of the
/// lists is present but not a list.
pub fn decode_equipment(
    doc: &Map<String, Value>,
    catalog: &CableCatalog<'_>,
) -> Result<(Vec<Connection>, Vec<Diagnostic>), GenerateError> {
    const LISTS: [(&str, Category); 4] = [
        ("connections", Category::Link),
        ("power_connections", Category::Power),
        ("data_connections", Category::Data),
        ("optional_connections", Category::Optional),
    ];

    let mut connections = Vec::new();
    let mut problems = Vec::new();
    for (key, category) in LISTS {
        let records = list(doc, key, "$")?;
        let (found, skipped) = decode_list(records, category, &format!("$.{key}"), catalog);
        connections.extend(found);
        problems.extend(skipped);
    }
    Ok((connections, problems))
}

fn compose(record: &Map<String, Value>, category: Category, catalog: &CableCatalog<'_>) -> (Vec<String>, LineStyle) {
    match category {
        Category::Link => (present(record, &["type", "bandwidth", "network", "description"]), LineStyle::Solid),
        Category::Site => (present(record, &["type", "bandwidth", "provider"]), LineStyle::Solid),
        Category::Flow => (present(record, &["action", "protocol", "bandwidth", "description"]), LineStyle::Solid),
        Category::Power => {
            let count = text(record, "count").unwrap_or_else(|| "1".to_owned());
            (vec![format!("{} ({count}本)", catalog.describe(record))], LineStyle::Dashed)
        }
        Category::Data => {
            let style = if is_inactive(record) { LineStyle::Inactive } else { LineStyle::Solid };
            (vec![data_label(record, catalog)], style)
        }
        Category::Optional => {
            let mut label = data_label(record, catalog);
            if let Some(condition) = text(record, "condition") {
                label.push_str(&format!(" [{condition}]"));
            }
            (vec![label], LineStyle::Dotted)
        }
    }
}

fn present(record: &Map<String, Value>, fields: &[&str]) -> Vec<String> {
    fields.iter().filter_map(|field| text(record, field)).collect()
}

fn data_label(record: &Map<String, Value>, catalog: &CableCatalog<'_>) -> String {
    let mut label = catalog.describe(record);
    if let Some(speed) = text(record, "speed") {
        label.push(' ');
        label.push_str(&speed);
    }
    if let Some(count) = text(record, "count") {
        label.push_str(&format!(" ({count}本)"));
    }
    if let Some(purpose) = text(record, "purpose") {
        label.push_str(&format!(" [{purpose}]"));
    }
    if let Some(range) = text(record, "range") {
        label.push_str(&format!(" ({range})"));
    }
    label
}

fn is_inactive(record: &Map<String, Value>) -> bool {
    if matches!(record.get("active"), Some(Value::Bool(false))) {
        return true;
    }
    text(record, "status")
        .is_some_and(|status| status.eq_ignore_ascii_case("inactive") || status.eq_ignore_ascii_case("disabled"))
}

#[cfg(test)]
#[path = "connection_test.rs"]
mod tests;
