//! Lexical rules for DOT identifiers and labels, plus rack-unit extraction.
//!
//! Every builder goes through these functions; nothing else in the crate
//! writes user text into the DOT output.

use serde_json::{Map, Value};

/// Rack unit assigned to devices without position data.
///
/// Assumes no real rack is 9999 units tall. Devices carrying this value are
/// placed after every positioned device of their rack.
pub const UNPOSITIONED_RACK_UNIT: u32 = 9999;

/// Words the DOT grammar reserves (matched case-insensitively).
const DOT_KEYWORDS: [&str; 6] = ["node", "edge", "graph", "digraph", "subgraph", "strict"];

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Convert a logical identifier into a DOT identifier.
///
/// Plain `[A-Za-z_][A-Za-z0-9_]*` words pass through. Strings that are
/// already well-formed quoted DOT ids pass through, which makes the function
/// idempotent. Everything else is quoted with `\` and `"` escaped.
#[must_use]
pub fn sanitize_id(raw: &str) -> String {
    if is_bare_id(raw) || is_quoted_id(raw) {
        return raw.to_owned();
    }
    format!("\"{}\"", escape_quoted(raw))
}

/// True when `raw` can appear unquoted in a DOT statement.
#[must_use]
pub fn is_bare_id(raw: &str) -> bool {
    let mut chars = raw.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return false;
    }
    !DOT_KEYWORDS.iter().any(|kw| kw.eq_ignore_ascii_case(raw))
}

/// True when `raw` is a double-quoted string whose inner quotes and
/// backslashes are all escaped.
#[must_use]
pub fn is_quoted_id(raw: &str) -> bool {
    let Some(inner) = raw.strip_prefix('"').and_then(|s| s.strip_suffix('"')) else {
        return false;
    };
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if chars.next().is_none() {
                    return false;
                }
            }
            '"' => return false,
            c if c.is_control() => return false,
            _ => {}
        }
    }
    true
}

/// The identity Graphviz sees for a sanitized id: `x` and `"x"` are the same
/// node, so quotes are not part of it.
#[must_use]
pub fn canonical_id(sanitized: &str) -> &str {
    if is_quoted_id(sanitized) {
        &sanitized[1..sanitized.len() - 1]
    } else {
        sanitized
    }
}

/// Append `_{n}` to a sanitized id, keeping it inside the quotes if quoted.
#[must_use]
pub fn suffix_id(sanitized: &str, n: usize) -> String {
    if is_quoted_id(sanitized) {
        format!("\"{}_{n}\"", canonical_id(sanitized))
    } else {
        format!("{sanitized}_{n}")
    }
}

fn escape_quoted(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 2);
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

// =============================================================================
// LABELS
// =============================================================================

/// Escape text for use inside a quoted DOT label.
///
/// Single pass over the input, so the backslashes this function writes are
/// never escaped a second time.
#[must_use]
pub fn sanitize_label(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            '\t' => out.push(' '),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

/// Sanitize each line and join them with DOT's `\n` line break.
/// Blank lines are dropped.
#[must_use]
pub fn label_lines<S: AsRef<str>>(lines: &[S]) -> String {
    lines
        .iter()
        .map(AsRef::as_ref)
        .filter(|line| !line.trim().is_empty())
        .map(sanitize_label)
        .collect::<Vec<_>>()
        .join("\\n")
}

// =============================================================================
// RACK UNITS
// =============================================================================

/// Starting rack unit of a device.
///
/// Resolution order: first element of `positionRange` (or `position_range`),
/// then `position.unit` as a number or a range string like `"12-15"`, then
/// [`UNPOSITIONED_RACK_UNIT`].
#[must_use]
pub fn rack_unit_start(device: &Map<String, Value>) -> u32 {
    let range = device.get("positionRange").or_else(|| device.get("position_range"));
    if let Some(unit) = range.and_then(Value::as_array).and_then(|r| r.first()).and_then(unit_value) {
        return unit;
    }
    if let Some(unit) = device.get("position").and_then(|p| p.get("unit")).and_then(unit_value) {
        return unit;
    }
    UNPOSITIONED_RACK_UNIT
}

fn unit_value(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => {
            if let Some(u) = n.as_u64() {
                let Ok(unit) = u32::try_from(u) else {
                    return None;
                };
                return Some(unit);
            }
            let f = n.as_f64().filter(|f| f.is_finite() && *f >= 0.0 && *f <= f64::from(u32::MAX))?;
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let unit = f.floor() as u32;
            Some(unit)
        }
        Value::String(s) => leading_integer(s),
        _ => None,
    }
}

/// Parse the leading run of ASCII digits (`"12-15"` → 12, `"U7"` → none).
fn leading_integer(raw: &str) -> Option<u32> {
    let digits: String = raw.trim_start().chars().take_while(char::is_ascii_digit).collect();
    let Ok(unit) = digits.parse() else {
        return None;
    };
    Some(unit)
}

#[cfg(test)]
#[path = "sanitize_test.rs"]
mod tests;
