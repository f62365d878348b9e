//! Connection resolver: endpoint token → node emitted for this document.
//!
//! Resolution order:
//!
//! 1. exact match: a device declared under that raw id, then any other node
//!    of the current run (sites, implied link nodes);
//! 2. type fallback: the first device in document order whose `type` equals
//!    the token, provided that device was emitted;
//! 3. unresolved.
//!
//! A resolver is built per document from that document's device list, so no
//! candidates leak between runs.

use crate::graph::GraphBuilder;
use crate::model::Device;

/// Tokens that never resolve, whatever the document contains.
const PLACEHOLDER_TOKENS: [&str; 2] = ["", "undefined"];

/// True for `""`, whitespace and the literal `undefined`.
#[must_use]
pub fn is_placeholder(token: &str) -> bool {
    PLACEHOLDER_TOKENS.contains(&token.trim())
}

/// A successful resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// DOT id of the matched node.
    pub graph_id: String,
    /// Logical key the match was found under.
    pub key: String,
}

/// Why a token did not resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unresolved {
    Placeholder,
    NoMatch,
    /// A device of that type exists but was never emitted.
    TypeMatchNotEmitted,
}

impl Unresolved {
    #[must_use]
    pub fn reason(self) -> &'static str {
        match self {
            Self::Placeholder => "empty or placeholder endpoint",
            Self::NoMatch => "no node with this id and no device of this type",
            Self::TypeMatchNotEmitted => "device of this type was not emitted",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Resolver {
    /// `(device id, device type)` in document order.
    candidates: Vec<(String, String)>,
}

impl Resolver {
    #[must_use]
    pub fn new(candidates: impl IntoIterator<Item = (String, String)>) -> Self {
        Self { candidates: candidates.into_iter().collect() }
    }

    #[must_use]
    pub fn for_devices<'a>(devices: impl IntoIterator<Item = &'a Device>) -> Self {
        Self::new(devices.into_iter().map(|d| (d.id.clone(), d.kind.clone())))
    }

    /// Resolve `token` against the nodes `builder` has emitted so far.
    ///
    /// # Errors
    ///
    /// Returns the [`Unresolved`] reason when no node matches.
    pub fn resolve(&self, token: &str, builder: &GraphBuilder) -> Result<Resolved, Unresolved> {
        if is_placeholder(token) {
            return Err(Unresolved::Placeholder);
        }
        let token = token.trim();
        if let Some(id) = builder.lookup_device(token).or_else(|| builder.lookup(token)) {
            return Ok(Resolved { graph_id: id.to_owned(), key: token.to_owned() });
        }

        let Some((device_id, _)) = self.candidates.iter().find(|(_, kind)| kind == token) else {
            return Err(Unresolved::NoMatch);
        };
        tracing::debug!(token, device = %device_id, "endpoint resolved by type");
        builder
            .lookup_device(device_id)
            .map(|id| Resolved { graph_id: id.to_owned(), key: device_id.clone() })
            .ok_or(Unresolved::TypeMatchNotEmitted)
    }
}

#[cfg(test)]
#[path = "resolve_test.rs"]
mod tests;
