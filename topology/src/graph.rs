//! Output-side graph model and the accumulation contract builders write to.
//!
//! DESIGN
//! ======
//! A fresh [`GraphBuilder`] is created for every generation call. It owns the
//! id allocator, the node-id map and the diagnostics list, so no state leaks
//! between documents and independent calls can run on separate threads.
//!
//! Ids are allocated once per logical key and handed back to the caller;
//! edges are always built from those returned ids, never by re-sanitizing a
//! raw id, so both ends of an edge agree with the declaration.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;

use crate::diagnostics::{Diagnostic, ErrorCode};
use crate::sanitize::{canonical_id, label_lines, sanitize_id, sanitize_label, suffix_id};

// =============================================================================
// NODE ID MAP
// =============================================================================

/// What a diagram node stands for in the source document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Site,
    Rack,
    Device,
    Server,
    Port,
    Peer,
    Intent,
}

impl EntityType {
    /// Devices, servers and peers: the entities connection endpoints name.
    #[must_use]
    pub fn is_device(self) -> bool {
        matches!(self, Self::Device | Self::Server | Self::Peer)
    }
}

/// Entry of the click-to-navigate map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeRef {
    pub graph_node_id: String,
    pub entity_type: EntityType,
    pub source_id: String,
    pub label: String,
}

/// Logical key (`rack_{id}`, raw device id, `{device}:{port}`) → node.
pub type NodeIdMap = BTreeMap<String, NodeRef>;

// =============================================================================
// ATTRIBUTES
// =============================================================================

/// Ordered DOT attribute list. Values are stored in their final lexical form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attrs(Vec<(&'static str, String)>);

impl Attrs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an attribute whose value is already a DOT word (`box`, `invis`, `2`).
    #[must_use]
    pub fn raw(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.set(key, value.into());
        self
    }

    /// Set a quoted text attribute.
    #[must_use]
    pub fn text(mut self, key: &'static str, value: &str) -> Self {
        self.set(key, format!("\"{}\"", sanitize_label(value)));
        self
    }

    /// Set a quoted multi-line text attribute.
    #[must_use]
    pub fn lines<S: AsRef<str>>(mut self, key: &'static str, lines: &[S]) -> Self {
        self.set(key, format!("\"{}\"", label_lines(lines)));
        self
    }

    /// Overlay `other` on top of `self`; later keys win.
    #[must_use]
    pub fn merge(mut self, other: Attrs) -> Self {
        for (key, value) in other.0 {
            self.set(key, value);
        }
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    fn set(&mut self, key: &'static str, value: String) {
        if let Some(slot) = self.0.iter_mut().find(|(k, _)| *k == key) {
            slot.1 = value;
        } else {
            self.0.push((key, value));
        }
    }
}

// =============================================================================
// GRAPH
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    pub id: String,
    pub key: String,
    pub attrs: Attrs,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub attrs: Attrs,
}

/// A `subgraph cluster_*` block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cluster {
    pub id: String,
    pub attrs: Attrs,
    pub nodes: Vec<GraphNode>,
    pub clusters: Vec<Cluster>,
    /// Invisible ordering edges kept inside this block.
    pub ordering: Vec<GraphEdge>,
}

/// Everything the serializer needs, in emission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    pub comments: Vec<String>,
    pub nodes: Vec<GraphNode>,
    pub ordering: Vec<GraphEdge>,
    pub clusters: Vec<Cluster>,
    pub same_rank: Vec<String>,
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.clusters.is_empty() && self.edges.is_empty() && self.ordering.is_empty()
    }

    /// Ids of every declared node, clusters included, in emission order.
    #[must_use]
    pub fn declared_ids(&self) -> Vec<&str> {
        fn walk<'a>(cluster: &'a Cluster, out: &mut Vec<&'a str>) {
            out.extend(cluster.nodes.iter().map(|n| n.id.as_str()));
            for child in &cluster.clusters {
                walk(child, out);
            }
        }
        let mut out: Vec<&str> = self.nodes.iter().map(|n| n.id.as_str()).collect();
        for cluster in &self.clusters {
            walk(cluster, &mut out);
        }
        out
    }
}

// =============================================================================
// BUILDER
// =============================================================================

/// A node to declare.
#[derive(Debug, Clone)]
pub struct NodeDecl {
    pub key: String,
    pub entity: EntityType,
    pub source_id: String,
    pub label: Vec<String>,
    pub attrs: Attrs,
}

impl NodeDecl {
    pub fn new(key: impl Into<String>, entity: EntityType, source_id: impl Into<String>) -> Self {
        Self { key: key.into(), entity, source_id: source_id.into(), label: Vec::new(), attrs: Attrs::new() }
    }

    #[must_use]
    pub fn label(mut self, lines: Vec<String>) -> Self {
        self.label = lines;
        self
    }

    #[must_use]
    pub fn attrs(mut self, attrs: Attrs) -> Self {
        self.attrs = attrs;
        self
    }
}

/// Hands out DOT ids, suffixing `_2`, `_3`, … when the canonical form is taken.
#[derive(Debug, Default)]
struct IdAllocator {
    taken: HashSet<String>,
}

impl IdAllocator {
    /// Returns the allocated id and whether it had to be suffixed.
    fn allocate(&mut self, logical: &str) -> (String, bool) {
        let base = sanitize_id(logical);
        if self.taken.insert(canonical_id(&base).to_owned()) {
            return (base, false);
        }
        let mut n = 2;
        loop {
            let candidate = suffix_id(&base, n);
            if self.taken.insert(canonical_id(&candidate).to_owned()) {
                return (candidate, true);
            }
            n += 1;
        }
    }
}

/// Accumulates nodes, clusters and edges for one document.
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: Graph,
    scopes: Vec<Cluster>,
    node_ids: IdAllocator,
    cluster_ids: IdAllocator,
    node_map: NodeIdMap,
    /// Raw device id → DOT id, first declaration wins.
    devices: HashMap<String, String>,
    declared: HashSet<String>,
    diagnostics: Vec<Diagnostic>,
}

impl GraphBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a node in the innermost open cluster and return its DOT id.
    pub fn node(&mut self, decl: NodeDecl) -> String {
        let (id, suffixed) = self.node_ids.allocate(&decl.key);
        if suffixed {
            self.warn(Diagnostic::IdentifierCollision {
                key: decl.key.clone(),
                base: sanitize_id(&decl.key),
                assigned: id.clone(),
            });
        }

        let label = if decl.label.iter().any(|l| !l.trim().is_empty()) {
            decl.label
        } else {
            vec![decl.source_id.clone()]
        };
        let display = label
            .iter()
            .find(|l| !l.trim().is_empty())
            .cloned()
            .unwrap_or_default();

        let map_key = self.claim_map_key(&decl.key, decl.entity);
        if decl.entity.is_device() {
            self.devices.entry(decl.key.clone()).or_insert_with(|| id.clone());
        }
        self.node_map.insert(
            map_key,
            NodeRef { graph_node_id: id.clone(), entity_type: decl.entity, source_id: decl.source_id, label: display },
        );
        self.declared.insert(id.clone());

        let node = GraphNode { id: id.clone(), key: decl.key, attrs: Attrs::new().lines("label", &label).merge(decl.attrs) };
        match self.scopes.last_mut() {
            Some(cluster) => cluster.nodes.push(node),
            None => self.graph.nodes.push(node),
        }
        id
    }

    /// Open a cluster, run `body` inside it, then close it.
    pub fn cluster<T>(&mut self, key: &str, attrs: Attrs, body: impl FnOnce(&mut Self) -> T) -> T {
        let (id, _) = self.cluster_ids.allocate(&format!("cluster_{key}"));
        self.scopes.push(Cluster { id, attrs, ..Cluster::default() });
        let out = body(self);
        if let Some(done) = self.scopes.pop() {
            self.attach(done);
        }
        out
    }

    /// Add a visible edge. An edge with an undeclared endpoint is dropped
    /// and recorded as [`Diagnostic::DanglingEdge`].
    pub fn edge(&mut self, from: &str, to: &str, attrs: Attrs) {
        if self.both_declared(from, to) {
            self.graph.edges.push(GraphEdge { from: from.to_owned(), to: to.to_owned(), attrs });
        }
    }

    /// Add an invisible ordering edge to the innermost open cluster.
    pub fn ordering_edge(&mut self, from: &str, to: &str) {
        if !self.both_declared(from, to) {
            return;
        }
        let edge = GraphEdge { from: from.to_owned(), to: to.to_owned(), attrs: Attrs::new().raw("style", "invis") };
        match self.scopes.last_mut() {
            Some(cluster) => cluster.ordering.push(edge),
            None => self.graph.ordering.push(edge),
        }
    }

    /// Add ids to the document's single same-rank group.
    pub fn same_rank(&mut self, ids: &[String]) {
        for id in ids {
            if self.declared.contains(id) && !self.graph.same_rank.contains(id) {
                self.graph.same_rank.push(id.clone());
            }
        }
    }

    /// Add a `//` comment line to the output.
    pub fn comment(&mut self, text: &str) {
        self.graph.comments.push(text.chars().filter(|c| !c.is_control()).collect());
    }

    /// DOT id for a logical key declared earlier in this run.
    #[must_use]
    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.node_map.get(key).map(|r| r.graph_node_id.as_str())
    }

    /// DOT id of the device declared under raw id `id`. Rack anchors and
    /// port nodes never match.
    #[must_use]
    pub fn lookup_device(&self, id: &str) -> Option<&str> {
        self.devices.get(id).map(String::as_str)
    }

    /// Record a diagnostic and log it.
    pub fn warn(&mut self, diagnostic: Diagnostic) {
        tracing::warn!(code = diagnostic.error_code(), "{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn finish(mut self) -> (Graph, NodeIdMap, Vec<Diagnostic>) {
        while let Some(open) = self.scopes.pop() {
            self.attach(open);
        }
        (self.graph, self.node_map, self.diagnostics)
    }

    fn attach(&mut self, done: Cluster) {
        match self.scopes.last_mut() {
            Some(parent) => parent.clusters.push(done),
            None => self.graph.clusters.push(done),
        }
    }

    fn both_declared(&mut self, from: &str, to: &str) -> bool {
        if self.declared.contains(from) && self.declared.contains(to) {
            return true;
        }
        self.warn(Diagnostic::DanglingEdge { from: from.to_owned(), to: to.to_owned() });
        false
    }

    /// Map key for a new node. A device takes its raw id even when an anchor
    /// or port already holds it; the earlier entry moves to a `#n` key.
    fn claim_map_key(&mut self, key: &str, entity: EntityType) -> String {
        let displaces = entity.is_device() && self.node_map.get(key).is_some_and(|r| !r.entity_type.is_device());
        if displaces {
            let moved = self.free_map_key(key);
            if let Some(previous) = self.node_map.remove(key) {
                self.node_map.insert(moved, previous);
            }
        }
        self.free_map_key(key)
    }

    fn free_map_key(&self, key: &str) -> String {
        if !self.node_map.contains_key(key) {
            return key.to_owned();
        }
        (2..)
            .map(|n| format!("{key}#{n}"))
            .find(|candidate| !self.node_map.contains_key(candidate))
            .unwrap_or_else(|| key.to_owned())
    }
}

#[cfg(test)]
#[path = "graph_test.rs"]
mod tests;
