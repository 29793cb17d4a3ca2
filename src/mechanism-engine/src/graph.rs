// Copyright 2026 The Mechanism Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::{HashMap, HashSet};

use crate::datamodel::{Edge, Node};

/// One entry in an adjacency list: the edge and the node at its far end.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Adjacent {
    pub edge_id: String,
    pub node_id: String,
}

/// Outgoing/incoming adjacency plus an edge lookup by endpoint pair.
///
/// Every known node has an entry in both directions, even when its list is
/// empty. Edges with an unknown endpoint are never indexed.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdjacencyIndex {
    node_ids: Vec<String>,
    outgoing: HashMap<String, Vec<Adjacent>>,
    incoming: HashMap<String, Vec<Adjacent>>,
    edge_by_pair: HashMap<(String, String), String>,
}

impl AdjacencyIndex {
    /// Node ids in insertion order.
    pub fn node_ids(&self) -> &[String] {
        &self.node_ids
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.outgoing.contains_key(node_id)
    }

    pub fn node_count(&self) -> usize {
        self.node_ids.len()
    }

    /// Outgoing edges of `node_id` in edge insertion order, or `None` for an
    /// unknown node.
    pub fn outgoing(&self, node_id: &str) -> Option<&[Adjacent]> {
        self.outgoing.get(node_id).map(Vec::as_slice)
    }

    pub fn incoming(&self, node_id: &str) -> Option<&[Adjacent]> {
        self.incoming.get(node_id).map(Vec::as_slice)
    }

    /// Both directions, outgoing first. Used for undirected traversal.
    pub fn neighbors<'a>(&'a self, node_id: &str) -> impl Iterator<Item = &'a Adjacent> {
        self.outgoing
            .get(node_id)
            .into_iter()
            .chain(self.incoming.get(node_id))
            .flatten()
    }

    /// The id of the first indexed edge from `source` to `target`.
    pub fn edge_between(&self, source: &str, target: &str) -> Option<&str> {
        self.edge_by_pair
            .get(&(source.to_owned(), target.to_owned()))
            .map(String::as_str)
    }
}

/// Builder for an `AdjacencyIndex`. Nodes must be added before the edges
/// that reference them; an edge naming an unknown node is dropped.
#[derive(Default)]
pub struct AdjacencyIndexBuilder {
    index: AdjacencyIndex,
    known: HashSet<String>,
}

impl AdjacencyIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, node_id: &str) -> &mut Self {
        if self.known.insert(node_id.to_owned()) {
            self.index.node_ids.push(node_id.to_owned());
            self.index.outgoing.insert(node_id.to_owned(), Vec::new());
            self.index.incoming.insert(node_id.to_owned(), Vec::new());
        }
        self
    }

    /// Returns whether the edge was indexed.
    pub fn add_edge(&mut self, edge_id: &str, source: &str, target: &str) -> bool {
        if !self.known.contains(source) || !self.known.contains(target) {
            tracing::trace!(edge_id, source, target, "dropping edge with unknown endpoint");
            return false;
        }

        if let Some(out) = self.index.outgoing.get_mut(source) {
            out.push(Adjacent {
                edge_id: edge_id.to_owned(),
                node_id: target.to_owned(),
            });
        }
        if let Some(inc) = self.index.incoming.get_mut(target) {
            inc.push(Adjacent {
                edge_id: edge_id.to_owned(),
                node_id: source.to_owned(),
            });
        }
        self.index
            .edge_by_pair
            .entry((source.to_owned(), target.to_owned()))
            .or_insert_with(|| edge_id.to_owned());
        true
    }

    pub fn build(self) -> AdjacencyIndex {
        self.index
    }
}

/// Index `edges` over `nodes`. Pure: repeated calls with the same input
/// give equal indexes.
pub fn build_adjacency_index(nodes: &[Node], edges: &[Edge]) -> AdjacencyIndex {
    let mut builder = AdjacencyIndexBuilder::new();
    for node in nodes {
        builder.add_node(&node.id);
    }
    for edge in edges {
        builder.add_edge(&edge.id, &edge.source, &edge.target);
    }
    builder.build()
}
