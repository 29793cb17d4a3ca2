// Copyright 2026 The Mechanism Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Layered layout of a (possibly cyclic) causal graph.
//!
//! The pipeline runs per connected component: assign layers, order each
//! layer to reduce crossings, then convert to coordinates. Components are
//! stacked vertically, largest first.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::datamodel::{Edge, Node, NodeCategory};
use crate::graph::AdjacencyIndexBuilder;

pub mod components;
pub mod config;
pub mod coordinates;
pub mod layers;
pub mod ordering;

pub use components::PseudoNode;
pub use config::LayoutConfig;

use self::components::connected_components;
use self::coordinates::{assign_coordinates, geometric_back_edges};
use self::layers::{BoundaryRoles, assign_layers};
use self::ordering::order_layers;

/// A node as the layout pipeline sees it.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutNode {
    pub id: String,
    pub module_id: String,
    pub category: NodeCategory,
}

/// A directed edge as the layout pipeline sees it. Synthetic edges connect
/// pseudo-nodes and never appear in results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub synthetic: bool,
}

impl LayoutEdge {
    pub fn new(id: &str, source: &str, target: &str) -> Self {
        LayoutEdge {
            id: id.to_owned(),
            source: source.to_owned(),
            target: target.to_owned(),
            synthetic: false,
        }
    }

    fn synthetic(id: String, source: &str, target: &str) -> Self {
        LayoutEdge {
            id,
            source: source.to_owned(),
            target: target.to_owned(),
            synthetic: true,
        }
    }
}

/// Final placement of one node. `x`/`y` is the node center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct LayoutPosition {
    pub layer: usize,
    pub order: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutResult {
    pub positions: BTreeMap<String, LayoutPosition>,
    pub back_edges: BTreeSet<String>,
}

fn pseudo_edges(pseudo: &PseudoNode) -> impl Iterator<Item = LayoutEdge> + '_ {
    let inbound = pseudo
        .connects_from
        .iter()
        .map(move |u| LayoutEdge::synthetic(format!("{}:in:{u}", pseudo.id), u, &pseudo.id));
    let outbound = pseudo
        .connects_to
        .iter()
        .map(move |v| LayoutEdge::synthetic(format!("{}:out:{v}", pseudo.id), &pseudo.id, v));
    inbound.chain(outbound)
}

/// Lay out `nodes` and `edges`.
///
/// Pseudo-nodes take part in every stage but are left out of the returned
/// positions. Edges listed in `excluded_edge_ids` are ignored entirely.
/// Back edges are the edges whose target does not end up strictly below
/// their source.
pub fn compute_layout(
    nodes: &[Node],
    edges: &[Edge],
    pseudo_nodes: Option<&[PseudoNode]>,
    excluded_edge_ids: Option<&BTreeSet<String>>,
    config: &LayoutConfig,
) -> LayoutResult {
    let pseudo_nodes = pseudo_nodes.unwrap_or_default();
    let is_excluded = |id: &str| excluded_edge_ids.is_some_and(|ex| ex.contains(id));

    let mut layout_nodes: Vec<LayoutNode> = nodes
        .iter()
        .map(|n| LayoutNode {
            id: n.id.clone(),
            module_id: n.module_id.clone(),
            category: n.category(),
        })
        .collect();
    layout_nodes.extend(pseudo_nodes.iter().map(|p| LayoutNode {
        id: p.id.clone(),
        module_id: p.module_id.clone(),
        category: NodeCategory::State,
    }));

    let mut layout_edges: Vec<LayoutEdge> = edges
        .iter()
        .filter(|e| !is_excluded(&e.id))
        .map(|e| LayoutEdge::new(&e.id, &e.source, &e.target))
        .collect();
    layout_edges.extend(pseudo_nodes.iter().flat_map(pseudo_edges));

    let mut builder = AdjacencyIndexBuilder::new();
    for node in &layout_nodes {
        builder.add_node(&node.id);
    }
    layout_edges.retain(|e| builder.add_edge(&e.id, &e.source, &e.target));
    let index = builder.build();

    let mut lookup: HashMap<&str, &LayoutNode> = HashMap::with_capacity(layout_nodes.len());
    for node in &layout_nodes {
        lookup.entry(node.id.as_str()).or_insert(node);
    }
    let mut boundaries = BoundaryRoles::default();
    for node in nodes {
        if node.is_input_boundary() {
            boundaries.inputs.insert(node.id.clone());
        } else if node.is_output_boundary() {
            boundaries.outputs.insert(node.id.clone());
        }
    }

    let components = connected_components(&index);
    let component_of: HashMap<&str, usize> = components
        .iter()
        .enumerate()
        .flat_map(|(i, members)| members.iter().map(move |m| (m.as_str(), i)))
        .collect();
    let mut component_edges: Vec<Vec<LayoutEdge>> = vec![Vec::new(); components.len()];
    for edge in &layout_edges {
        if let Some(&i) = component_of.get(edge.source.as_str()) {
            component_edges[i].push(edge.clone());
        }
    }

    let mut heuristic_back_edges = BTreeSet::new();
    let mut ordered = Vec::with_capacity(components.len());
    for (members, internal) in components.iter().zip(&component_edges) {
        let assignment = assign_layers(members, internal, &boundaries, config.iteration_factor);
        tracing::debug!(
            size = members.len(),
            layers = assignment.layers.values().max().map_or(0, |l| l + 1),
            forced = assignment.forced.len(),
            "laid out component"
        );
        heuristic_back_edges.extend(assignment.back_edges);
        ordered.push(order_layers(
            &assignment.layers,
            &lookup,
            internal,
            config.crossing_sweeps,
        ));
    }

    let mut positions = assign_coordinates(&ordered, config);
    let back_edges = geometric_back_edges(&positions, &layout_edges);

    let synthetic: BTreeSet<&str> = layout_edges
        .iter()
        .filter(|e| e.synthetic)
        .map(|e| e.id.as_str())
        .collect();
    heuristic_back_edges.retain(|id| !synthetic.contains(id.as_str()));
    if heuristic_back_edges != back_edges {
        tracing::debug!(
            heuristic_only = ?heuristic_back_edges.difference(&back_edges).collect::<Vec<_>>(),
            geometric_only = ?back_edges.difference(&heuristic_back_edges).collect::<Vec<_>>(),
            "back edge sets disagree"
        );
    }

    for pseudo in pseudo_nodes {
        positions.remove(&pseudo.id);
    }

    LayoutResult {
        positions,
        back_edges,
    }
}
