// Copyright 2026 The Mechanism Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::{BTreeSet, HashMap};

use mechanism_engine::datamodel::{CausalConfidence, Edge, EdgeRelation, Node, NodeKind};
use mechanism_engine::layout::components::make_pseudo_node_ident;
use mechanism_engine::{GraphModel, LayoutConfig, LayoutResult, compute_layout};

const FIXTURE: &str = "../../test/networks/amyloid_cascade.json";

fn load_model(path: &str) -> GraphModel {
    let json =
        std::fs::read_to_string(path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"));
    GraphModel::from_json(&json).unwrap_or_else(|e| panic!("failed to parse {path}: {e}"))
}

/// Checks that hold for every layout, whatever its shape.
fn verify_layout(result: &LayoutResult, nodes: &[Node], edges: &[Edge], label: &str) {
    for node in nodes {
        assert!(
            result.positions.contains_key(&node.id),
            "[{label}] node '{}' has no position",
            node.id
        );
    }
    assert_eq!(
        result.positions.len(),
        nodes.len(),
        "[{label}] unexpected extra positions"
    );

    let by_id: HashMap<&str, &Edge> = edges.iter().map(|e| (e.id.as_str(), e)).collect();
    for id in &result.back_edges {
        let edge = by_id
            .get(id.as_str())
            .unwrap_or_else(|| panic!("[{label}] unknown back edge '{id}'"));
        let source = &result.positions[&edge.source];
        let target = &result.positions[&edge.target];
        assert!(
            target.y <= source.y,
            "[{label}] back edge '{id}' points downward"
        );
    }
    for edge in edges {
        let (Some(source), Some(target)) = (
            result.positions.get(&edge.source),
            result.positions.get(&edge.target),
        ) else {
            continue;
        };
        if !result.back_edges.contains(&edge.id) {
            assert!(
                target.y > source.y,
                "[{label}] forward edge '{}' does not point downward",
                edge.id
            );
        }
    }
}

fn state(id: &str, module_id: &str) -> Node {
    Node {
        id: id.to_owned(),
        label: id.to_owned(),
        kind: NodeKind::State,
        subtype: String::new(),
        module_id: module_id.to_owned(),
    }
}

fn edge(id: &str, source: &str, target: &str) -> Edge {
    Edge {
        id: id.to_owned(),
        source: source.to_owned(),
        target: target.to_owned(),
        relation: EdgeRelation::Increases,
        module_id: "M01".to_owned(),
        causal_confidence: CausalConfidence::L3,
        evidence: vec![],
    }
}

#[test]
fn layout_full_network() {
    let model = load_model(FIXTURE);
    let result = compute_layout(
        model.nodes(),
        model.edges(),
        None,
        None,
        &LayoutConfig::default(),
    );
    verify_layout(&result, model.nodes(), model.edges(), "full");

    assert_eq!(result.positions["apoe4"].layer, 0);
    let deepest = result.positions.values().map(|p| p.layer).max().unwrap();
    assert_eq!(result.positions["cognitive_decline"].layer, deepest);

    // every feedback loop needs at least one back edge to close
    for feedback_loop in model.feedback_loops() {
        assert!(
            feedback_loop
                .edge_ids
                .iter()
                .any(|id| result.back_edges.contains(id)),
            "loop {} has no back edge",
            feedback_loop.id
        );
    }
}

#[test]
fn layout_is_reproducible() {
    let model = load_model(FIXTURE);
    let config = LayoutConfig::default();
    let first = compute_layout(model.nodes(), model.edges(), None, None, &config);
    for _ in 0..3 {
        let again = compute_layout(model.nodes(), model.edges(), None, None, &config);
        assert_eq!(first, again);
    }
}

#[test]
fn layout_filtered_view_with_pseudo_node() {
    let model = load_model(FIXTURE);
    let selected: BTreeSet<String> = ["M02", "M04"].iter().map(|s| s.to_string()).collect();
    let view = model.filtered_view(&selected);

    assert_eq!(view.nodes.len(), 5);
    assert_eq!(view.pseudo_nodes.len(), 1);
    let pseudo = &view.pseudo_nodes[0];
    assert_eq!(pseudo.id, make_pseudo_node_ident("M03"));
    assert!(pseudo.connects_from.contains("abeta_oligomers"));
    assert!(pseudo.connects_to.contains("synapse_loss"));

    let result = compute_layout(
        &view.nodes,
        &view.edges,
        Some(view.pseudo_nodes.as_slice()),
        Some(&view.excluded_edge_ids),
        &LayoutConfig::default(),
    );
    verify_layout(&result, &view.nodes, &view.edges, "filtered");
    assert!(!result.positions.contains_key(&pseudo.id));
    // the hidden module sits between the two visible groups
    assert!(result.positions["synapse_loss"].layer >= result.positions["abeta_oligomers"].layer + 2);
}

#[test]
fn layout_wraps_wide_layers() {
    // one hub feeding twelve leaves
    let mut nodes = vec![state("hub", "M01")];
    let mut edges = Vec::new();
    for i in 0..12 {
        let id = format!("leaf{i:02}");
        edges.push(edge(&format!("e{i:02}"), "hub", &id));
        nodes.push(state(&id, "M01"));
    }
    let config = LayoutConfig {
        max_row_width: 700.0,
        ..LayoutConfig::default()
    };
    let result = compute_layout(&nodes, &edges, None, None, &config);
    verify_layout(&result, &nodes, &edges, "wide");

    let leaf_rows: BTreeSet<i64> = result
        .positions
        .iter()
        .filter(|(id, _)| id.starts_with("leaf"))
        .map(|(_, p)| p.y.round() as i64)
        .collect();
    // 3 nodes per row at this width
    assert_eq!(config.nodes_per_row(), 3);
    assert_eq!(leaf_rows.len(), 4);
    assert!(result.back_edges.is_empty());
}

#[test]
fn layout_components_ordered_by_size() {
    let nodes = vec![
        state("solo", "M01"),
        state("p1", "M01"),
        state("p2", "M01"),
        state("t1", "M02"),
        state("t2", "M02"),
        state("t3", "M02"),
    ];
    let edges = vec![
        edge("a", "p1", "p2"),
        edge("b", "t1", "t2"),
        edge("c", "t2", "t3"),
    ];
    let result = compute_layout(&nodes, &edges, None, None, &LayoutConfig::default());
    verify_layout(&result, &nodes, &edges, "components");

    let y = |id: &str| result.positions[id].y;
    assert!(y("t3") < y("p1"));
    assert!(y("p2") < y("solo"));
}
