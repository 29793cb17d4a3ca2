// Copyright 2026 The Mechanism Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Property-based tests for the layout pipeline.
//!
//! These check that:
//! 1. components always partition the node set
//! 2. every node gets exactly one layer and one position, cycles or not
//! 3. acyclic components respect edge direction in their layering
//! 4. results are stable across repeated runs

use std::collections::BTreeSet;

use proptest::prelude::*;

use crate::datamodel::{CausalConfidence, Edge, EdgeRelation, Node, NodeKind};
use crate::graph::build_adjacency_index;
use crate::layout::components::connected_components;
use crate::layout::layers::{BoundaryRoles, assign_layers};
use crate::layout::{LayoutConfig, LayoutEdge, compute_layout};

fn node_ids(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("n{i:02}")).collect()
}

fn nodes(n: usize) -> Vec<Node> {
    node_ids(n)
        .into_iter()
        .enumerate()
        .map(|(i, id)| Node {
            label: id.clone(),
            id,
            kind: NodeKind::State,
            subtype: String::new(),
            module_id: format!("M{:02}", i % 3),
        })
        .collect()
}

fn edges(pairs: &[(usize, usize)]) -> Vec<Edge> {
    pairs
        .iter()
        .enumerate()
        .map(|(i, &(s, t))| Edge {
            id: format!("e{i}"),
            source: format!("n{s:02}"),
            target: format!("n{t:02}"),
            relation: EdgeRelation::Increases,
            module_id: "M00".to_owned(),
            causal_confidence: CausalConfidence::L5,
            evidence: vec![],
        })
        .collect()
}

/// Node count plus arbitrary (possibly cyclic) edges over it.
fn graph_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    (1usize..24).prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..48)))
}

/// Node count plus edges that only ever point from a lower to a higher
/// index, so the graph is acyclic.
fn dag_strategy() -> impl Strategy<Value = (usize, Vec<(usize, usize)>)> {
    graph_strategy().prop_map(|(n, pairs)| {
        let forward = pairs
            .into_iter()
            .filter(|(s, t)| s != t)
            .map(|(s, t)| if s < t { (s, t) } else { (t, s) })
            .collect();
        (n, forward)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn components_partition_nodes((n, pairs) in graph_strategy()) {
        let nodes = nodes(n);
        let index = build_adjacency_index(&nodes, &edges(&pairs));
        let components = connected_components(&index);

        let mut seen = BTreeSet::new();
        for member in components.iter().flatten() {
            prop_assert!(seen.insert(member.clone()), "{member} appears twice");
        }
        prop_assert_eq!(seen.len(), n);
        for pair in components.windows(2) {
            prop_assert!(
                pair[0].len() > pair[1].len()
                    || (pair[0].len() == pair[1].len() && pair[0][0] < pair[1][0])
            );
        }
    }

    #[test]
    fn every_node_gets_one_layer((n, pairs) in graph_strategy()) {
        let members = node_ids(n);
        let layout_edges: Vec<LayoutEdge> = edges(&pairs)
            .iter()
            .map(|e| LayoutEdge::new(&e.id, &e.source, &e.target))
            .collect();
        let first = assign_layers(&members, &layout_edges, &BoundaryRoles::default(), 10);
        let again = assign_layers(&members, &layout_edges, &BoundaryRoles::default(), 10);

        prop_assert_eq!(first.layers.len(), n);
        prop_assert_eq!(&first, &again);
    }

    #[test]
    fn dag_layers_follow_edges((n, pairs) in dag_strategy()) {
        let members = node_ids(n);
        let layout_edges: Vec<LayoutEdge> = edges(&pairs)
            .iter()
            .map(|e| LayoutEdge::new(&e.id, &e.source, &e.target))
            .collect();
        let result = assign_layers(&members, &layout_edges, &BoundaryRoles::default(), 10);

        prop_assert!(result.back_edges.is_empty());
        prop_assert!(result.forced.is_empty());
        for edge in &layout_edges {
            prop_assert!(result.layers[&edge.target] > result.layers[&edge.source]);
        }
    }

    #[test]
    fn layout_positions_every_node((n, pairs) in graph_strategy()) {
        let nodes = nodes(n);
        let edges = edges(&pairs);
        let config = LayoutConfig::default();
        let result = compute_layout(&nodes, &edges, None, None, &config);

        prop_assert_eq!(result.positions.len(), n);
        for position in result.positions.values() {
            prop_assert!(position.x.is_finite() && position.y.is_finite());
        }
        let edge_ids: BTreeSet<String> = edges.iter().map(|e| e.id.clone()).collect();
        prop_assert!(result.back_edges.is_subset(&edge_ids));
        prop_assert_eq!(&result, &compute_layout(&nodes, &edges, None, None, &config));
    }

    #[test]
    fn dag_layout_has_no_back_edges((n, pairs) in dag_strategy()) {
        let nodes = nodes(n);
        let edges = edges(&pairs);
        let result = compute_layout(&nodes, &edges, None, None, &LayoutConfig::default());
        prop_assert!(result.back_edges.is_empty());
    }
}
