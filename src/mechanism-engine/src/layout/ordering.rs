// Copyright 2026 The Mechanism Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::{BTreeMap, HashMap};

use ordered_float::OrderedFloat;

use super::{LayoutEdge, LayoutNode};

/// Group `layers` into per-layer rows and order each row with alternating
/// barycenter sweeps. Returned rows are indexed by layer number; a layer
/// with no nodes yields an empty row.
pub fn order_layers(
    layers: &BTreeMap<String, usize>,
    nodes: &HashMap<&str, &LayoutNode>,
    edges: &[LayoutEdge],
    sweeps: usize,
) -> Vec<Vec<String>> {
    let Some(&max_layer) = layers.values().max() else {
        return Vec::new();
    };

    let mut rows: Vec<Vec<String>> = vec![Vec::new(); max_layer + 1];
    for (id, &layer) in layers {
        rows[layer].push(id.clone());
    }
    for row in rows.iter_mut() {
        // ids arrive sorted from the BTreeMap, so the stable sort breaks
        // ties by id
        row.sort_by_key(|id| match nodes.get(id.as_str()) {
            Some(node) => (node.module_id.clone(), node.category.priority()),
            None => (String::new(), u8::MAX),
        });
    }

    let mut preds: HashMap<&str, Vec<&str>> = HashMap::new();
    let mut succs: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        let (Some(&s), Some(&t)) = (
            layers.get(edge.source.as_str()),
            layers.get(edge.target.as_str()),
        ) else {
            continue;
        };
        if t == s + 1 {
            preds
                .entry(edge.target.as_str())
                .or_default()
                .push(edge.source.as_str());
            succs
                .entry(edge.source.as_str())
                .or_default()
                .push(edge.target.as_str());
        }
    }

    for _ in 0..sweeps {
        for layer in 1..rows.len() {
            reorder(&mut rows, layer, layer - 1, &preds);
        }
        for layer in (0..rows.len().saturating_sub(1)).rev() {
            reorder(&mut rows, layer, layer + 1, &succs);
        }
    }

    rows
}

fn reorder(
    rows: &mut [Vec<String>],
    layer: usize,
    fixed: usize,
    neighbors: &HashMap<&str, Vec<&str>>,
) {
    let position: HashMap<&str, usize> = rows[fixed]
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    let mut keyed: Vec<(OrderedFloat<f64>, String)> = rows[layer]
        .iter()
        .enumerate()
        .map(|(current, id)| {
            let adjacent: Vec<usize> = neighbors
                .get(id.as_str())
                .into_iter()
                .flatten()
                .filter_map(|n| position.get(n).copied())
                .collect();
            let barycenter = if adjacent.is_empty() {
                current as f64
            } else {
                adjacent.iter().sum::<usize>() as f64 / adjacent.len() as f64
            };
            (OrderedFloat(barycenter), id.clone())
        })
        .collect();

    // stable: equal barycenters keep their previous relative order
    keyed.sort_by_key(|(barycenter, _)| *barycenter);
    rows[layer] = keyed.into_iter().map(|(_, id)| id).collect();
}

/// Count crossings between consecutive layers. Only edges spanning exactly
/// one layer are considered.
pub fn count_crossings(rows: &[Vec<String>], edges: &[LayoutEdge]) -> usize {
    let mut position: HashMap<&str, (usize, usize)> = HashMap::new();
    for (layer, row) in rows.iter().enumerate() {
        for (order, id) in row.iter().enumerate() {
            position.insert(id.as_str(), (layer, order));
        }
    }

    let mut spans: BTreeMap<usize, Vec<(usize, usize)>> = BTreeMap::new();
    for edge in edges {
        let (Some(&(sl, so)), Some(&(tl, to))) = (
            position.get(edge.source.as_str()),
            position.get(edge.target.as_str()),
        ) else {
            continue;
        };
        if tl == sl + 1 {
            spans.entry(sl).or_default().push((so, to));
        } else if sl == tl + 1 {
            spans.entry(tl).or_default().push((to, so));
        }
    }

    let mut crossings = 0;
    for segs in spans.values() {
        for (i, &(a0, a1)) in segs.iter().enumerate() {
            for &(b0, b1) in &segs[i + 1..] {
                if (a0 < b0 && a1 > b1) || (a0 > b0 && a1 < b1) {
                    crossings += 1;
                }
            }
        }
    }
    crossings
}
