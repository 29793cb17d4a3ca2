// Copyright 2026 The Mechanism Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::{BTreeMap, BTreeSet};

use super::config::LayoutConfig;
use super::{LayoutEdge, LayoutPosition};

/// Width of a row holding `count` nodes.
fn row_width(count: usize, config: &LayoutConfig) -> f64 {
    if count == 0 {
        return 0.0;
    }
    count as f64 * config.node_width + (count - 1) as f64 * config.node_spacing
}

/// Convert ordered layers into centered coordinates.
///
/// `components` holds one list of ordered rows per component, in stacking
/// order. Positions are node centers. Layers wider than
/// `config.nodes_per_row()` wrap into sub-rows inside their layer's band;
/// every sub-row is centered on the same vertical axis.
pub fn assign_coordinates(
    components: &[Vec<Vec<String>>],
    config: &LayoutConfig,
) -> BTreeMap<String, LayoutPosition> {
    let per_row = config.nodes_per_row();
    let widest = components
        .iter()
        .flatten()
        .map(|row| row.len().min(per_row))
        .max()
        .unwrap_or(0);
    let center_x = config.start_x + row_width(widest, config) / 2.0;
    let slot = config.node_width + config.node_spacing;
    let sub_row_pitch = config.node_height + config.row_spacing;

    let mut positions = BTreeMap::new();
    let mut top = config.start_y;
    for (index, rows) in components.iter().enumerate() {
        if index > 0 {
            top += config.component_spacing;
        }

        let mut y = top;
        let mut placed_any = false;
        for (layer, row) in rows.iter().enumerate() {
            if row.is_empty() {
                continue;
            }
            if placed_any {
                y += config.layer_spacing;
            }
            placed_any = true;

            let sub_rows = row.len().div_ceil(per_row);
            for (sub, chunk) in row.chunks(per_row).enumerate() {
                let left = center_x - row_width(chunk.len(), config) / 2.0;
                let cy = y + sub as f64 * sub_row_pitch + config.node_height / 2.0;
                for (i, id) in chunk.iter().enumerate() {
                    positions.insert(
                        id.clone(),
                        LayoutPosition {
                            layer,
                            order: sub * per_row + i,
                            x: left + i as f64 * slot + config.node_width / 2.0,
                            y: cy,
                        },
                    );
                }
            }
            y += sub_rows as f64 * config.node_height
                + (sub_rows - 1) as f64 * config.row_spacing;
        }
        top = y;
    }

    positions
}

/// Edges whose target does not sit strictly below their source.
///
/// Edges with an unplaced endpoint and synthetic edges are skipped.
pub fn geometric_back_edges(
    positions: &BTreeMap<String, LayoutPosition>,
    edges: &[LayoutEdge],
) -> BTreeSet<String> {
    edges
        .iter()
        .filter(|edge| !edge.synthetic)
        .filter_map(|edge| {
            let source = positions.get(&edge.source)?;
            let target = positions.get(&edge.target)?;
            (target.y <= source.y).then(|| edge.id.clone())
        })
        .collect()
}
