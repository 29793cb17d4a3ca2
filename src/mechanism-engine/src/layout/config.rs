// Copyright 2026 The Mechanism Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use serde::{Deserialize, Serialize};

/// Layered layout configuration.
///
/// All spacing and dimension values are in logical layout units (not pixels).
/// Layers advance along the y axis; nodes within a layer spread along x.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    // Element dimensions
    pub node_width: f64,
    pub node_height: f64,

    // Spacing between elements
    /// Horizontal gap between neighbouring nodes in a row.
    pub node_spacing: f64,
    /// Vertical gap between wrapped sub-rows of the same layer.
    pub row_spacing: f64,
    /// Vertical gap between consecutive layers.
    pub layer_spacing: f64,
    /// Vertical gap between stacked components.
    pub component_spacing: f64,
    /// Width available to a single row before it wraps.
    pub max_row_width: f64,

    // Canvas positioning
    pub start_x: f64,
    pub start_y: f64,

    /// Barycenter sweep iterations (each is one forward and one backward pass).
    pub crossing_sweeps: usize,
    /// Layer assignment gives up after `component_size * iteration_factor` steps.
    pub iteration_factor: usize,
}

impl LayoutConfig {
    /// How many nodes fit in one row before wrapping. Always at least one.
    pub fn nodes_per_row(&self) -> usize {
        let slot = self.node_width + self.node_spacing;
        if slot <= 0.0 || !slot.is_finite() {
            return usize::MAX;
        }
        let fit = ((self.max_row_width + self.node_spacing) / slot).floor();
        if fit.is_finite() && fit >= 1.0 {
            fit as usize
        } else {
            1
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            node_width: 160.0,
            node_height: 48.0,
            node_spacing: 40.0,
            row_spacing: 24.0,
            layer_spacing: 96.0,
            component_spacing: 160.0,
            max_row_width: 1400.0,
            start_x: 50.0,
            start_y: 50.0,
            crossing_sweeps: 10,
            iteration_factor: 10,
        }
    }
}
