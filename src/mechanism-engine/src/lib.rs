// Copyright 2026 The Mechanism Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

#![forbid(unsafe_code)]

pub mod common;
pub mod datamodel;
pub mod graph;
pub mod layout;
pub mod pathway;

#[cfg(test)]
mod layout_proptest;

pub use self::common::{Error, ErrorCode, ErrorKind, Result};
pub use self::datamodel::{Dataset, DrugEffect, DrugTarget, GraphModel};
pub use self::graph::{AdjacencyIndex, build_adjacency_index};
pub use self::layout::{LayoutConfig, LayoutPosition, LayoutResult, PseudoNode, compute_layout};
pub use self::pathway::{
    Involvement, LoopInvolvement, PathwayConfig, PathwayResult, PathwayStats,
    analyze_loop_involvement, compute_pathway, get_pathway_stats,
};
