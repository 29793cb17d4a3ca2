// Copyright 2026 The Mechanism Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Upstream/downstream reachability around a set of intervention targets.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::Serialize;

use crate::datamodel::{DrugTarget, Node};
use crate::graph::{Adjacent, AdjacencyIndex};

pub mod loops;
pub mod stats;

pub use loops::{Involvement, LoopInvolvement, analyze_loop_involvement};
pub use stats::{PathwayConfig, PathwayStats, get_pathway_stats};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathwayResult {
    pub target_nodes: BTreeSet<String>,
    pub upstream_nodes: BTreeSet<String>,
    pub downstream_nodes: BTreeSet<String>,
    pub all_nodes: BTreeSet<String>,
    pub pathway_edges: BTreeSet<String>,
    pub affected_modules: BTreeSet<String>,
}

#[derive(Clone, Copy)]
enum Direction {
    Upstream,
    Downstream,
}

impl Direction {
    fn step<'a>(self, adjacency: &'a AdjacencyIndex, node: &str) -> &'a [Adjacent] {
        let next = match self {
            Direction::Upstream => adjacency.incoming(node),
            Direction::Downstream => adjacency.outgoing(node),
        };
        next.unwrap_or_default()
    }
}

/// Multi-source BFS from every known target, up to `max_depth` hops.
/// Returns each reached non-target node with its hop count.
fn reach(
    adjacency: &AdjacencyIndex,
    targets: &BTreeSet<String>,
    max_depth: usize,
    direction: Direction,
) -> BTreeMap<String, usize> {
    let mut depth: HashMap<&str, usize> = HashMap::new();
    let mut frontier: Vec<&str> = Vec::new();
    for target in targets {
        if adjacency.contains(target) {
            depth.insert(target.as_str(), 0);
            frontier.push(target.as_str());
        }
    }

    for hop in 1..=max_depth {
        let mut next = Vec::new();
        for node in frontier {
            for adj in direction.step(adjacency, node) {
                let id = adj.node_id.as_str();
                if !depth.contains_key(id) {
                    depth.insert(id, hop);
                    next.push(id);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }

    depth
        .into_iter()
        .filter(|(id, _)| !targets.contains(*id))
        .map(|(id, hops)| (id.to_owned(), hops))
        .collect()
}

/// Trace the causal neighborhood of `targets`.
///
/// Upstream follows incoming edges and downstream follows outgoing edges,
/// each for at most `max_depth` hops. Targets never appear in either set.
/// A node reachable both ways (it sits on a cycle through a target) goes to
/// the side that reaches it in fewer hops, downstream on a tie, so the three
/// node sets stay disjoint.
pub fn compute_pathway(
    targets: &[DrugTarget],
    adjacency: &AdjacencyIndex,
    nodes: &[Node],
    max_depth: usize,
) -> PathwayResult {
    let target_nodes: BTreeSet<String> = targets.iter().map(|t| t.node_id.clone()).collect();
    for missing in target_nodes.iter().filter(|id| !adjacency.contains(id)) {
        tracing::debug!(node = %missing, "target not in graph; skipping traversal");
    }

    let mut upstream = reach(adjacency, &target_nodes, max_depth, Direction::Upstream);
    let downstream = reach(adjacency, &target_nodes, max_depth, Direction::Downstream);

    let mut downstream_nodes = BTreeSet::new();
    for (id, down_hops) in downstream {
        match upstream.get(&id) {
            Some(&up_hops) if up_hops < down_hops => {}
            Some(_) => {
                upstream.remove(&id);
                downstream_nodes.insert(id);
            }
            None => {
                downstream_nodes.insert(id);
            }
        }
    }
    let upstream_nodes: BTreeSet<String> = upstream.into_keys().collect();

    let all_nodes: BTreeSet<String> = target_nodes
        .iter()
        .chain(&upstream_nodes)
        .chain(&downstream_nodes)
        .cloned()
        .collect();

    let pathway_edges: BTreeSet<String> = all_nodes
        .iter()
        .flat_map(|id| adjacency.outgoing(id).unwrap_or_default())
        .filter(|adj| all_nodes.contains(&adj.node_id))
        .map(|adj| adj.edge_id.clone())
        .collect();

    let affected_modules: BTreeSet<String> = nodes
        .iter()
        .filter(|n| all_nodes.contains(&n.id))
        .map(|n| n.module_id.clone())
        .collect();

    tracing::debug!(
        targets = target_nodes.len(),
        upstream = upstream_nodes.len(),
        downstream = downstream_nodes.len(),
        edges = pathway_edges.len(),
        "computed pathway"
    );

    PathwayResult {
        target_nodes,
        upstream_nodes,
        downstream_nodes,
        all_nodes,
        pathway_edges,
        affected_modules,
    }
}
