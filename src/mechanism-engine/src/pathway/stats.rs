// Copyright 2026 The Mechanism Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use serde::{Deserialize, Serialize};

use super::PathwayResult;
use super::loops::{Involvement, LoopInvolvement};

/// A stored pathway, as saved alongside a drug selection.
///
/// The three node lists are expected to be disjoint; `compute_pathway`
/// guarantees this for configs built with `from_analysis`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PathwayConfig {
    pub upstream_nodes: Vec<String>,
    pub target_nodes: Vec<String>,
    pub downstream_nodes: Vec<String>,
    pub pathway_edges: Vec<String>,
    pub affected_modules: Vec<String>,
    pub loop_involvements: Vec<LoopInvolvement>,
}

impl PathwayConfig {
    pub fn from_analysis(result: &PathwayResult, involvements: &[LoopInvolvement]) -> Self {
        PathwayConfig {
            upstream_nodes: result.upstream_nodes.iter().cloned().collect(),
            target_nodes: result.target_nodes.iter().cloned().collect(),
            downstream_nodes: result.downstream_nodes.iter().cloned().collect(),
            pathway_edges: result.pathway_edges.iter().cloned().collect(),
            affected_modules: result.affected_modules.iter().cloned().collect(),
            loop_involvements: involvements.to_vec(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathwayStats {
    pub upstream_count: usize,
    pub target_count: usize,
    pub downstream_count: usize,
    /// Sum of the three node counts, not a union.
    pub total_nodes: usize,
    pub edge_count: usize,
    pub module_count: usize,
    pub loop_count: usize,
    pub loops_breaking: usize,
    pub loops_weakening: usize,
    pub loops_strengthening: usize,
}

pub fn get_pathway_stats(config: &PathwayConfig) -> PathwayStats {
    let count = |kind: Involvement| {
        config
            .loop_involvements
            .iter()
            .filter(|l| l.involvement == kind)
            .count()
    };

    PathwayStats {
        upstream_count: config.upstream_nodes.len(),
        target_count: config.target_nodes.len(),
        downstream_count: config.downstream_nodes.len(),
        total_nodes: config.upstream_nodes.len()
            + config.target_nodes.len()
            + config.downstream_nodes.len(),
        edge_count: config.pathway_edges.len(),
        module_count: config.affected_modules.len(),
        loop_count: config.loop_involvements.len(),
        loops_breaking: count(Involvement::Breaks),
        loops_weakening: count(Involvement::Weakens),
        loops_strengthening: count(Involvement::Strengthens),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn involvement(loop_id: &str, involvement: Involvement) -> LoopInvolvement {
        LoopInvolvement {
            loop_id: loop_id.to_owned(),
            involvement,
            target_node_in_loop: "t".to_owned(),
        }
    }

    #[test]
    fn test_counts() {
        let config = PathwayConfig {
            upstream_nodes: strings(&["u1", "u2"]),
            target_nodes: strings(&["t"]),
            downstream_nodes: strings(&["d1", "d2", "d3"]),
            pathway_edges: strings(&["e1", "e2", "e3", "e4"]),
            affected_modules: strings(&["M01", "M02"]),
            loop_involvements: vec![
                involvement("L1", Involvement::Breaks),
                involvement("L2", Involvement::Weakens),
                involvement("L3", Involvement::Strengthens),
            ],
        };
        let stats = get_pathway_stats(&config);

        assert_eq!(stats.total_nodes, 6);
        assert_eq!(stats.upstream_count, 2);
        assert_eq!(stats.target_count, 1);
        assert_eq!(stats.downstream_count, 3);
        assert_eq!(stats.edge_count, 4);
        assert_eq!(stats.module_count, 2);
        assert_eq!(stats.loop_count, 3);
        assert_eq!(stats.loops_breaking, 1);
        assert_eq!(stats.loops_weakening, 1);
        assert_eq!(stats.loops_strengthening, 1);
    }

    #[test]
    fn test_empty_config() {
        assert_eq!(
            get_pathway_stats(&PathwayConfig::default()),
            PathwayStats::default()
        );
    }

    #[test]
    fn test_config_partial_json() {
        let config: PathwayConfig =
            serde_json::from_str(r#"{"targetNodes": ["bace1"], "pathwayEdges": ["e1"]}"#).unwrap();
        let stats = get_pathway_stats(&config);
        assert_eq!(stats.total_nodes, 1);
        assert_eq!(stats.edge_count, 1);
        assert_eq!(stats.loop_count, 0);
    }
}
