// Copyright 2026 The Mechanism Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::PathwayResult;
use crate::datamodel::{DrugEffect, DrugTarget, Edge, FeedbackLoop, LinkPolarity};

/// How an intervention on a loop member changes the loop.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Involvement {
    Breaks,
    Strengthens,
    Weakens,
}

impl Involvement {
    /// Lower ranks win when several targets touch one loop.
    fn rank(self) -> u8 {
        match self {
            Involvement::Breaks => 0,
            Involvement::Weakens => 1,
            Involvement::Strengthens => 2,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoopInvolvement {
    pub loop_id: String,
    pub involvement: Involvement,
    pub target_node_in_loop: String,
}

fn classify(effect: DrugEffect, outgoing: Option<LinkPolarity>) -> Involvement {
    match (effect, outgoing) {
        (DrugEffect::Activates, _) => Involvement::Strengthens,
        (DrugEffect::Inhibits, Some(LinkPolarity::Positive)) => Involvement::Breaks,
        (DrugEffect::Inhibits, _) => Involvement::Weakens,
    }
}

/// Classify every feedback loop the pathway touches through a target.
///
/// A loop is reported when it shares at least one edge with the pathway
/// and one of its edges starts or ends at a target. Loops come back in
/// input order, one entry each.
pub fn analyze_loop_involvement(
    targets: &[DrugTarget],
    pathway: &PathwayResult,
    loops: &[FeedbackLoop],
    edges: &[Edge],
) -> Vec<LoopInvolvement> {
    let mut edge_by_id: HashMap<&str, &Edge> = HashMap::with_capacity(edges.len());
    for edge in edges {
        edge_by_id.entry(edge.id.as_str()).or_insert(edge);
    }

    let mut involvements = Vec::new();
    for feedback_loop in loops {
        if !feedback_loop
            .edge_ids
            .iter()
            .any(|id| pathway.pathway_edges.contains(id))
        {
            continue;
        }
        let loop_edges: Vec<&Edge> = feedback_loop
            .edge_ids
            .iter()
            .filter_map(|id| edge_by_id.get(id.as_str()).copied())
            .collect();

        let mut best: Option<(Involvement, &str)> = None;
        for target in targets {
            let id = target.node_id.as_str();
            if !loop_edges.iter().any(|e| e.source == id || e.target == id) {
                continue;
            }
            let outgoing = loop_edges
                .iter()
                .find(|e| e.source == id)
                .map(|e| e.relation.polarity());
            let involvement = classify(target.effect, outgoing);
            if best.is_none_or(|(current, _)| involvement.rank() < current.rank()) {
                best = Some((involvement, id));
            }
        }

        if let Some((involvement, node)) = best {
            tracing::trace!(loop_id = %feedback_loop.id, ?involvement, node, "loop involvement");
            involvements.push(LoopInvolvement {
                loop_id: feedback_loop.id.clone(),
                involvement,
                target_node_in_loop: node.to_owned(),
            });
        }
    }

    involvements
}
