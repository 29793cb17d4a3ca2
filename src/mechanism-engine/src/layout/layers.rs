// Copyright 2026 The Mechanism Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

//! Longest-path layer assignment that tolerates cycles.
//!
//! Nodes become ready once every in-component predecessor has a layer.
//! When nothing is ready but nodes remain (the rest of the component sits
//! on or behind a cycle), one node is forced: the unassigned node with the
//! fewest unassigned predecessors, preferring nodes already reached from
//! the assigned part. Every edge from a still-unassigned predecessor into a
//! forced node is recorded as a back edge.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};

use super::LayoutEdge;

/// Per-node progress through layer assignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeState {
    Unvisited,
    /// Reached from an assigned predecessor, waiting on the others.
    Queued,
    Assigned(usize),
}

impl NodeState {
    fn layer(self) -> Option<usize> {
        match self {
            NodeState::Assigned(layer) => Some(layer),
            _ => None,
        }
    }
}

/// Input and output boundary node ids of a component.
#[derive(Clone, Debug, Default)]
pub struct BoundaryRoles {
    pub inputs: BTreeSet<String>,
    pub outputs: BTreeSet<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct LayerAssignment {
    pub layers: BTreeMap<String, usize>,
    /// Cycle-completing edges found while assigning, by edge id.
    pub back_edges: BTreeSet<String>,
    /// Nodes assigned before all their predecessors, in assignment order.
    pub forced: Vec<String>,
}

struct LayerAssigner<'a> {
    members: &'a [String],
    preds: HashMap<&'a str, Vec<&'a LayoutEdge>>,
    succs: HashMap<&'a str, Vec<&'a LayoutEdge>>,
    remaining: HashMap<&'a str, usize>,
    state: HashMap<&'a str, NodeState>,
    ready: VecDeque<&'a str>,
    back_edges: BTreeSet<String>,
    forced: Vec<String>,
}

impl<'a> LayerAssigner<'a> {
    fn new(members: &'a [String], edges: &'a [LayoutEdge]) -> Self {
        let mut preds: HashMap<&str, Vec<&LayoutEdge>> = HashMap::new();
        let mut succs: HashMap<&str, Vec<&LayoutEdge>> = HashMap::new();
        let mut state = HashMap::with_capacity(members.len());
        for member in members {
            preds.insert(member.as_str(), Vec::new());
            succs.insert(member.as_str(), Vec::new());
            state.insert(member.as_str(), NodeState::Unvisited);
        }

        let mut back_edges = BTreeSet::new();
        for edge in edges {
            if !preds.contains_key(edge.source.as_str()) || !preds.contains_key(edge.target.as_str())
            {
                continue;
            }
            if edge.source == edge.target {
                back_edges.insert(edge.id.clone());
                continue;
            }
            if let Some(p) = preds.get_mut(edge.target.as_str()) {
                p.push(edge);
            }
            if let Some(s) = succs.get_mut(edge.source.as_str()) {
                s.push(edge);
            }
        }

        let remaining = preds.iter().map(|(&id, p)| (id, p.len())).collect();

        LayerAssigner {
            members,
            preds,
            succs,
            remaining,
            state,
            ready: VecDeque::new(),
            back_edges,
            forced: Vec::new(),
        }
    }

    fn state_of(&self, node: &str) -> NodeState {
        self.state.get(node).copied().unwrap_or(NodeState::Unvisited)
    }

    fn is_assigned(&self, node: &str) -> bool {
        self.state_of(node).layer().is_some()
    }

    /// One past the highest layer among assigned predecessors.
    fn layer_after_preds(&self, node: &str) -> Option<usize> {
        self.preds
            .get(node)
            .into_iter()
            .flatten()
            .filter_map(|e| self.state_of(&e.source).layer())
            .max()
            .map(|layer| layer + 1)
    }

    fn assign(&mut self, node: &'a str, layer: usize) {
        let unassigned: Vec<String> = self
            .preds
            .get(node)
            .into_iter()
            .flatten()
            .filter(|e| !self.is_assigned(&e.source))
            .map(|e| e.id.clone())
            .collect();
        if !unassigned.is_empty() {
            tracing::trace!(node, layer, back_edges = ?unassigned, "breaking cycle");
        }
        self.back_edges.extend(unassigned);
        self.state.insert(node, NodeState::Assigned(layer));

        let succs = self.succs.get(node).cloned().unwrap_or_default();
        for edge in succs {
            let target = edge.target.as_str();
            if let Some(count) = self.remaining.get_mut(target) {
                *count = count.saturating_sub(1);
                let now_ready = *count == 0;
                match self.state_of(target) {
                    NodeState::Assigned(_) => {}
                    _ => {
                        self.state.insert(target, NodeState::Queued);
                        if now_ready {
                            self.ready.push_back(target);
                        }
                    }
                }
            }
        }
    }

    /// The node to force when nothing is ready.
    fn pick_forced(&self) -> Option<&'a str> {
        self.members
            .iter()
            .map(String::as_str)
            .filter(|m| !self.is_assigned(m))
            .min_by_key(|m| {
                let reached = self.state_of(m) == NodeState::Queued;
                let waiting = self.remaining.get(m).copied().unwrap_or(0);
                (!reached, waiting)
            })
    }
}

/// Assign a layer to every member of one connected component.
///
/// `edges` may include edges leaving the component; they are ignored.
/// Input boundaries are pinned to layer 0 and, when present, other
/// sources start at layer 1. Output boundaries always land one layer past
/// the deepest non-output node.
pub fn assign_layers(
    members: &[String],
    edges: &[LayoutEdge],
    boundaries: &BoundaryRoles,
    iteration_factor: usize,
) -> LayerAssignment {
    if members.is_empty() {
        return LayerAssignment::default();
    }

    let mut assigner = LayerAssigner::new(members, edges);
    let has_inputs = members.iter().any(|m| boundaries.inputs.contains(m));
    let base = if has_inputs { 1 } else { 0 };

    let mut sources: Vec<(&str, usize)> = members
        .iter()
        .filter_map(|m| {
            if boundaries.inputs.contains(m) {
                Some((m.as_str(), 0))
            } else if assigner.preds[m.as_str()].is_empty() {
                Some((m.as_str(), base))
            } else {
                None
            }
        })
        .collect();
    if sources.is_empty() {
        // a pure cycle: enter at the node with the fewest predecessors
        if let Some(entry) = members
            .iter()
            .min_by_key(|m| assigner.preds[m.as_str()].len())
        {
            assigner.forced.push(entry.clone());
            sources.push((entry.as_str(), base));
        }
    }
    for &(source, layer) in &sources {
        assigner.assign(source, layer);
    }

    let max_iterations = members.len().saturating_mul(iteration_factor.max(1));
    let mut iterations = 0;
    let mut assigned = sources.len();
    while assigned < members.len() && iterations < max_iterations {
        iterations += 1;

        let node = match assigner.ready.pop_front() {
            Some(node) => node,
            None => match assigner.pick_forced() {
                Some(node) => {
                    assigner.forced.push(node.to_owned());
                    node
                }
                None => break,
            },
        };
        if assigner.is_assigned(node) {
            continue;
        }

        let layer = assigner.layer_after_preds(node).unwrap_or(base);
        assigner.assign(node, layer);
        assigned += 1;
    }

    let mut layers: BTreeMap<String, usize> = BTreeMap::new();
    let mut leftovers = Vec::new();
    for member in members {
        match assigner.state_of(member).layer() {
            Some(layer) => {
                layers.insert(member.clone(), layer);
            }
            None => leftovers.push(member.clone()),
        }
    }
    if !leftovers.is_empty() {
        let fallback = layers.values().copied().max().map_or(base, |max| max + 1);
        tracing::debug!(
            count = leftovers.len(),
            fallback,
            "layer assignment hit its iteration cap"
        );
        for member in leftovers {
            layers.insert(member, fallback);
        }
    }

    let deepest = layers
        .iter()
        .filter(|(id, _)| !boundaries.outputs.contains(*id))
        .map(|(_, &layer)| layer)
        .max();
    if let Some(deepest) = deepest {
        for output in &boundaries.outputs {
            if let Some(layer) = layers.get_mut(output) {
                *layer = deepest + 1;
            }
        }
    }

    LayerAssignment {
        layers,
        back_edges: assigner.back_edges,
        forced: assigner.forced,
    }
}
