// Copyright 2026 The Mechanism Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use serde::Serialize;

use crate::datamodel::{Edge, Node};
use crate::graph::{AdjacencyIndex, AdjacencyIndexBuilder};

/// Prefix for synthetic nodes standing in for a hidden module.
pub const PSEUDO_NODE_PREFIX: &str = "__pseudo__";

/// Create a pseudo-node identifier for a hidden module.
pub fn make_pseudo_node_ident(module_id: &str) -> String {
    format!("{PSEUDO_NODE_PREFIX}{module_id}")
}

/// Parse a pseudo-node identifier back to its module id.
pub fn parse_pseudo_node_ident(ident: &str) -> Option<&str> {
    ident.strip_prefix(PSEUDO_NODE_PREFIX)
}

/// A black-box stand-in for a hidden module that bridges two visible
/// components. Only the layout pipeline ever sees these.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PseudoNode {
    pub id: String,
    pub module_id: String,
    /// Visible nodes feeding into the hidden module.
    pub connects_from: BTreeSet<String>,
    /// Entry points of the downstream visible module.
    pub connects_to: BTreeSet<String>,
}

/// The visible subgraph for a module selection, ready for `compute_layout`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FilteredView {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub pseudo_nodes: Vec<PseudoNode>,
    pub excluded_edge_ids: BTreeSet<String>,
}

/// Undirected connected components of `index`, each sorted by id.
///
/// Components are ordered by size (largest first), with ties broken by
/// their smallest non-pseudo member id, so layouts are reproducible across
/// runs and do not depend on hidden module names.
pub fn connected_components(index: &AdjacencyIndex) -> Vec<Vec<String>> {
    let mut visited: HashSet<&str> = HashSet::with_capacity(index.node_count());
    let mut components = Vec::new();

    for start in index.node_ids() {
        if !visited.insert(start.as_str()) {
            continue;
        }

        let mut component = Vec::new();
        let mut stack = vec![start.as_str()];
        while let Some(current) = stack.pop() {
            component.push(current.to_owned());
            for adj in index.neighbors(current) {
                if visited.insert(adj.node_id.as_str()) {
                    stack.push(adj.node_id.as_str());
                }
            }
        }

        component.sort();
        components.push(component);
    }

    components.sort_by(|a: &Vec<String>, b: &Vec<String>| {
        b.len()
            .cmp(&a.len())
            .then_with(|| tie_break_key(a).cmp(tie_break_key(b)))
    });
    components
}

/// Smallest real member of a sorted component, falling back to the
/// smallest member when the component holds only pseudo-nodes.
fn tie_break_key(members: &[String]) -> &str {
    members
        .iter()
        .find(|m| parse_pseudo_node_ident(m).is_none())
        .or_else(|| members.first())
        .map_or("", String::as_str)
}

/// Restrict `nodes`/`edges` to the selected modules and synthesize pseudo
/// nodes for hidden modules that bridge visible components.
pub fn filtered_view(
    nodes: &[Node],
    edges: &[Edge],
    selected_modules: &BTreeSet<String>,
) -> FilteredView {
    if selected_modules.is_empty() {
        return FilteredView {
            nodes: nodes.to_vec(),
            edges: edges.to_vec(),
            pseudo_nodes: Vec::new(),
            excluded_edge_ids: BTreeSet::new(),
        };
    }

    let visible: HashSet<&str> = nodes
        .iter()
        .filter(|n| selected_modules.contains(&n.module_id))
        .map(|n| n.id.as_str())
        .collect();

    let view_nodes: Vec<Node> = nodes
        .iter()
        .filter(|n| visible.contains(n.id.as_str()))
        .cloned()
        .collect();
    let view_edges: Vec<Edge> = edges
        .iter()
        .filter(|e| visible.contains(e.source.as_str()) && visible.contains(e.target.as_str()))
        .cloned()
        .collect();

    let (pseudo_nodes, excluded_edge_ids) = synthesize_pseudo_nodes(nodes, edges, &visible);

    FilteredView {
        nodes: view_nodes,
        edges: view_edges,
        pseudo_nodes,
        excluded_edge_ids,
    }
}

/// Find hidden modules that bridge otherwise separate visible components.
///
/// Returns one pseudo node per bridging module plus the ids of the direct
/// cross-module edges the pseudo node replaces.
pub fn synthesize_pseudo_nodes(
    nodes: &[Node],
    edges: &[Edge],
    visible: &HashSet<&str>,
) -> (Vec<PseudoNode>, BTreeSet<String>) {
    let module_of: HashMap<&str, &str> = nodes
        .iter()
        .map(|n| (n.id.as_str(), n.module_id.as_str()))
        .collect();
    let hidden_modules: BTreeSet<&str> = nodes
        .iter()
        .filter(|n| !visible.contains(n.id.as_str()))
        .map(|n| n.module_id.as_str())
        .collect();

    let mut pseudo_nodes = Vec::new();
    let mut excluded: BTreeSet<String> = BTreeSet::new();

    for module in hidden_modules {
        let in_module = |id: &str| !visible.contains(id) && module_of.get(id) == Some(&module);

        let mut inside: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut leaving: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut entering: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for e in edges {
            let (source, target) = (e.source.as_str(), e.target.as_str());
            if in_module(source) && in_module(target) {
                inside.entry(source).or_default().push(target);
            } else if in_module(source) && visible.contains(target) {
                leaving.entry(source).or_default().push(target);
            } else if visible.contains(source) && in_module(target) {
                entering.entry(target).or_default().insert(source);
            }
        }

        // only feeders whose hidden node reaches an exit through the
        // module itself take part in the bridge
        let mut feeders: BTreeSet<&str> = BTreeSet::new();
        let mut exits: BTreeSet<&str> = BTreeSet::new();
        for (&entry, sources) in &entering {
            let reached = exits_reachable_from(entry, &inside, &leaving);
            if !reached.is_empty() {
                feeders.extend(sources.iter().copied());
                exits.extend(reached);
            }
        }
        if feeders.is_empty() || exits.is_empty() {
            tracing::trace!(module, "hidden module has no path from a feeder to an exit");
            continue;
        }

        // an exit is an entry point when every visible edge into it is a
        // cross-module edge from one of this bridge's feeders
        let mut entry_points: BTreeSet<&str> = exits
            .iter()
            .copied()
            .filter(|&exit| {
                edges
                    .iter()
                    .filter(|e| {
                        e.target == exit
                            && visible.contains(e.source.as_str())
                            && !excluded.contains(&e.id)
                    })
                    .all(|e| {
                        feeders.contains(e.source.as_str())
                            && module_of.get(e.source.as_str()) != module_of.get(exit)
                    })
            })
            .collect();
        if entry_points.is_empty() {
            entry_points = exits.clone();
        }

        let replaced: BTreeSet<String> = edges
            .iter()
            .filter(|e| {
                feeders.contains(e.source.as_str())
                    && entry_points.contains(e.target.as_str())
                    && module_of.get(e.source.as_str()) != module_of.get(e.target.as_str())
            })
            .map(|e| e.id.clone())
            .collect();

        let component_of = visible_component_map(nodes, edges, visible, &excluded, &replaced);
        let bridges = feeders.iter().any(|from| {
            entry_points
                .iter()
                .any(|to| component_of.get(*from) != component_of.get(*to))
        });
        if !bridges {
            tracing::trace!(module, "hidden module does not bridge visible components");
            continue;
        }

        let pseudo = PseudoNode {
            id: make_pseudo_node_ident(module),
            module_id: module.to_owned(),
            connects_from: feeders.iter().map(|s| s.to_string()).collect(),
            connects_to: entry_points.iter().map(|s| s.to_string()).collect(),
        };
        tracing::debug!(
            module,
            from = pseudo.connects_from.len(),
            to = pseudo.connects_to.len(),
            replaced = replaced.len(),
            "synthesized pseudo node"
        );
        excluded.extend(replaced);
        pseudo_nodes.push(pseudo);
    }

    (pseudo_nodes, excluded)
}

/// Visible nodes reached by leaving the hidden module after walking its
/// internal edges from `entry`.
fn exits_reachable_from<'a>(
    entry: &'a str,
    inside: &HashMap<&'a str, Vec<&'a str>>,
    leaving: &HashMap<&'a str, Vec<&'a str>>,
) -> BTreeSet<&'a str> {
    let mut seen: HashSet<&str> = HashSet::from([entry]);
    let mut queue = VecDeque::from([entry]);
    let mut exits = BTreeSet::new();
    while let Some(current) = queue.pop_front() {
        if let Some(targets) = leaving.get(current) {
            exits.extend(targets.iter().copied());
        }
        for &next in inside.get(current).into_iter().flatten() {
            if seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    exits
}

/// Map each visible node to the index of its component, ignoring the
/// edges in `excluded` and `replaced`.
fn visible_component_map(
    nodes: &[Node],
    edges: &[Edge],
    visible: &HashSet<&str>,
    excluded: &BTreeSet<String>,
    replaced: &BTreeSet<String>,
) -> HashMap<String, usize> {
    let mut builder = AdjacencyIndexBuilder::new();
    for node in nodes.iter().filter(|n| visible.contains(n.id.as_str())) {
        builder.add_node(&node.id);
    }
    for edge in edges {
        if excluded.contains(&edge.id) || replaced.contains(&edge.id) {
            continue;
        }
        builder.add_edge(&edge.id, &edge.source, &edge.target);
    }

    connected_components(&builder.build())
        .into_iter()
        .enumerate()
        .flat_map(|(i, members)| members.into_iter().map(move |m| (m, i)))
        .collect()
}
