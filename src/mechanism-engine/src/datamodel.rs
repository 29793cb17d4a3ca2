// Copyright 2026 The Mechanism Authors. All rights reserved.
// Use of this source code is governed by the Apache License,
// Version 2.0, that can be found in the LICENSE file.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::Result;
use crate::graph::{AdjacencyIndex, build_adjacency_index};
use crate::layout::components::{FilteredView, filtered_view};
use crate::{model_err, query_err};

/// Coarse node category, used for ordering and boundary handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeCategory {
    Boundary,
    State,
    Stock,
}

impl NodeCategory {
    /// Sort priority within a layer: boundaries first, stocks last.
    pub fn priority(self) -> u8 {
        match self {
            NodeCategory::Boundary => 0,
            NodeCategory::State => 1,
            NodeCategory::Stock => 2,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BoundaryDirection {
    Input,
    Output,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VariantEffect {
    Increases,
    Decreases,
    Neutral,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VariantMagnitude {
    Low,
    Medium,
    High,
}

/// A named variant of a boundary input (an allele, an exposure level).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryVariant {
    pub id: String,
    pub label: String,
    pub effect_direction: VariantEffect,
    pub magnitude: VariantMagnitude,
    /// Population frequency in `0.0..=1.0`.
    #[serde(default)]
    pub frequency: f64,
}

/// Category-specific node data. Only boundaries carry a direction and
/// variants, so the other categories cannot be built with them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "UPPERCASE")]
pub enum NodeKind {
    Stock,
    State,
    Boundary {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        direction: Option<BoundaryDirection>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        variants: Vec<BoundaryVariant>,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: NodeKind,
    #[serde(default)]
    pub subtype: String,
    pub module_id: String,
}

impl Node {
    pub fn category(&self) -> NodeCategory {
        match self.kind {
            NodeKind::Stock => NodeCategory::Stock,
            NodeKind::State => NodeCategory::State,
            NodeKind::Boundary { .. } => NodeCategory::Boundary,
        }
    }

    pub fn boundary_direction(&self) -> Option<BoundaryDirection> {
        match self.kind {
            NodeKind::Boundary { direction, .. } => direction,
            _ => None,
        }
    }

    pub fn is_input_boundary(&self) -> bool {
        self.boundary_direction() == Some(BoundaryDirection::Input)
    }

    pub fn is_output_boundary(&self) -> bool {
        self.boundary_direction() == Some(BoundaryDirection::Output)
    }
}

/// Polarity of a causal link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkPolarity {
    Positive, // Increase in 'from' causes increase in 'to'
    Negative, // Increase in 'from' causes decrease in 'to'
    Unknown,  // Direction depends on context
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EdgeRelation {
    Increases,
    Decreases,
    Regulates,
    Modulates,
    Binds,
    Transports,
    Produces,
    Degrades,
    #[serde(other)]
    Other,
}

impl EdgeRelation {
    pub fn polarity(self) -> LinkPolarity {
        match self {
            EdgeRelation::Increases | EdgeRelation::Produces | EdgeRelation::Transports => {
                LinkPolarity::Positive
            }
            EdgeRelation::Decreases | EdgeRelation::Degrades => LinkPolarity::Negative,
            EdgeRelation::Regulates
            | EdgeRelation::Modulates
            | EdgeRelation::Binds
            | EdgeRelation::Other => LinkPolarity::Unknown,
        }
    }
}

/// Strength of the causal claim, L1 (interventional human data) through
/// L7 (speculative).
#[derive(
    Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum CausalConfidence {
    L1,
    L2,
    L3,
    L4,
    L5,
    L6,
    #[default]
    L7,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Evidence {
    pub citation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quote: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
    pub id: String,
    pub source: String,
    pub target: String,
    pub relation: EdgeRelation,
    #[serde(default)]
    pub module_id: String,
    #[serde(default)]
    pub causal_confidence: CausalConfidence,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub evidence: Vec<Evidence>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LoopType {
    Reinforcing,
    Balancing,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackLoop {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub loop_type: LoopType,
    /// Edge ids in cycle order.
    pub edge_ids: Vec<String>,
    #[serde(default)]
    pub modules: BTreeSet<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DrugEffect {
    #[serde(alias = "inhibit")]
    Inhibits,
    #[serde(alias = "activate")]
    Activates,
}

impl FromStr for DrugEffect {
    type Err = crate::common::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "inhibit" | "inhibits" => Ok(DrugEffect::Inhibits),
            "activate" | "activates" => Ok(DrugEffect::Activates),
            other => query_err!(BadTarget, format!("unknown effect '{other}'")),
        }
    }
}

/// Descriptive only; traversal depth never depends on it.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TargetStrength {
    Weak,
    #[default]
    Moderate,
    Strong,
}

impl FromStr for TargetStrength {
    type Err = crate::common::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "weak" => Ok(TargetStrength::Weak),
            "moderate" => Ok(TargetStrength::Moderate),
            "strong" => Ok(TargetStrength::Strong),
            other => query_err!(BadTarget, format!("unknown strength '{other}'")),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrugTarget {
    pub node_id: String,
    pub effect: DrugEffect,
    #[serde(default)]
    pub strength: TargetStrength,
}

impl DrugTarget {
    pub fn new(node_id: &str, effect: DrugEffect) -> Self {
        DrugTarget {
            node_id: node_id.to_owned(),
            effect,
            strength: TargetStrength::default(),
        }
    }
}

impl FromStr for DrugTarget {
    type Err = crate::common::Error;

    /// Parses `node_id:effect[:strength]`, e.g. `bace1:inhibits:strong`.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(':');
        let node_id = match parts.next() {
            Some(id) if !id.trim().is_empty() => id.trim().to_owned(),
            _ => return query_err!(BadTarget, format!("missing node id in '{s}'")),
        };
        let effect = match parts.next() {
            Some(effect) => effect.parse()?,
            None => return query_err!(BadTarget, format!("missing effect in '{s}'")),
        };
        let strength = match parts.next() {
            Some(strength) => strength.parse()?,
            None => TargetStrength::default(),
        };
        if parts.next().is_some() {
            return query_err!(BadTarget, format!("too many fields in '{s}'"));
        }

        Ok(DrugTarget {
            node_id,
            effect,
            strength,
        })
    }
}

/// On-disk shape of a causal network dataset.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dataset {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(default)]
    pub modules: Vec<Module>,
    #[serde(default, alias = "loops")]
    pub feedback_loops: Vec<FeedbackLoop>,
}

/// Immutable snapshot of a causal network. Built once per dataset load and
/// passed by reference into every analysis; nothing derived from it is
/// cached here.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphModel {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    modules: Vec<Module>,
    feedback_loops: Vec<FeedbackLoop>,
    node_index: HashMap<String, usize>,
}

impl GraphModel {
    pub fn new(
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        modules: Vec<Module>,
        feedback_loops: Vec<FeedbackLoop>,
    ) -> Result<Self> {
        let mut node_index = HashMap::with_capacity(nodes.len());
        for (i, node) in nodes.iter().enumerate() {
            if node_index.insert(node.id.clone(), i).is_some() {
                return model_err!(DuplicateNode, node.id.clone());
            }
        }

        let mut edge_ids = HashSet::with_capacity(edges.len());
        for edge in &edges {
            if !edge_ids.insert(edge.id.as_str()) {
                return model_err!(DuplicateEdge, edge.id.clone());
            }
        }

        let mut loop_ids = HashSet::with_capacity(feedback_loops.len());
        for feedback_loop in &feedback_loops {
            if !loop_ids.insert(feedback_loop.id.as_str()) {
                return model_err!(DuplicateLoop, feedback_loop.id.clone());
            }
        }

        Ok(GraphModel {
            nodes,
            edges,
            modules,
            feedback_loops,
            node_index,
        })
    }

    pub fn from_dataset(dataset: Dataset) -> Result<Self> {
        GraphModel::new(
            dataset.nodes,
            dataset.edges,
            dataset.modules,
            dataset.feedback_loops,
        )
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let dataset: Dataset = serde_json::from_str(json)?;
        GraphModel::from_dataset(dataset)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub fn feedback_loops(&self) -> &[FeedbackLoop] {
        &self.feedback_loops
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    /// Build a fresh adjacency index over the whole network.
    pub fn adjacency(&self) -> AdjacencyIndex {
        build_adjacency_index(&self.nodes, &self.edges)
    }

    /// The visible subgraph for a module selection. An empty selection
    /// shows every module.
    pub fn filtered_view(&self, selected_modules: &BTreeSet<String>) -> FilteredView {
        filtered_view(&self.nodes, &self.edges, selected_modules)
    }
}
