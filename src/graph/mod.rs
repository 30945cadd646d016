mod error;
mod parse;

use std::collections::{BTreeMap, HashMap};

use eframe::egui::{Vec2, vec2};
use serde_json::Value;

pub use error::ValidationError;
pub use parse::{RawEdge, RawGraph, RawNode, load_graph_file};

#[derive(Clone, Debug)]
pub struct Node {
    pub id: String,
    pub label: Option<String>,
    pub metadata: BTreeMap<String, Value>,
    pub(crate) initial_position: Option<Vec2>,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) pin: Option<Vec2>,
}

impl Node {
    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn is_pinned(&self) -> bool {
        self.pin.is_some()
    }

    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Metadata rendered as `key: value` lines, strings unquoted.
    pub fn metadata_lines(&self) -> Vec<String> {
        self.metadata
            .iter()
            .filter(|(_, value)| match value {
                Value::Null => false,
                Value::String(text) => !text.trim().is_empty(),
                _ => true,
            })
            .map(|(key, value)| match value {
                Value::String(text) => format!("{key}: {text}"),
                other => format!("{key}: {other}"),
            })
            .collect()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Edge {
    pub source_id: String,
    pub target_id: String,
    pub(crate) source: usize,
    pub(crate) target: usize,
}

impl Edge {
    pub fn endpoints(&self) -> (usize, usize) {
        (self.source, self.target)
    }

    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index_by_id: HashMap<String, usize>,
    dropped_edges: usize,
}

impl Graph {
    /// Copies the raw input into a validated graph. Duplicate node ids are
    /// refused; edges naming an unknown node are dropped and counted.
    pub fn build(raw_nodes: &[RawNode], raw_edges: &[RawEdge]) -> Result<Self, ValidationError> {
        let mut index_by_id = HashMap::with_capacity(raw_nodes.len());
        let mut nodes = Vec::with_capacity(raw_nodes.len());

        for (index, raw) in raw_nodes.iter().enumerate() {
            if index_by_id.insert(raw.id.clone(), index).is_some() {
                return Err(ValidationError::DuplicateNodeId { id: raw.id.clone() });
            }

            let initial_position = match (raw.x, raw.y) {
                (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some(vec2(x, y)),
                _ => None,
            };

            nodes.push(Node {
                id: raw.id.clone(),
                label: raw.label.clone(),
                metadata: raw.metadata.clone(),
                initial_position,
                position: initial_position.unwrap_or(Vec2::ZERO),
                velocity: Vec2::ZERO,
                pin: None,
            });
        }

        let mut edges = Vec::with_capacity(raw_edges.len());
        let mut dropped_edges = 0usize;
        for raw in raw_edges {
            let (Some(&source), Some(&target)) =
                (index_by_id.get(&raw.source), index_by_id.get(&raw.target))
            else {
                log::debug!("dropping edge {} -> {}: unknown endpoint", raw.source, raw.target);
                dropped_edges += 1;
                continue;
            };

            edges.push(Edge {
                source_id: raw.source.clone(),
                target_id: raw.target.clone(),
                source,
                target,
            });
        }

        if dropped_edges > 0 {
            log::warn!("dropped {dropped_edges} edges with unknown endpoints");
        }

        Ok(Self {
            nodes,
            edges,
            index_by_id,
            dropped_edges,
        })
    }

    pub fn from_raw(raw: &RawGraph) -> Result<Self, ValidationError> {
        Self::build(&raw.nodes, &raw.edges)
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub(crate) fn nodes_mut(&mut self) -> &mut [Node] {
        &mut self.nodes
    }

    pub(crate) fn nodes_and_edges_mut(&mut self) -> (&mut [Node], &[Edge]) {
        (&mut self.nodes, &self.edges)
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn dropped_edges(&self) -> usize {
        self.dropped_edges
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    /// Number of kept edges touching each node, self-loops excluded.
    pub fn degrees(&self) -> Vec<usize> {
        let mut degrees = vec![0usize; self.nodes.len()];
        for edge in &self.edges {
            if edge.is_self_loop() {
                continue;
            }
            degrees[edge.source] += 1;
            degrees[edge.target] += 1;
        }
        degrees
    }
}
