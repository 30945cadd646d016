use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Clone, Debug, Deserialize)]
pub struct RawNode {
    #[serde(deserialize_with = "id_from_value")]
    pub id: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    #[serde(flatten)]
    pub metadata: BTreeMap<String, Value>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawEdge {
    #[serde(deserialize_with = "id_from_value")]
    pub source: String,
    #[serde(deserialize_with = "id_from_value")]
    pub target: String,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawGraph {
    #[serde(default)]
    pub nodes: Vec<RawNode>,
    #[serde(default, alias = "links")]
    pub edges: Vec<RawEdge>,
}

fn id_from_value<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(id) => Ok(id),
        Value::Number(id) => Ok(id.to_string()),
        other => Err(serde::de::Error::custom(format!(
            "expected a string or number id, found {other}"
        ))),
    }
}

/// Accepts either a bare `{nodes, edges}` document or the scanner's
/// `{graph: {...}, savedId}` envelope.
pub fn parse_graph_document(raw: &str) -> Result<RawGraph> {
    let parsed: Value = serde_json::from_str(raw).context("invalid graph JSON")?;
    let object = parsed
        .as_object()
        .ok_or_else(|| anyhow!("graph document must be a JSON object"))?;

    let body = match object.get("graph") {
        Some(inner) if inner.is_object() => inner,
        _ => &parsed,
    };

    let has_nodes = body.get("nodes").is_some_and(Value::is_array);
    if !has_nodes {
        return Err(anyhow!("graph document has no `nodes` array"));
    }

    RawGraph::deserialize(body).context("invalid node or edge entry in graph document")
}

pub fn load_graph_file(path: &Path) -> Result<RawGraph> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read graph file {}", path.display()))?;
    let graph = parse_graph_document(&raw)
        .with_context(|| format!("failed to parse graph file {}", path.display()))?;

    log::info!(
        "loaded {} nodes and {} edges from {}",
        graph.nodes.len(),
        graph.edges.len(),
        path.display()
    );
    Ok(graph)
}
