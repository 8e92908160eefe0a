//! Shape checks and normalisation for the graph document returned by the
//! analysis service.
//!
//! The document is Cytoscape-style JSON:
//!
//! ```json
//! { "directed": true, "multigraph": false,
//!   "elements": { "nodes": [ { "data": { "id": "A", ... } } ],
//!                 "edges": [ { "data": { "source": "A", "target": "B", ... } } ] } }
//! ```
//!
//! The service stringifies attribute values that are not JSON primitives, so
//! numeric attributes are accepted either as numbers or as numeric strings.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::ValidationError;

/// Node attributes consumed by the viewer. Everything else lands in `extra`.
const NODE_KEYS: [&str; 7] = [
	"id",
	"label",
	"username",
	"name",
	"community",
	"in_degree_centrality",
	"tweets",
];

#[derive(Clone, Debug, PartialEq)]
pub struct GraphPayload {
	pub directed: bool,
	pub multigraph: bool,
	pub nodes: Vec<NodeAttrs>,
	pub edges: Vec<EdgeAttrs>,
}

/// Cluster assignment from community detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Community {
	Assigned(u64),
	Uncategorized,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeAttrs {
	pub id: String,
	pub label: String,
	pub username: String,
	pub name: String,
	pub community: Community,
	pub in_degree_centrality: f64,
	/// Raw message data; only decoded when the node is selected.
	pub tweets: Option<Value>,
	pub extra: Map<String, Value>,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum InteractionKind {
	Reply,
	Retweet,
	Quote,
	Mentions,
	/// Missing or unrecognised type; keeps the raw name for display.
	Other(String),
}

impl InteractionKind {
	pub const KNOWN: [InteractionKind; 4] = [
		InteractionKind::Reply,
		InteractionKind::Retweet,
		InteractionKind::Quote,
		InteractionKind::Mentions,
	];

	pub fn parse(raw: &str) -> Self {
		match raw {
			"reply" => InteractionKind::Reply,
			"retweet" => InteractionKind::Retweet,
			"quote" => InteractionKind::Quote,
			"mentions" => InteractionKind::Mentions,
			other => InteractionKind::Other(other.to_string()),
		}
	}

	pub fn as_str(&self) -> &str {
		match self {
			InteractionKind::Reply => "reply",
			InteractionKind::Retweet => "retweet",
			InteractionKind::Quote => "quote",
			InteractionKind::Mentions => "mentions",
			InteractionKind::Other(raw) => raw,
		}
	}
}

impl Default for InteractionKind {
	fn default() -> Self {
		InteractionKind::Other("other".to_string())
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeAttrs {
	pub source: String,
	pub target: String,
	pub kind: InteractionKind,
	pub weight: f64,
}

/// Parse raw response bytes and normalise them.
pub fn from_slice(bytes: &[u8]) -> Result<GraphPayload, ValidationError> {
	let raw: Value = serde_json::from_slice(bytes)
		.map_err(|e| ValidationError::MalformedPayload(format!("not a JSON document: {e}")))?;
	normalize(&raw)
}

/// Check the document's shape and produce a normalised payload.
///
/// Missing `community`, `weight` and `type` never fail; dangling edges do.
pub fn normalize(raw: &Value) -> Result<GraphPayload, ValidationError> {
	let elements = raw
		.get("elements")
		.and_then(Value::as_object)
		.ok_or_else(|| malformed("missing `elements` object"))?;
	let raw_nodes = elements
		.get("nodes")
		.and_then(Value::as_array)
		.ok_or_else(|| malformed("`elements.nodes` is not a sequence"))?;
	let raw_edges = elements
		.get("edges")
		.and_then(Value::as_array)
		.ok_or_else(|| malformed("`elements.edges` is not a sequence"))?;

	let mut ids = HashSet::with_capacity(raw_nodes.len());
	let mut nodes = Vec::with_capacity(raw_nodes.len());
	for (index, element) in raw_nodes.iter().enumerate() {
		let node = normalize_node(index, element)?;
		if !ids.insert(node.id.clone()) {
			return Err(malformed(&format!("duplicate node id `{}`", node.id)));
		}
		nodes.push(node);
	}

	let mut edges = Vec::with_capacity(raw_edges.len());
	for (index, element) in raw_edges.iter().enumerate() {
		let edge = normalize_edge(index, element)?;
		for endpoint in [&edge.source, &edge.target] {
			if !ids.contains(endpoint) {
				return Err(ValidationError::DanglingEdge {
					index,
					from: edge.source.clone(),
					to: edge.target.clone(),
					missing: endpoint.clone(),
				});
			}
		}
		edges.push(edge);
	}

	Ok(GraphPayload {
		directed: raw.get("directed").and_then(Value::as_bool).unwrap_or(false),
		multigraph: raw.get("multigraph").and_then(Value::as_bool).unwrap_or(false),
		nodes,
		edges,
	})
}

fn normalize_node(index: usize, element: &Value) -> Result<NodeAttrs, ValidationError> {
	let data = element_data(element).ok_or_else(|| malformed(&format!("node #{index} has no `data` object")))?;
	let id = text(data.get("id")).ok_or_else(|| malformed(&format!("node #{index} has no id")))?;

	let username = text(data.get("username")).unwrap_or_else(|| id.clone());
	let label = text(data.get("label")).unwrap_or_else(|| username.clone());
	let name = text(data.get("name")).unwrap_or_default();
	let centrality = number(data.get("in_degree_centrality"))
		.filter(|v| v.is_finite())
		.unwrap_or(0.0);
	let tweets = data.get("tweets").filter(|v| !v.is_null()).cloned();
	let extra = data
		.iter()
		.filter(|(k, _)| !NODE_KEYS.contains(&k.as_str()))
		.map(|(k, v)| (k.clone(), v.clone()))
		.collect();

	Ok(NodeAttrs {
		community: community(data.get("community")),
		in_degree_centrality: centrality,
		id,
		label,
		username,
		name,
		tweets,
		extra,
	})
}

fn normalize_edge(index: usize, element: &Value) -> Result<EdgeAttrs, ValidationError> {
	let data = element_data(element).ok_or_else(|| malformed(&format!("edge #{index} has no `data` object")))?;
	let source = text(data.get("source"))
		.ok_or_else(|| malformed(&format!("edge #{index} has no source")))?;
	let target = text(data.get("target"))
		.ok_or_else(|| malformed(&format!("edge #{index} has no target")))?;

	let kind = data
		.get("type")
		.and_then(Value::as_str)
		.map(InteractionKind::parse)
		.unwrap_or_default();
	let weight = number(data.get("weight"))
		.filter(|w| w.is_finite() && *w > 0.0)
		.unwrap_or(1.0);

	Ok(EdgeAttrs {
		source,
		target,
		kind,
		weight,
	})
}

fn element_data(element: &Value) -> Option<&Map<String, Value>> {
	element.get("data").and_then(Value::as_object)
}

fn malformed(reason: &str) -> ValidationError {
	ValidationError::MalformedPayload(reason.to_string())
}

fn text(value: Option<&Value>) -> Option<String> {
	match value? {
		Value::String(s) if !s.is_empty() => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

fn number(value: Option<&Value>) -> Option<f64> {
	match value? {
		Value::Number(n) => n.as_f64(),
		Value::String(s) => s.trim().parse().ok(),
		_ => None,
	}
}

fn community(value: Option<&Value>) -> Community {
	let exact = match value {
		Some(Value::Number(n)) => n.as_u64(),
		Some(Value::String(s)) => s.trim().parse::<u64>().ok(),
		_ => None,
	};
	let integral = || {
		number(value)
			.filter(|c| *c >= 0.0 && c.fract() == 0.0 && *c < u64::MAX as f64)
			.map(|c| c as u64)
	};
	match exact.or_else(integral) {
		Some(c) => Community::Assigned(c),
		None => Community::Uncategorized,
	}
}
