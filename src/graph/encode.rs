//! Visual encodings derived from semantic graph attributes.
//!
//! Every mapping here is total: each community and each interaction type,
//! including unknown ones, resolves to a color.

use crate::config::{DEFAULT_PALETTE, EncodingConfig};

use super::payload::{Community, EdgeAttrs, GraphPayload, InteractionKind, NodeAttrs};
use super::scale::LinearScale;

pub const UNCATEGORIZED_COLOR: &str = "#A0A0A0";
/// Fill used for every node while community coloring is off.
pub const FLAT_NODE_COLOR: &str = "#A0A0A0";
pub const DEFAULT_EDGE_COLOR: &str = "#999999";

/// Whether nodes are filled by community or with one flat color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CommunityColoring {
	#[default]
	ByCommunity,
	Flat,
}

impl CommunityColoring {
	pub fn toggled(self) -> Self {
		match self {
			CommunityColoring::ByCommunity => CommunityColoring::Flat,
			CommunityColoring::Flat => CommunityColoring::ByCommunity,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct VisualNode {
	pub attrs: NodeAttrs,
	pub community_color: String,
	/// Diameter in world units.
	pub size: f64,
}

impl VisualNode {
	pub fn fill(&self, coloring: CommunityColoring) -> &str {
		match coloring {
			CommunityColoring::ByCommunity => &self.community_color,
			CommunityColoring::Flat => FLAT_NODE_COLOR,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct VisualEdge {
	pub attrs: EdgeAttrs,
	pub edge_color: String,
	pub width: f64,
	pub opacity: f64,
}

/// Encoded graph, in payload order.
#[derive(Clone, Debug, PartialEq)]
pub struct VisualScene {
	pub directed: bool,
	pub multigraph: bool,
	pub nodes: Vec<VisualNode>,
	pub edges: Vec<VisualEdge>,
}

impl VisualScene {
	pub fn node(&self, id: &str) -> Option<&VisualNode> {
		self.nodes.iter().find(|n| n.attrs.id == id)
	}
}

/// Palette color for a community: index is `community mod palette.len()`.
///
/// An empty palette falls back to the built-in one.
pub fn community_color(community: Community, palette: &[String]) -> &str {
	let Community::Assigned(c) = community else {
		return UNCATEGORIZED_COLOR;
	};
	if palette.is_empty() {
		return DEFAULT_PALETTE[(c % DEFAULT_PALETTE.len() as u64) as usize];
	}
	&palette[(c % palette.len() as u64) as usize]
}

pub fn edge_color(kind: &InteractionKind) -> &'static str {
	match kind {
		InteractionKind::Reply => "#4C9BE8",
		InteractionKind::Retweet => "#4CE87A",
		InteractionKind::Quote => "#E8724C",
		InteractionKind::Mentions => "#E8D94C",
		InteractionKind::Other(_) => DEFAULT_EDGE_COLOR,
	}
}

/// Legend rows for the known interaction types.
pub fn edge_legend() -> Vec<(String, &'static str)> {
	InteractionKind::KNOWN
		.iter()
		.map(|kind| (kind.as_str().to_string(), edge_color(kind)))
		.collect()
}

/// Derive visual fields for every node and edge.
pub fn encode(payload: &GraphPayload, config: &EncodingConfig) -> VisualScene {
	let size = LinearScale::new((0.0, 1.0), config.node_size);
	let width = LinearScale::new(config.weight_domain, config.edge_width);

	let nodes = payload
		.nodes
		.iter()
		.map(|attrs| VisualNode {
			community_color: community_color(attrs.community, &config.palette).to_string(),
			size: size.apply(attrs.in_degree_centrality),
			attrs: attrs.clone(),
		})
		.collect();

	let edges = payload
		.edges
		.iter()
		.map(|attrs| VisualEdge {
			edge_color: edge_color(&attrs.kind).to_string(),
			width: width.apply(attrs.weight),
			opacity: config.edge_opacity,
			attrs: attrs.clone(),
		})
		.collect();

	VisualScene {
		directed: payload.directed,
		multigraph: payload.multigraph,
		nodes,
		edges,
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::graph::fixtures::three_user_payload;
	use crate::graph::payload::normalize;

	fn palette() -> Vec<String> {
		EncodingConfig::default().palette
	}

	#[test]
	fn community_colors_cycle_through_the_palette() {
		let palette = palette();
		let k = palette.len() as u64;
		for c in (0..64).chain(u64::from(u32::MAX) - 8..u64::from(u32::MAX) + 8) {
			assert_eq!(
				community_color(Community::Assigned(c), &palette),
				community_color(Community::Assigned(c + k), &palette)
			);
		}
		assert_eq!(community_color(Community::Uncategorized, &palette), UNCATEGORIZED_COLOR);
		assert_eq!(community_color(Community::Assigned(9), &[]), DEFAULT_PALETTE[1]);
	}

	#[test]
	fn unknown_edge_types_get_the_default_color() {
		for raw in ["like", "other", "", "REPLY"] {
			assert_eq!(edge_color(&InteractionKind::parse(raw)), DEFAULT_EDGE_COLOR);
		}
		assert_eq!(edge_legend().len(), 4);
	}

	#[test]
	fn out_of_range_centrality_is_clamped() {
		let mut payload = normalize(&three_user_payload()).unwrap();
		payload.nodes[0].in_degree_centrality = -0.5;
		payload.nodes[1].in_degree_centrality = 7.0;
		let config = EncodingConfig::default();
		let scene = encode(&payload, &config);

		assert_eq!(scene.nodes[0].size, config.node_size.0);
		assert_eq!(scene.nodes[1].size, config.node_size.1);
	}

	#[test]
	fn three_user_scenario() {
		let payload = normalize(&three_user_payload()).unwrap();
		let scene = encode(&payload, &EncodingConfig::default());
		let color = |id: &str| scene.node(id).unwrap().community_color.clone();

		assert_eq!(color("A"), DEFAULT_PALETTE[0]);
		assert_eq!(color("C"), DEFAULT_PALETTE[0]);
		assert_eq!(color("B"), DEFAULT_PALETTE[1]);
		assert!(scene.edges[0].width > scene.edges[1].width);
		assert_eq!(scene.edges[0].edge_color, "#4C9BE8");
		assert_eq!(scene.edges[1].edge_color, "#4CE87A");
		assert_eq!(scene, encode(&payload, &EncodingConfig::default()));
	}

	#[test]
	fn flat_coloring_round_trips() {
		let payload = normalize(&three_user_payload()).unwrap();
		let scene = encode(&payload, &EncodingConfig::default());
		let coloring = CommunityColoring::default();
		let before: Vec<_> = scene.nodes.iter().map(|n| n.fill(coloring).to_string()).collect();

		let flat = coloring.toggled();
		assert!(scene.nodes.iter().all(|n| n.fill(flat) == FLAT_NODE_COLOR));

		let restored = flat.toggled();
		let after: Vec<_> = scene.nodes.iter().map(|n| n.fill(restored).to_string()).collect();
		assert_eq!(before, after);
	}
}
