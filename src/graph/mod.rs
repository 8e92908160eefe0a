//! Graph document handling: validation, message decoding and visual encoding.

pub mod encode;
pub mod payload;
pub mod scale;
pub mod tweets;

pub use encode::{CommunityColoring, VisualEdge, VisualNode, VisualScene, encode};
pub use payload::{Community, EdgeAttrs, GraphPayload, InteractionKind, NodeAttrs};

#[cfg(test)]
pub(crate) mod fixtures {
	use serde_json::{Value, json};

	/// Three users, two interactions: A -reply(4)-> B -retweet(1)-> C.
	pub fn three_user_payload() -> Value {
		json!({
			"directed": true,
			"multigraph": false,
			"elements": {
				"nodes": [
					{ "data": { "id": "A", "label": "alice", "username": "alice", "name": "Alice",
						"community": 0, "in_degree_centrality": 0.0 } },
					{ "data": { "id": "B", "label": "bob", "username": "bob", "name": "Bob",
						"community": 1, "in_degree_centrality": 0.5,
						"tweets": "[{\"id\":\"10\",\"text\":\"first\",\"created_at\":\"2024-03-01T10:00:00Z\",\"metrics\":{\"like_count\":2}}]" } },
					{ "data": { "id": "C", "label": "carol", "username": "carol", "name": "Carol",
						"community": 0, "in_degree_centrality": 0.5 } }
				],
				"edges": [
					{ "data": { "source": "A", "target": "B", "type": "reply", "weight": 4 } },
					{ "data": { "source": "B", "target": "C", "type": "retweet", "weight": 1 } }
				]
			}
		})
	}
}
