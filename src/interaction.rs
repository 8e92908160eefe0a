//! Selection and inspection state driven by taps on the rendered scene.
//!
//! ```text
//! Idle --scene_built--> Empty --tap_node(n)--> Selected(n)
//! Selected(n) --tap_node(m)--> Selected(m)
//! Selected(n) --tap_background--> Empty
//! any --new_upload--> Idle
//! ```
//!
//! Community coloring is a preference carried alongside the selection; it
//! never changes the selection state.

use log::{debug, warn};

use crate::graph::tweets::{Tweet, parse_tweets};
use crate::graph::{CommunityColoring, NodeAttrs};

/// The user shown in the inspection panel.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedNode {
	pub id: String,
	pub username: String,
	pub name: String,
	/// Empty when the node's message data is absent or unreadable.
	pub tweets: Vec<Tweet>,
}

impl SelectedNode {
	fn from_attrs(attrs: &NodeAttrs) -> Self {
		let tweets = match parse_tweets(attrs.tweets.as_ref()) {
			Ok(tweets) => tweets,
			Err(err) => {
				warn!("messages for node {} unavailable: {}", attrs.id, err);
				Vec::new()
			}
		};
		Self {
			id: attrs.id.clone(),
			username: attrs.username.clone(),
			name: attrs.name.clone(),
			tweets,
		}
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum InteractionState {
	/// No scene is rendered.
	#[default]
	Idle,
	/// A scene is rendered and nothing is selected.
	Empty,
	Selected(SelectedNode),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct InteractionMachine {
	state: InteractionState,
	coloring: CommunityColoring,
}

impl InteractionMachine {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn state(&self) -> &InteractionState {
		&self.state
	}

	pub fn selection(&self) -> Option<&SelectedNode> {
		match &self.state {
			InteractionState::Selected(node) => Some(node),
			_ => None,
		}
	}

	pub fn selected_id(&self) -> Option<&str> {
		self.selection().map(|n| n.id.as_str())
	}

	pub fn coloring(&self) -> CommunityColoring {
		self.coloring
	}

	pub fn scene_active(&self) -> bool {
		!matches!(self.state, InteractionState::Idle)
	}

	/// A fresh scene always starts without a selection.
	pub fn scene_built(&mut self) {
		if self.scene_active() {
			warn!("scene built over an active scene; dropping stale selection");
		}
		self.state = InteractionState::Empty;
	}

	/// Select the tapped node, decoding its messages. Returns whether the
	/// selection changed.
	pub fn tap_node(&mut self, attrs: &NodeAttrs) -> bool {
		match &self.state {
			InteractionState::Idle => {
				debug!("tap on node {} ignored: no active scene", attrs.id);
				false
			}
			InteractionState::Selected(current) if current.id == attrs.id => false,
			_ => {
				debug!("selecting node {}", attrs.id);
				self.state = InteractionState::Selected(SelectedNode::from_attrs(attrs));
				true
			}
		}
	}

	pub fn tap_background(&mut self) {
		if let InteractionState::Selected(node) = &self.state {
			debug!("deselecting node {}", node.id);
			self.state = InteractionState::Empty;
		}
	}

	/// The scene is about to be torn down for a new upload.
	pub fn new_upload(&mut self) {
		self.state = InteractionState::Idle;
	}

	/// Flip community coloring. Returns the coloring to restyle the live
	/// scene with, or `None` when no scene is rendered.
	pub fn toggle_community(&mut self) -> Option<CommunityColoring> {
		self.coloring = self.coloring.toggled();
		self.scene_active().then_some(self.coloring)
	}
}

#[cfg(test)]
mod tests {
	use pretty_assertions::assert_eq;

	use super::*;
	use crate::graph::fixtures::three_user_payload;
	use crate::graph::payload::normalize;

	fn nodes() -> Vec<NodeAttrs> {
		normalize(&three_user_payload()).unwrap().nodes
	}

	fn active() -> InteractionMachine {
		let mut machine = InteractionMachine::new();
		machine.scene_built();
		machine
	}

	#[test]
	fn tapping_a_node_then_the_background() {
		let nodes = nodes();
		let mut machine = active();
		assert_eq!(machine.state(), &InteractionState::Empty);

		assert!(machine.tap_node(&nodes[1]));
		let selected = machine.selection().unwrap();
		assert_eq!(selected.username, "bob");
		assert_eq!(selected.name, "Bob");
		assert_eq!(selected.tweets.len(), 1);
		assert_eq!(selected.tweets[0].text, "first");
		assert_eq!(selected.tweets[0].metrics.like_count, 2);

		machine.tap_background();
		assert_eq!(machine.state(), &InteractionState::Empty);
	}

	#[test]
	fn tapping_another_node_replaces_the_selection() {
		let nodes = nodes();
		let mut machine = active();
		machine.tap_node(&nodes[0]);
		assert!(machine.tap_node(&nodes[2]));
		assert_eq!(machine.selected_id(), Some("C"));
		assert!(!machine.tap_node(&nodes[2]));
	}

	#[test]
	fn missing_or_broken_messages_degrade_to_an_empty_list() {
		let mut nodes = nodes();
		nodes[2].tweets = Some(serde_json::json!("{not json"));
		let mut machine = active();

		machine.tap_node(&nodes[0]);
		assert!(machine.selection().unwrap().tweets.is_empty());
		machine.tap_node(&nodes[2]);
		assert!(machine.selection().unwrap().tweets.is_empty());
	}

	#[test]
	fn taps_without_a_scene_are_ignored() {
		let nodes = nodes();
		let mut machine = InteractionMachine::new();
		assert!(!machine.tap_node(&nodes[0]));
		machine.tap_background();
		assert_eq!(machine.state(), &InteractionState::Idle);
	}

	#[test]
	fn new_upload_returns_to_idle_from_any_state() {
		let nodes = nodes();
		let mut machine = active();
		machine.tap_node(&nodes[1]);
		machine.new_upload();
		assert_eq!(machine.state(), &InteractionState::Idle);

		machine.scene_built();
		assert_eq!(machine.state(), &InteractionState::Empty);
	}

	#[test]
	fn toggling_keeps_the_selection() {
		let nodes = nodes();
		let mut machine = active();
		machine.tap_node(&nodes[1]);

		assert_eq!(machine.toggle_community(), Some(CommunityColoring::Flat));
		assert_eq!(machine.selected_id(), Some("B"));
		assert_eq!(machine.toggle_community(), Some(CommunityColoring::ByCommunity));
		assert_eq!(machine.selected_id(), Some("B"));
	}

	#[test]
	fn toggling_while_idle_only_flips_the_preference() {
		let mut machine = InteractionMachine::new();
		assert_eq!(machine.toggle_community(), None);
		assert_eq!(machine.coloring(), CommunityColoring::Flat);
		machine.scene_built();
		assert_eq!(machine.coloring(), CommunityColoring::Flat);
	}
}
