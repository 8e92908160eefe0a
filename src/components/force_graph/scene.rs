//! Ownership of the single live scene.
//!
//! At most one [`SceneHandle`] exists per manager. Building over a live
//! handle is refused; the previous scene must be destroyed first, which drops
//! its tap listeners and runs every release hook attached to it (animation
//! frame, window listeners).

use std::sync::Arc;

use log::{debug, info, warn};

use super::state::{ForceGraphState, Tap};
use crate::config::LayoutConfig;
use crate::error::SceneError;
use crate::graph::{CommunityColoring, NodeAttrs, VisualScene};

/// Receives the tapped node's attributes.
pub type NodeTapListener = Box<dyn FnMut(&NodeAttrs)>;
pub type BackgroundTapListener = Box<dyn FnMut()>;

pub struct SceneListeners {
	pub on_node_tap: NodeTapListener,
	pub on_background_tap: BackgroundTapListener,
}

pub struct SceneHandle {
	id: u64,
	scene: Arc<VisualScene>,
	state: ForceGraphState,
	listeners: Option<SceneListeners>,
	releases: Vec<Box<dyn FnOnce()>>,
}

impl SceneHandle {
	fn route(&mut self, tap: Tap) {
		let Some(listeners) = self.listeners.as_mut() else {
			return;
		};
		match tap {
			Tap::Node(idx) => {
				let attrs = self
					.state
					.scene_index(idx)
					.and_then(|i| self.scene.nodes.get(i))
					.map(|node| &node.attrs);
				if let Some(attrs) = attrs {
					(listeners.on_node_tap)(attrs);
				}
			}
			Tap::Background => (listeners.on_background_tap)(),
		}
	}

	fn release(mut self) {
		self.listeners = None;
		for release in self.releases.drain(..) {
			release();
		}
		debug!("scene #{} released", self.id);
	}
}

pub struct SceneManager {
	layout: LayoutConfig,
	live: Option<SceneHandle>,
	next_id: u64,
}

impl SceneManager {
	pub fn new(layout: LayoutConfig) -> Self {
		Self {
			layout,
			live: None,
			next_id: 1,
		}
	}

	/// Lay out `scene` and make it the live scene, registering its two tap listeners.
	pub fn build(
		&mut self,
		scene: Arc<VisualScene>,
		coloring: CommunityColoring,
		viewport: (f64, f64),
		listeners: SceneListeners,
	) -> Result<u64, SceneError> {
		if let Some(live) = &self.live {
			warn!("refusing to build over live scene #{}", live.id);
			return Err(SceneError::AlreadyLive(live.id));
		}

		let (width, height) = viewport;
		let state = ForceGraphState::new(&scene, coloring, &self.layout, width, height);
		let id = self.next_id;
		self.next_id += 1;
		info!(
			"scene #{} built: {} nodes, {} edges",
			id,
			scene.nodes.len(),
			scene.edges.len()
		);
		self.live = Some(SceneHandle {
			id,
			scene,
			state,
			listeners: Some(listeners),
			releases: Vec::new(),
		});
		Ok(id)
	}

	/// Release the live scene. Safe to call when nothing is live.
	pub fn destroy(&mut self) -> bool {
		match self.live.take() {
			Some(handle) => {
				handle.release();
				true
			}
			None => false,
		}
	}

	/// Tie a release hook to the live scene. Without a live scene the hook runs at once.
	pub fn attach_release(&mut self, release: impl FnOnce() + 'static) {
		match self.live.as_mut() {
			Some(handle) => handle.releases.push(Box::new(release)),
			None => release(),
		}
	}

	pub fn is_live(&self) -> bool {
		self.live.is_some()
	}

	pub fn live_id(&self) -> Option<u64> {
		self.live.as_ref().map(|h| h.id)
	}

	/// Number of tap listeners currently registered.
	pub fn listener_count(&self) -> usize {
		match self.live.as_ref().and_then(|h| h.listeners.as_ref()) {
			Some(_) => 2,
			None => 0,
		}
	}

	pub fn scene(&self) -> Option<&VisualScene> {
		self.live.as_ref().map(|h| h.scene.as_ref())
	}

	pub fn state(&self) -> Option<&ForceGraphState> {
		self.live.as_ref().map(|h| &h.state)
	}

	pub fn state_mut(&mut self) -> Option<&mut ForceGraphState> {
		self.live.as_mut().map(|h| &mut h.state)
	}

	pub fn restyle(&mut self, coloring: CommunityColoring) {
		if let Some(state) = self.state_mut() {
			state.restyle(coloring);
		}
	}

	pub fn highlight(&mut self, id: Option<&str>) {
		if let Some(state) = self.state_mut() {
			state.set_highlight(id);
		}
	}

	pub fn pointer_down(&mut self, x: f64, y: f64) {
		if let Some(state) = self.state_mut() {
			state.pointer_down(x, y);
		}
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		if let Some(state) = self.state_mut() {
			state.pointer_move(x, y);
		}
	}

	/// End a press and route a resulting tap to the matching listener.
	pub fn pointer_up(&mut self) {
		let Some(handle) = self.live.as_mut() else {
			return;
		};
		if let Some(tap) = handle.state.pointer_up() {
			handle.route(tap);
		}
	}

	pub fn pointer_leave(&mut self) {
		if let Some(state) = self.state_mut() {
			state.pointer_leave();
		}
	}

	pub fn zoom(&mut self, x: f64, y: f64, delta_y: f64) {
		if let Some(state) = self.state_mut() {
			state.zoom(x, y, delta_y);
		}
	}
}

impl Drop for SceneManager {
	fn drop(&mut self) {
		self.destroy();
	}
}

#[cfg(test)]
mod tests {
	use std::cell::{Cell, RefCell};
	use std::rc::Rc;

	use super::*;
	use crate::config::EncodingConfig;
	use crate::graph::fixtures::three_user_payload;
	use crate::graph::payload::normalize;
	use crate::graph::encode;

	fn scene() -> Arc<VisualScene> {
		Arc::new(encode(
			&normalize(&three_user_payload()).unwrap(),
			&EncodingConfig::default(),
		))
	}

	fn manager() -> SceneManager {
		SceneManager::new(LayoutConfig {
			warmup_ticks: 10,
			..LayoutConfig::default()
		})
	}

	fn silent() -> SceneListeners {
		SceneListeners {
			on_node_tap: Box::new(|_: &NodeAttrs| {}),
			on_background_tap: Box::new(|| {}),
		}
	}

	#[test]
	fn build_registers_two_listeners_and_refuses_a_second_scene() {
		let mut scenes = manager();
		let first = scenes.build(scene(), CommunityColoring::default(), (800.0, 600.0), silent()).unwrap();
		assert_eq!(scenes.listener_count(), 2);

		let second = scenes.build(scene(), CommunityColoring::default(), (800.0, 600.0), silent());
		assert_eq!(second, Err(SceneError::AlreadyLive(first)));
		assert_eq!(scenes.live_id(), Some(first));
	}

	#[test]
	fn destroy_is_idempotent() {
		let released = Rc::new(Cell::new(0));
		let mut scenes = manager();
		scenes.build(scene(), CommunityColoring::default(), (800.0, 600.0), silent()).unwrap();
		let counter = released.clone();
		scenes.attach_release(move || counter.set(counter.get() + 1));

		assert!(scenes.destroy());
		assert!(!scenes.destroy());
		assert!(!scenes.is_live());
		assert_eq!(scenes.listener_count(), 0);
		assert_eq!(released.get(), 1);

		assert!(scenes.build(scene(), CommunityColoring::default(), (800.0, 600.0), silent()).is_ok());
	}

	#[test]
	fn release_hooks_without_a_scene_run_immediately() {
		let released = Rc::new(Cell::new(false));
		let flag = released.clone();
		manager().attach_release(move || flag.set(true));
		assert!(released.get());
	}

	#[test]
	fn taps_reach_the_registered_listeners() {
		let tapped = Rc::new(RefCell::new(Vec::<String>::new()));
		let (nodes, background) = (tapped.clone(), tapped.clone());
		let mut scenes = manager();
		scenes
			.build(
				scene(),
				CommunityColoring::default(),
				(800.0, 600.0),
				SceneListeners {
					on_node_tap: Box::new(move |attrs: &NodeAttrs| nodes.borrow_mut().push(attrs.username.clone())),
					on_background_tap: Box::new(move || background.borrow_mut().push("<background>".into())),
				},
			)
			.unwrap();

		let state = scenes.state().unwrap();
		let (x, y) = state.node_position("B").unwrap();
		let (sx, sy) = state.graph_to_screen(x, y);
		scenes.pointer_down(sx, sy);
		scenes.pointer_up();
		scenes.pointer_down(-1000.0, -1000.0);
		scenes.pointer_up();

		assert_eq!(*tapped.borrow(), vec!["bob".to_string(), "<background>".to_string()]);

		scenes.destroy();
		scenes.pointer_down(sx, sy);
		scenes.pointer_up();
		assert_eq!(tapped.borrow().len(), 2);
	}

	#[test]
	fn self_interactions_build_with_the_default_layout() {
		let payload = normalize(&serde_json::json!({
			"directed": true,
			"elements": {
				"nodes": [ { "data": { "id": "A" } }, { "data": { "id": "B" } } ],
				"edges": [
					{ "data": { "source": "A", "target": "A", "type": "mentions" } },
					{ "data": { "source": "A", "target": "B", "type": "reply" } }
				]
			}
		}))
		.unwrap();
		let mut scenes = SceneManager::new(LayoutConfig::default());
		let built = scenes.build(
			Arc::new(encode(&payload, &EncodingConfig::default())),
			CommunityColoring::default(),
			(800.0, 600.0),
			silent(),
		);

		assert!(built.is_ok());
		assert_eq!(scenes.state().unwrap().edges().len(), 2);
	}

	#[test]
	fn destroy_frees_hooks_that_hold_the_manager() {
		let scenes = Rc::new(RefCell::new(manager()));
		scenes
			.borrow_mut()
			.build(scene(), CommunityColoring::default(), (800.0, 600.0), silent())
			.unwrap();
		let held = scenes.clone();
		scenes.borrow_mut().attach_release(move || drop(held));
		assert_eq!(Rc::strong_count(&scenes), 2);

		assert!(scenes.borrow_mut().destroy());
		assert_eq!(Rc::strong_count(&scenes), 1);
	}

	#[test]
	fn dropping_the_manager_releases_the_scene() {
		let released = Rc::new(Cell::new(false));
		let flag = released.clone();
		{
			let mut scenes = manager();
			scenes.build(scene(), CommunityColoring::default(), (800.0, 600.0), silent()).unwrap();
			scenes.attach_release(move || flag.set(true));
		}
		assert!(released.get());
	}
}
