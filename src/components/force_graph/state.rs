use std::collections::{HashMap, HashSet};
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use crate::config::LayoutConfig;
use crate::graph::encode::FLAT_NODE_COLOR;
use crate::graph::{CommunityColoring, VisualScene};

/// Screen-space distance a press may travel and still count as a tap.
pub const TAP_TOLERANCE: f64 = 4.0;
/// Smallest world-space hit radius, so tiny nodes stay clickable.
pub const MIN_HIT_RADIUS: f64 = 6.0;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

const WARMUP_DT: f32 = 0.016;
const HIGHLIGHT_SPEED: f64 = 4.0;

#[derive(Clone, Debug, Default)]
pub struct NodeInfo {
	pub id: String,
	pub label: String,
	/// Position of the node in the scene's node list.
	pub scene_index: usize,
	pub radius: f64,
	pub community_color: String,
	pub fill: String,
}

#[derive(Clone, Debug)]
pub struct EdgeStyle {
	pub source: DefaultNodeIdx,
	pub target: DefaultNodeIdx,
	pub color: String,
	pub width: f64,
	pub opacity: f64,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_idx: Option<DefaultNodeIdx>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f32,
	pub node_start_y: f32,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// A pointer press that may still turn out to be a tap.
#[derive(Clone, Copy, Debug)]
struct Press {
	x: f64,
	y: f64,
	moved: bool,
}

/// Outcome of a press/release pair that did not move.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tap {
	Node(DefaultNodeIdx),
	Background,
}

/// Selected node and its neighbours, with a fade-out trail of the previous selection.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	pub node: Option<DefaultNodeIdx>,
	pub neighbors: HashSet<DefaultNodeIdx>,
	pub highlight_t: f64,
	pub prev_node: Option<DefaultNodeIdx>,
	pub prev_neighbors: HashSet<DefaultNodeIdx>,
}

pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub highlight: HighlightState,
	pub width: f64,
	pub height: f64,
	pub directed: bool,
	edges: Vec<EdgeStyle>,
	index_by_id: HashMap<String, DefaultNodeIdx>,
	press: Option<Press>,
	node_overlap: f64,
}

impl ForceGraphState {
	/// Seed the scene, run the warm-up layout pass and fit it into the viewport.
	pub fn new(
		scene: &VisualScene,
		coloring: CommunityColoring,
		layout: &LayoutConfig,
		width: f64,
		height: f64,
	) -> Self {
		let mut graph = ForceGraph::new(SimulationParameters {
			force_charge: layout.node_repulsion,
			force_spring: layout.edge_elasticity,
			force_max: layout.max_force,
			node_speed: layout.node_speed,
			damping_factor: layout.damping,
		});
		let mut index_by_id = HashMap::with_capacity(scene.nodes.len());
		let seeds = seed_positions(scene, layout.component_spacing);

		for (i, (node, &(x, y))) in scene.nodes.iter().zip(&seeds).enumerate() {
			let idx = graph.add_node(NodeData {
				x: x as f32,
				y: y as f32,
				mass: 10.0,
				is_anchor: false,
				user_data: NodeInfo {
					id: node.attrs.id.clone(),
					label: node.attrs.label.clone(),
					scene_index: i,
					radius: node.size / 2.0,
					community_color: node.community_color.clone(),
					fill: node.fill(coloring).to_string(),
				},
			});
			index_by_id.insert(node.attrs.id.clone(), idx);
		}

		let mut edges = Vec::with_capacity(scene.edges.len());
		for edge in &scene.edges {
			if let (Some(&src), Some(&tgt)) = (
				index_by_id.get(&edge.attrs.source),
				index_by_id.get(&edge.attrs.target),
			) {
				// the simulation cannot spring a node to itself; loops are only drawn
				if src != tgt {
					graph.add_edge(src, tgt, EdgeData::default());
				}
				edges.push(EdgeStyle {
					source: src,
					target: tgt,
					color: edge.edge_color.clone(),
					width: edge.width,
					opacity: edge.opacity,
				});
			}
		}

		let mut state = Self {
			graph,
			edges,
			index_by_id,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			highlight: HighlightState::default(),
			width,
			height,
			directed: scene.directed,
			press: None,
			node_overlap: layout.node_overlap,
		};
		for _ in 0..layout.warmup_ticks {
			state.step(WARMUP_DT);
		}
		state.fit(layout.fit_padding);
		state
	}

	pub fn edges(&self) -> &[EdgeStyle] {
		&self.edges
	}

	pub fn node_count(&self) -> usize {
		self.index_by_id.len()
	}

	pub fn node_index(&self, id: &str) -> Option<DefaultNodeIdx> {
		self.index_by_id.get(id).copied()
	}

	pub fn scene_index(&self, idx: DefaultNodeIdx) -> Option<usize> {
		let mut found = None;
		self.graph.visit_nodes(|node| {
			if node.index() == idx {
				found = Some(node.data.user_data.scene_index);
			}
		});
		found
	}

	/// World-space positions of every node.
	pub fn positions(&self) -> HashMap<DefaultNodeIdx, (f64, f64)> {
		let mut positions = HashMap::with_capacity(self.node_count());
		self.graph.visit_nodes(|node| {
			positions.insert(node.index(), (node.x() as f64, node.y() as f64));
		});
		positions
	}

	pub fn node_position(&self, id: &str) -> Option<(f64, f64)> {
		let idx = self.node_index(id)?;
		self.positions().get(&idx).copied()
	}

	/// Current fill of every node, keyed by node id.
	pub fn fills(&self) -> HashMap<String, String> {
		let mut fills = HashMap::with_capacity(self.node_count());
		self.graph.visit_nodes(|node| {
			fills.insert(node.data.user_data.id.clone(), node.data.user_data.fill.clone());
		});
		fills
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn graph_to_screen(&self, gx: f64, gy: f64) -> (f64, f64) {
		(
			gx * self.transform.k + self.transform.x,
			gy * self.transform.k + self.transform.y,
		)
	}

	/// Topmost node under a screen position.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<DefaultNodeIdx> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let mut found = None;
		self.graph.visit_nodes(|node| {
			let (dx, dy) = (node.x() as f64 - gx, node.y() as f64 - gy);
			let hit = node.data.user_data.radius.max(MIN_HIT_RADIUS);
			if (dx * dx + dy * dy).sqrt() < hit {
				found = Some(node.index());
			}
		});
		found
	}

	/// Swap node fills without touching positions or the simulation.
	pub fn restyle(&mut self, coloring: CommunityColoring) {
		self.graph.visit_nodes_mut(|node| {
			let info = &mut node.data.user_data;
			info.fill = match coloring {
				CommunityColoring::ByCommunity => info.community_color.clone(),
				CommunityColoring::Flat => FLAT_NODE_COLOR.to_string(),
			};
		});
	}

	/// Highlight a node and its direct neighbours, or fade out the current highlight.
	pub fn set_highlight(&mut self, id: Option<&str>) {
		let node = id.and_then(|id| self.node_index(id));
		if self.highlight.node == node {
			return;
		}
		let was_highlighting = self.highlight.node.is_some();

		if was_highlighting && node.is_none() {
			self.highlight.prev_node = self.highlight.node.take();
			self.highlight.prev_neighbors = std::mem::take(&mut self.highlight.neighbors);
		} else {
			self.highlight.prev_node = None;
			self.highlight.prev_neighbors.clear();
		}

		self.highlight.node = node;
		self.highlight.neighbors.clear();

		if let Some(idx) = node {
			for edge in &self.edges {
				if edge.source == idx {
					self.highlight.neighbors.insert(edge.target);
				} else if edge.target == idx {
					self.highlight.neighbors.insert(edge.source);
				}
			}
		}
	}

	pub fn is_highlighted(&self, idx: DefaultNodeIdx) -> bool {
		self.highlight.node == Some(idx)
			|| self.highlight.neighbors.contains(&idx)
			|| self.highlight.prev_node == Some(idx)
			|| self.highlight.prev_neighbors.contains(&idx)
	}

	pub fn is_selected(&self, idx: DefaultNodeIdx) -> bool {
		self.highlight.node == Some(idx) || self.highlight.prev_node == Some(idx)
	}

	pub fn has_active_highlight(&self) -> bool {
		self.highlight.node.is_some() || self.highlight.prev_node.is_some()
	}

	pub fn pointer_down(&mut self, x: f64, y: f64) {
		self.press = Some(Press { x, y, moved: false });
		if let Some(idx) = self.node_at_position(x, y) {
			self.drag.active = true;
			self.drag.node_idx = Some(idx);
			self.drag.start_x = x;
			self.drag.start_y = y;
			let (mut nx, mut ny) = (0.0, 0.0);
			self.graph.visit_nodes(|node| {
				if node.index() == idx {
					(nx, ny) = (node.x(), node.y());
				}
			});
			self.drag.node_start_x = nx;
			self.drag.node_start_y = ny;
		} else {
			self.pan.active = true;
			self.pan.start_x = x;
			self.pan.start_y = y;
			self.pan.transform_start_x = self.transform.x;
			self.pan.transform_start_y = self.transform.y;
		}
	}

	pub fn pointer_move(&mut self, x: f64, y: f64) {
		let Some(press) = self.press.as_mut() else {
			return;
		};
		if !press.moved && (x - press.x).hypot(y - press.y) > TAP_TOLERANCE {
			press.moved = true;
		}
		if !press.moved {
			return;
		}

		if self.drag.active {
			if let Some(idx) = self.drag.node_idx {
				let (dx, dy) = (
					(x - self.drag.start_x) / self.transform.k,
					(y - self.drag.start_y) / self.transform.k,
				);
				let (nx, ny) = (
					self.drag.node_start_x + dx as f32,
					self.drag.node_start_y + dy as f32,
				);
				// dragged nodes stay pinned where they are dropped
				self.graph.visit_nodes_mut(|node| {
					if node.index() == idx {
						node.data.x = nx;
						node.data.y = ny;
						node.data.is_anchor = true;
					}
				});
			}
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		}
	}

	/// End a press. Returns the tap it produced, if it never moved.
	pub fn pointer_up(&mut self) -> Option<Tap> {
		let tap = match self.press.take() {
			Some(press) if !press.moved => Some(match self.drag.node_idx {
				Some(idx) => Tap::Node(idx),
				None => Tap::Background,
			}),
			_ => None,
		};
		self.drag = DragState::default();
		self.pan.active = false;
		tap
	}

	pub fn pointer_leave(&mut self) {
		self.press = None;
		self.drag = DragState::default();
		self.pan.active = false;
	}

	/// Zoom around a screen position; positive `delta_y` zooms out.
	pub fn zoom(&mut self, x: f64, y: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(MIN_ZOOM, MAX_ZOOM);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Frame update: advance the simulation and ease the highlight.
	pub fn tick(&mut self, dt: f32) {
		self.step(dt);

		let target = if self.highlight.node.is_some() { 1.0 } else { 0.0 };
		self.highlight.highlight_t += (target - self.highlight.highlight_t) * HIGHLIGHT_SPEED * dt as f64;
		if self.highlight.node.is_none() && self.highlight.highlight_t < 0.01 {
			self.highlight.highlight_t = 0.0;
			self.highlight.prev_node = None;
			self.highlight.prev_neighbors.clear();
		}
	}

	fn step(&mut self, dt: f32) {
		self.graph.update(dt);
		self.separate_overlaps();
	}

	/// Push apart every pair of nodes closer than their radii plus `node_overlap`.
	pub(crate) fn separate_overlaps(&mut self) {
		let mut nodes = Vec::with_capacity(self.node_count());
		self.graph.visit_nodes(|node| {
			nodes.push((
				node.index(),
				node.x() as f64,
				node.y() as f64,
				node.data.user_data.radius,
			));
		});

		let mut shift: HashMap<DefaultNodeIdx, (f64, f64)> = HashMap::new();
		for i in 0..nodes.len() {
			for j in (i + 1)..nodes.len() {
				let ((a, ax, ay, ar), (b, bx, by, br)) = (nodes[i], nodes[j]);
				let (dx, dy) = (bx - ax, by - ay);
				let dist = (dx * dx + dy * dy).sqrt();
				let min = ar + br + self.node_overlap;
				if dist >= min {
					continue;
				}
				let (ux, uy) = if dist > 1e-6 {
					(dx / dist, dy / dist)
				} else {
					let angle = (i * 31 + j) as f64;
					(angle.cos(), angle.sin())
				};
				let push = (min - dist) / 2.0;
				let sa = shift.entry(a).or_default();
				sa.0 -= ux * push;
				sa.1 -= uy * push;
				let sb = shift.entry(b).or_default();
				sb.0 += ux * push;
				sb.1 += uy * push;
			}
		}
		if shift.is_empty() {
			return;
		}

		self.graph.visit_nodes_mut(|node| {
			if node.data.is_anchor {
				return;
			}
			if let Some(&(sx, sy)) = shift.get(&node.index()) {
				node.data.x += sx as f32;
				node.data.y += sy as f32;
			}
		});
	}

	/// Zoom and centre so every node fits inside the viewport.
	pub fn fit(&mut self, padding: f64) {
		let (mut min_x, mut min_y, mut max_x, mut max_y) =
			(f64::MAX, f64::MAX, f64::MIN, f64::MIN);
		self.graph.visit_nodes(|node| {
			let r = node.data.user_data.radius;
			let (x, y) = (node.x() as f64, node.y() as f64);
			min_x = min_x.min(x - r);
			min_y = min_y.min(y - r);
			max_x = max_x.max(x + r);
			max_y = max_y.max(y + r);
		});
		if min_x > max_x {
			return;
		}

		let (bw, bh) = ((max_x - min_x).max(1.0), (max_y - min_y).max(1.0));
		let (aw, ah) = (
			(self.width - 2.0 * padding).max(1.0),
			(self.height - 2.0 * padding).max(1.0),
		);
		let k = (aw / bw).min(ah / bh).clamp(MIN_ZOOM, MAX_ZOOM);
		let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

/// Initial positions: each connected component on its own ring, rings laid
/// out on a grid `component_spacing` apart.
pub fn seed_positions(scene: &VisualScene, component_spacing: f64) -> Vec<(f64, f64)> {
	let n = scene.nodes.len();
	let index: HashMap<&str, usize> = scene
		.nodes
		.iter()
		.enumerate()
		.map(|(i, node)| (node.attrs.id.as_str(), i))
		.collect();

	let mut parent: Vec<usize> = (0..n).collect();
	fn root(parent: &mut [usize], mut i: usize) -> usize {
		while parent[i] != i {
			parent[i] = parent[parent[i]];
			i = parent[i];
		}
		i
	}
	for edge in &scene.edges {
		if let (Some(&a), Some(&b)) = (
			index.get(edge.attrs.source.as_str()),
			index.get(edge.attrs.target.as_str()),
		) {
			let (ra, rb) = (root(&mut parent, a), root(&mut parent, b));
			if ra != rb {
				parent[rb] = ra;
			}
		}
	}

	// components in order of first appearance
	let mut members: Vec<Vec<usize>> = Vec::new();
	let mut slot: HashMap<usize, usize> = HashMap::new();
	for i in 0..n {
		let r = root(&mut parent, i);
		let c = *slot.entry(r).or_insert_with(|| {
			members.push(Vec::new());
			members.len() - 1
		});
		members[c].push(i);
	}

	let radius = |component: &[usize]| -> f64 {
		let widest = component
			.iter()
			.map(|&i| scene.nodes[i].size)
			.fold(0.0, f64::max);
		if component.len() < 2 {
			widest / 2.0
		} else {
			(component.len() as f64 * widest / (2.0 * PI)).max(widest)
		}
	};
	let cell = members.iter().map(|c| 2.0 * radius(c)).fold(0.0, f64::max) + component_spacing;
	let cols = (members.len() as f64).sqrt().ceil().max(1.0) as usize;
	let rows = members.len().div_ceil(cols);

	let mut positions = vec![(0.0, 0.0); n];
	for (c, component) in members.iter().enumerate() {
		let (col, row) = (c % cols, c / cols);
		let (cx, cy) = (
			(col as f64 - (cols as f64 - 1.0) / 2.0) * cell,
			(row as f64 - (rows as f64 - 1.0) / 2.0) * cell,
		);
		if component.len() == 1 {
			positions[component[0]] = (cx, cy);
			continue;
		}
		let r = radius(component);
		for (k, &i) in component.iter().enumerate() {
			let angle = (k as f64) * 2.0 * PI / component.len() as f64;
			positions[i] = (cx + r * angle.cos(), cy + r * angle.sin());
		}
	}
	positions
}
