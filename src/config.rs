//! Viewer configuration.
//!
//! Everything here is presentation tuning except the service endpoint, which
//! is the only value taken from the environment (at compile time, via
//! `GRAPH_SERVICE_URL`).

use serde::Deserialize;

/// Default community palette; index = `community mod len`.
pub const DEFAULT_PALETTE: [&str; 8] = [
	"#4C9BE8", "#E8724C", "#4CE87A", "#E8D94C", "#B44CE8", "#4CE8D9", "#E84C8B", "#A0A0A0",
];

const DEFAULT_SERVICE_URL: &str = "http://127.0.0.1:5000";
const PROCESS_PATH: &str = "/api/process";

#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct ViewerConfig {
	#[serde(default)]
	pub service: ServiceConfig,

	#[serde(default)]
	pub encoding: EncodingConfig,

	#[serde(default)]
	pub layout: LayoutConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServiceConfig {
	#[serde(default = "default_base_url")]
	pub base_url: String,
}

impl Default for ServiceConfig {
	fn default() -> Self {
		Self {
			base_url: default_base_url(),
		}
	}
}

impl ServiceConfig {
	/// Full URL of the graph-processing endpoint.
	pub fn process_url(&self) -> String {
		format!("{}{}", self.base_url.trim_end_matches('/'), PROCESS_PATH)
	}
}

fn default_base_url() -> String {
	option_env!("GRAPH_SERVICE_URL")
		.unwrap_or(DEFAULT_SERVICE_URL)
		.to_string()
}

/// Visual encoding ranges. Values outside a domain are clamped.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct EncodingConfig {
	#[serde(default = "default_palette")]
	pub palette: Vec<String>,

	/// Node diameter range for centrality 0..=1.
	#[serde(default = "default_node_size")]
	pub node_size: (f64, f64),

	/// Expected edge weight domain.
	#[serde(default = "default_weight_domain")]
	pub weight_domain: (f64, f64),

	/// Edge width range for `weight_domain`.
	#[serde(default = "default_edge_width")]
	pub edge_width: (f64, f64),

	#[serde(default = "default_edge_opacity")]
	pub edge_opacity: f64,
}

impl Default for EncodingConfig {
	fn default() -> Self {
		Self {
			palette: default_palette(),
			node_size: default_node_size(),
			weight_domain: default_weight_domain(),
			edge_width: default_edge_width(),
			edge_opacity: default_edge_opacity(),
		}
	}
}

fn default_palette() -> Vec<String> {
	DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect()
}

fn default_node_size() -> (f64, f64) {
	(15.0, 80.0)
}

fn default_weight_domain() -> (f64, f64) {
	(1.0, 10.0)
}

fn default_edge_width() -> (f64, f64) {
	(1.0, 6.0)
}

fn default_edge_opacity() -> f64 {
	0.7
}

/// Force-layout knobs. These are tuning constants handed to the simulation,
/// not derived values.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LayoutConfig {
	/// Charge between every node pair; larger pushes nodes further apart.
	#[serde(default = "default_node_repulsion")]
	pub node_repulsion: f32,

	#[serde(default = "default_edge_elasticity")]
	pub edge_elasticity: f32,

	#[serde(default = "default_max_force")]
	pub max_force: f32,

	#[serde(default = "default_node_speed")]
	pub node_speed: f32,

	#[serde(default = "default_damping")]
	pub damping: f32,

	/// Extra gap kept between the rims of two nodes after each tick.
	#[serde(default = "default_node_overlap")]
	pub node_overlap: f64,

	/// Distance between the seed rings of disconnected components.
	#[serde(default = "default_component_spacing")]
	pub component_spacing: f64,

	/// Simulation steps run synchronously when a scene is built.
	#[serde(default = "default_warmup_ticks")]
	pub warmup_ticks: u32,

	#[serde(default = "default_fit_padding")]
	pub fit_padding: f64,
}

impl Default for LayoutConfig {
	fn default() -> Self {
		Self {
			node_repulsion: default_node_repulsion(),
			edge_elasticity: default_edge_elasticity(),
			max_force: default_max_force(),
			node_speed: default_node_speed(),
			damping: default_damping(),
			node_overlap: default_node_overlap(),
			component_spacing: default_component_spacing(),
			warmup_ticks: default_warmup_ticks(),
			fit_padding: default_fit_padding(),
		}
	}
}

fn default_node_repulsion() -> f32 {
	400.0
}

fn default_edge_elasticity() -> f32 {
	0.05
}

fn default_max_force() -> f32 {
	100.0
}

fn default_node_speed() -> f32 {
	3000.0
}

fn default_damping() -> f32 {
	0.9
}

fn default_node_overlap() -> f64 {
	20.0
}

fn default_component_spacing() -> f64 {
	150.0
}

fn default_warmup_ticks() -> u32 {
	120
}

fn default_fit_padding() -> f64 {
	10.0
}
