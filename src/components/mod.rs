pub mod force_graph;
pub mod inspector;
pub mod legend;
