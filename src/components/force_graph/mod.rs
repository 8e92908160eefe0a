mod component;
mod render;
pub mod scene;
pub mod state;

pub use component::ForceGraphCanvas;
