//! Chart rendering.
//!
//! Views are laid out into a [`Scene`] of draw commands, which is then
//! serialized as SVG or sent over HTTP as JSON.

pub mod scene;
pub mod svg;

pub use scene::{
    axis_domain_path, simulator_scene, timeline_scene, Axis, AxisOrient, DrawCommand, Scene,
    TextAnchor, Tick, SIMULATOR_TITLE, TIMELINE_TITLE,
};
pub use svg::render_svg;
