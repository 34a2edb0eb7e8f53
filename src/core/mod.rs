//! Core functionality for the timeline explorer.
//!
//! This module contains:
//! - Scales mapping time and sensor values to pixels
//! - Zoom transforms and brush selections over the time axis
//! - Line path generation and eased transitions
//! - The timeline and simulator views

pub mod brush;
pub mod curve;
pub mod scale;
pub mod simulator;
pub mod timeline;
pub mod transition;
pub mod zoom;

// Re-export commonly used types
pub use brush::{BrushBehavior, BrushSelection, SelectionRange};
pub use scale::{LinearScale, TimeScale};
pub use simulator::{
    simulate, simulate_with, SimPoint, SimulatorAnimation, SimulatorView, Slider, SIM_POINTS,
};
pub use timeline::{
    DisplayMode, Marker, TimelineOptions, TimelineState, TimelineView, Tooltip, Viewport,
    ZoomAnimation,
};
pub use transition::Transition;
pub use zoom::{ZoomBehavior, ZoomTransform};
