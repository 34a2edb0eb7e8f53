//! Physio Timeline - interactive explorer for physiological sensor exports.
//!
//! This library plots heart rate, electrodermal activity and skin
//! temperature against time, and keeps a zoomable, brushable timeline
//! consistent as the user interacts. A small what-if simulator projects
//! the three channels from stress and exercise levels.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       Physio Timeline                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  ┌─────────────┐   ┌─────────────┐   ┌─────────────┐       │
//! │  │    Data     │──▶│  Timeline   │──▶│   Render    │       │
//! │  │   (CSV)     │   │ zoom/brush  │   │ scene / SVG │       │
//! │  └─────────────┘   └─────────────┘   └─────────────┘       │
//! │         │                 ▲                  ▲              │
//! │         ▼                 │                  │              │
//! │  ┌─────────────┐   ┌─────────────┐           │              │
//! │  │  Dashboard  │──▶│  Simulator  │───────────┘              │
//! │  │ (LoadState) │   │  (sliders)  │                          │
//! │  └─────────────┘   └─────────────┘                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use physio_timeline::{core::BrushSelection, Config, Dashboard};
//!
//! let config = Config::default();
//! let mut dashboard = Dashboard::load(&config).expect("failed to load data");
//!
//! // Brush the first 200 pixels of the time axis
//! dashboard
//!     .timeline
//!     .on_brush_end(Some(BrushSelection::new(0.0, 200.0)));
//! println!("{}", dashboard.timeline_svg());
//! ```

pub mod config;
pub mod core;
pub mod dashboard;
pub mod data;
pub mod render;

#[cfg(feature = "server")]
pub mod server;

// Re-export key types at crate root for convenience
pub use config::{ChartConfig, Config, ConfigError};
pub use core::{
    simulate, BrushSelection, DisplayMode, SimPoint, SimulatorView, TimelineView, Tooltip,
    ZoomTransform,
};
pub use dashboard::{Dashboard, LoadState};
pub use data::{load_csv, parse_csv, Channel, LoadError, Reading};
pub use render::{render_svg, Scene};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
