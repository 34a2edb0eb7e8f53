//! Sensor data for the timeline.
//!
//! This module contains:
//! - Reading and channel types
//! - CSV loading
//! - Per-channel summary statistics

pub mod loader;
pub mod stats;
pub mod types;

// Re-export commonly used types
pub use loader::{load_csv, parse_csv, parse_timestamp, LoadError, DEFAULT_DATA_FILE};
pub use stats::{summarize, ChannelSummary, DatasetSummary};
pub use types::{Channel, Reading};
