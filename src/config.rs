//! Configuration for the timeline dashboard.

use crate::core::simulator::Slider;
use crate::core::timeline::{TimelineOptions, Viewport};
use crate::core::transition::Transition;
use crate::data::loader::DEFAULT_DATA_FILE;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Main configuration for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// CSV export to load
    pub data_path: PathBuf,

    /// Directory rendered charts are written to
    pub output_path: PathBuf,

    /// Canvas size, margins and axis settings
    pub chart: ChartConfig,

    /// Zoom limits and reset animation
    pub zoom: ZoomConfig,

    /// Slider range and redraw animation
    pub simulator: SimulatorConfig,

    /// Animation frame interval
    #[serde(with = "duration_serde")]
    pub frame_interval: Duration,

    /// IANA time zone for tooltip and tick labels
    pub timezone: String,

    /// Port for `serve`
    pub server_port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_FILE),
            output_path: PathBuf::from("."),
            chart: ChartConfig::default(),
            zoom: ZoomConfig::default(),
            simulator: SimulatorConfig::default(),
            frame_interval: Duration::from_millis(16),
            timezone: "UTC".to_string(),
            server_port: 8080,
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &std::path::Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the ranges a hand-edited file can get wrong.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ZoomConfig {
            min_scale,
            max_scale,
            ..
        } = self.zoom;
        if !(min_scale.is_finite() && max_scale.is_finite()) || min_scale <= 0.0 || min_scale > max_scale {
            return Err(ConfigError::Invalid(format!(
                "zoom scale extent [{min_scale}, {max_scale}] must be finite, positive and ordered"
            )));
        }

        let Slider { min, max, step } = self.simulator.slider;
        if !(min.is_finite() && max.is_finite() && step.is_finite()) || min > max || step < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "slider range [{min}, {max}] step {step} must be finite and ordered"
            )));
        }

        Ok(())
    }

    /// Save configuration to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::config_path())
    }

    /// Save configuration to a specific file.
    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ConfigError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get the path to the configuration file.
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("physio-timeline")
            .join("config.json")
    }

    /// Parsed time zone, UTC when the name is unknown.
    pub fn tz(&self) -> Tz {
        self.timezone.parse::<Tz>().unwrap_or_else(|_| {
            tracing::warn!(timezone = %self.timezone, "unknown time zone, using UTC");
            Tz::UTC
        })
    }

    pub fn timeline_options(&self) -> TimelineOptions {
        TimelineOptions {
            scale_extent: [self.zoom.min_scale, self.zoom.max_scale],
            reset: Transition::new(self.zoom.reset_duration, self.frame_interval),
            x_ticks: self.chart.x_ticks,
            y_ticks: self.chart.y_ticks,
            marker_radius: self.chart.marker_radius,
        }
    }

    pub fn simulator_transition(&self) -> Transition {
        Transition::new(self.simulator.transition_duration, self.frame_interval)
    }
}

/// Chart margins in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 50.0,
            right: 50.0,
            bottom: 50.0,
            left: 80.0,
        }
    }
}

/// Canvas layout shared by both charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub x_ticks: usize,
    pub y_ticks: usize,
    pub marker_radius: f64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 500.0,
            margin: Margin::default(),
            x_ticks: 10,
            y_ticks: 6,
            marker_radius: 4.0,
        }
    }
}

impl ChartConfig {
    /// Plotting area inside the margins.
    pub fn viewport(&self) -> Viewport {
        Viewport::new(
            (self.width - self.margin.left - self.margin.right).max(0.0),
            (self.height - self.margin.top - self.margin.bottom).max(0.0),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomConfig {
    pub min_scale: f64,
    pub max_scale: f64,
    #[serde(with = "duration_serde")]
    pub reset_duration: Duration,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min_scale: 1.0,
            max_scale: 10.0,
            reset_duration: Duration::from_millis(750),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorConfig {
    pub slider: Slider,
    #[serde(with = "duration_serde")]
    pub transition_duration: Duration,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            slider: Slider::default(),
            transition_duration: Duration::from_millis(500),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Serde support for Duration, as whole milliseconds.
pub(crate) mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
