//! Dashboard assembly.
//!
//! Both views are built from the same readings, and only after the load has
//! completed. [`LoadState`] makes that transition explicit: handlers can only
//! reach a view through [`LoadState::Ready`].

use crate::config::{ChartConfig, Config};
use crate::core::simulator::{SimulatorAnimation, SimulatorView};
use crate::core::timeline::{value_extent, TimelineView};
use crate::data::loader::{load_csv, parse_csv, LoadError};
use crate::data::types::Reading;
use crate::render::{render_svg, simulator_scene, timeline_scene, Scene};
use chrono_tz::Tz;
use std::path::Path;

/// Progress of the one-time data load.
#[derive(Debug)]
pub enum LoadState {
    Loading,
    Ready(Box<Dashboard>),
    Failed(LoadError),
}

impl LoadState {
    /// Finish loading with the result of a read/parse.
    pub fn complete(result: Result<Vec<Reading>, LoadError>, config: &Config) -> Self {
        match result {
            Ok(readings) => Self::Ready(Box::new(Dashboard::from_readings(readings, config))),
            Err(e) => {
                tracing::error!(error = %e, "failed to load readings");
                Self::Failed(e)
            }
        }
    }

    pub fn dashboard(&self) -> Option<&Dashboard> {
        match self {
            Self::Ready(d) => Some(d.as_ref()),
            _ => None,
        }
    }

    pub fn dashboard_mut(&mut self) -> Option<&mut Dashboard> {
        match self {
            Self::Ready(d) => Some(d.as_mut()),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// The timeline explorer and the what-if simulator over one dataset.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub timeline: TimelineView,
    pub simulator: SimulatorView,
    chart: ChartConfig,
    tz: Tz,
}

impl Dashboard {
    pub fn from_readings(readings: Vec<Reading>, config: &Config) -> Self {
        let viewport = config.chart.viewport();
        let value_domain = value_extent(&readings).unwrap_or([0.0, 1.0]);
        let simulator = SimulatorView::new(
            value_domain,
            viewport,
            config.simulator.slider,
            config.simulator_transition(),
        );
        let timeline = TimelineView::with_options(readings, viewport, config.timeline_options());

        Self {
            timeline,
            simulator,
            chart: config.chart.clone(),
            tz: config.tz(),
        }
    }

    /// Load `config.data_path` and build the dashboard.
    pub fn load(config: &Config) -> Result<Self, LoadError> {
        Self::load_path(&config.data_path, config)
    }

    pub fn load_path(path: &Path, config: &Config) -> Result<Self, LoadError> {
        let readings = load_csv(path)?;
        Ok(Self::from_readings(readings, config))
    }

    /// Build from CSV bytes already in memory.
    pub fn from_csv_bytes(bytes: &[u8], config: &Config) -> Result<Self, LoadError> {
        let readings = parse_csv(bytes)?;
        Ok(Self::from_readings(readings, config))
    }

    /// Apply slider values to the simulator.
    pub fn simulate(&mut self, stress: f64, exercise: f64) -> SimulatorAnimation {
        self.simulator.on_input(stress, exercise)
    }

    pub fn timeline_scene(&self) -> Scene {
        timeline_scene(&self.timeline, &self.chart, self.tz)
    }

    pub fn simulator_scene(&self) -> Scene {
        simulator_scene(&self.simulator, &self.chart)
    }

    pub fn timeline_svg(&self) -> String {
        render_svg(&self.timeline_scene())
    }

    pub fn simulator_svg(&self) -> String {
        render_svg(&self.simulator_scene())
    }

    pub fn chart(&self) -> &ChartConfig {
        &self.chart
    }

    pub fn tz(&self) -> Tz {
        self.tz
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::brush::BrushSelection;
    use crate::core::timeline::DisplayMode;

    const CSV: &str = "\
timestamp,value_hr,value_eda,temp
0,60,0.4,33.0
1000,62,0.5,33.1
2000,58,0.6,33.2
";

    #[test]
    fn test_from_csv_bytes() {
        let dashboard = Dashboard::from_csv_bytes(CSV.as_bytes(), &Config::default()).unwrap();
        assert_eq!(dashboard.timeline.readings().len(), 3);
        assert_eq!(dashboard.timeline.value_scale().domain(), [0.4, 62.0]);
        assert_eq!(dashboard.simulator.y_scale().domain(), [0.4, 62.0]);
    }

    #[test]
    fn test_load_state_transitions() {
        let config = Config::default();
        let mut state = LoadState::Loading;
        assert!(state.is_loading());
        assert!(state.dashboard().is_none());

        state = LoadState::complete(parse_csv(CSV.as_bytes()), &config);
        let dashboard = state.dashboard_mut().unwrap();
        dashboard
            .timeline
            .on_brush_end(Some(BrushSelection::new(0.0, 10.0)));
        assert!(matches!(dashboard.timeline.mode(), DisplayMode::Brushed { .. }));
    }

    #[test]
    fn test_failed_load() {
        let state = LoadState::complete(parse_csv("timestamp\n0\n".as_bytes()), &Config::default());
        assert!(matches!(state, LoadState::Failed(LoadError::MissingColumn(_))));
        assert!(state.dashboard().is_none());
    }

    #[test]
    fn test_svg_output() {
        let mut dashboard = Dashboard::from_csv_bytes(CSV.as_bytes(), &Config::default()).unwrap();
        assert!(dashboard.timeline_svg().contains("id=\"timeline\""));
        dashboard.simulate(2.0, 4.0);
        assert!(dashboard.simulator_svg().contains("stress 2, exercise 4"));
    }

    #[test]
    fn test_empty_dataset_still_renders() {
        let dashboard = Dashboard::from_readings(Vec::new(), &Config::default());
        assert_eq!(dashboard.timeline.value_scale().domain(), [0.0, 1.0]);
        assert_eq!(dashboard.timeline_scene().marker_count(), 0);
    }
}
