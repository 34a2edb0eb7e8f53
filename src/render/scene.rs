//! Renderer-neutral draw commands.
//!
//! Views are turned into a [`Scene`]: a canvas size, a plotting-area offset
//! and a flat list of commands in paint order. The SVG writer is one
//! consumer; the HTTP server also returns scenes as JSON.

use crate::config::{ChartConfig, Margin};
use crate::core::curve::polyline;
use crate::core::scale::{time_tick_label, value_tick_label};
use crate::core::simulator::SimulatorView;
use crate::core::timeline::TimelineView;
use crate::data::types::Channel;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

pub const TIMELINE_TITLE: &str = "Heart Rate, EDA & Temperature Over Time";
pub const SIMULATOR_TITLE: &str = "What-If Simulator";

const LINE_WIDTH: f64 = 2.0;
const MARKER_OPACITY: f64 = 0.8;
/// Length of axis tick marks in pixels.
pub const TICK_SIZE: f64 = 6.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisOrient {
    Bottom,
    Left,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tick {
    /// Offset along the axis in pixels
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub orient: AxisOrient,
    /// Translation of the axis group inside the plotting area
    pub offset: [f64; 2],
    /// Pixel extent of the domain line
    pub range: [f64; 2],
    pub ticks: Vec<Tick>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    Start,
    Middle,
    End,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DrawCommand {
    Axis(Axis),
    Line {
        channel: Channel,
        d: String,
        stroke: String,
        stroke_width: f64,
    },
    Marker {
        channel: Channel,
        index: usize,
        cx: f64,
        cy: f64,
        r: f64,
        fill: String,
        opacity: f64,
    },
    Text {
        x: f64,
        y: f64,
        text: String,
        anchor: TextAnchor,
        font_size: Option<f64>,
        /// Rotation in degrees around the origin
        rotate: Option<f64>,
    },
    /// Highlight of the active brush range
    Selection { x: f64, width: f64, height: f64 },
}

/// A fully laid out chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    /// Mount point the scene is drawn into
    pub mount: String,
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    /// Plotting area size inside the margins
    pub inner: [f64; 2],
    pub commands: Vec<DrawCommand>,
}

impl Scene {
    fn new(mount: &str, chart: &ChartConfig) -> Self {
        let viewport = chart.viewport();
        Self {
            mount: mount.to_string(),
            width: chart.width,
            height: chart.height,
            margin: chart.margin,
            inner: [viewport.width, viewport.height],
            commands: Vec::new(),
        }
    }

    pub fn lines(&self) -> impl Iterator<Item = (&Channel, &String)> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Line { channel, d, .. } => Some((channel, d)),
            _ => None,
        })
    }

    pub fn axes(&self) -> impl Iterator<Item = &Axis> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Axis(axis) => Some(axis),
            _ => None,
        })
    }

    pub fn marker_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Marker { .. }))
            .count()
    }

    fn push_labels(&mut self, title: &str, x_label: &str, y_label: &str) {
        let [w, h] = self.inner;
        self.commands.push(DrawCommand::Text {
            x: w / 2.0,
            y: -10.0,
            text: title.to_string(),
            anchor: TextAnchor::Middle,
            font_size: Some(16.0),
            rotate: None,
        });
        self.commands.push(DrawCommand::Text {
            x: w / 2.0,
            y: h + 40.0,
            text: x_label.to_string(),
            anchor: TextAnchor::Middle,
            font_size: None,
            rotate: None,
        });
        self.commands.push(DrawCommand::Text {
            x: -h / 2.0,
            y: -50.0,
            text: y_label.to_string(),
            anchor: TextAnchor::Middle,
            font_size: None,
            rotate: Some(-90.0),
        });
    }
}

/// Lay out the timeline: axes, brush highlight, the three lines, markers
/// and labels.
pub fn timeline_scene(view: &TimelineView, chart: &ChartConfig, tz: Tz) -> Scene {
    let mut scene = Scene::new("timeline", chart);
    let [_, h] = scene.inner;
    let options = view.options();

    let x = view.time_scale();
    scene.commands.push(DrawCommand::Axis(Axis {
        orient: AxisOrient::Bottom,
        offset: [0.0, h],
        range: x.range(),
        ticks: x
            .ticks(options.x_ticks)
            .into_iter()
            .map(|t| Tick {
                position: x.apply(t),
                label: time_tick_label(t, tz),
            })
            .collect(),
    }));

    let y = view.value_scale();
    scene.commands.push(DrawCommand::Axis(Axis {
        orient: AxisOrient::Left,
        offset: [0.0, 0.0],
        range: y.range(),
        ticks: y
            .ticks(options.y_ticks)
            .into_iter()
            .map(|v| Tick {
                position: y.apply(v),
                label: value_tick_label(v),
            })
            .collect(),
    }));

    if let Some(range) = view.selection() {
        let base = view.base_time_scale();
        let (x0, x1) = (base.apply(range.start), base.apply(range.end));
        if x1 >= x0 {
            scene.commands.push(DrawCommand::Selection {
                x: x0,
                width: x1 - x0,
                height: h,
            });
        }
    }

    for marker in view.markers() {
        scene.commands.push(DrawCommand::Marker {
            channel: marker.channel,
            index: marker.index,
            cx: marker.cx,
            cy: marker.cy,
            r: options.marker_radius,
            fill: marker.channel.color().to_string(),
            opacity: MARKER_OPACITY,
        });
    }

    for channel in Channel::ALL {
        scene.commands.push(DrawCommand::Line {
            channel,
            d: view.line_path(channel),
            stroke: channel.color().to_string(),
            stroke_width: LINE_WIDTH,
        });
    }

    scene.push_labels(TIMELINE_TITLE, "Time", "Sensor Readings");
    scene
}

/// Lay out the simulator chart.
pub fn simulator_scene(view: &SimulatorView, chart: &ChartConfig) -> Scene {
    let mut scene = Scene::new("simulator-chart", chart);
    let [_, h] = scene.inner;

    let x = view.x_scale();
    scene.commands.push(DrawCommand::Axis(Axis {
        orient: AxisOrient::Bottom,
        offset: [0.0, h],
        range: x.range(),
        ticks: x
            .ticks(chart.x_ticks)
            .into_iter()
            .map(|v| Tick {
                position: x.apply(v),
                label: value_tick_label(v),
            })
            .collect(),
    }));

    let y = view.y_scale();
    scene.commands.push(DrawCommand::Axis(Axis {
        orient: AxisOrient::Left,
        offset: [0.0, 0.0],
        range: y.range(),
        ticks: y
            .ticks(10)
            .into_iter()
            .map(|v| Tick {
                position: y.apply(v),
                label: value_tick_label(v),
            })
            .collect(),
    }));

    for channel in Channel::ALL {
        scene.commands.push(DrawCommand::Line {
            channel,
            d: view.line_path(channel),
            stroke: channel.color().to_string(),
            stroke_width: LINE_WIDTH,
        });
    }

    let (stress, exercise) = view.labels();
    let subtitle = if stress.is_empty() {
        SIMULATOR_TITLE.to_string()
    } else {
        format!("{SIMULATOR_TITLE} (stress {stress}, exercise {exercise})")
    };
    scene.push_labels(&subtitle, "Stress Level", "Predicted Readings");
    scene
}

/// Path data of an axis domain line with outer ticks, as d3 draws it.
pub fn axis_domain_path(axis: &Axis) -> String {
    let [r0, r1] = axis.range;
    match axis.orient {
        AxisOrient::Bottom => polyline(&[
            [r0, TICK_SIZE],
            [r0, 0.0],
            [r1, 0.0],
            [r1, TICK_SIZE],
        ]),
        AxisOrient::Left => polyline(&[
            [-TICK_SIZE, r0],
            [0.0, r0],
            [0.0, r1],
            [-TICK_SIZE, r1],
        ]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::brush::BrushSelection;
    use crate::core::scale::instant_from_secs;
    use crate::core::simulator::Slider;
    use crate::core::transition::Transition;
    use crate::data::types::Reading;
    use std::time::Duration;

    fn timeline() -> TimelineView {
        let readings = (0..5)
            .map(|i| Reading::new(instant_from_secs(i * 60), 60.0 + i as f64, 0.5, 36.0))
            .collect();
        TimelineView::initialize(readings, ChartConfig::default().viewport())
    }

    #[test]
    fn test_timeline_scene_contents() {
        let scene = timeline_scene(&timeline(), &ChartConfig::default(), chrono_tz::UTC);
        assert_eq!(scene.mount, "timeline");
        assert_eq!(scene.inner, [770.0, 400.0]);
        assert_eq!(scene.lines().count(), 3);
        assert_eq!(scene.axes().count(), 2);
        assert_eq!(scene.marker_count(), 15);
        assert!(scene.commands.iter().any(|c| matches!(
            c,
            DrawCommand::Text { text, .. } if text == TIMELINE_TITLE
        )));
    }

    #[test]
    fn test_brushed_scene_has_selection() {
        let mut view = timeline();
        view.on_brush_end(Some(BrushSelection::new(100.0, 400.0)));
        let scene = timeline_scene(&view, &ChartConfig::default(), chrono_tz::UTC);
        assert!(scene
            .commands
            .iter()
            .any(|c| matches!(c, DrawCommand::Selection { .. })));
    }

    #[test]
    fn test_time_axis_ticks_inside_range() {
        let scene = timeline_scene(&timeline(), &ChartConfig::default(), chrono_tz::UTC);
        let axis = scene.axes().next().unwrap();
        assert_eq!(axis.orient, AxisOrient::Bottom);
        assert!(!axis.ticks.is_empty());
        assert!(axis
            .ticks
            .iter()
            .all(|t| t.position >= 0.0 && t.position <= 770.0));
    }

    #[test]
    fn test_simulator_scene_labels() {
        let mut view = SimulatorView::new(
            [0.5, 90.0],
            ChartConfig::default().viewport(),
            Slider::default(),
            Transition::new(Duration::from_millis(500), Duration::from_millis(16)),
        );
        view.on_input(3.0, 7.0);
        let scene = simulator_scene(&view, &ChartConfig::default());
        assert_eq!(scene.mount, "simulator-chart");
        assert_eq!(scene.lines().count(), 3);
        assert!(scene.commands.iter().any(|c| matches!(
            c,
            DrawCommand::Text { text, .. } if text.contains("stress 3, exercise 7")
        )));
    }

    #[test]
    fn test_axis_domain_path() {
        let axis = Axis {
            orient: AxisOrient::Bottom,
            offset: [0.0, 400.0],
            range: [0.0, 770.0],
            ticks: Vec::new(),
        };
        assert_eq!(axis_domain_path(&axis), "M0,6L0,0L770,0L770,6");
    }
}
