//! What-if simulator.
//!
//! Two sliders (stress level and exercise intensity) drive fixed linear
//! formulas for heart rate, EDA and temperature. The chart shows eleven
//! points along a 0..10 stress axis.

use crate::core::curve::monotone_x;
use crate::core::scale::LinearScale;
use crate::core::timeline::Viewport;
use crate::core::transition::{lerp, Transition};
use crate::data::types::Channel;
use serde::{Deserialize, Serialize};

/// Number of points on the simulated curve.
pub const SIM_POINTS: usize = 11;

/// One synthetic point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimPoint {
    pub stress: u32,
    pub value_hr: f64,
    pub value_eda: f64,
    pub temp: f64,
}

impl SimPoint {
    pub fn value(&self, channel: Channel) -> f64 {
        match channel {
            Channel::HeartRate => self.value_hr,
            Channel::Eda => self.value_eda,
            Channel::Temperature => self.temp,
        }
    }

    fn lerp(&self, other: &SimPoint, u: f64) -> SimPoint {
        SimPoint {
            stress: other.stress,
            value_hr: lerp(self.value_hr, other.value_hr, u),
            value_eda: lerp(self.value_eda, other.value_eda, u),
            temp: lerp(self.temp, other.temp, u),
        }
    }
}

/// Predicted readings for the given slider values.
///
/// Every point carries the same prediction; only the stress coordinate
/// varies along the axis.
pub fn simulate(stress: f64, exercise: f64) -> Vec<SimPoint> {
    let value_hr = 60.0 + stress * 2.0 + exercise * 1.5;
    let value_eda = 0.5 + stress * 0.1 + exercise * 0.05;
    let temp = 36.0 + stress * 0.05 + exercise * 0.02;
    (0..SIM_POINTS as u32)
        .map(|i| SimPoint {
            stress: i,
            value_hr,
            value_eda,
            temp,
        })
        .collect()
}

/// Snap raw slider values through `slider`, then simulate.
pub fn simulate_with(slider: &Slider, stress: f64, exercise: f64) -> Vec<SimPoint> {
    simulate(slider.snap(stress), slider.snap(exercise))
}

/// Curve shown before any slider input: each point's values follow its own
/// stress coordinate.
pub fn baseline() -> Vec<SimPoint> {
    (0..SIM_POINTS as u32)
        .map(|i| {
            let s = f64::from(i);
            SimPoint {
                stress: i,
                value_hr: 60.0 + s * 2.0,
                value_eda: 0.5 + s * 0.1,
                temp: 36.0 + s * 0.05,
            }
        })
        .collect()
}

/// Range input configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Slider {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl Default for Slider {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 10.0,
            step: 1.0,
        }
    }
}

impl Slider {
    /// Snap to the step grid and clamp into range, like a range input does.
    pub fn snap(&self, value: f64) -> f64 {
        let (lo, hi) = (self.min.min(self.max), self.min.max(self.max));
        if !value.is_finite() {
            return lo;
        }
        let snapped = if self.step > 0.0 {
            lo + ((value - lo) / self.step).round() * self.step
        } else {
            value
        };
        snapped.max(lo).min(hi)
    }
}

/// Frames of a simulator redraw, played at `frame_interval`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatorAnimation {
    pub frames: Vec<Vec<SimPoint>>,
    #[serde(with = "crate::config::duration_serde")]
    pub frame_interval: std::time::Duration,
}

/// Simulator chart state.
#[derive(Debug, Clone)]
pub struct SimulatorView {
    x: LinearScale,
    y: LinearScale,
    stress_slider: Slider,
    exercise_slider: Slider,
    stress: Option<f64>,
    exercise: Option<f64>,
    points: Vec<SimPoint>,
    transition: Transition,
}

impl SimulatorView {
    /// `value_domain` is the dataset's cross-channel extent, shared with the
    /// timeline.
    pub fn new(value_domain: [f64; 2], viewport: Viewport, slider: Slider, transition: Transition) -> Self {
        Self {
            x: LinearScale::new([0.0, 10.0], [0.0, viewport.width]),
            y: LinearScale::new(value_domain, [viewport.height, 0.0]),
            stress_slider: slider,
            exercise_slider: slider,
            stress: None,
            exercise: None,
            points: baseline(),
            transition,
        }
    }

    /// Handle a slider input event. Returns the eased frames from the
    /// previous curve to the new one.
    pub fn on_input(&mut self, stress: f64, exercise: f64) -> SimulatorAnimation {
        let stress = self.stress_slider.snap(stress);
        let exercise = self.exercise_slider.snap(exercise);
        let target = simulate(stress, exercise);

        let from = std::mem::replace(&mut self.points, target);
        let to = &self.points;
        let frames = self.transition.sample(|u| {
            from.iter()
                .zip(to.iter())
                .map(|(a, b)| a.lerp(b, u))
                .collect::<Vec<_>>()
        });

        self.stress = Some(stress);
        self.exercise = Some(exercise);
        tracing::debug!(stress, exercise, "simulation updated");

        SimulatorAnimation {
            frames,
            frame_interval: self.transition.frame_interval,
        }
    }

    /// Slider label texts, empty until the first input.
    pub fn labels(&self) -> (String, String) {
        let fmt = |v: Option<f64>| v.map(format_slider_value).unwrap_or_default();
        (fmt(self.stress), fmt(self.exercise))
    }

    pub fn points(&self) -> &[SimPoint] {
        &self.points
    }

    pub fn slider_values(&self) -> Option<(f64, f64)> {
        self.stress.zip(self.exercise)
    }

    pub fn x_scale(&self) -> &LinearScale {
        &self.x
    }

    pub fn y_scale(&self) -> &LinearScale {
        &self.y
    }

    /// SVG path data of one channel's curve.
    pub fn line_path(&self, channel: Channel) -> String {
        let pixels: Vec<[f64; 2]> = self
            .points
            .iter()
            .map(|p| [self.x.apply(f64::from(p.stress)), self.y.apply(p.value(channel))])
            .collect();
        monotone_x(&pixels)
    }
}

/// Format a slider value the way a number input echoes it.
pub fn format_slider_value(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}
