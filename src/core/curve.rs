//! Line path generation.
//!
//! Lines use monotone cubic interpolation in x: the curve passes through
//! every point and never overshoots between two samples, which keeps
//! physiological traces from showing peaks that were never measured.

use std::fmt::Write;

/// SVG path data accumulator.
#[derive(Debug, Default, Clone)]
pub struct PathBuilder {
    data: String,
}

impl PathBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        let _ = write!(self.data, "M{},{}", num(x), num(y));
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        let _ = write!(self.data, "L{},{}", num(x), num(y));
    }

    pub fn bezier_curve_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) {
        let _ = write!(
            self.data,
            "C{},{},{},{},{},{}",
            num(x1),
            num(y1),
            num(x2),
            num(y2),
            num(x),
            num(y)
        );
    }

    pub fn close_path(&mut self) {
        self.data.push('Z');
    }

    pub fn finish(self) -> String {
        self.data
    }
}

/// Format a coordinate with at most three decimals.
pub fn num(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    let text = format!("{rounded:.3}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Monotone-x curve state.
struct MonotoneX {
    path: PathBuilder,
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    t0: f64,
    points: u8,
}

impl MonotoneX {
    fn new() -> Self {
        Self {
            path: PathBuilder::new(),
            x0: f64::NAN,
            y0: f64::NAN,
            x1: f64::NAN,
            y1: f64::NAN,
            t0: f64::NAN,
            points: 0,
        }
    }

    fn point(&mut self, x: f64, y: f64) {
        // Coincident points carry no shape.
        if x == self.x1 && y == self.y1 {
            return;
        }

        let mut t1 = f64::NAN;
        match self.points {
            0 => {
                self.points = 1;
                self.path.move_to(x, y);
            }
            1 => self.points = 2,
            2 => {
                self.points = 3;
                t1 = self.slope3(x, y);
                let t0 = self.slope2(t1);
                self.segment(t0, t1);
            }
            _ => {
                t1 = self.slope3(x, y);
                self.segment(self.t0, t1);
            }
        }

        self.x0 = self.x1;
        self.x1 = x;
        self.y0 = self.y1;
        self.y1 = y;
        self.t0 = t1;
    }

    fn end(mut self) -> String {
        match self.points {
            1 => self.path.close_path(),
            2 => self.path.line_to(self.x1, self.y1),
            3 => {
                let t1 = self.slope2(self.t0);
                self.segment(self.t0, t1);
            }
            _ => {}
        }
        self.path.finish()
    }

    /// Cubic segment from (x0, y0) to (x1, y1) with the given end tangents.
    fn segment(&mut self, t0: f64, t1: f64) {
        let dx = (self.x1 - self.x0) / 3.0;
        self.path.bezier_curve_to(
            self.x0 + dx,
            self.y0 + dx * t0,
            self.x1 - dx,
            self.y1 - dx * t1,
            self.x1,
            self.y1,
        );
    }

    /// Tangent at (x1, y1) given the next point (Steffen's method).
    fn slope3(&self, x2: f64, y2: f64) -> f64 {
        let h0 = self.x1 - self.x0;
        let h1 = x2 - self.x1;
        let s0 = (self.y1 - self.y0) / nonzero_or_signed_zero(h0, h1);
        let s1 = (y2 - self.y1) / nonzero_or_signed_zero(h1, h0);
        let p = (s0 * h1 + s1 * h0) / (h0 + h1);
        let slope = (sign(s0) + sign(s1)) * min_propagating_nan(&[s0.abs(), s1.abs(), 0.5 * p.abs()]);
        if slope.is_nan() {
            0.0
        } else {
            slope
        }
    }

    /// One-sided tangent at an end point.
    fn slope2(&self, t: f64) -> f64 {
        let h = self.x1 - self.x0;
        if h != 0.0 {
            (3.0 * (self.y1 - self.y0) / h - t) / 2.0
        } else {
            t
        }
    }
}

fn sign(x: f64) -> f64 {
    if x < 0.0 {
        -1.0
    } else {
        1.0
    }
}

fn nonzero_or_signed_zero(h: f64, other: f64) -> f64 {
    if h != 0.0 {
        h
    } else if other < 0.0 {
        -0.0
    } else {
        0.0
    }
}

fn min_propagating_nan(values: &[f64]) -> f64 {
    values.iter().fold(f64::INFINITY, |acc, &v| {
        if acc.is_nan() || v.is_nan() {
            f64::NAN
        } else {
            acc.min(v)
        }
    })
}

/// Monotone-x path through `points`. Non-finite points are skipped.
///
/// Returns an empty string when there is nothing to draw.
pub fn monotone_x(points: &[[f64; 2]]) -> String {
    let mut curve = MonotoneX::new();
    for &[x, y] in points {
        if x.is_finite() && y.is_finite() {
            curve.point(x, y);
        }
    }
    curve.end()
}

/// Straight segments through `points`, used for axis domain lines.
pub fn polyline(points: &[[f64; 2]]) -> String {
    let mut path = PathBuilder::new();
    for (i, &[x, y]) in points.iter().enumerate() {
        if i == 0 {
            path.move_to(x, y);
        } else {
            path.line_to(x, y);
        }
    }
    path.finish()
}
