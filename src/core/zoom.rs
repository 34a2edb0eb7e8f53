//! Zoom and pan transforms for the time axis.
//!
//! A [`ZoomTransform`] is the affine map `px -> px * k + x` (and likewise for
//! `y`). [`ZoomBehavior`] turns gestures into transforms and constrains them
//! so the scale factor stays inside the scale extent and the viewport never
//! pans past the translate extent.

use crate::core::scale::TimeScale;
use serde::{Deserialize, Serialize};

/// Scale + translate applied to the pixel space of an axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: ZoomTransform = ZoomTransform {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    pub fn new(k: f64, x: f64, y: f64) -> Self {
        Self { k, x, y }
    }

    pub fn apply_x(&self, px: f64) -> f64 {
        px * self.k + self.x
    }

    pub fn invert_x(&self, px: f64) -> f64 {
        (px - self.x) / self.k
    }

    pub fn invert_y(&self, py: f64) -> f64 {
        (py - self.y) / self.k
    }

    /// Translate by an amount expressed in untransformed units.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.k, self.x + self.k * dx, self.y + self.k * dy)
    }

    /// Time scale whose domain is what this transform shows of `scale`.
    ///
    /// The range is unchanged, so the rescaled scale plots directly into the
    /// same pixel space.
    pub fn rescale_x(&self, scale: &TimeScale) -> TimeScale {
        let [r0, r1] = scale.range();
        let domain = [
            scale.invert_millis(self.invert_x(r0)),
            scale.invert_millis(self.invert_x(r1)),
        ];
        TimeScale::from_millis(domain, scale.range())
    }
}

/// Gesture handling and constraints for zoom transforms.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomBehavior {
    /// Allowed range of the scale factor
    pub scale_extent: [f64; 2],
    /// Viewport in pixels, `[[x0, y0], [x1, y1]]`
    pub extent: [[f64; 2]; 2],
    /// Region the viewport may show, `[[x0, y0], [x1, y1]]`
    pub translate_extent: [[f64; 2]; 2],
}

impl ZoomBehavior {
    /// Behavior for a `width` x `height` chart that cannot pan past its own
    /// bounds.
    pub fn new(width: f64, height: f64, scale_extent: [f64; 2]) -> Self {
        let bounds = [[0.0, 0.0], [width, height]];
        Self {
            scale_extent,
            extent: bounds,
            translate_extent: bounds,
        }
    }

    /// Clamp into the scale extent. Bounds given in the wrong order are
    /// swapped.
    pub fn clamp_scale(&self, k: f64) -> f64 {
        let [a, b] = self.scale_extent;
        let (lo, hi) = (a.min(b), a.max(b));
        if k.is_nan() {
            return lo;
        }
        k.max(lo).min(hi)
    }

    /// Clamp the scale factor, then shift the transform so the viewport stays
    /// inside the translate extent. When the viewport is larger than the
    /// extent on an axis, it is centred instead.
    pub fn constrain(&self, transform: ZoomTransform) -> ZoomTransform {
        let t = ZoomTransform::new(self.clamp_scale(transform.k), transform.x, transform.y);
        let [[ex0, ey0], [ex1, ey1]] = self.extent;
        let [[tx0, ty0], [tx1, ty1]] = self.translate_extent;

        let dx0 = t.invert_x(ex0) - tx0;
        let dx1 = t.invert_x(ex1) - tx1;
        let dy0 = t.invert_y(ey0) - ty0;
        let dy1 = t.invert_y(ey1) - ty1;

        t.translate(axis_shift(dx0, dx1), axis_shift(dy0, dy1))
    }

    /// Multiply the scale factor by `factor`, keeping the point under
    /// `anchor` fixed on screen.
    pub fn scale_by(&self, transform: ZoomTransform, factor: f64, anchor: [f64; 2]) -> ZoomTransform {
        self.scale_to(transform, transform.k * factor, anchor)
    }

    /// Set the scale factor to `k`, keeping the point under `anchor` fixed.
    pub fn scale_to(&self, transform: ZoomTransform, k: f64, anchor: [f64; 2]) -> ZoomTransform {
        let k1 = self.clamp_scale(k);
        let [px, py] = anchor;
        let fixed = [transform.invert_x(px), transform.invert_y(py)];
        self.constrain(ZoomTransform::new(k1, px - fixed[0] * k1, py - fixed[1] * k1))
    }

    /// Pan by a screen-space offset in pixels.
    pub fn pan_by(&self, transform: ZoomTransform, dx: f64, dy: f64) -> ZoomTransform {
        self.constrain(ZoomTransform::new(
            transform.k,
            transform.x + dx,
            transform.y + dy,
        ))
    }

    /// Centre of the viewport, used as the default zoom anchor.
    pub fn center(&self) -> [f64; 2] {
        let [[x0, y0], [x1, y1]] = self.extent;
        [(x0 + x1) / 2.0, (y0 + y1) / 2.0]
    }

    /// Interpolate between two transforms at eased progress `u`.
    ///
    /// The viewport centre moves linearly while its width changes
    /// geometrically, so zooming out feels uniform across the animation.
    pub fn interpolate(&self, from: ZoomTransform, to: ZoomTransform, u: f64) -> ZoomTransform {
        if u <= 0.0 {
            return from;
        }
        if u >= 1.0 {
            return to;
        }

        let [cx, cy] = self.center();
        let width = (self.extent[1][0] - self.extent[0][0]).max(f64::EPSILON);
        let view = |t: &ZoomTransform| [t.invert_x(cx), t.invert_y(cy), width / t.k];
        let [ax, ay, aw] = view(&from);
        let [bx, by, bw] = view(&to);

        let w = aw * (bw / aw).powf(u);
        let vx = ax + (bx - ax) * u;
        let vy = ay + (by - ay) * u;
        let k = width / w;
        ZoomTransform::new(k, cx - vx * k, cy - vy * k)
    }
}

fn axis_shift(d0: f64, d1: f64) -> f64 {
    if d1 > d0 {
        (d0 + d1) / 2.0
    } else if d0 < 0.0 {
        d0
    } else if d1 > 0.0 {
        d1
    } else {
        0.0
    }
}
