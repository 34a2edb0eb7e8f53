//! Interactive timeline explorer.
//!
//! The view owns three coordinate transforms over the same readings:
//!
//! - the base time scale and the shared value scale, fixed at initialization
//! - the zoom transform, which rescales the time axis only
//! - the brush selection, which filters the readings shown
//!
//! Zoom and brush are not composed. A zoom always shows the full dataset
//! through the rescaled time axis and replaces any brushed view. A brush is
//! always inverted through the base, unzoomed scale and shows the filtered
//! readings on an axis spanning their own time extent. Resetting the zoom
//! leaves a brushed view in place.

use crate::core::brush::{time_extent, BrushBehavior, BrushSelection, SelectionRange};
use crate::core::curve::monotone_x;
use crate::core::scale::{LinearScale, TimeScale};
use crate::core::transition::Transition;
use crate::core::zoom::{ZoomBehavior, ZoomTransform};
use crate::data::types::{Channel, Reading};
use chrono::{DateTime, Duration, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Pixel size of the plotting area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Tunables for the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineOptions {
    /// Allowed zoom factors
    pub scale_extent: [f64; 2],
    /// Reset-zoom animation
    pub reset: Transition,
    /// Requested tick count on the time axis
    pub x_ticks: usize,
    /// Requested tick count on the value axis
    pub y_ticks: usize,
    /// Marker radius in pixels, also the hover hit radius
    pub marker_radius: f64,
}

impl Default for TimelineOptions {
    fn default() -> Self {
        Self {
            scale_extent: [1.0, 10.0],
            reset: Transition::new(
                std::time::Duration::from_millis(750),
                std::time::Duration::from_millis(16),
            ),
            x_ticks: 10,
            y_ticks: 6,
            marker_radius: 4.0,
        }
    }
}

/// What the timeline is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DisplayMode {
    /// Full dataset on the base axis
    Full,
    /// Full dataset on a zoom-rescaled axis
    Zoomed,
    /// Readings inside a brushed range
    Brushed { range: SelectionRange },
}

/// A hoverable point marker.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    pub channel: Channel,
    /// Index into the displayed readings
    pub index: usize,
    pub cx: f64,
    pub cy: f64,
}

/// Cross-channel hover details for one timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub timestamp: DateTime<Utc>,
    pub value_hr: f64,
    pub value_eda: f64,
    pub temp: f64,
}

impl Tooltip {
    pub fn from_reading(reading: &Reading) -> Self {
        Self {
            timestamp: reading.timestamp,
            value_hr: reading.value_hr,
            value_eda: reading.value_eda,
            temp: reading.temp,
        }
    }

    /// Display lines: the time, then one line per channel.
    pub fn lines(&self, tz: Tz) -> Vec<String> {
        let reading = Reading::new(self.timestamp, self.value_hr, self.value_eda, self.temp);
        let mut lines = vec![format!(
            "Time: {}",
            self.timestamp.with_timezone(&tz).format("%H:%M:%S")
        )];
        lines.extend(Channel::ALL.iter().map(|&c| {
            format!("{}: {:.2} {}", c.label(), c.value(&reading), c.unit())
        }));
        lines
    }
}

/// Frames of a zoom animation, played at `frame_interval`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoomAnimation {
    pub frames: Vec<ZoomTransform>,
    #[serde(with = "crate::config::duration_serde")]
    pub frame_interval: std::time::Duration,
}

/// Serializable summary of the view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineState {
    pub display: DisplayMode,
    pub zoom: ZoomTransform,
    pub time_domain: (DateTime<Utc>, DateTime<Utc>),
    pub base_time_domain: (DateTime<Utc>, DateTime<Utc>),
    pub value_domain: [f64; 2],
    pub displayed: usize,
    pub total: usize,
}

/// Timeline explorer state. Handlers mutate it; rendering reads it.
#[derive(Debug, Clone)]
pub struct TimelineView {
    readings: Vec<Reading>,
    viewport: Viewport,
    options: TimelineOptions,
    base_x: TimeScale,
    y: LinearScale,
    zoom_behavior: ZoomBehavior,
    brush_behavior: BrushBehavior,
    zoom: ZoomTransform,
    x: TimeScale,
    displayed: Vec<Reading>,
    mode: DisplayMode,
}

impl TimelineView {
    /// Build the view with default options.
    pub fn initialize(readings: Vec<Reading>, viewport: Viewport) -> Self {
        Self::with_options(readings, viewport, TimelineOptions::default())
    }

    pub fn with_options(readings: Vec<Reading>, viewport: Viewport, options: TimelineOptions) -> Self {
        let x_range = [0.0, viewport.width];
        let base_x = match time_extent(&readings) {
            Some((start, end)) => TimeScale::new(start, end, x_range),
            None => {
                tracing::warn!("no readings, using a one-second time domain");
                let start = DateTime::<Utc>::UNIX_EPOCH;
                TimeScale::new(start, start + Duration::seconds(1), x_range)
            }
        };

        let value_domain = value_extent(&readings).unwrap_or_else(|| {
            tracing::warn!("no readings, using a unit value domain");
            [0.0, 1.0]
        });
        let y = LinearScale::new(value_domain, [viewport.height, 0.0]);

        tracing::debug!(
            readings = readings.len(),
            width = viewport.width,
            height = viewport.height,
            "timeline initialized"
        );

        Self {
            displayed: readings.clone(),
            readings,
            viewport,
            zoom_behavior: ZoomBehavior::new(viewport.width, viewport.height, options.scale_extent),
            brush_behavior: BrushBehavior::new(viewport.width),
            options,
            base_x,
            y,
            zoom: ZoomTransform::IDENTITY,
            x: base_x,
            mode: DisplayMode::Full,
        }
    }

    /// Apply a zoom transform (constrained first) and redraw the full
    /// dataset through the rescaled time axis. Returns the transform that
    /// was applied.
    pub fn on_zoom(&mut self, transform: ZoomTransform) -> ZoomTransform {
        let t = self.zoom_behavior.constrain(transform);
        self.zoom = t;
        self.x = t.rescale_x(&self.base_x);
        self.displayed.clone_from(&self.readings);
        self.mode = DisplayMode::Zoomed;
        tracing::debug!(k = t.k, x = t.x, "zoomed");
        t
    }

    /// Wheel-style zoom about `anchor` (viewport centre when `None`).
    pub fn zoom_by(&mut self, factor: f64, anchor: Option<[f64; 2]>) -> ZoomTransform {
        let anchor = anchor.unwrap_or_else(|| self.zoom_behavior.center());
        let t = self.zoom_behavior.scale_by(self.zoom, factor, anchor);
        self.on_zoom(t)
    }

    /// Drag-style pan by `dx` pixels.
    pub fn pan_by(&mut self, dx: f64) -> ZoomTransform {
        let t = self.zoom_behavior.pan_by(self.zoom, dx, 0.0);
        self.on_zoom(t)
    }

    /// Finish a brush gesture.
    ///
    /// `None` (an empty or cancelled drag) leaves the view untouched and
    /// returns `false`. Otherwise the pixel bounds are inverted through the
    /// base time scale and the readings inside the inclusive range are
    /// shown. The time axis spans the filtered readings' own extent; when
    /// nothing matches it keeps its previous domain.
    pub fn on_brush_end(&mut self, selection: Option<BrushSelection>) -> bool {
        let Some(selection) = selection else {
            return false;
        };

        let selection = self.brush_behavior.clamp(selection);
        let range = SelectionRange::from_pixels(selection, &self.base_x);
        let filtered = range.filter(&self.readings);

        match time_extent(&filtered) {
            Some((start, end)) => self.x = self.base_x.with_domain(start, end),
            None => tracing::warn!(
                start = %range.start,
                end = %range.end,
                "brush matched no readings, keeping previous time domain"
            ),
        }

        tracing::debug!(
            x0 = selection.x0,
            x1 = selection.x1,
            matched = filtered.len(),
            "brushed"
        );
        self.displayed = filtered;
        self.mode = DisplayMode::Brushed { range };
        true
    }

    /// Animate the zoom transform back to identity.
    ///
    /// The returned frames run from the current transform to identity. The
    /// view itself jumps straight to the end state: an unzoomed axis, or the
    /// brushed view if one is active.
    pub fn reset_zoom(&mut self) -> ZoomAnimation {
        let from = self.zoom;
        let behavior = self.zoom_behavior;
        let frames = self
            .options
            .reset
            .sample(|u| behavior.interpolate(from, ZoomTransform::IDENTITY, u));

        self.zoom = ZoomTransform::IDENTITY;
        if !matches!(self.mode, DisplayMode::Brushed { .. }) {
            self.x = self.base_x;
            self.displayed.clone_from(&self.readings);
            self.mode = DisplayMode::Full;
        }

        tracing::debug!(frames = frames.len(), "zoom reset");
        ZoomAnimation {
            frames,
            frame_interval: self.options.reset.frame_interval,
        }
    }

    /// Time scale for an intermediate zoom frame.
    pub fn frame_time_scale(&self, transform: ZoomTransform) -> TimeScale {
        transform.rescale_x(&self.base_x)
    }

    /// Tooltip for the displayed reading at `index`.
    pub fn tooltip(&self, index: usize) -> Option<Tooltip> {
        self.displayed.get(index).map(Tooltip::from_reading)
    }

    /// Tooltip for a marker. Every channel's marker at the same index
    /// reports the same details.
    pub fn hover(&self, marker: &Marker) -> Option<Tooltip> {
        self.tooltip(marker.index)
    }

    /// Nearest marker within the marker radius of a pixel position.
    ///
    /// On equal distance the marker drawn last (topmost) wins.
    pub fn hit_test(&self, px: f64, py: f64) -> Option<(Marker, Tooltip)> {
        let radius = self.options.marker_radius;
        let mut best: Option<(Marker, f64)> = None;
        for marker in self.markers() {
            let d = (marker.cx - px).hypot(marker.cy - py);
            if d > radius {
                continue;
            }
            if best.map_or(true, |(_, bd)| d <= bd) {
                best = Some((marker, d));
            }
        }
        best.and_then(|(marker, _)| self.hover(&marker).map(|t| (marker, t)))
    }

    /// One marker per displayed reading per channel, grouped by channel.
    pub fn markers(&self) -> Vec<Marker> {
        Channel::ALL
            .iter()
            .flat_map(|&channel| {
                self.displayed
                    .iter()
                    .enumerate()
                    .map(move |(index, r)| Marker {
                        channel,
                        index,
                        cx: self.x.apply(r.timestamp),
                        cy: self.y.apply(channel.value(r)),
                    })
            })
            .collect()
    }

    /// Pixel points of one channel's line.
    pub fn line_points(&self, channel: Channel) -> Vec<[f64; 2]> {
        self.displayed
            .iter()
            .map(|r| [self.x.apply(r.timestamp), self.y.apply(channel.value(r))])
            .collect()
    }

    /// SVG path data of one channel's line.
    pub fn line_path(&self, channel: Channel) -> String {
        monotone_x(&self.line_points(channel))
    }

    pub fn state(&self) -> TimelineState {
        TimelineState {
            display: self.mode,
            zoom: self.zoom,
            time_domain: self.x.domain(),
            base_time_domain: self.base_x.domain(),
            value_domain: self.y.domain(),
            displayed: self.displayed.len(),
            total: self.readings.len(),
        }
    }

    /// Time scale currently used by the axis and the lines.
    pub fn time_scale(&self) -> &TimeScale {
        &self.x
    }

    pub fn base_time_scale(&self) -> &TimeScale {
        &self.base_x
    }

    pub fn value_scale(&self) -> &LinearScale {
        &self.y
    }

    pub fn zoom_transform(&self) -> ZoomTransform {
        self.zoom
    }

    pub fn zoom_behavior(&self) -> &ZoomBehavior {
        &self.zoom_behavior
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Active brush range, if the brushed view is showing.
    pub fn selection(&self) -> Option<SelectionRange> {
        match self.mode {
            DisplayMode::Brushed { range } => Some(range),
            _ => None,
        }
    }

    pub fn displayed(&self) -> &[Reading] {
        &self.displayed
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn options(&self) -> &TimelineOptions {
        &self.options
    }
}

/// Smallest and largest value across all channels, `None` when empty.
pub fn value_extent(readings: &[Reading]) -> Option<[f64; 2]> {
    if readings.is_empty() {
        return None;
    }
    let min = readings.iter().map(Reading::min_value).fold(f64::INFINITY, f64::min);
    let max = readings.iter().map(Reading::max_value).fold(f64::NEG_INFINITY, f64::max);
    Some([min, max])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scale::instant_from_secs;

    const WIDTH: f64 = 770.0;
    const HEIGHT: f64 = 400.0;

    fn view() -> TimelineView {
        let hr = [60.0, 62.0, 58.0, 70.0, 65.0];
        let eda = [0.4, 0.5, 0.45, 0.9, 0.7];
        let temp = [33.0, 33.1, 33.2, 33.4, 33.3];
        let readings = (0..5)
            .map(|i| Reading::new(instant_from_secs(i as i64), hr[i], eda[i], temp[i]))
            .collect();
        TimelineView::initialize(readings, Viewport::new(WIDTH, HEIGHT))
    }

    fn px(secs: f64) -> f64 {
        secs / 4.0 * WIDTH
    }

    #[test]
    fn test_initialize_domains() {
        let view = view();
        assert_eq!(
            view.base_time_scale().domain(),
            (instant_from_secs(0), instant_from_secs(4))
        );
        assert_eq!(view.value_scale().domain(), [0.4, 70.0]);
        assert_eq!(view.value_scale().range(), [HEIGHT, 0.0]);
        assert_eq!(view.displayed().len(), 5);
        assert_eq!(view.mode(), DisplayMode::Full);
    }

    #[test]
    fn test_initialize_empty_falls_back() {
        let view = TimelineView::initialize(Vec::new(), Viewport::new(WIDTH, HEIGHT));
        let (start, end) = view.base_time_scale().domain();
        assert!(end > start);
        assert_eq!(view.value_scale().domain(), [0.0, 1.0]);
        assert!(view.markers().is_empty());
        assert_eq!(view.line_path(Channel::HeartRate), "");
    }

    #[test]
    fn test_single_reading_is_finite() {
        let readings = vec![Reading::new(instant_from_secs(10), 70.0, 70.0, 70.0)];
        let view = TimelineView::initialize(readings, Viewport::new(WIDTH, HEIGHT));
        let marker = view.markers()[0];
        assert_eq!(marker.cx, WIDTH / 2.0);
        assert_eq!(marker.cy, HEIGHT / 2.0);
    }

    #[test]
    fn test_brush_filters_inclusive_range() {
        let mut view = view();
        assert!(view.on_brush_end(Some(BrushSelection::new(px(1.0), px(3.0)))));

        let times: Vec<_> = view.displayed().iter().map(|r| r.timestamp).collect();
        assert_eq!(
            times,
            vec![instant_from_secs(1), instant_from_secs(2), instant_from_secs(3)]
        );
        assert_eq!(
            view.time_scale().domain(),
            (instant_from_secs(1), instant_from_secs(3))
        );
        assert_eq!(
            view.selection(),
            Some(SelectionRange::new(instant_from_secs(1), instant_from_secs(3)))
        );
    }

    #[test]
    fn test_brush_axis_uses_data_extent_not_brush_extent() {
        let mut view = view();
        view.on_brush_end(Some(BrushSelection::new(px(0.5), px(3.5))));
        assert_eq!(
            view.time_scale().domain(),
            (instant_from_secs(1), instant_from_secs(3))
        );
    }

    #[test]
    fn test_no_selection_is_noop() {
        let mut view = view();
        view.on_brush_end(Some(BrushSelection::new(px(1.0), px(2.0))));
        let before = view.state();
        let displayed = view.displayed().to_vec();

        assert!(!view.on_brush_end(None));
        assert_eq!(view.state(), before);
        assert_eq!(view.displayed(), displayed.as_slice());
    }

    #[test]
    fn test_empty_brush_keeps_previous_axis() {
        let mut view = view();
        let before = view.time_scale().domain();
        // Inverted bounds.
        view.on_brush_end(Some(BrushSelection::new(px(3.0), px(1.0))));
        assert!(view.displayed().is_empty());
        assert_eq!(view.time_scale().domain(), before);
        assert_eq!(view.line_path(Channel::Eda), "");
    }

    #[test]
    fn test_zero_width_brush_on_a_reading() {
        let mut view = view();
        view.on_brush_end(Some(BrushSelection::new(px(2.0), px(2.0))));
        assert_eq!(view.displayed().len(), 1);
        assert_eq!(view.displayed()[0].value_hr, 58.0);
    }

    #[test]
    fn test_zoom_keeps_value_scale_and_full_dataset() {
        let mut view = view();
        view.on_brush_end(Some(BrushSelection::new(px(1.0), px(2.0))));
        let value_domain = view.value_scale().domain();

        let applied = view.on_zoom(ZoomTransform::new(2.0, -WIDTH / 2.0, 0.0));
        assert_eq!(applied.k, 2.0);
        assert_eq!(view.value_scale().domain(), value_domain);
        assert_eq!(view.displayed().len(), 5);
        assert_eq!(view.mode(), DisplayMode::Zoomed);
        assert_eq!(view.selection(), None);

        let (start, end) = view.time_scale().domain();
        assert_eq!(start, instant_from_secs(1));
        assert_eq!(end, instant_from_secs(3));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut view = view();
        let applied = view.on_zoom(ZoomTransform::new(50.0, 0.0, 0.0));
        assert_eq!(applied.k, 10.0);
        let applied = view.on_zoom(ZoomTransform::new(0.1, 0.0, 0.0));
        assert_eq!(applied.k, 1.0);
    }

    #[test]
    fn test_brush_after_zoom_uses_base_scale() {
        let mut view = view();
        view.zoom_by(4.0, Some([0.0, 0.0]));
        view.on_brush_end(Some(BrushSelection::new(px(3.0), px(4.0))));
        let times: Vec<_> = view.displayed().iter().map(|r| r.timestamp).collect();
        assert_eq!(times, vec![instant_from_secs(3), instant_from_secs(4)]);
    }

    #[test]
    fn test_reset_returns_to_base_domain() {
        let mut view = view();
        view.zoom_by(3.0, None);
        view.pan_by(-120.0);
        view.zoom_by(1.5, Some([10.0, 10.0]));

        let animation = view.reset_zoom();
        assert_eq!(*animation.frames.last().unwrap(), ZoomTransform::IDENTITY);
        assert_eq!(view.zoom_transform(), ZoomTransform::IDENTITY);
        assert_eq!(view.time_scale().domain(), view.base_time_scale().domain());
        assert_eq!(view.mode(), DisplayMode::Full);
    }

    #[test]
    fn test_reset_frames_widen_to_base_domain() {
        let mut view = view();
        view.zoom_by(4.0, None);
        let zoomed = view.time_scale().domain();

        let animation = view.reset_zoom();
        let domains: Vec<_> = animation
            .frames
            .iter()
            .map(|t| view.frame_time_scale(*t).domain())
            .collect();
        let span = |(s, e): (DateTime<Utc>, DateTime<Utc>)| (e - s).num_milliseconds();

        assert!(span(domains[0]) >= span(zoomed));
        assert!(span(domains[0]) < span(view.base_time_scale().domain()));
        assert_eq!(*domains.last().unwrap(), view.base_time_scale().domain());
    }

    #[test]
    fn test_reset_keeps_brush() {
        let mut view = view();
        view.on_brush_end(Some(BrushSelection::new(px(1.0), px(3.0))));
        view.reset_zoom();
        assert_eq!(view.displayed().len(), 3);
        assert!(view.selection().is_some());
    }

    #[test]
    fn test_hover_reports_all_channels() {
        let view = view();
        let markers = view.markers();
        assert_eq!(markers.len(), 15);

        let hr_marker = markers
            .iter()
            .find(|m| m.channel == Channel::HeartRate && m.index == 3)
            .unwrap();
        let temp_marker = markers
            .iter()
            .find(|m| m.channel == Channel::Temperature && m.index == 3)
            .unwrap();
        let a = view.hover(hr_marker).unwrap();
        let b = view.hover(temp_marker).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.value_hr, 70.0);
        assert_eq!(a.value_eda, 0.9);
        assert_eq!(a.temp, 33.4);
    }

    #[test]
    fn test_hit_test() {
        let view = view();
        let marker = view
            .markers()
            .into_iter()
            .find(|m| m.channel == Channel::HeartRate && m.index == 1)
            .unwrap();
        let (hit, tooltip) = view.hit_test(marker.cx + 1.0, marker.cy - 1.0).unwrap();
        assert_eq!(hit.index, 1);
        assert_eq!(tooltip.value_hr, 62.0);
        assert!(view.hit_test(-100.0, -100.0).is_none());
    }

    #[test]
    fn test_tooltip_lines() {
        let tooltip = view().tooltip(0).unwrap();
        let lines = tooltip.lines(chrono_tz::UTC);
        assert_eq!(
            lines,
            vec![
                "Time: 00:00:00".to_string(),
                "HR: 60.00 BPM".to_string(),
                "EDA: 0.40 µS".to_string(),
                "Temp: 33.00 °C".to_string(),
            ]
        );
    }
}
