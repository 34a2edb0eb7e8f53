//! Brush selection over the time axis.

use crate::core::scale::TimeScale;
use crate::data::types::Reading;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pixel bounds of a finished brush gesture, as dragged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushSelection {
    pub x0: f64,
    pub x1: f64,
}

impl BrushSelection {
    pub fn new(x0: f64, x1: f64) -> Self {
        Self { x0, x1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }
}

impl From<[f64; 2]> for BrushSelection {
    fn from([x0, x1]: [f64; 2]) -> Self {
        Self::new(x0, x1)
    }
}

/// Horizontal brush limited to the chart's pixel extent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BrushBehavior {
    pub extent: [f64; 2],
}

impl BrushBehavior {
    pub fn new(width: f64) -> Self {
        Self {
            extent: [0.0, width],
        }
    }

    /// Clamp both ends into the extent. Order is preserved, so inverted
    /// bounds stay inverted.
    pub fn clamp(&self, selection: BrushSelection) -> BrushSelection {
        let [lo, hi] = self.extent;
        let clamp = |v: f64| if v.is_nan() { lo } else { v.clamp(lo, hi) };
        BrushSelection::new(clamp(selection.x0), clamp(selection.x1))
    }
}

/// Inclusive instant range picked with the brush.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl SelectionRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Invert pixel bounds through `scale`.
    pub fn from_pixels(selection: BrushSelection, scale: &TimeScale) -> Self {
        Self::new(scale.invert(selection.x0), scale.invert(selection.x1))
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }

    /// Readings inside the range, in their original order. An inverted
    /// range matches nothing.
    pub fn filter(&self, readings: &[Reading]) -> Vec<Reading> {
        readings
            .iter()
            .filter(|r| self.contains(r.timestamp))
            .copied()
            .collect()
    }
}

/// Time extent of a set of readings, `None` when empty.
pub fn time_extent(readings: &[Reading]) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = readings.iter().map(|r| r.timestamp).min()?;
    let end = readings.iter().map(|r| r.timestamp).max()?;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scale::instant_from_secs;

    fn readings() -> Vec<Reading> {
        [60.0, 62.0, 58.0, 70.0, 65.0]
            .iter()
            .enumerate()
            .map(|(i, &hr)| Reading::new(instant_from_secs(i as i64), hr, 0.5, 36.0))
            .collect()
    }

    #[test]
    fn test_filter_inclusive() {
        let range = SelectionRange::new(instant_from_secs(1), instant_from_secs(3));
        let filtered = range.filter(&readings());
        let hr: Vec<f64> = filtered.iter().map(|r| r.value_hr).collect();
        assert_eq!(hr, vec![62.0, 58.0, 70.0]);
    }

    #[test]
    fn test_filter_single_instant() {
        let range = SelectionRange::new(instant_from_secs(2), instant_from_secs(2));
        assert_eq!(range.filter(&readings()).len(), 1);

        let range = SelectionRange::new(
            instant_from_secs(2) + chrono::Duration::milliseconds(500),
            instant_from_secs(2) + chrono::Duration::milliseconds(500),
        );
        assert!(range.filter(&readings()).is_empty());
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let range = SelectionRange::new(instant_from_secs(3), instant_from_secs(1));
        assert!(range.filter(&readings()).is_empty());
    }

    #[test]
    fn test_from_pixels() {
        let scale = TimeScale::new(instant_from_secs(0), instant_from_secs(4), [0.0, 770.0]);
        let range = SelectionRange::from_pixels(BrushSelection::new(192.5, 577.5), &scale);
        assert_eq!(range.start, instant_from_secs(1));
        assert_eq!(range.end, instant_from_secs(3));
    }

    #[test]
    fn test_clamp_preserves_order() {
        let brush = BrushBehavior::new(770.0);
        assert_eq!(
            brush.clamp(BrushSelection::new(-10.0, 900.0)),
            BrushSelection::new(0.0, 770.0)
        );
        assert_eq!(
            brush.clamp(BrushSelection::new(500.0, 100.0)),
            BrushSelection::new(500.0, 100.0)
        );
    }

    #[test]
    fn test_time_extent() {
        assert_eq!(
            time_extent(&readings()),
            Some((instant_from_secs(0), instant_from_secs(4)))
        );
        assert_eq!(time_extent(&[]), None);
    }
}
