//! Per-channel summary statistics.

use crate::data::types::{Channel, Reading};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

/// Summary of a single channel over a set of readings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelSummary {
    pub channel: Channel,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    /// Sample standard deviation (0 for fewer than two readings)
    pub std_dev: f64,
}

/// Summary of a whole dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub count: usize,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub channels: Vec<ChannelSummary>,
}

/// Summarize one channel. Returns `None` for an empty slice.
pub fn summarize_channel(readings: &[Reading], channel: Channel) -> Option<ChannelSummary> {
    if readings.is_empty() {
        return None;
    }

    let values: Vec<f64> = readings.iter().map(|r| channel.value(r)).collect();
    let std_dev = if values.len() < 2 {
        0.0
    } else {
        values.iter().std_dev()
    };

    Some(ChannelSummary {
        channel,
        min: Statistics::min(values.iter()),
        max: Statistics::max(values.iter()),
        mean: values.iter().mean(),
        std_dev,
    })
}

/// Summarize every channel plus the time extent.
pub fn summarize(readings: &[Reading]) -> DatasetSummary {
    DatasetSummary {
        count: readings.len(),
        start: readings.iter().map(|r| r.timestamp).min(),
        end: readings.iter().map(|r| r.timestamp).max(),
        channels: Channel::ALL
            .iter()
            .filter_map(|&c| summarize_channel(readings, c))
            .collect(),
    }
}
